use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Millisecond wall clock the replay engine measures against.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Monotonic clock anchored at construction.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Hand-driven clock for deterministic tests. Clones share the same time.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }

    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

/// Identifies one requested frame. `session` changes on every reset so a frame
/// requested before the reset can be told apart from a fresh one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameToken {
    pub session: u64,
    pub sequence: u64,
}

/// "Call me on the next display refresh" capability.
pub trait FrameScheduler {
    fn request_frame(&mut self, token: FrameToken);

    fn cancel_frame(&mut self, token: FrameToken);

    /// The frame that should fire now, if any. Called once per refresh by the host.
    fn take_due(&mut self) -> Option<FrameToken>;
}

/// Single-slot scheduler: at most one frame outstanding, fired by the host's tick.
#[derive(Debug, Default)]
pub struct FrameQueue {
    pending: Option<FrameToken>,
    requested: u64,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<FrameToken> {
        self.pending
    }

    /// Total frames requested since construction.
    pub fn requested(&self) -> u64 {
        self.requested
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&mut self, token: FrameToken) {
        self.requested += 1;
        self.pending = Some(token);
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        if self.pending == Some(token) {
            self.pending = None;
        }
    }

    fn take_due(&mut self) -> Option<FrameToken> {
        self.pending.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new(10);
        let other = clock.clone();
        clock.advance(5);
        assert_eq!(other.now_ms(), 15);
        other.set(100);
        assert_eq!(clock.now_ms(), 100);
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now_ms();
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(clock.now_ms() >= a + 5);
    }

    #[test]
    fn test_frame_queue_single_slot() {
        let mut queue = FrameQueue::new();
        let t1 = FrameToken {
            session: 1,
            sequence: 1,
        };
        let t2 = FrameToken {
            session: 1,
            sequence: 2,
        };

        queue.request_frame(t1);
        queue.request_frame(t2);
        assert_eq!(queue.requested(), 2);
        assert_eq!(queue.take_due(), Some(t2));
        assert_eq!(queue.take_due(), None);
    }

    #[test]
    fn test_cancel_only_matching_token() {
        let mut queue = FrameQueue::new();
        let live = FrameToken {
            session: 2,
            sequence: 1,
        };
        queue.request_frame(live);

        queue.cancel_frame(FrameToken {
            session: 1,
            sequence: 1,
        });
        assert_eq!(queue.pending(), Some(live));

        queue.cancel_frame(live);
        assert_eq!(queue.pending(), None);
    }
}
