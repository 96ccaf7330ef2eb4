use std::cell::Cell;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, MouseEvent};

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum PadEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize,
    /// one display frame has elapsed
    Tick,
}

/// Source of terminal events (keyboard, mouse, resize)
pub trait PadEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<PadEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<PadEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let forwarded = match event::read() {
                Ok(CtEvent::Key(key)) => Some(PadEvent::Key(key)),
                Ok(CtEvent::Mouse(mouse)) => Some(PadEvent::Mouse(mouse)),
                Ok(CtEvent::Resize(_, _)) => Some(PadEvent::Resize),
                Ok(_) => None,
                Err(_) => break,
            };

            if let Some(ev) = forwarded {
                if tx.send(ev).is_err() {
                    break;
                }
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PadEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<PadEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<PadEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<PadEvent>) -> Self {
        Self { rx }
    }
}

impl PadEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<PadEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the application one event/tick at a time.
///
/// Ticks come from a frame deadline, not from input going quiet, so a steady stream
/// of mouse motion still gets a `Tick` every interval.
pub struct Runner<E: PadEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
    next_tick: Cell<Instant>,
}

impl<E: PadEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        let next_tick = Cell::new(Instant::now() + ticker.interval());
        Self {
            event_source,
            ticker,
            next_tick,
        }
    }

    /// Returns `Tick` once the frame deadline has passed, otherwise the next event
    /// that arrives before it.
    pub fn step(&self) -> PadEvent {
        let now = Instant::now();
        let deadline = self.next_tick.get();
        if now >= deadline {
            self.schedule_after(deadline, now);
            return PadEvent::Tick;
        }

        match self.event_source.recv_timeout(deadline - now) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => {
                self.schedule_after(deadline, Instant::now());
                PadEvent::Tick
            }
            Err(RecvTimeoutError::Disconnected) => {
                std::thread::sleep(deadline.saturating_duration_since(Instant::now()));
                self.schedule_after(deadline, Instant::now());
                PadEvent::Tick
            }
        }
    }

    /// Next deadline one interval on. A runner that fell more than a frame behind
    /// restarts from `now` instead of bursting catch-up ticks.
    fn schedule_after(&self, deadline: Instant, now: Instant) {
        let next = deadline + self.ticker.interval();
        self.next_tick.set(if next <= now {
            now + self.ticker.interval()
        } else {
            next
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyModifiers, MouseButton, MouseEventKind};
    use std::sync::mpsc;

    #[test]
    fn step_returns_tick_on_timeout() {
        let (_tx, rx) = mpsc::channel();
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(1));
        let runner = Runner::new(es, ticker);

        // With no events available, step should yield Tick
        match runner.step() {
            PadEvent::Tick => {}
            _ => panic!("expected Tick on timeout"),
        }
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, rx) = mpsc::channel();
        tx.send(PadEvent::Resize).unwrap();
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(10));
        let runner = Runner::new(es, ticker);

        match runner.step() {
            PadEvent::Resize => {}
            _ => panic!("expected Resize event"),
        }
    }

    #[test]
    fn step_passes_through_mouse_events() {
        let (tx, rx) = mpsc::channel();
        tx.send(PadEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 3,
            row: 4,
            modifiers: KeyModifiers::NONE,
        }))
        .unwrap();
        let runner = Runner::new(
            TestEventSource::new(rx),
            FixedTicker::new(Duration::from_millis(10)),
        );

        match runner.step() {
            PadEvent::Mouse(m) => assert_eq!((m.column, m.row), (3, 4)),
            _ => panic!("expected Mouse event"),
        }
    }

    #[test]
    fn ticks_keep_coming_under_constant_mouse_motion() {
        let (tx, rx) = mpsc::channel();
        let producer = std::thread::spawn(move || {
            let start = Instant::now();
            while start.elapsed() < Duration::from_millis(480) {
                let moved = PadEvent::Mouse(MouseEvent {
                    kind: MouseEventKind::Moved,
                    column: 1,
                    row: 1,
                    modifiers: KeyModifiers::NONE,
                });
                if tx.send(moved).is_err() {
                    break;
                }
                std::thread::sleep(Duration::from_millis(4));
            }
        });
        let runner = Runner::new(
            TestEventSource::new(rx),
            FixedTicker::new(Duration::from_millis(16)),
        );

        let (mut ticks, mut moves) = (0, 0);
        let start = Instant::now();
        while start.elapsed() < Duration::from_millis(480) {
            match runner.step() {
                PadEvent::Tick => ticks += 1,
                PadEvent::Mouse(_) => moves += 1,
                _ => {}
            }
        }
        producer.join().unwrap();

        assert!(moves > 0);
        // ~30 frames in 480 ms; leave room for a slow scheduler
        assert!(ticks >= 10, "ticks={ticks} mouse_events={moves}");
    }

    #[test]
    fn tick_due_before_pending_input() {
        let (tx, rx) = mpsc::channel();
        let runner = Runner::new(
            TestEventSource::new(rx),
            FixedTicker::new(Duration::from_millis(5)),
        );
        std::thread::sleep(Duration::from_millis(10));
        tx.send(PadEvent::Resize).unwrap();

        assert!(matches!(runner.step(), PadEvent::Tick));
        assert!(matches!(runner.step(), PadEvent::Resize));
    }

    #[test]
    fn disconnected_source_ticks() {
        let (tx, rx) = mpsc::channel::<PadEvent>();
        drop(tx);
        let runner = Runner::new(
            TestEventSource::new(rx),
            FixedTicker::new(Duration::from_millis(10)),
        );
        assert!(matches!(runner.step(), PadEvent::Tick));
    }
}
