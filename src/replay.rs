use std::sync::mpsc::{self, Receiver, Sender};

use log::{debug, info};

use crate::scheduler::{Clock, FrameScheduler, FrameToken};
use crate::signature::{Point, SignatureData};
use crate::surface::RenderTarget;
use crate::util::ratio;

/// Speeds offered by the UI, slowest first.
pub const SPEED_PRESETS: [f64; 6] = [0.25, 0.5, 1.0, 1.5, 2.0, 3.0];

pub const DEFAULT_SPEED: f64 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum ReplayState {
    Idle,
    Playing,
    Paused,
    Completed,
}

/// Observable changes, delivered to every subscriber in order.
#[derive(Clone, Debug, PartialEq)]
pub enum ReplayEvent {
    StateChanged(ReplayState),
    /// percent, 0..=100
    Progress(f64),
    Completed,
}

/// Next faster preset, or the fastest one.
pub fn next_preset(speed: f64) -> f64 {
    SPEED_PRESETS
        .iter()
        .copied()
        .find(|&s| s > speed + f64::EPSILON)
        .unwrap_or(SPEED_PRESETS[SPEED_PRESETS.len() - 1])
}

/// Next slower preset, or the slowest one.
pub fn previous_preset(speed: f64) -> f64 {
    SPEED_PRESETS
        .iter()
        .rev()
        .copied()
        .find(|&s| s < speed - f64::EPSILON)
        .unwrap_or(SPEED_PRESETS[0])
}

/// Plays a recorded signature back on a virtual clock.
///
/// Virtual time runs at `speed` times wall time while playing and stands still while
/// paused. Each frame, every point whose offset from the signature start has been
/// reached is drawn, strictly in recording order. Frames are requested through the
/// scheduler and stamped with a token; a frame that arrives with any other token than
/// the one last requested (for example one scheduled before a reset) does nothing.
pub struct ReplayEngine<C: Clock, S: FrameScheduler> {
    clock: C,
    scheduler: S,
    signature: Option<SignatureData>,
    total_points: usize,
    state: ReplayState,
    stroke_idx: usize,
    point_idx: usize,
    due_points: usize,
    /// virtual ms accumulated before the current playing stretch
    accumulated_ms: f64,
    /// wall ms when the current playing stretch began
    resumed_at: Option<u64>,
    speed: f64,
    session: u64,
    sequence: u64,
    pending: Option<FrameToken>,
    subscribers: Vec<Sender<ReplayEvent>>,
}

impl<C: Clock, S: FrameScheduler> ReplayEngine<C, S> {
    pub fn new(clock: C, scheduler: S) -> Self {
        Self {
            clock,
            scheduler,
            signature: None,
            total_points: 0,
            state: ReplayState::Idle,
            stroke_idx: 0,
            point_idx: 0,
            due_points: 0,
            accumulated_ms: 0.0,
            resumed_at: None,
            speed: DEFAULT_SPEED,
            session: 0,
            sequence: 0,
            pending: None,
            subscribers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self) -> Receiver<ReplayEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// Attach a frozen signature. Only accepted while idle.
    pub fn load(&mut self, signature: SignatureData) -> bool {
        if self.state != ReplayState::Idle {
            debug!("load ignored in state {}", self.state);
            return false;
        }

        self.total_points = signature.total_points();
        self.signature = Some(signature);
        self.rewind();
        true
    }

    pub fn play(&mut self) {
        match self.state {
            ReplayState::Idle => {
                let has_strokes = self.signature.as_ref().is_some_and(|s| !s.is_empty());
                if !has_strokes {
                    debug!("play ignored, nothing to replay");
                    return;
                }

                self.rewind();
                if self.total_points == 0 {
                    self.set_state(ReplayState::Completed);
                    self.emit(ReplayEvent::Progress(0.0));
                    self.emit(ReplayEvent::Completed);
                    return;
                }

                self.resumed_at = Some(self.clock.now_ms());
                self.set_state(ReplayState::Playing);
                self.schedule();
            }
            ReplayState::Paused => {
                self.resumed_at = Some(self.clock.now_ms());
                self.set_state(ReplayState::Playing);
                self.schedule();
            }
            ReplayState::Playing | ReplayState::Completed => {
                debug!("play ignored in state {}", self.state);
            }
        }
    }

    pub fn pause(&mut self) {
        if self.state != ReplayState::Playing {
            debug!("pause ignored in state {}", self.state);
            return;
        }

        self.accumulated_ms = self.elapsed_ms();
        self.resumed_at = None;
        self.cancel_pending();
        self.set_state(ReplayState::Paused);
    }

    /// Back to idle from anywhere, with a blank surface. The signature stays loaded.
    pub fn reset<T: RenderTarget>(&mut self, target: &mut T) {
        self.cancel_pending();
        self.session += 1;
        self.rewind();
        target.clear();

        if self.state != ReplayState::Idle {
            self.set_state(ReplayState::Idle);
        }
        self.emit(ReplayEvent::Progress(0.0));
    }

    /// Change how fast virtual time runs from now on. Time already elapsed keeps the
    /// speed it was played at. Non-positive or non-finite values are ignored.
    pub fn set_speed(&mut self, multiplier: f64) {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            debug!("set_speed ignored for {multiplier}");
            return;
        }

        if self.state == ReplayState::Playing {
            let now = self.clock.now_ms();
            self.accumulated_ms = self.elapsed_at(now);
            self.resumed_at = Some(now);
        }
        self.speed = multiplier;
    }

    /// Fire the scheduler's due frame, if any. Returns whether a frame fired.
    pub fn pump<T: RenderTarget>(&mut self, target: &mut T) -> bool {
        match self.scheduler.take_due() {
            Some(token) => {
                self.on_frame(token, target);
                true
            }
            None => false,
        }
    }

    /// Frame callback. Stale tokens are dropped.
    pub fn on_frame<T: RenderTarget>(&mut self, token: FrameToken, target: &mut T) {
        if self.state != ReplayState::Playing || self.pending != Some(token) {
            debug!("stale frame {token:?} ignored");
            return;
        }
        self.pending = None;

        self.advance(target);

        if self.state == ReplayState::Playing {
            self.schedule();
        }
    }

    fn advance<T: RenderTarget>(&mut self, target: &mut T) {
        let elapsed = self.elapsed_ms();
        let Some(signature) = self.signature.as_ref() else {
            return;
        };

        let before = self.due_points;
        while let Some(stroke) = signature.strokes.get(self.stroke_idx) {
            let Some(point) = stroke.points.get(self.point_idx) else {
                self.stroke_idx += 1;
                self.point_idx = 0;
                continue;
            };

            let offset = point.timestamp.saturating_sub(signature.start_time) as f64;
            if elapsed < offset {
                break;
            }

            let prev = if self.point_idx == 0 {
                None
            } else {
                stroke.points.get(self.point_idx - 1)
            };
            target.draw_segment(prev, point);

            self.point_idx += 1;
            self.due_points += 1;
        }

        if self.due_points != before {
            self.emit(ReplayEvent::Progress(self.progress_percent()));
        }

        if self.due_points >= self.total_points {
            self.resumed_at = None;
            self.accumulated_ms = elapsed;
            self.set_state(ReplayState::Completed);
            self.emit(ReplayEvent::Completed);
        }
    }

    /// Repaint the already-due part of the signature, e.g. after the surface was
    /// reconfigured.
    pub fn redraw<T: RenderTarget>(&self, target: &mut T) {
        let Some(signature) = self.signature.as_ref() else {
            target.clear();
            return;
        };

        let done = signature.strokes.iter().take(self.stroke_idx);
        let partial = signature.strokes.get(self.stroke_idx);
        let slices = done
            .map(|s| s.points.as_slice())
            .chain(partial.map(|s| &s.points[..self.point_idx.min(s.points.len())]));
        target.redraw_all(slices);
    }

    /// Points drawn so far, in recording order.
    pub fn due_points(&self) -> impl Iterator<Item = &Point> {
        self.signature
            .iter()
            .flat_map(|s| s.points())
            .take(self.due_points)
    }

    fn rewind(&mut self) {
        self.stroke_idx = 0;
        self.point_idx = 0;
        self.due_points = 0;
        self.accumulated_ms = 0.0;
        self.resumed_at = None;
    }

    fn schedule(&mut self) {
        self.sequence += 1;
        let token = FrameToken {
            session: self.session,
            sequence: self.sequence,
        };
        self.pending = Some(token);
        self.scheduler.request_frame(token);
    }

    fn cancel_pending(&mut self) {
        if let Some(token) = self.pending.take() {
            self.scheduler.cancel_frame(token);
        }
    }

    fn set_state(&mut self, state: ReplayState) {
        info!("replay {} -> {}", self.state, state);
        self.state = state;
        self.emit(ReplayEvent::StateChanged(state));
    }

    fn emit(&mut self, event: ReplayEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn elapsed_at(&self, now: u64) -> f64 {
        match self.resumed_at {
            Some(resumed) => {
                self.accumulated_ms + now.saturating_sub(resumed) as f64 * self.speed
            }
            None => self.accumulated_ms,
        }
    }

    /// Virtual milliseconds since the start of the signature.
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_at(self.clock.now_ms())
    }

    pub fn state(&self) -> ReplayState {
        self.state
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn is_loaded(&self) -> bool {
        self.signature.is_some()
    }

    pub fn signature(&self) -> Option<&SignatureData> {
        self.signature.as_ref()
    }

    pub fn total_points(&self) -> usize {
        self.total_points
    }

    pub fn due_count(&self) -> usize {
        self.due_points
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.signature.as_ref().map_or(0, SignatureData::duration_ms)
    }

    /// Fraction of points drawn, 0 when there are none.
    pub fn progress(&self) -> f64 {
        ratio(self.due_points, self.total_points)
    }

    pub fn progress_percent(&self) -> f64 {
        self.progress() * 100.0
    }

    pub fn pending_frame(&self) -> Option<FrameToken> {
        self.pending
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::{FrameQueue, ManualClock};
    use crate::signature::Stroke;
    use assert_matches::assert_matches;

    /// Records every draw call instead of rasterising.
    #[derive(Default)]
    struct Recording {
        draws: Vec<(Option<Point>, Point)>,
        clears: usize,
    }

    impl RenderTarget for Recording {
        fn draw_segment(&mut self, from: Option<&Point>, to: &Point) {
            self.draws.push((from.copied(), *to));
        }

        fn clear(&mut self) {
            self.draws.clear();
            self.clears += 1;
        }
    }

    fn stroke(points: &[(f64, f64, u64)]) -> Stroke {
        let mut iter = points.iter().map(|&(x, y, t)| Point::new(x, y, t));
        let mut stroke = Stroke::new(iter.next().unwrap());
        iter.for_each(|p| stroke.push(p));
        stroke
    }

    fn signature(strokes: Vec<Stroke>) -> SignatureData {
        let start_time = strokes.first().map_or(0, |s| s.start_time);
        let end_time = strokes.last().map_or(0, |s| s.end_time);
        SignatureData {
            stroke_count: strokes.len(),
            strokes,
            start_time,
            end_time,
            total_distance: 0.0,
        }
    }

    /// Two strokes of three points at 0/100/200 and 300/400/500 ms, offset by 1000.
    fn two_strokes() -> SignatureData {
        signature(vec![
            stroke(&[(0.0, 0.0, 1000), (1.0, 0.0, 1100), (2.0, 0.0, 1200)]),
            stroke(&[(0.0, 5.0, 1300), (1.0, 5.0, 1400), (2.0, 5.0, 1500)]),
        ])
    }

    fn engine(clock: &ManualClock) -> ReplayEngine<ManualClock, FrameQueue> {
        ReplayEngine::new(clock.clone(), FrameQueue::new())
    }

    /// Advance the clock in frame-sized steps, pumping each frame, until not playing.
    fn run_to_end(
        clock: &ManualClock,
        engine: &mut ReplayEngine<ManualClock, FrameQueue>,
        target: &mut Recording,
        frame_ms: u64,
    ) -> u64 {
        let start = clock.now_ms();
        for _ in 0..100_000 {
            engine.pump(target);
            if engine.state() != ReplayState::Playing {
                break;
            }
            clock.advance(frame_ms);
        }
        clock.now_ms() - start
    }

    #[test]
    fn test_initial_state() {
        let clock = ManualClock::new(0);
        let engine = engine(&clock);
        assert_eq!(engine.state(), ReplayState::Idle);
        assert_eq!(engine.speed(), 1.0);
        assert_eq!(engine.progress(), 0.0);
        assert!(!engine.is_loaded());
    }

    #[test]
    fn test_play_without_signature_is_noop() {
        let clock = ManualClock::new(0);
        let mut engine = engine(&clock);
        engine.play();
        assert_eq!(engine.state(), ReplayState::Idle);
        assert_eq!(engine.pending_frame(), None);
    }

    #[test]
    fn test_play_with_zero_strokes_is_noop() {
        let clock = ManualClock::new(0);
        let mut engine = engine(&clock);
        assert!(engine.load(SignatureData::default()));
        engine.play();
        assert_eq!(engine.state(), ReplayState::Idle);
    }

    #[test]
    fn test_strokes_without_points_complete_immediately() {
        let clock = ManualClock::new(0);
        let mut engine = engine(&clock);
        let empty = Stroke {
            points: vec![],
            start_time: 0,
            end_time: 0,
        };
        engine.load(signature(vec![empty]));
        let events = engine.subscribe();

        engine.play();

        assert_eq!(engine.state(), ReplayState::Completed);
        assert_eq!(engine.progress(), 0.0);
        let received: Vec<_> = events.try_iter().collect();
        assert!(received.contains(&ReplayEvent::Completed));
    }

    #[test]
    fn test_scenario_two_strokes_at_speed_one() {
        let clock = ManualClock::new(50_000);
        let mut engine = engine(&clock);
        let mut target = Recording::default();
        engine.load(two_strokes());
        engine.play();

        clock.advance(200);
        engine.pump(&mut target);
        assert_eq!(target.draws.len(), 3);
        assert_eq!(engine.state(), ReplayState::Playing);

        clock.advance(299);
        engine.pump(&mut target);
        assert_eq!(target.draws.len(), 5);
        assert_eq!(engine.state(), ReplayState::Playing);

        clock.advance(1);
        engine.pump(&mut target);
        assert_eq!(target.draws.len(), 6);
        assert_eq!(engine.state(), ReplayState::Completed);
        assert_eq!(engine.progress_percent(), 100.0);
        assert_eq!(engine.pending_frame(), None);

        // strokes are not joined: first point of each stroke is a dot
        assert_eq!(target.draws[0].0, None);
        assert_eq!(target.draws[3].0, None);
        assert_eq!(target.draws[4].0, Some(Point::new(0.0, 5.0, 1300)));
    }

    #[test]
    fn test_never_completes_before_duration() {
        let clock = ManualClock::new(0);
        let mut engine = engine(&clock);
        let mut target = Recording::default();
        engine.load(two_strokes());
        engine.play();

        let wall = run_to_end(&clock, &mut engine, &mut target, 16);

        assert_eq!(target.draws.len(), 6);
        assert!(wall >= 500);
        assert!(wall < 500 + 16);
    }

    #[test]
    fn test_progress_reports_fraction() {
        let clock = ManualClock::new(0);
        let mut engine = engine(&clock);
        let mut target = Recording::default();
        engine.load(two_strokes());
        engine.play();

        engine.pump(&mut target);
        assert!((engine.progress() - 1.0 / 6.0).abs() < 1e-9);

        clock.advance(300);
        engine.pump(&mut target);
        assert!((engine.progress() - 4.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_pause_freezes_elapsed() {
        let clock = ManualClock::new(0);
        let mut engine = engine(&clock);
        let mut target = Recording::default();
        engine.load(two_strokes());
        engine.play();

        clock.advance(150);
        engine.pump(&mut target);
        engine.pause();
        assert_eq!(engine.state(), ReplayState::Paused);
        assert_eq!(engine.pending_frame(), None);

        clock.advance(10_000);
        assert_eq!(engine.elapsed_ms(), 150.0);
        assert!(!engine.pump(&mut target));
        assert_eq!(target.draws.len(), 2);

        engine.play();
        assert_eq!(engine.elapsed_ms(), 150.0);
        clock.advance(50);
        engine.pump(&mut target);
        assert_eq!(target.draws.len(), 3);
    }

    #[test]
    fn test_pause_resume_matches_uninterrupted_drawing() {
        let clock = ManualClock::new(0);
        let mut uninterrupted = engine(&clock);
        let mut expected = Recording::default();
        uninterrupted.load(two_strokes());
        uninterrupted.play();
        run_to_end(&clock, &mut uninterrupted, &mut expected, 16);

        let mut paused = engine(&clock);
        let mut actual = Recording::default();
        paused.load(two_strokes());
        paused.play();
        for step in 0..200 {
            paused.pump(&mut actual);
            if paused.state() == ReplayState::Completed {
                break;
            }
            if step % 5 == 0 {
                paused.pause();
                clock.advance(333);
                paused.play();
            }
            clock.advance(16);
        }

        assert_eq!(paused.state(), ReplayState::Completed);
        assert_eq!(actual.draws, expected.draws);
    }

    #[test]
    fn test_double_speed_halves_wall_time() {
        let clock = ManualClock::new(0);
        let mut normal = engine(&clock);
        let mut target = Recording::default();
        normal.load(two_strokes());
        normal.play();
        let wall_normal = run_to_end(&clock, &mut normal, &mut target, 1);

        let mut fast = engine(&clock);
        let mut target = Recording::default();
        fast.load(two_strokes());
        fast.set_speed(2.0);
        fast.play();
        let wall_fast = run_to_end(&clock, &mut fast, &mut target, 1);

        assert_eq!(wall_normal, 500);
        assert_eq!(wall_fast, 250);
    }

    #[test]
    fn test_speed_change_is_not_retroactive() {
        let clock = ManualClock::new(0);
        let mut engine = engine(&clock);
        engine.load(two_strokes());
        engine.play();

        clock.advance(100);
        engine.set_speed(3.0);
        assert_eq!(engine.elapsed_ms(), 100.0);

        clock.advance(100);
        assert_eq!(engine.elapsed_ms(), 400.0);
    }

    #[test]
    fn test_invalid_speed_ignored() {
        let clock = ManualClock::new(0);
        let mut engine = engine(&clock);
        engine.set_speed(0.0);
        engine.set_speed(-2.0);
        engine.set_speed(f64::NAN);
        assert_eq!(engine.speed(), 1.0);
    }

    #[test]
    fn test_reset_from_every_state() {
        for stop_in in [
            ReplayState::Idle,
            ReplayState::Playing,
            ReplayState::Paused,
            ReplayState::Completed,
        ] {
            let clock = ManualClock::new(0);
            let mut engine = engine(&clock);
            let mut target = Recording::default();
            engine.load(two_strokes());

            if stop_in != ReplayState::Idle {
                engine.play();
                clock.advance(250);
                engine.pump(&mut target);
            }
            if stop_in == ReplayState::Paused {
                engine.pause();
            }
            if stop_in == ReplayState::Completed {
                run_to_end(&clock, &mut engine, &mut target, 16);
            }
            assert_eq!(engine.state(), stop_in);

            engine.reset(&mut target);

            assert_eq!(engine.state(), ReplayState::Idle);
            assert_eq!(engine.progress(), 0.0);
            assert_eq!(engine.elapsed_ms(), 0.0);
            assert!(target.draws.is_empty());
            assert_eq!(target.clears, 1);
            assert_eq!(engine.pending_frame(), None);
            assert!(engine.is_loaded());
        }
    }

    #[test]
    fn test_stale_frame_after_reset_never_fires() {
        let clock = ManualClock::new(0);
        let mut engine = engine(&clock);
        let mut target = Recording::default();
        engine.load(two_strokes());
        engine.play();
        let stale = engine.pending_frame().unwrap();

        engine.reset(&mut target);
        engine.play();
        clock.advance(1000);

        engine.on_frame(stale, &mut target);
        assert!(target.draws.is_empty());

        let live = engine.pending_frame().unwrap();
        assert_ne!(live.session, stale.session);
        engine.on_frame(live, &mut target);
        assert_eq!(target.draws.len(), 6);
    }

    #[test]
    fn test_stale_frame_after_pause_never_fires() {
        let clock = ManualClock::new(0);
        let mut engine = engine(&clock);
        let mut target = Recording::default();
        engine.load(two_strokes());
        engine.play();
        let token = engine.pending_frame().unwrap();
        engine.pause();

        clock.advance(1000);
        engine.on_frame(token, &mut target);
        assert!(target.draws.is_empty());
    }

    #[test]
    fn test_invalid_state_calls_are_noops() {
        let clock = ManualClock::new(0);
        let mut engine = engine(&clock);
        let mut target = Recording::default();
        engine.pause();
        assert_eq!(engine.state(), ReplayState::Idle);

        engine.load(two_strokes());
        engine.play();
        engine.play();
        assert_eq!(engine.scheduler().requested(), 1);

        assert!(!engine.load(SignatureData::default()));
        assert_eq!(engine.total_points(), 6);

        run_to_end(&clock, &mut engine, &mut target, 16);
        engine.play();
        engine.pause();
        assert_eq!(engine.state(), ReplayState::Completed);
    }

    #[test]
    fn test_same_timestamp_points_keep_order() {
        let clock = ManualClock::new(0);
        let mut engine = engine(&clock);
        let mut target = Recording::default();
        engine.load(signature(vec![
            stroke(&[(0.0, 0.0, 0), (1.0, 0.0, 50), (2.0, 0.0, 50)]),
            stroke(&[(9.0, 9.0, 50)]),
        ]));
        engine.play();
        clock.advance(50);
        engine.pump(&mut target);

        let xs: Vec<f64> = target.draws.iter().map(|(_, p)| p.x).collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0, 9.0]);
    }

    #[test]
    fn test_pen_up_gap_is_replayed() {
        let clock = ManualClock::new(0);
        let mut engine = engine(&clock);
        let mut target = Recording::default();
        engine.load(signature(vec![
            stroke(&[(0.0, 0.0, 0)]),
            stroke(&[(5.0, 5.0, 2000)]),
        ]));
        engine.play();
        clock.advance(1999);
        engine.pump(&mut target);
        assert_eq!(target.draws.len(), 1);
        assert_eq!(engine.state(), ReplayState::Playing);
    }

    #[test]
    fn test_events_are_observable() {
        let clock = ManualClock::new(0);
        let mut engine = engine(&clock);
        let mut target = Recording::default();
        let events = engine.subscribe();
        engine.load(two_strokes());
        engine.play();
        run_to_end(&clock, &mut engine, &mut target, 100);

        let received: Vec<ReplayEvent> = events.try_iter().collect();
        assert_matches!(
            received.first(),
            Some(ReplayEvent::StateChanged(ReplayState::Playing))
        );
        assert_matches!(received.last(), Some(ReplayEvent::Completed));
        assert!(received.contains(&ReplayEvent::Progress(100.0)));
        assert!(received.contains(&ReplayEvent::StateChanged(ReplayState::Completed)));
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let clock = ManualClock::new(0);
        let mut engine = engine(&clock);
        drop(engine.subscribe());
        engine.load(two_strokes());
        engine.play();
        assert!(engine.subscribers.is_empty());
    }

    #[test]
    fn test_redraw_repaints_due_prefix() {
        let clock = ManualClock::new(0);
        let mut engine = engine(&clock);
        let mut target = Recording::default();
        engine.load(two_strokes());
        engine.play();
        clock.advance(350);
        engine.pump(&mut target);
        let drawn = target.draws.clone();

        let mut fresh = Recording::default();
        engine.redraw(&mut fresh);
        assert_eq!(fresh.draws, drawn);
        assert_eq!(engine.due_points().count(), 4);
    }

    #[test]
    fn test_reload_after_reset() {
        let clock = ManualClock::new(0);
        let mut engine = engine(&clock);
        let mut target = Recording::default();
        engine.load(two_strokes());
        engine.play();
        engine.reset(&mut target);

        let single = signature(vec![stroke(&[(1.0, 1.0, 10)])]);
        assert!(engine.load(single));
        assert_eq!(engine.total_points(), 1);
        assert_eq!(engine.total_duration_ms(), 0);
        engine.play();
        engine.pump(&mut target);
        assert_eq!(engine.state(), ReplayState::Completed);
    }

    #[test]
    fn test_presets() {
        assert_eq!(next_preset(1.0), 1.5);
        assert_eq!(next_preset(3.0), 3.0);
        assert_eq!(next_preset(0.7), 1.0);
        assert_eq!(previous_preset(1.0), 0.5);
        assert_eq!(previous_preset(0.25), 0.25);
        assert_eq!(previous_preset(2.2), 2.0);
    }
}
