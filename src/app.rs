use std::sync::mpsc::Receiver;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use log::{debug, info};
use ratatui::layout::Rect;

use crate::config::Config;
use crate::error::SubmitError;
use crate::features::FeatureSummary;
use crate::geometry::{to_local, Bounds};
use crate::recorder::StrokeRecorder;
use crate::replay::{next_preset, previous_preset, ReplayEngine, ReplayEvent, ReplayState};
use crate::scheduler::{Clock, FrameQueue, SystemClock};
use crate::signature::Point;
use crate::surface::{RenderTarget, SurfaceAdapter, SurfaceUser};
use crate::ui::ScreenLayout;
use crate::verification::{RandomScorer, Scorer, VerificationMode, VerificationResult, Verifier};

/// Logical units per terminal cell, the braille dot grid.
pub const CELL_DOTS: (f64, f64) = (2.0, 4.0);
pub const NOTICE_TTL_MS: u64 = 3000;
const THRESHOLD_STEP: u8 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum Mode {
    Capture,
    Replay,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
    pub expires_at: u64,
}

/// What the main loop should do after an input event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// The signature pad: capture, live features, replay and verification on one surface.
///
/// All state changes happen through `on_mouse`, `on_key` and `on_tick`, called from a
/// single event loop. The surface belongs to either the capture path or the replay
/// path; switching clears it and hands it over.
pub struct App<C: Clock + Clone = SystemClock> {
    pub config: Config,
    clock: C,
    recorder: StrokeRecorder,
    surface: SurfaceAdapter,
    replay: ReplayEngine<C, FrameQueue>,
    replay_events: Receiver<ReplayEvent>,
    replay_state: ReplayState,
    replay_percent: f64,
    verifier: Verifier<Box<dyn Scorer>>,
    features: FeatureSummary,
    last_result: Option<VerificationResult>,
    notice: Option<Notice>,
    mode: Mode,
    threshold: u8,
    verification_mode: VerificationMode,
    pad: Option<Rect>,
}

impl App<SystemClock> {
    pub fn new(config: Config) -> Self {
        Self::with_parts(config, SystemClock::new(), Box::new(RandomScorer::new()))
    }
}

impl<C: Clock + Clone> App<C> {
    pub fn with_parts(config: Config, clock: C, scorer: Box<dyn Scorer>) -> Self {
        let mut replay = ReplayEngine::new(clock.clone(), FrameQueue::new());
        replay.set_speed(config.speed);
        let replay_events = replay.subscribe();

        Self {
            surface: SurfaceAdapter::new(config.surface_style()),
            verifier: Verifier::new(scorer, config.verification_delay_ms),
            threshold: config.threshold.min(100),
            verification_mode: config.mode,
            config,
            clock,
            recorder: StrokeRecorder::new(),
            replay,
            replay_events,
            replay_state: ReplayState::Idle,
            replay_percent: 0.0,
            features: FeatureSummary::empty(),
            last_result: None,
            notice: None,
            mode: Mode::Capture,
            pad: None,
        }
    }

    /// Lay out the screen for a terminal of `area` and fit the surface to the pad.
    pub fn resize(&mut self, area: Rect) {
        let pad = ScreenLayout::new(area).pad_inner;
        if self.pad == Some(pad) {
            return;
        }

        self.pad = Some(pad);
        self.surface.configure(
            f64::from(pad.width) * CELL_DOTS.0,
            f64::from(pad.height) * CELL_DOTS.1,
            self.config.pixel_density,
        );
        self.repaint();
    }

    /// Rebuild the surface from whichever path owns it.
    fn repaint(&mut self) {
        match self.mode {
            Mode::Capture => {
                self.surface.redraw_all(
                    self.recorder
                        .strokes_including_current()
                        .map(|s| s.points.as_slice()),
                );
                self.take_surface(SurfaceUser::Capture);
            }
            Mode::Replay => {
                self.replay.redraw(&mut self.surface);
                self.take_surface(SurfaceUser::Replay);
            }
        }
    }

    fn take_surface(&mut self, user: SurfaceUser) -> bool {
        let taken = self.surface.claim(user);
        if !taken {
            debug!("surface held by {:?}, {user:?} refused", self.surface.user());
        }
        taken
    }

    pub fn on_mouse(&mut self, mouse: MouseEvent) {
        if self.mode != Mode::Capture {
            debug!("pointer input ignored during replay");
            return;
        }

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(point) = self.pointer_point(mouse.column, mouse.row) {
                    if !self.take_surface(SurfaceUser::Capture) {
                        return;
                    }
                    if let Some(segment) = self.recorder.begin(point) {
                        self.surface.queue_segment(segment);
                    }
                    self.refresh_features();
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                match self.pointer_point(mouse.column, mouse.row) {
                    Some(point) => {
                        if let Some(segment) = self.recorder.extend(point) {
                            self.surface.queue_segment(segment);
                        }
                    }
                    // left the pad
                    None => self.recorder.end(),
                }
                self.refresh_features();
            }
            MouseEventKind::Up(MouseButton::Left) => {
                self.recorder.end();
                self.refresh_features();
            }
            _ => {}
        }
    }

    /// Cell centre of (`column`, `row`) in the pad's logical space, or `None` off the pad.
    fn pointer_point(&self, column: u16, row: u16) -> Option<Point> {
        let pad = self.pad?;
        let bounds = Bounds::new(
            f64::from(pad.x),
            f64::from(pad.y),
            f64::from(pad.width),
            f64::from(pad.height),
        );
        let (x, y) = (f64::from(column) + 0.5, f64::from(row) + 0.5);
        if !bounds.contains(x, y) {
            return None;
        }

        to_local(x, y, bounds, self.surface.logical_size(), self.clock.now_ms())
    }

    fn refresh_features(&mut self) {
        self.features = FeatureSummary::from_recorder(&self.recorder, self.config.synthetic_pressure);
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Control {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Control::Quit;
        }

        match key.code {
            KeyCode::Esc => return Control::Quit,
            KeyCode::Char('c') => self.clear(),
            KeyCode::Char('p') => {
                if let Err(e) = self.start_replay() {
                    self.warn("Replay", e);
                }
            }
            KeyCode::Char(' ') => self.toggle_playback(),
            KeyCode::Char('r') => self.reset_replay(),
            KeyCode::Char('d') => self.back_to_capture(),
            KeyCode::Char('+') | KeyCode::Char('=') => self.set_speed(next_preset(self.speed())),
            KeyCode::Char('-') => self.set_speed(previous_preset(self.speed())),
            KeyCode::Char('v') => {
                if let Err(e) = self.verify() {
                    self.warn("Verification", e);
                }
            }
            KeyCode::Char('m') => self.verification_mode = self.verification_mode.next(),
            KeyCode::Char('[') => self.threshold = self.threshold.saturating_sub(THRESHOLD_STEP),
            KeyCode::Char(']') => self.threshold = (self.threshold + THRESHOLD_STEP).min(100),
            _ => {}
        }

        self.drain_replay_events();
        Control::Continue
    }

    /// One display frame: draw queued capture segments, advance replay, collect a
    /// finished verification and expire the notice.
    pub fn on_tick(&mut self) {
        self.surface.flush();
        self.replay.pump(&mut self.surface);
        self.drain_replay_events();

        let now = self.clock.now_ms();
        if let Some(result) = self.verifier.poll(now) {
            let level = if result.success {
                NoticeLevel::Success
            } else {
                NoticeLevel::Error
            };
            let message = format!(
                "match {}% against a threshold of {}%",
                result.match_score, result.threshold
            );
            self.notify(level, result.message(), message);
            self.last_result = Some(result);
        }

        if self.notice.as_ref().is_some_and(|n| n.expires_at <= now) {
            self.notice = None;
        }
    }

    fn drain_replay_events(&mut self) {
        while let Ok(event) = self.replay_events.try_recv() {
            match event {
                ReplayEvent::StateChanged(state) => self.replay_state = state,
                ReplayEvent::Progress(percent) => self.replay_percent = percent,
                ReplayEvent::Completed => {
                    self.notify(NoticeLevel::Info, "Replay", "replay complete".to_string())
                }
            }
        }
    }

    /// Discard the signature and everything derived from it.
    pub fn clear(&mut self) {
        self.replay.reset(&mut self.surface);
        self.mode = Mode::Capture;
        self.recorder.clear();
        self.surface.clear();
        self.take_surface(SurfaceUser::Capture);
        self.verifier.cancel();
        self.features = FeatureSummary::empty();
        self.last_result = None;
        info!("signature cleared");
        self.notify(NoticeLevel::Success, "Cleared", "signature cleared".to_string());
    }

    /// Hand a frozen copy of the signature to the replay engine and play it from the
    /// start on a blank surface.
    pub fn start_replay(&mut self) -> Result<(), SubmitError> {
        if self.recorder.is_capturing() {
            return Err(SubmitError::StrokeInProgress);
        }
        let signature = self.recorder.snapshot();
        if signature.is_empty() {
            return Err(SubmitError::EmptySignature);
        }

        self.replay.reset(&mut self.surface);
        self.take_surface(SurfaceUser::Replay);
        self.replay.load(signature);
        self.replay.play();
        self.mode = Mode::Replay;
        self.drain_replay_events();
        Ok(())
    }

    /// Space: pause, resume, or start over once finished.
    pub fn toggle_playback(&mut self) {
        if self.mode != Mode::Replay {
            if let Err(e) = self.start_replay() {
                self.warn("Replay", e);
            }
            return;
        }

        match self.replay.state() {
            ReplayState::Playing => self.replay.pause(),
            ReplayState::Paused | ReplayState::Idle => {
                if self.take_surface(SurfaceUser::Replay) {
                    self.replay.play();
                }
            }
            ReplayState::Completed => {
                self.replay.reset(&mut self.surface);
                if self.take_surface(SurfaceUser::Replay) {
                    self.replay.play();
                }
            }
        }
        self.drain_replay_events();
    }

    /// Rewind to a blank pad, staying in replay.
    pub fn reset_replay(&mut self) {
        if self.mode != Mode::Replay {
            return;
        }
        self.replay.reset(&mut self.surface);
        self.take_surface(SurfaceUser::Replay);
        self.drain_replay_events();
    }

    /// Leave replay and show the captured signature again.
    pub fn back_to_capture(&mut self) {
        if self.mode != Mode::Replay {
            return;
        }
        self.replay.reset(&mut self.surface);
        self.mode = Mode::Capture;
        self.repaint();
        self.drain_replay_events();
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.replay.set_speed(speed);
        self.config.speed = self.replay.speed();
    }

    /// Submit a frozen copy of the signature for scoring. The result shows up on a
    /// later tick.
    pub fn verify(&mut self) -> Result<(), SubmitError> {
        if self.recorder.is_capturing() {
            return Err(SubmitError::StrokeInProgress);
        }
        self.verifier.submit(
            self.recorder.snapshot(),
            self.verification_mode,
            self.threshold,
            self.clock.now_ms(),
        )?;
        self.last_result = None;
        Ok(())
    }

    pub fn notify(&mut self, level: NoticeLevel, title: &str, message: String) {
        self.notice = Some(Notice {
            level,
            title: title.to_string(),
            message,
            expires_at: self.clock.now_ms() + NOTICE_TTL_MS,
        });
    }

    fn warn(&mut self, title: &str, error: SubmitError) {
        self.notify(NoticeLevel::Warning, title, error.to_string());
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn recorder(&self) -> &StrokeRecorder {
        &self.recorder
    }

    pub fn surface(&self) -> &SurfaceAdapter {
        &self.surface
    }

    pub fn replay(&self) -> &ReplayEngine<C, FrameQueue> {
        &self.replay
    }

    /// Last replay state seen on the event channel.
    pub fn replay_state(&self) -> ReplayState {
        self.replay_state
    }

    pub fn replay_percent(&self) -> f64 {
        self.replay_percent
    }

    pub fn speed(&self) -> f64 {
        self.replay.speed()
    }

    pub fn features(&self) -> &FeatureSummary {
        &self.features
    }

    pub fn verifier(&self) -> &Verifier<Box<dyn Scorer>> {
        &self.verifier
    }

    pub fn last_result(&self) -> Option<&VerificationResult> {
        self.last_result.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    pub fn verification_mode(&self) -> VerificationMode {
        self.verification_mode
    }

    pub fn pad(&self) -> Option<Rect> {
        self.pad
    }
}
