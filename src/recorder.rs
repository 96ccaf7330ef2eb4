use crate::geometry::distance;
use crate::signature::{Point, Segment, SignatureData, Stroke};
use log::debug;

/// Capture state machine: pointer down/move/up into strokes, with running totals.
///
/// The recorder never draws; `begin` and `extend` hand back the segment that became
/// visible so the caller can queue it on a surface.
#[derive(Debug, Default)]
pub struct StrokeRecorder {
    signature: SignatureData,
    current: Option<Stroke>,
    started: bool,
}

impl StrokeRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pen down. Opens a stroke unless one is already open, in which case the point
    /// simply continues it.
    pub fn begin(&mut self, point: Point) -> Option<Segment> {
        if self.current.is_some() {
            debug!("begin while a stroke is open, continuing it");
            return self.extend(point);
        }

        let point = self.sanitize(point)?;
        if !self.started {
            self.signature.start_time = point.timestamp;
            self.started = true;
        }

        self.current = Some(Stroke::new(point));
        Some(Segment::dot(point))
    }

    /// Pen move. Ignored when no stroke is open.
    pub fn extend(&mut self, point: Point) -> Option<Segment> {
        if self.current.is_none() {
            debug!("extend without an open stroke ignored");
            return None;
        }

        let point = self.sanitize(point)?;
        let stroke = self.current.as_mut()?;
        let last = *stroke.last_point()?;

        self.signature.total_distance += distance(&last, &point);
        stroke.push(point);

        Some(Segment::line(last, point))
    }

    /// Pen up, pointer leave and pointer cancel all land here.
    pub fn end(&mut self) {
        let Some(stroke) = self.current.take() else {
            return;
        };

        self.signature.end_time = stroke.end_time;
        self.signature.strokes.push(stroke);
        self.signature.stroke_count = self.signature.strokes.len();
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Drops points that cannot be drawn and clamps timestamps that run backwards.
    fn sanitize(&self, mut point: Point) -> Option<Point> {
        if !point.is_finite() {
            debug!("dropping non-finite point ({}, {})", point.x, point.y);
            return None;
        }

        if let Some(last) = self.last_timestamp() {
            if point.timestamp < last {
                point.timestamp = last;
            }
        }

        Some(point)
    }

    pub fn signature(&self) -> &SignatureData {
        &self.signature
    }

    /// Frozen copy of the closed strokes, for replay or scoring.
    pub fn snapshot(&self) -> SignatureData {
        self.signature.clone()
    }

    pub fn current_stroke(&self) -> Option<&Stroke> {
        self.current.as_ref()
    }

    /// Closed strokes followed by the open one, if any. Used for full redraws.
    pub fn strokes_including_current(&self) -> impl Iterator<Item = &Stroke> {
        self.signature.strokes.iter().chain(self.current.iter())
    }

    pub fn is_capturing(&self) -> bool {
        self.current.is_some()
    }

    pub fn has_started(&self) -> bool {
        self.started
    }

    /// True when nothing has been recorded, open stroke included.
    pub fn is_empty(&self) -> bool {
        self.signature.is_empty() && self.current.is_none()
    }

    pub fn stroke_count(&self) -> usize {
        self.signature.stroke_count
    }

    pub fn total_distance(&self) -> f64 {
        self.signature.total_distance
    }

    pub fn total_points(&self) -> usize {
        self.strokes_including_current().map(Stroke::len).sum()
    }

    pub fn start_time(&self) -> Option<u64> {
        self.started.then_some(self.signature.start_time)
    }

    /// Most recent timestamp, open stroke first.
    pub fn last_timestamp(&self) -> Option<u64> {
        if let Some(stroke) = &self.current {
            return Some(stroke.end_time);
        }
        self.signature.strokes.last().map(|s| s.end_time)
    }
}
