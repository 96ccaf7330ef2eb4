use serde::{Deserialize, Serialize};

/// A single sampled pen position in logical canvas units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    /// milliseconds on the capture clock
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
}

impl Point {
    pub fn new(x: f64, y: f64, timestamp: u64) -> Self {
        Self {
            x,
            y,
            timestamp,
            pressure: None,
        }
    }

    pub fn with_pressure(mut self, pressure: f64) -> Self {
        self.pressure = Some(pressure);
        self
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// The piece of ink added by one new point: a line from the previous point of the same
/// stroke, or a dot when the point opens a stroke.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub from: Option<Point>,
    pub to: Point,
}

impl Segment {
    pub fn dot(to: Point) -> Self {
        Self { from: None, to }
    }

    pub fn line(from: Point, to: Point) -> Self {
        Self {
            from: Some(from),
            to,
        }
    }
}

/// One pen-down .. pen-up run of points.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub points: Vec<Point>,
    pub start_time: u64,
    pub end_time: u64,
}

impl Stroke {
    pub fn new(first: Point) -> Self {
        Self {
            points: vec![first],
            start_time: first.timestamp,
            end_time: first.timestamp,
        }
    }

    pub fn push(&mut self, point: Point) {
        self.end_time = point.timestamp;
        self.points.push(point);
    }

    pub fn last_point(&self) -> Option<&Point> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// The recorded signature: strokes in capture order plus running totals.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SignatureData {
    pub strokes: Vec<Stroke>,
    pub start_time: u64,
    pub end_time: u64,
    pub total_distance: f64,
    pub stroke_count: usize,
}

impl SignatureData {
    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    pub fn total_points(&self) -> usize {
        self.strokes.iter().map(Stroke::len).sum()
    }

    pub fn duration_ms(&self) -> u64 {
        self.end_time.saturating_sub(self.start_time)
    }

    /// Iterate every point in recording order.
    pub fn points(&self) -> impl Iterator<Item = &Point> {
        self.strokes.iter().flat_map(|s| s.points.iter())
    }
}
