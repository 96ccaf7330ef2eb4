use crate::signature::Point;

/// Screen-space rectangle of the drawing pad, in client units (terminal cells here).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn contains(&self, client_x: f64, client_y: f64) -> bool {
        client_x >= self.left
            && client_y >= self.top
            && client_x < self.left + self.width
            && client_y < self.top + self.height
    }
}

/// Map a client-space pointer position onto the canvas' logical coordinate space.
///
/// `logical_size` is the canvas size in logical units; the bounding box is stretched
/// onto it, which is the same as dividing backing pixels by the pixel density when the
/// backing store is `logical * density`. Returns `None` for a degenerate bounding box.
pub fn to_local(
    client_x: f64,
    client_y: f64,
    bounds: Bounds,
    logical_size: (f64, f64),
    timestamp: u64,
) -> Option<Point> {
    if bounds.width <= 0.0 || bounds.height <= 0.0 {
        return None;
    }

    let x = (client_x - bounds.left) * (logical_size.0 / bounds.width);
    let y = (client_y - bounds.top) * (logical_size.1 / bounds.height);

    Some(Point::new(x, y, timestamp))
}

pub fn distance(a: &Point, b: &Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    (dx * dx + dy * dy).sqrt()
}

/// Instantaneous speed in logical units per millisecond, 0 when no time has passed.
pub fn speed(a: &Point, b: &Point) -> f64 {
    let dt = b.timestamp.saturating_sub(a.timestamp);
    if dt > 0 {
        distance(a, b) / dt as f64
    } else {
        0.0
    }
}
