use crate::signature::{Point, Segment};
use log::{debug, warn};

/// Highest accepted backing pixels per logical unit.
pub const MAX_PIXEL_DENSITY: f64 = 8.0;
/// Widest accepted pen, in logical units.
pub const MAX_LINE_WIDTH: f64 = 16.0;
/// Larger backing stores leave the surface unavailable instead of allocating.
pub const MAX_BITMAP_PIXELS: u64 = 1 << 26;

/// Anything the capture and replay paths can put ink on.
pub trait RenderTarget {
    fn draw_segment(&mut self, from: Option<&Point>, to: &Point);

    fn clear(&mut self);

    /// Repaint from scratch, one connected polyline per stroke.
    fn redraw_all<'a, I>(&mut self, strokes: I)
    where
        I: IntoIterator<Item = &'a [Point]>,
    {
        self.clear();
        for points in strokes {
            let mut prev: Option<&Point> = None;
            for point in points {
                self.draw_segment(prev, point);
                prev = Some(point);
            }
        }
    }
}

/// Which path currently owns the surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceUser {
    Capture,
    Replay,
}

/// Backing store in device pixels. Each byte is ink coverage, 0 or 255.
#[derive(Clone, Debug, PartialEq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Bitmap {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn coverage(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|&p| p == 0)
    }

    pub fn inked_pixels(&self) -> usize {
        self.pixels.iter().filter(|&&p| p > 0).count()
    }

    /// True if any pixel in the block is inked. Used to down-sample onto coarse grids.
    pub fn any_in(&self, x0: u32, y0: u32, w: u32, h: u32) -> bool {
        let x1 = x0.saturating_add(w).min(self.width);
        let y1 = y0.saturating_add(h).min(self.height);
        (y0..y1).any(|y| (x0..x1).any(|x| self.coverage(x, y) > 0))
    }

    fn fill(&mut self) {
        self.pixels.iter_mut().for_each(|p| *p = 0);
    }

    fn set(&mut self, x: i64, y: i64) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let idx = y as usize * self.width as usize + x as usize;
        self.pixels[idx] = u8::MAX;
    }

    /// Round pen tip: every pixel whose centre lies within `radius`, plus the pixel
    /// holding the centre so hairlines never vanish.
    fn stamp(&mut self, cx: f64, cy: f64, radius: f64) {
        self.set(cx.floor() as i64, cy.floor() as i64);

        let x0 = (cx - radius).floor() as i64;
        let x1 = (cx + radius).ceil() as i64;
        let y0 = (cy - radius).floor() as i64;
        let y1 = (cy + radius).ceil() as i64;
        let r2 = radius * radius;

        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f64 + 0.5 - cx;
                let dy = y as f64 + 0.5 - cy;
                if dx * dx + dy * dy <= r2 {
                    self.set(x, y);
                }
            }
        }
    }

    /// Disc stamps along the line give round caps and round joins for free.
    fn line(&mut self, from: (f64, f64), to: (f64, f64), radius: f64) {
        let dx = to.0 - from.0;
        let dy = to.1 - from.1;
        let len = (dx * dx + dy * dy).sqrt();
        let step = (radius / 2.0).max(0.5);
        let steps = (len / step).ceil().max(1.0) as usize;

        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            self.stamp(from.0 + dx * t, from.1 + dy * t, radius);
        }
    }
}

/// Drawing settings fixed for the life of an adapter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceStyle {
    /// pen width in logical units
    pub line_width: f64,
    pub ink: (u8, u8, u8),
}

impl Default for SurfaceStyle {
    fn default() -> Self {
        Self {
            line_width: 1.5,
            ink: (226, 232, 240),
        }
    }
}

/// Resolution-scaled surface shared by live capture and replay.
///
/// Callers draw in logical units; the adapter multiplies by the pixel density it was
/// configured with. Until `configure` succeeds there is no backing bitmap and every
/// drawing call is a no-op.
#[derive(Debug)]
pub struct SurfaceAdapter {
    bitmap: Option<Bitmap>,
    logical_size: (f64, f64),
    pixel_density: f64,
    style: SurfaceStyle,
    pending: Vec<Segment>,
    user: Option<SurfaceUser>,
}

impl SurfaceAdapter {
    pub fn new(mut style: SurfaceStyle) -> Self {
        if !(style.line_width.is_finite() && style.line_width > 0.0) {
            style.line_width = SurfaceStyle::default().line_width;
        }
        style.line_width = style.line_width.min(MAX_LINE_WIDTH);
        Self {
            bitmap: None,
            logical_size: (0.0, 0.0),
            pixel_density: 1.0,
            style,
            pending: Vec::new(),
            user: None,
        }
    }

    /// Size the backing bitmap to `logical * density`. Pending segments are dropped;
    /// the caller repaints from its authoritative stroke list with `redraw_all`.
    pub fn configure(&mut self, logical_width: f64, logical_height: f64, pixel_density: f64) {
        let density = if pixel_density.is_finite() && pixel_density > 0.0 {
            pixel_density.min(MAX_PIXEL_DENSITY)
        } else {
            1.0
        };
        let logical = |v: f64| if v.is_finite() { v.max(0.0) } else { 0.0 };
        let (logical_width, logical_height) = (logical(logical_width), logical(logical_height));

        let width = (logical_width * density).round();
        let height = (logical_height * density).round();

        self.logical_size = (logical_width, logical_height);
        self.pixel_density = density;
        self.pending.clear();
        self.bitmap = if width < 1.0 || height < 1.0 {
            None
        } else if width * height > MAX_BITMAP_PIXELS as f64 {
            warn!("surface of {width}x{height} px is too large, drawing disabled");
            None
        } else {
            Some(Bitmap::new(width as u32, height as u32))
        };

        debug!(
            "surface configured {}x{} logical @{} -> {}x{} px",
            self.logical_size.0, self.logical_size.1, density, width, height
        );
    }

    pub fn is_available(&self) -> bool {
        self.bitmap.is_some()
    }

    pub fn bitmap(&self) -> Option<&Bitmap> {
        self.bitmap.as_ref()
    }

    pub fn logical_size(&self) -> (f64, f64) {
        self.logical_size
    }

    pub fn pixel_density(&self) -> f64 {
        self.pixel_density
    }

    pub fn style(&self) -> SurfaceStyle {
        self.style
    }

    /// Take the surface for `user`. Fails while another user holds it; `clear`
    /// releases it.
    #[must_use]
    pub fn claim(&mut self, user: SurfaceUser) -> bool {
        match self.user {
            Some(current) if current != user => false,
            _ => {
                self.user = Some(user);
                true
            }
        }
    }

    pub fn user(&self) -> Option<SurfaceUser> {
        self.user
    }

    /// Defer a segment to the next `flush`.
    pub fn queue_segment(&mut self, segment: Segment) {
        if self.bitmap.is_some() {
            self.pending.push(segment);
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Draw everything queued since the last frame, oldest first.
    pub fn flush(&mut self) -> usize {
        let pending = std::mem::take(&mut self.pending);
        for segment in &pending {
            self.draw_segment(segment.from.as_ref(), &segment.to);
        }
        pending.len()
    }

    fn to_device(&self, p: &Point) -> (f64, f64) {
        (p.x * self.pixel_density, p.y * self.pixel_density)
    }
}

impl RenderTarget for SurfaceAdapter {
    fn draw_segment(&mut self, from: Option<&Point>, to: &Point) {
        let radius = (self.style.line_width * self.pixel_density / 2.0).max(0.5);
        let end = self.to_device(to);
        let start = from.map(|p| self.to_device(p));

        let Some(bitmap) = self.bitmap.as_mut() else {
            return;
        };

        match start {
            Some(start) => bitmap.line(start, end, radius),
            None => bitmap.stamp(end.0, end.1, radius),
        }
    }

    fn clear(&mut self) {
        self.pending.clear();
        self.user = None;
        if let Some(bitmap) = self.bitmap.as_mut() {
            bitmap.fill();
        }
    }
}
