#[cfg(test)]
#[path = "geom_test.rs"]
mod geom_test;

use serde::{Deserialize, Serialize};

use crate::consts::MIN_VIEWPORT_SCALE;

/// A point in either board or screen space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Axis-aligned bounding box in board coordinates.
///
/// `width` and `height` are always non-negative. Board coordinates are
/// unbounded reals; there is no world size limit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    /// Construct a box, clamping negative extents to zero.
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width: width.max(0.0), height: height.max(0.0) }
    }

    /// Center of the box.
    #[must_use]
    pub fn center(self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Whether the point lies inside the box (edges inclusive).
    #[must_use]
    pub fn contains(self, pt: Point) -> bool {
        pt.x >= self.x && pt.x <= self.x + self.width && pt.y >= self.y && pt.y <= self.y + self.height
    }

    /// Min/max hull of a point list. An empty list yields a zero-size box at
    /// the origin.
    #[must_use]
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = Point>,
    {
        let mut iter = points.into_iter();
        let Some(first) = iter.next() else {
            return Self::new(0.0, 0.0, 0.0, 0.0);
        };
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for pt in iter {
            min_x = min_x.min(pt.x);
            min_y = min_y.min(pt.y);
            max_x = max_x.max(pt.x);
            max_y = max_y.max(pt.y);
        }
        Self::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }
}

/// Pan/zoom viewport: the affine transform from board to screen space.
///
/// `scale` is clamped to [`MIN_VIEWPORT_SCALE`] at every entry point. The
/// absence of an upper bound is deliberate — unbounded zoom-in is a product
/// property, not an engine concern.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawViewport")]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    scale: f64,
}

/// Unclamped mirror of [`Viewport`] used to enforce the scale floor on
/// deserialization.
#[derive(Deserialize)]
struct RawViewport {
    x: f64,
    y: f64,
    scale: f64,
}

impl From<RawViewport> for Viewport {
    fn from(raw: RawViewport) -> Self {
        Self::new(raw.x, raw.y, raw.scale)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, scale: 1.0 }
    }
}

impl Viewport {
    #[must_use]
    pub fn new(x: f64, y: f64, scale: f64) -> Self {
        Self { x, y, scale: scale.max(MIN_VIEWPORT_SCALE) }
    }

    /// Current scale factor. Always at least [`MIN_VIEWPORT_SCALE`].
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Set the scale, clamped to the floor.
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale.max(MIN_VIEWPORT_SCALE);
    }

    /// Convert a screen-space point to board coordinates.
    #[must_use]
    pub fn screen_to_board(&self, screen: Point) -> Point {
        Point::new((screen.x - self.x) / self.scale, (screen.y - self.y) / self.scale)
    }

    /// Convert a board-space point to screen coordinates.
    #[must_use]
    pub fn board_to_screen(&self, board: Point) -> Point {
        Point::new(board.x * self.scale + self.x, board.y * self.scale + self.y)
    }

    /// Convert a screen-space distance (pixels) to board-space distance.
    #[must_use]
    pub fn screen_dist_to_board(&self, screen_dist: f64) -> f64 {
        screen_dist / self.scale
    }
}
