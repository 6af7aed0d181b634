//=========================================================================
// Geometry
//=========================================================================
//
// Pure orientation and overlap math shared by characters.
//
// Conventions:
// - Screen space, top-left origin, y grows downwards
// - Angles in degrees, normalized into [0, 360)
// - Points and directions are `glam::DVec2`
// - A character's forward vector is derived from its angle AND the sign
//   of its horizontal scale, so a mirrored costume walks the other way
//
//=========================================================================

//=== External Dependencies ===============================================

pub use glam::DVec2;

//=== Angle Helpers =======================================================

/// Wraps any real angle into [0, 360).
///
/// `rem_euclid` can round up to exactly 360.0 for tiny negative inputs,
/// which is folded back to 0.
pub fn normalize_angle(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Forward vector for `degrees`, scaled by the horizontal scale factor.
pub fn direction_from_angle(degrees: f64, scale_x: f64) -> DVec2 {
    DVec2::from_angle(degrees.to_radians()) * scale_x
}

/// Heading of `vector` in degrees, normalized into [0, 360).
pub fn heading(vector: DVec2) -> f64 {
    normalize_angle(vector.to_angle().to_degrees())
}

/// Angle in degrees (not normalized) of the ray from `from` to `to`.
pub fn angle_towards(from: DVec2, to: DVec2) -> f64 {
    (to - from).to_angle().to_degrees()
}

//=== Rect ================================================================

/// Axis-aligned rectangle in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn origin(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    pub fn center(&self) -> DVec2 {
        DVec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// True when the two rectangles share interior area.
    ///
    /// Rectangles that only touch along an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// True when `point` lies inside the rectangle (right/bottom exclusive).
    pub fn contains(&self, point: DVec2) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
