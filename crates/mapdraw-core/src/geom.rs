use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2::new(0.0, 0.0);

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn cross(self, other: Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector with the same direction, or `None` for the zero vector.
    pub fn normalized(self) -> Option<Self> {
        let len = self.length();
        if len > 0.0 && len.is_finite() {
            Some(Self::new(self.x / len, self.y / len))
        } else {
            None
        }
    }

    /// Right-hand normal in a y-up frame: `(y, -x)`.
    pub fn right_normal(self) -> Self {
        Self::new(self.y, -self.x)
    }

    pub fn approx_eq(self, other: Self, eps: f64) -> bool {
        (self.x - other.x).abs() <= eps && (self.y - other.y).abs() <= eps
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Self) -> Self {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Self) -> Self {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f64) -> Self {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    fn neg(self) -> Self {
        Vec2::new(-self.x, -self.y)
    }
}

impl From<(f64, f64)> for Vec2 {
    fn from((x, y): (f64, f64)) -> Self {
        Vec2::new(x, y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox2 {
    pub min: Vec2,
    pub max: Vec2,
}

impl BBox2 {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn width(&self) -> f64 {
        (self.max.x - self.min.x).max(0.0)
    }

    pub fn height(&self) -> f64 {
        (self.max.y - self.min.y).max(0.0)
    }
}

/// Converts source coordinates into canvas coordinates.
///
/// The renderer only needs already-projected points and a scale factor; real
/// map projections live outside this crate.
pub trait Projector {
    fn project(&self, geo: Vec2) -> Vec2;

    /// Canvas units per source unit, optionally at a specific location.
    fn scale(&self, geo: Option<Vec2>) -> f64;

    /// Canvas size.
    fn size(&self) -> Vec2;
}

/// Planar projection of a bounding box onto the canvas with y pointing down.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearProjector {
    pub bounds: BBox2,
    pub scale: f64,
}

impl LinearProjector {
    pub fn new(bounds: BBox2, scale: f64) -> Self {
        Self { bounds, scale }
    }
}

impl Projector for LinearProjector {
    fn project(&self, geo: Vec2) -> Vec2 {
        Vec2::new(
            (geo.x - self.bounds.min.x) * self.scale,
            (self.bounds.max.y - geo.y) * self.scale,
        )
    }

    fn scale(&self, _geo: Option<Vec2>) -> f64 {
        self.scale
    }

    fn size(&self) -> Vec2 {
        Vec2::new(
            self.bounds.width() * self.scale,
            self.bounds.height() * self.scale,
        )
    }
}
