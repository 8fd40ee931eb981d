//! Planar points and robot poses in the field frame.
//!
//! All distances are millimetres. The field frame has its origin at the
//! center spot, +x towards the yellow-side goal when blue defends left.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use super::angle::trim_angle;

/// A 2D point or vector (mm or mm/s depending on context).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const ZERO: Point2 = Point2 { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing along `angle` (radians, CCW from +x).
    #[inline]
    pub fn from_angle(angle: f64) -> Self {
        Self::new(angle.cos(), angle.sin())
    }

    #[inline]
    pub fn norm(&self) -> f64 {
        self.x.hypot(self.y)
    }

    #[inline]
    pub fn distance(&self, other: &Point2) -> f64 {
        (*self - *other).norm()
    }

    #[inline]
    pub fn dot(&self, other: &Point2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// 2D cross product (z component).
    #[inline]
    pub fn cross(&self, other: &Point2) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Unit vector in the same direction, `None` for the zero vector.
    #[inline]
    pub fn unit(&self) -> Option<Point2> {
        let n = self.norm();
        if n < f64::EPSILON {
            None
        } else {
            Some(Point2::new(self.x / n, self.y / n))
        }
    }

    /// Heading of the vector, `None` for the zero vector.
    #[inline]
    pub fn angle(&self) -> Option<f64> {
        self.unit().map(|u| u.y.atan2(u.x))
    }

    /// Rotate counter-clockwise by `angle` radians.
    #[inline]
    pub fn rotate(&self, angle: f64) -> Point2 {
        let (s, c) = angle.sin_cos();
        Point2::new(self.x * c - self.y * s, self.x * s + self.y * c)
    }

    /// Vector of the same direction with norm at most `max`.
    pub fn clamp_norm(&self, max: f64) -> Point2 {
        let n = self.norm();
        if n > max && n > 0.0 {
            *self * (max / n)
        } else {
            *self
        }
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

impl Add for Point2 {
    type Output = Point2;
    #[inline]
    fn add(self, rhs: Point2) -> Point2 {
        Point2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point2 {
    #[inline]
    fn add_assign(&mut self, rhs: Point2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point2 {
    type Output = Point2;
    #[inline]
    fn sub(self, rhs: Point2) -> Point2 {
        Point2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Point2 {
    #[inline]
    fn sub_assign(&mut self, rhs: Point2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f64> for Point2 {
    type Output = Point2;
    #[inline]
    fn mul(self, rhs: f64) -> Point2 {
        Point2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Point2 {
    type Output = Point2;
    #[inline]
    fn neg(self) -> Point2 {
        Point2::new(-self.x, -self.y)
    }
}

/// Robot pose: position (mm) and heading `w` (rad, CCW from +x).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub w: f64,
}

impl Pose {
    /// Create a pose; the heading is wrapped into (−π, π].
    #[inline]
    pub fn new(x: f64, y: f64, w: f64) -> Self {
        Self {
            x,
            y,
            w: trim_angle(w),
        }
    }

    #[inline]
    pub fn from_point(p: Point2, w: f64) -> Self {
        Self::new(p.x, p.y, w)
    }

    #[inline]
    pub fn xy(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }

    /// Unit vector along the heading.
    #[inline]
    pub fn heading(&self) -> Point2 {
        Point2::from_angle(self.w)
    }

    #[inline]
    pub fn distance(&self, other: &Pose) -> f64 {
        self.xy().distance(&other.xy())
    }
}
