use core::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

use crate::error::PlanError;
use crate::world::Body;

/// Positions closer than this on both axes are the same location.
pub const LOCATION_EPSILON: f64 = 1e-6;

// ── Vectors ─────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn from_angle(angle: f64, magnitude: f64) -> Self {
        Self::new(angle.cos() * magnitude, angle.sin() * magnitude)
    }

    pub fn dot(self, other: Vec2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn cross(self, other: Vec2) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn length_sq(self) -> f64 {
        self.dot(self)
    }

    pub fn length(self) -> f64 {
        self.length_sq().sqrt()
    }

    pub fn angle(self) -> f64 {
        self.y.atan2(self.x)
    }

    /// Unsigned angle in `[0, pi]` between two vectors; zero when either is zero.
    pub fn angle_between(self, other: Vec2) -> f64 {
        self.cross(other).atan2(self.dot(other)).abs()
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

// ── Positions ───────────────────────────────────────────────────────

/// A point on the plane plus the velocity of whatever sits there.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub vx: f64,
    #[serde(default)]
    pub vy: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
        }
    }

    pub fn with_velocity(x: f64, y: f64, vx: f64, vy: f64) -> Self {
        Self { x, y, vx, vy }
    }

    pub fn point(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn velocity(&self) -> Vec2 {
        Vec2::new(self.vx, self.vy)
    }

    pub fn speed(&self) -> f64 {
        self.velocity().length()
    }

    /// Location equality; velocity is ignored.
    pub fn same_location(&self, other: &Position) -> bool {
        self.location_key() == other.location_key()
    }

    pub fn location_key(&self) -> LocationKey {
        LocationKey {
            x: (self.x / LOCATION_EPSILON).round() as i64,
            y: (self.y / LOCATION_EPSILON).round() as i64,
        }
    }
}

/// Quantized location used for hashing nodes by position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocationKey {
    pub x: i64,
    pub y: i64,
}

// ── Toroidal math ───────────────────────────────────────────────────

/// Signed shortest offset from `from` to `to` on an axis of length `size`.
pub fn shortest_delta(from: f64, to: f64, size: f64) -> f64 {
    let delta = (to - from).rem_euclid(size);
    if delta > size * 0.5 {
        delta - size
    } else {
        delta
    }
}

/// Modulus that always lands in `0..modulus`, negative inputs included.
pub fn ring_mod(value: isize, modulus: usize) -> usize {
    value.rem_euclid(modulus.max(1) as isize) as usize
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    width: f64,
    height: f64,
}

impl Plane {
    pub fn new(width: f64, height: f64) -> Result<Self, PlanError> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(PlanError::InvalidPlane { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn wrap(&self, position: Position) -> Position {
        Position {
            x: position.x.rem_euclid(self.width),
            y: position.y.rem_euclid(self.height),
            ..position
        }
    }

    pub fn shortest_vector(&self, from: &Position, to: &Position) -> Vec2 {
        Vec2::new(
            shortest_delta(from.x, to.x, self.width),
            shortest_delta(from.y, to.y, self.height),
        )
    }

    pub fn distance(&self, from: &Position, to: &Position) -> f64 {
        self.shortest_vector(from, to).length()
    }

    /// Longest possible shortest distance on this plane.
    pub fn max_distance(&self) -> f64 {
        Vec2::new(self.width * 0.5, self.height * 0.5).length()
    }

    /// True when no obstacle comes within `radius + clearance` of the
    /// shortest segment from `from` to `to`.
    pub fn is_segment_clear(
        &self,
        from: &Position,
        to: &Position,
        obstacles: &[Body],
        clearance: f64,
    ) -> bool {
        let segment = self.shortest_vector(from, to);
        let segment_len_sq = segment.length_sq();

        obstacles.iter().all(|obstacle| {
            let offset = self.shortest_vector(from, &obstacle.position);
            let t = if segment_len_sq > 0.0 {
                (offset.dot(segment) / segment_len_sq).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let closest = offset - segment * t;
            closest.length() >= obstacle.radius + clearance
        })
    }
}
