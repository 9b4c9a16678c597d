/// A 2D vector in screen space.
///
/// Used both for positions (pixels) and velocities (pixels per tick).
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    derive_more::Add,
    derive_more::Sub,
    derive_more::AddAssign,
)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns a vector of the given length pointing along `angle` (radians, 0 = +x).
    #[must_use]
    pub fn from_angle(angle: f64, length: f64) -> Self {
        Self {
            x: angle.cos() * length,
            y: angle.sin() * length,
        }
    }

    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    #[must_use]
    pub fn length_squared(self) -> f64 {
        self.dot(self)
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    #[must_use]
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }

    /// Straight-line distance, ignoring screen wrap.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self - other).length()
    }
}

/// A moving circle: the physical part of every entity.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f64,
}

impl Body {
    #[must_use]
    pub const fn new(position: Vec2, velocity: Vec2, radius: f64) -> Self {
        Self {
            position,
            velocity,
            radius,
        }
    }

    pub(crate) fn advance(&mut self) {
        self.position += self.velocity;
    }

    pub(crate) fn wrap(&mut self, width: f64, height: f64) {
        let pos = &mut self.position;
        if pos.x < 0.0 {
            pos.x += width;
        } else if pos.x > width {
            pos.x -= width;
        }
        if pos.y < 0.0 {
            pos.y += height;
        } else if pos.y > height {
            pos.y -= height;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use super::*;

    #[test]
    fn test_from_angle_points_along_angle() {
        let v = Vec2::from_angle(FRAC_PI_2, 2.0);
        assert!(v.x.abs() < 1e-12);
        assert!((v.y - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_wrap_moves_body_back_on_screen() {
        let mut body = Body::new(Vec2::new(-5.0, 610.0), Vec2::ZERO, 1.0);
        body.wrap(800.0, 600.0);
        assert_eq!(body.position, Vec2::new(795.0, 10.0));
    }

    #[test]
    fn test_add_sub() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(3.0, 5.0);
        assert_eq!(a + b, Vec2::new(4.0, 7.0));
        assert_eq!(b - a, Vec2::new(2.0, 3.0));
        assert_eq!((b - a).length_squared(), 13.0);
    }
}
