//! Minimal 3-vector for directions and displacements.

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// A Cartesian 3-vector.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
    /// x component.
    pub x: f64,
    /// y component.
    pub y: f64,
    /// z component.
    pub z: f64,
}

impl Vec3 {
    /// Zero vector.
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

    /// Unit vector along +z.
    pub const Z_AXIS: Vec3 = Vec3::new(0.0, 0.0, 1.0);

    /// Construct from components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Unit vector from polar angle cosine/sine and azimuth.
    pub fn from_polar(cos_theta: f64, sin_theta: f64, phi: f64) -> Self {
        Self::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta)
    }

    /// Dot product.
    pub fn dot(self, other: Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Squared magnitude.
    pub fn mag2(self) -> f64 {
        self.dot(self)
    }

    /// Magnitude.
    pub fn mag(self) -> f64 {
        self.mag2().sqrt()
    }

    /// Unit vector in the same direction; the zero vector maps to itself.
    pub fn unit(self) -> Vec3 {
        let m = self.mag();
        if m > 0.0 {
            self * (1.0 / m)
        } else {
            self
        }
    }

    /// Returns `true` if `|self| = 1` within `tolerance`.
    pub fn is_unit(self, tolerance: f64) -> bool {
        (self.mag() - 1.0).abs() <= tolerance
    }

    /// Rotate this vector, expressed in a frame whose z axis is `u`,
    /// into the global frame.
    ///
    /// `u` must be a unit vector. A vector along +z maps onto `u`.
    pub fn rotate_uz(self, u: Vec3) -> Vec3 {
        let up2 = u.x * u.x + u.y * u.y;
        if up2 > 0.0 {
            let up = up2.sqrt();
            Vec3::new(
                (u.x * u.z * self.x - u.y * self.y) / up + u.x * self.z,
                (u.y * u.z * self.x + u.x * self.y) / up + u.y * self.z,
                -up * self.x + u.z * self.z,
            )
        } else if u.z < 0.0 {
            Vec3::new(-self.x, self.y, -self.z)
        } else {
            self
        }
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Vec3) {
        *self = *self + rhs;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;
    fn mul(self, rhs: f64) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}
