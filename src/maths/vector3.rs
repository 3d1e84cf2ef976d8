//! Three-component vector value type.

use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, Sub};

use crate::types::RealScalar;

/// A point or direction in 3D space.
///
/// Equality is exact and componentwise: callers needing fuzzy matching use
/// distance thresholds explicitly rather than an epsilon baked in here.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector3<T: RealScalar> {
    /// x component.
    pub x: T,
    /// y component.
    pub y: T,
    /// z component.
    pub z: T,
}

impl<T: RealScalar> Vector3<T> {
    /// Creates a vector from its three components.
    pub fn new(x: T, y: T, z: T) -> Self {
        Self { x, y, z }
    }

    /// Creates a vector with all components set to `scalar`.
    pub fn splat(scalar: T) -> Self {
        Self::new(scalar, scalar, scalar)
    }

    /// Cross product.
    pub fn cross(&self, other: &Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }
}

impl<T: RealScalar> Add for Vector3<T> {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl<T: RealScalar> AddAssign for Vector3<T> {
    fn add_assign(&mut self, other: Self) {
        self.x = self.x + other.x;
        self.y = self.y + other.y;
        self.z = self.z + other.z;
    }
}

impl<T: RealScalar> Sub for Vector3<T> {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl<T: RealScalar> Mul for Vector3<T> {
    type Output = Self;

    /// Componentwise (Hadamard) product.
    fn mul(self, other: Self) -> Self {
        Self::new(self.x * other.x, self.y * other.y, self.z * other.z)
    }
}

impl<T: RealScalar> Mul<T> for Vector3<T> {
    type Output = Self;

    fn mul(self, scalar: T) -> Self {
        Self::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }
}

impl<T: RealScalar> Div<T> for Vector3<T> {
    type Output = Self;

    fn div(self, scalar: T) -> Self {
        Self::new(self.x / scalar, self.y / scalar, self.z / scalar)
    }
}

impl<T: RealScalar> DivAssign<T> for Vector3<T> {
    fn div_assign(&mut self, scalar: T) {
        self.x = self.x / scalar;
        self.y = self.y / scalar;
        self.z = self.z / scalar;
    }
}

impl<T: RealScalar> fmt::Display for Vector3<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}
