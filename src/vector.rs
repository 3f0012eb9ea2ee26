/*
 * Vector Module
 *
 * This module defines Vector2D, the 2D vector type every other part of the
 * simulation is built on. It offers two flavours of arithmetic:
 * - pure operations that consume a copy and return a new vector
 * - fluent mutators that change the vector in place and return `&mut Self`
 *   so calls can be chained in order
 *
 * Components are always finite. The fields are private so the only way to
 * build or change a vector is through a validating method. The `+`, `-`
 * operators saturate at ±f32::MAX instead of overflowing; `try_add` and
 * `try_sub` report the overflow instead.
 */

use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::VectorError;

// Tolerance on |normal| - 1 accepted by `reflect`
pub const UNIT_TOLERANCE: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "[f32; 2]", into = "[f32; 2]")]
pub struct Vector2D {
    x: f32,
    y: f32,
}

#[inline]
fn finite(value: f32, what: &'static str) -> Result<f32, VectorError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(VectorError::InvalidVector(what))
    }
}

// Overflow of finite operands only ever yields ±inf, never NaN
#[inline]
fn saturate(value: f32) -> f32 {
    value.clamp(f32::MIN, f32::MAX)
}

#[inline]
fn magnitude_arg(value: f32) -> Result<f32, VectorError> {
    let value = finite(value, "magnitude")?;
    if value < 0.0 {
        return Err(VectorError::InvalidVector("negative magnitude"));
    }
    Ok(value)
}

impl Vector2D {
    pub const ZERO: Vector2D = Vector2D { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Result<Self, VectorError> {
        Ok(Self {
            x: finite(x, "x component")?,
            y: finite(y, "y component")?,
        })
    }

    pub fn from_array(components: [f32; 2]) -> Result<Self, VectorError> {
        Self::new(components[0], components[1])
    }

    // Vector of the given length pointing along `angle` (radians)
    pub fn from_polar(angle: f32, magnitude: f32) -> Result<Self, VectorError> {
        let angle = finite(angle, "polar angle")?;
        let magnitude = magnitude_arg(magnitude)?;
        Self::new(angle.cos() * magnitude, angle.sin() * magnitude)
    }

    // Vector with a uniformly random heading and the given length
    pub fn random<R: Rng + ?Sized>(rng: &mut R, magnitude: f32) -> Result<Self, VectorError> {
        let angle = rng.gen::<f32>() * std::f32::consts::TAU;
        Self::from_polar(angle, magnitude)
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn to_array(self) -> [f32; 2] {
        [self.x, self.y]
    }

    // Scalar properties ----------------------------------------------------

    /// Heading in radians, in (-π, π].
    pub fn angle(&self) -> f32 {
        self.y.atan2(self.x)
    }

    pub fn magnitude_squared(&self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    pub fn magnitude(&self) -> f32 {
        self.x.hypot(self.y)
    }

    pub fn distance_squared(&self, other: Vector2D) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance(&self, other: Vector2D) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn dot(&self, other: Vector2D) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    // Pure operations ------------------------------------------------------

    pub fn scale(self, factor: f32) -> Result<Self, VectorError> {
        let factor = finite(factor, "scale factor")?;
        Self::new(self.x * factor, self.y * factor)
    }

    pub fn divide(self, divisor: f32) -> Result<Self, VectorError> {
        if divisor == 0.0 {
            return Err(VectorError::DivisionByZero);
        }
        let divisor = finite(divisor, "divisor")?;
        Self::new(self.x / divisor, self.y / divisor)
    }

    pub fn try_add(self, other: Vector2D) -> Result<Self, VectorError> {
        Self::new(self.x + other.x, self.y + other.y)
    }

    pub fn try_sub(self, other: Vector2D) -> Result<Self, VectorError> {
        Self::new(self.x - other.x, self.y - other.y)
    }

    // Point a fraction `t` of the way to `other`; t is clamped to [0, 1]
    pub fn lerp(self, other: Vector2D, t: f32) -> Self {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        Self {
            x: saturate(self.x + saturate(other.x - self.x) * t),
            y: saturate(self.y + saturate(other.y - self.y) * t),
        }
    }

    // Unit-length copy; the zero vector stays zero
    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    // Fluent mutators ------------------------------------------------------

    pub fn set(&mut self, x: f32, y: f32) -> Result<&mut Self, VectorError> {
        *self = Self::new(x, y)?;
        Ok(self)
    }

    pub fn zero(&mut self) -> &mut Self {
        *self = Self::ZERO;
        self
    }

    pub fn add_vector(&mut self, other: Vector2D) -> Result<&mut Self, VectorError> {
        *self = self.try_add(other)?;
        Ok(self)
    }

    pub fn sub_vector(&mut self, other: Vector2D) -> Result<&mut Self, VectorError> {
        *self = self.try_sub(other)?;
        Ok(self)
    }

    pub fn scale_by(&mut self, factor: f32) -> Result<&mut Self, VectorError> {
        *self = self.scale(factor)?;
        Ok(self)
    }

    pub fn divide_by(&mut self, divisor: f32) -> Result<&mut Self, VectorError> {
        *self = self.divide(divisor)?;
        Ok(self)
    }

    /// `self += other * factor`
    pub fn scaled_add(&mut self, other: Vector2D, factor: f32) -> Result<&mut Self, VectorError> {
        let factor = finite(factor, "scale factor")?;
        *self = Self::new(self.x + other.x * factor, self.y + other.y * factor)?;
        Ok(self)
    }

    /// Rotates counter-clockwise (in a y-up frame) by `angle` radians.
    pub fn rotate(&mut self, angle: f32) -> Result<&mut Self, VectorError> {
        let angle = finite(angle, "rotation angle")?;
        let (sin, cos) = angle.sin_cos();
        *self = Self::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)?;
        Ok(self)
    }

    pub fn normalize(&mut self) -> &mut Self {
        let magnitude = self.magnitude();
        if magnitude > 0.0 {
            self.x /= magnitude;
            self.y /= magnitude;
        }
        self
    }

    // A zero vector has no direction and is left untouched
    pub fn set_magnitude(&mut self, magnitude: f32) -> Result<&mut Self, VectorError> {
        let target = magnitude_arg(magnitude)?;
        let current = self.magnitude();
        if current > 0.0 {
            self.x = self.x / current * target;
            self.y = self.y / current * target;
        }
        Ok(self)
    }

    pub fn clamp_max(&mut self, magnitude: f32) -> Result<&mut Self, VectorError> {
        let limit = magnitude_arg(magnitude)?;
        if self.magnitude_squared() > limit * limit {
            self.set_magnitude(limit)?;
        }
        Ok(self)
    }

    pub fn clamp_min(&mut self, magnitude: f32) -> Result<&mut Self, VectorError> {
        let limit = magnitude_arg(magnitude)?;
        if self.magnitude_squared() < limit * limit {
            self.set_magnitude(limit)?;
        }
        Ok(self)
    }

    /// Mirrors the vector across the line whose unit normal is `normal`.
    pub fn reflect(&mut self, normal: Vector2D) -> Result<&mut Self, VectorError> {
        let magnitude = normal.magnitude();
        if (magnitude - 1.0).abs() > UNIT_TOLERANCE {
            return Err(VectorError::InvalidNormal { magnitude });
        }
        let push = normal.scale(2.0 * self.dot(normal))?;
        self.sub_vector(push)
    }
}

impl Add for Vector2D {
    type Output = Vector2D;

    fn add(self, rhs: Vector2D) -> Vector2D {
        Vector2D {
            x: saturate(self.x + rhs.x),
            y: saturate(self.y + rhs.y),
        }
    }
}

impl Sub for Vector2D {
    type Output = Vector2D;

    fn sub(self, rhs: Vector2D) -> Vector2D {
        Vector2D {
            x: saturate(self.x - rhs.x),
            y: saturate(self.y - rhs.y),
        }
    }
}

impl Neg for Vector2D {
    type Output = Vector2D;

    fn neg(self) -> Vector2D {
        Vector2D { x: -self.x, y: -self.y }
    }
}

impl AddAssign for Vector2D {
    fn add_assign(&mut self, rhs: Vector2D) {
        *self = *self + rhs;
    }
}

impl SubAssign for Vector2D {
    fn sub_assign(&mut self, rhs: Vector2D) {
        *self = *self - rhs;
    }
}

impl TryFrom<[f32; 2]> for Vector2D {
    type Error = VectorError;

    fn try_from(components: [f32; 2]) -> Result<Self, Self::Error> {
        Self::from_array(components)
    }
}

impl From<Vector2D> for [f32; 2] {
    fn from(v: Vector2D) -> Self {
        v.to_array()
    }
}

impl fmt::Display for Vector2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}
