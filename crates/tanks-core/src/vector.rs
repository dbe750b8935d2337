//! 2D vector math.
//!
//! Mutating methods (`add_assign`, `scale_assign`, ...) operate in place for
//! hot paths; the pure operators (`+`, `-`, `*`) allocate a new value and are
//! fine off the tick's hottest loops.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub const ZERO: Vector2 = Vector2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn from_angle(angle: f32) -> Self {
        Self::new(angle.cos(), angle.sin())
    }

    pub fn magnitude(self) -> f32 {
        self.magnitude_squared().sqrt()
    }

    pub fn magnitude_squared(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    pub fn normalized(self) -> Self {
        let m = self.magnitude();
        if m < f32::EPSILON {
            Self::ZERO
        } else {
            self * (1.0 / m)
        }
    }

    pub fn angle(self) -> f32 {
        self.y.atan2(self.x)
    }

    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn distance(self, other: Self) -> f32 {
        (self - other).magnitude()
    }

    pub fn distance_squared(self, other: Self) -> f32 {
        (self - other).magnitude_squared()
    }

    /// Linear interpolation toward `target` by `t` in `[0,1]`.
    pub fn lerp(self, target: Self, t: f32) -> Self {
        self + (target - self) * t
    }

    pub fn rotated(self, radians: f32) -> Self {
        let (s, c) = radians.sin_cos();
        Self::new(self.x * c - self.y * s, self.x * s + self.y * c)
    }

    pub fn add_assign_scaled(&mut self, other: Self, scale: f32) {
        self.x += other.x * scale;
        self.y += other.y * scale;
    }

    pub fn scale_assign(&mut self, scale: f32) {
        self.x *= scale;
        self.y *= scale;
    }

    pub fn clamp_components(self, min: Vector2, max: Vector2) -> Self {
        Self::new(self.x.clamp(min.x, max.x), self.y.clamp(min.y, max.y))
    }

    /// Rounds both components to the nearest multiple of `step`, used for
    /// wire-quantization before transmit.
    pub fn quantized(self, step: f32) -> Self {
        Self::new(quantize(self.x, step), quantize(self.y, step))
    }
}

pub fn quantize(value: f32, step: f32) -> f32 {
    if step <= 0.0 {
        return value;
    }
    (value / step).round() * step
}

impl Add for Vector2 {
    type Output = Vector2;
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vector2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vector2 {
    type Output = Vector2;
    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vector2 {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f32> for Vector2 {
    type Output = Vector2;
    fn mul(self, rhs: f32) -> Self::Output {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vector2 {
    type Output = Vector2;
    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_zero_is_zero() {
        assert_eq!(Vector2::ZERO.normalized(), Vector2::ZERO);
    }

    #[test]
    fn rotate_quarter_turn() {
        let v = Vector2::new(1.0, 0.0).rotated(std::f32::consts::FRAC_PI_2);
        assert!((v.x).abs() < 1e-5);
        assert!((v.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn lerp_halfway() {
        let a = Vector2::new(0.0, 0.0);
        let b = Vector2::new(10.0, 10.0);
        assert_eq!(a.lerp(b, 0.5), Vector2::new(5.0, 5.0));
    }

    #[test]
    fn quantize_rounds_to_step() {
        assert!((quantize(12.34, 0.1) - 12.3).abs() < 1e-4);
        assert!((quantize(12.36, 0.1) - 12.4).abs() < 1e-4);
    }
}
