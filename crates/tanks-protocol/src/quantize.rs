//! Wire-quantization constants, spec.md §4.8: "positions to 0.1 px,
//! velocities to 0.1, angles to 0.01 rad, attributes to integer."

pub const POSITION_STEP: f32 = 0.1;
pub const VELOCITY_STEP: f32 = 0.1;
pub const ANGLE_STEP: f32 = 0.01;

pub fn quantize_angle(angle: f32) -> f32 {
    tanks_core::vector::quantize(angle, ANGLE_STEP)
}

pub fn quantize_attribute(value: f32) -> i32 {
    value.round() as i32
}
