/* Copyright 2020 @Yuchen Wong */

pub type Float = f32;

pub type Vector2f = nalgebra::Vector2<Float>;
pub type Vector3f = nalgebra::Vector3<Float>;
pub type Matrix2f = nalgebra::Matrix2<Float>;

pub const EPSILON: Float = 1e-4;
pub const SHADOW_EPSILON: Float = 1e-3;
pub const PI: Float = std::f32::consts::PI;
pub const INV_PI: Float = std::f32::consts::FRAC_1_PI;
pub const TWO_PI: Float = 2.0 * std::f32::consts::PI;
pub const INV_TWO_PI: Float = 0.5 * std::f32::consts::FRAC_1_PI;
pub const INV_FOUR_PI: Float = 0.25 * std::f32::consts::FRAC_1_PI;
pub const FLOAT_MAX: Float = std::f32::MAX;
