//! Angle wrapping and frame conversions.
//!
//! Robot-local frame: +y is the robot's forward direction (along its
//! heading), +x points to the robot's right. The radio firmware expects
//! velocities in this frame.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use super::point::Point2;

/// Wrap an angle into (−π, π].
#[inline]
pub fn trim_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    if a > PI { a - TAU } else { a }
}

/// Wrap an angle into (−π/2, π/2], treating opposite directions as equal.
#[inline]
pub fn trim_angle_90(angle: f64) -> f64 {
    let a = angle.rem_euclid(PI);
    if a > FRAC_PI_2 { a - PI } else { a }
}

/// Express a field-frame vector in the frame of a robot facing `w`.
#[inline]
pub fn field_to_robot_perspective(w: f64, v: Point2) -> Point2 {
    v.rotate(FRAC_PI_2 - w)
}

/// Express a robot-frame vector (robot facing `w`) in the field frame.
#[inline]
pub fn robot_to_field_perspective(w: f64, v: Point2) -> Point2 {
    v.rotate(w - FRAC_PI_2)
}
