//! Small interpolation and vector helpers shared by the abilities.

use std::f32::consts::{PI, TAU};

use bevy::prelude::*;

/// World up. Abilities assume a Y-up world, like the rest of Bevy.
pub const UP: Vec3 = Vec3::Y;

/// Squared distance below which an interpolation snaps to its target.
const SNAP_EPSILON_SQ: f32 = 1.0e-8;

/// Move `current` toward `target` by a fraction `dt * speed` of the remaining
/// distance, clamped so it never overshoots.
///
/// A non-positive `speed` snaps straight to the target.
pub fn interp_to(current: f32, target: f32, dt: f32, speed: f32) -> f32 {
    if speed <= 0.0 {
        return target;
    }
    let dist = target - current;
    if dist * dist < SNAP_EPSILON_SQ {
        return target;
    }
    current + dist * (dt * speed).clamp(0.0, 1.0)
}

/// Angular variant of [`interp_to`] that always takes the short way around.
pub fn interp_angle_to(current: f32, target: f32, dt: f32, speed: f32) -> f32 {
    let delta = wrap_angle(target - current);
    wrap_angle(interp_to(0.0, delta, dt, speed) + current)
}

/// Wrap an angle in radians into `[-PI, PI]`.
///
/// Angles already in range are returned unchanged. Non-finite input yields NaN.
pub fn wrap_angle(angle: f32) -> f32 {
    if (-PI..=PI).contains(&angle) {
        return angle;
    }
    (angle + PI).rem_euclid(TAU) - PI
}

/// Velocity with the vertical component removed.
#[inline]
pub fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Length of the horizontal part of `v`.
#[inline]
pub fn horizontal_speed(v: Vec3) -> f32 {
    horizontal(v).length()
}

/// Project `v` onto the plane with unit normal `normal`.
#[inline]
pub fn project_on_plane(v: Vec3, normal: Vec3) -> Vec3 {
    v - normal * v.dot(normal)
}
