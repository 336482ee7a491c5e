//! The character's shared movement state.
//!
//! [`MotionState`] is owned by the [`AbilityCoordinator`](crate::coordinator::AbilityCoordinator)
//! and lent to one ability at a time for the duration of a single call.
//! Abilities write velocity, gravity scale, air control and friction here;
//! the physics backend copies the result back into the engine after the tick.

use bevy::prelude::*;

use crate::math::{horizontal, horizontal_speed};

/// Strongest writer that owned the character's velocity during a tick.
///
/// Variants are ordered by precedence; a claim never lowers the authority
/// within a tick. The host reads this to decide whether its own locomotion
/// should touch velocity this step.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum VelocityAuthority {
    /// No ability touched velocity; host locomotion is in charge.
    #[default]
    Locomotion,
    /// Slide added slope acceleration.
    Slide,
    /// Wall-run adjusted velocity or injected force.
    WallRun,
    /// Dash overrode velocity.
    Dash,
}

/// Physical movement state of one character.
#[derive(Reflect, Debug, Clone, PartialEq)]
pub struct MotionState {
    /// Current linear velocity (world space).
    pub velocity: Vec3,
    /// Whether the character is standing on walkable ground.
    pub is_grounded: bool,
    /// Multiplier applied to world gravity by the physics backend.
    pub gravity_scale: f32,
    /// How much lateral control the host grants while airborne (0.0-1.0).
    pub air_control: f32,
    /// Ground friction the host applies while grounded.
    pub ground_friction: f32,
    /// Maximum walking speed the host locomotion should target.
    pub max_walk_speed: f32,
    /// Character position (capsule center).
    pub position: Vec3,
    /// Horizontal facing of the character body.
    pub forward: Vec3,
    /// Horizontal right vector of the character body.
    pub right: Vec3,
    /// Full look direction of the camera, including pitch.
    pub view_forward: Vec3,
    /// Desired movement direction for host locomotion (world space, unnormalized).
    pub move_input: Vec3,
    /// Writer that owned velocity during the last tick.
    pub authority: VelocityAuthority,
    /// Force accumulated this tick, as acceleration (per unit mass).
    pub(crate) force: Vec3,
}

impl Default for MotionState {
    fn default() -> Self {
        Self {
            velocity: Vec3::ZERO,
            is_grounded: true,
            gravity_scale: 1.0,
            air_control: 1.0,
            ground_friction: 8.0,
            max_walk_speed: 6.0,
            position: Vec3::ZERO,
            forward: Vec3::NEG_Z,
            right: Vec3::X,
            view_forward: Vec3::NEG_Z,
            move_input: Vec3::ZERO,
            authority: VelocityAuthority::Locomotion,
            force: Vec3::ZERO,
        }
    }
}

impl MotionState {
    /// Create a grounded state with the given body parameters.
    pub fn new(gravity_scale: f32, ground_friction: f32) -> Self {
        Self {
            gravity_scale,
            ground_friction,
            ..default()
        }
    }

    /// Builder: set velocity.
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Builder: set the grounded flag.
    pub fn with_grounded(mut self, grounded: bool) -> Self {
        self.is_grounded = grounded;
        self
    }

    /// Builder: set body facing. `forward` is flattened to the horizontal plane.
    pub fn with_facing(mut self, forward: Vec3) -> Self {
        self.set_facing(forward, forward);
        self
    }

    /// Set body and camera facing.
    ///
    /// The body forward is flattened onto the horizontal plane; the camera
    /// direction keeps its pitch. Degenerate inputs leave the facing unchanged.
    pub fn set_facing(&mut self, body_forward: Vec3, view_forward: Vec3) {
        let flat = horizontal(body_forward).normalize_or_zero();
        if flat != Vec3::ZERO {
            self.forward = flat;
            self.right = flat.cross(Vec3::Y).normalize();
        }
        let view = view_forward.normalize_or_zero();
        if view != Vec3::ZERO {
            self.view_forward = view;
        }
    }

    /// Airborne is the complement of grounded.
    #[inline]
    pub fn is_airborne(&self) -> bool {
        !self.is_grounded
    }

    /// Speed in the horizontal plane.
    #[inline]
    pub fn horizontal_speed(&self) -> f32 {
        horizontal_speed(self.velocity)
    }

    /// Accumulate a force (expressed as acceleration) for this tick.
    pub fn add_force(&mut self, force: Vec3) {
        self.force += force;
    }

    /// Force accumulated so far this tick.
    pub fn pending_force(&self) -> Vec3 {
        self.force
    }

    /// Take the accumulated force, leaving zero behind.
    pub fn take_force(&mut self) -> Vec3 {
        std::mem::take(&mut self.force)
    }

    /// Claim velocity authority for this tick. Keeps the stronger claim.
    pub(crate) fn claim(&mut self, authority: VelocityAuthority) {
        self.authority = self.authority.max(authority);
    }

    /// Hand velocity back to host locomotion at the start of a tick.
    pub(crate) fn release_authority(&mut self) {
        self.authority = VelocityAuthority::Locomotion;
    }
}
