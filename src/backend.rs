//! Physics backend abstraction.
//!
//! The abilities only see a [`MotionState`](crate::motion::MotionState) and a
//! [`SurfaceProbe`](crate::probe::SurfaceProbe). A backend moves state between
//! those and a physics engine:
//!
//! - the generic systems read and write bodies through the accessors below;
//! - the backend's [`plugin`](AbilityPhysicsBackend::plugin) adds its sensor
//!   systems (filling [`GroundContact`]) and the system that ticks each
//!   coordinator against an engine-backed probe, in
//!   [`AbilitySet::Abilities`](crate::AbilitySet::Abilities).

use bevy::prelude::*;

/// Trait for physics backend implementations.
///
/// Accessors are world-based so they can be used from exclusive systems.
/// Forces passed to [`apply_force`](AbilityPhysicsBackend::apply_force) are
/// already scaled by [`get_mass`](AbilityPhysicsBackend::get_mass).
pub trait AbilityPhysicsBackend: 'static + Send + Sync {
    /// Returns the plugin that sets up this backend.
    fn plugin() -> impl Plugin;

    /// Get the current linear velocity of an entity.
    fn get_velocity(world: &World, entity: Entity) -> Vec3;

    /// Set the linear velocity of an entity.
    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec3);

    /// Set the ability force acting on an entity this step.
    ///
    /// Called every step, with zero when no ability pushes. The force
    /// replaces the one set on the previous step.
    fn apply_force(world: &mut World, entity: Entity, force: Vec3);

    /// Set the gravity multiplier of an entity.
    fn set_gravity_scale(world: &mut World, entity: Entity, scale: f32);

    /// Get the gravity multiplier of an entity.
    fn get_gravity_scale(_world: &World, _entity: Entity) -> f32 {
        1.0
    }

    /// Set the ground friction coefficient of an entity.
    fn set_friction(_world: &mut World, _entity: Entity, _friction: f32) {}

    /// Get the world-space position of an entity.
    fn get_position(world: &World, entity: Entity) -> Vec3 {
        world
            .get::<GlobalTransform>(entity)
            .map(|t| t.translation())
            .or_else(|| world.get::<Transform>(entity).map(|t| t.translation))
            .unwrap_or(Vec3::ZERO)
    }

    /// Get the facing direction of an entity (its local -Z).
    fn get_forward(world: &World, entity: Entity) -> Vec3 {
        world
            .get::<Transform>(entity)
            .map(|t| *t.forward())
            .unwrap_or(Vec3::NEG_Z)
    }

    /// Get the fixed timestep delta time.
    fn get_fixed_timestep(world: &World) -> f32 {
        crate::systems::fixed_delta(world.get_resource::<Time<Fixed>>())
    }

    /// Get the mass of an entity, used to turn ability accelerations into forces.
    fn get_mass(_world: &World, _entity: Entity) -> f32 {
        1.0
    }
}

/// Ground contact written by a backend's sensor systems.
///
/// Characters without this component keep whatever grounded flag the host
/// writes into their coordinator.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct GroundContact {
    pub grounded: bool,
    /// Normal of the ground below, `Vec3::Y` when airborne.
    pub normal: Vec3,
    /// Distance from the character origin to the ground, if any was found.
    pub distance: Option<f32>,
}

impl Default for GroundContact {
    fn default() -> Self {
        Self {
            grounded: false,
            normal: Vec3::Y,
            distance: None,
        }
    }
}

impl GroundContact {
    pub fn grounded(normal: Vec3, distance: f32) -> Self {
        Self {
            grounded: true,
            normal,
            distance: Some(distance),
        }
    }

    pub fn airborne() -> Self {
        Self::default()
    }
}

/// Empty plugin for backends that don't need additional setup.
pub struct NoOpBackendPlugin;

impl Plugin for NoOpBackendPlugin {
    fn build(&self, _app: &mut App) {}
}
