//! Core ability systems.
//!
//! These systems move state between the physics backend and each character's
//! [`AbilityCoordinator`]. They are generic over the backend; the ability tick
//! itself is added by the backend's plugin because it needs the backend's
//! surface queries.

use bevy::prelude::*;

use crate::backend::{AbilityPhysicsBackend, GroundContact};
use crate::camera::AbilityCamera;
use crate::config::{AbilityTuning, Loadout};
use crate::coordinator::AbilityCoordinator;
use crate::events::{AbilityCollision, CharacterAbilityEvent};
use crate::intent::AbilityInput;
use crate::math::horizontal;
use crate::motion::MotionState;
use crate::probe::{ProbeDiagnostics, RecordingProbe, SurfaceProbe};
use crate::state::{Dashing, Sliding, WallRunning};

/// Fixed timestep delta, with a fallback for tests that step the schedule by
/// hand before the clock has advanced.
pub fn fixed_delta(time: Option<&Time<Fixed>>) -> f32 {
    time.map(|t| t.delta_secs())
        .filter(|&d| d > 0.0)
        .unwrap_or(1.0 / 60.0)
}

/// Camera look direction for a body facing `forward` with the given pitch.
pub fn view_direction(forward: Vec3, pitch: f32) -> Vec3 {
    let flat = horizontal(forward).normalize_or(Vec3::NEG_Z);
    let right = flat.cross(Vec3::Y);
    Quat::from_axis_angle(right, pitch) * flat
}

/// Tick one coordinator, recording its probes when diagnostics are attached.
///
/// Backends call this from their ability-tick system.
pub fn tick_coordinator(
    coordinator: &mut AbilityCoordinator,
    dt: f32,
    probe: impl SurfaceProbe,
    diagnostics: Option<&mut ProbeDiagnostics>,
) {
    match diagnostics {
        Some(diagnostics) => {
            let recorder = RecordingProbe::new(probe);
            coordinator.tick(dt, &recorder);
            diagnostics.traces = recorder.take_traces();
        }
        None => coordinator.tick(dt, &probe),
    }
}

/// Build or rebuild coordinators from [`Loadout`] and [`AbilityTuning`]
/// components when either is added or changed.
///
/// A missing half falls back to the coordinator's current value, or the
/// default for a new coordinator. Invalid configuration is logged and ignored.
pub fn apply_ability_config(
    mut commands: Commands,
    mut q: Query<
        (
            Entity,
            Option<&Loadout>,
            Option<&AbilityTuning>,
            Option<&mut AbilityCoordinator>,
        ),
        Or<(Changed<Loadout>, Changed<AbilityTuning>)>,
    >,
) {
    for (entity, loadout, tuning, coordinator) in &mut q {
        match coordinator {
            Some(mut coordinator) => {
                let loadout = loadout.copied().unwrap_or(*coordinator.loadout());
                let tuning = tuning.copied().unwrap_or(*coordinator.tuning());
                if let Err(error) = coordinator.reconfigure(loadout, tuning) {
                    tracing::warn!(?entity, %error, "rejected ability configuration");
                }
            }
            None => {
                let loadout = loadout.copied().unwrap_or_default();
                let tuning = tuning.copied().unwrap_or_default();
                match AbilityCoordinator::try_new(loadout, tuning, MotionState::default()) {
                    Ok(coordinator) => {
                        commands.entity(entity).insert(coordinator);
                    }
                    Err(error) => {
                        tracing::warn!(?entity, %error, "rejected ability configuration");
                    }
                }
            }
        }
    }
}

/// Copy velocity, position, facing and ground contact into each coordinator.
///
/// A grounded edge here is what triggers landing.
pub fn sync_motion_from_backend<B: AbilityPhysicsBackend>(world: &mut World) {
    let pitches: Vec<(Entity, f32)> = world
        .query::<&AbilityCamera>()
        .iter(world)
        .map(|camera| (camera.target, camera.pitch))
        .collect();

    let entities: Vec<(Entity, Option<GroundContact>)> = world
        .query_filtered::<(Entity, Option<&GroundContact>), With<AbilityCoordinator>>()
        .iter(world)
        .map(|(e, contact)| (e, contact.copied()))
        .collect();

    for (entity, contact) in entities {
        let velocity = B::get_velocity(world, entity);
        let position = B::get_position(world, entity);
        let forward = B::get_forward(world, entity);
        let pitch = pitches
            .iter()
            .find(|(target, _)| *target == entity)
            .map(|(_, pitch)| *pitch)
            .unwrap_or(0.0);
        let view = view_direction(forward, pitch);

        let Some(mut coordinator) = world.get_mut::<AbilityCoordinator>(entity) else {
            continue;
        };
        let grounded = contact
            .map(|c| c.grounded)
            .unwrap_or(coordinator.motion().is_grounded);
        coordinator.sync_physical(velocity, grounded, position, forward, view);
    }
}

/// Cancel dashes of characters that hit something.
pub fn apply_collisions(
    mut collisions: EventReader<AbilityCollision>,
    mut q_coordinators: Query<&mut AbilityCoordinator>,
) {
    for collision in collisions.read() {
        if let Ok(mut coordinator) = q_coordinators.get_mut(collision.entity) {
            coordinator.on_collision();
        }
    }
}

/// Feed queued and edge-derived input actions to each coordinator.
pub fn apply_ability_input(mut q: Query<(&mut AbilityInput, &mut AbilityCoordinator)>) {
    for (mut input, mut coordinator) in &mut q {
        for action in input.take_actions() {
            coordinator.handle_action(action);
        }
    }
}

/// Write the ability results back to the physics backend.
pub fn write_motion_to_backend<B: AbilityPhysicsBackend>(world: &mut World) {
    let entities: Vec<(Entity, Vec3, Vec3, f32, f32)> = world
        .query::<(Entity, &mut AbilityCoordinator)>()
        .iter_mut(world)
        .map(|(e, mut coordinator)| {
            let motion = coordinator.motion_mut();
            let acceleration = motion.take_force();
            (
                e,
                motion.velocity,
                acceleration,
                motion.gravity_scale,
                motion.ground_friction,
            )
        })
        .collect();

    for (entity, velocity, acceleration, gravity_scale, friction) in entities {
        let mass = B::get_mass(world, entity);
        B::set_velocity(world, entity, velocity);
        B::apply_force(world, entity, acceleration * mass);
        B::set_gravity_scale(world, entity, gravity_scale);
        B::set_friction(world, entity, friction);
    }
}

/// Forward buffered coordinator events as [`CharacterAbilityEvent`]s.
pub fn emit_ability_events(
    mut q: Query<(Entity, &mut AbilityCoordinator)>,
    mut writer: EventWriter<CharacterAbilityEvent>,
) {
    for (entity, mut coordinator) in &mut q {
        if coordinator.events().is_empty() {
            continue;
        }
        for event in coordinator.drain_events() {
            writer.write(CharacterAbilityEvent { entity, event });
        }
    }
}

/// Sync marker components based on coordinator state.
pub fn sync_ability_markers(
    mut commands: Commands,
    q: Query<(
        Entity,
        &AbilityCoordinator,
        Has<Dashing>,
        Has<Sliding>,
        Option<&WallRunning>,
    )>,
) {
    for (entity, coordinator, has_dashing, has_sliding, wall_running) in &q {
        let dashing = coordinator.dash().is_active();
        if dashing && !has_dashing {
            commands.entity(entity).insert(Dashing);
        } else if !dashing && has_dashing {
            commands.entity(entity).remove::<Dashing>();
        }

        let sliding = coordinator.slide().is_sliding();
        if sliding && !has_sliding {
            commands.entity(entity).insert(Sliding);
        } else if !sliding && has_sliding {
            commands.entity(entity).remove::<Sliding>();
        }

        let wall_run = coordinator.wall_run();
        if wall_run.is_running() {
            let marker = WallRunning::new(wall_run.side(), wall_run.wall_normal());
            if wall_running != Some(&marker) {
                commands.entity(entity).insert(marker);
            }
        } else if wall_running.is_some() {
            commands.entity(entity).remove::<WallRunning>();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_delta_falls_back_when_clock_is_idle() {
        assert_eq!(fixed_delta(None), 1.0 / 60.0);
        let time = Time::<Fixed>::from_hz(64.0);
        // Timestep is set but no step has elapsed yet.
        assert_eq!(fixed_delta(Some(&time)), 1.0 / 60.0);
    }

    #[test]
    fn view_direction_pitches_up() {
        let level = view_direction(Vec3::NEG_Z, 0.0);
        assert!((level - Vec3::NEG_Z).length() < 1e-6);

        let up = view_direction(Vec3::NEG_Z, std::f32::consts::FRAC_PI_2);
        assert!((up - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn view_direction_ignores_body_tilt() {
        let view = view_direction(Vec3::new(1.0, -3.0, 0.0), 0.0);
        assert!((view - Vec3::X).length() < 1e-6);
    }
}
