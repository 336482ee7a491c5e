//! Rapier3D physics backend implementation.
//!
//! This module provides the physics backend for Bevy Rapier3D.
//! Enable with the `rapier3d` feature.
//!
//! Wall-run probes only hit colliders that are members of
//! [`WALL_RUN_SURFACE`]. Ground probes hit any solid collider the character's
//! own [`CollisionGroups`] allow.

use bevy::prelude::*;
use bevy_rapier3d::geometry::Group;
use bevy_rapier3d::prelude::*;
use bevy_rapier3d::rapier::geometry::CollisionEventFlags;

use crate::backend::{AbilityPhysicsBackend, GroundContact};
use crate::coordinator::AbilityCoordinator;
use crate::events::AbilityCollision;
use crate::probe::{ProbeDiagnostics, ProbeRay, SurfaceHit, SurfaceLayer, SurfaceProbe};
use crate::systems::{fixed_delta, tick_coordinator};
use crate::AbilitySet;

/// Collision group membership that marks a collider as wall-runnable.
pub const WALL_RUN_SURFACE: Group = Group::GROUP_3;

/// Rapier3D physics backend for the parkour abilities.
pub struct Rapier3dBackend;

impl AbilityPhysicsBackend for Rapier3dBackend {
    fn plugin() -> impl Plugin {
        Rapier3dBackendPlugin
    }

    fn get_velocity(world: &World, entity: Entity) -> Vec3 {
        world
            .get::<Velocity>(entity)
            .map(|v| v.linvel)
            .unwrap_or(Vec3::ZERO)
    }

    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec3) {
        if let Some(mut vel) = world.get_mut::<Velocity>(entity) {
            vel.linvel = velocity;
        }
    }

    fn apply_force(world: &mut World, entity: Entity, force: Vec3) {
        // Swap last step's ability force for this one, leaving other forces
        // on ExternalForce untouched.
        let previous = world
            .get_mut::<AbilityForce>(entity)
            .map(|mut applied| std::mem::replace(&mut applied.0, force))
            .unwrap_or(Vec3::ZERO);
        if let Some(mut ext_force) = world.get_mut::<ExternalForce>(entity) {
            ext_force.force += force - previous;
        }
    }

    fn set_gravity_scale(world: &mut World, entity: Entity, scale: f32) {
        if let Some(mut gravity) = world.get_mut::<GravityScale>(entity) {
            gravity.0 = scale;
        }
    }

    fn get_gravity_scale(world: &World, entity: Entity) -> f32 {
        world.get::<GravityScale>(entity).map(|g| g.0).unwrap_or(1.0)
    }

    fn set_friction(world: &mut World, entity: Entity, friction: f32) {
        if let Some(mut f) = world.get_mut::<Friction>(entity) {
            f.coefficient = friction;
        }
    }

    fn get_mass(world: &World, entity: Entity) -> f32 {
        world
            .get::<ReadMassProperties>(entity)
            .map(|props| props.mass)
            .filter(|mass| *mass > 0.0 && mass.is_finite())
            .unwrap_or(1.0)
    }
}

/// Ability force currently applied through [`ExternalForce`].
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct AbilityForce(pub Vec3);

/// Ground sensing parameters for the Rapier backend.
#[derive(Resource, Reflect, Debug, Clone, Copy)]
#[reflect(Resource)]
pub struct RapierAbilitySettings {
    /// Length of the downward ground ray from the character origin.
    pub ground_probe_length: f32,
    /// Steepest ground (radians from horizontal) that still counts as grounded.
    pub max_ground_angle: f32,
}

impl Default for RapierAbilitySettings {
    fn default() -> Self {
        Self {
            ground_probe_length: 1.1,
            max_ground_angle: 50.0_f32.to_radians(),
        }
    }
}

/// Plugin that sets up Rapier3D-specific systems for the abilities.
pub struct Rapier3dBackendPlugin;

impl Plugin for Rapier3dBackendPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<AbilityForce>();
        app.register_type::<RapierAbilitySettings>();
        app.init_resource::<RapierAbilitySettings>();

        app.add_systems(
            FixedUpdate,
            (rapier_ground_detection, forward_rapier_collisions).in_set(AbilitySet::Sensors),
        );
        app.add_systems(
            FixedUpdate,
            rapier_tick_abilities.in_set(AbilitySet::Abilities),
        );
    }
}

/// [`SurfaceProbe`] backed by Rapier ray casts.
pub struct RapierProbe<'c, 'w> {
    context: &'c RapierContext<'w>,
    exclude: Entity,
    groups: Option<CollisionGroups>,
}

impl<'c, 'w> RapierProbe<'c, 'w> {
    /// Probe on behalf of `exclude`, which is never hit.
    pub fn new(context: &'c RapierContext<'w>, exclude: Entity, groups: Option<CollisionGroups>) -> Self {
        Self {
            context,
            exclude,
            groups,
        }
    }
}

impl SurfaceProbe for RapierProbe<'_, '_> {
    fn cast(&self, ray: &ProbeRay) -> Option<SurfaceHit> {
        let direction = ray.direction();
        if direction == Vec3::ZERO {
            return None;
        }

        let groups = match ray.layer {
            SurfaceLayer::Visibility => self.groups,
            SurfaceLayer::WallRun => Some(CollisionGroups::new(Group::ALL, WALL_RUN_SURFACE)),
        };
        let mut filter = QueryFilter::default()
            .exclude_rigid_body(self.exclude)
            .exclude_sensors();
        if let Some(groups) = groups {
            filter = filter.groups(groups);
        }

        self.context
            .cast_ray_and_get_normal(ray.origin, direction, ray.length(), true, filter)
            .map(|(entity, hit)| SurfaceHit::new(hit.time_of_impact, hit.point, hit.normal, Some(entity)))
    }
}

/// Cast a ray straight down from each character and record ground contact.
fn rapier_ground_detection(
    rapier_context: ReadRapierContext,
    settings: Res<RapierAbilitySettings>,
    mut q_characters: Query<
        (Entity, &GlobalTransform, &mut GroundContact, Option<&CollisionGroups>),
        With<AbilityCoordinator>,
    >,
) {
    let Ok(context) = rapier_context.single() else {
        return;
    };
    let min_normal_y = settings.max_ground_angle.cos();

    for (entity, transform, mut contact, groups) in &mut q_characters {
        let probe = RapierProbe::new(&context, entity, groups.copied());
        let ray = ProbeRay::from_direction(
            transform.translation(),
            Vec3::NEG_Y,
            settings.ground_probe_length,
            SurfaceLayer::Visibility,
        );

        let next = match probe.cast(&ray) {
            Some(hit) if hit.normal.y >= min_normal_y => GroundContact::grounded(hit.normal, hit.distance),
            _ => GroundContact::airborne(),
        };
        if *contact != next {
            *contact = next;
        }
    }
}

/// Report contact starts involving a character as [`AbilityCollision`]s.
///
/// Colliders need `ActiveEvents::COLLISION_EVENTS` for Rapier to emit these.
fn forward_rapier_collisions(
    mut collisions: EventReader<CollisionEvent>,
    q_characters: Query<(), With<AbilityCoordinator>>,
    mut writer: EventWriter<AbilityCollision>,
) {
    for collision in collisions.read() {
        let CollisionEvent::Started(a, b, flags) = collision else {
            continue;
        };
        if flags.contains(CollisionEventFlags::SENSOR) {
            continue;
        }
        for entity in [*a, *b] {
            if q_characters.contains(entity) {
                writer.write(AbilityCollision { entity });
            }
        }
    }
}

/// Advance every coordinator against Rapier-backed probes.
fn rapier_tick_abilities(
    rapier_context: ReadRapierContext,
    time: Res<Time<Fixed>>,
    mut q_characters: Query<(
        Entity,
        &mut AbilityCoordinator,
        Option<&CollisionGroups>,
        Option<&mut ProbeDiagnostics>,
    )>,
) {
    let Ok(context) = rapier_context.single() else {
        return;
    };
    let dt = fixed_delta(Some(&time));

    for (entity, mut coordinator, groups, mut diagnostics) in &mut q_characters {
        let probe = RapierProbe::new(&context, entity, groups.copied());
        tick_coordinator(&mut coordinator, dt, probe, diagnostics.as_deref_mut());
    }
}

/// Bundle for creating an ability character with Rapier3D physics.
///
/// # Example
///
/// ```ignore
/// use bevy::prelude::*;
/// use bevy_rapier3d::prelude::*;
/// use msg_parkour_abilities::prelude::*;
///
/// fn spawn_player(mut commands: Commands) {
///     let player = commands
///         .spawn((
///             Transform::from_xyz(0.0, 2.0, 0.0),
///             AbilityCoordinator::try_new(Loadout::default(), AbilityTuning::default(), default())
///                 .expect("valid loadout"),
///             AbilityInput::default(),
///             Rapier3dAbilityBundle::new(),
///             Collider::capsule_y(0.5, 0.4),
///         ))
///         .id();
///     commands.spawn((Camera3d::default(), AbilityCamera::new(player), ChildOf(player)));
/// }
/// ```
///
/// # Defaults
///
/// - `rigid_body`: [`RigidBody::Dynamic`]
/// - `locked_axes`: [`LockedAxes::ROTATION_LOCKED`] so the capsule stays upright
/// - `friction`: 8.0, matching [`MotionState`](crate::motion::MotionState)'s default
/// - `gravity_scale`: 1.0
#[derive(Bundle)]
pub struct Rapier3dAbilityBundle {
    pub rigid_body: RigidBody,
    pub velocity: Velocity,
    pub external_force: ExternalForce,
    pub ability_force: AbilityForce,
    pub gravity_scale: GravityScale,
    pub friction: Friction,
    pub locked_axes: LockedAxes,
    pub mass_properties: ReadMassProperties,
    pub ground_contact: GroundContact,
    pub active_events: ActiveEvents,
}

impl Default for Rapier3dAbilityBundle {
    fn default() -> Self {
        Self::new()
    }
}

impl Rapier3dAbilityBundle {
    pub fn new() -> Self {
        Self {
            rigid_body: RigidBody::Dynamic,
            velocity: Velocity::default(),
            external_force: ExternalForce::default(),
            ability_force: AbilityForce::default(),
            gravity_scale: GravityScale(1.0),
            friction: Friction::coefficient(8.0),
            locked_axes: LockedAxes::ROTATION_LOCKED,
            mass_properties: ReadMassProperties::default(),
            ground_contact: GroundContact::default(),
            active_events: ActiveEvents::COLLISION_EVENTS,
        }
    }

    /// Set the rigid body type for the character.
    pub fn with_body(mut self, body: RigidBody) -> Self {
        self.rigid_body = body;
        self
    }

    /// Set the ground friction coefficient.
    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = Friction::coefficient(friction);
        self
    }
}
