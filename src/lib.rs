//! # `msg_parkour_abilities`
//!
//! First-person parkour movement abilities layered over a physics-driven
//! character controller: dash, slide, wall-run, air jumps and sprint.
//!
//! The crate does not move characters by itself. The host's controller walks,
//! turns and integrates physics; the abilities read physical state, adjust
//! velocity, gravity scale, air control and friction, and hand the result back.
//!
//! ## Architecture
//!
//! - [`AbilityCoordinator`](coordinator::AbilityCoordinator) owns one
//!   character's [`MotionState`](motion::MotionState) and its abilities, and
//!   runs them in a fixed order every tick so they never race on the same
//!   field.
//! - Each ability ([`Dash`](abilities::Dash), [`Slide`](abilities::Slide),
//!   [`WallRun`](abilities::WallRun)) is a small state machine that borrows the
//!   motion state for a single call.
//! - Geometry queries go through [`SurfaceProbe`](probe::SurfaceProbe), so the
//!   abilities run without a physics engine in tests.
//! - [`ParkourAbilitiesPlugin`] wires everything into Bevy's `FixedUpdate`
//!   through a physics backend (Rapier3D included).
//!
//! ## Usage
//!
//! ```rust
//! use bevy::prelude::*;
//! use msg_parkour_abilities::prelude::*;
//!
//! let mut coordinator = AbilityCoordinator::try_new(
//!     Loadout::default().with_dash(DashKind::Fixed, 2),
//!     AbilityTuning::default(),
//!     MotionState::default(),
//! )
//! .unwrap();
//!
//! coordinator.handle_action(InputAction::Dash);
//! coordinator.tick(1.0 / 60.0, &NoSurfaces);
//! assert!(coordinator.dash().is_active());
//! assert_eq!(coordinator.dash().charges_remaining(), 1);
//! ```

use bevy::prelude::*;

pub mod abilities;
pub mod backend;
pub mod camera;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod intent;
pub mod math;
pub mod motion;
pub mod probe;
pub mod state;
pub mod systems;

#[cfg(feature = "rapier3d")]
pub mod rapier;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::abilities::{Dash, Slide, WallRun, WallSide};
    pub use crate::backend::{AbilityPhysicsBackend, GroundContact};
    pub use crate::camera::AbilityCamera;
    pub use crate::config::{
        AbilityTuning, DashConfig, DashKind, Loadout, LocomotionConfig, SlideConfig, SprintMode,
        WallRunConfig, WallRunGravity,
    };
    pub use crate::coordinator::{AbilityCoordinator, ViewOutput};
    pub use crate::error::ConfigError;
    pub use crate::events::{AbilityCollision, AbilityEvent, CharacterAbilityEvent};
    pub use crate::intent::{AbilityInput, InputAction};
    pub use crate::motion::{MotionState, VelocityAuthority};
    pub use crate::probe::{NoSurfaces, ProbeDiagnostics, ProbeRay, SurfaceHit, SurfaceLayer, SurfaceProbe};
    pub use crate::state::{Dashing, Sliding, WallRunning};
    pub use crate::{AbilitySet, ParkourAbilitiesPlugin};

    #[cfg(feature = "rapier3d")]
    pub use crate::rapier::{Rapier3dAbilityBundle, Rapier3dBackend, WALL_RUN_SURFACE};
}

/// System sets for the ability pipeline, run in order in `FixedUpdate`.
///
/// Host locomotion that should see this tick's ability output belongs after
/// [`AbilitySet::Output`]; locomotion that abilities should override belongs
/// before [`AbilitySet::Sync`].
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum AbilitySet {
    /// Backend sensors: ground contact, collisions.
    Sensors,
    /// Apply changed configuration, then copy physical state into each
    /// coordinator.
    Sync,
    /// Collisions and input actions.
    Input,
    /// Advance the abilities.
    Abilities,
    /// Write results back to physics, emit events, sync markers.
    Output,
}

/// Main plugin for the parkour abilities.
///
/// Generic over a physics backend `B` which moves state between the engine and
/// the abilities and provides their surface probes.
///
/// # Examples
///
/// With the Rapier3D backend:
/// ```rust,no_run
/// use bevy::prelude::*;
/// use bevy_rapier3d::prelude::*;
/// use msg_parkour_abilities::prelude::*;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
///     .add_plugins(ParkourAbilitiesPlugin::<Rapier3dBackend>::default())
///     .run();
/// ```
pub struct ParkourAbilitiesPlugin<B: backend::AbilityPhysicsBackend> {
    _marker: std::marker::PhantomData<B>,
}

impl<B: backend::AbilityPhysicsBackend> Default for ParkourAbilitiesPlugin<B> {
    fn default() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

impl<B: backend::AbilityPhysicsBackend> Plugin for ParkourAbilitiesPlugin<B> {
    fn build(&self, app: &mut App) {
        app.register_type::<coordinator::AbilityCoordinator>();
        app.register_type::<config::Loadout>();
        app.register_type::<config::AbilityTuning>();
        app.register_type::<intent::AbilityInput>();
        app.register_type::<camera::AbilityCamera>();
        app.register_type::<backend::GroundContact>();
        app.register_type::<probe::ProbeDiagnostics>();
        app.register_type::<state::Dashing>();
        app.register_type::<state::Sliding>();
        app.register_type::<state::WallRunning>();

        app.add_event::<events::CharacterAbilityEvent>();
        app.add_event::<events::AbilityCollision>();

        app.configure_sets(
            FixedUpdate,
            (
                AbilitySet::Sensors,
                AbilitySet::Sync,
                AbilitySet::Input,
                AbilitySet::Abilities,
                AbilitySet::Output,
            )
                .chain(),
        );

        app.add_plugins(B::plugin());

        app.add_systems(
            FixedUpdate,
            (systems::apply_ability_config, systems::sync_motion_from_backend::<B>)
                .chain()
                .in_set(AbilitySet::Sync),
        );
        app.add_systems(
            FixedUpdate,
            (systems::apply_collisions, systems::apply_ability_input)
                .chain()
                .in_set(AbilitySet::Input),
        );
        app.add_systems(
            FixedUpdate,
            (
                systems::write_motion_to_backend::<B>,
                systems::emit_ability_events,
                systems::sync_ability_markers,
            )
                .chain()
                .in_set(AbilitySet::Output),
        );

        app.add_systems(Update, camera::apply_ability_camera);
    }
}
