//! Ability configuration.
//!
//! Two records configure a character:
//! - [`Loadout`]: which abilities the character has and how many uses
//!   (jumps, dash charges). Loaded once per character, read-only during play.
//! - [`AbilityTuning`]: feel parameters for each ability (speeds, durations,
//!   probe geometry).
//!
//! Both are plain data and `serde`-serializable so hosts can load them from
//! whatever asset format they use. Distances are meters, times are seconds,
//! angles are radians.

use std::f32::consts::FRAC_PI_4;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How the sustained dash speed is derived from the pre-dash speed.
#[derive(Reflect, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DashKind {
    /// Dash at the current speed, redirected along the view.
    PreserveSpeed,
    /// Current speed plus a boost that shrinks as current speed grows.
    #[default]
    DiminishingBoost,
    /// Fixed absolute dash speed.
    Fixed,
}

impl DashKind {
    /// Map a numeric selector (as stored in loadout assets) to a dash kind.
    ///
    /// Unknown selectors fall back to [`DashKind::PreserveSpeed`].
    pub fn from_index(index: u8) -> Self {
        match index {
            1 => Self::DiminishingBoost,
            2 => Self::Fixed,
            _ => Self::PreserveSpeed,
        }
    }
}

/// How the sprint input is interpreted.
#[derive(Reflect, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SprintMode {
    /// Sprint while the button is held.
    #[default]
    Hold,
    /// Each press flips sprinting on or off; releases are ignored.
    Toggle,
}

/// Per-character ability loadout.
///
/// As a component it configures the entity's
/// [`AbilityCoordinator`](crate::coordinator::AbilityCoordinator), creating one
/// if needed; changing it rebuilds the abilities.
#[derive(Component, Reflect, Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
#[serde(default)]
pub struct Loadout {
    /// Extra jumps available while airborne.
    pub extra_air_jumps: u32,
    /// Whether the dash ability is available at all.
    pub dash_enabled: bool,
    /// Dash speed policy.
    pub dash_kind: DashKind,
    /// Dashes available between landings.
    pub dash_charges: u32,
    /// Sprint input interpretation.
    pub sprint_mode: SprintMode,
    /// Whether the slide ability is available at all.
    pub slide_enabled: bool,
    /// Reserved: spring-assisted jumps. Not wired to any behavior.
    pub spring_shoes: bool,
    /// Reserved: downward air stomp. Not wired to any behavior.
    pub air_stomp: bool,
}

impl Default for Loadout {
    fn default() -> Self {
        Self {
            extra_air_jumps: 1,
            dash_enabled: true,
            dash_kind: DashKind::DiminishingBoost,
            dash_charges: 1,
            sprint_mode: SprintMode::Hold,
            slide_enabled: true,
            spring_shoes: false,
            air_stomp: false,
        }
    }
}

impl Loadout {
    /// A loadout with every ability switched off.
    pub fn grounded() -> Self {
        Self {
            extra_air_jumps: 0,
            dash_enabled: false,
            dash_charges: 0,
            slide_enabled: false,
            ..default()
        }
    }

    /// Builder: set extra air jumps.
    pub fn with_air_jumps(mut self, jumps: u32) -> Self {
        self.extra_air_jumps = jumps;
        self
    }

    /// Builder: enable dashing with the given kind and charge count.
    pub fn with_dash(mut self, kind: DashKind, charges: u32) -> Self {
        self.dash_enabled = true;
        self.dash_kind = kind;
        self.dash_charges = charges;
        self
    }

    /// Builder: disable dashing.
    pub fn without_dash(mut self) -> Self {
        self.dash_enabled = false;
        self
    }

    /// Builder: disable sliding.
    pub fn without_slide(mut self) -> Self {
        self.slide_enabled = false;
        self
    }

    /// Builder: set sprint mode.
    pub fn with_sprint_mode(mut self, mode: SprintMode) -> Self {
        self.sprint_mode = mode;
        self
    }

    /// Check the loadout for combinations the abilities cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dash_enabled && self.dash_charges == 0 {
            return Err(ConfigError::DashWithoutCharges);
        }
        Ok(())
    }
}

/// Dash tuning.
#[derive(Reflect, Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct DashConfig {
    /// Dash duration in seconds.
    pub duration: f32,
    /// Absolute speed used by [`DashKind::Fixed`].
    pub speed: f32,
    /// Numerator of the [`DashKind::DiminishingBoost`] boost (m²/s²).
    pub boost_factor: f32,
    /// Speeds below this are treated as this speed when computing the boost.
    pub boost_speed_floor: f32,
    /// Whether look input is honored while dashing.
    pub look_while_dashing: bool,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            duration: 0.2,
            speed: 30.0,
            boost_factor: 40.0,
            boost_speed_floor: 3.0,
            look_while_dashing: false,
        }
    }
}

impl DashConfig {
    /// Builder: set dash duration.
    pub fn with_duration(mut self, duration: f32) -> Self {
        self.duration = duration;
        self
    }

    /// Builder: set fixed dash speed.
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::positive("dash.duration", self.duration)?;
        ConfigError::non_negative("dash.speed", self.speed)?;
        ConfigError::non_negative("dash.boost_factor", self.boost_factor)?;
        ConfigError::positive("dash.boost_speed_floor", self.boost_speed_floor)
    }
}

/// Slide tuning.
#[derive(Reflect, Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct SlideConfig {
    /// Minimum horizontal speed needed to start sliding.
    pub begin_speed_threshold: f32,
    /// Ground friction while sliding.
    pub friction: f32,
    /// Slope angle at which slope acceleration saturates.
    pub max_angle_for_full_speed: f32,
    /// Slope acceleration at full slope, facing straight downhill.
    pub acceleration: f32,
    /// Slope acceleration stops once horizontal speed exceeds this.
    pub max_slide_speed: f32,
    /// Length of the downward ground probe.
    pub probe_length: f32,
}

impl Default for SlideConfig {
    fn default() -> Self {
        Self {
            begin_speed_threshold: 4.0,
            friction: 0.2,
            max_angle_for_full_speed: FRAC_PI_4,
            acceleration: 25.0,
            max_slide_speed: 30.0,
            probe_length: 1.5,
        }
    }
}

impl SlideConfig {
    /// Builder: set begin threshold.
    pub fn with_begin_threshold(mut self, speed: f32) -> Self {
        self.begin_speed_threshold = speed;
        self
    }

    /// Builder: set slope acceleration.
    pub fn with_acceleration(mut self, acceleration: f32) -> Self {
        self.acceleration = acceleration;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::non_negative("slide.begin_speed_threshold", self.begin_speed_threshold)?;
        ConfigError::non_negative("slide.friction", self.friction)?;
        ConfigError::positive("slide.max_angle_for_full_speed", self.max_angle_for_full_speed)?;
        ConfigError::non_negative("slide.acceleration", self.acceleration)?;
        ConfigError::positive("slide.max_slide_speed", self.max_slide_speed)?;
        ConfigError::positive("slide.probe_length", self.probe_length)
    }
}

/// What happens to gravity while wall running.
#[derive(Reflect, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub enum WallRunGravity {
    /// Blend the gravity scale toward this reduced value.
    Reduced(f32),
    /// Blend gravity and vertical velocity toward zero.
    #[default]
    Off,
}

/// Wall-run tuning.
#[derive(Reflect, Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct WallRunConfig {
    /// Acceleration along the wall at full forward input.
    pub acceleration: f32,
    /// No lateral force is injected above this horizontal speed.
    pub max_speed: f32,
    /// Seconds after a run ends before another may start.
    pub cooldown: f32,
    /// Camera roll while running (radians).
    pub camera_tilt: f32,
    /// Interpolation rate of the camera roll.
    pub camera_tilt_speed: f32,
    /// Gravity policy while running.
    pub gravity: WallRunGravity,
    /// Interpolation rate for gravity and vertical velocity blending.
    pub gravity_blend_speed: f32,
    /// Vertical velocity set by a wall jump.
    pub jump_height: f32,
    /// Horizontal launch speed away from the wall on a wall jump.
    pub jump_force: f32,
    /// Lateral reach of the wall probes.
    pub probe_reach: f32,
    /// How far behind the character the wall probes end.
    pub probe_back_offset: f32,
    /// Surfaces count as walls while `|normal.y|` is below this.
    pub wall_normal_band: f32,
}

impl Default for WallRunConfig {
    fn default() -> Self {
        Self {
            acceleration: 20.0,
            max_speed: 15.0,
            cooldown: 0.25,
            camera_tilt: 15.0_f32.to_radians(),
            camera_tilt_speed: 10.0,
            gravity: WallRunGravity::Off,
            gravity_blend_speed: 10.0,
            jump_height: 5.0,
            jump_force: 3.0,
            probe_reach: 0.85,
            probe_back_offset: 0.35,
            wall_normal_band: 0.52,
        }
    }
}

impl WallRunConfig {
    /// Builder: set gravity policy.
    pub fn with_gravity(mut self, gravity: WallRunGravity) -> Self {
        self.gravity = gravity;
        self
    }

    /// Builder: set cooldown.
    pub fn with_cooldown(mut self, cooldown: f32) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Builder: set speed ceiling.
    pub fn with_max_speed(mut self, max_speed: f32) -> Self {
        self.max_speed = max_speed;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::non_negative("wall_run.acceleration", self.acceleration)?;
        ConfigError::non_negative("wall_run.max_speed", self.max_speed)?;
        ConfigError::non_negative("wall_run.cooldown", self.cooldown)?;
        ConfigError::non_negative("wall_run.camera_tilt", self.camera_tilt)?;
        ConfigError::non_negative("wall_run.camera_tilt_speed", self.camera_tilt_speed)?;
        ConfigError::non_negative("wall_run.gravity_blend_speed", self.gravity_blend_speed)?;
        if let WallRunGravity::Reduced(scale) = self.gravity {
            ConfigError::non_negative("wall_run.gravity", scale)?;
        }
        ConfigError::non_negative("wall_run.jump_height", self.jump_height)?;
        ConfigError::non_negative("wall_run.jump_force", self.jump_force)?;
        ConfigError::positive("wall_run.probe_reach", self.probe_reach)?;
        ConfigError::non_negative("wall_run.probe_back_offset", self.probe_back_offset)?;
        ConfigError::in_range("wall_run.wall_normal_band", self.wall_normal_band, 0.0, 1.0)
    }
}

/// Tuning for the coordinator's own behavior: jumps, sprint, crouch, look.
#[derive(Reflect, Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct LocomotionConfig {
    /// Host walk speed while not sprinting.
    pub walk_speed: f32,
    /// Host walk speed while sprinting.
    pub sprint_speed: f32,
    /// Strafe input multiplier while sprinting.
    pub sprint_strafe_scale: f32,
    /// Vertical velocity of a grounded jump.
    pub jump_velocity: f32,
    /// Vertical velocity of an air jump.
    pub air_jump_velocity: f32,
    /// Fraction of horizontal velocity kept on an air jump.
    pub air_jump_speed_retention: f32,
    /// Seconds of full forward air control after an air jump.
    pub air_jump_control_window: f32,
    /// Eye height lost when crouching (standing minus crouched eye height).
    pub crouch_eye_drop: f32,
    /// Rate at which the crouch eye offset decays back to zero.
    pub crouch_eye_speed: f32,
    /// Radians of view rotation per unit of look input.
    pub look_sensitivity: f32,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            walk_speed: 6.0,
            sprint_speed: 12.0,
            sprint_strafe_scale: 1.0 / 3.0,
            jump_velocity: 4.2,
            air_jump_velocity: 8.0,
            air_jump_speed_retention: 0.7,
            air_jump_control_window: 0.3,
            crouch_eye_drop: 0.5,
            crouch_eye_speed: 13.0,
            look_sensitivity: 0.0025,
        }
    }
}

impl LocomotionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::positive("locomotion.walk_speed", self.walk_speed)?;
        ConfigError::positive("locomotion.sprint_speed", self.sprint_speed)?;
        ConfigError::in_range("locomotion.sprint_strafe_scale", self.sprint_strafe_scale, 0.0, 1.0)?;
        ConfigError::non_negative("locomotion.jump_velocity", self.jump_velocity)?;
        ConfigError::non_negative("locomotion.air_jump_velocity", self.air_jump_velocity)?;
        ConfigError::in_range(
            "locomotion.air_jump_speed_retention",
            self.air_jump_speed_retention,
            0.0,
            1.0,
        )?;
        ConfigError::non_negative("locomotion.air_jump_control_window", self.air_jump_control_window)?;
        ConfigError::non_negative("locomotion.crouch_eye_drop", self.crouch_eye_drop)?;
        ConfigError::non_negative("locomotion.crouch_eye_speed", self.crouch_eye_speed)?;
        ConfigError::non_negative("locomotion.look_sensitivity", self.look_sensitivity)
    }
}

/// All ability tuning for one character.
///
/// Works as a component the same way as [`Loadout`].
#[derive(Component, Reflect, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
#[reflect(Component)]
#[serde(default)]
pub struct AbilityTuning {
    pub dash: DashConfig,
    pub slide: SlideConfig,
    pub wall_run: WallRunConfig,
    pub locomotion: LocomotionConfig,
}

impl AbilityTuning {
    /// Snappier preset: shorter cooldown, stronger wall push, more air jump.
    pub fn arcade() -> Self {
        Self {
            dash: DashConfig {
                duration: 0.15,
                ..default()
            },
            wall_run: WallRunConfig {
                acceleration: 30.0,
                cooldown: 0.15,
                ..default()
            },
            locomotion: LocomotionConfig {
                air_jump_speed_retention: 0.85,
                air_jump_control_window: 0.5,
                ..default()
            },
            ..default()
        }
    }

    /// Builder: replace dash tuning.
    pub fn with_dash(mut self, dash: DashConfig) -> Self {
        self.dash = dash;
        self
    }

    /// Builder: replace slide tuning.
    pub fn with_slide(mut self, slide: SlideConfig) -> Self {
        self.slide = slide;
        self
    }

    /// Builder: replace wall-run tuning.
    pub fn with_wall_run(mut self, wall_run: WallRunConfig) -> Self {
        self.wall_run = wall_run;
        self
    }

    /// Builder: replace locomotion tuning.
    pub fn with_locomotion(mut self, locomotion: LocomotionConfig) -> Self {
        self.locomotion = locomotion;
        self
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.dash.validate()?;
        self.slide.validate()?;
        self.wall_run.validate()?;
        self.locomotion.validate()
    }
}
