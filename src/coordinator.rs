//! Character-level ability coordination.
//!
//! [`AbilityCoordinator`] owns one character's [`MotionState`] and its three
//! abilities. It turns decoded input into ability calls and advances the
//! abilities in a fixed order each tick:
//!
//! 0. movement input, then the post-air-jump control window countdown
//! 1. wall-run (a run starting this tick refills dash charges)
//! 2. dash (its velocity override runs after wall-run, so dash wins ties)
//! 3. slide (additive force only; never outranks an earlier velocity claim)
//!
//! Illegal requests (dash without charges, slide while airborne, jumping
//! during a dash) are silent no-ops.

use bevy::prelude::*;

use crate::abilities::{Dash, DashStatus, Slide, WallRun};
use crate::config::{AbilityTuning, Loadout, SprintMode};
use crate::error::ConfigError;
use crate::events::AbilityEvent;
use crate::intent::InputAction;
use crate::math::horizontal;
use crate::motion::MotionState;
use crate::probe::SurfaceProbe;

/// Camera values produced by the abilities for the host's view.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewOutput {
    /// Absolute camera roll (radians).
    pub camera_roll: f32,
    /// Change in camera roll during the last tick.
    pub roll_delta: f32,
    /// Vertical eye offset to add on top of the stance eye height.
    pub eye_offset: f32,
    /// Look rotation to apply (radians): `x` yaw, `y` pitch.
    pub look_delta: Vec2,
}

/// Owner of a character's movement state and abilities.
#[derive(Component, Reflect, Debug, Clone)]
#[reflect(Component)]
pub struct AbilityCoordinator {
    motion: MotionState,
    loadout: Loadout,
    tuning: AbilityTuning,
    dash: Dash,
    slide: Slide,
    wall_run: WallRun,
    air_jumps_remaining: u32,
    air_control_window: f32,
    move_axis: Vec2,
    sprinting: bool,
    /// Sprint state requested while airborne, applied on landing.
    deferred_sprint: Option<bool>,
    crouched: bool,
    eye_offset: f32,
    look_delta: Vec2,
    roll_delta: f32,
    events: Vec<AbilityEvent>,
}

impl Default for AbilityCoordinator {
    fn default() -> Self {
        Self::new(Loadout::default(), AbilityTuning::default(), MotionState::default())
    }
}

impl AbilityCoordinator {
    /// Create a coordinator. Configuration is trusted as given; use
    /// [`AbilityCoordinator::try_new`] for data loaded at runtime.
    pub fn new(loadout: Loadout, tuning: AbilityTuning, mut motion: MotionState) -> Self {
        motion.max_walk_speed = tuning.locomotion.walk_speed;
        Self {
            motion,
            dash: Dash::new(tuning.dash, loadout.dash_charges),
            slide: Slide::new(tuning.slide),
            wall_run: WallRun::new(tuning.wall_run),
            air_jumps_remaining: loadout.extra_air_jumps,
            air_control_window: 0.0,
            move_axis: Vec2::ZERO,
            sprinting: false,
            deferred_sprint: None,
            crouched: false,
            eye_offset: 0.0,
            look_delta: Vec2::ZERO,
            roll_delta: 0.0,
            events: Vec::new(),
            loadout,
            tuning,
        }
    }

    /// Validate the configuration, then create a coordinator.
    pub fn try_new(loadout: Loadout, tuning: AbilityTuning, motion: MotionState) -> Result<Self, ConfigError> {
        loadout.validate()?;
        tuning.validate()?;
        Ok(Self::new(loadout, tuning, motion))
    }

    /// Swap in a new loadout and tuning, keeping the movement state.
    ///
    /// Active abilities are ended first so friction and gravity are restored,
    /// then every ability is rebuilt from the new configuration with full
    /// charges and air jumps. Invalid configuration leaves the coordinator
    /// untouched.
    pub fn reconfigure(&mut self, loadout: Loadout, tuning: AbilityTuning) -> Result<(), ConfigError> {
        loadout.validate()?;
        tuning.validate()?;

        if self.dash.cancel() {
            self.events.push(AbilityEvent::DashCancelled);
        }
        if self.slide.end(&mut self.motion) {
            self.events.push(AbilityEvent::SlideEnded);
        }
        if let Some(side) = self.wall_run.land(&mut self.motion) {
            self.events.push(AbilityEvent::WallRunEnded { side });
        }

        self.dash = Dash::new(tuning.dash, loadout.dash_charges);
        self.slide = Slide::new(tuning.slide);
        self.wall_run = WallRun::new(tuning.wall_run);
        self.wall_run.set_forward_input(self.move_axis.y);
        self.air_jumps_remaining = loadout.extra_air_jumps;
        self.air_control_window = 0.0;
        self.motion.max_walk_speed = if self.sprinting {
            tuning.locomotion.sprint_speed
        } else {
            tuning.locomotion.walk_speed
        };
        self.loadout = loadout;
        self.tuning = tuning;
        tracing::debug!(?loadout, "abilities reconfigured");
        Ok(())
    }

    pub fn motion(&self) -> &MotionState {
        &self.motion
    }

    /// Mutable access to the movement state, for hosts that write physical
    /// state field by field instead of through [`AbilityCoordinator::sync_physical`].
    pub fn motion_mut(&mut self) -> &mut MotionState {
        &mut self.motion
    }

    pub fn loadout(&self) -> &Loadout {
        &self.loadout
    }

    pub fn tuning(&self) -> &AbilityTuning {
        &self.tuning
    }

    pub fn dash(&self) -> &Dash {
        &self.dash
    }

    pub fn slide(&self) -> &Slide {
        &self.slide
    }

    pub fn wall_run(&self) -> &WallRun {
        &self.wall_run
    }

    pub fn air_jumps_remaining(&self) -> u32 {
        self.air_jumps_remaining
    }

    /// Seconds left of full forward air control after an air jump.
    pub fn air_control_window(&self) -> f32 {
        self.air_control_window
    }

    pub fn is_sprinting(&self) -> bool {
        self.sprinting
    }

    pub fn is_crouched(&self) -> bool {
        self.crouched
    }

    /// Camera values for the host's view.
    pub fn view(&self) -> ViewOutput {
        ViewOutput {
            camera_roll: self.wall_run.camera_roll(),
            roll_delta: self.roll_delta,
            eye_offset: self.eye_offset,
            look_delta: self.look_delta,
        }
    }

    /// Take the accumulated look rotation.
    pub fn take_look_delta(&mut self) -> Vec2 {
        std::mem::take(&mut self.look_delta)
    }

    /// Events raised since the last drain.
    pub fn events(&self) -> &[AbilityEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<AbilityEvent> {
        std::mem::take(&mut self.events)
    }

    /// Copy physical state from the host's physics.
    ///
    /// A change from airborne to grounded counts as a landing.
    pub fn sync_physical(
        &mut self,
        velocity: Vec3,
        grounded: bool,
        position: Vec3,
        body_forward: Vec3,
        view_forward: Vec3,
    ) {
        self.motion.velocity = velocity;
        self.motion.position = position;
        self.motion.set_facing(body_forward, view_forward);
        self.set_grounded(grounded);
    }

    /// Update ground contact, landing on a rising edge.
    pub fn set_grounded(&mut self, grounded: bool) {
        let landed = grounded && !self.motion.is_grounded;
        self.motion.is_grounded = grounded;
        if landed {
            self.land();
        }
    }

    /// Landing: ends any wall-run (clearing its cooldown), refills dash
    /// charges and air jumps, and applies sprint input deferred in the air.
    pub fn land(&mut self) {
        if let Some(side) = self.wall_run.land(&mut self.motion) {
            self.events.push(AbilityEvent::WallRunEnded { side });
        }
        self.dash.reset_charges();
        self.air_jumps_remaining = self.loadout.extra_air_jumps;
        self.air_control_window = 0.0;
        if let Some(sprinting) = self.deferred_sprint.take() {
            self.set_sprinting(sprinting);
        }
        tracing::debug!(charges = self.dash.charges_remaining(), "landed");
        self.events.push(AbilityEvent::Landed);
    }

    /// Blocking collision reported by the host: cancels any dash.
    pub fn on_collision(&mut self) {
        if self.dash.cancel() {
            tracing::debug!("collision cancelled dash");
            self.events.push(AbilityEvent::DashCancelled);
        }
    }

    pub fn handle_action(&mut self, action: InputAction) {
        match action {
            InputAction::Move(axis) => {
                self.move_axis = axis;
                self.wall_run.set_forward_input(axis.y);
            }
            InputAction::Look(delta) => self.look(delta),
            InputAction::JumpPressed => self.jump(),
            InputAction::JumpReleased => {}
            InputAction::CrouchPressed => self.crouch(),
            InputAction::CrouchReleased => self.uncrouch(),
            InputAction::Sprint(pressed) => self.sprint(pressed),
            InputAction::Dash => self.start_dash(),
        }
    }

    /// Advance every ability by one tick.
    pub fn tick(&mut self, dt: f32, probe: &impl SurfaceProbe) {
        self.motion.release_authority();

        self.apply_move_input();
        if self.air_control_window > 0.0 {
            self.air_control_window = (self.air_control_window - dt).max(0.0);
        }

        let decay = (self.tuning.locomotion.crouch_eye_speed * dt).min(1.0);
        self.eye_offset *= 1.0 - decay;

        let report = self.wall_run.update(dt, &mut self.motion, probe);
        if let Some(side) = report.ended {
            self.events.push(AbilityEvent::WallRunEnded { side });
        }
        if let Some(side) = report.began {
            self.dash.reset_charges();
            self.events.push(AbilityEvent::WallRunBegan { side });
        }
        self.roll_delta = report.roll_delta;

        if self.dash.update(dt, &mut self.motion) == DashStatus::Finished {
            self.events.push(AbilityEvent::DashEnded);
        }

        self.slide.update(&mut self.motion, probe);
    }

    fn apply_move_input(&mut self) {
        let locomotion = &self.tuning.locomotion;
        let strafe = if self.sprinting {
            self.move_axis.x * locomotion.sprint_strafe_scale
        } else {
            self.move_axis.x
        };

        let wish = self.motion.forward * self.move_axis.y;
        let opposes = wish.dot(horizontal(self.motion.velocity)) < 0.0;
        let forward = if self.motion.is_grounded || self.air_control_window > 0.0 || opposes {
            self.move_axis.y
        } else {
            0.0
        };

        self.motion.move_input = self.motion.forward * forward + self.motion.right * strafe;
    }

    fn look(&mut self, delta: Vec2) {
        if self.dash.is_active() && !self.tuning.dash.look_while_dashing {
            return;
        }
        self.look_delta += delta * self.tuning.locomotion.look_sensitivity;
    }

    fn jump(&mut self) {
        if self.dash.is_active() {
            return;
        }

        if self.wall_run.is_running() {
            if let Some(side) = self.wall_run.jump(&mut self.motion) {
                self.events.push(AbilityEvent::WallJumped { side });
            }
            return;
        }

        let locomotion = self.tuning.locomotion;
        if self.motion.is_grounded {
            self.motion.velocity.y = locomotion.jump_velocity;
            self.events.push(AbilityEvent::Jumped);
        } else if self.air_jumps_remaining > 0 {
            self.air_jumps_remaining -= 1;
            let carried = horizontal(self.motion.velocity) * locomotion.air_jump_speed_retention;
            self.motion.velocity = carried + Vec3::Y * locomotion.air_jump_velocity;
            self.air_control_window = locomotion.air_jump_control_window;
            tracing::debug!(remaining = self.air_jumps_remaining, "air jump");
            self.events.push(AbilityEvent::AirJumped {
                remaining: self.air_jumps_remaining,
            });
        }
    }

    fn crouch(&mut self) {
        if self.crouched {
            return;
        }
        self.crouched = true;
        self.eye_offset += self.tuning.locomotion.crouch_eye_drop;
        if self.loadout.slide_enabled && self.slide.try_begin(&mut self.motion) {
            self.events.push(AbilityEvent::SlideBegan);
        }
    }

    fn uncrouch(&mut self) {
        if !self.crouched {
            return;
        }
        self.crouched = false;
        self.eye_offset -= self.tuning.locomotion.crouch_eye_drop;
        if self.slide.end(&mut self.motion) {
            self.events.push(AbilityEvent::SlideEnded);
        }
    }

    fn sprint(&mut self, pressed: bool) {
        let current = self.deferred_sprint.unwrap_or(self.sprinting);
        let wanted = match self.loadout.sprint_mode {
            SprintMode::Hold => pressed,
            SprintMode::Toggle if pressed => !current,
            SprintMode::Toggle => return,
        };

        if self.motion.is_airborne() {
            self.deferred_sprint = Some(wanted);
        } else {
            self.set_sprinting(wanted);
        }
    }

    fn set_sprinting(&mut self, sprinting: bool) {
        if self.sprinting == sprinting {
            return;
        }
        self.sprinting = sprinting;
        let locomotion = &self.tuning.locomotion;
        self.motion.max_walk_speed = if sprinting {
            locomotion.sprint_speed
        } else {
            locomotion.walk_speed
        };
        self.events.push(AbilityEvent::SprintChanged { sprinting });
    }

    fn start_dash(&mut self) {
        if !self.loadout.dash_enabled {
            return;
        }
        let kind = self.loadout.dash_kind;
        if self.dash.start(kind, &self.motion) {
            self.events.push(AbilityEvent::DashStarted { kind });
        }
    }
}
