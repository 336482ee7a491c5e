//! Wall-run: airborne running along steep walls to either side.
//!
//! Every step two probes are cast from the character, one to the right and
//! one to the left, both ending slightly behind it. The right side is checked
//! first, so a character between two walls always runs the right one.
//!
//! After a run ends the ability is locked out for `cooldown` seconds. Landing
//! clears the lockout immediately.

use bevy::prelude::*;

use crate::config::{WallRunConfig, WallRunGravity};
use crate::math::{horizontal, horizontal_speed, interp_angle_to, interp_to, UP};
use crate::motion::{MotionState, VelocityAuthority};
use crate::probe::{ProbeRay, SurfaceHit, SurfaceLayer, SurfaceProbe};

/// Which side of the character the wall is on.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WallSide {
    #[default]
    None,
    Left,
    Right,
}

impl WallSide {
    /// Sign that maps the wall tangent onto the character's forward direction.
    fn tangent_sign(self) -> f32 {
        match self {
            WallSide::Right => 1.0,
            WallSide::Left => -1.0,
            WallSide::None => 0.0,
        }
    }
}

/// Transitions and camera change produced by one wall-run step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WallRunReport {
    /// A run on this side started this step.
    pub began: Option<WallSide>,
    /// A run on this side ended this step.
    pub ended: Option<WallSide>,
    /// Change in camera roll this step (radians).
    pub roll_delta: f32,
}

/// Wall-run ability state.
#[derive(Reflect, Debug, Clone, PartialEq)]
pub struct WallRun {
    side: WallSide,
    on_cooldown: bool,
    cooldown_timer: f32,
    wall_normal: Vec3,
    camera_roll: f32,
    forward_input: f32,
    /// Gravity scale captured when the current run began.
    default_gravity_scale: f32,
    config: WallRunConfig,
}

impl WallRun {
    pub fn new(config: WallRunConfig) -> Self {
        Self {
            side: WallSide::None,
            on_cooldown: false,
            cooldown_timer: 0.0,
            wall_normal: Vec3::ZERO,
            camera_roll: 0.0,
            forward_input: 0.0,
            default_gravity_scale: 1.0,
            config,
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.side != WallSide::None
    }

    pub fn side(&self) -> WallSide {
        self.side
    }

    pub fn is_on_cooldown(&self) -> bool {
        self.on_cooldown
    }

    /// Seconds left on the lockout (zero when not on cooldown).
    pub fn cooldown_remaining(&self) -> f32 {
        self.cooldown_timer
    }

    /// Normal of the wall of the current or most recent run.
    pub fn wall_normal(&self) -> Vec3 {
        self.wall_normal
    }

    /// Current camera roll in radians. Negative rolls toward a right wall.
    pub fn camera_roll(&self) -> f32 {
        self.camera_roll
    }

    pub fn forward_input(&self) -> f32 {
        self.forward_input
    }

    /// Set the forward move axis, clamped to `[0, 1]`.
    pub fn set_forward_input(&mut self, value: f32) {
        self.forward_input = value.clamp(0.0, 1.0);
    }

    pub fn config(&self) -> &WallRunConfig {
        &self.config
    }

    /// Probe ray on one side of the character.
    pub fn probe_ray(&self, side: WallSide, motion: &MotionState) -> ProbeRay {
        let lateral = motion.right * side.tangent_sign() * self.config.probe_reach;
        let back = motion.forward * self.config.probe_back_offset;
        ProbeRay::new(motion.position, motion.position + lateral - back, SurfaceLayer::WallRun)
    }

    /// Advance one step: cooldown, wall detection, run forces and camera tilt.
    pub fn update(&mut self, dt: f32, motion: &mut MotionState, probe: &impl SurfaceProbe) -> WallRunReport {
        let mut report = WallRunReport::default();

        if self.on_cooldown {
            self.cooldown_timer -= dt;
            if self.cooldown_timer <= 0.0 {
                self.on_cooldown = false;
                self.cooldown_timer = 0.0;
            }
        }

        if !self.on_cooldown {
            self.detect(dt, motion, probe, &mut report);
        }

        let target = match self.side {
            WallSide::Right => -self.config.camera_tilt,
            WallSide::Left => self.config.camera_tilt,
            WallSide::None => 0.0,
        };
        let roll = interp_angle_to(self.camera_roll, target, dt, self.config.camera_tilt_speed);
        report.roll_delta = roll - self.camera_roll;
        self.camera_roll = roll;

        report
    }

    /// Jump off the wall. Returns the side left, or `None` when not running.
    pub fn jump(&mut self, motion: &mut MotionState) -> Option<WallSide> {
        if !self.is_running() {
            return None;
        }
        let side = self.end_run(motion);
        let away = horizontal(self.wall_normal).normalize_or_zero();
        motion.velocity += away * self.config.jump_force;
        motion.velocity.y = self.config.jump_height;
        motion.claim(VelocityAuthority::WallRun);
        tracing::debug!(?side, velocity = ?motion.velocity, "wall jump");
        Some(side)
    }

    /// End any run and clear the cooldown. Returns the side of an ended run.
    pub fn land(&mut self, motion: &mut MotionState) -> Option<WallSide> {
        let ended = self.is_running().then(|| self.end_run(motion));
        self.on_cooldown = false;
        self.cooldown_timer = 0.0;
        ended
    }

    fn detect(&mut self, dt: f32, motion: &mut MotionState, probe: &impl SurfaceProbe, report: &mut WallRunReport) {
        if let Some(hit) = self.find_wall(WallSide::Right, motion, probe) {
            self.run_along(WallSide::Right, hit, dt, motion, report);
            return;
        }
        if self.side == WallSide::Right {
            report.ended = Some(self.end_run(motion));
            return;
        }
        if let Some(hit) = self.find_wall(WallSide::Left, motion, probe) {
            self.run_along(WallSide::Left, hit, dt, motion, report);
            return;
        }
        if self.is_running() {
            report.ended = Some(self.end_run(motion));
        }
    }

    fn find_wall(&self, side: WallSide, motion: &MotionState, probe: &impl SurfaceProbe) -> Option<SurfaceHit> {
        let hit = probe.cast(&self.probe_ray(side, motion))?;
        (hit.normal.y.abs() < self.config.wall_normal_band && motion.is_airborne()).then_some(hit)
    }

    fn run_along(
        &mut self,
        side: WallSide,
        hit: SurfaceHit,
        dt: f32,
        motion: &mut MotionState,
        report: &mut WallRunReport,
    ) {
        if self.side != side {
            if self.side == WallSide::None {
                self.default_gravity_scale = motion.gravity_scale;
            } else {
                report.ended = Some(self.side);
            }
            report.began = Some(side);
            tracing::debug!(?side, normal = ?hit.normal, "wall run began");
        }
        self.side = side;
        self.wall_normal = hit.normal;

        motion.air_control = 0.0;
        let rate = self.config.gravity_blend_speed;
        match self.config.gravity {
            WallRunGravity::Reduced(target) => {
                motion.gravity_scale = interp_to(motion.gravity_scale, target, dt, rate);
            }
            WallRunGravity::Off => {
                motion.gravity_scale = interp_to(motion.gravity_scale, 0.0, dt, rate);
                motion.velocity.y = interp_to(motion.velocity.y, 0.0, dt, rate);
            }
        }

        if horizontal_speed(motion.velocity) <= self.config.max_speed {
            let tangent = hit.normal.cross(UP).normalize_or_zero();
            motion.add_force(tangent * side.tangent_sign() * self.config.acceleration * self.forward_input);
        }
        motion.claim(VelocityAuthority::WallRun);
    }

    fn end_run(&mut self, motion: &mut MotionState) -> WallSide {
        let side = std::mem::take(&mut self.side);
        self.on_cooldown = true;
        self.cooldown_timer = self.config.cooldown;
        motion.air_control = 1.0;
        motion.gravity_scale = self.default_gravity_scale;
        tracing::debug!(?side, cooldown = self.config.cooldown, "wall run ended");
        side
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Walls beside a character facing -Z: right is +X, left is -X.
    #[derive(Default)]
    struct Walls {
        right: bool,
        left: bool,
        normal_y: f32,
    }

    impl Walls {
        fn both() -> Self {
            Self {
                right: true,
                left: true,
                ..default()
            }
        }

        fn right() -> Self {
            Self {
                right: true,
                ..default()
            }
        }

        fn left() -> Self {
            Self {
                left: true,
                ..default()
            }
        }
    }

    impl SurfaceProbe for Walls {
        fn cast(&self, ray: &ProbeRay) -> Option<SurfaceHit> {
            if ray.layer != SurfaceLayer::WallRun {
                return None;
            }
            let dir = ray.direction();
            let normal = if dir.x > 0.0 && self.right {
                Vec3::new(-1.0, self.normal_y, 0.0)
            } else if dir.x < 0.0 && self.left {
                Vec3::new(1.0, self.normal_y, 0.0)
            } else {
                return None;
            };
            Some(SurfaceHit::new(0.5, ray.origin + dir * 0.5, normal.normalize(), None))
        }
    }

    fn airborne() -> MotionState {
        MotionState::default()
            .with_grounded(false)
            .with_facing(Vec3::NEG_Z)
            .with_velocity(Vec3::new(0.0, -2.0, -5.0))
    }

    fn wall_run() -> WallRun {
        let mut ability = WallRun::new(WallRunConfig::default());
        ability.set_forward_input(1.0);
        ability
    }

    #[test]
    fn right_wins_when_both_sides_hit() {
        let mut ability = wall_run();
        let mut motion = airborne();

        let report = ability.update(1.0 / 60.0, &mut motion, &Walls::both());
        assert_eq!(report.began, Some(WallSide::Right));
        assert_eq!(ability.side(), WallSide::Right);
        assert_eq!(motion.air_control, 0.0);
    }

    #[test]
    fn lateral_force_follows_the_wall_forward() {
        let mut ability = wall_run();
        let mut motion = airborne();
        ability.update(1.0 / 60.0, &mut motion, &Walls::right());
        let right_force = motion.take_force();
        assert!(right_force.z < 0.0);

        let mut ability = wall_run();
        let mut motion = airborne();
        ability.update(1.0 / 60.0, &mut motion, &Walls::left());
        let left_force = motion.take_force();
        assert!(left_force.z < 0.0);
        assert_eq!(ability.side(), WallSide::Left);
    }

    #[test]
    fn grounded_character_cannot_run() {
        let mut ability = wall_run();
        let mut motion = airborne().with_grounded(true);
        ability.update(1.0 / 60.0, &mut motion, &Walls::both());
        assert!(!ability.is_running());
    }

    #[test]
    fn floors_are_not_walls() {
        let mut ability = wall_run();
        let mut motion = airborne();
        let probe = Walls {
            right: true,
            normal_y: 4.0,
            ..default()
        };
        ability.update(1.0 / 60.0, &mut motion, &probe);
        assert!(!ability.is_running());
    }

    #[test]
    fn losing_the_right_wall_ends_without_checking_left() {
        let mut ability = wall_run();
        let mut motion = airborne();
        ability.update(1.0 / 60.0, &mut motion, &Walls::right());

        let report = ability.update(1.0 / 60.0, &mut motion, &Walls::left());
        assert_eq!(report.ended, Some(WallSide::Right));
        assert_eq!(report.began, None);
        assert!(!ability.is_running());
        assert!(ability.is_on_cooldown());
    }

    #[test]
    fn left_to_right_switch_reports_both_without_cooldown() {
        let mut ability = wall_run();
        let mut motion = airborne();
        let report = ability.update(1.0 / 60.0, &mut motion, &Walls::left());
        assert_eq!(report.began, Some(WallSide::Left));
        assert!(motion.gravity_scale < 1.0);

        let report = ability.update(1.0 / 60.0, &mut motion, &Walls::both());
        assert_eq!(report.ended, Some(WallSide::Left));
        assert_eq!(report.began, Some(WallSide::Right));
        assert_eq!(ability.side(), WallSide::Right);
        assert!(!ability.is_on_cooldown());
        assert_eq!(motion.air_control, 0.0);

        // Gravity captured before the first run is what comes back.
        let report = ability.update(1.0 / 60.0, &mut motion, &Walls::default());
        assert_eq!(report.ended, Some(WallSide::Right));
        assert_eq!(motion.gravity_scale, 1.0);
    }

    #[test]
    fn cooldown_blocks_for_exactly_its_duration() {
        let dt = 1.0 / 16.0;
        let mut ability = WallRun::new(WallRunConfig::default().with_cooldown(0.25));
        let mut motion = airborne();

        ability.update(dt, &mut motion, &Walls::right());
        ability.update(dt, &mut motion, &Walls::default());
        assert!(ability.is_on_cooldown());

        // 0.25 s at 1/16 s per step: three blocked steps, the fourth may run.
        for _ in 0..3 {
            ability.update(dt, &mut motion, &Walls::right());
            assert!(!ability.is_running());
        }
        ability.update(dt, &mut motion, &Walls::right());
        assert!(ability.is_running());
    }

    #[test]
    fn landing_clears_cooldown() {
        let dt = 1.0 / 16.0;
        let mut ability = wall_run();
        let mut motion = airborne();
        ability.update(dt, &mut motion, &Walls::right());
        ability.update(dt, &mut motion, &Walls::default());
        assert!(ability.is_on_cooldown());

        assert_eq!(ability.land(&mut motion), None);
        assert!(!ability.is_on_cooldown());

        ability.update(dt, &mut motion, &Walls::right());
        assert!(ability.is_running());
    }

    #[test]
    fn landing_mid_run_ends_it() {
        let mut ability = wall_run();
        let mut motion = airborne();
        ability.update(1.0 / 60.0, &mut motion, &Walls::right());

        assert_eq!(ability.land(&mut motion), Some(WallSide::Right));
        assert!(!ability.is_running());
        assert!(!ability.is_on_cooldown());
        assert_eq!(motion.air_control, 1.0);
    }

    #[test]
    fn no_force_above_speed_ceiling() {
        let mut ability = WallRun::new(WallRunConfig::default().with_max_speed(15.0));
        ability.set_forward_input(1.0);
        let mut motion = airborne().with_velocity(Vec3::new(0.0, 0.0, -20.0));

        ability.update(1.0 / 60.0, &mut motion, &Walls::right());
        assert!(ability.is_running());
        assert_eq!(motion.pending_force(), Vec3::ZERO);
    }

    #[test]
    fn forward_input_is_clamped() {
        let mut ability = wall_run();
        ability.set_forward_input(-1.0);
        assert_eq!(ability.forward_input(), 0.0);
        ability.set_forward_input(3.0);
        assert_eq!(ability.forward_input(), 1.0);
    }

    #[test]
    fn gravity_off_blends_toward_zero_and_restores() {
        let dt = 1.0 / 60.0;
        let mut ability = wall_run();
        let mut motion = airborne();
        motion.gravity_scale = 2.0;

        ability.update(dt, &mut motion, &Walls::right());
        assert!(motion.gravity_scale < 2.0 && motion.gravity_scale > 0.0);
        assert!(motion.velocity.y > -2.0);

        ability.update(dt, &mut motion, &Walls::default());
        assert_eq!(motion.gravity_scale, 2.0);
        assert_eq!(motion.air_control, 1.0);
    }

    #[test]
    fn reduced_gravity_targets_scale() {
        let config = WallRunConfig {
            gravity: WallRunGravity::Reduced(0.25),
            gravity_blend_speed: 0.0,
            ..default()
        };
        let mut ability = WallRun::new(config);
        let mut motion = airborne();
        ability.update(1.0 / 60.0, &mut motion, &Walls::right());
        assert_eq!(motion.gravity_scale, 0.25);
        assert_eq!(motion.velocity.y, -2.0);
    }

    #[test]
    fn camera_tilts_away_and_decays_during_cooldown() {
        let dt = 1.0 / 60.0;
        let mut ability = wall_run();
        let mut motion = airborne();

        let report = ability.update(dt, &mut motion, &Walls::right());
        assert!(report.roll_delta < 0.0);
        assert!(ability.camera_roll() < 0.0);

        let tilted = ability.camera_roll();
        let report = ability.update(dt, &mut motion, &Walls::default());
        assert!(ability.is_on_cooldown());
        assert!(report.roll_delta > 0.0);
        assert!(ability.camera_roll() > tilted);
    }

    #[test]
    fn wall_jump_launches_away() {
        let mut ability = wall_run();
        let mut motion = airborne();
        ability.update(1.0 / 60.0, &mut motion, &Walls::right());
        let before = motion.velocity;

        assert_eq!(ability.jump(&mut motion), Some(WallSide::Right));
        let config = WallRunConfig::default();
        assert_eq!(motion.velocity.y, config.jump_height);
        assert!((motion.velocity.x - (before.x - config.jump_force)).abs() < 1e-5);
        assert!(!ability.is_running());
        assert!(ability.is_on_cooldown());

        assert_eq!(ability.jump(&mut motion), None);
    }
}
