//! Dash: a short burst that overrides velocity for a fixed duration.
//!
//! On start the current speed and the camera direction are locked. For the
//! duration of the dash velocity is set every step to
//! `locked_direction * dash_speed`; when the countdown runs out velocity is set
//! back to `locked_direction * locked_speed`, so the dash redirects momentum
//! without adding to it permanently.

use bevy::prelude::*;

use crate::config::{DashConfig, DashKind};
use crate::motion::{MotionState, VelocityAuthority};

/// Result of advancing a dash by one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashStatus {
    /// No dash in progress.
    Idle,
    /// Dash in progress; velocity was overridden this step.
    Active,
    /// The dash ran out this step; pre-dash speed was restored.
    Finished,
}

/// Dash ability state.
#[derive(Reflect, Debug, Clone, PartialEq)]
pub struct Dash {
    active: bool,
    time_remaining: f32,
    charges_remaining: u32,
    max_charges: u32,
    locked_direction: Vec3,
    locked_speed: f32,
    dash_speed: f32,
    config: DashConfig,
}

impl Dash {
    /// Create a dash ability with full charges.
    pub fn new(config: DashConfig, max_charges: u32) -> Self {
        Self {
            active: false,
            time_remaining: 0.0,
            charges_remaining: max_charges,
            max_charges,
            locked_direction: Vec3::ZERO,
            locked_speed: 0.0,
            dash_speed: 0.0,
            config,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn charges_remaining(&self) -> u32 {
        self.charges_remaining
    }

    pub fn max_charges(&self) -> u32 {
        self.max_charges
    }

    pub fn time_remaining(&self) -> f32 {
        self.time_remaining
    }

    /// Direction locked at dash start.
    pub fn locked_direction(&self) -> Vec3 {
        self.locked_direction
    }

    /// Speed captured at dash start, restored when the dash ends.
    pub fn locked_speed(&self) -> f32 {
        self.locked_speed
    }

    /// Speed held during the dash.
    pub fn dash_speed(&self) -> f32 {
        self.dash_speed
    }

    pub fn config(&self) -> &DashConfig {
        &self.config
    }

    /// Sustained dash speed for a dash started at `speed`.
    pub fn speed_for(config: &DashConfig, kind: DashKind, speed: f32) -> f32 {
        match kind {
            DashKind::PreserveSpeed => speed,
            DashKind::DiminishingBoost => speed + config.boost_factor / speed.max(config.boost_speed_floor),
            DashKind::Fixed => config.speed,
        }
    }

    /// Begin a dash along the camera direction.
    ///
    /// Does nothing and returns `false` while already dashing or without
    /// charges. Charges are never refilled here; only [`Dash::reset_charges`]
    /// refills them.
    pub fn start(&mut self, kind: DashKind, motion: &MotionState) -> bool {
        if self.active || self.charges_remaining == 0 {
            return false;
        }

        self.locked_speed = motion.velocity.length();
        self.locked_direction = motion.view_forward.normalize_or_zero();
        self.dash_speed = Self::speed_for(&self.config, kind, self.locked_speed);
        self.time_remaining = self.config.duration;
        self.active = true;
        self.charges_remaining -= 1;

        tracing::debug!(
            ?kind,
            speed = self.locked_speed,
            dash_speed = self.dash_speed,
            charges = self.charges_remaining,
            "dash started"
        );
        true
    }

    /// End the dash immediately without restoring pre-dash velocity.
    ///
    /// Returns whether a dash was actually cancelled.
    pub fn cancel(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        self.time_remaining = 0.0;
        tracing::debug!("dash cancelled");
        true
    }

    /// Refill charges to the maximum.
    pub fn reset_charges(&mut self) {
        self.charges_remaining = self.max_charges;
    }

    /// Advance an active dash by `dt`.
    pub fn update(&mut self, dt: f32, motion: &mut MotionState) -> DashStatus {
        if !self.active {
            return DashStatus::Idle;
        }

        self.time_remaining -= dt;
        motion.claim(VelocityAuthority::Dash);

        if self.time_remaining <= 0.0 {
            self.active = false;
            self.time_remaining = 0.0;
            motion.velocity = self.locked_direction * self.locked_speed;
            tracing::debug!(speed = self.locked_speed, "dash finished");
            DashStatus::Finished
        } else {
            motion.velocity = self.locked_direction * self.dash_speed;
            DashStatus::Active
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moving(speed: f32) -> MotionState {
        MotionState::default()
            .with_velocity(Vec3::NEG_Z * speed)
            .with_facing(Vec3::NEG_Z)
    }

    #[test]
    fn charges_limit_dash_count() {
        for charges in 1..=4 {
            let mut dash = Dash::new(DashConfig::default(), charges);
            let mut motion = moving(5.0);
            let mut started = 0;
            for _ in 0..10 {
                if dash.start(DashKind::PreserveSpeed, &motion) {
                    started += 1;
                }
                // Run the dash out so the next start is not blocked by `active`.
                while dash.update(0.05, &mut motion) == DashStatus::Active {}
            }
            assert_eq!(started, charges);
            assert_eq!(dash.charges_remaining(), 0);
        }
    }

    #[test]
    fn empty_dash_is_a_no_op() {
        let mut dash = Dash::new(DashConfig::default(), 0);
        let mut motion = moving(5.0);
        let before = motion.clone();

        assert!(!dash.start(DashKind::Fixed, &motion));
        assert!(!dash.is_active());
        assert_eq!(dash.update(0.1, &mut motion), DashStatus::Idle);
        assert_eq!(motion, before);
    }

    #[test]
    fn start_while_active_is_ignored() {
        let mut dash = Dash::new(DashConfig::default(), 3);
        let motion = moving(5.0);
        assert!(dash.start(DashKind::Fixed, &motion));
        assert!(!dash.start(DashKind::Fixed, &motion));
        assert_eq!(dash.charges_remaining(), 2);
    }

    #[test]
    fn dash_speed_policies() {
        let config = DashConfig::default();
        assert_eq!(Dash::speed_for(&config, DashKind::PreserveSpeed, 7.0), 7.0);
        assert_eq!(Dash::speed_for(&config, DashKind::Fixed, 7.0), config.speed);

        // Below the floor the boost is capped at factor / floor.
        let slow = Dash::speed_for(&config, DashKind::DiminishingBoost, 1.0);
        assert!((slow - (1.0 + config.boost_factor / config.boost_speed_floor)).abs() < 1e-5);

        // Faster starts get a smaller boost.
        let boost_at_10 = Dash::speed_for(&config, DashKind::DiminishingBoost, 10.0) - 10.0;
        let boost_at_20 = Dash::speed_for(&config, DashKind::DiminishingBoost, 20.0) - 20.0;
        assert!(boost_at_20 < boost_at_10);
    }

    #[test]
    fn dash_reverts_to_pre_dash_speed() {
        let config = DashConfig::default().with_duration(0.25).with_speed(40.0);
        let dt = 1.0 / 64.0;
        let steps = (config.duration / dt).ceil() as usize;
        let mut dash = Dash::new(config, 1);
        let mut motion = moving(5.0);
        motion.view_forward = Vec3::X;

        assert!(dash.start(DashKind::Fixed, &motion));
        for step in 0..steps {
            let status = dash.update(dt, &mut motion);
            if step + 1 < steps {
                assert_eq!(status, DashStatus::Active);
                assert_eq!(motion.velocity, Vec3::X * 40.0);
            } else {
                assert_eq!(status, DashStatus::Finished);
            }
        }

        assert!(!dash.is_active());
        assert!((motion.velocity - dash.locked_direction() * 5.0).length() < 1e-5);
        assert_eq!(motion.authority, VelocityAuthority::Dash);
    }

    #[test]
    fn cancel_stops_override() {
        let mut dash = Dash::new(DashConfig::default(), 1);
        let mut motion = moving(5.0);
        assert!(dash.start(DashKind::Fixed, &motion));
        dash.update(0.01, &mut motion);

        assert!(dash.cancel());
        assert!(!dash.is_active());

        motion.velocity = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(dash.update(0.01, &mut motion), DashStatus::Idle);
        assert_eq!(motion.velocity, Vec3::new(1.0, 2.0, 3.0));
        assert!(!dash.cancel());
    }

    #[test]
    fn reset_restores_max_charges() {
        let mut dash = Dash::new(DashConfig::default(), 2);
        let motion = moving(5.0);
        dash.start(DashKind::PreserveSpeed, &motion);
        assert_eq!(dash.charges_remaining(), 1);
        dash.reset_charges();
        assert_eq!(dash.charges_remaining(), 2);
    }
}
