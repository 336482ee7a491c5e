//! Slide: low-friction ground movement that accelerates down slopes.

use bevy::prelude::*;

use crate::config::SlideConfig;
use crate::math::{horizontal_speed, project_on_plane, UP};
use crate::motion::{MotionState, VelocityAuthority};
use crate::probe::{ProbeRay, SurfaceLayer, SurfaceProbe};

/// Slide ability state.
#[derive(Reflect, Debug, Clone, PartialEq)]
pub struct Slide {
    active: bool,
    /// Ground friction captured when the slide began.
    base_friction: f32,
    config: SlideConfig,
}

impl Slide {
    pub fn new(config: SlideConfig) -> Self {
        Self {
            active: false,
            base_friction: 0.0,
            config,
        }
    }

    #[inline]
    pub fn is_sliding(&self) -> bool {
        self.active
    }

    /// Friction that will be restored when the slide ends.
    pub fn base_friction(&self) -> f32 {
        self.base_friction
    }

    pub fn config(&self) -> &SlideConfig {
        &self.config
    }

    /// Start sliding if grounded and moving fast enough.
    ///
    /// Returns `true` only when a new slide began.
    pub fn try_begin(&mut self, motion: &mut MotionState) -> bool {
        if self.active || !motion.is_grounded {
            return false;
        }
        let speed = motion.horizontal_speed();
        if speed <= self.config.begin_speed_threshold {
            return false;
        }

        self.base_friction = motion.ground_friction;
        motion.ground_friction = self.config.friction;
        self.active = true;
        tracing::debug!(speed, friction = self.config.friction, "slide began");
        true
    }

    /// Stop sliding and restore the captured friction.
    ///
    /// Returns `true` only when a slide was actually ended.
    pub fn end(&mut self, motion: &mut MotionState) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        motion.ground_friction = self.base_friction;
        tracing::debug!(friction = self.base_friction, "slide ended");
        true
    }

    /// Apply slope acceleration for one step.
    ///
    /// Probes straight down for the ground normal. A missed probe applies no
    /// force but keeps the slide going. Returns the force added this step.
    pub fn update(&mut self, motion: &mut MotionState, probe: &impl SurfaceProbe) -> Option<Vec3> {
        if !self.active {
            return None;
        }

        let ray = ProbeRay::from_direction(
            motion.position,
            Vec3::NEG_Y,
            self.config.probe_length,
            SurfaceLayer::Visibility,
        );
        let hit = probe.cast(&ray)?;

        if horizontal_speed(motion.velocity) > self.config.max_slide_speed {
            return None;
        }

        let magnitude = slope_acceleration(hit.normal, motion.forward, &self.config);
        if magnitude <= 0.0 {
            return None;
        }

        let force = downhill_direction(hit.normal) * magnitude;
        motion.add_force(force);
        motion.claim(VelocityAuthority::Slide);
        tracing::trace!(?force, "slide slope force");
        Some(force)
    }
}

/// Unit vector pointing down the slope with surface normal `normal`.
///
/// Zero on flat ground.
pub fn downhill_direction(normal: Vec3) -> Vec3 {
    normal.cross(Vec3::NEG_Y.cross(normal)).normalize_or_zero()
}

/// Slope acceleration magnitude for a character facing `forward` on ground
/// with normal `normal`.
///
/// Scales with how much the character faces downhill and with the slope angle,
/// saturating at `max_angle_for_full_speed`. Never negative.
pub fn slope_acceleration(normal: Vec3, forward: Vec3, config: &SlideConfig) -> f32 {
    let normal = normal.normalize_or_zero();
    let angle = normal.dot(UP).clamp(-1.0, 1.0).acos();
    let downhill = downhill_direction(normal);
    let projected = project_on_plane(forward, normal).normalize_or_zero();

    let facing = projected.dot(downhill).max(0.0);
    let steepness = (angle / config.max_angle_for_full_speed).min(1.0);
    facing * steepness * config.acceleration
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{NoSurfaces, SurfaceHit};

    /// Ground with a fixed normal under every ray.
    struct Ground(Vec3);

    impl SurfaceProbe for Ground {
        fn cast(&self, ray: &ProbeRay) -> Option<SurfaceHit> {
            Some(SurfaceHit::new(1.0, ray.origin + Vec3::NEG_Y, self.0, None))
        }
    }

    /// Normal of a slope of `degrees` that descends toward +X.
    fn slope(degrees: f32) -> Vec3 {
        let a = degrees.to_radians();
        Vec3::new(a.sin(), a.cos(), 0.0)
    }

    fn running(speed: f32) -> MotionState {
        MotionState::default()
            .with_velocity(Vec3::X * speed)
            .with_facing(Vec3::X)
    }

    #[test]
    fn below_threshold_does_not_begin() {
        let mut slide = Slide::new(SlideConfig::default().with_begin_threshold(4.0));
        let mut motion = running(3.0);
        let friction = motion.ground_friction;

        assert!(!slide.try_begin(&mut motion));
        assert!(!slide.is_sliding());
        assert_eq!(motion.ground_friction, friction);
    }

    #[test]
    fn airborne_does_not_begin() {
        let mut slide = Slide::new(SlideConfig::default());
        let mut motion = running(10.0).with_grounded(false);
        assert!(!slide.try_begin(&mut motion));
    }

    #[test]
    fn end_restores_captured_friction() {
        let mut slide = Slide::new(SlideConfig::default());
        let mut motion = running(10.0);
        motion.ground_friction = 3.5;

        assert!(slide.try_begin(&mut motion));
        assert_eq!(motion.ground_friction, SlideConfig::default().friction);
        assert!(slide.end(&mut motion));
        assert_eq!(motion.ground_friction, 3.5);
        assert!(!slide.end(&mut motion));
    }

    #[test]
    fn downhill_points_down_the_slope() {
        let dir = downhill_direction(slope(30.0));
        assert!(dir.x > 0.0);
        assert!(dir.y < 0.0);
        assert!((dir.length() - 1.0).abs() < 1e-5);
        assert_eq!(downhill_direction(Vec3::Y), Vec3::ZERO);
    }

    #[test]
    fn flat_ground_gives_no_acceleration() {
        let config = SlideConfig::default();
        for forward in [Vec3::X, Vec3::Z, Vec3::NEG_X, Vec3::new(1.0, 0.0, 1.0)] {
            assert_eq!(slope_acceleration(Vec3::Y, forward, &config), 0.0);
        }
    }

    #[test]
    fn steep_slope_facing_downhill_saturates() {
        let config = SlideConfig::default().with_acceleration(25.0);
        let magnitude = slope_acceleration(slope(60.0), Vec3::X, &config);
        assert!((magnitude - 25.0).abs() < 1e-4);
    }

    #[test]
    fn gentle_slope_scales_with_angle() {
        let config = SlideConfig::default();
        let half = slope_acceleration(slope(22.5), Vec3::X, &config);
        assert!((half - config.acceleration * 0.5).abs() < 1e-3);
    }

    #[test]
    fn facing_uphill_is_clamped_to_zero() {
        let config = SlideConfig::default();
        assert_eq!(slope_acceleration(slope(30.0), Vec3::NEG_X, &config), 0.0);
    }

    #[test]
    fn missed_probe_keeps_sliding_without_force() {
        let mut slide = Slide::new(SlideConfig::default());
        let mut motion = running(10.0);
        slide.try_begin(&mut motion);

        assert_eq!(slide.update(&mut motion, &NoSurfaces), None);
        assert!(slide.is_sliding());
        assert_eq!(motion.pending_force(), Vec3::ZERO);
    }

    #[test]
    fn slope_force_is_additive() {
        let mut slide = Slide::new(SlideConfig::default());
        let mut motion = running(10.0);
        slide.try_begin(&mut motion);
        let velocity = motion.velocity;

        let force = slide.update(&mut motion, &Ground(slope(60.0))).unwrap();
        assert!(force.x > 0.0);
        assert_eq!(motion.pending_force(), force);
        assert_eq!(motion.velocity, velocity);
        assert_eq!(motion.authority, VelocityAuthority::Slide);
    }

    #[test]
    fn no_force_above_max_slide_speed() {
        let config = SlideConfig {
            max_slide_speed: 12.0,
            ..default()
        };
        let mut slide = Slide::new(config);
        let mut motion = running(20.0);
        slide.try_begin(&mut motion);

        assert_eq!(slide.update(&mut motion, &Ground(slope(60.0))), None);
        assert_eq!(motion.pending_force(), Vec3::ZERO);
    }
}
