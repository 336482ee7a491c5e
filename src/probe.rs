//! Surface probing.
//!
//! Abilities never talk to a physics engine directly. Every geometric query
//! they need goes through [`SurfaceProbe`], which a physics backend (or a test)
//! implements. A miss is a normal answer, not an error.

use bevy::prelude::*;

/// Which category of surfaces a probe may hit.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SurfaceLayer {
    /// Any blocking surface (ground probes).
    #[default]
    Visibility,
    /// Only surfaces tagged as eligible for wall running.
    WallRun,
}

/// A line query from `origin` to `end`.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct ProbeRay {
    /// Start of the segment in world space.
    pub origin: Vec3,
    /// End of the segment in world space.
    pub end: Vec3,
    /// Surfaces the ray may hit.
    pub layer: SurfaceLayer,
}

impl ProbeRay {
    /// Create a ray between two points.
    pub fn new(origin: Vec3, end: Vec3, layer: SurfaceLayer) -> Self {
        Self { origin, end, layer }
    }

    /// Create a ray from a direction and a length.
    pub fn from_direction(origin: Vec3, direction: Vec3, length: f32, layer: SurfaceLayer) -> Self {
        Self {
            origin,
            end: origin + direction.normalize_or_zero() * length,
            layer,
        }
    }

    /// Normalized direction of the ray (zero for a degenerate ray).
    pub fn direction(&self) -> Vec3 {
        (self.end - self.origin).normalize_or_zero()
    }

    /// Length of the ray.
    pub fn length(&self) -> f32 {
        self.end.distance(self.origin)
    }
}

/// Information about a blocking hit.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    /// Distance from the ray origin to the impact point.
    pub distance: f32,
    /// World position of the impact point.
    pub point: Vec3,
    /// Surface normal at the impact point.
    pub normal: Vec3,
    /// Entity that was hit, when the backend knows it.
    pub entity: Option<Entity>,
}

impl SurfaceHit {
    /// Create a hit result.
    pub fn new(distance: f32, point: Vec3, normal: Vec3, entity: Option<Entity>) -> Self {
        Self {
            distance,
            point,
            normal,
            entity,
        }
    }
}

/// Geometric queries against the environment.
pub trait SurfaceProbe {
    /// Cast `ray` and return the first blocking hit, if any.
    fn cast(&self, ray: &ProbeRay) -> Option<SurfaceHit>;
}

impl<P: SurfaceProbe + ?Sized> SurfaceProbe for &P {
    fn cast(&self, ray: &ProbeRay) -> Option<SurfaceHit> {
        (**self).cast(ray)
    }
}

/// A probe that never hits anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSurfaces;

impl SurfaceProbe for NoSurfaces {
    fn cast(&self, _ray: &ProbeRay) -> Option<SurfaceHit> {
        None
    }
}

/// One probe and its answer, kept for diagnostics.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct ProbeTrace {
    pub ray: ProbeRay,
    pub hit: Option<SurfaceHit>,
}

/// Probe wrapper that records every query it forwards.
///
/// This is the diagnostic hook for visualizing what the abilities "see":
/// wrap the real probe, run the tick, then read [`RecordingProbe::traces`].
pub struct RecordingProbe<P> {
    inner: P,
    traces: std::cell::RefCell<Vec<ProbeTrace>>,
}

impl<P: SurfaceProbe> RecordingProbe<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            traces: std::cell::RefCell::new(Vec::new()),
        }
    }

    /// Take the recorded traces, leaving the recorder empty.
    pub fn take_traces(&self) -> Vec<ProbeTrace> {
        self.traces.take()
    }

    /// Number of queries recorded so far.
    pub fn len(&self) -> usize {
        self.traces.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.borrow().is_empty()
    }
}

impl<P: SurfaceProbe> SurfaceProbe for RecordingProbe<P> {
    fn cast(&self, ray: &ProbeRay) -> Option<SurfaceHit> {
        let hit = self.inner.cast(ray);
        tracing::trace!(?ray, hit = hit.is_some(), "surface probe");
        self.traces.borrow_mut().push(ProbeTrace { ray: *ray, hit });
        hit
    }
}

/// Diagnostic component holding the probes of the last ability tick.
///
/// Add it to a character to have the backend record its probes.
#[derive(Component, Reflect, Debug, Clone, Default)]
#[reflect(Component)]
pub struct ProbeDiagnostics {
    pub traces: Vec<ProbeTrace>,
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Floor;

    impl SurfaceProbe for Floor {
        fn cast(&self, ray: &ProbeRay) -> Option<SurfaceHit> {
            (ray.end.y <= 0.0 && ray.origin.y >= 0.0).then(|| {
                let distance = ray.origin.y;
                SurfaceHit::new(distance, ray.origin.with_y(0.0), Vec3::Y, None)
            })
        }
    }

    #[test]
    fn ray_from_direction_normalizes() {
        let ray = ProbeRay::from_direction(Vec3::ZERO, Vec3::new(0.0, -5.0, 0.0), 2.0, SurfaceLayer::Visibility);
        assert_eq!(ray.end, Vec3::new(0.0, -2.0, 0.0));
        assert_eq!(ray.direction(), Vec3::NEG_Y);
        assert_eq!(ray.length(), 2.0);
    }

    #[test]
    fn no_surfaces_never_hits() {
        let ray = ProbeRay::new(Vec3::ZERO, Vec3::NEG_Y, SurfaceLayer::Visibility);
        assert!(NoSurfaces.cast(&ray).is_none());
    }

    #[test]
    fn recording_probe_keeps_hits_and_misses() {
        let probe = RecordingProbe::new(Floor);
        let down = ProbeRay::new(Vec3::Y, Vec3::NEG_Y, SurfaceLayer::Visibility);
        let up = ProbeRay::new(Vec3::Y, Vec3::new(0.0, 3.0, 0.0), SurfaceLayer::Visibility);

        assert!(probe.cast(&down).is_some());
        assert!(probe.cast(&up).is_none());
        assert_eq!(probe.len(), 2);

        let traces = probe.take_traces();
        assert!(traces[0].hit.is_some());
        assert!(traces[1].hit.is_none());
        assert!(probe.is_empty());
    }

    #[test]
    fn probe_by_reference() {
        fn cast_twice(probe: impl SurfaceProbe) -> usize {
            let ray = ProbeRay::new(Vec3::Y, Vec3::NEG_Y, SurfaceLayer::Visibility);
            probe.cast(&ray).into_iter().count() + probe.cast(&ray).into_iter().count()
        }
        assert_eq!(cast_twice(&Floor), 2);
    }
}
