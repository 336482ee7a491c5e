//! State marker components.
//!
//! Mirrors of the coordinator's ability state, kept in sync by
//! [`sync_ability_markers`](crate::systems::sync_ability_markers) so that other
//! systems can filter on them (`With<Dashing>`) or react to their insertion.

use bevy::prelude::*;

use crate::abilities::WallSide;

/// Marker: the character is dashing.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use msg_parkour_abilities::prelude::*;
///
/// fn dash_trails(dashing: Query<&Transform, With<Dashing>>) {
///     for transform in &dashing {
///         // spawn a trail at transform.translation
///         let _ = transform;
///     }
/// }
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Dashing;

/// Marker: the character is sliding.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Sliding;

/// The character is running along a wall.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct WallRunning {
    /// Side of the wall relative to the character.
    pub side: WallSide,
    /// Wall surface normal.
    pub normal: Vec3,
}

impl Default for WallRunning {
    fn default() -> Self {
        Self {
            side: WallSide::Right,
            normal: Vec3::NEG_X,
        }
    }
}

impl WallRunning {
    pub fn new(side: WallSide, normal: Vec3) -> Self {
        Self { side, normal }
    }

    pub fn is_left(&self) -> bool {
        self.side == WallSide::Left
    }

    pub fn is_right(&self) -> bool {
        self.side == WallSide::Right
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wall_running_sides() {
        let left = WallRunning::new(WallSide::Left, Vec3::X);
        assert!(left.is_left());
        assert!(!left.is_right());
        assert!(WallRunning::default().is_right());
    }
}
