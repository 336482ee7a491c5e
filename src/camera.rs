//! First-person camera driven by the abilities.
//!
//! The camera is expected to be a child of the character body. Yaw turns the
//! body, pitch and wall-run roll turn the camera, and the crouch eye offset
//! moves it vertically.

use std::f32::consts::FRAC_PI_2;

use bevy::prelude::*;

use crate::coordinator::AbilityCoordinator;

/// First-person camera attached to an ability character.
#[derive(Component, Reflect, Debug, Clone, Copy)]
#[reflect(Component)]
pub struct AbilityCamera {
    /// Character whose abilities drive this camera.
    pub target: Entity,
    /// Current pitch (radians, positive looks up).
    pub pitch: f32,
    /// Pitch is clamped to `[-pitch_limit, pitch_limit]`.
    pub pitch_limit: f32,
    /// Standing eye height relative to the body origin.
    pub eye_height: f32,
}

impl AbilityCamera {
    pub fn new(target: Entity) -> Self {
        Self {
            target,
            pitch: 0.0,
            pitch_limit: FRAC_PI_2 - 0.01,
            eye_height: 0.7,
        }
    }

    /// Builder: set standing eye height.
    pub fn with_eye_height(mut self, height: f32) -> Self {
        self.eye_height = height;
        self
    }
}

/// Apply look rotation, wall-run roll and crouch eye offset.
pub fn apply_ability_camera(
    mut q_cameras: Query<(&mut AbilityCamera, &mut Transform), Without<AbilityCoordinator>>,
    mut q_characters: Query<(&mut AbilityCoordinator, &mut Transform)>,
) {
    for (mut camera, mut camera_transform) in &mut q_cameras {
        let Ok((mut coordinator, mut body)) = q_characters.get_mut(camera.target) else {
            continue;
        };

        let look = coordinator.take_look_delta();
        if look.x != 0.0 {
            body.rotate_y(-look.x);
        }
        camera.pitch = (camera.pitch + look.y).clamp(-camera.pitch_limit, camera.pitch_limit);

        let view = coordinator.view();
        camera_transform.rotation = Quat::from_euler(EulerRot::YXZ, 0.0, camera.pitch, view.camera_roll);

        let stance = if coordinator.is_crouched() {
            camera.eye_height - coordinator.tuning().locomotion.crouch_eye_drop
        } else {
            camera.eye_height
        };
        camera_transform.translation.y = stance + view.eye_offset;
    }
}
