//! Ability input.
//!
//! The host's input layer decodes raw devices into [`InputAction`]s. They can
//! be queued directly on [`AbilityInput`], or the host can write button levels
//! every frame and let the component derive press/release edges.

use bevy::prelude::*;

/// A decoded input action.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub enum InputAction {
    /// Move axis: `x` strafes right, `y` moves forward. Sent continuously and
    /// with zero on release.
    Move(Vec2),
    /// Look delta: `x` yaws, `y` pitches.
    Look(Vec2),
    JumpPressed,
    JumpReleased,
    /// Press starts a slide when possible.
    CrouchPressed,
    /// Release ends any slide.
    CrouchReleased,
    /// Sprint button level.
    Sprint(bool),
    Dash,
}

impl InputAction {
    /// Whether this action is a button edge rather than a continuous axis.
    pub fn is_edge(&self) -> bool {
        !matches!(self, InputAction::Move(_) | InputAction::Look(_))
    }
}

/// Input state for one character.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use msg_parkour_abilities::prelude::*;
///
/// let mut input = AbilityInput::new();
/// input.set_move(Vec2::new(0.0, 1.0));
/// input.set_jump_pressed(true);
///
/// let actions = input.take_actions();
/// assert!(actions.contains(&InputAction::JumpPressed));
///
/// // Holding the button does not press it again.
/// let actions = input.take_actions();
/// assert!(!actions.contains(&InputAction::JumpPressed));
/// ```
#[derive(Component, Reflect, Debug, Clone, Default)]
#[reflect(Component)]
pub struct AbilityInput {
    /// Move axis (-1.0..=1.0 on each axis).
    pub move_axis: Vec2,
    /// Look delta accumulated since the last tick.
    pub look: Vec2,
    pub jump_pressed: bool,
    pub crouch_pressed: bool,
    pub sprint_pressed: bool,
    pub dash_pressed: bool,
    /// Actions queued directly, delivered before level-derived ones.
    pub queued: Vec<InputAction>,
    pub(crate) jump_pressed_prev: bool,
    pub(crate) crouch_pressed_prev: bool,
    pub(crate) sprint_pressed_prev: bool,
    pub(crate) dash_pressed_prev: bool,
}

impl AbilityInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the move axis, clamped to the unit square.
    pub fn set_move(&mut self, axis: Vec2) {
        self.move_axis = axis.clamp(Vec2::NEG_ONE, Vec2::ONE);
    }

    /// Add a look delta. Deltas accumulate until the next tick consumes them.
    pub fn add_look(&mut self, delta: Vec2) {
        self.look += delta;
    }

    pub fn set_jump_pressed(&mut self, pressed: bool) {
        self.jump_pressed = pressed;
    }

    pub fn set_crouch_pressed(&mut self, pressed: bool) {
        self.crouch_pressed = pressed;
    }

    pub fn set_sprint_pressed(&mut self, pressed: bool) {
        self.sprint_pressed = pressed;
    }

    pub fn set_dash_pressed(&mut self, pressed: bool) {
        self.dash_pressed = pressed;
    }

    /// Queue an action for the next tick.
    pub fn push(&mut self, action: InputAction) {
        self.queued.push(action);
    }

    /// Clear axes, levels and the queue.
    pub fn clear(&mut self) {
        *self = Self {
            jump_pressed_prev: self.jump_pressed_prev,
            crouch_pressed_prev: self.crouch_pressed_prev,
            sprint_pressed_prev: self.sprint_pressed_prev,
            dash_pressed_prev: self.dash_pressed_prev,
            ..default()
        };
    }

    /// Drain the queue and derive this tick's actions from the current levels.
    ///
    /// Move is reported every tick. Look is reported when non-zero and then
    /// reset. Buttons report only their press and release edges.
    pub fn take_actions(&mut self) -> Vec<InputAction> {
        let mut actions = std::mem::take(&mut self.queued);
        actions.push(InputAction::Move(self.move_axis));

        if self.look != Vec2::ZERO {
            actions.push(InputAction::Look(std::mem::take(&mut self.look)));
        }

        match edge(self.jump_pressed, &mut self.jump_pressed_prev) {
            Some(true) => actions.push(InputAction::JumpPressed),
            Some(false) => actions.push(InputAction::JumpReleased),
            None => {}
        }
        match edge(self.crouch_pressed, &mut self.crouch_pressed_prev) {
            Some(true) => actions.push(InputAction::CrouchPressed),
            Some(false) => actions.push(InputAction::CrouchReleased),
            None => {}
        }
        if let Some(pressed) = edge(self.sprint_pressed, &mut self.sprint_pressed_prev) {
            actions.push(InputAction::Sprint(pressed));
        }
        if edge(self.dash_pressed, &mut self.dash_pressed_prev) == Some(true) {
            actions.push(InputAction::Dash);
        }

        actions
    }
}

/// Report a level change and remember the new level.
fn edge(current: bool, prev: &mut bool) -> Option<bool> {
    let changed = current != *prev;
    *prev = current;
    changed.then_some(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_is_clamped() {
        let mut input = AbilityInput::new();
        input.set_move(Vec2::new(3.0, -0.5));
        assert_eq!(input.move_axis, Vec2::new(1.0, -0.5));
    }

    #[test]
    fn move_is_reported_every_tick() {
        let mut input = AbilityInput::new();
        assert_eq!(input.take_actions(), vec![InputAction::Move(Vec2::ZERO)]);
        assert_eq!(input.take_actions(), vec![InputAction::Move(Vec2::ZERO)]);
    }

    #[test]
    fn look_accumulates_and_is_consumed() {
        let mut input = AbilityInput::new();
        input.add_look(Vec2::new(1.0, 0.0));
        input.add_look(Vec2::new(2.0, 1.0));

        let actions = input.take_actions();
        assert!(actions.contains(&InputAction::Look(Vec2::new(3.0, 1.0))));
        assert_eq!(input.look, Vec2::ZERO);
        assert!(!input.take_actions().iter().any(|a| matches!(a, InputAction::Look(_))));
    }

    #[test]
    fn buttons_report_edges_only() {
        let mut input = AbilityInput::new();
        input.set_crouch_pressed(true);
        assert!(input.take_actions().contains(&InputAction::CrouchPressed));
        assert!(!input.take_actions().contains(&InputAction::CrouchPressed));

        input.set_crouch_pressed(false);
        assert!(input.take_actions().contains(&InputAction::CrouchReleased));
    }

    #[test]
    fn sprint_reports_level_on_change() {
        let mut input = AbilityInput::new();
        input.set_sprint_pressed(true);
        assert!(input.take_actions().contains(&InputAction::Sprint(true)));
        input.set_sprint_pressed(false);
        assert!(input.take_actions().contains(&InputAction::Sprint(false)));
    }

    #[test]
    fn dash_release_is_silent() {
        let mut input = AbilityInput::new();
        input.set_dash_pressed(true);
        assert!(input.take_actions().contains(&InputAction::Dash));
        input.set_dash_pressed(false);
        assert_eq!(input.take_actions(), vec![InputAction::Move(Vec2::ZERO)]);
    }

    #[test]
    fn queued_actions_come_first() {
        let mut input = AbilityInput::new();
        input.push(InputAction::Dash);
        input.set_jump_pressed(true);

        let actions = input.take_actions();
        assert_eq!(actions[0], InputAction::Dash);
        assert_eq!(actions.last(), Some(&InputAction::JumpPressed));
        assert!(input.queued.is_empty());
    }

    #[test]
    fn clear_keeps_edge_history() {
        let mut input = AbilityInput::new();
        input.set_jump_pressed(true);
        input.take_actions();
        input.push(InputAction::Dash);
        input.clear();

        assert!(input.queued.is_empty());
        assert!(!input.jump_pressed);
        // The held button was cleared, which reads as a release.
        assert!(input.take_actions().contains(&InputAction::JumpReleased));
    }

    #[test]
    fn edges_are_classified() {
        assert!(InputAction::Dash.is_edge());
        assert!(InputAction::Sprint(false).is_edge());
        assert!(!InputAction::Move(Vec2::X).is_edge());
    }
}
