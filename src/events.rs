//! Ability events.
//!
//! Transitions are reported as [`AbilityEvent`]s so animation, audio and UI can
//! react without polling ability state. The coordinator buffers them during a
//! tick; the plugin forwards them as [`CharacterAbilityEvent`]s.

use bevy::prelude::*;

use crate::abilities::WallSide;
use crate::config::DashKind;

/// Something that happened to a character's abilities this tick.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub enum AbilityEvent {
    DashStarted { kind: DashKind },
    /// The dash ran its full duration.
    DashEnded,
    /// The dash was cut short (collision).
    DashCancelled,
    SlideBegan,
    SlideEnded,
    WallRunBegan { side: WallSide },
    WallRunEnded { side: WallSide },
    WallJumped { side: WallSide },
    /// Jump from the ground.
    Jumped,
    /// Extra jump in the air.
    AirJumped { remaining: u32 },
    Landed,
    SprintChanged { sprinting: bool },
}

/// An [`AbilityEvent`] tagged with the character it happened to.
#[derive(Event, Reflect, Debug, Clone, Copy, PartialEq)]
pub struct CharacterAbilityEvent {
    pub entity: Entity,
    pub event: AbilityEvent,
}

/// A blocking hit reported for a character. Cancels any active dash.
///
/// The Rapier backend sends these from contact events; other hosts send them
/// from their own collision callbacks.
#[derive(Event, Reflect, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbilityCollision {
    pub entity: Entity,
}
