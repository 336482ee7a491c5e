//! The three movement abilities.
//!
//! Each ability is a small state machine that borrows the character's
//! [`MotionState`](crate::motion::MotionState) for the duration of one call.
//! None of them keeps a reference to it, and none of them knows about the
//! others; cross-ability effects are wired up by the
//! [`AbilityCoordinator`](crate::coordinator::AbilityCoordinator).

pub mod dash;
pub mod slide;
pub mod wall_run;

pub use dash::{Dash, DashStatus};
pub use slide::{downhill_direction, slope_acceleration, Slide};
pub use wall_run::{WallRun, WallRunReport, WallSide};
