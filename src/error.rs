//! Configuration errors.
//!
//! Ability transitions never fail; illegal requests are silent no-ops. The
//! only fallible operation is validating tuning data loaded by the host.

use thiserror::Error;

/// A loaded configuration value that the abilities cannot work with.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("`{field}` must be finite and positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },

    #[error("`{field}` must be finite and not negative, got {value}")]
    Negative { field: &'static str, value: f32 },

    #[error("`{field}` must lie in [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    #[error("dashing is enabled but the loadout grants no dash charges")]
    DashWithoutCharges,
}

impl ConfigError {
    pub(crate) fn positive(field: &'static str, value: f32) -> Result<(), Self> {
        if value > 0.0 && value.is_finite() {
            Ok(())
        } else {
            Err(Self::NotPositive { field, value })
        }
    }

    pub(crate) fn non_negative(field: &'static str, value: f32) -> Result<(), Self> {
        if value >= 0.0 && value.is_finite() {
            Ok(())
        } else {
            Err(Self::Negative { field, value })
        }
    }

    pub(crate) fn in_range(field: &'static str, value: f32, min: f32, max: f32) -> Result<(), Self> {
        if (min..=max).contains(&value) {
            Ok(())
        } else {
            Err(Self::OutOfRange {
                field,
                value,
                min,
                max,
            })
        }
    }
}
