//! Plywood platform entries.

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::units::{Centimeters, Kilograms, Meters};

/// Catalog entry for a platform length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformSpec {
    /// Lookup key (e.g., "platform-244")
    pub key: String,

    /// Display name shown in results and reports
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Board length in centimeters
    pub length_cm: Centimeters,

    /// Board width in centimeters
    pub width_cm: Centimeters,

    /// Unit weight in kilograms
    pub weight_kg: Kilograms,
}

impl PlatformSpec {
    /// Board length in meters
    pub fn length_m(&self) -> Meters {
        self.length_cm.into()
    }

    pub(crate) fn validate(&self) -> CalcResult<()> {
        if self.key.trim().is_empty() {
            return Err(CalcError::invalid_catalog("platform entry with empty key"));
        }
        for (field, value) in [
            ("length_cm", self.length_cm.0),
            ("width_cm", self.width_cm.0),
            ("weight_kg", self.weight_kg.0),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(CalcError::invalid_catalog(format!(
                    "platform '{}' has non-positive {} ({})",
                    self.key, field, value
                )));
            }
        }
        Ok(())
    }
}
