//! Mason frame entries.
//!
//! A frame is one welded end section of the scaffold: two legs joined by
//! rungs. Its width is the bay spacing along the wall and its height is the
//! lift of one working level.

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::units::{Centimeters, Kilograms, Meters};

/// Catalog entry for a frame size.
///
/// ## TOML Example
///
/// ```toml
/// [[frames]]
/// key = "mason-frame-152x152"
/// name = "Mason Frame 152.4 x 152.4 cm"
/// description = "Square mason frame"
/// width_cm = 152.4
/// height_cm = 152.4
/// weight_kg = 18.5
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSpec {
    /// Lookup key (e.g., "mason-frame-152x152")
    pub key: String,

    /// Display name shown in results and reports
    pub name: String,

    /// Short marketing description for selectors
    #[serde(default)]
    pub description: String,

    /// Frame width (bay spacing) in centimeters
    pub width_cm: Centimeters,

    /// Frame height (one lift) in centimeters
    pub height_cm: Centimeters,

    /// Unit weight in kilograms
    pub weight_kg: Kilograms,
}

impl FrameSpec {
    /// Frame width in meters
    pub fn width_m(&self) -> Meters {
        self.width_cm.into()
    }

    /// Frame height in meters
    pub fn height_m(&self) -> Meters {
        self.height_cm.into()
    }

    pub(crate) fn validate(&self) -> CalcResult<()> {
        if self.key.trim().is_empty() {
            return Err(CalcError::invalid_catalog("frame entry with empty key"));
        }
        for (field, value) in [
            ("width_cm", self.width_cm.0),
            ("height_cm", self.height_cm.0),
            ("weight_kg", self.weight_kg.0),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(CalcError::invalid_catalog(format!(
                    "frame '{}' has non-positive {} ({})",
                    self.key, field, value
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> FrameSpec {
        FrameSpec {
            key: "mason-frame-152x152".to_string(),
            name: "Mason Frame 152.4 x 152.4 cm".to_string(),
            description: String::new(),
            width_cm: Centimeters(152.4),
            height_cm: Centimeters(152.4),
            weight_kg: Kilograms(18.5),
        }
    }

    #[test]
    fn test_metric_conversion() {
        let f = frame();
        assert!((f.width_m().0 - 1.524).abs() < 1e-12);
        assert!((f.height_m().0 - 1.524).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_zero_width() {
        let mut f = frame();
        f.width_cm = Centimeters(0.0);
        let err = f.validate().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CATALOG");
    }
}
