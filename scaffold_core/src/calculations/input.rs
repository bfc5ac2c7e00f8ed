//! Calculator input records.
//!
//! A submission arrives in one of two shapes, distinguished by a `mode` tag:
//! measured sides (`dimensions`) or a total wall area with a height (`area`).
//! Both carry the same part selection. Validation happens here, before any
//! sizing arithmetic, and both shapes normalize to [`WallRuns`].

use serde::{Deserialize, Serialize};

use crate::catalog::DEFAULT_SYSTEM;
use crate::errors::{CalcError, CalcResult};
use crate::units::{Meters, SquareMeters};

use super::options::{HeightMode, SizingOptions};

/// Fewest working levels accepted
pub const MIN_WORK_LEVELS: u8 = 1;
/// Most working levels accepted
pub const MAX_WORK_LEVELS: u8 = 5;
/// Fewest building sides accepted
pub const MIN_BUILDING_SIDES: u8 = 1;
/// Most building sides accepted
pub const MAX_BUILDING_SIDES: u8 = 4;

/// Longest single wall run accepted (m)
pub const MAX_WALL_RUN_M: f64 = 5_000.0;

/// Two side heights closer than this are the same height (m)
const HEIGHT_TOLERANCE_M: f64 = 1e-6;

fn default_system() -> String {
    DEFAULT_SYSTEM.to_string()
}

/// One measured building side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SideDimension {
    /// Wall length along this side (m)
    pub width_m: f64,
    /// Wall height on this side (m)
    pub height_m: f64,
}

/// Part selection shared by both input shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    /// Frame-size catalog key (e.g., "mason-frame-152x152")
    pub frame_size: String,

    /// Platform-length catalog key (e.g., "platform-244")
    pub platform_length: String,

    /// Number of working levels, 1 through 5
    pub work_levels: u8,

    /// Number of building sides scaffolded, 1 through 4
    pub building_sides: u8,

    /// Scaffold system catalog key
    #[serde(default = "default_system")]
    pub system: String,
}

impl Selection {
    /// Selection using the default scaffold system
    pub fn new(
        frame_size: impl Into<String>,
        platform_length: impl Into<String>,
        work_levels: u8,
        building_sides: u8,
    ) -> Self {
        Selection {
            frame_size: frame_size.into(),
            platform_length: platform_length.into(),
            work_levels,
            building_sides,
            system: default_system(),
        }
    }

    /// Validate ranges and that keys are present. Catalog membership is
    /// checked when the keys are resolved.
    pub fn validate(&self) -> CalcResult<()> {
        if !(MIN_WORK_LEVELS..=MAX_WORK_LEVELS).contains(&self.work_levels) {
            return Err(CalcError::validation(
                "work_levels",
                self.work_levels.to_string(),
                format!("Work levels must be between {} and {}", MIN_WORK_LEVELS, MAX_WORK_LEVELS),
            ));
        }
        if !(MIN_BUILDING_SIDES..=MAX_BUILDING_SIDES).contains(&self.building_sides) {
            return Err(CalcError::validation(
                "building_sides",
                self.building_sides.to_string(),
                format!(
                    "Building sides must be between {} and {}",
                    MIN_BUILDING_SIDES, MAX_BUILDING_SIDES
                ),
            ));
        }
        for (field, value) in [
            ("frame_size", &self.frame_size),
            ("platform_length", &self.platform_length),
            ("system", &self.system),
        ] {
            if value.trim().is_empty() {
                return Err(CalcError::missing_field(field));
            }
        }
        Ok(())
    }
}

/// Canonical wall geometry the sizing algorithm works on.
#[derive(Debug, Clone, PartialEq)]
pub struct WallRuns {
    /// One wall run per building side
    pub runs: Vec<Meters>,
    /// Representative scaffold height
    pub height: Meters,
    /// Wall area being covered
    pub area: SquareMeters,
}

impl WallRuns {
    /// Combined length of every run
    pub fn total_length(&self) -> Meters {
        self.runs.iter().fold(Meters(0.0), |acc, run| acc + *run)
    }
}

/// Measured-sides input.
///
/// ## JSON Example
///
/// ```json
/// {
///   "mode": "dimensions",
///   "sides": [{ "width_m": 10.0, "height_m": 3.0 }],
///   "frame_size": "mason-frame-152x152",
///   "platform_length": "platform-244",
///   "work_levels": 2,
///   "building_sides": 1
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionInput {
    /// One entry per building side, or a single entry replicated to every side
    pub sides: Vec<SideDimension>,

    #[serde(flatten)]
    pub selection: Selection,
}

impl DimensionInput {
    /// Validate every field.
    pub fn validate(&self, options: &SizingOptions) -> CalcResult<()> {
        self.selection.validate()?;

        if self.sides.is_empty() {
            return Err(CalcError::missing_field("sides"));
        }
        let expected = usize::from(self.selection.building_sides);
        if self.sides.len() != 1 && self.sides.len() != expected {
            return Err(CalcError::validation(
                "sides",
                self.sides.len().to_string(),
                format!(
                    "Expected {} side measurements (or one to apply to every side)",
                    expected
                ),
            ));
        }

        for (i, side) in self.sides.iter().enumerate() {
            check_length(&format!("sides[{}].width_m", i), side.width_m, MAX_WALL_RUN_M, "Width")?;
            check_positive(&format!("sides[{}].height_m", i), side.height_m, "Height")?;
        }

        if options.height_mode == HeightMode::Uniform {
            let first = self.sides[0].height_m;
            if let Some((i, side)) = self
                .sides
                .iter()
                .enumerate()
                .skip(1)
                .find(|(_, side)| (side.height_m - first).abs() > HEIGHT_TOLERANCE_M)
            {
                return Err(CalcError::validation(
                    format!("sides[{}].height_m", i),
                    side.height_m.to_string(),
                    format!(
                        "All sides must share one height ({} m) unless per-side heights are enabled",
                        first
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Sides after replicating a single measurement to every building side
    fn expanded_sides(&self) -> Vec<SideDimension> {
        match self.sides.as_slice() {
            [only] => vec![*only; usize::from(self.selection.building_sides)],
            sides => sides.to_vec(),
        }
    }

    /// Normalize to wall runs. Call after [`DimensionInput::validate`].
    pub fn wall_runs(&self, options: &SizingOptions) -> WallRuns {
        let sides = self.expanded_sides();
        let height = match options.height_mode {
            HeightMode::Uniform => sides[0].height_m,
            HeightMode::PerSide => sides.iter().map(|s| s.height_m).fold(0.0, f64::max),
        };
        let area = sides.iter().map(|s| s.width_m * s.height_m).sum();
        WallRuns {
            runs: sides.iter().map(|s| Meters(s.width_m)).collect(),
            height: Meters(height),
            area: SquareMeters(area),
        }
    }
}

/// Total-area input.
///
/// ## JSON Example
///
/// ```json
/// {
///   "mode": "area",
///   "area_m2": 120.0,
///   "height_m": 3.0,
///   "frame_size": "mason-frame-152x152",
///   "platform_length": "platform-244",
///   "work_levels": 1,
///   "building_sides": 4
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaInput {
    /// Total wall area to scaffold (m²)
    pub area_m2: f64,

    /// Wall height (m)
    pub height_m: f64,

    #[serde(flatten)]
    pub selection: Selection,
}

impl AreaInput {
    /// Validate every field.
    pub fn validate(&self) -> CalcResult<()> {
        self.selection.validate()?;

        if !(self.area_m2.is_finite() && self.area_m2 > 0.0) {
            return Err(CalcError::validation(
                "area_m2",
                self.area_m2.to_string(),
                "Area must be a positive number",
            ));
        }
        check_positive("height_m", self.height_m, "Height")?;

        let run = self.run_length();
        if run.0 > MAX_WALL_RUN_M {
            return Err(CalcError::validation(
                "area_m2",
                self.area_m2.to_string(),
                format!(
                    "Area and height imply a {:.0} m wall per side (limit {:.0} m)",
                    run.0, MAX_WALL_RUN_M
                ),
            ));
        }
        Ok(())
    }

    /// Approximate wall length of each side: (area / sides) / height
    pub fn run_length(&self) -> Meters {
        let per_side = SquareMeters(self.area_m2) / f64::from(self.selection.building_sides);
        per_side / Meters(self.height_m)
    }

    /// Normalize to wall runs. Call after [`AreaInput::validate`].
    pub fn wall_runs(&self) -> WallRuns {
        let run = self.run_length();
        WallRuns {
            runs: vec![run; usize::from(self.selection.building_sides)],
            height: Meters(self.height_m),
            area: SquareMeters(self.area_m2),
        }
    }
}

fn check_positive(field: &str, value: f64, what: &str) -> CalcResult<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(CalcError::validation(
            field,
            value.to_string(),
            format!("{} must be a positive number", what),
        ));
    }
    Ok(())
}

fn check_length(field: &str, value: f64, max: f64, what: &str) -> CalcResult<()> {
    check_positive(field, value, what)?;
    if value > max {
        return Err(CalcError::validation(
            field,
            value.to_string(),
            format!("{} exceeds {} m", what, max),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection(sides: u8) -> Selection {
        Selection::new("mason-frame-152x152", "platform-244", 2, sides)
    }

    fn side(width_m: f64, height_m: f64) -> SideDimension {
        SideDimension { width_m, height_m }
    }

    #[test]
    fn test_selection_ranges() {
        assert!(selection(1).validate().is_ok());

        let mut s = selection(1);
        s.work_levels = 0;
        assert!(s.validate().is_err());
        s.work_levels = 6;
        let err = s.validate().unwrap_err();
        assert!(matches!(err, CalcError::ValidationError { ref field, .. } if field == "work_levels"));

        let mut s = selection(5);
        assert!(matches!(
            s.validate().unwrap_err(),
            CalcError::ValidationError { ref field, .. } if field == "building_sides"
        ));
        s.building_sides = 4;
        s.frame_size = "  ".to_string();
        assert_eq!(s.validate().unwrap_err(), CalcError::missing_field("frame_size"));
    }

    #[test]
    fn test_single_side_is_replicated() {
        let input = DimensionInput {
            sides: vec![side(10.0, 3.0)],
            selection: selection(3),
        };
        let options = SizingOptions::default();
        input.validate(&options).unwrap();
        let runs = input.wall_runs(&options);
        assert_eq!(runs.runs, vec![Meters(10.0); 3]);
        assert_eq!(runs.total_length(), Meters(30.0));
        assert_eq!(runs.area, SquareMeters(90.0));
    }

    #[test]
    fn test_side_count_must_match() {
        let input = DimensionInput {
            sides: vec![side(10.0, 3.0), side(8.0, 3.0)],
            selection: selection(3),
        };
        let err = input.validate(&SizingOptions::default()).unwrap_err();
        assert!(matches!(err, CalcError::ValidationError { ref field, .. } if field == "sides"));
    }

    #[test]
    fn test_empty_sides() {
        let input = DimensionInput {
            sides: vec![],
            selection: selection(1),
        };
        assert_eq!(
            input.validate(&SizingOptions::default()).unwrap_err(),
            CalcError::missing_field("sides")
        );
    }

    #[test]
    fn test_non_positive_measurements() {
        for bad in [0.0, -2.0, f64::NAN, f64::INFINITY] {
            let input = DimensionInput {
                sides: vec![side(bad, 3.0)],
                selection: selection(1),
            };
            let err = input.validate(&SizingOptions::default()).unwrap_err();
            assert!(
                matches!(err, CalcError::ValidationError { ref field, .. } if field == "sides[0].width_m"),
                "width {} should be rejected",
                bad
            );
        }

        let input = DimensionInput {
            sides: vec![side(10.0, 0.0)],
            selection: selection(1),
        };
        assert!(input.validate(&SizingOptions::default()).is_err());
    }

    #[test]
    fn test_tall_walls_accepted() {
        let input = DimensionInput {
            sides: vec![side(10.0, 250.0)],
            selection: selection(1),
        };
        assert!(input.validate(&SizingOptions::default()).is_ok());

        let area = AreaInput {
            area_m2: 3000.0,
            height_m: 250.0,
            selection: selection(1),
        };
        assert!(area.validate().is_ok());
    }

    #[test]
    fn test_uniform_height_enforced() {
        let input = DimensionInput {
            sides: vec![side(10.0, 3.0), side(6.0, 4.5)],
            selection: selection(2),
        };
        let err = input.validate(&SizingOptions::default()).unwrap_err();
        assert!(matches!(err, CalcError::ValidationError { ref field, .. } if field == "sides[1].height_m"));

        let per_side = SizingOptions {
            height_mode: HeightMode::PerSide,
            ..SizingOptions::default()
        };
        input.validate(&per_side).unwrap();
        let runs = input.wall_runs(&per_side);
        assert_eq!(runs.height, Meters(4.5));
        assert_eq!(runs.area, SquareMeters(57.0));
    }

    #[test]
    fn test_area_runs() {
        let input = AreaInput {
            area_m2: 120.0,
            height_m: 3.0,
            selection: selection(4),
        };
        input.validate().unwrap();
        let runs = input.wall_runs();
        assert_eq!(runs.runs.len(), 4);
        assert!((runs.runs[0].0 - 10.0).abs() < 1e-12);
        assert_eq!(runs.area, SquareMeters(120.0));
    }

    #[test]
    fn test_area_validation() {
        let mut input = AreaInput {
            area_m2: 0.0,
            height_m: 3.0,
            selection: selection(1),
        };
        assert!(matches!(
            input.validate().unwrap_err(),
            CalcError::ValidationError { ref field, .. } if field == "area_m2"
        ));

        input.area_m2 = 50.0;
        input.height_m = -1.0;
        assert!(matches!(
            input.validate().unwrap_err(),
            CalcError::ValidationError { ref field, .. } if field == "height_m"
        ));

        input.height_m = 0.001;
        input.area_m2 = 100.0;
        assert!(input.validate().is_err(), "implied 100 km wall must be rejected");
    }

    #[test]
    fn test_system_defaults_when_absent() {
        let json = r#"{
            "sides": [{"width_m": 10.0, "height_m": 3.0}],
            "frame_size": "mason-frame-152x152",
            "platform_length": "platform-244",
            "work_levels": 1,
            "building_sides": 1
        }"#;
        let input: DimensionInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.selection.system, DEFAULT_SYSTEM);
    }
}
