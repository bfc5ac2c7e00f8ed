//! # Scaffold Quantity Calculations
//!
//! The quantity engine follows the pattern:
//!
//! - `*Input` - Input parameters (JSON-serializable)
//! - [`CalculationResult`] - Bill of materials and summary (JSON-serializable)
//! - `calculate(input, catalog, options) -> CalcResult<CalculationResult>` - Pure function
//!
//! Nothing here performs I/O or keeps state between calls; the catalog is
//! borrowed read-only, so concurrent callers can share one instance.
//!
//! ## Example
//!
//! ```rust
//! use scaffold_core::calculations::{from_dimensions, DimensionInput, Selection, SideDimension, SizingOptions};
//! use scaffold_core::catalog::ComponentCatalog;
//!
//! let catalog = ComponentCatalog::builtin().unwrap();
//! let input = DimensionInput {
//!     sides: vec![SideDimension { width_m: 10.0, height_m: 3.0 }],
//!     selection: Selection::new("mason-frame-152x152", "platform-244", 2, 1),
//! };
//!
//! let result = from_dimensions(&input, catalog, &SizingOptions::default()).unwrap();
//! assert_eq!(result.frames.quantity, 16);
//! assert_eq!(result.platforms.quantity, 42);
//! ```
//!
//! ## Modules
//!
//! - [`input`] - Input records and validation
//! - [`options`] - Sizing conventions
//! - [`sizing`] - The shared quantity algorithm
//! - [`result`] - Result records and text rendering

pub mod input;
pub mod options;
pub mod result;
pub mod sizing;

use serde::{Deserialize, Serialize};

use crate::catalog::ComponentCatalog;
use crate::errors::CalcResult;

pub use input::{AreaInput, DimensionInput, Selection, SideDimension, WallRuns};
pub use options::{FrameConvention, HeightMode, SizingOptions};
pub use result::{format_number, CalculationResult, ComponentLine, ScaffoldLayout};
pub use sizing::{size_scaffold, ResolvedParts};

/// A calculator submission in either supported shape.
///
/// Serialized with a `mode` discriminator:
///
/// ```json
/// { "mode": "area", "area_m2": 120.0, "height_m": 3.0, "frame_size": "mason-frame-152x152",
///   "platform_length": "platform-244", "work_levels": 1, "building_sides": 4 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CalculationInput {
    /// Measured building sides
    Dimensions(DimensionInput),
    /// Total wall area plus height
    Area(AreaInput),
}

impl CalculationInput {
    /// The part selection carried by either shape
    pub fn selection(&self) -> &Selection {
        match self {
            CalculationInput::Dimensions(d) => &d.selection,
            CalculationInput::Area(a) => &a.selection,
        }
    }

    /// Input shape as a string
    pub fn mode(&self) -> &'static str {
        match self {
            CalculationInput::Dimensions(_) => "dimensions",
            CalculationInput::Area(_) => "area",
        }
    }
}

/// Size a scaffold from measured sides.
///
/// # Returns
///
/// * `Ok(CalculationResult)` - Bill of materials
/// * `Err(CalcError::ValidationError)` - A measurement or selection is out of range
/// * `Err(CalcError::UnknownCatalogKey)` - A key is not in the catalog
pub fn from_dimensions(
    input: &DimensionInput,
    catalog: &ComponentCatalog,
    options: &SizingOptions,
) -> CalcResult<CalculationResult> {
    input.validate(options)?;
    let runs = input.wall_runs(options);
    size_scaffold(&runs, &input.selection, catalog, options)
}

/// Size a scaffold from a total wall area and height.
///
/// Each side is approximated as a wall of `(area / sides) / height` meters.
pub fn from_area(
    input: &AreaInput,
    catalog: &ComponentCatalog,
    options: &SizingOptions,
) -> CalcResult<CalculationResult> {
    input.validate()?;
    let runs = input.wall_runs();
    size_scaffold(&runs, &input.selection, catalog, options)
}

/// Size a scaffold from either input shape.
pub fn calculate(
    input: &CalculationInput,
    catalog: &ComponentCatalog,
    options: &SizingOptions,
) -> CalcResult<CalculationResult> {
    match input {
        CalculationInput::Dimensions(d) => from_dimensions(d, catalog, options),
        CalculationInput::Area(a) => from_area(a, catalog, options),
    }
}
