//! # Quantity Sizing
//!
//! Turns normalized wall runs and a part selection into a bill of materials.
//!
//! ## Method
//!
//! Each side is a straight run of bays. A run of length `L` with frame width
//! `w` needs `ceil(L / w) + 1` frame positions (one extra frame closes the
//! last bay) and one fewer bay than positions. Every other count derives
//! from those two figures, the number of working levels `W`, and the number
//! of sides `S`:
//!
//! | component | quantity |
//! |---|---|
//! | frames | Σ positions × W (per-level) or Σ positions (shared run) |
//! | cross braces | Σ bays × W × 2 |
//! | platforms | Σ bays × 3 × W |
//! | base plates, screw jacks, leg holders | Σ positions |
//! | guardrails | Σ positions × guarded levels + 4 end rails |
//! | side guardrails | Σ bays × 2 × guarded levels |
//! | toe boards | ceil((side guardrails + 4) / 3) |
//! | outriggers | 2 × S |
//! | ladders | ceil(W / 2) |
//! | wall attachments | ceil(Σ L / 5) × W |
//!
//! Physical counts always round up; only weight and coverage are rounded to
//! nearest for display.

use crate::catalog::{ComponentCatalog, ComponentKind, FrameSpec, PlatformSpec, ScaffoldSystem};
use crate::errors::{CalcError, CalcResult};
use crate::units::{Kilograms, Meters};

use super::input::{Selection, WallRuns};
use super::options::SizingOptions;
use super::result::{CalculationResult, ComponentLine, ScaffoldLayout};

/// End-cap rails: two ends × two rail tiers
pub const END_GUARDRAILS: u32 = 4;

/// Platform boards laid across each bay
pub const PLATFORMS_PER_BAY: u32 = 3;

/// Braces per bay face
pub const CROSS_BRACES_PER_BAY: u32 = 2;

/// Side guardrail segments per bay
pub const SIDE_GUARDRAILS_PER_BAY: u32 = 2;

/// Guardrail segments covered by one toe board
pub const RAILS_PER_TOE_BOARD: u32 = 3;

/// Outrigger stabilizers per building side
pub const OUTRIGGERS_PER_SIDE: u32 = 2;

/// Working levels served by one access ladder
pub const LEVELS_PER_LADDER: u32 = 2;

/// Wall tie spacing along the building (m)
pub const WALL_TIE_SPACING_M: f64 = 5.0;

/// Ratios this close to a whole number are treated as that number, so an
/// exact multiple of the frame width does not gain a frame to float noise.
const RATIO_TOLERANCE: f64 = 1e-9;

/// Round a non-negative ratio up to a whole count. Any positive ratio
/// counts at least one.
fn ceil_count(ratio: f64) -> u32 {
    let nearest = ratio.round();
    if nearest >= 1.0 && (ratio - nearest).abs() < RATIO_TOLERANCE {
        nearest as u32
    } else {
        ratio.ceil() as u32
    }
}

fn ceil_div(numerator: u32, denominator: u32) -> u32 {
    numerator.div_ceil(denominator)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Catalog entries resolved for one selection.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedParts<'a> {
    pub frame: &'a FrameSpec,
    pub platform: &'a PlatformSpec,
    pub system: &'a ScaffoldSystem,
}

impl<'a> ResolvedParts<'a> {
    /// Resolve every key of a selection, failing on the first unknown one.
    pub fn resolve(catalog: &'a ComponentCatalog, selection: &Selection) -> CalcResult<Self> {
        Ok(ResolvedParts {
            frame: catalog.frame(&selection.frame_size)?,
            platform: catalog.platform(&selection.platform_length)?,
            system: catalog.system(&selection.system)?,
        })
    }

    /// Unit weight of a component kind.
    ///
    /// Frames and platforms weigh what their selected catalog entry says;
    /// accessories come from the system table.
    pub fn unit_weight(&self, kind: ComponentKind) -> CalcResult<Kilograms> {
        match kind {
            ComponentKind::Frame => Ok(self.frame.weight_kg),
            ComponentKind::Platform => Ok(self.platform.weight_kg),
            accessory => self
                .system
                .accessory(accessory)
                .map(|spec| spec.weight_kg)
                .ok_or_else(|| missing_accessory(self.system, accessory)),
        }
    }

    /// Specification text for a component kind
    pub fn specification(&self, kind: ComponentKind) -> CalcResult<String> {
        match kind {
            ComponentKind::Frame => Ok(self.frame.name.clone()),
            ComponentKind::Platform => Ok(self.platform.name.clone()),
            ComponentKind::Guardrail => self.accessory_text(kind).map(|text| {
                format!("{} (incl. {} end rails)", text, END_GUARDRAILS)
            }),
            accessory => self.accessory_text(accessory),
        }
    }

    fn accessory_text(&self, kind: ComponentKind) -> CalcResult<String> {
        self.system
            .accessory(kind)
            .map(|spec| spec.specification.clone())
            .ok_or_else(|| missing_accessory(self.system, kind))
    }
}

fn missing_accessory(system: &ScaffoldSystem, kind: ComponentKind) -> CalcError {
    CalcError::internal(format!(
        "system '{}' has no '{}' accessory entry",
        system.key,
        kind.key()
    ))
}

/// Raw quantities before specification text and weights are attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Quantities {
    frames: u32,
    cross_braces: u32,
    guardrails: u32,
    base_plates: u32,
    platforms: u32,
    screw_jacks: u32,
    toe_boards: u32,
    outriggers: u32,
    ladders: u32,
    leg_holders: u32,
    wall_attachments: u32,
    side_guardrails: u32,
}

impl Quantities {
    fn get(&self, kind: ComponentKind) -> u32 {
        match kind {
            ComponentKind::Frame => self.frames,
            ComponentKind::CrossBrace => self.cross_braces,
            ComponentKind::Guardrail => self.guardrails,
            ComponentKind::BasePlate => self.base_plates,
            ComponentKind::Platform => self.platforms,
            ComponentKind::ScrewJack => self.screw_jacks,
            ComponentKind::ToeBoard => self.toe_boards,
            ComponentKind::Outrigger => self.outriggers,
            ComponentKind::Ladder => self.ladders,
            ComponentKind::LegHolder => self.leg_holders,
            ComponentKind::WallAttachment => self.wall_attachments,
            ComponentKind::SideGuardrail => self.side_guardrails,
        }
    }
}

/// Size a scaffold for normalized wall runs.
///
/// This is the shared algorithm behind both input shapes. Inputs must
/// already be validated; catalog keys are resolved here.
pub fn size_scaffold(
    runs: &WallRuns,
    selection: &Selection,
    catalog: &ComponentCatalog,
    options: &SizingOptions,
) -> CalcResult<CalculationResult> {
    let parts = ResolvedParts::resolve(catalog, selection)?;

    let frame_width = parts.frame.width_m();
    let platform_length = parts.platform.length_m();
    let work_levels = u32::from(selection.work_levels);
    let sides = u32::try_from(runs.runs.len())
        .map_err(|_| CalcError::internal("wall run count exceeds u32"))?;

    let frames_per_side: Vec<u32> = runs
        .runs
        .iter()
        .map(|run| ceil_count(run.0 / frame_width.0) + 1)
        .collect();
    let positions: u32 = frames_per_side.iter().sum();
    let bays: u32 = frames_per_side.iter().map(|n| n - 1).sum();

    let guarded_levels = options.guarded_levels(work_levels);
    let wall_length = runs.total_length();

    let side_guardrails = bays * SIDE_GUARDRAILS_PER_BAY * guarded_levels;
    let base_plates = positions;

    let quantities = Quantities {
        frames: positions * options.frame_rows(work_levels),
        cross_braces: bays * work_levels * CROSS_BRACES_PER_BAY,
        guardrails: positions * guarded_levels + END_GUARDRAILS,
        base_plates,
        platforms: bays * PLATFORMS_PER_BAY * work_levels,
        screw_jacks: base_plates,
        toe_boards: ceil_div(side_guardrails + END_GUARDRAILS, RAILS_PER_TOE_BOARD),
        outriggers: OUTRIGGERS_PER_SIDE * sides,
        ladders: ceil_div(work_levels, LEVELS_PER_LADDER),
        leg_holders: positions,
        wall_attachments: ceil_count(wall_length.0 / WALL_TIE_SPACING_M) * work_levels,
        side_guardrails,
    };

    let mut total_components = 0u32;
    let mut total_weight = Kilograms(0.0);
    for kind in ComponentKind::ALL {
        let quantity = quantities.get(kind);
        total_components += quantity;
        total_weight = total_weight + parts.unit_weight(kind)? * f64::from(quantity);
    }

    let line = |kind: ComponentKind| -> CalcResult<ComponentLine> {
        Ok(ComponentLine::new(quantities.get(kind), parts.specification(kind)?))
    };

    let coverage = frame_width * platform_length;

    Ok(CalculationResult {
        frames: line(ComponentKind::Frame)?,
        cross_braces: line(ComponentKind::CrossBrace)?,
        guardrails: line(ComponentKind::Guardrail)?,
        base_plates: line(ComponentKind::BasePlate)?,
        platforms: line(ComponentKind::Platform)?,
        screw_jacks: line(ComponentKind::ScrewJack)?,
        toe_boards: line(ComponentKind::ToeBoard)?,
        outriggers: line(ComponentKind::Outrigger)?,
        ladders: line(ComponentKind::Ladder)?,
        leg_holders: line(ComponentKind::LegHolder)?,
        wall_attachments: line(ComponentKind::WallAttachment)?,
        side_guardrails: line(ComponentKind::SideGuardrail)?,
        total_components,
        weight_kg: total_weight.0.round() as u32,
        load_capacity_kg_m2: parts.system.load_capacity_kg_m2,
        dimensions: format_dimensions(wall_length, frame_width, runs.height),
        area_m2: round2(runs.area.0),
        scaffold_coverage_m2: round2(coverage.0 * f64::from(positions)),
        frame_size: parts.frame.name.clone(),
        platform_length: parts.platform.name.clone(),
        system: parts.system.name.clone(),
        work_levels: selection.work_levels,
        building_sides: selection.building_sides,
        safety_factor: parts.system.safety_factor,
        layout: ScaffoldLayout {
            frames_per_side,
            bays_per_level: bays,
            wall_length_m: wall_length.0,
            height_m: runs.height.0,
            frame_width_m: frame_width.0,
            frame_height_m: parts.frame.height_m().0,
            frame_convention: options.frame_convention,
            top_level_only: options.top_level_only,
        },
    })
}

fn format_dimensions(wall_length: Meters, frame_width: Meters, height: Meters) -> String {
    format!(
        "{:.1}m x {:.1}m x {:.1}m",
        wall_length.0, frame_width.0, height.0
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ceil_count_tolerates_float_noise() {
        // 13.5128 / 1.9304 evaluates to 7.000000000000001
        assert_eq!(ceil_count(13.5128 / 1.9304), 7);
        assert_eq!(ceil_count(10.668 / 1.524), 7);
        assert_eq!(ceil_count(10.0 / 1.524), 7);
        assert_eq!(ceil_count(0.01), 1);
        assert_eq!(ceil_count(2.0), 2);
        assert_eq!(ceil_count(2.000001), 3);
    }

    #[test]
    fn test_ceil_count_tiny_ratio_is_one() {
        assert_eq!(ceil_count(1e-10), 1);
        assert_eq!(ceil_count(1e-12), 1);
        assert_eq!(ceil_count(0.0), 0);
    }

    #[test]
    fn test_ceil_div() {
        assert_eq!(ceil_div(1, 2), 1);
        assert_eq!(ceil_div(2, 2), 1);
        assert_eq!(ceil_div(5, 2), 3);
        assert_eq!(ceil_div(32, 3), 11);
    }

    #[test]
    fn test_format_dimensions() {
        assert_eq!(
            format_dimensions(Meters(10.0), Meters(1.524), Meters(3.0)),
            "10.0m x 1.5m x 3.0m"
        );
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(29.7289), 29.73);
        assert_eq!(round2(1.0), 1.0);
    }
}
