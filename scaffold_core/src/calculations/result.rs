//! Calculation result records and their text rendering.

use serde::{Deserialize, Serialize};

use crate::catalog::ComponentKind;

use super::options::FrameConvention;

/// Quantity and specification for one component kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentLine {
    pub quantity: u32,
    pub specification: String,
}

impl ComponentLine {
    pub fn new(quantity: u32, specification: impl Into<String>) -> Self {
        ComponentLine {
            quantity,
            specification: specification.into(),
        }
    }
}

/// Derived layout figures, enough to draw the schematic without re-sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaffoldLayout {
    /// Frame positions along each side (one ground row)
    pub frames_per_side: Vec<u32>,

    /// Bays on one level, summed over all sides
    pub bays_per_level: u32,

    /// Combined wall length of all sides (m)
    pub wall_length_m: f64,

    /// Representative scaffold height (m)
    pub height_m: f64,

    /// Bay spacing (m)
    pub frame_width_m: f64,

    /// One lift (m)
    pub frame_height_m: f64,

    pub frame_convention: FrameConvention,

    pub top_level_only: bool,
}

/// Bill of materials and summary figures for one submission.
///
/// ## JSON Example (abridged)
///
/// ```json
/// {
///   "frames": { "quantity": 16, "specification": "Mason Frame 152.4 x 152.4 cm" },
///   "cross_braces": { "quantity": 28, "specification": "Diagonal cross brace, pinned to frame lugs" },
///   "total_components": 176,
///   "weight_kg": 1531,
///   "load_capacity_kg_m2": 675.0,
///   "dimensions": "10.0m x 1.5m x 3.0m",
///   "area_m2": 30.0,
///   "scaffold_coverage_m2": 29.73,
///   "frame_size": "Mason Frame 152.4 x 152.4 cm",
///   "platform_length": "243.84 cm Plywood Platform",
///   "work_levels": 2,
///   "building_sides": 1,
///   "safety_factor": 1.4
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub frames: ComponentLine,
    pub cross_braces: ComponentLine,
    pub guardrails: ComponentLine,
    pub base_plates: ComponentLine,
    pub platforms: ComponentLine,
    pub screw_jacks: ComponentLine,
    pub toe_boards: ComponentLine,
    pub outriggers: ComponentLine,
    pub ladders: ComponentLine,
    pub leg_holders: ComponentLine,
    pub wall_attachments: ComponentLine,
    pub side_guardrails: ComponentLine,

    /// Sum of every line's quantity
    pub total_components: u32,

    /// Estimated total weight, rounded to whole kilograms
    pub weight_kg: u32,

    /// Rated platform load (kg/m²)
    pub load_capacity_kg_m2: f64,

    /// "{wall length}m x {frame width}m x {height}m"
    pub dimensions: String,

    /// Wall area covered (m²)
    pub area_m2: f64,

    /// Plan-view footprint of the frames (m²)
    pub scaffold_coverage_m2: f64,

    /// Resolved frame display name
    pub frame_size: String,

    /// Resolved platform display name
    pub platform_length: String,

    /// Resolved system display name
    pub system: String,

    pub work_levels: u8,
    pub building_sides: u8,
    pub safety_factor: f64,

    pub layout: ScaffoldLayout,
}

impl CalculationResult {
    /// Get the line for a component kind
    pub fn line(&self, kind: ComponentKind) -> &ComponentLine {
        match kind {
            ComponentKind::Frame => &self.frames,
            ComponentKind::CrossBrace => &self.cross_braces,
            ComponentKind::Guardrail => &self.guardrails,
            ComponentKind::BasePlate => &self.base_plates,
            ComponentKind::Platform => &self.platforms,
            ComponentKind::ScrewJack => &self.screw_jacks,
            ComponentKind::ToeBoard => &self.toe_boards,
            ComponentKind::Outrigger => &self.outriggers,
            ComponentKind::Ladder => &self.ladders,
            ComponentKind::LegHolder => &self.leg_holders,
            ComponentKind::WallAttachment => &self.wall_attachments,
            ComponentKind::SideGuardrail => &self.side_guardrails,
        }
    }

    /// All lines in display order
    pub fn lines(&self) -> impl Iterator<Item = (ComponentKind, &ComponentLine)> {
        ComponentKind::ALL.into_iter().map(move |kind| (kind, self.line(kind)))
    }

    /// Frames on the ground row (one base plate per frame position)
    pub fn ground_frames(&self) -> u32 {
        self.layout.frames_per_side.iter().sum()
    }

    /// Plain-text breakdown table for terminals and logs.
    pub fn summary_table(&self) -> String {
        let spec_width = self
            .lines()
            .map(|(_, line)| line.specification.chars().count())
            .max()
            .unwrap_or(0)
            .max("Specification".len());
        let rule = "-".repeat(18 + 2 + 9 + 2 + spec_width);

        let mut out = String::new();
        out.push_str(&format!(
            "{:<18}  {:>9}  {}\n",
            "Component", "Quantity", "Specification"
        ));
        out.push_str(&rule);
        out.push('\n');
        for (kind, line) in self.lines() {
            out.push_str(&format!(
                "{:<18}  {:>9}  {}\n",
                kind.label(),
                format_number(u64::from(line.quantity)),
                line.specification
            ));
        }
        out.push_str(&rule);
        out.push('\n');
        out.push_str(&format!(
            "{:<18}  {:>9}\n",
            "Total Components",
            format_number(u64::from(self.total_components))
        ));
        out.push('\n');
        out.push_str(&format!("Dimensions:     {}\n", self.dimensions));
        out.push_str(&format!("Area:           {:.2} m²\n", self.area_m2));
        out.push_str(&format!("Coverage:       {:.2} m²\n", self.scaffold_coverage_m2));
        out.push_str(&format!("Ground frames:  {}\n", self.ground_frames()));
        out.push_str(&format!(
            "Total weight:   {} kg\n",
            format_number(u64::from(self.weight_kg))
        ));
        out.push_str(&format!("Load capacity:  {:.0} kg/m²\n", self.load_capacity_kg_m2));
        out.push_str(&format!("Safety factor:  {:.1}\n", self.safety_factor));
        out
    }
}

/// Format an integer with comma thousands separators (12345 -> "12,345").
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
