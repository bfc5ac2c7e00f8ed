//! Scaffold systems and component kinds.
//!
//! A system groups the per-kind accessory table (unit weight and
//! specification text) with the rated load capacity and safety factor that
//! apply to every estimate built from it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::units::Kilograms;

/// Every physical component kind reported in a bill of materials.
///
/// # Example
/// ```
/// use scaffold_core::catalog::ComponentKind;
///
/// assert_eq!(ComponentKind::CrossBrace.key(), "cross_brace");
/// assert_eq!(ComponentKind::CrossBrace.label(), "Cross Braces");
/// assert!(!ComponentKind::Frame.is_accessory());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Frame,
    CrossBrace,
    Guardrail,
    BasePlate,
    Platform,
    ScrewJack,
    ToeBoard,
    Outrigger,
    Ladder,
    LegHolder,
    WallAttachment,
    SideGuardrail,
}

impl ComponentKind {
    /// All kinds in bill-of-materials display order
    pub const ALL: [ComponentKind; 12] = [
        ComponentKind::Frame,
        ComponentKind::CrossBrace,
        ComponentKind::Guardrail,
        ComponentKind::BasePlate,
        ComponentKind::Platform,
        ComponentKind::ScrewJack,
        ComponentKind::ToeBoard,
        ComponentKind::Outrigger,
        ComponentKind::Ladder,
        ComponentKind::LegHolder,
        ComponentKind::WallAttachment,
        ComponentKind::SideGuardrail,
    ];

    /// Kinds whose weight and specification come from the system table.
    /// Frames and platforms come from their own catalog entries instead.
    pub const ACCESSORIES: [ComponentKind; 10] = [
        ComponentKind::CrossBrace,
        ComponentKind::Guardrail,
        ComponentKind::BasePlate,
        ComponentKind::ScrewJack,
        ComponentKind::ToeBoard,
        ComponentKind::Outrigger,
        ComponentKind::Ladder,
        ComponentKind::LegHolder,
        ComponentKind::WallAttachment,
        ComponentKind::SideGuardrail,
    ];

    /// Key used in catalog files
    pub fn key(&self) -> &'static str {
        match self {
            ComponentKind::Frame => "frame",
            ComponentKind::CrossBrace => "cross_brace",
            ComponentKind::Guardrail => "guardrail",
            ComponentKind::BasePlate => "base_plate",
            ComponentKind::Platform => "platform",
            ComponentKind::ScrewJack => "screw_jack",
            ComponentKind::ToeBoard => "toe_board",
            ComponentKind::Outrigger => "outrigger",
            ComponentKind::Ladder => "ladder",
            ComponentKind::LegHolder => "leg_holder",
            ComponentKind::WallAttachment => "wall_attachment",
            ComponentKind::SideGuardrail => "side_guardrail",
        }
    }

    /// Parse a catalog key
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.key() == key)
    }

    /// Plural display label for tables
    pub fn label(&self) -> &'static str {
        match self {
            ComponentKind::Frame => "Frames",
            ComponentKind::CrossBrace => "Cross Braces",
            ComponentKind::Guardrail => "Guardrails",
            ComponentKind::BasePlate => "Base Plates",
            ComponentKind::Platform => "Platforms",
            ComponentKind::ScrewJack => "Screw Jacks",
            ComponentKind::ToeBoard => "Toe Boards",
            ComponentKind::Outrigger => "Outriggers",
            ComponentKind::Ladder => "Ladders",
            ComponentKind::LegHolder => "Leg Holders",
            ComponentKind::WallAttachment => "Wall Attachments",
            ComponentKind::SideGuardrail => "Side Guardrails",
        }
    }

    /// True if the system accessory table supplies this kind
    pub fn is_accessory(&self) -> bool {
        !matches!(self, ComponentKind::Frame | ComponentKind::Platform)
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Unit weight and specification text for one accessory kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessorySpec {
    pub weight_kg: Kilograms,
    pub specification: String,
}

/// Scaffold system as written in a catalog file (accessory keys unchecked)
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawScaffoldSystem {
    pub key: String,
    pub name: String,
    pub load_capacity_kg_m2: f64,
    pub safety_factor: f64,
    #[serde(default)]
    pub accessories: BTreeMap<String, AccessorySpec>,
}

/// Validated scaffold system entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScaffoldSystem {
    /// Lookup key (e.g., "mason-frame")
    pub key: String,

    /// Display name
    pub name: String,

    /// Rated platform load capacity (kg/m²)
    pub load_capacity_kg_m2: f64,

    /// Safety factor applied to the rated capacity
    pub safety_factor: f64,

    /// One entry per accessory kind
    pub accessories: BTreeMap<ComponentKind, AccessorySpec>,
}

impl ScaffoldSystem {
    /// Get the accessory entry for a kind.
    ///
    /// Returns `None` for frames and platforms, which are described by their
    /// own catalog entries.
    pub fn accessory(&self, kind: ComponentKind) -> Option<&AccessorySpec> {
        self.accessories.get(&kind)
    }

    pub(crate) fn from_raw(raw: RawScaffoldSystem) -> CalcResult<Self> {
        if raw.key.trim().is_empty() {
            return Err(CalcError::invalid_catalog("system entry with empty key"));
        }
        if !(raw.load_capacity_kg_m2.is_finite() && raw.load_capacity_kg_m2 > 0.0) {
            return Err(CalcError::invalid_catalog(format!(
                "system '{}' has non-positive load capacity ({})",
                raw.key, raw.load_capacity_kg_m2
            )));
        }
        if !(raw.safety_factor.is_finite() && raw.safety_factor >= 1.0) {
            return Err(CalcError::invalid_catalog(format!(
                "system '{}' has safety factor below 1.0 ({})",
                raw.key, raw.safety_factor
            )));
        }

        let mut accessories = BTreeMap::new();
        for (key, spec) in raw.accessories {
            let kind = ComponentKind::from_key(&key).ok_or_else(|| {
                CalcError::invalid_catalog(format!(
                    "system '{}' lists unknown component kind '{}'",
                    raw.key, key
                ))
            })?;
            if !kind.is_accessory() {
                return Err(CalcError::invalid_catalog(format!(
                    "system '{}' lists '{}' as an accessory; its weight comes from the {} table",
                    raw.key,
                    key,
                    if kind == ComponentKind::Frame { "frames" } else { "platforms" }
                )));
            }
            if !(spec.weight_kg.0.is_finite() && spec.weight_kg.0 >= 0.0) {
                return Err(CalcError::invalid_catalog(format!(
                    "system '{}' accessory '{}' has negative weight ({})",
                    raw.key, key, spec.weight_kg.0
                )));
            }
            accessories.insert(kind, spec);
        }

        if let Some(missing) = ComponentKind::ACCESSORIES
            .iter()
            .find(|kind| !accessories.contains_key(kind))
        {
            return Err(CalcError::invalid_catalog(format!(
                "system '{}' is missing accessory '{}'",
                raw.key,
                missing.key()
            )));
        }

        Ok(ScaffoldSystem {
            key: raw.key,
            name: raw.name,
            load_capacity_kg_m2: raw.load_capacity_kg_m2,
            safety_factor: raw.safety_factor,
            accessories,
        })
    }
}
