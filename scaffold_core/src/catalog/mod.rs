//! # Component Catalog
//!
//! Read-only lookup tables for the sizing engine: frame sizes, platform
//! lengths, and scaffold systems (accessory weights, load capacity, safety
//! factor).
//!
//! The built-in catalog is a TOML document embedded at compile time and parsed
//! once into a process-wide singleton. Deployments that stock different parts
//! can load their own file with [`ComponentCatalog::load`] and pass it to the
//! engine by reference instead.
//!
//! ## Example
//!
//! ```rust
//! use scaffold_core::catalog::ComponentCatalog;
//!
//! let catalog = ComponentCatalog::builtin().unwrap();
//! let frame = catalog.frame("mason-frame-152x152").unwrap();
//! assert_eq!(frame.width_cm.0, 152.4);
//!
//! assert!(catalog.frame("mason-frame-999x999").is_err());
//! ```

pub mod frames;
pub mod platforms;
pub mod systems;

pub use frames::FrameSpec;
pub use platforms::PlatformSpec;
pub use systems::{AccessorySpec, ComponentKind, ScaffoldSystem};

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use systems::RawScaffoldSystem;

/// Key of the only system shipped in the built-in catalog
pub const DEFAULT_SYSTEM: &str = "mason-frame";

/// Current schema version for catalog files
pub const CATALOG_SCHEMA_VERSION: &str = "0.1.0";

const BUILTIN_CATALOG: &str = include_str!("../../data/catalog.toml");

static BUILTIN: Lazy<CalcResult<ComponentCatalog>> =
    Lazy::new(|| ComponentCatalog::from_toml_str(BUILTIN_CATALOG));

/// Catalog document as written on disk
#[derive(Debug, Deserialize)]
struct RawCatalog {
    schema_version: String,
    #[serde(default)]
    frames: Vec<FrameSpec>,
    #[serde(default)]
    platforms: Vec<PlatformSpec>,
    #[serde(default)]
    systems: Vec<RawScaffoldSystem>,
}

/// Immutable, validated component catalog.
///
/// Entries keep the order of the source document so selectors can list them
/// as authored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentCatalog {
    pub schema_version: String,
    frames: Vec<FrameSpec>,
    platforms: Vec<PlatformSpec>,
    systems: Vec<ScaffoldSystem>,
}

impl ComponentCatalog {
    /// The built-in catalog, parsed on first use.
    ///
    /// The embedded document is validated like any other catalog; an error
    /// here means the shipped data is broken.
    pub fn builtin() -> CalcResult<&'static ComponentCatalog> {
        BUILTIN.as_ref().map_err(Clone::clone)
    }

    /// Load and validate a catalog from a TOML file.
    pub fn load(path: &Path) -> CalcResult<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| CalcError::file_error("read catalog", path.display().to_string(), e.to_string()))?;
        let catalog = Self::from_toml_str(&contents)?;
        tracing::info!(
            path = %path.display(),
            frames = catalog.frames.len(),
            platforms = catalog.platforms.len(),
            systems = catalog.systems.len(),
            "loaded component catalog"
        );
        Ok(catalog)
    }

    /// Parse and validate a catalog from TOML text.
    pub fn from_toml_str(source: &str) -> CalcResult<Self> {
        let raw: RawCatalog = toml::from_str(source).map_err(|e| CalcError::SerializationError {
            reason: format!("Invalid catalog TOML: {}", e),
        })?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawCatalog) -> CalcResult<Self> {
        validate_schema_version(&raw.schema_version)?;

        if raw.frames.is_empty() {
            return Err(CalcError::invalid_catalog("catalog has no frames"));
        }
        if raw.platforms.is_empty() {
            return Err(CalcError::invalid_catalog("catalog has no platforms"));
        }
        if raw.systems.is_empty() {
            return Err(CalcError::invalid_catalog("catalog has no scaffold systems"));
        }

        for frame in &raw.frames {
            frame.validate()?;
        }
        for platform in &raw.platforms {
            platform.validate()?;
        }
        ensure_unique("frame", raw.frames.iter().map(|f| f.key.as_str()))?;
        ensure_unique("platform", raw.platforms.iter().map(|p| p.key.as_str()))?;
        ensure_unique("system", raw.systems.iter().map(|s| s.key.as_str()))?;

        let systems = raw
            .systems
            .into_iter()
            .map(ScaffoldSystem::from_raw)
            .collect::<CalcResult<Vec<_>>>()?;

        Ok(ComponentCatalog {
            schema_version: raw.schema_version,
            frames: raw.frames,
            platforms: raw.platforms,
            systems,
        })
    }

    /// Look up a frame size.
    pub fn frame(&self, key: &str) -> CalcResult<&FrameSpec> {
        self.frames
            .iter()
            .find(|f| f.key == key)
            .ok_or_else(|| CalcError::unknown_key("frame size", key))
    }

    /// Look up a platform length.
    pub fn platform(&self, key: &str) -> CalcResult<&PlatformSpec> {
        self.platforms
            .iter()
            .find(|p| p.key == key)
            .ok_or_else(|| CalcError::unknown_key("platform length", key))
    }

    /// Look up a scaffold system.
    pub fn system(&self, key: &str) -> CalcResult<&ScaffoldSystem> {
        self.systems
            .iter()
            .find(|s| s.key == key)
            .ok_or_else(|| CalcError::unknown_key("scaffold system", key))
    }

    /// All frame sizes in catalog order
    pub fn frames(&self) -> &[FrameSpec] {
        &self.frames
    }

    /// All platform lengths in catalog order
    pub fn platforms(&self) -> &[PlatformSpec] {
        &self.platforms
    }

    /// All scaffold systems in catalog order
    pub fn systems(&self) -> &[ScaffoldSystem] {
        &self.systems
    }

    /// Frame-size keys, for validating selections before calling the engine
    pub fn frame_keys(&self) -> impl Iterator<Item = &str> {
        self.frames.iter().map(|f| f.key.as_str())
    }

    /// Platform-length keys
    pub fn platform_keys(&self) -> impl Iterator<Item = &str> {
        self.platforms.iter().map(|p| p.key.as_str())
    }
}

fn ensure_unique<'a>(table: &str, keys: impl Iterator<Item = &'a str>) -> CalcResult<()> {
    let mut seen = HashSet::new();
    for key in keys {
        if !seen.insert(key) {
            return Err(CalcError::invalid_catalog(format!(
                "duplicate {} key '{}'",
                table, key
            )));
        }
    }
    Ok(())
}

/// Catalog files must share the major (and, for 0.x, minor) version.
fn validate_schema_version(file_version: &str) -> CalcResult<()> {
    let parse = |v: &str| -> Vec<u32> { v.split('.').filter_map(|p| p.parse().ok()).collect() };
    let file_parts = parse(file_version);
    let current_parts = parse(CATALOG_SCHEMA_VERSION);

    let mismatch = || CalcError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: CATALOG_SCHEMA_VERSION.to_string(),
    };

    match (file_parts.as_slice(), current_parts.as_slice()) {
        ([file_major, ..], [current_major, ..]) if file_major != current_major => Err(mismatch()),
        ([0, file_minor, ..], [0, current_minor, ..]) if file_minor > current_minor => Err(mismatch()),
        ([_, ..], [_, ..]) => Ok(()),
        _ => Err(mismatch()),
    }
}
