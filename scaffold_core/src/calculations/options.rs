//! Sizing policy options.
//!
//! The production calculators disagreed on whether frames and guardrails
//! scale with the number of working levels. These options make each choice
//! explicit; the defaults are the conservative reference behavior.

use serde::{Deserialize, Serialize};

/// How frames are counted against working levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameConvention {
    /// A frame spans one level; every level gets its own row of frames.
    #[default]
    PerLevel,
    /// One vertical run of frames per position, shared by all levels.
    SharedRun,
}

/// How the representative height is taken from side measurements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeightMode {
    /// All sides must report the same height.
    #[default]
    Uniform,
    /// Sides may differ; the tallest side governs.
    PerSide,
}

/// Options that select between sizing conventions.
///
/// ## JSON Example
///
/// ```json
/// {
///   "frame_convention": "per_level",
///   "top_level_only": false,
///   "height_mode": "uniform"
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SizingOptions {
    pub frame_convention: FrameConvention,

    /// Guardrails only at the final working level instead of every level
    pub top_level_only: bool,

    pub height_mode: HeightMode,
}

impl SizingOptions {
    /// Number of levels that carry guardrails
    pub fn guarded_levels(&self, work_levels: u32) -> u32 {
        if self.top_level_only {
            1
        } else {
            work_levels
        }
    }

    /// Number of frame rows stacked on each frame position
    pub fn frame_rows(&self, work_levels: u32) -> u32 {
        match self.frame_convention {
            FrameConvention::PerLevel => work_levels,
            FrameConvention::SharedRun => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_conservative() {
        let options = SizingOptions::default();
        assert_eq!(options.frame_convention, FrameConvention::PerLevel);
        assert!(!options.top_level_only);
        assert_eq!(options.height_mode, HeightMode::Uniform);
        assert_eq!(options.guarded_levels(3), 3);
        assert_eq!(options.frame_rows(3), 3);
    }

    #[test]
    fn test_alternate_policies() {
        let options = SizingOptions {
            frame_convention: FrameConvention::SharedRun,
            top_level_only: true,
            height_mode: HeightMode::PerSide,
        };
        assert_eq!(options.guarded_levels(4), 1);
        assert_eq!(options.frame_rows(4), 1);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let options: SizingOptions = serde_json::from_str(r#"{"top_level_only": true}"#).unwrap();
        assert!(options.top_level_only);
        assert_eq!(options.frame_convention, FrameConvention::PerLevel);

        let empty: SizingOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, SizingOptions::default());
    }
}
