//! # scaffold_core - Scaffolding Quantity Engine
//!
//! `scaffold_core` turns a wall description (measured sides, or a total area
//! with a height) plus a part selection into a bill of materials for
//! frame-and-brace scaffolding: frames, braces, platforms, guardrails,
//! stabilizers, ties, total weight, and rated load. All inputs and outputs
//! are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Pure functions over an immutable component catalog
//! - **JSON-First**: All records implement Serialize/Deserialize
//! - **Rich Errors**: Structured error types, not just strings
//! - **Round Up**: Physical counts are never rounded down
//!
//! ## Quick Start
//!
//! ```rust
//! use scaffold_core::calculations::{calculate, AreaInput, CalculationInput, Selection, SizingOptions};
//! use scaffold_core::catalog::ComponentCatalog;
//!
//! let catalog = ComponentCatalog::builtin().unwrap();
//! let input = CalculationInput::Area(AreaInput {
//!     area_m2: 120.0,
//!     height_m: 3.0,
//!     selection: Selection::new("mason-frame-152x152", "platform-244", 1, 4),
//! });
//!
//! let result = calculate(&input, catalog, &SizingOptions::default()).unwrap();
//! println!("{}", result.summary_table());
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - Input records, sizing algorithm, results
//! - [`catalog`] - Frame, platform, and system lookup tables
//! - [`units`] - Type-safe unit wrappers
//! - [`errors`] - Structured error types
//! - [`waitlist`] - Pre-launch email signups
//! - [`file_io`] - Atomic saves and file locking for the waitlist document
//! - [`pdf`] - Printable material lists

pub mod calculations;
pub mod catalog;
pub mod errors;
pub mod file_io;
pub mod pdf;
pub mod units;
pub mod waitlist;

// Re-export commonly used types at crate root for convenience
pub use calculations::{calculate, CalculationInput, CalculationResult, SizingOptions};
pub use catalog::ComponentCatalog;
pub use errors::{CalcError, CalcResult};
pub use waitlist::{FileWaitlist, MemoryWaitlist, WaitlistEntry, WaitlistStore};
