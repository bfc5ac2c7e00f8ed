//! # PDF Generation Module
//!
//! Generates printable material lists from quantity calculations using Typst.
//!
//! ## Architecture
//!
//! - Typst templates are embedded as string constants
//! - Data is injected via string formatting before compilation
//! - Output is raw PDF bytes (`Vec<u8>`)
//!
//! ## Example
//!
//! ```rust,no_run
//! use scaffold_core::calculations::{calculate, CalculationInput, DimensionInput, Selection, SideDimension, SizingOptions};
//! use scaffold_core::catalog::ComponentCatalog;
//! use scaffold_core::pdf::render_calculation_pdf;
//!
//! let catalog = ComponentCatalog::builtin()?;
//! let input = CalculationInput::Dimensions(DimensionInput {
//!     sides: vec![SideDimension { width_m: 10.0, height_m: 3.0 }],
//!     selection: Selection::new("mason-frame-152x152", "platform-244", 2, 1),
//! });
//! let options = SizingOptions::default();
//! let result = calculate(&input, catalog, &options)?;
//! let pdf_bytes = render_calculation_pdf(&input, &options, &result, "North facade")?;
//! std::fs::write("materials.pdf", pdf_bytes).unwrap();
//! # Ok::<(), scaffold_core::errors::CalcError>(())
//! ```

use chrono::Utc;
use typst::diag::{FileError, FileResult};
use typst::foundations::{Bytes, Datetime};
use typst::syntax::{FileId, Source};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, LibraryExt, World};
use typst_pdf::PdfOptions;

use crate::calculations::{
    format_number, CalculationInput, CalculationResult, FrameConvention, HeightMode, SizingOptions,
};
use crate::errors::{CalcError, CalcResult};

// ============================================================================
// Typst World Implementation
// ============================================================================

/// A minimal Typst world for compiling documents without external files.
struct PdfWorld {
    main: Source,
    book: LazyHash<FontBook>,
    fonts: Vec<Font>,
    library: LazyHash<Library>,
}

impl PdfWorld {
    fn new(source: String) -> Self {
        let fonts: Vec<Font> = typst_assets::fonts()
            .flat_map(|data| Font::iter(Bytes::new(data.to_vec())))
            .collect();
        let book = FontBook::from_fonts(&fonts);

        PdfWorld {
            main: Source::detached(source),
            book: LazyHash::new(book),
            fonts,
            library: LazyHash::new(Library::default()),
        }
    }
}

impl World for PdfWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &self.book
    }

    fn main(&self) -> FileId {
        self.main.id()
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.main.id() {
            Ok(self.main.clone())
        } else {
            Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
    }

    fn font(&self, index: usize) -> Option<Font> {
        self.fonts.get(index).cloned()
    }

    fn today(&self, _offset: Option<i64>) -> Option<Datetime> {
        let now = Utc::now();
        Datetime::from_ymd(
            now.format("%Y").to_string().parse().ok()?,
            now.format("%m").to_string().parse().ok()?,
            now.format("%d").to_string().parse().ok()?,
        )
    }
}

// ============================================================================
// PDF Template
// ============================================================================

const MATERIALS_TEMPLATE: &str = r##"
#set page(
  paper: "a4",
  margin: (top: 2cm, bottom: 2cm, left: 2cm, right: 2cm),
  header: align(right)[
    #text(size: 8pt, fill: gray)[ScaffoldPro Material Estimate]
  ],
  footer: context [
    #line(length: 100%, stroke: 0.5pt + gray)
    #v(4pt)
    #grid(
      columns: (1fr, 1fr, 1fr),
      align(left)[#text(size: 8pt)[{{LABEL}}]],
      align(center)[#text(size: 8pt)[Page #counter(page).display()]],
      align(right)[#text(size: 8pt)[{{DATE}}]],
    )
  ]
)

#set text(font: "DejaVu Sans Mono", size: 9pt)

#align(center)[
  #block(width: 100%, fill: rgb("#f0f0f0"), inset: 12pt, radius: 4pt)[
    #text(size: 16pt, weight: "bold")[Scaffolding Material List]
    #v(4pt)
    #text(size: 12pt)[{{LABEL}}]
  ]
]

#v(12pt)

#grid(
  columns: (1fr, 1fr),
  gutter: 20pt,
  [
    *Input*
    #v(4pt)
    #table(
      columns: (auto, 1fr),
      stroke: none,
      row-gutter: 2pt,
{{INPUT_ROWS}}
    )
  ],
  [
    *Selection*
    #v(4pt)
    #table(
      columns: (auto, 1fr),
      stroke: none,
      row-gutter: 2pt,
      [System:], [{{SYSTEM}}],
      [Frame:], [{{FRAME}}],
      [Platform:], [{{PLATFORM}}],
      [Work levels:], [{{WORK_LEVELS}}],
      [Sides:], [{{SIDES}}],
      [Frames:], [{{CONVENTION}}],
      [Guardrails:], [{{GUARDING}}],
    )
  ]
)

#v(12pt)
#line(length: 100%, stroke: 0.5pt)
#v(8pt)

== Components

#table(
  columns: (auto, auto, 1fr),
  inset: 6pt,
  stroke: 0.5pt,
  align: (left, right, left),
  table.header([*Component*], [*Qty*], [*Specification*]),
{{COMPONENT_ROWS}}
  table.footer([*Total*], [*{{TOTAL}}*], []),
)

#v(12pt)

== Summary

#table(
  columns: (1fr, auto),
  inset: 6pt,
  stroke: 0.5pt,
  align: (left, right),
  [Dimensions], [{{DIMENSIONS}}],
  [Wall area], [{{AREA}} m²],
  [Scaffold coverage], [{{COVERAGE}} m²],
  [Frame positions per side], [{{FRAMES_PER_SIDE}}],
  [Bays per level], [{{BAYS}}],
  [Estimated weight], [{{WEIGHT}} kg],
  [Rated platform load], [{{LOAD}} kg/m²],
  [Safety factor], [{{SAFETY}}],
)

#v(16pt)

#block(width: 100%, fill: rgb("#fff3cd"), inset: 10pt, radius: 4pt)[
  #text(size: 8pt)[
    Quantities are a planning estimate. A competent person must verify the
    design, ties, and loading against the manufacturer's data and local
    regulations before erection.
  ]
]
"##;

/// Render a calculation and the input it came from as a PDF material list.
///
/// # Arguments
///
/// * `input` - The submission that produced `result`
/// * `options` - Sizing options used for the calculation
/// * `result` - Calculation output
/// * `label` - Free-text job or site label for the title block
///
/// # Returns
///
/// * `Ok(Vec<u8>)` - PDF file as bytes
/// * `Err(CalcError::Internal)` - Typst compilation or PDF export failed
pub fn render_calculation_pdf(
    input: &CalculationInput,
    options: &SizingOptions,
    result: &CalculationResult,
    label: &str,
) -> CalcResult<Vec<u8>> {
    let label = if label.trim().is_empty() {
        "Untitled estimate".to_string()
    } else {
        escape_typst(label.trim())
    };

    let convention = match options.frame_convention {
        FrameConvention::PerLevel => "One row per level",
        FrameConvention::SharedRun => "Shared run",
    };
    let guarding = if options.top_level_only {
        "Top level only"
    } else {
        "Every level"
    };
    let frames_per_side = result
        .layout
        .frames_per_side
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(" + ");

    let source = MATERIALS_TEMPLATE
        .replace("{{LABEL}}", &label)
        .replace("{{DATE}}", &Utc::now().format("%Y-%m-%d").to_string())
        .replace("{{INPUT_ROWS}}", &build_input_rows(input, options))
        .replace("{{SYSTEM}}", &escape_typst(&result.system))
        .replace("{{FRAME}}", &escape_typst(&result.frame_size))
        .replace("{{PLATFORM}}", &escape_typst(&result.platform_length))
        .replace("{{WORK_LEVELS}}", &result.work_levels.to_string())
        .replace("{{SIDES}}", &result.building_sides.to_string())
        .replace("{{CONVENTION}}", convention)
        .replace("{{GUARDING}}", guarding)
        .replace("{{COMPONENT_ROWS}}", &build_component_rows(result))
        .replace("{{TOTAL}}", &format_number(u64::from(result.total_components)))
        .replace("{{DIMENSIONS}}", &result.dimensions)
        .replace("{{AREA}}", &format!("{:.2}", result.area_m2))
        .replace("{{COVERAGE}}", &format!("{:.2}", result.scaffold_coverage_m2))
        .replace("{{FRAMES_PER_SIDE}}", &frames_per_side)
        .replace("{{BAYS}}", &result.layout.bays_per_level.to_string())
        .replace("{{WEIGHT}}", &format_number(u64::from(result.weight_kg)))
        .replace("{{LOAD}}", &format!("{:.0}", result.load_capacity_kg_m2))
        .replace("{{SAFETY}}", &format!("{:.1}", result.safety_factor));

    compile_pdf(source)
}

fn compile_pdf(source: String) -> CalcResult<Vec<u8>> {
    let world = PdfWorld::new(source);

    let warned = typst::compile(&world);
    let document = warned.output.map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        CalcError::internal(format!("Typst compilation failed: {}", error_msgs.join("; ")))
    })?;

    typst_pdf::pdf(&document, &PdfOptions::default()).map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        CalcError::internal(format!("PDF rendering failed: {}", error_msgs.join("; ")))
    })
}

fn build_input_rows(input: &CalculationInput, options: &SizingOptions) -> String {
    let mut rows = Vec::new();
    match input {
        CalculationInput::Dimensions(d) => {
            rows.push(("Mode".to_string(), "Measured sides".to_string()));
            for (i, side) in d.sides.iter().enumerate() {
                let name = if d.sides.len() == 1 {
                    "Each side".to_string()
                } else {
                    format!("Side {}", i + 1)
                };
                rows.push((name, format!("{:.2} m x {:.2} m", side.width_m, side.height_m)));
            }
            if options.height_mode == HeightMode::PerSide && d.sides.len() > 1 {
                rows.push(("Height".to_string(), "Tallest side".to_string()));
            }
        }
        CalculationInput::Area(a) => {
            rows.push(("Mode".to_string(), "Wall area".to_string()));
            rows.push(("Area".to_string(), format!("{:.2} m²", a.area_m2)));
            rows.push(("Height".to_string(), format!("{:.2} m", a.height_m)));
        }
    }

    rows.iter()
        .map(|(name, value)| format!("      [{}:], [{}],", name, escape_typst(value)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn build_component_rows(result: &CalculationResult) -> String {
    result
        .lines()
        .map(|(kind, line)| {
            format!(
                "  [{}], [{}], [{}],",
                kind.label(),
                format_number(u64::from(line.quantity)),
                escape_typst(&line.specification)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Escape special Typst characters in user-provided text. Line breaks
/// become spaces so a value stays on one line of markup.
fn escape_typst(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '*' | '_' | '#' | '$' | '@' | '<' | '>' | '\\' | '`' | '[' | ']' | '~' | '/' => {
                format!("\\{}", c)
            }
            '\n' | '\r' => " ".to_string(),
            _ => c.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::{calculate, AreaInput, DimensionInput, Selection, SideDimension};
    use crate::catalog::ComponentCatalog;

    #[test]
    fn test_escape_typst() {
        assert_eq!(escape_typst("North #2 [rear]"), "North \\#2 \\[rear\\]");
        assert_eq!(escape_typst("a_b*c"), "a\\_b\\*c");
        assert_eq!(escape_typst("plain text"), "plain text");
        assert_eq!(escape_typst("A // rear"), "A \\/\\/ rear");
        assert_eq!(escape_typst("Line1\n= heading"), "Line1 = heading");
    }

    #[test]
    fn test_input_rows() {
        let input = CalculationInput::Area(AreaInput {
            area_m2: 120.0,
            height_m: 3.0,
            selection: Selection::new("mason-frame-152x152", "platform-244", 1, 4),
        });
        let rows = build_input_rows(&input, &SizingOptions::default());
        assert!(rows.contains("[Area:], [120.00 m²],"));
        assert!(rows.contains("[Height:], [3.00 m],"));
    }

    #[test]
    fn test_pdf_generation() {
        let catalog = ComponentCatalog::builtin().unwrap();
        let input = CalculationInput::Dimensions(DimensionInput {
            sides: vec![SideDimension { width_m: 10.0, height_m: 3.0 }],
            selection: Selection::new("mason-frame-152x152", "platform-244", 2, 1),
        });
        let options = SizingOptions::default();
        let result = calculate(&input, catalog, &options).unwrap();

        let pdf = render_calculation_pdf(&input, &options, &result, "Test site #1");
        assert!(pdf.is_ok(), "PDF generation failed: {:?}", pdf.err());

        let pdf_bytes = pdf.unwrap();
        assert!(pdf_bytes.starts_with(b"%PDF"), "Output is not a valid PDF");
        assert!(pdf_bytes.len() > 1000, "PDF seems too small");
    }

    #[test]
    fn test_pdf_labels_with_markup_syntax() {
        let catalog = ComponentCatalog::builtin().unwrap();
        let input = CalculationInput::Dimensions(DimensionInput {
            sides: vec![SideDimension { width_m: 10.0, height_m: 3.0 }],
            selection: Selection::new("mason-frame-152x152", "platform-244", 1, 1),
        });
        let options = SizingOptions::default();
        let result = calculate(&input, catalog, &options).unwrap();

        for label in ["Block A // rear", "Unit /* east", "Line1\n= heading", "a */ b"] {
            let pdf = render_calculation_pdf(&input, &options, &result, label);
            assert!(pdf.is_ok(), "label {:?} failed: {:?}", label, pdf.err());
            assert!(pdf.unwrap().starts_with(b"%PDF"));
        }
    }
}
