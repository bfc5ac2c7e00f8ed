//! # ScaffoldPro CLI
//!
//! Terminal front end for the scaffold quantity engine. Prompts for the wall
//! and part selection (or reads a JSON submission with `--input`), prints
//! the material breakdown, and can write the result as JSON or PDF.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use scaffold_core::calculations::{
    calculate, AreaInput, CalculationInput, DimensionInput, FrameConvention, HeightMode, Selection,
    SideDimension, SizingOptions,
};
use scaffold_core::catalog::{ComponentCatalog, DEFAULT_SYSTEM};
use scaffold_core::errors::{CalcError, CalcResult};
use scaffold_core::pdf::render_calculation_pdf;

const DEFAULT_FRAME: &str = "mason-frame-152x152";
const DEFAULT_PLATFORM: &str = "platform-244";

/// Scaffolding material calculator
#[derive(Parser, Debug)]
#[command(name = "scaffold", version)]
#[command(about = "Estimate frame scaffolding components, weight, and load rating")]
struct Cli {
    /// Read a JSON calculation input instead of prompting
    #[arg(long)]
    input: Option<PathBuf>,

    /// Component catalog TOML (defaults to the built-in catalog)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Print the result as JSON only
    #[arg(long)]
    json: bool,

    /// Write a PDF material list to this path
    #[arg(long)]
    pdf: Option<PathBuf>,

    /// Job or site label for the PDF title
    #[arg(long, default_value = "")]
    label: String,

    /// Guardrails on the top working level only
    #[arg(long)]
    top_level_only: bool,

    /// Count one run of frames shared by all levels
    #[arg(long)]
    shared_run: bool,

    /// Allow sides of different heights (tallest governs)
    #[arg(long)]
    per_side_height: bool,

    /// List catalog frame sizes and platform lengths, then exit
    #[arg(long)]
    list_catalog: bool,
}

impl Cli {
    fn sizing_options(&self) -> SizingOptions {
        SizingOptions {
            frame_convention: if self.shared_run {
                FrameConvention::SharedRun
            } else {
                FrameConvention::PerLevel
            },
            top_level_only: self.top_level_only,
            height_mode: if self.per_side_height {
                HeightMode::PerSide
            } else {
                HeightMode::Uniform
            },
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!();
                eprintln!("Error JSON:");
                eprintln!("{}", json);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> CalcResult<()> {
    let loaded;
    let catalog = match &cli.catalog {
        Some(path) => {
            loaded = ComponentCatalog::load(path)?;
            &loaded
        }
        None => ComponentCatalog::builtin()?,
    };

    if cli.list_catalog {
        print_catalog(catalog);
        return Ok(());
    }

    let input = match &cli.input {
        Some(path) => {
            let contents = fs::read_to_string(path).map_err(|e| {
                CalcError::file_error("read input", path.display().to_string(), e.to_string())
            })?;
            serde_json::from_str(&contents)?
        }
        None => {
            print_banner();
            prompt_input(catalog)
        }
    };

    let options = cli.sizing_options();
    tracing::debug!(mode = input.mode(), ?options, "calculating");
    let result = calculate(&input, catalog, &options)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!();
        println!("═══════════════════════════════════════════════════");
        println!("  SCAFFOLD MATERIAL LIST");
        println!("═══════════════════════════════════════════════════");
        println!();
        print!("{}", result.summary_table());
        println!();
        println!("═══════════════════════════════════════════════════");
    }

    if let Some(path) = &cli.pdf {
        let bytes = render_calculation_pdf(&input, &options, &result, &cli.label)?;
        fs::write(path, bytes).map_err(|e| {
            CalcError::file_error("write pdf", path.display().to_string(), e.to_string())
        })?;
        tracing::info!(path = %path.display(), "wrote PDF material list");
        if !cli.json {
            println!("PDF written to {}", path.display());
        }
    }

    Ok(())
}

fn print_banner() {
    println!("ScaffoldPro - Scaffolding Material Calculator");
    println!("=============================================");
    println!("Press Enter to accept the [default].");
    println!();
}

fn print_catalog(catalog: &ComponentCatalog) {
    println!("Frame sizes:");
    for frame in catalog.frames() {
        println!("  {:<22} {}", frame.key, frame.name);
    }
    println!();
    println!("Platform lengths:");
    for platform in catalog.platforms() {
        println!("  {:<22} {}", platform.key, platform.name);
    }
    println!();
    println!("Systems:");
    for system in catalog.systems() {
        println!(
            "  {:<22} {} ({:.0} kg/m², safety factor {:.1})",
            system.key, system.name, system.load_capacity_kg_m2, system.safety_factor
        );
    }
}

fn prompt_input(catalog: &ComponentCatalog) -> CalculationInput {
    let by_area = prompt_line("Input by (1) measured sides or (2) wall area [1]: ")
        .map(|s| s.trim() == "2")
        .unwrap_or(false);

    let frames: Vec<(&str, &str)> = catalog
        .frames()
        .iter()
        .map(|f| (f.key.as_str(), f.name.as_str()))
        .collect();
    let platforms: Vec<(&str, &str)> = catalog
        .platforms()
        .iter()
        .map(|p| (p.key.as_str(), p.name.as_str()))
        .collect();

    let frame_size = prompt_choice("Frame size", &frames, DEFAULT_FRAME);
    let platform_length = prompt_choice("Platform length", &platforms, DEFAULT_PLATFORM);
    let work_levels = prompt_u8("Working levels (1-5) [1]: ", 1);
    let building_sides = prompt_u8("Building sides (1-4) [1]: ", 1);

    let selection = Selection {
        frame_size,
        platform_length,
        work_levels,
        building_sides,
        system: DEFAULT_SYSTEM.to_string(),
    };

    if by_area {
        let area_m2 = prompt_f64("Total wall area (m²) [30.0]: ", 30.0);
        let height_m = prompt_f64("Wall height (m) [3.0]: ", 3.0);
        return CalculationInput::Area(AreaInput {
            area_m2,
            height_m,
            selection,
        });
    }

    let same_everywhere = building_sides == 1
        || prompt_line("Same measurements on every side? [Y/n]: ")
            .map(|s| !s.trim().eq_ignore_ascii_case("n"))
            .unwrap_or(true);

    let sides = if same_everywhere {
        vec![prompt_side("Wall")]
    } else {
        (1..=building_sides)
            .map(|i| prompt_side(&format!("Side {}", i)))
            .collect()
    };

    CalculationInput::Dimensions(DimensionInput { sides, selection })
}

fn prompt_side(name: &str) -> SideDimension {
    SideDimension {
        width_m: prompt_f64(&format!("{} length (m) [10.0]: ", name), 10.0),
        height_m: prompt_f64(&format!("{} height (m) [3.0]: ", name), 3.0),
    }
}

fn prompt_line(prompt: &str) -> Option<String> {
    print!("{}", prompt);
    io::stdout().flush().ok()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input).ok()?;
    Some(input)
}

fn prompt_f64(prompt: &str, default: f64) -> f64 {
    prompt_line(prompt)
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn prompt_u8(prompt: &str, default: u8) -> u8 {
    prompt_line(prompt)
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// Numbered menu; returns the chosen key
fn prompt_choice(title: &str, options: &[(&str, &str)], default_key: &str) -> String {
    let default_index = options
        .iter()
        .position(|(key, _)| *key == default_key)
        .unwrap_or(0);

    println!("{}:", title);
    for (i, (_, name)) in options.iter().enumerate() {
        println!("  {}) {}", i + 1, name);
    }

    let answer = prompt_line(&format!("Choice [{}]: ", default_index + 1)).unwrap_or_default();
    let index = parse_choice(&answer, options.len()).unwrap_or(default_index);
    options
        .get(index)
        .map(|(key, _)| key.to_string())
        .unwrap_or_else(|| default_key.to_string())
}

/// 1-based menu answer to a 0-based index
fn parse_choice(answer: &str, len: usize) -> Option<usize> {
    let n: usize = answer.trim().parse().ok()?;
    (1..=len).contains(&n).then(|| n - 1)
}
