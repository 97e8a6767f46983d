// ============================================================================
// Magic Brush CLI — headless clean-up of a background-removed image
// ============================================================================
//
// Usage examples:
//   magic-brush --original shoe.jpg --processed shoe_cut.png --click 4,4 --output shoe_final.png
//   magic-brush -r a.png -p a_cut.png -c 0,0 -c 120,8 --tolerance 25 -o out.png
//   magic-brush -r a.png -p a_cut.png -c 0,0 -c 120,8 --undo 1 -o out.png
//   magic-brush -r a.png -p a_cut.png -c 0,0 -t 40 --compression best --save-settings -o out.png
//
// Clicks are replayed in order through one edit session, exactly as the
// interactive tool would apply them, then the current image is written as PNG.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use crate::canvas::{Coordinate, Tolerance};
use crate::io::{PngCompression, load_image_sync};
use crate::session::{ClickOutcome, EditSession};
use crate::settings::BrushSettings;
use crate::surface::HeadlessSurface;

/// Magic Brush headless editor.
///
/// Erase color-connected regions from a background-removed product image.
#[derive(Parser, Debug)]
#[command(name = "magic-brush", about = "Magic Brush headless editor")]
pub struct CliArgs {
    /// Untouched source image (used for dimension checks and preview).
    #[arg(short = 'r', long, value_name = "FILE")]
    pub original: PathBuf,

    /// Background-removed image to refine.
    #[arg(short, long, value_name = "FILE")]
    pub processed: PathBuf,

    /// Seed pixel to erase from, as X,Y. Repeat for several clicks.
    #[arg(short, long = "click", value_name = "X,Y", value_parser = parse_click)]
    pub clicks: Vec<Coordinate>,

    /// Color distance tolerance (0-510). Defaults to the saved setting.
    #[arg(short, long)]
    pub tolerance: Option<f32>,

    /// Number of edits to undo after replaying the clicks.
    #[arg(short, long, default_value_t = 0)]
    pub undo: usize,

    /// Output PNG path.
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// PNG compression: fast, default, best. Defaults to the saved setting.
    #[arg(long, value_name = "LEVEL")]
    pub compression: Option<String>,

    /// Print per-click results and timing.
    #[arg(short, long)]
    pub verbose: bool,

    /// Keep this run's tolerance and compression as the new defaults.
    #[arg(long)]
    pub save_settings: bool,
}

/// Parse "X,Y" into a coordinate.
pub fn parse_click(s: &str) -> Result<Coordinate, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got '{}'", s))?;
    let x = x.trim().parse::<i64>().map_err(|e| format!("bad X in '{}': {}", s, e))?;
    let y = y.trim().parse::<i64>().map_err(|e| format!("bad Y in '{}': {}", s, e))?;
    Ok(Coordinate::new(x, y))
}

/// Run the CLI and return an OS exit code.
pub fn run(args: CliArgs) -> ExitCode {
    let settings = BrushSettings::load();
    crate::logger::set_level(settings.log_level);
    match run_session(&args, &settings) {
        Ok(()) => {
            if args.save_settings
                && let Err(e) = remembered(&args, &settings).save()
            {
                crate::log_warn!("cli: could not save settings: {}", e);
                eprintln!("warning: could not save settings: {}", e);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            crate::log_err!("cli: {}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_session(args: &CliArgs, settings: &BrushSettings) -> Result<(), String> {
    let start = Instant::now();

    let compression = match args.compression.as_deref() {
        Some(s) => PngCompression::parse(s)
            .ok_or_else(|| format!("unknown compression '{}' (use fast, default or best)", s))?,
        None => settings.png_compression,
    };
    let tolerance = match args.tolerance {
        Some(t) => Tolerance::new(t),
        None => Tolerance::from_ui(settings.tolerance),
    };

    let original = load_image_sync(&args.original).map_err(|e| format!("load failed: {}", e))?;
    let processed = load_image_sync(&args.processed).map_err(|e| format!("load failed: {}", e))?;

    let session = EditSession::new(original, processed).map_err(|e| e.to_string())?;
    session.set_tolerance(tolerance);
    session.set_zoom(settings.zoom);

    let mut surface = HeadlessSurface::new(settings.max_surface_dim);
    for &seed in &args.clicks {
        let outcome = session.click(seed, &mut surface).map_err(|e| e.to_string())?;
        if args.verbose {
            match outcome {
                ClickOutcome::Committed { erased } => println!("  {} erased {} px", seed, erased),
                ClickOutcome::Unchanged => println!("  {} nothing to erase", seed),
                ClickOutcome::Dropped => println!("  {} dropped", seed),
            }
        }
    }

    for _ in 0..args.undo {
        if session.undo().map_err(|e| e.to_string())?.is_none() {
            break;
        }
    }

    save(&session, &args.output, compression)?;

    if args.verbose {
        println!(
            "  → {} ({} history steps, {:.0}ms)",
            args.output.display(),
            session.history_len(),
            start.elapsed().as_secs_f64() * 1000.0
        );
    }
    Ok(())
}

/// Settings updated with the values given on the command line.
fn remembered(args: &CliArgs, settings: &BrushSettings) -> BrushSettings {
    let mut next = settings.clone();
    if let Some(t) = args.tolerance {
        next.tolerance = Tolerance::from_ui(t).value();
    }
    if let Some(c) = args.compression.as_deref().and_then(PngCompression::parse) {
        next.png_compression = c;
    }
    next
}

fn save(session: &EditSession, output: &Path, compression: PngCompression) -> Result<(), String> {
    session
        .save_png(output, compression)
        .map_err(|e| format!("save failed: {}", e))
}
