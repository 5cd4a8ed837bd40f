//! barprint: export barcode module matrices to print-ready files.
//!
//! Reads a module matrix as text rows (`1`/`#` set, `0`/`.` unset), or a
//! bar/space width pattern with `--linear`, and writes it as PDF, EPS,
//! SVG, PNG, BMP, or JPEG.
//!
//! # Usage
//!
//! ```text
//! barprint [OPTIONS] --output <OUTPUT> <INPUT>
//! ```
//!
//! Set `RUST_LOG=debug` for geometry and encoder details.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use barprint_core::{BitMatrix, Drawable, DualColor, LinearSymbol, Orientation, Symbol};
use barprint_export::{ColorModel, ExportError, ExportFormat, ExportSettings, Exporter, Resolution};
use clap::Parser;

/// Export a barcode module matrix to PDF, EPS, SVG, PNG, BMP, or JPEG.
#[derive(Parser)]
#[command(name = "barprint", version)]
struct Cli {
    /// Text file holding the module matrix, one row per line.
    input: PathBuf,

    /// File to write.
    #[arg(short, long)]
    output: PathBuf,

    /// Output format (pdf, eps, svg, png, bmp, jpeg).  Inferred from the
    /// output extension when omitted.
    #[arg(long)]
    format: Option<ExportFormat>,

    /// Blank modules added around the symbol.
    #[arg(long, default_value_t = 4)]
    quiet_zone: u32,

    /// Treat the input as a bar/space width pattern (e.g. `211214`).
    #[arg(long)]
    linear: bool,

    /// Bar height in modules, for `--linear`.
    #[arg(long, default_value_t = 50, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    bar_height: u32,

    /// Canvas width in millimetres.
    #[arg(long, default_value_t = ExportSettings::DEFAULT_WIDTH_MM)]
    width_mm: f64,

    /// Canvas height in millimetres.
    #[arg(long, default_value_t = ExportSettings::DEFAULT_HEIGHT_MM)]
    height_mm: f64,

    /// Orientation (rotate0, rotate90, ..., mirror270; or 90, m180).
    #[arg(long, default_value_t = Orientation::Rotate0)]
    orientation: Orientation,

    /// Device resolution in dpi, both axes.
    #[arg(long)]
    dpi: Option<f64>,

    /// Horizontal device resolution in dpi (overrides `--dpi`).
    #[arg(long)]
    dpi_x: Option<f64>,

    /// Vertical device resolution in dpi (overrides `--dpi`).
    #[arg(long)]
    dpi_y: Option<f64>,

    /// Foreground color: `#rrggbb`, `#rgb`, or `cmyk(c,m,y,k)`.
    #[arg(long, default_value = "#000000")]
    foreground: DualColor,

    /// Background color: `#rrggbb`, `#rgb`, or `cmyk(c,m,y,k)`.
    #[arg(long, default_value = "#ffffff")]
    background: DualColor,

    /// Write CMYK colors in vector formats.
    #[arg(long)]
    cmyk: bool,

    /// Leave the background unpainted.
    #[arg(long)]
    transparent: bool,

    /// Document title.
    #[arg(long)]
    title: Option<String>,

    /// Add a TIFF preview at this resolution to EPS output (0 disables).
    #[arg(long, default_value_t = 0)]
    preview_dpi: u32,

    /// Full export settings as a JSON string.
    ///
    /// When provided, all other settings flags are ignored.  The JSON must
    /// be a valid `ExportSettings` serialization; missing fields take
    /// their defaults.
    #[arg(long)]
    config_json: Option<String>,
}

/// Build [`ExportSettings`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual settings flags are ignored.
fn settings_from_cli(cli: &Cli) -> Result<ExportSettings, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    let device_resolution = match (cli.dpi_x.or(cli.dpi), cli.dpi_y.or(cli.dpi)) {
        (None, None) => None,
        (Some(x), Some(y)) => Some(Resolution::new(x, y)),
        _ => return Err("--dpi-x and --dpi-y must be given together".to_string()),
    };

    Ok(ExportSettings {
        width_mm: cli.width_mm,
        height_mm: cli.height_mm,
        title: cli.title.clone(),
        opaque_background: !cli.transparent,
        foreground: cli.foreground,
        background: cli.background,
        color_model: if cli.cmyk {
            ColorModel::Cmyk
        } else {
            ColorModel::Rgb
        },
        orientation: cli.orientation,
        preview_dpi: cli.preview_dpi,
        device_resolution,
        ..ExportSettings::default()
    })
}

/// Resolve the output format from `--format` or the output extension.
fn format_from_cli(cli: &Cli) -> Result<ExportFormat, String> {
    if let Some(format) = cli.format {
        return Ok(format);
    }
    cli.output
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(ExportFormat::from_extension)
        .ok_or_else(|| {
            format!(
                "Cannot infer a format from {}; pass --format",
                cli.output.display()
            )
        })
}

/// Parse a width pattern: one digit per bar or space.
fn parse_widths(text: &str) -> Result<Vec<u32>, String> {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| {
            c.to_digit(10)
                .ok_or_else(|| format!("Invalid width {c:?} in bar pattern"))
        })
        .collect()
}

/// Read the input file into a drawable symbol.
fn load_symbol(cli: &Cli) -> Result<Box<dyn Drawable>, String> {
    let text = std::fs::read_to_string(&cli.input)
        .map_err(|e| format!("Error reading {}: {e}", cli.input.display()))?;

    if cli.linear {
        let widths = parse_widths(&text)?;
        let symbol = LinearSymbol::from_widths(&widths, cli.bar_height, cli.quiet_zone)
            .map_err(|e| e.to_string())?;
        eprintln!(
            "Linear symbol: {} modules wide, {} bars",
            symbol.width(),
            widths.iter().step_by(2).filter(|w| **w > 0).count(),
        );
        return Ok(Box::new(symbol));
    }

    let rows: Vec<&str> = text.lines().collect();
    let matrix = BitMatrix::from_rows(&rows).map_err(|e| e.to_string())?;
    let symbol = Symbol::from_matrix(&matrix, cli.quiet_zone).map_err(|e| e.to_string())?;
    eprintln!(
        "Matrix symbol: {}x{} modules, {} chunks",
        symbol.width(),
        symbol.height(),
        symbol.chunks().len(),
    );
    Ok(Box::new(symbol))
}

/// Export through a buffered writer and report the final file size.
fn encode_into(
    exporter: &Exporter,
    format: ExportFormat,
    symbol: &dyn Drawable,
    file: File,
) -> Result<u64, ExportError> {
    let mut out = BufWriter::new(file);
    exporter.export(format, symbol, &mut out)?;
    out.flush()?;
    Ok(out.get_ref().metadata()?.len())
}

/// Export into `path`, removing the file again if anything fails.
fn write_output(
    exporter: &Exporter,
    format: ExportFormat,
    symbol: &dyn Drawable,
    path: &Path,
) -> Result<u64, ExportError> {
    let file = File::create(path)?;
    let result = encode_into(exporter, format, symbol, file);
    if result.is_err()
        && let Err(e) = std::fs::remove_file(path)
    {
        log::warn!("could not remove partial output {}: {e}", path.display());
    }
    result
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let settings = match settings_from_cli(&cli) {
        Ok(s) => s,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };
    let format = match format_from_cli(&cli) {
        Ok(f) => f,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };
    let symbol = match load_symbol(&cli) {
        Ok(s) => s,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    eprintln!(
        "Canvas: {}x{} mm, {}, {format}",
        settings.width_mm, settings.height_mm, settings.orientation,
    );

    let exporter = Exporter::new(settings);
    match write_output(&exporter, format, symbol.as_ref(), &cli.output) {
        Ok(bytes) => {
            eprintln!("{format} written to {} ({bytes} bytes)", cli.output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error writing {}: {e}", cli.output.display());
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("barprint").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn format_is_inferred_from_extension() {
        let cli = parse(&["in.txt", "-o", "label.JPG"]);
        assert_eq!(format_from_cli(&cli).unwrap(), ExportFormat::Jpeg);
    }

    #[test]
    fn explicit_format_wins() {
        let cli = parse(&["in.txt", "-o", "label.bin", "--format", "eps"]);
        assert_eq!(format_from_cli(&cli).unwrap(), ExportFormat::Eps);
    }

    #[test]
    fn unknown_extension_needs_format() {
        let cli = parse(&["in.txt", "-o", "label.bin"]);
        assert!(format_from_cli(&cli).is_err());
    }

    #[test]
    fn flags_build_settings() {
        let cli = parse(&[
            "in.txt",
            "-o",
            "out.pdf",
            "--width-mm",
            "30",
            "--dpi",
            "600",
            "--dpi-y",
            "300",
            "--cmyk",
            "--transparent",
            "--orientation",
            "90",
            "--foreground",
            "cmyk(100,0,0,0)",
        ]);
        let settings = settings_from_cli(&cli).unwrap();
        assert!((settings.width_mm - 30.0).abs() < f64::EPSILON);
        assert_eq!(settings.device_resolution, Some(Resolution::new(600.0, 300.0)));
        assert_eq!(settings.color_model, ColorModel::Cmyk);
        assert!(!settings.opaque_background);
        assert_eq!(settings.orientation, Orientation::Rotate90);
        assert_eq!(settings.foreground, DualColor::from_cmyk(100, 0, 0, 0));
    }

    #[test]
    fn config_json_replaces_flags() {
        let cli = parse(&[
            "in.txt",
            "-o",
            "out.svg",
            "--width-mm",
            "30",
            "--config-json",
            r#"{"height_mm": 12.5}"#,
        ]);
        let settings = settings_from_cli(&cli).unwrap();
        assert!((settings.width_mm - ExportSettings::DEFAULT_WIDTH_MM).abs() < f64::EPSILON);
        assert!((settings.height_mm - 12.5).abs() < f64::EPSILON);
    }

    #[test]
    fn width_pattern_parses_digits() {
        assert_eq!(parse_widths("2112 14\n").unwrap(), vec![2, 1, 1, 2, 1, 4]);
        assert!(parse_widths("21a").is_err());
    }
}
