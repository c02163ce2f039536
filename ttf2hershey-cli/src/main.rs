mod export;
mod hershey;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Write};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use ttf2hershey::{Font, LoadOptions};

use hershey::{EncodeOptions, HersheyEncoder};

#[derive(Parser)]
#[command(
    name = "ttf2hershey",
    about = "Convert TrueType outlines to Hershey stroke fonts",
    version,
    author
)]
struct Cli {
    /// Log load progress and diagnostics
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode characters of a font
    Encode {
        /// Input TrueType file
        input: PathBuf,

        /// Characters to encode
        #[arg(short, long, conflicts_with = "range")]
        chars: Option<String>,

        /// Inclusive code point range (e.g., "32-127")
        #[arg(short, long, value_parser = parse_range, default_value = "32-127")]
        range: RangeInclusive<u32>,

        /// Samples per curve segment; 0 keeps only on-curve points
        #[arg(short, long, default_value_t = 0)]
        precision: u32,

        /// Extra spacing on both sides of each character
        #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
        kern: i32,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Hershey)]
        format: Format,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Get information about a font file
    Info {
        /// Input TrueType file
        input: PathBuf,

        /// List every table
        #[arg(short, long)]
        detailed: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Hershey,
    Json,
}

fn parse_range(value: &str) -> Result<RangeInclusive<u32>, String> {
    let (lo, hi) = value
        .split_once('-')
        .ok_or_else(|| format!("expected LO-HI, got '{value}'"))?;
    let lo: u32 = lo.trim().parse().map_err(|e| format!("invalid start '{lo}': {e}"))?;
    let hi: u32 = hi.trim().parse().map_err(|e| format!("invalid end '{hi}': {e}"))?;
    if lo > hi {
        return Err(format!("range start {lo} is after end {hi}"));
    }
    Ok(lo..=hi)
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "ttf2hershey=info"
    } else {
        "ttf2hershey=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn load_font(input: &Path, options: LoadOptions) -> Result<Font> {
    let font = Font::from_file(input, options)
        .with_context(|| format!("Failed to load font {}", input.display()))?;
    tracing::info!(
        glyphs = font.glyph_count(),
        diagnostics = font.diagnostics().len(),
        "loaded {}",
        input.display()
    );
    Ok(font)
}

fn write_output(output: Option<&Path>, text: &str) -> Result<()> {
    match output {
        Some(path) => fs::write(path, text)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => io::stdout()
            .lock()
            .write_all(text.as_bytes())
            .context("Failed to write to stdout")?,
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Encode {
            input,
            chars,
            range,
            precision,
            kern,
            format,
            output,
        } => {
            let characters: Vec<char> = match chars {
                Some(chars) => chars.chars().collect(),
                None => range.filter_map(char::from_u32).collect(),
            };
            if characters.is_empty() {
                bail!("No characters to encode");
            }

            let font = load_font(&input, LoadOptions::default().with_precision(precision))?;
            let text = match format {
                Format::Hershey => {
                    let encoder = HersheyEncoder::new(&font, &EncodeOptions { kern })
                        .with_context(|| format!("Cannot encode {}", input.display()))?;
                    let encoded = encoder.encode(characters);
                    if !encoded.skipped.is_empty() {
                        eprintln!(
                            "Warning: skipped {} character(s) outside the encodable range",
                            encoded.skipped.len()
                        );
                    }
                    encoded.records
                }
                Format::Json => {
                    let mut json = export::to_json(&font, characters)?;
                    json.push('\n');
                    json
                }
            };
            write_output(output.as_deref(), &text)?;

            if let Some(path) = output {
                println!("Wrote {}", path.display());
            }
        }

        Commands::Info { input, detailed } => {
            let font = load_font(&input, LoadOptions::default())?;
            let head = font.head();
            let bbox = font.global_bounding_box();

            println!("Font Information for: {}", input.display());
            println!("==========================================");
            println!("Units per em: {}", font.units_per_em());
            println!("Glyphs: {}", font.glyph_count());
            println!(
                "Bounding box: ({}, {}) - ({}, {})",
                bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max
            );
            println!("Loca format: {:?}", head.index_to_loc_format);
            println!("Tables: {}", font.tables().len());
            println!(
                "Character map: {} segments",
                font.character_map().segments().len()
            );

            if detailed {
                println!("\nTables:");
                println!("-------");
                for record in font.tables().iter() {
                    println!(
                        "{}  offset {:>8}  length {:>8}  checksum 0x{:08X}",
                        record.tag, record.offset, record.length, record.checksum
                    );
                }
            }

            let diagnostics = font.diagnostics();
            if !diagnostics.is_empty() {
                println!("\nDiagnostics ({}):", diagnostics.len());
                for diagnostic in diagnostics {
                    println!("  {diagnostic}");
                }
            }
        }
    }

    Ok(())
}
