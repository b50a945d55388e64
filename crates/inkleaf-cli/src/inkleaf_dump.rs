//! inkleaf-dump - Dump per-page geometry and positioned text spans

use clap::{ArgAction, ArgGroup, Parser, ValueEnum};
use inkleaf_core::Document;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

/// Output format for span/geometry dumps.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
enum Format {
    #[default]
    Text,
    Json,
}

/// A command line tool for dumping PDF page geometry and text spans.
#[derive(Parser, Debug)]
#[command(name = "inkleaf-dump")]
#[command(author, version, about, long_about = None)]
#[command(disable_version_flag = true)]
#[command(group(
    ArgGroup::new("procedure")
        .args(["bounds", "info"])
))]
struct Args {
    /// One or more paths to PDF files
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Print version information
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    version: (),

    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    debug: bool,

    /// Dump the positioned span list for the given page (1-indexed)
    #[arg(short = 'b', long, value_name = "PAGE")]
    bounds: Option<usize>,

    /// Dump each page's width, height, and rotation (default when neither
    /// --bounds nor --info is given: dumps all pages)
    #[arg(short = 'i', long, action = ArgAction::SetTrue)]
    info: bool,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: Format,

    /// Path to file where output is written, or "-" for stdout
    #[arg(short = 'o', long, default_value = "-")]
    outfile: String,
}

fn dump_bounds<W: Write>(out: &mut W, doc: &Document, page: usize, format: Format) -> inkleaf_core::Result<()> {
    let spans = doc.extract_bounds(page)?;
    match format {
        Format::Text => {
            for span in &spans {
                writeln!(
                    out,
                    "[{:.2} {:.2} {:.2} {:.2}] {:.2}pt {:?}",
                    span.x0, span.y0, span.x1, span.y1, span.font_size, span.text
                )?;
            }
        }
        Format::Json => {
            let json: Vec<_> = spans
                .iter()
                .map(|s| {
                    serde_json::json!({
                        "x0": s.x0, "y0": s.y0, "x1": s.x1, "y1": s.y1,
                        "font_size": s.font_size, "text": s.text, "mcid": s.mcid,
                    })
                })
                .collect();
            writeln!(out, "{}", serde_json::to_string_pretty(&json)?)?;
        }
    }
    Ok(())
}

fn dump_info<W: Write>(out: &mut W, doc: &Document, format: Format) -> inkleaf_core::Result<()> {
    match format {
        Format::Text => {
            for i in 0..doc.page_count() {
                let info = doc.page_info(i)?;
                writeln!(
                    out,
                    "page {}: {:.1} x {:.1} pt, rotation {}",
                    i + 1,
                    info.width,
                    info.height,
                    info.rotation
                )?;
            }
        }
        Format::Json => {
            let mut pages = Vec::new();
            for i in 0..doc.page_count() {
                let info = doc.page_info(i)?;
                pages.push(serde_json::json!({
                    "page": i + 1, "width": info.width, "height": info.height, "rotation": info.rotation,
                }));
            }
            writeln!(out, "{}", serde_json::to_string_pretty(&pages)?)?;
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if args.debug {
        eprintln!("Debug mode enabled");
    }

    let mut output: Box<dyn Write> = if args.outfile == "-" {
        Box::new(BufWriter::new(io::stdout()))
    } else {
        let file = File::create(&args.outfile)
            .map_err(|e| format!("Failed to create output file {}: {}", args.outfile, e))?;
        Box::new(BufWriter::new(file))
    };

    for path in &args.files {
        if !path.exists() {
            eprintln!("Error: File not found: {}", path.display());
            std::process::exit(1);
        }

        let doc = match Document::open(path) {
            Ok(doc) => doc,
            Err(e) => {
                eprintln!("Error opening {}: {}", path.display(), e);
                std::process::exit(1);
            }
        };

        let result = match args.bounds {
            Some(page) => dump_bounds(&mut output, &doc, page.saturating_sub(1), args.format),
            None => dump_info(&mut output, &doc, args.format),
        };
        if let Err(e) = result {
            eprintln!("Error processing {}: {}", path.display(), e);
            std::process::exit(1);
        }
    }

    output.flush()?;
    Ok(())
}
