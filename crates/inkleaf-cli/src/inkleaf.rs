//! inkleaf - Extract text from PDF files as plain text or Markdown

use clap::{ArgAction, Parser, ValueEnum};
use inkleaf_core::{Document, ExtractMode};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

/// Linearisation for text output.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum Mode {
    /// Raw operator-emission order: fast, no structure/geometry analysis
    Stream,
    /// Structure-tree walk with geometric fallback (default)
    #[default]
    Reading,
}

/// A command line tool for extracting text from PDF files.
#[derive(Parser, Debug)]
#[command(name = "inkleaf")]
#[command(author, version, about, long_about = None)]
#[command(disable_version_flag = true)]
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

    /// A space- or comma-separated list of page numbers to extract (1-indexed)
    #[arg(short = 'p', long = "page-numbers")]
    page_numbers: Option<String>,

    /// Linearisation mode
    #[arg(short = 'm', long, value_enum, default_value = "reading")]
    mode: Mode,

    /// Render reading-order output as Markdown instead of plain text
    #[arg(long = "markdown", action = ArgAction::SetTrue)]
    markdown: bool,

    /// Extract pages concurrently when extracting the whole document
    #[arg(long, action = ArgAction::SetTrue)]
    parallel: bool,

    /// Path to file where output is written, or "-" for stdout
    #[arg(short = 'o', long, default_value = "-")]
    outfile: String,
}

fn parse_page_numbers(input: &str) -> Option<Vec<usize>> {
    let nums: Vec<usize> = input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.trim().parse::<usize>().ok())
        .map(|n| n.saturating_sub(1))
        .collect();
    if nums.is_empty() { None } else { Some(nums) }
}

/// Process a single PDF file, writing its extracted text to `writer`.
fn process_file<W: Write>(path: &PathBuf, writer: &mut W, args: &Args) -> inkleaf_core::Result<()> {
    let doc = Document::open(path)?;
    let extract_mode = match args.mode {
        Mode::Stream => ExtractMode::Stream,
        Mode::Reading => ExtractMode::Reading,
    };

    let pages = parse_page_numbers(args.page_numbers.as_deref().unwrap_or_default());

    match pages {
        Some(indices) => {
            for index in indices {
                let text = if args.markdown {
                    doc.extract_markdown(Some(index))?
                } else {
                    doc.extract_page(index, extract_mode)?
                };
                writeln!(writer, "{text}")?;
            }
        }
        None if args.markdown => {
            writeln!(writer, "{}", doc.extract_markdown(None)?)?;
        }
        None => {
            writeln!(writer, "{}", doc.extract_all(extract_mode, args.parallel)?)?;
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
        if let Err(e) = process_file(path, &mut output, &args) {
            eprintln!("Error processing {}: {}", path.display(), e);
            std::process::exit(1);
        }
    }

    output.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_and_space_separated_page_numbers() {
        assert_eq!(parse_page_numbers("1, 3 5"), Some(vec![0, 2, 4]));
    }

    #[test]
    fn empty_page_numbers_is_none() {
        assert_eq!(parse_page_numbers("  "), None);
    }
}
