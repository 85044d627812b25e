//! quire-text - print the text of PDF pages
//!
//! Prints each page laid out as plain text, or the positioned runs behind
//! it with `--runs` (tab separated) or `--json`.

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser};
use quire_core::{Document, Page, RunOptions, TextRun};
use serde::Serialize;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "quire-text")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the PDF file
    file: PathBuf,

    /// Password for encrypted files
    #[arg(short = 'P', long, default_value = "")]
    password: String,

    /// Only this page (1-based)
    #[arg(short, long)]
    page: Option<usize>,

    /// Print positioned runs instead of laid-out text
    #[arg(long, action = ArgAction::SetTrue)]
    runs: bool,

    /// Print runs as JSON
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,

    /// Keep runs glyph by glyph instead of joining them into words
    #[arg(long = "no-merge", action = ArgAction::SetTrue)]
    no_merge: bool,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,
}

#[derive(Serialize)]
struct RunRecord<'a> {
    page: usize,
    x: f64,
    y: f64,
    width: f64,
    font_size: f64,
    text: &'a str,
}

impl<'a> RunRecord<'a> {
    fn new(page: usize, run: &'a TextRun) -> Self {
        Self {
            page,
            x: run.x,
            y: run.y,
            width: run.width,
            font_size: run.font_size,
            text: &run.text,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(io::stderr)
        .init();
}

fn selected_pages<'a>(doc: &'a Document, only: Option<usize>) -> Result<Vec<Page<'a>>> {
    match only {
        Some(n) => Ok(vec![doc.page(n).with_context(|| format!("cannot load page {n}"))?]),
        None => doc.pages().context("cannot read the page tree"),
    }
}

fn run(args: &Args) -> Result<()> {
    if args.runs && args.json {
        bail!("--runs and --json are alternatives");
    }
    let data = std::fs::read(&args.file).with_context(|| format!("cannot read {}", args.file.display()))?;
    let doc = Document::open(data, &args.password)
        .with_context(|| format!("cannot open {}", args.file.display()))?;
    let pages = selected_pages(&doc, args.page)?;
    debug!(pages = pages.len(), version = doc.pdf_version(), "extracting");
    let options = RunOptions {
        merge: !args.no_merge,
        ..RunOptions::default()
    };

    let mut out = BufWriter::new(io::stdout().lock());
    let mut all_runs = Vec::new();
    for page in &pages {
        let number = page.number();
        if args.runs || args.json {
            let runs = page
                .runs(options)
                .with_context(|| format!("cannot extract runs from page {number}"))?;
            all_runs.push((number, runs));
        } else {
            let text = page
                .text(None)
                .with_context(|| format!("cannot extract text from page {number}"))?;
            writeln!(out, "{text}")?;
            writeln!(out, "\x0c")?;
        }
    }

    let mut records = Vec::new();
    for (number, runs) in &all_runs {
        for run in runs {
            if args.json {
                records.push(RunRecord::new(*number, run));
            } else {
                writeln!(
                    out,
                    "{number}\t{:.2}\t{:.2}\t{:.2}\t{:.2}\t{}",
                    run.x, run.y, run.width, run.font_size, run.text
                )?;
            }
        }
    }
    if args.json {
        serde_json::to_writer_pretty(&mut out, &records)?;
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);
    run(&args)
}
