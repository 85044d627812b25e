//! quire-info - print document-level facts about a PDF
//!
//! Version, page count, encryption, the `/Info` dictionary, page sizes and
//! the XMP metadata.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use quire_core::Document;
use serde::Serialize;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "quire-info")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the PDF file
    file: PathBuf,

    /// Password for encrypted files
    #[arg(short = 'P', long, default_value = "")]
    password: String,

    /// Also list every page's size and rotation
    #[arg(long, action = ArgAction::SetTrue)]
    pages: bool,

    /// Print the XMP metadata stream
    #[arg(short, long, action = ArgAction::SetTrue)]
    metadata: bool,

    /// Print everything as JSON
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,
}

#[derive(Serialize)]
struct PageSummary {
    number: usize,
    width: f64,
    height: f64,
    rotate: i64,
    orientation: String,
}

#[derive(Serialize)]
struct Summary {
    version: f64,
    pages: usize,
    encrypted: bool,
    recovered: bool,
    info: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    page_sizes: Vec<PageSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<String>,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(io::stderr)
        .init();
}

fn summarize(doc: &Document, args: &Args) -> Result<Summary> {
    let objects = doc.objects();
    let info = doc
        .info()
        .context("cannot read the /Info dictionary")?
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    let page_sizes = if args.pages {
        doc.pages()
            .context("cannot read the page tree")?
            .iter()
            .map(|page| PageSummary {
                number: page.number(),
                width: page.width(),
                height: page.height(),
                rotate: page.rotate(),
                orientation: page.orientation().to_string(),
            })
            .collect()
    } else {
        Vec::new()
    };
    let metadata = if args.metadata {
        doc.metadata().context("cannot read the metadata stream")?
    } else {
        None
    };
    Ok(Summary {
        version: doc.pdf_version(),
        pages: doc.page_count().context("cannot count pages")?,
        encrypted: objects.is_encrypted(),
        recovered: objects.is_recovered(),
        info,
        page_sizes,
        metadata,
    })
}

fn print(out: &mut impl Write, summary: &Summary) -> io::Result<()> {
    writeln!(out, "PDF version: {:.1}", summary.version)?;
    writeln!(out, "Pages:       {}", summary.pages)?;
    writeln!(out, "Encrypted:   {}", if summary.encrypted { "yes" } else { "no" })?;
    if summary.recovered {
        writeln!(out, "Recovered:   cross-reference data was rebuilt")?;
    }
    for (key, value) in &summary.info {
        writeln!(out, "{key}: {value}")?;
    }
    for page in &summary.page_sizes {
        writeln!(
            out,
            "Page {}: {:.2} x {:.2} pt, rotated {}, {}",
            page.number, page.width, page.height, page.rotate, page.orientation
        )?;
    }
    if let Some(xmp) = &summary.metadata {
        writeln!(out, "Metadata:\n{xmp}")?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let data = std::fs::read(&args.file).with_context(|| format!("cannot read {}", args.file.display()))?;
    let doc = Document::open(data, &args.password)
        .with_context(|| format!("cannot open {}", args.file.display()))?;
    let summary = summarize(&doc, &args)?;

    let mut out = BufWriter::new(io::stdout().lock());
    if args.json {
        serde_json::to_writer_pretty(&mut out, &summary)?;
        writeln!(out)?;
    } else {
        print(&mut out, &summary)?;
    }
    out.flush()?;
    Ok(())
}
