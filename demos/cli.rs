//! Demo CLI: load a JSON array of records, install them under a set of
//! dotted field paths, and print ranked, highlighted search results.

use anyhow::{Context, Result};
use clap::Parser;
use fzmatch::{AlignRange, Engine, Options};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fzmatch-cli", about = "Approximate string search over a JSON record file")]
struct Args {
    /// Path to a JSON file containing an array of records.
    records: PathBuf,

    /// Dotted field paths to index, e.g. "title" or "authors.*.name".
    #[arg(short, long = "field", required = true)]
    fields: Vec<String>,

    /// The search query.
    query: String,

    /// Optional TOML config file overriding the default options.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let opts = match &args.config {
        Some(path) => Options::from_file(path).context("loading config file")?,
        None => Options::default(),
    };

    let text = std::fs::read_to_string(&args.records)
        .with_context(|| format!("reading records file {}", args.records.display()))?;
    let records: Vec<Value> = serde_json::from_str(&text).context("parsing records as JSON")?;

    let field_refs: Vec<&str> = args.fields.iter().map(String::as_str).collect();
    let mut engine = Engine::new(opts);
    engine.install(records, &field_refs);

    let results = engine.search(&args.query);
    if results.is_empty() {
        println!("no results");
        return Ok(());
    }

    for hit in results {
        print!("{:>8.3}  ", hit.score);
        match &hit.highlight {
            Some((text, ranges)) => println!("{}", render_highlight(text, ranges)),
            None => println!("{}", hit.record),
        }
    }

    Ok(())
}

fn render_highlight(text: &str, ranges: &[AlignRange]) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::new();
    let mut cursor = 0usize;
    for r in ranges {
        out.extend(&chars[cursor..r.start.min(chars.len())]);
        out.push('[');
        out.extend(&chars[r.start.min(chars.len())..r.end.min(chars.len())]);
        out.push(']');
        cursor = r.end.min(chars.len());
    }
    out.extend(&chars[cursor..]);
    out
}
