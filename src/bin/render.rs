//! `render` — a small CLI demo around the [`parchment::Template`]
//! façade: load a template file and a JSON data file, render the
//! result to stdout.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use parchment::{IoSink, Template};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Render a template against a JSON data file.
#[derive(Parser, Debug)]
#[command(name = "render")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Render a parchment template against JSON data", long_about = None)]
struct Cli {
    /// Path to the template source file.
    template: PathBuf,

    /// Path to a JSON file supplying the top-level datum.
    data: PathBuf,

    /// Left delimiter, if overriding the default `{{`.
    #[arg(long)]
    left_delim: Option<String>,

    /// Right delimiter, if overriding the default `}}`.
    #[arg(long)]
    right_delim: Option<String>,

    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let source = fs::read_to_string(&cli.template)
        .with_context(|| format!("reading template {}", cli.template.display()))?;
    let data_text =
        fs::read_to_string(&cli.data).with_context(|| format!("reading data {}", cli.data.display()))?;
    let data: serde_json::Value =
        serde_json::from_str(&data_text).with_context(|| format!("parsing {} as JSON", cli.data.display()))?;

    let name = cli
        .template
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "template".to_string());

    let mut template = Template::create(name);
    if cli.left_delim.is_some() || cli.right_delim.is_some() {
        template.set_delimiters(cli.left_delim.as_deref(), cli.right_delim.as_deref());
    }
    template
        .parse(&source)
        .with_context(|| format!("parsing {}", cli.template.display()))?;

    let mut sink = IoSink::new(std::io::stdout());
    template.execute(&mut sink, data).context("executing template")?;
    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    let subscriber = fmt::layer().with_target(false).with_thread_ids(false);
    let _ = tracing_subscriber::registry().with(filter).with(subscriber).try_init();
}
