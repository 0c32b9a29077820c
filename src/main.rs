use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use rsswrite::config::Config;
use rsswrite::feed::RssWriter;
use rsswrite::sample;

const DEFAULT_CONFIG_FILE: &str = "rsswrite.toml";

#[derive(Parser, Debug)]
#[command(name = "rsswrite", about = "Print a sample RSS 2.0 document")]
struct Args {
    /// Config file (defaults to ./rsswrite.toml when present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write the document to FILE instead of standard output
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Write the document on a single line
    #[arg(long)]
    compact: bool,
}

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries only the document
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config '{}'", config_path.display()))?;

    let mut options = config.writer_options();
    if args.compact {
        options.indent = 0;
    }
    let writer = RssWriter::new(options);

    let document = sample::weblog_feed().context("Failed to build sample feed")?;

    match args.output.or(config.output) {
        Some(path) => writer.emit_to_file(&document, &path)?,
        None => {
            let xml = writer.emit(&document).context("Failed to serialize feed")?;
            println!("{}", xml);
        }
    }

    Ok(())
}
