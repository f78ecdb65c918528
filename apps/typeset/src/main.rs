mod config;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::io::AsyncReadExt;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// Render constrained LaTeX resume markup to PDF.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Markup file to render; reads stdin when omitted
    input: Option<PathBuf>,

    /// Where to write the PDF
    #[arg(short, long, default_value = "resume.pdf")]
    output: PathBuf,

    /// Also write the layout metadata as JSON to this path
    #[arg(long)]
    metadata: Option<PathBuf>,

    /// Print the parsed document as JSON to stdout instead of rendering
    #[arg(long, default_value_t = false)]
    dump_document: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::from_env()?;

    // Initialize structured logging (stderr, so stdout stays clean for JSON)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting typeset v{}", env!("CARGO_PKG_VERSION"));

    let markup = read_markup(args.input.as_ref()).await?;
    if markup.trim().is_empty() {
        bail!("No markup to render: input is empty");
    }

    if args.dump_document {
        let document = typeset::parse(&markup);
        println!("{}", serde_json::to_string_pretty(&document)?);
        return Ok(());
    }

    let page_config = config.page_config();
    info!(
        "Page config: {}x{} margin {} body {}pt",
        page_config.page_width,
        page_config.page_height,
        page_config.margin,
        page_config.base_font_size
    );

    // CPU-bound pipeline: spawn_blocking to keep it off the async executor.
    let output = tokio::task::spawn_blocking(move || typeset::render_markup(&markup, &page_config))
        .await
        .context("render task failed")??;

    tokio::fs::write(&args.output, &output.pdf)
        .await
        .with_context(|| format!("Failed to write PDF to {}", args.output.display()))?;
    info!(
        "Wrote {} page(s) to {}",
        output.metadata.page_count,
        args.output.display()
    );

    if let Some(path) = &args.metadata {
        let json = serde_json::to_vec_pretty(&output.metadata)?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("Failed to write metadata to {}", path.display()))?;
    }

    Ok(())
}

async fn read_markup(input: Option<&PathBuf>) -> Result<String> {
    match input {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read markup from {}", path.display())),
        None => {
            let mut markup = String::new();
            tokio::io::stdin()
                .read_to_string(&mut markup)
                .await
                .context("Failed to read markup from stdin")?;
            Ok(markup)
        }
    }
}
