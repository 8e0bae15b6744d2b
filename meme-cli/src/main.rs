//! # Meme Export
//!
//! Headless meme editor: opens a canvas, replays commands, writes the image.

use anyhow::Context;
use clap::Parser;
use meme_cli::{CliArgs, ExportSession, HostConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,meme_core=debug,meme_renderer=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr);

    // Use JSON format for log collectors (RUST_LOG_FORMAT=json)
    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    let config = HostConfig::from(args);

    tracing::info!(
        "Export config: {:?} quality {} scale {} into {}",
        config.export.format,
        config.export.quality,
        config.export.scale,
        config.out_dir.display()
    );

    let mut session = ExportSession::open(config).context("Failed to open canvas")?;
    let applied = session.replay_script().context("Failed to replay commands")?;
    if applied > 0 {
        tracing::info!("Applied {} commands", applied);
    }

    let (artifact, path) = session.export().context("Export failed")?;
    tracing::info!(
        "Exported {}x{} {} to {}",
        artifact.width,
        artifact.height,
        artifact.mime(),
        path.display()
    );
    println!("{}", path.display());
    Ok(())
}
