//! roster-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), layers
//! `ROSTER_*` environment variables over it, opens the SQLite store and
//! either serves the HTTP API or ingests a single file.
//!
//! ```text
//! roster-server serve
//! roster-server ingest roster.xlsx --category group_regional
//! ```

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use roster_server::{ServerConfig, app, open_state};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Roster ingestion server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the HTTP API (the default).
  Serve,
  /// Ingest one spreadsheet into the configured database and print the
  /// result as JSON.
  Ingest {
    file: PathBuf,
    /// Category label recorded on the upload log.
    #[arg(long)]
    category: Option<String>,
    #[arg(long, default_value = "")]
    description: String,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let cfg = ServerConfig::load(&cli.config)
    .context("failed to load configuration")?
    .expanded();

  match cli.command.unwrap_or(Command::Serve) {
    Command::Serve => serve(cfg).await,
    Command::Ingest { file, category, description } => {
      let state = open_state(&cfg).await?;
      let category = category.unwrap_or_else(|| cfg.default_category.clone());
      let result = state.ingestor.ingest(&file, &category, &description).await;
      println!("{}", serde_json::to_string_pretty(&result)?);
      if !result.success {
        std::process::exit(1);
      }
      Ok(())
    }
  }
}

async fn serve(cfg: ServerConfig) -> anyhow::Result<()> {
  let state = open_state(&cfg).await?;
  let router = app(state, cfg.max_upload_bytes);
  let address = cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, router).await.context("server error")?;
  Ok(())
}
