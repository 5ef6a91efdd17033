//! `orbit` — command-line front end for the Orbit relationship store.
//!
//! # Usage
//!
//! ```
//! orbit add "Mara" --kind friend
//! orbit log Mara --temperature 72 --title "long walk"
//! orbit checklist Mara
//! orbit --store ~/.local/share/orbit/orbit.db energy
//! ```

mod commands;
mod prompt;
mod render;
mod session;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use orbit_core::{
  relationship::RelationshipKind,
  tournament::Lens,
  trend::Period,
};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::session::Session;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "orbit", about = "Track and classify the relationships around you")]
struct Args {
  /// Path to a TOML config file (store).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// SQLite database file (default: orbit.db).
  #[arg(long, env = "ORBIT_STORE")]
  store: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Create a relationship.
  Add {
    name:    String,
    #[arg(long, default_value_t)]
    kind:    RelationshipKind,
    #[arg(long, default_value = "")]
    role:    String,
    #[arg(long)]
    contact: Option<String>,
    #[arg(long)]
    avatar:  Option<String>,
  },
  /// List every relationship.
  List,
  /// Show one relationship with its recent history.
  Show { who: String },
  /// Change fields of a relationship. Pass "" to clear contact or avatar.
  Edit {
    who: String,
    #[command(flatten)]
    fields: commands::EditArgs,
  },
  /// Log an interaction.
  Log {
    who:         String,
    /// 0–100; anything else is recorded as 50.
    #[arg(long)]
    temperature: Option<String>,
    #[arg(long)]
    title:       Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// Defaults to now.
    #[arg(long)]
    date:        Option<NaiveDate>,
  },
  /// Re-derive the zone from declared metrics.
  Reclassify { who: String },
  /// Place a relationship with the ten-question checklist.
  Checklist {
    who:     String,
    /// Answers as a y/n string, e.g. "nny". Asked interactively when absent.
    #[arg(long)]
    answers: Option<String>,
  },
  /// Grade a relationship with the eight-question RQS.
  Rqs {
    who:     String,
    /// Eight scores 0–2, e.g. "2,2,1,1,2,2,1,1". Asked interactively when
    /// absent.
    #[arg(long)]
    answers: Option<String>,
  },
  /// Show the effective grade of a relationship.
  Grade { who: String },
  /// Show how warmth is spread over the zones.
  Energy,
  /// Show the temperature trend of a relationship.
  Trend {
    who:    String,
    #[arg(long, default_value_t)]
    period: Period,
  },
  /// Run an interactive pick tournament.
  Tournament {
    #[arg(long, default_value_t)]
    lens:   Lens,
    #[arg(long, default_value_t = orbit_core::tournament::DEFAULT_BRACKET_SIZE)]
    size:   usize,
    #[arg(long)]
    rounds: Option<usize>,
  },
  /// Delete a relationship and its history.
  Delete { who: String },
  /// Print every record as JSON.
  Export,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  store: Option<PathBuf>,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flag and env override the config file, which overrides the default.
  let store_path = args
    .store
    .or(file_cfg.store)
    .unwrap_or_else(|| PathBuf::from("orbit.db"));

  let mut session = Session::open(&store_path).await?;
  commands::run(&mut session, args.command).await
}
