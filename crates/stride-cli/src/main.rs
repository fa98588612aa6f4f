//! `stride` command-line binary.
//!
//! Reads `stride.toml` (or the path given with `--config`), opens the SQLite
//! gait store and prints the requested indicators or assessments as JSON.
//!
//! ```text
//! stride best --user 1b4e28ba-2fa1-11d2-883f-0016d3cca427 \
//!   --begin 2024-11-01T00:00:00Z --end 2024-11-08T00:00:00Z
//! ```

mod config;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use stride_analysis::AnalysisService;
use stride_core::{TimeWindow, profile::RemovalReason};
use stride_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::config::StrideConfig;

#[derive(Parser)]
#[command(author, version, about = "Gait indicators and fall risk assessments")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "stride.toml", env = "STRIDE_CONFIG")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Footstep indicators of a wearable or a user.
  Indicators {
    #[command(flatten)]
    subject: Subject,
    #[command(flatten)]
    window:  Window,
  },

  /// Scored fall risk assessments of a wearable or a user.
  Assessments {
    #[command(flatten)]
    subject:        Subject,
    #[command(flatten)]
    window:         Window,
    /// Also return profiles hidden by an administrator.
    #[arg(long)]
    include_hidden: bool,
  },

  /// The best assessment of a user.
  Best {
    #[arg(long)]
    user:   Uuid,
    #[command(flatten)]
    window: Window,
  },

  /// The best assessment of every user in a group.
  GroupLatest {
    #[arg(long)]
    group:  Uuid,
    /// Members in display order; repeat or separate with commas.
    #[arg(long = "user", value_delimiter = ',', required = true)]
    users:  Vec<Uuid>,
    #[command(flatten)]
    window: Window,
  },

  /// Score a profile derived directly from a wearable's footsteps.
  Derive {
    #[arg(long)]
    wearable: String,
    #[command(flatten)]
    window:   Window,
  },

  /// Hide or unhide a fall risk profile.
  Hide {
    profile: Uuid,
    #[arg(long)]
    undo:    bool,
  },

  /// Withdraw a fall risk profile.
  Remove {
    profile: Uuid,
    #[arg(long)]
    reason:  RemovalReason,
    /// Free-text detail for `--reason other`.
    #[arg(long)]
    detail:  Option<String>,
    #[arg(long)]
    by:      Uuid,
  },

  /// Set the note of a fall risk profile; an empty value clears it.
  Note {
    profile: Uuid,
    value:   String,
    #[arg(long)]
    by:      Uuid,
  },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct Subject {
  #[arg(long)]
  wearable: Option<String>,
  #[arg(long)]
  user:     Option<Uuid>,
}

#[derive(Args)]
struct Window {
  /// Inclusive start, RFC 3339.
  #[arg(long)]
  begin: DateTime<Utc>,
  /// Inclusive end, RFC 3339.
  #[arg(long)]
  end:   DateTime<Utc>,
}

impl From<Window> for TimeWindow {
  fn from(w: Window) -> Self { TimeWindow::new(w.begin, w.end) }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let cfg = StrideConfig::load(&cli.config)?;

  let store_path = cfg.store_path();
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {}", store_path.display()))?;
  tracing::debug!(path = %store_path.display(), "opened store");

  let service = AnalysisService::new(Arc::new(store), &cfg.analysis)
    .context("invalid analysis configuration")?;

  run(&service, cli.command).await
}

async fn run(service: &AnalysisService<SqliteStore>, command: Command) -> anyhow::Result<()> {
  match command {
    Command::Indicators { subject, window } => {
      let window: TimeWindow = window.into();
      let indicators = match subject {
        Subject { user: Some(user), .. } => service.indicators_for_user(user, window).await?,
        Subject { wearable: Some(wearable), .. } => {
          service.indicators_for_wearable(&wearable, window).await?
        }
        Subject { .. } => anyhow::bail!("either --wearable or --user is required"),
      };
      print_json(&indicators)
    }

    Command::Assessments { subject, window, include_hidden } => {
      let window: TimeWindow = window.into();
      let assessments = match subject {
        Subject { user: Some(user), .. } => {
          service
            .select_fall_risk_assessments_for_user(user, window, include_hidden)
            .await?
        }
        Subject { wearable: Some(wearable), .. } => {
          service
            .select_fall_risk_assessments_for_wearable(&wearable, window, include_hidden)
            .await?
        }
        Subject { .. } => anyhow::bail!("either --wearable or --user is required"),
      };
      print_json(&assessments)
    }

    Command::Best { user, window } => {
      print_json(&service.select_best_assessment(user, window.into()).await?)
    }

    Command::GroupLatest { group, users, window } => print_json(
      &service
        .select_latest_best_for_group(group, &users, window.into())
        .await?,
    ),

    Command::Derive { wearable, window } => print_json(
      &service
        .assess_wearable_footsteps(&wearable, window.into())
        .await?,
    ),

    Command::Hide { profile, undo } => {
      service.source().set_hidden(profile, !undo).await?;
      tracing::info!(%profile, hidden = !undo, "updated profile visibility");
      Ok(())
    }

    Command::Remove { profile, reason, detail, by } => {
      let removal = service
        .source()
        .remove_profile(profile, reason, detail, by)
        .await?;
      print_json(&removal)
    }

    Command::Note { profile, value, by } => {
      let note = service.source().put_note(profile, &value, by).await?;
      print_json(&note)
    }
  }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("failed to encode output")?;
  println!("{json}");
  Ok(())
}
