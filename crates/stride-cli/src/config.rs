//! Configuration for the `stride` binary.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;
use stride_analysis::AnalysisConfig;

/// Deserialised from `stride.toml`, overridden by `STRIDE_*` environment
/// variables (`STRIDE_ANALYSIS__TIME_ZONE` for nested keys).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StrideConfig {
  pub store_path: PathBuf,
  pub analysis:   AnalysisConfig,
}

impl Default for StrideConfig {
  fn default() -> Self {
    Self {
      store_path: PathBuf::from("stride.db"),
      analysis:   AnalysisConfig::default(),
    }
  }
}

impl StrideConfig {
  /// Layer the optional file at `path` under the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("STRIDE")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()
      .context("failed to read config file")?;

    settings
      .try_deserialize()
      .context("failed to deserialise StrideConfig")
  }

  /// The store path with a leading `~` expanded to the home directory.
  pub fn store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }
}

fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use stride_analysis::SelectionPolicy;

  use super::*;

  fn parse(toml: &str) -> StrideConfig {
    config::Config::builder()
      .add_source(config::File::from_str(toml, config::FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn empty_file_uses_defaults() {
    let config = parse("");
    assert_eq!(config.store_path, PathBuf::from("stride.db"));
    assert_eq!(config.analysis, AnalysisConfig::default());
  }

  #[test]
  fn analysis_table_overrides_defaults() {
    let config = parse(
      r#"
      store_path = "/var/lib/stride/gait.db"

      [analysis]
      time_zone = "Europe/Amsterdam"
      selection_policy = "latest_day_lowest_risk"
      "#,
    );
    assert_eq!(config.store_path, PathBuf::from("/var/lib/stride/gait.db"));
    assert_eq!(config.analysis.time_zone, "Europe/Amsterdam");
    assert_eq!(config.analysis.selection_policy, SelectionPolicy::LatestDayLowestRisk);
    assert_eq!(config.analysis.cache_ttl_secs, 300);
  }

  #[test]
  fn paths_without_tilde_are_untouched() {
    assert_eq!(expand_tilde(Path::new("/tmp/stride.db")), PathBuf::from("/tmp/stride.db"));
  }
}
