//! Runtime settings: defaults, then an optional TOML file, then `GVI_*`
//! environment variables. Command-line flags are applied last by `main`.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use gvi_core::{Region, ingest::PREAMBLE_ROWS};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
  /// SQLite database file.
  pub db_path:        PathBuf,
  /// Metadata rows before the header row of an export.
  pub preamble_rows:  usize,
  /// Region used by `upload` when `--region` is not given.
  pub default_region: Region,
  /// Treat an export with no usable rows as a failed upload.
  pub strict_ingest:  bool,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      db_path:        PathBuf::from("gvi_data.db"),
      preamble_rows:  PREAMBLE_ROWS,
      default_region: Region::default(),
      strict_ingest:  false,
    }
  }
}

impl Settings {
  pub fn load(config_file: &Path) -> anyhow::Result<Self> {
    let settings: Self = config::Config::builder()
      .add_source(config::File::from(config_file).required(false))
      .add_source(config::Environment::with_prefix("GVI"))
      .build()
      .context("failed to read configuration")?
      .try_deserialize()
      .context("failed to deserialise settings")?;

    Ok(Self { db_path: expand_tilde(&settings.db_path), ..settings })
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
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
  use std::io::Write as _;

  use super::*;

  #[test]
  fn missing_file_yields_defaults() {
    let settings = Settings::load(Path::new("/nonexistent/gvi.toml")).unwrap();
    assert_eq!(settings.preamble_rows, 3);
    assert_eq!(settings.default_region, Region::Us);
    assert!(!settings.strict_ingest);
  }

  #[test]
  fn file_overrides_defaults() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
      file,
      "db_path = \"/var/lib/gvi/scores.db\"\npreamble_rows = 4\ndefault_region = \"UK\"\nstrict_ingest = true"
    )
    .unwrap();

    let settings = Settings::load(file.path()).unwrap();
    assert_eq!(settings.db_path, PathBuf::from("/var/lib/gvi/scores.db"));
    assert_eq!(settings.preamble_rows, 4);
    assert_eq!(settings.default_region, Region::Uk);
    assert!(settings.strict_ingest);
  }

  #[test]
  fn tilde_is_expanded() {
    if let Ok(home) = std::env::var("HOME") {
      assert_eq!(expand_tilde(Path::new("~/gvi.db")), PathBuf::from(home).join("gvi.db"));
    }
    assert_eq!(expand_tilde(Path::new("/abs/gvi.db")), PathBuf::from("/abs/gvi.db"));
  }
}
