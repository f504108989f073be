//! The upload pipeline: read → normalize → upsert → log.
//!
//! Ingest failures never escape as errors. They are written to the upload
//! log as `FAILED: <message>` and handed back as [`UploadOutcome::Failed`],
//! so one bad file cannot take the process down or touch earlier snapshots.

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
  Region,
  ingest::{Normalizer, TableSource},
  record::{NewUpload, UploadStatus},
  store::ScoreStore,
};

/// What happened to one upload attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UploadOutcome {
  Success {
    date:         NaiveDate,
    region:       Region,
    /// Rows processed, including rows that replaced an existing key.
    stocks_added: u64,
  },
  Failed {
    date:   NaiveDate,
    region: Region,
    error:  String,
  },
}

impl UploadOutcome {
  pub fn is_success(&self) -> bool { matches!(self, Self::Success { .. }) }

  /// Human-readable one-line summary.
  pub fn message(&self) -> String {
    match self {
      Self::Success { date, region, stocks_added } => {
        format!("Successfully added {stocks_added} stocks for {region} on {date}")
      }
      Self::Failed { error, .. } => format!("Error uploading file: {error}"),
    }
  }
}

/// Ingest `source` as the `(date, region)` snapshot and log the attempt.
///
/// Returns `Err` only when the upload log itself cannot be written.
pub fn upload<S, T>(
  store: &S,
  source: &T,
  date: NaiveDate,
  region: Region,
  normalizer: Normalizer,
) -> Result<UploadOutcome, S::Error>
where
  S: ScoreStore,
  T: TableSource,
{
  let filename = source.name();

  let attempt = source
    .read()
    .map_err(|e| e.to_string())
    .and_then(|table| {
      normalizer
        .normalize(&table, date, region)
        .map_err(|e| e.to_string())
    })
    .and_then(|records| {
      store
        .upsert_snapshot(&records)
        .map_err(|e| e.to_string())
    });

  let (status, count, outcome) = match attempt {
    Ok(count) => {
      tracing::info!(%filename, %date, %region, count, "upload succeeded");
      (
        UploadStatus::Success,
        count,
        UploadOutcome::Success { date, region, stocks_added: count },
      )
    }
    Err(error) => {
      tracing::warn!(%filename, %date, %region, %error, "upload failed");
      (
        UploadStatus::Failed(error.clone()),
        0,
        UploadOutcome::Failed { date, region, error },
      )
    }
  };

  store.record_upload(NewUpload {
    filename,
    date,
    region,
    stocks_count: count,
    status,
  })?;

  Ok(outcome)
}
