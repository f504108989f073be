//! Derived read models: per-region coverage, ticker overviews, upload-log
//! statistics and period selection. Never stored, always computed from
//! store reads.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use strum::{Display, EnumString};

use crate::{
  Region,
  record::{SnapshotSummary, StockScoreRecord, UploadRecord},
};

// ─── Region coverage ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionOverview {
  pub region:        Region,
  pub earliest:      NaiveDate,
  pub latest:        NaiveDate,
  /// Number of distinct snapshot dates.
  pub data_points:   usize,
  pub total_records: u64,
}

/// Fold `(region, date, count)` rows into one line per region, ordered by
/// region label.
pub fn region_overview(summary: &[SnapshotSummary]) -> Vec<RegionOverview> {
  let mut by_region: BTreeMap<&'static str, RegionOverview> = BTreeMap::new();
  for row in summary {
    by_region
      .entry(row.region.label())
      .and_modify(|o| {
        o.earliest = o.earliest.min(row.date);
        o.latest = o.latest.max(row.date);
        o.data_points += 1;
        o.total_records += row.count;
      })
      .or_insert(RegionOverview {
        region:        row.region,
        earliest:      row.date,
        latest:        row.date,
        data_points:   1,
        total_records: row.count,
      });
  }
  by_region.into_values().collect()
}

// ─── Ticker overview ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickerOverview {
  pub ticker:         String,
  pub company_name:   Option<String>,
  pub latest_decile:  u8,
  pub latest_sector:  Option<String>,
  pub latest_region:  Region,
  /// Latest minus earliest decile; `None` with a single data point.
  pub overall_change: Option<i16>,
  pub data_points:    usize,
}

impl TickerOverview {
  /// Summarise a history returned by
  /// [`ScoreStore::history_for`](crate::store::ScoreStore::history_for)
  /// (oldest first). Returns `None` for an empty history.
  pub fn from_history(history: &[StockScoreRecord]) -> Option<Self> {
    let earliest = history.first()?;
    let latest = history.last()?;
    Some(Self {
      ticker:         earliest.ticker.clone(),
      company_name:   earliest.company_name.clone(),
      latest_decile:  latest.decile,
      latest_sector:  latest.sector.clone(),
      latest_region:  latest.region,
      overall_change: (history.len() > 1)
        .then(|| i16::from(latest.decile) - i16::from(earliest.decile)),
      data_points:    history.len(),
    })
  }
}

// ─── Upload log ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StatusKind {
  Success,
  Failed,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UploadFilter {
  pub status: Option<StatusKind>,
  pub region: Option<Region>,
}

impl UploadFilter {
  pub fn matches(&self, upload: &UploadRecord) -> bool {
    let status_ok = match self.status {
      None => true,
      Some(StatusKind::Success) => upload.status.is_success(),
      Some(StatusKind::Failed) => !upload.status.is_success(),
    };
    status_ok && self.region.is_none_or(|r| r == upload.region)
  }

  pub fn apply<'a>(&self, uploads: &'a [UploadRecord]) -> Vec<&'a UploadRecord> {
    uploads.iter().filter(|u| self.matches(u)).collect()
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UploadStats {
  pub total:      usize,
  pub successful: usize,
  pub failed:     usize,
}

impl UploadStats {
  pub fn from_history(uploads: &[UploadRecord]) -> Self {
    let successful = uploads.iter().filter(|u| u.status.is_success()).count();
    Self { total: uploads.len(), successful, failed: uploads.len() - successful }
  }
}

// ─── Period selection ────────────────────────────────────────────────────────

/// Days per month used for period arithmetic.
const DAYS_PER_MONTH: i64 = 30;

/// Pick the available date strictly before `end` that lies closest to
/// `end - months * 30 days`. Ties go to the earlier date.
pub fn closest_start_date(
  dates: &[NaiveDate],
  end: NaiveDate,
  months: u32,
) -> Option<NaiveDate> {
  let target = end - Duration::days(i64::from(months) * DAYS_PER_MONTH);
  dates
    .iter()
    .copied()
    .filter(|d| *d < end)
    .min_by_key(|d| ((*d - target).num_days().abs(), *d))
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;
  use crate::record::UploadStatus;

  fn d(y: i32, m: u32, day: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, day).unwrap() }

  #[test]
  fn region_overview_folds_dates() {
    let summary = [
      SnapshotSummary { region: Region::Uk, date: d(2025, 3, 1), count: 10 },
      SnapshotSummary { region: Region::Uk, date: d(2024, 7, 1), count: 12 },
      SnapshotSummary { region: Region::Japan, date: d(2025, 1, 1), count: 5 },
    ];
    let overview = region_overview(&summary);
    assert_eq!(overview.len(), 2);
    assert_eq!(overview[0].region, Region::Japan);
    assert_eq!(overview[1].region, Region::Uk);
    assert_eq!(overview[1].earliest, d(2024, 7, 1));
    assert_eq!(overview[1].latest, d(2025, 3, 1));
    assert_eq!(overview[1].data_points, 2);
    assert_eq!(overview[1].total_records, 22);
  }

  fn rec(date: NaiveDate, decile: u8) -> StockScoreRecord {
    StockScoreRecord {
      date,
      ticker: "AAPL".into(),
      company_name: Some("Apple".into()),
      sector: Some("Technology".into()),
      region: Region::Us,
      score: Some(1.0),
      decile,
    }
  }

  #[test]
  fn ticker_overview_change() {
    let history = [rec(d(2024, 1, 1), 4), rec(d(2024, 6, 1), 6), rec(d(2025, 1, 1), 9)];
    let overview = TickerOverview::from_history(&history).unwrap();
    assert_eq!(overview.latest_decile, 9);
    assert_eq!(overview.overall_change, Some(5));
    assert_eq!(overview.data_points, 3);
  }

  #[test]
  fn ticker_overview_single_point() {
    let overview = TickerOverview::from_history(&[rec(d(2024, 1, 1), 4)]).unwrap();
    assert_eq!(overview.overall_change, None);
    assert!(TickerOverview::from_history(&[]).is_none());
  }

  fn upload(region: Region, status: UploadStatus) -> UploadRecord {
    UploadRecord {
      id: 1,
      uploaded_at: Utc::now(),
      filename: "gvi.csv".into(),
      date: d(2025, 1, 1),
      region,
      stocks_count: 0,
      status,
    }
  }

  #[test]
  fn upload_stats_and_filter() {
    let uploads = [
      upload(Region::Us, UploadStatus::Success),
      upload(Region::Uk, UploadStatus::Failed("bad".into())),
      upload(Region::Us, UploadStatus::Failed("worse".into())),
    ];
    let stats = UploadStats::from_history(&uploads);
    assert_eq!(stats, UploadStats { total: 3, successful: 1, failed: 2 });

    let filter = UploadFilter { status: Some(StatusKind::Failed), region: Some(Region::Us) };
    let hits = filter.apply(&uploads);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].status, UploadStatus::Failed("worse".into()));

    assert_eq!(UploadFilter::default().apply(&uploads).len(), 3);
  }

  #[test]
  fn closest_start_date_picks_nearest_earlier() {
    let dates = [d(2025, 3, 11), d(2024, 12, 10), d(2024, 9, 1), d(2024, 7, 10)];
    assert_eq!(closest_start_date(&dates, d(2025, 3, 11), 3), Some(d(2024, 12, 10)));
    assert_eq!(closest_start_date(&dates, d(2025, 3, 11), 12), Some(d(2024, 7, 10)));
    assert_eq!(closest_start_date(&dates, d(2024, 7, 10), 3), None);
  }
}
