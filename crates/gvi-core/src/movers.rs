//! Decile movement analysis between two snapshots.
//!
//! Two snapshots are inner-joined on ticker. Each matched pair is classified
//! by whether it crossed into the top band (from below) or into the bottom
//! band (from above) between the start and end dates.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{Region, record::StockScoreRecord, store::ScoreStore};

// ─── Thresholds ──────────────────────────────────────────────────────────────

/// Band boundaries on the inverted scale: deciles `>= top` form the top band,
/// deciles `<= bottom` the bottom band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
  pub top:    u8,
  pub bottom: u8,
}

impl Default for Thresholds {
  fn default() -> Self { Self { top: 8, bottom: 3 } }
}

/// Named threshold presets offered by the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
pub enum ThresholdPolicy {
  /// Top three and bottom three deciles.
  #[default]
  #[strum(to_string = "top-bottom-3")]
  TopBottom3,
  /// A band three deciles wide at each end.
  #[strum(to_string = "magnitude-3")]
  Magnitude3,
  /// A band five deciles wide at each end.
  #[strum(to_string = "magnitude-5")]
  Magnitude5,
}

impl ThresholdPolicy {
  pub fn thresholds(self) -> Thresholds {
    match self {
      Self::TopBottom3 => Thresholds::default(),
      Self::Magnitude3 => Self::band(3),
      Self::Magnitude5 => Self::band(5),
    }
  }

  fn band(width: u8) -> Thresholds { Thresholds { top: 11 - width, bottom: width } }
}

// ─── Results ─────────────────────────────────────────────────────────────────

/// One ticker present in both snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movement {
  pub ticker:        String,
  pub company_name:  Option<String>,
  pub sector:        Option<String>,
  pub region:        Region,
  pub start_decile:  u8,
  pub end_decile:    u8,
  /// `end_decile - start_decile`; positive means quality improved.
  pub decile_change: i16,
}

impl Movement {
  fn entered_top(&self, t: Thresholds) -> bool {
    self.start_decile < t.top && self.end_decile >= t.top
  }

  fn entered_bottom(&self, t: Thresholds) -> bool {
    self.start_decile > t.bottom && self.end_decile <= t.bottom
  }
}

/// Parameters for [`find_movers`].
#[derive(Debug, Clone, Copy)]
pub struct MoverQuery {
  pub start:      NaiveDate,
  pub end:        NaiveDate,
  pub region:     Option<Region>,
  pub thresholds: Thresholds,
}

impl MoverQuery {
  pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
    Self { start, end, region: None, thresholds: Thresholds::default() }
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct MovementReport {
  pub start:           NaiveDate,
  pub end:             NaiveDate,
  pub region:          Option<Region>,
  pub thresholds:      Thresholds,
  /// Crossed into the top band; largest improvement first.
  pub top_entrants:    Vec<Movement>,
  /// Crossed into the bottom band; largest decline first.
  pub bottom_entrants: Vec<Movement>,
  /// Every joined pair, largest absolute change first.
  pub all_movements:   Vec<Movement>,
  /// Size of the inner join.
  pub total_analyzed:  usize,
}

impl MovementReport {
  /// Mean decile change over all joined pairs.
  pub fn average_change(&self) -> Option<f64> {
    if self.all_movements.is_empty() {
      return None;
    }
    let sum: i64 = self
      .all_movements
      .iter()
      .map(|m| i64::from(m.decile_change))
      .sum();
    Some(sum as f64 / self.all_movements.len() as f64)
  }
}

// ─── Analysis ────────────────────────────────────────────────────────────────

/// Read both snapshots from `store` and classify every matched ticker.
pub fn find_movers<S: ScoreStore>(
  store: &S,
  query: &MoverQuery,
) -> Result<MovementReport, S::Error> {
  let start_rows = store.snapshot_at(query.start, query.region)?;
  let end_rows = store.snapshot_at(query.end, query.region)?;

  let movements = analyze(&start_rows, &end_rows, query.thresholds);
  tracing::info!(
    start = %query.start,
    end = %query.end,
    region = ?query.region,
    analyzed = movements.total_analyzed,
    top = movements.top_entrants.len(),
    bottom = movements.bottom_entrants.len(),
    "analyzed decile movements"
  );

  Ok(MovementReport {
    start: query.start,
    end: query.end,
    region: query.region,
    thresholds: query.thresholds,
    top_entrants: movements.top_entrants,
    bottom_entrants: movements.bottom_entrants,
    all_movements: movements.all_movements,
    total_analyzed: movements.total_analyzed,
  })
}

/// The classified result of joining two snapshots.
#[derive(Debug, Clone, Default)]
pub struct Movements {
  pub top_entrants:    Vec<Movement>,
  pub bottom_entrants: Vec<Movement>,
  pub all_movements:   Vec<Movement>,
  pub total_analyzed:  usize,
}

/// Join `start` and `end` on ticker and classify each pair.
///
/// Pairs are produced in `start` order and, for a ticker that appears more
/// than once at `end`, in `end` order. All sorts are stable, so ties keep
/// that order.
pub fn analyze(
  start: &[StockScoreRecord],
  end: &[StockScoreRecord],
  thresholds: Thresholds,
) -> Movements {
  let mut end_by_ticker: HashMap<&str, Vec<u8>> = HashMap::new();
  for row in end {
    end_by_ticker
      .entry(row.ticker.as_str())
      .or_default()
      .push(row.decile);
  }

  let joined: Vec<Movement> = start
    .iter()
    .flat_map(|s| {
      end_by_ticker
        .get(s.ticker.as_str())
        .into_iter()
        .flatten()
        .map(move |&end_decile| Movement {
          ticker: s.ticker.clone(),
          company_name: s.company_name.clone(),
          sector: s.sector.clone(),
          region: s.region,
          start_decile: s.decile,
          end_decile,
          decile_change: i16::from(end_decile) - i16::from(s.decile),
        })
    })
    .collect();

  let mut top_entrants: Vec<Movement> = joined
    .iter()
    .filter(|m| m.entered_top(thresholds))
    .cloned()
    .collect();
  top_entrants.sort_by_key(|m| std::cmp::Reverse(m.decile_change));

  let mut bottom_entrants: Vec<Movement> = joined
    .iter()
    .filter(|m| m.entered_bottom(thresholds))
    .cloned()
    .collect();
  bottom_entrants.sort_by_key(|m| m.decile_change);

  let total_analyzed = joined.len();
  let mut all_movements = joined;
  all_movements.sort_by_key(|m| std::cmp::Reverse(m.decile_change.abs()));

  Movements { top_entrants, bottom_entrants, all_movements, total_analyzed }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn rec(ticker: &str, decile: u8) -> StockScoreRecord {
    StockScoreRecord {
      date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
      ticker: ticker.into(),
      company_name: Some(format!("{ticker} Corp")),
      sector: None,
      region: Region::Us,
      score: None,
      decile,
    }
  }

  fn tickers(ms: &[Movement]) -> Vec<&str> { ms.iter().map(|m| m.ticker.as_str()).collect() }

  #[test]
  fn inner_join_excludes_one_sided_tickers() {
    let start = [rec("A", 5), rec("B", 5), rec("C", 5)];
    let end = [rec("B", 6), rec("C", 4), rec("D", 9)];
    let out = analyze(&start, &end, Thresholds::default());
    assert_eq!(out.total_analyzed, 2);
    let mut seen = tickers(&out.all_movements);
    seen.sort();
    assert_eq!(seen, ["B", "C"]);
  }

  #[test]
  fn crossing_into_top_band() {
    let start = [rec("UP", 5), rec("STAY", 9)];
    let end = [rec("UP", 9), rec("STAY", 9)];
    let out = analyze(&start, &end, Thresholds::default());
    assert_eq!(tickers(&out.top_entrants), ["UP"]);
    assert_eq!(out.top_entrants[0].decile_change, 4);
  }

  #[test]
  fn crossing_into_bottom_band() {
    let start = [rec("DOWN", 6), rec("LOW", 2), rec("EDGE", 4)];
    let end = [rec("DOWN", 1), rec("LOW", 1), rec("EDGE", 3)];
    let out = analyze(&start, &end, Thresholds::default());
    assert_eq!(tickers(&out.bottom_entrants), ["DOWN", "EDGE"]);
    assert_eq!(out.bottom_entrants[0].decile_change, -5);
  }

  #[test]
  fn all_movements_sorted_by_magnitude() {
    let start = [rec("A", 5), rec("B", 8), rec("C", 2)];
    let end = [rec("A", 6), rec("B", 3), rec("C", 5)];
    let out = analyze(&start, &end, Thresholds::default());
    let changes: Vec<i16> = out.all_movements.iter().map(|m| m.decile_change).collect();
    assert_eq!(changes, [-5, 3, 1]);
  }

  #[test]
  fn ties_keep_input_order() {
    let start = [rec("A", 1), rec("B", 9), rec("C", 2)];
    let end = [rec("A", 3), rec("B", 7), rec("C", 4)];
    let out = analyze(&start, &end, Thresholds::default());
    assert_eq!(tickers(&out.all_movements), ["A", "B", "C"]);
  }

  #[test]
  fn top_entrants_sorted_by_largest_improvement() {
    let start = [rec("SMALL", 7), rec("BIG", 1), rec("MID", 5)];
    let end = [rec("SMALL", 8), rec("BIG", 10), rec("MID", 9)];
    let out = analyze(&start, &end, Thresholds::default());
    assert_eq!(tickers(&out.top_entrants), ["BIG", "MID", "SMALL"]);
  }

  #[test]
  fn duplicate_end_rows_produce_one_pair_each() {
    let start = [rec("A", 5)];
    let mut uk = rec("A", 9);
    uk.region = Region::Uk;
    let end = [rec("A", 6), uk];
    let out = analyze(&start, &end, Thresholds::default());
    assert_eq!(out.total_analyzed, 2);
  }

  #[test]
  fn no_overlap_is_empty_not_error() {
    let out = analyze(&[rec("A", 5)], &[rec("B", 5)], Thresholds::default());
    assert_eq!(out.total_analyzed, 0);
    assert!(out.top_entrants.is_empty());
    assert!(out.bottom_entrants.is_empty());
    assert!(out.all_movements.is_empty());
  }

  #[test]
  fn custom_thresholds() {
    let start = [rec("A", 5)];
    let end = [rec("A", 6)];
    let out = analyze(&start, &end, ThresholdPolicy::Magnitude5.thresholds());
    assert_eq!(tickers(&out.top_entrants), ["A"]);
  }

  #[test]
  fn policy_thresholds() {
    assert_eq!(ThresholdPolicy::TopBottom3.thresholds(), Thresholds { top: 8, bottom: 3 });
    assert_eq!(ThresholdPolicy::Magnitude3.thresholds(), Thresholds { top: 8, bottom: 3 });
    assert_eq!(ThresholdPolicy::Magnitude5.thresholds(), Thresholds { top: 6, bottom: 5 });
    assert_eq!("magnitude-5".parse::<ThresholdPolicy>().unwrap(), ThresholdPolicy::Magnitude5);
    assert_eq!(ThresholdPolicy::TopBottom3.to_string(), "top-bottom-3");
  }

  #[test]
  fn average_change() {
    let start = [rec("A", 5), rec("B", 5)];
    let end = [rec("A", 8), rec("B", 4)];
    let out = analyze(&start, &end, Thresholds::default());
    let report = MovementReport {
      start:           start[0].date,
      end:             end[0].date,
      region:          None,
      thresholds:      Thresholds::default(),
      top_entrants:    out.top_entrants,
      bottom_entrants: out.bottom_entrants,
      all_movements:   out.all_movements,
      total_analyzed:  out.total_analyzed,
    };
    assert_eq!(report.average_change(), Some(1.0));
  }
}
