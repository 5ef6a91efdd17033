//! Trend analysis over a relationship's history.
//!
//! Two paths: a summary comparing the last few entries with everything
//! before them, and a period-windowed series with a display curve.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::history::{History, HistoryEntry};

/// Entries counted as "recent".
pub const RECENT_WINDOW: usize = 3;

/// Minimum average change that counts as movement.
pub const TREND_THRESHOLD: f64 = 3.0;

// ─── Summary ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TrendDirection {
  /// Not enough history to compare.
  Start,
  Up,
  Down,
  Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSummary {
  pub recent_average: f64,
  pub prior_average:  f64,
  pub direction:      TrendDirection,
  /// `recent - prior`, rounded.
  pub change:         i32,
  /// The warmest entry; the earliest one wins ties.
  pub best:           Option<HistoryEntry>,
}

fn mean(entries: &[HistoryEntry]) -> Option<f64> {
  if entries.is_empty() {
    return None;
  }
  let sum: f64 = entries.iter().map(|e| f64::from(e.temperature)).sum();
  Some(sum / entries.len() as f64)
}

/// The warmest entry in iteration order, first occurrence on ties.
pub fn best_activity(history: &History) -> Option<&HistoryEntry> {
  let mut best: Option<&HistoryEntry> = None;
  for entry in history {
    if best.is_none_or(|b| entry.temperature > b.temperature) {
      best = Some(entry);
    }
  }
  best
}

pub fn summarize(history: &History) -> TrendSummary {
  let entries = history.entries();
  let split = entries.len().saturating_sub(RECENT_WINDOW);
  let (prior, recent) = entries.split_at(split);

  let recent_average = mean(recent).unwrap_or(0.0);
  // No entries before the window: compare the window with itself.
  let prior_average = mean(prior).unwrap_or(recent_average);
  let delta = recent_average - prior_average;

  let direction = if entries.len() < 2 {
    TrendDirection::Start
  } else if delta >= TREND_THRESHOLD {
    TrendDirection::Up
  } else if delta <= -TREND_THRESHOLD {
    TrendDirection::Down
  } else {
    TrendDirection::Stable
  };

  TrendSummary {
    recent_average,
    prior_average,
    direction,
    change: delta.round() as i32,
    best: best_activity(history).cloned(),
  }
}

/// Trailing mean of up to `window` entries ending at each position.
pub fn rolling_averages(history: &History, window: usize) -> Vec<f64> {
  let window = window.max(1);
  let entries = history.entries();
  (0..entries.len())
    .filter_map(|i| mean(&entries[(i + 1).saturating_sub(window)..=i]))
    .collect()
}

// ─── Windowed series ─────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, EnumIter,
  Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Period {
  Week,
  #[default]
  Month,
  Year,
}

impl Period {
  pub fn days(self) -> i64 {
    match self {
      Self::Week => 7,
      Self::Month => 30,
      Self::Year => 365,
    }
  }

  pub fn start(self, now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(self.days())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
  pub date:        DateTime<Utc>,
  pub temperature: u8,
}

/// Entries dated within `period` of `now`, oldest first. When none fall in
/// the window, the single most recent entry is returned instead.
pub fn windowed(history: &History, period: Period, now: DateTime<Utc>) -> Vec<TrendPoint> {
  let start = period.start(now);
  let point = |e: &HistoryEntry| TrendPoint { date: e.date, temperature: e.temperature };

  let points: Vec<TrendPoint> = history
    .iter()
    .filter(|e| e.date >= start && e.date <= now)
    .map(point)
    .collect();

  if points.is_empty() {
    history.last().map(point).into_iter().collect()
  } else {
    points
  }
}

// ─── Display curve ───────────────────────────────────────────────────────────

/// A point in curve space: `x` is the position in the window (0–1), `y` the
/// temperature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePoint {
  pub x: f64,
  pub y: f64,
}

/// One cubic Bézier segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurveSegment {
  pub from: CurvePoint,
  pub c1:   CurvePoint,
  pub c2:   CurvePoint,
  pub to:   CurvePoint,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendCurve {
  pub period:   Period,
  pub points:   Vec<CurvePoint>,
  /// Empty when fewer than two points exist.
  pub segments: Vec<CurveSegment>,
}

/// Lay out the windowed series and join consecutive points with flat-tangent
/// cubic segments, so the curve never overshoots the data.
pub fn curve(history: &History, period: Period, now: DateTime<Utc>) -> TrendCurve {
  let start = period.start(now);
  let span = (now - start).num_seconds() as f64;

  let points: Vec<CurvePoint> = windowed(history, period, now)
    .iter()
    .map(|p| CurvePoint {
      x: ((p.date - start).num_seconds() as f64 / span).clamp(0.0, 1.0),
      y: f64::from(p.temperature),
    })
    .collect();

  let segments = points
    .windows(2)
    .map(|pair| {
      let (from, to) = (pair[0], pair[1]);
      let mid = (from.x + to.x) / 2.0;
      CurveSegment {
        from,
        c1: CurvePoint { x: mid, y: from.y },
        c2: CurvePoint { x: mid, y: to.y },
        to,
      }
    })
    .collect();

  TrendCurve { period, points, segments }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn now() -> DateTime<Utc> { Utc.timestamp_opt(1_700_000_000, 0).unwrap() }

  fn history(temps: &[(i64, u8)]) -> History {
    History::from(
      temps
        .iter()
        .map(|&(days_ago, t)| HistoryEntry::new(now() - Duration::days(days_ago), t))
        .collect::<Vec<_>>(),
    )
  }

  fn ascending(temps: &[u8]) -> History {
    let n = temps.len() as i64;
    history(
      &temps
        .iter()
        .enumerate()
        .map(|(i, &t)| (n - i as i64, t))
        .collect::<Vec<_>>(),
    )
  }

  #[test]
  fn short_history_is_start() {
    assert_eq!(summarize(&History::new()).direction, TrendDirection::Start);
    let one = summarize(&ascending(&[90]));
    assert_eq!(one.direction, TrendDirection::Start);
    assert_eq!(one.recent_average, 90.0);
    assert_eq!(one.prior_average, 90.0);
  }

  #[test]
  fn no_prior_entries_is_stable() {
    let summary = summarize(&ascending(&[10, 90, 50]));
    assert_eq!(summary.prior_average, summary.recent_average);
    assert_eq!(summary.direction, TrendDirection::Stable);
    assert_eq!(summary.change, 0);
  }

  #[test]
  fn up_down_and_stable() {
    let up = summarize(&ascending(&[40, 40, 43, 43, 43]));
    assert_eq!(up.direction, TrendDirection::Up);
    assert_eq!(up.change, 3);

    let down = summarize(&ascending(&[60, 50, 50, 50]));
    assert_eq!(down.direction, TrendDirection::Down);
    assert_eq!(down.change, -10);

    let flat = summarize(&ascending(&[50, 52, 52, 52]));
    assert_eq!(flat.direction, TrendDirection::Stable);
    assert_eq!(flat.change, 2);
  }

  #[test]
  fn threshold_edges_are_inclusive() {
    let down = summarize(&ascending(&[50, 50, 47, 47, 47]));
    assert_eq!(down.change, -3);
    assert_eq!(down.direction, TrendDirection::Down);

    let almost = summarize(&ascending(&[50, 48, 48, 47]));
    assert_eq!(almost.direction, TrendDirection::Stable);
  }

  #[test]
  fn best_activity_prefers_first_of_ties() {
    let h = ascending(&[30, 80, 80, 10]);
    let best = best_activity(&h).unwrap();
    assert_eq!(best.entry_id, h.entries()[1].entry_id);
    assert!(best_activity(&History::new()).is_none());
  }

  #[test]
  fn rolling_average_window() {
    let avgs = rolling_averages(&ascending(&[10, 20, 30, 40]), 3);
    assert_eq!(avgs, vec![10.0, 15.0, 20.0, 30.0]);
  }

  #[test]
  fn windowed_filters_by_period() {
    let h = history(&[(400, 5), (100, 10), (20, 20), (3, 30)]);
    let temps = |p| -> Vec<u8> {
      windowed(&h, p, now()).iter().map(|t| t.temperature).collect()
    };
    assert_eq!(temps(Period::Week), vec![30]);
    assert_eq!(temps(Period::Month), vec![20, 30]);
    assert_eq!(temps(Period::Year), vec![10, 20, 30]);
  }

  #[test]
  fn empty_window_falls_back_to_latest_entry() {
    let h = history(&[(90, 10), (60, 40)]);
    let points = windowed(&h, Period::Week, now());
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].temperature, 40);
    assert!(windowed(&History::new(), Period::Week, now()).is_empty());
  }

  #[test]
  fn curve_segments_join_consecutive_points() {
    let h = history(&[(6, 20), (3, 60), (0, 40)]);
    let c = curve(&h, Period::Week, now());
    assert_eq!(c.points.len(), 3);
    assert_eq!(c.segments.len(), 2);
    assert_eq!(c.points[2].x, 1.0);
    let seg = c.segments[0];
    assert_eq!(seg.from, c.points[0]);
    assert_eq!(seg.to, c.points[1]);
    assert_eq!(seg.c1.y, 20.0);
    assert_eq!(seg.c2.y, 60.0);
    assert!(seg.c1.x > seg.from.x && seg.c1.x < seg.to.x);
  }

  #[test]
  fn fallback_point_is_clamped_to_window_start() {
    let h = history(&[(60, 40)]);
    let c = curve(&h, Period::Week, now());
    assert_eq!(c.points, vec![CurvePoint { x: 0.0, y: 40.0 }]);
    assert!(c.segments.is_empty());
  }
}
