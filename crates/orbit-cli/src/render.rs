//! Plain-text rendering of records and reports.

use std::fmt::Write as _;

use orbit_core::{
  energy::EnergyReport,
  history::HistoryEntry,
  relationship::RelationshipRecord,
  rqs::RqsResult,
  tournament::TournamentOutcome,
  trend::{TrendPoint, TrendSummary},
};

/// Number of history entries `show` prints.
pub const RECENT_ENTRIES: usize = 5;

fn short_id(record: &RelationshipRecord) -> String {
  record.id.to_string()[..8].to_owned()
}

fn bar(value: u8, width: usize) -> String {
  let filled = usize::from(value.min(100)) * width / 100;
  format!("{}{}", "█".repeat(filled), "·".repeat(width - filled))
}

pub fn record_line(record: &RelationshipRecord) -> String {
  format!(
    "{}  {:<20} {:<14} {:>3}°  {}",
    short_id(record),
    record.name,
    record.zone.to_string(),
    record.temperature,
    record.kind,
  )
}

fn entry_line(entry: &HistoryEntry) -> String {
  let mut line = format!(
    "  {}  {:>3}°",
    entry.date.format("%Y-%m-%d"),
    entry.temperature
  );
  if let Some(title) = &entry.title {
    let _ = write!(line, "  {title}");
  }
  if let Some(event) = &entry.event {
    let _ = write!(line, "  [{event}]");
  }
  line
}

pub fn record_detail(record: &RelationshipRecord) -> String {
  let m = &record.metrics;
  let mut out = String::new();
  let _ = writeln!(out, "{} ({})", record.name, record.id);
  if !record.role.is_empty() {
    let _ = writeln!(out, "  role         {}", record.role);
  }
  let _ = writeln!(out, "  kind         {}", record.kind);
  let _ = writeln!(out, "  zone         {}", record.zone);
  let _ = writeln!(out, "  temperature  {}°", record.temperature);
  if let Some(contact) = &record.contact {
    let _ = writeln!(out, "  contact      {contact}");
  }
  if let Some(last) = &record.last_interaction {
    let _ = writeln!(out, "  last seen    {last}");
  }
  let _ = writeln!(
    out,
    "  metrics      trust {} · communication {} · frequency {} · satisfaction {}",
    m.trust, m.communication, m.frequency, m.satisfaction
  );
  if let Some(rqs) = &record.rqs {
    let _ = writeln!(out, "  rqs          {} ({}/16)", rqs.grade, rqs.total);
  }

  if !record.history.is_empty() {
    let _ = writeln!(out, "  history ({} entries, newest first)", record.history.len());
    for entry in record.history.recent(RECENT_ENTRIES) {
      let _ = writeln!(out, "  {}", entry_line(entry));
    }
  }
  out
}

pub fn grade(result: &RqsResult) -> String {
  let profile = result.profile();
  let a = &result.areas;
  let mut out = format!(
    "Grade {} · {} · {}/16 ({})\n",
    result.grade, result.category, result.total, result.source
  );
  let _ = writeln!(
    out,
    "  safety {}/4 · vitality {}/4 · growth {}/4 · reciprocity {}/4",
    a.safety, a.vitality, a.growth, a.reciprocity
  );
  for action in profile.actions {
    let _ = writeln!(out, "  - {action}");
  }
  out
}

pub fn energy(report: &EnergyReport, imbalanced: &[&RelationshipRecord]) -> String {
  let mut out = String::new();
  if report.fallback {
    let _ = writeln!(out, "No warmth recorded yet; showing the reference distribution.");
  }
  for z in &report.zones {
    let _ = writeln!(
      out,
      "  {:<14} {} {:>3}%  target {}–{}%  {:<6}  ({} people)",
      z.zone.to_string(),
      bar(z.percent, 20),
      z.percent,
      z.target.min,
      z.target.max,
      z.position,
      z.count,
    );
  }
  let _ = writeln!(out, "Stability {} ({})", report.stability, report.status);
  if !imbalanced.is_empty() {
    let names: Vec<&str> = imbalanced.iter().map(|r| r.name.as_str()).collect();
    let _ = writeln!(out, "In out-of-band zones: {}", names.join(", "));
  }
  out
}

pub fn trend(summary: &TrendSummary, points: &[TrendPoint]) -> String {
  let mut out = format!(
    "Trend {} ({:+}) · recent {:.1} · prior {:.1}\n",
    summary.direction, summary.change, summary.recent_average, summary.prior_average
  );
  if let Some(best) = &summary.best {
    let _ = writeln!(out, "Warmest moment:{}", entry_line(best));
  }
  for p in points {
    let _ = writeln!(
      out,
      "  {}  {} {:>3}°",
      p.date.format("%Y-%m-%d"),
      bar(p.temperature, 20),
      p.temperature
    );
  }
  out
}

pub fn outcome(outcome: &TournamentOutcome) -> String {
  let mut out = format!("Pattern: {}\n{}\n", outcome.pattern, outcome.insight);
  for (rank, winner) in outcome.winners.iter().enumerate() {
    let _ = writeln!(out, "  {}. {} ({})", rank + 1, winner.name, winner.zone);
  }
  out
}
