//! Subcommand implementations. Each mutating command saves the touched
//! record before printing it.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, bail};
use chrono::{NaiveTime, Utc};
use clap::Args;
use orbit_core::{
  energy,
  relationship::{NewRelationship, RelationshipKind, RelationshipPatch, RelationshipRecord},
  rqs::{self, Answer, QUESTIONS},
  store::Interaction,
  tournament::{Lens, Tournament, select_candidates},
  trend::{self, Period},
  zone::{ChecklistSession, ChecklistStep, Zone, ZoneVerdict, classify_checklist},
};

use crate::{Command, prompt, render, session::Session};

/// Fields accepted by `orbit edit`.
#[derive(Args, Debug, Default)]
pub struct EditArgs {
  #[arg(long)]
  name:             Option<String>,
  #[arg(long)]
  role:             Option<String>,
  #[arg(long)]
  kind:             Option<RelationshipKind>,
  #[arg(long)]
  contact:          Option<String>,
  #[arg(long)]
  avatar:           Option<String>,
  /// Zone number 1–5.
  #[arg(long)]
  zone:             Option<u8>,
  #[arg(long)]
  temperature:      Option<u8>,
  #[arg(long)]
  last_interaction: Option<String>,
  #[arg(long)]
  trust:            Option<u8>,
  #[arg(long)]
  communication:    Option<u8>,
  #[arg(long)]
  frequency:        Option<u8>,
  #[arg(long)]
  satisfaction:     Option<u8>,
}

impl EditArgs {
  fn into_patch(self) -> Result<RelationshipPatch> {
    if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
      bail!("name must not be empty");
    }
    Ok(RelationshipPatch {
      name:             self.name,
      role:             self.role,
      kind:             self.kind,
      contact:          self.contact,
      avatar:           self.avatar,
      zone:             self.zone.map(Zone::from_number).transpose()?,
      temperature:      self.temperature,
      last_interaction: self.last_interaction,
      trust:            self.trust,
      communication:    self.communication,
      frequency:        self.frequency,
      satisfaction:     self.satisfaction,
    })
  }
}

pub async fn run(session: &mut Session, command: Command) -> Result<()> {
  let stdin = io::stdin();
  let mut input = stdin.lock();
  let mut output = io::stdout();

  match command {
    Command::Add { name, kind, role, contact, avatar } => {
      if name.trim().is_empty() {
        bail!("name must not be empty");
      }
      let id = session
        .store
        .create(NewRelationship { name, kind, role, contact, avatar })
        .id;
      let record = session.save(id).await?;
      println!("{}", render::record_line(record));
    }

    Command::List => {
      if session.store.is_empty() {
        println!("No relationships yet. Add one with `orbit add <name>`.");
      }
      for record in session.store.list() {
        println!("{}", render::record_line(record));
      }
    }

    Command::Show { who } => {
      let id = session.resolve(&who)?;
      let record = session.store.get(id).context("relationship not found")?;
      print!("{}", render::record_detail(record));
    }

    Command::Edit { who, fields } => {
      let id = session.resolve(&who)?;
      session.store.update(id, fields.into_patch()?)?;
      print!("{}", render::record_detail(session.save(id).await?));
    }

    Command::Log { who, temperature, title, description, date } => {
      let id = session.resolve(&who)?;
      let date = match date {
        Some(day) => day.and_time(NaiveTime::MIN).and_utc(),
        None => Utc::now(),
      };
      let interaction = Interaction {
        date,
        temperature: temperature
          .as_deref()
          .map(|raw| f64::from(orbit_core::history::parse_temperature(raw))),
        title,
        description,
      };
      session.store.log_interaction(id, interaction)?;
      println!("{}", render::record_line(session.save(id).await?));
    }

    Command::Reclassify { who } => {
      let id = session.resolve(&who)?;
      session.store.reclassify(id)?;
      println!("{}", render::record_line(session.save(id).await?));
    }

    Command::Checklist { who, answers } => {
      let id = session.resolve(&who)?;
      let verdict = match answers {
        Some(raw) => classify_checklist(prompt::parse_yes_no(&raw)?)
          .context("no \"y\" among the answers; give all ten or run interactively")?,
        None => run_checklist(&mut input, &mut output)?,
      };
      session.store.apply_checklist(id, verdict)?;
      let record = session.save(id).await?;
      println!("Placed in zone {} at {}°.", record.zone, record.temperature);
    }

    Command::Rqs { who, answers } => {
      let id = session.resolve(&who)?;
      let assessment = match answers {
        Some(raw) => rqs::score_raw(&prompt::parse_scores(&raw)?, Utc::now())?,
        None => rqs::score(run_rqs(&mut input, &mut output)?, Utc::now()),
      };
      session.store.apply_rqs(id, &assessment)?;
      session.save(id).await?;
      print!("{}", render::grade(&assessment.result));
    }

    Command::Grade { who } => {
      let id = session.resolve(&who)?;
      let record = session.store.get(id).context("relationship not found")?;
      print!("{}", render::grade(&rqs::effective_grade(record, Utc::now())));
    }

    Command::Energy => {
      let records = session.store.list();
      let report = energy::analyze(records);
      print!("{}", render::energy(&report, &report.imbalanced(records)));
    }

    Command::Trend { who, period } => {
      let id = session.resolve(&who)?;
      let record = session.store.get(id).context("relationship not found")?;
      print!("{}", trend_text(record, period));
    }

    Command::Tournament { lens, size, rounds } => {
      let records = session.store.list();
      run_tournament(records, lens, size, rounds, &mut input, &mut output)?;
    }

    Command::Delete { who } => {
      let id = session.resolve(&who)?;
      let record = session.forget(id).await?;
      println!("Deleted {}.", record.name);
    }

    Command::Export => {
      println!("{}", session.store.to_json()?);
    }
  }
  Ok(())
}

fn trend_text(record: &RelationshipRecord, period: Period) -> String {
  let summary = trend::summarize(&record.history);
  let points = trend::windowed(&record.history, period, Utc::now());
  render::trend(&summary, &points)
}

// ─── Interactive flows ────────────────────────────────────────────────────────

fn run_checklist<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<ZoneVerdict> {
  let mut session = ChecklistSession::new();
  let mut item = session.current().context("checklist is empty")?;
  loop {
    writeln!(output, "[{}/10 · {}]", session.index() + 1, item.phase)?;
    let yes = prompt::ask_yes_no(input, output, item.prompt)?;
    match session.answer(yes) {
      ChecklistStep::Ask(next) => item = next,
      ChecklistStep::Done(verdict) => return Ok(verdict),
    }
  }
}

fn run_rqs<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<[Answer; 8]> {
  let mut answers = [Answer::Rarely; 8];
  for (i, (slot, question)) in answers.iter_mut().zip(QUESTIONS.iter()).enumerate() {
    writeln!(output, "[{}/8 · {}]", i + 1, question.area)?;
    *slot = prompt::ask_answer(input, output, question.prompt)?;
  }
  Ok(answers)
}

fn run_tournament<R: BufRead, W: Write>(
  records: &[RelationshipRecord],
  lens: Lens,
  size: usize,
  rounds: Option<usize>,
  input: &mut R,
  output: &mut W,
) -> Result<()> {
  let candidates = select_candidates(records, lens, size);
  if candidates.len() < 2 {
    bail!("a tournament needs at least two relationships");
  }
  let mut tournament = Tournament::new(candidates, lens);
  if let Some(rounds) = rounds {
    tournament = tournament.with_max_rounds(rounds);
  }

  let total = tournament.rounds();
  while let Some((left, right)) = tournament.current_pair() {
    writeln!(output, "Round {} of {total}", tournament.winners().len() + 1)?;
    let winner = if prompt::ask_pick(input, output, &left.name, &right.name)? {
      left.id
    } else {
      right.id
    };
    tournament.submit(winner)?;
  }

  let outcome = tournament.outcome().context("tournament ended without an outcome")?;
  write!(output, "{}", render::outcome(&outcome))?;
  Ok(())
}
