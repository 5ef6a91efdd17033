//! Line-oriented prompts and answer parsing.

use std::io::{BufRead, Write};

use anyhow::{Result, bail};
use orbit_core::rqs::Answer;

/// Parse a y/n answer string such as `"nny"` or `"n n y"`.
pub fn parse_yes_no(raw: &str) -> Result<Vec<bool>> {
  raw
    .chars()
    .filter(|c| !c.is_whitespace() && *c != ',')
    .map(|c| match c.to_ascii_lowercase() {
      'y' => Ok(true),
      'n' => Ok(false),
      other => bail!("expected y or n, got {other:?}"),
    })
    .collect()
}

/// Parse comma- or space-separated RQS scores.
pub fn parse_scores(raw: &str) -> Result<Vec<u8>> {
  raw
    .split(|c: char| c == ',' || c.is_whitespace())
    .filter(|s| !s.is_empty())
    .map(|s| {
      s.parse::<u8>()
        .map_err(|_| anyhow::anyhow!("expected a score 0-2, got {s:?}"))
    })
    .collect()
}

/// Print `question` and read one trimmed line. `None` on end of input.
pub fn ask<R: BufRead, W: Write>(
  input: &mut R,
  output: &mut W,
  question: &str,
) -> Result<Option<String>> {
  write!(output, "{question} ")?;
  output.flush()?;
  let mut line = String::new();
  if input.read_line(&mut line)? == 0 {
    return Ok(None);
  }
  Ok(Some(line.trim().to_owned()))
}

/// Ask until the answer is y or n.
pub fn ask_yes_no<R: BufRead, W: Write>(
  input: &mut R,
  output: &mut W,
  question: &str,
) -> Result<bool> {
  loop {
    let Some(line) = ask(input, output, &format!("{question} [y/n]"))? else {
      bail!("input ended before an answer was given");
    };
    match parse_yes_no(&line).as_deref() {
      Ok([yes]) => return Ok(*yes),
      _ => writeln!(output, "Please answer y or n.")?,
    }
  }
}

/// Ask until the answer is one of the three RQS choices.
pub fn ask_answer<R: BufRead, W: Write>(
  input: &mut R,
  output: &mut W,
  question: &str,
) -> Result<Answer> {
  loop {
    let Some(line) = ask(
      input,
      output,
      &format!("{question}\n  0 rarely · 1 sometimes · 2 consistently >"),
    )?
    else {
      bail!("input ended before an answer was given");
    };
    match line.parse::<u8>().map(Answer::from_score) {
      Ok(Ok(answer)) => return Ok(answer),
      _ => writeln!(output, "Please enter 0, 1 or 2.")?,
    }
  }
}

/// Ask until the answer is 1 or 2.
pub fn ask_pick<R: BufRead, W: Write>(
  input: &mut R,
  output: &mut W,
  left: &str,
  right: &str,
) -> Result<bool> {
  loop {
    let Some(line) = ask(input, output, &format!("  1) {left}\n  2) {right}\n>"))? else {
      bail!("input ended before a pick was made");
    };
    match line.as_str() {
      "1" => return Ok(true),
      "2" => return Ok(false),
      _ => writeln!(output, "Please enter 1 or 2.")?,
    }
  }
}

#[cfg(test)]
mod tests {
  use std::io::Cursor;

  use super::*;

  #[test]
  fn yes_no_strings() {
    assert_eq!(parse_yes_no("nNy").unwrap(), vec![false, false, true]);
    assert_eq!(parse_yes_no("n, n y").unwrap(), vec![false, false, true]);
    assert!(parse_yes_no("nx").is_err());
  }

  #[test]
  fn score_lists() {
    assert_eq!(parse_scores("2,2 1, 0").unwrap(), vec![2, 2, 1, 0]);
    assert!(parse_scores("2,two").is_err());
  }

  #[test]
  fn yes_no_prompt_retries_until_valid() {
    let mut input = Cursor::new("maybe\n\nY\n");
    let mut output = Vec::new();
    assert!(ask_yes_no(&mut input, &mut output, "Close?").unwrap());
    let shown = String::from_utf8(output).unwrap();
    assert_eq!(shown.matches("Please answer y or n.").count(), 2);
  }

  #[test]
  fn answer_prompt_rejects_out_of_range() {
    let mut input = Cursor::new("3\n1\n");
    let mut output = Vec::new();
    let answer = ask_answer(&mut input, &mut output, "Q?").unwrap();
    assert_eq!(answer, Answer::Sometimes);
  }

  #[test]
  fn prompts_fail_on_end_of_input() {
    let mut output = Vec::new();
    assert!(ask_pick(&mut Cursor::new(""), &mut output, "a", "b").is_err());
  }
}
