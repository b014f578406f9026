//! Human-friendly rendering of submissions for the terminal.

use std::fmt::Write as _;

use chrono::{DateTime, Local, Utc};
use formsub_core::{NormalizedValue, Submission};

pub const MISSING: &str = "N/A";
pub const EMPTY_LIST: &str = "None";
pub const YES: &str = "Yes";
pub const NO: &str = "No";

/// Turn a `camelCase` or `snake_case` key into a display label.
///
/// Underscores become spaces and every capital gets a space in front of it.
/// Only the first character is upper-cased, so `first_name` reads
/// `First name` while `fullName` reads `Full Name`.
pub fn field_label(key: &str) -> String {
  let mut spaced = String::with_capacity(key.len() + 4);
  for c in key.chars() {
    match c {
      '_' => spaced.push(' '),
      c if c.is_uppercase() => {
        spaced.push(' ');
        spaced.push(c);
      }
      c => spaced.push(c),
    }
  }

  let trimmed = spaced.trim();
  let mut chars = trimmed.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}

/// Render a field value. Absent fields render as [`MISSING`].
pub fn format_value(value: Option<&NormalizedValue>) -> String {
  match value {
    None | Some(NormalizedValue::Null) => MISSING.to_owned(),
    Some(NormalizedValue::Bool(b)) => (if *b { YES } else { NO }).to_owned(),
    Some(NormalizedValue::List(items)) if items.is_empty() => EMPTY_LIST.to_owned(),
    Some(other) => inline(other),
  }
}

// Plain text for a value nested inside a list.
fn inline(value: &NormalizedValue) -> String {
  match value {
    NormalizedValue::String(s) => s.clone(),
    NormalizedValue::Int32(i) => i.to_string(),
    NormalizedValue::Int64(i) => i.to_string(),
    NormalizedValue::Decimal(d) => d.to_plain_string(),
    NormalizedValue::Float(f) => f.to_string(),
    NormalizedValue::Bool(b) => b.to_string(),
    NormalizedValue::Null => String::new(),
    NormalizedValue::List(items) => items
      .iter()
      .map(inline)
      .collect::<Vec<_>>()
      .join(", "),
    NormalizedValue::Map(_) => value
      .to_json()
      .map(|json| json.to_string())
      .unwrap_or_default(),
  }
}

/// Render a timestamp in the local time zone.
pub fn format_date(at: DateTime<Utc>) -> String {
  at.with_timezone(&Local)
    .format("%Y-%m-%d %H:%M:%S")
    .to_string()
}

/// Multi-line block describing one submission.
pub fn render_submission(sub: &Submission) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "Submission {}", sub.id);
  let _ = writeln!(out, "  Submitted: {}", format_date(sub.submitted_at));

  let width = sub
    .form_data
    .keys()
    .map(|k| field_label(k).chars().count())
    .max()
    .unwrap_or(0);
  for (key, value) in &sub.form_data {
    let _ = writeln!(
      out,
      "  {:<width$}  {}",
      format!("{}:", field_label(key)),
      format_value(Some(value)),
      width = width + 1,
    );
  }
  out
}
