//! `formsub`: command-line client for the formsub server.
//!
//! # Usage
//!
//! ```
//! formsub submit --field fullName=Alice --field newsletter=true
//! formsub submit --json '{"subject":"support","rating":4.5}'
//! formsub list
//! formsub show 6f1c2a9e-3b1d-4d6f-9a57-0c2b1f4e8d10
//! ```

mod client;
mod format;

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use client::ApiClient;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const DEFAULT_URL: &str = "http://localhost:5180";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "formsub", about = "Submit and browse form submissions")]
struct Args {
  /// Path to a TOML config file (url).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the formsub server (default: http://localhost:5180).
  #[arg(long, env = "FORMSUB_URL")]
  url: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Submit one form.
  Submit {
    /// A field as KEY=VALUE. VALUE is parsed as JSON when it can be, so
    /// `age=28` sends a number and `name=Alice` sends a string.
    #[arg(short, long = "field", value_name = "KEY=VALUE")]
    fields: Vec<String>,

    /// A whole JSON object to start from; `--field` entries are applied on
    /// top of it.
    #[arg(long, value_name = "JSON")]
    json: Option<String>,
  },
  /// List every submission, newest first.
  List,
  /// Show one submission.
  Show {
    id: String,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flag (or env) overrides config file, which overrides the default.
  let base_url = args
    .url
    .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
    .unwrap_or_else(|| DEFAULT_URL.to_string());

  let client = ApiClient::new(base_url)?;

  match args.command {
    Command::Submit { fields, json } => {
      let form = build_form(json.as_deref(), &fields)?;
      let resp = client.submit(&form).await?;
      println!("{} (id {})", resp.message, resp.id);
    }
    Command::List => {
      let submissions = client.list().await?;
      if submissions.is_empty() {
        println!("No submissions yet.");
      }
      for (i, sub) in submissions.iter().enumerate() {
        if i > 0 {
          println!();
        }
        print!("{}", format::render_submission(sub));
      }
    }
    Command::Show { id } => match client.get(&id).await? {
      Some(sub) => print!("{}", format::render_submission(&sub)),
      None => bail!("Submission not found: {id}"),
    },
  }

  Ok(())
}

// ─── Form building ────────────────────────────────────────────────────────────

/// Assemble the request body from `--json` and `--field` arguments.
fn build_form(json: Option<&str>, fields: &[String]) -> Result<Value> {
  let mut form = match json {
    Some(text) => match serde_json::from_str(text).context("parsing --json")? {
      Value::Object(map) => map,
      _ => bail!("--json must be a JSON object"),
    },
    None => Map::new(),
  };

  for field in fields {
    let (key, value) = parse_field(field)?;
    form.insert(key, value);
  }
  Ok(Value::Object(form))
}

/// Split `KEY=VALUE`; VALUE falls back to a plain string when it is not JSON.
fn parse_field(field: &str) -> Result<(String, Value)> {
  let (key, raw) = field
    .split_once('=')
    .ok_or_else(|| anyhow!("field {field:?} is not KEY=VALUE"))?;
  if key.is_empty() {
    bail!("field {field:?} has an empty key");
  }
  let value =
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()));
  Ok((key.to_owned(), value))
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn field_values_parse_as_json_when_possible() {
    assert_eq!(parse_field("age=28").unwrap(), ("age".into(), json!(28)));
    assert_eq!(parse_field("ok=true").unwrap(), ("ok".into(), json!(true)));
    assert_eq!(
      parse_field("tags=[\"a\",\"b\"]").unwrap(),
      ("tags".into(), json!(["a", "b"]))
    );
    assert_eq!(
      parse_field("name=Alice").unwrap(),
      ("name".into(), json!("Alice"))
    );
    assert_eq!(parse_field("empty=").unwrap(), ("empty".into(), json!("")));
    assert_eq!(
      parse_field("eq=a=b").unwrap(),
      ("eq".into(), json!("a=b"))
    );
  }

  #[test]
  fn malformed_fields_are_rejected() {
    assert!(parse_field("novalue").is_err());
    assert!(parse_field("=x").is_err());
  }

  #[test]
  fn fields_override_json_base() {
    let form = build_form(
      Some(r#"{"fullName":"Alice","age":1}"#),
      &["age=28".to_string(), "city=Oslo".to_string()],
    )
    .unwrap();
    assert_eq!(form, json!({ "fullName": "Alice", "age": 28, "city": "Oslo" }));
    let keys: Vec<_> = form.as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys, ["fullName", "age", "city"]);
  }

  #[test]
  fn json_base_must_be_an_object() {
    assert!(build_form(Some("[1,2]"), &[]).is_err());
    assert!(build_form(Some("{oops"), &[]).is_err());
    assert_eq!(build_form(None, &[]).unwrap(), json!({}));
  }

  #[test]
  fn args_parse() {
    let args = Args::try_parse_from([
      "formsub", "--url", "http://x.test", "submit", "-f", "a=1", "--field", "b=2",
    ])
    .unwrap();
    assert_eq!(args.url.as_deref(), Some("http://x.test"));
    match args.command {
      Command::Submit { fields, json } => {
        assert_eq!(fields, ["a=1", "b=2"]);
        assert!(json.is_none());
      }
      other => panic!("unexpected command {other:?}"),
    }
  }
}
