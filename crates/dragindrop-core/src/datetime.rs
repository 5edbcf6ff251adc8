use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;

use anyhow::{
  Context,
  anyhow
};
use chrono::{
  Datelike,
  Days,
  NaiveDate,
  Utc
};
use chrono_tz::Tz;
use regex::Regex;
use serde::Deserialize;

use crate::grid::MonthCursor;

const TIMEZONE_CONFIG_FILE: &str =
  "dragindrop-time.toml";
const TIMEZONE_ENV_VAR: &str =
  "DRAGINDROP_TIMEZONE";
const TIMEZONE_CONFIG_ENV_VAR: &str =
  "DRAGINDROP_TIME_CONFIG";
const DEFAULT_PROJECT_TIMEZONE: &str =
  "UTC";

#[derive(Debug, Deserialize)]
struct TimezoneConfig {
  timezone: Option<String>,
  time:     Option<TimezoneSection>
}

#[derive(Debug, Deserialize)]
struct TimezoneSection {
  timezone: Option<String>
}

pub fn project_timezone() -> &'static Tz
{
  static PROJECT_TZ: OnceLock<Tz> =
    OnceLock::new();
  PROJECT_TZ.get_or_init(
    resolve_project_timezone
  )
}

/// The only wall-clock read in the workspace. Everything below the CLI
/// takes "today" as an argument.
#[must_use]
pub fn today_in_project_timezone()
-> NaiveDate {
  Utc::now()
    .with_timezone(project_timezone())
    .date_naive()
}

fn resolve_project_timezone() -> Tz {
  if let Ok(raw) =
    std::env::var(TIMEZONE_ENV_VAR)
    && let Some(tz) =
      parse_timezone(&raw, TIMEZONE_ENV_VAR)
  {
    return tz;
  }

  if let Some(path) =
    timezone_config_path()
    && let Some(tz) =
      load_timezone_from_file(&path)
  {
    return tz;
  }

  parse_timezone(
    DEFAULT_PROJECT_TIMEZONE,
    "DEFAULT_PROJECT_TIMEZONE"
  )
  .unwrap_or(chrono_tz::UTC)
}

fn timezone_config_path()
-> Option<PathBuf> {
  if let Ok(raw) = std::env::var(
    TIMEZONE_CONFIG_ENV_VAR
  ) {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
      return Some(PathBuf::from(
        trimmed
      ));
    }
  }

  std::env::current_dir().ok().map(
    |dir| {
      dir.join(TIMEZONE_CONFIG_FILE)
    }
  )
}

fn load_timezone_from_file(
  path: &PathBuf
) -> Option<Tz> {
  if !path.exists() {
    tracing::debug!(
      file = %path.display(),
      "timezone config file not found"
    );
    return None;
  }

  let raw = match fs::read_to_string(
    path
  ) {
    | Ok(raw) => raw,
    | Err(err) => {
      tracing::error!(
        file = %path.display(),
        error = %err,
        "failed reading timezone config file"
      );
      return None;
    }
  };

  let parsed = match toml::from_str::<
    TimezoneConfig
  >(&raw)
  {
    | Ok(parsed) => parsed,
    | Err(err) => {
      tracing::error!(
        file = %path.display(),
        error = %err,
        "failed parsing timezone config file"
      );
      return None;
    }
  };

  let timezone =
    parsed.timezone.or_else(|| {
      parsed.time.and_then(|section| {
        section.timezone
      })
    });
  let Some(timezone) = timezone else {
    tracing::warn!(
      file = %path.display(),
      "timezone config had no timezone field"
    );
    return None;
  };

  parse_timezone(
    timezone.as_str(),
    &format!("file:{}", path.display())
  )
}

fn parse_timezone(
  raw: &str,
  source: &str
) -> Option<Tz> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    tracing::warn!(
      source,
      "timezone source was empty"
    );
    return None;
  }

  match trimmed.parse::<Tz>() {
    | Ok(tz) => {
      tracing::info!(
        source,
        timezone = %trimmed,
        "configured project timezone"
      );
      Some(tz)
    }
    | Err(err) => {
      tracing::error!(
        source,
        timezone = %trimmed,
        error = %err,
        "failed to parse timezone id"
      );
      None
    }
  }
}

/// Parses a day: `today`, `tomorrow`, `yesterday` or `YYYY-MM-DD`.
#[tracing::instrument(skip(today), fields(input = input))]
pub fn parse_day_expr(
  input: &str,
  today: NaiveDate
) -> anyhow::Result<NaiveDate> {
  let token = input.trim();
  let lower =
    token.to_ascii_lowercase();

  match lower.as_str() {
    | "today" => return Ok(today),
    | "tomorrow" => {
      return today
        .checked_add_days(Days::new(1))
        .ok_or_else(|| {
          anyhow!(
            "no day after {today}"
          )
        });
    }
    | "yesterday" => {
      return today
        .checked_sub_days(Days::new(1))
        .ok_or_else(|| {
          anyhow!(
            "no day before {today}"
          )
        });
    }
    | _ => {}
  }

  NaiveDate::parse_from_str(
    token, "%Y-%m-%d"
  )
  .with_context(|| {
    format!(
      "unrecognized day '{input}'. \
       Supported: today, tomorrow, \
       yesterday, YYYY-MM-DD"
    )
  })
}

/// Parses the month to display.
///
/// Accepts `today`, `YYYY-MM`, a month name with an optional year
/// (`oct`, `october 2025`) and relative steps from the current month
/// (`+1`, `-2`).
#[tracing::instrument(skip(today), fields(input = input))]
pub fn parse_month_expr(
  input: &str,
  today: NaiveDate
) -> anyhow::Result<MonthCursor> {
  let token = input.trim();
  let lower =
    token.to_ascii_lowercase();
  let current =
    MonthCursor::containing(today)?;

  match lower.as_str() {
    | "" | "today" | "this" => {
      return Ok(current);
    }
    | "next" => return Ok(current.next()?),
    | "prev" | "previous" | "last" => {
      return Ok(current.previous()?);
    }
    | _ => {}
  }

  if let Some(rest) = lower
    .strip_prefix('+')
    .or_else(|| {
      lower
        .starts_with('-')
        .then_some(lower.as_str())
    })
    && let Ok(step) = rest.parse::<i64>()
  {
    return Ok(current.shift(step)?);
  }

  let ym_re = Regex::new(
    r"^(?P<year>-?\d{1,4})-(?P<month>\d{1,2})$"
  )
  .context("invalid year-month regex")?;
  if let Some(caps) =
    ym_re.captures(&lower)
  {
    let year: i32 = caps["year"]
      .parse()
      .context("invalid year")?;
    let month: u32 = caps["month"]
      .parse()
      .context("invalid month")?;
    if !(1..=12).contains(&month) {
      return Err(anyhow!(
        "month must be 1-12, got \
         {month}"
      ));
    }
    return Ok(MonthCursor::new(
      year,
      i64::from(month - 1)
    )?);
  }

  let mut words = lower.split_whitespace();
  if let Some(first) = words.next()
    && let Some(month) =
      parse_month_name(first)
  {
    let year = match words.next() {
      | Some(raw) => {
        raw.parse::<i32>().with_context(
          || format!("invalid year '{raw}'")
        )?
      }
      | None => today.year()
    };
    if let Some(extra) = words.next() {
      return Err(anyhow!(
        "unexpected trailing token \
         '{extra}' in month"
      ));
    }
    return Ok(MonthCursor::new(
      year,
      i64::from(month - 1)
    )?);
  }

  Err(anyhow!(
    "unrecognized month '{input}'. \
     Supported: today, next, prev, \
     +N/-N, YYYY-MM, month names \
     (e.g. oct or october 2025)"
  ))
}

fn parse_month_name(
  token: &str
) -> Option<u32> {
  match token.trim() {
    | "january" | "jan" => Some(1),
    | "february" | "feb" => Some(2),
    | "march" | "mar" => Some(3),
    | "april" | "apr" => Some(4),
    | "may" => Some(5),
    | "june" | "jun" => Some(6),
    | "july" | "jul" => Some(7),
    | "august" | "aug" => Some(8),
    | "september" | "sep" | "sept" => {
      Some(9)
    }
    | "october" | "oct" => Some(10),
    | "november" | "nov" => Some(11),
    | "december" | "dec" => Some(12),
    | _ => None
  }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::{
    parse_day_expr,
    parse_month_expr
  };

  fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 17)
      .expect("valid today")
  }

  #[test]
  fn parses_year_month() {
    let cursor =
      parse_month_expr("2025-10", today())
        .expect("parse month");
    assert_eq!(cursor.year(), 2025);
    assert_eq!(cursor.month0(), 9);
  }

  #[test]
  fn parses_month_name_with_and_without_year()
  {
    let cursor = parse_month_expr(
      "October 2025",
      today()
    )
    .expect("parse month");
    assert_eq!(
      cursor.label(),
      "October 2025"
    );

    let cursor =
      parse_month_expr("mar", today())
        .expect("parse month");
    assert_eq!(
      cursor.label(),
      "March 2026"
    );
  }

  #[test]
  fn relative_steps_cross_year_boundaries()
  {
    let cursor =
      parse_month_expr("-1", today())
        .expect("parse month");
    assert_eq!(
      cursor.label(),
      "December 2025"
    );

    let cursor =
      parse_month_expr("+12", today())
        .expect("parse month");
    assert_eq!(
      cursor.label(),
      "January 2027"
    );

    let cursor =
      parse_month_expr("prev", today())
        .expect("parse month");
    assert_eq!(
      cursor.label(),
      "December 2025"
    );
  }

  #[test]
  fn rejects_bad_months() {
    assert!(
      parse_month_expr("2025-13", today())
        .is_err()
    );
    assert!(
      parse_month_expr("smarch", today())
        .is_err()
    );
  }

  #[test]
  fn parses_days() {
    assert_eq!(
      parse_day_expr("today", today())
        .expect("today"),
      today()
    );
    assert_eq!(
      parse_day_expr("yesterday", today())
        .expect("yesterday"),
      NaiveDate::from_ymd_opt(2026, 1, 16)
        .expect("date")
    );
    assert_eq!(
      parse_day_expr(
        "2025-11-15",
        today()
      )
      .expect("iso"),
      NaiveDate::from_ymd_opt(2025, 11, 15)
        .expect("date")
    );
    assert!(
      parse_day_expr("15/11", today())
        .is_err()
    );
  }

  #[test]
  fn relative_days_at_range_ends_are_errors()
  {
    assert!(
      parse_day_expr(
        "tomorrow",
        NaiveDate::MAX
      )
      .is_err()
    );
    assert!(
      parse_day_expr(
        "yesterday",
        NaiveDate::MIN
      )
      .is_err()
    );
  }

  #[test]
  fn huge_month_step_is_an_error() {
    assert!(
      parse_month_expr(
        "+9223372036854775807",
        today()
      )
      .is_err()
    );
    assert!(
      parse_month_expr(
        "-9223372036854775808",
        today()
      )
      .is_err()
    );
  }
}
