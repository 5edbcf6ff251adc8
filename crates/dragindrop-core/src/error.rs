use thiserror::Error;

/// Errors raised by the calendar core.
///
/// Application code wraps these in `anyhow::Error`; tests match on the
/// variants directly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
  #[error(
    "date out of range: year {year}, \
     month index {month}"
  )]
  InvalidDate { year: i64, month: i64 },

  #[error(
    "visible limit must be zero or \
     positive, got {0}"
  )]
  InvalidLimit(i64),

  #[error(
    "post {id} has unknown platform \
     tag: {tag:?}"
  )]
  UnknownPlatform { id: u64, tag: String },

  #[error("duplicate post id: {0}")]
  DuplicatePostId(u64),

  #[error(
    "post {id} has an invalid date: \
     {year}-{month}-{day} (month is \
     zero-based)"
  )]
  InvalidPostDate {
    id:    u64,
    year:  i32,
    month: u32,
    day:   u32
  }
}

pub type CalendarResult<T> =
  Result<T, CalendarError>;
