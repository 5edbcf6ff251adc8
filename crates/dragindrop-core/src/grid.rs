//! Month grid generation.
//!
//! A month is always laid out as 6 rows of 7 days, weeks starting on
//! Sunday. Cells before day 1 are the tail of the previous month; cells
//! after the last day count up from 1 into the next month.

use chrono::{
  Datelike,
  Days,
  Months,
  NaiveDate
};
use crate::error::{
  CalendarError,
  CalendarResult
};

pub const GRID_ROWS: usize = 6;
pub const GRID_COLUMNS: usize = 7;
pub const GRID_CELLS: usize =
  GRID_ROWS * GRID_COLUMNS;

pub const MIN_YEAR: i32 = -9999;
pub const MAX_YEAR: i32 = 9999;

pub const WEEKDAY_SHORT: [&str; 7] = [
  "SUN", "MON", "TUE", "WED", "THU",
  "FRI", "SAT"
];

pub const WEEKDAY_LONG: [&str; 7] = [
  "Sunday",
  "Monday",
  "Tuesday",
  "Wednesday",
  "Thursday",
  "Friday",
  "Saturday"
];

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct CalendarCell {
  pub date:             NaiveDate,
  pub day:              u32,
  pub in_current_month: bool,
  pub is_today:         bool,
  pub is_past:          bool
}

impl CalendarCell {
  fn padding(date: NaiveDate) -> Self {
    Self {
      date,
      day: date.day(),
      in_current_month: false,
      is_today: false,
      is_past: false
    }
  }
}

/// First day of the month `month0` months after January of `year`.
///
/// `month0` is zero-based and may fall outside `0..12`; whole years are
/// rolled over, so `(2025, -1)` is December 2024.
pub fn month_start(
  year: i32,
  month0: i64
) -> CalendarResult<NaiveDate> {
  let invalid = || {
    CalendarError::InvalidDate {
      year:  i64::from(year),
      month: month0
    }
  };

  if !(MIN_YEAR..=MAX_YEAR)
    .contains(&year)
  {
    return Err(invalid());
  }

  let january =
    NaiveDate::from_ymd_opt(year, 1, 1)
      .ok_or_else(invalid)?;
  let steps = u32::try_from(
    month0.unsigned_abs()
  )
  .map_err(|_| invalid())?;

  let first = if month0 >= 0 {
    january.checked_add_months(
      Months::new(steps)
    )
  } else {
    january.checked_sub_months(
      Months::new(steps)
    )
  }
  .ok_or_else(invalid)?;

  if !(MIN_YEAR..=MAX_YEAR)
    .contains(&first.year())
  {
    return Err(invalid());
  }

  Ok(first)
}

/// Number of days in the month starting at `first`.
#[must_use]
pub fn days_in_month(
  first: NaiveDate
) -> u32 {
  first
    .checked_add_months(Months::new(1))
    .and_then(|next| next.pred_opt())
    .map(|last| last.day())
    .unwrap_or(31)
}

/// Weekday of `first`, 0 = Sunday through 6 = Saturday.
#[must_use]
pub fn first_weekday_index(
  first: NaiveDate
) -> u32 {
  first.weekday().num_days_from_sunday()
}

/// Builds the 42 cells for the month `month0` of `year`.
///
/// `today` is the caller's reference date. Only current-month cells are
/// flagged as today or past; a day is past when it is strictly before
/// `today`.
#[tracing::instrument(skip(today), fields(today = %today))]
pub fn generate_grid(
  year: i32,
  month0: i64,
  today: NaiveDate
) -> CalendarResult<Vec<CalendarCell>> {
  let first = month_start(year, month0)?;
  let invalid = || {
    CalendarError::InvalidDate {
      year:  i64::from(year),
      month: month0
    }
  };

  let month_len = days_in_month(first);
  let lead = first_weekday_index(first);
  let previous_last =
    first.pred_opt().ok_or_else(invalid)?;
  let previous_len = previous_last.day();

  let mut cells =
    Vec::with_capacity(GRID_CELLS);

  for i in 0..lead {
    let date = first
      .checked_sub_days(Days::new(
        u64::from(lead - i)
      ))
      .ok_or_else(invalid)?;
    let mut cell =
      CalendarCell::padding(date);
    cell.day = previous_len - lead + i + 1;
    cells.push(cell);
  }

  for day in 1..=month_len {
    let date = first
      .with_day(day)
      .ok_or_else(invalid)?;
    cells.push(CalendarCell {
      date,
      day,
      in_current_month: true,
      is_today: date == today,
      is_past: date < today
    });
  }

  let trailing = GRID_CELLS
    - (lead + month_len) as usize;
  let next_first = first
    .checked_add_months(Months::new(1))
    .ok_or_else(invalid)?;
  for offset in 0..trailing {
    let date = next_first
      .checked_add_days(Days::new(
        offset as u64
      ))
      .ok_or_else(invalid)?;
    cells.push(CalendarCell::padding(
      date
    ));
  }

  tracing::debug!(
    month = %first.format("%Y-%m"),
    lead,
    month_len,
    trailing,
    "generated month grid"
  );

  Ok(cells)
}

/// The month currently being viewed, as the header controls see it.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
)]
pub struct MonthCursor {
  first: NaiveDate
}

impl MonthCursor {
  pub fn new(
    year: i32,
    month0: i64
  ) -> CalendarResult<Self> {
    Ok(Self {
      first: month_start(year, month0)?
    })
  }

  pub fn containing(
    date: NaiveDate
  ) -> CalendarResult<Self> {
    Self::new(
      date.year(),
      i64::from(date.month0())
    )
  }

  #[must_use]
  pub fn year(&self) -> i32 {
    self.first.year()
  }

  /// Zero-based month index.
  #[must_use]
  pub fn month0(&self) -> u32 {
    self.first.month0()
  }

  #[must_use]
  pub fn first_day(&self) -> NaiveDate {
    self.first
  }

  pub fn shift(
    &self,
    months: i64
  ) -> CalendarResult<Self> {
    let month0 = i64::from(self.month0())
      .checked_add(months)
      .ok_or(CalendarError::InvalidDate {
        year:  i64::from(self.year()),
        month: months
      })?;
    Self::new(self.year(), month0)
  }

  pub fn previous(
    &self
  ) -> CalendarResult<Self> {
    self.shift(-1)
  }

  pub fn next(
    &self
  ) -> CalendarResult<Self> {
    self.shift(1)
  }

  /// `October 2025`
  #[must_use]
  pub fn label(&self) -> String {
    self.first.format("%B %Y").to_string()
  }

  pub fn grid(
    &self,
    today: NaiveDate
  ) -> CalendarResult<Vec<CalendarCell>>
  {
    generate_grid(
      self.year(),
      i64::from(self.month0()),
      today
    )
  }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::{
    GRID_CELLS,
    MonthCursor,
    days_in_month,
    first_weekday_index,
    generate_grid,
    month_start
  };
  use crate::error::CalendarError;

  fn date(
    y: i32,
    m: u32,
    d: u32
  ) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d)
      .expect("valid date")
  }

  #[test]
  fn october_2025_has_three_leading_days()
  {
    let today = date(2025, 10, 15);
    let cells =
      generate_grid(2025, 9, today)
        .expect("grid");

    let lead: Vec<u32> = cells
      .iter()
      .take_while(|c| {
        !c.in_current_month
      })
      .map(|c| c.day)
      .collect();
    assert_eq!(lead, vec![28, 29, 30]);
    assert_eq!(
      cells[0].date,
      date(2025, 9, 28)
    );
    assert_eq!(cells[3].day, 1);
    assert!(cells[3].in_current_month);
  }

  #[test]
  fn every_month_fills_the_grid() {
    let today = date(2024, 6, 1);
    for year in [1900, 2000, 2023, 2024]
    {
      for month0 in 0..12 {
        let cells = generate_grid(
          year, month0, today
        )
        .expect("grid");
        assert_eq!(
          cells.len(),
          GRID_CELLS
        );

        let first = month_start(
          year, month0
        )
        .expect("start");
        let current = cells
          .iter()
          .filter(|c| c.in_current_month)
          .count();
        assert_eq!(
          current as u32,
          days_in_month(first)
        );
      }
    }
  }

  #[test]
  fn february_lengths_follow_leap_years()
  {
    assert_eq!(
      days_in_month(date(2024, 2, 1)),
      29
    );
    assert_eq!(
      days_in_month(date(2023, 2, 1)),
      28
    );
    assert_eq!(
      days_in_month(date(1900, 2, 1)),
      28
    );
    assert_eq!(
      days_in_month(date(2000, 2, 1)),
      29
    );
  }

  #[test]
  fn trailing_padding_restarts_at_one() {
    // February 2026 starts on a Sunday and has 28 days.
    let cells = generate_grid(
      2026,
      1,
      date(2026, 2, 1)
    )
    .expect("grid");
    assert!(cells[0].in_current_month);
    let trailing: Vec<u32> = cells
      [28..]
      .iter()
      .map(|c| c.day)
      .collect();
    assert_eq!(
      trailing,
      (1..=14).collect::<Vec<_>>()
    );
    assert!(
      cells[28..]
        .iter()
        .all(|c| !c.in_current_month)
    );
  }

  #[test]
  fn negative_month_rolls_into_previous_year()
  {
    let first = month_start(2025, -1)
      .expect("start");
    assert_eq!(first, date(2024, 12, 1));

    let first = month_start(2025, 12)
      .expect("start");
    assert_eq!(first, date(2026, 1, 1));

    let first = month_start(2025, -25)
      .expect("start");
    assert_eq!(first, date(2022, 12, 1));
  }

  #[test]
  fn january_leading_days_come_from_december()
  {
    // January 2025 starts on a Wednesday.
    let cells = generate_grid(
      2025,
      0,
      date(2025, 1, 1)
    )
    .expect("grid");
    assert_eq!(
      first_weekday_index(date(
        2025, 1, 1
      )),
      3
    );
    assert_eq!(
      cells[..3]
        .iter()
        .map(|c| c.day)
        .collect::<Vec<_>>(),
      vec![29, 30, 31]
    );
    assert_eq!(
      cells[0].date,
      date(2024, 12, 29)
    );
  }

  #[test]
  fn today_is_flagged_once_and_never_past()
  {
    let today = date(2025, 10, 18);
    let cells =
      generate_grid(2025, 9, today)
        .expect("grid");

    let todays: Vec<_> = cells
      .iter()
      .filter(|c| c.is_today)
      .collect();
    assert_eq!(todays.len(), 1);
    assert_eq!(todays[0].day, 18);
    assert!(!todays[0].is_past);

    let past = cells
      .iter()
      .filter(|c| c.is_past)
      .count();
    assert_eq!(past, 17);
  }

  #[test]
  fn other_months_have_no_today() {
    let today = date(2025, 10, 18);
    let cells =
      generate_grid(2025, 10, today)
        .expect("grid");
    assert!(
      cells.iter().all(|c| !c.is_today)
    );
    assert!(
      cells.iter().all(|c| !c.is_past)
    );
  }

  #[test]
  fn padding_cells_are_never_marked() {
    // The leading cells of November 2025 are October days already past.
    let today = date(2025, 11, 20);
    let cells =
      generate_grid(2025, 10, today)
        .expect("grid");
    assert!(
      cells
        .iter()
        .filter(|c| !c.in_current_month)
        .all(|c| !c.is_past
          && !c.is_today)
    );
  }

  #[test]
  fn grid_is_deterministic() {
    let today = date(2025, 3, 3);
    let a = generate_grid(2025, 2, today)
      .expect("grid");
    let b = generate_grid(2025, 2, today)
      .expect("grid");
    assert_eq!(a, b);
  }

  #[test]
  fn rejects_years_outside_range() {
    let today = date(2025, 1, 1);
    let err =
      generate_grid(10_000, 0, today)
        .expect_err("year too large");
    assert_eq!(
      err,
      CalendarError::InvalidDate {
        year:  10_000,
        month: 0
      }
    );

    assert!(
      generate_grid(9999, 12, today)
        .is_err()
    );
    assert!(
      generate_grid(-9999, -1, today)
        .is_err()
    );
    assert!(
      generate_grid(
        2025,
        i64::MAX,
        today
      )
      .is_err()
    );
  }

  #[test]
  fn cursor_shift_overflow_is_an_error() {
    let cursor = MonthCursor::new(2025, 9)
      .expect("cursor");
    assert_eq!(
      cursor.shift(i64::MAX),
      Err(CalendarError::InvalidDate {
        year:  2025,
        month: i64::MAX
      })
    );
    assert!(cursor.shift(i64::MIN).is_err());
    assert!(
      cursor.shift(12 * 20_000).is_err()
    );
  }

  #[test]
  fn cursor_navigates_across_years() {
    let cursor = MonthCursor::new(2025, 0)
      .expect("cursor");
    let prev =
      cursor.previous().expect("prev");
    assert_eq!(prev.year(), 2024);
    assert_eq!(prev.month0(), 11);
    assert_eq!(prev.label(), "December 2024");

    let back = prev.next().expect("next");
    assert_eq!(back, cursor);

    let cursor = MonthCursor::containing(
      date(2025, 10, 18)
    )
    .expect("cursor");
    assert_eq!(cursor.label(), "October 2025");
    assert_eq!(
      cursor.first_day(),
      date(2025, 10, 1)
    );
  }
}
