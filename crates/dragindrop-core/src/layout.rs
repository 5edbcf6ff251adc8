//! Per-day icon layout with a "+N" overflow badge.
//!
//! The same posts are laid out once per breakpoint. With a limit of zero
//! the whole day collapses into a badge carrying the total count; with a
//! positive limit one slot is given up to the badge whenever the posts do
//! not fit, so icons plus badge never exceed the limit.

use std::fmt;
use std::str::FromStr;

use crate::error::{
  CalendarError,
  CalendarResult
};
use crate::platform::{
  Platform,
  resolve_platform
};
use crate::schedule::ScheduledPost;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum LayoutMode {
  BadgeOnly,
  Icons
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayLayout {
  pub shown:    Vec<ScheduledPost>,
  pub overflow: usize,
  pub mode:     LayoutMode
}

impl DayLayout {
  fn empty() -> Self {
    Self {
      shown:    vec![],
      overflow: 0,
      mode:     LayoutMode::Icons
    }
  }

  /// True when nothing is drawn for the day.
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.shown.is_empty()
      && self.overflow == 0
  }

  /// Text of the badge, if one is drawn.
  #[must_use]
  pub fn badge(&self) -> Option<String> {
    (self.overflow > 0)
      .then(|| format!("+{}", self.overflow))
  }

  /// Icons plus the badge, if any.
  #[must_use]
  pub fn glyph_count(&self) -> usize {
    self.shown.len()
      + usize::from(self.overflow > 0)
  }

  /// Resolves the platform of every shown post, in order.
  pub fn icons(
    &self
  ) -> CalendarResult<Vec<Platform>> {
    self
      .shown
      .iter()
      .map(|post| {
        resolve_platform(
          post.id,
          &post.platform
        )
      })
      .collect()
  }
}

#[tracing::instrument(skip(posts), fields(count = posts.len()))]
pub fn layout_day(
  posts: &[ScheduledPost],
  visible_limit: i64
) -> CalendarResult<DayLayout> {
  if visible_limit < 0 {
    return Err(
      CalendarError::InvalidLimit(
        visible_limit
      )
    );
  }

  if posts.is_empty() {
    return Ok(DayLayout::empty());
  }

  if visible_limit == 0 {
    return Ok(DayLayout {
      shown:    vec![],
      overflow: posts.len(),
      mode:     LayoutMode::BadgeOnly
    });
  }

  let limit = usize::try_from(
    visible_limit
  )
  .unwrap_or(usize::MAX);

  if posts.len() <= limit {
    return Ok(DayLayout {
      shown:    posts.to_vec(),
      overflow: 0,
      mode:     LayoutMode::Icons
    });
  }

  let visible = limit - 1;
  Ok(DayLayout {
    shown:    posts[..visible].to_vec(),
    overflow: posts.len() - visible,
    mode:     LayoutMode::Icons
  })
}

/// Screen-width classes observed in the web calendar.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
)]
pub enum Breakpoint {
  Mobile,
  Small,
  Medium,
  Large
}

impl Breakpoint {
  pub const ALL: [Breakpoint; 4] = [
    Breakpoint::Mobile,
    Breakpoint::Small,
    Breakpoint::Medium,
    Breakpoint::Large
  ];

  #[must_use]
  pub fn default_limit(self) -> i64 {
    match self {
      | Breakpoint::Mobile => 0,
      | Breakpoint::Small => 3,
      | Breakpoint::Medium => 4,
      | Breakpoint::Large => 6
    }
  }

  #[must_use]
  pub fn as_key(self) -> &'static str {
    match self {
      | Breakpoint::Mobile => "mobile",
      | Breakpoint::Small => "small",
      | Breakpoint::Medium => "medium",
      | Breakpoint::Large => "large"
    }
  }
}

impl fmt::Display for Breakpoint {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.as_key())
  }
}

impl FromStr for Breakpoint {
  type Err = anyhow::Error;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    let key = s.trim().to_ascii_lowercase();
    Breakpoint::ALL
      .into_iter()
      .find(|bp| bp.as_key() == key)
      .ok_or_else(|| {
        anyhow::anyhow!(
          "unknown breakpoint: {s} \
           (expected mobile, small, \
           medium or large)"
        )
      })
  }
}

/// Visible limits per breakpoint.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct BreakpointLimits {
  pub mobile: i64,
  pub small:  i64,
  pub medium: i64,
  pub large:  i64
}

impl Default for BreakpointLimits {
  fn default() -> Self {
    Self {
      mobile: Breakpoint::Mobile
        .default_limit(),
      small:  Breakpoint::Small
        .default_limit(),
      medium: Breakpoint::Medium
        .default_limit(),
      large:  Breakpoint::Large
        .default_limit()
    }
  }
}

impl BreakpointLimits {
  #[must_use]
  pub fn limit(
    &self,
    breakpoint: Breakpoint
  ) -> i64 {
    match breakpoint {
      | Breakpoint::Mobile => self.mobile,
      | Breakpoint::Small => self.small,
      | Breakpoint::Medium => self.medium,
      | Breakpoint::Large => self.large
    }
  }

  pub fn set(
    &mut self,
    breakpoint: Breakpoint,
    limit: i64
  ) {
    match breakpoint {
      | Breakpoint::Mobile => {
        self.mobile = limit
      }
      | Breakpoint::Small => {
        self.small = limit
      }
      | Breakpoint::Medium => {
        self.medium = limit
      }
      | Breakpoint::Large => {
        self.large = limit
      }
    }
  }
}

/// Lays out the same posts for every breakpoint.
pub fn layout_responsive(
  posts: &[ScheduledPost],
  limits: &BreakpointLimits
) -> CalendarResult<Vec<(Breakpoint, DayLayout)>>
{
  Breakpoint::ALL
    .into_iter()
    .map(|bp| {
      layout_day(posts, limits.limit(bp))
        .map(|layout| (bp, layout))
    })
    .collect()
}
