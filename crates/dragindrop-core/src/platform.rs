use std::fmt;
use std::str::FromStr;

use crate::error::CalendarError;

/// The social platforms a post can be scheduled for.
///
/// The set is closed; every tag has a matching logo asset.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
)]
pub enum Platform {
  Facebook,
  Google,
  Instagram,
  Linkedin,
  Threads,
  TikTok,
  X,
  Youtube
}

impl Platform {
  pub const ALL: [Platform; 8] = [
    Platform::Facebook,
    Platform::Google,
    Platform::Instagram,
    Platform::Linkedin,
    Platform::Threads,
    Platform::TikTok,
    Platform::X,
    Platform::Youtube
  ];

  #[must_use]
  pub fn tag(self) -> &'static str {
    match self {
      | Platform::Facebook => "Facebook",
      | Platform::Google => "Google",
      | Platform::Instagram => {
        "Instagram"
      }
      | Platform::Linkedin => "Linkedin",
      | Platform::Threads => "Threads",
      | Platform::TikTok => "TikTok",
      | Platform::X => "X",
      | Platform::Youtube => "Youtube"
    }
  }

  /// File name of the logo shipped with the web front end.
  #[must_use]
  pub fn asset_name(
    self
  ) -> &'static str {
    match self {
      | Platform::Facebook => {
        "Facebook.webp"
      }
      | Platform::Google => {
        "Google.webp"
      }
      | Platform::Instagram => {
        "Instagram.webp"
      }
      | Platform::Linkedin => {
        "LinkedIn.webp"
      }
      | Platform::Threads => {
        "Threads.webp"
      }
      | Platform::TikTok => {
        "TikTok.webp"
      }
      | Platform::X => "X.webp",
      | Platform::Youtube => {
        "Youtube.webp"
      }
    }
  }

  /// Two-letter code used by the terminal renderer.
  #[must_use]
  pub fn glyph(self) -> &'static str {
    match self {
      | Platform::Facebook => "Fb",
      | Platform::Google => "Go",
      | Platform::Instagram => "Ig",
      | Platform::Linkedin => "In",
      | Platform::Threads => "Th",
      | Platform::TikTok => "Tk",
      | Platform::X => "X",
      | Platform::Youtube => "Yt"
    }
  }
}

impl fmt::Display for Platform {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.tag())
  }
}

/// Tags are matched exactly; `instagram` is not `Instagram`.
impl FromStr for Platform {
  type Err = String;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    Platform::ALL
      .into_iter()
      .find(|platform| {
        platform.tag() == s
      })
      .ok_or_else(|| s.to_string())
  }
}

/// Resolves a raw tag from a post into a platform.
pub fn resolve_platform(
  id: u64,
  tag: &str
) -> Result<Platform, CalendarError> {
  tag.parse::<Platform>().map_err(
    |tag| {
      tracing::warn!(
        id,
        tag = %tag,
        "unknown platform tag"
      );
      CalendarError::UnknownPlatform {
        id,
        tag
      }
    }
  )
}
