use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{CalendarError, CalendarResult};
use crate::grid::MonthCursor;
use crate::platform::Platform;

/// A post scheduled for one day. `month` is zero-based.
///
/// `platform` keeps the tag exactly as the data source spelled it; it is
/// resolved against [`Platform`] only when an icon is drawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledPost {
    pub id: u64,
    pub day: u32,
    pub month: u32,
    pub year: i32,
    pub platform: String,
}

impl ScheduledPost {
    pub fn new(id: u64, year: i32, month: u32, day: u32, platform: Platform) -> Self {
        Self {
            id,
            day,
            month,
            year,
            platform: platform.tag().to_string(),
        }
    }

    #[must_use]
    pub fn date(&self) -> Option<NaiveDate> {
        self.month
            .checked_add(1)
            .and_then(|month| NaiveDate::from_ymd_opt(self.year, month, self.day))
    }

    #[must_use]
    pub fn falls_on(&self, date: NaiveDate) -> bool {
        self.day == date.day() && self.month == date.month0() && self.year == date.year()
    }
}

/// Posts for `date`, in source order.
pub fn posts_for_day(posts: &[ScheduledPost], date: NaiveDate) -> Vec<ScheduledPost> {
    posts.iter().filter(|p| p.falls_on(date)).cloned().collect()
}

/// The demo schedule the web calendar ships with (November 2025).
pub fn sample_posts() -> Vec<ScheduledPost> {
    use crate::platform::Platform::*;

    [
        (1, 8, Instagram),
        (2, 8, TikTok),
        (3, 11, Linkedin),
        (4, 11, X),
        (5, 18, Facebook),
        (6, 21, Youtube),
        (7, 21, Google),
        (8, 24, Threads),
        (9, 15, Facebook),
        (10, 15, Instagram),
        (11, 15, TikTok),
        (12, 15, Linkedin),
        (13, 15, X),
        (14, 15, Youtube),
    ]
    .into_iter()
    .map(|(id, day, platform)| ScheduledPost::new(id, 2025, 10, day, platform))
    .collect()
}

/// Checks ids are unique and every post names a real calendar day.
pub fn validate_posts(posts: &[ScheduledPost]) -> CalendarResult<()> {
    let mut seen = BTreeSet::new();
    for post in posts {
        if !seen.insert(post.id) {
            return Err(CalendarError::DuplicatePostId(post.id));
        }
        if post.date().is_none() {
            return Err(CalendarError::InvalidPostDate {
                id: post.id,
                year: post.year,
                month: post.month,
                day: post.day,
            });
        }
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct PostStore {
    pub source: Option<PathBuf>,
    posts: Vec<ScheduledPost>,
}

impl PostStore {
    pub fn from_posts(posts: Vec<ScheduledPost>) -> CalendarResult<Self> {
        validate_posts(&posts)?;
        Ok(Self {
            source: None,
            posts,
        })
    }

    pub fn sample() -> Self {
        Self {
            source: None,
            posts: sample_posts(),
        }
    }

    /// Reads a JSON array or JSON lines file.
    #[tracing::instrument(skip(path), fields(file = %path.display()))]
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let posts = parse_posts(&raw)
            .with_context(|| format!("failed parsing {}", path.display()))?;
        validate_posts(&posts).with_context(|| format!("invalid posts in {}", path.display()))?;

        info!(count = posts.len(), "loaded scheduled posts");
        Ok(Self {
            source: Some(path.to_path_buf()),
            posts,
        })
    }

    pub fn posts(&self) -> &[ScheduledPost] {
        &self.posts
    }

    pub fn for_day(&self, date: NaiveDate) -> Vec<ScheduledPost> {
        posts_for_day(&self.posts, date)
    }

    pub fn count_in_month(&self, cursor: &MonthCursor) -> usize {
        self.posts
            .iter()
            .filter(|p| p.year == cursor.year() && p.month == cursor.month0())
            .count()
    }

    /// Writes the posts as JSON lines, replacing `path` atomically.
    #[tracing::instrument(skip(self, path), fields(file = %path.display()))]
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        debug!(count = self.posts.len(), "saving posts atomically");

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp = NamedTempFile::new_in(dir)?;
        for post in &self.posts {
            let serialized = serde_json::to_string(post)?;
            writeln!(temp, "{serialized}")?;
        }
        temp.flush()?;

        temp.persist(path)
            .map_err(|err| anyhow!("failed to persist {}: {}", path.display(), err))?;
        Ok(())
    }
}

fn parse_posts(raw: &str) -> anyhow::Result<Vec<ScheduledPost>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(vec![]);
    }

    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).context("invalid JSON array of posts");
    }

    let mut out = Vec::new();
    for (idx, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let post: ScheduledPost = serde_json::from_str(line)
            .with_context(|| format!("invalid post on line {}", idx + 1))?;
        out.push(post);
    }
    Ok(out)
}
