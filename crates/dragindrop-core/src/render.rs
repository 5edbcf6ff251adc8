use std::io::{self, IsTerminal, Write};

use anyhow::anyhow;
use chrono::NaiveDate;
use unicode_width::UnicodeWidthStr;

use crate::config::Config;
use crate::grid::{CalendarCell, GRID_COLUMNS, MonthCursor, WEEKDAY_LONG, WEEKDAY_SHORT};
use crate::layout::{Breakpoint, DayLayout, LayoutMode, layout_day};
use crate::platform::Platform;
use crate::schedule::PostStore;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
    long_labels: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let color_cfg = cfg.get("color").unwrap_or_else(|| "on".to_string());
        let color = match color_cfg.to_ascii_lowercase().as_str() {
            "on" | "yes" | "true" | "1" => io::stdout().is_terminal(),
            "off" | "no" | "false" | "0" => false,
            other => return Err(anyhow!("invalid color setting: {other}")),
        };

        let labels = cfg.get("week.labels").unwrap_or_else(|| "short".to_string());
        let long_labels = match labels.to_ascii_lowercase().as_str() {
            "short" => false,
            "long" => true,
            other => return Err(anyhow!("invalid week.labels setting: {other}")),
        };

        Ok(Self { color, long_labels })
    }

    /// A renderer that never emits escape codes.
    pub fn plain() -> Self {
        Self {
            color: false,
            long_labels: false,
        }
    }

    #[tracing::instrument(skip(self, cells, store), fields(month = %cursor.label()))]
    pub fn print_month(
        &self,
        cursor: &MonthCursor,
        cells: &[CalendarCell],
        store: &PostStore,
        limit: i64,
    ) -> anyhow::Result<()> {
        let out = io::stdout().lock();
        self.write_month(out, cursor, cells, store, limit)
    }

    /// Writes the month as a 7-column table, two lines per week: day
    /// numbers, then each day's icons and badge.
    pub fn write_month<W: Write>(
        &self,
        mut out: W,
        cursor: &MonthCursor,
        cells: &[CalendarCell],
        store: &PostStore,
        limit: i64,
    ) -> anyhow::Result<()> {
        writeln!(out, "{}", self.paint(&cursor.label().to_uppercase(), "1"))?;
        writeln!(out)?;

        let labels = if self.long_labels {
            WEEKDAY_LONG
        } else {
            WEEKDAY_SHORT
        };
        let headers = labels.iter().map(|l| l.to_string()).collect();

        let mut rows = Vec::new();
        for week in cells.chunks(GRID_COLUMNS) {
            let mut days = Vec::with_capacity(GRID_COLUMNS);
            let mut glyphs = Vec::with_capacity(GRID_COLUMNS);

            for cell in week {
                days.push(self.day_label(cell));
                if cell.in_current_month {
                    let posts = store.for_day(cell.date);
                    let layout = layout_day(&posts, limit)?;
                    glyphs.push(self.layout_glyphs(&layout)?);
                } else {
                    glyphs.push(String::new());
                }
            }

            rows.push(days);
            rows.push(glyphs);
        }

        write_table(&mut out, headers, rows)?;

        writeln!(
            out,
            "\n{} posts scheduled this month",
            store.count_in_month(cursor)
        )?;
        Ok(())
    }

    #[tracing::instrument(skip(self, layouts, chosen))]
    pub fn print_day(
        &self,
        date: NaiveDate,
        chosen: &(String, i64, DayLayout),
        layouts: &[(Breakpoint, DayLayout)],
    ) -> anyhow::Result<()> {
        let out = io::stdout().lock();
        self.write_day(out, date, chosen, layouts)
    }

    pub fn write_day<W: Write>(
        &self,
        mut out: W,
        date: NaiveDate,
        chosen: &(String, i64, DayLayout),
        layouts: &[(Breakpoint, DayLayout)],
    ) -> anyhow::Result<()> {
        let (source, limit, layout) = chosen;

        writeln!(out, "{}", self.paint(&date.format("%A, %Y-%m-%d").to_string(), "1"))?;

        if layout.is_empty() {
            writeln!(out, "No posts scheduled.")?;
        } else {
            let mode = match layout.mode {
                LayoutMode::BadgeOnly => "badge only",
                LayoutMode::Icons => "icons",
            };
            writeln!(out, "layout    {mode} (limit {limit}, {source})")?;

            let icons = layout.icons()?;
            let rows = layout
                .shown
                .iter()
                .zip(icons)
                .map(|(post, platform)| {
                    vec![
                        self.paint(&post.id.to_string(), "33"),
                        platform.tag().to_string(),
                        platform.glyph().to_string(),
                        platform.asset_name().to_string(),
                    ]
                })
                .collect::<Vec<_>>();

            if !rows.is_empty() {
                writeln!(out)?;
                write_table(
                    &mut out,
                    vec![
                        "ID".to_string(),
                        "Platform".to_string(),
                        "Icon".to_string(),
                        "Asset".to_string(),
                    ],
                    rows,
                )?;
            }

            if let Some(badge) = layout.badge() {
                writeln!(out, "badge     {badge}")?;
            }
        }

        if !layouts.is_empty() {
            writeln!(out)?;
            let rows = layouts
                .iter()
                .map(|(bp, layout)| {
                    vec![
                        bp.to_string(),
                        layout.shown.len().to_string(),
                        layout.badge().unwrap_or_default(),
                    ]
                })
                .collect();
            write_table(
                &mut out,
                vec![
                    "Breakpoint".to_string(),
                    "Icons".to_string(),
                    "Badge".to_string(),
                ],
                rows,
            )?;
        }

        Ok(())
    }

    pub fn print_platforms(&self) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        let rows = Platform::ALL
            .iter()
            .map(|p| {
                vec![
                    p.tag().to_string(),
                    p.glyph().to_string(),
                    p.asset_name().to_string(),
                ]
            })
            .collect();
        write_table(
            &mut out,
            vec!["Tag".to_string(), "Icon".to_string(), "Asset".to_string()],
            rows,
        )
    }

    fn day_label(&self, cell: &CalendarCell) -> String {
        let text = cell.day.to_string();
        if !cell.in_current_month {
            self.paint(&text, "90")
        } else if cell.is_today {
            self.paint(&format!("[{text}]"), "1;36")
        } else if cell.is_past {
            self.paint(&text, "2")
        } else {
            text
        }
    }

    fn layout_glyphs(&self, layout: &DayLayout) -> anyhow::Result<String> {
        let mut parts: Vec<String> = layout
            .icons()?
            .into_iter()
            .map(|p| p.glyph().to_string())
            .collect();
        if let Some(badge) = layout.badge() {
            parts.push(self.paint(&badge, "33"));
        }
        Ok(parts.join(" "))
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate().take(column_count) {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for idx in 0..column_count {
        write!(writer, "{:width$} ", headers[idx], width = widths[idx])?;
    }
    writeln!(writer)?;

    for width in &widths {
        write!(writer, "{:-<width$} ", "", width = *width)?;
    }
    writeln!(writer)?;

    for row in rows {
        for idx in 0..column_count {
            let cell = row.get(idx).map(String::as_str).unwrap_or("");
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}
