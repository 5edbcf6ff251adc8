use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, anyhow};
use chrono::NaiveDate;
use tracing::{debug, info, instrument};

use crate::cli::Invocation;
use crate::config::Config;
use crate::datetime::{parse_day_expr, parse_month_expr};
use crate::layout::{Breakpoint, BreakpointLimits, layout_day, layout_responsive};
use crate::render::Renderer;
use crate::schedule::PostStore;

pub fn known_command_names() -> Vec<&'static str> {
    vec!["month", "day", "platforms", "export", "help", "version"]
}

pub fn expand_command_abbrev<'a>(token: &str, known: &[&'a str]) -> Option<&'a str> {
    if let Some(exact) = known.iter().copied().find(|name| *name == token) {
        return Some(exact);
    }

    let mut matches = known.iter().copied().filter(|name| name.starts_with(token));
    let first = matches.next()?;
    if matches.next().is_some() {
        None
    } else {
        Some(first)
    }
}

#[instrument(skip(store, cfg, renderer, inv, today), fields(command = %inv.command, today = %today))]
pub fn dispatch(
    store: &PostStore,
    cfg: &Config,
    renderer: &Renderer,
    inv: Invocation,
    today: NaiveDate,
) -> anyhow::Result<()> {
    debug!(args = ?inv.command_args, "dispatching command");

    match inv.command {
        "month" => cmd_month(store, cfg, renderer, &inv.command_args, today),
        "day" => cmd_day(store, cfg, renderer, &inv.command_args, today),
        "platforms" => renderer.print_platforms(),
        "export" => cmd_export(store, &inv.command_args),
        "help" => cmd_help(),
        "version" => {
            println!("dragindrop {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => Err(anyhow!("unknown command: {other}")),
    }
}

#[instrument(skip(store, cfg, renderer, args))]
fn cmd_month(
    store: &PostStore,
    cfg: &Config,
    renderer: &Renderer,
    args: &[String],
    today: NaiveDate,
) -> anyhow::Result<()> {
    info!("command month");

    let cursor = parse_month_expr(&args.join(" "), today)?;
    let cells = cursor.grid(today)?;
    let breakpoint = cfg.breakpoint()?;
    let limit = cfg.breakpoint_limits()?.limit(breakpoint);
    debug!(month = %cursor.label(), %breakpoint, limit, "rendering month");

    renderer.print_month(&cursor, &cells, store, limit)
}

#[instrument(skip(store, cfg, renderer, args))]
fn cmd_day(
    store: &PostStore,
    cfg: &Config,
    renderer: &Renderer,
    args: &[String],
    today: NaiveDate,
) -> anyhow::Result<()> {
    info!("command day");

    let (date_arg, limit_arg) = match args {
        [] => ("today", None),
        [date] => (date.as_str(), None),
        [date, limit] => (date.as_str(), Some(limit.as_str())),
        _ => return Err(anyhow!("usage: day [DATE] [LIMIT|BREAKPOINT]")),
    };

    let date = parse_day_expr(date_arg, today)?;
    let limits = cfg.breakpoint_limits()?;
    let (source, limit) = resolve_day_limit(cfg, &limits, limit_arg)?;

    let posts = store.for_day(date);
    let layout = layout_day(&posts, limit)?;
    let layouts = if posts.is_empty() {
        vec![]
    } else {
        layout_responsive(&posts, &limits)?
    };

    renderer.print_day(date, &(source, limit, layout), &layouts)
}

/// Resolves the limit for `day`: an explicit number, a breakpoint name,
/// or the configured breakpoint.
fn resolve_day_limit(
    cfg: &Config,
    limits: &BreakpointLimits,
    raw: Option<&str>,
) -> anyhow::Result<(String, i64)> {
    match raw {
        Some(raw) => {
            if let Ok(limit) = raw.trim().parse::<i64>() {
                return Ok(("explicit".to_string(), limit));
            }
            let bp: Breakpoint = raw.parse()?;
            Ok((format!("breakpoint {bp}"), limits.limit(bp)))
        }
        None => {
            let bp = cfg.breakpoint()?;
            Ok((format!("breakpoint {bp}"), limits.limit(bp)))
        }
    }
}

#[instrument(skip(store, args))]
fn cmd_export(store: &PostStore, args: &[String]) -> anyhow::Result<()> {
    info!("command export");

    match args {
        [] => {
            let mut out = io::stdout().lock();
            for post in store.posts() {
                writeln!(out, "{}", serde_json::to_string(post)?)?;
            }
            Ok(())
        }
        [path] => {
            let path = Path::new(path);
            store
                .save(path)
                .with_context(|| format!("failed to export posts to {}", path.display()))?;
            println!("Exported {} posts to {}.", store.posts().len(), path.display());
            Ok(())
        }
        _ => Err(anyhow!("usage: export [PATH]")),
    }
}

fn cmd_help() -> anyhow::Result<()> {
    println!(
        "usage: dragindrop [OPTIONS] [COMMAND] [ARGS]\n\n\
         commands:\n  \
         month [MONTH]               month grid (today, next, prev, +N, -N, YYYY-MM, oct 2025)\n  \
         day [DATE] [LIMIT|BP]       icon layout for one day (BP: mobile, small, medium, large)\n  \
         platforms                   known platform tags\n  \
         export [PATH]               write posts as JSON lines\n  \
         help | version\n\n\
         options: -v/-q, --rc KEY=VALUE, rc.KEY=VALUE, --calendarrc PATH, --posts PATH, --breakpoint NAME, --today DATE"
    );
    Ok(())
}
