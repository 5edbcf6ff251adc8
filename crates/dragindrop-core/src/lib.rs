pub mod cli;
pub mod commands;
pub mod config;
pub mod datetime;
pub mod error;
pub mod grid;
pub mod layout;
pub mod platform;
pub mod render;
pub mod schedule;

use std::ffi::OsString;

use anyhow::Context;
use clap::Parser;
use tracing::{
  debug,
  info
};

pub use error::{
  CalendarError,
  CalendarResult
};
pub use grid::{
  CalendarCell,
  MonthCursor,
  generate_grid
};
pub use layout::{
  Breakpoint,
  DayLayout,
  LayoutMode,
  layout_day
};
pub use platform::Platform;
pub use schedule::ScheduledPost;

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let (args, positional_rc) =
    cli::split_rc_args(&raw_args);
  let cli = cli::GlobalCli::parse_from(args);

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting dragindrop CLI"
  );
  debug!(
    ?positional_rc,
    "positional rc overrides"
  );

  let mut cfg = config::Config::load(
    cli.calendarrc.as_deref()
  )?;
  cfg.apply_overrides(
    positional_rc
      .into_iter()
      .chain(cli.config_overrides())
  );

  let today = match cli.reference_date()? {
    | Some(date) => date,
    | None => {
      datetime::today_in_project_timezone()
    }
  };

  let posts_path = cli
    .posts
    .clone()
    .or_else(|| cfg.posts_location());
  let store = match posts_path {
    | Some(path) => {
      schedule::PostStore::open(&path)
        .with_context(|| {
          format!(
            "failed to open posts at {}",
            path.display()
          )
        })?
    }
    | None => {
      debug!(
        "no posts file configured; \
         using sample schedule"
      );
      schedule::PostStore::sample()
    }
  };

  let renderer =
    render::Renderer::new(&cfg)?;
  let inv = cli::Invocation::parse(
    &cfg, cli.rest
  )?;

  commands::dispatch(
    &store, &cfg, &renderer, inv, today
  )?;

  info!("done");
  Ok(())
}
