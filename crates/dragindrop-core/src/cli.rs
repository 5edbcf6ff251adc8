use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, anyhow};
use chrono::NaiveDate;
use clap::{ArgAction, Parser};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use crate::commands::{expand_command_abbrev, known_command_names};
use crate::config::Config;

/// One `KEY=VALUE` config override; a leading `rc.` is accepted and dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RcOverride {
    pub key: String,
    pub value: String,
}

impl std::str::FromStr for RcOverride {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (k, v) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got: {s}"))?;
        let key = k.trim();
        let key = key.strip_prefix("rc.").unwrap_or(key);
        if key.is_empty() {
            return Err(anyhow!("empty config key in override: {s}"));
        }
        Ok(Self {
            key: key.to_string(),
            value: v.trim().to_string(),
        })
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "dragindrop",
    version,
    about = "DragInDrop: month calendar of scheduled social posts",
    disable_help_subcommand = true,
    arg_required_else_help = false
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count)]
    pub quiet: u8,

    #[arg(
        long = "rc",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<RcOverride>()),
        action = ArgAction::Append
    )]
    pub rc_overrides: Vec<RcOverride>,

    #[arg(long = "calendarrc")]
    pub calendarrc: Option<PathBuf>,

    /// JSON or JSON-lines file of scheduled posts.
    #[arg(long = "posts")]
    pub posts: Option<PathBuf>,

    /// Screen class used for cell layout (mobile, small, medium, large).
    #[arg(long = "breakpoint")]
    pub breakpoint: Option<String>,

    /// Reference date (YYYY-MM-DD) instead of the clock.
    #[arg(long = "today")]
    pub today: Option<String>,

    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub rest: Vec<OsString>,
}

impl GlobalCli {
    /// Config overrides from flags, in the order they apply.
    /// `--breakpoint` goes last so it wins over `--rc breakpoint=...`.
    pub fn config_overrides(&self) -> Vec<(String, String)> {
        let mut out: Vec<(String, String)> = self
            .rc_overrides
            .iter()
            .map(|kv| (kv.key.clone(), kv.value.clone()))
            .collect();
        if let Some(bp) = &self.breakpoint {
            out.push(("breakpoint".to_string(), bp.clone()));
        }
        out
    }

    /// The `--today` date, if one was given.
    pub fn reference_date(&self) -> anyhow::Result<Option<NaiveDate>> {
        self.today
            .as_deref()
            .map(|raw| {
                NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                    .with_context(|| format!("invalid --today value: {raw}"))
            })
            .transpose()
    }
}

/// Default filter directive for the `-v`/`-q` counts. Quiet wins.
pub fn log_level(verbose: u8, quiet: u8) -> &'static str {
    match (quiet, verbose) {
        (2.., _) => "error",
        (1, _) | (0, 0) => "warn",
        (0, 1) => "info",
        (0, 2) => "debug",
        (0, _) => "trace",
    }
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level(verbose, quiet)))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

/// Splits positional `rc.KEY=VALUE` tokens off the command line.
///
/// Returns the remaining arguments (program name included) and the
/// overrides with the `rc.` prefix removed.
#[tracing::instrument(skip_all, fields(count = raw.len()))]
pub fn split_rc_args(raw: &[OsString]) -> (Vec<OsString>, Vec<(String, String)>) {
    let mut args = Vec::with_capacity(raw.len());
    let mut overrides = Vec::new();

    for (idx, arg) in raw.iter().enumerate() {
        let parsed = (idx > 0)
            .then(|| arg.to_str())
            .flatten()
            .filter(|s| s.starts_with("rc."))
            .and_then(|s| s.parse::<RcOverride>().ok());

        match parsed {
            Some(kv) => {
                debug!(key = %kv.key, value = %kv.value, "captured positional rc override");
                overrides.push((kv.key, kv.value));
            }
            None => args.push(arg.clone()),
        }
    }

    (args, overrides)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: &'static str,
    pub command_args: Vec<String>,
}

impl Invocation {
    /// Picks the command from the first term, falling back to
    /// `default.command`. A default that names no command is an error.
    #[tracing::instrument(skip(cfg, rest))]
    pub fn parse(cfg: &Config, rest: Vec<OsString>) -> anyhow::Result<Self> {
        let known = known_command_names();
        let tokens: Vec<String> = rest
            .into_iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();

        if let Some(first) = tokens.first()
            && let Some(command) = expand_command_abbrev(first, &known)
        {
            debug!(token = %first, command, "resolved command token");
            return Ok(Self {
                command,
                command_args: tokens[1..].to_vec(),
            });
        }

        let configured = cfg
            .get("default.command")
            .unwrap_or_else(|| "month".to_string());
        let command = expand_command_abbrev(configured.trim(), &known)
            .ok_or_else(|| anyhow!("default.command names no command: {configured}"))?;

        if tokens.is_empty() {
            debug!(command, "no explicit command, using default");
        } else {
            warn!(command, "no command detected, passing all terms to the default command");
        }
        Ok(Self {
            command,
            command_args: tokens,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;

    use chrono::NaiveDate;
    use clap::Parser;

    use super::{GlobalCli, Invocation, RcOverride, log_level, split_rc_args};
    use crate::config::Config;

    fn os(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn positional_rc_overrides_are_extracted() {
        let (args, overrides) =
            split_rc_args(&os(&["dragindrop", "rc.color=off", "month", "rc.breakpoint=small"]));
        assert_eq!(args, os(&["dragindrop", "month"]));
        assert_eq!(
            overrides,
            vec![
                ("color".to_string(), "off".to_string()),
                ("breakpoint".to_string(), "small".to_string()),
            ]
        );
    }

    #[test]
    fn rc_tokens_without_value_stay_positional() {
        let (args, overrides) = split_rc_args(&os(&["dragindrop", "rc.color", "rc.=x"]));
        assert_eq!(args, os(&["dragindrop", "rc.color", "rc.=x"]));
        assert!(overrides.is_empty());
    }

    #[test]
    fn override_flag_accepts_optional_prefix() {
        assert_eq!(
            "rc.color = off".parse::<RcOverride>().expect("override"),
            RcOverride {
                key: "color".to_string(),
                value: "off".to_string(),
            }
        );
        assert!("color".parse::<RcOverride>().is_err());
    }

    #[test]
    fn breakpoint_flag_overrides_rc_flag() {
        let cli = GlobalCli::parse_from(os(&[
            "dragindrop",
            "--rc",
            "breakpoint=mobile",
            "--breakpoint",
            "small",
            "--today",
            "2025-11-15",
            "day",
        ]));
        assert_eq!(
            cli.config_overrides(),
            vec![
                ("breakpoint".to_string(), "mobile".to_string()),
                ("breakpoint".to_string(), "small".to_string()),
            ]
        );
        assert_eq!(
            cli.reference_date().expect("date"),
            NaiveDate::from_ymd_opt(2025, 11, 15)
        );
        assert_eq!(cli.rest, os(&["day"]));
    }

    #[test]
    fn bad_reference_date_is_an_error() {
        let cli = GlobalCli::parse_from(os(&["dragindrop", "--today", "15/11/2025"]));
        assert!(cli.reference_date().is_err());
    }

    #[test]
    fn quiet_wins_over_verbose() {
        assert_eq!(log_level(0, 0), "warn");
        assert_eq!(log_level(1, 0), "info");
        assert_eq!(log_level(2, 0), "debug");
        assert_eq!(log_level(5, 0), "trace");
        assert_eq!(log_level(3, 1), "warn");
        assert_eq!(log_level(0, 2), "error");
    }

    #[test]
    fn abbreviated_commands_expand() {
        let cfg = Config::default();
        let inv = Invocation::parse(&cfg, os(&["plat"])).expect("parse");
        assert_eq!(inv.command, "platforms");

        let inv = Invocation::parse(&cfg, os(&["d", "2025-11-15", "4"])).expect("parse");
        assert_eq!(inv.command, "day");
        assert_eq!(inv.command_args, vec!["2025-11-15", "4"]);
    }

    #[test]
    fn unknown_terms_go_to_default_command() {
        let cfg = Config::default();
        let inv = Invocation::parse(&cfg, os(&["2025-10"])).expect("parse");
        assert_eq!(inv.command, "month");
        assert_eq!(inv.command_args, vec!["2025-10"]);

        let inv = Invocation::parse(&cfg, vec![]).expect("parse");
        assert_eq!(inv.command, "month");
        assert!(inv.command_args.is_empty());
    }

    #[test]
    fn default_command_must_name_a_command() {
        let mut cfg = Config::default();
        cfg.apply_overrides([("default.command".to_string(), "plat".to_string())]);
        let inv = Invocation::parse(&cfg, vec![]).expect("parse");
        assert_eq!(inv.command, "platforms");

        cfg.apply_overrides([("default.command".to_string(), "agenda".to_string())]);
        assert!(Invocation::parse(&cfg, vec![]).is_err());
    }
}
