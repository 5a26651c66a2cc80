use std::time::Duration;

use colored::{ColoredString, Colorize};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::model::Field;
use crate::query::SortDirection;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
    Ok,
}

impl Level {
    fn label(self) -> &'static str {
        match self {
            Level::Debug => "DBG",
            Level::Info => "INF",
            Level::Warn => "WRN",
            Level::Error => "ERR",
            Level::Ok => "OK",
        }
    }

    /// Minimum `-v` count for the level to be printed.
    fn min_verbosity(self) -> u8 {
        match self {
            Level::Debug => 2,
            Level::Info => 1,
            Level::Warn | Level::Error | Level::Ok => 0,
        }
    }
}

/// `[INF]`-style bracketed tag.
pub fn tag(level: Level) -> String {
    let label: ColoredString = match level {
        Level::Debug => level.label().bold().white(),
        Level::Info => level.label().bold().blue(),
        Level::Warn => level.label().bold().yellow(),
        Level::Error => level.label().bold().red(),
        Level::Ok => level.label().bold().green(),
    };
    format!("{}{}{}", "[".bold().white(), label, "]".bold().white())
}

/// Tagged stderr logger gated on the `-v` count.
#[derive(Clone, Copy, Debug, Default)]
pub struct Logger {
    verbosity: u8,
}

impl Logger {
    pub fn new(verbosity: u8) -> Self {
        Self { verbosity }
    }

    pub fn verbosity(&self) -> u8 {
        self.verbosity
    }

    pub fn enabled(&self, level: Level) -> bool {
        self.verbosity >= level.min_verbosity()
    }

    pub fn log(&self, level: Level, message: impl AsRef<str>) {
        if !self.enabled(level) {
            return;
        }
        eprintln!("{} {}", tag(level), message.as_ref());
    }

    pub fn debug(&self, message: impl AsRef<str>) {
        self.log(Level::Debug, message);
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.log(Level::Info, message);
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        self.log(Level::Warn, message);
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.log(Level::Error, message);
    }

    pub fn ok(&self, message: impl AsRef<str>) {
        self.log(Level::Ok, message);
    }

    /// `:: Label     : value` summary line, shown from `-v` up.
    pub fn kv(&self, label: &str, value: &str) {
        if self.enabled(Level::Info) {
            eprintln!("{}", format_kv_line(label, value));
        }
    }
}

pub fn format_kv_line(label: &str, value: &str) -> String {
    format!(":: {:<10}: {}", label, value)
}

/// Loading spinner on stderr; hidden automatically when stderr is not a terminal.
pub fn spinner(message: impl Into<String>) -> Result<ProgressBar, String> {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::with_template(":: {spinner} {msg} :: [{elapsed_precise}]")
            .map_err(|e| format!("failed to build progress bar style: {e}"))?
            .tick_chars("|/-\\ "),
    );
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(120));
    Ok(pb)
}

pub fn format_bool(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

pub fn format_opt_value<'a>(v: &'a str, default: &'a str) -> &'a str {
    if v.trim().is_empty() {
        default
    } else {
        v
    }
}

pub fn parse_sort_keys(values: &[String]) -> Result<Vec<Field>, String> {
    values
        .iter()
        .flat_map(|raw| raw.split(','))
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(Field::parse_sort_key)
        .collect()
}

pub fn parse_direction(value: &str) -> Result<SortDirection, String> {
    value.parse::<SortDirection>()
}

pub fn parse_threshold(value: f64) -> Result<f64, String> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is outside 0.0-1.0"))
    }
}

pub fn parse_url(value: &str) -> Result<reqwest::Url, String> {
    let trimmed = value.trim();
    let url = reqwest::Url::parse(trimmed).map_err(|e| format!("{e}"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("unsupported scheme '{other}'")),
    }
}
