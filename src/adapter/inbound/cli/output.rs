//! Terminal output for the CLI.
//!
//! Every helper has two renderings. Human mode prints indented, coloured
//! text and honours `--quiet`. JSON mode prints one record per line shaped
//! as `{"type": ..., "payload": ...}` and never suppresses anything.

use std::fmt::Display;
use std::sync::{OnceLock, RwLock};

use owo_colors::OwoColorize;
use serde_json::{json, Value};

/// Global output flags, set once from the parsed command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    pub json: bool,
    pub quiet: bool,
    /// Extra detail requested with repeated `-v`.
    pub verbose: u8,
}

impl OutputConfig {
    #[must_use]
    pub const fn new(json: bool, quiet: bool, verbose: u8) -> Self {
        Self {
            json,
            quiet,
            verbose,
        }
    }
}

static SETTINGS: OnceLock<RwLock<OutputConfig>> = OnceLock::new();

fn settings() -> OutputConfig {
    let cell = SETTINGS.get_or_init(RwLock::default);
    match cell.read() {
        Ok(guard) => *guard,
        Err(poisoned) => *poisoned.into_inner(),
    }
}

pub fn configure(config: OutputConfig) {
    let cell = SETTINGS.get_or_init(RwLock::default);
    match cell.write() {
        Ok(mut guard) => *guard = config,
        Err(poisoned) => *poisoned.into_inner() = config,
    }
}

#[must_use]
pub fn is_json() -> bool {
    settings().json
}

#[must_use]
pub fn is_quiet() -> bool {
    settings().quiet
}

#[must_use]
pub fn verbosity() -> u8 {
    settings().verbose
}

/// Whether a human-mode line survives `--quiet`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Normal,
    Always,
}

fn record(kind: &str, payload: Value) -> Value {
    json!({ "type": kind, "payload": payload })
}

fn emit(kind: &str, level: Level, payload: Value, human: impl FnOnce()) {
    let config = settings();
    if config.json {
        println!("{}", record(kind, payload));
    } else if level == Level::Always || !config.quiet {
        human();
    }
}

pub fn header(version: &str) {
    emit(
        "header",
        Level::Normal,
        json!({ "app": "racewatch", "version": version }),
        || println!("{} {}\n", "racewatch".bold(), version.dimmed()),
    );
}

/// A label and its value, aligned in a column.
pub fn field(label: &str, value: impl Display) {
    let value = value.to_string();
    emit(
        "field",
        Level::Normal,
        json!({ "label": label, "value": value }),
        || println!("  {:<12} {}", label.dimmed(), value),
    );
}

pub fn section(title: &str) {
    emit("section", Level::Normal, json!({ "title": title }), || {
        println!("\n{}", title.bold());
    });
}

pub fn success(message: &str) {
    emit("success", Level::Normal, json!({ "message": message }), || {
        println!("  {} {}", "✓".green(), message);
    });
}

/// Printed even with `--quiet`.
pub fn warning(message: &str) {
    emit("warning", Level::Always, json!({ "message": message }), || {
        println!("  {} {}", "⚠".yellow(), message);
    });
}

/// Goes to stderr in both modes.
pub fn error(message: &str) {
    if is_json() {
        eprintln!("{}", record("error", json!({ "message": message })));
    } else {
        eprintln!("  {} {}", "×".red(), message);
    }
}

/// One line of the live event stream.
pub fn info(timestamp: &str, label: &str, message: &str) {
    emit(
        "info",
        Level::Normal,
        json!({ "timestamp": timestamp, "label": label, "message": message }),
        || println!("  {} {} {}", timestamp.dimmed(), label.cyan(), message),
    );
}

pub fn note(message: &str) {
    emit("note", Level::Normal, json!({ "message": message }), || {
        println!("  {}", message.dimmed());
    });
}

pub fn hint(message: &str) {
    emit("hint", Level::Normal, json!({ "message": message }), || {
        println!("  {}: {}", "hint".cyan().dimmed(), message.dimmed());
    });
}

/// A multi-line block, indented as a whole.
pub fn lines(content: &str) {
    emit("lines", Level::Normal, json!({ "content": content }), || {
        content.lines().for_each(|line| println!("  {line}"));
    });
}

/// Print a command-specific JSON document as-is.
pub fn json_output(value: Value) {
    println!("{value}");
}

fn paint(value: impl Display, style: fn(&String) -> String) -> String {
    let value = value.to_string();
    if is_json() {
        value
    } else {
        style(&value)
    }
}

pub fn negative(value: impl Display) -> String {
    paint(value, |text| text.red().to_string())
}

pub fn highlight(value: impl Display) -> String {
    paint(value, |text| text.cyan().to_string())
}

pub fn muted(value: impl Display) -> String {
    paint(value, |text| text.dimmed().to_string())
}
