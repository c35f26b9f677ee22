//! Terminal notifier for race transitions.

use owo_colors::OwoColorize;
use serde_json::json;

use crate::port::{Event, Notifier};

/// Prints one line per transition to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier {
    json: bool,
}

impl ConsoleNotifier {
    #[must_use]
    pub const fn new(json: bool) -> Self {
        Self { json }
    }

    /// Text for `event`, without trailing newline.
    #[must_use]
    pub fn render(&self, event: &Event) -> String {
        if self.json {
            return render_json(event).to_string();
        }
        match event {
            Event::RaceLive {
                round,
                name,
                message,
            } => {
                let mut line = format!("  {} {} (round {round})", "LIVE".red().bold(), name.bold());
                if let Some(message) = message {
                    line.push_str(&format!(" {}", message.dimmed()));
                }
                line
            }
            Event::RaceFinished { round, name } => {
                format!("  {} {} (round {round})", "FINISHED".green(), name)
            }
        }
    }
}

fn render_json(event: &Event) -> serde_json::Value {
    match event {
        Event::RaceLive {
            round,
            name,
            message,
        } => json!({
            "type": "race_live",
            "payload": { "round": round.get(), "name": name, "message": message },
        }),
        Event::RaceFinished { round, name } => json!({
            "type": "race_finished",
            "payload": { "round": round.get(), "name": name },
        }),
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, event: Event) {
        println!("{}", self.render(&event));
    }
}
