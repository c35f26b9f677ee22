//! Notification adapters.
//!
//! Implements the `port::Notifier` trait for the terminal.

pub mod console;

pub use console::ConsoleNotifier;
