//! Terminal spinners shown while a request is outstanding.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Braille dots.
const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

fn style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .tick_chars(TICK_CHARS)
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Animated spinner on stderr. Hidden automatically when stderr is not a
/// terminal, so piped output stays clean.
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(style());
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Spinner shown while the assistant composes a reply.
pub fn reply_spinner() -> ProgressBar {
    spinner("Waiting for reply...")
}

/// Remove the spinner line entirely.
pub fn finish_clear(pb: &ProgressBar) {
    pb.finish_and_clear();
}
