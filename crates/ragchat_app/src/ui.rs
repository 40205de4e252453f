//! Terminal rendering of the chat.
use std::io::{self, Write};

use ragchat_core::{BusyIndicator, Message, ProgressView};
use ragchat_engine::UiSink;
use url::Url;

const BAR_WIDTH: usize = 24;

/// Prints transcript lines, the busy indicator, and progress to stdout.
pub struct TerminalSink {
    base_url: Url,
}

impl TerminalSink {
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }

    fn emit(&self, line: &str) {
        let mut out = io::stdout().lock();
        // A closed stdout leaves nothing to render into.
        let _ = writeln!(out, "{line}");
        let _ = out.flush();
    }
}

impl UiSink for TerminalSink {
    fn append_message(&self, message: &Message) {
        self.emit(&format_message(message));
    }

    fn set_busy(&self, busy: Option<&BusyIndicator>) {
        if let Some(busy) = busy {
            self.emit(&format!("… {} ({})", busy.title, busy.detail));
        }
    }

    fn set_progress(&self, progress: &ProgressView) {
        self.emit(&format_progress(progress));
    }

    fn navigate(&self, target: &str) {
        let resolved = resolve_target(&self.base_url, target);
        self.emit(&format!("Result ready: {resolved}"));
    }
}

pub fn format_message(message: &Message) -> String {
    format!("{}> {}", message.role().as_str(), message.text())
}

pub fn format_progress(progress: &ProgressView) -> String {
    let percent = progress.percent.value();
    let filled = ((percent / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!(
        "[{}{}] {:>3.0}% {}",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        percent,
        progress.label
    )
}

/// Resolves a server-supplied redirect for display; unparseable targets are shown verbatim.
pub fn resolve_target(base: &Url, target: &str) -> String {
    base.join(target)
        .map(|url| url.to_string())
        .unwrap_or_else(|_| target.to_string())
}
