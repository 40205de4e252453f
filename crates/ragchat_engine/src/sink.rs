use ragchat_core::{BusyIndicator, Message, ProgressView};

/// The UI affordances the chat session drives.
///
/// Implementations render into whatever regions they own; a sink without a
/// transcript region (or progress bar) simply ignores the matching call.
pub trait UiSink: Send + Sync {
    /// Render a newly appended message and scroll it into view.
    fn append_message(&self, message: &Message);

    /// Show (`Some`) or clear (`None`) the busy indicator.
    fn set_busy(&self, busy: Option<&BusyIndicator>);

    fn set_progress(&self, progress: &ProgressView);

    /// Leave the chat for `target`, usually a result page.
    fn navigate(&self, target: &str);
}
