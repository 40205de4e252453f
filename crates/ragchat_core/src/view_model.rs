use crate::{JobPhase, Message, Percent};

/// Busy indicator shown while a turn is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusyIndicator {
    pub title: String,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgressView {
    pub percent: Percent,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChatViewModel {
    pub input: String,
    pub messages: Vec<Message>,
    pub busy: Option<BusyIndicator>,
    pub progress: Option<ProgressView>,
    pub job: Option<JobPhase>,
    pub dirty: bool,
}
