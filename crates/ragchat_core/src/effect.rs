use std::time::Duration;

/// Work the runtime must perform on behalf of the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SendMessage { url: String, text: String },
    InitJob { url: String },
    PollJob { url: String },
    FinalizeJob { url: String },
    Wait { duration: Duration },
    Navigate { url: String },
}
