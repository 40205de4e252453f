use crate::{ProgressSnapshot, RecommendEnvelope, SendEnvelope};

/// A network call that failed or returned something undecodable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    pub detail: String,
}

impl TransportFailure {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User edited the message input box.
    InputChanged(String),
    /// User submitted the send form.
    Submitted,
    /// Reply to the send request.
    SendCompleted(Result<SendEnvelope, TransportFailure>),
    /// Job-init acknowledged (body ignored).
    JobInitCompleted(Result<(), TransportFailure>),
    /// One progress poll came back.
    JobPolled(Result<ProgressSnapshot, TransportFailure>),
    /// The inter-poll delay is over.
    PollDelayElapsed,
    /// Reply to the finalize (recommend) request.
    JobFinalized(Result<RecommendEnvelope, TransportFailure>),
}
