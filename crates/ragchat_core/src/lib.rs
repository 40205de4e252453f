//! Ragchat core: pure chat/job state machine and view-model helpers.
mod effect;
mod envelope;
mod job;
mod msg;
pub mod phrases;
mod state;
mod transcript;
mod update;
mod view_model;

pub use effect::Effect;
pub use envelope::{JobState, Percent, ProgressSnapshot, RecommendEnvelope, SendEnvelope};
pub use job::{
    JobController, JobFailure, JobHandle, JobPhase, JobPolicy, JobSlot, JobStep, JobUrls,
};
pub use msg::{Msg, TransportFailure};
pub use state::{ChatSettings, ChatState};
pub use transcript::{Message, Role, Transcript};
pub use update::update;
pub use view_model::{BusyIndicator, ChatViewModel, ProgressView};
