use crate::phrases;
use crate::view_model::{BusyIndicator, ChatViewModel, ProgressView};
use crate::{JobPolicy, JobSlot, JobUrls, Percent, ProgressSnapshot, Role, Transcript};

/// Page-level wiring: where to send messages and the fallback job URLs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChatSettings {
    pub post_url: String,
    pub job_defaults: JobUrls,
    pub policy: JobPolicy,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChatState {
    settings: ChatSettings,
    input: String,
    transcript: Transcript,
    busy: Option<BusyIndicator>,
    progress: Option<ProgressView>,
    jobs: JobSlot,
    dirty: bool,
}

impl ChatState {
    pub fn new(settings: ChatSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn view(&self) -> ChatViewModel {
        ChatViewModel {
            input: self.input.clone(),
            messages: self.transcript.messages().to_vec(),
            busy: self.busy.clone(),
            progress: self.progress.clone(),
            job: self.jobs.phase(),
            dirty: self.dirty,
        }
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn busy(&self) -> Option<&BusyIndicator> {
        self.busy.as_ref()
    }

    pub fn progress(&self) -> Option<&ProgressView> {
        self.progress.as_ref()
    }

    pub fn jobs(&self) -> &JobSlot {
        &self.jobs
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Returns whether anything visible changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn jobs_mut(&mut self) -> &mut JobSlot {
        &mut self.jobs
    }

    pub(crate) fn set_input(&mut self, text: String) {
        if self.input != text {
            self.input = text;
            self.dirty = true;
        }
    }

    pub(crate) fn clear_input(&mut self) {
        self.set_input(String::new());
    }

    pub(crate) fn append(&mut self, role: Role, text: impl Into<String>) {
        self.transcript.append(role, text);
        self.dirty = true;
    }

    pub(crate) fn begin_turn(&mut self) {
        self.busy = Some(BusyIndicator {
            title: phrases::SENDING_TITLE.to_string(),
            detail: phrases::SENDING_DETAIL.to_string(),
        });
        self.dirty = true;
    }

    pub(crate) fn begin_job_display(&mut self) {
        self.busy = Some(BusyIndicator {
            title: phrases::JOB_TITLE.to_string(),
            detail: phrases::JOB_DETAIL.to_string(),
        });
        self.progress = Some(ProgressView {
            percent: Percent::ZERO,
            label: phrases::JOB_PREPARING.to_string(),
        });
        self.dirty = true;
    }

    /// Fields absent from the snapshot keep their previously shown value.
    pub(crate) fn apply_snapshot(&mut self, snapshot: &ProgressSnapshot) {
        let progress = self.progress.get_or_insert_with(ProgressView::default);
        if let Some(percent) = snapshot.percent {
            progress.percent = percent;
        }
        if let Some(message) = &snapshot.message {
            progress.label = message.clone();
        }
        self.dirty = true;
    }

    pub(crate) fn end_turn(&mut self) {
        if self.busy.take().is_some() {
            self.dirty = true;
        }
    }
}
