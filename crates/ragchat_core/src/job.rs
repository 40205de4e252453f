//! Job Progress Controller: init → poll loop → finalize, one job at a time.
use std::time::Duration;

use crate::envelope::{JobState, ProgressSnapshot, RecommendEnvelope};
use crate::msg::TransportFailure;
use crate::phrases;
use crate::Effect;

/// Job URLs as they arrive from an envelope or page defaults; any may be missing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobUrls {
    pub init_url: Option<String>,
    pub progress_url: Option<String>,
    pub recommend_url: Option<String>,
}

/// The complete set of URLs a job needs. Only built by [`JobHandle::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    init_url: String,
    progress_url: String,
    recommend_url: String,
}

impl JobHandle {
    /// Picks each URL from the envelope, falling back to the page default.
    /// Empty strings count as absent.
    pub fn resolve(envelope: &JobUrls, defaults: &JobUrls) -> Result<JobHandle, JobFailure> {
        let pick = |primary: &Option<String>, fallback: &Option<String>| {
            non_empty(primary).or_else(|| non_empty(fallback))
        };
        let init = pick(&envelope.init_url, &defaults.init_url);
        let progress = pick(&envelope.progress_url, &defaults.progress_url);
        let recommend = pick(&envelope.recommend_url, &defaults.recommend_url);

        match (init, progress, recommend) {
            (Some(init_url), Some(progress_url), Some(recommend_url)) => Ok(JobHandle {
                init_url,
                progress_url,
                recommend_url,
            }),
            (init, progress, recommend) => {
                let missing = [
                    ("init_url", init.is_none()),
                    ("progress_url", progress.is_none()),
                    ("recommend_url", recommend.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect();
                Err(JobFailure::Configuration { missing })
            }
        }
    }

    pub fn init_url(&self) -> &str {
        &self.init_url
    }

    pub fn progress_url(&self) -> &str {
        &self.progress_url
    }

    pub fn recommend_url(&self) -> &str {
        &self.recommend_url
    }
}

/// Trimmed value, or `None` when blank.
pub(crate) fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobPolicy {
    pub poll_interval: Duration,
    /// `None` polls until the server reports `ready` or `error`.
    pub max_polls: Option<u32>,
}

impl Default for JobPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            max_polls: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobFailure {
    Configuration { missing: Vec<&'static str> },
    Transport(TransportFailure),
    /// `state: "error"` from a poll, with the server's error text if any.
    Rejected(Option<String>),
    ResultMissing,
    AlreadyActive,
    PollBudgetExhausted { polls: u32 },
}

impl JobFailure {
    pub fn user_message(&self) -> String {
        match self {
            JobFailure::Configuration { .. } => phrases::JOB_URLS_MISSING.to_string(),
            JobFailure::Transport(_) => phrases::COMMUNICATION_FAILURE.to_string(),
            JobFailure::Rejected(detail) => format!(
                "{}{}",
                phrases::REMOTE_ERROR_PREFIX,
                detail.as_deref().unwrap_or_default()
            ),
            JobFailure::ResultMissing => phrases::RESULT_MISSING.to_string(),
            JobFailure::AlreadyActive => phrases::JOB_ALREADY_ACTIVE.to_string(),
            JobFailure::PollBudgetExhausted { .. } => phrases::POLL_BUDGET_EXHAUSTED.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    Initializing,
    /// A poll request is in flight; `polls` counts polls issued so far.
    Polling { polls: u32 },
    /// Between polls, waiting for the delay to elapse.
    Waiting { polls: u32 },
    Finalizing,
    Redirected,
    Errored,
}

impl JobPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobPhase::Redirected | JobPhase::Errored)
    }
}

/// What the controller wants done after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStep {
    Continue(Effect),
    Redirect(String),
    Fail(JobFailure),
    /// The input did not belong to the current phase and was dropped.
    Stale,
}

impl JobStep {
    fn is_terminal(&self) -> bool {
        matches!(self, JobStep::Redirect(_) | JobStep::Fail(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobController {
    handle: JobHandle,
    policy: JobPolicy,
    phase: JobPhase,
}

impl JobController {
    fn begin(handle: JobHandle, policy: JobPolicy) -> (Self, Effect) {
        let effect = Effect::InitJob {
            url: handle.init_url.clone(),
        };
        let controller = Self {
            handle,
            policy,
            phase: JobPhase::Initializing,
        };
        (controller, effect)
    }

    pub fn phase(&self) -> JobPhase {
        self.phase
    }

    pub fn handle(&self) -> &JobHandle {
        &self.handle
    }

    fn poll(&mut self, polls: u32) -> JobStep {
        self.phase = JobPhase::Polling { polls };
        JobStep::Continue(Effect::PollJob {
            url: self.handle.progress_url.clone(),
        })
    }

    fn fail(&mut self, failure: JobFailure) -> JobStep {
        self.phase = JobPhase::Errored;
        JobStep::Fail(failure)
    }

    fn on_init(&mut self, result: Result<(), TransportFailure>) -> JobStep {
        if self.phase != JobPhase::Initializing {
            return JobStep::Stale;
        }
        match result {
            Ok(()) => self.poll(1),
            Err(failure) => self.fail(JobFailure::Transport(failure)),
        }
    }

    fn on_snapshot(&mut self, result: Result<ProgressSnapshot, TransportFailure>) -> JobStep {
        let JobPhase::Polling { polls } = self.phase else {
            return JobStep::Stale;
        };
        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(failure) => return self.fail(JobFailure::Transport(failure)),
        };
        match snapshot.state {
            JobState::Ready => {
                self.phase = JobPhase::Finalizing;
                JobStep::Continue(Effect::FinalizeJob {
                    url: self.handle.recommend_url.clone(),
                })
            }
            JobState::Error => self.fail(JobFailure::Rejected(snapshot.error)),
            JobState::Pending | JobState::Other(_) => {
                self.phase = JobPhase::Waiting { polls };
                JobStep::Continue(Effect::Wait {
                    duration: self.policy.poll_interval,
                })
            }
        }
    }

    fn on_delay_elapsed(&mut self) -> JobStep {
        let JobPhase::Waiting { polls } = self.phase else {
            return JobStep::Stale;
        };
        match self.policy.max_polls {
            Some(max) if polls >= max => self.fail(JobFailure::PollBudgetExhausted { polls }),
            _ => self.poll(polls.saturating_add(1)),
        }
    }

    fn on_finalize(&mut self, result: Result<RecommendEnvelope, TransportFailure>) -> JobStep {
        if self.phase != JobPhase::Finalizing {
            return JobStep::Stale;
        }
        let envelope = match result {
            Ok(envelope) => envelope,
            Err(failure) => return self.fail(JobFailure::Transport(failure)),
        };
        match non_empty(&envelope.redirect_url) {
            Some(target) => {
                self.phase = JobPhase::Redirected;
                JobStep::Redirect(target)
            }
            None => self.fail(JobFailure::ResultMissing),
        }
    }
}

/// Holds at most one running [`JobController`] and refuses to start another.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobSlot {
    active: Option<JobController>,
    last_phase: Option<JobPhase>,
}

impl JobSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<&JobController> {
        self.active.as_ref()
    }

    /// Phase of the running job, or the terminal phase of the last one.
    pub fn phase(&self) -> Option<JobPhase> {
        self.active
            .as_ref()
            .map(JobController::phase)
            .or(self.last_phase)
    }

    /// Starts a job and returns the init request, or `AlreadyActive`.
    pub fn start(&mut self, handle: JobHandle, policy: JobPolicy) -> Result<Effect, JobFailure> {
        if self.active.is_some() {
            return Err(JobFailure::AlreadyActive);
        }
        let (controller, effect) = JobController::begin(handle, policy);
        self.active = Some(controller);
        self.last_phase = None;
        Ok(effect)
    }

    pub fn on_init(&mut self, result: Result<(), TransportFailure>) -> JobStep {
        self.advance(|job| job.on_init(result))
    }

    pub fn on_snapshot(&mut self, result: Result<ProgressSnapshot, TransportFailure>) -> JobStep {
        self.advance(|job| job.on_snapshot(result))
    }

    pub fn on_delay_elapsed(&mut self) -> JobStep {
        self.advance(JobController::on_delay_elapsed)
    }

    pub fn on_finalize(&mut self, result: Result<RecommendEnvelope, TransportFailure>) -> JobStep {
        self.advance(|job| job.on_finalize(result))
    }

    fn advance(&mut self, transition: impl FnOnce(&mut JobController) -> JobStep) -> JobStep {
        let Some(job) = self.active.as_mut() else {
            return JobStep::Stale;
        };
        let step = transition(job);
        if step.is_terminal() {
            self.last_phase = self.active.take().map(|job| job.phase);
        }
        step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(init: &str, progress: &str, recommend: &str) -> JobUrls {
        let some = |v: &str| (!v.is_empty()).then(|| v.to_string());
        JobUrls {
            init_url: some(init),
            progress_url: some(progress),
            recommend_url: some(recommend),
        }
    }

    fn pending() -> ProgressSnapshot {
        ProgressSnapshot {
            state: JobState::Pending,
            percent: None,
            message: None,
            error: None,
        }
    }

    #[test]
    fn resolve_prefers_envelope_and_falls_back_per_field() {
        let handle = JobHandle::resolve(&urls("/i", "", ""), &urls("/d/i", "/d/p", "/d/r"))
            .expect("complete handle");
        assert_eq!(handle.init_url(), "/i");
        assert_eq!(handle.progress_url(), "/d/p");
        assert_eq!(handle.recommend_url(), "/d/r");
    }

    #[test]
    fn resolve_names_every_missing_url() {
        let envelope = JobUrls {
            init_url: Some("  ".to_string()),
            ..urls("", "/p", "")
        };
        let err = JobHandle::resolve(&envelope, &JobUrls::default()).unwrap_err();
        assert_eq!(
            err,
            JobFailure::Configuration {
                missing: vec!["init_url", "recommend_url"]
            }
        );
    }

    #[test]
    fn slot_refuses_second_job_while_active() {
        let handle = JobHandle::resolve(&urls("/i", "/p", "/r"), &JobUrls::default()).unwrap();
        let mut slot = JobSlot::new();
        assert_eq!(
            slot.start(handle.clone(), JobPolicy::default()),
            Ok(Effect::InitJob {
                url: "/i".to_string()
            })
        );
        assert_eq!(
            slot.start(handle, JobPolicy::default()),
            Err(JobFailure::AlreadyActive)
        );
        assert_eq!(slot.phase(), Some(JobPhase::Initializing));
    }

    #[test]
    fn slot_is_released_on_terminal_step() {
        let handle = JobHandle::resolve(&urls("/i", "/p", "/r"), &JobUrls::default()).unwrap();
        let mut slot = JobSlot::new();
        slot.start(handle.clone(), JobPolicy::default()).unwrap();
        let step = slot.on_init(Err(TransportFailure::new("refused")));
        assert!(matches!(step, JobStep::Fail(JobFailure::Transport(_))));
        assert!(!slot.is_active());
        assert_eq!(slot.phase(), Some(JobPhase::Errored));
        assert!(slot.start(handle, JobPolicy::default()).is_ok());
    }

    #[test]
    fn poll_budget_stops_the_loop() {
        let handle = JobHandle::resolve(&urls("/i", "/p", "/r"), &JobUrls::default()).unwrap();
        let policy = JobPolicy {
            poll_interval: Duration::from_millis(1),
            max_polls: Some(2),
        };
        let mut slot = JobSlot::new();
        slot.start(handle, policy).unwrap();
        slot.on_init(Ok(()));
        slot.on_snapshot(Ok(pending()));
        assert!(matches!(slot.on_delay_elapsed(), JobStep::Continue(Effect::PollJob { .. })));
        slot.on_snapshot(Ok(pending()));
        assert_eq!(
            slot.on_delay_elapsed(),
            JobStep::Fail(JobFailure::PollBudgetExhausted { polls: 2 })
        );
    }

    #[test]
    fn out_of_phase_inputs_are_stale() {
        let handle = JobHandle::resolve(&urls("/i", "/p", "/r"), &JobUrls::default()).unwrap();
        let mut slot = JobSlot::new();
        assert_eq!(slot.on_delay_elapsed(), JobStep::Stale);
        slot.start(handle, JobPolicy::default()).unwrap();
        assert_eq!(slot.on_snapshot(Ok(pending())), JobStep::Stale);
        assert_eq!(slot.on_finalize(Ok(RecommendEnvelope::default())), JobStep::Stale);
        assert_eq!(slot.phase(), Some(JobPhase::Initializing));
    }

    #[test]
    fn poll_count_saturates_when_unbounded() {
        let handle = JobHandle::resolve(&urls("/i", "/p", "/r"), &JobUrls::default()).unwrap();
        let (mut job, _) = JobController::begin(handle, JobPolicy::default());
        job.phase = JobPhase::Waiting { polls: u32::MAX };
        assert_eq!(
            job.on_delay_elapsed(),
            JobStep::Continue(Effect::PollJob {
                url: "/p".to_string()
            })
        );
        assert_eq!(job.phase(), JobPhase::Polling { polls: u32::MAX });
    }

    #[test]
    fn rejected_message_includes_server_text() {
        let failure = JobFailure::Rejected(Some("index offline".to_string()));
        assert_eq!(failure.user_message(), "An error occurred: index offline");
        assert_eq!(JobFailure::Rejected(None).user_message(), "An error occurred: ");
    }
}
