use crate::job::JobUrls;

/// Server reply to a send request.
///
/// When `ok` is false every other field is void and must not be read.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SendEnvelope {
    pub ok: bool,
    pub bot_messages: Vec<String>,
    pub need_rag_progress: bool,
    pub job_urls: JobUrls,
    pub redirect_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Ready,
    Error,
    /// Any state string the client does not know; treated like `Pending`.
    Other(String),
}

impl JobState {
    pub fn from_wire(raw: &str) -> Self {
        match raw {
            "pending" => JobState::Pending,
            "ready" => JobState::Ready,
            "error" => JobState::Error,
            other => JobState::Other(other.to_string()),
        }
    }
}

/// Progress percentage, always within `0.0..=100.0`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Percent(f64);

impl Percent {
    pub const ZERO: Percent = Percent(0.0);

    pub fn clamped(value: f64) -> Self {
        if value.is_finite() {
            Percent(value.clamp(0.0, 100.0))
        } else {
            Percent::ZERO
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

/// One poll result. `None` fields were absent on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    pub state: JobState,
    pub percent: Option<Percent>,
    pub message: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecommendEnvelope {
    pub redirect_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::{JobState, Percent};

    #[test]
    fn percent_is_clamped_into_range() {
        assert_eq!(Percent::clamped(-5.0).value(), 0.0);
        assert_eq!(Percent::clamped(42.5).value(), 42.5);
        assert_eq!(Percent::clamped(250.0).value(), 100.0);
        assert_eq!(Percent::clamped(f64::NAN), Percent::ZERO);
        assert_eq!(Percent::clamped(f64::INFINITY), Percent::ZERO);
    }

    #[test]
    fn unknown_states_are_preserved() {
        assert_eq!(JobState::from_wire("ready"), JobState::Ready);
        assert_eq!(
            JobState::from_wire("queued"),
            JobState::Other("queued".to_string())
        );
    }
}
