use ragchat_core::{update, ChatState, JobState, Msg, ProgressSnapshot, RecommendEnvelope};

#[test]
fn job_messages_without_a_job_change_nothing() {
    let state = ChatState::default();

    let stray = [
        Msg::PollDelayElapsed,
        Msg::JobInitCompleted(Ok(())),
        Msg::JobPolled(Ok(ProgressSnapshot {
            state: JobState::Ready,
            percent: None,
            message: None,
            error: None,
        })),
        Msg::JobFinalized(Ok(RecommendEnvelope {
            redirect_url: Some("/result/1".to_string()),
        })),
    ];

    for msg in stray {
        let (next, effects) = update(state.clone(), msg);
        assert_eq!(state, next);
        assert!(effects.is_empty());
    }
}
