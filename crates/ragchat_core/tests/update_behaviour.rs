use std::sync::Once;

use ragchat_core::{
    phrases, update, ChatSettings, ChatState, Effect, JobPhase, JobUrls, Msg, Role, SendEnvelope,
    TransportFailure,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(chat_logging::initialize_for_tests);
}

fn new_state() -> ChatState {
    ChatState::new(ChatSettings {
        post_url: "/chat/".to_string(),
        ..ChatSettings::default()
    })
}

fn submit(state: ChatState, input: &str) -> (ChatState, Vec<Effect>) {
    let (state, _) = update(state, Msg::InputChanged(input.to_string()));
    update(state, Msg::Submitted)
}

fn reply(state: ChatState, envelope: SendEnvelope) -> (ChatState, Vec<Effect>) {
    update(state, Msg::SendCompleted(Ok(envelope)))
}

fn transcript(state: &ChatState) -> Vec<(Role, String)> {
    state
        .transcript()
        .messages()
        .iter()
        .map(|m| (m.role(), m.text().to_string()))
        .collect()
}

#[test]
fn blank_input_produces_no_message_and_no_request() {
    init_logging();
    let (state, effects) = submit(new_state(), "   \n\t ");

    assert!(state.transcript().is_empty());
    assert!(effects.is_empty());
    assert!(state.busy().is_none());
}

#[test]
fn submit_appends_user_message_before_reply() {
    init_logging();
    let (mut state, effects) = submit(new_state(), "  find me a cafe  ");

    assert_eq!(
        transcript(&state),
        vec![(Role::User, "find me a cafe".to_string())]
    );
    assert_eq!(
        effects,
        vec![Effect::SendMessage {
            url: "/chat/".to_string(),
            text: "find me a cafe".to_string(),
        }]
    );
    let view = state.view();
    assert_eq!(view.input, "");
    assert!(view.busy.is_some());
    assert!(state.consume_dirty());
}

#[test]
fn submit_while_turn_in_flight_is_ignored() {
    init_logging();
    let (state, _) = submit(new_state(), "first");
    let (state, effects) = submit(state, "second");

    assert_eq!(state.transcript().len(), 1);
    assert!(effects.is_empty());
}

#[test]
fn rejected_reply_yields_one_generic_message_and_no_job() {
    init_logging();
    let (state, _) = submit(new_state(), "hello");
    let (state, effects) = reply(
        state,
        SendEnvelope {
            ok: false,
            bot_messages: vec!["should not show".to_string()],
            need_rag_progress: true,
            job_urls: JobUrls {
                init_url: Some("/i".to_string()),
                progress_url: Some("/p".to_string()),
                recommend_url: Some("/r".to_string()),
            },
            redirect_url: Some("/elsewhere".to_string()),
        },
    );

    assert_eq!(
        transcript(&state),
        vec![
            (Role::User, "hello".to_string()),
            (Role::Bot, phrases::GENERIC_FAILURE.to_string()),
        ]
    );
    assert!(effects.is_empty());
    assert!(!state.jobs().is_active());
    assert!(state.busy().is_none());
}

#[test]
fn plain_reply_appends_bot_messages_in_order() {
    init_logging();
    let (state, _) = submit(new_state(), "hello");
    let (state, effects) = reply(
        state,
        SendEnvelope {
            ok: true,
            bot_messages: vec!["Hi".to_string(), "Where to?".to_string(), "".to_string()],
            ..SendEnvelope::default()
        },
    );

    assert_eq!(
        transcript(&state),
        vec![
            (Role::User, "hello".to_string()),
            (Role::Bot, "Hi".to_string()),
            (Role::Bot, "Where to?".to_string()),
            (Role::Bot, "".to_string()),
        ]
    );
    assert!(effects.is_empty());
    assert_eq!(state.view().job, None);
    assert!(state.busy().is_none());
}

#[test]
fn redirect_without_job_navigates_immediately() {
    init_logging();
    let (state, _) = submit(new_state(), "show results");
    let (state, effects) = reply(
        state,
        SendEnvelope {
            ok: true,
            redirect_url: Some("/result/3".to_string()),
            ..SendEnvelope::default()
        },
    );

    assert_eq!(
        effects,
        vec![Effect::Navigate {
            url: "/result/3".to_string()
        }]
    );
    assert!(state.busy().is_none());
}

#[test]
fn redirect_target_is_trimmed() {
    init_logging();
    let (state, _) = submit(new_state(), "show results");
    let (_, effects) = reply(
        state,
        SendEnvelope {
            ok: true,
            redirect_url: Some("  /result/3\n".to_string()),
            ..SendEnvelope::default()
        },
    );

    assert_eq!(
        effects,
        vec![Effect::Navigate {
            url: "/result/3".to_string()
        }]
    );
}

#[test]
fn transport_failure_reports_communication_error_and_clears_busy() {
    init_logging();
    let (state, _) = submit(new_state(), "hello");
    let (state, effects) = update(
        state,
        Msg::SendCompleted(Err(TransportFailure::new("connection refused"))),
    );

    assert_eq!(
        transcript(&state).last(),
        Some(&(Role::Bot, phrases::COMMUNICATION_FAILURE.to_string()))
    );
    assert!(effects.is_empty());
    assert!(state.busy().is_none());

    // The chat stays usable.
    let (state, effects) = submit(state, "again");
    assert_eq!(state.transcript().len(), 3);
    assert_eq!(effects.len(), 1);
}

#[test]
fn job_without_urls_reports_configuration_error_without_request() {
    init_logging();
    let (state, _) = submit(new_state(), "recommend something");
    let (state, effects) = reply(
        state,
        SendEnvelope {
            ok: true,
            bot_messages: vec!["On it".to_string()],
            need_rag_progress: true,
            job_urls: JobUrls {
                init_url: Some("/i".to_string()),
                ..JobUrls::default()
            },
            ..SendEnvelope::default()
        },
    );

    assert!(effects.is_empty());
    assert_eq!(
        transcript(&state)[1..],
        [
            (Role::Bot, "On it".to_string()),
            (Role::Bot, phrases::JOB_URLS_MISSING.to_string()),
        ]
    );
    assert!(!state.jobs().is_active());
    assert!(state.busy().is_none());
}

#[test]
fn job_urls_fall_back_to_page_defaults() {
    init_logging();
    let state = ChatState::new(ChatSettings {
        post_url: "/chat/".to_string(),
        job_defaults: JobUrls {
            init_url: Some("/chat/rag/init/".to_string()),
            progress_url: Some("/chat/rag/progress/".to_string()),
            recommend_url: Some("/chat/rag/recommend/".to_string()),
        },
        ..ChatSettings::default()
    });
    let (state, _) = submit(state, "recommend something");
    let (state, effects) = reply(
        state,
        SendEnvelope {
            ok: true,
            need_rag_progress: true,
            job_urls: JobUrls {
                init_url: Some(String::new()),
                ..JobUrls::default()
            },
            redirect_url: Some("/ignored".to_string()),
            ..SendEnvelope::default()
        },
    );

    assert_eq!(
        effects,
        vec![Effect::InitJob {
            url: "/chat/rag/init/".to_string()
        }]
    );
    assert_eq!(state.view().job, Some(JobPhase::Initializing));
    let busy = state.busy().expect("job keeps the busy indicator");
    assert_eq!(busy.title, phrases::JOB_TITLE);
    let progress = state.progress().expect("progress reset");
    assert_eq!(progress.percent.value(), 0.0);
    assert_eq!(progress.label, phrases::JOB_PREPARING);
}
