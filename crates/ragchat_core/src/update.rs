use crate::job::{non_empty, JobStep};
use crate::{
    phrases, ChatState, Effect, JobFailure, JobHandle, JobPhase, Msg, Role, SendEnvelope,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: ChatState, msg: Msg) -> (ChatState, Vec<Effect>) {
    let effects = match msg {
        Msg::InputChanged(text) => {
            state.set_input(text);
            Vec::new()
        }
        Msg::Submitted => {
            let text = state.input().trim().to_string();
            // Blank input and submits during an in-flight turn are dropped silently.
            if text.is_empty() || state.busy().is_some() {
                return (state, Vec::new());
            }
            state.append(Role::User, text.clone());
            state.clear_input();
            state.begin_turn();
            vec![Effect::SendMessage {
                url: state.settings().post_url.clone(),
                text,
            }]
        }
        Msg::SendCompleted(Ok(envelope)) => interpret_reply(&mut state, envelope),
        Msg::SendCompleted(Err(_)) => {
            state.append(Role::Bot, phrases::COMMUNICATION_FAILURE);
            state.end_turn();
            Vec::new()
        }
        Msg::JobInitCompleted(result) => {
            let step = state.jobs_mut().on_init(result);
            apply_job_step(&mut state, step)
        }
        Msg::JobPolled(result) => {
            let polling = matches!(state.jobs().phase(), Some(JobPhase::Polling { .. }));
            if let (true, Ok(snapshot)) = (polling, &result) {
                state.apply_snapshot(snapshot);
            }
            let step = state.jobs_mut().on_snapshot(result);
            apply_job_step(&mut state, step)
        }
        Msg::PollDelayElapsed => {
            let step = state.jobs_mut().on_delay_elapsed();
            apply_job_step(&mut state, step)
        }
        Msg::JobFinalized(result) => {
            let step = state.jobs_mut().on_finalize(result);
            apply_job_step(&mut state, step)
        }
    };

    (state, effects)
}

fn interpret_reply(state: &mut ChatState, envelope: SendEnvelope) -> Vec<Effect> {
    if !envelope.ok {
        state.append(Role::Bot, phrases::GENERIC_FAILURE);
        state.end_turn();
        return Vec::new();
    }

    for message in envelope.bot_messages {
        state.append(Role::Bot, message);
    }

    if envelope.need_rag_progress {
        let policy = state.settings().policy;
        let started = JobHandle::resolve(&envelope.job_urls, &state.settings().job_defaults)
            .and_then(|handle| state.jobs_mut().start(handle, policy));
        return match started {
            Ok(effect) => {
                state.begin_job_display();
                vec![effect]
            }
            Err(failure) => {
                state.append(Role::Bot, failure.user_message());
                // The running job still owns the busy indicator.
                if failure != JobFailure::AlreadyActive {
                    state.end_turn();
                }
                Vec::new()
            }
        };
    }

    state.end_turn();
    match non_empty(&envelope.redirect_url) {
        Some(url) => vec![Effect::Navigate { url }],
        None => Vec::new(),
    }
}

fn apply_job_step(state: &mut ChatState, step: JobStep) -> Vec<Effect> {
    match step {
        JobStep::Continue(effect) => vec![effect],
        JobStep::Redirect(url) => {
            state.end_turn();
            vec![Effect::Navigate { url }]
        }
        JobStep::Fail(failure) => {
            state.append(Role::Bot, failure.user_message());
            state.end_turn();
            Vec::new()
        }
        JobStep::Stale => Vec::new(),
    }
}
