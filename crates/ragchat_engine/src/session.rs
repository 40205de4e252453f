use std::collections::VecDeque;

use chat_logging::{chat_debug, chat_info, chat_warn};
use ragchat_core::{
    update, BusyIndicator, ChatSettings, ChatState, Effect, Msg, ProgressView, TransportFailure,
};

use crate::{Dispatcher, TransportError, UiSink};

/// Runs chat turns: feeds messages through the core state machine, performs
/// the resulting effects in order and renders changes into the sink.
///
/// Everything within a turn is sequential; the only suspension points are the
/// dispatcher calls and the inter-poll delay.
pub struct ChatSession<D, S> {
    state: ChatState,
    dispatcher: D,
    sink: S,
    rendered: usize,
    shown_busy: Option<BusyIndicator>,
    shown_progress: Option<ProgressView>,
}

impl<D: Dispatcher, S: UiSink> ChatSession<D, S> {
    pub fn new(settings: ChatSettings, dispatcher: D, sink: S) -> Self {
        Self {
            state: ChatState::new(settings),
            dispatcher,
            sink,
            rendered: 0,
            shown_busy: None,
            shown_progress: None,
        }
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Submits one line of user input and runs the turn to its end.
    pub async fn submit(&mut self, input: &str) {
        if self.state.busy().is_some() {
            chat_warn!("Submit ignored while a turn is in flight");
        }
        self.run(Msg::InputChanged(input.to_string())).await;
        self.run(Msg::Submitted).await;
    }

    /// Applies `msg` and keeps executing effects until none remain.
    pub async fn run(&mut self, msg: Msg) {
        let mut pending: VecDeque<Effect> = self.apply(msg).into();
        while let Some(effect) = pending.pop_front() {
            if let Some(next) = self.execute(effect).await {
                pending.extend(self.apply(next));
            }
        }
    }

    fn apply(&mut self, msg: Msg) -> Vec<Effect> {
        let state = std::mem::take(&mut self.state);
        let before = state.jobs().phase();
        let (mut state, effects) = update(state, msg);
        let after = state.jobs().phase();
        if after != before {
            chat_debug!("Job phase {:?} -> {:?}", before, after);
        }
        if state.consume_dirty() {
            self.render(&state);
        }
        self.state = state;
        effects
    }

    async fn execute(&self, effect: Effect) -> Option<Msg> {
        match effect {
            Effect::SendMessage { url, text } => {
                let result = self.dispatcher.send_message(&url, &text).await;
                Some(Msg::SendCompleted(result.map_err(failure)))
            }
            Effect::InitJob { url } => {
                chat_info!("Starting job via {}", url);
                let result = self.dispatcher.init_job(&url).await;
                Some(Msg::JobInitCompleted(result.map_err(failure)))
            }
            Effect::PollJob { url } => {
                let result = self.dispatcher.poll_job(&url).await;
                if let Ok(snapshot) = &result {
                    chat_debug!("Job state {:?} percent {:?}", snapshot.state, snapshot.percent);
                }
                Some(Msg::JobPolled(result.map_err(failure)))
            }
            Effect::FinalizeJob { url } => {
                let result = self.dispatcher.finalize_job(&url).await;
                Some(Msg::JobFinalized(result.map_err(failure)))
            }
            Effect::Wait { duration } => {
                tokio::time::sleep(duration).await;
                Some(Msg::PollDelayElapsed)
            }
            Effect::Navigate { url } => {
                chat_info!("Navigating to {}", url);
                self.sink.navigate(&url);
                None
            }
        }
    }

    fn render(&mut self, state: &ChatState) {
        for message in state.transcript().since(self.rendered) {
            self.sink.append_message(message);
        }
        self.rendered = state.transcript().len();

        if state.busy() != self.shown_busy.as_ref() {
            self.sink.set_busy(state.busy());
            self.shown_busy = state.busy().cloned();
        }

        if state.progress() != self.shown_progress.as_ref() {
            if let Some(progress) = state.progress() {
                self.sink.set_progress(progress);
            }
            self.shown_progress = state.progress().cloned();
        }
    }
}

fn failure(err: TransportError) -> TransportFailure {
    chat_warn!("Request failed: {}", err);
    err.into_failure()
}
