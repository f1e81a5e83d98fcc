//! Chat turn lifecycle: optimistic user turn, dispatch, reconcile on the outcome.

use shared::{
    domain::{ConversationHistory, HistoryMode, Role, Turn},
    error::TurnError,
    protocol::AskRequest,
};
use tracing::{info, warn};

use crate::{backend::AskBackend, markdown::MarkdownRenderer};

/// Presentation of the chat transcript.
///
/// User turns arrive as literal text; model answers and errors arrive already rendered.
pub trait TranscriptView {
    type Markup;

    fn append_user_turn(&mut self, text: &str);
    fn append_ai_turn(&mut self, markup: Self::Markup);
    fn append_error(&mut self, markup: Self::Markup);
    /// Disables input and shows the typing indicator while `true`; refocuses input on `false`.
    fn set_pending(&mut self, pending: bool);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Blank query; nothing happened.
    Skipped,
    Answered(Turn),
    Failed(TurnError),
}

pub fn error_bubble_text(err: &TurnError) -> String {
    format!("Sorry, something went wrong while contacting the assistant: {err}")
}

pub struct ChatTurnController<B, V, M> {
    backend: B,
    view: V,
    markdown: M,
    history: ConversationHistory,
    history_mode: HistoryMode,
    pending: bool,
}

impl<B, V, M> ChatTurnController<B, V, M>
where
    B: AskBackend,
    M: MarkdownRenderer,
    V: TranscriptView<Markup = M::Markup>,
{
    pub fn new(backend: B, view: V, markdown: M) -> Self {
        Self {
            backend,
            view,
            markdown,
            history: ConversationHistory::new(),
            history_mode: HistoryMode::default(),
            pending: false,
        }
    }

    pub fn with_history_mode(mut self, history_mode: HistoryMode) -> Self {
        self.history_mode = history_mode;
        self
    }

    pub async fn submit_turn(&mut self, query: &str) -> TurnOutcome {
        let query = query.trim();
        if query.is_empty() {
            return TurnOutcome::Skipped;
        }

        self.view.append_user_turn(query);

        let request = match self.history_mode {
            HistoryMode::Accumulate => {
                let request = AskRequest::new(query, Some(self.history.turns()));
                self.history.push(Turn::user(query));
                request
            }
            HistoryMode::Disabled => AskRequest::new(query, None),
        };

        self.set_pending(true);
        info!(
            query_len = query.len(),
            history_len = request.history.as_ref().map_or(0, Vec::len),
            "dispatching ask request"
        );
        let result = self.backend.ask(&request).await;

        let outcome = match result {
            Ok(answer) => {
                let turn = Turn::model(answer.response);
                let markup = self.markdown.render(turn.text());
                self.view.append_ai_turn(markup);
                if self.history_mode == HistoryMode::Accumulate {
                    self.history.push(turn.clone());
                }
                TurnOutcome::Answered(turn)
            }
            Err(err) => {
                warn!(error = %err, status = ?err.status(), "ask request failed");
                if self.history_mode == HistoryMode::Accumulate {
                    self.history.retract_last(Role::User);
                }
                let markup = self.markdown.render(&error_bubble_text(&err));
                self.view.append_error(markup);
                TurnOutcome::Failed(err)
            }
        };

        self.set_pending(false);
        outcome
    }

    fn set_pending(&mut self, pending: bool) {
        self.pending = pending;
        self.view.set_pending(pending);
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn history_mode(&self) -> HistoryMode {
        self.history_mode
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
