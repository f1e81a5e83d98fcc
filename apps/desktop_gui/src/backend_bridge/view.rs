//! Transcript view living on the backend worker; forwards every call to the UI thread.

use client_core::{StyledText, TranscriptView};
use crossbeam_channel::Sender;

use crate::controller::events::UiEvent;

pub struct ChannelTranscriptView {
    ui_tx: Sender<UiEvent>,
}

impl ChannelTranscriptView {
    pub fn new(ui_tx: Sender<UiEvent>) -> Self {
        Self { ui_tx }
    }

    fn forward(&self, event: UiEvent) {
        // Blocking send: transcript entries must not be dropped.
        if self.ui_tx.send(event).is_err() {
            tracing::warn!("ui event receiver dropped; transcript update lost");
        }
    }
}

impl TranscriptView for ChannelTranscriptView {
    type Markup = StyledText;

    fn append_user_turn(&mut self, text: &str) {
        self.forward(UiEvent::UserTurn(text.to_string()));
    }

    fn append_ai_turn(&mut self, markup: StyledText) {
        self.forward(UiEvent::AiTurn(markup));
    }

    fn append_error(&mut self, markup: StyledText) {
        self.forward(UiEvent::ErrorTurn(markup));
    }

    fn set_pending(&mut self, pending: bool) {
        self.forward(UiEvent::Pending(pending));
    }
}
