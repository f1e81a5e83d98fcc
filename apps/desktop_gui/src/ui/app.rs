use chrono::{DateTime, Local};
use client_core::{JsonFileStore, StyledText, ThemeController};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{events::UiEvent, orchestration::dispatch_backend_command};
use crate::ui::{
    markdown::{layout_plain_text, layout_styled_text},
    theme::{palette_for, Palette, ThemeChrome},
};

const MAX_BUBBLE_WIDTH: f32 = 640.0;

enum EntryBody {
    User(String),
    Ai(StyledText),
    Error(StyledText),
}

struct TranscriptEntry {
    body: EntryBody,
    at: DateTime<Local>,
}

pub struct DesktopChatApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    transcript: Vec<TranscriptEntry>,
    composer: String,
    pending: bool,
    backend_ready: bool,
    status: String,
    refocus_composer: bool,
    themes: ThemeController<JsonFileStore>,
    chrome: ThemeChrome,
}

impl DesktopChatApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        mut themes: ThemeController<JsonFileStore>,
        system_prefers_dark: bool,
    ) -> Self {
        let mut chrome = ThemeChrome::default();
        let mut status = "Starting backend...".to_string();
        if let Err(err) = themes.start(system_prefers_dark, &mut chrome) {
            tracing::warn!("failed to persist theme: {err}");
            status = format!("Theme preference not saved: {err}");
        }

        Self {
            cmd_tx,
            ui_rx,
            transcript: Vec::new(),
            composer: String::new(),
            pending: false,
            backend_ready: false,
            status,
            refocus_composer: true,
            themes,
            chrome,
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.backend_ready = true;
                    self.status = message;
                }
                UiEvent::StartupFailed(failure) => {
                    self.backend_ready = false;
                    self.status = failure.user_message();
                }
                UiEvent::UserTurn(text) => self.push_entry(EntryBody::User(text)),
                UiEvent::AiTurn(markup) => self.push_entry(EntryBody::Ai(markup)),
                UiEvent::ErrorTurn(markup) => self.push_entry(EntryBody::Error(markup)),
                UiEvent::Pending(pending) => {
                    if self.pending && !pending {
                        self.refocus_composer = true;
                    }
                    self.pending = pending;
                }
            }
        }
    }

    fn push_entry(&mut self, body: EntryBody) {
        self.transcript.push(TranscriptEntry {
            body,
            at: Local::now(),
        });
    }

    fn submit_composer(&mut self) {
        if self.pending || self.composer.trim().is_empty() {
            return;
        }
        let query = std::mem::take(&mut self.composer);
        if !dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::SubmitTurn { query: query.clone() },
            &mut self.status,
        ) {
            // Keep the text so it can be resent once the worker catches up.
            self.composer = query;
            return;
        }
        // Locks the composer until the worker reports the turn finished.
        self.pending = true;
    }

    fn toggle_theme(&mut self) {
        match self.themes.toggle(&mut self.chrome) {
            Ok(theme) => self.status = format!("Switched to {theme} theme"),
            Err(err) => {
                tracing::warn!("failed to persist theme: {err}");
                self.status = format!("Theme preference not saved: {err}");
            }
        }
    }

    fn show_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("chat_top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Ask");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let toggle = ui
                        .button(self.chrome.toggle_icon())
                        .on_hover_text("Toggle light/dark theme");
                    if toggle.clicked() {
                        self.toggle_theme();
                    }
                    ui.label(
                        egui::RichText::new(&self.status)
                            .small()
                            .color(ui.visuals().weak_text_color()),
                    );
                });
            });
        });
    }

    fn show_composer(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("composer")
            .frame(
                egui::Frame::side_top_panel(&ctx.style())
                    .inner_margin(egui::Margin::symmetric(12, 10)),
            )
            .show(ctx, |ui| {
                if self.pending {
                    ui.horizontal(|ui| {
                        ui.add(egui::Spinner::new());
                        ui.label(
                            egui::RichText::new("Assistant is typing…")
                                .color(ui.visuals().weak_text_color()),
                        );
                    });
                }

                let enabled = !self.pending && self.backend_ready;
                ui.horizontal(|ui| {
                    let send_width = 80.0;
                    let input = ui.add_enabled(
                        enabled,
                        egui::TextEdit::singleline(&mut self.composer)
                            .hint_text("Ask something…")
                            .desired_width(ui.available_width() - send_width - 8.0),
                    );
                    let submitted_with_enter =
                        input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

                    let send = ui.add_enabled(
                        enabled,
                        egui::Button::new("Send").min_size(egui::vec2(send_width, 0.0)),
                    );

                    if enabled && (submitted_with_enter || send.clicked()) {
                        self.submit_composer();
                        self.refocus_composer = true;
                    }
                    if enabled && self.refocus_composer {
                        input.request_focus();
                        self.refocus_composer = false;
                    }
                });
            });
    }

    fn show_transcript(&self, ctx: &egui::Context) {
        let palette = palette_for(self.chrome.theme());
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .id_salt("transcript_scroll")
                .auto_shrink([false, false])
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    if self.transcript.is_empty() {
                        ui.add_space(12.0);
                        ui.colored_label(palette.hint_text, "Ask a question to get started.");
                    }
                    for entry in &self.transcript {
                        show_entry(ui, entry, &palette);
                        ui.add_space(6.0);
                    }
                });
        });
    }
}

fn show_entry(ui: &mut egui::Ui, entry: &TranscriptEntry, palette: &Palette) {
    let wrap = (ui.available_width() * 0.8).min(MAX_BUBBLE_WIDTH);
    let (fill, job, align) = match &entry.body {
        EntryBody::User(text) => (
            palette.user_bubble,
            layout_plain_text(text, palette, wrap),
            egui::Align::Max,
        ),
        EntryBody::Ai(markup) => (
            palette.ai_bubble,
            layout_styled_text(markup, palette, wrap),
            egui::Align::Min,
        ),
        EntryBody::Error(markup) => (
            palette.error_bubble,
            layout_styled_text(markup, palette, wrap),
            egui::Align::Min,
        ),
    };

    ui.with_layout(egui::Layout::top_down(align), |ui| {
        egui::Frame::new()
            .fill(fill)
            .corner_radius(egui::CornerRadius::same(8))
            .inner_margin(egui::Margin::symmetric(10, 8))
            .show(ui, |ui| {
                ui.label(job);
            });
        ui.label(
            egui::RichText::new(entry.at.format("%H:%M").to_string())
                .small()
                .color(palette.hint_text),
        );
    });
}

impl eframe::App for DesktopChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();
        self.chrome.apply_theme_if_needed(ctx);

        self.show_top_bar(ctx);
        self.show_composer(ctx);
        self.show_transcript(ctx);

        if self.pending {
            ctx.request_repaint_after(std::time::Duration::from_millis(16));
        } else {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_core::{MarkdownRenderer, StyledMarkdown};
    use crossbeam_channel::bounded;
    use shared::domain::Theme;

    fn app_with_channels() -> (
        DesktopChatApp,
        Sender<UiEvent>,
        Receiver<BackendCommand>,
        tempfile::TempDir,
    ) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonFileStore::open(dir.path().join("settings.json"));
        let (cmd_tx, cmd_rx) = bounded(4);
        let (ui_tx, ui_rx) = bounded(16);
        let app = DesktopChatApp::new(cmd_tx, ui_rx, ThemeController::new(store), true);
        (app, ui_tx, cmd_rx, dir)
    }

    #[test]
    fn starts_with_system_theme_and_persists_toggle() {
        let (mut app, _ui_tx, _cmd_rx, dir) = app_with_channels();
        assert_eq!(app.chrome.theme(), Theme::Dark);

        app.toggle_theme();
        assert_eq!(app.chrome.theme(), Theme::Light);

        let reopened = JsonFileStore::open(dir.path().join("settings.json"));
        let themes = ThemeController::new(reopened);
        assert_eq!(themes.initial_theme(true), Theme::Light);
    }

    #[test]
    fn pending_blocks_submission_and_keeps_composer() {
        let (mut app, ui_tx, cmd_rx, _dir) = app_with_channels();
        ui_tx.send(UiEvent::Info("ready".into())).expect("send");
        ui_tx.send(UiEvent::Pending(true)).expect("send");
        app.process_ui_events();

        app.composer = "second question".into();
        app.submit_composer();
        assert!(cmd_rx.try_recv().is_err());
        assert_eq!(app.composer, "second question");
    }

    #[test]
    fn submit_queues_command_and_clears_composer() {
        let (mut app, ui_tx, cmd_rx, _dir) = app_with_channels();
        ui_tx.send(UiEvent::Info("ready".into())).expect("send");
        app.process_ui_events();

        app.composer = "hello".into();
        app.submit_composer();
        assert!(app.composer.is_empty());
        assert!(app.pending);
        match cmd_rx.try_recv().expect("command queued") {
            BackendCommand::SubmitTurn { query } => assert_eq!(query, "hello"),
        }
    }

    #[test]
    fn transcript_events_append_in_order() {
        let (mut app, ui_tx, _cmd_rx, _dir) = app_with_channels();
        ui_tx.send(UiEvent::UserTurn("hi".into())).expect("send");
        ui_tx
            .send(UiEvent::AiTurn(StyledMarkdown.render("**hello**")))
            .expect("send");
        ui_tx.send(UiEvent::Pending(false)).expect("send");
        app.process_ui_events();

        assert_eq!(app.transcript.len(), 2);
        assert!(matches!(&app.transcript[0].body, EntryBody::User(text) if text == "hi"));
        assert!(matches!(
            &app.transcript[1].body,
            EntryBody::Ai(markup) if markup.plain_text() == "hello"
        ));
    }

    #[test]
    fn startup_failure_shows_reason_and_keeps_backend_unready() {
        use crate::controller::events::StartupFailure;

        let (mut app, ui_tx, _cmd_rx, _dir) = app_with_channels();
        ui_tx
            .send(UiEvent::StartupFailed(StartupFailure::InvalidServerUrl {
                url: "localhost".into(),
                reason: "relative URL without a base".into(),
            }))
            .expect("send");
        app.process_ui_events();

        assert!(!app.backend_ready);
        assert!(app.status.contains("localhost"));
    }
}
