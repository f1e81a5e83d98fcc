//! Backend worker: owns the chat controller and runs one turn per queued command.

use std::thread;

use client_core::{ChatTurnController, HttpAskClient, StyledMarkdown};
use crossbeam_channel::{Receiver, Sender};
use shared::domain::HistoryMode;

use crate::backend_bridge::{commands::BackendCommand, view::ChannelTranscriptView};
use crate::controller::events::{StartupFailure, UiEvent};

fn notify(ui_tx: &Sender<UiEvent>, event: UiEvent) {
    if ui_tx.send(event).is_err() {
        tracing::warn!("ui event receiver dropped; backend status update lost");
    }
}

fn fail_startup(ui_tx: &Sender<UiEvent>, failure: StartupFailure) {
    tracing::error!("{failure}");
    notify(ui_tx, UiEvent::StartupFailed(failure));
}

pub fn launch(
    server_url: String,
    history_mode: HistoryMode,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                fail_startup(&ui_tx, StartupFailure::Runtime(err.to_string()));
                return;
            }
        };

        let backend = match HttpAskClient::new(&server_url) {
            Ok(backend) => backend,
            Err(err) => {
                fail_startup(
                    &ui_tx,
                    StartupFailure::InvalidServerUrl {
                        url: server_url,
                        reason: err.to_string(),
                    },
                );
                return;
            }
        };

        let mut chat = ChatTurnController::new(
            backend,
            ChannelTranscriptView::new(ui_tx.clone()),
            StyledMarkdown,
        )
        .with_history_mode(history_mode);
        notify(&ui_tx, UiEvent::Info(format!("Connected to {server_url}")));

        runtime.block_on(async move {
            // Commands are handled one at a time, so turns never overlap.
            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    BackendCommand::SubmitTurn { query } => {
                        chat.submit_turn(&query).await;
                    }
                }
            }
            tracing::info!("ui command channel closed; backend worker exiting");
        });
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;
    use std::time::Duration;

    #[test]
    fn invalid_server_url_reports_typed_startup_failure() {
        let (_cmd_tx, cmd_rx) = bounded(1);
        let (ui_tx, ui_rx) = bounded(1);

        let worker = launch("not a url".into(), HistoryMode::Accumulate, cmd_rx, ui_tx);

        match ui_rx.recv_timeout(Duration::from_secs(5)) {
            Ok(UiEvent::StartupFailed(StartupFailure::InvalidServerUrl { url, .. })) => {
                assert_eq!(url, "not a url");
            }
            _ => panic!("expected an invalid server url startup failure"),
        }
        worker.join().expect("worker exits after startup failure");
    }

    #[test]
    fn valid_server_url_reports_ready_and_exits_when_ui_closes() {
        let (cmd_tx, cmd_rx) = bounded(1);
        let (ui_tx, ui_rx) = bounded(1);

        let worker = launch(
            "http://127.0.0.1:5001".into(),
            HistoryMode::Accumulate,
            cmd_rx,
            ui_tx,
        );

        match ui_rx.recv_timeout(Duration::from_secs(5)) {
            Ok(UiEvent::Info(message)) => assert!(message.contains("127.0.0.1:5001")),
            _ => panic!("expected the ready notice"),
        }
        drop(cmd_tx);
        worker.join().expect("worker exits when the command channel closes");
    }
}
