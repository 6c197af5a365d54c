//! Runtime bridge between UI command queue and backend event intake.

use std::thread;

use client_core::{HttpDiagnosisClient, Settings};
use conversation::{Affordance, ConversationController, InputAffordance, MessageLog};
use crossbeam_channel::{Receiver, Sender};
use shared::domain::Message;
use tracing::{error, info, warn};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;

/// Forwards every log mutation to the UI thread.
pub struct ChannelLog {
    ui_tx: Sender<UiEvent>,
}

/// Forwards every affordance change to the UI thread.
pub struct ChannelInput {
    ui_tx: Sender<UiEvent>,
}

fn forward(ui_tx: &Sender<UiEvent>, event: UiEvent) {
    if ui_tx.send(event).is_err() {
        warn!("ui event receiver dropped");
    }
}

impl ChannelLog {
    pub fn new(ui_tx: Sender<UiEvent>) -> Self {
        Self { ui_tx }
    }
}

impl MessageLog for ChannelLog {
    fn append(&mut self, message: Message) {
        forward(
            &self.ui_tx,
            UiEvent::MessageAppended {
                message,
                transient: false,
            },
        );
    }

    fn append_placeholder(&mut self, message: Message) {
        forward(
            &self.ui_tx,
            UiEvent::MessageAppended {
                message,
                transient: true,
            },
        );
    }

    fn retract_placeholder(&mut self) {
        forward(&self.ui_tx, UiEvent::PlaceholderRetracted);
    }
}

impl ChannelInput {
    pub fn new(ui_tx: Sender<UiEvent>) -> Self {
        Self { ui_tx }
    }
}

impl InputAffordance for ChannelInput {
    fn mount(&mut self, affordance: &Affordance, enabled: bool) {
        forward(
            &self.ui_tx,
            UiEvent::AffordanceMounted {
                affordance: affordance.clone(),
                enabled,
            },
        );
    }

    fn set_enabled(&mut self, enabled: bool) {
        forward(&self.ui_tx, UiEvent::AffordanceEnabled(enabled));
    }
}

pub fn launch(settings: Settings, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                error!("failed to build backend runtime: {err}");
                let reason = format!("Gagal menyiapkan proses latar belakang: {err}");
                forward(&ui_tx, UiEvent::BackendFailed(reason));
                return;
            }
        };

        runtime.block_on(async move {
            info!(api = %settings.api_base_url, "backend worker ready");
            let mut controller = ConversationController::new(
                HttpDiagnosisClient::from_settings(&settings),
                ChannelLog::new(ui_tx.clone()),
                ChannelInput::new(ui_tx.clone()),
            );
            controller.start();

            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    BackendCommand::Conversation(event) => {
                        let name = event.name();
                        if let Err(err) = controller.dispatch(event).await {
                            warn!(event = name, %err, "conversation event refused");
                            let input_enabled =
                                controller.mounted().is_some_and(|mounted| mounted.enabled);
                            forward(
                                &ui_tx,
                                UiEvent::Refused {
                                    reason: err.to_string(),
                                    input_enabled,
                                },
                            );
                        }
                    }
                    BackendCommand::Shutdown => break,
                }
            }
            info!("backend worker stopped");
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn channel_sinks_forward_in_order() {
        let (tx, rx) = unbounded();
        let mut log = ChannelLog::new(tx.clone());
        let mut input = ChannelInput::new(tx);

        input.mount(&Affordance::Text, true);
        log.append(Message::user("Apa obatnya?"));
        log.append_placeholder(Message::bot("..."));
        input.set_enabled(false);
        log.retract_placeholder();

        let events: Vec<UiEvent> = rx.try_iter().collect();
        assert!(matches!(
            events[0],
            UiEvent::AffordanceMounted {
                affordance: Affordance::Text,
                enabled: true
            }
        ));
        assert!(matches!(
            &events[1],
            UiEvent::MessageAppended { transient: false, message } if message.text == "Apa obatnya?"
        ));
        assert!(matches!(events[2], UiEvent::MessageAppended { transient: true, .. }));
        assert!(matches!(events[3], UiEvent::AffordanceEnabled(false)));
        assert!(matches!(events[4], UiEvent::PlaceholderRetracted));
    }

    #[test]
    fn worker_starts_conversation_and_stops_on_shutdown() {
        let (cmd_tx, cmd_rx) = crossbeam_channel::bounded(4);
        let (ui_tx, ui_rx) = unbounded();
        launch(Settings::default(), cmd_rx, ui_tx);

        let welcome = ui_rx
            .recv_timeout(std::time::Duration::from_secs(5))
            .expect("welcome event");
        let UiEvent::MessageAppended {
            message,
            transient: false,
        } = welcome
        else {
            panic!("expected welcome message, got {welcome:?}");
        };
        assert_eq!(message.text, conversation::prompts::WELCOME);
        let mounted = ui_rx
            .recv_timeout(std::time::Duration::from_secs(5))
            .expect("mount event");
        assert!(matches!(
            mounted,
            UiEvent::AffordanceMounted {
                affordance: Affordance::Upload,
                enabled: true
            }
        ));

        cmd_tx.send(BackendCommand::Shutdown).expect("send shutdown");
    }
}
