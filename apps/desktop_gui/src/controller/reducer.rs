//! UI-thread view of the conversation, rebuilt from backend events.

use conversation::{Affordance, MessageLog, Transcript};

use crate::controller::events::UiEvent;

#[derive(Debug, Default)]
pub struct ChatView {
    pub transcript: Transcript,
    pub affordance: Option<Affordance>,
    pub input_enabled: bool,
    pub status: String,
}

impl ChatView {
    pub fn apply(&mut self, event: UiEvent) {
        match event {
            UiEvent::MessageAppended { message, transient } => {
                if transient {
                    self.transcript.append_placeholder(message);
                } else {
                    self.transcript.append(message);
                }
            }
            UiEvent::PlaceholderRetracted => self.transcript.retract_placeholder(),
            UiEvent::AffordanceMounted {
                affordance,
                enabled,
            } => {
                self.affordance = Some(affordance);
                self.input_enabled = enabled;
            }
            UiEvent::AffordanceEnabled(enabled) => {
                self.input_enabled = enabled;
                if enabled {
                    self.status.clear();
                }
            }
            UiEvent::Refused {
                reason,
                input_enabled,
            } => {
                self.status = reason;
                self.input_enabled = input_enabled;
            }
            UiEvent::BackendFailed(reason) => {
                self.status = reason;
                self.input_enabled = false;
            }
        }
    }

    /// Disables the input ahead of the worker's own disable event so a double
    /// click cannot queue a second request. False when already busy.
    pub fn begin_submit(&mut self) -> bool {
        if !self.input_enabled || self.affordance.is_none() {
            return false;
        }
        self.input_enabled = false;
        true
    }

    /// Undo [`Self::begin_submit`] when the command never reached the worker.
    pub fn abort_submit(&mut self) {
        self.input_enabled = self.affordance.is_some();
    }

    pub fn can_restart(&self) -> bool {
        self.input_enabled && !matches!(self.affordance, Some(Affordance::Upload) | None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::{HandlingOption, Message};

    fn mounted(affordance: Affordance) -> UiEvent {
        UiEvent::AffordanceMounted {
            affordance,
            enabled: true,
        }
    }

    #[test]
    fn placeholder_is_replaced_by_answer() {
        let mut view = ChatView::default();
        view.apply(UiEvent::MessageAppended {
            message: Message::user("Apa obatnya?"),
            transient: false,
        });
        view.apply(UiEvent::MessageAppended {
            message: Message::bot("..."),
            transient: true,
        });
        view.apply(UiEvent::PlaceholderRetracted);
        view.apply(UiEvent::MessageAppended {
            message: Message::bot("Gunakan fungisida."),
            transient: false,
        });

        assert_eq!(
            view.transcript.texts(),
            vec!["Apa obatnya?", "Gunakan fungisida."]
        );
    }

    #[test]
    fn submit_is_refused_while_busy() {
        let mut view = ChatView::default();
        assert!(!view.begin_submit());

        view.apply(mounted(Affordance::Text));
        assert!(view.begin_submit());
        assert!(!view.begin_submit());

        view.apply(UiEvent::AffordanceEnabled(true));
        assert!(view.begin_submit());
    }

    #[test]
    fn refusal_restores_controller_view_of_input() {
        let mut view = ChatView::default();
        view.apply(mounted(Affordance::Text));
        assert!(view.begin_submit());

        view.apply(UiEvent::Refused {
            reason: "question is empty".to_string(),
            input_enabled: true,
        });

        assert!(view.input_enabled);
        assert_eq!(view.status, "question is empty");
    }

    #[test]
    fn restart_is_offered_only_after_diagnosis() {
        let mut view = ChatView::default();
        view.apply(mounted(Affordance::Upload));
        assert!(!view.can_restart());

        view.apply(mounted(Affordance::Options(vec![HandlingOption::new(
            "Cara Mengobati",
            "treatment",
        )])));
        assert!(view.can_restart());

        view.apply(UiEvent::AffordanceEnabled(false));
        assert!(!view.can_restart());
    }

    #[test]
    fn backend_failure_locks_input() {
        let mut view = ChatView::default();
        view.apply(mounted(Affordance::Upload));
        view.apply(UiEvent::BackendFailed("runtime failed".to_string()));

        assert!(!view.input_enabled);
        assert!(!view.begin_submit());
        assert_eq!(view.status, "runtime failed");
    }
}
