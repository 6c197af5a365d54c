//! Events flowing from the backend worker to the UI thread.

use conversation::Affordance;
use shared::domain::Message;

#[derive(Debug, Clone)]
pub enum UiEvent {
    MessageAppended { message: Message, transient: bool },
    PlaceholderRetracted,
    AffordanceMounted { affordance: Affordance, enabled: bool },
    AffordanceEnabled(bool),
    /// The controller refused an event; `input_enabled` is its current view of the affordance.
    Refused { reason: String, input_enabled: bool },
    BackendFailed(String),
}
