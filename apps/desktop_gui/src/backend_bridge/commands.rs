//! Backend commands queued from UI to backend worker.

use conversation::UserEvent;

#[derive(Debug)]
pub enum BackendCommand {
    Conversation(UserEvent),
    Shutdown,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Conversation(event) => event.name(),
            Self::Shutdown => "shutdown",
        }
    }
}
