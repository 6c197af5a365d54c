//! Client-side conversation state machine for the leaf diagnosis chat.
//!
//! The controller owns one message log and one input affordance and issues at
//! most one request to the diagnosis service at a time.

mod controller;
pub mod events;
pub mod prompts;
pub mod sink;

pub use controller::{
    ConversationController, ConversationError, ConversationState, MountedInput, PendingRequest,
    Reply, RequestKind, Session,
};
pub use events::{Affordance, InputMode, UserEvent};
pub use sink::{InputAffordance, MessageLog, Transcript};
