//! Worker thread that owns the conversation controller and talks to the UI over channels.

pub mod commands;
pub mod runtime;
