//! UI layer for the desktop chat: app shell and image previews.

pub mod app;
pub mod preview;

pub use app::LeafChatApp;
