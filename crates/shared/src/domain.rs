use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Bot,
}

/// One entry of the conversation log. Never edited after it has been appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub sender: Sender,
    /// Local image the user uploaded with this message, for inline previews.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<PathBuf>,
    pub sent_at: DateTime<Utc>,
}

impl Message {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender,
            image: None,
            sent_at: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Sender::Bot, text)
    }

    pub fn with_image(mut self, path: impl Into<PathBuf>) -> Self {
        self.image = Some(path.into());
        self
    }

    pub fn is_from_user(&self) -> bool {
        self.sender == Sender::User
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlingOption {
    pub title: String,
    pub action: String,
}

impl HandlingOption {
    pub fn new(title: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            action: action.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub disease_name: String,
    /// Percentage in `0..=100`, absent when the service does not report one.
    pub confidence: Option<f64>,
    pub description: String,
    pub handling_options: Vec<HandlingOption>,
}

impl Diagnosis {
    pub fn confidence_label(&self) -> Option<String> {
        self.confidence.map(|value| format!("{value:.2}%"))
    }

    pub fn option(&self, action: &str) -> Option<&HandlingOption> {
        self.handling_options
            .iter()
            .find(|option| option.action == action)
    }

    pub fn has_options(&self) -> bool {
        !self.handling_options.is_empty()
    }
}
