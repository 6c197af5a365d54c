use std::path::PathBuf;

use shared::domain::HandlingOption;

/// Everything a front-end can ask the controller to do.
#[derive(Debug, Clone, PartialEq)]
pub enum UserEvent {
    ImageSelected { path: PathBuf },
    QuestionSubmitted(String),
    OptionChosen { action: String },
    Restart,
}

impl UserEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ImageSelected { .. } => "image_selected",
            Self::QuestionSubmitted(_) => "question_submitted",
            Self::OptionChosen { .. } => "option_chosen",
            Self::Restart => "restart",
        }
    }
}

/// The single input widget mounted below the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Affordance {
    Upload,
    Text,
    Options(Vec<HandlingOption>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Upload,
    Text,
    Options,
    Disabled,
}
