use std::{fmt, path::PathBuf};

use client_core::{display_name, DiagnosisService, ImageUpload, ServiceError};
use shared::domain::{Diagnosis, Message};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    events::{Affordance, InputMode, UserEvent},
    prompts,
    sink::{InputAffordance, MessageLog},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationState {
    AwaitingImage,
    Diagnosing,
    AwaitingQuestionOrOption,
    Fetching,
}

impl fmt::Display for ConversationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AwaitingImage => "awaiting_image",
            Self::Diagnosing => "diagnosing",
            Self::AwaitingQuestionOrOption => "awaiting_question_or_option",
            Self::Fetching => "fetching",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Diagnose,
    Chat,
    Details,
}

/// A request the controller has committed to. Produced by
/// [`ConversationController::begin`], settled by [`ConversationController::complete`].
#[derive(Debug, Clone, PartialEq)]
pub enum PendingRequest {
    Diagnose { path: PathBuf },
    Chat { question: String },
    Details { disease_name: String, info_type: String },
}

impl PendingRequest {
    pub fn kind(&self) -> RequestKind {
        match self {
            Self::Diagnose { .. } => RequestKind::Diagnose,
            Self::Chat { .. } => RequestKind::Chat,
            Self::Details { .. } => RequestKind::Details,
        }
    }

    pub async fn execute<S>(&self, service: &S) -> Result<Reply, ServiceError>
    where
        S: DiagnosisService + ?Sized,
    {
        match self {
            Self::Diagnose { path } => {
                let upload = ImageUpload::from_path(path).await?;
                service.diagnose(upload).await.map(Reply::Diagnosis)
            }
            Self::Chat { question } => service.ask(question).await.map(Reply::Answer),
            Self::Details {
                disease_name,
                info_type,
            } => service
                .details(disease_name, info_type)
                .await
                .map(Reply::Detail),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Diagnosis(Diagnosis),
    Answer(String),
    Detail(String),
}

impl Reply {
    pub fn kind(&self) -> RequestKind {
        match self {
            Self::Diagnosis(_) => RequestKind::Diagnose,
            Self::Answer(_) => RequestKind::Chat,
            Self::Detail(_) => RequestKind::Details,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub current_disease_name: String,
    pub last_diagnosis: Option<Diagnosis>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountedInput {
    pub affordance: Affordance,
    pub enabled: bool,
}

impl MountedInput {
    pub fn mode(&self) -> InputMode {
        if !self.enabled {
            return InputMode::Disabled;
        }
        match self.affordance {
            Affordance::Upload => InputMode::Upload,
            Affordance::Text => InputMode::Text,
            Affordance::Options(_) => InputMode::Options,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConversationError {
    #[error("conversation has not been started")]
    NotStarted,
    #[error("a request is already in flight ({0})")]
    Busy(ConversationState),
    #[error("{event} is not accepted while {state}")]
    NotAccepted {
        event: &'static str,
        state: ConversationState,
    },
    #[error("question is empty")]
    EmptyQuestion,
    #[error("option '{0}' is not offered")]
    UnknownOption(String),
    #[error("no request is in flight")]
    NothingInFlight,
    #[error("reply does not match the in-flight {expected:?} request")]
    UnexpectedReply { expected: RequestKind },
}

/// Drives one conversation: a log, one input affordance, and at most one
/// outstanding request to the diagnosis service.
///
/// A failed diagnosis resets to [`ConversationState::AwaitingImage`]; a failed
/// chat or detail lookup re-enables the affordance that issued it.
pub struct ConversationController<S, L, A> {
    service: S,
    log: L,
    input: A,
    state: ConversationState,
    session: Session,
    mounted: Option<MountedInput>,
    in_flight: Option<RequestKind>,
}

impl<S, L, A> ConversationController<S, L, A>
where
    S: DiagnosisService,
    L: MessageLog,
    A: InputAffordance,
{
    pub fn new(service: S, log: L, input: A) -> Self {
        Self {
            service,
            log,
            input,
            state: ConversationState::AwaitingImage,
            session: Session::default(),
            mounted: None,
            in_flight: None,
        }
    }

    pub fn state(&self) -> ConversationState {
        self.state
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn mounted(&self) -> Option<&MountedInput> {
        self.mounted.as_ref()
    }

    pub fn log(&self) -> &L {
        &self.log
    }

    pub fn input(&self) -> &A {
        &self.input
    }

    #[cfg(test)]
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Welcome the user and mount the upload affordance.
    pub fn start(&mut self) {
        self.enter_initial_state();
    }

    /// Back to the upload prompt with a fresh session. Refused mid-request.
    pub fn reset(&mut self) -> Result<(), ConversationError> {
        if self.mounted.is_none() {
            return Err(ConversationError::NotStarted);
        }
        if self.in_flight.is_some() {
            return Err(ConversationError::Busy(self.state));
        }
        self.enter_initial_state();
        Ok(())
    }

    /// Runs one event to completion, including its request.
    pub async fn dispatch(&mut self, event: UserEvent) -> Result<(), ConversationError> {
        if event == UserEvent::Restart {
            return self.reset();
        }
        let request = self.begin(event)?;
        let outcome = request.execute(&self.service).await;
        self.complete(outcome)
    }

    /// Validates `event` against the current state and commits to its request:
    /// logs the user's action, shows a placeholder and disables the affordance.
    pub fn begin(&mut self, event: UserEvent) -> Result<PendingRequest, ConversationError> {
        let Some(mounted) = &self.mounted else {
            return Err(ConversationError::NotStarted);
        };
        if self.in_flight.is_some() || !mounted.enabled {
            return Err(ConversationError::Busy(self.state));
        }

        let request = match (self.state, event) {
            (ConversationState::AwaitingImage, UserEvent::ImageSelected { path }) => {
                self.begin_diagnosis(path)
            }
            (
                ConversationState::AwaitingQuestionOrOption,
                UserEvent::QuestionSubmitted(question),
            ) => self.begin_chat(question)?,
            (ConversationState::AwaitingQuestionOrOption, UserEvent::OptionChosen { action }) => {
                self.begin_details(action)?
            }
            (state, event) => {
                warn!(event = event.name(), %state, "event rejected");
                return Err(ConversationError::NotAccepted {
                    event: event.name(),
                    state,
                });
            }
        };

        self.in_flight = Some(request.kind());
        self.set_input_enabled(false);
        self.transition(match request.kind() {
            RequestKind::Diagnose => ConversationState::Diagnosing,
            RequestKind::Chat | RequestKind::Details => ConversationState::Fetching,
        });
        Ok(request)
    }

    /// Settles the in-flight request. Every failure cause ends in the same
    /// single user-visible message.
    pub fn complete(
        &mut self,
        outcome: Result<Reply, ServiceError>,
    ) -> Result<(), ConversationError> {
        let Some(expected) = self.in_flight else {
            return Err(ConversationError::NothingInFlight);
        };
        if let Ok(reply) = &outcome {
            if reply.kind() != expected {
                return Err(ConversationError::UnexpectedReply { expected });
            }
        }

        self.in_flight = None;
        self.log.retract_placeholder();

        match outcome {
            Ok(Reply::Diagnosis(diagnosis)) => self.finish_diagnosis(diagnosis),
            Ok(Reply::Answer(text)) | Ok(Reply::Detail(text)) => {
                self.log.append(Message::bot(text));
                self.set_input_enabled(true);
                self.transition(ConversationState::AwaitingQuestionOrOption);
            }
            Err(err) => self.fail(expected, &err),
        }
        Ok(())
    }

    fn begin_diagnosis(&mut self, path: PathBuf) -> PendingRequest {
        let file_name = display_name(&path);
        info!(file = %file_name, "image selected");
        self.log
            .append(Message::user(prompts::image_selected(&file_name)).with_image(path.clone()));
        self.log.append_placeholder(Message::bot(prompts::ANALYZING));
        PendingRequest::Diagnose { path }
    }

    fn begin_chat(&mut self, question: String) -> Result<PendingRequest, ConversationError> {
        if !matches!(self.current_affordance(), Some(Affordance::Text)) {
            return Err(ConversationError::NotAccepted {
                event: "question_submitted",
                state: self.state,
            });
        }
        let question = question.trim();
        if question.is_empty() {
            return Err(ConversationError::EmptyQuestion);
        }

        self.log.append(Message::user(question));
        self.log.append_placeholder(Message::bot(prompts::TYPING));
        Ok(PendingRequest::Chat {
            question: question.to_string(),
        })
    }

    fn begin_details(&mut self, action: String) -> Result<PendingRequest, ConversationError> {
        let Some(Affordance::Options(options)) = self.current_affordance() else {
            return Err(ConversationError::NotAccepted {
                event: "option_chosen",
                state: self.state,
            });
        };
        let Some(option) = options.iter().find(|option| option.action == action) else {
            return Err(ConversationError::UnknownOption(action));
        };
        let title = option.title.clone();

        self.log.append(Message::user(prompts::option_selected(&title)));
        self.log.append_placeholder(Message::bot(prompts::looking_up(&title)));
        Ok(PendingRequest::Details {
            disease_name: self.session.current_disease_name.clone(),
            info_type: action,
        })
    }

    fn finish_diagnosis(&mut self, diagnosis: Diagnosis) {
        info!(
            disease = %diagnosis.disease_name,
            confidence = ?diagnosis.confidence,
            options = diagnosis.handling_options.len(),
            "diagnosis received"
        );
        self.log.append(Message::bot(prompts::diagnosis_summary(&diagnosis)));
        if !diagnosis.description.trim().is_empty() {
            self.log.append(Message::bot(diagnosis.description.clone()));
        }

        let affordance = if diagnosis.has_options() {
            Affordance::Options(diagnosis.handling_options.clone())
        } else {
            Affordance::Text
        };
        self.session.current_disease_name = diagnosis.disease_name.clone();
        self.session.last_diagnosis = Some(diagnosis);
        self.mount(affordance, true);
        self.transition(ConversationState::AwaitingQuestionOrOption);
    }

    fn fail(&mut self, kind: RequestKind, err: &ServiceError) {
        warn!(request = ?kind, error = %err, "request failed");
        self.log.append(Message::bot(prompts::failure(err)));
        match kind {
            RequestKind::Diagnose => {
                self.session = Session::default();
                self.mount(Affordance::Upload, true);
                self.transition(ConversationState::AwaitingImage);
            }
            RequestKind::Chat | RequestKind::Details => {
                self.set_input_enabled(true);
                self.transition(ConversationState::AwaitingQuestionOrOption);
            }
        }
    }

    fn enter_initial_state(&mut self) {
        self.session = Session::default();
        self.log.append(Message::bot(prompts::WELCOME));
        self.mount(Affordance::Upload, true);
        self.transition(ConversationState::AwaitingImage);
    }

    fn current_affordance(&self) -> Option<&Affordance> {
        self.mounted.as_ref().map(|mounted| &mounted.affordance)
    }

    fn mount(&mut self, affordance: Affordance, enabled: bool) {
        self.input.mount(&affordance, enabled);
        self.mounted = Some(MountedInput {
            affordance,
            enabled,
        });
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        if let Some(mounted) = self.mounted.as_mut() {
            mounted.enabled = enabled;
            self.input.set_enabled(enabled);
        }
    }

    fn transition(&mut self, next: ConversationState) {
        if self.state != next {
            info!(from = %self.state, to = %next, "conversation transition");
        }
        self.state = next;
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
