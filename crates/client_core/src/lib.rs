use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{multipart::Form, Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::Diagnosis,
    error::ApiError,
    protocol::{
        ChatData, ChatRequest, DetailsData, DiagnosisData, Envelope, CHAT_PATH, DETAILS_PATH,
        DIAGNOSE_PATH, IMAGE_FIELD,
    },
};
use tracing::{info, warn};

pub mod config;
pub mod error;
mod upload;

pub use config::{load_settings, ConfigError, Settings};
pub use error::ServiceError;
pub use upload::{display_name, ImageUpload};

/// The remote leaf-diagnosis API.
#[async_trait]
pub trait DiagnosisService: Send + Sync {
    async fn diagnose(&self, image: ImageUpload) -> Result<Diagnosis, ServiceError>;
    async fn ask(&self, question: &str) -> Result<String, ServiceError>;
    async fn details(&self, disease_name: &str, info_type: &str) -> Result<String, ServiceError>;
}

#[async_trait]
impl<T> DiagnosisService for Arc<T>
where
    T: DiagnosisService + ?Sized,
{
    async fn diagnose(&self, image: ImageUpload) -> Result<Diagnosis, ServiceError> {
        (**self).diagnose(image).await
    }

    async fn ask(&self, question: &str) -> Result<String, ServiceError> {
        (**self).ask(question).await
    }

    async fn details(&self, disease_name: &str, info_type: &str) -> Result<String, ServiceError> {
        (**self).details(disease_name, info_type).await
    }
}

pub struct HttpDiagnosisClient {
    http: Client,
    server_url: String,
}

impl HttpDiagnosisClient {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), server_url)
    }

    pub fn with_client(http: Client, server_url: impl Into<String>) -> Self {
        let server_url = server_url.into().trim_end_matches('/').to_string();
        Self { http, server_url }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.api_base_url.clone())
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.server_url)
    }
}

#[async_trait]
impl DiagnosisService for HttpDiagnosisClient {
    async fn diagnose(&self, image: ImageUpload) -> Result<Diagnosis, ServiceError> {
        info!(
            file = %image.file_name,
            bytes = image.bytes.len(),
            "submitting leaf image for diagnosis"
        );
        let form = Form::new().part(IMAGE_FIELD, image.into_part()?);
        let response = self
            .http
            .post(self.endpoint(DIAGNOSE_PATH))
            .multipart(form)
            .send()
            .await?;
        let data: DiagnosisData = read_data(response).await?;
        Ok(data.into())
    }

    async fn ask(&self, question: &str) -> Result<String, ServiceError> {
        info!(chars = question.chars().count(), "asking follow-up question");
        let response = self
            .http
            .post(self.endpoint(CHAT_PATH))
            .json(&ChatRequest {
                question: question.to_string(),
            })
            .send()
            .await?;
        let data: ChatData = read_data(response).await?;
        Ok(data.answer)
    }

    async fn details(&self, disease_name: &str, info_type: &str) -> Result<String, ServiceError> {
        info!(disease_name, info_type, "fetching handling details");
        let response = self
            .http
            .get(self.endpoint(DETAILS_PATH))
            .query(&[("disease_name", disease_name), ("info_type", info_type)])
            .send()
            .await?;
        let data: DetailsData = read_data(response).await?;
        Ok(data.text)
    }
}

/// Unwraps the `data` member of a success envelope. Non-2xx statuses become
/// [`ServiceError::Status`] carrying the server's `message`, if any.
async fn read_data<T: DeserializeOwned>(response: Response) -> Result<T, ServiceError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiError>(&body)
            .ok()
            .and_then(|err| err.message().map(str::to_owned));
        warn!(status = status.as_u16(), ?message, "diagnosis service rejected request");
        return Err(ServiceError::Status {
            status: status.as_u16(),
            message,
        });
    }

    let body = response.bytes().await?;
    let envelope: Envelope<T> =
        serde_json::from_slice(&body).map_err(|err| ServiceError::Decode(err.to_string()))?;
    Ok(envelope.data)
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
