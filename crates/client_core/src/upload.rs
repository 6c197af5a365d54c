use std::path::Path;

use reqwest::multipart::Part;

use crate::error::ServiceError;

/// An image file read into memory, ready to be sent as the `image` form field.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self, ServiceError> {
        let file_name = file_name.into();
        let mime_type = mime_type.into();
        if file_name.trim().is_empty() {
            return Err(ServiceError::InvalidUpload("no file selected".to_string()));
        }
        if !mime_type.starts_with("image/") {
            return Err(ServiceError::InvalidUpload(format!(
                "'{file_name}' is not an image ({mime_type})"
            )));
        }
        if bytes.is_empty() {
            return Err(ServiceError::InvalidUpload(format!("'{file_name}' is empty")));
        }
        Ok(Self {
            file_name,
            mime_type,
            bytes,
        })
    }

    pub async fn from_path(path: &Path) -> Result<Self, ServiceError> {
        let file_name = display_name(path);
        let mime_type = mime_guess::from_path(path).first_or_octet_stream();
        let bytes = tokio::fs::read(path).await.map_err(|err| {
            ServiceError::InvalidUpload(format!("failed to read '{}': {err}", path.display()))
        })?;
        Self::new(file_name, mime_type.essence_str(), bytes)
    }

    pub(crate) fn into_part(self) -> Result<Part, ServiceError> {
        Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(&self.mime_type)
            .map_err(|err| ServiceError::InvalidUpload(err.to_string()))
    }
}

/// File name shown to the user for a picked path.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
