//! User-facing copy. The diagnosis service answers in Indonesian, so the
//! client speaks it too.

use client_core::ServiceError;
use shared::domain::Diagnosis;

pub const WELCOME: &str =
    "Selamat datang! Silakan unggah gambar daun cabai untuk memulai diagnosis.";
pub const ANALYZING: &str = "Menganalisis gambar...";
pub const TYPING: &str = "...";
pub const GENERIC_FAILURE: &str = "Maaf, terjadi kesalahan.";

pub const UPLOAD_BUTTON: &str = "Pilih Gambar untuk Dianalisis";
pub const QUESTION_HINT: &str = "Ketik pertanyaan Anda di sini...";
pub const BUSY_HINT: &str = "Sedang memproses...";

pub fn image_selected(file_name: &str) -> String {
    format!("Anda memilih: {file_name}")
}

pub fn option_selected(title: &str) -> String {
    format!("Anda memilih: \"{title}\"")
}

pub fn looking_up(title: &str) -> String {
    format!("Mencari info tentang {title}...")
}

pub fn diagnosis_summary(diagnosis: &Diagnosis) -> String {
    let mut summary = format!("Hasil Diagnosis:\n- Penyakit: {}", diagnosis.disease_name);
    if let Some(confidence) = diagnosis.confidence_label() {
        summary.push_str(&format!("\n- Keyakinan: {confidence}"));
    }
    summary
}

pub fn failure(err: &ServiceError) -> String {
    match err.server_message() {
        Some(message) => format!("Maaf, terjadi kesalahan: {message}"),
        None => GENERIC_FAILURE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_names_disease_and_confidence() {
        let diagnosis = Diagnosis {
            disease_name: "Blight".to_string(),
            confidence: Some(92.5),
            description: String::new(),
            handling_options: Vec::new(),
        };
        assert_eq!(
            diagnosis_summary(&diagnosis),
            "Hasil Diagnosis:\n- Penyakit: Blight\n- Keyakinan: 92.50%"
        );
    }

    #[test]
    fn failure_prefers_server_message() {
        let err = ServiceError::Status {
            status: 400,
            message: Some("Tidak ada file gambar".to_string()),
        };
        assert_eq!(failure(&err), "Maaf, terjadi kesalahan: Tidak ada file gambar");
        assert_eq!(
            failure(&ServiceError::Transport("refused".to_string())),
            GENERIC_FAILURE
        );
    }
}
