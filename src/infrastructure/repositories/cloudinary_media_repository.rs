use super::media_repository::{MediaRepository, UploadError};
use crate::domain::generation::UploadedAudio;
use crate::infrastructure::config::{CloudinaryConfig, ConfigError};
use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use serde::Deserialize;
use sha1::{Digest, Sha1};
use std::time::Duration;

const UPLOAD_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
    duration: Option<f64>,
    bytes: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

/// Cloudinary implementation of the media repository.
///
/// Audio goes through the `video` resource type, which is how Cloudinary
/// stores sound files.
pub struct CloudinaryMediaRepository {
    client: Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
    base_url: String,
    folder: String,
}

impl CloudinaryMediaRepository {
    /// Fails before any network call when a credential is missing
    pub fn new(config: &CloudinaryConfig) -> Result<Self, ConfigError> {
        let mut missing = Vec::new();
        if config.cloud_name.trim().is_empty() {
            missing.push("CLOUDINARY_CLOUD_NAME");
        }
        if config.api_key.trim().is_empty() {
            missing.push("CLOUDINARY_API_KEY");
        }
        if config.api_secret.trim().is_empty() {
            missing.push("CLOUDINARY_API_SECRET");
        }
        if !missing.is_empty() {
            return Err(ConfigError::MissingCredentials {
                provider: "Cloudinary",
                missing,
            });
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(UPLOAD_TIMEOUT_SECS))
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            cloud_name: config.cloud_name.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            folder: config.folder.clone(),
        })
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{}/{}/video/{}", self.base_url, self.cloud_name, action)
    }

    /// SHA-1 over the sorted `key=value` pairs followed by the API secret
    fn sign(&self, params: &[(&'static str, String)]) -> String {
        let mut hasher = Sha1::new();
        hasher.update(string_to_sign(params).as_bytes());
        hasher.update(self.api_secret.as_bytes());
        hex::encode(hasher.finalize())
    }
}

fn string_to_sign(params: &[(&'static str, String)]) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    sorted
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&")
}

/// Cloudinary wraps failures as `{"error": {"message": "..."}}`
fn parse_cloudinary_error(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| {
            format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown Status")
            )
        })
}

#[async_trait]
impl MediaRepository for CloudinaryMediaRepository {
    async fn upload(&self, audio: Vec<u8>, name: &str) -> Result<UploadedAudio, UploadError> {
        tracing::info!(
            name = name,
            folder = %self.folder,
            audio_size_bytes = audio.len(),
            "Uploading audio to Cloudinary"
        );

        let fail = |message: String| {
            tracing::error!(name = name, error = %message, "Cloudinary upload failed");
            UploadError(format!("Failed to upload to Cloudinary: {}", message))
        };

        let params: Vec<(&'static str, String)> = vec![
            ("folder", self.folder.clone()),
            ("overwrite", "false".to_string()),
            ("public_id", name.to_string()),
            ("timestamp", chrono::Utc::now().timestamp().to_string()),
            ("unique_filename", "true".to_string()),
        ];
        let signature = self.sign(&params);

        let file = Part::bytes(audio)
            .file_name(format!("{}.mp3", name))
            .mime_str("audio/mpeg")
            .map_err(|e| fail(e.to_string()))?;

        let mut form = Form::new();
        for (key, value) in params {
            form = form.text(key, value);
        }
        let form = form
            .text("api_key", self.api_key.clone())
            .text("signature", signature)
            .part("file", file);

        let response = self
            .client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| fail(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| fail(e.to_string()))?;

        if !status.is_success() {
            return Err(fail(parse_cloudinary_error(status, &body)));
        }

        let uploaded: UploadResponse =
            serde_json::from_str(&body).map_err(|e| fail(format!("malformed response: {}", e)))?;

        tracing::info!(
            url = %uploaded.secure_url,
            public_id = %uploaded.public_id,
            "Successfully uploaded to Cloudinary"
        );

        Ok(UploadedAudio {
            url: uploaded.secure_url,
            public_id: uploaded.public_id,
            duration: uploaded.duration,
            byte_size: uploaded.bytes,
        })
    }

    async fn delete(&self, public_id: &str) {
        if public_id.trim().is_empty() {
            return;
        }

        tracing::info!(public_id = public_id, "Deleting audio from Cloudinary");

        let mut params: Vec<(&'static str, String)> = vec![
            ("public_id", public_id.to_string()),
            ("timestamp", chrono::Utc::now().timestamp().to_string()),
        ];
        let signature = self.sign(&params);
        params.push(("api_key", self.api_key.clone()));
        params.push(("signature", signature));

        let response = match self
            .client
            .post(self.endpoint("destroy"))
            .form(&params)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(public_id = public_id, error = %e, "Cloudinary deletion failed");
                return;
            }
        };

        let status = response.status();
        match response.text().await {
            Ok(body) if status.is_success() => {
                match serde_json::from_str::<DestroyResponse>(&body) {
                    Ok(destroyed) if destroyed.result == "ok" => {
                        tracing::info!(public_id = public_id, "Audio deleted from Cloudinary");
                    }
                    Ok(destroyed) => tracing::warn!(
                        public_id = public_id,
                        result = %destroyed.result,
                        "Cloudinary did not delete audio"
                    ),
                    Err(e) => tracing::warn!(
                        public_id = public_id,
                        error = %e,
                        "Cloudinary deletion returned an unexpected body"
                    ),
                }
            }
            Ok(body) => tracing::warn!(
                public_id = public_id,
                error = %parse_cloudinary_error(status, &body),
                "Cloudinary deletion failed"
            ),
            Err(e) => {
                tracing::warn!(public_id = public_id, error = %e, "Cloudinary deletion failed")
            }
        }
    }
}
