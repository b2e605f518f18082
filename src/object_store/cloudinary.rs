use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use super::{ObjectStore, UploadError, UploadedObject};

const DEFAULT_API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// Credentials for the Cloudinary upload API.
///
/// Requests are signed with SHA-256, so the account must have SHA-256
/// signatures enabled. `sha256_enabled` records that the operator checked
/// this (`CLOUDINARY_SHA256_ENABLED`); without it the store warns at startup.
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub api_base: String,
    pub sha256_enabled: bool,
}

impl CloudinaryConfig {
    pub fn new(cloud_name: String, api_key: String, api_secret: String) -> Self {
        Self {
            cloud_name,
            api_key,
            api_secret,
            api_base: DEFAULT_API_BASE.to_string(),
            sha256_enabled: false,
        }
    }

    pub fn with_sha256_enabled(mut self, enabled: bool) -> Self {
        self.sha256_enabled = enabled;
        self
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: Option<String>,
    error: Option<ApiErrorBody>,
}

pub struct CloudinaryStore {
    config: CloudinaryConfig,
    client: reqwest::Client,
}

impl CloudinaryStore {
    pub fn new(config: CloudinaryConfig) -> Self {
        if !config.sha256_enabled {
            tracing::warn!(
                cloud = %config.cloud_name,
                "Cloudinary requests are signed with SHA-256; uploads fail unless the account \
                 has SHA-256 signatures enabled (set CLOUDINARY_SHA256_ENABLED=true once it does)"
            );
        }
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, resource_type: &str, action: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.cloud_name,
            resource_type,
            action
        )
    }
}

/// Sign request parameters: sorted `key=value` pairs joined by `&`, followed
/// by the API secret, hashed with SHA-256.
fn sign(params: &[(&str, &str)], secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    format!("{:x}", Sha256::digest(format!("{joined}{secret}").as_bytes()))
}

/// Turn an API error into an [`UploadError`], pointing at the signature
/// algorithm when Cloudinary rejects the signature.
fn rejection(message: String) -> UploadError {
    if message.to_ascii_lowercase().contains("signature") {
        tracing::warn!(%message, "Cloudinary rejected the request signature");
        return UploadError::Rejected(format!(
            "{message} (requests are signed with SHA-256, enable SHA-256 signatures on the account)"
        ));
    }
    UploadError::Rejected(message)
}

/// Split a delivery URL into `(resource_type, public_id)`.
///
/// `https://res.cloudinary.com/demo/raw/upload/v1712/ABC/_1_paper.pdf`
/// yields `("raw", "ABC/_1_paper.pdf")`.
fn parse_delivery_url(url: &str) -> Option<(String, String)> {
    let (head, tail) = url.split_once("/upload/")?;
    let resource_type = head.rsplit('/').next()?.to_string();

    let mut segments = tail.split('/').peekable();
    if let Some(first) = segments.peek() {
        let is_version = first.len() > 1
            && first.starts_with('v')
            && first[1..].chars().all(|c| c.is_ascii_digit());
        if is_version {
            segments.next();
        }
    }

    let public_id = segments.collect::<Vec<_>>().join("/");
    if resource_type.is_empty() || public_id.is_empty() {
        return None;
    }
    Some((resource_type, public_id))
}

#[async_trait]
impl ObjectStore for CloudinaryStore {
    async fn upload(
        &self,
        local_path: &Path,
        name: &str,
        scope: &str,
    ) -> Result<UploadedObject, UploadError> {
        let bytes = tokio::fs::read(local_path).await?;
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign(
            &[("folder", scope), ("public_id", name), ("timestamp", timestamp.as_str())],
            &self.config.api_secret,
        );

        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(name.to_string()))
            .text("folder", scope.to_string())
            .text("public_id", name.to_string())
            .text("timestamp", timestamp)
            .text("api_key", self.config.api_key.clone())
            .text("signature_algorithm", "sha256")
            .text("signature", signature);

        let response: UploadResponse = self
            .client
            .post(self.endpoint("raw", "upload"))
            .multipart(form)
            .send()
            .await?
            .json()
            .await?;

        if let Some(error) = response.error {
            return Err(rejection(error.message));
        }

        Ok(UploadedObject {
            secure_url: response.secure_url,
        })
    }

    async fn delete(&self, url: &str) -> Result<(), UploadError> {
        let (resource_type, public_id) = parse_delivery_url(url)
            .ok_or_else(|| UploadError::Rejected(format!("'{url}' is not a delivery URL")))?;
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign(
            &[("public_id", public_id.as_str()), ("timestamp", timestamp.as_str())],
            &self.config.api_secret,
        );

        let params = [
            ("public_id", public_id.as_str()),
            ("timestamp", timestamp.as_str()),
            ("api_key", self.config.api_key.as_str()),
            ("signature_algorithm", "sha256"),
            ("signature", signature.as_str()),
        ];

        let response: DestroyResponse = self
            .client
            .post(self.endpoint(&resource_type, "destroy"))
            .form(&params)
            .send()
            .await?
            .json()
            .await?;

        if let Some(error) = response.error {
            return Err(rejection(error.message));
        }
        match response.result.as_deref() {
            Some("ok") => Ok(()),
            other => Err(UploadError::Rejected(format!(
                "destroy returned {}",
                other.unwrap_or("no result")
            ))),
        }
    }

    /// Delivery URLs carry a version segment, so re-uploading the same
    /// public id yields a different URL for the same object.
    fn is_same_object(&self, a: &str, b: &str) -> bool {
        match (parse_delivery_url(a), parse_delivery_url(b)) {
            (Some(a), Some(b)) => a == b,
            _ => a == b,
        }
    }
}
