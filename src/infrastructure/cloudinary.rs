//! Cloudinary image storage over its signed REST upload API.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::domain::errors::DomainError;
use crate::domain::ports::{ImageHost, ImageUpload};

pub const UPLOAD_FOLDER: &str = "storefront/products";

#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

pub struct CloudinaryClient {
    http: reqwest::Client,
    config: Option<CloudinaryConfig>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

/// Hex SHA-256 of the `key=value` pairs sorted by key and joined with `&`, followed by the secret.
fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    hex::encode(Sha256::digest(format!("{joined}{api_secret}").as_bytes()))
}

/// Extracts the public id (folder path without version or extension) from a delivery URL.
pub fn public_id_from_url(url: &str) -> Option<String> {
    let (_, path) = url.split_once("/upload/")?;
    let path = path.split(['?', '#']).next().unwrap_or(path);

    let path = match path.split_once('/') {
        Some((first, rest))
            if first.len() > 1
                && first.starts_with('v')
                && first[1..].chars().all(|c| c.is_ascii_digit()) =>
        {
            rest
        }
        _ => path,
    };

    let id = match path.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => path,
    };
    (!id.is_empty()).then(|| id.to_string())
}

impl CloudinaryClient {
    pub fn new(http: reqwest::Client, config: Option<CloudinaryConfig>) -> Self {
        Self { http, config }
    }

    fn endpoint(config: &CloudinaryConfig, action: &str) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/image/{action}",
            config.cloud_name
        )
    }
}

#[async_trait]
impl ImageHost for CloudinaryClient {
    async fn upload(&self, image: ImageUpload) -> Result<String, DomainError> {
        let Some(config) = &self.config else {
            return Err(DomainError::upstream("Image storage is not configured"));
        };

        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign(
            &[("folder", UPLOAD_FOLDER), ("timestamp", &timestamp)],
            &config.api_secret,
        );

        let file = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.content_type)?;
        let form = Form::new()
            .part("file", file)
            .text("api_key", config.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", UPLOAD_FOLDER)
            .text("signature_algorithm", "sha256")
            .text("signature", signature);

        let resp = self
            .http
            .post(Self::endpoint(config, "upload"))
            .multipart(form)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DomainError::upstream(format!(
                "Cloudinary upload error: {status} - {body}"
            )));
        }

        let uploaded: UploadResponse = resp.json().await?;
        Ok(uploaded.secure_url)
    }

    async fn delete(&self, url: &str) -> Result<(), DomainError> {
        let Some(config) = &self.config else {
            log::warn!("Cloudinary is not configured; skipping deletion of {url}");
            return Ok(());
        };
        let Some(public_id) = public_id_from_url(url) else {
            log::warn!("Not a Cloudinary URL, skipping deletion: {url}");
            return Ok(());
        };

        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign(
            &[("public_id", &public_id), ("timestamp", &timestamp)],
            &config.api_secret,
        );
        let params = [
            ("public_id", public_id.as_str()),
            ("timestamp", timestamp.as_str()),
            ("api_key", config.api_key.as_str()),
            ("signature_algorithm", "sha256"),
            ("signature", signature.as_str()),
        ];

        let resp = self
            .http
            .post(Self::endpoint(config, "destroy"))
            .form(&params)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DomainError::upstream(format!(
                "Cloudinary delete error: {status} - {body}"
            )));
        }

        let destroyed: DestroyResponse = resp.json().await?;
        log::info!("Deleted image {public_id}: {}", destroyed.result);
        Ok(())
    }
}
