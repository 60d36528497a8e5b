use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

use crate::{errors::DashboardError, models::connections::BackendConfig};

use super::{SalesBackend, UploadRequest};

pub const UPLOAD_PATH: &str = "/upload-csv";

/// `SalesBackend` over HTTP/JSON.
pub struct HttpBackend {
    config: BackendConfig,
    http: reqwest::Client,
}

impl HttpBackend {
    pub fn new(config: BackendConfig) -> Result<Self, DashboardError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self { config, http })
    }
}

#[async_trait]
impl SalesBackend for HttpBackend {
    async fn upload(&self, request: &UploadRequest) -> Result<(), DashboardError> {
        let url = self.config.url(UPLOAD_PATH);
        log::info!(
            "Uploading {} records to table {} via {}",
            request.data.len(),
            request.table_name,
            url
        );

        let response = self.http.post(&url).json(request).send().await?;
        let status = response.status();
        if status == StatusCode::OK {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let err = backend_error(status, &body);
        log::warn!("Upload rejected: {}", err);
        Err(err)
    }

    async fn fetch_rows(&self, endpoint: &str) -> Result<Vec<Value>, DashboardError> {
        let url = self.config.url(endpoint);
        log::debug!("GET {}", url);

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = backend_error(status, &body);
            log::warn!("{} failed: {}", endpoint, err);
            return Err(err);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| DashboardError::Decode(format!("{}: {}", endpoint, e)))?;

        match body {
            Value::Array(rows) => Ok(rows),
            other => Err(DashboardError::Decode(format!(
                "{}: tableau JSON attendu, reçu {}",
                endpoint,
                json_kind(&other)
            ))),
        }
    }
}

/// Builds the error for a non-success answer. The `error` field of a JSON body
/// is kept verbatim; otherwise the raw body, then the status reason, is used.
pub fn backend_error(status: StatusCode, body: &str) -> DashboardError {
    let from_field = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| match value.get("error") {
            Some(Value::String(message)) => Some(message.clone()),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        });

    let message = from_field.unwrap_or_else(|| {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            status
                .canonical_reason()
                .unwrap_or("erreur inconnue")
                .to_string()
        } else {
            trimmed.to_string()
        }
    });

    DashboardError::Backend {
        status: status.as_u16(),
        message,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "un booléen",
        Value::Number(_) => "un nombre",
        Value::String(_) => "une chaîne",
        Value::Array(_) => "un tableau",
        Value::Object(_) => "un objet",
    }
}
