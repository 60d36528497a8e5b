use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::{errors::DashboardError, models::schema::TableName};

pub mod http;

/// Body of `POST /upload-csv`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadRequest {
    pub data: Vec<Value>,
    pub table_name: TableName,
}

#[async_trait]
pub trait SalesBackend {
    async fn upload(&self, request: &UploadRequest) -> Result<(), DashboardError>;
    /// Raw rows of an aggregate endpoint: each element is one positional array.
    async fn fetch_rows(&self, endpoint: &str) -> Result<Vec<Value>, DashboardError>;
}

#[cfg(test)]
mockall::mock! {
    pub Backend {}

    #[async_trait]
    impl SalesBackend for Backend {
        async fn upload(&self, request: &UploadRequest) -> Result<(), DashboardError>;
        async fn fetch_rows(&self, endpoint: &str) -> Result<Vec<Value>, DashboardError>;
    }
}
