use std::sync::Arc;

use api::{SalesBackend, UploadRequest};
use dataset::Dataset;
use errors::DashboardError;
use models::schema::TableName;
use report::{AnalysisMode, Breakdown, Report};

pub mod api;
pub mod client;
pub mod dataset;
pub mod errors;
pub mod models;
pub mod report;

/// Per-session context: the backend every upload and read goes through.
#[derive(Clone)]
pub struct Dashboard {
    backend: Arc<dyn SalesBackend + Send + Sync>,
}

/// The three data sections of one mode. Each keeps its own outcome so a
/// failing endpoint only blanks its own section.
#[derive(Debug)]
pub struct Overview {
    pub mode: AnalysisMode,
    pub by_shop: Result<Report, DashboardError>,
    pub by_product: Result<Report, DashboardError>,
    pub by_shop_by_product: Result<Report, DashboardError>,
}

impl Dashboard {
    pub fn new(backend: Arc<dyn SalesBackend + Send + Sync>) -> Self {
        Dashboard { backend }
    }

    /// Classifies the dataset and posts it to the matching table. Nothing is
    /// sent when no table matches.
    pub async fn upload(&self, dataset: &Dataset) -> Result<TableName, DashboardError> {
        let table_name = dataset.classify().ok_or_else(|| {
            log::warn!(
                "No table matches columns {:?}, upload skipped",
                dataset.columns()
            );
            DashboardError::UnknownTable
        })?;

        let request = UploadRequest {
            data: dataset.to_records(),
            table_name,
        };
        self.backend.upload(&request).await?;

        log::info!("Uploaded {} rows into {}", dataset.len(), table_name);
        Ok(table_name)
    }

    pub async fn load_report(
        &self,
        mode: AnalysisMode,
        breakdown: Breakdown,
    ) -> Result<Report, DashboardError> {
        let endpoint = report::endpoint(mode, breakdown);
        let raw = self.backend.fetch_rows(endpoint).await?;
        Report::decode(mode, breakdown, raw)
    }

    pub async fn load_overview(&self, mode: AnalysisMode) -> Overview {
        Overview {
            mode,
            by_shop: self.load_section(mode, Breakdown::ByShop).await,
            by_product: self.load_section(mode, Breakdown::ByProduct).await,
            by_shop_by_product: self.load_section(mode, Breakdown::ByShopByProduct).await,
        }
    }

    async fn load_section(
        &self,
        mode: AnalysisMode,
        breakdown: Breakdown,
    ) -> Result<Report, DashboardError> {
        let result = self.load_report(mode, breakdown).await;
        if let Err(err) = &result {
            log::error!(
                "Loading {} failed: {}",
                report::endpoint(mode, breakdown),
                err
            );
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate;
    use serde_json::json;

    use super::*;
    use crate::api::MockBackend;

    fn dashboard(mock: MockBackend) -> Dashboard {
        Dashboard::new(Arc::new(mock))
    }

    fn dataset(csv: &str) -> Dataset {
        Dataset::from_reader(csv.as_bytes()).unwrap()
    }

    #[tokio::test]
    async fn test_upload_routes_to_classified_table() {
        let mut mock = MockBackend::new();
        mock.expect_upload()
            .withf(|request| {
                request.table_name == TableName::Products
                    && request.data == vec![json!({"ID Référence produit": "REF001", "Prix": 9.5})]
            })
            .times(1)
            .returning(|_| Ok(()));

        let table = dashboard(mock)
            .upload(&dataset("ID Référence produit,Prix\nREF001,9.5\n"))
            .await
            .unwrap();
        assert_eq!(table, TableName::Products);
    }

    #[tokio::test]
    async fn test_upload_without_match_sends_nothing() {
        let mut mock = MockBackend::new();
        mock.expect_upload().times(0);

        let result = dashboard(mock)
            .upload(&dataset("Date,Quantité\n2023-05-01,3\n"))
            .await;
        assert!(matches!(result, Err(DashboardError::UnknownTable)));
    }

    #[tokio::test]
    async fn test_upload_backend_error_is_verbatim() {
        let mut mock = MockBackend::new();
        mock.expect_upload().returning(|_| {
            Err(DashboardError::Backend {
                status: 400,
                message: "Doublon sur ID Magasin".to_string(),
            })
        });

        let err = dashboard(mock)
            .upload(&dataset("ID Magasin,Ville\n1,Paris\n"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Erreur: Doublon sur ID Magasin");
    }

    #[tokio::test]
    async fn test_load_report_uses_mode_endpoint() {
        let mut mock = MockBackend::new();
        mock.expect_fetch_rows()
            .with(predicate::eq("/sellsvaluebyproduct"))
            .times(1)
            .returning(|_| Ok(vec![json!(["REF001", "12.50"])]));

        let report = dashboard(mock)
            .load_report(AnalysisMode::Value, Breakdown::ByProduct)
            .await
            .unwrap();
        assert_eq!(report.total(), 12.5);
    }

    #[tokio::test]
    async fn test_overview_isolates_failures() {
        let mut mock = MockBackend::new();
        mock.expect_fetch_rows()
            .with(predicate::eq("/sellsbyshop"))
            .returning(|_| Ok(vec![json!(["Paris", 1, 10])]));
        mock.expect_fetch_rows()
            .with(predicate::eq("/sellsbyproduct"))
            .returning(|_| {
                Err(DashboardError::Backend {
                    status: 500,
                    message: "db down".to_string(),
                })
            });
        mock.expect_fetch_rows()
            .with(predicate::eq("/sellsbyshopbyproduct"))
            .returning(|_| Ok(vec![json!({"unexpected": true})]));

        let overview = dashboard(mock).load_overview(AnalysisMode::Volume).await;

        assert_eq!(overview.by_shop.unwrap().total(), 10.0);
        assert!(matches!(
            overview.by_product,
            Err(DashboardError::Backend { status: 500, .. })
        ));
        assert!(matches!(
            overview.by_shop_by_product,
            Err(DashboardError::Decode(_))
        ));
    }
}
