use crate::{dataset::Dataset, errors::DashboardError};

use super::{DashboardUI, StatusMessage};

impl DashboardUI {
    /// Reloads every section for the current mode.
    pub async fn refresh(&mut self) {
        let overview = self.dashboard.load_overview(self.mode).await;

        let town_count = overview
            .by_shop_by_product
            .as_ref()
            .map(|report| report.towns().len())
            .unwrap_or(0);
        if self.selected_town >= town_count {
            self.selected_town = town_count.saturating_sub(1);
        }

        self.overview = Some(overview);
    }

    pub async fn toggle_mode(&mut self) {
        self.mode = self.mode.toggle();
        log::info!("Analysis mode set to {}", self.mode);
        self.refresh().await;
    }

    /// Parses the file named in the path input and keeps it for upload.
    pub fn load_dataset(&mut self) {
        let path = self.path_input.trim().to_string();
        if path.is_empty() {
            self.status = Some(StatusMessage::Error(
                "Indiquez le chemin d'un fichier CSV".to_string(),
            ));
            return;
        }

        match Dataset::from_path(&path) {
            Ok(dataset) => {
                self.status = Some(match dataset.classify() {
                    Some(table) => StatusMessage::Info(format!(
                        "{} lignes chargées, table détectée: {}",
                        dataset.len(),
                        table
                    )),
                    None => StatusMessage::Error(DashboardError::UnknownTable.to_string()),
                });
                self.dataset = Some(dataset);
            }
            Err(err) => {
                log::warn!("Could not load {}: {}", path, err);
                self.dataset = None;
                self.status = Some(StatusMessage::Error(err.to_string()));
            }
        }
    }

    pub async fn upload_dataset(&mut self) {
        let Some(dataset) = &self.dataset else {
            self.status = Some(StatusMessage::Error(
                "Aucun fichier chargé".to_string(),
            ));
            return;
        };

        match self.dashboard.upload(dataset).await {
            Ok(_) => {
                self.status = Some(StatusMessage::Success(
                    "Données importées avec succès!".to_string(),
                ));
                self.refresh().await;
            }
            Err(err) => {
                self.status = Some(StatusMessage::Error(err.to_string()));
            }
        }
    }
}
