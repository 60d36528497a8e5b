use thiserror::Error;

/// Custom error type for dashboard operations.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// The dataset's columns match none of the destination tables.
    #[error("Le format du fichier ne correspond à aucune table")]
    UnknownTable,
    /// Non-success answer from the backend, message taken from its `error` field.
    #[error("Erreur: {message}")]
    Backend { status: u16, message: String },
    /// Transport failure (connection refused, timeout, ...).
    #[error("Erreur de connexion au serveur: {0}")]
    Http(#[from] reqwest::Error),
    /// Response body does not have the expected shape.
    #[error("Réponse inattendue du serveur: {0}")]
    Decode(String),
    #[error("Erreur de lecture du CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("Erreur d'accès au fichier: {0}")]
    Io(#[from] std::io::Error),
    #[error("Fichier non pris en charge: {0}")]
    UnsupportedFile(String),
    /// Configuration error (e.g., invalid backend URL or timeout).
    #[error("Erreur de configuration: {0}")]
    Config(String),
}
