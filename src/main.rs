use std::env;
use std::fs::OpenOptions;
use std::sync::Arc;

use env_logger::{Env, Target};
use salesboard::api::http::HttpBackend;
use salesboard::client::DashboardUI;
use salesboard::models::connections::BackendConfig;
use salesboard::Dashboard;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    let config = BackendConfig::from_env()?;

    // The terminal belongs to the UI, so logs go to a file.
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)?;
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(log_file)))
        .init();

    log::info!("Starting salesboard against {}", config.base_url);
    let backend = HttpBackend::new(config)?;
    let dashboard = Dashboard::new(Arc::new(backend));

    let mut tui = DashboardUI::new(dashboard);
    if let Some(path) = env::args().nth(1) {
        tui.path_input = path;
        tui.load_dataset();
    }
    tui.run_ui().await?;

    Ok(())
}
