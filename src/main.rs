mod color;
mod config;
mod data;
mod dispatch;
mod error;
mod server;
mod state;
mod ui;

use anyhow::Context;

use config::Settings;
use state::AppState;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run().await {
        log::error!("{e:#}");
        eprintln!("launch-dash: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let settings = Settings::load()?;

    // The dataset is read once; nothing can be served without it.
    let dataset = data::loader::load_file(&settings.dataset_path)
        .context("cannot start dashboard without launch data")?;
    if dataset.is_empty() {
        log::warn!("dataset is empty, charts will have no data");
    } else if let Some((lo, hi)) = dataset.payload_bounds() {
        log::info!("Payload range {lo}-{hi} kg, sites: {:?}", dataset.sites());
    }

    server::serve(AppState::new(dataset, settings)).await
}
