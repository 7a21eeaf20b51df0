pub mod app;
mod transfer;

use anyhow::Result;
use ferry_transfer::ReqwestClient;

pub use app::{App, Commands};

use crate::env::load_config;

pub async fn run(app: App) -> Result<()> {
    let config = load_config(app.config.as_deref())?;
    let client = ReqwestClient::new();

    match app.cmd {
        Commands::Download(arg) => transfer::download(client, config, arg, app.json).await,
        Commands::Upload(arg) => transfer::upload(client, config, arg, app.json).await,
    }
}
