use anyhow::Result;
use colored::Colorize;
use spx_alert_engine::api_server_axum;
use spx_alert_engine::app_config::{AppConfig, Mode};
use spx_alert_engine::commands::EngineCommands;
use spx_alert_engine::logging;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional; real environment variables win
    let _ = dotenvy::dotenv();
    logging::init_logging();

    let config = AppConfig::from_env();
    let mode = match config.validate() {
        Ok(mode) => mode,
        Err(e) => {
            eprintln!("{} {}", "✗".red(), e);
            eprintln!("Set ENGINE_MODE environment variable to control execution mode");
            eprintln!("Examples:");
            eprintln!("  ENGINE_MODE=single ENGINE_SNAPSHOT=snapshot.json cargo run");
            eprintln!("  ENGINE_MODE=batch ENGINE_SNAPSHOT_DIR=snapshots cargo run");
            eprintln!("  ENGINE_MODE=server ENGINE_PORT=3001 cargo run");
            std::process::exit(1);
        }
    };
    info!(mode = %config.mode, "starting");

    match mode {
        Mode::Single => EngineCommands::run_single(&config)?,
        Mode::Batch => {
            // rayon work stays off the async runtime threads
            let cfg = config.clone();
            tokio::task::spawn_blocking(move || EngineCommands::run_batch(&cfg)).await??
        }
        Mode::Server => api_server_axum::start_server(config.port, config.engine).await?,
    }

    Ok(())
}
