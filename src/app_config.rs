use crate::engine::EngineConfig;
use anyhow::{Result, bail};
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_SNAPSHOT: &str = "snapshot.json";
pub const DEFAULT_SNAPSHOT_DIR: &str = "snapshots";
pub const BATCH_OUTPUT_FILE: &str = "batch_report.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Single,
    Batch,
    Server,
}

impl Mode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "single" => Some(Mode::Single),
            "batch" => Some(Mode::Batch),
            "server" => Some(Mode::Server),
            _ => None,
        }
    }
}

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mode: String,
    pub port: u16,
    pub snapshot: PathBuf,
    pub snapshot_dir: PathBuf,
    pub engine: EngineConfig,
}

impl AppConfig {
    /// Create new configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            mode: std::env::var("ENGINE_MODE").unwrap_or_else(|_| "single".to_string()),
            port: Self::get_port(),
            snapshot: std::env::var("ENGINE_SNAPSHOT")
                .unwrap_or_else(|_| DEFAULT_SNAPSHOT.to_string())
                .into(),
            snapshot_dir: std::env::var("ENGINE_SNAPSHOT_DIR")
                .unwrap_or_else(|_| DEFAULT_SNAPSHOT_DIR.to_string())
                .into(),
            engine: EngineConfig::from_env(),
        }
    }

    fn get_port() -> u16 {
        std::env::var("ENGINE_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT)
    }

    pub fn validate(&self) -> Result<Mode> {
        let Some(mode) = Mode::parse(&self.mode) else {
            bail!("Invalid mode '{}'. Use 'single', 'batch' or 'server'", self.mode);
        };

        let options = &self.engine.options;
        if options.delta_min > options.delta_max {
            bail!(
                "OPT_PREFERRED_DELTA_MIN ({}) is above OPT_PREFERRED_DELTA_MAX ({})",
                options.delta_min,
                options.delta_max
            );
        }
        if options.max_spread < 0.0 {
            bail!("OPT_MAX_SPREAD must not be negative ({})", options.max_spread);
        }
        Ok(mode)
    }
}
