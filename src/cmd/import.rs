use std::path::PathBuf;

use clap::Parser;

use super::Error;
use crate::{
    config::{AppConfig, ConfigLoader},
    models::MonitorRecord,
    persistence::SqliteMonitorStore,
};

/// Arguments of the `import` command.
#[derive(Parser, Debug)]
pub struct ImportArgs {
    /// Path to the monitor file. Defaults to `monitors.yaml` in the config
    /// directory.
    #[arg(short, long)]
    file: Option<PathBuf>,
    /// Keep monitors already in the store instead of replacing them.
    #[arg(long)]
    append: bool,
}

/// Loads monitors from a YAML file into the SQLite monitor store.
pub async fn execute(config: &AppConfig, args: ImportArgs) -> Result<(), Error> {
    let path = args.file.unwrap_or_else(|| config.monitors_path.clone());
    tracing::debug!(path = %path.display(), "Loading monitors from file.");
    let monitors: Vec<MonitorRecord> = ConfigLoader::new(path).load("monitors")?;

    let store = SqliteMonitorStore::new(&config.database_url).await?;
    store.run_migrations().await?;

    if !args.append {
        store.clear_monitors().await?;
    }
    store.add_monitors(&monitors).await?;

    let total = store.count_monitors().await?;
    tracing::info!(imported = monitors.len(), total, "Monitor import completed.");
    store.close().await;
    Ok(())
}
