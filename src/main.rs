use clap::{Parser, Subcommand};
use monitor_inventory::{
    cmd::{self, AggregateArgs, ImportArgs, aggregate, import},
    config::AppConfig,
};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding `app.yaml`, `monitors.yaml` and `locations.yaml`.
    #[arg(long, global = true)]
    config_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Loads monitor records from a YAML file into the monitor store.
    Import(ImportArgs),
    /// Aggregates the monitor inventory and prints it as JSON.
    Aggregate(AggregateArgs),
}

#[tokio::main]
async fn main() -> Result<(), cmd::Error> {
    // Initialize tracing subscriber
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install tracing subscriber: {e}");
    }

    let cli = Cli::parse();

    tracing::debug!("Loading application configuration...");
    let config = AppConfig::new(cli.config_dir.as_deref())?;
    tracing::debug!(
        database_url = %config.database_url,
        page_size = config.page_size,
        "Configuration loaded."
    );

    match cli.command {
        Commands::Import(args) => import::execute(&config, args).await?,
        Commands::Aggregate(args) => aggregate::execute(&config, args).await?,
    }

    Ok(())
}
