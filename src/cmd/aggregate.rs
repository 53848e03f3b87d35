use std::sync::Arc;

use clap::Parser;

use super::Error;
use crate::{
    config::AppConfig,
    engine::InventoryAggregator,
    persistence::SqliteMonitorStore,
    providers::{FileLocationDirectory, FindQuery, SortOrder},
};

/// Arguments of the `aggregate` command.
#[derive(Parser, Debug, Default)]
pub struct AggregateArgs {
    /// Only aggregate monitors whose name or query id contains this text.
    #[arg(short, long)]
    search: Option<String>,
    /// Field to page through the store by (`name` or `query_id`).
    #[arg(long)]
    sort_field: Option<String>,
    /// Sort order (`asc` or `desc`).
    #[arg(long)]
    sort_order: Option<String>,
    /// Number of records per page. Overrides the configured page size.
    #[arg(long)]
    page_size: Option<usize>,
    /// Pretty-print the JSON result.
    #[arg(long)]
    pretty: bool,
}

impl AggregateArgs {
    /// Builds the find query from the configured defaults and these
    /// arguments.
    pub fn find_query(&self, config: &AppConfig) -> Result<FindQuery, Error> {
        let mut query = config.find_query();
        if let Some(search) = &self.search {
            query.search = Some(search.clone());
        }
        if let Some(field) = &self.sort_field {
            query.sort_field = Some(field.clone());
        }
        if let Some(order) = &self.sort_order {
            query.sort_order = Some(order.parse::<SortOrder>()?);
        }
        if let Some(page_size) = self.page_size {
            query.page_size = page_size;
        }
        query.validate()?;
        Ok(query)
    }
}

/// Runs one aggregation over the SQLite monitor store and prints the result
/// as JSON.
pub async fn execute(config: &AppConfig, args: AggregateArgs) -> Result<(), Error> {
    let query = args.find_query(config)?;

    let store = Arc::new(SqliteMonitorStore::new(&config.database_url).await?);
    store.run_migrations().await?;
    let directory = Arc::new(FileLocationDirectory::new(&config.locations_path));

    let aggregator = InventoryAggregator::new(store.clone(), directory);
    let result = aggregator.aggregate(&query).await?;

    let output = if args.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{output}");

    store.close().await;
    Ok(())
}
