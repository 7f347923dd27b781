use anyhow::{Context, Result};
use quiz_importer::{config::Config, logging::init_tracing, store::MongoQuizStore};

fn main() -> Result<()> {
    init_tracing();

    let config = Config::load().context("Failed to load configuration")?;
    let store = MongoQuizStore::connect(&config.mongo_uri, &config.mongo_database)
        .context("Failed to connect to MongoDB")?;

    let summary = store.summary().context("Failed to summarize the quiz store")?;
    summary.log();
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
