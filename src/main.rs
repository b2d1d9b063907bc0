use anyhow::{Context, Result};
use reqwest::Client;
use sapscraper::{
    ai::GeminiClient,
    config::Config,
    fetch::PageClient,
    pipeline::{self, load_table_list},
    schema::StructureStore,
};
use std::fs;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) configuration ────────────────────────────────────────────
    let config = Config::from_env()?;
    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("creating {:?}", config.output_dir))?;

    // ─── 2) init logging: console + rolling file ─────────────────────
    let file_appender = tracing_appender::rolling::daily(config.log_dir(), "app.log");
    let (file_writer, _guard) = tracing_appender::non_blocking(file_appender);
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env)
        .with(fmt::layer())
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .init();
    info!("startup");

    std::panic::set_hook(Box::new(|info| {
        eprintln!("panic: {:?}", info);
    }));

    // ─── 3) wire up collaborators ────────────────────────────────────
    let client = Client::new();
    let source = PageClient::new(client.clone(), config.base_url.clone());
    let generator = GeminiClient::new(client, config.api_key.clone(), config.model.clone());

    // ─── 4) smoke test on a known-good table ─────────────────────────
    let smoke_store = StructureStore::new(config.smoke_path());
    if let Err(e) = pipeline::smoke_test(&source, &generator, &smoke_store).await {
        error!(error = %e, "smoke test failed; aborting run");
        return Err(e);
    }

    // ─── 5) load the table list ──────────────────────────────────────
    let tables = load_table_list(&config.tables_file)?;
    info!(count = tables.len(), "tables to process");

    // ─── 6) run the batch ────────────────────────────────────────────
    let store = StructureStore::new(config.structure_path());
    let results = pipeline::process_tables(&source, &generator, &tables, &store).await?;

    info!(generated = results.len(), path = ?store.path(), "all done");
    Ok(())
}
