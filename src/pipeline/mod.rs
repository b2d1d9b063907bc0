// src/pipeline/mod.rs

use anyhow::{anyhow, bail, Context, Result};
use std::{fs, path::Path};
use tracing::{error, info, instrument, warn};

use crate::ai::Generator;
use crate::fetch::PageSource;
use crate::schema::{extract_table_info, normalize, ResultSet, StructureStore};

/// Known-good table used to validate the environment before a batch run.
pub const SMOKE_TEST_TABLE: &str = "TCURR";

const LIST_HEADER_TOKEN: &str = "table_name";

/// Read the table list: one identifier per line, stripped of whitespace and
/// surrounding quote/comma artifacts. The header line and blank lines are
/// skipped. A missing file or an empty resulting list is fatal for the run.
pub fn load_table_list(path: &Path) -> Result<Vec<String>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading table list {:?}", path))?;

    let tables: Vec<String> = text
        .lines()
        .map(|line| {
            line.trim()
                .trim_matches(|c| c == '"' || c == ',')
                .trim()
                .to_string()
        })
        .filter(|name| !name.is_empty() && !name.starts_with(LIST_HEADER_TOKEN))
        .collect();

    if tables.is_empty() {
        bail!("table list {:?} is empty", path);
    }
    Ok(tables)
}

/// Drive fetch → extract → normalize for every table in input order.
///
/// Each table is processed in isolation: any failure is logged with the
/// table name and the loop moves on. After every successful normalization
/// the whole accumulated set is persisted, so an interrupted run keeps
/// everything completed before the interruption.
#[instrument(level = "info", skip_all, fields(tables = tables.len()))]
pub async fn process_tables<S, G>(
    source: &S,
    generator: &G,
    tables: &[String],
    store: &StructureStore,
) -> Result<ResultSet>
where
    S: PageSource,
    G: Generator,
{
    let mut results = ResultSet::new();

    for table in tables {
        info!(table = %table, "processing table");

        let page = match source.fetch(table).await {
            Ok(Some(page)) => page,
            Ok(None) => {
                warn!(table = %table, "no page found; skipping");
                continue;
            }
            Err(e) => {
                warn!(table = %table, error = %e, "fetch failed; skipping");
                continue;
            }
        };

        let table_info = extract_table_info(table, &page);
        if table_info.fields.is_empty() {
            info!(table = %table, "no fields extracted; skipping");
            continue;
        }

        let schema = match normalize(generator, &table_info).await {
            Some(schema) => schema,
            None => {
                info!(table = %table, "no valid structure; skipping");
                continue;
            }
        };

        results.insert(table.clone(), schema);
        info!(table = %table, total = results.len(), "structure generated");

        if let Err(e) = store.persist(&results) {
            error!(table = %table, error = %e, "persisting result set failed");
        }
    }

    Ok(results)
}

/// Run the pipeline for the single known-good table before the batch.
///
/// Any failure here is treated as environmental (unreachable source, bad
/// credentials, broken transformer) and aborts the whole run; the caller
/// must not start batch processing.
#[instrument(level = "info", skip_all)]
pub async fn smoke_test<S, G>(source: &S, generator: &G, store: &StructureStore) -> Result<()>
where
    S: PageSource,
    G: Generator,
{
    info!(table = SMOKE_TEST_TABLE, "running smoke test");

    let page = source
        .fetch(SMOKE_TEST_TABLE)
        .await
        .with_context(|| format!("smoke test fetch for {}", SMOKE_TEST_TABLE))?
        .ok_or_else(|| anyhow!("no page found for smoke test table {}", SMOKE_TEST_TABLE))?;

    let table_info = extract_table_info(SMOKE_TEST_TABLE, &page);
    if table_info.fields.is_empty() {
        bail!("no fields extracted for smoke test table {}", SMOKE_TEST_TABLE);
    }

    let schema = normalize(generator, &table_info)
        .await
        .ok_or_else(|| anyhow!("no valid structure for smoke test table {}", SMOKE_TEST_TABLE))?;

    let mut results = ResultSet::new();
    results.insert(SMOKE_TEST_TABLE.to_string(), schema);
    store.persist(&results).context("persisting smoke test result")?;

    info!(path = ?store.path(), "smoke test passed");
    Ok(())
}
