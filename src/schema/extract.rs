// src/schema/extract.rs

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument, trace};

use super::types::{FieldRecord, TableInfo};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Collapse internal whitespace runs and trim; reference-page cells carry
/// newlines and indentation from the surrounding markup.
fn clean(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

fn element_text(el: ElementRef) -> String {
    clean(&el.text().collect::<String>())
}

/// Parse one table's reference page into a `TableInfo`.
///
/// Never fails: a missing heading degrades to an empty description, a
/// missing or malformed field table degrades to an empty field list. The
/// caller decides what to do with a zero-field result.
#[instrument(level = "debug", skip(html), fields(html_len = html.len()))]
pub fn extract_table_info(table_name: &str, html: &str) -> TableInfo {
    let doc = Html::parse_document(html);

    let heading_sel = Selector::parse("h1").expect("selector should parse");
    let description = doc
        .select(&heading_sel)
        .next()
        .map(element_text)
        .unwrap_or_default();

    let table_sel = Selector::parse("table").expect("selector should parse");
    let row_sel = Selector::parse("tr").expect("selector should parse");
    let cell_sel = Selector::parse("td, th").expect("selector should parse");

    let mut fields = Vec::new();
    if let Some(table) = doc.select(&table_sel).next() {
        // first row is the header
        for row in table.select(&row_sel).skip(1) {
            let cells: Vec<String> = row.select(&cell_sel).map(element_text).collect();
            if cells.len() < 4 {
                trace!(cells = cells.len(), "dropping short row");
                continue;
            }
            // cell 2 is a non-semantic column in the source layout
            fields.push(FieldRecord {
                name: cells[0].clone(),
                data_element: cells[1].clone(),
                ty: cells[3].clone(),
                length: cells.get(4).cloned().unwrap_or_default(),
                decimals: cells.get(5).cloned().unwrap_or_default(),
            });
        }
    }

    debug!(table = %table_name, fields = fields.len(), "finished page extraction");
    TableInfo {
        table_name: table_name.to_string(),
        description,
        fields,
    }
}
