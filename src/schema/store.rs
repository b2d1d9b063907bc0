// src/schema/store.rs

use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

use super::types::ResultSet;

/// Writes the accumulated result set to a fixed path as pretty-printed JSON.
///
/// Every write is a complete snapshot staged to a `.tmp` sibling and renamed
/// into place, so an interrupted run leaves the previous snapshot intact.
pub struct StructureStore {
    path: PathBuf,
}

impl StructureStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the stored snapshot with the full current result set.
    pub fn persist(&self, results: &ResultSet) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {:?}", parent))?;
            }
        }

        let json = serde_json::to_string_pretty(results).context("serializing result set")?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, json.as_bytes())
            .with_context(|| format!("writing {:?}", tmp))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("renaming {:?} to {:?}", tmp, self.path))?;

        debug!(path = ?self.path, entries = results.len(), "persisted result set");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::{CanonicalSchema, FieldRecord};
    use tempfile::tempdir;

    fn schema(name: &str) -> CanonicalSchema {
        CanonicalSchema {
            name: name.to_string(),
            description: String::new(),
            fields: vec![FieldRecord {
                name: "MANDT".to_string(),
                data_element: "MANDT".to_string(),
                ty: "CLNT".to_string(),
                length: "3".to_string(),
                decimals: "0".to_string(),
            }],
        }
    }

    #[test]
    fn persists_and_reads_back_in_order() {
        let dir = tempdir().unwrap();
        let store = StructureStore::new(dir.path().join("structures.json"));

        let mut results = ResultSet::new();
        results.insert("TCURR".to_string(), schema("TCURR"));
        results.insert("T001".to_string(), schema("T001"));
        store.persist(&results).unwrap();

        let text = fs::read_to_string(store.path()).unwrap();
        // pretty-printed with nested indentation
        assert!(text.contains("\n  \"TCURR\""));
        let read: ResultSet = serde_json::from_str(&text).unwrap();
        assert_eq!(read, results);
        let keys: Vec<&String> = read.keys().collect();
        assert_eq!(keys, ["TCURR", "T001"]);
    }

    #[test]
    fn later_write_overwrites_wholesale() {
        let dir = tempdir().unwrap();
        let store = StructureStore::new(dir.path().join("structures.json"));

        let mut results = ResultSet::new();
        results.insert("TCURR".to_string(), schema("TCURR"));
        store.persist(&results).unwrap();
        results.insert("T001".to_string(), schema("T001"));
        store.persist(&results).unwrap();

        let read: ResultSet =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(read.len(), 2);
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = tempdir().unwrap();
        let store = StructureStore::new(dir.path().join("nested/out/structures.json"));
        store.persist(&ResultSet::new()).unwrap();
        assert!(store.path().is_file());
    }

    #[test]
    fn serialized_field_uses_type_key() {
        let dir = tempdir().unwrap();
        let store = StructureStore::new(dir.path().join("structures.json"));
        let mut results = ResultSet::new();
        results.insert("TCURR".to_string(), schema("TCURR"));
        store.persist(&results).unwrap();

        let text = fs::read_to_string(store.path()).unwrap();
        assert!(text.contains("\"type\": \"CLNT\""));
        assert!(!text.contains("\"ty\""));
    }
}
