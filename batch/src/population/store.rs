//! JSON population store: one document per model, keyed by channel.

use crate::population::table::{Column, PopulationTable};
use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoredChannel {
    columns: Vec<Column>,
}

type Document = BTreeMap<String, StoredChannel>;

pub fn model_path(dir: &Path, model: &str) -> PathBuf {
    dir.join(format!("{}.json", model))
}

fn read_document(path: &Path) -> anyhow::Result<Document> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading population store {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("parsing population store {}", path.display()))
}

pub fn read_channel(path: &Path, channel: &str) -> anyhow::Result<PopulationTable> {
    let mut document = read_document(path)?;
    let stored = document.remove(channel).ok_or_else(|| {
        let available: Vec<_> = document.keys().map(String::as_str).collect();
        anyhow!(
            "channel {} not found in {} (available: {})",
            channel,
            path.display(),
            available.join(", ")
        )
    })?;
    PopulationTable::from_columns(stored.columns)
        .with_context(|| format!("channel {} in {}", channel, path.display()))
}

/// Writes `table` as `channel`, keeping any other channels already in the file.
pub fn write_channel(path: &Path, channel: &str, table: &PopulationTable) -> anyhow::Result<()> {
    let mut document = if path.exists() {
        read_document(path)?
    } else {
        Document::new()
    };
    document.insert(
        channel.to_string(),
        StoredChannel {
            columns: table.columns().to_vec(),
        },
    );

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(&document).context("serializing population")?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::population::table::tests::two_row_table;
    use tempfile::TempDir;

    #[test]
    fn channel_survives_write_and_read() {
        let dir = TempDir::new().unwrap();
        let path = model_path(dir.path(), "model_a");
        assert!(path.ends_with("model_a.json"));

        let table = two_row_table();
        write_channel(&path, "BBH", &table).unwrap();
        let restored = read_channel(&path, "BBH").unwrap();
        assert_eq!(restored, table);
        assert_eq!(restored.column("z").unwrap().values[1], None);
    }

    #[test]
    fn writing_a_channel_preserves_the_others() {
        let dir = TempDir::new().unwrap();
        let path = model_path(&dir.path().join("nested"), "model_b");
        let table = two_row_table();
        write_channel(&path, "BBH", &table).unwrap();

        let mut updated = table.clone();
        updated.set_column("pdet_design", vec![Some(0.5), Some(0.25)]).unwrap();
        write_channel(&path, "BNS", &updated).unwrap();
        write_channel(&path, "BNS", &updated).unwrap();

        assert_eq!(read_channel(&path, "BBH").unwrap(), table);
        assert_eq!(read_channel(&path, "BNS").unwrap(), updated);
    }

    #[test]
    fn missing_channel_lists_available_ones() {
        let dir = TempDir::new().unwrap();
        let path = model_path(dir.path(), "model_c");
        write_channel(&path, "BBH", &two_row_table()).unwrap();
        let err = read_channel(&path, "NSBH").unwrap_err().to_string();
        assert!(err.contains("NSBH"));
        assert!(err.contains("BBH"));
    }

    #[test]
    fn reads_hand_written_documents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hand.json");
        fs::write(
            &path,
            r#"{"BBH": {"columns": [
                {"name": "m1", "values": [10.0]}, {"name": "m2", "values": [8]},
                {"name": "s1x", "values": [0]}, {"name": "s1y", "values": [0]},
                {"name": "s1z", "values": [0.1]}, {"name": "s2x", "values": [0]},
                {"name": "s2y", "values": [0]}, {"name": "s2z", "values": [0]},
                {"name": "z", "values": [null]}]}}"#,
        )
        .unwrap();
        let systems = read_channel(&path, "BBH").unwrap().systems().unwrap();
        assert_eq!(systems.len(), 1);
        assert_eq!(systems[0].spin1, [0.0, 0.0, 0.1]);
        assert_eq!(systems[0].redshift, None);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(read_channel(&dir.path().join("absent.json"), "BBH").is_err());
    }
}
