//! Loads `ItemReader`-backed mock item sets from disk, auto-detecting
//! format by file extension: `.json`, `.jsonl`/`.ndjson`, `.csv`, `.yaml`/`.yml`.

use crate::error::MockError;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Resolve a mock-relative path against the configured mock base directory.
/// An absolute `raw` path is returned unchanged.
#[must_use]
pub fn resolve_path(base: Option<&Path>, raw: &str) -> PathBuf {
    let candidate = Path::new(raw);
    if candidate.is_absolute() {
        return candidate.to_path_buf();
    }
    match base {
        Some(b) => b.join(candidate),
        None => candidate.to_path_buf(),
    }
}

/// Load a list of JSON values from `path`, dispatching on its extension.
pub fn load_items(path: &Path) -> Result<Vec<Value>, MockError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match ext.as_str() {
        "json" => load_json(path),
        "jsonl" | "ndjson" => load_jsonl(path),
        "csv" => load_csv(path),
        "yaml" | "yml" => load_yaml(path),
        other => Err(MockError::UnknownFormat {
            path: format!("{} (extension '{other}')", path.display()),
        }),
    }
}

fn read_to_string(path: &Path) -> Result<String, MockError> {
    std::fs::read_to_string(path).map_err(|e| MockError::FileRead {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn load_json(path: &Path) -> Result<Vec<Value>, MockError> {
    let text = read_to_string(path)?;
    let value: Value = serde_json::from_str(&text).map_err(|e| MockError::FileRead {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    match value {
        Value::Array(items) => Ok(items),
        other => Ok(vec![other]),
    }
}

fn load_jsonl(path: &Path) -> Result<Vec<Value>, MockError> {
    let text = read_to_string(path)?;
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            serde_json::from_str(line).map_err(|e| MockError::FileRead {
                path: path.display().to_string(),
                reason: e.to_string(),
            })
        })
        .collect()
}

fn load_csv(path: &Path) -> Result<Vec<Value>, MockError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| MockError::FileRead {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let headers = reader
        .headers()
        .map_err(|e| MockError::FileRead {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?
        .clone();
    let mut out = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| MockError::FileRead {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let mut obj = serde_json::Map::new();
        for (header, field) in headers.iter().zip(record.iter()) {
            obj.insert(header.to_string(), Value::String(field.to_string()));
        }
        out.push(Value::Object(obj));
    }
    Ok(out)
}

fn load_yaml(path: &Path) -> Result<Vec<Value>, MockError> {
    let text = read_to_string(path)?;
    let value: serde_yaml::Value = serde_yaml::from_str(&text).map_err(|e| MockError::FileRead {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let json_value: Value = serde_json::to_value(value).map_err(|e| MockError::FileRead {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    match json_value {
        Value::Array(items) => Ok(items),
        other => Ok(vec![other]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_path_joins_relative_against_base() {
        let base = Path::new("/mocks");
        assert_eq!(resolve_path(Some(base), "items.json"), PathBuf::from("/mocks/items.json"));
        assert_eq!(resolve_path(Some(base), "/abs/items.json"), PathBuf::from("/abs/items.json"));
    }

    #[test]
    fn load_json_accepts_array_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.json");
        std::fs::write(&path, r#"[{"a":1},{"a":2}]"#).unwrap();
        let items = load_items(&path).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn load_jsonl_splits_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.jsonl");
        std::fs::write(&path, "{\"a\":1}\n{\"a\":2}\n").unwrap();
        let items = load_items(&path).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn load_csv_converts_rows_to_string_objects() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.csv");
        std::fs::write(&path, "a,b\n1,x\n2,y\n").unwrap();
        let items = load_items(&path).unwrap();
        assert_eq!(items, vec![serde_json::json!({"a": "1", "b": "x"}), serde_json::json!({"a": "2", "b": "y"})]);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.txt");
        std::fs::write(&path, "x").unwrap();
        assert!(matches!(load_items(&path), Err(MockError::UnknownFormat { .. })));
    }
}
