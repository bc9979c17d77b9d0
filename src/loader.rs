use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};

use crate::document::StatsDocument;

/// A successfully loaded stats file. The raw text is kept verbatim so export
/// can reproduce the input byte for byte, with no re-serialization.
#[derive(Debug)]
pub struct LoadedDocument {
    pub document: StatsDocument,
    pub raw: String,
    pub name: String,
    pub loaded_at: DateTime<Local>,
}

/// Read and parse a stats file. A parse failure propagates as-is (the
/// `serde_json::Error` stays downcastable in the chain); the caller decides
/// whether to surface it or keep showing a previously loaded document.
pub fn load(path: &Path) -> Result<LoadedDocument> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;

    let document: StatsDocument = serde_json::from_str(&raw)
        .with_context(|| format!("parsing stats document {}", path.display()))?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(LoadedDocument {
        document,
        raw,
        name,
        loaded_at: Local::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_valid_document() {
        let path = temp_file(
            "pulseboard_test_valid.json",
            r#"{"summary": {"total_messages": 42}, "by_sender": [{"sender": "ana", "count": 7}]}"#,
        );

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.document.summary.total_messages, 42);
        assert_eq!(loaded.document.by_sender.len(), 1);
        assert_eq!(loaded.name, "pulseboard_test_valid.json");
        // Raw text is the file verbatim, not a re-serialization.
        assert!(loaded.raw.contains("\"total_messages\": 42"));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_invalid_content_is_a_parse_error() {
        let path = temp_file("pulseboard_test_invalid.json", "not json at all");

        let err = load(&path).unwrap_err();
        assert!(err.downcast_ref::<serde_json::Error>().is_some());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_missing_file_is_not_a_parse_error() {
        let path = std::env::temp_dir().join("pulseboard_test_does_not_exist.json");
        let err = load(&path).unwrap_err();
        assert!(err.downcast_ref::<serde_json::Error>().is_none());
        assert!(err.downcast_ref::<std::io::Error>().is_some());
    }

    #[test]
    fn test_empty_object_degrades_to_defaults() {
        let path = temp_file("pulseboard_test_empty.json", "{}");

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.document.summary.total_messages, 0);
        assert!(loaded.document.by_pillar.is_empty());

        let _ = fs::remove_file(&path);
    }
}
