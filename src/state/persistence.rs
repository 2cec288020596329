use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::diagram::Diagram;
use crate::util::time;

/// Extension given to saved diagram definition files
pub const FILE_EXTENSION: &str = "jsl";

/// Errors that can occur while saving or loading diagram definitions
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to serialize diagrams: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Failed to write '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid diagram file: {0}")]
    InvalidFile(String),
}

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// On-disk form of a set of diagram definitions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagramFile {
    /// Version of the application that wrote the file
    pub version: String,
    /// When the file was written, seconds since the epoch
    pub saved_at: u64,
    pub diagrams: Vec<Diagram>,
}

impl DiagramFile {
    pub fn new(diagrams: Vec<Diagram>) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            saved_at: time::timestamp_secs(),
            diagrams,
        }
    }
}

/// Appends `.jsl` unless the path already ends with it (case-insensitive)
pub fn with_file_extension(path: &Path) -> PathBuf {
    let has_extension = path
        .extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(FILE_EXTENSION));
    if has_extension {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_owned();
        name.push(".");
        name.push(FILE_EXTENSION);
        PathBuf::from(name)
    }
}

/// Writes `diagrams` in order. Returns the path actually written, which has
/// the `.jsl` extension.
pub fn save_diagrams(path: &Path, diagrams: Vec<Diagram>) -> PersistenceResult<PathBuf> {
    let path = with_file_extension(path);
    let json = serde_json::to_string_pretty(&DiagramFile::new(diagrams))?;
    fs::write(&path, json).map_err(|source| PersistenceError::WriteError {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Reads diagrams in file order
pub fn load_diagrams(path: &Path) -> PersistenceResult<Vec<Diagram>> {
    let json = fs::read_to_string(path).map_err(|source| PersistenceError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    let file: DiagramFile = serde_json::from_str(&json)?;

    if file.version != env!("CARGO_PKG_VERSION") {
        log::warn!(
            "'{}' was written by version {}, this is {}",
            path.display(),
            file.version,
            env!("CARGO_PKG_VERSION")
        );
    }
    Ok(file.diagrams)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::DiagramType;

    #[test]
    fn test_extension_added_once() {
        assert_eq!(with_file_extension(Path::new("/tmp/a")), PathBuf::from("/tmp/a.jsl"));
        assert_eq!(with_file_extension(Path::new("/tmp/a.JSL")), PathBuf::from("/tmp/a.JSL"));
        assert_eq!(with_file_extension(Path::new("/tmp/a.txt")), PathBuf::from("/tmp/a.txt.jsl"));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_diagrams(&dir.path().join("nope.jsl"));
        assert!(matches!(result, Err(PersistenceError::ReadError { .. })));
    }

    #[test]
    fn test_garbage_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.jsl");
        fs::write(&path, "<java version=\"1.6\">").unwrap();
        assert!(matches!(
            load_diagrams(&path),
            Err(PersistenceError::SerializationError(_))
        ));
    }

    #[test]
    fn test_unnamed_diagram_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let unnamed = Diagram::new(DiagramType::Class, "");
        let path = save_diagrams(&dir.path().join("unnamed"), vec![unnamed.clone()]).unwrap();
        let loaded = load_diagrams(&path).unwrap();
        assert_eq!(loaded, vec![unnamed]);
    }

    #[test]
    fn test_ids_are_fresh_after_load() {
        let dir = tempfile::tempdir().unwrap();
        let original = Diagram::new(DiagramType::UseCase, "uc");
        let path = save_diagrams(&dir.path().join("ids"), vec![original.clone()]).unwrap();
        let loaded = load_diagrams(&path).unwrap();
        assert_eq!(loaded[0], original);
        assert_ne!(loaded[0].id(), original.id());
    }
}
