pub mod types;

pub use types::{BugEntry, BugRecord, MalformedRecordError};

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, instrument};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Bug tickets file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read bug tickets file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in bug tickets file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Load every bug ticket from a JSON file.
///
/// Only invalid JSON, or a `bugs` value that is not a list, rejects the
/// whole file. Tickets with missing or mistyped fields are kept and only
/// rejected when they are validated during import.
#[instrument(skip(path), fields(path = %path.display()))]
pub fn load_records(path: &Path) -> Result<Vec<BugEntry>, LoadError> {
    let contents = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            LoadError::NotFound(path.to_path_buf())
        } else {
            LoadError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    debug!(bytes = contents.len(), "read bug tickets file");

    let entries = parse_records(&contents).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    info!(count = entries.len(), "Loaded {} bug tickets from {}", entries.len(), path.display());
    Ok(entries)
}

/// Parse the contents of a bug tickets file.
pub fn parse_records(contents: &str) -> Result<Vec<BugEntry>, serde_json::Error> {
    let file: types::BugFile = serde_json::from_str(contents)?;
    Ok(file.bugs)
}
