use serde::{de::DeserializeOwned, Serialize};
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Unable to access {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed records in {}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type RecordResult<T> = anyhow::Result<T, RecordError>;

/// Reads a whole JSON array of records. A file that does not exist yet is an empty table.
pub(crate) fn load_records<T>(path: &Path) -> RecordResult<Vec<T>>
where
    T: DeserializeOwned,
{
    if !path.exists() {
        return Ok(Vec::new());
    }

    let raw = fs::read(path).map_err(|source| RecordError::Io {
        path: path.to_owned(),
        source,
    })?;

    serde_json::from_slice(&raw).map_err(|source| RecordError::Json {
        path: path.to_owned(),
        source,
    })
}

/// Rewrites the whole table, indented by four spaces.
/// The new content goes to a sibling `.tmp` file first and is renamed over the target.
pub(crate) fn save_records<T>(path: &Path, records: &[T]) -> RecordResult<()>
where
    T: Serialize,
{
    let mut buffer = Vec::new();
    let mut serializer =
        Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
    records
        .serialize(&mut serializer)
        .map_err(|source| RecordError::Json {
            path: path.to_owned(),
            source,
        })?;

    let staging = path.with_extension("json.tmp");
    let io_error = |source| RecordError::Io {
        path: path.to_owned(),
        source,
    };
    fs::write(&staging, &buffer).map_err(io_error)?;
    fs::rename(&staging, path).map_err(io_error)?;

    Ok(())
}
