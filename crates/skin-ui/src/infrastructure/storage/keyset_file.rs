//! Loads a keyset text file that replaces the default key bindings.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use skin_core::{Keyset, KeysetError};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum KeysetFileError {
    #[error("I/O error reading keyset at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid keyset {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: KeysetError,
    },
}

/// Returns the keyset at `path`, or the shared default keyset when no path is
/// configured or the file does not exist.
///
/// # Errors
///
/// Returns [`KeysetFileError::Io`] for read failures other than "not found"
/// and [`KeysetFileError::Parse`] when the file is malformed.
pub fn load_keyset(path: Option<&Path>) -> Result<Arc<Keyset>, KeysetFileError> {
    let Some(path) = path else {
        return Ok(Keyset::default_shared());
    };

    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "keyset file not found, using default bindings");
            return Ok(Keyset::default_shared());
        }
        Err(source) => {
            return Err(KeysetFileError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let keyset = Keyset::parse(&text).map_err(|source| KeysetFileError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), bindings = keyset.len(), "loaded keyset");
    Ok(Arc::new(keyset))
}
