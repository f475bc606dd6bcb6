//! Skin description loading: the device layouts and the keyboard charmap.
//!
//! A skin file is TOML with one `[[layout]]` table per orientation, in the
//! order they are cycled through:
//!
//! ```toml
//! [[layout]]
//! name = "portrait"
//! width = 1080
//! height = 1920
//! [layout.display]
//! x = 0
//! y = 0
//! width = 1080
//! height = 1920
//!
//! [[layout]]
//! name = "landscape"
//! rotation = 1
//! dpad_rotation = 1
//! width = 1920
//! height = 1080
//! [layout.display]
//! x = 0
//! y = 0
//! width = 1920
//! height = 1080
//! rotation = 1
//! ```
//!
//! Rotations are quarter turns (0..=3).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use skin_core::keymap::charmap::charmap_name_from_path;
use skin_core::{Charmap, CharmapError, CharmapRegistry, LayoutError, LayoutList, SkinLayout};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum SkinFileError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse skin description: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid layouts: {0}")]
    Layout(#[from] LayoutError),

    #[error("invalid charmap {path}: {source}")]
    Charmap {
        path: PathBuf,
        #[source]
        source: CharmapError,
    },
}

#[derive(Debug, Deserialize)]
struct SkinDescription {
    #[serde(default, rename = "layout")]
    layouts: Vec<SkinLayout>,
}

/// Parses a skin description from TOML text.
///
/// # Errors
///
/// Returns [`SkinFileError::Parse`] for malformed TOML and
/// [`SkinFileError::Layout`] when the layout list is empty or has duplicates.
pub fn parse_layouts(text: &str) -> Result<LayoutList, SkinFileError> {
    let description: SkinDescription = toml::from_str(text)?;
    Ok(LayoutList::new(description.layouts)?)
}

/// Loads the layouts from `path`, or the built-in portrait/landscape pair
/// when no skin file is configured.
///
/// # Errors
///
/// A configured but unreadable or invalid file is an error; see
/// [`parse_layouts`].
pub fn load_layouts(path: Option<&Path>) -> Result<LayoutList, SkinFileError> {
    let Some(path) = path else {
        info!("no skin file configured, using built-in layouts");
        return Ok(LayoutList::builtin());
    };
    let text = std::fs::read_to_string(path).map_err(|source| SkinFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let layouts = parse_layouts(&text)?;
    info!(path = %path.display(), count = layouts.len(), "loaded skin layouts");
    Ok(layouts)
}

/// Resolves the keyboard charmap for a `.kcm` path.
///
/// The basename selects the charmap.  If the file exists it is parsed and
/// registered under that name first.  A missing file or an unknown name
/// falls back to `qwerty2`.
///
/// # Errors
///
/// Returns [`SkinFileError::Charmap`] when the file exists but is malformed.
pub fn load_charmap(
    registry: &mut CharmapRegistry,
    path: Option<&Path>,
) -> Result<Arc<Charmap>, SkinFileError> {
    let Some(path) = path else {
        return Ok(registry.default_charmap());
    };
    let name = charmap_name_from_path(path);

    match std::fs::read_to_string(path) {
        Ok(text) => {
            let charmap_name = name.clone().unwrap_or_default();
            let charmap =
                Charmap::parse(&charmap_name, &text).map_err(|source| SkinFileError::Charmap {
                    path: path.to_path_buf(),
                    source,
                })?;
            registry.register(charmap);
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "could not read charmap file"),
    }

    Ok(registry.get_or_default(name.as_deref()))
}
