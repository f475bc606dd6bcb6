//! Storage infrastructure: everything the skin reads from or writes to disk.
//!
//! - `config` – the TOML settings file, including the window position saved
//!   on exit.
//! - `keyset_file` – an optional keyset text file that replaces the default
//!   bindings.
//! - `skin_file` – the TOML skin description listing the device layouts,
//!   plus charmap (`.kcm`) selection.
//!
//! Only construction-time loading can fail here.  Nothing in this module is
//! touched once the event loop is running, except saving the config on exit.

pub mod config;
pub mod keyset_file;
pub mod skin_file;
