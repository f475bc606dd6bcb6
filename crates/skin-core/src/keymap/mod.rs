//! Key tables for the device keyboard.
//!
//! - **`keycode`** – device key codes, their names, arrow rotation and the
//!   `Ctrl-K` key-pair syntax.
//! - **`charmap`** – unicode → key reverse lookup for text input.
//! - **`keyset`** – key bindings for UI commands.

pub mod charmap;
pub mod keycode;
pub mod keyset;

pub use charmap::{Charmap, CharmapRegistry, DEFAULT_CHARMAP_NAME};
pub use keycode::{key_pair_from_string, key_pair_to_string, KeyCode};
pub use keyset::{KeyCommand, Keyset};
