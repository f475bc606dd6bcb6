//! # skin-core
//!
//! Domain model for the device skin: the window that shows an emulated
//! device's frame and screen and turns host keyboard and mouse input into
//! device input.
//!
//! This crate has no threads, no I/O and no UI toolkit.  It defines:
//!
//! - **`domain`** – the normalized input event type, device layouts
//!   (orientations) and the window geometry state with its sizing maths.
//!
//! - **`keymap`** – device key codes, charmaps (text → key presses) and
//!   keysets (key presses → UI commands).
//!
//! The runtime pieces (event queue, keyboard remapper, dispatcher, window
//! coordinator) live in `skin-ui` and are built from these types.

pub mod domain;
pub mod keymap;

pub use domain::event::{DeviceKeyEvent, EventKind, KeyMods, MouseButton, MouseData, SkinEvent};
pub use domain::layout::{DisplayRect, LayoutError, LayoutList, Rotation, SkinLayout};
pub use domain::window::{OnionOverlay, ScrollbarPolicy, Size, WindowState};
pub use keymap::charmap::{Charmap, CharmapError, CharmapRegistry};
pub use keymap::keycode::KeyCode;
pub use keymap::keyset::{KeyCommand, Keyset, KeysetError};
