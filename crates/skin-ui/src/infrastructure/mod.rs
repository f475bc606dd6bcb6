//! Infrastructure layer for the device skin.
//!
//! Contains the adapters around the application layer: host input
//! translation, the UI context and its message channel, headless and
//! recording sinks, and file-system storage.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `skin_core`, but MUST NOT be imported by the `application` or domain
//! layers.

pub mod host_input;
pub mod sinks;
pub mod storage;
pub mod ui_thread;
