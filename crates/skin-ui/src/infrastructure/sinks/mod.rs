//! Implementations of the collaborator traits in
//! [`application::sinks`](crate::application::sinks).
//!
//! - **`logging`** – headless sinks that record every call through `tracing`.
//!   Used by the binary when no real device or window is attached.
//! - **`mock`** – recording sinks for tests: every call is stored in a
//!   `Mutex<Vec<_>>` so assertions can inspect the exact sequence.

pub mod logging;
pub mod mock;
