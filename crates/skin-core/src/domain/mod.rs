//! Domain entities with no threading or I/O.
//!
//! - **`event`** – the normalized [`SkinEvent`](event::SkinEvent) sum type.
//! - **`layout`** – named device orientations and the ordered layout list.
//! - **`window`** – window geometry state plus the scale/zoom arithmetic.

pub mod event;
pub mod layout;
pub mod window;
