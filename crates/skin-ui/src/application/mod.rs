//! Application layer of the device skin.
//!
//! Two execution contexts share this layer:
//!
//! - The **core context** (device loop thread) owns [`dispatch::SkinUi`]: it
//!   drains the [`event_queue::EventQueue`], drives the
//!   [`keyboard::KeyboardRemapper`], the [`layout_state::LayoutStateMachine`]
//!   and the [`trackball::Trackball`], and injects device input.
//! - The **UI context** owns [`window_coordinator::WindowCoordinator`] and the
//!   [`WindowState`](skin_core::WindowState) it mutates.
//!
//! The contexts never share mutable state.  The queue carries input from UI to
//! core; [`sinks::WindowCommand`] messages carry requests from core to UI.
//!
//! # Sub-modules
//!
//! - **`sinks`** – collaborator traits (device input, display, window render)
//!   and the cross-context window port.
//! - **`event_queue`** – thread-safe coalescing queue with empty→non-empty
//!   notification.
//! - **`keyboard`** – text and key event remapping into device key events.
//! - **`layout_state`** – current layout and next/prev cycling.
//! - **`trackball`** – rotation-aware relative pointer.
//! - **`window_coordinator`** – scale, zoom, scroll and overlay state.
//! - **`dispatch`** – the event loop consumer and key-command handling.

pub mod dispatch;
pub mod event_queue;
pub mod keyboard;
pub mod layout_state;
pub mod sinks;
pub mod trackball;
pub mod window_coordinator;
