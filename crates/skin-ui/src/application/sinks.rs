//! Collaborator interfaces used by the skin.
//!
//! The skin never renders pixels or talks to the emulated device directly.
//! Each side effect goes through one of these traits so the application
//! layer stays testable:
//!
//! - [`DeviceInputSink`] – key and pointer injection into the device (core context).
//! - [`DisplaySink`] – framebuffer invalidation and display updates (core context).
//! - [`WindowSink`] – the host window renderer (UI context).
//! - [`WindowPort`] – how the core context reaches the UI context: commands
//!   are posted fire-and-forget, queries block on a rendezvous.
//!
//! Infrastructure implementations log through `tracing`; tests use recording
//! doubles or `mockall` mocks.

use skin_core::{DeviceKeyEvent, KeyCode, OnionOverlay, SkinLayout, WindowState};
use thiserror::Error;

/// How the device should interpret a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    /// Absolute touch position in framebuffer coordinates.
    Touch,
    /// Relative trackball motion.
    Trackball,
}

/// Sink for input injected into the emulated device.
///
/// Called from the core context only.
pub trait DeviceInputSink: Send + Sync {
    /// Sends a single key transition immediately.
    fn send_key(&self, code: KeyCode, down: bool);

    /// Sends a batch of key transitions as one unit.
    fn send_key_codes(&self, events: &[DeviceKeyEvent]);

    /// Sends a touch or trackball event.  `state` is 1 while a touch is held.
    fn send_mouse_event(&self, x: i32, y: i32, kind: PointerKind, state: i32);

    /// Sends a raw `(type, code, value)` input event.
    fn send_generic_event(&self, event_type: u16, code: u16, value: i32);

    /// Turns the device's network connection off or back on.
    fn toggle_network(&self) {}
}

/// Sink for framebuffer-level display operations.
#[cfg_attr(test, mockall::automock)]
pub trait DisplaySink: Send + Sync {
    /// Marks the whole framebuffer dirty so the next frame repaints it.
    fn invalidate_framebuffer(&self);

    /// Repaints one rectangle of the device display.
    fn update_display(&self, x: i32, y: i32, width: i32, height: i32);

    /// Presents a frame produced by the host GPU.
    fn update_gpu_frame(&self, width: i32, height: i32, pixels: &[u8]);
}

/// The host window renderer, driven by the window coordinator.
pub trait WindowSink: Send + Sync {
    fn show_window(&self, state: &WindowState);
    fn redraw(&self);
    fn set_scale(&self, scale: f64);
    fn set_zoom(&self, zoom: f64);
    fn set_onion(&self, onion: Option<&OnionOverlay>);
    fn set_lcd_brightness(&self, brightness: u8);
    fn set_title(&self, title: &str);
    fn set_fullscreen(&self, fullscreen: bool);
    fn show_trackball(&self, visible: bool);
}

/// Requests sent from the core context to the window coordinator.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowCommand {
    /// Resize the window to `scale` (the device side accepted a SetScale).
    ApplyScale { scale: f64 },
    /// Apply a zoom requested earlier and show the zoomed window.
    ApplyZoom {
        zoom: f64,
        viewport_width: i32,
        viewport_height: i32,
        scroll_h: i32,
    },
    ScrollUpdated { x: i32, xmax: i32, y: i32, ymax: i32 },
    ZoomedWindowResized {
        dx: i32,
        dy: i32,
        width: i32,
        height: i32,
        scroll_h: i32,
    },
    PositionChanged { x: i32, y: i32 },
    /// Reset window geometry to a new layout.
    ResetLayout { layout: SkinLayout },
    ShowTrackball { visible: bool },
    SetTitle { title: String },
    ToggleFullscreen,
    AdjustOnionAlpha { up: bool },
    SetOnion { onion: Option<OnionOverlay> },
    SetLcdBrightness { brightness: u8 },
    Redraw,
    ScreenChanged,
}

/// Error returned when the UI context cannot answer a query.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MarshalError {
    #[error("UI context has shut down")]
    Closed,
    #[error("UI context dropped the reply")]
    ReplyDropped,
}

/// The core context's view of the UI context.
pub trait WindowPort: Send + Sync {
    /// Queues `command` for the UI context and returns immediately.
    fn post(&self, command: WindowCommand);

    /// Asks the UI context for the window position and waits for the answer.
    ///
    /// # Errors
    ///
    /// Returns [`MarshalError`] if the UI context is gone.
    fn window_position(&self) -> Result<(i32, i32), MarshalError>;
}
