//! Headless collaborators that log instead of rendering or injecting.

use skin_core::{DeviceKeyEvent, KeyCode, OnionOverlay, WindowState};
use tracing::{debug, info};

use crate::application::sinks::{DeviceInputSink, DisplaySink, PointerKind, WindowSink};

/// Logs every event that would reach the emulated device.
#[derive(Debug, Default)]
pub struct LoggingDeviceSink;

impl DeviceInputSink for LoggingDeviceSink {
    fn send_key(&self, code: KeyCode, down: bool) {
        info!(key = code.name(), code = code.as_u16(), down, "device key");
    }

    fn send_key_codes(&self, events: &[DeviceKeyEvent]) {
        let keys: Vec<String> = events
            .iter()
            .map(|e| format!("{}{}", if e.down { '+' } else { '-' }, e.key.name()))
            .collect();
        info!(count = events.len(), keys = %keys.join(" "), "device key batch");
    }

    fn send_mouse_event(&self, x: i32, y: i32, kind: PointerKind, state: i32) {
        info!(x, y, ?kind, state, "device pointer");
    }

    fn send_generic_event(&self, event_type: u16, code: u16, value: i32) {
        info!(event_type, code, value, "device generic event");
    }

    fn toggle_network(&self) {
        info!("device network toggled");
    }
}

#[derive(Debug, Default)]
pub struct LoggingDisplaySink;

impl DisplaySink for LoggingDisplaySink {
    fn invalidate_framebuffer(&self) {
        debug!("framebuffer invalidated");
    }

    fn update_display(&self, x: i32, y: i32, width: i32, height: i32) {
        debug!(x, y, width, height, "display update");
    }

    fn update_gpu_frame(&self, width: i32, height: i32, pixels: &[u8]) {
        debug!(width, height, bytes = pixels.len(), "gpu frame");
    }
}

#[derive(Debug, Default)]
pub struct LoggingWindowSink;

impl WindowSink for LoggingWindowSink {
    fn show_window(&self, state: &WindowState) {
        info!(
            width = state.window_size.width,
            height = state.window_size.height,
            scale = state.scale,
            zoom = state.zoom,
            zoom_mode = state.zoom_mode,
            "show window"
        );
    }

    fn redraw(&self) {
        debug!("redraw");
    }

    fn set_scale(&self, scale: f64) {
        info!(scale, "window scale");
    }

    fn set_zoom(&self, zoom: f64) {
        info!(zoom, "window zoom");
    }

    fn set_onion(&self, onion: Option<&OnionOverlay>) {
        match onion {
            Some(o) => info!(image = %o.image, alpha = o.alpha, rotation = ?o.rotation, "onion overlay"),
            None => info!("onion overlay removed"),
        }
    }

    fn set_lcd_brightness(&self, brightness: u8) {
        debug!(brightness, "lcd brightness");
    }

    fn set_title(&self, title: &str) {
        info!(title, "window title");
    }

    fn set_fullscreen(&self, fullscreen: bool) {
        info!(fullscreen, "fullscreen");
    }

    fn show_trackball(&self, visible: bool) {
        info!(visible, "trackball");
    }
}
