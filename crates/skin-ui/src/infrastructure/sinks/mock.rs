//! Recording collaborators for tests.
//!
//! Every call is appended to a `Mutex<Vec<_>>` so tests can assert on the
//! exact sequence of side effects.  The device sink can be told to panic on
//! use to prove a code path never reaches the device.

use std::sync::Mutex;

use skin_core::{DeviceKeyEvent, KeyCode, OnionOverlay, WindowState};

use crate::application::sinks::{DeviceInputSink, DisplaySink, PointerKind, WindowSink};

/// One call made on a [`RecordingDeviceSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    Key(KeyCode, bool),
    KeyCodes(Vec<DeviceKeyEvent>),
    Mouse { x: i32, y: i32, kind: PointerKind, state: i32 },
    Generic { event_type: u16, code: u16, value: i32 },
    ToggleNetwork,
}

#[derive(Debug, Default)]
pub struct RecordingDeviceSink {
    calls: Mutex<Vec<DeviceCall>>,
    pub should_fail: bool,
}

impl RecordingDeviceSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that panics if anything is sent to it.
    pub fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            should_fail: true,
        }
    }

    pub fn calls(&self) -> Vec<DeviceCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Every key transition in call order, whether sent singly or batched.
    pub fn key_transitions(&self) -> Vec<(KeyCode, bool)> {
        self.calls()
            .into_iter()
            .flat_map(|call| match call {
                DeviceCall::Key(key, down) => vec![(key, down)],
                DeviceCall::KeyCodes(events) => events.into_iter().map(|e| (e.key, e.down)).collect(),
                _ => Vec::new(),
            })
            .collect()
    }

    fn record(&self, call: DeviceCall) {
        assert!(!self.should_fail, "device sink used unexpectedly: {call:?}");
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl DeviceInputSink for RecordingDeviceSink {
    fn send_key(&self, code: KeyCode, down: bool) {
        self.record(DeviceCall::Key(code, down));
    }

    fn send_key_codes(&self, events: &[DeviceKeyEvent]) {
        self.record(DeviceCall::KeyCodes(events.to_vec()));
    }

    fn send_mouse_event(&self, x: i32, y: i32, kind: PointerKind, state: i32) {
        self.record(DeviceCall::Mouse { x, y, kind, state });
    }

    fn send_generic_event(&self, event_type: u16, code: u16, value: i32) {
        self.record(DeviceCall::Generic {
            event_type,
            code,
            value,
        });
    }

    fn toggle_network(&self) {
        self.record(DeviceCall::ToggleNetwork);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DisplayCall {
    Invalidate,
    Update { x: i32, y: i32, width: i32, height: i32 },
    GpuFrame { width: i32, height: i32, bytes: usize },
}

#[derive(Debug, Default)]
pub struct RecordingDisplaySink {
    calls: Mutex<Vec<DisplayCall>>,
}

impl RecordingDisplaySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<DisplayCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: DisplayCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl DisplaySink for RecordingDisplaySink {
    fn invalidate_framebuffer(&self) {
        self.record(DisplayCall::Invalidate);
    }

    fn update_display(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record(DisplayCall::Update { x, y, width, height });
    }

    fn update_gpu_frame(&self, width: i32, height: i32, pixels: &[u8]) {
        self.record(DisplayCall::GpuFrame {
            width,
            height,
            bytes: pixels.len(),
        });
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WindowCall {
    Show { window_size: (i32, i32), zoom: f64 },
    Redraw,
    Scale(f64),
    Zoom(f64),
    Onion(Option<u16>),
    LcdBrightness(u8),
    Title(String),
    Fullscreen(bool),
    Trackball(bool),
}

#[derive(Debug, Default)]
pub struct RecordingWindowSink {
    calls: Mutex<Vec<WindowCall>>,
}

impl RecordingWindowSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<WindowCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// The most recent title, if any was set.
    pub fn last_title(&self) -> Option<String> {
        self.calls().into_iter().rev().find_map(|c| match c {
            WindowCall::Title(t) => Some(t),
            _ => None,
        })
    }

    fn record(&self, call: WindowCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl WindowSink for RecordingWindowSink {
    fn show_window(&self, state: &WindowState) {
        self.record(WindowCall::Show {
            window_size: (state.window_size.width, state.window_size.height),
            zoom: state.zoom,
        });
    }

    fn redraw(&self) {
        self.record(WindowCall::Redraw);
    }

    fn set_scale(&self, scale: f64) {
        self.record(WindowCall::Scale(scale));
    }

    fn set_zoom(&self, zoom: f64) {
        self.record(WindowCall::Zoom(zoom));
    }

    fn set_onion(&self, onion: Option<&OnionOverlay>) {
        self.record(WindowCall::Onion(onion.map(|o| o.alpha)));
    }

    fn set_lcd_brightness(&self, brightness: u8) {
        self.record(WindowCall::LcdBrightness(brightness));
    }

    fn set_title(&self, title: &str) {
        self.record(WindowCall::Title(title.to_string()));
    }

    fn set_fullscreen(&self, fullscreen: bool) {
        self.record(WindowCall::Fullscreen(fullscreen));
    }

    fn show_trackball(&self, visible: bool) {
        self.record(WindowCall::Trackball(visible));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_transitions_flatten_batches() {
        // Arrange
        let sink = RecordingDeviceSink::new();

        // Act
        sink.send_key(KeyCode::Home, true);
        sink.send_key_codes(&[
            DeviceKeyEvent::new(KeyCode::LeftShift, true),
            DeviceKeyEvent::new(KeyCode::A, true),
        ]);

        // Assert
        assert_eq!(
            sink.key_transitions(),
            vec![(KeyCode::Home, true), (KeyCode::LeftShift, true), (KeyCode::A, true)]
        );
    }

    #[test]
    #[should_panic(expected = "device sink used unexpectedly")]
    fn test_failing_sink_panics_on_use() {
        RecordingDeviceSink::failing().send_key(KeyCode::A, true);
    }

    #[test]
    fn test_last_title_returns_most_recent() {
        let sink = RecordingWindowSink::new();
        sink.set_title("first");
        sink.redraw();
        sink.set_title("second");

        assert_eq!(sink.last_title().as_deref(), Some("second"));
    }
}
