//! Normalized, device-independent input events.
//!
//! The host window translates toolkit input (key presses, mouse moves,
//! scrollbar drags, resize gestures) into [`SkinEvent`] values and pushes them
//! onto the event queue.  The dispatcher on the device side pops them and
//! routes each variant to the keyboard, the window coordinator or the layout
//! state machine.
//!
//! Each variant carries only the fields it needs.

use serde::{Deserialize, Serialize};

use crate::keymap::keycode::KeyCode;

/// Maximum number of UTF-8 bytes carried by one [`SkinEvent::TextInput`].
pub const TEXT_INPUT_CAPACITY: usize = 32;

/// Modifier state attached to key events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyMods(pub u8);

impl KeyMods {
    pub const LCTRL: u8 = 1 << 0;
    pub const RCTRL: u8 = 1 << 1;
    pub const LALT: u8 = 1 << 2;
    pub const RALT: u8 = 1 << 3;
    pub const LSHIFT: u8 = 1 << 4;
    pub const RSHIFT: u8 = 1 << 5;
    pub const NUMLOCK: u8 = 1 << 6;

    pub const NONE: KeyMods = KeyMods(0);

    /// Returns a copy with `bits` set.
    pub fn with(self, bits: u8) -> Self {
        KeyMods(self.0 | bits)
    }

    /// Returns `true` if every bit in `bits` is set.
    pub fn contains(self, bits: u8) -> bool {
        self.0 & bits == bits
    }

    /// Returns `true` if either Ctrl modifier is active.
    pub fn ctrl(self) -> bool {
        self.0 & (Self::LCTRL | Self::RCTRL) != 0
    }

    /// Returns `true` if either Alt modifier is active.
    pub fn alt(self) -> bool {
        self.0 & (Self::LALT | Self::RALT) != 0
    }

    /// Returns `true` if either Shift modifier is active.
    pub fn shift(self) -> bool {
        self.0 & (Self::LSHIFT | Self::RSHIFT) != 0
    }

    pub fn num_lock(self) -> bool {
        self.0 & Self::NUMLOCK != 0
    }

    /// Strips NumLock, which never takes part in keyset matching.
    pub fn without_num_lock(self) -> Self {
        KeyMods(self.0 & !Self::NUMLOCK)
    }
}

/// A resolved key transition ready for the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceKeyEvent {
    pub key: KeyCode,
    pub down: bool,
}

impl DeviceKeyEvent {
    pub fn new(key: KeyCode, down: bool) -> Self {
        Self { key, down }
    }
}

/// Mouse button identifiers as reported by the host window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum MouseButton {
    Left = 1,
    SecondaryTouch = 2,
    Right = 3,
    Center = 4,
    ScrollUp = 5,
    ScrollDown = 6,
    NoButton = 7,
    WheelUp = 8,
    WheelDown = 9,
}

impl MouseButton {
    /// Buttons the dispatcher forwards to the device; the rest are dropped.
    pub fn is_forwarded(self) -> bool {
        matches!(
            self,
            MouseButton::Left
                | MouseButton::SecondaryTouch
                | MouseButton::Right
                | MouseButton::WheelUp
                | MouseButton::WheelDown
        )
    }

    pub fn is_wheel(self) -> bool {
        matches!(self, MouseButton::WheelUp | MouseButton::WheelDown)
    }
}

/// Position and motion payload shared by all mouse events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MouseData {
    pub x: i32,
    pub y: i32,
    pub xrel: i32,
    pub yrel: i32,
    pub button: MouseButton,
}

/// A normalized input event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SkinEvent {
    KeyDown {
        key: KeyCode,
        mods: KeyMods,
    },
    KeyUp {
        key: KeyCode,
        mods: KeyMods,
    },
    /// Raw UTF-8 bytes, at most [`TEXT_INPUT_CAPACITY`] long.  May be malformed.
    TextInput {
        text: Vec<u8>,
        down: bool,
    },
    MouseMotion(MouseData),
    MouseButtonDown(MouseData),
    MouseButtonUp(MouseData),
    /// Host scrollbars moved (coalescing).
    ScrollChanged {
        x: i32,
        xmax: i32,
        y: i32,
        ymax: i32,
    },
    SetScale {
        scale: f64,
    },
    SetZoom {
        zoom: f64,
        viewport_width: i32,
        viewport_height: i32,
        /// Thickness of the horizontal scrollbar, 0 when hidden.
        scroll_h: i32,
    },
    WindowMoved {
        x: i32,
        y: i32,
    },
    ScreenChanged,
    LayoutNext,
    LayoutPrev,
    /// The zoomed container was resized (coalescing).
    ZoomedWindowResized {
        dx: i32,
        dy: i32,
        width: i32,
        height: i32,
        scroll_h: i32,
    },
    Quit,
    ForceRedraw,
}

/// Discriminant of a [`SkinEvent`], used for coalescing and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    KeyDown,
    KeyUp,
    TextInput,
    MouseMotion,
    MouseButtonDown,
    MouseButtonUp,
    ScrollChanged,
    SetScale,
    SetZoom,
    WindowMoved,
    ScreenChanged,
    LayoutNext,
    LayoutPrev,
    ZoomedWindowResized,
    Quit,
    ForceRedraw,
}

impl SkinEvent {
    /// Builds a text-input event, truncating `text` to [`TEXT_INPUT_CAPACITY`] bytes.
    ///
    /// Truncation may split a multi-byte character; the keyboard stops
    /// decoding at the broken sequence.
    pub fn text_input(text: &[u8], down: bool) -> Self {
        let len = text.len().min(TEXT_INPUT_CAPACITY);
        SkinEvent::TextInput {
            text: text[..len].to_vec(),
            down,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            SkinEvent::KeyDown { .. } => EventKind::KeyDown,
            SkinEvent::KeyUp { .. } => EventKind::KeyUp,
            SkinEvent::TextInput { .. } => EventKind::TextInput,
            SkinEvent::MouseMotion(_) => EventKind::MouseMotion,
            SkinEvent::MouseButtonDown(_) => EventKind::MouseButtonDown,
            SkinEvent::MouseButtonUp(_) => EventKind::MouseButtonUp,
            SkinEvent::ScrollChanged { .. } => EventKind::ScrollChanged,
            SkinEvent::SetScale { .. } => EventKind::SetScale,
            SkinEvent::SetZoom { .. } => EventKind::SetZoom,
            SkinEvent::WindowMoved { .. } => EventKind::WindowMoved,
            SkinEvent::ScreenChanged => EventKind::ScreenChanged,
            SkinEvent::LayoutNext => EventKind::LayoutNext,
            SkinEvent::LayoutPrev => EventKind::LayoutPrev,
            SkinEvent::ZoomedWindowResized { .. } => EventKind::ZoomedWindowResized,
            SkinEvent::Quit => EventKind::Quit,
            SkinEvent::ForceRedraw => EventKind::ForceRedraw,
        }
    }
}

impl EventKind {
    /// Kinds for which the queue keeps only the most recent instance.
    pub fn is_coalescing(self) -> bool {
        matches!(self, EventKind::ScrollChanged | EventKind::ZoomedWindowResized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_scroll_and_zoomed_resize_coalesce() {
        assert!(EventKind::ScrollChanged.is_coalescing());
        assert!(EventKind::ZoomedWindowResized.is_coalescing());
        assert!(!EventKind::KeyDown.is_coalescing());
        assert!(!EventKind::SetZoom.is_coalescing());
        assert!(!EventKind::MouseMotion.is_coalescing());
    }

    #[test]
    fn test_text_input_truncates_to_capacity() {
        let long = [b'a'; 40];

        let event = SkinEvent::text_input(&long, true);

        match event {
            SkinEvent::TextInput { text, down } => {
                assert_eq!(text.len(), TEXT_INPUT_CAPACITY);
                assert!(down);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_key_mods_helpers() {
        let mods = KeyMods(KeyMods::RCTRL | KeyMods::NUMLOCK);
        assert!(mods.ctrl());
        assert!(!mods.alt());
        assert!(mods.num_lock());
        assert_eq!(mods.without_num_lock(), KeyMods(KeyMods::RCTRL));
        assert!(mods.contains(KeyMods::RCTRL));
        assert!(!mods.contains(KeyMods::RCTRL | KeyMods::LCTRL));
    }

    #[test]
    fn test_forwarded_mouse_buttons() {
        assert!(MouseButton::Left.is_forwarded());
        assert!(MouseButton::WheelDown.is_forwarded());
        assert!(!MouseButton::Center.is_forwarded());
        assert!(!MouseButton::ScrollUp.is_forwarded());
        assert!(!MouseButton::NoButton.is_forwarded());
    }
}
