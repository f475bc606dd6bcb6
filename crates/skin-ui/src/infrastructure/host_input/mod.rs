//! Host input: what the host window toolkit reports, and its translation
//! into [`SkinEvent`]s.
//!
//! A host window produces [`HostEvent`]s: raw key presses with their host key
//! identifier, mouse and wheel activity, scrollbar and container changes and
//! the window-level shortcuts (zoom, scale, pan).  This module defines that
//! vocabulary, the [`HostEventSource`] trait that delivers it, and the
//! [`HostInputTranslator`] that turns the input part into queued events.
//!
//! Window-level events are not translated here; they go to the
//! [`WindowCoordinator`](crate::application::window_coordinator::WindowCoordinator)
//! which owns the window state they change.
//!
//! # Testability
//!
//! [`mock::ScriptedHostSource`] replays a fixed list of events, so the UI
//! context can be driven without a real window.

use std::sync::Arc;
use std::time::{Duration, Instant};

use skin_core::{KeyCode, KeyMods, MouseButton, MouseData, SkinEvent};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::trace;

use crate::application::event_queue::EventQueue;

pub mod mock;

/// Minimum time between two forwarded wheel notches.
pub const WHEEL_THROTTLE: Duration = Duration::from_millis(100);

/// A key as the host toolkit names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostKey {
    /// A key on the main block, identified by the character it prints.
    Char(char),
    /// A numeric keypad key, identified by its character (`'\n'` for Enter).
    Keypad(char),
    Up,
    Down,
    Left,
    Right,
    /// Function key `F1`..`F12`.
    F(u8),
    Backspace,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Escape,
    Return,
    Tab,
    Control,
    Alt,
    Shift,
    CapsLock,
    /// Anything without a device equivalent.
    Other(u32),
}

/// Modifier state reported with a host key event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostModifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub num_lock: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostMouseButton {
    Left,
    Right,
    Middle,
    None,
}

/// Everything a host window can report.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    KeyPress {
        key: HostKey,
        mods: HostModifiers,
        /// Text the key produced, empty for non-printing keys.
        text: String,
    },
    KeyRelease {
        key: HostKey,
        mods: HostModifiers,
    },
    MousePress {
        button: HostMouseButton,
        x: i32,
        y: i32,
    },
    MouseRelease {
        button: HostMouseButton,
        x: i32,
        y: i32,
    },
    MouseMove {
        button: HostMouseButton,
        x: i32,
        y: i32,
    },
    /// Wheel rotation; positive is away from the user.
    Wheel {
        delta: i32,
        x: i32,
        y: i32,
    },
    /// Injects a device key press and release as if typed.
    SimulateKeyPress {
        key: KeyCode,
        mods: KeyMods,
    },
    ScrollBarsMoved {
        x: i32,
        y: i32,
    },
    ContainerResized {
        width: i32,
        height: i32,
    },
    WindowMoved {
        x: i32,
        y: i32,
    },
    ScreenChanged,
    ZoomIn,
    ZoomOut,
    ZoomReset,
    /// Zoom so the `width`×`height` area around `(x, y)` fills the window.
    ZoomTo {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },
    ToggleZoomMode,
    ScaleUp,
    ScaleDown,
    PanLeft,
    PanRight,
    PanUp,
    PanDown,
    LayoutNext,
    LayoutPrev,
    Redraw,
    CloseRequested,
}

/// Error type for host event sources.
#[derive(Debug, Error)]
pub enum HostSourceError {
    #[error("host event source has already been started")]
    AlreadyStarted,
}

/// Producer of host events.
///
/// The production implementation would be a window toolkit; tests and the
/// headless binary use [`ChannelHostSource`] or [`mock::ScriptedHostSource`].
pub trait HostEventSource: Send {
    /// Starts the source and returns the stream of host events.
    fn start(&mut self) -> Result<mpsc::UnboundedReceiver<HostEvent>, HostSourceError>;
}

/// A source fed by hand through cloned senders.
pub struct ChannelHostSource {
    sender: mpsc::UnboundedSender<HostEvent>,
    receiver: Option<mpsc::UnboundedReceiver<HostEvent>>,
}

impl Default for ChannelHostSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelHostSource {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: Some(receiver),
        }
    }

    /// A handle for feeding events into this source.
    pub fn sender(&self) -> mpsc::UnboundedSender<HostEvent> {
        self.sender.clone()
    }
}

impl HostEventSource for ChannelHostSource {
    fn start(&mut self) -> Result<mpsc::UnboundedReceiver<HostEvent>, HostSourceError> {
        self.receiver.take().ok_or(HostSourceError::AlreadyStarted)
    }
}

// ── Translation ───────────────────────────────────────────────────────────────

/// Maps a host key to a device key code, [`KeyCode::Unknown`] if none fits.
///
/// Shifted symbols map to the key that carries them (`'!'` → `1`).
pub fn translate_key(key: HostKey) -> KeyCode {
    match key {
        HostKey::Char(c) => translate_char(c),
        HostKey::Keypad(c) => translate_keypad(c),
        HostKey::Up => KeyCode::Up,
        HostKey::Down => KeyCode::Down,
        HostKey::Left => KeyCode::Left,
        HostKey::Right => KeyCode::Right,
        HostKey::F(n) => match n {
            1 => KeyCode::F1,
            2 => KeyCode::F2,
            3 => KeyCode::F3,
            4 => KeyCode::F4,
            5 => KeyCode::F5,
            6 => KeyCode::F6,
            7 => KeyCode::F7,
            8 => KeyCode::F8,
            9 => KeyCode::F9,
            10 => KeyCode::F10,
            11 => KeyCode::F11,
            12 => KeyCode::F12,
            _ => KeyCode::Unknown,
        },
        HostKey::Backspace => KeyCode::Backspace,
        HostKey::Delete => KeyCode::Delete,
        HostKey::Home => KeyCode::Home,
        HostKey::End => KeyCode::End,
        HostKey::PageUp => KeyCode::PageUp,
        HostKey::PageDown => KeyCode::PageDown,
        HostKey::Insert => KeyCode::Insert,
        HostKey::Escape => KeyCode::Escape,
        HostKey::Return => KeyCode::Enter,
        HostKey::Tab => KeyCode::Tab,
        HostKey::Control => KeyCode::LeftCtrl,
        HostKey::Alt => KeyCode::LeftAlt,
        HostKey::Shift => KeyCode::LeftShift,
        HostKey::CapsLock => KeyCode::CapsLock,
        HostKey::Other(_) => KeyCode::Unknown,
    }
}

fn translate_char(c: char) -> KeyCode {
    const LETTERS: [KeyCode; 26] = [
        KeyCode::A, KeyCode::B, KeyCode::C, KeyCode::D, KeyCode::E, KeyCode::F, KeyCode::G,
        KeyCode::H, KeyCode::I, KeyCode::J, KeyCode::K, KeyCode::L, KeyCode::M, KeyCode::N,
        KeyCode::O, KeyCode::P, KeyCode::Q, KeyCode::R, KeyCode::S, KeyCode::T, KeyCode::U,
        KeyCode::V, KeyCode::W, KeyCode::X, KeyCode::Y, KeyCode::Z,
    ];
    if c.is_ascii_alphabetic() {
        return LETTERS[(c.to_ascii_lowercase() as u8 - b'a') as usize];
    }
    match c {
        '1' | '!' => KeyCode::Num1,
        '2' | '@' => KeyCode::Num2,
        '3' | '#' => KeyCode::Num3,
        '4' | '$' => KeyCode::Num4,
        '5' | '%' => KeyCode::Num5,
        '6' | '^' => KeyCode::Num6,
        '7' | '&' => KeyCode::Num7,
        '8' | '*' => KeyCode::Num8,
        '9' | '(' => KeyCode::Num9,
        '0' | ')' => KeyCode::Num0,
        '-' | '_' => KeyCode::Minus,
        '=' | '+' => KeyCode::Equal,
        '[' | '{' => KeyCode::LeftBrace,
        ']' | '}' => KeyCode::RightBrace,
        '\\' | '|' => KeyCode::Backslash,
        ';' | ':' => KeyCode::Semicolon,
        '\'' | '"' => KeyCode::Apostrophe,
        '`' | '~' => KeyCode::Grave,
        ',' | '<' => KeyCode::Comma,
        '.' | '>' => KeyCode::Dot,
        '/' | '?' => KeyCode::Slash,
        ' ' => KeyCode::Space,
        _ => KeyCode::Unknown,
    }
}

fn translate_keypad(c: char) -> KeyCode {
    match c {
        '0' => KeyCode::Kp0,
        '1' => KeyCode::Kp1,
        '2' => KeyCode::Kp2,
        '3' => KeyCode::Kp3,
        '4' => KeyCode::Kp4,
        '5' => KeyCode::Kp5,
        '6' => KeyCode::Kp6,
        '7' => KeyCode::Kp7,
        '8' => KeyCode::Kp8,
        '9' => KeyCode::Kp9,
        '+' => KeyCode::KpPlus,
        '-' => KeyCode::KpMinus,
        '*' => KeyCode::KpAsterisk,
        '/' => KeyCode::KpSlash,
        '.' => KeyCode::KpDot,
        '=' => KeyCode::KpEqual,
        '\n' => KeyCode::KpEnter,
        _ => KeyCode::Unknown,
    }
}

/// Host modifiers always map to the left-hand device modifier.
pub fn translate_mods(mods: HostModifiers) -> KeyMods {
    let mut out = KeyMods::NONE;
    if mods.shift {
        out = out.with(KeyMods::LSHIFT);
    }
    if mods.ctrl {
        out = out.with(KeyMods::LCTRL);
    }
    if mods.alt {
        out = out.with(KeyMods::LALT);
    }
    if mods.num_lock {
        out = out.with(KeyMods::NUMLOCK);
    }
    out
}

fn translate_button(button: HostMouseButton) -> MouseButton {
    match button {
        HostMouseButton::None => MouseButton::NoButton,
        HostMouseButton::Right => MouseButton::Right,
        HostMouseButton::Left | HostMouseButton::Middle => MouseButton::Left,
    }
}

/// Turns host input into queued [`SkinEvent`]s.
///
/// Lives in the UI context.  Tracks the previous mouse position for relative
/// motion and the last wheel time for throttling.
pub struct HostInputTranslator {
    queue: Arc<EventQueue>,
    prev_mouse: (i32, i32),
    last_wheel: Option<Instant>,
}

impl HostInputTranslator {
    pub fn new(queue: Arc<EventQueue>) -> Self {
        Self {
            queue,
            prev_mouse: (0, 0),
            last_wheel: None,
        }
    }

    /// Handles a key press or release.
    ///
    /// A press that produced text without Ctrl or Alt also queues a text
    /// event, while unicode translation is enabled.
    pub fn key_event(&mut self, key: HostKey, mods: HostModifiers, text: &str, down: bool) {
        let code = translate_key(key);
        let mods = translate_mods(mods);
        trace!(?key, code = code.name(), down, "host key");
        self.queue.push(if down {
            SkinEvent::KeyDown { key: code, mods }
        } else {
            SkinEvent::KeyUp { key: code, mods }
        });

        if down && !text.is_empty() && !mods.ctrl() && !mods.alt() && self.queue.unicode_enabled() {
            self.queue.push(SkinEvent::text_input(text.as_bytes(), true));
        }
    }

    /// Queues a mouse event; `xrel`/`yrel` are relative to the previous one.
    pub fn mouse_event(&mut self, kind: MouseEventKind, button: HostMouseButton, x: i32, y: i32) {
        let data = self.mouse_data(translate_button(button), x, y);
        self.queue.push(match kind {
            MouseEventKind::Press => SkinEvent::MouseButtonDown(data),
            MouseEventKind::Release => SkinEvent::MouseButtonUp(data),
            MouseEventKind::Move => SkinEvent::MouseMotion(data),
        });
    }

    /// Queues one wheel notch as a button press and release, at most once
    /// per [`WHEEL_THROTTLE`].  Every wheel event restarts the throttle.
    pub fn wheel(&mut self, delta: i32, x: i32, y: i32, now: Instant) {
        let throttled = self
            .last_wheel
            .is_some_and(|last| now.saturating_duration_since(last) < WHEEL_THROTTLE);
        self.last_wheel = Some(now);
        if throttled {
            trace!(delta, "wheel throttled");
            return;
        }
        let button = if delta > 0 {
            MouseButton::WheelUp
        } else {
            MouseButton::WheelDown
        };
        let down = self.mouse_data(button, x, y);
        let up = self.mouse_data(button, x, y);
        self.queue.push(SkinEvent::MouseButtonDown(down));
        self.queue.push(SkinEvent::MouseButtonUp(up));
    }

    pub fn simulate_key_press(&self, key: KeyCode, mods: KeyMods) {
        self.queue.push(SkinEvent::KeyDown { key, mods });
        self.queue.push(SkinEvent::KeyUp { key, mods });
    }

    /// Handles the input part of `event`.  Returns `false` for events that
    /// belong to the window coordinator.
    pub fn handle(&mut self, event: &HostEvent) -> bool {
        match event {
            HostEvent::KeyPress { key, mods, text } => self.key_event(*key, *mods, text, true),
            HostEvent::KeyRelease { key, mods } => self.key_event(*key, *mods, "", false),
            HostEvent::MousePress { button, x, y } => {
                self.mouse_event(MouseEventKind::Press, *button, *x, *y)
            }
            HostEvent::MouseRelease { button, x, y } => {
                self.mouse_event(MouseEventKind::Release, *button, *x, *y)
            }
            HostEvent::MouseMove { button, x, y } => {
                self.mouse_event(MouseEventKind::Move, *button, *x, *y)
            }
            HostEvent::Wheel { delta, x, y } => self.wheel(*delta, *x, *y, Instant::now()),
            HostEvent::SimulateKeyPress { key, mods } => self.simulate_key_press(*key, *mods),
            HostEvent::ScreenChanged => self.queue.push(SkinEvent::ScreenChanged),
            HostEvent::LayoutNext => self.queue.push(SkinEvent::LayoutNext),
            HostEvent::LayoutPrev => self.queue.push(SkinEvent::LayoutPrev),
            HostEvent::Redraw => self.queue.push(SkinEvent::ForceRedraw),
            HostEvent::CloseRequested => self.queue.push(SkinEvent::Quit),
            _ => return false,
        }
        true
    }

    fn mouse_data(&mut self, button: MouseButton, x: i32, y: i32) -> MouseData {
        let (px, py) = self.prev_mouse;
        self.prev_mouse = (x, y);
        MouseData {
            x,
            y,
            xrel: x - px,
            yrel: y - py,
            button,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEventKind {
    Press,
    Release,
    Move,
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(queue: &EventQueue) -> Vec<SkinEvent> {
        std::iter::from_fn(|| queue.poll()).collect()
    }

    fn translator() -> (HostInputTranslator, Arc<EventQueue>) {
        let queue = Arc::new(EventQueue::new());
        (HostInputTranslator::new(Arc::clone(&queue)), queue)
    }

    #[test]
    fn test_shifted_symbols_map_to_base_keys() {
        assert_eq!(translate_key(HostKey::Char('!')), KeyCode::Num1);
        assert_eq!(translate_key(HostKey::Char('?')), KeyCode::Slash);
        assert_eq!(translate_key(HostKey::Char('Q')), KeyCode::Q);
        assert_eq!(translate_key(HostKey::Char('é')), KeyCode::Unknown);
    }

    #[test]
    fn test_keypad_and_function_keys() {
        assert_eq!(translate_key(HostKey::Keypad('5')), KeyCode::Kp5);
        assert_eq!(translate_key(HostKey::Keypad('\n')), KeyCode::KpEnter);
        assert_eq!(translate_key(HostKey::F(11)), KeyCode::F11);
        assert_eq!(translate_key(HostKey::F(13)), KeyCode::Unknown);
        assert_eq!(translate_key(HostKey::Other(0x1234)), KeyCode::Unknown);
    }

    #[test]
    fn test_modifiers_map_to_left_variants() {
        // Arrange
        let mods = HostModifiers {
            shift: true,
            ctrl: true,
            alt: true,
            num_lock: false,
        };

        // Act
        let translated = translate_mods(mods);

        // Assert
        assert_eq!(
            translated,
            KeyMods(KeyMods::LSHIFT | KeyMods::LCTRL | KeyMods::LALT)
        );
    }

    #[test]
    fn test_printing_key_queues_key_and_text() {
        // Arrange
        let (mut t, queue) = translator();

        // Act
        t.key_event(HostKey::Char('a'), HostModifiers::default(), "a", true);

        // Assert
        assert_eq!(
            drain(&queue),
            vec![
                SkinEvent::KeyDown {
                    key: KeyCode::A,
                    mods: KeyMods::NONE
                },
                SkinEvent::text_input(b"a", true),
            ]
        );
    }

    #[test]
    fn test_text_suppressed_in_raw_mode_and_with_ctrl() {
        // Arrange
        let (mut t, queue) = translator();
        let ctrl = HostModifiers {
            ctrl: true,
            ..HostModifiers::default()
        };

        // Act
        t.key_event(HostKey::Char('k'), ctrl, "\u{b}", true);
        queue.enable_unicode(false);
        t.key_event(HostKey::Char('a'), HostModifiers::default(), "a", true);

        // Assert
        let kinds: Vec<_> = drain(&queue).iter().map(SkinEvent::kind).collect();
        assert_eq!(kinds, vec![skin_core::EventKind::KeyDown, skin_core::EventKind::KeyDown]);
    }

    #[test]
    fn test_mouse_motion_is_relative_to_previous_position() {
        // Arrange
        let (mut t, queue) = translator();

        // Act
        t.mouse_event(MouseEventKind::Press, HostMouseButton::Left, 10, 20);
        t.mouse_event(MouseEventKind::Move, HostMouseButton::Left, 13, 16);

        // Assert
        let events = drain(&queue);
        assert_eq!(
            events[1],
            SkinEvent::MouseMotion(MouseData {
                x: 13,
                y: 16,
                xrel: 3,
                yrel: -4,
                button: MouseButton::Left,
            })
        );
    }

    #[test]
    fn test_middle_button_reports_as_left() {
        let (mut t, queue) = translator();

        t.mouse_event(MouseEventKind::Press, HostMouseButton::Middle, 0, 0);

        assert!(matches!(
            drain(&queue)[0],
            SkinEvent::MouseButtonDown(MouseData {
                button: MouseButton::Left,
                ..
            })
        ));
    }

    #[test]
    fn test_wheel_is_throttled_and_timer_restarts() {
        // Arrange
        let (mut t, queue) = translator();
        let start = Instant::now();

        // Act
        t.wheel(120, 5, 5, start);
        t.wheel(120, 5, 5, start + Duration::from_millis(60));
        t.wheel(120, 5, 5, start + Duration::from_millis(120));
        t.wheel(-120, 5, 5, start + Duration::from_millis(300));

        // Assert: only the first and last notches get through
        let events = drain(&queue);
        assert_eq!(events.len(), 4);
        assert!(matches!(
            events[0],
            SkinEvent::MouseButtonDown(MouseData {
                button: MouseButton::WheelUp,
                ..
            })
        ));
        assert!(matches!(
            events[3],
            SkinEvent::MouseButtonUp(MouseData {
                button: MouseButton::WheelDown,
                ..
            })
        ));
    }

    #[test]
    fn test_simulate_key_press_queues_down_then_up() {
        let (t, queue) = translator();

        t.simulate_key_press(KeyCode::Home, KeyMods::NONE);

        assert_eq!(
            drain(&queue),
            vec![
                SkinEvent::KeyDown {
                    key: KeyCode::Home,
                    mods: KeyMods::NONE
                },
                SkinEvent::KeyUp {
                    key: KeyCode::Home,
                    mods: KeyMods::NONE
                },
            ]
        );
    }

    #[test]
    fn test_close_becomes_quit_and_window_events_are_declined() {
        // Arrange
        let (mut t, queue) = translator();

        // Act
        let close = t.handle(&HostEvent::CloseRequested);
        let zoom = t.handle(&HostEvent::ZoomIn);

        // Assert
        assert!(close);
        assert!(!zoom);
        assert_eq!(drain(&queue), vec![SkinEvent::Quit]);
    }

    #[test]
    fn test_channel_source_starts_once() {
        // Arrange
        let mut source = ChannelHostSource::new();
        let sender = source.sender();

        // Act
        let mut rx = source.start().expect("first start succeeds");
        sender.send(HostEvent::ZoomIn).expect("receiver alive");

        // Assert
        assert_eq!(rx.try_recv().ok(), Some(HostEvent::ZoomIn));
        assert!(matches!(source.start(), Err(HostSourceError::AlreadyStarted)));
    }
}
