//! KeyboardRemapper: turns host key and text events into device key events.
//!
//! Two modes are supported:
//!
//! - **unicode** (default) – text-input events are reverse-mapped through the
//!   active [`Charmap`], synthesizing Shift/Alt around the base key as needed.
//!   Plain key events only reach the device for arrows and a fixed allowlist.
//! - **raw** – text input is ignored and keys are forwarded as-is.
//!
//! `Ctrl-K` flips between them and tells the host translator (through the
//! [`EventQueue`]) whether to keep producing text events.
//!
//! Key events bound in the active [`Keyset`] never reach the device; they are
//! handed to a [`KeyCommandHandler`] instead.
//!
//! Resolved device key events are buffered and flushed to the
//! [`DeviceInputSink`] once per processed input event.

use std::sync::Arc;

use skin_core::{Charmap, DeviceKeyEvent, KeyCode, KeyCommand, KeyMods, Keyset, SkinEvent};
use tracing::{debug, trace};

use super::event_queue::EventQueue;
use super::sinks::DeviceInputSink;

/// Keys injected in every mode.
const ALWAYS_FORWARDED: &[KeyCode] = &[
    KeyCode::AppSwitch,
    KeyCode::Play,
    KeyCode::Back,
    KeyCode::Power,
    KeyCode::Backspace,
    KeyCode::Soft1,
    KeyCode::Center,
    KeyCode::Rewind,
    KeyCode::Enter,
    KeyCode::VolumeDown,
    KeyCode::FastForward,
    KeyCode::VolumeUp,
    KeyCode::Home,
];

/// Receiver of keyset commands.
pub trait KeyCommandHandler {
    fn on_command(&mut self, command: KeyCommand, down: bool);
}

/// Called with every device key event before it is buffered.
pub type KeyPressObserver = Box<dyn FnMut(KeyCode, bool) + Send>;

/// Construction options for [`KeyboardRemapper`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyboardOptions {
    /// Start in raw mode.
    pub raw_keys: bool,
    /// Forward every known key unchanged, skipping rotation and keyset lookup.
    pub passthrough: bool,
}

pub struct KeyboardRemapper {
    charmap: Arc<Charmap>,
    keyset: Arc<Keyset>,
    rotation: i32,
    raw_keys: bool,
    passthrough: bool,
    enabled: bool,
    buffer: Vec<DeviceKeyEvent>,
    press_observer: Option<KeyPressObserver>,
    queue: Arc<EventQueue>,
    device: Arc<dyn DeviceInputSink>,
}

impl KeyboardRemapper {
    /// Creates a disabled keyboard using the shared default keyset.
    pub fn new(
        charmap: Arc<Charmap>,
        options: KeyboardOptions,
        queue: Arc<EventQueue>,
        device: Arc<dyn DeviceInputSink>,
    ) -> Self {
        debug!(
            charmap = charmap.name(),
            raw = options.raw_keys,
            passthrough = options.passthrough,
            "keyboard created"
        );
        Self {
            charmap,
            keyset: Keyset::default_shared(),
            rotation: 0,
            raw_keys: options.raw_keys,
            passthrough: options.passthrough,
            enabled: false,
            buffer: Vec::with_capacity(16),
            press_observer: None,
            queue,
            device,
        }
    }

    /// Enables or disables the keyboard.  Enabling re-announces the unicode mode.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if enabled {
            self.queue.enable_unicode(!self.raw_keys);
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_raw(&self) -> bool {
        self.raw_keys
    }

    /// Replaces the active keyset.
    pub fn set_keyset(&mut self, keyset: Arc<Keyset>) {
        self.keyset = keyset;
    }

    pub fn keyset(&self) -> &Arc<Keyset> {
        &self.keyset
    }

    pub fn charmap(&self) -> &Charmap {
        &self.charmap
    }

    /// Sets the D-pad rotation in quarter turns (taken modulo 4).
    pub fn set_rotation(&mut self, quarter_turns: i32) {
        self.rotation = quarter_turns & 3;
    }

    pub fn rotation(&self) -> i32 {
        self.rotation
    }

    pub fn set_press_observer(&mut self, observer: KeyPressObserver) {
        self.press_observer = Some(observer);
    }

    /// Processes one key or text event.  Other event kinds are ignored.
    pub fn process_event(&mut self, event: &SkinEvent, handler: &mut dyn KeyCommandHandler) {
        if !self.enabled {
            trace!("keyboard disabled, ignoring {:?}", event.kind());
            return;
        }
        match event {
            SkinEvent::TextInput { text, .. } => {
                if !self.raw_keys {
                    self.process_text(text);
                    self.flush();
                }
            }
            SkinEvent::KeyDown { key, mods } => self.process_key(*key, *mods, true, handler),
            SkinEvent::KeyUp { key, mods } => self.process_key(*key, *mods, false, handler),
            _ => {}
        }
    }

    /// Sends all buffered key events to the device as one batch.
    pub fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        self.device.send_key_codes(&self.buffer);
        self.buffer.clear();
    }

    /// Types every codepoint of `text` (press then release), stopping at the
    /// first NUL byte or malformed UTF-8 sequence.
    fn process_text(&mut self, text: &[u8]) {
        let text = text
            .iter()
            .position(|&b| b == 0)
            .map_or(text, |nul| &text[..nul]);
        let decoded = match std::str::from_utf8(text) {
            Ok(s) => s,
            Err(e) => {
                debug!(valid = e.valid_up_to(), "malformed text input, truncating");
                // `valid_up_to` is always a char boundary.
                std::str::from_utf8(&text[..e.valid_up_to()]).unwrap_or_default()
            }
        };

        let mut resolved = Vec::with_capacity(6);
        for ch in decoded.chars() {
            resolved.clear();
            let mapped = self.charmap.reverse_map_unicode(ch as u32, true, &mut resolved)
                && self.charmap.reverse_map_unicode(ch as u32, false, &mut resolved);
            if !mapped {
                debug!(ch = %ch.escape_unicode(), charmap = self.charmap.name(), "no key for character");
                continue;
            }
            for event in &resolved {
                self.add_key_event(event.key, event.down);
            }
        }
    }

    fn process_key(
        &mut self,
        key: KeyCode,
        mods: KeyMods,
        down: bool,
        handler: &mut dyn KeyCommandHandler,
    ) {
        if self.passthrough && key.is_known() {
            self.add_key_event(key, down);
            self.flush();
            return;
        }

        if key.is_arrow() {
            self.process_arrow(key, mods, down);
            return;
        }

        if mods.num_lock() && key.is_keypad() {
            trace!(key = key.name(), "keypad key suppressed by NumLock");
            return;
        }

        if let Some(command) = self.keyset.command_for(key, mods) {
            debug!(command = command.name(), down, "key bound to command");
            handler.on_command(command, down);
            return;
        }

        if key == KeyCode::K && (mods == KeyMods(KeyMods::LCTRL) || mods == KeyMods(KeyMods::RCTRL)) {
            if down {
                self.raw_keys = !self.raw_keys;
                self.queue.enable_unicode(!self.raw_keys);
                debug!(
                    "switching keyboard to {} mode",
                    if self.raw_keys { "raw" } else { "unicode" }
                );
            }
            return;
        }

        if !self.raw_keys && key.is_synthesized_modifier() {
            return;
        }

        if ALWAYS_FORWARDED.contains(&key) {
            self.add_key_event(key, down);
            self.flush();
            return;
        }

        debug!(key = key.name(), mods = mods.0, "ignoring key");
    }

    /// Rotates an arrow into device orientation and injects it, bracketed by
    /// the held Alt/Shift modifiers unless in raw mode.
    fn process_arrow(&mut self, key: KeyCode, mods: KeyMods, down: bool) {
        let code = key.rotate(-self.rotation);
        trace!(from = key.name(), to = code.name(), rotation = self.rotation, "arrow");

        if self.raw_keys {
            self.add_key_event(code, down);
            self.flush();
            return;
        }

        let held: Vec<KeyCode> = [
            (KeyMods::LALT, KeyCode::LeftAlt),
            (KeyMods::RALT, KeyCode::RightAlt),
            (KeyMods::LSHIFT, KeyCode::LeftShift),
            (KeyMods::RSHIFT, KeyCode::RightShift),
        ]
        .iter()
        .filter(|(bit, _)| mods.contains(*bit))
        .map(|(_, code)| *code)
        .collect();

        if down {
            for modifier in &held {
                self.add_key_event(*modifier, true);
            }
            self.add_key_event(code, true);
        } else {
            self.add_key_event(code, false);
            for modifier in held.iter().rev() {
                self.add_key_event(*modifier, false);
            }
        }
        self.flush();
    }

    fn add_key_event(&mut self, key: KeyCode, down: bool) {
        if let Some(observer) = self.press_observer.as_mut() {
            observer(key, down);
        }
        self.buffer.push(DeviceKeyEvent::new(key, down));
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::sinks::PointerKind;
    use std::sync::Mutex;

    // ── Test doubles ──────────────────────────────────────────────────────────

    #[derive(Default)]
    struct RecordingDevice {
        batches: Mutex<Vec<Vec<DeviceKeyEvent>>>,
        single_keys: Mutex<Vec<(KeyCode, bool)>>,
    }

    impl DeviceInputSink for RecordingDevice {
        fn send_key(&self, code: KeyCode, down: bool) {
            self.single_keys.lock().unwrap().push((code, down));
        }
        fn send_key_codes(&self, events: &[DeviceKeyEvent]) {
            self.batches.lock().unwrap().push(events.to_vec());
        }
        fn send_mouse_event(&self, _x: i32, _y: i32, _kind: PointerKind, _state: i32) {}
        fn send_generic_event(&self, _event_type: u16, _code: u16, _value: i32) {}
    }

    #[derive(Default)]
    struct RecordingHandler {
        commands: Vec<(KeyCommand, bool)>,
    }

    impl KeyCommandHandler for RecordingHandler {
        fn on_command(&mut self, command: KeyCommand, down: bool) {
            self.commands.push((command, down));
        }
    }

    fn make_keyboard(options: KeyboardOptions) -> (KeyboardRemapper, Arc<RecordingDevice>, Arc<EventQueue>) {
        let device = Arc::new(RecordingDevice::default());
        let queue = Arc::new(EventQueue::new());
        let mut kb = KeyboardRemapper::new(
            Arc::new(Charmap::qwerty2()),
            options,
            Arc::clone(&queue),
            Arc::clone(&device) as Arc<dyn DeviceInputSink>,
        );
        kb.set_enabled(true);
        (kb, device, queue)
    }

    fn down(key: KeyCode, mods: u8) -> SkinEvent {
        SkinEvent::KeyDown { key, mods: KeyMods(mods) }
    }

    fn up(key: KeyCode, mods: u8) -> SkinEvent {
        SkinEvent::KeyUp { key, mods: KeyMods(mods) }
    }

    fn ev(key: KeyCode, down: bool) -> DeviceKeyEvent {
        DeviceKeyEvent::new(key, down)
    }

    // ── Text input ────────────────────────────────────────────────────────────

    #[test]
    fn test_text_input_types_each_character_in_one_batch() {
        // Arrange
        let (mut kb, device, _queue) = make_keyboard(KeyboardOptions::default());
        let mut handler = RecordingHandler::default();

        // Act
        kb.process_event(&SkinEvent::text_input(b"aB", true), &mut handler);

        // Assert
        let batches = device.batches.lock().unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(
            batches[0],
            vec![
                ev(KeyCode::A, true),
                ev(KeyCode::A, false),
                ev(KeyCode::LeftShift, true),
                ev(KeyCode::B, true),
                ev(KeyCode::B, false),
                ev(KeyCode::LeftShift, false),
            ]
        );
    }

    #[test]
    fn test_malformed_utf8_delivers_prefix_only() {
        // Arrange
        let (mut kb, device, _queue) = make_keyboard(KeyboardOptions::default());
        let mut handler = RecordingHandler::default();

        // Act: 'a', then a lone continuation byte, then 'b'
        kb.process_event(&SkinEvent::text_input(&[b'a', 0x80, b'b'], true), &mut handler);

        // Assert
        let batches = device.batches.lock().unwrap();
        assert_eq!(batches[0], vec![ev(KeyCode::A, true), ev(KeyCode::A, false)]);
    }

    #[test]
    fn test_text_input_stops_at_nul() {
        // Arrange
        let (mut kb, device, _queue) = make_keyboard(KeyboardOptions::default());
        let mut handler = RecordingHandler::default();

        // Act
        kb.process_event(&SkinEvent::text_input(b"ab\0c", true), &mut handler);

        // Assert
        let batches = device.batches.lock().unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(
            batches[0],
            vec![
                ev(KeyCode::A, true),
                ev(KeyCode::A, false),
                ev(KeyCode::B, true),
                ev(KeyCode::B, false),
            ]
        );
    }

    #[test]
    fn test_text_input_ignored_in_raw_mode() {
        // Arrange
        let (mut kb, device, _queue) = make_keyboard(KeyboardOptions {
            raw_keys: true,
            passthrough: false,
        });
        let mut handler = RecordingHandler::default();

        // Act
        kb.process_event(&SkinEvent::text_input(b"abc", true), &mut handler);

        // Assert
        assert!(device.batches.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unmapped_character_is_skipped() {
        // Arrange
        let (mut kb, device, _queue) = make_keyboard(KeyboardOptions::default());
        let mut handler = RecordingHandler::default();

        // Act
        kb.process_event(&SkinEvent::text_input("\u{4e2d}a".as_bytes(), true), &mut handler);

        // Assert
        let batches = device.batches.lock().unwrap();
        assert_eq!(batches[0], vec![ev(KeyCode::A, true), ev(KeyCode::A, false)]);
    }

    // ── Arrows ────────────────────────────────────────────────────────────────

    #[test]
    fn test_rotated_left_arrow_matches_unrotated_up() {
        // Arrange
        let (mut rotated, rotated_dev, _) = make_keyboard(KeyboardOptions::default());
        rotated.set_rotation(1);
        let (mut plain, plain_dev, _) = make_keyboard(KeyboardOptions::default());
        let mut handler = RecordingHandler::default();

        // Act
        rotated.process_event(&down(KeyCode::Left, 0), &mut handler);
        plain.process_event(&down(KeyCode::Up, 0), &mut handler);

        // Assert
        assert_eq!(
            rotated_dev.batches.lock().unwrap()[0],
            plain_dev.batches.lock().unwrap()[0]
        );
        assert_eq!(plain_dev.batches.lock().unwrap()[0], vec![ev(KeyCode::Up, true)]);
    }

    #[test]
    fn test_arrow_with_modifiers_is_bracketed() {
        // Arrange
        let (mut kb, device, _) = make_keyboard(KeyboardOptions::default());
        let mut handler = RecordingHandler::default();
        let mods = KeyMods::LALT | KeyMods::RSHIFT;

        // Act
        kb.process_event(&down(KeyCode::Down, mods), &mut handler);
        kb.process_event(&up(KeyCode::Down, mods), &mut handler);

        // Assert
        let batches = device.batches.lock().unwrap();
        assert_eq!(
            batches[0],
            vec![
                ev(KeyCode::LeftAlt, true),
                ev(KeyCode::RightShift, true),
                ev(KeyCode::Down, true)
            ]
        );
        assert_eq!(
            batches[1],
            vec![
                ev(KeyCode::Down, false),
                ev(KeyCode::RightShift, false),
                ev(KeyCode::LeftAlt, false)
            ]
        );
    }

    #[test]
    fn test_arrow_in_raw_mode_is_not_bracketed() {
        // Arrange
        let (mut kb, device, _) = make_keyboard(KeyboardOptions {
            raw_keys: true,
            passthrough: false,
        });
        let mut handler = RecordingHandler::default();

        // Act
        kb.process_event(&down(KeyCode::Right, KeyMods::LSHIFT), &mut handler);

        // Assert
        assert_eq!(device.batches.lock().unwrap()[0], vec![ev(KeyCode::Right, true)]);
    }

    // ── Keyset, NumLock, allowlist ────────────────────────────────────────────

    #[test]
    fn test_bound_key_dispatches_command_not_key() {
        // Arrange
        let (mut kb, device, _) = make_keyboard(KeyboardOptions::default());
        let mut handler = RecordingHandler::default();

        // Act
        kb.process_event(&down(KeyCode::F6, 0), &mut handler);
        kb.process_event(&up(KeyCode::F6, 0), &mut handler);

        // Assert
        assert_eq!(
            handler.commands,
            vec![
                (KeyCommand::ToggleTrackball, true),
                (KeyCommand::ToggleTrackball, false)
            ]
        );
        assert!(device.batches.lock().unwrap().is_empty());
    }

    #[test]
    fn test_keypad_suppressed_when_num_lock_active() {
        // Arrange
        let (mut kb, device, _) = make_keyboard(KeyboardOptions::default());
        let mut handler = RecordingHandler::default();

        // Act
        kb.process_event(&down(KeyCode::Kp9, KeyMods::NUMLOCK), &mut handler);

        // Assert
        assert!(handler.commands.is_empty());
        assert!(device.batches.lock().unwrap().is_empty());
    }

    #[test]
    fn test_keypad_dispatches_without_num_lock() {
        // Arrange
        let (mut kb, _device, _) = make_keyboard(KeyboardOptions::default());
        let mut handler = RecordingHandler::default();

        // Act
        kb.process_event(&down(KeyCode::Kp9, 0), &mut handler);

        // Assert
        assert_eq!(handler.commands, vec![(KeyCommand::ChangeLayoutNext, true)]);
    }

    #[test]
    fn test_allowlisted_key_is_injected() {
        // Arrange
        let (mut kb, device, _) = make_keyboard(KeyboardOptions::default());
        let mut handler = RecordingHandler::default();

        // Act
        kb.process_event(&down(KeyCode::Backspace, 0), &mut handler);

        // Assert
        assert_eq!(device.batches.lock().unwrap()[0], vec![ev(KeyCode::Backspace, true)]);
    }

    #[test]
    fn test_unlisted_key_is_dropped() {
        // Arrange
        let (mut kb, device, _) = make_keyboard(KeyboardOptions::default());
        let mut handler = RecordingHandler::default();

        // Act
        kb.process_event(&down(KeyCode::Q, 0), &mut handler);

        // Assert
        assert!(handler.commands.is_empty());
        assert!(device.batches.lock().unwrap().is_empty());
        assert!(device.single_keys.lock().unwrap().is_empty());
    }

    #[test]
    fn test_lone_shift_dropped_in_unicode_mode() {
        // Arrange
        let (mut kb, device, _) = make_keyboard(KeyboardOptions::default());
        let mut handler = RecordingHandler::default();

        // Act
        kb.process_event(&down(KeyCode::LeftShift, KeyMods::LSHIFT), &mut handler);

        // Assert
        assert!(device.batches.lock().unwrap().is_empty());
    }

    // ── Raw / unicode toggle ──────────────────────────────────────────────────

    #[test]
    fn test_ctrl_k_toggles_raw_mode_and_unicode_translation() {
        // Arrange
        let (mut kb, device, queue) = make_keyboard(KeyboardOptions::default());
        let mut handler = RecordingHandler::default();
        assert!(queue.unicode_enabled());

        // Act
        kb.process_event(&down(KeyCode::K, KeyMods::LCTRL), &mut handler);
        kb.process_event(&up(KeyCode::K, KeyMods::LCTRL), &mut handler);

        // Assert
        assert!(kb.is_raw());
        assert!(!queue.unicode_enabled());
        assert!(device.batches.lock().unwrap().is_empty());
    }

    #[test]
    fn test_ctrl_k_double_toggle_restores_state() {
        // Arrange
        let (mut kb, _device, queue) = make_keyboard(KeyboardOptions::default());
        let mut handler = RecordingHandler::default();

        // Act
        for _ in 0..2 {
            kb.process_event(&down(KeyCode::K, KeyMods::RCTRL), &mut handler);
            kb.process_event(&up(KeyCode::K, KeyMods::RCTRL), &mut handler);
        }

        // Assert
        assert!(!kb.is_raw());
        assert!(queue.unicode_enabled());
    }

    #[test]
    fn test_ctrl_shift_k_does_not_toggle() {
        let (mut kb, _device, _queue) = make_keyboard(KeyboardOptions::default());
        let mut handler = RecordingHandler::default();

        kb.process_event(&down(KeyCode::K, KeyMods::LCTRL | KeyMods::LSHIFT), &mut handler);

        assert!(!kb.is_raw());
    }

    // ── Passthrough, observer, enable ─────────────────────────────────────────

    #[test]
    fn test_passthrough_forwards_bound_keys_unchanged() {
        // Arrange
        let (mut kb, device, _) = make_keyboard(KeyboardOptions {
            raw_keys: false,
            passthrough: true,
        });
        kb.set_rotation(1);
        let mut handler = RecordingHandler::default();

        // Act
        kb.process_event(&down(KeyCode::F6, 0), &mut handler);
        kb.process_event(&down(KeyCode::Left, 0), &mut handler);

        // Assert
        assert!(handler.commands.is_empty());
        let batches = device.batches.lock().unwrap();
        assert_eq!(batches[0], vec![ev(KeyCode::F6, true)]);
        assert_eq!(batches[1], vec![ev(KeyCode::Left, true)]);
    }

    #[test]
    fn test_press_observer_sees_every_buffered_event() {
        // Arrange
        let (mut kb, _device, _) = make_keyboard(KeyboardOptions::default());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        kb.set_press_observer(Box::new(move |code, down| {
            seen_clone.lock().unwrap().push((code, down));
        }));
        let mut handler = RecordingHandler::default();

        // Act
        kb.process_event(&SkinEvent::text_input(b"A", true), &mut handler);

        // Assert
        assert_eq!(seen.lock().unwrap().len(), 4);
    }

    #[test]
    fn test_disabled_keyboard_ignores_everything() {
        // Arrange
        let (mut kb, device, _) = make_keyboard(KeyboardOptions::default());
        kb.set_enabled(false);
        let mut handler = RecordingHandler::default();

        // Act
        kb.process_event(&down(KeyCode::Home, 0), &mut handler);
        kb.process_event(&down(KeyCode::F6, 0), &mut handler);

        // Assert
        assert!(handler.commands.is_empty());
        assert!(device.batches.lock().unwrap().is_empty());
    }

    #[test]
    fn test_custom_keyset_replaces_default() {
        // Arrange
        let (mut kb, _device, _) = make_keyboard(KeyboardOptions::default());
        let keyset = Keyset::parse("TOGGLE_FULLSCREEN  F11\n").unwrap();
        kb.set_keyset(Arc::new(keyset));
        let mut handler = RecordingHandler::default();

        // Act
        kb.process_event(&down(KeyCode::F6, 0), &mut handler);
        kb.process_event(&down(KeyCode::F11, 0), &mut handler);

        // Assert
        assert_eq!(handler.commands, vec![(KeyCommand::ToggleFullscreen, true)]);
        assert_eq!(Keyset::default_shared().command_for(KeyCode::F6, KeyMods::NONE), Some(KeyCommand::ToggleTrackball));
    }

    #[test]
    fn test_set_rotation_masks_to_quarter_turns() {
        let (mut kb, _device, _) = make_keyboard(KeyboardOptions::default());
        kb.set_rotation(5);
        assert_eq!(kb.rotation(), 1);
    }
}
