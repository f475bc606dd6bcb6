//! Keysets: host key bindings for UI commands.
//!
//! A keyset maps `(key, modifiers)` pairs to [`KeyCommand`]s such as "toggle
//! trackball" or "next layout".  When the keyboard sees a bound key it
//! dispatches the command instead of injecting a key into the device.
//!
//! Keysets are plain text, one command per line:
//!
//! ```text
//! # command             bindings
//! TOGGLE_TRACKBALL      F6
//! CHANGE_LAYOUT_NEXT    Keypad_9, Ctrl-F12
//! ```
//!
//! The built-in default keyset is parsed once and shared by every keyboard
//! through an `Arc`; replacing a keyboard's keyset never touches it.

use std::sync::{Arc, OnceLock};

use thiserror::Error;
use tracing::{debug, error};

use super::keycode::{key_pair_from_string, key_pair_to_string, KeyCode};
use crate::domain::event::KeyMods;

/// A command may be bound to at most this many key pairs.
pub const MAX_BINDINGS: usize = 3;

/// Error type for keyset parsing.
#[derive(Debug, Error, PartialEq)]
pub enum KeysetError {
    #[error("line {line}: invalid key binding {text:?}")]
    BadKeyPair { line: usize, text: String },
    #[error("line {line}: command {command} has no bindings")]
    MissingBindings { line: usize, command: String },
}

/// Abstract UI commands a key can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCommand {
    ButtonCall,
    ButtonHome,
    ButtonBack,
    ButtonHangup,
    ButtonPower,
    ButtonSearch,
    ButtonMenu,
    ButtonStar,
    ButtonPound,
    ButtonDpadUp,
    ButtonDpadDown,
    ButtonDpadLeft,
    ButtonDpadRight,
    ButtonDpadCenter,
    ButtonVolumeUp,
    ButtonVolumeDown,
    ButtonCamera,
    ButtonTv,
    ButtonEpg,
    ButtonDvr,
    ButtonPrev,
    ButtonNext,
    ButtonPlay,
    ButtonPlayPause,
    ButtonPause,
    ButtonStop,
    ButtonRewind,
    ButtonFastForward,
    ButtonBookmarks,
    ButtonWindow,
    ButtonChannelUp,
    ButtonChannelDown,
    ButtonAppSwitch,
    ButtonHomePage,
    ChangeLayoutPrev,
    ChangeLayoutNext,
    ToggleNetwork,
    ToggleTracing,
    ToggleFullscreen,
    ToggleTrackball,
    ShowTrackball,
    OnionAlphaUp,
    OnionAlphaDown,
}

const COMMAND_NAMES: &[(KeyCommand, &str)] = &[
    (KeyCommand::ButtonCall, "BUTTON_CALL"),
    (KeyCommand::ButtonHome, "BUTTON_HOME"),
    (KeyCommand::ButtonBack, "BUTTON_BACK"),
    (KeyCommand::ButtonHangup, "BUTTON_HANGUP"),
    (KeyCommand::ButtonPower, "BUTTON_POWER"),
    (KeyCommand::ButtonSearch, "BUTTON_SEARCH"),
    (KeyCommand::ButtonMenu, "BUTTON_MENU"),
    (KeyCommand::ButtonStar, "BUTTON_STAR"),
    (KeyCommand::ButtonPound, "BUTTON_POUND"),
    (KeyCommand::ButtonDpadUp, "BUTTON_DPAD_UP"),
    (KeyCommand::ButtonDpadDown, "BUTTON_DPAD_DOWN"),
    (KeyCommand::ButtonDpadLeft, "BUTTON_DPAD_LEFT"),
    (KeyCommand::ButtonDpadRight, "BUTTON_DPAD_RIGHT"),
    (KeyCommand::ButtonDpadCenter, "BUTTON_DPAD_CENTER"),
    (KeyCommand::ButtonVolumeUp, "BUTTON_VOLUME_UP"),
    (KeyCommand::ButtonVolumeDown, "BUTTON_VOLUME_DOWN"),
    (KeyCommand::ButtonCamera, "BUTTON_CAMERA"),
    (KeyCommand::ButtonTv, "BUTTON_TV"),
    (KeyCommand::ButtonEpg, "BUTTON_EPG"),
    (KeyCommand::ButtonDvr, "BUTTON_DVR"),
    (KeyCommand::ButtonPrev, "BUTTON_PREV"),
    (KeyCommand::ButtonNext, "BUTTON_NEXT"),
    (KeyCommand::ButtonPlay, "BUTTON_PLAY"),
    (KeyCommand::ButtonPlayPause, "BUTTON_PLAYPAUSE"),
    (KeyCommand::ButtonPause, "BUTTON_PAUSE"),
    (KeyCommand::ButtonStop, "BUTTON_STOP"),
    (KeyCommand::ButtonRewind, "BUTTON_REWIND"),
    (KeyCommand::ButtonFastForward, "BUTTON_FFWD"),
    (KeyCommand::ButtonBookmarks, "BUTTON_BOOKMARKS"),
    (KeyCommand::ButtonWindow, "BUTTON_WINDOW"),
    (KeyCommand::ButtonChannelUp, "BUTTON_CHANNELUP"),
    (KeyCommand::ButtonChannelDown, "BUTTON_CHANNELDOWN"),
    (KeyCommand::ButtonAppSwitch, "BUTTON_APPSWITCH"),
    (KeyCommand::ButtonHomePage, "BUTTON_HOMEPAGE"),
    (KeyCommand::ChangeLayoutPrev, "CHANGE_LAYOUT_PREV"),
    (KeyCommand::ChangeLayoutNext, "CHANGE_LAYOUT_NEXT"),
    (KeyCommand::ToggleNetwork, "TOGGLE_NETWORK"),
    (KeyCommand::ToggleTracing, "TOGGLE_TRACING"),
    (KeyCommand::ToggleFullscreen, "TOGGLE_FULLSCREEN"),
    (KeyCommand::ToggleTrackball, "TOGGLE_TRACKBALL"),
    (KeyCommand::ShowTrackball, "SHOW_TRACKBALL"),
    (KeyCommand::OnionAlphaUp, "ONION_ALPHA_UP"),
    (KeyCommand::OnionAlphaDown, "ONION_ALPHA_DOWN"),
];

impl KeyCommand {
    pub fn name(self) -> &'static str {
        COMMAND_NAMES
            .iter()
            .find(|(c, _)| *c == self)
            .map(|(_, n)| *n)
            .unwrap_or("NONE")
    }

    pub fn from_name(name: &str) -> Option<Self> {
        COMMAND_NAMES
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(name))
            .map(|(c, _)| *c)
    }

    /// Device key pressed by a `BUTTON_*` command, `None` for UI commands.
    pub fn button_key(self) -> Option<KeyCode> {
        let key = match self {
            KeyCommand::ButtonCall => KeyCode::CALL,
            KeyCommand::ButtonHome => KeyCode::Home,
            KeyCommand::ButtonHomePage => KeyCode::HomePage,
            KeyCommand::ButtonBack => KeyCode::Back,
            KeyCommand::ButtonHangup => KeyCode::END_CALL,
            KeyCommand::ButtonPower => KeyCode::Power,
            KeyCommand::ButtonSearch => KeyCode::Search,
            KeyCommand::ButtonMenu => KeyCode::MENU,
            KeyCommand::ButtonStar => KeyCode::Star,
            KeyCommand::ButtonPound => KeyCode::Pound,
            KeyCommand::ButtonDpadUp => KeyCode::DPAD_UP,
            KeyCommand::ButtonDpadLeft => KeyCode::DPAD_LEFT,
            KeyCommand::ButtonDpadRight => KeyCode::DPAD_RIGHT,
            KeyCommand::ButtonDpadDown => KeyCode::DPAD_DOWN,
            KeyCommand::ButtonDpadCenter => KeyCode::DPAD_CENTER,
            KeyCommand::ButtonVolumeUp => KeyCode::VolumeUp,
            KeyCommand::ButtonVolumeDown => KeyCode::VolumeDown,
            KeyCommand::ButtonCamera => KeyCode::Camera,
            KeyCommand::ButtonTv => KeyCode::Tv,
            KeyCommand::ButtonEpg => KeyCode::Program,
            KeyCommand::ButtonDvr => KeyCode::Pvr,
            KeyCommand::ButtonPrev => KeyCode::Previous,
            KeyCommand::ButtonNext => KeyCode::Next,
            KeyCommand::ButtonPlay => KeyCode::Play,
            KeyCommand::ButtonPlayPause => KeyCode::PlayPause,
            KeyCommand::ButtonPause => KeyCode::Pause,
            KeyCommand::ButtonStop => KeyCode::Stop,
            KeyCommand::ButtonRewind => KeyCode::Rewind,
            KeyCommand::ButtonFastForward => KeyCode::FastForward,
            KeyCommand::ButtonBookmarks => KeyCode::Bookmarks,
            KeyCommand::ButtonWindow => KeyCode::CycleWindows,
            KeyCommand::ButtonChannelUp => KeyCode::ChannelUp,
            KeyCommand::ButtonChannelDown => KeyCode::ChannelDown,
            KeyCommand::ButtonAppSwitch => KeyCode::AppSwitch,
            _ => return None,
        };
        Some(key)
    }
}

/// Bindings shipped with the emulator, used when no keyset file exists.
pub const DEFAULT_KEYSET_TEXT: &str = "\
BUTTON_CALL              F3
BUTTON_HANGUP            F4
BUTTON_HOME              Home
BUTTON_BACK              Escape
BUTTON_MENU              F2, PageUp
BUTTON_STAR              Shift-F2, PageDown
BUTTON_POWER             F7
BUTTON_SEARCH            F5
BUTTON_CAMERA            Ctrl-Keypad_5, Ctrl-F3
BUTTON_VOLUME_UP         Keypad_Plus, Ctrl-F5
BUTTON_VOLUME_DOWN       Keypad_Minus, Ctrl-F6

TOGGLE_NETWORK           F8
TOGGLE_TRACING           F9
TOGGLE_FULLSCREEN        Alt-Enter

BUTTON_DPAD_CENTER       Keypad_5
BUTTON_DPAD_UP           Keypad_8
BUTTON_DPAD_LEFT         Keypad_4
BUTTON_DPAD_RIGHT        Keypad_6
BUTTON_DPAD_DOWN         Keypad_2

TOGGLE_TRACKBALL         F6
SHOW_TRACKBALL           Delete

CHANGE_LAYOUT_PREV       Keypad_7, Ctrl-F11
CHANGE_LAYOUT_NEXT       Keypad_9, Ctrl-F12
ONION_ALPHA_UP           Keypad_Multiply
ONION_ALPHA_DOWN         Keypad_Divide
";

/// One `(key, modifiers) → command` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    pub key: KeyCode,
    pub mods: KeyMods,
    pub command: KeyCommand,
}

impl KeyBinding {
    /// Compares modifiers ignoring left/right and NumLock.
    fn matches(&self, key: KeyCode, mods: KeyMods) -> bool {
        self.key == key
            && self.mods.ctrl() == mods.ctrl()
            && self.mods.alt() == mods.alt()
            && self.mods.shift() == mods.shift()
    }
}

/// A binding table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Keyset {
    bindings: Vec<KeyBinding>,
}

impl Keyset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses keyset text.
    ///
    /// Unknown command names are skipped with a debug log so newer keyset
    /// files keep working.
    ///
    /// # Errors
    ///
    /// Returns [`KeysetError`] for malformed key pairs or bare command lines.
    pub fn parse(text: &str) -> Result<Self, KeysetError> {
        let mut keyset = Self::new();
        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            let trimmed = raw.split('#').next().unwrap_or("").trim();
            if trimmed.is_empty() {
                continue;
            }
            let (name, rest) = trimmed
                .split_once(char::is_whitespace)
                .unwrap_or((trimmed, ""));
            let Some(command) = KeyCommand::from_name(name) else {
                debug!(line, command = name, "ignoring unknown keyset command");
                continue;
            };
            let pairs: Vec<&str> = rest
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|p| !p.is_empty())
                .collect();
            if pairs.is_empty() {
                return Err(KeysetError::MissingBindings {
                    line,
                    command: name.to_string(),
                });
            }
            for pair in pairs {
                let (key, mods) =
                    key_pair_from_string(pair).ok_or_else(|| KeysetError::BadKeyPair {
                        line,
                        text: pair.to_string(),
                    })?;
                keyset.bind(key, mods, command);
            }
        }
        Ok(keyset)
    }

    /// The shared built-in keyset, parsed on first use.
    pub fn default_shared() -> Arc<Keyset> {
        static DEFAULT: OnceLock<Arc<Keyset>> = OnceLock::new();
        DEFAULT
            .get_or_init(|| match Keyset::parse(DEFAULT_KEYSET_TEXT) {
                Ok(keyset) => Arc::new(keyset),
                Err(e) => {
                    error!("built-in keyset is invalid: {e}");
                    Arc::new(Keyset::new())
                }
            })
            .clone()
    }

    /// Adds a binding.  A command keeps at most [`MAX_BINDINGS`] bindings;
    /// extra ones are dropped.
    pub fn bind(&mut self, key: KeyCode, mods: KeyMods, command: KeyCommand) {
        let existing = self.bindings.iter().filter(|b| b.command == command).count();
        if existing >= MAX_BINDINGS {
            debug!(command = command.name(), "too many bindings, dropping {}", key.name());
            return;
        }
        self.bindings.push(KeyBinding { key, mods, command });
    }

    /// Command bound to `key` with `mods`, if any.
    pub fn command_for(&self, key: KeyCode, mods: KeyMods) -> Option<KeyCommand> {
        self.bindings
            .iter()
            .find(|b| b.matches(key, mods))
            .map(|b| b.command)
    }

    /// All bindings of `command`, in file order.
    pub fn bindings_for(&self, command: KeyCommand) -> Vec<KeyBinding> {
        self.bindings
            .iter()
            .filter(|b| b.command == command)
            .copied()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Renders the keyset back to its text form.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (command, name) in COMMAND_NAMES {
            let pairs: Vec<String> = self
                .bindings_for(*command)
                .iter()
                .map(|b| key_pair_to_string(b.key, b.mods))
                .collect();
            if !pairs.is_empty() {
                out.push_str(&format!("{name:<24} {}\n", pairs.join(", ")));
            }
        }
        out
    }
}
