//! Device key codes.
//!
//! The emulated device consumes Linux input-event key codes (`KEY_*` from
//! `linux/input.h`), extended with a handful of device-specific codes such as
//! `Star`, `Pound` and the two soft keys.  Every code carries a canonical name
//! used by keyset files, window titles and logs.
//!
//! # The `Unknown` sentinel
//!
//! A host key with no device equivalent is represented by [`KeyCode::Unknown`]
//! (value 0).  The keyboard remapper never injects it; it only flows through
//! the pipeline so that keyset and Ctrl-K handling can still inspect it.
//!
//! # Arrow rotation
//!
//! When the device screen is rotated, the arrow keys must be remapped so that
//! "up" on the host keyboard still means "up" on the rotated screen.  The four
//! arrows form a wheel `[Up, Left, Down, Right]`; rotating by `n` quarter turns
//! advances `n` positions around the wheel (negative `n` goes backwards).

use serde::{Deserialize, Serialize};

use crate::domain::event::KeyMods;

/// A device key code (Linux input code, `u16` wide).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u16)]
pub enum KeyCode {
    Unknown = 0,

    Escape = 1,
    Num1 = 2,
    Num2 = 3,
    Num3 = 4,
    Num4 = 5,
    Num5 = 6,
    Num6 = 7,
    Num7 = 8,
    Num8 = 9,
    Num9 = 10,
    Num0 = 11,
    Minus = 12,
    Equal = 13,
    Backspace = 14,
    Tab = 15,
    Q = 16,
    W = 17,
    E = 18,
    R = 19,
    T = 20,
    Y = 21,
    U = 22,
    I = 23,
    O = 24,
    P = 25,
    LeftBrace = 26,
    RightBrace = 27,
    Enter = 28,
    LeftCtrl = 29,
    A = 30,
    S = 31,
    D = 32,
    F = 33,
    G = 34,
    H = 35,
    J = 36,
    K = 37,
    L = 38,
    Semicolon = 39,
    Apostrophe = 40,
    Grave = 41,
    LeftShift = 42,
    Backslash = 43,
    Z = 44,
    X = 45,
    C = 46,
    V = 47,
    B = 48,
    N = 49,
    M = 50,
    Comma = 51,
    Dot = 52,
    Slash = 53,
    RightShift = 54,
    KpAsterisk = 55,
    LeftAlt = 56,
    Space = 57,
    CapsLock = 58,
    F1 = 59,
    F2 = 60,
    F3 = 61,
    F4 = 62,
    F5 = 63,
    F6 = 64,
    F7 = 65,
    F8 = 66,
    F9 = 67,
    F10 = 68,
    NumLock = 69,
    ScrollLock = 70,
    Kp7 = 71,
    Kp8 = 72,
    Kp9 = 73,
    KpMinus = 74,
    Kp4 = 75,
    Kp5 = 76,
    Kp6 = 77,
    KpPlus = 78,
    Kp1 = 79,
    Kp2 = 80,
    Kp3 = 81,
    Kp0 = 82,
    KpDot = 83,
    F11 = 87,
    F12 = 88,
    KpEnter = 96,
    RightCtrl = 97,
    KpSlash = 98,
    SysRq = 99,
    RightAlt = 100,
    Home = 102,
    Up = 103,
    PageUp = 104,
    Left = 105,
    Right = 106,
    /// Also the device's "end call" key.
    End = 107,
    Down = 108,
    PageDown = 109,
    Insert = 110,
    Delete = 111,
    Mute = 113,
    VolumeDown = 114,
    VolumeUp = 115,
    Power = 116,
    KpEqual = 117,
    Pause = 119,
    LeftMeta = 125,
    RightMeta = 126,
    /// The device's "Sym" key.
    Compose = 127,
    Stop = 128,
    Www = 150,
    CycleWindows = 154,
    Mail = 155,
    Bookmarks = 156,
    Back = 158,
    PlayPause = 164,
    Rewind = 168,
    HomePage = 172,
    Play = 207,
    FastForward = 208,
    Camera = 212,
    Email = 215,
    Search = 217,
    HeadsetHook = 226,
    Star = 227,
    Pound = 228,
    /// Left soft key; doubles as the device's Menu key.
    Soft1 = 229,
    Soft2 = 230,
    /// The device's "call" key.
    Send = 231,
    /// D-pad center.
    Center = 232,
    Program = 362,
    Pvr = 366,
    Tv = 377,
    ChannelUp = 402,
    ChannelDown = 403,
    Next = 407,
    Previous = 412,
    AppSwitch = 580,
}

/// Canonical name of every known code, in code order.
///
/// Keypad keys use the `Keypad_` prefix so keyset files stay unambiguous
/// (`Keypad_5` versus `5`).
const KEY_NAMES: &[(KeyCode, &str)] = &[
    (KeyCode::Escape, "Escape"),
    (KeyCode::Num1, "1"),
    (KeyCode::Num2, "2"),
    (KeyCode::Num3, "3"),
    (KeyCode::Num4, "4"),
    (KeyCode::Num5, "5"),
    (KeyCode::Num6, "6"),
    (KeyCode::Num7, "7"),
    (KeyCode::Num8, "8"),
    (KeyCode::Num9, "9"),
    (KeyCode::Num0, "0"),
    (KeyCode::Minus, "Minus"),
    (KeyCode::Equal, "Equals"),
    (KeyCode::Backspace, "BackSpace"),
    (KeyCode::Tab, "Tab"),
    (KeyCode::Q, "Q"),
    (KeyCode::W, "W"),
    (KeyCode::E, "E"),
    (KeyCode::R, "R"),
    (KeyCode::T, "T"),
    (KeyCode::Y, "Y"),
    (KeyCode::U, "U"),
    (KeyCode::I, "I"),
    (KeyCode::O, "O"),
    (KeyCode::P, "P"),
    (KeyCode::LeftBrace, "LeftBracket"),
    (KeyCode::RightBrace, "RightBracket"),
    (KeyCode::Enter, "Enter"),
    (KeyCode::LeftCtrl, "LeftCtrl"),
    (KeyCode::A, "A"),
    (KeyCode::S, "S"),
    (KeyCode::D, "D"),
    (KeyCode::F, "F"),
    (KeyCode::G, "G"),
    (KeyCode::H, "H"),
    (KeyCode::J, "J"),
    (KeyCode::K, "K"),
    (KeyCode::L, "L"),
    (KeyCode::Semicolon, "Semicolon"),
    (KeyCode::Apostrophe, "Apostrophe"),
    (KeyCode::Grave, "Grave"),
    (KeyCode::LeftShift, "LeftShift"),
    (KeyCode::Backslash, "Backslash"),
    (KeyCode::Z, "Z"),
    (KeyCode::X, "X"),
    (KeyCode::C, "C"),
    (KeyCode::V, "V"),
    (KeyCode::B, "B"),
    (KeyCode::N, "N"),
    (KeyCode::M, "M"),
    (KeyCode::Comma, "Comma"),
    (KeyCode::Dot, "Period"),
    (KeyCode::Slash, "Slash"),
    (KeyCode::RightShift, "RightShift"),
    (KeyCode::KpAsterisk, "Keypad_Multiply"),
    (KeyCode::LeftAlt, "LeftAlt"),
    (KeyCode::Space, "Space"),
    (KeyCode::CapsLock, "CapsLock"),
    (KeyCode::F1, "F1"),
    (KeyCode::F2, "F2"),
    (KeyCode::F3, "F3"),
    (KeyCode::F4, "F4"),
    (KeyCode::F5, "F5"),
    (KeyCode::F6, "F6"),
    (KeyCode::F7, "F7"),
    (KeyCode::F8, "F8"),
    (KeyCode::F9, "F9"),
    (KeyCode::F10, "F10"),
    (KeyCode::NumLock, "NumLock"),
    (KeyCode::ScrollLock, "ScrollLock"),
    (KeyCode::Kp7, "Keypad_7"),
    (KeyCode::Kp8, "Keypad_8"),
    (KeyCode::Kp9, "Keypad_9"),
    (KeyCode::KpMinus, "Keypad_Minus"),
    (KeyCode::Kp4, "Keypad_4"),
    (KeyCode::Kp5, "Keypad_5"),
    (KeyCode::Kp6, "Keypad_6"),
    (KeyCode::KpPlus, "Keypad_Plus"),
    (KeyCode::Kp1, "Keypad_1"),
    (KeyCode::Kp2, "Keypad_2"),
    (KeyCode::Kp3, "Keypad_3"),
    (KeyCode::Kp0, "Keypad_0"),
    (KeyCode::KpDot, "Keypad_Period"),
    (KeyCode::F11, "F11"),
    (KeyCode::F12, "F12"),
    (KeyCode::KpEnter, "Keypad_Enter"),
    (KeyCode::RightCtrl, "RightCtrl"),
    (KeyCode::KpSlash, "Keypad_Divide"),
    (KeyCode::SysRq, "SysRq"),
    (KeyCode::RightAlt, "RightAlt"),
    (KeyCode::Home, "Home"),
    (KeyCode::Up, "Up"),
    (KeyCode::PageUp, "PageUp"),
    (KeyCode::Left, "Left"),
    (KeyCode::Right, "Right"),
    (KeyCode::End, "End"),
    (KeyCode::Down, "Down"),
    (KeyCode::PageDown, "PageDown"),
    (KeyCode::Insert, "Insert"),
    (KeyCode::Delete, "Delete"),
    (KeyCode::Mute, "Mute"),
    (KeyCode::VolumeDown, "VolumeDown"),
    (KeyCode::VolumeUp, "VolumeUp"),
    (KeyCode::Power, "Power"),
    (KeyCode::KpEqual, "Keypad_Equals"),
    (KeyCode::Pause, "Pause"),
    (KeyCode::LeftMeta, "LeftMeta"),
    (KeyCode::RightMeta, "RightMeta"),
    (KeyCode::Compose, "Sym"),
    (KeyCode::Stop, "Stop"),
    (KeyCode::Www, "Explorer"),
    (KeyCode::CycleWindows, "CycleWindows"),
    (KeyCode::Mail, "Envelope"),
    (KeyCode::Bookmarks, "Bookmarks"),
    (KeyCode::Back, "Back"),
    (KeyCode::PlayPause, "PlayPause"),
    (KeyCode::Rewind, "Rewind"),
    (KeyCode::HomePage, "HomePage"),
    (KeyCode::Play, "Play"),
    (KeyCode::FastForward, "FastForward"),
    (KeyCode::Camera, "Camera"),
    (KeyCode::Email, "At"),
    (KeyCode::Search, "Search"),
    (KeyCode::HeadsetHook, "HeadsetHook"),
    (KeyCode::Star, "Star"),
    (KeyCode::Pound, "Pound"),
    (KeyCode::Soft1, "SoftLeft"),
    (KeyCode::Soft2, "SoftRight"),
    (KeyCode::Send, "Call"),
    (KeyCode::Center, "DpadCenter"),
    (KeyCode::Program, "EPG"),
    (KeyCode::Pvr, "DVR"),
    (KeyCode::Tv, "TV"),
    (KeyCode::ChannelUp, "ChannelUp"),
    (KeyCode::ChannelDown, "ChannelDown"),
    (KeyCode::Next, "Next"),
    (KeyCode::Previous, "Previous"),
    (KeyCode::AppSwitch, "AppSwitch"),
];

/// Arrow keys in rotation order.  One positive quarter turn moves one slot right.
const ARROW_WHEEL: [KeyCode; 4] = [KeyCode::Up, KeyCode::Left, KeyCode::Down, KeyCode::Right];

/// Keypad keys swallowed while NumLock is active.
const KEYPAD_KEYS: &[KeyCode] = &[
    KeyCode::Kp0,
    KeyCode::Kp1,
    KeyCode::Kp2,
    KeyCode::Kp3,
    KeyCode::Kp4,
    KeyCode::Kp5,
    KeyCode::Kp6,
    KeyCode::Kp7,
    KeyCode::Kp8,
    KeyCode::Kp9,
    KeyCode::KpPlus,
    KeyCode::KpMinus,
    KeyCode::KpAsterisk,
    KeyCode::KpSlash,
    KeyCode::KpEqual,
    KeyCode::KpDot,
    KeyCode::KpEnter,
];

impl KeyCode {
    /// The device's D-pad keys share codes with the arrow keys.
    pub const DPAD_UP: KeyCode = KeyCode::Up;
    pub const DPAD_DOWN: KeyCode = KeyCode::Down;
    pub const DPAD_LEFT: KeyCode = KeyCode::Left;
    pub const DPAD_RIGHT: KeyCode = KeyCode::Right;
    pub const DPAD_CENTER: KeyCode = KeyCode::Center;
    pub const MENU: KeyCode = KeyCode::Soft1;
    pub const CALL: KeyCode = KeyCode::Send;
    pub const END_CALL: KeyCode = KeyCode::End;
    pub const SYM: KeyCode = KeyCode::Compose;

    /// Converts a raw input code to a [`KeyCode`].
    ///
    /// Returns [`KeyCode::Unknown`] for any value without a variant.
    pub fn from_u16(value: u16) -> Self {
        KEY_NAMES
            .iter()
            .find(|(code, _)| code.as_u16() == value)
            .map(|(code, _)| *code)
            .unwrap_or(KeyCode::Unknown)
    }

    /// Returns the raw input code.
    pub fn as_u16(self) -> u16 {
        self as u16
    }

    /// Returns `true` for every code except [`KeyCode::Unknown`].
    pub fn is_known(self) -> bool {
        self != KeyCode::Unknown
    }

    /// Canonical name, e.g. `"Keypad_5"` or `"F3"`.
    pub fn name(self) -> &'static str {
        KEY_NAMES
            .iter()
            .find(|(code, _)| *code == self)
            .map(|(_, name)| *name)
            .unwrap_or("Unknown")
    }

    /// Looks a key up by its canonical name (ASCII case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        KEY_NAMES
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(name))
            .map(|(code, _)| *code)
    }

    pub fn is_arrow(self) -> bool {
        ARROW_WHEEL.contains(&self)
    }

    pub fn is_keypad(self) -> bool {
        KEYPAD_KEYS.contains(&self)
    }

    /// Rotates an arrow key by `quarter_turns` (any sign, taken modulo 4).
    ///
    /// Non-arrow keys are returned unchanged.
    pub fn rotate(self, quarter_turns: i32) -> Self {
        match ARROW_WHEEL.iter().position(|k| *k == self) {
            Some(index) => {
                let slot = (index as i32 + quarter_turns).rem_euclid(4) as usize;
                ARROW_WHEEL[slot]
            }
            None => self,
        }
    }

    /// Returns `true` for the Alt/Shift/Sym keys that the unicode-mode
    /// keyboard never forwards on their own.
    pub fn is_synthesized_modifier(self) -> bool {
        matches!(
            self,
            KeyCode::LeftAlt
                | KeyCode::RightAlt
                | KeyCode::LeftShift
                | KeyCode::RightShift
                | KeyCode::Compose
        )
    }
}

// ── Key pairs ─────────────────────────────────────────────────────────────────

/// Renders a key plus modifiers the way keyset files spell it, e.g. `Ctrl-K`.
///
/// Left and right variants of a modifier print the same prefix.
pub fn key_pair_to_string(code: KeyCode, mods: KeyMods) -> String {
    let mut out = String::new();
    if mods.ctrl() {
        out.push_str("Ctrl-");
    }
    if mods.alt() {
        out.push_str("Alt-");
    }
    if mods.shift() {
        out.push_str("Shift-");
    }
    out.push_str(code.name());
    out
}

/// Parses a `Ctrl-Alt-K`-style key pair.
///
/// Modifier prefixes are case-insensitive and map to the left-hand variant.
/// Returns `None` if the key name is unknown.
pub fn key_pair_from_string(text: &str) -> Option<(KeyCode, KeyMods)> {
    let mut mods = KeyMods::NONE;
    let mut rest = text.trim();
    loop {
        let Some((prefix, tail)) = rest.split_once('-') else {
            break;
        };
        let bit = match prefix.to_ascii_lowercase().as_str() {
            "ctrl" | "control" => KeyMods::LCTRL,
            "alt" => KeyMods::LALT,
            "shift" => KeyMods::LSHIFT,
            _ => break,
        };
        mods = mods.with(bit);
        rest = tail;
    }
    KeyCode::from_name(rest).map(|code| (code, mods))
}
