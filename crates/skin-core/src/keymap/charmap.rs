//! Keyboard charmaps: reverse lookup from unicode to device key presses.
//!
//! When the host delivers *text* rather than key presses (unicode mode), the
//! keyboard must work out which device keys would have produced each
//! character.  A charmap lists, for every device key, the character it types
//! on its own (`base`), with Shift (`caps`), with Alt (`fn`) and with both
//! (`caps_fn`).  Reversing that table gives the key and the modifiers to hold.
//!
//! # File format
//!
//! Charmaps are read from `.kcm` text files:
//!
//! ```text
//! [type=QWERTY]
//! # key   display number  base    caps    fn      caps_fn
//! A       'A'     '2'     'a'     'A'     '#'     0x00
//! SPACE   ' '     ' '     ' '     ' '     ' '     ' '
//! ```
//!
//! Character columns are either a quoted character or a `0x` hex codepoint;
//! `0x00` means "no character".  The charmap's name is the file's basename
//! without extension.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use super::keycode::KeyCode;
use crate::domain::event::DeviceKeyEvent;

/// Name of the built-in charmap every lookup falls back to.
pub const DEFAULT_CHARMAP_NAME: &str = "qwerty2";

/// Error type for charmap parsing.
#[derive(Debug, Error, PartialEq)]
pub enum CharmapError {
    #[error("line {line}: expected 7 columns, found {found}")]
    ColumnCount { line: usize, found: usize },
    #[error("line {line}: unknown key name {name:?}")]
    UnknownKey { line: usize, name: String },
    #[error("line {line}: bad character literal {literal:?}")]
    BadCharacter { line: usize, literal: String },
    #[error("charmap {0:?} defines no keys")]
    Empty(String),
}

/// One row of a charmap.  Character fields hold codepoints, 0 for none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharmapEntry {
    pub key: KeyCode,
    pub display: u32,
    pub number: u32,
    pub base: u32,
    pub caps: u32,
    pub fn_: u32,
    pub caps_fn: u32,
}

const fn entry(key: KeyCode, base: char, caps: char) -> CharmapEntry {
    CharmapEntry {
        key,
        display: caps as u32,
        number: base as u32,
        base: base as u32,
        caps: caps as u32,
        fn_: 0,
        caps_fn: 0,
    }
}

const fn alt_entry(key: KeyCode, base: char, caps: char, fn_: char) -> CharmapEntry {
    CharmapEntry {
        key,
        display: caps as u32,
        number: base as u32,
        base: base as u32,
        caps: caps as u32,
        fn_: fn_ as u32,
        caps_fn: 0,
    }
}

/// The built-in `qwerty2` layout.
const QWERTY2: &[CharmapEntry] = &[
    entry(KeyCode::A, 'a', 'A'),
    entry(KeyCode::B, 'b', 'B'),
    entry(KeyCode::C, 'c', 'C'),
    entry(KeyCode::D, 'd', 'D'),
    alt_entry(KeyCode::E, 'e', 'E', '\u{20ac}'),
    entry(KeyCode::F, 'f', 'F'),
    entry(KeyCode::G, 'g', 'G'),
    entry(KeyCode::H, 'h', 'H'),
    entry(KeyCode::I, 'i', 'I'),
    entry(KeyCode::J, 'j', 'J'),
    entry(KeyCode::K, 'k', 'K'),
    entry(KeyCode::L, 'l', 'L'),
    entry(KeyCode::M, 'm', 'M'),
    entry(KeyCode::N, 'n', 'N'),
    entry(KeyCode::O, 'o', 'O'),
    entry(KeyCode::P, 'p', 'P'),
    entry(KeyCode::Q, 'q', 'Q'),
    entry(KeyCode::R, 'r', 'R'),
    alt_entry(KeyCode::S, 's', 'S', '\u{df}'),
    entry(KeyCode::T, 't', 'T'),
    entry(KeyCode::U, 'u', 'U'),
    entry(KeyCode::V, 'v', 'V'),
    entry(KeyCode::W, 'w', 'W'),
    entry(KeyCode::X, 'x', 'X'),
    entry(KeyCode::Y, 'y', 'Y'),
    entry(KeyCode::Z, 'z', 'Z'),
    entry(KeyCode::Num1, '1', '!'),
    entry(KeyCode::Num2, '2', '@'),
    entry(KeyCode::Num3, '3', '#'),
    entry(KeyCode::Num4, '4', '$'),
    entry(KeyCode::Num5, '5', '%'),
    entry(KeyCode::Num6, '6', '^'),
    entry(KeyCode::Num7, '7', '&'),
    entry(KeyCode::Num8, '8', '*'),
    entry(KeyCode::Num9, '9', '('),
    entry(KeyCode::Num0, '0', ')'),
    entry(KeyCode::Minus, '-', '_'),
    entry(KeyCode::Equal, '=', '+'),
    entry(KeyCode::LeftBrace, '[', '{'),
    entry(KeyCode::RightBrace, ']', '}'),
    entry(KeyCode::Backslash, '\\', '|'),
    entry(KeyCode::Semicolon, ';', ':'),
    entry(KeyCode::Apostrophe, '\'', '"'),
    entry(KeyCode::Grave, '`', '~'),
    entry(KeyCode::Comma, ',', '<'),
    entry(KeyCode::Dot, '.', '>'),
    entry(KeyCode::Slash, '/', '?'),
    entry(KeyCode::Space, ' ', ' '),
    entry(KeyCode::Enter, '\n', '\n'),
    entry(KeyCode::Tab, '\t', '\t'),
    entry(KeyCode::Backspace, '\u{8}', '\u{8}'),
];

/// An immutable charmap.
#[derive(Debug, Clone, PartialEq)]
pub struct Charmap {
    name: String,
    entries: Vec<CharmapEntry>,
}

impl Charmap {
    /// The built-in `qwerty2` charmap.
    pub fn qwerty2() -> Self {
        Self {
            name: DEFAULT_CHARMAP_NAME.to_string(),
            entries: QWERTY2.to_vec(),
        }
    }

    /// Parses `.kcm` text.
    ///
    /// # Errors
    ///
    /// Returns a [`CharmapError`] naming the first offending line.
    pub fn parse(name: &str, text: &str) -> Result<Self, CharmapError> {
        let mut entries = Vec::new();
        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('[') {
                continue;
            }
            let columns = split_columns(trimmed);
            if columns.len() != 7 {
                return Err(CharmapError::ColumnCount {
                    line,
                    found: columns.len(),
                });
            }
            let key = KeyCode::from_name(columns[0]).ok_or_else(|| CharmapError::UnknownKey {
                line,
                name: columns[0].to_string(),
            })?;
            let mut chars = [0u32; 6];
            for (slot, literal) in chars.iter_mut().zip(&columns[1..]) {
                *slot = parse_char(literal).ok_or_else(|| CharmapError::BadCharacter {
                    line,
                    literal: literal.to_string(),
                })?;
            }
            entries.push(CharmapEntry {
                key,
                display: chars[0],
                number: chars[1],
                base: chars[2],
                caps: chars[3],
                fn_: chars[4],
                caps_fn: chars[5],
            });
        }
        if entries.is_empty() {
            return Err(CharmapError::Empty(name.to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            entries,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entries(&self) -> &[CharmapEntry] {
        &self.entries
    }

    /// Finds the key and modifiers that type `codepoint`.
    ///
    /// `base` wins over `caps`, which wins over `fn` and `caps_fn`; the first
    /// entry in file order wins among keys.
    pub fn lookup(&self, codepoint: u32) -> Option<(KeyCode, bool, bool)> {
        if codepoint == 0 {
            return None;
        }
        for pass in 0..4 {
            for entry in &self.entries {
                let (candidate, shift, alt) = match pass {
                    0 => (entry.base, false, false),
                    1 => (entry.caps, true, false),
                    2 => (entry.fn_, false, true),
                    _ => (entry.caps_fn, true, true),
                };
                if candidate == codepoint {
                    return Some((entry.key, shift, alt));
                }
            }
        }
        None
    }

    /// Appends the device key events that type `codepoint` to `out`.
    ///
    /// On key-down the needed modifiers go down before the key; on key-up the
    /// key is released first and the modifiers after it, in reverse order.
    /// Returns `false` (and appends nothing) for unmapped characters.
    pub fn reverse_map_unicode(&self, codepoint: u32, down: bool, out: &mut Vec<DeviceKeyEvent>) -> bool {
        let Some((key, shift, alt)) = self.lookup(codepoint) else {
            return false;
        };
        if down {
            if alt {
                out.push(DeviceKeyEvent::new(KeyCode::LeftAlt, true));
            }
            if shift {
                out.push(DeviceKeyEvent::new(KeyCode::LeftShift, true));
            }
            out.push(DeviceKeyEvent::new(key, true));
        } else {
            out.push(DeviceKeyEvent::new(key, false));
            if shift {
                out.push(DeviceKeyEvent::new(KeyCode::LeftShift, false));
            }
            if alt {
                out.push(DeviceKeyEvent::new(KeyCode::LeftAlt, false));
            }
        }
        true
    }
}

/// Splits a kcm line on whitespace, keeping quoted characters (even `' '`) intact.
fn split_columns(line: &str) -> Vec<&str> {
    let bytes = line.as_bytes();
    let mut columns = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_whitespace() {
            i += 1;
            continue;
        }
        let start = i;
        if bytes[i] == b'\'' {
            // Quoted literal: run to the closing quote.
            i += 1;
            while i < bytes.len() && bytes[i] != b'\'' {
                i += 1;
            }
            i = (i + 1).min(bytes.len());
        } else {
            while i < bytes.len() && !bytes[i].is_ascii_whitespace() {
                i += 1;
            }
        }
        if line.is_char_boundary(start) && line.is_char_boundary(i) {
            columns.push(&line[start..i]);
        }
    }
    columns
}

fn parse_char(literal: &str) -> Option<u32> {
    if let Some(hex) = literal
        .strip_prefix("0x")
        .or_else(|| literal.strip_prefix("0X"))
    {
        return u32::from_str_radix(hex, 16).ok();
    }
    let inner = literal.strip_prefix('\'')?.strip_suffix('\'')?;
    let mut chars = inner.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    Some(c as u32)
}

/// Extracts the charmap name from a `.kcm` path: its basename without extension.
///
/// `"/skins/keyboards/azerty.kcm"` → `"azerty"`.
pub fn charmap_name_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
}

// ── Registry ──────────────────────────────────────────────────────────────────

/// Named charmaps available to keyboards, always including `qwerty2`.
#[derive(Debug, Clone)]
pub struct CharmapRegistry {
    charmaps: HashMap<String, Arc<Charmap>>,
}

impl Default for CharmapRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CharmapRegistry {
    pub fn new() -> Self {
        let mut charmaps = HashMap::new();
        charmaps.insert(DEFAULT_CHARMAP_NAME.to_string(), Arc::new(Charmap::qwerty2()));
        Self { charmaps }
    }

    /// Adds or replaces a charmap under its own name.
    pub fn register(&mut self, charmap: Charmap) {
        debug!(name = charmap.name(), keys = charmap.entries().len(), "registered charmap");
        self.charmaps
            .insert(charmap.name().to_string(), Arc::new(charmap));
    }

    pub fn get(&self, name: &str) -> Option<Arc<Charmap>> {
        self.charmaps.get(name).cloned()
    }

    /// The built-in fallback charmap.
    pub fn default_charmap(&self) -> Arc<Charmap> {
        self.charmaps
            .get(DEFAULT_CHARMAP_NAME)
            .cloned()
            .unwrap_or_else(|| Arc::new(Charmap::qwerty2()))
    }

    /// Returns the charmap called `name`, falling back to `qwerty2`.
    ///
    /// An unknown name is logged and never fatal.
    pub fn get_or_default(&self, name: Option<&str>) -> Arc<Charmap> {
        match name {
            None => self.default_charmap(),
            Some(name) => self.get(name).unwrap_or_else(|| {
                warn!(
                    "charmap {name:?} not found, falling back to {DEFAULT_CHARMAP_NAME}"
                );
                self.default_charmap()
            }),
        }
    }
}
