//! Device layouts (orientations) loaded from a skin description.
//!
//! A skin describes one or more named layouts, typically `portrait` and
//! `landscape`.  Each layout has its own rotation (how the device screen is
//! turned inside the skin frame), a D-pad rotation used to remap arrow keys and
//! trackball motion, the overall skin size, and the rectangle where the device
//! display sits.
//!
//! [`LayoutList`] keeps the layouts in file order and is addressed by index,
//! so both "next" and "previous" are O(1).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when building a [`LayoutList`].
#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    #[error("a skin must declare at least one layout")]
    Empty,
    #[error("duplicate layout name: {0}")]
    DuplicateName(String),
}

/// A quarter-turn rotation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Builds a rotation from any quarter-turn count (taken modulo 4).
    pub fn from_quarter_turns(turns: i32) -> Self {
        match turns.rem_euclid(4) {
            0 => Rotation::Deg0,
            1 => Rotation::Deg90,
            2 => Rotation::Deg180,
            _ => Rotation::Deg270,
        }
    }

    pub fn quarter_turns(self) -> i32 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 1,
            Rotation::Deg180 => 2,
            Rotation::Deg270 => 3,
        }
    }

    /// Rotates a relative motion vector by this rotation (clockwise, screen axes).
    pub fn rotate_delta(self, dx: i32, dy: i32) -> (i32, i32) {
        match self {
            Rotation::Deg0 => (dx, dy),
            Rotation::Deg90 => (-dy, dx),
            Rotation::Deg180 => (-dx, -dy),
            Rotation::Deg270 => (dy, -dx),
        }
    }
}

impl TryFrom<u8> for Rotation {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value > 3 {
            return Err(format!("rotation {value} is out of range 0..=3"));
        }
        Ok(Rotation::from_quarter_turns(i32::from(value)))
    }
}

impl From<Rotation> for u8 {
    fn from(rotation: Rotation) -> Self {
        rotation.quarter_turns() as u8
    }
}

/// Where the device display sits inside the skin, in unscaled skin pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    /// Rotation of the framebuffer inside the rectangle.
    #[serde(default)]
    pub rotation: Rotation,
}

impl DisplayRect {
    /// Maps a point in skin coordinates to framebuffer coordinates.
    ///
    /// Returns `None` if the point lies outside the display.
    pub fn map_to_framebuffer(&self, x: i32, y: i32) -> Option<(i32, i32)> {
        let lx = x - self.x;
        let ly = y - self.y;
        if lx < 0 || ly < 0 || lx >= self.width || ly >= self.height {
            return None;
        }
        let (w, h) = (self.width, self.height);
        Some(match self.rotation {
            Rotation::Deg0 => (lx, ly),
            Rotation::Deg90 => (ly, w - 1 - lx),
            Rotation::Deg180 => (w - 1 - lx, h - 1 - ly),
            Rotation::Deg270 => (h - 1 - ly, lx),
        })
    }

    /// Like [`map_to_framebuffer`](Self::map_to_framebuffer) but clamps
    /// outside points to the nearest edge.  Used while a touch is held.
    pub fn clamp_to_framebuffer(&self, x: i32, y: i32) -> (i32, i32) {
        let cx = x.clamp(self.x, self.x + self.width.max(1) - 1);
        let cy = y.clamp(self.y, self.y + self.height.max(1) - 1);
        self.map_to_framebuffer(cx, cy).unwrap_or((0, 0))
    }
}

/// One named device orientation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkinLayout {
    pub name: String,
    #[serde(default)]
    pub rotation: Rotation,
    /// Rotation applied to arrow keys and trackball motion.
    #[serde(default)]
    pub dpad_rotation: Rotation,
    /// Skin size in unscaled pixels.
    pub width: i32,
    pub height: i32,
    pub display: DisplayRect,
}

/// Ordered, non-empty list of layouts.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutList {
    layouts: Vec<SkinLayout>,
}

impl LayoutList {
    /// Validates and wraps `layouts`.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Empty`] for an empty list and
    /// [`LayoutError::DuplicateName`] if two layouts share a name.
    pub fn new(layouts: Vec<SkinLayout>) -> Result<Self, LayoutError> {
        if layouts.is_empty() {
            return Err(LayoutError::Empty);
        }
        for (i, layout) in layouts.iter().enumerate() {
            if layouts[..i].iter().any(|l| l.name == layout.name) {
                return Err(LayoutError::DuplicateName(layout.name.clone()));
            }
        }
        Ok(Self { layouts })
    }

    /// The portrait/landscape pair used when no skin file is configured.
    pub fn builtin() -> Self {
        let portrait = SkinLayout {
            name: "portrait".to_string(),
            rotation: Rotation::Deg0,
            dpad_rotation: Rotation::Deg0,
            width: 1080,
            height: 1920,
            display: DisplayRect {
                x: 0,
                y: 0,
                width: 1080,
                height: 1920,
                rotation: Rotation::Deg0,
            },
        };
        let landscape = SkinLayout {
            name: "landscape".to_string(),
            rotation: Rotation::Deg90,
            dpad_rotation: Rotation::Deg90,
            width: 1920,
            height: 1080,
            display: DisplayRect {
                x: 0,
                y: 0,
                width: 1920,
                height: 1080,
                rotation: Rotation::Deg90,
            },
        };
        Self {
            layouts: vec![portrait, landscape],
        }
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    /// Returns the layout at `index`, wrapping out-of-range indices.
    pub fn get(&self, index: usize) -> &SkinLayout {
        &self.layouts[index % self.layouts.len()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &SkinLayout> {
        self.layouts.iter()
    }

    /// Index of the layout named `name`, or 0 if `name` is `None` or unknown.
    pub fn select(&self, name: Option<&str>) -> usize {
        name.and_then(|n| self.layouts.iter().position(|l| l.name == n))
            .unwrap_or(0)
    }

    /// Index after `index`, wrapping to the first layout.
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.layouts.len()
    }

    /// Index before `index`, wrapping to the last layout.
    pub fn prev_index(&self, index: usize) -> usize {
        let len = self.layouts.len();
        (index % len + len - 1) % len
    }
}
