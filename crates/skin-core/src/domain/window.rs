//! Window geometry state and the sizing arithmetic behind scale and zoom.
//!
//! *Scale* resizes the whole host window (the skin is drawn smaller or
//! larger).  *Zoom* keeps the host window size and magnifies the skin inside a
//! scrollable container.  The functions here are pure so they can be tested
//! against hand-computed values; [`WindowState`] is the data the window
//! coordinator mutates.

use serde::{Deserialize, Serialize};

use super::layout::Rotation;

/// Smallest scale factor a window may be resized to.
pub const MIN_SCALE: f64 = 0.2;
/// Added to each side of a zoom-to-rectangle target so scrollbars do not hide it.
pub const ZOOM_RECT_MARGIN: i32 = 20;
/// Zoom step for zoom-in / zoom-out.
pub const ZOOM_STEP: f64 = 0.25;
/// Multiplier for scale-up / scale-down shortcuts.
pub const SCALE_STEP: f64 = 1.1;
/// Keyboard-shortcut resizes keep the window within this fraction of the screen.
pub const SCREEN_FILL: f64 = 0.95;
/// Scroll distance of one pan step.
pub const PAN_STEP: i32 = 20;

pub const ONION_ALPHA_MAX: u16 = 256;
pub const ONION_ALPHA_STEP: u16 = 16;
pub const DEFAULT_LCD_BRIGHTNESS: u8 = 128;

/// Integer width/height pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn transposed(self) -> Self {
        Self::new(self.height, self.width)
    }

    /// Multiplies both sides by `factor`, truncating like the host toolkit does.
    pub fn scaled_by(self, factor: f64) -> Self {
        Self::new(
            (f64::from(self.width) * factor) as i32,
            (f64::from(self.height) * factor) as i32,
        )
    }

    /// Largest size with this aspect ratio that fits inside `bounds`.
    pub fn fit_within(self, bounds: Size) -> Self {
        if self.width <= 0 || self.height <= 0 {
            return bounds;
        }
        let (w, h) = (i64::from(self.width), i64::from(self.height));
        let (bw, bh) = (i64::from(bounds.width), i64::from(bounds.height));
        let rescaled_width = bh * w / h;
        if rescaled_width <= bw {
            Self::new(rescaled_width as i32, bounds.height)
        } else {
            Self::new(bounds.width, (bw * h / w) as i32)
        }
    }
}

/// Scrollbar visibility policy of the zoom container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScrollbarPolicy {
    #[default]
    AlwaysOff,
    AsNeeded,
    AlwaysOn,
}

/// A semi-transparent reference image drawn over the device display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnionOverlay {
    /// Image path or identifier understood by the render layer.
    pub image: String,
    pub rotation: Rotation,
    /// 0 (invisible) to 256 (opaque).
    pub alpha: u16,
}

impl OnionOverlay {
    /// Moves alpha one step up or down, clamped to `[0, 256]`, and returns it.
    pub fn adjust_alpha(&mut self, up: bool) -> u16 {
        self.alpha = step_onion_alpha(self.alpha, up);
        self.alpha
    }
}

/// Where the user focused a zoom, saved until the zoomed window is shown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomFocus {
    /// Focus point as a fraction of the window size, `(0,0)` top-left.
    pub fraction_x: f64,
    pub fraction_y: f64,
    /// Where that point should end up inside the viewport.
    pub viewport_x: i32,
    pub viewport_y: i32,
}

/// Everything the window coordinator knows about the host window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowState {
    pub scale: f64,
    /// Always ≥ 1.0.
    pub zoom: f64,
    pub zoom_mode: bool,
    /// A SetZoom request is queued and has not been applied yet.
    pub zoom_pending: bool,
    /// Scale requested but not yet applied by the device side.
    pub pending_scale: Option<f64>,
    pub fullscreen: bool,
    pub onion: Option<OnionOverlay>,
    pub trackball_visible: bool,
    pub lcd_brightness: u8,
    pub position: (i32, i32),
    pub title: String,
    /// Original size of the rendered skin surface; `None` until first shown.
    pub backing_surface: Option<Size>,
    /// Current host window (skin widget) size.
    pub window_size: Size,
    /// Size of the scroll container holding the window.
    pub container: Size,
    pub viewport: Size,
    pub scrollbar_thickness: i32,
    pub scrollbar_policy: ScrollbarPolicy,
    pub scroll: (i32, i32),
    pub focus: Option<ZoomFocus>,
    pub overlay_visible: bool,
}

impl Default for WindowState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            zoom: 1.0,
            zoom_mode: false,
            zoom_pending: false,
            pending_scale: None,
            fullscreen: false,
            onion: None,
            trackball_visible: false,
            lcd_brightness: DEFAULT_LCD_BRIGHTNESS,
            position: (0, 0),
            title: String::new(),
            backing_surface: None,
            window_size: Size::default(),
            container: Size::default(),
            viewport: Size::default(),
            scrollbar_thickness: 0,
            scrollbar_policy: ScrollbarPolicy::AlwaysOff,
            scroll: (0, 0),
            focus: None,
            overlay_visible: false,
        }
    }
}

// ── Sizing arithmetic ─────────────────────────────────────────────────────────

/// Steps an onion alpha value by [`ONION_ALPHA_STEP`], clamped to `[0, 256]`.
pub fn step_onion_alpha(alpha: u16, up: bool) -> u16 {
    if up {
        alpha.saturating_add(ONION_ALPHA_STEP).min(ONION_ALPHA_MAX)
    } else {
        alpha.min(ONION_ALPHA_MAX).saturating_sub(ONION_ALPHA_STEP)
    }
}

/// Scale that fits `original` inside `target` keeping its aspect ratio.
///
/// When `screen` is given (keyboard-shortcut resizes) the result is also
/// kept inside the screen.  Never returns less than `min_scale`.
pub fn fit_scale(original: Size, target: Size, screen: Option<Size>, min_scale: f64) -> f64 {
    if original.width <= 0 || original.height <= 0 {
        return min_scale.max(MIN_SCALE);
    }
    let mut fitted = original.fit_within(target);
    if let Some(screen) = screen {
        if fitted.width > screen.width || fitted.height > screen.height {
            fitted = original.fit_within(screen);
        }
    }
    let width_scale = f64::from(fitted.width) / f64::from(original.width);
    let height_scale = f64::from(fitted.height) / f64::from(original.height);
    width_scale.min(height_scale).max(min_scale.max(MIN_SCALE))
}

/// Largest zoom allowed: the one that brings the skin to twice its 1:1 size.
pub fn max_zoom(zoom: f64, scale: f64) -> f64 {
    zoom * 2.0 / scale
}

/// Zoom that frames `rect` inside `viewport`, capped by [`max_zoom`].
///
/// `min(zoom·vw/(rw+20), zoom·vh/(rh+20), zoom·2/scale)`.
pub fn zoom_to_rect(zoom: f64, scale: f64, viewport: Size, rect: Size) -> f64 {
    let ideal_width = zoom * f64::from(viewport.width) / f64::from(rect.width + ZOOM_RECT_MARGIN);
    let ideal_height =
        zoom * f64::from(viewport.height) / f64::from(rect.height + ZOOM_RECT_MARGIN);
    ideal_width
        .min(ideal_height)
        .min(max_zoom(zoom, scale))
        .max(1.0)
}

/// Next zoom for a zoom-in step, or `None` once the skin is at twice 1:1 size.
pub fn zoom_in_target(zoom: f64, scale: f64) -> Option<f64> {
    if scale < 2.0 {
        Some((zoom + ZOOM_STEP).min(max_zoom(zoom, scale)))
    } else {
        None
    }
}

/// Next zoom for a zoom-out step, or `None` when already at 1.0.
pub fn zoom_out_target(zoom: f64) -> Option<f64> {
    if zoom > 1.0 {
        Some((zoom - ZOOM_STEP).max(1.0))
    } else {
        None
    }
}
