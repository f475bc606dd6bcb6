//! SkinUi: the core-context consumer of the event queue.
//!
//! [`SkinUi::process_events`] is called periodically by the device loop.  It
//! drains the [`EventQueue`] completely and routes each event:
//!
//! | Event                              | Handled by                                   |
//! |------------------------------------|----------------------------------------------|
//! | key / text input                   | [`KeyboardRemapper`], commands come back here |
//! | mouse motion and forwarded buttons | touch or trackball injection                  |
//! | `SetScale` / `SetZoom`             | recorded, then posted to the window           |
//! | scroll / resize / move / screen    | posted to the window coordinator              |
//! | `LayoutNext` / `LayoutPrev`        | layout transition                             |
//! | `Quit`                             | stops the drain, returns [`PollOutcome::Quit`] |
//!
//! Scroll events queued behind a `SetScale` in the same drain are artifacts of
//! the resize and are dropped.
//!
//! # Key commands
//!
//! Keys bound in the keyset reach [`CommandContext::on_command`].  Button
//! commands press the matching device key; the rest drive the window
//! (fullscreen, trackball, onion alpha, layout changes).

use std::sync::Arc;

use skin_core::keymap::key_pair_to_string;
use skin_core::{
    Charmap, KeyCommand, Keyset, LayoutList, MouseButton, MouseData, OnionOverlay, SkinEvent,
    SkinLayout,
};
use tracing::{debug, info, trace, warn};

use super::event_queue::EventQueue;
use super::keyboard::{KeyCommandHandler, KeyboardOptions, KeyboardRemapper};
use super::layout_state::{LayoutStateMachine, LayoutStep};
use super::sinks::{DeviceInputSink, DisplaySink, PointerKind, WindowCommand, WindowPort};
use super::trackball::Trackball;

/// Linux input event type for relative axes.
pub const EV_REL: u16 = 2;
/// Linux relative axis code of the scroll wheel.
pub const REL_WHEEL: u16 = 8;

/// Result of one drain of the event queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Continue,
    /// A `Quit` event was seen; the caller should shut down.
    Quit,
}

/// Parameters for [`SkinUi::new`].
#[derive(Debug, Clone)]
pub struct SkinUiParams {
    pub window_name: String,
    /// Name of the layout to start in.
    pub initial_orientation: Option<String>,
    pub layouts: LayoutList,
    pub charmap: Arc<Charmap>,
    /// Replaces the shared default keyset when set.
    pub keyset: Option<Arc<Keyset>>,
    pub keyboard: KeyboardOptions,
    pub enable_trackball: bool,
    pub onion: Option<OnionOverlay>,
    pub lcd_brightness: u8,
    /// Window scale the UI context starts with; touches are divided by it.
    pub scale: f64,
}

/// The core-context collaborators.
#[derive(Clone)]
pub struct SkinUiSinks {
    pub device: Arc<dyn DeviceInputSink>,
    pub display: Arc<dyn DisplaySink>,
    pub window: Arc<dyn WindowPort>,
}

/// Everything key commands act on.  Kept apart from the keyboard so the
/// keyboard can call back into it while processing an event.
pub struct CommandContext {
    layouts: LayoutStateMachine,
    trackball: Trackball,
    enable_trackball: bool,
    show_trackball: bool,
    window_name: String,
    lcd_brightness: u8,
    has_onion: bool,
    scale: f64,
    zoom: f64,
    touch_down: bool,
    last_position: (i32, i32),
    /// D-pad rotation to hand to the keyboard once it returns.
    pending_rotation: Option<i32>,
    sinks: SkinUiSinks,
}

impl KeyCommandHandler for CommandContext {
    fn on_command(&mut self, command: KeyCommand, down: bool) {
        if let Some(key) = command.button_key() {
            self.sinks.device.send_key(key, down);
            return;
        }

        // Held down to show, released to hide.
        if command == KeyCommand::ShowTrackball {
            self.set_trackball_visible(down);
            return;
        }

        if !down {
            return;
        }

        match command {
            KeyCommand::ToggleFullscreen => self.sinks.window.post(WindowCommand::ToggleFullscreen),
            KeyCommand::ToggleTrackball => {
                if self.enable_trackball {
                    self.set_trackball_visible(!self.show_trackball);
                    self.reset_title();
                }
            }
            KeyCommand::OnionAlphaUp | KeyCommand::OnionAlphaDown => {
                if self.has_onion {
                    self.sinks.window.post(WindowCommand::AdjustOnionAlpha {
                        up: command == KeyCommand::OnionAlphaUp,
                    });
                }
            }
            KeyCommand::ChangeLayoutNext => self.change_layout(LayoutStep::Next),
            KeyCommand::ChangeLayoutPrev => self.change_layout(LayoutStep::Prev),
            KeyCommand::ToggleNetwork => self.sinks.device.toggle_network(),
            KeyCommand::ToggleTracing => {
                debug!(command = command.name(), "command not supported, ignoring");
            }
            other => trace!(command = other.name(), "unhandled key command"),
        }
    }
}

impl CommandContext {
    fn set_trackball_visible(&mut self, visible: bool) {
        self.show_trackball = visible;
        self.sinks.window.post(WindowCommand::ShowTrackball { visible });
    }

    fn is_trackball_active(&self) -> bool {
        self.enable_trackball && self.show_trackball
    }

    /// Moves to the next or previous layout and re-applies everything that
    /// depends on it.
    fn change_layout(&mut self, step: LayoutStep) {
        let layout = self.layouts.step(step).clone();
        let rotation = layout.dpad_rotation;
        self.sinks.window.post(WindowCommand::ResetLayout { layout });

        self.pending_rotation = Some(rotation.quarter_turns());
        if self.enable_trackball {
            self.trackball.set_rotation(rotation);
            self.sinks.window.post(WindowCommand::ShowTrackball {
                visible: self.show_trackball,
            });
        }
        self.sinks.window.post(WindowCommand::SetLcdBrightness {
            brightness: self.lcd_brightness,
        });
        self.sinks.display.invalidate_framebuffer();
    }

    fn title(&self) -> String {
        if !self.show_trackball {
            return self.window_name.clone();
        }
        let hints: Vec<String> = Keyset::default_shared()
            .bindings_for(KeyCommand::ToggleTrackball)
            .iter()
            .map(|b| key_pair_to_string(b.key, b.mods))
            .collect();
        match hints.split_last() {
            None => self.window_name.clone(),
            Some((last, [])) => format!("Press {last} to leave trackball mode. {}", self.window_name),
            Some((last, rest)) => format!(
                "Press {} or {last} to leave trackball mode. {}",
                rest.join(", "),
                self.window_name
            ),
        }
    }

    fn reset_title(&self) {
        self.sinks.window.post(WindowCommand::SetTitle { title: self.title() });
    }

    fn apply_scale(&mut self, scale: f64) {
        self.scale = scale;
        self.zoom = 1.0;
        self.sinks.window.post(WindowCommand::ApplyScale { scale });
    }

    // ── Pointer ───────────────────────────────────────────────────────────────

    /// Window coordinates → unscaled skin coordinates.
    fn to_skin(&self, data: &MouseData) -> Option<(i32, i32)> {
        let factor = self.scale * self.zoom;
        if factor <= 0.0 {
            return None;
        }
        Some((
            (f64::from(data.x) / factor) as i32,
            (f64::from(data.y) / factor) as i32,
        ))
    }

    fn mouse_motion(&mut self, data: &MouseData) {
        if self.is_trackball_active() {
            let (dx, dy) = self.trackball.motion(data.xrel, data.yrel);
            self.sinks.device.send_mouse_event(dx, dy, PointerKind::Trackball, 0);
            return;
        }
        if !self.touch_down {
            return;
        }
        if let Some((x, y)) = self.to_skin(data) {
            let (fx, fy) = self.layouts.current().display.clamp_to_framebuffer(x, y);
            self.sinks.device.send_mouse_event(fx, fy, PointerKind::Touch, 1);
        }
    }

    fn mouse_button(&mut self, data: &MouseData, down: bool) {
        if data.button.is_wheel() {
            if down {
                let value = if data.button == MouseButton::WheelUp { 1 } else { -1 };
                self.sinks.device.send_generic_event(EV_REL, REL_WHEEL, value);
            }
            return;
        }
        if self.is_trackball_active() {
            trace!(button = ?data.button, "button ignored in trackball mode");
            return;
        }
        let Some((x, y)) = self.to_skin(data) else {
            return;
        };
        let display = self.layouts.current().display;
        if down {
            match display.map_to_framebuffer(x, y) {
                Some((fx, fy)) => {
                    self.touch_down = true;
                    self.sinks.device.send_mouse_event(fx, fy, PointerKind::Touch, 1);
                }
                None => trace!(x, y, "press outside the display"),
            }
        } else if self.touch_down {
            self.touch_down = false;
            let (fx, fy) = display.clamp_to_framebuffer(x, y);
            self.sinks.device.send_mouse_event(fx, fy, PointerKind::Touch, 0);
        }
    }
}

/// The skin as seen from the core context.
pub struct SkinUi {
    queue: Arc<EventQueue>,
    keyboard: KeyboardRemapper,
    ctx: CommandContext,
}

impl SkinUi {
    /// Creates the skin, enables the keyboard and pushes the initial window
    /// state (layout, brightness, onion, title) to the UI context.
    pub fn new(params: SkinUiParams, queue: Arc<EventQueue>, sinks: SkinUiSinks) -> Self {
        let layouts = LayoutStateMachine::new(params.layouts, params.initial_orientation.as_deref());
        let rotation = layouts.dpad_rotation();

        let mut keyboard = KeyboardRemapper::new(
            params.charmap,
            params.keyboard,
            Arc::clone(&queue),
            Arc::clone(&sinks.device),
        );
        if let Some(keyset) = params.keyset {
            keyboard.set_keyset(keyset);
        }
        keyboard.set_rotation(rotation.quarter_turns());
        keyboard.set_enabled(true);

        let mut trackball = Trackball::new();
        trackball.set_rotation(rotation);

        let ctx = CommandContext {
            layouts,
            trackball,
            enable_trackball: params.enable_trackball,
            show_trackball: false,
            window_name: params.window_name,
            lcd_brightness: params.lcd_brightness,
            has_onion: params.onion.is_some(),
            scale: params.scale,
            zoom: 1.0,
            touch_down: false,
            last_position: (0, 0),
            pending_rotation: None,
            sinks,
        };

        let window = &ctx.sinks.window;
        window.post(WindowCommand::ResetLayout {
            layout: ctx.layouts.current().clone(),
        });
        window.post(WindowCommand::SetLcdBrightness {
            brightness: ctx.lcd_brightness,
        });
        if params.onion.is_some() {
            window.post(WindowCommand::SetOnion { onion: params.onion });
        }
        ctx.reset_title();

        info!(
            layout = %ctx.layouts.current().name,
            charmap = keyboard.charmap().name(),
            trackball = ctx.enable_trackball,
            "skin created"
        );
        Self { queue, keyboard, ctx }
    }

    /// Drains the queue and dispatches every event.
    ///
    /// Returns [`PollOutcome::Quit`] as soon as a `Quit` event is seen; the
    /// remaining events are left unprocessed.
    pub fn process_events(&mut self) -> PollOutcome {
        let mut ignore_scroll = false;

        while let Some(event) = self.queue.poll() {
            trace!(kind = ?event.kind(), "dispatching event");
            match event {
                SkinEvent::ForceRedraw => self.ctx.sinks.window.post(WindowCommand::Redraw),
                SkinEvent::KeyDown { .. } | SkinEvent::KeyUp { .. } | SkinEvent::TextInput { .. } => {
                    self.keyboard.process_event(&event, &mut self.ctx);
                    self.apply_pending_rotation();
                }
                SkinEvent::MouseMotion(data) => self.ctx.mouse_motion(&data),
                SkinEvent::MouseButtonDown(data) | SkinEvent::MouseButtonUp(data) => {
                    if data.button.is_forwarded() {
                        let down = matches!(event, SkinEvent::MouseButtonDown(_));
                        self.ctx.mouse_button(&data, down);
                    } else {
                        trace!(button = ?data.button, "mouse button not forwarded");
                    }
                }
                SkinEvent::LayoutNext => {
                    self.ctx.on_command(KeyCommand::ChangeLayoutNext, true);
                    self.apply_pending_rotation();
                }
                SkinEvent::LayoutPrev => {
                    self.ctx.on_command(KeyCommand::ChangeLayoutPrev, true);
                    self.apply_pending_rotation();
                }
                SkinEvent::ScrollChanged { x, xmax, y, ymax } => {
                    if ignore_scroll {
                        trace!(x, y, "scroll after resize ignored");
                    } else {
                        self.ctx
                            .sinks
                            .window
                            .post(WindowCommand::ScrollUpdated { x, xmax, y, ymax });
                    }
                }
                SkinEvent::SetScale { scale } => {
                    ignore_scroll = true;
                    self.ctx.apply_scale(scale);
                }
                SkinEvent::SetZoom {
                    zoom,
                    viewport_width,
                    viewport_height,
                    scroll_h,
                } => {
                    self.ctx.zoom = zoom;
                    self.ctx.sinks.window.post(WindowCommand::ApplyZoom {
                        zoom,
                        viewport_width,
                        viewport_height,
                        scroll_h,
                    });
                }
                SkinEvent::Quit => {
                    info!("quit requested");
                    return PollOutcome::Quit;
                }
                SkinEvent::WindowMoved { x, y } => {
                    self.ctx.last_position = (x, y);
                    self.ctx.sinks.window.post(WindowCommand::PositionChanged { x, y });
                }
                SkinEvent::ScreenChanged => self.ctx.sinks.window.post(WindowCommand::ScreenChanged),
                SkinEvent::ZoomedWindowResized {
                    dx,
                    dy,
                    width,
                    height,
                    scroll_h,
                } => self.ctx.sinks.window.post(WindowCommand::ZoomedWindowResized {
                    dx,
                    dy,
                    width,
                    height,
                    scroll_h,
                }),
            }
        }

        self.keyboard.flush();
        PollOutcome::Continue
    }

    fn apply_pending_rotation(&mut self) {
        if let Some(rotation) = self.ctx.pending_rotation.take() {
            self.keyboard.set_rotation(rotation);
        }
    }

    // ── Operations driven by the device side ──────────────────────────────────

    pub fn set_lcd_brightness(&mut self, brightness: u8) {
        self.ctx.lcd_brightness = brightness;
        self.ctx
            .sinks
            .window
            .post(WindowCommand::SetLcdBrightness { brightness });
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.ctx.apply_scale(scale);
    }

    pub fn set_onion(&mut self, onion: Option<OnionOverlay>) {
        self.ctx.has_onion = onion.is_some();
        self.ctx.sinks.window.post(WindowCommand::SetOnion { onion });
    }

    pub fn set_name(&mut self, name: &str) {
        self.ctx.window_name = name.to_string();
        self.ctx.reset_title();
    }

    pub fn reset_title(&self) {
        self.ctx.reset_title();
    }

    pub fn title(&self) -> String {
        self.ctx.title()
    }

    pub fn is_trackball_active(&self) -> bool {
        self.ctx.is_trackball_active()
    }

    pub fn current_layout(&self) -> &SkinLayout {
        self.ctx.layouts.current()
    }

    pub fn current_keyset(&self) -> &Arc<Keyset> {
        self.keyboard.keyset()
    }

    pub fn keyboard_mut(&mut self) -> &mut KeyboardRemapper {
        &mut self.keyboard
    }

    pub fn update_display(&self, x: i32, y: i32, width: i32, height: i32) {
        self.ctx.sinks.display.update_display(x, y, width, height);
    }

    pub fn update_gpu_frame(&self, width: i32, height: i32, pixels: &[u8]) {
        self.ctx.sinks.display.update_gpu_frame(width, height, pixels);
    }

    /// Asks the UI context for the window position.  Falls back to the last
    /// position reported by a `WindowMoved` event if it cannot answer.
    pub fn window_position(&self) -> (i32, i32) {
        match self.ctx.sinks.window.window_position() {
            Ok(position) => position,
            Err(e) => {
                warn!("window position unavailable ({e}), using last known");
                self.ctx.last_position
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
