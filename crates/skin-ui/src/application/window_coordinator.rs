//! WindowCoordinator: the UI-context owner of [`WindowState`].
//!
//! The coordinator answers user gestures (resize, zoom, pan, zoom-mode
//! toggle) by updating its local state and pushing the matching
//! [`SkinEvent`] to the [`EventQueue`].  The device side applies the change
//! and posts a [`WindowCommand`] back; only then is the window re-shown at
//! its new size.  This round trip keeps the GPU sub-window and the host
//! window in step.
//!
//! # Scale versus zoom
//!
//! *Scale* resizes the host window.  *Zoom* keeps the container size and
//! magnifies the skin inside it; scrollbars appear as needed and the focus
//! point chosen by the user is kept under the cursor.
//!
//! All sizing needs the backing surface's original size.  Until the first
//! layout is applied there is no backing surface and sizing gestures do
//! nothing.

use std::sync::Arc;

use skin_core::domain::window::{
    fit_scale, zoom_in_target, zoom_out_target, zoom_to_rect, ZoomFocus, PAN_STEP, SCALE_STEP,
    SCREEN_FILL,
};
use skin_core::{ScrollbarPolicy, SkinEvent, Size, WindowState};
use tracing::{debug, trace};

use super::event_queue::EventQueue;
use super::sinks::{WindowCommand, WindowSink};

/// Construction options for [`WindowCoordinator`].
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinatorOptions {
    pub title: String,
    pub position: (i32, i32),
    pub scale: f64,
    pub min_scale: f64,
    pub lcd_brightness: u8,
    /// Host screen size; keyboard-shortcut resizes stay within it.
    pub screen: Option<Size>,
    /// Thickness of the container's scrollbars.
    pub scrollbar_thickness: i32,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            title: String::new(),
            position: (0, 0),
            scale: 1.0,
            min_scale: skin_core::domain::window::MIN_SCALE,
            lcd_brightness: skin_core::domain::window::DEFAULT_LCD_BRIGHTNESS,
            screen: None,
            scrollbar_thickness: 15,
        }
    }
}

pub struct WindowCoordinator {
    state: WindowState,
    min_scale: f64,
    screen: Option<Size>,
    queue: Arc<EventQueue>,
    sink: Arc<dyn WindowSink>,
}

impl WindowCoordinator {
    pub fn new(options: CoordinatorOptions, queue: Arc<EventQueue>, sink: Arc<dyn WindowSink>) -> Self {
        let state = WindowState {
            scale: options.scale,
            title: options.title,
            position: options.position,
            lcd_brightness: options.lcd_brightness,
            scrollbar_thickness: options.scrollbar_thickness,
            ..WindowState::default()
        };
        Self {
            state,
            min_scale: options.min_scale.max(skin_core::domain::window::MIN_SCALE),
            screen: options.screen,
            queue,
            sink,
        }
    }

    pub fn state(&self) -> &WindowState {
        &self.state
    }

    pub fn window_position(&self) -> (i32, i32) {
        self.state.position
    }

    // ── Scale ─────────────────────────────────────────────────────────────────

    /// Resizes the window so the backing surface fits `target`, keeping its
    /// aspect ratio.  `keyboard_shortcut` resizes also stay within the screen;
    /// `flip` swaps the original width and height first.
    pub fn do_resize(&mut self, target: Size, keyboard_shortcut: bool, flip: bool) {
        let Some(original) = self.state.backing_surface else {
            debug!("resize requested before the window was shown, ignoring");
            return;
        };
        let original = if flip { original.transposed() } else { original };
        let screen = if keyboard_shortcut {
            self.screen.map(|s| s.scaled_by(SCREEN_FILL))
        } else {
            None
        };
        let scale = fit_scale(original, target, screen, self.min_scale);
        self.set_scale(scale);
    }

    /// Requests a new scale from the device side.
    ///
    /// Ignored while a zoom is in flight in zoom mode, so rapid zoom and
    /// scale gestures do not overwrite each other.
    pub fn set_scale(&mut self, scale: f64) {
        if self.state.zoom_mode && self.state.zoom_pending {
            debug!(scale, "zoom pending, dropping scale request");
            return;
        }
        let scale = scale.max(self.min_scale);
        self.state.zoom = 1.0;
        self.state.pending_scale = Some(scale);
        self.queue.push(SkinEvent::SetScale { scale });
    }

    pub fn scale_up(&mut self) {
        self.do_resize(self.state.container.scaled_by(SCALE_STEP), true, false);
    }

    pub fn scale_down(&mut self) {
        self.do_resize(self.state.container.scaled_by(1.0 / SCALE_STEP), true, false);
    }

    // ── Zoom ──────────────────────────────────────────────────────────────────

    /// Requests a new zoom from the device side.
    ///
    /// No-op while another zoom is pending or if `zoom` equals the current one.
    /// Values below 1.0 are raised to 1.0.
    pub fn set_zoom(&mut self, zoom: f64) {
        let zoom = zoom.max(1.0);
        if self.state.zoom_pending || self.state.zoom == zoom {
            return;
        }
        // Scrollbars must be laid out for the viewport size to be right.
        self.state.scrollbar_policy = ScrollbarPolicy::AlwaysOn;
        self.update_viewport();
        self.state.zoom_pending = true;
        self.state.zoom = zoom;

        let viewport = self.state.viewport;
        let scroll_h = if self.horizontal_scrollbar_visible() {
            self.state.scrollbar_thickness
        } else {
            0
        };
        self.queue.push(SkinEvent::SetZoom {
            zoom,
            viewport_width: viewport.width,
            viewport_height: viewport.height,
            scroll_h,
        });
    }

    pub fn zoom_in(&mut self) {
        let (focus, viewport_focus) = self.center_points();
        self.zoom_in_at(focus, viewport_focus);
    }

    /// Zooms in one step, keeping `focus` (window coordinates) at
    /// `viewport_focus` (container coordinates).
    pub fn zoom_in_at(&mut self, focus: (i32, i32), viewport_focus: (i32, i32)) {
        let Some(scale) = self.current_scale() else {
            return;
        };
        self.save_zoom_points(focus, viewport_focus);
        if let Some(zoom) = zoom_in_target(self.state.zoom, scale) {
            self.set_zoom(zoom);
        }
    }

    pub fn zoom_out(&mut self) {
        let (focus, viewport_focus) = self.center_points();
        self.zoom_out_at(focus, viewport_focus);
    }

    pub fn zoom_out_at(&mut self, focus: (i32, i32), viewport_focus: (i32, i32)) {
        self.save_zoom_points(focus, viewport_focus);
        if let Some(zoom) = zoom_out_target(self.state.zoom) {
            self.set_zoom(zoom);
        }
    }

    pub fn zoom_reset(&mut self) {
        self.set_zoom(1.0);
    }

    /// Zooms so a `rect`-sized area around `focus` fills the container.
    pub fn zoom_to(&mut self, focus: (i32, i32), rect: Size) {
        let Some(scale) = self.current_scale() else {
            return;
        };
        let container = self.state.container;
        self.save_zoom_points(focus, (container.width / 2, container.height / 2));
        let zoom = zoom_to_rect(self.state.zoom, scale, container, rect);
        debug!(zoom, rect.width, rect.height, "zoom to rectangle");
        self.set_zoom(zoom);
    }

    pub fn toggle_zoom_mode(&mut self) {
        self.state.zoom_mode = !self.state.zoom_mode;
        if self.state.zoom_mode {
            self.state.scrollbar_policy = ScrollbarPolicy::AsNeeded;
            self.state.overlay_visible = true;
        } else {
            // Leaving zoom mode snaps back to the aspect-correct size.
            self.state.scrollbar_policy = ScrollbarPolicy::AlwaysOff;
            let container = self.state.container;
            self.do_resize(container, false, false);
            self.state.overlay_visible = false;
        }
        self.update_viewport();
        debug!(zoom_mode = self.state.zoom_mode, "zoom mode toggled");
    }

    // ── Scrolling and host window changes ─────────────────────────────────────

    pub fn pan_horizontal(&mut self, left: bool) {
        let step = if left { -PAN_STEP } else { PAN_STEP };
        let (x, y) = self.state.scroll;
        self.scroll_to(x + step, y);
    }

    pub fn pan_vertical(&mut self, up: bool) {
        let step = if up { -PAN_STEP } else { PAN_STEP };
        let (x, y) = self.state.scroll;
        self.scroll_to(x, y + step);
    }

    /// Moves the scrollbars (clamped to their range) and reports the change.
    pub fn scroll_to(&mut self, x: i32, y: i32) {
        let (xmax, ymax) = self.scroll_range();
        self.state.scroll = (x.clamp(0, xmax), y.clamp(0, ymax));
        self.queue.push(SkinEvent::ScrollChanged {
            x: self.state.scroll.0,
            xmax,
            y: self.state.scroll.1,
            ymax,
        });
    }

    /// The user resized the container.
    pub fn resize_container(&mut self, size: Size) {
        self.state.container = size;
        self.update_viewport();
        if self.state.zoom_mode {
            let scroll_h = if self.horizontal_scrollbar_visible() {
                self.state.scrollbar_thickness
            } else {
                0
            };
            self.queue.push(SkinEvent::ZoomedWindowResized {
                dx: self.state.scroll.0,
                dy: self.state.scroll.1,
                width: size.width,
                height: size.height,
                scroll_h,
            });
        } else {
            self.do_resize(size, false, false);
        }
    }

    /// The user moved the window.
    pub fn move_window(&mut self, x: i32, y: i32) {
        self.state.position = (x, y);
        self.queue.push(SkinEvent::WindowMoved { x, y });
    }

    // ── Commands from the device side ─────────────────────────────────────────

    pub fn handle_command(&mut self, command: WindowCommand) {
        trace!(?command, "window command");
        match command {
            WindowCommand::ApplyScale { scale } => {
                self.state.scale = scale;
                self.state.pending_scale = None;
                self.sink.set_scale(scale);
                self.show_window();
            }
            WindowCommand::ApplyZoom {
                zoom,
                viewport_width,
                viewport_height,
                scroll_h,
            } => {
                debug!(zoom, viewport_width, viewport_height, scroll_h, "applying zoom");
                self.state.zoom = zoom;
                self.sink.set_zoom(zoom);
                self.show_window();
            }
            WindowCommand::ScrollUpdated { x, y, .. } => {
                self.state.scroll = (x, y);
                self.sink.redraw();
            }
            WindowCommand::ZoomedWindowResized {
                dx, dy, width, height, ..
            } => {
                self.state.container = Size::new(width, height);
                self.state.scroll = (dx, dy);
                self.update_viewport();
                self.sink.redraw();
            }
            WindowCommand::PositionChanged { x, y } => {
                self.state.position = (x, y);
            }
            WindowCommand::ResetLayout { layout } => {
                self.state.backing_surface = Some(Size::new(layout.width, layout.height));
                self.show_window();
                self.sink.set_lcd_brightness(self.state.lcd_brightness);
                self.sink.show_trackball(self.state.trackball_visible);
            }
            WindowCommand::ShowTrackball { visible } => {
                self.state.trackball_visible = visible;
                self.sink.show_trackball(visible);
            }
            WindowCommand::SetTitle { title } => {
                self.sink.set_title(&title);
                self.state.title = title;
            }
            WindowCommand::ToggleFullscreen => {
                self.state.fullscreen = !self.state.fullscreen;
                self.sink.set_fullscreen(self.state.fullscreen);
                self.show_window();
            }
            WindowCommand::AdjustOnionAlpha { up } => match self.state.onion.as_mut() {
                Some(onion) => {
                    let alpha = onion.adjust_alpha(up);
                    debug!(alpha, "onion alpha adjusted");
                    self.sink.set_onion(self.state.onion.as_ref());
                    self.sink.redraw();
                }
                None => trace!("no onion overlay, ignoring alpha change"),
            },
            WindowCommand::SetOnion { onion } => {
                self.state.onion = onion;
                self.sink.set_onion(self.state.onion.as_ref());
            }
            WindowCommand::SetLcdBrightness { brightness } => {
                self.state.lcd_brightness = brightness;
                self.sink.set_lcd_brightness(brightness);
            }
            WindowCommand::Redraw => self.sink.redraw(),
            WindowCommand::ScreenChanged => {
                self.show_window();
                self.sink.redraw();
            }
        }
    }

    // ── Internals ─────────────────────────────────────────────────────────────

    /// Resizes the window for the current scale and zoom and shows it.
    fn show_window(&mut self) {
        let Some(original) = self.state.backing_surface else {
            return;
        };
        self.state.window_size = original.scaled_by(self.state.scale * self.state.zoom);
        if !self.state.fullscreen {
            if self.state.zoom_mode && self.state.zoom_pending {
                self.recenter_focus_point();
            } else if !self.state.zoom_pending {
                self.state.container = self.state.window_size;
            }
            self.state.zoom_pending = false;
        }
        self.state.scrollbar_policy = if self.state.zoom_mode {
            ScrollbarPolicy::AsNeeded
        } else {
            ScrollbarPolicy::AlwaysOff
        };
        self.update_viewport();
        self.sink.show_window(&self.state);
    }

    /// Window scale relative to the backing surface, or `None` without one.
    fn current_scale(&self) -> Option<f64> {
        let original = self.state.backing_surface?;
        if original.width <= 0 || self.state.window_size.width <= 0 {
            return None;
        }
        Some(f64::from(self.state.window_size.width) / f64::from(original.width))
    }

    fn center_points(&self) -> ((i32, i32), (i32, i32)) {
        let window = self.state.window_size;
        let container = self.state.container;
        (
            (window.width / 2, window.height / 2),
            (container.width / 2, container.height / 2),
        )
    }

    fn save_zoom_points(&mut self, focus: (i32, i32), viewport_focus: (i32, i32)) {
        let window = self.state.window_size;
        if window.width <= 0 || window.height <= 0 {
            return;
        }
        self.state.focus = Some(ZoomFocus {
            fraction_x: f64::from(focus.0) / f64::from(window.width),
            fraction_y: f64::from(focus.1) / f64::from(window.height),
            viewport_x: viewport_focus.0,
            viewport_y: viewport_focus.1,
        });
    }

    fn recenter_focus_point(&mut self) {
        let Some(focus) = self.state.focus.take() else {
            return;
        };
        let window = self.state.window_size;
        let x = (focus.fraction_x * f64::from(window.width)) as i32 - focus.viewport_x;
        let y = (focus.fraction_y * f64::from(window.height)) as i32 - focus.viewport_y;
        self.update_viewport();
        let (xmax, ymax) = self.scroll_range();
        self.state.scroll = (x.clamp(0, xmax), y.clamp(0, ymax));
    }

    fn scroll_range(&self) -> (i32, i32) {
        let window = self.state.window_size;
        let viewport = self.state.viewport;
        (
            (window.width - viewport.width).max(0),
            (window.height - viewport.height).max(0),
        )
    }

    fn horizontal_scrollbar_visible(&self) -> bool {
        match self.state.scrollbar_policy {
            ScrollbarPolicy::AlwaysOff => false,
            ScrollbarPolicy::AlwaysOn => true,
            ScrollbarPolicy::AsNeeded => self.state.window_size.width > self.state.container.width,
        }
    }

    fn vertical_scrollbar_visible(&self) -> bool {
        match self.state.scrollbar_policy {
            ScrollbarPolicy::AlwaysOff => false,
            ScrollbarPolicy::AlwaysOn => true,
            ScrollbarPolicy::AsNeeded => self.state.window_size.height > self.state.container.height,
        }
    }

    fn update_viewport(&mut self) {
        let thickness = self.state.scrollbar_thickness;
        let container = self.state.container;
        let width = if self.vertical_scrollbar_visible() {
            container.width - thickness
        } else {
            container.width
        };
        let height = if self.horizontal_scrollbar_visible() {
            container.height - thickness
        } else {
            container.height
        };
        self.state.viewport = Size::new(width.max(0), height.max(0));
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use skin_core::{DisplayRect, OnionOverlay, Rotation, SkinLayout};
    use std::sync::Mutex;

    // ── Test doubles ──────────────────────────────────────────────────────────

    #[derive(Debug, Clone, PartialEq)]
    enum SinkCall {
        Show(Size),
        Redraw,
        Scale(f64),
        Zoom(f64),
        Onion(Option<u16>),
        Brightness(u8),
        Title(String),
        Fullscreen(bool),
        Trackball(bool),
    }

    #[derive(Default)]
    struct RecordingWindowSink {
        calls: Mutex<Vec<SinkCall>>,
    }

    impl RecordingWindowSink {
        fn calls(&self) -> Vec<SinkCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl WindowSink for RecordingWindowSink {
        fn show_window(&self, state: &WindowState) {
            self.calls.lock().unwrap().push(SinkCall::Show(state.window_size));
        }
        fn redraw(&self) {
            self.calls.lock().unwrap().push(SinkCall::Redraw);
        }
        fn set_scale(&self, scale: f64) {
            self.calls.lock().unwrap().push(SinkCall::Scale(scale));
        }
        fn set_zoom(&self, zoom: f64) {
            self.calls.lock().unwrap().push(SinkCall::Zoom(zoom));
        }
        fn set_onion(&self, onion: Option<&OnionOverlay>) {
            self.calls.lock().unwrap().push(SinkCall::Onion(onion.map(|o| o.alpha)));
        }
        fn set_lcd_brightness(&self, brightness: u8) {
            self.calls.lock().unwrap().push(SinkCall::Brightness(brightness));
        }
        fn set_title(&self, title: &str) {
            self.calls.lock().unwrap().push(SinkCall::Title(title.to_string()));
        }
        fn set_fullscreen(&self, fullscreen: bool) {
            self.calls.lock().unwrap().push(SinkCall::Fullscreen(fullscreen));
        }
        fn show_trackball(&self, visible: bool) {
            self.calls.lock().unwrap().push(SinkCall::Trackball(visible));
        }
    }

    fn layout(width: i32, height: i32) -> SkinLayout {
        SkinLayout {
            name: "portrait".to_string(),
            rotation: Rotation::Deg0,
            dpad_rotation: Rotation::Deg0,
            width,
            height,
            display: DisplayRect {
                x: 0,
                y: 0,
                width,
                height,
                rotation: Rotation::Deg0,
            },
        }
    }

    fn make_coordinator(
        options: CoordinatorOptions,
    ) -> (WindowCoordinator, Arc<EventQueue>, Arc<RecordingWindowSink>) {
        let queue = Arc::new(EventQueue::new());
        let sink = Arc::new(RecordingWindowSink::default());
        let coordinator = WindowCoordinator::new(
            options,
            Arc::clone(&queue),
            Arc::clone(&sink) as Arc<dyn WindowSink>,
        );
        (coordinator, queue, sink)
    }

    /// A coordinator showing a 1600x1200 skin at scale 0.5 (800x600 window).
    fn shown_coordinator() -> (WindowCoordinator, Arc<EventQueue>, Arc<RecordingWindowSink>) {
        let (mut c, queue, sink) = make_coordinator(CoordinatorOptions {
            scale: 0.5,
            ..CoordinatorOptions::default()
        });
        c.handle_command(WindowCommand::ResetLayout {
            layout: layout(1600, 1200),
        });
        (c, queue, sink)
    }

    fn drain(queue: &EventQueue) -> Vec<SkinEvent> {
        std::iter::from_fn(|| queue.poll()).collect()
    }

    // ── Scale ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_sizing_without_backing_surface_is_noop() {
        // Arrange
        let (mut c, queue, _sink) = make_coordinator(CoordinatorOptions::default());

        // Act
        c.do_resize(Size::new(500, 500), false, false);
        c.zoom_in();
        c.zoom_to((10, 10), Size::new(50, 50));

        // Assert
        assert!(queue.is_empty());
    }

    #[test]
    fn test_do_resize_keeps_aspect_ratio() {
        // Arrange: 1600x1200 original into 400x600 → 400x300 → scale 0.25
        let (mut c, queue, _sink) = shown_coordinator();

        // Act
        c.do_resize(Size::new(400, 600), false, false);

        // Assert
        assert_eq!(drain(&queue), vec![SkinEvent::SetScale { scale: 0.25 }]);
    }

    #[test]
    fn test_do_resize_clamps_to_min_scale() {
        let (mut c, queue, _sink) = shown_coordinator();

        c.do_resize(Size::new(16, 12), false, false);

        assert_eq!(drain(&queue), vec![SkinEvent::SetScale { scale: 0.2 }]);
    }

    #[test]
    fn test_keyboard_shortcut_resize_stays_within_screen() {
        // Arrange: screen 1000x1000 → usable 950x950
        let (mut c, queue, _sink) = make_coordinator(CoordinatorOptions {
            screen: Some(Size::new(1000, 1000)),
            ..CoordinatorOptions::default()
        });
        c.handle_command(WindowCommand::ResetLayout {
            layout: layout(1000, 2000),
        });
        drain(&queue);

        // Act
        c.do_resize(Size::new(1000, 2000), true, false);

        // Assert: 1000x2000 fits 950x950 as 475x950 → 0.475
        match drain(&queue).as_slice() {
            [SkinEvent::SetScale { scale }] => assert!((scale - 0.475).abs() < 1e-9),
            other => panic!("unexpected events {other:?}"),
        }
    }

    #[test]
    fn test_apply_scale_resizes_and_shows_window() {
        // Arrange
        let (mut c, _queue, sink) = shown_coordinator();

        // Act
        c.handle_command(WindowCommand::ApplyScale { scale: 0.25 });

        // Assert
        assert_eq!(c.state().window_size, Size::new(400, 300));
        assert_eq!(c.state().container, Size::new(400, 300));
        let calls = sink.calls();
        assert!(calls.ends_with(&[SinkCall::Scale(0.25), SinkCall::Show(Size::new(400, 300))]));
    }

    #[test]
    fn test_set_scale_ignored_while_zoom_pending_in_zoom_mode() {
        // Arrange
        let (mut c, queue, _sink) = shown_coordinator();
        c.toggle_zoom_mode();
        c.zoom_in();
        drain(&queue);

        // Act
        c.set_scale(0.8);

        // Assert
        assert!(queue.is_empty());
    }

    // ── Zoom ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_zoom_to_rect_uses_container_and_scale() {
        // Arrange: container 800x600, scale 0.5 → max zoom 4.0
        let (mut c, queue, _sink) = shown_coordinator();

        // Act
        c.zoom_to((400, 300), Size::new(100, 100));

        // Assert
        match drain(&queue).as_slice() {
            [SkinEvent::SetZoom { zoom, .. }] => assert!((zoom - 4.0).abs() < 1e-9),
            other => panic!("unexpected events {other:?}"),
        }
        assert!(c.state().zoom_pending);
        assert_eq!(c.state().scrollbar_policy, ScrollbarPolicy::AlwaysOn);
    }

    #[test]
    fn test_set_zoom_reports_viewport_and_scrollbar() {
        // Arrange
        let (mut c, queue, _sink) = shown_coordinator();

        // Act
        c.set_zoom(1.5);

        // Assert: scrollbars forced on, 15px each
        assert_eq!(
            drain(&queue),
            vec![SkinEvent::SetZoom {
                zoom: 1.5,
                viewport_width: 785,
                viewport_height: 585,
                scroll_h: 15,
            }]
        );
    }

    #[test]
    fn test_set_zoom_noop_when_pending_or_unchanged() {
        // Arrange
        let (mut c, queue, _sink) = shown_coordinator();

        // Act
        c.set_zoom(1.0);
        c.set_zoom(1.5);
        c.set_zoom(2.0);

        // Assert
        assert_eq!(drain(&queue).len(), 1);
    }

    #[test]
    fn test_zoom_below_one_is_raised_to_one() {
        // Arrange: a rectangle wider and taller than the 800x600 container
        let (mut c, queue, _sink) = shown_coordinator();

        // Act
        c.zoom_to((400, 300), Size::new(1000, 1000));
        c.set_zoom(0.5);

        // Assert: already at 1.0, so nothing is requested
        assert!(queue.is_empty());
        assert!((c.state().zoom - 1.0).abs() < 1e-9);
        assert!(!c.state().zoom_pending);
    }

    #[test]
    fn test_zoom_in_steps_by_quarter() {
        let (mut c, queue, _sink) = shown_coordinator();

        c.zoom_in();

        match drain(&queue).as_slice() {
            [SkinEvent::SetZoom { zoom, .. }] => assert!((zoom - 1.25).abs() < 1e-9),
            other => panic!("unexpected events {other:?}"),
        }
    }

    #[test]
    fn test_zoom_out_at_one_is_noop() {
        let (mut c, queue, _sink) = shown_coordinator();

        c.zoom_out();

        assert!(queue.is_empty());
    }

    #[test]
    fn test_apply_zoom_in_zoom_mode_recenters_and_clears_pending() {
        // Arrange
        let (mut c, queue, sink) = shown_coordinator();
        c.toggle_zoom_mode();
        c.zoom_in();
        drain(&queue);

        // Act
        c.handle_command(WindowCommand::ApplyZoom {
            zoom: 1.25,
            viewport_width: 785,
            viewport_height: 585,
            scroll_h: 15,
        });

        // Assert: window grows to 1000x750, container keeps 800x600
        let state = c.state();
        assert!(!state.zoom_pending);
        assert_eq!(state.window_size, Size::new(1000, 750));
        assert_eq!(state.container, Size::new(800, 600));
        assert_eq!(state.scrollbar_policy, ScrollbarPolicy::AsNeeded);
        // Center focus (0.5, 0.5) lands at the container center.
        assert_eq!(state.scroll, (100, 75));
        assert!(state.focus.is_none());
        assert!(sink.calls().contains(&SinkCall::Zoom(1.25)));
    }

    #[test]
    fn test_leaving_zoom_mode_snaps_back_and_hides_overlay() {
        // Arrange
        let (mut c, queue, _sink) = shown_coordinator();
        c.toggle_zoom_mode();
        assert!(c.state().overlay_visible);

        // Act
        c.toggle_zoom_mode();

        // Assert
        assert!(!c.state().overlay_visible);
        assert_eq!(c.state().scrollbar_policy, ScrollbarPolicy::AlwaysOff);
        assert_eq!(drain(&queue), vec![SkinEvent::SetScale { scale: 0.5 }]);
    }

    // ── Scrolling ─────────────────────────────────────────────────────────────

    #[test]
    fn test_pan_is_clamped_to_scroll_range() {
        // Arrange
        let (mut c, queue, _sink) = shown_coordinator();

        // Act: window equals container, so nothing to scroll
        c.pan_horizontal(false);

        // Assert
        assert_eq!(
            drain(&queue),
            vec![SkinEvent::ScrollChanged {
                x: 0,
                xmax: 0,
                y: 0,
                ymax: 0
            }]
        );
    }

    #[test]
    fn test_container_resize_in_zoom_mode_reports_zoomed_resize() {
        // Arrange
        let (mut c, queue, _sink) = shown_coordinator();
        c.toggle_zoom_mode();

        // Act
        c.resize_container(Size::new(700, 500));

        // Assert
        assert_eq!(
            drain(&queue),
            vec![SkinEvent::ZoomedWindowResized {
                dx: 0,
                dy: 0,
                width: 700,
                height: 500,
                scroll_h: 15,
            }]
        );
    }

    #[test]
    fn test_container_resize_outside_zoom_mode_rescales() {
        let (mut c, queue, _sink) = shown_coordinator();

        c.resize_container(Size::new(400, 300));

        assert_eq!(drain(&queue), vec![SkinEvent::SetScale { scale: 0.25 }]);
    }

    // ── Render state ──────────────────────────────────────────────────────────

    #[test]
    fn test_reset_layout_reasserts_brightness_and_trackball() {
        // Arrange
        let (mut c, _queue, sink) = shown_coordinator();
        c.handle_command(WindowCommand::SetLcdBrightness { brightness: 200 });
        c.handle_command(WindowCommand::ShowTrackball { visible: true });

        // Act
        c.handle_command(WindowCommand::ResetLayout {
            layout: layout(1200, 1600),
        });

        // Assert
        let calls = sink.calls();
        assert!(calls.ends_with(&[
            SinkCall::Show(Size::new(600, 800)),
            SinkCall::Brightness(200),
            SinkCall::Trackball(true),
        ]));
    }

    #[test]
    fn test_onion_alpha_stays_in_range() {
        // Arrange
        let (mut c, _queue, sink) = shown_coordinator();
        c.handle_command(WindowCommand::SetOnion {
            onion: Some(OnionOverlay {
                image: "onion.png".to_string(),
                rotation: Rotation::Deg0,
                alpha: 240,
            }),
        });

        // Act
        for _ in 0..5 {
            c.handle_command(WindowCommand::AdjustOnionAlpha { up: true });
        }

        // Assert
        assert_eq!(c.state().onion.as_ref().map(|o| o.alpha), Some(256));
        for _ in 0..40 {
            c.handle_command(WindowCommand::AdjustOnionAlpha { up: false });
        }
        assert_eq!(c.state().onion.as_ref().map(|o| o.alpha), Some(0));
        assert!(sink.calls().contains(&SinkCall::Redraw));
    }

    #[test]
    fn test_onion_alpha_without_onion_does_nothing() {
        let (mut c, _queue, sink) = shown_coordinator();
        let before = sink.calls().len();

        c.handle_command(WindowCommand::AdjustOnionAlpha { up: true });

        assert_eq!(sink.calls().len(), before);
    }

    #[test]
    fn test_title_and_fullscreen_forwarded() {
        let (mut c, _queue, sink) = shown_coordinator();

        c.handle_command(WindowCommand::SetTitle {
            title: "Pixel".to_string(),
        });
        c.handle_command(WindowCommand::ToggleFullscreen);

        assert_eq!(c.state().title, "Pixel");
        assert!(c.state().fullscreen);
        let calls = sink.calls();
        assert!(calls.contains(&SinkCall::Title("Pixel".to_string())));
        assert!(calls.contains(&SinkCall::Fullscreen(true)));
    }

    #[test]
    fn test_move_window_updates_position_and_queues_event() {
        let (mut c, queue, _sink) = make_coordinator(CoordinatorOptions::default());

        c.move_window(120, 45);

        assert_eq!(c.window_position(), (120, 45));
        assert_eq!(drain(&queue), vec![SkinEvent::WindowMoved { x: 120, y: 45 }]);
    }
}
