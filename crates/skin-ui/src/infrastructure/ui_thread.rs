//! Message passing between the core context and the UI context.
//!
//! ```text
//!  core thread                           UI task (tokio)
//!  ───────────                           ───────────────
//!  SkinUi ── UiHandle::post ──────────▶ UiExecutor ──▶ WindowCoordinator
//!         ── UiHandle::window_position ─▶    │
//!            (blocks on a oneshot) ◀─────────┘ reply
//! ```
//!
//! Commands are fire-and-forget.  Queries carry a `oneshot` sender as the
//! rendezvous token and the caller blocks until the UI context answers.
//!
//! [`UiHandle::window_position`] uses `blocking_recv`, so it must be called
//! from a plain thread, never from inside the async runtime.

use std::sync::Arc;

use skin_core::Size;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, trace};

use crate::application::event_queue::EventQueue;
use crate::application::sinks::{MarshalError, WindowCommand, WindowPort, WindowSink};
use crate::application::window_coordinator::{CoordinatorOptions, WindowCoordinator};
use crate::infrastructure::host_input::{HostEvent, HostInputTranslator};

/// One unit of work for the UI context.
#[derive(Debug)]
pub enum UiJob {
    Command(WindowCommand),
    /// Reply with the current window position.
    WindowPosition(oneshot::Sender<(i32, i32)>),
}

/// What the UI context does with jobs.
pub trait UiJobHandler {
    fn handle_command(&mut self, command: WindowCommand);
    fn window_position(&self) -> (i32, i32);
}

/// Creates a connected handle/executor pair.
pub fn ui_channel() -> (UiHandle, UiExecutor) {
    let (tx, rx) = mpsc::unbounded_channel();
    (UiHandle { tx }, UiExecutor { rx })
}

/// Core-side end of the channel.
#[derive(Debug, Clone)]
pub struct UiHandle {
    tx: mpsc::UnboundedSender<UiJob>,
}

impl WindowPort for UiHandle {
    fn post(&self, command: WindowCommand) {
        if self.tx.send(UiJob::Command(command)).is_err() {
            debug!("UI context gone, dropping window command");
        }
    }

    fn window_position(&self) -> Result<(i32, i32), MarshalError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(UiJob::WindowPosition(reply_tx))
            .map_err(|_| MarshalError::Closed)?;
        reply_rx.blocking_recv().map_err(|_| MarshalError::ReplyDropped)
    }
}

/// UI-side end of the channel.
#[derive(Debug)]
pub struct UiExecutor {
    rx: mpsc::UnboundedReceiver<UiJob>,
}

impl UiExecutor {
    /// Waits for the next job; `None` once every handle is dropped.
    pub async fn recv(&mut self) -> Option<UiJob> {
        self.rx.recv().await
    }

    /// Runs jobs until every handle is dropped.
    pub async fn run<H: UiJobHandler>(mut self, handler: &mut H) {
        while let Some(job) = self.rx.recv().await {
            execute(job, handler);
        }
        debug!("UI executor finished");
    }

    /// Runs the jobs already queued without waiting.  Returns how many ran.
    pub fn pump(&mut self, handler: &mut dyn UiJobHandler) -> usize {
        let mut count = 0;
        while let Ok(job) = self.rx.try_recv() {
            execute(job, handler);
            count += 1;
        }
        count
    }
}

/// Runs one job against `handler`.
pub fn execute<H: UiJobHandler + ?Sized>(job: UiJob, handler: &mut H) {
    match job {
        UiJob::Command(command) => handler.handle_command(command),
        UiJob::WindowPosition(reply) => {
            // The caller may have given up waiting; nothing to do then.
            let _ = reply.send(handler.window_position());
        }
    }
}

// ── UI context ────────────────────────────────────────────────────────────────

/// Everything the UI context owns: the window coordinator and the host
/// input translator.
pub struct UiContext {
    coordinator: WindowCoordinator,
    translator: HostInputTranslator,
}

impl UiContext {
    pub fn new(options: CoordinatorOptions, queue: Arc<EventQueue>, sink: Arc<dyn WindowSink>) -> Self {
        Self {
            coordinator: WindowCoordinator::new(options, Arc::clone(&queue), sink),
            translator: HostInputTranslator::new(queue),
        }
    }

    pub fn coordinator(&self) -> &WindowCoordinator {
        &self.coordinator
    }

    /// Routes a host event to the translator or the coordinator.
    pub fn handle_host_event(&mut self, event: HostEvent) {
        if self.translator.handle(&event) {
            return;
        }
        let c = &mut self.coordinator;
        match event {
            HostEvent::ScrollBarsMoved { x, y } => c.scroll_to(x, y),
            HostEvent::ContainerResized { width, height } => {
                c.resize_container(Size::new(width, height))
            }
            HostEvent::WindowMoved { x, y } => c.move_window(x, y),
            HostEvent::ZoomIn => c.zoom_in(),
            HostEvent::ZoomOut => c.zoom_out(),
            HostEvent::ZoomReset => c.zoom_reset(),
            HostEvent::ZoomTo { x, y, width, height } => c.zoom_to((x, y), Size::new(width, height)),
            HostEvent::ToggleZoomMode => c.toggle_zoom_mode(),
            HostEvent::ScaleUp => c.scale_up(),
            HostEvent::ScaleDown => c.scale_down(),
            HostEvent::PanLeft => c.pan_horizontal(true),
            HostEvent::PanRight => c.pan_horizontal(false),
            HostEvent::PanUp => c.pan_vertical(true),
            HostEvent::PanDown => c.pan_vertical(false),
            other => trace!(?other, "host event not handled"),
        }
    }

    /// Serves core jobs and host events until the core drops its handles.
    ///
    /// Host events stop being read once the host stream closes; jobs keep
    /// being served so a final position query still gets an answer.
    pub async fn run(
        mut self,
        mut executor: UiExecutor,
        mut host: mpsc::UnboundedReceiver<HostEvent>,
    ) -> Self {
        let mut host_open = true;
        loop {
            tokio::select! {
                job = executor.recv() => match job {
                    Some(job) => execute(job, &mut self),
                    None => break,
                },
                event = host.recv(), if host_open => match event {
                    Some(event) => self.handle_host_event(event),
                    None => {
                        debug!("host event stream closed");
                        host_open = false;
                    }
                },
            }
        }
        info!("UI context stopped");
        self
    }
}

impl UiJobHandler for UiContext {
    fn handle_command(&mut self, command: WindowCommand) {
        self.coordinator.handle_command(command);
    }

    fn window_position(&self) -> (i32, i32) {
        self.coordinator.window_position()
    }
}
