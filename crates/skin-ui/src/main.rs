//! Device skin entry point.
//!
//! Runs the skin headless: both execution contexts are real, but the device
//! and the host window are the logging sinks.  Host input arrives through a
//! [`ChannelHostSource`]; Ctrl-C closes the window.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  ├─ load config, skin layouts, charmap, keyset
//!  ├─ UI task (tokio)      UiContext::run  ◀── host events
//!  │                           ▲   │ push
//!  │              WindowCommand│   ▼
//!  └─ core thread          SkinUi::process_events every poll_ms
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use skin_core::CharmapRegistry;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use skin_ui::application::dispatch::{PollOutcome, SkinUi, SkinUiParams, SkinUiSinks};
use skin_ui::application::event_queue::EventQueue;
use skin_ui::application::keyboard::KeyboardOptions;
use skin_ui::application::window_coordinator::CoordinatorOptions;
use skin_ui::infrastructure::host_input::{ChannelHostSource, HostEvent, HostEventSource};
use skin_ui::infrastructure::sinks::logging::{
    LoggingDeviceSink, LoggingDisplaySink, LoggingWindowSink,
};
use skin_ui::infrastructure::storage::config::{self, SkinConfig};
use skin_ui::infrastructure::storage::{keyset_file, skin_file};
use skin_ui::infrastructure::ui_thread::{ui_channel, UiContext};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Headless device skin.
///
/// Command-line values override the matching config file entries for this
/// run only; they are not written back.
#[derive(Debug, Parser)]
#[command(name = "skin-ui", about = "Device skin window and input router", version)]
struct Cli {
    /// Config file.  Defaults to the platform config directory.
    #[arg(long, env = "SKIN_CONFIG")]
    config: Option<PathBuf>,

    /// Skin description file with the device layouts.
    #[arg(long, env = "SKIN_FILE")]
    skin: Option<PathBuf>,

    /// Layout to start in, e.g. `landscape`.
    #[arg(long)]
    orientation: Option<String>,

    /// Window title.
    #[arg(long)]
    name: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ── Configuration ─────────────────────────────────────────────────────────
    let config_path = match cli.config {
        Some(path) => path,
        None => config::default_config_path()?,
    };
    let mut cfg = config::load_config(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    let mut saved = cfg.clone();
    if let Some(skin) = cli.skin {
        cfg.window.skin = Some(skin);
    }
    if let Some(orientation) = cli.orientation {
        cfg.window.initial_orientation = Some(orientation);
    }
    if let Some(name) = cli.name {
        cfg.window.name = name;
    }

    // Level from the config file; `RUST_LOG` overrides it.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log.level)),
        )
        .init();

    info!(config = %config_path.display(), name = %cfg.window.name, "device skin starting");

    let layouts = skin_file::load_layouts(cfg.window.skin.as_deref())?;
    let mut charmaps = CharmapRegistry::new();
    let charmap = skin_file::load_charmap(&mut charmaps, cfg.keyboard.charmap.as_deref())?;
    let keyset = keyset_file::load_keyset(cfg.keyboard.keyset.as_deref())?;

    let queue = Arc::new(EventQueue::new());

    // ── UI context ────────────────────────────────────────────────────────────
    let (ui_handle, executor) = ui_channel();
    let ui = UiContext::new(
        CoordinatorOptions {
            title: cfg.window.name.clone(),
            position: (cfg.window.x, cfg.window.y),
            scale: cfg.window.scale,
            min_scale: cfg.window.effective_min_scale(),
            lcd_brightness: cfg.window.lcd_brightness,
            ..CoordinatorOptions::default()
        },
        Arc::clone(&queue),
        Arc::new(LoggingWindowSink),
    );

    let mut host = ChannelHostSource::new();
    let host_tx = host.sender();
    let host_rx = host.start()?;
    let ui_task = tokio::spawn(ui.run(executor, host_rx));

    // ── Ctrl-C closes the window ──────────────────────────────────────────────
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            let _ = host_tx.send(HostEvent::CloseRequested);
        }
    });

    // ── Core context ──────────────────────────────────────────────────────────
    let params = SkinUiParams {
        window_name: cfg.window.name.clone(),
        initial_orientation: cfg.window.initial_orientation.clone(),
        layouts,
        charmap,
        keyset: Some(keyset),
        keyboard: KeyboardOptions {
            raw_keys: cfg.keyboard.raw_keys,
            passthrough: cfg.keyboard.passthrough,
        },
        enable_trackball: cfg.trackball.enabled,
        onion: None,
        lcd_brightness: cfg.window.lcd_brightness,
        scale: cfg.window.scale,
    };
    let sinks = SkinUiSinks {
        device: Arc::new(LoggingDeviceSink),
        display: Arc::new(LoggingDisplaySink),
        window: Arc::new(ui_handle),
    };
    let poll = Duration::from_millis(cfg.event_loop.poll_ms.max(1));

    let core = std::thread::Builder::new()
        .name("skin-core".to_string())
        .spawn(move || {
            let mut skin = SkinUi::new(params, queue, sinks);
            info!(layout = %skin.current_layout().name, "device skin ready.  Press Ctrl-C to exit.");
            while skin.process_events() == PollOutcome::Continue {
                std::thread::sleep(poll);
            }
            // Dropping the skin drops the last UI handle, which stops the UI task.
            skin.window_position()
        })
        .context("spawning core thread")?;

    let position = match tokio::task::spawn_blocking(move || core.join()).await? {
        Ok(position) => position,
        Err(_) => anyhow::bail!("core thread panicked"),
    };
    ui_task.await?;

    // ── Persist the window position ───────────────────────────────────────────
    saved.window.x = position.0;
    saved.window.y = position.1;
    if let Err(e) = config::save_config(&config_path, &saved) {
        error!("failed to save config: {e}");
    }

    info!(x = position.0, y = position.1, "device skin stopped");
    Ok(())
}
