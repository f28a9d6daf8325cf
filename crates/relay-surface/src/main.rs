//! Touch relay surface: entry point.
//!
//! One process runs one surface, connected to one logical channel of the
//! relay server:
//!
//! - `touch`:   reads native touch events (JSON lines on stdin), sends one
//!   touch message per event, and renders the relay's echoed positions.
//! - `display`: renders every position snapshot the relay pushes.
//! - `slider`:  reads pointer input for the configured sliders (JSON lines on
//!   stdin) and sends a slider update for every accepted event.
//!
//! Every surface reports its connection state through the status indicator
//! (structured log lines).
//!
//! # Usage
//!
//! ```text
//! relay-surface [OPTIONS] <touch|display|slider>
//!
//! Options:
//!   --config     <PATH>   TOML configuration file
//!   --relay-url  <URL>    Relay base URL [default: ws://127.0.0.1:8080]
//!   --mode       <MODE>   normalized | pixel [default: normalized]
//!   --viewport   <WxH>    Capture / render area [default: 800x600]
//!   --log-level  <LEVEL>  Used when RUST_LOG is unset [default: info]
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable                 | Flag          |
//! |--------------------------|---------------|
//! | `RELAY_CONFIG`           | `--config`    |
//! | `RELAY_URL`              | `--relay-url` |
//! | `RELAY_COORDINATE_MODE`  | `--mode`      |
//! | `RELAY_VIEWPORT`         | `--viewport`  |
//! | `RELAY_LOG_LEVEL`        | `--log-level` |
//!
//! Flags and variables override the configuration file, which overrides the
//! built-in defaults.
//!
//! # Example
//!
//! ```text
//! $ echo '{"phase":"touchstart","contacts":[{"id":0,"x":400,"y":150}]}' \
//!     | relay-surface --relay-url ws://10.0.0.2:8080 touch
//! ```

use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use relay_core::{
    ConnectionIndicator, ConnectionState, CoordinateMode, LogicalChannel, MarkerLayer, NativeTouchEvent,
    PositionReconciler, PositionSet, TouchTranslator, ViewportSize,
};
use relay_surface::application::{ChannelDispatcher, DisplaySurface, SliderInput, SliderPanel, TouchCapture};
use relay_surface::domain::SurfaceConfig;
use relay_surface::infrastructure::input_source::lines::LineSource;
use relay_surface::infrastructure::{CaptureError, Connection, TracingStatusSink};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Touch relay surface.
///
/// Connects to a relay server over WebSocket and runs one surface on it.
#[derive(Debug, Parser)]
#[command(name = "relay-surface", about = "Touch, display and slider surfaces for a WebSocket touch relay", version)]
struct Cli {
    /// TOML configuration file.  Missing fields take their defaults.
    #[arg(long, env = "RELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Base URL of the relay server, e.g. `ws://192.168.1.20:8080`.
    #[arg(long, env = "RELAY_URL")]
    relay_url: Option<String>,

    /// Coordinate mode shared by every surface on the channel.
    #[arg(long, env = "RELAY_COORDINATE_MODE")]
    mode: Option<CoordinateMode>,

    /// Capture / render area in pixels, as `WIDTHxHEIGHT`.
    #[arg(long, env = "RELAY_VIEWPORT")]
    viewport: Option<ViewportSize>,

    /// Log level used when `RUST_LOG` is not set.
    #[arg(long, env = "RELAY_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    surface: SurfaceKind,
}

/// Which surface this process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
enum SurfaceKind {
    /// Capture touches from stdin and send them on the touch channel.
    Touch,
    /// Render position snapshots from the display channel.
    Display,
    /// Drive the configured sliders from stdin on the slider-control channel.
    Slider,
}

impl SurfaceKind {
    fn channel(self) -> LogicalChannel {
        match self {
            SurfaceKind::Touch => LogicalChannel::Touch,
            SurfaceKind::Display => LogicalChannel::Display,
            SurfaceKind::Slider => LogicalChannel::SliderControl,
        }
    }
}

impl Cli {
    /// Builds the effective [`SurfaceConfig`]: file (or defaults), then flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed, or if
    /// the resulting viewport is invalid.
    fn into_config(self) -> anyhow::Result<(SurfaceConfig, SurfaceKind)> {
        let mut config = match &self.config {
            Some(path) => SurfaceConfig::load(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?,
            None => SurfaceConfig::default(),
        };

        if let Some(url) = self.relay_url {
            config.relay_url = url;
        }
        if let Some(mode) = self.mode {
            config.coordinate_mode = mode;
        }
        if let Some(vp) = self.viewport {
            config.viewport.width = vp.width();
            config.viewport.height = vp.height();
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }

        config.viewport().context("invalid viewport")?;
        Ok((config, self.surface))
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (config, surface) = Cli::parse().into_config()?;

    // ── Logging setup ─────────────────────────────────────────────────────────
    //
    // `RUST_LOG` wins; otherwise the configured level applies.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    let channel = surface.channel();
    let endpoint = config.endpoint(channel);
    info!(
        surface = ?surface,
        %endpoint,
        mode = %config.coordinate_mode,
        viewport = %config.viewport()?,
        "touch relay surface starting"
    );

    // ── Graceful shutdown flag ────────────────────────────────────────────────
    let running = Arc::new(AtomicBool::new(true));
    let (connection, events) = Connection::open(endpoint);
    spawn_shutdown_handler(Arc::clone(&running), connection.clone());

    let mut indicator = ConnectionIndicator::new(config.palette_for(channel), TracingStatusSink::new(channel));

    match surface {
        SurfaceKind::Touch => {
            let viewport = config.viewport()?;
            let mut capture = TouchCapture::new(
                TouchTranslator::new(config.coordinate_mode, viewport),
                connection.clone(),
            );
            let input = spawn_input(connection.clone(), Arc::clone(&running), move |running| {
                capture.run(&LineSource::<NativeTouchEvent>::stdin(), running)
            });

            // Echoed positions are rendered on the pad itself.
            let mut echo = DisplaySurface::new(
                PositionReconciler::new(config.coordinate_mode, viewport),
                MarkerLayer::new(),
            );
            let mut dispatcher = ChannelDispatcher::<PositionSet>::new(channel);
            dispatcher
                .on_state_change(|change| {
                    indicator.observe(change);
                })
                .on_message(|set| {
                    echo.apply(&set);
                });
            let stats = dispatcher.run(events).await;
            debug!(?stats, "touch dispatcher finished");

            running.store(false, Ordering::Relaxed);
            match input.await.context("touch input task failed")? {
                Ok(Some(capture)) => info!(
                    events = capture.events,
                    queued = capture.queued,
                    skipped = capture.skipped,
                    "touch capture finished"
                ),
                Ok(None) => {}
                Err(e) => error!("touch capture failed: {e:#}"),
            }
        }

        SurfaceKind::Display => {
            let mut view = DisplaySurface::new(
                PositionReconciler::new(config.coordinate_mode, config.viewport()?),
                MarkerLayer::new(),
            );
            let mut dispatcher = ChannelDispatcher::<PositionSet>::new(channel);
            dispatcher
                .on_state_change(|change| {
                    indicator.observe(change);
                })
                .on_message(|set| {
                    let report = view.apply(&set);
                    info!(markers = report.rendered, "display updated");
                });
            let stats = dispatcher.run(events).await;
            info!(
                snapshots = view.applied(),
                markers = view.surface().len(),
                dropped = stats.dropped,
                "display finished"
            );
        }

        SurfaceKind::Slider => {
            let mut panel = SliderPanel::activate_all(&config.sliders, connection.clone())
                .context("invalid slider configuration")?;
            if panel.is_empty() {
                anyhow::bail!("no sliders configured; add [[sliders]] entries to the configuration file");
            }
            let input = spawn_input(connection.clone(), Arc::clone(&running), move |running| {
                panel.run(&LineSource::<SliderInput>::stdin(), running)
            });

            let mut dispatcher = ChannelDispatcher::<serde_json::Value>::new(channel);
            dispatcher
                .on_state_change(|change| {
                    indicator.observe(change);
                })
                .on_message(|value| {
                    debug!(%value, "slider channel message");
                });
            dispatcher.run(events).await;

            running.store(false, Ordering::Relaxed);
            match input.await.context("slider input task failed")? {
                Ok(Some(handled)) => info!(handled, "slider input finished"),
                Ok(None) => {}
                Err(e) => error!("slider input failed: {e:#}"),
            }
        }
    }

    let final_state = connection.closed().await;
    info!(state = %final_state, "touch relay surface stopped");
    Ok(())
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Clears `running` and starts the close handshake on Ctrl+C.
fn spawn_shutdown_handler(running: Arc<AtomicBool>, connection: Connection) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C, closing relay connection");
                running.store(false, Ordering::Relaxed);
                connection.close();
            }
            Err(e) => error!("failed to listen for Ctrl+C signal: {e}"),
        }
    });
}

/// Runs a blocking input pump once the connection has left Connecting.
///
/// Resolves to `None` if the connection never opened.  When the pump
/// returns (end of input or shutdown), the connection is closed.
fn spawn_input<T, F>(
    connection: Connection,
    running: Arc<AtomicBool>,
    pump: F,
) -> JoinHandle<anyhow::Result<Option<T>>>
where
    T: Send + 'static,
    F: FnOnce(&AtomicBool) -> Result<T, CaptureError> + Send + 'static,
{
    tokio::spawn(async move {
        let state = connection.wait_until(|s| *s != ConnectionState::Connecting).await;
        if !state.is_open() {
            return Ok(None);
        }
        let result = tokio::task::spawn_blocking(move || pump(&running))
            .await
            .context("input thread panicked")?;
        connection.close();
        Ok(Some(result?))
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
