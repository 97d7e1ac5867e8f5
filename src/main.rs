//! pong-pilot: Session controller for a voice- or face-steered Pong game
//!
//! Provides:
//! - Voice command and face position normalization into paddle targets
//! - Explicit session state machine (intro, mode select, tracking info, game)
//! - Round clock with deferred start, pause/resume and award detection
//! - Per-frame adapter to a physics engine
//!
//! All mutation runs on a single controller task; capture, clock and frame
//! sources only send commands to it. Session events are written to stdout
//! as JSON lines for the renderer; logs go to stderr.

mod config;
mod events;
mod game;
mod input;
mod lifecycle;
mod session;
mod timer;

use std::time::Instant;

use anyhow::Result;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::events::SessionEvent;
use crate::game::ArenaSim;
use crate::input::{ConsoleFace, ConsoleFeed};
use crate::lifecycle::ShutdownSignal;
use crate::session::{Command, Controller};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "pong-pilot starting");

    let config = Config::load()?;
    info!(?config, "configuration loaded");

    let shutdown = ShutdownSignal::new();

    // Capture, clock and frame sources -> controller
    let (command_tx, command_rx) = mpsc::channel::<Command>(256);
    // Controller -> renderer
    let (event_tx, mut event_rx) = broadcast::channel::<SessionEvent>(256);

    let feed = ConsoleFeed::new(command_tx.clone());

    let frame_interval = config.frame_interval();
    let mut controller = Controller::new(
        config,
        ArenaSim::new(),
        Box::new(feed.speech_engine()),
        Box::new(ConsoleFace),
        event_tx,
    );

    match feed.start() {
        Ok(()) => info!("console feed started"),
        Err(e) => {
            error!(?e, "failed to start console feed");
            warn!("continuing without console input");
        }
    }

    let clock = tokio::spawn(send_every(Duration::from_secs(1), command_tx.clone(), |_| {
        Command::Tick
    }));
    let frames = tokio::spawn(send_every(frame_interval, command_tx.clone(), move |at| {
        Command::Frame {
            dt: frame_interval,
            at,
        }
    }));
    let scheduler = command_tx.downgrade();
    drop(command_tx);

    info!("controller initialized, entering main loop");

    tokio::select! {
        _ = controller.run(command_rx, scheduler) => {
            info!("controller exited");
        }

        // Publish session events for the renderer
        _ = async {
            loop {
                match event_rx.recv().await {
                    Ok(event) => match serde_json::to_string(&event) {
                        Ok(json) => println!("{json}"),
                        Err(e) => warn!(?e, %event, "failed to encode event"),
                    },
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "event receiver lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        } => {
            info!("event publisher exited");
        }

        result = shutdown.wait() => {
            match result {
                Ok(()) => info!("shutdown signal received"),
                Err(e) => error!(?e, "failed to register signal handlers"),
            }
        }
    }

    info!(
        state = %controller.state(),
        elapsed_secs = controller.elapsed_secs(),
        "shutting down..."
    );

    feed.stop();
    clock.abort();
    frames.abort();

    info!("pong-pilot stopped");

    Ok(())
}

/// Send a command on a fixed period until the controller queue closes
async fn send_every(
    period: Duration,
    command_tx: mpsc::Sender<Command>,
    make: impl Fn(Instant) -> Command,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // First tick completes immediately
    ticker.tick().await;

    loop {
        ticker.tick().await;
        if command_tx.send(make(Instant::now())).await.is_err() {
            break;
        }
    }
}
