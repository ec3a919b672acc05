//! TWILINE bridge entry point.
//!
//! Wires the infrastructure to the application layer and runs the bus event
//! loop.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config()          -- TOML file from argv[1], default twiline.toml
//!  └─ TcpClient::start()     -- connect/read/reconnect loop (Tokio task)
//!  └─ OutboundPacer          -- paced FIFO in front of the socket
//!  └─ SignalRouter           -- one accessory per configured reference
//!  └─ event loop             -- BusEvents in, paced messages out
//! ```

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use twiline_core::validate_devices;

use twiline_bridge::application::accessories::{Accessory, AccessorySettings};
use twiline_bridge::application::router::SignalRouter;
use twiline_bridge::application::MessageWriter;
use twiline_bridge::infrastructure::network::{
    BusEvent, OutboundPacer, TcpClient, TcpClientConfig, WireSink,
};
use twiline_bridge::infrastructure::storage::load_config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "twiline.toml".to_string());
    let config = load_config(Path::new(&config_path))
        .with_context(|| format!("loading configuration from {config_path}"))?;

    // Initialise structured logging.  The configured level is overridden by
    // `RUST_LOG` when set.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.bus.log_level.clone())),
        )
        .init();

    info!("TWILINE bridge starting");

    let devices = config.devices();
    validate_devices(&devices).context("invalid device configuration")?;

    // ── Transport ─────────────────────────────────────────────────────────────
    let client = Arc::new(TcpClient::new(TcpClientConfig {
        host: config.bus.host.clone(),
        port: config.bus.port,
        reconnect_delay: config.bus.reconnect_delay(),
    }));
    let mut bus_events = client.start();

    let pacer = Arc::new(OutboundPacer::new(
        Arc::clone(&client) as Arc<dyn WireSink>,
        config.bus.write_interval(),
    ));

    // ── Routing table ─────────────────────────────────────────────────────────
    let (state_tx, mut state_rx) = mpsc::unbounded_channel();
    let settings = AccessorySettings {
        switch_press_duration: config.bus.switch_press(),
    };
    let mut router = SignalRouter::new();
    for descriptor in &devices {
        router.register(Accessory::from_descriptor(
            descriptor,
            Arc::clone(&pacer) as Arc<dyn MessageWriter>,
            state_tx.clone(),
            &settings,
        ))?;
    }
    info!("{} accessories configured", router.len());

    // ── State change pump ─────────────────────────────────────────────────────
    tokio::spawn(async move {
        while let Some(event) = state_rx.recv().await {
            debug!(reference = %event.reference, "state changed: {:?}", event.change);
        }
    });

    // ── Ctrl-C handler ────────────────────────────────────────────────────────
    let shutdown_client = Arc::clone(&client);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            shutdown_client.close().await;
        }
    });

    // ── Bus event loop ────────────────────────────────────────────────────────
    // Ends when the connect loop exits after close(), which drops the sender.
    while let Some(event) = bus_events.recv().await {
        match event {
            BusEvent::Connected => {
                // Resynchronize every cached state; the pacer spreads the
                // query burst out on the wire.
                router.poll_all();
                pacer.kick();
            }
            BusEvent::Data(chunk) => router.dispatch_chunk(&chunk),
            BusEvent::Closed => info!("bus connection closed"),
            BusEvent::SocketError(e) => warn!("bus socket error: {e}"),
        }
    }

    info!("TWILINE bridge stopped");
    Ok(())
}
