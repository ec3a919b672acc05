//! TcpClient: owns the TCP session to the TWILINE controller.
//!
//! The socket handle never leaves this module.  Consumers see only the
//! [`BusEvent`] stream plus the `send`/`close` contract, so replacing the
//! socket on reconnect is invisible to them.
//!
//! Failure semantics:
//! - A socket-level error is logged and reported as [`BusEvent::SocketError`]
//!   but does not by itself schedule corrective action; recovery happens via
//!   the close that follows it.
//! - Every close (clean remote close, read failure, failed connect attempt)
//!   schedules exactly one reconnect after a fixed delay.  There is no
//!   backoff growth and no attempt cap; the client retries forever.
//! - [`TcpClient::close`] is the only deliberate teardown; it suppresses the
//!   next reconnect.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex, Notify};
use tokio::time;
use tracing::{debug, error, info, warn};

use super::pacer::WireSink;

/// Size of the read buffer; one bus chunk rarely exceeds a few records.
const READ_BUFFER_SIZE: usize = 4096;

/// Configuration for the bus TCP session.
#[derive(Debug, Clone)]
pub struct TcpClientConfig {
    /// Hostname or IP of the TWILINE controller.
    pub host: String,
    /// TCP port of the controller's socket interface.
    pub port: u16,
    /// Fixed delay between a close and the next connect attempt.
    pub reconnect_delay: Duration,
}

impl Default for TcpClientConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            reconnect_delay: Duration::from_secs(5),
        }
    }
}

/// Lifecycle and data events emitted by the client.
#[derive(Debug)]
pub enum BusEvent {
    /// The TCP session was established.
    Connected,
    /// A raw text chunk arrived.  Chunk boundaries are whatever the socket
    /// delivered; framing happens downstream.
    Data(String),
    /// The session ended, for any reason.  A reconnect is already scheduled
    /// unless [`TcpClient::close`] was called.
    Closed,
    /// A socket-level error occurred.  Transient on its own; the close that
    /// follows drives recovery.
    SocketError(std::io::Error),
}

/// Manages the TCP connection to the TWILINE controller.
pub struct TcpClient {
    config: TcpClientConfig,
    write_half: Mutex<Option<OwnedWriteHalf>>,
    shutdown: AtomicBool,
    shutdown_notify: Notify,
}

impl TcpClient {
    /// Creates a new (not yet connected) client.
    pub fn new(config: TcpClientConfig) -> Self {
        Self {
            config,
            write_half: Mutex::new(None),
            shutdown: AtomicBool::new(false),
            shutdown_notify: Notify::new(),
        }
    }

    /// Starts the connect/read/reconnect loop.
    ///
    /// Returns the receiver for [`BusEvent`]s.  The loop runs until
    /// [`close`](TcpClient::close) is called or the receiver is dropped.
    pub fn start(self: &Arc<Self>) -> mpsc::Receiver<BusEvent> {
        let (tx, rx) = mpsc::channel(128);
        let client = Arc::clone(self);

        tokio::spawn(async move {
            loop {
                if client.shutdown.load(Ordering::Relaxed) {
                    break;
                }

                match TcpStream::connect((client.config.host.as_str(), client.config.port)).await {
                    Ok(stream) => {
                        info!(
                            "connected to {}:{}",
                            client.config.host, client.config.port
                        );
                        let (read_half, write_half) = stream.into_split();
                        {
                            let mut guard = client.write_half.lock().await;
                            *guard = Some(write_half);
                        }
                        if tx.send(BusEvent::Connected).await.is_err() {
                            break;
                        }

                        client.read_loop(read_half, &tx).await;

                        {
                            let mut guard = client.write_half.lock().await;
                            *guard = None;
                        }
                        info!("connection closed");
                        if tx.send(BusEvent::Closed).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(
                            "could not connect to {}:{}: {e}",
                            client.config.host, client.config.port
                        );
                        let _ = tx.send(BusEvent::SocketError(e)).await;
                        if tx.send(BusEvent::Closed).await.is_err() {
                            break;
                        }
                    }
                }

                if client.shutdown.load(Ordering::Relaxed) {
                    break;
                }
                info!(
                    "attempting to reconnect in {:?}",
                    client.config.reconnect_delay
                );
                time::sleep(client.config.reconnect_delay).await;
            }
        });

        rx
    }

    /// Reads chunks from the socket and forwards them on `tx` until the
    /// session ends.
    async fn read_loop(&self, mut reader: OwnedReadHalf, tx: &mpsc::Sender<BusEvent>) {
        let mut buf = vec![0u8; READ_BUFFER_SIZE];
        loop {
            if self.shutdown.load(Ordering::Relaxed) {
                break;
            }
            let result = tokio::select! {
                _ = self.shutdown_notify.notified() => break,
                result = reader.read(&mut buf) => result,
            };
            match result {
                Ok(0) => {
                    debug!("remote side closed the connection");
                    break;
                }
                Ok(n) => {
                    let text = String::from_utf8_lossy(&buf[..n]).into_owned();
                    debug!("received data: {}", text.trim());
                    if tx.send(BusEvent::Data(text)).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    error!("socket error: {e}");
                    let _ = tx.send(BusEvent::SocketError(e)).await;
                    break;
                }
            }
        }
    }

    /// Tears the session down deliberately and suppresses auto-reconnect.
    pub async fn close(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
        // notify_one stores a permit, so the read loop wakes even if it was
        // not parked on the notify yet.
        self.shutdown_notify.notify_one();
        let mut guard = self.write_half.lock().await;
        if let Some(mut write_half) = guard.take() {
            if let Err(e) = write_half.shutdown().await {
                debug!("shutdown on close failed: {e}");
            }
        }
    }
}

#[async_trait]
impl WireSink for TcpClient {
    /// Writes to the live socket.  With no live socket the message is
    /// logged and dropped; the pacer avoids calling in that state, and a
    /// dead socket must never crash the bridge.
    async fn send(&self, message: &str) {
        let mut guard = self.write_half.lock().await;
        match guard.as_mut() {
            Some(write_half) => {
                debug!("write data: {message}");
                if let Err(e) = write_half.write_all(message.as_bytes()).await {
                    error!("failed to write to bus: {e}");
                }
            }
            None => {
                warn!("not connected, dropping write: {message}");
            }
        }
    }

    async fn is_connected(&self) -> bool {
        self.write_half.lock().await.is_some()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
