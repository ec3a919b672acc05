//! OutboundPacer: single-flight FIFO queue in front of the bus socket.
//!
//! The physical bus cannot absorb unbounded write bursts (querying every
//! accessory's state right after startup would flood it), so all outbound
//! traffic funnels through this queue and is drained one message per pacing
//! interval.
//!
//! Invariants:
//! - `enqueue` is non-blocking and always succeeds, connected or not.
//! - Messages are sent in enqueue order, one at a time, never interleaved.
//! - Nothing is dropped, reordered, or deduplicated; while disconnected the
//!   queue simply accumulates until the next [`OutboundPacer::kick`].
//! - At most one pump task is active at a time.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time;
use tracing::{debug, error};

use twiline_core::{encode_line, TwilineMessage};

use crate::application::MessageWriter;

/// The transport seam the pacer drains into.
///
/// The production implementation is the TCP client; tests substitute a
/// recording sink.
#[async_trait]
pub trait WireSink: Send + Sync {
    /// Writes one serialized message to the transport.
    async fn send(&self, message: &str);

    /// Whether a live session exists.  The pump parks while this is false.
    async fn is_connected(&self) -> bool;
}

/// FIFO queue drained one message per `write_interval`.
pub struct OutboundPacer {
    sink: Arc<dyn WireSink>,
    queue: Arc<Mutex<VecDeque<String>>>,
    pumping: Arc<AtomicBool>,
    write_interval: Duration,
}

impl OutboundPacer {
    /// Default minimum interval between consecutive writes.
    pub const DEFAULT_WRITE_INTERVAL: Duration = Duration::from_millis(50);

    /// Creates a pacer draining into `sink`.
    pub fn new(sink: Arc<dyn WireSink>, write_interval: Duration) -> Self {
        Self {
            sink,
            queue: Arc::new(Mutex::new(VecDeque::new())),
            pumping: Arc::new(AtomicBool::new(false)),
            write_interval,
        }
    }

    /// Appends a serialized message to the queue and ensures a pump is
    /// running.  Never blocks, never fails.
    pub fn enqueue(&self, message: String) {
        self.queue
            .lock()
            .expect("pacer queue lock poisoned")
            .push_back(message);
        self.start_pump();
    }

    /// Restarts the pump if messages accumulated while disconnected.
    /// Called on every `Connected` event.
    pub fn kick(&self) {
        let has_backlog = !self
            .queue
            .lock()
            .expect("pacer queue lock poisoned")
            .is_empty();
        if has_backlog {
            self.start_pump();
        }
    }

    /// Number of messages waiting to be sent.
    pub fn queued(&self) -> usize {
        self.queue.lock().expect("pacer queue lock poisoned").len()
    }

    /// Starts the pump task unless one is already active.
    fn start_pump(&self) {
        if self
            .pumping
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        let sink = Arc::clone(&self.sink);
        let queue = Arc::clone(&self.queue);
        let pumping = Arc::clone(&self.pumping);
        let interval = self.write_interval;

        tokio::spawn(async move {
            loop {
                if !sink.is_connected().await {
                    // Park with the queue intact; kick() resumes draining.
                    pumping.store(false, Ordering::Release);
                    // A kick may have raced the flag clear (the connectivity
                    // read above can be stale); if the connection is back and
                    // work remains, reclaim the flag instead of parking.
                    let backlog = !queue
                        .lock()
                        .expect("pacer queue lock poisoned")
                        .is_empty();
                    if backlog
                        && sink.is_connected().await
                        && pumping
                            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                            .is_ok()
                    {
                        continue;
                    }
                    debug!("pacer parked, not connected");
                    break;
                }

                let next = queue
                    .lock()
                    .expect("pacer queue lock poisoned")
                    .pop_front();
                match next {
                    Some(message) => {
                        sink.send(&message).await;
                        time::sleep(interval).await;
                    }
                    None => {
                        pumping.store(false, Ordering::Release);
                        // An enqueue may have raced the flag clear; if so and
                        // we win the flag back, keep draining.
                        let refilled = !queue
                            .lock()
                            .expect("pacer queue lock poisoned")
                            .is_empty();
                        if refilled
                            && pumping
                                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                                .is_ok()
                        {
                            continue;
                        }
                        break;
                    }
                }
            }
        });
    }
}

impl MessageWriter for OutboundPacer {
    /// Serializes the message and queues it.  An encode failure is a local
    /// bug, not a bus condition; it is logged and the message discarded.
    fn write_message(&self, message: &TwilineMessage) {
        match encode_line(message) {
            Ok(line) => self.enqueue(line),
            Err(e) => error!("failed to encode outbound message: {e}"),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
