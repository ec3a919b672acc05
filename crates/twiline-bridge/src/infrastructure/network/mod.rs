//! Network infrastructure: the bus TCP session and the outbound pacer.
//!
//! Architecture:
//! - [`tcp_client::TcpClient`] owns the socket to the TWILINE controller,
//!   keeps it alive across failures, and delivers inbound chunks and
//!   lifecycle changes as [`tcp_client::BusEvent`]s on an `mpsc` channel.
//! - [`pacer::OutboundPacer`] serializes bursts of outbound messages into a
//!   FIFO queue drained one message per pacing interval, because the
//!   physical bus cannot absorb unbounded write bursts.

pub mod pacer;
pub mod tcp_client;

pub use pacer::{OutboundPacer, WireSink};
pub use tcp_client::{BusEvent, TcpClient, TcpClientConfig};
