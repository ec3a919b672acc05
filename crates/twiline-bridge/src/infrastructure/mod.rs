//! Infrastructure layer: the TCP transport and configuration storage.

pub mod network;
pub mod storage;
