//! Pure domain logic: device descriptors and position normalization.

pub mod device;
pub mod position;
