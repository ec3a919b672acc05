//! Device descriptors and configuration validation.
//!
//! A *reference* is the stable string identifier of one physical device on
//! the TWILINE bus.  The routing table is keyed by reference, so the
//! configured device list must use each reference exactly once.

use thiserror::Error;

/// The accessory kinds the bridge can represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessoryKind {
    /// On/off light.
    Light,
    /// Stateless (momentary) switch.
    Switch,
    /// Scene trigger, on/off shaped.
    Scene,
    /// Motorized covering with an inverted raw position frame.
    Blind,
    /// Motorized window, non-inverted.
    Window,
}

/// One configured device: the routing-table entry before a handler is
/// attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    /// Stable bus identifier, unique across the configuration.
    pub reference: String,
    /// Human-readable display name.
    pub name: String,
    /// Which accessory handler to build for the device.
    pub kind: AccessoryKind,
}

/// Configuration faults detected while validating the device list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceListError {
    /// A device was configured without a reference.
    #[error("device '{name}' has an empty reference")]
    EmptyReference { name: String },

    /// Two devices share the same reference.
    #[error("duplicate device reference '{0}'")]
    DuplicateReference(String),
}

/// Validates that every reference is non-empty and unique.
///
/// # Errors
///
/// Returns the first [`DeviceListError`] found, in configuration order.
pub fn validate_devices(devices: &[DeviceDescriptor]) -> Result<(), DeviceListError> {
    let mut seen = std::collections::HashSet::new();
    for device in devices {
        if device.reference.is_empty() {
            return Err(DeviceListError::EmptyReference {
                name: device.name.clone(),
            });
        }
        if !seen.insert(device.reference.as_str()) {
            return Err(DeviceListError::DuplicateReference(device.reference.clone()));
        }
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
