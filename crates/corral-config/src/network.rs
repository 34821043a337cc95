//! Network interfaces and routes configured inside the network namespace.

use serde::{Deserialize, Serialize};

/// Interface type of the loopback device.
pub const LOOPBACK: &str = "loopback";

/// A network interface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    /// Interface strategy, e.g. `loopback`.
    pub kind: String,
    /// Interface name inside the container.
    pub name: String,
    /// CIDR address.
    pub address: String,
    /// Default gateway.
    pub gateway: String,
    /// MTU, zero for the kernel default.
    pub mtu: u32,
}

impl Network {
    /// The loopback interface every fresh network namespace gets.
    #[must_use]
    pub fn loopback() -> Self {
        Self {
            kind: LOOPBACK.into(),
            ..Self::default()
        }
    }
}

/// A route entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Destination CIDR.
    pub destination: String,
    /// Preferred source address.
    pub source: String,
    /// Gateway address.
    pub gateway: String,
    /// Outgoing interface.
    pub interface_name: String,
}
