//! Compile-time configuration for the GridPulse daemon
//!
//! Destination addressing and the tick period are fixed at build time. The
//! [`LinkConfig`] struct exists so the values are passed explicitly at
//! construction instead of being read from globals; its defaults are the
//! deployment constants below.

use std::time::Duration;

/// Telemetry client IP address (dotted quad)
pub const CLIENT_IP: &str = "192.168.1.2";

/// UDP port used for both the local bind and the client destination
pub const UDP_PORT: u16 = 52000;

/// Fixed timer period driving the publish loop
pub const TICK_PERIOD: Duration = Duration::from_millis(100);

/// Datagram addressing for one telemetry link
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// Destination IP address (dotted quad)
    pub client_ip: String,
    /// Destination UDP port
    pub client_port: u16,
    /// Local bind port on any interface; 0 selects an ephemeral port
    pub local_port: u16,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            client_ip: CLIENT_IP.to_string(),
            client_port: UDP_PORT,
            local_port: UDP_PORT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_link_config_matches_deployment_constants() {
        let config = LinkConfig::default();
        assert_eq!(config.client_ip, CLIENT_IP);
        assert_eq!(config.client_port, UDP_PORT);
        assert_eq!(config.local_port, UDP_PORT);
    }
}
