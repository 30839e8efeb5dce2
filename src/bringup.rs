//! Network stack bring-up
//!
//! The kernel manages the network stack, so bring-up reduces to proving the
//! datagram path is usable before any worker thread exists. Everything the
//! publish loop needs later (bind, send) fails per-tick and is retried; this
//! gate exists so a fundamentally broken stack aborts the process instead.

use crate::error::Result;
use std::net::{Ipv4Addr, UdpSocket};

/// One-shot network readiness gate, run once during process start.
/// A failure is fatal: the caller must not start the publish loop.
pub trait NetworkBringup {
    fn bring_up(&mut self) -> Result<()>;
}

/// Host-side implementation: verifies a datagram socket can be created and
/// bound on the local stack.
#[derive(Debug, Default)]
pub struct HostNetworkBringup;

impl HostNetworkBringup {
    pub fn new() -> Self {
        Self
    }
}

impl NetworkBringup for HostNetworkBringup {
    fn bring_up(&mut self) -> Result<()> {
        let probe = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
        let local = probe.local_addr()?;
        log::info!("Network stack up (probe socket bound on {})", local);
        Ok(())
    }
}
