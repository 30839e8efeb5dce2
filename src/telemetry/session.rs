//! Lazily established UDP telemetry session

use crate::config::LinkConfig;
use crate::error::{Error, Result};
use crate::telemetry::sample::Sample;
use crate::telemetry::stats::LinkStats;
use std::io;
use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::sync::Arc;

/// Session lifecycle. `Ready` is terminal for the process lifetime; a failed
/// establishment attempt stays `Uninitialized` and is retried on the next
/// tick.
#[derive(Debug)]
enum SessionState {
    Uninitialized,
    Ready { socket: UdpSocket, dest: SocketAddr },
}

/// One-shot datagram session from the local bind port to the fixed client.
///
/// Establishment is lazy: nothing is created until the first
/// [`ensure_ready`](Self::ensure_ready) call, and the tick on which
/// establishment succeeds still reports not-ready, so the first datagram goes
/// out one tick later.
#[derive(Debug)]
pub struct TelemetrySession {
    config: LinkConfig,
    state: SessionState,
    stats: Arc<LinkStats>,
}

impl TelemetrySession {
    pub fn new(config: LinkConfig, stats: Arc<LinkStats>) -> Self {
        Self {
            config,
            state: SessionState::Uninitialized,
            stats,
        }
    }

    /// Whether the session has been established
    pub fn is_ready(&self) -> bool {
        matches!(self.state, SessionState::Ready { .. })
    }

    /// Make sure the session is established, reporting whether a publish may
    /// proceed on this tick.
    ///
    /// Returns `true` only when the session was already `Ready`. While
    /// `Uninitialized`, one establishment attempt is made: on success the
    /// session is `Ready` for subsequent ticks, on failure the state is
    /// unchanged and the attempt repeats on the next call. Either way the
    /// current tick skips its publish. There is no backoff and no attempt
    /// limit.
    pub fn ensure_ready(&mut self) -> bool {
        if self.is_ready() {
            return true;
        }
        match establish(&self.config) {
            Ok((socket, dest)) => {
                log::info!(
                    "Telemetry session ready: {} -> {}",
                    local_addr_display(&socket),
                    dest
                );
                self.state = SessionState::Ready { socket, dest };
            }
            Err(e) => {
                log::warn!("Telemetry session setup failed: {} (retrying next tick)", e);
            }
        }
        false
    }

    /// Send one sample to the client.
    ///
    /// Requires an established session. A send failure or short send counts
    /// as exactly one loss and is logged with the platform error; the session
    /// itself stays `Ready`, so the next tick sends normally.
    pub fn send(&mut self, sample: &Sample) {
        let SessionState::Ready { socket, dest } = &self.state else {
            log::error!("Send attempted without an established session");
            return;
        };

        let payload = sample.to_bytes();
        let result = socket.send_to(&payload, *dest);
        match &result {
            Ok(n) if *n == payload.len() => {
                log::trace!("Sent sample t={:.1}s to {}", sample.cnt, dest);
            }
            Ok(n) => {
                log::warn!("Short send: {} of {} bytes to {}", n, payload.len(), dest);
            }
            Err(e) => {
                log::warn!("Sending telemetry datagram failed: {}", e);
            }
        }
        if loss_occurred(&result, payload.len()) {
            self.stats.record_loss();
        }
    }
}

/// Establishment steps, in order: create and bind the socket on the fixed
/// local port, apply the no-gateway delivery hint, validate the client
/// address. Any failing step aborts the whole attempt.
fn establish(config: &LinkConfig) -> Result<(UdpSocket, SocketAddr)> {
    let socket = UdpSocket::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.local_port)))?;
    set_dontroute(&socket)?;
    let client_ip: Ipv4Addr = config
        .client_ip
        .parse()
        .map_err(|source| Error::InvalidClientAddress {
            addr: config.client_ip.clone(),
            source,
        })?;
    Ok((socket, SocketAddr::from((client_ip, config.client_port))))
}

/// A loss is any send whose reported byte count differs from the payload
/// size, including outright failure.
fn loss_occurred(result: &io::Result<usize>, expected: usize) -> bool {
    match result {
        Ok(n) => *n != expected,
        Err(_) => true,
    }
}

/// Restrict delivery to directly attached subnets, never via a gateway.
/// The standard library does not expose this option, so it is set through
/// libc on Unix targets and unavailable elsewhere.
fn set_dontroute(socket: &UdpSocket) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::io::AsRawFd;

        let on: libc::c_int = 1;
        let rc = unsafe {
            libc::setsockopt(
                socket.as_raw_fd(),
                libc::SOL_SOCKET,
                libc::SO_DONTROUTE,
                &on as *const libc::c_int as *const libc::c_void,
                std::mem::size_of::<libc::c_int>() as libc::socklen_t,
            )
        };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
    }
    #[cfg(not(unix))]
    let _ = socket;
    Ok(())
}

fn local_addr_display(socket: &UdpSocket) -> String {
    socket
        .local_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| "?".to_string())
}
