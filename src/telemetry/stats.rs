//! Process-wide link diagnostics

use std::sync::atomic::{AtomicU32, Ordering};

/// Loss and tick counters shared across threads.
///
/// Every counter is monotonically increasing for the process lifetime and is
/// never reset. Reads are single-word atomic loads, safe from any thread; the
/// counters carry no control-flow meaning and exist purely for diagnostics.
#[derive(Debug, Default)]
pub struct LinkStats {
    lost_datagrams: AtomicU32,
    ticks: AtomicU32,
    dropped_ticks: AtomicU32,
}

impl LinkStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one publish whose reported byte count did not match the payload size
    pub(crate) fn record_loss(&self) {
        self.lost_datagrams.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of datagrams counted as lost since process start
    pub fn lost_datagrams(&self) -> u32 {
        self.lost_datagrams.load(Ordering::Relaxed)
    }

    /// Record one processed tick
    pub(crate) fn record_tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of ticks processed since process start
    pub fn ticks(&self) -> u32 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Record one tick dropped because the worker was still busy
    pub(crate) fn record_dropped_tick(&self) {
        self.dropped_ticks.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of ticks dropped since process start
    pub fn dropped_ticks(&self) -> u32 {
        self.dropped_ticks.load(Ordering::Relaxed)
    }
}
