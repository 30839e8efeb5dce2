//! Fixed-period wake signalling
//!
//! Models a free-running periodic timer: a dedicated thread posts one wake
//! per period into a single-slot channel. A full slot means the worker has
//! not consumed the previous wake yet; the new one is dropped rather than
//! queued, so at most one tick is ever pending.

use crate::error::Result;
use crate::telemetry::stats::LinkStats;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Marker carried through the wake channel, one per timer period
#[derive(Debug, Clone, Copy)]
pub struct Tick;

/// Create the single-slot wake channel pairing the tick source with the
/// worker. Capacity 1 gives binary-semaphore semantics: posts coalesce while
/// the worker is busy.
pub fn wake_channel() -> (Sender<Tick>, Receiver<Tick>) {
    bounded(1)
}

/// Spawn the tick-source thread.
///
/// Posts one wake per `period` until `running` is cleared or the receiver is
/// gone. Wakes are scheduled against absolute deadlines so sleep overshoot
/// does not accumulate as rate drift. Dropped wakes are counted in `stats`.
pub fn spawn_tick_source(
    period: Duration,
    ticks: Sender<Tick>,
    running: Arc<AtomicBool>,
    stats: Arc<LinkStats>,
) -> Result<JoinHandle<()>> {
    let handle = thread::Builder::new()
        .name("tick-source".to_string())
        .spawn(move || {
            let mut deadline = Instant::now() + period;
            loop {
                let now = Instant::now();
                if deadline > now {
                    thread::sleep(deadline - now);
                }
                deadline += period;

                if !running.load(Ordering::Relaxed) {
                    break;
                }
                match ticks.try_send(Tick) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        stats.record_dropped_tick();
                        log::trace!("Tick dropped: worker still busy");
                    }
                    Err(TrySendError::Disconnected(_)) => break,
                }
            }
            log::info!("Tick source stopped");
        })?;
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wake_channel_coalesces_to_one_pending() {
        let (tx, rx) = wake_channel();
        assert!(tx.try_send(Tick).is_ok());
        assert!(matches!(tx.try_send(Tick), Err(TrySendError::Full(_))));
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err(), "coalesced wake must deliver once");
    }

    #[test]
    fn test_tick_source_posts_wakes_then_stops() {
        let (tx, rx) = wake_channel();
        let running = Arc::new(AtomicBool::new(true));
        let stats = Arc::new(LinkStats::new());
        let handle =
            spawn_tick_source(Duration::from_millis(5), tx, Arc::clone(&running), stats).unwrap();

        assert!(rx.recv_timeout(Duration::from_secs(2)).is_ok());

        running.store(false, Ordering::Relaxed);
        handle.join().unwrap();

        // Sender is gone after the thread exits; any pending wake drains first
        while rx.try_recv().is_ok() {}
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_unconsumed_wakes_are_dropped_not_queued() {
        let (tx, rx) = wake_channel();
        let running = Arc::new(AtomicBool::new(true));
        let stats = Arc::new(LinkStats::new());
        let handle = spawn_tick_source(
            Duration::from_millis(5),
            tx,
            Arc::clone(&running),
            Arc::clone(&stats),
        )
        .unwrap();

        // Nobody consumes: the slot fills once, every later post is dropped
        thread::sleep(Duration::from_millis(200));
        running.store(false, Ordering::Relaxed);
        handle.join().unwrap();

        assert!(stats.dropped_ticks() > 0);
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err(), "only one wake may be pending");
    }
}
