//! GridPulse daemon
//!
//! Brings the network stack up, then runs two threads for the process
//! lifetime: a tick source posting one wake per 100 ms period into a
//! single-slot channel, and a worker that publishes one telemetry sample per
//! wake. Ctrl-C stops both and logs a summary.

use gridpulse::bringup::{HostNetworkBringup, NetworkBringup};
use gridpulse::config::{LinkConfig, TICK_PERIOD};
use gridpulse::error::{Error, Result};
use gridpulse::telemetry::{LinkStats, PeriodicPublisher, TelemetrySession};
use gridpulse::tick;
use gridpulse::waveform::WaveformGenerator;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("GridPulse v0.1.0 starting...");

    // Without a usable network stack there is nothing to schedule
    let mut bringup = HostNetworkBringup::new();
    if let Err(e) = bringup.bring_up() {
        log::error!("Network bring-up failed: {}", e);
        return Err(e);
    }

    let config = LinkConfig::default();
    log::info!(
        "Telemetry destination {}:{} (local bind port {})",
        config.client_ip,
        config.client_port,
        config.local_port
    );

    let stats = Arc::new(LinkStats::new());
    let session = TelemetrySession::new(config, Arc::clone(&stats));
    let publisher = PeriodicPublisher::new(session, WaveformGenerator::new(), Arc::clone(&stats));

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    let (tick_tx, tick_rx) = tick::wake_channel();

    let worker = thread::Builder::new()
        .name("publisher".to_string())
        .spawn(move || publisher.run(tick_rx))?;

    let tick_source = tick::spawn_tick_source(
        TICK_PERIOD,
        tick_tx,
        Arc::clone(&running),
        Arc::clone(&stats),
    )?;

    // The tick source exits once the running flag clears; dropping its sender
    // disconnects the worker's channel and ends the publish loop.
    if tick_source.join().is_err() {
        log::error!("Tick source thread panicked");
    }
    if worker.join().is_err() {
        log::error!("Publisher thread panicked");
    }

    log::info!(
        "GridPulse stopped: {} ticks, {} lost datagrams, {} dropped ticks",
        stats.ticks(),
        stats.lost_datagrams(),
        stats.dropped_ticks()
    );
    Ok(())
}
