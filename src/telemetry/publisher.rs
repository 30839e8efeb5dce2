//! Timer-driven publish loop

use crate::telemetry::session::TelemetrySession;
use crate::telemetry::stats::LinkStats;
use crate::tick::Tick;
use crate::waveform::WaveformGenerator;
use crossbeam_channel::Receiver;
use std::sync::Arc;

/// Periodic publisher: one pass per tick, either establishing the session or
/// publishing exactly one waveform sample.
///
/// Owns all mutable pipeline state (session and waveform). Only the worker
/// thread running [`run`](Self::run) ever touches it, so no locking is
/// involved anywhere in the pipeline.
pub struct PeriodicPublisher {
    session: TelemetrySession,
    generator: WaveformGenerator,
    stats: Arc<LinkStats>,
}

impl PeriodicPublisher {
    pub fn new(
        session: TelemetrySession,
        generator: WaveformGenerator,
        stats: Arc<LinkStats>,
    ) -> Self {
        Self {
            session,
            generator,
            stats,
        }
    }

    /// Process one tick.
    ///
    /// While the session is not ready the publish is skipped entirely: no
    /// sample is generated, no send attempted, no loss accounted. The tick
    /// counter advances either way.
    pub fn on_tick(&mut self) {
        if self.session.ensure_ready() {
            let sample = self.generator.next_sample();
            self.session.send(&sample);
        } else {
            log::debug!("Publish skipped: session not ready");
        }
        self.stats.record_tick();
    }

    /// Drive the publish loop from the wake channel.
    ///
    /// Blocks between ticks with no timeout; each received wake processes
    /// exactly one tick. Returns once every sender is gone.
    pub fn run(mut self, ticks: Receiver<Tick>) {
        log::info!("Periodic publisher started");
        for _ in ticks.iter() {
            self.on_tick();
        }
        log::info!("Periodic publisher stopped");
    }
}
