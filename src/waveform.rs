//! Balanced three-phase waveform synthesis
//!
//! Pure numeric simulation of a symmetric three-phase voltage system. One
//! sample is produced per call with no allocation and no failure mode, so the
//! publish loop can treat generation as infallible.

use crate::telemetry::Sample;
use std::f32::consts::PI;

/// Nominal network voltage amplitude in volts
pub const U_NET: f32 = 230.0;

/// Network frequency in hertz
pub const F_NET: f32 = 0.1;

/// Simulation time step in seconds, matching the 100 ms tick period
pub const DELTA_T: f32 = 0.1;

const TWO_PI: f32 = 2.0 * PI;

/// Reference angle advance per tick
const ANGULAR_STEP: f32 = TWO_PI * F_NET * DELTA_T;

const PHASE_B_OFFSET: f32 = 2.0 * PI / 3.0;
const PHASE_C_OFFSET: f32 = 4.0 * PI / 3.0;

/// Deterministic generator for a balanced three-phase voltage system.
///
/// Each [`next_sample`](Self::next_sample) call advances the simulation by one
/// [`DELTA_T`] step. The phase angle is driven by a tick index that wraps
/// every electrical period, so the argument fed to the trig functions stays
/// bounded even though the reported simulation time grows without limit.
#[derive(Debug)]
pub struct WaveformGenerator {
    simulated_time: f32,
    tick_index: u32,
    period_count: u32,
}

impl WaveformGenerator {
    /// Create a generator at simulation time zero
    pub fn new() -> Self {
        Self {
            simulated_time: 0.0,
            tick_index: 0,
            // Ticks per electrical period, rounded to the nearest integer
            period_count: (1.0 / (F_NET * DELTA_T) + 0.5) as u32,
        }
    }

    /// Produce the next sample and advance the waveform state
    pub fn next_sample(&mut self) -> Sample {
        self.simulated_time += DELTA_T;

        let phi = ANGULAR_STEP * self.tick_index as f32;
        self.tick_index += 1;
        if self.tick_index >= self.period_count {
            self.tick_index = 0;
        }

        let una = U_NET * wrap_angle(phi).sin();
        let unb = U_NET * wrap_angle(phi - PHASE_B_OFFSET).sin();
        let unc = U_NET * wrap_angle(phi - PHASE_C_OFFSET).sin();

        Sample {
            cnt: self.simulated_time,
            una,
            unb,
            unc,
            uab: una - unb,
            ubc: unb - unc,
            uca: unc - una,
        }
    }

    /// Current position within the electrical period
    pub fn tick_index(&self) -> u32 {
        self.tick_index
    }

    /// Number of ticks in one electrical period
    pub fn period_count(&self) -> u32 {
        self.period_count
    }
}

impl Default for WaveformGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize an angle into `[0, 2π]` by at most one correction.
///
/// Inputs drift by less than one period per call, so a single conditional
/// add/subtract is sufficient; a general modulo is deliberately avoided.
fn wrap_angle(angle: f32) -> f32 {
    if angle > TWO_PI {
        angle - TWO_PI
    } else if angle < 0.0 {
        angle + TWO_PI
    } else {
        angle
    }
}
