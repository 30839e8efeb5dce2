//! GridPulse - periodic three-phase telemetry publisher
//!
//! A fixed 100 ms tick drives a single worker thread that synthesizes one
//! sample of a simulated three-phase voltage system and sends it as a 28-byte
//! UDP datagram to a preconfigured client. Sends whose reported byte count
//! does not match the payload size are counted as lost; session establishment
//! is lazy and retried every tick until it succeeds.
//!
//! The `gridpulse` binary runs the daemon; the companion `pulse_monitor`
//! binary receives and decodes the stream.

pub mod bringup;
pub mod config;
pub mod error;
pub mod telemetry;
pub mod tick;
pub mod waveform;

pub use config::LinkConfig;
pub use error::{Error, Result};
pub use telemetry::{LinkStats, PeriodicPublisher, Sample, TelemetrySession};
pub use waveform::WaveformGenerator;
