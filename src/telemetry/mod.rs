//! Telemetry pipeline: wire format, session, publisher, diagnostics

pub mod publisher;
pub mod sample;
pub mod session;
pub mod stats;

pub use publisher::PeriodicPublisher;
pub use sample::{Sample, SAMPLE_WIRE_SIZE};
pub use session::TelemetrySession;
pub use stats::LinkStats;
