//! Receive-side monitor for the GridPulse telemetry stream.
//!
//! Binds the telemetry port, decodes each 28-byte frame, and reports gaps in
//! the stream's time counter. With `--csv` the decoded frames are also
//! persisted to a CSV file. Intended to run on the client host.
//!
//! # Usage
//!
//! ```bash
//! pulse_monitor                     # listen on the default telemetry port
//! pulse_monitor 49200               # listen on port 49200
//! pulse_monitor --csv frames.csv    # log decoded frames to a CSV file
//! ```

use gridpulse::config::UDP_PORT;
use gridpulse::error::{Error, Result};
use gridpulse::telemetry::{Sample, SAMPLE_WIRE_SIZE};
use gridpulse::waveform::DELTA_T;
use std::env;
use std::fs::File;
use std::io::{BufWriter, ErrorKind, Write};
use std::net::{Ipv4Addr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// CSV column header, one column per wire field
const CSV_HEADER: &str = "t,uA,uB,uC,uAB,uBC,uCA";

struct MonitorConfig {
    port: u16,
    csv_path: Option<String>,
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let config = match parse_args(&args) {
        Ok(config) => config,
        Err(msg) => {
            if msg.is_empty() {
                print_usage(&args[0]);
                std::process::exit(0);
            }
            eprintln!("Error: {}", msg);
            print_usage(&args[0]);
            std::process::exit(1);
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(config) {
        log::error!("Monitor failed: {}", e);
        std::process::exit(1);
    }
}

/// An empty error message requests the usage text (help flag).
fn parse_args(args: &[String]) -> std::result::Result<MonitorConfig, String> {
    let mut port = None;
    let mut csv_path = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => return Err(String::new()),
            "--csv" | "-o" => {
                i += 1;
                let path = args
                    .get(i)
                    .ok_or_else(|| format!("{} requires a file path", args[i - 1]))?;
                csv_path = Some(path.clone());
            }
            value if !value.starts_with('-') => {
                if port.is_some() {
                    return Err(format!("Unexpected argument: {}", value));
                }
                port = Some(
                    value
                        .parse::<u16>()
                        .map_err(|_| format!("Invalid port: {}", value))?,
                );
            }
            other => return Err(format!("Unknown option: {}", other)),
        }
        i += 1;
    }

    Ok(MonitorConfig {
        port: port.unwrap_or(UDP_PORT),
        csv_path,
    })
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} [port] [--csv <file>]", program);
    eprintln!();
    eprintln!(
        "Listens for GridPulse telemetry frames (default port {}).",
        UDP_PORT
    );
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -o, --csv <file>   Append decoded frames to a CSV file");
    eprintln!("  -h, --help         Show this help message");
}

/// Outcome of accounting for one received datagram
enum FrameOutcome {
    /// Payload length was not the wire size; the datagram is discarded
    Malformed,
    /// Payload decoded; `missing_periods` is set when the time counter
    /// jumped by more than one step since the previous frame
    Decoded {
        sample: Sample,
        missing_periods: Option<u32>,
    },
}

/// Per-stream frame accounting, independent of socket I/O.
///
/// Tracks totals and the previous frame's time counter so gap detection
/// needs nothing beyond the raw payloads in arrival order.
struct StreamAccounting {
    frames: u64,
    malformed: u64,
    gaps: u64,
    prev_cnt: Option<f32>,
}

impl StreamAccounting {
    fn new() -> Self {
        Self {
            frames: 0,
            malformed: 0,
            gaps: 0,
            prev_cnt: None,
        }
    }

    /// Account for one datagram payload.
    ///
    /// A jump in the time counter larger than one step (with 10% slack for
    /// float accumulation) means frames never arrived; the gap is reported
    /// as whole sample periods.
    fn record(&mut self, payload: &[u8]) -> FrameOutcome {
        if payload.len() != SAMPLE_WIRE_SIZE {
            self.malformed += 1;
            return FrameOutcome::Malformed;
        }

        let mut buf = [0u8; SAMPLE_WIRE_SIZE];
        buf.copy_from_slice(payload);
        let sample = Sample::from_bytes(&buf);
        self.frames += 1;

        let missing_periods = self.prev_cnt.and_then(|prev| {
            let diff = sample.cnt - prev;
            if diff > 1.1 * DELTA_T {
                Some((diff / DELTA_T).round() as u32)
            } else {
                None
            }
        });
        if missing_periods.is_some() {
            self.gaps += 1;
        }
        self.prev_cnt = Some(sample.cnt);

        FrameOutcome::Decoded {
            sample,
            missing_periods,
        }
    }
}

/// Format one float for the CSV file: at most three decimals, no trailing
/// zeros, matching the stream's native resolution.
fn csv_field(value: f32) -> String {
    let rounded = (f64::from(value) * 1000.0).round() / 1000.0;
    format!("{}", rounded)
}

fn csv_row(sample: &Sample) -> String {
    format!(
        "{},{},{},{},{},{},{}",
        csv_field(sample.cnt),
        csv_field(sample.una),
        csv_field(sample.unb),
        csv_field(sample.unc),
        csv_field(sample.uab),
        csv_field(sample.ubc),
        csv_field(sample.uca)
    )
}

fn open_csv(path: &str) -> Result<BufWriter<File>> {
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "{}", CSV_HEADER)?;
    Ok(writer)
}

fn run(config: MonitorConfig) -> Result<()> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, config.port))?;
    socket.set_read_timeout(Some(Duration::from_millis(200)))?;
    log::info!("Listening for telemetry on {}", socket.local_addr()?);

    let mut csv = match &config.csv_path {
        Some(path) => {
            let writer = open_csv(path)?;
            log::info!("Logging decoded frames to {}", path);
            Some(writer)
        }
        None => None,
    };

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || r.store(false, Ordering::Relaxed))
        .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    let mut buf = [0u8; 64];
    let mut accounting = StreamAccounting::new();

    while running.load(Ordering::Relaxed) {
        let (len, from) = match socket.recv_from(&mut buf) {
            Ok(received) => received,
            Err(e) if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut => {
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        match accounting.record(&buf[..len]) {
            FrameOutcome::Malformed => {
                log::warn!(
                    "Unexpected datagram size {} from {} (want {})",
                    len,
                    from,
                    SAMPLE_WIRE_SIZE
                );
            }
            FrameOutcome::Decoded {
                sample,
                missing_periods,
            } => {
                if let Some(missing) = missing_periods {
                    log::warn!(
                        "Gap in stream: {} sample periods missing before t={:.1}s",
                        missing,
                        sample.cnt
                    );
                }
                log::info!(
                    "t={:8.1}s  una={:+8.2} unb={:+8.2} unc={:+8.2}  uab={:+8.2} ubc={:+8.2} uca={:+8.2}",
                    sample.cnt,
                    sample.una,
                    sample.unb,
                    sample.unc,
                    sample.uab,
                    sample.ubc,
                    sample.uca
                );
                if let Some(writer) = csv.as_mut() {
                    writeln!(writer, "{}", csv_row(&sample))?;
                }
            }
        }
    }

    if let Some(writer) = csv.as_mut() {
        writer.flush()?;
    }
    log::info!(
        "Monitor stopped: {} frames, {} malformed datagrams, {} gaps",
        accounting.frames,
        accounting.malformed,
        accounting.gaps
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(cnt: f32) -> Vec<u8> {
        let sample = Sample {
            cnt,
            una: 0.0,
            unb: -199.186,
            unc: 199.186,
            uab: 199.186,
            ubc: -398.372,
            uca: 199.186,
        };
        sample.to_bytes().to_vec()
    }

    #[test]
    fn test_first_frame_decodes_without_gap() {
        let mut accounting = StreamAccounting::new();
        match accounting.record(&frame(0.1)) {
            FrameOutcome::Decoded {
                missing_periods, ..
            } => assert_eq!(missing_periods, None),
            FrameOutcome::Malformed => panic!("valid frame must decode"),
        }
        assert_eq!(accounting.frames, 1);
        assert_eq!(accounting.gaps, 0);
    }

    #[test]
    fn test_consecutive_frames_below_threshold_report_no_gap() {
        let mut accounting = StreamAccounting::new();
        accounting.record(&frame(0.1));
        // diff of exactly one step stays under the 1.1x slack
        match accounting.record(&frame(0.2)) {
            FrameOutcome::Decoded {
                missing_periods, ..
            } => assert_eq!(missing_periods, None),
            FrameOutcome::Malformed => panic!("valid frame must decode"),
        }
        assert_eq!(accounting.gaps, 0);
    }

    #[test]
    fn test_jump_above_threshold_rounds_to_whole_periods() {
        let mut accounting = StreamAccounting::new();
        accounting.record(&frame(0.1));
        // diff 0.31 / 0.1 = 3.1 rounds to 3 missing periods
        match accounting.record(&frame(0.41)) {
            FrameOutcome::Decoded {
                missing_periods, ..
            } => assert_eq!(missing_periods, Some(3)),
            FrameOutcome::Malformed => panic!("valid frame must decode"),
        }
        assert_eq!(accounting.gaps, 1);
    }

    #[test]
    fn test_double_step_jump_reports_two_periods() {
        let mut accounting = StreamAccounting::new();
        accounting.record(&frame(0.1));
        // diff 0.2 clears the 0.11 threshold
        match accounting.record(&frame(0.3)) {
            FrameOutcome::Decoded {
                missing_periods, ..
            } => assert_eq!(missing_periods, Some(2)),
            FrameOutcome::Malformed => panic!("valid frame must decode"),
        }
    }

    #[test]
    fn test_wrong_length_counts_malformed_without_decoding() {
        let mut accounting = StreamAccounting::new();
        assert!(matches!(
            accounting.record(&[0u8; 27]),
            FrameOutcome::Malformed
        ));
        assert!(matches!(
            accounting.record(&[0u8; 29]),
            FrameOutcome::Malformed
        ));
        assert_eq!(accounting.malformed, 2);
        assert_eq!(accounting.frames, 0);
        // Malformed datagrams must not feed the gap detector
        accounting.record(&frame(5.0));
        assert_eq!(accounting.gaps, 0);
    }

    #[test]
    fn test_csv_row_uses_at_most_three_decimals() {
        let sample = Sample {
            cnt: 0.1,
            una: 0.0,
            unb: -199.1863,
            unc: 199.1863,
            uab: 199.1863,
            ubc: -398.3726,
            uca: 199.1863,
        };
        assert_eq!(
            csv_row(&sample),
            "0.1,0,-199.186,199.186,199.186,-398.373,199.186"
        );
    }

    #[test]
    fn test_parse_args_accepts_port_and_csv_path() {
        let args: Vec<String> = ["pulse_monitor", "49200", "--csv", "frames.csv"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let config = parse_args(&args).unwrap();
        assert_eq!(config.port, 49200);
        assert_eq!(config.csv_path.as_deref(), Some("frames.csv"));
    }

    #[test]
    fn test_parse_args_rejects_missing_csv_path() {
        let args: Vec<String> = ["pulse_monitor", "--csv"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert!(parse_args(&args).is_err());
    }
}
