//! Wire-format telemetry record

/// Exact UDP payload length of one encoded [`Sample`]
pub const SAMPLE_WIRE_SIZE: usize = 28;

/// One instant of simulated three-phase telemetry.
///
/// Field order is the wire order. All values are 32-bit floats; the encoded
/// form is packed with no padding in the sender's native byte order, so both
/// ends of the link must share endianness.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct Sample {
    /// Simulation time in seconds, monotonically increasing
    pub cnt: f32,
    /// Phase-to-neutral voltage, phase a
    pub una: f32,
    /// Phase-to-neutral voltage, phase b
    pub unb: f32,
    /// Phase-to-neutral voltage, phase c
    pub unc: f32,
    /// Phase-to-phase voltage a-b
    pub uab: f32,
    /// Phase-to-phase voltage b-c
    pub ubc: f32,
    /// Phase-to-phase voltage c-a
    pub uca: f32,
}

const _: () = assert!(std::mem::size_of::<Sample>() == SAMPLE_WIRE_SIZE);

impl Sample {
    /// Encode into the fixed 28-byte datagram payload
    pub fn to_bytes(&self) -> [u8; SAMPLE_WIRE_SIZE] {
        let mut buf = [0u8; SAMPLE_WIRE_SIZE];
        buf[0..4].copy_from_slice(&self.cnt.to_ne_bytes());
        buf[4..8].copy_from_slice(&self.una.to_ne_bytes());
        buf[8..12].copy_from_slice(&self.unb.to_ne_bytes());
        buf[12..16].copy_from_slice(&self.unc.to_ne_bytes());
        buf[16..20].copy_from_slice(&self.uab.to_ne_bytes());
        buf[20..24].copy_from_slice(&self.ubc.to_ne_bytes());
        buf[24..28].copy_from_slice(&self.uca.to_ne_bytes());
        buf
    }

    /// Decode a received 28-byte payload
    pub fn from_bytes(buf: &[u8; SAMPLE_WIRE_SIZE]) -> Self {
        Self {
            cnt: read_f32(buf, 0),
            una: read_f32(buf, 4),
            unb: read_f32(buf, 8),
            unc: read_f32(buf, 12),
            uab: read_f32(buf, 16),
            ubc: read_f32(buf, 20),
            uca: read_f32(buf, 24),
        }
    }
}

fn read_f32(buf: &[u8; SAMPLE_WIRE_SIZE], at: usize) -> f32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&buf[at..at + 4]);
    f32::from_ne_bytes(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_struct_layout_matches_payload_size() {
        assert_eq!(std::mem::size_of::<Sample>(), SAMPLE_WIRE_SIZE);
    }

    #[test]
    fn test_fields_are_encoded_in_wire_order() {
        let sample = Sample {
            cnt: 1.0,
            una: 2.0,
            unb: 3.0,
            unc: 4.0,
            uab: 5.0,
            ubc: 6.0,
            uca: 7.0,
        };
        let bytes = sample.to_bytes();
        assert_eq!(&bytes[0..4], &1.0f32.to_ne_bytes());
        assert_eq!(&bytes[4..8], &2.0f32.to_ne_bytes());
        assert_eq!(&bytes[8..12], &3.0f32.to_ne_bytes());
        assert_eq!(&bytes[12..16], &4.0f32.to_ne_bytes());
        assert_eq!(&bytes[16..20], &5.0f32.to_ne_bytes());
        assert_eq!(&bytes[20..24], &6.0f32.to_ne_bytes());
        assert_eq!(&bytes[24..28], &7.0f32.to_ne_bytes());
    }

    #[test]
    fn test_decode_recovers_encoded_sample() {
        let sample = Sample {
            cnt: 0.1,
            una: 0.0,
            unb: -199.186,
            unc: 199.186,
            uab: 199.186,
            ubc: -398.372,
            uca: 199.186,
        };
        assert_eq!(Sample::from_bytes(&sample.to_bytes()), sample);
    }
}
