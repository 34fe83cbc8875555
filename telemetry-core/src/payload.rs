//! Telemetry payload serialization.
//!
//! # Format
//!
//! ```text
//! {"latitude":<f>,"longitude":<f>,"PDOP":"<s>","HDOP":"<s>","VDOP":"<s>"}<SUB>
//! ```
//!
//! Coordinates use 8 decimal places. DOP values are the strings stored in
//! [`FixState`], quoted and JSON-escaped. The modem framing requires the
//! trailing ASCII SUB byte ([`PAYLOAD_TERMINATOR`]).

use core::fmt::{self, Write};

use heapless::Vec;

use crate::fix::FixState;

/// Ends every payload (ASCII SUB, Ctrl-Z).
pub const PAYLOAD_TERMINATOR: u8 = 0x1A;

/// Capacity of a built payload, terminator included.
pub const MAX_PAYLOAD_SIZE: usize = 200;

/// A complete payload ready for the transport.
pub type Payload = Vec<u8, MAX_PAYLOAD_SIZE>;

/// Error type for payload building.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PayloadError {
    /// The serialized state does not fit in [`MAX_PAYLOAD_SIZE`].
    BufferTooSmall,
}

impl fmt::Display for PayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BufferTooSmall => write!(f, "buffer too small"),
        }
    }
}

/// Write the payload text (without terminator) to any `core::fmt::Write`.
///
/// # Errors
///
/// Propagates the writer's error.
pub fn write_payload<W: Write>(fix: &FixState, writer: &mut W) -> fmt::Result {
    write!(
        writer,
        "{{\"latitude\":{:.8},\"longitude\":{:.8},\"PDOP\":",
        fix.latitude, fix.longitude
    )?;
    write_quoted(writer, &fix.pdop)?;
    writer.write_str(",\"HDOP\":")?;
    write_quoted(writer, &fix.hdop)?;
    writer.write_str(",\"VDOP\":")?;
    write_quoted(writer, &fix.vdop)?;
    writer.write_char('}')
}

/// Build the terminated payload for `fix`.
///
/// Pure: the same state always yields the same bytes.
///
/// # Errors
///
/// Returns [`PayloadError::BufferTooSmall`] if the result exceeds
/// [`MAX_PAYLOAD_SIZE`].
///
/// # Example
///
/// ```
/// use telemetry_core::{build_payload, FixState, PAYLOAD_TERMINATOR};
///
/// let payload = build_payload(&FixState::new()).unwrap();
/// assert_eq!(payload.last(), Some(&PAYLOAD_TERMINATOR));
/// ```
pub fn build_payload(fix: &FixState) -> Result<Payload, PayloadError> {
    let mut payload = Payload::new();
    write_payload(fix, &mut PayloadBuf(&mut payload)).map_err(|_| PayloadError::BufferTooSmall)?;
    payload
        .push(PAYLOAD_TERMINATOR)
        .map_err(|_| PayloadError::BufferTooSmall)?;
    Ok(payload)
}

/// `fmt::Write` adapter over the payload byte buffer.
struct PayloadBuf<'a>(&'a mut Payload);

impl Write for PayloadBuf<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.extend_from_slice(s.as_bytes()).map_err(|_| fmt::Error)
    }
}

fn write_quoted<W: Write>(writer: &mut W, value: &str) -> fmt::Result {
    writer.write_char('"')?;
    for c in value.chars() {
        match c {
            '"' => writer.write_str("\\\"")?,
            '\\' => writer.write_str("\\\\")?,
            c if c.is_control() => write!(writer, "\\u{:04x}", u32::from(c))?,
            c => writer.write_char(c)?,
        }
    }
    writer.write_char('"')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HemispherePolicy;
    use nmea_proto::{parse_sentence, DopValue};

    fn dop(s: &str) -> DopValue {
        let mut value = DopValue::new();
        value.push_str(s).unwrap();
        value
    }

    fn sample_fix() -> FixState {
        let mut fix = FixState::new();
        for line in [
            &b"$GPRMC,101902.00,A,2951.91860,N,07752.38737,E,0.032,,300322,,,A*7C"[..],
            &b"$GPGSA,A,3,06,02,19,24,17,,,,,,,,4.73,3.95,2.60*05"[..],
        ] {
            fix.apply(parse_sentence(line).unwrap(), HemispherePolicy::Signed);
        }
        fix
    }

    #[test]
    fn test_reference_payload() {
        let payload = build_payload(&sample_fix()).unwrap();
        let expected = b"{\"latitude\":29.86531000,\"longitude\":77.87312283,\
\"PDOP\":\"4.73\",\"HDOP\":\"3.95\",\"VDOP\":\"2.60\"}\x1a";
        assert_eq!(payload.as_slice(), &expected[..]);
    }

    #[test]
    fn test_empty_state_payload() {
        let payload = build_payload(&FixState::new()).unwrap();
        let expected = b"{\"latitude\":0.00000000,\"longitude\":0.00000000,\
\"PDOP\":\"\",\"HDOP\":\"\",\"VDOP\":\"\"}\x1a";
        assert_eq!(payload.as_slice(), &expected[..]);
    }

    #[test]
    fn test_build_is_idempotent() {
        let fix = sample_fix();
        let first = build_payload(&fix).unwrap();
        let second = build_payload(&fix).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_negative_coordinates() {
        let mut fix = FixState::new();
        fix.latitude = -48.1173;
        fix.longitude = -11.516666666666667;
        let mut text = std::string::String::new();
        write_payload(&fix, &mut text).unwrap();
        assert!(text.starts_with("{\"latitude\":-48.11730000,\"longitude\":-11.51666667,"));
    }

    #[test]
    fn test_dop_values_are_escaped() {
        let mut fix = FixState::new();
        fix.pdop = dop("1\"2");
        fix.hdop = dop("a\\b");
        fix.vdop = dop("\t");
        let mut text = std::string::String::new();
        write_payload(&fix, &mut text).unwrap();
        assert!(text.ends_with(r#""PDOP":"1\"2","HDOP":"a\\b","VDOP":"\u0009"}"#));
    }

    #[test]
    fn test_terminator_appears_once() {
        let payload = build_payload(&sample_fix()).unwrap();
        let count = payload.iter().filter(|&&b| b == PAYLOAD_TERMINATOR).count();
        assert_eq!(count, 1);
        assert_eq!(payload.last(), Some(&PAYLOAD_TERMINATOR));
    }

    #[test]
    fn test_oversized_payload_rejected() {
        let mut fix = FixState::new();
        let controls = "\u{1}\u{1}\u{1}\u{1}\u{1}\u{1}\u{1}\u{1}\u{1}\u{1}\u{1}\u{1}";
        fix.pdop = dop(controls);
        fix.hdop = dop(controls);
        fix.vdop = dop(controls);
        assert_eq!(build_payload(&fix), Err(PayloadError::BufferTooSmall));
    }
}
