//! Sentence classification and schema-driven extraction.
//!
//! Only two sentence kinds carry data we consume:
//! - `$GPRMC` (recommended minimum): position
//! - `$GPGSA` (DOP and active satellites): dilution of precision
//!
//! Everything else (GGA, VTG, GSV, GLL, ...) is normal traffic and
//! classifies as [`SentenceKind::Other`] without an error.

use heapless::String;

use crate::coord::{parse_degree_minutes, Coordinate, Hemisphere, LAT_DEGREE_DIGITS, LON_DEGREE_DIGITS};
use crate::error::ParseError;
use crate::token::{tokenize, FieldCursor, FIELD_CAPACITY};

/// Sentence kind, decided by the first field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SentenceKind {
    Rmc,
    Gsa,
    Other,
}

/// Classify a sentence by its talker + type field (exact, case-sensitive).
#[inline]
#[must_use]
pub fn classify(head: &[u8]) -> SentenceKind {
    match head {
        b"$GPRMC" => SentenceKind::Rmc,
        b"$GPGSA" => SentenceKind::Gsa,
        _ => SentenceKind::Other,
    }
}

/// RMC field positions.
mod rmc {
    pub const STATUS: usize = 2;
    pub const LATITUDE: usize = 3;
    pub const LAT_HEMISPHERE: usize = 4;
    pub const LONGITUDE: usize = 5;
    pub const LON_HEMISPHERE: usize = 6;
}

/// GSA field positions.
mod gsa {
    pub const PDOP: usize = 15;
    pub const HDOP: usize = 16;
    pub const VDOP: usize = 17;
}

/// Minimum number of fields a GSA sentence needs to carry all three DOP values.
pub const GSA_MIN_FIELDS: usize = gsa::VDOP + 1;

/// RMC status letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FixStatus {
    /// `A`: the receiver reports a valid fix.
    Active,
    /// `V`: navigation receiver warning.
    Void,
    /// Empty or unrecognised status letter.
    Unknown,
}

impl FixStatus {
    fn from_field(field: &[u8]) -> Self {
        match field {
            b"A" => Self::Active,
            b"V" => Self::Void,
            _ => Self::Unknown,
        }
    }
}

/// Position record extracted from `$GPRMC`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rmc {
    pub status: FixStatus,
    pub latitude: Coordinate,
    pub longitude: Coordinate,
}

/// DOP value copied verbatim from the wire (not validated as a number).
pub type DopValue = String<FIELD_CAPACITY>;

/// Dilution-of-precision record extracted from `$GPGSA`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gsa {
    pub pdop: DopValue,
    pub hdop: DopValue,
    pub vdop: DopValue,
}

#[cfg(feature = "defmt")]
impl defmt::Format for Gsa {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Gsa {{ pdop: {=str}, hdop: {=str}, vdop: {=str} }}",
            self.pdop.as_str(),
            self.hdop.as_str(),
            self.vdop.as_str()
        );
    }
}

/// A classified sentence with its extracted record.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Sentence {
    Rmc(Rmc),
    Gsa(Gsa),
    /// Any other sentence; intentionally not consumed.
    Other,
}

impl Sentence {
    #[inline]
    #[must_use]
    pub fn kind(&self) -> SentenceKind {
        match self {
            Self::Rmc(_) => SentenceKind::Rmc,
            Self::Gsa(_) => SentenceKind::Gsa,
            Self::Other => SentenceKind::Other,
        }
    }
}

/// Tokenize, classify and extract one complete line.
///
/// Unrecognised sentences return `Ok(Sentence::Other)` after looking at the
/// first field only, so their length and field count are never checked.
/// Tokenizer overflow and missing or malformed fields in RMC/GSA are
/// returned as errors.
///
/// # Example
///
/// ```
/// use nmea_proto::{parse_sentence, Sentence};
///
/// let line = b"$GPRMC,101902.00,A,2951.91860,N,07752.38737,E,0.032,,300322,,,A*7C";
/// let Ok(Sentence::Rmc(rmc)) = parse_sentence(line) else { panic!() };
/// assert_eq!(rmc.latitude.magnitude, 29.0 + 51.91860 / 60.0);
/// ```
pub fn parse_sentence(line: &[u8]) -> Result<Sentence, ParseError> {
    // A head too long for a field cannot be one of ours either.
    let head = match tokenize(line).next() {
        Some(Ok(head)) => head,
        _ => return Ok(Sentence::Other),
    };

    match classify(head) {
        SentenceKind::Rmc => parse_rmc(&FieldCursor::new(line)?).map(Sentence::Rmc),
        SentenceKind::Gsa => parse_gsa(&FieldCursor::new(line)?).map(Sentence::Gsa),
        SentenceKind::Other => Ok(Sentence::Other),
    }
}

fn parse_rmc(fields: &FieldCursor<'_>) -> Result<Rmc, ParseError> {
    let status = FixStatus::from_field(fields.field(rmc::STATUS)?);

    let latitude = Coordinate {
        magnitude: parse_degree_minutes(fields.field(rmc::LATITUDE)?, LAT_DEGREE_DIGITS)?,
        hemisphere: Hemisphere::latitude(fields.field(rmc::LAT_HEMISPHERE)?)?,
    };
    let longitude = Coordinate {
        magnitude: parse_degree_minutes(fields.field(rmc::LONGITUDE)?, LON_DEGREE_DIGITS)?,
        hemisphere: Hemisphere::longitude(fields.field(rmc::LON_HEMISPHERE)?)?,
    };

    Ok(Rmc {
        status,
        latitude,
        longitude,
    })
}

fn parse_gsa(fields: &FieldCursor<'_>) -> Result<Gsa, ParseError> {
    if fields.len() < GSA_MIN_FIELDS {
        return Err(ParseError::MalformedField);
    }

    Ok(Gsa {
        pdop: dop_value(fields.field(gsa::PDOP)?)?,
        hdop: dop_value(fields.field(gsa::HDOP)?)?,
        vdop: dop_value(fields.field(gsa::VDOP)?)?,
    })
}

fn dop_value(field: &[u8]) -> Result<DopValue, ParseError> {
    let text = core::str::from_utf8(field).map_err(|_| ParseError::MalformedField)?;
    let mut value = DopValue::new();
    value
        .push_str(text)
        .map_err(|_| ParseError::FieldOverflow)?;
    Ok(value)
}
