//! Degree-minute coordinates.
//!
//! NMEA carries latitude as `DDMM.MMMM` and longitude as `DDDMM.MMMM`, with
//! the hemisphere in a separate letter field. The conversion here is the
//! plain `degrees + minutes / 60.0`; applying the hemisphere sign is left to
//! the caller via [`Coordinate::signed`].

use crate::error::ParseError;

/// Width of the degree prefix in a latitude field.
pub const LAT_DEGREE_DIGITS: usize = 2;

/// Width of the degree prefix in a longitude field.
pub const LON_DEGREE_DIGITS: usize = 3;

/// Hemisphere letter of a coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Hemisphere {
    North,
    South,
    East,
    West,
}

impl Hemisphere {
    /// Parse a latitude hemisphere (`N` or `S`).
    pub fn latitude(field: &[u8]) -> Result<Self, ParseError> {
        match field {
            b"N" => Ok(Self::North),
            b"S" => Ok(Self::South),
            _ => Err(ParseError::MalformedField),
        }
    }

    /// Parse a longitude hemisphere (`E` or `W`).
    pub fn longitude(field: &[u8]) -> Result<Self, ParseError> {
        match field {
            b"E" => Ok(Self::East),
            b"W" => Ok(Self::West),
            _ => Err(ParseError::MalformedField),
        }
    }

    /// `-1.0` for South and West, `1.0` otherwise.
    #[inline]
    #[must_use]
    pub const fn sign(self) -> f64 {
        match self {
            Self::North | Self::East => 1.0,
            Self::South | Self::West => -1.0,
        }
    }
}

/// An unsigned decimal-degree value together with its hemisphere.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Coordinate {
    /// Decimal degrees as written on the wire, always non-negative.
    pub magnitude: f64,
    pub hemisphere: Hemisphere,
}

impl Coordinate {
    /// Decimal degrees with the hemisphere sign applied (South/West negative).
    #[inline]
    #[must_use]
    pub fn signed(&self) -> f64 {
        self.magnitude * self.hemisphere.sign()
    }
}

/// Convert a `D..DMM.MMMM` field into decimal degrees.
///
/// `degree_digits` is the fixed width of the degree prefix
/// ([`LAT_DEGREE_DIGITS`] or [`LON_DEGREE_DIGITS`]). The prefix must be
/// all digits and the remainder a non-empty decimal number of minutes.
///
/// ```
/// use nmea_proto::{parse_degree_minutes, LAT_DEGREE_DIGITS};
///
/// let lat = parse_degree_minutes(b"2951.91860", LAT_DEGREE_DIGITS).unwrap();
/// assert_eq!(lat, 29.0 + 51.91860 / 60.0);
/// ```
pub fn parse_degree_minutes(field: &[u8], degree_digits: usize) -> Result<f64, ParseError> {
    if field.len() <= degree_digits {
        return Err(ParseError::MalformedField);
    }

    let (degree_part, minute_part) = field.split_at(degree_digits);

    let mut degrees: u32 = 0;
    for &b in degree_part {
        if !b.is_ascii_digit() {
            return Err(ParseError::MalformedField);
        }
        degrees = degrees
            .checked_mul(10)
            .and_then(|d| d.checked_add(u32::from(b - b'0')))
            .ok_or(ParseError::MalformedField)?;
    }

    let minutes = parse_unsigned_decimal(minute_part)?;

    Ok(f64::from(degrees) + minutes / 60.0)
}

/// Parse `123.456`-style text. Signs, exponents and `inf`/`nan` are rejected.
fn parse_unsigned_decimal(s: &[u8]) -> Result<f64, ParseError> {
    if !s.iter().all(|&b| b.is_ascii_digit() || b == b'.') {
        return Err(ParseError::MalformedField);
    }

    core::str::from_utf8(s)
        .ok()
        .and_then(|text| text.parse::<f64>().ok())
        .ok_or(ParseError::MalformedField)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_latitude_reference_value() {
        let lat = parse_degree_minutes(b"2951.91860", LAT_DEGREE_DIGITS).unwrap();
        assert_eq!(std::format!("{lat:.8}"), "29.86531000");
    }

    #[test]
    fn test_longitude_reference_value() {
        let lon = parse_degree_minutes(b"07752.38737", LON_DEGREE_DIGITS).unwrap();
        assert_eq!(std::format!("{lon:.8}"), "77.87312283");
    }

    #[test]
    fn test_short_field_rejected() {
        assert_eq!(
            parse_degree_minutes(b"", LAT_DEGREE_DIGITS),
            Err(ParseError::MalformedField)
        );
        assert_eq!(
            parse_degree_minutes(b"2", LAT_DEGREE_DIGITS),
            Err(ParseError::MalformedField)
        );
        assert_eq!(
            parse_degree_minutes(b"077", LON_DEGREE_DIGITS),
            Err(ParseError::MalformedField)
        );
    }

    #[test]
    fn test_non_numeric_rejected() {
        assert_eq!(
            parse_degree_minutes(b"2X51.9", LAT_DEGREE_DIGITS),
            Err(ParseError::MalformedField)
        );
        assert_eq!(
            parse_degree_minutes(b"29-1.9", LAT_DEGREE_DIGITS),
            Err(ParseError::MalformedField)
        );
        assert_eq!(
            parse_degree_minutes(b"29.", LAT_DEGREE_DIGITS),
            Err(ParseError::MalformedField)
        );
        assert_eq!(
            parse_degree_minutes(b"29inf", LAT_DEGREE_DIGITS),
            Err(ParseError::MalformedField)
        );
    }

    #[test]
    fn test_integer_minutes() {
        assert_eq!(parse_degree_minutes(b"4807", LAT_DEGREE_DIGITS), Ok(48.0 + 7.0 / 60.0));
    }

    #[test]
    fn test_wide_degree_prefix_does_not_overflow() {
        assert_eq!(
            parse_degree_minutes(b"99999999999.5", 11),
            Err(ParseError::MalformedField)
        );
        assert_eq!(parse_degree_minutes(b"4294967295.0", 10), Ok(4_294_967_295.0));
    }

    #[test]
    fn test_hemisphere_letters() {
        assert_eq!(Hemisphere::latitude(b"N"), Ok(Hemisphere::North));
        assert_eq!(Hemisphere::latitude(b"S"), Ok(Hemisphere::South));
        assert_eq!(Hemisphere::longitude(b"E"), Ok(Hemisphere::East));
        assert_eq!(Hemisphere::longitude(b"W"), Ok(Hemisphere::West));
        assert_eq!(Hemisphere::latitude(b"E"), Err(ParseError::MalformedField));
        assert_eq!(Hemisphere::longitude(b""), Err(ParseError::MalformedField));
        assert_eq!(Hemisphere::latitude(b"n"), Err(ParseError::MalformedField));
    }

    #[test]
    fn test_signed_coordinate() {
        let south = Coordinate {
            magnitude: 33.5,
            hemisphere: Hemisphere::South,
        };
        let east = Coordinate {
            magnitude: 151.25,
            hemisphere: Hemisphere::East,
        };
        assert_eq!(south.signed(), -33.5);
        assert_eq!(east.signed(), 151.25);
    }

    proptest! {
        #[test]
        fn prop_latitude_is_degrees_plus_minutes_over_60(
            degrees in 0u32..90,
            minutes in 0.0f64..60.0,
        ) {
            let minutes_text = std::format!("{minutes:08.5}");
            let field = std::format!("{degrees:02}{minutes_text}");
            let expected = f64::from(degrees) + minutes_text.parse::<f64>().unwrap() / 60.0;

            let value = parse_degree_minutes(field.as_bytes(), LAT_DEGREE_DIGITS).unwrap();
            prop_assert_eq!(value, expected);
            prop_assert!(value >= f64::from(degrees));
            prop_assert!(value <= f64::from(degrees) + 1.0);
        }

        #[test]
        fn prop_longitude_is_degrees_plus_minutes_over_60(
            degrees in 0u32..180,
            minutes in 0.0f64..60.0,
        ) {
            let minutes_text = std::format!("{minutes:08.5}");
            let field = std::format!("{degrees:03}{minutes_text}");
            let expected = f64::from(degrees) + minutes_text.parse::<f64>().unwrap() / 60.0;

            let value = parse_degree_minutes(field.as_bytes(), LON_DEGREE_DIGITS).unwrap();
            prop_assert_eq!(value, expected);
        }
    }
}
