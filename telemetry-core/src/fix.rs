//! Latest-fix state shared between extraction and payload building.

use nmea_proto::{DopValue, Gsa, Rmc, Sentence};

use crate::config::HemispherePolicy;

/// Most recently extracted position and DOP values.
///
/// No history is kept. RMC overwrites the coordinates and GSA overwrites the
/// DOP strings, so a payload may combine a position from one read cycle
/// with DOP values from an earlier one when the receiver does not emit both
/// sentences in the same burst.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FixState {
    /// Decimal degrees.
    pub latitude: f64,
    /// Decimal degrees.
    pub longitude: f64,
    pub pdop: DopValue,
    pub hdop: DopValue,
    pub vdop: DopValue,
}

impl FixState {
    /// Empty state: coordinates at zero, DOP values empty.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            latitude: 0.0,
            longitude: 0.0,
            pdop: DopValue::new(),
            hdop: DopValue::new(),
            vdop: DopValue::new(),
        }
    }

    /// Overwrite the coordinates from an RMC record.
    pub fn apply_rmc(&mut self, rmc: &Rmc, policy: HemispherePolicy) {
        match policy {
            HemispherePolicy::Signed => {
                self.latitude = rmc.latitude.signed();
                self.longitude = rmc.longitude.signed();
            }
            HemispherePolicy::Unsigned => {
                self.latitude = rmc.latitude.magnitude;
                self.longitude = rmc.longitude.magnitude;
            }
        }
    }

    /// Overwrite the DOP values from a GSA record.
    pub fn apply_gsa(&mut self, gsa: Gsa) {
        self.pdop = gsa.pdop;
        self.hdop = gsa.hdop;
        self.vdop = gsa.vdop;
    }

    /// Apply any extracted sentence. Returns `false` for [`Sentence::Other`].
    pub fn apply(&mut self, sentence: Sentence, policy: HemispherePolicy) -> bool {
        match sentence {
            Sentence::Rmc(rmc) => {
                self.apply_rmc(&rmc, policy);
                true
            }
            Sentence::Gsa(gsa) => {
                self.apply_gsa(gsa);
                true
            }
            Sentence::Other => false,
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for FixState {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "FixState {{ lat: {=f64}, lon: {=f64}, pdop: {=str}, hdop: {=str}, vdop: {=str} }}",
            self.latitude,
            self.longitude,
            self.pdop.as_str(),
            self.hdop.as_str(),
            self.vdop.as_str()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nmea_proto::parse_sentence;

    const RMC_SW: &[u8] = b"$GPRMC,123519,A,4807.038,S,01131.000,W,022.4,084.4,230394,003.1,W*6A";

    fn sentence(line: &[u8]) -> Sentence {
        parse_sentence(line).unwrap()
    }

    #[test]
    fn test_new_is_empty() {
        let fix = FixState::new();
        assert_eq!(fix, FixState::default());
        assert_eq!(fix.latitude, 0.0);
        assert!(fix.pdop.is_empty());
    }

    #[test]
    fn test_signed_policy_negates_south_west() {
        let mut fix = FixState::new();
        assert!(fix.apply(sentence(RMC_SW), HemispherePolicy::Signed));
        assert_eq!(fix.latitude, -(48.0 + 7.038 / 60.0));
        assert_eq!(fix.longitude, -(11.0 + 31.0 / 60.0));
    }

    #[test]
    fn test_unsigned_policy_keeps_magnitude() {
        let mut fix = FixState::new();
        assert!(fix.apply(sentence(RMC_SW), HemispherePolicy::Unsigned));
        assert_eq!(fix.latitude, 48.0 + 7.038 / 60.0);
        assert_eq!(fix.longitude, 11.0 + 31.0 / 60.0);
    }

    #[test]
    fn test_gsa_only_touches_dop() {
        let mut fix = FixState::new();
        fix.latitude = 1.5;
        fix.longitude = 2.5;
        fix.apply(
            sentence(b"$GPGSA,A,3,06,02,19,24,17,,,,,,,,4.73,3.95,2.60*05"),
            HemispherePolicy::Signed,
        );
        assert_eq!(fix.latitude, 1.5);
        assert_eq!(fix.longitude, 2.5);
        assert_eq!(fix.pdop.as_str(), "4.73");
        assert_eq!(fix.hdop.as_str(), "3.95");
        assert_eq!(fix.vdop.as_str(), "2.60");
    }

    #[test]
    fn test_other_leaves_state_unchanged() {
        let mut fix = FixState::new();
        fix.latitude = 3.0;
        let before = fix.clone();
        assert!(!fix.apply(Sentence::Other, HemispherePolicy::Signed));
        assert_eq!(fix, before);
    }
}
