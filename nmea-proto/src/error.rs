//! Parse error type shared by all stages.

/// Error type for splitting, tokenizing and extraction.
///
/// None of these are fatal: the caller skips the offending line or
/// sentence and carries on with the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// The frame holds more lines than [`MAX_LINES`](crate::MAX_LINES).
    FrameOverflow,
    /// A single line is longer than [`LINE_CAPACITY`](crate::LINE_CAPACITY).
    LineTooLong,
    /// Too many fields, or one field longer than [`FIELD_CAPACITY`](crate::FIELD_CAPACITY).
    FieldOverflow,
    /// A required field is missing, too short, or not in the expected format.
    MalformedField,
}

impl ParseError {
    /// Whether this error comes from a capacity bound rather than bad content.
    #[inline]
    #[must_use]
    pub const fn is_overflow(self) -> bool {
        matches!(
            self,
            Self::FrameOverflow | Self::LineTooLong | Self::FieldOverflow
        )
    }
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::FrameOverflow => write!(f, "frame overflow"),
            Self::LineTooLong => write!(f, "line too long"),
            Self::FieldOverflow => write!(f, "field overflow"),
            Self::MalformedField => write!(f, "malformed field"),
        }
    }
}
