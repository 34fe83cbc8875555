//! Field tokenizer: one NMEA line to its comma separated fields.

use core::iter::FusedIterator;

use heapless::Vec;

use crate::error::ParseError;

/// Maximum field length in bytes.
pub const FIELD_CAPACITY: usize = 12;

/// Maximum number of fields in one line, checksum included.
pub const MAX_FIELDS: usize = 21;

/// Split a line into fields on `,` and `*`.
///
/// The checksum start `*` is just another separator, so the checksum ends
/// up as the final field. Exceeding [`MAX_FIELDS`] or [`FIELD_CAPACITY`]
/// yields [`ParseError::FieldOverflow`] and ends the sequence.
///
/// ```
/// use nmea_proto::tokenize;
///
/// let fields: Vec<_> = tokenize(b"$GPGSA,A,3*05").map(Result::unwrap).collect();
/// assert_eq!(fields, [&b"$GPGSA"[..], &b"A"[..], &b"3"[..], &b"05"[..]]);
/// ```
#[inline]
pub fn tokenize(line: &[u8]) -> Tokens<'_> {
    Tokens {
        rest: Some(line),
        count: 0,
    }
}

/// Iterator returned by [`tokenize`].
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    rest: Option<&'a [u8]>,
    count: usize,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Result<&'a [u8], ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.rest?;

        if self.count == MAX_FIELDS {
            self.rest = None;
            return Some(Err(ParseError::FieldOverflow));
        }
        self.count += 1;

        let (field, remaining) = match rest.iter().position(|&b| b == b',' || b == b'*') {
            Some(pos) => (&rest[..pos], Some(&rest[pos + 1..])),
            None => (rest, None),
        };
        self.rest = remaining;

        if field.len() > FIELD_CAPACITY {
            self.rest = None;
            return Some(Err(ParseError::FieldOverflow));
        }

        Some(Ok(field))
    }
}

impl FusedIterator for Tokens<'_> {}

/// Bounds-checked positional access to the fields of one line.
///
/// Sentence schemas address fields by position; a position past the end of
/// the line is reported as [`ParseError::MalformedField`].
#[derive(Debug, Clone)]
pub struct FieldCursor<'a> {
    fields: Vec<&'a [u8], MAX_FIELDS>,
}

impl<'a> FieldCursor<'a> {
    /// Tokenize `line` and keep the fields for positional access.
    pub fn new(line: &'a [u8]) -> Result<Self, ParseError> {
        let mut fields = Vec::new();
        for token in tokenize(line) {
            fields
                .push(token?)
                .map_err(|_| ParseError::FieldOverflow)?;
        }
        Ok(Self { fields })
    }

    /// Number of fields, checksum included.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always `false` in practice: an empty line still has one empty field.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field at `index`, or [`ParseError::MalformedField`] if the line is too short.
    #[inline]
    pub fn field(&self, index: usize) -> Result<&'a [u8], ParseError> {
        self.fields
            .get(index)
            .copied()
            .ok_or(ParseError::MalformedField)
    }

    /// The talker + sentence type field, e.g. `$GPRMC`.
    #[inline]
    #[must_use]
    pub fn head(&self) -> &'a [u8] {
        self.fields.first().copied().unwrap_or(&[])
    }
}
