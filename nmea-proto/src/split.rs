//! Line splitter: raw receive frame to NMEA lines.

use core::iter::FusedIterator;

use heapless::Vec;

use crate::error::ParseError;

/// Maximum number of bytes received from the serial source in one poll cycle.
pub const FRAME_CAPACITY: usize = 255;

/// Maximum line length in bytes, excluding the line ending.
pub const LINE_CAPACITY: usize = 80;

/// Maximum number of non-empty lines accepted from one frame.
pub const MAX_LINES: usize = 10;

/// One poll cycle worth of raw bytes.
///
/// The vector length is the received byte count, so splitting a `RawFrame`
/// never looks at bytes that were not written during this cycle.
pub type RawFrame = Vec<u8, FRAME_CAPACITY>;

/// A single line borrowed from a frame, with its line ending removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    bytes: &'a [u8],
    complete: bool,
}

impl<'a> Line<'a> {
    /// Line content without `\r` / `\n`.
    #[inline]
    #[must_use]
    pub const fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// `false` for trailing content that was not terminated by `\n`.
    ///
    /// Incomplete lines are usually the head of a sentence that continues
    /// in the next frame and must not be classified.
    #[inline]
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.complete
    }
}

/// Split a frame into lines on `\n`.
///
/// Pass exactly the received bytes. The returned iterator is lazy and
/// single-pass:
///
/// - a trailing `\r` is stripped from each line, and empty lines are skipped
/// - a line longer than [`LINE_CAPACITY`] yields [`ParseError::LineTooLong`]
///   and splitting continues with the next line
/// - the line after the [`MAX_LINES`]th yields [`ParseError::FrameOverflow`]
///   and the iterator ends
/// - unterminated trailing content is yielded with `is_complete() == false`
///
/// # Example
///
/// ```
/// use nmea_proto::split_lines;
///
/// let mut lines = split_lines(b"$GPVTG,,T*24\r\n$GPGS");
/// let first = lines.next().unwrap().unwrap();
/// assert_eq!(first.bytes(), b"$GPVTG,,T*24");
/// assert!(first.is_complete());
/// let tail = lines.next().unwrap().unwrap();
/// assert!(!tail.is_complete());
/// assert!(lines.next().is_none());
/// ```
#[inline]
pub fn split_lines(frame: &[u8]) -> Lines<'_> {
    Lines {
        rest: frame,
        yielded: 0,
        done: false,
    }
}

/// Iterator returned by [`split_lines`].
#[derive(Debug, Clone)]
pub struct Lines<'a> {
    rest: &'a [u8],
    yielded: usize,
    done: bool,
}

impl<'a> Iterator for Lines<'a> {
    type Item = Result<Line<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done || self.rest.is_empty() {
                self.done = true;
                return None;
            }

            let (raw, complete) = match self.rest.iter().position(|&b| b == b'\n') {
                Some(pos) => {
                    let raw = &self.rest[..pos];
                    self.rest = &self.rest[pos + 1..];
                    (raw, true)
                }
                None => {
                    let raw = self.rest;
                    self.rest = &[];
                    (raw, false)
                }
            };

            let bytes = strip_cr(raw);
            if bytes.is_empty() {
                continue;
            }

            if self.yielded == MAX_LINES {
                self.done = true;
                return Some(Err(ParseError::FrameOverflow));
            }
            self.yielded += 1;

            if bytes.len() > LINE_CAPACITY {
                return Some(Err(ParseError::LineTooLong));
            }

            return Some(Ok(Line { bytes, complete }));
        }
    }
}

impl FusedIterator for Lines<'_> {}

#[inline]
fn strip_cr(line: &[u8]) -> &[u8] {
    match line.last() {
        Some(b'\r') => &line[..line.len() - 1],
        _ => line,
    }
}
