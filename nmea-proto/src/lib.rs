//! Bounded NMEA-0183 parsing for position telemetry.
//!
//! This crate turns the raw byte stream of a positioning receiver into typed
//! sentence records without heap allocation. Every stage works on borrowed
//! slices of the caller's receive buffer and enforces a hard capacity, so
//! oversized input is reported instead of overrunning anything.
//!
//! # Overview
//!
//! - [`split`]: frame to lines ([`split_lines`], [`Line`])
//! - [`token`]: line to fields ([`tokenize`], [`FieldCursor`])
//! - [`sentence`]: classification and schema parsing ([`classify`], [`parse_sentence`])
//! - [`coord`]: degree-minute to decimal-degree conversion ([`parse_degree_minutes`])
//!
//! # Wire Format
//!
//! ```text
//! $GPRMC,101902.00,A,2951.91860,N,07752.38737,E,0.032,,300322,,,A*7C\r\n
//! $GPGSA,A,3,06,02,19,24,17,,,,,,,,4.73,3.95,2.60*05\r\n
//! ```
//!
//! Fields are separated by `,` and the checksum start `*` is treated as one
//! more separator. The checksum itself is carried through as the last field
//! and is not verified.
//!
//! # Example
//!
//! ```
//! use nmea_proto::{parse_sentence, split_lines, Sentence};
//!
//! let frame = b"$GPGSA,A,3,06,02,19,24,17,,,,,,,,4.73,3.95,2.60*05\r\n";
//! for line in split_lines(frame) {
//!     let line = line.unwrap();
//!     if let Ok(Sentence::Gsa(gsa)) = parse_sentence(line.bytes()) {
//!         assert_eq!(gsa.hdop.as_str(), "3.95");
//!     }
//! }
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)

#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod coord;
pub mod error;
pub mod sentence;
pub mod split;
pub mod token;

pub use coord::{parse_degree_minutes, Coordinate, Hemisphere, LAT_DEGREE_DIGITS, LON_DEGREE_DIGITS};
pub use error::ParseError;
pub use sentence::{
    classify, parse_sentence, DopValue, FixStatus, Gsa, Rmc, Sentence, SentenceKind, GSA_MIN_FIELDS,
};
pub use split::{split_lines, Line, Lines, RawFrame, FRAME_CAPACITY, LINE_CAPACITY, MAX_LINES};
pub use token::{tokenize, FieldCursor, Tokens, FIELD_CAPACITY, MAX_FIELDS};
