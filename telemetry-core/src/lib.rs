//! Platform-agnostic GPS telemetry pipeline.
//!
//! This crate owns everything between the receiver's raw bytes and the
//! publish handoff, without any platform-specific dependencies. It runs in
//! embedded `no_std` builds and on host for testing.
//!
//! # Overview
//!
//! - [`fix`]: latest extracted position and DOP values ([`FixState`])
//! - [`payload`]: telemetry payload serialization ([`build_payload`])
//! - [`scheduler`]: read/settle publish gating ([`PublishScheduler`])
//! - [`source`]: raw frame source trait ([`FrameSource`])
//! - [`transport`]: publish transport trait ([`Transport`])
//! - [`modem`]: AT-command modem transport ([`ModemTransport`])
//! - [`worker`]: the pipeline task ([`TelemetryWorker`])
//! - [`config`]: cadence, pacing, publish and broker settings ([`TelemetryConfig`])
//!
//! Parsing itself lives in `nmea_proto`.
//!
//! # Cadence
//!
//! A recurring read tick (90 s) parses whatever frame is pending. Every read
//! pass starts or restarts a one-shot settle timer (120 s); when it expires
//! the latest fix is serialized and published once.
//!
//! # Example
//!
//! ```rust
//! use nmea_proto::parse_sentence;
//! use telemetry_core::{build_payload, FixState, HemispherePolicy};
//!
//! let mut fix = FixState::new();
//! let line = b"$GPGSA,A,3,06,02,19,24,17,,,,,,,,4.73,3.95,2.60*05";
//! fix.apply(parse_sentence(line).unwrap(), HemispherePolicy::Signed);
//!
//! let payload = build_payload(&fix).unwrap();
//! assert!(payload.starts_with(b"{\"latitude\":0.00000000"));
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting and worker logging (for embedded builds)

#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod config;
pub mod fix;
pub mod modem;
pub mod payload;
pub mod scheduler;
pub mod source;
pub mod transport;
pub mod worker;

// Re-export main types at crate root
pub use config::{
    BrokerConfig, HemispherePolicy, PacingConfig, PublishConfig, QoS, ScheduleConfig, TelemetryConfig, DEFAULT_TOPIC,
};
pub use fix::FixState;
pub use modem::{ModemTransport, MAX_COMMAND_SIZE};
pub use payload::{build_payload, write_payload, Payload, PayloadError, MAX_PAYLOAD_SIZE, PAYLOAD_TERMINATOR};
pub use scheduler::{GateEvent, PublishGate, PublishScheduler, SettleAction};
pub use source::FrameSource;
pub use transport::{PublishMessage, Transport, TransportError};
pub use worker::{
    Clock, FrameReport, PipelineStats, PublishError, ReadReport, StepReport, TelemetryWorker,
};
