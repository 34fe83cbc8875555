//! Publish transport trait and error types.

use core::fmt;
use core::future::Future;

use crate::config::{PublishConfig, QoS};

/// Error type for transport handoff.
///
/// Every variant is a non-fatal publish failure: the scheduler returns to
/// idle and the next cycle produces the next attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// Modem/serial I/O error.
    Io,
    /// Handoff did not complete within the configured bound.
    Timeout,
    /// The message could not be framed for the link (e.g. command too long).
    Rejected,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io => write!(f, "transport I/O error"),
            Self::Timeout => write!(f, "transport timeout"),
            Self::Rejected => write!(f, "message rejected"),
        }
    }
}

/// One publish request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishMessage<'a> {
    pub topic: &'a str,
    pub qos: QoS,
    pub retain: bool,
    /// Serialized payload, terminator included.
    pub payload: &'a [u8],
}

impl<'a> PublishMessage<'a> {
    /// Message for `payload` using the topic, QoS and retain flag of `config`.
    #[must_use]
    pub fn new(config: &PublishConfig, payload: &'a [u8]) -> Self {
        Self {
            topic: config.topic,
            qos: config.qos,
            retain: config.retain,
            payload,
        }
    }
}

/// Async trait for the external publish collaborator.
///
/// This trait abstracts the link that carries payloads off the device
/// (cellular modem MQTT, a host-side mock in tests, ...).
pub trait Transport {
    /// Hand one message to the link.
    ///
    /// Returns once the link has accepted the message or failed. Links that
    /// do not read a response back (such as [`ModemTransport`]) only report
    /// local failures; a message the far end drops still returns `Ok`.
    ///
    /// [`ModemTransport`]: crate::modem::ModemTransport
    fn publish(&mut self, msg: &PublishMessage<'_>) -> impl Future<Output = Result<(), TransportError>>;
}
