//! Cellular modem output.

use embassy_rp::uart::BufferedUartTx;
use embassy_time::{with_timeout, Delay, Duration};
use telemetry_core::{ModemTransport, PublishMessage, Transport, TransportError};

/// Baud rate of the modem's AT command port.
pub const MODEM_BAUD: u32 = 115_200;

/// MQTT client slot on the modem that holds the open session.
pub const MQTT_CLIENT: u8 = 0;

/// Modem transport on the modem UART's transmit half, paced by embassy timers.
pub type UartModem = ModemTransport<BufferedUartTx, Delay>;

/// Bounds every publish of an inner transport.
///
/// A stalled link would otherwise stall the whole worker. Expiry is reported
/// as [`TransportError::Timeout`].
pub struct TimeoutTransport<T> {
    inner: T,
    timeout: Duration,
}

impl<T: Transport> TimeoutTransport<T> {
    pub fn new(inner: T, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

impl<T: Transport> Transport for TimeoutTransport<T> {
    async fn publish(&mut self, msg: &PublishMessage<'_>) -> Result<(), TransportError> {
        with_timeout(self.timeout, self.inner.publish(msg))
            .await
            .map_err(|_| TransportError::Timeout)?
    }
}
