//! Cellular modem publish over a serial AT-command link.
//!
//! Every publish re-establishes the MQTT session and then publishes one
//! message. The payload carries its own Ctrl-Z terminator:
//!
//! ```text
//! AT+QMTDISC=<client>\r\n
//! AT+QMTOPEN=<client>,"<host>",<port>\r\n
//! AT+QMTCONN=<client>,"<client id>","<username>","<password>"\r\n
//! AT+QMTPUB=<client>,<msgid>,<qos>,<retain>,"<topic>"\r\n
//! {"latitude":...}<SUB>
//! ```
//!
//! The link is transmit-only. Modem responses are never read; each command
//! is followed by a fixed pause instead.

use core::fmt::Write as _;

use embedded_hal_async::delay::DelayNs;
use embedded_io_async::Write;
use heapless::String;

use crate::config::{BrokerConfig, QoS};
use crate::transport::{PublishMessage, Transport, TransportError};

/// Capacity of one formatted command line.
pub const MAX_COMMAND_SIZE: usize = 96;

type Command = String<MAX_COMMAND_SIZE>;

/// [`Transport`] that drives a modem through its serial command interface.
pub struct ModemTransport<W, D> {
    writer: W,
    delay: D,
    client: u8,
    broker: BrokerConfig,
    last_msg_id: u16,
}

impl<W: Write, D: DelayNs> ModemTransport<W, D> {
    /// Publish through MQTT client slot `client` on the modem, connected to `broker`.
    pub fn new(writer: W, delay: D, client: u8, broker: BrokerConfig) -> Self {
        Self {
            writer,
            delay,
            client,
            broker,
            last_msg_id: 0,
        }
    }

    /// Decompose the transport into its writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Message id for the next publish: always 0 at QoS 0, else 1..=65535.
    fn next_msg_id(&mut self, qos: QoS) -> u16 {
        if qos == QoS::AtMostOnce {
            return 0;
        }
        self.last_msg_id = self.last_msg_id.checked_add(1).unwrap_or(1);
        self.last_msg_id
    }

    /// Disconnect, open and connect lines for the configured broker.
    fn connect_commands(&self) -> Result<[Command; 3], TransportError> {
        let broker = &self.broker;
        let mut disconnect = Command::new();
        let mut open = Command::new();
        let mut connect = Command::new();

        write!(disconnect, "AT+QMTDISC={}\r\n", self.client).map_err(|_| TransportError::Rejected)?;
        write!(
            open,
            "AT+QMTOPEN={},\"{}\",{}\r\n",
            self.client, broker.host, broker.port
        )
        .map_err(|_| TransportError::Rejected)?;
        write!(
            connect,
            "AT+QMTCONN={},\"{}\",\"{}\",\"{}\"\r\n",
            self.client, broker.client_id, broker.username, broker.password
        )
        .map_err(|_| TransportError::Rejected)?;

        Ok([disconnect, open, connect])
    }

    /// Format the publish command line for `msg`.
    fn publish_command(&mut self, msg: &PublishMessage<'_>) -> Result<Command, TransportError> {
        let msg_id = self.next_msg_id(msg.qos);
        let mut line = Command::new();
        write!(
            line,
            "AT+QMTPUB={},{},{},{},\"{}\"\r\n",
            self.client,
            msg_id,
            msg.qos.level(),
            u8::from(msg.retain),
            msg.topic
        )
        .map_err(|_| TransportError::Rejected)?;
        Ok(line)
    }

    /// Write and flush one command line, then give the modem time to act on it.
    async fn send_command(&mut self, line: &Command) -> Result<(), TransportError> {
        self.writer
            .write_all(line.as_bytes())
            .await
            .map_err(|_| TransportError::Io)?;
        self.writer.flush().await.map_err(|_| TransportError::Io)?;

        if self.broker.command_gap_ms > 0 {
            self.delay.delay_ms(self.broker.command_gap_ms).await;
        }
        Ok(())
    }
}

impl<W: Write, D: DelayNs> Transport for ModemTransport<W, D> {
    async fn publish(&mut self, msg: &PublishMessage<'_>) -> Result<(), TransportError> {
        // Format everything up front so a rejected message writes nothing.
        let [disconnect, open, connect] = self.connect_commands()?;
        let publish = self.publish_command(msg)?;

        for line in [&disconnect, &open, &connect, &publish] {
            self.send_command(line).await?;
        }

        self.writer
            .write_all(msg.payload)
            .await
            .map_err(|_| TransportError::Io)?;
        self.writer.flush().await.map_err(|_| TransportError::Io)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::config::PublishConfig;
    use core::future::Future;
    use core::pin::Pin;
    use core::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};
    use embedded_io_async::{ErrorKind, ErrorType};
    use std::string::String as StdString;
    use std::vec::Vec;

    const CONNECT: &str = "AT+QMTDISC=0\r\n\
AT+QMTOPEN=0,\"cloud.monoz.io\",1883\r\n\
AT+QMTCONN=0,\"GPSTest\",\"GPSTest\",\"GPSTest\"\r\n";

    // Simple mock serial writer
    struct MockWriter {
        written: Vec<u8>,
        flushes: usize,
        fail: bool,
    }

    impl MockWriter {
        fn new() -> Self {
            Self {
                written: Vec::new(),
                flushes: 0,
                fail: false,
            }
        }
    }

    impl ErrorType for MockWriter {
        type Error = ErrorKind;
    }

    impl Write for MockWriter {
        async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
            if self.fail {
                return Err(ErrorKind::BrokenPipe);
            }
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        async fn flush(&mut self) -> Result<(), Self::Error> {
            self.flushes += 1;
            Ok(())
        }
    }

    // Mock delay that records every pause in milliseconds
    #[derive(Default)]
    struct MockDelay {
        pauses: Vec<u32>,
    }

    impl DelayNs for MockDelay {
        async fn delay_ns(&mut self, ns: u32) {
            self.pauses.push(ns / 1_000_000);
        }

        async fn delay_ms(&mut self, ms: u32) {
            self.pauses.push(ms);
        }
    }

    // Helper to run a future to completion (simple blocking executor)
    fn block_on<F: Future>(mut f: F) -> F::Output {
        fn noop_raw_waker() -> RawWaker {
            fn noop(_: *const ()) {}
            fn clone(_: *const ()) -> RawWaker {
                noop_raw_waker()
            }
            static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, noop, noop, noop);
            RawWaker::new(core::ptr::null(), &VTABLE)
        }

        let waker = unsafe { Waker::from_raw(noop_raw_waker()) };
        let mut cx = Context::from_waker(&waker);

        // SAFETY: We don't move f after pinning
        let mut f = unsafe { Pin::new_unchecked(&mut f) };

        match f.as_mut().poll(&mut cx) {
            Poll::Ready(result) => result,
            Poll::Pending => panic!("Mock future returned Pending unexpectedly"),
        }
    }

    fn modem(writer: MockWriter, client: u8) -> ModemTransport<MockWriter, MockDelay> {
        ModemTransport::new(writer, MockDelay::default(), client, BrokerConfig::DEFAULT)
    }

    #[test]
    fn test_publish_connects_then_publishes() {
        let mut modem = modem(MockWriter::new(), 0);
        let payload = b"{\"latitude\":1.00000000}\x1a";
        let msg = PublishMessage::new(&PublishConfig::DEFAULT, payload);

        assert_eq!(block_on(modem.publish(&msg)), Ok(()));
        assert_eq!(modem.delay.pauses, [1_000; 4]);

        let writer = modem.into_inner();
        let mut expected = CONNECT.as_bytes().to_vec();
        expected.extend_from_slice(b"AT+QMTPUB=0,0,0,0,\"v1/devices/me/telemetry\"\r\n");
        expected.extend_from_slice(payload);
        assert_eq!(writer.written, expected);
        assert_eq!(writer.flushes, 5);
    }

    #[test]
    fn test_connect_uses_broker_settings() {
        let broker = BrokerConfig {
            host: "mqtt.example.net",
            port: 8883,
            client_id: "tracker-7",
            username: "fleet",
            password: "s3cret",
            command_gap_ms: 0,
        };
        let mut modem = ModemTransport::new(MockWriter::new(), MockDelay::default(), 3, broker);
        let msg = PublishMessage::new(&PublishConfig::DEFAULT, b"x");

        block_on(modem.publish(&msg)).unwrap();
        assert!(modem.delay.pauses.is_empty());

        let written = StdString::from_utf8(modem.into_inner().written).unwrap();
        assert!(written.starts_with(
            "AT+QMTDISC=3\r\n\
AT+QMTOPEN=3,\"mqtt.example.net\",8883\r\n\
AT+QMTCONN=3,\"tracker-7\",\"fleet\",\"s3cret\"\r\n\
AT+QMTPUB=3,"
        ));
    }

    #[test]
    fn test_msg_id_increments_above_qos0() {
        let mut modem = modem(MockWriter::new(), 2);
        let config = PublishConfig {
            topic: "t",
            qos: QoS::AtLeastOnce,
            retain: true,
            ..PublishConfig::DEFAULT
        };

        block_on(modem.publish(&PublishMessage::new(&config, b"a"))).unwrap();
        block_on(modem.publish(&PublishMessage::new(&config, b"b"))).unwrap();

        let written = StdString::from_utf8(modem.into_inner().written).unwrap();
        assert!(written.contains("AT+QMTPUB=2,1,1,1,\"t\"\r\na"));
        assert!(written.contains("AT+QMTPUB=2,2,1,1,\"t\"\r\nb"));
        assert_eq!(written.matches("AT+QMTCONN=2,").count(), 2);
    }

    #[test]
    fn test_msg_id_wraps_past_zero() {
        let mut modem = modem(MockWriter::new(), 0);
        modem.last_msg_id = u16::MAX;
        assert_eq!(modem.next_msg_id(QoS::ExactlyOnce), 1);
        assert_eq!(modem.next_msg_id(QoS::AtMostOnce), 0);
    }

    #[test]
    fn test_write_failure_is_io_error() {
        let mut writer = MockWriter::new();
        writer.fail = true;
        let mut modem = modem(writer, 0);
        let msg = PublishMessage::new(&PublishConfig::DEFAULT, b"x");
        assert_eq!(block_on(modem.publish(&msg)), Err(TransportError::Io));
        assert!(modem.delay.pauses.is_empty());
    }

    #[test]
    fn test_oversized_topic_rejected() {
        let mut modem = modem(MockWriter::new(), 0);
        let topic = "devices/gps-tracker-0001/telemetry/position/with/a/name/well/past/the/command/buffer";
        let config = PublishConfig {
            topic,
            ..PublishConfig::DEFAULT
        };
        let msg = PublishMessage::new(&config, b"x");
        assert_eq!(block_on(modem.publish(&msg)), Err(TransportError::Rejected));
        assert!(modem.into_inner().written.is_empty());
    }

    #[test]
    fn test_oversized_broker_host_rejected() {
        let broker = BrokerConfig {
            host: "a-very-long-broker-hostname.regional-endpoint.telemetry.example-provider.com",
            ..BrokerConfig::DEFAULT
        };
        let mut modem = ModemTransport::new(MockWriter::new(), MockDelay::default(), 0, broker);
        let msg = PublishMessage::new(&PublishConfig::DEFAULT, b"x");
        assert_eq!(block_on(modem.publish(&msg)), Err(TransportError::Rejected));
        assert!(modem.into_inner().written.is_empty());
    }
}
