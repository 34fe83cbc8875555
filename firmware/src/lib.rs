//! NMEA GPS to cellular MQTT telemetry node for RP2040.
//!
//! This crate wires the platform-agnostic pipeline from [`telemetry_core`]
//! to the RP2040's UARTs and the embassy runtime.
//!
//! # Overview
//!
//! The firmware runs on a Raspberry Pi Pico (RP2040) and:
//! 1. Receives NMEA-0183 bursts from a GPS receiver over UART (9600 baud, 8N1)
//! 2. Every 90 s parses the latest burst into position and DOP values
//! 3. Once the data has settled for 120 s, reconnects the cellular modem to
//!    the MQTT broker and publishes a JSON payload
//!
//! # Hardware Configuration
//!
//! | Function | GPIO | Description |
//! |----------|------|-------------|
//! | UART1 RX | 9    | NMEA input from the GPS receiver |
//! | UART0 TX | 0    | AT commands to the modem (115200 baud) |
//!
//! # Architecture
//!
//! Two embassy tasks:
//!
//! - **GPS RX Task**: Collects UART bursts into frames and signals them
//! - **Telemetry Task**: Owns the [`TelemetryWorker`]; reads, parses, schedules
//!   and publishes on its own control flow
//!
//! Frames are handed over through an embassy
//! [`Signal`](embassy_sync::signal::Signal) with "latest value wins"
//! semantics. A burst that arrives before the worker took the previous one
//! replaces it.
//!
//! # Features
//!
//! - **`dev-panic`** (default): Use `panic-probe` for development (prints panic info via RTT)
//! - **`prod-panic`**: Use `panic-reset` for production (silent watchdog reset)

#![no_std]

use core::fmt;

use defmt::info;
use embassy_executor::{SpawnError, Spawner};
use embassy_rp::uart::{BufferedUartRx, BufferedUartTx};
use embassy_sync::signal::Signal;
use embassy_time::{Delay, Duration};
use static_cell::StaticCell;

// Re-export core types for convenience
pub use telemetry_core::{
    BrokerConfig, Clock, FixState, FrameSource, ModemTransport, PipelineStats, PublishMessage, TelemetryConfig,
    TelemetryWorker, Transport, TransportError,
};

pub mod clock;
pub mod gps_rx;
pub mod modem;

pub use clock::EmbassyClock;
pub use gps_rx::{gps_rx_task, FrameSignal, SignalFrameSource, GPS_BAUD, IDLE_GAP};
pub use modem::{TimeoutTransport, UartModem, MODEM_BAUD, MQTT_CLIENT};

/// The worker as deployed on this board.
pub type Worker = TelemetryWorker<SignalFrameSource, TimeoutTransport<UartModem>>;

/// Frame hand-off slot between the two tasks.
static FRAME_SIGNAL: StaticCell<FrameSignal> = StaticCell::new();

/// Error type for firmware start-up.
#[derive(Debug, Clone, Copy, defmt::Format)]
pub enum InitError {
    /// [`start`] was called more than once.
    AlreadyStarted,
    /// The executor could not take another task.
    Spawn(SpawnError),
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyStarted => write!(f, "already started"),
            Self::Spawn(_) => write!(f, "task spawn failed"),
        }
    }
}

/// Build the worker and spawn both tasks.
///
/// `gps_rx` must be configured for [`GPS_BAUD`] and `modem_tx` for
/// [`MODEM_BAUD`]. The modem connects to `config.broker` on every publish.
///
/// # Errors
///
/// Returns [`InitError`] if called twice or if a task cannot be spawned.
pub fn start(
    spawner: Spawner,
    gps_rx: BufferedUartRx,
    modem_tx: BufferedUartTx,
    config: TelemetryConfig,
) -> Result<(), InitError> {
    let signal: &'static FrameSignal = FRAME_SIGNAL
        .try_init(Signal::new())
        .ok_or(InitError::AlreadyStarted)?;

    let transport = TimeoutTransport::new(
        ModemTransport::new(modem_tx, Delay, MQTT_CLIENT, config.broker),
        Duration::from_millis(config.publish.timeout_ms),
    );
    let worker = TelemetryWorker::new(SignalFrameSource::new(signal), transport, config);

    spawner.spawn(gps_rx_task(gps_rx, signal).map_err(InitError::Spawn)?);
    spawner.spawn(telemetry_task(worker).map_err(InitError::Spawn)?);

    info!(
        "telemetry started: read every {} ms, settle {} ms, topic {} on {}:{}",
        config.schedule.read_period_ms,
        config.schedule.settle_period_ms,
        config.publish.topic,
        config.broker.host,
        config.broker.port
    );
    Ok(())
}

/// Telemetry task - runs the worker loop forever.
#[embassy_executor::task]
async fn telemetry_task(mut worker: Worker) {
    worker.run(&mut EmbassyClock).await
}
