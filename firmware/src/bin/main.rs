#![no_std]
#![no_main]

use defmt::{error, info};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::{UART0, UART1};
use embassy_rp::uart::{BufferedInterruptHandler, BufferedUartRx, BufferedUartTx, Config as UartConfig};
use gps_telemetry::{TelemetryConfig, GPS_BAUD, MODEM_BAUD};
use static_cell::StaticCell;

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    UART1_IRQ => BufferedInterruptHandler<UART1>;
});

/// GPS receive buffer. Holds a couple of full bursts.
static GPS_RX_BUF: StaticCell<[u8; 512]> = StaticCell::new();

/// Modem transmit buffer. Holds one command line plus one payload.
static MODEM_TX_BUF: StaticCell<[u8; 320]> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("GPS telemetry starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    // --- GPS UART (receive only) ---
    let mut gps_config = UartConfig::default();
    gps_config.baudrate = GPS_BAUD;

    let gps_rx = BufferedUartRx::new(
        p.UART1,
        Irqs,
        p.PIN_9, // RX
        GPS_RX_BUF.init([0; 512]),
        gps_config,
    );

    // --- Modem UART (transmit only) ---
    let mut modem_config = UartConfig::default();
    modem_config.baudrate = MODEM_BAUD;

    let modem_tx = BufferedUartTx::new(
        p.UART0,
        Irqs,
        p.PIN_0, // TX
        MODEM_TX_BUF.init([0; 320]),
        modem_config,
    );

    if let Err(e) = gps_telemetry::start(spawner, gps_rx, modem_tx, TelemetryConfig::DEFAULT) {
        error!("Start-up failed: {}", e);
        loop {
            cortex_m::asm::wfi();
        }
    }

    info!("GPS telemetry initialized, first read in {} ms", TelemetryConfig::DEFAULT.schedule.read_period_ms);
}
