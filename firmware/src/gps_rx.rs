//! GPS receiver input: UART bursts to raw frames.

use defmt::{debug, warn};
use embassy_rp::uart::BufferedUartRx;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{with_timeout, Duration};
use embedded_io_async::Read;
use nmea_proto::{RawFrame, FRAME_CAPACITY};
use telemetry_core::FrameSource;

/// Baud rate of the GPS receiver's NMEA output (8N1).
pub const GPS_BAUD: u32 = 9_600;

/// Silence on the line that ends a burst.
///
/// One byte takes about 1 ms at 9600 baud; receivers send a whole burst
/// back to back once per fix, so a 20 ms gap reliably separates bursts.
pub const IDLE_GAP: Duration = Duration::from_millis(20);

/// Hand-off slot between the receive task and the worker.
///
/// Latest value wins: a frame signalled before the worker took the previous
/// one replaces it.
pub type FrameSignal = Signal<CriticalSectionRawMutex, RawFrame>;

/// [`FrameSource`] backed by a [`FrameSignal`].
pub struct SignalFrameSource {
    signal: &'static FrameSignal,
}

impl SignalFrameSource {
    pub fn new(signal: &'static FrameSignal) -> Self {
        Self { signal }
    }
}

impl FrameSource for SignalFrameSource {
    fn take_frame(&mut self) -> Option<RawFrame> {
        self.signal.try_take()
    }
}

/// Read one burst into a frame.
///
/// Waits for the first bytes, then keeps reading until the line has been
/// idle for [`IDLE_GAP`]. Only the first [`FRAME_CAPACITY`] bytes are kept;
/// the rest of the burst is read and discarded. Returns the number of
/// discarded bytes.
async fn read_burst<R: Read>(rx: &mut R, frame: &mut RawFrame) -> Result<usize, R::Error> {
    let mut buf = [0u8; 64];
    let mut dropped = 0;

    let mut n = rx.read(&mut buf).await?;
    loop {
        let room = FRAME_CAPACITY - frame.len();
        let keep = n.min(room);
        // Cannot fail: `keep` never exceeds the remaining capacity.
        let _ = frame.extend_from_slice(&buf[..keep]);
        dropped += n - keep;

        n = match with_timeout(IDLE_GAP, rx.read(&mut buf)).await {
            Ok(result) => result?,
            Err(_) => return Ok(dropped),
        };
    }
}

/// GPS receive task - collects UART bursts and signals them as frames.
#[embassy_executor::task]
pub async fn gps_rx_task(mut rx: BufferedUartRx, signal: &'static FrameSignal) {
    loop {
        let mut frame = RawFrame::new();
        match read_burst(&mut rx, &mut frame).await {
            Ok(dropped) => {
                if dropped > 0 {
                    debug!("GPS burst truncated, {} bytes dropped", dropped);
                }
                if signal.signaled() {
                    debug!("GPS frame not taken yet, replacing it");
                }
                // Overwrites any frame the worker has not taken yet
                signal.signal(frame);
            }
            Err(e) => {
                warn!("GPS UART error: {:?}", e);
            }
        }
    }
}
