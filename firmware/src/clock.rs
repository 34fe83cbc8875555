//! Embassy time driver as the worker's clock.

use core::future::Future;

use embassy_time::{Instant, Timer};
use telemetry_core::Clock;

/// [`Clock`] on the embassy time driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }

    fn wait_until(&mut self, deadline_ms: u64) -> impl Future<Output = ()> {
        Timer::at(Instant::from_millis(deadline_ms))
    }

    fn pause(&mut self, ms: u32) -> impl Future<Output = ()> {
        Timer::after_millis(u64::from(ms))
    }
}
