//! Raw frame source trait.

use nmea_proto::RawFrame;

/// Non-blocking source of received receiver bursts.
///
/// The worker polls this once per read pass instead of waiting on it.
/// Implementations hold at most one pending frame: a burst that arrives
/// before the previous one was taken replaces it, so the older frame is
/// lost. That coalescing is accepted; positions are refreshed every pass.
///
/// # `no_std` Compatibility
///
/// All implementations must be `#![no_std]` compatible with no heap allocation.
pub trait FrameSource {
    /// Take the pending frame, if any. The frame's length is the received
    /// byte count.
    fn take_frame(&mut self) -> Option<RawFrame>;
}

impl<S: FrameSource + ?Sized> FrameSource for &mut S {
    fn take_frame(&mut self) -> Option<RawFrame> {
        (**self).take_frame()
    }
}
