//! TelemetryWorker: the single task that owns the whole pipeline.
//!
//! One worker owns the fix state, the publish scheduler, the frame source and
//! the transport. Both timers are plain deadlines held here and observed on
//! the worker's own control flow, so nothing else ever mutates that state.

use core::fmt;
use core::future::Future;

use nmea_proto::{parse_sentence, split_lines, ParseError, SentenceKind};

use crate::config::TelemetryConfig;
use crate::fix::FixState;
use crate::payload::{build_payload, PayloadError};
use crate::scheduler::{PublishGate, PublishScheduler, SettleAction};
use crate::source::FrameSource;
use crate::transport::{PublishMessage, Transport, TransportError};

#[cfg(feature = "defmt")]
use defmt::{debug, info, warn};

// Stub macros when defmt is not available
#[cfg(not(feature = "defmt"))]
macro_rules! warn {
    ($($arg:tt)*) => {{}};
}

#[cfg(not(feature = "defmt"))]
macro_rules! info {
    ($($arg:tt)*) => {{}};
}

#[cfg(not(feature = "defmt"))]
macro_rules! debug {
    ($($arg:tt)*) => {{}};
}

/// Monotonic millisecond time source.
///
/// Implemented with `embassy_time` on target and with a virtual clock in
/// host tests.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed epoch.
    fn now_ms(&self) -> u64;

    /// Sleep until `deadline_ms`. Returns immediately if it has passed.
    fn wait_until(&mut self, deadline_ms: u64) -> impl Future<Output = ()>;

    /// Sleep for `ms` milliseconds.
    fn pause(&mut self, ms: u32) -> impl Future<Output = ()> {
        let deadline = self.now_ms().saturating_add(u64::from(ms));
        self.wait_until(deadline)
    }
}

/// Error type for a publish attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PublishError {
    /// The payload could not be built.
    Payload(PayloadError),
    /// The transport failed the handoff.
    Transport(TransportError),
}

impl fmt::Display for PublishError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Payload(e) => write!(f, "payload: {e}"),
            Self::Transport(e) => write!(f, "transport: {e}"),
        }
    }
}

/// Outcome of parsing one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameReport {
    /// Complete lines handed to the classifier.
    pub lines: u32,
    /// Unterminated trailing lines, skipped.
    pub incomplete_lines: u32,
    pub rmc: u32,
    pub gsa: u32,
    /// Well-formed lines of a kind we do not consume.
    pub ignored: u32,
    /// Frame, line or field capacity exceeded.
    pub overflows: u32,
    /// Missing or unparsable fields in RMC/GSA.
    pub malformed: u32,
}

impl FrameReport {
    /// Number of lines that failed with an error.
    #[must_use]
    pub fn errors(&self) -> u32 {
        self.overflows + self.malformed
    }

    fn record_error(&mut self, err: ParseError) {
        if err.is_overflow() {
            self.overflows += 1;
        } else {
            self.malformed += 1;
        }
    }
}

/// Outcome of one read pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReadReport {
    /// `None` when no frame was pending.
    pub frame: Option<FrameReport>,
    pub settle: SettleAction,
}

/// Outcome of one loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepReport {
    pub read: Option<ReadReport>,
    /// The settle timer fired during this step.
    pub settled: bool,
    pub published: Option<Result<(), PublishError>>,
}

/// Running totals since start. Counters wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PipelineStats {
    pub frames: u32,
    pub lines: u32,
    pub incomplete_lines: u32,
    pub rmc: u32,
    pub gsa: u32,
    pub ignored: u32,
    pub overflows: u32,
    pub malformed: u32,
    pub publishes: u32,
    pub publish_failures: u32,
}

impl PipelineStats {
    fn absorb(&mut self, report: &FrameReport) {
        self.frames = self.frames.wrapping_add(1);
        self.lines = self.lines.wrapping_add(report.lines);
        self.incomplete_lines = self.incomplete_lines.wrapping_add(report.incomplete_lines);
        self.rmc = self.rmc.wrapping_add(report.rmc);
        self.gsa = self.gsa.wrapping_add(report.gsa);
        self.ignored = self.ignored.wrapping_add(report.ignored);
        self.overflows = self.overflows.wrapping_add(report.overflows);
        self.malformed = self.malformed.wrapping_add(report.malformed);
    }
}

/// Reads frames, keeps the latest fix, and publishes it on the settle cadence.
///
/// # Error Handling
///
/// Nothing here is fatal. Parse errors skip the offending line and publish
/// failures are counted; the scheduler always returns to idle afterwards and
/// the next cycle makes the next attempt.
pub struct TelemetryWorker<S, T> {
    source: S,
    transport: T,
    config: TelemetryConfig,
    fix: FixState,
    scheduler: PublishScheduler,
    stats: PipelineStats,
    next_read_ms: Option<u64>,
}

impl<S: FrameSource, T: Transport> TelemetryWorker<S, T> {
    /// Create a worker with an empty fix and an idle scheduler.
    pub fn new(source: S, transport: T, config: TelemetryConfig) -> Self {
        Self {
            source,
            transport,
            config,
            fix: FixState::new(),
            scheduler: PublishScheduler::new(config.schedule),
            stats: PipelineStats::default(),
            next_read_ms: None,
        }
    }

    /// Run the worker loop forever.
    pub async fn run<C: Clock>(&mut self, clock: &mut C) -> ! {
        info!("telemetry worker started");
        loop {
            self.step(clock).await;
        }
    }

    /// One loop iteration.
    ///
    /// Sleeps until the earlier of the next read tick and the settle
    /// deadline, fires whichever is due, publishes if the gate is ready, and
    /// finally pauses for `loop_delay_ms`. The first read tick is one read
    /// period after the first call.
    pub async fn step<C: Clock>(&mut self, clock: &mut C) -> StepReport {
        let mut report = StepReport::default();
        let read_period = self.config.schedule.read_period_ms;

        let next_read = *self
            .next_read_ms
            .get_or_insert_with(|| clock.now_ms().saturating_add(read_period));
        let wake = self
            .scheduler
            .settle_deadline()
            .map_or(next_read, |deadline| deadline.min(next_read));
        clock.wait_until(wake).await;

        // A settle timer that expired at the same tick as a read fires first.
        report.settled = self.settle_elapsed(clock.now_ms());

        let now = clock.now_ms();
        if now >= next_read {
            let mut following = next_read.saturating_add(read_period);
            while following <= now && read_period > 0 {
                following = following.saturating_add(read_period);
            }
            self.next_read_ms = Some(following);
            report.read = Some(self.read_pass(clock).await);
            report.settled |= self.settle_elapsed(clock.now_ms());
        }

        report.published = self.publish_if_ready().await;

        pace(clock, self.config.pacing.loop_delay_ms).await;
        report
    }

    /// Take the pending frame (if any), parse it into the fix state, then
    /// notify the scheduler that a read pass completed.
    pub async fn read_pass<C: Clock>(&mut self, clock: &mut C) -> ReadReport {
        let frame = match self.source.take_frame() {
            Some(raw) => Some(self.process_frame(&raw, clock).await),
            None => {
                debug!("read pass: no frame pending");
                None
            }
        };

        let settle = self.scheduler.on_read_complete(clock.now_ms());
        debug!("read pass complete: {}", settle);

        ReadReport { frame, settle }
    }

    /// Split, tokenize, classify and extract every line of `frame`.
    ///
    /// Errors are counted and the offending line skipped; earlier lines of
    /// the frame are kept even if the frame later overflows.
    pub async fn process_frame<C: Clock>(&mut self, frame: &[u8], clock: &mut C) -> FrameReport {
        let mut report = FrameReport::default();
        let policy = self.config.hemisphere;

        for line in split_lines(frame) {
            match line {
                Ok(line) if !line.is_complete() => {
                    report.incomplete_lines += 1;
                    debug!("skipping unterminated line ({} bytes)", line.bytes().len());
                }
                Ok(line) => {
                    report.lines += 1;
                    match parse_sentence(line.bytes()) {
                        Ok(sentence) => {
                            match sentence.kind() {
                                SentenceKind::Rmc => report.rmc += 1,
                                SentenceKind::Gsa => report.gsa += 1,
                                SentenceKind::Other => report.ignored += 1,
                            }
                            self.fix.apply(sentence, policy);
                        }
                        Err(e) => {
                            warn!("sentence skipped: {}", e);
                            report.record_error(e);
                        }
                    }
                }
                Err(e) => {
                    warn!("line skipped: {}", e);
                    report.record_error(e);
                }
            }

            pace(clock, self.config.pacing.line_delay_ms).await;
        }

        self.stats.absorb(&report);
        debug!("frame parsed: {}", report);
        report
    }

    /// Fire the settle timer if it has expired by `now`.
    pub fn settle_elapsed(&mut self, now: u64) -> bool {
        let fired = self.scheduler.poll_settle(now);
        if fired {
            debug!("settle timer elapsed at {=u64} ms", now);
        }
        fired
    }

    /// Publish the latest fix if the gate is ready.
    ///
    /// Returns `None` when nothing was due. The gate returns to idle
    /// whether or not the handoff succeeded; a failed publish is not retried.
    pub async fn publish_if_ready(&mut self) -> Option<Result<(), PublishError>> {
        if !self.scheduler.begin_publish() {
            return None;
        }

        let result = self.publish_latest().await;
        self.scheduler.finish_publish();

        match result {
            Ok(()) => {
                self.stats.publishes = self.stats.publishes.wrapping_add(1);
                info!("published fix: {}", self.fix);
            }
            Err(e) => {
                self.stats.publish_failures = self.stats.publish_failures.wrapping_add(1);
                warn!("publish failed: {}", e);
            }
        }
        debug!("pipeline stats: {}", self.stats);
        Some(result)
    }

    async fn publish_latest(&mut self) -> Result<(), PublishError> {
        let payload = build_payload(&self.fix).map_err(PublishError::Payload)?;
        let msg = PublishMessage::new(&self.config.publish, &payload);
        self.transport
            .publish(&msg)
            .await
            .map_err(PublishError::Transport)
    }

    /// Current fix state.
    pub fn fix(&self) -> &FixState {
        &self.fix
    }

    pub fn gate(&self) -> PublishGate {
        self.scheduler.gate()
    }

    pub fn scheduler(&self) -> &PublishScheduler {
        &self.scheduler
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    /// Time of the next read tick, once the loop has started.
    pub fn next_read_ms(&self) -> Option<u64> {
        self.next_read_ms
    }

    /// Get a reference to the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Decompose the worker into its source and transport.
    pub fn into_parts(self) -> (S, T) {
        (self.source, self.transport)
    }
}

async fn pace<C: Clock>(clock: &mut C, ms: u32) {
    if ms > 0 {
        clock.pause(ms).await;
    }
}
