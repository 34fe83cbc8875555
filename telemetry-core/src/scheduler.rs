//! Publish gating.
//!
//! Reads happen on a fixed cadence regardless of the gate. Each completed
//! read pass (re)starts a one-shot settle timer, and only when that timer
//! expires does a payload go out. The scheduler is a pure state machine
//! over caller-supplied millisecond timestamps; it never sleeps.

use crate::config::ScheduleConfig;

/// Publish gate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PublishGate {
    /// Waiting for the next read window.
    #[default]
    Idle,
    /// A read pass completed and the settle timer is running.
    AwaitingSettle,
    /// Settle timer fired; the next loop iteration publishes.
    Ready,
    /// Handoff to the transport in progress.
    Publishing,
}

/// Events that move the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GateEvent {
    ReadComplete,
    SettleElapsed,
    PublishStarted,
    /// Handoff returned, successfully or not.
    PublishFinished,
}

impl PublishGate {
    /// Next gate state for `event`. Unlisted pairs leave the state unchanged.
    #[must_use]
    pub fn transition(self, event: GateEvent) -> Self {
        use GateEvent::*;
        use PublishGate::*;

        match (self, event) {
            (Idle | AwaitingSettle, ReadComplete) => AwaitingSettle,
            (AwaitingSettle, SettleElapsed) => Ready,
            (Ready, PublishStarted) => Publishing,
            (_, PublishFinished) => Idle,
            _ => self,
        }
    }
}

/// What a completed read pass did to the settle timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettleAction {
    /// No timer was running; one was started.
    Started,
    /// The running timer was restarted with a fresh period.
    Restarted,
    /// A publish is already pending or in flight; timers untouched.
    PublishPending,
}

/// Two-timer publish scheduler.
///
/// # Example
///
/// ```
/// use telemetry_core::{PublishGate, PublishScheduler, ScheduleConfig};
///
/// let mut scheduler = PublishScheduler::new(ScheduleConfig::DEFAULT);
/// scheduler.on_read_complete(0);
/// assert_eq!(scheduler.gate(), PublishGate::AwaitingSettle);
/// assert!(scheduler.poll_settle(120_000));
/// assert!(scheduler.begin_publish());
/// scheduler.finish_publish();
/// assert_eq!(scheduler.gate(), PublishGate::Idle);
/// ```
#[derive(Debug, Clone)]
pub struct PublishScheduler {
    gate: PublishGate,
    settle_period_ms: u64,
    settle_max_hold_ms: Option<u64>,
    /// When the settle timer was first started in the current cycle.
    settle_started_at: Option<u64>,
    settle_deadline: Option<u64>,
}

impl PublishScheduler {
    #[must_use]
    pub const fn new(config: ScheduleConfig) -> Self {
        Self {
            gate: PublishGate::Idle,
            settle_period_ms: config.settle_period_ms,
            settle_max_hold_ms: config.settle_max_hold_ms,
            settle_started_at: None,
            settle_deadline: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn gate(&self) -> PublishGate {
        self.gate
    }

    /// Expiry time of the running settle timer, if any.
    #[inline]
    #[must_use]
    pub fn settle_deadline(&self) -> Option<u64> {
        self.settle_deadline
    }

    #[inline]
    #[must_use]
    pub fn is_settle_running(&self) -> bool {
        self.settle_deadline.is_some()
    }

    /// A read pass completed at `now`: start or restart the settle timer.
    ///
    /// A restart is clamped so the deadline never moves past
    /// `settle_max_hold_ms` after the first start of the cycle.
    pub fn on_read_complete(&mut self, now: u64) -> SettleAction {
        let action = match self.gate {
            PublishGate::Ready | PublishGate::Publishing => return SettleAction::PublishPending,
            PublishGate::Idle => {
                self.settle_started_at = Some(now);
                self.settle_deadline = Some(now.saturating_add(self.settle_period_ms));
                SettleAction::Started
            }
            PublishGate::AwaitingSettle => {
                let mut deadline = now.saturating_add(self.settle_period_ms);
                if let (Some(hold), Some(started)) = (self.settle_max_hold_ms, self.settle_started_at) {
                    deadline = deadline.min(started.saturating_add(hold));
                }
                self.settle_deadline = Some(deadline);
                SettleAction::Restarted
            }
        };

        self.gate = self.gate.transition(GateEvent::ReadComplete);
        action
    }

    /// Fire the settle timer if it has expired by `now`.
    ///
    /// Returns `true` when the gate moved to [`PublishGate::Ready`].
    pub fn poll_settle(&mut self, now: u64) -> bool {
        match self.settle_deadline {
            Some(deadline) if now >= deadline && self.gate == PublishGate::AwaitingSettle => {
                self.settle_deadline = None;
                self.settle_started_at = None;
                self.gate = self.gate.transition(GateEvent::SettleElapsed);
                true
            }
            _ => false,
        }
    }

    /// Claim the pending publish. Only succeeds from [`PublishGate::Ready`].
    pub fn begin_publish(&mut self) -> bool {
        if self.gate != PublishGate::Ready {
            return false;
        }
        self.gate = self.gate.transition(GateEvent::PublishStarted);
        true
    }

    /// Handoff returned. Always goes back to [`PublishGate::Idle`].
    pub fn finish_publish(&mut self) {
        self.gate = self.gate.transition(GateEvent::PublishFinished);
        self.settle_deadline = None;
        self.settle_started_at = None;
    }
}

impl Default for PublishScheduler {
    fn default() -> Self {
        Self::new(ScheduleConfig::DEFAULT)
    }
}
