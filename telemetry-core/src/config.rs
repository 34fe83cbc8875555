//! Runtime configuration.
//!
//! All periods are in milliseconds. [`TelemetryConfig::DEFAULT`] matches the
//! deployed device: read every 90 s, publish after a 120 s settle window.

/// Telemetry topic used by the deployed device.
pub const DEFAULT_TOPIC: &str = "v1/devices/me/telemetry";

/// How hemisphere letters affect the sign of decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HemispherePolicy {
    /// South latitudes and West longitudes are negative.
    #[default]
    Signed,
    /// Always publish the unsigned magnitude, ignoring N/S and E/W.
    ///
    /// Matches the legacy firmware, which never applied the sign.
    Unsigned,
}

/// MQTT quality-of-service level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum QoS {
    #[default]
    AtMostOnce,
    AtLeastOnce,
    ExactlyOnce,
}

impl QoS {
    /// Numeric level as used on the wire (0, 1 or 2).
    #[inline]
    #[must_use]
    pub const fn level(self) -> u8 {
        match self {
            Self::AtMostOnce => 0,
            Self::AtLeastOnce => 1,
            Self::ExactlyOnce => 2,
        }
    }
}

/// Read and publish cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScheduleConfig {
    /// Period of the recurring read timer.
    pub read_period_ms: u64,
    /// One-shot settle timer started (or restarted) after each read pass.
    pub settle_period_ms: u64,
    /// Upper bound on how far restarts may push the settle deadline,
    /// measured from the first start in the current cycle.
    ///
    /// `None` restarts without limit, which never publishes while reads
    /// arrive faster than `settle_period_ms`.
    pub settle_max_hold_ms: Option<u64>,
}

impl ScheduleConfig {
    pub const DEFAULT: Self = Self {
        read_period_ms: 90_000,
        settle_period_ms: 120_000,
        settle_max_hold_ms: Some(240_000),
    };
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Pacing delays inside the worker loop.
///
/// These only throttle the worker; parsing results do not depend on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PacingConfig {
    /// Pause after each line of a frame.
    pub line_delay_ms: u32,
    /// Pause at the end of every loop iteration.
    pub loop_delay_ms: u32,
}

impl PacingConfig {
    pub const DEFAULT: Self = Self {
        line_delay_ms: 10,
        loop_delay_ms: 10,
    };

    /// No pauses at all (host tests).
    pub const NONE: Self = Self {
        line_delay_ms: 0,
        loop_delay_ms: 0,
    };
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Where and how payloads are published.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PublishConfig {
    pub topic: &'static str,
    pub qos: QoS,
    pub retain: bool,
    /// Bound on a single transport handoff.
    pub timeout_ms: u64,
}

impl PublishConfig {
    pub const DEFAULT: Self = Self {
        topic: DEFAULT_TOPIC,
        qos: QoS::AtMostOnce,
        retain: false,
        timeout_ms: 15_000,
    };
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// MQTT broker the modem connects to before publishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BrokerConfig {
    pub host: &'static str,
    pub port: u16,
    pub client_id: &'static str,
    pub username: &'static str,
    pub password: &'static str,
    /// Pause after each command line while the modem processes it.
    pub command_gap_ms: u32,
}

impl BrokerConfig {
    pub const DEFAULT: Self = Self {
        host: "cloud.monoz.io",
        port: 1883,
        client_id: "GPSTest",
        username: "GPSTest",
        password: "GPSTest",
        command_gap_ms: 1_000,
    };
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Complete worker configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TelemetryConfig {
    pub schedule: ScheduleConfig,
    pub pacing: PacingConfig,
    pub publish: PublishConfig,
    pub broker: BrokerConfig,
    pub hemisphere: HemispherePolicy,
}

impl TelemetryConfig {
    pub const DEFAULT: Self = Self {
        schedule: ScheduleConfig::DEFAULT,
        pacing: PacingConfig::DEFAULT,
        publish: PublishConfig::DEFAULT,
        broker: BrokerConfig::DEFAULT,
        hemisphere: HemispherePolicy::Signed,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_const() {
        assert_eq!(TelemetryConfig::default(), TelemetryConfig::DEFAULT);
    }

    #[test]
    fn test_default_cadence() {
        let config = TelemetryConfig::DEFAULT;
        assert_eq!(config.schedule.read_period_ms, 90_000);
        assert_eq!(config.schedule.settle_period_ms, 120_000);
        assert_eq!(config.publish.topic, "v1/devices/me/telemetry");
        assert_eq!(config.publish.qos.level(), 0);
        assert!(!config.publish.retain);
        assert_eq!(config.broker.port, 1883);
        assert!(u64::from(config.broker.command_gap_ms) * 4 < config.publish.timeout_ms);
    }
}
