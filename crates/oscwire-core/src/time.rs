//! OSC timetags
//!
//! A timetag is a 64-bit NTP-format timestamp: whole seconds since midnight
//! 1 January 1900 UTC, plus fractional seconds in units of 1/2³² s. The
//! reserved value `(0, 1)` means "execute immediately".

use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Seconds between the NTP epoch (1 Jan 1900) and the Unix epoch (1 Jan 1970)
const NTP_UNIX_OFFSET_SECS: u64 = 2_208_988_800;

/// An OSC timetag
///
/// Ordering and equality compare the raw `(seconds, fractional)` pair;
/// derived wall-clock dates are never compared (they lose precision).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct TimeTag {
    /// Whole seconds since the NTP epoch
    pub seconds: u32,
    /// Fractional seconds in units of 1/2³² s
    pub fractional: u32,
}

impl TimeTag {
    /// The reserved "execute immediately" value
    pub const IMMEDIATE: TimeTag = TimeTag {
        seconds: 0,
        fractional: 1,
    };

    pub fn new(seconds: u32, fractional: u32) -> Self {
        Self {
            seconds,
            fractional,
        }
    }

    /// Whether this is the reserved immediate value
    ///
    /// Only the exact pair `(0, 1)` is immediate; every other `(0, x)` value
    /// is an ordinary timestamp.
    pub fn is_immediate(&self) -> bool {
        *self == Self::IMMEDIATE
    }

    /// Current wall-clock time as a timetag
    pub fn now() -> Self {
        Self::from_system_time(SystemTime::now())
    }

    /// Convert from a wall-clock instant
    ///
    /// Instants before the Unix epoch clamp to it; the NTP era rolls over in
    /// 2036, matching the 32-bit wire field.
    pub fn from_system_time(time: SystemTime) -> Self {
        let since_unix = time
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO);
        let seconds = (since_unix.as_secs() + NTP_UNIX_OFFSET_SECS) as u32;
        let fractional = ((since_unix.subsec_nanos() as u64) << 32) / 1_000_000_000;
        Self {
            seconds,
            fractional: fractional as u32,
        }
    }

    /// Convert to a wall-clock instant
    pub fn to_system_time(&self) -> SystemTime {
        let nanos = ((self.fractional as u64) * 1_000_000_000) >> 32;
        let since_ntp = Duration::new(self.seconds as u64, nanos as u32);
        UNIX_EPOCH - Duration::from_secs(NTP_UNIX_OFFSET_SECS) + since_ntp
    }
}

impl From<SystemTime> for TimeTag {
    fn from(time: SystemTime) -> Self {
        Self::from_system_time(time)
    }
}

impl From<TimeTag> for SystemTime {
    fn from(tag: TimeTag) -> Self {
        tag.to_system_time()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_immediate() {
        assert!(TimeTag::IMMEDIATE.is_immediate());
        assert!(!TimeTag::new(0, 2).is_immediate());
        assert!(!TimeTag::new(1, 1).is_immediate());
        assert!(!TimeTag::new(0, 0).is_immediate());
    }

    #[test]
    fn test_ordering_on_pair() {
        assert!(TimeTag::new(1, 0) < TimeTag::new(2, 0));
        assert!(TimeTag::new(1, 5) < TimeTag::new(1, 6));
        assert!(TimeTag::new(0, u32::MAX) < TimeTag::new(1, 0));
        assert_eq!(TimeTag::new(3, 7), TimeTag::new(3, 7));
    }

    #[test]
    fn test_system_time_roundtrip() {
        let time = UNIX_EPOCH + Duration::new(1_700_000_000, 250_000_000);
        let tag = TimeTag::from_system_time(time);
        let back = tag.to_system_time();

        let drift = if back > time {
            back.duration_since(time).unwrap()
        } else {
            time.duration_since(back).unwrap()
        };
        // fractional field resolves well below a microsecond
        assert!(drift < Duration::from_micros(1));
    }

    #[test]
    fn test_epoch_offset() {
        let tag = TimeTag::from_system_time(UNIX_EPOCH);
        assert_eq!(tag.seconds, 2_208_988_800);
        assert_eq!(tag.fractional, 0);
    }
}
