//! Duration value object

use std::fmt;
use std::str::FromStr;
use std::time::Duration as StdDuration;

use crate::domain::error::DurationParseError;

/// Default warm-up skipped at the beginning of a microphone recording (300 ms)
pub const DEFAULT_WARMUP_MS: u64 = 300;

/// Value object representing a time span of a recording.
/// Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Duration {
    milliseconds: u64,
}

impl Duration {
    /// A zero-length duration
    pub const ZERO: Self = Self::from_millis(0);

    /// Create a Duration from milliseconds
    pub const fn from_millis(ms: u64) -> Self {
        Self { milliseconds: ms }
    }

    /// Create a Duration from seconds
    pub const fn from_secs(secs: u64) -> Self {
        Self {
            milliseconds: secs * 1000,
        }
    }

    /// Default microphone warm-up
    pub const fn default_warmup() -> Self {
        Self::from_millis(DEFAULT_WARMUP_MS)
    }

    /// Get duration in seconds
    pub const fn as_secs(&self) -> u64 {
        self.milliseconds / 1000
    }

    /// Get duration in milliseconds
    pub const fn as_millis(&self) -> u64 {
        self.milliseconds
    }

    /// Check for a zero-length duration
    pub const fn is_zero(&self) -> bool {
        self.milliseconds == 0
    }

    /// Convert to std::time::Duration
    pub const fn as_std(&self) -> StdDuration {
        StdDuration::from_millis(self.milliseconds)
    }

    /// Number of samples this duration spans at `sample_rate` (rounded down)
    pub fn samples_at(&self, sample_rate: u32) -> usize {
        let samples = self.milliseconds.saturating_mul(u64::from(sample_rate)) / 1000;
        usize::try_from(samples).unwrap_or(usize::MAX)
    }
}

impl FromStr for Duration {
    type Err = DurationParseError;

    /// Parse a duration string such as "30s", "1m", "2m30s" or "90s".
    /// Zero durations are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim().to_lowercase();
        let invalid = || DurationParseError {
            input: s.to_string(),
        };

        let mut minutes: u64 = 0;
        let mut seconds: u64 = 0;
        let mut current_num = String::new();
        let mut found_any = false;

        for ch in input.chars() {
            match ch {
                '0'..='9' => current_num.push(ch),
                'm' | 's' if !current_num.is_empty() => {
                    let value: u64 = current_num.parse().map_err(|_| invalid())?;
                    if ch == 'm' {
                        minutes = value;
                    } else {
                        seconds = value;
                    }
                    current_num.clear();
                    found_any = true;
                }
                _ => return Err(invalid()),
            }
        }

        if !current_num.is_empty() || !found_any {
            return Err(invalid());
        }

        let total_ms = (minutes * 60 + seconds) * 1000;
        if total_ms == 0 {
            return Err(invalid());
        }

        Ok(Self::from_millis(total_ms))
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.milliseconds % 1000 != 0 {
            return write!(f, "{}ms", self.milliseconds);
        }

        let total_secs = self.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;

        if minutes == 0 {
            write!(f, "{}s", seconds)
        } else if seconds == 0 {
            write!(f, "{}m", minutes)
        } else {
            write!(f, "{}m{}s", minutes, seconds)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_seconds_only() {
        let d: Duration = "30s".parse().unwrap();
        assert_eq!(d.as_secs(), 30);
        assert_eq!(d.as_millis(), 30000);
    }

    #[test]
    fn parse_minutes_and_seconds() {
        let d: Duration = "2m30s".parse().unwrap();
        assert_eq!(d.as_secs(), 150);
    }

    #[test]
    fn parse_case_insensitive_with_whitespace() {
        let d: Duration = "  1M30S ".parse().unwrap();
        assert_eq!(d.as_secs(), 90);
    }

    #[test]
    fn parse_rejects_zero_and_garbage() {
        assert!("".parse::<Duration>().is_err());
        assert!("0s".parse::<Duration>().is_err());
        assert!("30".parse::<Duration>().is_err());
        assert!("30x".parse::<Duration>().is_err());
        assert!("s".parse::<Duration>().is_err());
    }

    #[test]
    fn display_forms() {
        assert_eq!(Duration::from_secs(30).to_string(), "30s");
        assert_eq!(Duration::from_secs(120).to_string(), "2m");
        assert_eq!(Duration::from_secs(150).to_string(), "2m30s");
        assert_eq!(Duration::from_millis(300).to_string(), "300ms");
    }

    #[test]
    fn samples_at_rate() {
        assert_eq!(Duration::from_millis(300).samples_at(44100), 13230);
        assert_eq!(Duration::from_secs(1).samples_at(16000), 16000);
        assert_eq!(Duration::ZERO.samples_at(48000), 0);
    }

    #[test]
    fn samples_at_saturates_on_huge_durations() {
        let huge = Duration::from_millis(u64::MAX);
        assert_eq!(huge.samples_at(48000), usize::try_from(u64::MAX / 1000).unwrap_or(usize::MAX));
    }

    #[test]
    fn default_warmup_is_300ms() {
        assert_eq!(Duration::default_warmup().as_millis(), 300);
        assert!(Duration::default().is_zero());
    }
}
