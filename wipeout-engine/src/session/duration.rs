//! Session length selection
//!
//! The prompt offers a few quick choices plus a custom entry. A custom
//! entry must be a positive, finite number of minutes; anything else is
//! rejected and the caller gets no session.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use wipeout_utils::{Result, WipeoutError};

/// A validated session length in minutes
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Minutes(f64);

impl Minutes {
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() || value <= 0.0 {
            return Err(WipeoutError::InvalidDuration(value.to_string()));
        }
        // Also rejects lengths too large to represent as a Duration
        Duration::try_from_secs_f64(value * 60.0)
            .map_err(|_| WipeoutError::InvalidDuration(value.to_string()))?;
        Ok(Self(value))
    }

    /// Parse a custom entry such as `"25"` or `" 7.5 "`
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let value: f64 = trimmed
            .parse()
            .map_err(|_| WipeoutError::InvalidDuration(trimmed.to_string()))?;
        Self::new(value)
    }

    pub fn get(self) -> f64 {
        self.0
    }

    pub fn as_duration(self) -> Duration {
        Duration::from_secs_f64(self.0 * 60.0)
    }
}

impl TryFrom<f64> for Minutes {
    type Error = WipeoutError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl fmt::Display for Minutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.fract() == 0.0 {
            write!(f, "{:.0} min", self.0)
        } else {
            write!(f, "{} min", self.0)
        }
    }
}

/// What the user did in the duration dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DurationChoice {
    /// One of the preset lengths
    Quick(u32),
    /// Free-form entry, validated on resolve
    Custom(String),
    Cancel,
}

impl DurationChoice {
    /// `Ok(None)` means cancelled; invalid custom input is an error
    pub fn resolve(&self) -> Result<Option<Minutes>> {
        match self {
            DurationChoice::Quick(minutes) => Minutes::new(f64::from(*minutes)).map(Some),
            DurationChoice::Custom(input) => Minutes::parse(input).map(Some),
            DurationChoice::Cancel => Ok(None),
        }
    }
}

/// The duration dialog collaborator
pub trait DurationPrompt: Send + Sync {
    /// Ask for a session length; `None` if the user cancelled
    fn pick(&self) -> impl Future<Output = Option<Minutes>> + Send;
}

/// A prompt whose answer is already known (command line flag, bridge message)
#[derive(Debug, Clone, Copy)]
pub struct FixedDuration(Option<Minutes>);

impl FixedDuration {
    pub fn new(minutes: Option<Minutes>) -> Self {
        Self(minutes)
    }

    pub fn cancelled() -> Self {
        Self(None)
    }
}

impl DurationPrompt for FixedDuration {
    async fn pick(&self) -> Option<Minutes> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_entries() {
        assert_eq!(Minutes::parse("25").unwrap().get(), 25.0);
        assert_eq!(Minutes::parse(" 7.5 ").unwrap().get(), 7.5);
        assert_eq!(Minutes::parse("0.1").unwrap().as_duration(), Duration::from_secs(6));
    }

    #[test]
    fn test_parse_rejects_invalid_entries() {
        for input in ["", "abc", "0", "-3", "NaN", "inf", "-inf", "1e300"] {
            let err = Minutes::parse(input).unwrap_err();
            assert!(
                matches!(err, WipeoutError::InvalidDuration(_)),
                "expected {:?} to be rejected",
                input
            );
        }
    }

    #[test]
    fn test_try_from_f64() {
        assert!(Minutes::try_from(10.0).is_ok());
        assert!(Minutes::try_from(f64::NAN).is_err());
        assert!(Minutes::try_from(0.0).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Minutes::new(10.0).unwrap().to_string(), "10 min");
        assert_eq!(Minutes::new(2.5).unwrap().to_string(), "2.5 min");
    }

    #[test]
    fn test_choice_resolution() {
        assert_eq!(
            DurationChoice::Quick(15).resolve().unwrap(),
            Some(Minutes::new(15.0).unwrap())
        );
        assert_eq!(
            DurationChoice::Custom("12".into()).resolve().unwrap(),
            Some(Minutes::new(12.0).unwrap())
        );
        assert_eq!(DurationChoice::Cancel.resolve().unwrap(), None);
        assert!(DurationChoice::Custom("-1".into()).resolve().is_err());
        assert!(DurationChoice::Quick(0).resolve().is_err());
    }

    #[tokio::test]
    async fn test_fixed_duration_prompt() {
        let minutes = Minutes::new(5.0).unwrap();
        assert_eq!(FixedDuration::new(Some(minutes)).pick().await, Some(minutes));
        assert_eq!(FixedDuration::cancelled().pick().await, None);
    }
}
