//! Timeout budget value type.
//!
//! A [`Period`] is the caller-facing description of how long a retrying
//! chain is allowed to keep attempting an operation. Periods are pure data -
//! no clocks, no side effects - which keeps them easy to test, clone, and
//! display inside call-chain diagnostics.
//!
//! # Examples
//!
//! ```
//! use slackwater::Period;
//! use std::time::Duration;
//!
//! let budget = Period::secs(5);
//! assert_eq!(budget.how_long(), 5);
//! assert_eq!(budget.as_duration(), Duration::from_secs(5));
//! assert_eq!(budget.to_string(), "5 seconds");
//! ```

use std::fmt;
use std::time::Duration;

/// The unit a [`Period`] amount is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimeUnit {
    /// Milliseconds.
    Millis,
    /// Seconds.
    Seconds,
    /// Minutes.
    Minutes,
}

impl TimeUnit {
    fn as_millis(self) -> u64 {
        match self {
            TimeUnit::Millis => 1,
            TimeUnit::Seconds => 1_000,
            TimeUnit::Minutes => 60_000,
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeUnit::Millis => write!(f, "millis"),
            TimeUnit::Seconds => write!(f, "seconds"),
            TimeUnit::Minutes => write!(f, "minutes"),
        }
    }
}

/// A timeout budget: an amount plus the unit it is expressed in.
///
/// Attached to a chain via `within(period)`, a period bounds how long the
/// retry engine keeps re-attempting transient failures. Zero-length periods
/// are legal and mean "one attempt through the retrying code path" - useful
/// for exercising the retry machinery itself.
///
/// # Examples
///
/// ```
/// use slackwater::{Period, TimeUnit};
///
/// let p = Period::of(250, TimeUnit::Millis);
/// assert_eq!(p, Period::millis(250));
/// assert!(!p.is_zero());
/// assert!(Period::secs(0).is_zero());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Period {
    amount: u64,
    unit: TimeUnit,
}

impl Period {
    /// Create a period from an amount and a unit.
    pub fn of(amount: u64, unit: TimeUnit) -> Self {
        Period { amount, unit }
    }

    /// A period of `amount` milliseconds.
    pub fn millis(amount: u64) -> Self {
        Period::of(amount, TimeUnit::Millis)
    }

    /// A period of `amount` seconds.
    pub fn secs(amount: u64) -> Self {
        Period::of(amount, TimeUnit::Seconds)
    }

    /// A period of `amount` minutes.
    pub fn mins(amount: u64) -> Self {
        Period::of(amount, TimeUnit::Minutes)
    }

    /// The raw amount, in the period's own unit.
    pub fn how_long(&self) -> u64 {
        self.amount
    }

    /// The unit the amount is expressed in.
    pub fn unit(&self) -> TimeUnit {
        self.unit
    }

    /// The period as a [`Duration`], for deadline arithmetic.
    pub fn as_duration(&self) -> Duration {
        Duration::from_millis(self.amount.saturating_mul(self.unit.as_millis()))
    }

    /// True if the budget is empty.
    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.unit)
    }
}

#[cfg(feature = "proptest")]
use proptest::prelude::*;

#[cfg(feature = "proptest")]
impl Arbitrary for Period {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (0u64..3_600, prop_oneof![
            Just(TimeUnit::Millis),
            Just(TimeUnit::Seconds),
            Just(TimeUnit::Minutes),
        ])
            .prop_map(|(amount, unit)| Period::of(amount, unit))
            .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_agree() {
        assert_eq!(Period::millis(10), Period::of(10, TimeUnit::Millis));
        assert_eq!(Period::secs(2), Period::of(2, TimeUnit::Seconds));
        assert_eq!(Period::mins(1), Period::of(1, TimeUnit::Minutes));
    }

    #[test]
    fn test_as_duration() {
        assert_eq!(Period::millis(250).as_duration(), Duration::from_millis(250));
        assert_eq!(Period::secs(3).as_duration(), Duration::from_secs(3));
        assert_eq!(Period::mins(2).as_duration(), Duration::from_secs(120));
    }

    #[test]
    fn test_zero_period_is_legal() {
        let p = Period::secs(0);
        assert!(p.is_zero());
        assert_eq!(p.as_duration(), Duration::ZERO);
    }

    #[test]
    fn test_display() {
        assert_eq!(Period::secs(5).to_string(), "5 seconds");
        assert_eq!(Period::millis(500).to_string(), "500 millis");
        assert_eq!(Period::mins(1).to_string(), "1 minutes");
    }

    #[test]
    fn test_accessors() {
        let p = Period::of(7, TimeUnit::Seconds);
        assert_eq!(p.how_long(), 7);
        assert_eq!(p.unit(), TimeUnit::Seconds);
    }

    #[test]
    fn test_overflow_saturates() {
        let p = Period::mins(u64::MAX);
        // Saturates instead of wrapping; still a valid (huge) duration.
        assert!(p.as_duration() >= Duration::from_secs(1));
    }

    #[cfg(feature = "serde")]
    mod serde_tests {
        use super::*;

        #[test]
        fn test_period_round_trip() {
            let p = Period::secs(30);
            let json = serde_json::to_string(&p).unwrap();
            let back: Period = serde_json::from_str(&json).unwrap();
            assert_eq!(p, back);
        }
    }
}
