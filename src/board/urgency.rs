//! Waiting-time classification.
//!
//! The bucket depends on the current time, so it is recomputed for every
//! view and never stored on the ticket.

use std::fmt;
use std::str::FromStr;

use jiff::{SignedDuration, Timestamp};

use crate::error::{MesaError, Result};

/// Tickets waiting this long or less are green.
pub const GREEN_MAX_MINUTES: i64 = 20;
/// Tickets waiting this long or less (but over [`GREEN_MAX_MINUTES`]) are yellow.
pub const YELLOW_MAX_MINUTES: i64 = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UrgencyBucket {
    Green,
    Yellow,
    Red,
}

/// Classify a ticket created at `created` as seen at `now`.
///
/// A creation time in the future counts as no wait at all.
pub fn urgency_bucket(now: Timestamp, created: Timestamp) -> UrgencyBucket {
    let waited = now.duration_since(created);
    if waited <= SignedDuration::from_mins(GREEN_MAX_MINUTES) {
        UrgencyBucket::Green
    } else if waited <= SignedDuration::from_mins(YELLOW_MAX_MINUTES) {
        UrgencyBucket::Yellow
    } else {
        UrgencyBucket::Red
    }
}

impl fmt::Display for UrgencyBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrgencyBucket::Green => write!(f, "green"),
            UrgencyBucket::Yellow => write!(f, "yellow"),
            UrgencyBucket::Red => write!(f, "red"),
        }
    }
}

impl FromStr for UrgencyBucket {
    type Err = MesaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "green" | "verde" => Ok(UrgencyBucket::Green),
            "yellow" | "amarillo" => Ok(UrgencyBucket::Yellow),
            "red" | "rojo" => Ok(UrgencyBucket::Red),
            _ => Err(MesaError::InvalidUrgency(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ago(now: Timestamp, minutes: i64, seconds: i64) -> Timestamp {
        now - SignedDuration::from_mins(minutes) - SignedDuration::from_secs(seconds)
    }

    #[test]
    fn test_bucket_boundaries() {
        let now: Timestamp = "2026-02-18T15:00:00Z".parse().unwrap();
        assert_eq!(urgency_bucket(now, ago(now, 19, 0)), UrgencyBucket::Green);
        assert_eq!(urgency_bucket(now, ago(now, 20, 0)), UrgencyBucket::Green);
        assert_eq!(urgency_bucket(now, ago(now, 20, 1)), UrgencyBucket::Yellow);
        assert_eq!(urgency_bucket(now, ago(now, 21, 0)), UrgencyBucket::Yellow);
        assert_eq!(urgency_bucket(now, ago(now, 40, 0)), UrgencyBucket::Yellow);
        assert_eq!(urgency_bucket(now, ago(now, 40, 1)), UrgencyBucket::Red);
        assert_eq!(urgency_bucket(now, ago(now, 41, 0)), UrgencyBucket::Red);
    }

    #[test]
    fn test_future_creation_is_green() {
        let now: Timestamp = "2026-02-18T15:00:00Z".parse().unwrap();
        let future = now + SignedDuration::from_mins(5);
        assert_eq!(urgency_bucket(now, future), UrgencyBucket::Green);
    }

    #[test]
    fn test_from_str_accepts_spanish() {
        assert_eq!("verde".parse::<UrgencyBucket>().unwrap(), UrgencyBucket::Green);
        assert_eq!("AMARILLO".parse::<UrgencyBucket>().unwrap(), UrgencyBucket::Yellow);
        assert_eq!("red".parse::<UrgencyBucket>().unwrap(), UrgencyBucket::Red);
        assert!("blue".parse::<UrgencyBucket>().is_err());
    }
}
