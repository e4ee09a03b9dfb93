use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

/// Lifecycle state of a `Booking`.
///
/// `Pending` is the initial state. `Completed` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("Booking can not transition from `{from}` to `{to}`")]
pub struct InvalidTransition {
    pub from: BookingStatus,
    pub to: BookingStatus,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid booking status: `{0}`")]
pub struct InvalidStatusError(pub String);

impl BookingStatus {
    /// The legal transitions. Everything not listed here is rejected,
    /// including a transition to the current status.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed) | (Confirmed, Completed) | (Pending, Cancelled) | (Confirmed, Cancelled)
        )
    }

    pub fn transition(self, next: BookingStatus) -> Result<BookingStatus, InvalidTransition> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Active bookings are the ones that still should receive reminders
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl Default for BookingStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = InvalidStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "completed" => Ok(Self::Completed),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            _ => Err(InvalidStatusError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::BookingStatus::*;
    use super::*;

    #[test]
    fn happy_path_transitions() {
        let status = Pending.transition(Confirmed).unwrap();
        let status = status.transition(Completed).unwrap();
        assert_eq!(status, Completed);
    }

    #[test]
    fn rejects_skipping_confirmation() {
        assert_eq!(
            Pending.transition(Completed),
            Err(InvalidTransition {
                from: Pending,
                to: Completed
            })
        );
    }

    #[test]
    fn cancellation_only_from_non_terminal_states() {
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Cancelled));
    }

    #[test]
    fn terminal_states_are_final() {
        for next in [Pending, Confirmed, Completed, Cancelled] {
            assert!(Completed.transition(next).is_err());
            assert!(Cancelled.transition(next).is_err());
        }
        assert!(Confirmed.transition(Pending).is_err());
        assert!(Pending.transition(Pending).is_err());
    }

    #[test]
    fn parses_statuses() {
        assert_eq!("Confirmed".parse::<BookingStatus>(), Ok(Confirmed));
        assert_eq!("canceled".parse::<BookingStatus>(), Ok(Cancelled));
        assert!("done".parse::<BookingStatus>().is_err());
        assert_eq!(Completed.to_string(), "completed");
    }
}
