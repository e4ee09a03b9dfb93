use crate::booking::Booking;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

const MILLIS_PER_HOUR: f64 = 1000.0 * 60.0 * 60.0;

/// The reminder notifications sent ahead of an appointment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReminderWindow {
    WeekBefore,
    DayBefore,
    TwoHours,
}

impl ReminderWindow {
    pub const ALL: [ReminderWindow; 3] = [Self::WeekBefore, Self::DayBefore, Self::TwoHours];

    /// Inclusive band of hours before the appointment in which the reminder fires.
    /// The bands are wide enough for a pass running every one or two hours to
    /// land inside them at least once.
    pub fn trigger_band_hours(&self) -> (f64, f64) {
        match self {
            Self::WeekBefore => (144.0, 192.0),
            Self::DayBefore => (23.0, 25.0),
            Self::TwoHours => (1.5, 2.5),
        }
    }

    pub fn in_band(&self, hours_until_appointment: f64) -> bool {
        let (min, max) = self.trigger_band_hours();
        hours_until_appointment >= min && hours_until_appointment <= max
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WeekBefore => "week_before",
            Self::DayBefore => "day_before",
            Self::TwoHours => "two_hours",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::WeekBefore => "in one week",
            Self::DayBefore => "tomorrow",
            Self::TwoHours => "in two hours",
        }
    }
}

impl Display for ReminderWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DueReminder {
    pub booking: Booking,
    pub window: ReminderWindow,
}

/// The reminder windows that are currently due for a `Booking`.
/// Only active bookings starting after `now` can have due reminders, and a
/// window that was already sent is never due again.
pub fn due_windows(booking: &Booking, now: i64, tz: &Tz) -> Vec<ReminderWindow> {
    if !booking.status.is_active() {
        return Vec::new();
    }
    let start = match booking.start_ts(tz) {
        Some(start) if start > now => start,
        _ => return Vec::new(),
    };
    let hours_until = (start - now) as f64 / MILLIS_PER_HOUR;

    ReminderWindow::ALL
        .iter()
        .copied()
        .filter(|window| window.in_band(hours_until) && !booking.reminders.is_sent(*window))
        .collect()
}

pub fn due_reminders<I>(bookings: I, now: i64, tz: &Tz) -> Vec<DueReminder>
where
    I: IntoIterator<Item = Booking>,
{
    bookings
        .into_iter()
        .flat_map(|booking| {
            due_windows(&booking, now, tz)
                .into_iter()
                .map(|window| DueReminder {
                    booking: booking.clone(),
                    window,
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::tests::booking_factory;
    use crate::status::BookingStatus;
    use chrono::prelude::*;

    const HOUR: i64 = 1000 * 60 * 60;

    fn appointment_start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 14, 0, 0).unwrap()
    }

    fn booking() -> Booking {
        let start = appointment_start();
        booking_factory(start.date_naive(), start.time(), 60)
    }

    /// `now` such that the appointment starts in `hours` hours
    fn now_before(hours: f64) -> i64 {
        appointment_start().timestamp_millis() - (hours * HOUR as f64) as i64
    }

    fn windows_at(booking: &Booking, hours: f64) -> Vec<ReminderWindow> {
        due_windows(booking, now_before(hours), &chrono_tz::UTC)
    }

    #[test]
    fn day_before_band_edges() {
        let booking = booking();
        assert_eq!(windows_at(&booking, 24.0), vec![ReminderWindow::DayBefore]);
        assert_eq!(windows_at(&booking, 23.0), vec![ReminderWindow::DayBefore]);
        assert_eq!(windows_at(&booking, 25.0), vec![ReminderWindow::DayBefore]);
        assert!(windows_at(&booking, 22.9).is_empty());
        assert!(windows_at(&booking, 25.1).is_empty());
    }

    #[test]
    fn week_before_band_edges() {
        let booking = booking();
        assert_eq!(windows_at(&booking, 144.0), vec![ReminderWindow::WeekBefore]);
        assert_eq!(windows_at(&booking, 168.0), vec![ReminderWindow::WeekBefore]);
        assert_eq!(windows_at(&booking, 192.0), vec![ReminderWindow::WeekBefore]);
        assert!(windows_at(&booking, 143.5).is_empty());
        assert!(windows_at(&booking, 192.5).is_empty());
    }

    #[test]
    fn two_hours_band_edges() {
        let booking = booking();
        assert_eq!(windows_at(&booking, 2.0), vec![ReminderWindow::TwoHours]);
        assert_eq!(windows_at(&booking, 1.5), vec![ReminderWindow::TwoHours]);
        assert_eq!(windows_at(&booking, 2.5), vec![ReminderWindow::TwoHours]);
        assert!(windows_at(&booking, 1.4).is_empty());
        assert!(windows_at(&booking, 2.6).is_empty());
    }

    #[test]
    fn sent_windows_are_not_due() {
        let mut booking = booking();
        booking.reminders.mark(ReminderWindow::DayBefore, 1);
        assert!(windows_at(&booking, 24.0).is_empty());
        assert_eq!(windows_at(&booking, 2.0), vec![ReminderWindow::TwoHours]);
    }

    #[test]
    fn only_active_future_bookings_have_due_reminders() {
        let mut booking = booking();
        booking.status = BookingStatus::Confirmed;
        assert_eq!(windows_at(&booking, 24.0).len(), 1);

        for status in [BookingStatus::Cancelled, BookingStatus::Completed] {
            booking.status = status;
            assert!(windows_at(&booking, 24.0).is_empty());
        }

        booking.status = BookingStatus::Pending;
        assert!(windows_at(&booking, -1.0).is_empty());
        assert!(windows_at(&booking, 0.0).is_empty());
    }

    #[test]
    fn collects_descriptors_for_many_bookings() {
        let tomorrow = booking();
        let mut next_week = booking();
        next_week.date = next_week.date + chrono::Duration::days(6);
        let mut cancelled = booking();
        cancelled.status = BookingStatus::Cancelled;

        let due = due_reminders(
            vec![tomorrow.clone(), next_week.clone(), cancelled],
            now_before(24.0),
            &chrono_tz::UTC,
        );
        assert_eq!(due.len(), 2);
        assert_eq!(due[0].booking.id, tomorrow.id);
        assert_eq!(due[0].window, ReminderWindow::DayBefore);
        assert_eq!(due[1].booking.id, next_week.id);
        assert_eq!(due[1].window, ReminderWindow::WeekBefore);
    }
}
