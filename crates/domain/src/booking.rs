use crate::{
    duration::format_duration,
    external_appointment::SyncedBookingFields,
    reminder::ReminderWindow,
    service::ServiceType,
    shared::entity::{Entity, ID},
    status::BookingStatus,
    user::User,
};
use chrono::prelude::*;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Where a `Booking` was first discovered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingSource {
    #[serde(rename = "direct")]
    Direct,
    #[serde(rename = "external-sync")]
    ExternalSync,
}

impl BookingSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::ExternalSync => "external-sync",
        }
    }

    pub fn from_db(source: &str) -> Self {
        match source {
            "external-sync" => Self::ExternalSync,
            _ => Self::Direct,
        }
    }
}

/// Timestamps (millis) of when each reminder window was sent.
/// A marker is never cleared once it is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReminderMarkers {
    pub week_before: Option<i64>,
    pub day_before: Option<i64>,
    pub two_hours: Option<i64>,
}

impl ReminderMarkers {
    pub fn sent_at(&self, window: ReminderWindow) -> Option<i64> {
        match window {
            ReminderWindow::WeekBefore => self.week_before,
            ReminderWindow::DayBefore => self.day_before,
            ReminderWindow::TwoHours => self.two_hours,
        }
    }

    pub fn is_sent(&self, window: ReminderWindow) -> bool {
        self.sent_at(window).is_some()
    }

    /// Sets the marker if it is not already set and returns whether it flipped
    pub fn mark(&mut self, window: ReminderWindow, at: i64) -> bool {
        let marker = match window {
            ReminderWindow::WeekBefore => &mut self.week_before,
            ReminderWindow::DayBefore => &mut self.day_before,
            ReminderWindow::TwoHours => &mut self.two_hours,
        };
        if marker.is_some() {
            return false;
        }
        *marker = Some(at);
        true
    }
}

/// A message sent to the client outside of the regular reminder flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrgentMessage {
    pub text: String,
    pub sender: String,
    pub sent_at: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    pub id: ID,
    /// Identifier of the appointment in the external scheduling service
    pub external_id: Option<String>,
    /// `None` for bookings discovered by sync that belong to no local account
    pub user_id: Option<ID>,
    pub user_name: String,
    /// Can be empty for synced bookings where the contact had no email
    pub user_email: String,
    pub user_phone: Option<String>,
    pub service: ServiceType,
    pub date: NaiveDate,
    pub time: NaiveTime,
    /// Human readable duration, e.g. `1 hour, 15 minutes`
    pub duration: String,
    pub duration_minutes: i64,
    pub notes: Option<String>,
    pub meeting_link: Option<String>,
    pub status: BookingStatus,
    pub created: i64,
    pub updated: i64,
    pub reminders: ReminderMarkers,
    pub urgent_messages: Vec<UrgentMessage>,
    pub source: BookingSource,
    pub last_synced: Option<i64>,
}

/// Validated input for a booking created directly through the API
#[derive(Debug, Clone)]
pub struct NewDirectBooking {
    pub user: User,
    pub service: ServiceType,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration: String,
    pub duration_minutes: i64,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

impl Booking {
    pub fn new_direct(params: NewDirectBooking, now: i64) -> Self {
        Self {
            id: Default::default(),
            external_id: None,
            user_id: Some(params.user.id.clone()),
            user_name: params.user.name,
            user_email: params.user.email,
            user_phone: params.phone,
            service: params.service,
            date: params.date,
            time: params.time,
            duration: params.duration,
            duration_minutes: params.duration_minutes,
            notes: params.notes,
            meeting_link: None,
            status: BookingStatus::Pending,
            created: now,
            updated: now,
            reminders: Default::default(),
            urgent_messages: Vec::new(),
            source: BookingSource::Direct,
            last_synced: None,
        }
    }

    pub fn from_synced(fields: SyncedBookingFields, now: i64) -> Self {
        let mut booking = Self {
            id: Default::default(),
            external_id: Some(fields.external_id.clone()),
            user_id: None,
            user_name: String::new(),
            user_email: String::new(),
            user_phone: None,
            service: fields.service,
            date: fields.date,
            time: fields.time,
            duration: format_duration(fields.duration_minutes),
            duration_minutes: fields.duration_minutes,
            notes: None,
            meeting_link: None,
            status: fields.status,
            created: now,
            updated: now,
            reminders: Default::default(),
            urgent_messages: Vec::new(),
            source: BookingSource::ExternalSync,
            last_synced: Some(now),
        };
        booking.apply_synced(fields, now);
        booking
    }

    /// Refreshes every externally sourced field. Reminder markers and the
    /// urgent message log are left untouched.
    pub fn apply_synced(&mut self, fields: SyncedBookingFields, now: i64) {
        self.external_id = Some(fields.external_id);
        self.user_name = fields.user_name;
        self.user_email = fields.user_email;
        self.user_phone = fields.user_phone;
        self.service = fields.service;
        self.date = fields.date;
        self.time = fields.time;
        self.duration = fields.duration;
        self.duration_minutes = fields.duration_minutes;
        self.notes = fields.notes;
        self.meeting_link = fields.meeting_link;
        self.status = fields.status;
        self.updated = now;
        self.last_synced = Some(now);
    }

    /// The appointment start in the practice timezone. `None` if the local
    /// time does not exist in that timezone (skipped by a DST change).
    pub fn start_datetime(&self, tz: &Tz) -> Option<DateTime<Tz>> {
        tz.from_local_datetime(&self.date.and_time(self.time))
            .earliest()
    }

    pub fn start_ts(&self, tz: &Tz) -> Option<i64> {
        self.start_datetime(tz).map(|dt| dt.timestamp_millis())
    }

    pub fn is_owned_by(&self, user: &User) -> bool {
        self.user_id.as_ref() == Some(&user.id)
    }

    /// Admins can manage every booking, clients only their own
    pub fn can_be_managed_by(&self, user: &User) -> bool {
        user.is_admin() || self.is_owned_by(user)
    }

    pub fn has_recipient(&self) -> bool {
        !self.user_email.trim().is_empty()
    }
}

impl Entity for Booking {
    fn id(&self) -> &ID {
        &self.id
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::user::Role;
    use chrono::Duration;

    pub fn booking_factory(date: NaiveDate, time: NaiveTime, duration_minutes: i64) -> Booking {
        let user = User::new("client@example.com", "Client", Role::Client);
        Booking::new_direct(
            NewDirectBooking {
                user,
                service: ServiceType::IndividualTherapy,
                date,
                time,
                duration: format_duration(duration_minutes),
                duration_minutes,
                phone: None,
                notes: None,
            },
            0,
        )
    }

    #[test]
    fn computes_interval_in_practice_timezone() {
        let booking = booking_factory(
            NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            75,
        );
        let start = Utc.with_ymd_and_hms(2024, 7, 1, 14, 0, 0).unwrap();
        assert_eq!(
            booking.start_ts(&chrono_tz::UTC),
            Some(start.timestamp_millis())
        );
        // London is on BST in July
        assert_eq!(
            booking.start_ts(&chrono_tz::Europe::London),
            Some((start - Duration::hours(1)).timestamp_millis())
        );
    }

    #[test]
    fn markers_are_set_once() {
        let mut markers = ReminderMarkers::default();
        assert!(markers.mark(ReminderWindow::DayBefore, 10));
        assert!(!markers.mark(ReminderWindow::DayBefore, 20));
        assert_eq!(markers.sent_at(ReminderWindow::DayBefore), Some(10));
        assert!(!markers.is_sent(ReminderWindow::TwoHours));
    }

    #[test]
    fn only_owner_or_admin_can_manage() {
        let booking = booking_factory(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            60,
        );
        let stranger = User::new("other@example.com", "Other", Role::Client);
        let admin = User::new("admin@example.com", "Admin", Role::Admin);
        assert!(!booking.can_be_managed_by(&stranger));
        assert!(booking.can_be_managed_by(&admin));
    }
}
