use chrono::{NaiveDate, NaiveTime};
use practice_booking_domain::{
    Booking, BookingSource, BookingStatus, ReminderWindow, ServiceType, UrgentMessage, ID,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BookingDTO {
    pub id: ID,
    pub external_id: Option<String>,
    pub user_id: Option<ID>,
    pub user_name: String,
    pub user_email: String,
    pub user_phone: Option<String>,
    pub service: ServiceType,
    /// Fee of the service as displayed to clients, e.g. `£120`
    pub fee: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration: String,
    pub duration_minutes: i64,
    pub notes: Option<String>,
    pub meeting_link: Option<String>,
    pub status: BookingStatus,
    pub created: i64,
    pub updated: i64,
    pub reminders: ReminderMarkersDTO,
    pub urgent_messages: Vec<UrgentMessage>,
    pub source: BookingSource,
    pub last_synced: Option<i64>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReminderMarkersDTO {
    pub week_before_sent: bool,
    pub week_before_sent_at: Option<i64>,
    pub day_before_sent: bool,
    pub day_before_sent_at: Option<i64>,
    pub two_hours_sent: bool,
    pub two_hours_sent_at: Option<i64>,
}

impl BookingDTO {
    pub fn new(booking: Booking) -> Self {
        let sent_at = |window| booking.reminders.sent_at(window);
        let reminders = ReminderMarkersDTO {
            week_before_sent: sent_at(ReminderWindow::WeekBefore).is_some(),
            week_before_sent_at: sent_at(ReminderWindow::WeekBefore),
            day_before_sent: sent_at(ReminderWindow::DayBefore).is_some(),
            day_before_sent_at: sent_at(ReminderWindow::DayBefore),
            two_hours_sent: sent_at(ReminderWindow::TwoHours).is_some(),
            two_hours_sent_at: sent_at(ReminderWindow::TwoHours),
        };
        Self {
            fee: booking.service.fee_display(),
            reminders,
            id: booking.id,
            external_id: booking.external_id,
            user_id: booking.user_id,
            user_name: booking.user_name,
            user_email: booking.user_email,
            user_phone: booking.user_phone,
            service: booking.service,
            date: booking.date,
            time: booking.time,
            duration: booking.duration,
            duration_minutes: booking.duration_minutes,
            notes: booking.notes,
            meeting_link: booking.meeting_link,
            status: booking.status,
            created: booking.created,
            updated: booking.updated,
            urgent_messages: booking.urgent_messages,
            source: booking.source,
            last_synced: booking.last_synced,
        }
    }
}
