mod booking;
mod duration;
mod external_appointment;
mod reminder;
mod service;
mod shared;
mod status;
mod user;

pub use booking::{Booking, BookingSource, NewDirectBooking, ReminderMarkers, UrgentMessage};
pub use duration::{format_duration, parse_duration, InvalidDuration};
pub use external_appointment::{
    ExternalAppointment, ExtractedAnswers, KeywordExtractor, MalformedAppointment,
    QuestionAnswer, SyncedBookingFields,
};
pub use reminder::{due_reminders, due_windows, DueReminder, ReminderWindow};
pub use service::{ServiceType, UnknownServiceError};
pub use shared::entity::{Entity, InvalidIDError, ID};
pub use status::{BookingStatus, InvalidStatusError, InvalidTransition};
pub use user::{Role, User};
