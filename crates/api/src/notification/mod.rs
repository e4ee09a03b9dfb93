mod render;

use practice_booking_domain::{Booking, ReminderWindow};
use practice_booking_infra::PracticeContext;
use render::render_message;
use tracing::{error, info, warn};

/// The events a client or the practice is notified about
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NotificationKind<'a> {
    BookingReceived,
    BookingConfirmed,
    Reminder(ReminderWindow),
    UrgentMessage(&'a str),
    AdminNewBooking,
}

impl<'a> NotificationKind<'a> {
    fn is_for_admins(&self) -> bool {
        matches!(self, Self::AdminNewBooking)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::BookingReceived => "booking_received",
            Self::BookingConfirmed => "booking_confirmed",
            Self::Reminder(_) => "reminder",
            Self::UrgentMessage(_) => "urgent_message",
            Self::AdminNewBooking => "admin_new_booking",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryResult {
    Sent,
    /// Nobody to send to
    Skipped(String),
    Failed(String),
}

impl DeliveryResult {
    pub fn success(&self) -> bool {
        matches!(self, Self::Sent)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Renders notifications and hands them to the email transport.
/// Delivery errors are returned as a `DeliveryResult` and never propagated.
pub struct NotificationDispatcher<'a> {
    ctx: &'a PracticeContext,
}

impl<'a> NotificationDispatcher<'a> {
    pub fn new(ctx: &'a PracticeContext) -> Self {
        Self { ctx }
    }

    fn recipients(&self, kind: &NotificationKind<'_>, booking: &Booking) -> Vec<String> {
        if kind.is_for_admins() {
            self.ctx.config.admin_emails.clone()
        } else if booking.has_recipient() {
            vec![booking.user_email.trim().to_string()]
        } else {
            Vec::new()
        }
    }

    #[tracing::instrument(name = "Dispatching notification", skip(self, kind, booking), fields(booking_id = %booking.id, kind = kind.name()))]
    pub async fn dispatch(&self, kind: NotificationKind<'_>, booking: &Booking) -> DeliveryResult {
        let to = self.recipients(&kind, booking);
        if to.is_empty() {
            info!("No recipient for the notification, skipping it");
            return DeliveryResult::Skipped("No recipient email address".into());
        }

        let message = match render_message(&kind, booking, to) {
            Ok(message) => message,
            Err(e) => {
                error!("Unable to render the notification: {:?}", e);
                return DeliveryResult::Failed(e.to_string());
            }
        };

        match self.ctx.services.email.send(message).await {
            Ok(()) => DeliveryResult::Sent,
            Err(e) => {
                warn!("Unable to deliver the notification: {:?}", e);
                DeliveryResult::Failed(e.to_string())
            }
        }
    }
}
