use super::NotificationKind;
use practice_booking_domain::{Booking, ReminderWindow};
use practice_booking_infra::{EmailBody, EmailMessage};
use serde_json::json;
use std::sync::OnceLock;
use tera::{Context, Tera};

const REMINDER_TEMPLATE: &str = "reminder.html";
const URGENT_MESSAGE_TEMPLATE: &str = "urgent_message.html";

fn templates() -> &'static Tera {
    static TEMPLATES: OnceLock<Tera> = OnceLock::new();
    TEMPLATES.get_or_init(|| {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            (REMINDER_TEMPLATE, include_str!("../../templates/reminder.html")),
            (
                URGENT_MESSAGE_TEMPLATE,
                include_str!("../../templates/urgent_message.html"),
            ),
        ])
        .expect("Email templates to be valid");
        tera
    })
}

fn display_date(booking: &Booking) -> String {
    booking.date.format("%A, %-d %B %Y").to_string()
}

fn display_time(booking: &Booking) -> String {
    booking.time.format("%H:%M").to_string()
}

fn checklist(window: ReminderWindow) -> &'static [&'static str] {
    match window {
        ReminderWindow::WeekBefore => &[
            "Add the session to your calendar",
            "Think about what you would like to focus on",
            "Let us know early if you need to reschedule",
        ],
        ReminderWindow::DayBefore => &[
            "Find a quiet, private space for the session",
            "Test your internet connection, camera and microphone",
            "Note down anything you want to bring up",
        ],
        ReminderWindow::TwoHours => &[
            "Settle into your private space a few minutes early",
            "Have a glass of water nearby",
            "Keep your meeting link at hand",
        ],
    }
}

fn booking_context(booking: &Booking) -> Context {
    let mut context = Context::new();
    context.insert("user_name", &booking.user_name);
    context.insert("service", booking.service.name());
    context.insert("date", &display_date(booking));
    context.insert("time", &display_time(booking));
    context.insert("duration", &booking.duration);
    context.insert("meeting_link", &booking.meeting_link);
    context
}

/// Builds the email for a notification. Client facing booking updates use
/// the templates stored at the email provider, reminders and urgent messages
/// are rendered here.
pub fn render_message(
    kind: &NotificationKind<'_>,
    booking: &Booking,
    to: Vec<String>,
) -> Result<EmailMessage, tera::Error> {
    let service = booking.service.name();
    let (subject, body) = match kind {
        NotificationKind::BookingReceived => (
            "We have received your booking request".to_string(),
            EmailBody::Template {
                key: "booking-received".into(),
                data: json!({
                    "userName": booking.user_name,
                    "service": service,
                    "date": display_date(booking),
                    "time": display_time(booking),
                    "duration": booking.duration,
                }),
            },
        ),
        NotificationKind::BookingConfirmed => (
            format!("Your {} session is confirmed", service),
            EmailBody::Template {
                key: "booking-confirmed".into(),
                data: json!({
                    "userName": booking.user_name,
                    "service": service,
                    "date": display_date(booking),
                    "time": display_time(booking),
                    "fee": booking.service.fee_display(),
                    "duration": booking.duration,
                    "meetingLink": booking.meeting_link,
                }),
            },
        ),
        NotificationKind::AdminNewBooking => (
            format!("New booking: {} with {}", service, booking.user_name),
            EmailBody::Template {
                key: "admin-new-booking".into(),
                data: json!({
                    "bookingId": booking.id.to_string(),
                    "userName": booking.user_name,
                    "userEmail": booking.user_email,
                    "userPhone": booking.user_phone,
                    "service": service,
                    "date": display_date(booking),
                    "time": display_time(booking),
                    "duration": booking.duration,
                    "notes": booking.notes,
                    "source": booking.source.as_str(),
                }),
            },
        ),
        NotificationKind::Reminder(window) => {
            let mut context = booking_context(booking);
            context.insert("when", window.label());
            context.insert("checklist", checklist(*window));
            (
                format!("Reminder: your {} session is {}", service, window.label()),
                EmailBody::Html(templates().render(REMINDER_TEMPLATE, &context)?),
            )
        }
        NotificationKind::UrgentMessage(text) => {
            let mut context = booking_context(booking);
            context.insert("message", text);
            (
                format!("Important update about your {} session", service),
                EmailBody::Html(templates().render(URGENT_MESSAGE_TEMPLATE, &context)?),
            )
        }
    };

    Ok(EmailMessage { to, subject, body })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::tests::client_booking;
    use practice_booking_domain::{Role, ServiceType, User};

    fn html(message: &EmailMessage) -> &str {
        match &message.body {
            EmailBody::Html(html) => html,
            body => panic!("Expected html, got {:?}", body),
        }
    }

    #[test]
    fn confirmation_contains_booking_details() {
        let user = User::new("client@example.com", "Jane", Role::Client);
        let booking = client_booking(&user, ServiceType::FamilyTherapy);
        let message =
            render_message(&NotificationKind::BookingConfirmed, &booking, vec![]).unwrap();

        assert_eq!(message.subject, "Your Family Therapy session is confirmed");
        match message.body {
            EmailBody::Template { key, data } => {
                assert_eq!(key, "booking-confirmed");
                assert_eq!(data["date"], "Monday, 10 March 2025");
                assert_eq!(data["time"], "14:00");
                assert_eq!(data["fee"], "£170");
                assert_eq!(data["duration"], "1 hour, 15 minutes");
            }
            body => panic!("Expected template, got {:?}", body),
        }
    }

    #[test]
    fn reminders_have_a_window_specific_checklist() {
        let user = User::new("client@example.com", "Jane", Role::Client);
        let mut booking = client_booking(&user, ServiceType::IndividualTherapy);
        booking.meeting_link = Some("https://meet.example.com/abc".into());

        let message = render_message(
            &NotificationKind::Reminder(ReminderWindow::DayBefore),
            &booking,
            vec![],
        )
        .unwrap();
        assert_eq!(
            message.subject,
            "Reminder: your Individual Therapy session is tomorrow"
        );
        let body = html(&message);
        assert!(body.contains("Test your internet connection"));
        // Autoescaped, browsers decode the entities in the href
        assert!(body.contains(r#"href="https:&#x2F;&#x2F;meet.example.com&#x2F;abc""#));
        assert!(!body.contains("Add the session to your calendar"));
    }

    #[test]
    fn urgent_messages_are_escaped() {
        let user = User::new("client@example.com", "Jane", Role::Client);
        let booking = client_booking(&user, ServiceType::IndividualTherapy);

        let message = render_message(
            &NotificationKind::UrgentMessage("<b>Room 2</b>\nthis time"),
            &booking,
            vec![],
        )
        .unwrap();
        let body = html(&message);
        assert!(body.contains("&lt;b&gt;Room 2"));
        assert!(body.contains("<br>this time"));
        assert!(!body.contains("<b>Room 2"));
    }
}
