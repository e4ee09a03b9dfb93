mod helpers;

use helpers::setup::{spawn_app, spawn_app_at, utc};
use practice_booking_domain::{ExternalAppointment, QuestionAnswer};
use practice_booking_sdk::{
    BookingStatus, CreateBookingInput, GetBookingsInput, PracticeSDK, ServiceType,
};
use reqwest::StatusCode;

fn family_therapy_input() -> CreateBookingInput {
    CreateBookingInput {
        service: Some("Family Therapy".into()),
        date: Some("2025-03-10".into()),
        time: Some("14:00".into()),
        duration: None,
        phone: Some("07123 456789".into()),
        notes: None,
    }
}

async fn create_booking(sdk: &PracticeSDK) -> practice_booking_sdk::BookingDTO {
    sdk.booking
        .create(family_therapy_input())
        .await
        .expect("Expected to create booking")
        .booking
}

#[actix_web::main]
#[test]
async fn test_status_ok() {
    let app = spawn_app().await;
    assert!(app.anonymous_sdk().status.check_health().await.is_ok());
}

#[actix_web::main]
#[test]
async fn test_get_me() {
    let app = spawn_app().await;
    let me = app.client_sdk().user.me().await.expect("Expected to get me");
    assert_eq!(me.user.id, app.client.id);
    assert_eq!(me.user.email, "jane@example.com");

    let res = app.anonymous_sdk().user.me().await;
    assert_eq!(
        res.unwrap_err().status(),
        Some(StatusCode::UNAUTHORIZED)
    );
}

#[actix_web::main]
#[test]
async fn test_create_booking() {
    let app = spawn_app().await;
    let res = app
        .client_sdk()
        .booking
        .create(family_therapy_input())
        .await
        .expect("Expected to create booking");

    assert!(res.email_sent);
    let booking = res.booking;
    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.service, ServiceType::FamilyTherapy);
    assert_eq!(booking.duration, "1 hour, 15 minutes");
    assert_eq!(booking.duration_minutes, 75);
    assert_eq!(booking.user_id, Some(app.client.id.clone()));
    assert_eq!(booking.user_email, "jane@example.com");
    assert!(!booking.reminders.week_before_sent);

    assert_eq!(app.emails.sent_to("jane@example.com").len(), 1);
    assert_eq!(app.emails.sent_to("admin@practice.example").len(), 1);
}

#[actix_web::main]
#[test]
async fn test_failed_email_does_not_fail_the_operation() {
    let app = spawn_app().await;
    app.emails.set_failing(true);

    let res = app
        .client_sdk()
        .booking
        .create(family_therapy_input())
        .await
        .expect("Expected to create booking");
    assert!(!res.email_sent);

    let stored = app
        .client_sdk()
        .booking
        .get(&res.booking.id)
        .await
        .expect("Expected booking to be stored");
    assert_eq!(stored.booking.id, res.booking.id);
    assert_eq!(stored.booking.status, BookingStatus::Pending);

    let confirmed = app
        .admin_sdk()
        .booking
        .update_status(&res.booking.id, BookingStatus::Confirmed)
        .await
        .expect("Expected to confirm booking");
    assert!(!confirmed.email_sent);
    assert_eq!(confirmed.booking.status, BookingStatus::Confirmed);
    assert!(app.emails.sent().is_empty());
}

#[actix_web::main]
#[test]
async fn test_create_booking_validation() {
    let app = spawn_app().await;
    let sdk = app.client_sdk();

    let mut missing_date = family_therapy_input();
    missing_date.date = None;
    let res = sdk.booking.create(missing_date).await;
    assert_eq!(res.unwrap_err().status(), Some(StatusCode::BAD_REQUEST));

    let mut unknown_service = family_therapy_input();
    unknown_service.service = Some("Astrology".into());
    let res = sdk.booking.create(unknown_service).await;
    assert_eq!(res.unwrap_err().status(), Some(StatusCode::BAD_REQUEST));

    let mut in_the_past = family_therapy_input();
    in_the_past.date = Some("2025-02-10".into());
    let res = sdk.booking.create(in_the_past).await;
    assert_eq!(res.unwrap_err().status(), Some(StatusCode::BAD_REQUEST));

    assert!(app.emails.sent().is_empty());
}

#[actix_web::main]
#[test]
async fn test_booking_lifecycle() {
    let app = spawn_app().await;
    let booking = create_booking(&app.client_sdk()).await;
    let admin = app.admin_sdk();

    let confirmed = admin
        .booking
        .update_status(&booking.id, BookingStatus::Confirmed)
        .await
        .expect("Expected to confirm booking");
    assert!(confirmed.email_sent);
    assert_eq!(confirmed.booking.status, BookingStatus::Confirmed);
    let confirmation = app.emails.sent_to("jane@example.com");
    assert_eq!(confirmation.len(), 2);

    // Confirming twice is not a legal transition
    let res = admin
        .booking
        .update_status(&booking.id, BookingStatus::Confirmed)
        .await;
    assert_eq!(res.unwrap_err().status(), Some(StatusCode::CONFLICT));

    let completed = admin
        .booking
        .update_status(&booking.id, BookingStatus::Completed)
        .await
        .expect("Expected to complete booking");
    assert_eq!(completed.booking.status, BookingStatus::Completed);

    let res = admin
        .booking
        .update_status(&booking.id, BookingStatus::Cancelled)
        .await;
    assert_eq!(res.unwrap_err().status(), Some(StatusCode::CONFLICT));

    let stored = admin.booking.get(&booking.id).await.unwrap().booking;
    assert_eq!(stored.status, BookingStatus::Completed);
}

#[actix_web::main]
#[test]
async fn test_client_permissions() {
    let app = spawn_app().await;
    let client = app.client_sdk();
    let other = app.other_client_sdk();
    let booking = create_booking(&client).await;

    let res = client
        .booking
        .update_status(&booking.id, BookingStatus::Confirmed)
        .await;
    assert_eq!(res.unwrap_err().status(), Some(StatusCode::FORBIDDEN));

    let res = other.booking.get(&booking.id).await;
    assert_eq!(res.unwrap_err().status(), Some(StatusCode::FORBIDDEN));

    let res = other
        .booking
        .update_status(&booking.id, BookingStatus::Cancelled)
        .await;
    assert_eq!(res.unwrap_err().status(), Some(StatusCode::FORBIDDEN));

    let res = client
        .booking
        .send_urgent_message(&booking.id, "Running late".into())
        .await;
    assert_eq!(res.unwrap_err().status(), Some(StatusCode::FORBIDDEN));

    let res = client.booking.delete(&booking.id).await;
    assert_eq!(res.unwrap_err().status(), Some(StatusCode::FORBIDDEN));

    let cancelled = client
        .booking
        .update_status(&booking.id, BookingStatus::Cancelled)
        .await
        .expect("Expected owner to cancel booking");
    assert_eq!(cancelled.booking.status, BookingStatus::Cancelled);
}

#[actix_web::main]
#[test]
async fn test_unknown_booking_is_not_found() {
    let app = spawn_app().await;
    let res = app.admin_sdk().booking.get(&Default::default()).await;
    assert_eq!(res.unwrap_err().status(), Some(StatusCode::NOT_FOUND));
}

#[actix_web::main]
#[test]
async fn test_list_bookings() {
    let app = spawn_app().await;
    let first = create_booking(&app.client_sdk()).await;
    let mut later = family_therapy_input();
    later.date = Some("2025-03-20".into());
    app.client_sdk().booking.create(later).await.unwrap();
    create_booking(&app.other_client_sdk()).await;

    let own = app
        .client_sdk()
        .booking
        .list(GetBookingsInput::default())
        .await
        .unwrap()
        .bookings;
    assert_eq!(own.len(), 2);
    assert!(own.iter().all(|b| b.user_id == Some(app.client.id.clone())));

    let all = app
        .admin_sdk()
        .booking
        .list(GetBookingsInput {
            descending: true,
            ..Default::default()
        })
        .await
        .unwrap()
        .bookings;
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].date.to_string(), "2025-03-20");

    app.admin_sdk()
        .booking
        .update_status(&first.id, BookingStatus::Confirmed)
        .await
        .unwrap();
    let confirmed = app
        .admin_sdk()
        .booking
        .list(GetBookingsInput {
            statuses: vec![BookingStatus::Confirmed],
            ..Default::default()
        })
        .await
        .unwrap()
        .bookings;
    assert_eq!(confirmed.len(), 1);
    assert_eq!(confirmed[0].id, first.id);
}

#[actix_web::main]
#[test]
async fn test_urgent_message() {
    let app = spawn_app().await;
    let booking = create_booking(&app.client_sdk()).await;

    let res = app
        .admin_sdk()
        .booking
        .send_urgent_message(&booking.id, "The session moves to room 2\nSee you there".into())
        .await
        .expect("Expected to send urgent message");
    assert!(res.email_sent);
    assert_eq!(res.booking.urgent_messages.len(), 1);
    assert_eq!(res.booking.urgent_messages[0].sender, "admin@practice.example");

    let res = app
        .admin_sdk()
        .booking
        .send_urgent_message(&booking.id, "   ".into())
        .await;
    assert_eq!(res.unwrap_err().status(), Some(StatusCode::BAD_REQUEST));
}

#[actix_web::main]
#[test]
async fn test_delete_booking() {
    let app = spawn_app().await;
    let booking = create_booking(&app.client_sdk()).await;

    let deleted = app.admin_sdk().booking.delete(&booking.id).await.unwrap();
    assert_eq!(deleted.booking.id, booking.id);
    let res = app.admin_sdk().booking.get(&booking.id).await;
    assert_eq!(res.unwrap_err().status(), Some(StatusCode::NOT_FOUND));
}

#[actix_web::main]
#[test]
async fn test_job_routes_require_secret() {
    let app = spawn_app().await;
    let res = app.admin_sdk().job.send_reminders().await;
    assert_eq!(res.unwrap_err().status(), Some(StatusCode::UNAUTHORIZED));

    let wrong = PracticeSDK::for_jobs(app.address.clone(), "guess");
    let res = wrong.job.sync_bookings().await;
    assert_eq!(res.unwrap_err().status(), Some(StatusCode::UNAUTHORIZED));
}

#[actix_web::main]
#[test]
async fn test_send_reminders() {
    // 24 hours before the booking
    let app = spawn_app_at("2025-03-09T14:00:00Z").await;
    let mut input = family_therapy_input();
    input.date = Some("2025-03-10".into());
    let booking = create_booking_with(&app.client_sdk(), input).await;
    let jobs = app.job_sdk();

    let report = jobs.job.send_reminders().await.unwrap();
    assert_eq!(report.sent, 1);
    assert_eq!(report.failed, 0);

    let report = jobs.job.send_reminders().await.unwrap();
    assert_eq!(report.sent, 0);

    let stored = app.admin_sdk().booking.get(&booking.id).await.unwrap().booking;
    assert!(stored.reminders.day_before_sent);
    assert!(!stored.reminders.two_hours_sent);
}

async fn create_booking_with(
    sdk: &PracticeSDK,
    input: CreateBookingInput,
) -> practice_booking_sdk::BookingDTO {
    sdk.booking
        .create(input)
        .await
        .expect("Expected to create booking")
        .booking
}

fn appointment(id: &str) -> ExternalAppointment {
    ExternalAppointment {
        id: id.into(),
        starts_at: utc("2025-03-12T10:00:00Z"),
        ends_at: utc("2025-03-12T10:50:00Z"),
        contact_name: Some("Sam Smith".into()),
        contact_email: Some("sam@example.com".into()),
        questions: vec![QuestionAnswer {
            question: "Phone number".into(),
            answer: "07000 000000".into(),
        }],
        requires_approval: true,
        approved_at: None,
        cancelled_at: None,
        service_title: "Teen Counselling".into(),
        meeting_url: None,
    }
}

#[actix_web::main]
#[test]
async fn test_sync_bookings() {
    let app = spawn_app().await;
    app.scheduling.set(vec![appointment("ext-1")]);
    let jobs = app.job_sdk();

    let report = jobs.job.sync_bookings().await.unwrap();
    assert_eq!(report.synced, 1);
    assert!(!report.timed_out);
    assert!(!report.upstream_error);
    assert!(app.emails.sent().is_empty());

    let mut approved = appointment("ext-1");
    approved.approved_at = Some(utc("2025-03-01T08:00:00Z"));
    app.scheduling.set(vec![approved]);
    let report = jobs.job.sync_bookings().await.unwrap();
    assert_eq!(report.synced, 0);
    assert_eq!(report.updated, 1);

    let bookings = app
        .admin_sdk()
        .booking
        .list(GetBookingsInput::default())
        .await
        .unwrap()
        .bookings;
    assert_eq!(bookings.len(), 1);
    let booking = &bookings[0];
    assert_eq!(booking.external_id.as_deref(), Some("ext-1"));
    assert_eq!(booking.status, BookingStatus::Confirmed);
    assert_eq!(booking.service, ServiceType::TeenCounselling);
    assert_eq!(booking.duration, "50 minutes");
    assert_eq!(booking.user_phone.as_deref(), Some("07000 000000"));
    assert_eq!(booking.user_id, None);
}

#[actix_web::main]
#[test]
async fn test_delete_user() {
    let app = spawn_app().await;
    create_booking(&app.client_sdk()).await;
    create_booking(&app.other_client_sdk()).await;

    let res = app.client_sdk().user.delete(&app.other_client.id).await;
    assert_eq!(res.unwrap_err().status(), Some(StatusCode::FORBIDDEN));

    let res = app
        .admin_sdk()
        .user
        .delete(&app.client.id)
        .await
        .expect("Expected to delete user");
    assert_eq!(res.user.id, app.client.id);
    assert_eq!(res.deleted_bookings, 1);
    assert_eq!(res.deleted_sessions, 1);

    // The session is gone with the user
    let res = app.client_sdk().user.me().await;
    assert_eq!(res.unwrap_err().status(), Some(StatusCode::UNAUTHORIZED));

    let remaining = app
        .admin_sdk()
        .booking
        .list(GetBookingsInput::default())
        .await
        .unwrap()
        .bookings;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].user_id, Some(app.other_client.id.clone()));
}
