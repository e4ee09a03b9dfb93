use chrono::{DateTime, Utc};
use practice_booking_api::Application;
use practice_booking_domain::{ExternalAppointment, Role, User};
use practice_booking_infra::{
    AppointmentPage, EmailMessage, IEmailTransport, ISchedulingService, PracticeContext, Session,
    StaticTimeSys,
};
use practice_booking_sdk::PracticeSDK;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

pub const JOB_SECRET: &str = "test-job-secret";
const ADMIN_SESSION: &str = "admin-session";
const CLIENT_SESSION: &str = "client-session";
const OTHER_CLIENT_SESSION: &str = "other-client-session";

#[derive(Default)]
pub struct RecordingEmailTransport {
    sent: Mutex<Vec<EmailMessage>>,
    failing: AtomicBool,
}

impl RecordingEmailTransport {
    /// While failing, every send is rejected and nothing is recorded
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, email: &str) -> Vec<EmailMessage> {
        self.sent()
            .into_iter()
            .filter(|m| m.to.iter().any(|to| to == email))
            .collect()
    }
}

#[async_trait::async_trait]
impl IEmailTransport for RecordingEmailTransport {
    async fn send(&self, message: EmailMessage) -> anyhow::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("Email provider unavailable");
        }
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

/// Serves a single page with whatever appointments are currently set
#[derive(Default)]
pub struct StaticSchedulingService {
    appointments: Mutex<Vec<ExternalAppointment>>,
}

impl StaticSchedulingService {
    pub fn set(&self, appointments: Vec<ExternalAppointment>) {
        *self.appointments.lock().unwrap() = appointments;
    }
}

#[async_trait::async_trait]
impl ISchedulingService for StaticSchedulingService {
    async fn list_appointments(
        &self,
        _since: DateTime<Utc>,
        _page: u32,
    ) -> anyhow::Result<AppointmentPage> {
        Ok(AppointmentPage {
            records: self
                .appointments
                .lock()
                .unwrap()
                .iter()
                .cloned()
                .map(Ok)
                .collect(),
            next_page: None,
        })
    }
}

pub struct TestApp {
    pub ctx: PracticeContext,
    pub address: String,
    pub emails: Arc<RecordingEmailTransport>,
    pub scheduling: Arc<StaticSchedulingService>,
    pub admin: User,
    pub client: User,
    pub other_client: User,
}

impl TestApp {
    pub fn admin_sdk(&self) -> PracticeSDK {
        PracticeSDK::new(self.address.clone(), ADMIN_SESSION)
    }

    pub fn client_sdk(&self) -> PracticeSDK {
        PracticeSDK::new(self.address.clone(), CLIENT_SESSION)
    }

    pub fn other_client_sdk(&self) -> PracticeSDK {
        PracticeSDK::new(self.address.clone(), OTHER_CLIENT_SESSION)
    }

    pub fn anonymous_sdk(&self) -> PracticeSDK {
        PracticeSDK::new(self.address.clone(), "")
    }

    pub fn job_sdk(&self) -> PracticeSDK {
        PracticeSDK::for_jobs(self.address.clone(), JOB_SECRET)
    }
}

pub fn utc(datetime: &str) -> DateTime<Utc> {
    datetime.parse().expect("Valid RFC 3339 datetime")
}

async fn insert_user_with_session(ctx: &PracticeContext, user: &User, token: &str) {
    ctx.repos
        .users
        .insert(user)
        .await
        .expect("To insert user");
    ctx.repos
        .users
        .insert_session(&Session {
            token: token.into(),
            user_id: user.id.clone(),
            expires: i64::MAX,
        })
        .await
        .expect("To insert session");
}

/// Launches the application as a background task on a random port with
/// in-memory storage and the clock frozen at `now`
pub async fn spawn_app_at(now: &str) -> TestApp {
    let mut ctx = PracticeContext::create_inmemory();
    ctx.config.port = 0; // Random port
    ctx.config.job_secret = JOB_SECRET.into();
    ctx.config.practice_timezone = chrono_tz::Europe::London;
    ctx.config.admin_emails = vec!["admin@practice.example".into()];
    ctx.config.reminder_job_interval_minutes = None;
    ctx.config.sync_job_interval_minutes = None;
    ctx.sys = Arc::new(StaticTimeSys(utc(now).timestamp_millis()));

    let emails = Arc::new(RecordingEmailTransport::default());
    let scheduling = Arc::new(StaticSchedulingService::default());
    ctx.services.email = emails.clone();
    ctx.services.scheduling = scheduling.clone();

    let admin = User::new("admin@practice.example", "Admin", Role::Admin);
    let client = User::new("jane@example.com", "Jane Doe", Role::Client);
    let other_client = User::new("john@example.com", "John Roe", Role::Client);
    insert_user_with_session(&ctx, &admin, ADMIN_SESSION).await;
    insert_user_with_session(&ctx, &client, CLIENT_SESSION).await;
    insert_user_with_session(&ctx, &other_client, OTHER_CLIENT_SESSION).await;

    let application = Application::new(ctx.clone())
        .await
        .expect("Failed to build application.");

    let address = format!("http://localhost:{}/api/v1", application.port());
    let _ = actix_web::rt::spawn(async move {
        application
            .start()
            .await
            .expect("Expected application to start");
    });

    TestApp {
        ctx,
        address,
        emails,
        scheduling,
        admin,
        client,
        other_client,
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_at("2025-03-01T09:00:00Z").await
}
