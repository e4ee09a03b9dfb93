use chrono_tz::Tz;
use practice_booking_domain::KeywordExtractor;
use practice_booking_utils::create_random_secret;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct EmailApiConfig {
    pub url: String,
    pub api_key: String,
    /// Sender address used for every outgoing email
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct SchedulingApiConfig {
    pub url: String,
    pub token: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the application to run on
    pub port: usize,
    /// Timezone the practice operates in. Booking dates and times are
    /// local to this timezone.
    pub practice_timezone: Tz,
    /// Secret that has to be provided by the external job scheduler
    /// to trigger sync and reminder passes
    pub job_secret: String,
    /// Recipients of the new booking alerts
    pub admin_emails: Vec<String>,
    pub email_api: Option<EmailApiConfig>,
    pub scheduling_api: Option<SchedulingApiConfig>,
    /// Upper bound for a whole sync pass against the external scheduling service
    pub sync_timeout: Duration,
    /// How far back in time appointments are fetched on each sync pass
    pub sync_lookback_days: i64,
    pub keyword_extractor: KeywordExtractor,
    /// Runs the reminder pass in process with this interval when set
    pub reminder_job_interval_minutes: Option<u64>,
    /// Runs the sync pass in process with this interval when set
    pub sync_job_interval_minutes: Option<u64>,
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T
where
    T: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(value) => match value.parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!(
                    "The given {}: {} is not valid, falling back to the default: {}.",
                    key, value, default
                );
                default
            }
        },
        Err(_) => default,
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

impl Config {
    pub fn new() -> Self {
        let job_secret = match optional_env("JOB_SECRET") {
            Some(secret) => secret,
            None => {
                info!("Did not find JOB_SECRET environment variable. Going to create one.");
                let secret = create_random_secret(32);
                info!("Secret for triggering jobs was generated and set to: {}", secret);
                secret
            }
        };

        let default_timezone = chrono_tz::Europe::London;
        let practice_timezone = match optional_env("PRACTICE_TIMEZONE") {
            Some(tz) => tz.parse::<Tz>().unwrap_or_else(|_| {
                warn!(
                    "The given PRACTICE_TIMEZONE: {} is not valid, falling back to: {}.",
                    tz, default_timezone
                );
                default_timezone
            }),
            None => default_timezone,
        };

        let email_api = match (
            optional_env("EMAIL_API_URL"),
            optional_env("EMAIL_API_KEY"),
        ) {
            (Some(url), Some(api_key)) => Some(EmailApiConfig {
                url,
                api_key,
                from: optional_env("EMAIL_FROM")
                    .unwrap_or_else(|| "bookings@example.com".into()),
            }),
            _ => {
                warn!("EMAIL_API_URL or EMAIL_API_KEY is missing. Emails will only be logged.");
                None
            }
        };

        let scheduling_api = match (
            optional_env("SCHEDULING_API_URL"),
            optional_env("SCHEDULING_API_TOKEN"),
        ) {
            (Some(url), Some(token)) => Some(SchedulingApiConfig { url, token }),
            _ => {
                info!("External scheduling service is not configured. Sync passes will be empty.");
                None
            }
        };

        let default_extractor = KeywordExtractor::default();
        let keyword_extractor = match (optional_env("NOTE_KEYWORDS"), optional_env("PHONE_KEYWORDS")) {
            (None, None) => default_extractor,
            (notes, phones) => KeywordExtractor::new(
                notes
                    .map(|n| parse_list(&n))
                    .unwrap_or_else(|| default_extractor.note_keywords().to_vec()),
                phones
                    .map(|p| parse_list(&p))
                    .unwrap_or_else(|| default_extractor.phone_keywords().to_vec()),
            ),
        };

        Self {
            port: parse_env("PORT", 5000),
            practice_timezone,
            job_secret,
            admin_emails: optional_env("ADMIN_EMAILS")
                .map(|emails| parse_list(&emails))
                .unwrap_or_default(),
            email_api,
            scheduling_api,
            sync_timeout: Duration::from_secs(parse_env("SYNC_TIMEOUT_SECS", 60)),
            sync_lookback_days: parse_env("SYNC_LOOKBACK_DAYS", 30),
            keyword_extractor,
            reminder_job_interval_minutes: optional_env("REMINDER_JOB_INTERVAL_MINUTES")
                .and_then(|m| m.parse().ok()),
            sync_job_interval_minutes: optional_env("SYNC_JOB_INTERVAL_MINUTES")
                .and_then(|m| m.parse().ok()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
