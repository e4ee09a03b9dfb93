use crate::config::SchedulingApiConfig;
use chrono::{DateTime, Utc};
use practice_booking_domain::{ExternalAppointment, MalformedAppointment, QuestionAnswer};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::error;

/// One page of appointments. Every record is decoded on its own so that one
/// malformed record does not fail the page.
#[derive(Debug, Clone, Default)]
pub struct AppointmentPage {
    pub records: Vec<Result<ExternalAppointment, MalformedAppointment>>,
    pub next_page: Option<u32>,
}

#[async_trait::async_trait]
pub trait ISchedulingService: Send + Sync {
    /// Lists appointments starting at or after `since`. Pages start at 1.
    async fn list_appointments(
        &self,
        since: DateTime<Utc>,
        page: u32,
    ) -> anyhow::Result<AppointmentPage>;
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExternalIdDTO {
    Text(String),
    Number(i64),
}

impl ExternalIdDTO {
    fn into_string(self) -> String {
        match self {
            Self::Text(id) => id,
            Self::Number(id) => id.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ContactDTO {
    name: Option<String>,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QuestionDTO {
    question: String,
    #[serde(default)]
    answer: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppointmentDTO {
    id: ExternalIdDTO,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
    #[serde(default)]
    contact: Option<ContactDTO>,
    #[serde(default)]
    questions: Vec<QuestionDTO>,
    #[serde(default)]
    requires_approval: bool,
    #[serde(default)]
    approved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    cancelled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    meeting_url: Option<String>,
}

impl From<AppointmentDTO> for ExternalAppointment {
    fn from(dto: AppointmentDTO) -> Self {
        let (contact_name, contact_email) = match dto.contact {
            Some(contact) => (contact.name, contact.email),
            None => (None, None),
        };
        Self {
            id: dto.id.into_string(),
            starts_at: dto.starts_at,
            ends_at: dto.ends_at,
            contact_name,
            contact_email,
            questions: dto
                .questions
                .into_iter()
                .map(|q| QuestionAnswer {
                    question: q.question,
                    answer: q.answer.unwrap_or_default(),
                })
                .collect(),
            requires_approval: dto.requires_approval,
            approved_at: dto.approved_at,
            cancelled_at: dto.cancelled_at,
            service_title: dto.title,
            meeting_url: dto.meeting_url,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppointmentPageDTO {
    data: Vec<Value>,
    #[serde(default)]
    next_page: Option<u32>,
}

fn raw_id(record: &Value) -> Option<String> {
    match record.get("id")? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

fn parse_record(record: Value) -> Result<ExternalAppointment, MalformedAppointment> {
    let external_id = raw_id(&record);
    serde_json::from_value::<AppointmentDTO>(record)
        .map(ExternalAppointment::from)
        .map_err(|e| MalformedAppointment {
            external_id,
            reason: e.to_string(),
        })
}

fn parse_page(body: Value) -> anyhow::Result<AppointmentPage> {
    let page: AppointmentPageDTO = serde_json::from_value(body)?;
    Ok(AppointmentPage {
        records: page.data.into_iter().map(parse_record).collect(),
        next_page: page.next_page,
    })
}

pub struct HttpSchedulingService {
    client: Client,
    config: SchedulingApiConfig,
}

impl HttpSchedulingService {
    pub fn new(config: SchedulingApiConfig, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self { client, config }
    }
}

#[async_trait::async_trait]
impl ISchedulingService for HttpSchedulingService {
    async fn list_appointments(
        &self,
        since: DateTime<Utc>,
        page: u32,
    ) -> anyhow::Result<AppointmentPage> {
        let body = self
            .client
            .get(format!(
                "{}/appointments",
                self.config.url.trim_end_matches('/')
            ))
            .bearer_auth(&self.config.token)
            .query(&[("since", since.to_rfc3339()), ("page", page.to_string())])
            .send()
            .await
            .map_err(|e| {
                error!("Unable to reach the scheduling API: {:?}", e);
                e
            })?
            .error_for_status()?
            .json::<Value>()
            .await?;
        parse_page(body)
    }
}

/// Used when no scheduling API is configured. Never has any appointments.
pub struct NoopSchedulingService {}

#[async_trait::async_trait]
impl ISchedulingService for NoopSchedulingService {
    async fn list_appointments(
        &self,
        _since: DateTime<Utc>,
        _page: u32,
    ) -> anyhow::Result<AppointmentPage> {
        Ok(AppointmentPage::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_records_one_by_one() {
        let body = json!({
            "data": [
                {
                    "id": 42,
                    "startsAt": "2025-03-10T14:00:00Z",
                    "endsAt": "2025-03-10T15:15:00Z",
                    "contact": { "name": "Jane", "email": "jane@example.com" },
                    "questions": [{ "question": "Phone number", "answer": "0123" }],
                    "requiresApproval": true,
                    "title": "Family Therapy",
                    "meetingUrl": "https://meet.example.com/abc"
                },
                { "id": "broken", "startsAt": "not a date" },
                { "startsAt": "2025-03-10T14:00:00Z" }
            ],
            "nextPage": 2
        });

        let page = parse_page(body).unwrap();
        assert_eq!(page.next_page, Some(2));
        assert_eq!(page.records.len(), 3);

        let appointment = page.records[0].as_ref().unwrap();
        assert_eq!(appointment.id, "42");
        assert_eq!(appointment.contact_email.as_deref(), Some("jane@example.com"));
        assert_eq!(appointment.questions[0].answer, "0123");
        assert!(appointment.requires_approval);
        assert_eq!(appointment.service_title, "Family Therapy");

        let malformed = page.records[1].as_ref().unwrap_err();
        assert_eq!(malformed.external_id.as_deref(), Some("broken"));
        let malformed = page.records[2].as_ref().unwrap_err();
        assert_eq!(malformed.external_id, None);
    }

    #[test]
    fn rejects_pages_without_data() {
        assert!(parse_page(json!({ "items": [] })).is_err());
    }

    #[tokio::test]
    async fn noop_service_has_no_appointments() {
        let page = NoopSchedulingService {}
            .list_appointments(Utc::now(), 1)
            .await
            .unwrap();
        assert!(page.records.is_empty());
        assert_eq!(page.next_page, None);
    }
}
