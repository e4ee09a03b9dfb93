use crate::{duration::format_duration, service::ServiceType, status::BookingStatus};
use chrono::prelude::*;
use chrono_tz::Tz;
use thiserror::Error;
use url::Url;

/// A question and the answer the client gave when booking through the
/// external scheduling service
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionAnswer {
    pub question: String,
    pub answer: String,
}

/// An appointment as reported by the external scheduling service
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalAppointment {
    pub id: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub questions: Vec<QuestionAnswer>,
    pub requires_approval: bool,
    pub approved_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub service_title: String,
    pub meeting_url: Option<String>,
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("Malformed external appointment {external_id:?}: {reason}")]
pub struct MalformedAppointment {
    pub external_id: Option<String>,
    pub reason: String,
}

/// The canonical booking shape derived from an `ExternalAppointment`
#[derive(Debug, Clone, PartialEq)]
pub struct SyncedBookingFields {
    pub external_id: String,
    pub user_name: String,
    pub user_email: String,
    pub user_phone: Option<String>,
    pub service: ServiceType,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration: String,
    pub duration_minutes: i64,
    pub notes: Option<String>,
    pub meeting_link: Option<String>,
    pub status: BookingStatus,
}

impl ExternalAppointment {
    /// Cancellation wins over everything, then a finished appointment is
    /// completed, then unapproved appointments are pending.
    pub fn derive_status(&self, now: DateTime<Utc>) -> BookingStatus {
        if self.cancelled_at.is_some() {
            BookingStatus::Cancelled
        } else if self.ends_at < now {
            BookingStatus::Completed
        } else if self.requires_approval && self.approved_at.is_none() {
            BookingStatus::Pending
        } else {
            BookingStatus::Confirmed
        }
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.ends_at - self.starts_at).num_minutes()
    }

    pub fn to_booking_fields(
        &self,
        now: DateTime<Utc>,
        tz: &Tz,
        extractor: &KeywordExtractor,
    ) -> Result<SyncedBookingFields, MalformedAppointment> {
        let malformed = |reason: &str| MalformedAppointment {
            external_id: Some(self.id.clone()),
            reason: reason.into(),
        };

        if self.id.trim().is_empty() {
            return Err(MalformedAppointment {
                external_id: None,
                reason: "Missing appointment id".into(),
            });
        }
        let duration_minutes = self.duration_minutes();
        if duration_minutes <= 0 {
            return Err(malformed("Appointment must end after it starts"));
        }

        let local_start = self.starts_at.with_timezone(tz);
        let answers = extractor.extract(&self.questions);
        let meeting_link = self
            .meeting_url
            .as_ref()
            .filter(|link| Url::parse(link).is_ok())
            .cloned();

        Ok(SyncedBookingFields {
            external_id: self.id.clone(),
            user_name: self
                .contact_name
                .clone()
                .unwrap_or_default()
                .trim()
                .to_string(),
            user_email: self
                .contact_email
                .clone()
                .unwrap_or_default()
                .trim()
                .to_string(),
            user_phone: answers.phone,
            service: ServiceType::from_external_title(&self.service_title),
            date: local_start.date_naive(),
            time: local_start.time(),
            duration: format_duration(duration_minutes),
            duration_minutes,
            notes: answers.notes,
            meeting_link,
            status: self.derive_status(now),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedAnswers {
    pub notes: Option<String>,
    pub phone: Option<String>,
}

/// Picks notes and a phone number out of free form question / answer pairs
/// by case insensitive keyword matching on the question text.
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    note_keywords: Vec<String>,
    phone_keywords: Vec<String>,
}

impl KeywordExtractor {
    pub fn new(note_keywords: Vec<String>, phone_keywords: Vec<String>) -> Self {
        let normalize = |keywords: Vec<String>| {
            keywords
                .into_iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect::<Vec<_>>()
        };
        Self {
            note_keywords: normalize(note_keywords),
            phone_keywords: normalize(phone_keywords),
        }
    }

    pub fn note_keywords(&self) -> &[String] {
        &self.note_keywords
    }

    pub fn phone_keywords(&self) -> &[String] {
        &self.phone_keywords
    }

    /// A question matching the phone vocabulary is a phone answer, otherwise it
    /// is a note if it matches the note vocabulary. The first phone answer wins
    /// and note answers are joined.
    pub fn extract(&self, questions: &[QuestionAnswer]) -> ExtractedAnswers {
        let mut phone = None;
        let mut notes = Vec::new();

        for qa in questions {
            let answer = qa.answer.trim();
            if answer.is_empty() {
                continue;
            }
            let question = qa.question.to_lowercase();
            let matches = |keywords: &[String]| keywords.iter().any(|k| question.contains(k));

            if matches(&self.phone_keywords) {
                if phone.is_none() {
                    phone = Some(answer.to_string());
                }
            } else if matches(&self.note_keywords) {
                notes.push(answer.to_string());
            }
        }

        ExtractedAnswers {
            notes: if notes.is_empty() {
                None
            } else {
                Some(notes.join("\n\n"))
            },
            phone,
        }
    }
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        let to_strings = |words: &[&str]| words.iter().map(|w| w.to_string()).collect();
        Self::new(
            to_strings(&["note", "comment", "message", "additional", "special"]),
            to_strings(&["phone", "number", "contact", "mobile"]),
        )
    }
}
