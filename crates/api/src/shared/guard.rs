use crate::error::PracticeError;
use chrono::{NaiveDate, NaiveTime};
use practice_booking_domain::{parse_duration, ServiceType};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl From<ValidationError> for PracticeError {
    fn from(e: ValidationError) -> Self {
        Self::BadClientData(e.0)
    }
}

pub struct Guard {}

impl Guard {
    pub fn against_missing<'a>(
        val: &'a Option<String>,
        field: &str,
    ) -> Result<&'a str, ValidationError> {
        match val.as_deref().map(str::trim) {
            Some(val) if !val.is_empty() => Ok(val),
            _ => Err(ValidationError(format!(
                "The `{}` field is required",
                field
            ))),
        }
    }

    pub fn against_unknown_service(val: &str) -> Result<ServiceType, ValidationError> {
        val.parse()
            .map_err(|e| ValidationError(format!("{}", e)))
    }

    pub fn against_malformed_date(val: &str) -> Result<NaiveDate, ValidationError> {
        NaiveDate::parse_from_str(val, "%Y-%m-%d").map_err(|_| {
            ValidationError(format!(
                "The date `{}` is malformed, expected YYYY-MM-DD",
                val
            ))
        })
    }

    pub fn against_malformed_time(val: &str) -> Result<NaiveTime, ValidationError> {
        NaiveTime::parse_from_str(val, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(val, "%H:%M:%S"))
            .map_err(|_| {
                ValidationError(format!(
                    "The time `{}` is malformed, expected HH:MM",
                    val
                ))
            })
    }

    pub fn against_malformed_duration(val: &str) -> Result<i64, ValidationError> {
        parse_duration(val).map_err(|e| ValidationError(format!("{}", e)))
    }
}
