use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

/// The fixed catalog of services offered by the practice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceType {
    #[serde(rename = "Individual Therapy")]
    IndividualTherapy,
    #[serde(rename = "Couples Therapy")]
    CouplesTherapy,
    #[serde(rename = "Family Therapy")]
    FamilyTherapy,
    #[serde(rename = "Teen Counselling")]
    TeenCounselling,
    #[serde(rename = "Initial Consultation")]
    InitialConsultation,
}

#[derive(Error, Debug, PartialEq)]
#[error("Unknown service: `{0}`")]
pub struct UnknownServiceError(pub String);

impl ServiceType {
    pub const ALL: [ServiceType; 5] = [
        Self::IndividualTherapy,
        Self::CouplesTherapy,
        Self::FamilyTherapy,
        Self::TeenCounselling,
        Self::InitialConsultation,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::IndividualTherapy => "Individual Therapy",
            Self::CouplesTherapy => "Couples Therapy",
            Self::FamilyTherapy => "Family Therapy",
            Self::TeenCounselling => "Teen Counselling",
            Self::InitialConsultation => "Initial Consultation",
        }
    }

    /// Session fee in whole pounds
    pub fn fee(&self) -> u32 {
        match self {
            Self::IndividualTherapy => 120,
            Self::CouplesTherapy => 150,
            Self::FamilyTherapy => 170,
            Self::TeenCounselling => 100,
            Self::InitialConsultation => 0,
        }
    }

    pub fn fee_display(&self) -> String {
        match self.fee() {
            0 => "Free".into(),
            fee => format!("£{}", fee),
        }
    }

    pub fn default_duration_minutes(&self) -> i64 {
        match self {
            Self::IndividualTherapy => 50,
            Self::CouplesTherapy | Self::FamilyTherapy => 75,
            Self::TeenCounselling => 50,
            Self::InitialConsultation => 20,
        }
    }

    /// Maps the free text title of an externally booked appointment type onto the catalog.
    /// Titles that match nothing more specific are treated as individual sessions.
    pub fn from_external_title(title: &str) -> Self {
        if let Ok(service) = title.parse::<ServiceType>() {
            return service;
        }
        let title = title.to_lowercase();
        let contains_any = |keywords: &[&str]| keywords.iter().any(|k| title.contains(k));

        if contains_any(&["family"]) {
            Self::FamilyTherapy
        } else if contains_any(&["couple", "relationship", "marriage"]) {
            Self::CouplesTherapy
        } else if contains_any(&["teen", "adolescent", "youth"]) {
            Self::TeenCounselling
        } else if contains_any(&["consult", "discovery", "intro"]) {
            Self::InitialConsultation
        } else {
            Self::IndividualTherapy
        }
    }
}

impl Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ServiceType {
    type Err = UnknownServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('-', " ").to_lowercase();
        Self::ALL
            .iter()
            .find(|service| service.name().to_lowercase() == normalized)
            .copied()
            .ok_or_else(|| UnknownServiceError(s.to_string()))
    }
}
