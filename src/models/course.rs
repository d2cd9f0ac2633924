// src/models/course.rs

//! Course data structure.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A university programme offered through the consultancy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Positive catalogue number
    pub serial_no: u64,

    /// Backend identifier, when the API exposes one
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,

    pub university: String,
    pub program_name: String,
    pub campus: String,
    pub country: String,

    pub duration: String,
    pub open_intakes: String,
    pub intake_year: String,
    pub entry_requirements: String,
    pub yearly_tuition_fees: String,

    /// Overall IELTS band, 0 to 9
    pub ielts_score: f64,
    /// Minimum band per IELTS component, 0 to 9
    pub ielts_no_band_less_than: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pte_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pte_no_band_less_than: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toefl_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duolingo: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gmat_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gre_score: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_deadline: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scholarships: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub career_prospects: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accreditation: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specializations: Option<Vec<String>>,
}

impl Course {
    /// Identifier used in URLs: the backend id when present, else the serial number.
    pub fn route_id(&self) -> String {
        self.id
            .clone()
            .unwrap_or_else(|| self.serial_no.to_string())
    }

    /// Whether the course lists any scholarship.
    pub fn offers_scholarships(&self) -> bool {
        self.scholarships.as_ref().is_some_and(|s| !s.is_empty())
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number for id, got {other}"
        ))),
    }
}
