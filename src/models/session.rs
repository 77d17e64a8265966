use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

pub type SessionId = i64;

/// One row of the store's session listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: SessionId,
    #[serde(default, alias = "test_date")]
    pub date: Option<String>,
}

/// A session as returned by the store, before any validation.
///
/// Every field is optional because the store hands back whatever the
/// extractor produced. A record without a usable date or without an
/// observation list is skipped during aggregation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionDetail {
    #[serde(default)]
    pub session_id: Option<SessionId>,
    #[serde(default, alias = "test_date")]
    pub date: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default, alias = "blood_tests")]
    pub observations: Option<Vec<RawObservation>>,
}

impl SessionDetail {
    /// A well-formed session with a date and an observation list.
    pub fn new(date: &str, observations: Vec<RawObservation>) -> Self {
        Self {
            date: Some(date.to_string()),
            observations: Some(observations),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }
}

/// A single extracted test line: name, value text and unit as found.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    #[serde(default)]
    pub test_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_raw_value")]
    pub value: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub normal_range: Option<String>,
}

impl RawObservation {
    pub fn new(test_name: &str, value: &str, unit: &str) -> Self {
        Self {
            test_name: Some(test_name.to_string()),
            value: Some(value.to_string()),
            unit: Some(unit.to_string()),
            normal_range: None,
        }
    }

    pub fn with_normal_range(mut self, range: &str) -> Self {
        self.normal_range = Some(range.to_string());
        self
    }
}

/// A validated observation: numeric value, dated by its session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestObservation {
    pub test_name: String,
    pub value: f64,
    pub unit: String,
    pub observed_at: NaiveDate,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Text(String),
    Number(f64),
}

/// Stores send values either as JSON numbers or as free text; keep both as text
/// so parsing policy lives in one place.
fn deserialize_raw_value<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawValue>::deserialize(deserializer)?;
    Ok(raw.map(|value| match value {
        RawValue::Text(text) => text,
        RawValue::Number(number) => number.to_string(),
    }))
}
