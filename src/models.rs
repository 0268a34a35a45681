use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

// ============ Lead Models ============

/// Event label used when the backend carries no event, campaign or ICP name.
pub const UNKNOWN_EVENT: &str = "Unknown Event";

/// One contact record as consumed by the dashboard.
///
/// Built only by the payload adapter in `backend_models`; every optional text
/// field is already normalized to an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    /// Opaque identifier assigned by the backend.
    pub id: String,
    /// Source campaign/event label.
    pub event_name: String,
    /// Contact's full name.
    pub employee_name: String,
    /// Free-text job title.
    pub title: String,
    /// Company name.
    pub company: String,
    /// Email address.
    pub email: String,
    /// Phone number.
    pub phone: String,
    /// LinkedIn profile URL.
    pub linkedin_url: String,
    /// Company website URL.
    pub company_url: String,
}

/// Coarse role classification derived from a job title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionBucket {
    #[serde(rename = "CEO")]
    Ceo,
    #[serde(rename = "CTO")]
    Cto,
    #[serde(rename = "CIO")]
    Cio,
    #[serde(rename = "COO")]
    Coo,
    #[serde(rename = "CFO")]
    Cfo,
    #[serde(rename = "CMO")]
    Cmo,
    #[serde(rename = "CRO")]
    Cro,
    #[serde(rename = "CSO")]
    Cso,
    Chief,
    #[serde(rename = "VP")]
    Vp,
    Director,
    Head,
    Manager,
    Lead,
    Other,
    Unknown,
}

impl PositionBucket {
    /// Every bucket, in classifier priority order.
    pub const ALL: [PositionBucket; 16] = [
        PositionBucket::Ceo,
        PositionBucket::Cto,
        PositionBucket::Cio,
        PositionBucket::Coo,
        PositionBucket::Cfo,
        PositionBucket::Cmo,
        PositionBucket::Cro,
        PositionBucket::Cso,
        PositionBucket::Chief,
        PositionBucket::Vp,
        PositionBucket::Director,
        PositionBucket::Head,
        PositionBucket::Manager,
        PositionBucket::Lead,
        PositionBucket::Other,
        PositionBucket::Unknown,
    ];

    /// Display name, also the value the position filter compares against.
    pub fn as_str(&self) -> &'static str {
        match self {
            PositionBucket::Ceo => "CEO",
            PositionBucket::Cto => "CTO",
            PositionBucket::Cio => "CIO",
            PositionBucket::Coo => "COO",
            PositionBucket::Cfo => "CFO",
            PositionBucket::Cmo => "CMO",
            PositionBucket::Cro => "CRO",
            PositionBucket::Cso => "CSO",
            PositionBucket::Chief => "Chief",
            PositionBucket::Vp => "VP",
            PositionBucket::Director => "Director",
            PositionBucket::Head => "Head",
            PositionBucket::Manager => "Manager",
            PositionBucket::Lead => "Lead",
            PositionBucket::Other => "Other",
            PositionBucket::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for PositionBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Search and filter parameters for the lead list.
///
/// `None` means "all". Filters compare with exact, case-sensitive equality.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadQuery {
    /// Free-text search query.
    pub query: String,
    /// Required event name.
    pub event: Option<String>,
    /// Required position bucket name (e.g. "Director").
    pub position: Option<String>,
}

impl LeadQuery {
    /// Builds a query from raw dashboard parameters, where a missing value or
    /// the literal `"all"` disables the filter.
    pub fn from_params(
        query: Option<String>,
        event: Option<String>,
        position: Option<String>,
    ) -> Self {
        fn filter_value(value: Option<String>) -> Option<String> {
            value.filter(|v| v != "all")
        }

        Self {
            query: query.unwrap_or_default(),
            event: filter_value(event),
            position: filter_value(position),
        }
    }
}

// ============ Persona ============

/// Named access mode selecting which backend path prefix a session uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Persona {
    #[default]
    Sales,
    Delegates,
}

impl Persona {
    pub fn as_str(&self) -> &'static str {
        match self {
            Persona::Sales => "sales",
            Persona::Delegates => "delegates",
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Persona {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sales" => Ok(Persona::Sales),
            "delegates" | "delegate" => Ok(Persona::Delegates),
            other => Err(format!(
                "Unknown persona '{}', expected 'sales' or 'delegates'",
                other
            )),
        }
    }
}

/// Body of `PUT /api/v1/persona` and response of `GET /api/v1/persona`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaBody {
    pub persona: Persona,
}

// ============ Transfer Models ============

/// A file received from the dashboard, forwarded to the backend upload endpoint.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// A raw file produced by the backend (e.g. a campaign export).
#[derive(Debug, Clone)]
pub struct Download {
    pub content_type: String,
    pub content_disposition: Option<String>,
    pub bytes: Vec<u8>,
}

/// Latest replies and message statuses kept by the inbox monitor, for the
/// persona they were fetched under.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InboxSnapshot {
    pub persona: Persona,
    pub replies: Value,
    pub message_statuses: Value,
    pub refreshed_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl InboxSnapshot {
    /// Snapshot with no data yet for `persona`.
    pub fn empty(persona: Persona) -> Self {
        Self {
            persona,
            replies: Value::Array(Vec::new()),
            message_statuses: Value::Array(Vec::new()),
            refreshed_at: None,
            last_error: None,
        }
    }
}

impl Default for InboxSnapshot {
    fn default() -> Self {
        Self::empty(Persona::default())
    }
}

/// Response of `POST /api/v1/leads/upload`.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub uploaded: usize,
    pub backend: Value,
    pub leads: Vec<Lead>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lead_query_all_disables_filters() {
        let q = LeadQuery::from_params(None, Some("all".into()), Some("all".into()));
        assert_eq!(q, LeadQuery::default());
    }

    #[test]
    fn test_lead_query_keeps_exact_values() {
        let q = LeadQuery::from_params(
            Some("dir".into()),
            Some("MICT".into()),
            Some("Director".into()),
        );
        assert_eq!(q.query, "dir");
        assert_eq!(q.event.as_deref(), Some("MICT"));
        assert_eq!(q.position.as_deref(), Some("Director"));
    }

    #[test]
    fn test_persona_parsing() {
        assert_eq!("Sales".parse::<Persona>().unwrap(), Persona::Sales);
        assert_eq!(" delegates ".parse::<Persona>().unwrap(), Persona::Delegates);
        assert!("admin".parse::<Persona>().is_err());
    }

    #[test]
    fn test_lead_serializes_camel_case() {
        let lead = Lead {
            id: "1".into(),
            event_name: "MICT".into(),
            employee_name: "Ahmed".into(),
            title: String::new(),
            company: String::new(),
            email: String::new(),
            phone: String::new(),
            linkedin_url: String::new(),
            company_url: String::new(),
        };
        let value = serde_json::to_value(&lead).unwrap();
        assert_eq!(value["eventName"], "MICT");
        assert_eq!(value["employeeName"], "Ahmed");
        assert_eq!(value["linkedinUrl"], "");
    }

    #[test]
    fn test_bucket_names_round_trip_through_serde() {
        for bucket in PositionBucket::ALL {
            let json = serde_json::to_value(bucket).unwrap();
            assert_eq!(json, bucket.as_str());
        }
    }
}
