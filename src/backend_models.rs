use crate::errors::AppError;
use crate::models::{Lead, UNKNOWN_EVENT};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Bulk lead payload returned by the backend: a bare array or an object
/// wrapping the array under `leads`.
///
/// Items stay raw here so one malformed record cannot reject the whole list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LeadListPayload {
    Bare(Vec<Value>),
    Wrapped { leads: Vec<Value> },
}

impl LeadListPayload {
    /// Convert to a vec of raw items for per-record processing
    pub fn into_items(self) -> Vec<Value> {
        match self {
            LeadListPayload::Bare(items) => items,
            LeadListPayload::Wrapped { leads } => leads,
        }
    }
}

/// Lead as sent by the backend. Numbers are accepted where text is expected.
///
/// Fields the backend spells in both snake_case and camelCase are read
/// separately (`*_camel`); the first non-empty spelling wins.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendLead {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub event_name: Option<String>,
    #[serde(default, rename = "eventName", deserialize_with = "lenient_string")]
    pub event_name_camel: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub campaign_name: Option<String>,
    #[serde(default, rename = "campaignName", deserialize_with = "lenient_string")]
    pub campaign_name_camel: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub icp_name: Option<String>,
    #[serde(default, rename = "icpName", deserialize_with = "lenient_string")]
    pub icp_name_camel: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub icp_preview: Option<String>,
    #[serde(default, rename = "icpPreview", deserialize_with = "lenient_string")]
    pub icp_preview_camel: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub employee_name: Option<String>,
    #[serde(default, rename = "employeeName", deserialize_with = "lenient_string")]
    pub employee_name_camel: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub linkedin_url: Option<String>,
    #[serde(default, rename = "linkedinUrl", deserialize_with = "lenient_string")]
    pub linkedin_url_camel: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub company_url: Option<String>,
    #[serde(default, rename = "companyUrl", deserialize_with = "lenient_string")]
    pub company_url_camel: Option<String>,
}

/// Accepts a string, a number or null.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

/// First non-empty of two spellings, or `""`.
fn either(snake: Option<String>, camel: Option<String>) -> String {
    snake
        .filter(|s| !s.trim().is_empty())
        .or(camel)
        .unwrap_or_default()
}

impl BackendLead {
    /// Event label through the fallback chain: explicit event name, campaign
    /// name, ICP name, ICP preview, then `"Unknown Event"`.
    pub fn resolved_event_name(&self) -> String {
        non_empty(&self.event_name)
            .or_else(|| non_empty(&self.event_name_camel))
            .or_else(|| non_empty(&self.campaign_name))
            .or_else(|| non_empty(&self.campaign_name_camel))
            .or_else(|| non_empty(&self.icp_name))
            .or_else(|| non_empty(&self.icp_name_camel))
            .or_else(|| non_empty(&self.icp_preview))
            .or_else(|| non_empty(&self.icp_preview_camel))
            .unwrap_or(UNKNOWN_EVENT)
            .to_string()
    }

    /// Canonical lead, or `None` when the backend sent no identifier.
    pub fn into_lead(self) -> Option<Lead> {
        let event_name = self.resolved_event_name();
        let id = self.id.filter(|id| !id.trim().is_empty())?;

        Some(Lead {
            id,
            event_name,
            employee_name: either(self.employee_name, self.employee_name_camel),
            title: self.title.unwrap_or_default(),
            company: self.company.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            phone: self.phone.unwrap_or_default(),
            linkedin_url: either(self.linkedin_url, self.linkedin_url_camel),
            company_url: either(self.company_url, self.company_url_camel),
        })
    }
}

/// Validates and normalizes a bulk lead payload into canonical leads.
///
/// Only the outer shape (a list or `{ "leads": [...] }`) can fail the call.
/// Records that are not objects or carry no identifier are dropped with a
/// warning.
pub fn parse_lead_list(payload: Value) -> Result<Vec<Lead>, AppError> {
    let payload: LeadListPayload = serde_json::from_value(payload).map_err(|_| {
        AppError::InvalidPayload(
            "expected a lead array or an object with a 'leads' array".to_string(),
        )
    })?;

    let items = payload.into_items();
    let total = items.len();
    let mut leads = Vec::with_capacity(total);

    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<BackendLead>(item) {
            Ok(raw) => match raw.into_lead() {
                Some(lead) => leads.push(lead),
                None => tracing::warn!("Dropping lead #{} without an id", index),
            },
            Err(e) => tracing::warn!("Dropping malformed lead #{}: {}", index, e),
        }
    }

    if leads.len() < total {
        tracing::warn!(
            "Kept {} of {} lead(s) from backend payload",
            leads.len(),
            total
        );
    }

    Ok(leads)
}
