use crate::errors::{AppError, ResultExt};
use crate::gateway_client::LeadGateway;
use crate::models::{Lead, LeadQuery, UploadFile};
use crate::search::filter_and_rank;
use serde_json::Value;

/// In-memory lead list of one dashboard session.
///
/// The list is only ever replaced wholesale by a fresh `list_all_leads`; it is
/// never merged with or deduplicated against earlier contents.
#[derive(Debug, Clone, Default)]
pub struct LeadBoard {
    leads: Vec<Lead>,
}

impl LeadBoard {
    pub fn new(leads: Vec<Lead>) -> Self {
        Self { leads }
    }

    /// Loads a board from the backend.
    pub async fn load(gateway: &dyn LeadGateway) -> Result<Self, AppError> {
        Ok(Self::new(gateway.list_all_leads().await?))
    }

    /// Re-fetches every lead and replaces the list. On failure the current
    /// list is left untouched.
    pub async fn refresh(&mut self, gateway: &dyn LeadGateway) -> Result<(), AppError> {
        self.leads = gateway.list_all_leads().await?;
        Ok(())
    }

    /// Uploads lead files, then refreshes the list from the backend.
    pub async fn upload(
        &mut self,
        gateway: &dyn LeadGateway,
        files: Vec<UploadFile>,
    ) -> Result<Value, AppError> {
        let response = gateway.upload_lead_files(files).await?;
        self.refresh(gateway)
            .await
            .context("Refreshing leads after upload")?;
        tracing::info!("Lead upload complete, {} leads after refresh", self.leads.len());
        Ok(response)
    }

    pub fn leads(&self) -> &[Lead] {
        &self.leads
    }

    pub fn into_leads(self) -> Vec<Lead> {
        self.leads
    }

    pub fn search(&self, query: &LeadQuery) -> Vec<Lead> {
        filter_and_rank(&self.leads, query)
    }

    /// Distinct event names, in first-seen order.
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for lead in &self.leads {
            if !names.contains(&lead.event_name) {
                names.push(lead.event_name.clone());
            }
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead(id: &str, event: &str) -> Lead {
        Lead {
            id: id.to_string(),
            event_name: event.to_string(),
            employee_name: String::new(),
            title: String::new(),
            company: String::new(),
            email: String::new(),
            phone: String::new(),
            linkedin_url: String::new(),
            company_url: String::new(),
        }
    }

    #[test]
    fn test_event_names_distinct_in_order() {
        let board = LeadBoard::new(vec![
            lead("1", "MICT"),
            lead("2", "GITEX"),
            lead("3", "MICT"),
            lead("4", "Unknown Event"),
        ]);
        assert_eq!(board.event_names(), vec!["MICT", "GITEX", "Unknown Event"]);
    }

    #[test]
    fn test_search_without_query_returns_filtered_in_order() {
        let board = LeadBoard::new(vec![lead("1", "A"), lead("2", "B"), lead("3", "A")]);
        let ids: Vec<_> = board
            .search(&LeadQuery {
                event: Some("A".into()),
                ..LeadQuery::default()
            })
            .into_iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(ids, vec!["1", "3"]);
    }
}
