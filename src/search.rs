//! Lead search: relevance scoring and the filter-and-rank pipeline.
//!
//! Scoring is a heuristic text match over six weighted fields. Equality
//! filters (event, position bucket) run first; ranking only happens when the
//! query is non-blank.

use crate::models::{Lead, LeadQuery};
use crate::position::classify;

const NAME_WEIGHT: u32 = 120;
const TITLE_WEIGHT: u32 = 90;
const COMPANY_WEIGHT: u32 = 80;
const EVENT_WEIGHT: u32 = 70;
const EMAIL_WEIGHT: u32 = 30;
const PHONE_WEIGHT: u32 = 20;

const EXACT_BONUS: u32 = 120;
const PREFIX_BONUS: u32 = 80;
const SUBSTRING_BONUS: u32 = 30;
const TOKEN_HIT_BONUS: u32 = 12;
const EMAIL_QUERY_BONUS: u32 = 40;

/// Contribution of a single field. `field` and `query` are already lower-cased.
fn field_score(field: &str, query: &str, tokens: &[&str], weight: u32) -> u32 {
    if field.is_empty() {
        return 0;
    }

    let mut score = if field == query {
        weight + EXACT_BONUS
    } else if field.starts_with(query) {
        weight + PREFIX_BONUS
    } else if field.contains(query) {
        weight + SUBSTRING_BONUS
    } else {
        0
    };

    // Multi-token bonus stacks on top of the whole-query match.
    if tokens.len() > 1 {
        let hits = tokens.iter().filter(|t| field.contains(*t)).count() as u32;
        if hits > 0 {
            score += weight + TOKEN_HIT_BONUS * hits;
        }
    }

    score
}

/// Relevance of `lead` for a free-text `query`; 0 means no match.
///
/// A blank query scores 0 for every lead.
pub fn score(lead: &Lead, query: &str) -> u32 {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return 0;
    }
    let tokens: Vec<&str> = query.split_whitespace().collect();

    let email = lead.email.to_lowercase();
    let fields = [
        (lead.employee_name.to_lowercase(), NAME_WEIGHT),
        (lead.title.to_lowercase(), TITLE_WEIGHT),
        (lead.company.to_lowercase(), COMPANY_WEIGHT),
        (lead.event_name.to_lowercase(), EVENT_WEIGHT),
        (lead.phone.to_lowercase(), PHONE_WEIGHT),
    ];

    let mut total: u32 = fields
        .iter()
        .map(|(field, weight)| field_score(field, &query, &tokens, *weight))
        .sum();
    total += field_score(&email, &query, &tokens, EMAIL_WEIGHT);

    if query.contains('@') && email.contains(&query) {
        total += EMAIL_QUERY_BONUS;
    }

    total
}

/// Whether `lead` passes the event and position equality filters.
pub fn matches_filters(lead: &Lead, query: &LeadQuery) -> bool {
    let event_ok = query
        .event
        .as_deref()
        .map_or(true, |event| lead.event_name == event);
    let position_ok = query
        .position
        .as_deref()
        .map_or(true, |position| classify(&lead.title).as_str() == position);

    event_ok && position_ok
}

/// Applies the equality filters, then ranks by relevance when a query is set.
///
/// Without a query the filtered leads keep their input order. With one, leads
/// scoring 0 are dropped and the rest are sorted by descending score; the sort
/// is stable so ties keep their input order.
pub fn filter_and_rank(leads: &[Lead], query: &LeadQuery) -> Vec<Lead> {
    let filtered = leads.iter().filter(|lead| matches_filters(lead, query));

    if query.query.trim().is_empty() {
        return filtered.cloned().collect();
    }

    let mut scored: Vec<(u32, &Lead)> = filtered
        .map(|lead| (score(lead, &query.query), lead))
        .filter(|(s, _)| *s > 0)
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    tracing::debug!(
        "Ranked {} of {} leads for query '{}'",
        scored.len(),
        leads.len(),
        query.query
    );

    scored.into_iter().map(|(_, lead)| lead.clone()).collect()
}
