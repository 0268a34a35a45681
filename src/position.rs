//! Job-title classification into position buckets.
//!
//! Patterns overlap ("Director of Lead Generation" mentions two tiers), so they
//! are tested in priority order and the first match wins.

use crate::models::PositionBucket;
use regex::Regex;
use std::sync::LazyLock;

static POSITION_PATTERNS: LazyLock<Vec<(PositionBucket, Regex)>> = LazyLock::new(|| {
    [
        // C-suite
        (PositionBucket::Ceo, r"(chief executive|ceo)"),
        (PositionBucket::Cto, r"(chief technology|cto)"),
        (PositionBucket::Cio, r"(chief information|cio)"),
        (PositionBucket::Coo, r"(chief operating|coo)"),
        (PositionBucket::Cfo, r"(chief financial|cfo)"),
        (PositionBucket::Cmo, r"(chief marketing|cmo)"),
        (PositionBucket::Cro, r"(chief revenue|cro)"),
        (PositionBucket::Cso, r"(chief security|cso)"),
        (
            PositionBucket::Chief,
            r"(chief product|chief commercial|cpo|cco)",
        ),
        // Leadership tiers
        (PositionBucket::Vp, r"(vp|vice president)"),
        (PositionBucket::Director, r"director"),
        (PositionBucket::Head, r"head of"),
        (PositionBucket::Manager, r"manager"),
        (PositionBucket::Lead, r"lead"),
    ]
    .into_iter()
    .map(|(bucket, pattern)| {
        // ASCII word boundaries: accented letters do not count as word characters.
        let anchored = format!(r"(?-u:\b){}(?-u:\b)", pattern);
        (bucket, Regex::new(&anchored).expect("valid regex"))
    })
    .collect()
});

/// Maps a free-text job title to its position bucket.
///
/// Total: empty or whitespace-only titles are `Unknown`, titles matching no
/// pattern are `Other`.
pub fn classify(title: &str) -> PositionBucket {
    let lowered = title.to_lowercase();

    POSITION_PATTERNS
        .iter()
        .find(|(_, pattern)| pattern.is_match(&lowered))
        .map(|(bucket, _)| *bucket)
        .unwrap_or_else(|| {
            if lowered.trim().is_empty() {
                PositionBucket::Unknown
            } else {
                PositionBucket::Other
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_titles_are_unknown() {
        assert_eq!(classify(""), PositionBucket::Unknown);
        assert_eq!(classify("   "), PositionBucket::Unknown);
        assert_eq!(classify("\t\n"), PositionBucket::Unknown);
    }

    #[test]
    fn test_c_suite() {
        assert_eq!(classify("Chief Executive Officer"), PositionBucket::Ceo);
        assert_eq!(classify("CEO & Founder"), PositionBucket::Ceo);
        assert_eq!(classify("Group CTO"), PositionBucket::Cto);
        assert_eq!(classify("Chief Information Officer"), PositionBucket::Cio);
        assert_eq!(classify("COO"), PositionBucket::Coo);
        assert_eq!(classify("Chief Financial Officer"), PositionBucket::Cfo);
        assert_eq!(classify("cmo"), PositionBucket::Cmo);
        assert_eq!(classify("Chief Revenue Officer"), PositionBucket::Cro);
        assert_eq!(classify("CSO, Cyber Defense"), PositionBucket::Cso);
        assert_eq!(classify("Chief Product Officer"), PositionBucket::Chief);
        assert_eq!(classify("CCO"), PositionBucket::Chief);
    }

    #[test]
    fn test_leadership_tiers() {
        assert_eq!(classify("VP Marketing"), PositionBucket::Vp);
        assert_eq!(classify("Vice President, Sales"), PositionBucket::Vp);
        assert_eq!(classify("Sales Director"), PositionBucket::Director);
        assert_eq!(classify("Head of Sales"), PositionBucket::Head);
        assert_eq!(classify("Senior Sales Manager"), PositionBucket::Manager);
        assert_eq!(classify("Team Lead"), PositionBucket::Lead);
    }

    #[test]
    fn test_priority_order() {
        // Director outranks Manager and Lead regardless of word order.
        assert_eq!(classify("Manager, Office of the Director"), PositionBucket::Director);
        assert_eq!(classify("Lead Generation Manager"), PositionBucket::Manager);
        assert_eq!(classify("CEO and Head of Product"), PositionBucket::Ceo);
    }

    #[test]
    fn test_word_boundaries() {
        assert_eq!(classify("Leadership Coach"), PositionBucket::Other);
        assert_eq!(classify("Directorate Clerk"), PositionBucket::Other);
        assert_eq!(classify("Tacos Chef"), PositionBucket::Other);
        assert_eq!(classify("Soccer Coach"), PositionBucket::Other);
        assert_eq!(classify("Forehead of the class"), PositionBucket::Other);
    }

    #[test]
    fn test_accented_letters_are_not_word_characters() {
        assert_eq!(classify("éceo"), PositionBucket::Ceo);
        assert_eq!(classify("Directeur Généralmanager"), PositionBucket::Other);
        assert_eq!(classify("Responsable Marketing (ÉquipeLead)"), PositionBucket::Other);
        assert_eq!(classify("directorà"), PositionBucket::Director);
    }
}
