//! Autocomplete suggestions and assignee workload, computed from the
//! unpaginated dropdown snapshot.

use std::collections::HashMap;

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::types::{Staff, Ticket};

pub const DEFAULT_SUGGESTION_LIMIT: usize = 8;

/// Rank unique candidates against `query`, best match first.
fn rank<'a>(candidates: impl Iterator<Item = &'a str>, query: &str, limit: usize) -> Vec<String> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    let matcher = SkimMatcherV2::default().ignore_case();
    let mut seen = std::collections::HashSet::new();
    let mut scored: Vec<(i64, &str)> = candidates
        .filter(|c| seen.insert(*c))
        .filter_map(|c| matcher.fuzzy_match(c, query).map(|score| (score, c)))
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    scored
        .into_iter()
        .take(limit)
        .map(|(_, c)| c.to_string())
        .collect()
}

/// Ticket numbers matching partially typed text.
pub fn ticket_number_suggestions(tickets: &[Ticket], typed: &str, limit: usize) -> Vec<String> {
    rank(
        tickets.iter().filter_map(|t| t.ticket_number.as_deref()),
        typed,
        limit,
    )
}

/// Patient documents matching partially typed text.
pub fn document_suggestions(tickets: &[Ticket], typed: &str, limit: usize) -> Vec<String> {
    rank(
        tickets.iter().filter_map(|t| t.patient_document.as_deref()),
        typed,
        limit,
    )
}

/// A staff member with the number of open tickets they hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffLoad {
    pub staff: Staff,
    pub open_tickets: usize,
}

/// Count open tickets per staff member. Tickets are matched by assignee id,
/// falling back to the assignee name when the id is missing.
pub fn staff_with_counts(staff: &[Staff], tickets: &[Ticket]) -> Vec<StaffLoad> {
    let mut by_id: HashMap<i64, usize> = HashMap::new();
    let mut by_name: HashMap<String, usize> = HashMap::new();

    for ticket in tickets.iter().filter(|t| t.status.is_open()) {
        if let Some(id) = ticket.assignee_id {
            *by_id.entry(id).or_default() += 1;
        } else if let Some(name) = ticket.assignee_name.as_deref().map(str::trim)
            && !name.is_empty()
        {
            *by_name.entry(name.to_lowercase()).or_default() += 1;
        }
    }

    staff
        .iter()
        .map(|member| StaffLoad {
            staff: member.clone(),
            open_tickets: by_id.get(&member.id).copied().unwrap_or(0)
                + by_name
                    .get(&member.name.trim().to_lowercase())
                    .copied()
                    .unwrap_or(0),
        })
        .collect()
}
