//! Filter state for the ticket board.
//!
//! Criteria split in two groups:
//! - server-evaluated fields live in [`FilterState::applied`] and are sent with
//!   every search;
//! - the two free-text inputs are typed into [`FilterState::typed_ticket_number`]
//!   / [`FilterState::typed_patient_document`] and only copied into `applied`
//!   once the debounce quiet period elapses.
//!
//! The urgency bucket is client-side only and refines the cached page.

use jiff::Timestamp;

use super::urgency::{UrgencyBucket, urgency_bucket};
use crate::gateway::TicketQuery;
use crate::types::{DateRange, StatusGroup, Ticket, TicketPriority};

/// Debounced text inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    TicketNumber,
    PatientDocument,
}

/// A change to one server-evaluated criterion.
///
/// `TicketNumber` / `PatientDocument` here mean a value picked from the
/// autocomplete list, which applies immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerFilter {
    StatusGroup(Option<StatusGroup>),
    Priority(Option<TicketPriority>),
    AssigneeId(Option<i64>),
    AssigneeName(Option<String>),
    Doctor(Option<i64>),
    Created(DateRange),
    Attended(DateRange),
    TicketNumber(Option<String>),
    PatientDocument(Option<String>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    /// Criteria sent with the last (or next) search
    pub applied: TicketQuery,
    /// Ticket-number text as typed, not yet applied
    pub typed_ticket_number: String,
    /// Patient-document text as typed, not yet applied
    pub typed_patient_document: String,
    /// Client-side waiting-time refinement
    pub urgency: Option<UrgencyBucket>,
    /// Zero-based page index
    pub page_index: u32,
}

/// Blank input means "no filter".
pub fn normalize_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl FilterState {
    pub fn new(applied: TicketQuery) -> Self {
        Self {
            typed_ticket_number: applied.ticket_number.clone().unwrap_or_default(),
            typed_patient_document: applied.patient_document.clone().unwrap_or_default(),
            applied,
            urgency: None,
            page_index: 0,
        }
    }

    pub fn set_typed(&mut self, field: TextField, value: String) {
        match field {
            TextField::TicketNumber => self.typed_ticket_number = value,
            TextField::PatientDocument => self.typed_patient_document = value,
        }
    }

    /// Whether the typed text differs from what the last search used.
    pub fn typed_differs(&self) -> bool {
        normalize_text(&self.typed_ticket_number) != self.applied.ticket_number
            || normalize_text(&self.typed_patient_document) != self.applied.patient_document
    }

    /// Copy the typed text into the applied criteria. Returns whether
    /// anything changed; on change the page index goes back to 0.
    pub fn apply_typed(&mut self) -> bool {
        if !self.typed_differs() {
            return false;
        }
        self.applied.ticket_number = normalize_text(&self.typed_ticket_number);
        self.applied.patient_document = normalize_text(&self.typed_patient_document);
        self.page_index = 0;
        true
    }

    /// Apply one server-evaluated change. Returns whether the criteria
    /// changed; on change the page index goes back to 0.
    pub fn apply_server_filter(&mut self, filter: ServerFilter) -> bool {
        let query = &mut self.applied;
        let changed = match filter {
            ServerFilter::StatusGroup(group) => {
                let group = group.filter(|g| !g.statuses().is_empty());
                replace(&mut query.status_group, group)
            }
            ServerFilter::Priority(priority) => replace(&mut query.priority, priority),
            ServerFilter::AssigneeId(id) => replace(&mut query.assignee_id, id),
            ServerFilter::AssigneeName(name) => {
                let name = name.as_deref().and_then(normalize_text);
                replace(&mut query.assignee_name, name)
            }
            ServerFilter::Doctor(id) => replace(&mut query.doctor_id, id),
            ServerFilter::Created(range) => replace(&mut query.created, range),
            ServerFilter::Attended(range) => replace(&mut query.attended, range),
            ServerFilter::TicketNumber(number) => {
                let number = number.as_deref().and_then(normalize_text);
                self.typed_ticket_number = number.clone().unwrap_or_default();
                replace(&mut query.ticket_number, number)
            }
            ServerFilter::PatientDocument(document) => {
                let document = document.as_deref().and_then(normalize_text);
                self.typed_patient_document = document.clone().unwrap_or_default();
                replace(&mut query.patient_document, document)
            }
        };
        if changed {
            self.page_index = 0;
        }
        changed
    }

    /// Reset every criterion, typed text and urgency included.
    pub fn clear(&mut self) -> bool {
        let cleared = FilterState::default();
        if *self == cleared {
            return false;
        }
        *self = cleared;
        true
    }

    pub fn has_active_filters(&self) -> bool {
        self.applied != TicketQuery::default() || self.urgency.is_some()
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

/// Tickets from the cached page that fall in `urgency` at `now`.
///
/// Server order is preserved; with no bucket every ticket passes.
pub fn refine_by_urgency<'a>(
    tickets: &'a [Ticket],
    urgency: Option<UrgencyBucket>,
    now: Timestamp,
) -> Vec<&'a Ticket> {
    tickets
        .iter()
        .filter(|ticket| match urgency {
            Some(bucket) => urgency_bucket(now, ticket.created_at) == bucket,
            None => true,
        })
        .collect()
}
