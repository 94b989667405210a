//! Bulk-selection set.
//!
//! Only tickets that are unassigned and not resolved can be selected, and
//! only from the rows currently displayed. Selection never spans pages.

use std::collections::BTreeSet;

use crate::types::{Ticket, TicketId};

/// Whether a ticket can take part in a bulk assignment.
pub fn is_eligible(ticket: &Ticket) -> bool {
    !ticket.is_assigned() && !ticket.status.is_resolved()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: BTreeSet<TicketId>,
}

impl SelectionSet {
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn contains(&self, id: TicketId) -> bool {
        self.ids.contains(&id)
    }

    /// Selected ids in ascending order.
    pub fn ids(&self) -> Vec<TicketId> {
        self.ids.iter().copied().collect()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Toggle one ticket. Ids that are not displayed or not eligible are
    /// rejected and leave the set unchanged.
    pub fn toggle(&mut self, id: TicketId, displayed: &[&Ticket]) -> bool {
        if !displayed.iter().any(|t| t.id == id && is_eligible(t)) {
            return false;
        }
        if !self.ids.remove(&id) {
            self.ids.insert(id);
        }
        true
    }

    /// Whether every eligible displayed ticket is selected (and there is at
    /// least one).
    pub fn all_eligible_selected(&self, displayed: &[&Ticket]) -> bool {
        let mut eligible = displayed.iter().filter(|t| is_eligible(t)).peekable();
        eligible.peek().is_some() && eligible.all(|t| self.ids.contains(&t.id))
    }

    /// Select-all toggle: empties the set when every eligible displayed
    /// ticket is already selected, otherwise replaces it with them.
    pub fn toggle_all(&mut self, displayed: &[&Ticket]) {
        if self.all_eligible_selected(displayed) {
            self.ids.clear();
        } else {
            self.ids = displayed
                .iter()
                .filter(|t| is_eligible(t))
                .map(|t| t.id)
                .collect();
        }
    }

    /// Drop ids that are no longer displayed or no longer eligible.
    pub fn retain_eligible(&mut self, displayed: &[&Ticket]) {
        self.ids
            .retain(|id| displayed.iter().any(|t| t.id == *id && is_eligible(t)));
    }
}
