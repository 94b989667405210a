use crate::types::TicketId;

/// Which assignment dropdown is open. Row and bulk dropdowns are mutually
/// exclusive; screen placement is left to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DropdownState {
    #[default]
    Closed,
    Row(TicketId),
    Bulk,
}

impl DropdownState {
    /// Opening the row that is already open closes it.
    pub fn toggle_row(self, id: TicketId) -> Self {
        match self {
            DropdownState::Row(open) if open == id => DropdownState::Closed,
            _ => DropdownState::Row(id),
        }
    }

    pub fn toggle_bulk(self) -> Self {
        match self {
            DropdownState::Bulk => DropdownState::Closed,
            _ => DropdownState::Bulk,
        }
    }

    pub fn is_open_for(self, id: TicketId) -> bool {
        self == DropdownState::Row(id)
    }

    pub fn is_bulk(self) -> bool {
        self == DropdownState::Bulk
    }
}
