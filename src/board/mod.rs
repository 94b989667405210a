//! Ticket board state controller.
//!
//! [`model`] holds the pure reducer and view model; [`runtime`] owns a
//! [`model::BoardState`], runs the effects it emits against a
//! [`TicketGateway`](crate::gateway::TicketGateway) and publishes snapshots.

pub mod dropdown;
pub mod filter;
pub mod model;
pub mod respond;
pub mod runtime;
pub mod selection;
pub mod suggest;
pub mod toast;
pub mod urgency;

use std::time::Duration;

pub use dropdown::DropdownState;
pub use filter::{FilterState, ServerFilter, TextField};
pub use model::{
    BoardAction, BoardEffect, BoardState, BoardViewModel, DropdownData, EmptyState, MutationKind,
    TicketRow, compute_board_view_model, reduce_board_state,
};
pub use respond::{RespondForm, RespondPhase, TemplateChoice};
pub use runtime::{BoardHandle, spawn_board};
pub use selection::SelectionSet;
pub use toast::{Toast, ToastLevel};
pub use urgency::{UrgencyBucket, urgency_bucket};

pub const DEFAULT_PAGE_SIZE: u32 = 15;
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(400);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
pub const DEFAULT_RESPOND_CLOSE_DELAY: Duration = Duration::from_millis(2000);

/// Timing and paging knobs for one board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    pub page_size: u32,
    /// Quiet period before typed text is applied
    pub debounce: Duration,
    /// Upper bound on any single remote call
    pub request_timeout: Duration,
    /// How long a successful answer stays on screen
    pub respond_close_delay: Duration,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            debounce: DEFAULT_DEBOUNCE,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            respond_close_delay: DEFAULT_RESPOND_CLOSE_DELAY,
        }
    }
}
