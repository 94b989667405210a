//! Board model types for testable state management
//!
//! The board is driven by a pure reducer: [`reduce_board_state`] takes the
//! current [`BoardState`] and a [`BoardAction`] and returns the next state
//! plus the [`BoardEffect`]s the runtime must perform (remote calls, timers).
//! [`compute_board_view_model`] derives everything a renderer needs.
//!
//! Every page fetch and dropdown-data load carries a [`RequestId`]; a
//! completion whose id is not the latest issued one is ignored. Mutation
//! completions never touch the cached page, they only schedule a new fetch.

use std::collections::BTreeSet;

use jiff::Timestamp;

use super::BoardConfig;
use super::dropdown::DropdownState;
use super::filter::{FilterState, ServerFilter, TextField, refine_by_urgency};
use super::respond::{RespondForm, RespondPhase};
use super::selection::{SelectionSet, is_eligible};
use super::toast::Toast;
use super::urgency::{UrgencyBucket, urgency_bucket};
use crate::gateway::{BulkAssignOutcome, PageRequest, PhoneUpdate, TicketQuery, TicketResponse};
use crate::types::{
    CurrentUser, DoctorCount, ResponseTemplate, Staff, StatusGroup, Ticket, TicketId, TicketPage,
    TicketStatus,
};

/// Tag attached to fetches so late replies can be recognized.
pub type RequestId = u64;

// ============================================================================
// State Types
// ============================================================================

/// Unpaginated data backing the dropdowns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DropdownData {
    /// Tickets in the active status group, for autocomplete and counts
    pub tickets: Vec<Ticket>,
    pub staff: Vec<Staff>,
    pub doctors: Vec<DoctorCount>,
    pub templates: Vec<ResponseTemplate>,
}

/// Which single-ticket mutation finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationKind {
    Assign(Staff),
    Unassign,
    UpdatePhones,
}

/// Raw board state, owned by one controller
#[derive(Debug, Clone)]
pub struct BoardState {
    // Filters
    pub filters: FilterState,
    /// Text debounce timer is running
    pub debounce_pending: bool,

    // Page cache
    /// Last successfully fetched page
    pub page: Option<TicketPage>,
    pub page_size: u32,
    /// A page fetch is outstanding
    pub loading: bool,
    /// Banner for the last failed fetch; the cached page stays visible
    pub fetch_error: Option<String>,

    // Selection and dropdowns
    pub selection: SelectionSet,
    pub dropdown: DropdownState,
    pub dropdown_data: DropdownData,
    /// A dropdown-data load is outstanding
    pub lookups_loading: bool,

    // Mutations
    /// Tickets with a single-ticket mutation outstanding
    pub in_flight: BTreeSet<TicketId>,
    pub bulk_in_flight: bool,
    pub respond: Option<RespondForm>,

    pub toast: Option<Toast>,
    pub current_user: CurrentUser,

    // Request bookkeeping
    next_request_id: RequestId,
    latest_page_request: Option<RequestId>,
    latest_lookup_request: Option<RequestId>,
}

impl Default for BoardState {
    fn default() -> Self {
        Self::new(&BoardConfig::default(), CurrentUser::default(), TicketQuery::default())
    }
}

impl BoardState {
    pub fn new(config: &BoardConfig, current_user: CurrentUser, initial: TicketQuery) -> Self {
        Self {
            filters: FilterState::new(initial),
            debounce_pending: false,
            page: None,
            page_size: config.page_size.max(1),
            loading: false,
            fetch_error: None,
            selection: SelectionSet::default(),
            dropdown: DropdownState::Closed,
            dropdown_data: DropdownData::default(),
            lookups_loading: false,
            in_flight: BTreeSet::new(),
            bulk_in_flight: false,
            respond: None,
            toast: None,
            current_user,
            next_request_id: 0,
            latest_page_request: None,
            latest_lookup_request: None,
        }
    }

    /// Tickets of the cached page after urgency refinement.
    pub fn displayed_tickets(&self, now: Timestamp) -> Vec<&Ticket> {
        match &self.page {
            Some(page) => refine_by_urgency(&page.items, self.filters.urgency, now),
            None => Vec::new(),
        }
    }

    /// Look a ticket up on the cached page (ignoring urgency refinement).
    pub fn find_ticket(&self, id: TicketId) -> Option<&Ticket> {
        self.page.as_ref()?.items.iter().find(|t| t.id == id)
    }

    /// Resolve a typed ticket reference (display number or numeric id).
    pub fn find_by_reference(&self, reference: &str) -> Option<&Ticket> {
        let page = self.page.as_ref()?;
        let reference = reference.trim().trim_start_matches('#');
        page.items
            .iter()
            .find(|t| t.ticket_number.as_deref() == Some(reference))
            .or_else(|| {
                let id: TicketId = reference.parse().ok()?;
                page.items.iter().find(|t| t.id == id)
            })
    }

    pub fn is_latest_page_request(&self, request: RequestId) -> bool {
        self.latest_page_request == Some(request)
    }

    pub fn is_latest_lookup_request(&self, request: RequestId) -> bool {
        self.latest_lookup_request == Some(request)
    }

    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.filters.page_index, self.page_size)
    }

    /// Nothing outstanding: no fetch, no mutation, no pending debounce.
    pub fn is_settled(&self) -> bool {
        !self.loading
            && !self.lookups_loading
            && !self.debounce_pending
            && self.in_flight.is_empty()
            && !self.bulk_in_flight
            && !self.respond.as_ref().is_some_and(RespondForm::is_submitting)
    }

    fn issue_request_id(&mut self) -> RequestId {
        self.next_request_id += 1;
        self.next_request_id
    }

    fn fetch_page(&mut self) -> BoardEffect {
        let request = self.issue_request_id();
        self.latest_page_request = Some(request);
        self.loading = true;
        BoardEffect::FetchPage {
            request,
            query: self.filters.applied.clone(),
            page: self.page_request(),
        }
    }

    fn fetch_lookups(&mut self) -> BoardEffect {
        let request = self.issue_request_id();
        self.latest_lookup_request = Some(request);
        self.lookups_loading = true;
        BoardEffect::FetchLookups {
            request,
            status_group: self.filters.applied.status_group.clone(),
        }
    }

    /// Shared tail of every filter or page change.
    fn criteria_changed(&mut self, effects: &mut Vec<BoardEffect>) {
        self.selection.clear();
        self.dropdown = DropdownState::Closed;
        effects.push(self.fetch_page());
    }

    fn ticket_label(&self, id: TicketId) -> String {
        self.find_ticket(id)
            .map(Ticket::display_number)
            .unwrap_or_else(|| format!("#{id}"))
    }
}

// ============================================================================
// Action Types
// ============================================================================

/// All possible inputs to the board: user commands and remote completions
#[derive(Debug, Clone, PartialEq)]
pub enum BoardAction {
    // Loading
    /// First load: page plus dropdown data
    Load,
    /// Manual retry / refresh of the current page
    Refresh,
    /// Dismiss the fetch error banner
    DismissError,

    // Filters
    /// Keystroke in a debounced text field (full new value)
    TypeText(TextField, String),
    /// Debounce quiet period elapsed
    DebounceElapsed,
    /// Change a server-evaluated criterion
    SetFilter(ServerFilter),
    /// Change the client-side urgency refinement
    SetUrgency(Option<UrgencyBucket>),
    ClearFilters,

    // Pagination
    GoToPage(u32),
    NextPage,
    PrevPage,

    // Selection
    ToggleSelected(TicketId),
    ToggleSelectAll,
    ClearSelection,

    // Dropdowns
    OpenRowDropdown(TicketId),
    OpenBulkDropdown,
    CloseDropdown,

    // Mutations
    Assign { ticket_id: TicketId, staff: Staff },
    AssignToMe(TicketId),
    Unassign(TicketId),
    BulkAssign(Staff),
    UpdatePhones { ticket_id: TicketId, phones: PhoneUpdate },

    // Respond form
    OpenRespond(TicketId),
    ChooseTemplate(i64),
    ChooseOther,
    SetResponseText(String),
    SetResponseStatus(TicketStatus),
    SubmitResponse,
    CloseRespond,
    /// Close delay after a successful answer elapsed
    RespondCloseElapsed(TicketId),

    DismissToast,

    // Completions (sent by the runtime)
    PageLoaded {
        request: RequestId,
        result: Result<TicketPage, String>,
    },
    LookupsLoaded {
        request: RequestId,
        result: Result<DropdownData, String>,
    },
    MutationFinished {
        ticket_id: TicketId,
        kind: MutationKind,
        result: Result<(), String>,
    },
    BulkAssignFinished {
        staff: Staff,
        result: Result<BulkAssignOutcome, String>,
    },
    RespondFinished {
        ticket_id: TicketId,
        result: Result<Ticket, String>,
    },
}

/// Work the runtime performs on behalf of the reducer
#[derive(Debug, Clone, PartialEq)]
pub enum BoardEffect {
    FetchPage {
        request: RequestId,
        query: TicketQuery,
        page: PageRequest,
    },
    FetchLookups {
        request: RequestId,
        status_group: Option<StatusGroup>,
    },
    /// (Re)start the debounce timer
    StartDebounce,
    CancelDebounce,
    Assign {
        ticket_id: TicketId,
        staff: Staff,
    },
    Unassign {
        ticket_id: TicketId,
    },
    BulkAssign {
        ticket_ids: Vec<TicketId>,
        staff: Staff,
    },
    Respond {
        ticket_id: TicketId,
        response: TicketResponse,
    },
    UpdatePhones {
        ticket_id: TicketId,
        phones: PhoneUpdate,
    },
    /// Close the respond form for this ticket after the configured delay
    ScheduleRespondClose {
        ticket_id: TicketId,
    },
}

// ============================================================================
// View Model Types
// ============================================================================

/// One displayed ticket row
#[derive(Debug, Clone, PartialEq)]
pub struct TicketRow {
    pub ticket: Ticket,
    pub urgency: UrgencyBucket,
    pub eligible: bool,
    pub selected: bool,
    pub mutation_in_flight: bool,
    pub dropdown_open: bool,
}

/// Why no rows are shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    /// Nothing fetched yet
    NotLoaded,
    /// The server returned no tickets for these criteria
    NoTickets,
    /// The page has tickets but none fall in the urgency bucket
    NoUrgencyMatches,
}

impl EmptyState {
    pub fn message(self) -> &'static str {
        match self {
            EmptyState::NotLoaded => "loading tickets",
            EmptyState::NoTickets => "no tickets found",
            EmptyState::NoUrgencyMatches => "no tickets match the urgency filter on this page",
        }
    }
}

/// Computed view model for rendering the board
#[derive(Debug, Clone)]
pub struct BoardViewModel {
    pub rows: Vec<TicketRow>,
    pub empty_state: Option<EmptyState>,
    /// Server total, unaffected by urgency refinement
    pub total_elements: u64,
    pub total_pages: u32,
    pub page_index: u32,
    pub page_label: String,
    pub has_prev_page: bool,
    pub has_next_page: bool,
    pub loading: bool,
    pub error_banner: Option<String>,
    pub selected_count: usize,
    pub all_eligible_selected: bool,
    /// Bulk trigger is usable (selection present, nothing in flight)
    pub bulk_enabled: bool,
    pub bulk_in_flight: bool,
    pub dropdown: DropdownState,
    pub has_active_filters: bool,
    pub pending_search: bool,
    pub respond: Option<RespondForm>,
    pub toast: Option<Toast>,
}

// ============================================================================
// Pure Functions
// ============================================================================

/// Human page label, e.g. "Page 2 of 3".
pub fn page_label(page_index: u32, total_pages: u32) -> String {
    format!("Page {} of {}", page_index.saturating_add(1), total_pages.max(1))
}

/// Pure function: compute view model from state
pub fn compute_board_view_model(state: &BoardState, now: Timestamp) -> BoardViewModel {
    let displayed = state.displayed_tickets(now);
    let (total_elements, total_pages) = state
        .page
        .as_ref()
        .map(|p| (p.total_elements, p.total_pages))
        .unwrap_or((0, 0));

    let empty_state = if !displayed.is_empty() {
        None
    } else {
        Some(match &state.page {
            None => EmptyState::NotLoaded,
            Some(page) if page.items.is_empty() => EmptyState::NoTickets,
            Some(_) => EmptyState::NoUrgencyMatches,
        })
    };

    let rows = displayed
        .iter()
        .map(|ticket| TicketRow {
            ticket: (*ticket).clone(),
            urgency: urgency_bucket(now, ticket.created_at),
            eligible: is_eligible(ticket),
            selected: state.selection.contains(ticket.id),
            mutation_in_flight: state.in_flight.contains(&ticket.id),
            dropdown_open: state.dropdown.is_open_for(ticket.id),
        })
        .collect();

    let page_index = state.filters.page_index;

    BoardViewModel {
        rows,
        empty_state,
        total_elements,
        total_pages,
        page_index,
        page_label: page_label(page_index, total_pages),
        has_prev_page: page_index > 0,
        has_next_page: page_index.saturating_add(1) < total_pages,
        loading: state.loading,
        error_banner: state.fetch_error.clone(),
        selected_count: state.selection.len(),
        all_eligible_selected: state.selection.all_eligible_selected(&displayed),
        bulk_enabled: !state.selection.is_empty() && !state.bulk_in_flight,
        bulk_in_flight: state.bulk_in_flight,
        dropdown: state.dropdown,
        has_active_filters: state.filters.has_active_filters(),
        pending_search: state.debounce_pending,
        respond: state.respond.clone(),
        toast: state.toast.clone(),
    }
}

/// Pure function: apply action to state (reducer pattern)
///
/// Returns the new state and the effects to run. No I/O happens here; `now`
/// is only used to evaluate urgency for the displayed rows.
pub fn reduce_board_state(
    mut state: BoardState,
    action: BoardAction,
    now: Timestamp,
) -> (BoardState, Vec<BoardEffect>) {
    let mut effects = Vec::new();

    match action {
        BoardAction::Load => {
            effects.push(state.fetch_page());
            effects.push(state.fetch_lookups());
        }
        BoardAction::Refresh => {
            effects.push(state.fetch_page());
        }
        BoardAction::DismissError => {
            state.fetch_error = None;
        }

        // Filters
        BoardAction::TypeText(field, value) => {
            state.filters.set_typed(field, value);
            state.debounce_pending = true;
            effects.push(BoardEffect::StartDebounce);
        }
        BoardAction::DebounceElapsed => {
            if state.debounce_pending {
                state.debounce_pending = false;
                if state.filters.apply_typed() {
                    state.criteria_changed(&mut effects);
                }
            }
        }
        BoardAction::SetFilter(filter) => {
            let picks_text = matches!(
                filter,
                ServerFilter::TicketNumber(_) | ServerFilter::PatientDocument(_)
            );
            if picks_text && state.debounce_pending {
                state.debounce_pending = false;
                effects.push(BoardEffect::CancelDebounce);
            }

            let previous_group = state.filters.applied.status_group.clone();
            if state.filters.apply_server_filter(filter) {
                state.criteria_changed(&mut effects);
                if state.filters.applied.status_group != previous_group {
                    effects.push(state.fetch_lookups());
                }
            }
        }
        BoardAction::SetUrgency(urgency) => {
            if state.filters.urgency != urgency {
                state.filters.urgency = urgency;
                state.selection.clear();
            }
        }
        BoardAction::ClearFilters => {
            if state.debounce_pending {
                state.debounce_pending = false;
                effects.push(BoardEffect::CancelDebounce);
            }
            let previous_group = state.filters.applied.status_group.clone();
            if state.filters.clear() {
                state.criteria_changed(&mut effects);
                if previous_group.is_some() {
                    effects.push(state.fetch_lookups());
                }
            }
        }

        // Pagination
        BoardAction::GoToPage(index) => go_to_page(&mut state, index, &mut effects),
        BoardAction::NextPage => {
            let index = state.filters.page_index.saturating_add(1);
            go_to_page(&mut state, index, &mut effects);
        }
        BoardAction::PrevPage => {
            if let Some(index) = state.filters.page_index.checked_sub(1) {
                go_to_page(&mut state, index, &mut effects);
            }
        }

        // Selection
        BoardAction::ToggleSelected(id) => {
            let displayed = state.displayed_tickets(now);
            let mut selection = state.selection.clone();
            selection.toggle(id, &displayed);
            state.selection = selection;
        }
        BoardAction::ToggleSelectAll => {
            let displayed = state.displayed_tickets(now);
            let mut selection = state.selection.clone();
            selection.toggle_all(&displayed);
            state.selection = selection;
        }
        BoardAction::ClearSelection => {
            state.selection.clear();
        }

        // Dropdowns
        BoardAction::OpenRowDropdown(id) => {
            if state.find_ticket(id).is_some() {
                state.dropdown = state.dropdown.toggle_row(id);
            }
        }
        BoardAction::OpenBulkDropdown => {
            state.dropdown = state.dropdown.toggle_bulk();
        }
        BoardAction::CloseDropdown => {
            state.dropdown = DropdownState::Closed;
        }

        // Mutations
        BoardAction::Assign { ticket_id, staff } => {
            start_assign(&mut state, ticket_id, staff, &mut effects);
        }
        BoardAction::AssignToMe(ticket_id) => {
            let me = state.current_user.as_staff();
            start_assign(&mut state, ticket_id, me, &mut effects);
        }
        BoardAction::Unassign(ticket_id) => {
            if begin_single_mutation(&mut state, ticket_id) {
                effects.push(BoardEffect::Unassign { ticket_id });
            }
        }
        BoardAction::UpdatePhones { ticket_id, phones } => {
            if begin_single_mutation(&mut state, ticket_id) {
                effects.push(BoardEffect::UpdatePhones { ticket_id, phones });
            }
        }
        BoardAction::BulkAssign(staff) => {
            if state.bulk_in_flight {
                // trigger disabled while in flight
            } else if state.selection.is_empty() {
                state.toast = Some(Toast::warning("select at least one ticket to assign"));
            } else {
                state.bulk_in_flight = true;
                effects.push(BoardEffect::BulkAssign {
                    ticket_ids: state.selection.ids(),
                    staff,
                });
            }
        }

        // Respond form
        BoardAction::OpenRespond(ticket_id) => match state.find_ticket(ticket_id) {
            Some(ticket) if ticket.status.is_open() => {
                if !state.respond.as_ref().is_some_and(RespondForm::is_submitting) {
                    state.respond = Some(RespondForm::new(ticket));
                    state.dropdown = DropdownState::Closed;
                }
            }
            Some(ticket) => {
                state.toast = Some(Toast::error(format!(
                    "ticket {} is {} and can no longer be answered",
                    ticket.display_number(),
                    ticket.status
                )));
            }
            None => {
                state.toast = Some(Toast::error(format!(
                    "ticket #{ticket_id} is not on the current page"
                )));
            }
        },
        BoardAction::ChooseTemplate(template_id) => {
            let templates = state.dropdown_data.templates.clone();
            if let Some(form) = editable_form(&mut state) {
                form.error = form
                    .choose_template(template_id, &templates)
                    .err()
                    .map(|e| e.to_string());
            }
        }
        BoardAction::ChooseOther => {
            if let Some(form) = editable_form(&mut state) {
                form.choose_other();
                form.error = None;
            }
        }
        BoardAction::SetResponseText(text) => {
            if let Some(form) = editable_form(&mut state) {
                form.error = form.set_free_text(text).err().map(|e| e.to_string());
            }
        }
        BoardAction::SetResponseStatus(status) => {
            if let Some(form) = editable_form(&mut state) {
                form.error = form.set_target_status(status).err().map(|e| e.to_string());
            }
        }
        BoardAction::SubmitResponse => {
            let templates = state.dropdown_data.templates.clone();
            let user = state.current_user.clone();
            if let Some(form) = editable_form(&mut state) {
                match form.validate(&templates, &user) {
                    Ok(response) => {
                        form.phase = RespondPhase::Submitting;
                        form.error = None;
                        effects.push(BoardEffect::Respond {
                            ticket_id: form.ticket_id,
                            response,
                        });
                    }
                    Err(e) => form.error = Some(e.to_string()),
                }
            }
        }
        BoardAction::CloseRespond => {
            if !state.respond.as_ref().is_some_and(RespondForm::is_submitting) {
                state.respond = None;
            }
        }
        BoardAction::RespondCloseElapsed(ticket_id) => {
            if state
                .respond
                .as_ref()
                .is_some_and(|f| f.ticket_id == ticket_id && f.phase == RespondPhase::Succeeded)
            {
                state.respond = None;
            }
        }

        BoardAction::DismissToast => {
            state.toast = None;
        }

        // Completions
        BoardAction::PageLoaded { request, result } => {
            if state.is_latest_page_request(request) {
                state.loading = false;
                match result {
                    Ok(page) => {
                        let last_page = page.total_pages.max(1) - 1;
                        state.page = Some(page);
                        state.fetch_error = None;
                        // Index was picked against the previous result set.
                        if state.filters.page_index > last_page {
                            state.filters.page_index = last_page;
                            state.criteria_changed(&mut effects);
                            return (state, effects);
                        }
                        let displayed = state.displayed_tickets(now);
                        let mut selection = state.selection.clone();
                        selection.retain_eligible(&displayed);
                        state.selection = selection;
                        if let DropdownState::Row(id) = state.dropdown
                            && state.find_ticket(id).is_none()
                        {
                            state.dropdown = DropdownState::Closed;
                        }
                    }
                    Err(message) => {
                        state.fetch_error = Some(message);
                    }
                }
            }
        }
        BoardAction::LookupsLoaded { request, result } => {
            if state.is_latest_lookup_request(request) {
                state.lookups_loading = false;
                match result {
                    Ok(data) => state.dropdown_data = data,
                    Err(message) => {
                        state.toast = Some(Toast::warning(format!(
                            "could not load assignment data: {message}"
                        )));
                    }
                }
            }
        }
        BoardAction::MutationFinished {
            ticket_id,
            kind,
            result,
        } => {
            state.in_flight.remove(&ticket_id);
            let label = state.ticket_label(ticket_id);
            match result {
                Ok(()) => {
                    state.selection.clear();
                    state.toast = Some(Toast::success(match kind {
                        MutationKind::Assign(staff) => {
                            format!("ticket {label} assigned to {}", staff.name)
                        }
                        MutationKind::Unassign => format!("ticket {label} unassigned"),
                        MutationKind::UpdatePhones => format!("phones updated for ticket {label}"),
                    }));
                    effects.push(state.fetch_page());
                    effects.push(state.fetch_lookups());
                }
                Err(message) => {
                    let verb = match kind {
                        MutationKind::Assign(_) => "assign",
                        MutationKind::Unassign => "unassign",
                        MutationKind::UpdatePhones => "update phones for",
                    };
                    state.toast = Some(Toast::error(format!(
                        "could not {verb} ticket {label}: {message}"
                    )));
                }
            }
        }
        BoardAction::BulkAssignFinished { staff, result } => {
            state.bulk_in_flight = false;
            state.selection.clear();
            if state.dropdown.is_bulk() {
                state.dropdown = DropdownState::Closed;
            }
            state.toast = Some(match result {
                Ok(outcome) if outcome.is_partial() => Toast::warning(format!(
                    "{} tickets assigned to {}, {} failed: {}",
                    outcome.assigned,
                    staff.name,
                    outcome.errors.len(),
                    outcome.errors.join("; ")
                )),
                Ok(outcome) => Toast::success(format!(
                    "{} tickets assigned to {}",
                    outcome.assigned, staff.name
                )),
                Err(message) => Toast::error(format!("bulk assignment failed: {message}")),
            });
            effects.push(state.fetch_page());
            effects.push(state.fetch_lookups());
        }
        BoardAction::RespondFinished { ticket_id, result } => {
            let form = state
                .respond
                .as_mut()
                .filter(|f| f.ticket_id == ticket_id && f.is_submitting());
            match result {
                Ok(ticket) => {
                    let message = format!("response recorded for ticket {}", ticket.display_number());
                    if let Some(form) = form {
                        form.phase = RespondPhase::Succeeded;
                        form.error = None;
                        effects.push(BoardEffect::ScheduleRespondClose { ticket_id });
                    }
                    state.toast = Some(Toast::success(message));
                    effects.push(state.fetch_page());
                    effects.push(state.fetch_lookups());
                }
                Err(message) => {
                    if let Some(form) = form {
                        form.phase = RespondPhase::Editing;
                        form.error = Some(message.clone());
                    }
                    state.toast = Some(Toast::error(format!("could not answer ticket: {message}")));
                }
            }
        }
    }

    (state, effects)
}

fn go_to_page(state: &mut BoardState, index: u32, effects: &mut Vec<BoardEffect>) {
    if index == state.filters.page_index {
        return;
    }
    let last_page = state.page.as_ref().map_or(0, |p| p.total_pages.max(1) - 1);
    if index > last_page {
        return;
    }
    state.filters.page_index = index;
    state.criteria_changed(effects);
}

/// Close the dropdown and mark the ticket in flight. Returns false when a
/// mutation for this ticket is already outstanding.
fn begin_single_mutation(state: &mut BoardState, ticket_id: TicketId) -> bool {
    if state.in_flight.contains(&ticket_id) {
        return false;
    }
    state.dropdown = DropdownState::Closed;
    state.in_flight.insert(ticket_id);
    true
}

fn start_assign(
    state: &mut BoardState,
    ticket_id: TicketId,
    staff: Staff,
    effects: &mut Vec<BoardEffect>,
) {
    if begin_single_mutation(state, ticket_id) {
        effects.push(BoardEffect::Assign { ticket_id, staff });
    }
}

fn editable_form(state: &mut BoardState) -> Option<&mut RespondForm> {
    state
        .respond
        .as_mut()
        .filter(|f| f.phase == RespondPhase::Editing)
}
