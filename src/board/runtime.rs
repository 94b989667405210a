//! Async driver for the board reducer.
//!
//! One task owns the [`BoardState`]. Commands arrive over a bounded channel,
//! gateway completions over an unbounded one, and the debounce deadline is
//! folded into the same `select!`. After every action the new state is
//! published on a watch channel.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use jiff::Timestamp;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Instant;
use tracing::{debug, error, warn};

use super::BoardConfig;
use super::model::{
    BoardAction, BoardEffect, BoardState, BoardViewModel, DropdownData, MutationKind,
    compute_board_view_model, reduce_board_state,
};
use crate::error::{MesaError, Result};
use crate::gateway::{TicketGateway, TicketQuery};
use crate::types::CurrentUser;

const CHANNEL_CAPACITY: usize = 100;

type Command = (BoardAction, oneshot::Sender<()>);

/// Cloneable handle to a running board.
#[derive(Clone)]
pub struct BoardHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<BoardState>,
}

impl BoardHandle {
    /// Send an action and wait until the reducer has applied it. Remote work
    /// it starts keeps running in the background.
    pub async fn dispatch(&self, action: BoardAction) -> Result<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.commands
            .send((action, ack_tx))
            .await
            .map_err(|_| MesaError::BoardClosed)?;
        ack_rx.await.map_err(|_| MesaError::BoardClosed)
    }

    /// Latest published state.
    pub fn snapshot(&self) -> BoardState {
        self.snapshots.borrow().clone()
    }

    /// View model of the latest state, evaluated now.
    pub fn view(&self) -> BoardViewModel {
        compute_board_view_model(&self.snapshots.borrow(), Timestamp::now())
    }

    pub fn subscribe(&self) -> watch::Receiver<BoardState> {
        self.snapshots.clone()
    }

    /// Wait for the first state satisfying `predicate`.
    pub async fn wait_until(
        &self,
        predicate: impl FnMut(&BoardState) -> bool,
    ) -> Result<BoardState> {
        let mut rx = self.snapshots.clone();
        let state = rx
            .wait_for(predicate)
            .await
            .map_err(|_| MesaError::BoardClosed)?;
        Ok(state.clone())
    }

    /// Wait until no fetch, mutation or debounce is outstanding.
    pub async fn settled(&self) -> Result<BoardState> {
        self.wait_until(BoardState::is_settled).await
    }
}

/// Start a board for `current_user` with `initial` criteria and issue the
/// first load. Must be called inside a tokio runtime.
pub fn spawn_board<G>(
    gateway: Arc<G>,
    config: BoardConfig,
    current_user: CurrentUser,
    initial: TicketQuery,
) -> BoardHandle
where
    G: TicketGateway + 'static,
{
    let state = BoardState::new(&config, current_user, initial);
    let (snapshots_tx, snapshots_rx) = watch::channel(state.clone());
    let (commands_tx, commands_rx) = mpsc::channel::<Command>(CHANNEL_CAPACITY);
    let (completions_tx, completions_rx) = mpsc::unbounded_channel::<BoardAction>();

    let mut runtime = BoardRuntime {
        gateway,
        config,
        state,
        snapshots: snapshots_tx,
        completions: completions_tx,
        debounce_deadline: None,
    };
    runtime.apply(BoardAction::Load);

    tokio::spawn(runtime.run(commands_rx, completions_rx));

    BoardHandle {
        commands: commands_tx,
        snapshots: snapshots_rx,
    }
}

struct BoardRuntime<G> {
    gateway: Arc<G>,
    config: BoardConfig,
    state: BoardState,
    snapshots: watch::Sender<BoardState>,
    completions: mpsc::UnboundedSender<BoardAction>,
    debounce_deadline: Option<Instant>,
}

impl<G> BoardRuntime<G>
where
    G: TicketGateway + 'static,
{
    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut completions: mpsc::UnboundedReceiver<BoardAction>,
    ) {
        loop {
            let deadline = self.debounce_deadline;
            tokio::select! {
                biased;

                Some(action) = completions.recv() => {
                    self.apply(action);
                }
                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.debounce_deadline = None;
                    self.apply(BoardAction::DebounceElapsed);
                }
                command = commands.recv() => {
                    let Some((action, ack)) = command else {
                        debug!("board handle dropped, stopping");
                        break;
                    };
                    self.apply(action);
                    let _ = ack.send(());
                }
            }
        }
    }

    fn apply(&mut self, action: BoardAction) {
        match &action {
            BoardAction::PageLoaded { request, .. }
                if !self.state.is_latest_page_request(*request) =>
            {
                debug!(request, "discarding stale page response");
            }
            BoardAction::LookupsLoaded { request, .. }
                if !self.state.is_latest_lookup_request(*request) =>
            {
                debug!(request, "discarding stale dropdown data");
            }
            _ => {}
        }

        let state = std::mem::take(&mut self.state);
        let (state, effects) = reduce_board_state(state, action, Timestamp::now());
        self.state = state;

        for effect in effects {
            self.run_effect(effect);
        }
        self.snapshots.send_replace(self.state.clone());
    }

    fn run_effect(&mut self, effect: BoardEffect) {
        let gateway = Arc::clone(&self.gateway);
        match effect {
            BoardEffect::StartDebounce => {
                self.debounce_deadline = Some(Instant::now() + self.config.debounce);
            }
            BoardEffect::CancelDebounce => {
                self.debounce_deadline = None;
            }
            BoardEffect::FetchPage {
                request,
                query,
                page,
            } => {
                debug!(request, page = page.index, size = page.size, "fetching ticket page");
                self.spawn_call(
                    "search_tickets",
                    async move { gateway.search_tickets(&query, page).await },
                    move |result| BoardAction::PageLoaded { request, result },
                );
            }
            BoardEffect::FetchLookups {
                request,
                status_group,
            } => {
                debug!(request, "fetching dropdown data");
                self.spawn_call(
                    "load_dropdown_data",
                    async move {
                        let (tickets, staff, doctors, templates) = futures::try_join!(
                            gateway.list_all_for_dropdowns(status_group.as_ref()),
                            gateway.list_assignable_staff(),
                            gateway.list_doctors_with_counts(),
                            gateway.list_response_templates(),
                        )?;
                        Ok::<_, MesaError>(DropdownData {
                            tickets,
                            staff,
                            doctors,
                            templates,
                        })
                    },
                    move |result| BoardAction::LookupsLoaded { request, result },
                );
            }
            BoardEffect::Assign { ticket_id, staff } => {
                let kind = MutationKind::Assign(staff.clone());
                self.spawn_call(
                    "assign",
                    async move { gateway.assign(ticket_id, &staff).await },
                    move |result| BoardAction::MutationFinished {
                        ticket_id,
                        kind,
                        result,
                    },
                );
            }
            BoardEffect::Unassign { ticket_id } => {
                self.spawn_call(
                    "unassign",
                    async move { gateway.unassign(ticket_id).await },
                    move |result| BoardAction::MutationFinished {
                        ticket_id,
                        kind: MutationKind::Unassign,
                        result,
                    },
                );
            }
            BoardEffect::UpdatePhones { ticket_id, phones } => {
                self.spawn_call(
                    "update_phones",
                    async move { gateway.update_phones(ticket_id, &phones).await.map(|_| ()) },
                    move |result| BoardAction::MutationFinished {
                        ticket_id,
                        kind: MutationKind::UpdatePhones,
                        result,
                    },
                );
            }
            BoardEffect::BulkAssign { ticket_ids, staff } => {
                let assignee = staff.clone();
                self.spawn_call(
                    "bulk_assign",
                    async move { gateway.bulk_assign(&ticket_ids, &staff).await },
                    move |result| BoardAction::BulkAssignFinished {
                        staff: assignee,
                        result,
                    },
                );
            }
            BoardEffect::Respond {
                ticket_id,
                response,
            } => {
                self.spawn_call(
                    "respond",
                    async move { gateway.respond(ticket_id, &response).await },
                    move |result| BoardAction::RespondFinished { ticket_id, result },
                );
            }
            BoardEffect::ScheduleRespondClose { ticket_id } => {
                let delay = self.config.respond_close_delay;
                let tx = self.completions.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = tx.send(BoardAction::RespondCloseElapsed(ticket_id));
                });
            }
        }
    }

    /// Run one gateway call in the background and feed its outcome back as
    /// an action. Failures are logged and handed to the reducer as text.
    fn spawn_call<T, F>(
        &self,
        call: &'static str,
        future: F,
        finish: impl FnOnce(std::result::Result<T, String>) -> BoardAction + Send + 'static,
    ) where
        T: Send + 'static,
        F: Future<Output = Result<T>> + Send + 'static,
    {
        let tx = self.completions.clone();
        let limit = self.config.request_timeout;
        tokio::spawn(async move {
            let result = with_timeout(limit, future)
                .await
                .map_err(|e| report_failure(call, &e));
            // The receiver only goes away when the board shuts down.
            let _ = tx.send(finish(result));
        });
    }
}

/// Bound a gateway call by `limit`.
async fn with_timeout<T>(limit: Duration, call: impl Future<Output = Result<T>>) -> Result<T> {
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| MesaError::Timeout(limit.as_secs()))?
}

/// Log a failed call and return its user-facing text.
fn report_failure(call: &'static str, error: &MesaError) -> String {
    if error.is_remote() {
        warn!(call, error = %error, "gateway call failed");
    } else {
        error!(call, error = %error, "gateway call failed locally");
    }
    user_message(error)
}

/// Text shown to the user for a failed call: the server's own message when
/// it sent one.
fn user_message(error: &MesaError) -> String {
    match error {
        MesaError::ApiStatus { message, .. } => message.clone(),
        other => other.to_string(),
    }
}
