//! Interactive board session (`mesa-board board`)
//!
//! Runs the full board controller and drives it from stdin, one command per
//! line. The screen is re-rendered once the board settles after each command.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use jiff::Timestamp;
use owo_colors::OwoColorize;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::assign::find_staff;
use super::connect;
use crate::board::suggest::{
    DEFAULT_SUGGESTION_LIMIT, document_suggestions, staff_with_counts, ticket_number_suggestions,
};
use crate::board::{
    BoardAction, BoardHandle, BoardState, DropdownState, ServerFilter, TextField, UrgencyBucket,
    spawn_board,
};
use crate::display::{render_board, render_staff_table};
use crate::error::{MesaError, Result};
use crate::gateway::{PhoneUpdate, TicketQuery};
use crate::types::{DateRange, StatusGroup, TicketId, TicketPriority, TicketStatus, parse_date};

const BOARD_HELP: &str = "\
Filters:    number <text> | document <text> | pick number|document <value>
            status <NUEVO,EN_PROCESO|all> | priority <ALTA|MEDIA|BAJA|all>
            assignee <name|all> | assignee-id <id|all> | doctor <id|all>
            created <from|-> <to|-> | attended <from|-> <to|->
            urgency <green|yellow|red|all> | clear
Pages:      next | prev | page <n> | refresh | dismiss
Selection:  select <id> | select all | deselect
Assign:     open <id> | bulk | to <staff id> | close | me <id>
            assign <id> <staff id> | unassign <id> | staff
Phones:     phones <id> <primary|-> [alternate]
Respond:    respond <id> | template <id> | other | text <answer>
            set-status <EN_PROCESO|RESUELTO> | submit | cancel
Other:      suggest number|document <text> | show | help | quit";

/// One parsed line of the interactive session
#[derive(Debug, Clone, PartialEq)]
pub enum BoardCommand {
    /// Forward straight to the board
    Action(BoardAction),
    /// Assign the open dropdown's target to this staff id
    AssignTo(i64),
    /// Assign a ticket to a staff id without opening a dropdown
    AssignTicket { ticket_id: TicketId, staff_id: i64 },
    Suggest(TextField, String),
    Staff,
    Show,
    Help,
    Quit,
}

fn invalid(message: impl Into<String>) -> MesaError {
    MesaError::Other(message.into())
}

fn parse_id(value: Option<&str>, what: &str) -> Result<i64> {
    let value = value.ok_or_else(|| invalid(format!("missing {what}")))?;
    value
        .trim_start_matches('#')
        .parse()
        .map_err(|_| invalid(format!("invalid {what} '{value}'")))
}

/// `all` (or nothing) clears the criterion.
fn optional<'a>(value: &'a str) -> Option<&'a str> {
    match value.trim() {
        "" | "all" | "-" => None,
        v => Some(v),
    }
}

fn parse_optional<T: FromStr<Err = MesaError>>(value: &str) -> Result<Option<T>> {
    optional(value).map(T::from_str).transpose()
}

fn parse_range(rest: &str) -> Result<DateRange> {
    let mut parts = rest.split_whitespace();
    let from = parts.next().and_then(optional).map(parse_date).transpose()?;
    let to = parts.next().and_then(optional).map(parse_date).transpose()?;
    Ok(DateRange::new(from, to))
}

fn parse_field(value: &str) -> Result<TextField> {
    match value {
        "number" | "ticket" => Ok(TextField::TicketNumber),
        "document" | "dni" => Ok(TextField::PatientDocument),
        other => Err(invalid(format!(
            "unknown field '{other}', expected number or document"
        ))),
    }
}

/// Parse one line of the interactive session.
pub fn parse_board_command(line: &str) -> Result<BoardCommand> {
    let line = line.trim();
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    let mut args = rest.split_whitespace();

    let action = match verb {
        "help" | "?" => return Ok(BoardCommand::Help),
        "quit" | "exit" | "q" => return Ok(BoardCommand::Quit),
        "show" | "ls" => return Ok(BoardCommand::Show),
        "staff" => return Ok(BoardCommand::Staff),
        "to" => return Ok(BoardCommand::AssignTo(parse_id(args.next(), "staff id")?)),
        "assign" => {
            let ticket_id = parse_id(args.next(), "ticket id")?;
            let staff_id = parse_id(args.next(), "staff id")?;
            return Ok(BoardCommand::AssignTicket {
                ticket_id,
                staff_id,
            });
        }
        "suggest" => {
            let field = parse_field(args.next().unwrap_or_default())?;
            let text = args.collect::<Vec<_>>().join(" ");
            return Ok(BoardCommand::Suggest(field, text));
        }

        // Filters
        "number" => BoardAction::TypeText(TextField::TicketNumber, rest.to_string()),
        "document" | "dni" => BoardAction::TypeText(TextField::PatientDocument, rest.to_string()),
        "pick" => {
            let field = parse_field(args.next().unwrap_or_default())?;
            let value = args.next().and_then(optional).map(str::to_string);
            BoardAction::SetFilter(match field {
                TextField::TicketNumber => ServerFilter::TicketNumber(value),
                TextField::PatientDocument => ServerFilter::PatientDocument(value),
            })
        }
        "status" => {
            let group = parse_optional::<StatusGroup>(rest)?;
            BoardAction::SetFilter(ServerFilter::StatusGroup(group))
        }
        "priority" => {
            let priority = parse_optional::<TicketPriority>(rest)?;
            BoardAction::SetFilter(ServerFilter::Priority(priority))
        }
        "assignee" => {
            BoardAction::SetFilter(ServerFilter::AssigneeName(optional(rest).map(str::to_string)))
        }
        "assignee-id" => BoardAction::SetFilter(ServerFilter::AssigneeId(
            optional(rest)
                .map(|v| parse_id(Some(v), "staff id"))
                .transpose()?,
        )),
        "doctor" => BoardAction::SetFilter(ServerFilter::Doctor(
            optional(rest)
                .map(|v| parse_id(Some(v), "doctor id"))
                .transpose()?,
        )),
        "created" => BoardAction::SetFilter(ServerFilter::Created(parse_range(rest)?)),
        "attended" => BoardAction::SetFilter(ServerFilter::Attended(parse_range(rest)?)),
        "urgency" => BoardAction::SetUrgency(parse_optional::<UrgencyBucket>(rest)?),
        "clear" => BoardAction::ClearFilters,

        // Pages
        "next" | "n" => BoardAction::NextPage,
        "prev" | "p" => BoardAction::PrevPage,
        "page" => {
            let page = parse_id(args.next(), "page number")?;
            if page < 1 {
                return Err(invalid("page numbers start at 1"));
            }
            let index = u32::try_from(page - 1).map_err(|_| invalid("page out of range"))?;
            BoardAction::GoToPage(index)
        }
        "refresh" | "r" => BoardAction::Refresh,
        "dismiss" => BoardAction::DismissError,

        // Selection
        "select" if rest == "all" => BoardAction::ToggleSelectAll,
        "select" => BoardAction::ToggleSelected(parse_id(args.next(), "ticket id")?),
        "deselect" => BoardAction::ClearSelection,

        // Assignment
        "open" => BoardAction::OpenRowDropdown(parse_id(args.next(), "ticket id")?),
        "bulk" => BoardAction::OpenBulkDropdown,
        "close" => BoardAction::CloseDropdown,
        "me" => BoardAction::AssignToMe(parse_id(args.next(), "ticket id")?),
        "unassign" => BoardAction::Unassign(parse_id(args.next(), "ticket id")?),
        "phones" => {
            let ticket_id = parse_id(args.next(), "ticket id")?;
            let primary = args.next().and_then(optional).map(str::to_string);
            let alternate = args.next().and_then(optional).map(str::to_string);
            if primary.is_none() && alternate.is_none() {
                return Err(invalid("give at least one phone number"));
            }
            BoardAction::UpdatePhones {
                ticket_id,
                phones: PhoneUpdate { primary, alternate },
            }
        }

        // Respond
        "respond" => BoardAction::OpenRespond(parse_id(args.next(), "ticket id")?),
        "template" => BoardAction::ChooseTemplate(parse_id(args.next(), "template id")?),
        "other" => BoardAction::ChooseOther,
        "text" => BoardAction::SetResponseText(rest.to_string()),
        "set-status" => BoardAction::SetResponseStatus(TicketStatus::from_str(rest)?),
        "submit" => BoardAction::SubmitResponse,
        "cancel" => BoardAction::CloseRespond,

        other => {
            return Err(invalid(format!(
                "unknown command '{other}', type 'help' for the list"
            )));
        }
    };

    Ok(BoardCommand::Action(action))
}

/// Turn `to <staff id>` into an assignment for whichever dropdown is open.
pub fn resolve_assign_target(state: &BoardState, staff_id: i64) -> Result<BoardAction> {
    let staff = find_staff(&state.dropdown_data.staff, staff_id)?;
    match state.dropdown {
        DropdownState::Row(ticket_id) => Ok(BoardAction::Assign { ticket_id, staff }),
        DropdownState::Bulk => Ok(BoardAction::BulkAssign(staff)),
        DropdownState::Closed => Err(invalid(
            "no assignment dropdown open, use 'open <id>' or 'bulk' first",
        )),
    }
}

async fn render(board: &BoardHandle, wait: Duration) -> Result<()> {
    if tokio::time::timeout(wait, board.settled()).await.is_err() {
        tracing::debug!("board still busy, rendering current state");
    }
    let view = board.view();
    println!("{}", render_board(&view, Timestamp::now()));
    if view.toast.is_some() {
        board.dispatch(BoardAction::DismissToast).await?;
    }
    Ok(())
}

fn print_suggestions(state: &BoardState, field: TextField, typed: &str) {
    let tickets = &state.dropdown_data.tickets;
    let suggestions = match field {
        TextField::TicketNumber => {
            ticket_number_suggestions(tickets, typed, DEFAULT_SUGGESTION_LIMIT)
        }
        TextField::PatientDocument => document_suggestions(tickets, typed, DEFAULT_SUGGESTION_LIMIT),
    };
    if suggestions.is_empty() {
        println!("{}", "no suggestions".dimmed());
    }
    for suggestion in suggestions {
        println!("  {suggestion}");
    }
}

/// Run the interactive board until `quit` or end of input
pub async fn cmd_board(initial: TicketQuery) -> Result<()> {
    let (config, gateway) = connect()?;
    let board_config = config.board_config();
    let wait = board_config.request_timeout + board_config.debounce + Duration::from_secs(1);
    let board = spawn_board(
        Arc::new(gateway),
        board_config,
        config.current_user(),
        initial,
    );

    render(&board, wait).await?;
    println!("{}", "type 'help' for commands".dimmed());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match parse_board_command(&line) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{}", e.to_string().red());
                continue;
            }
        };

        let action = match command {
            BoardCommand::Quit => break,
            BoardCommand::Help => {
                println!("{BOARD_HELP}");
                continue;
            }
            BoardCommand::Show => {
                render(&board, wait).await?;
                continue;
            }
            BoardCommand::Staff => {
                let state = board.snapshot();
                let loads = staff_with_counts(&state.dropdown_data.staff, &state.dropdown_data.tickets);
                println!("{}", render_staff_table(&loads));
                continue;
            }
            BoardCommand::Suggest(field, typed) => {
                print_suggestions(&board.snapshot(), field, &typed);
                continue;
            }
            BoardCommand::AssignTo(staff_id) => {
                match resolve_assign_target(&board.snapshot(), staff_id) {
                    Ok(action) => action,
                    Err(e) => {
                        eprintln!("{}", e.to_string().red());
                        continue;
                    }
                }
            }
            BoardCommand::AssignTicket {
                ticket_id,
                staff_id,
            } => match find_staff(&board.snapshot().dropdown_data.staff, staff_id) {
                Ok(staff) => BoardAction::Assign { ticket_id, staff },
                Err(e) => {
                    eprintln!("{}", e.to_string().red());
                    continue;
                }
            },
            BoardCommand::Action(action) => action,
        };

        board.dispatch(action).await?;
        render(&board, wait).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Staff;

    fn action(line: &str) -> BoardAction {
        match parse_board_command(line).unwrap() {
            BoardCommand::Action(action) => action,
            other => panic!("expected an action for '{line}', got {other:?}"),
        }
    }

    #[test]
    fn test_parse_filters() {
        assert_eq!(
            action("number 123"),
            BoardAction::TypeText(TextField::TicketNumber, "123".to_string())
        );
        assert_eq!(
            action("number"),
            BoardAction::TypeText(TextField::TicketNumber, String::new())
        );
        assert_eq!(
            action("status nuevo,en_proceso"),
            BoardAction::SetFilter(ServerFilter::StatusGroup(Some(
                "NUEVO,EN_PROCESO".parse().unwrap()
            )))
        );
        assert_eq!(
            action("priority all"),
            BoardAction::SetFilter(ServerFilter::Priority(None))
        );
        assert_eq!(
            action("urgency rojo"),
            BoardAction::SetUrgency(Some(UrgencyBucket::Red))
        );
        assert_eq!(
            action("created 2026-02-01 -"),
            BoardAction::SetFilter(ServerFilter::Created(DateRange::new(
                Some(parse_date("2026-02-01").unwrap()),
                None
            )))
        );
        assert_eq!(
            action("pick number 0123-2026"),
            BoardAction::SetFilter(ServerFilter::TicketNumber(Some("0123-2026".to_string())))
        );
    }

    #[test]
    fn test_parse_pages_and_selection() {
        assert_eq!(action("page 3"), BoardAction::GoToPage(2));
        assert!(parse_board_command("page 0").is_err());
        assert_eq!(action("select all"), BoardAction::ToggleSelectAll);
        assert_eq!(action("select #12"), BoardAction::ToggleSelected(12));
        assert_eq!(action("n"), BoardAction::NextPage);
    }

    #[test]
    fn test_parse_respond_flow() {
        assert_eq!(action("respond 4"), BoardAction::OpenRespond(4));
        assert_eq!(action("template 2"), BoardAction::ChooseTemplate(2));
        assert_eq!(
            action("text Paciente contactado por teléfono"),
            BoardAction::SetResponseText("Paciente contactado por teléfono".to_string())
        );
        assert_eq!(
            action("set-status resuelto"),
            BoardAction::SetResponseStatus(TicketStatus::Resuelto)
        );
    }

    #[test]
    fn test_parse_phones() {
        assert_eq!(
            action("phones 4 - 912345678"),
            BoardAction::UpdatePhones {
                ticket_id: 4,
                phones: PhoneUpdate {
                    primary: None,
                    alternate: Some("912345678".to_string()),
                },
            }
        );
        assert!(parse_board_command("phones 4").is_err());
    }

    #[test]
    fn test_parse_non_actions() {
        assert_eq!(parse_board_command("to 3").unwrap(), BoardCommand::AssignTo(3));
        assert_eq!(
            parse_board_command("assign 10 3").unwrap(),
            BoardCommand::AssignTicket {
                ticket_id: 10,
                staff_id: 3
            }
        );
        assert_eq!(
            parse_board_command("suggest document 4455").unwrap(),
            BoardCommand::Suggest(TextField::PatientDocument, "4455".to_string())
        );
        assert_eq!(parse_board_command("q").unwrap(), BoardCommand::Quit);
        assert!(parse_board_command("frobnicate").is_err());
        assert!(parse_board_command("open abc").is_err());
    }

    #[test]
    fn test_resolve_assign_target() {
        let mut state = BoardState::default();
        state.dropdown_data.staff = vec![Staff::new(3, "Luis Paz")];

        assert!(resolve_assign_target(&state, 3).is_err());

        state.dropdown = DropdownState::Row(10);
        assert_eq!(
            resolve_assign_target(&state, 3).unwrap(),
            BoardAction::Assign {
                ticket_id: 10,
                staff: Staff::new(3, "Luis Paz")
            }
        );

        state.dropdown = DropdownState::Bulk;
        assert_eq!(
            resolve_assign_target(&state, 3).unwrap(),
            BoardAction::BulkAssign(Staff::new(3, "Luis Paz"))
        );
        assert!(matches!(
            resolve_assign_target(&state, 8),
            Err(MesaError::StaffNotFound(8))
        ));
    }
}
