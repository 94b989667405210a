use owo_colors::OwoColorize;
use serde_json::json;

use super::{CommandOutput, connect};
use crate::cli::OutputOptions;
use crate::error::{MesaError, Result};
use crate::gateway::{HttpGateway, TicketGateway};
use crate::types::{Staff, TicketId};

/// Look up a staff member by id among the assignable staff.
pub(crate) async fn resolve_staff(gateway: &HttpGateway, staff_id: i64) -> Result<Staff> {
    find_staff(&gateway.list_assignable_staff().await?, staff_id)
}

pub(crate) fn find_staff(staff: &[Staff], staff_id: i64) -> Result<Staff> {
    staff
        .iter()
        .find(|s| s.id == staff_id)
        .cloned()
        .ok_or(MesaError::StaffNotFound(staff_id))
}

/// Assign a ticket to a staff member, or to the configured user with `--me`
pub async fn cmd_assign(
    ticket_id: TicketId,
    staff_id: Option<i64>,
    me: bool,
    output: OutputOptions,
) -> Result<()> {
    let (config, gateway) = connect()?;
    let staff = match staff_id {
        Some(id) if !me => resolve_staff(&gateway, id).await?,
        _ => config.current_user().as_staff(),
    };

    gateway.assign(ticket_id, &staff).await?;

    CommandOutput::new(json!({
        "id": ticket_id,
        "action": "assigned",
        "staff_id": staff.id,
        "staff_name": staff.name,
    }))
    .with_text(format!(
        "Assigned ticket {} to {}",
        ticket_id.cyan(),
        staff.name
    ))
    .print(output)
}

/// Clear the assignee of a ticket
pub async fn cmd_unassign(ticket_id: TicketId, output: OutputOptions) -> Result<()> {
    let (_, gateway) = connect()?;
    gateway.unassign(ticket_id).await?;

    CommandOutput::new(json!({
        "id": ticket_id,
        "action": "unassigned",
    }))
    .with_text(format!("Unassigned ticket {}", ticket_id.cyan()))
    .print(output)
}

/// Assign several tickets at once. The server assigns what it can and
/// reports the rest.
pub async fn cmd_bulk_assign(
    ticket_ids: &[TicketId],
    staff_id: i64,
    output: OutputOptions,
) -> Result<()> {
    let (_, gateway) = connect()?;
    let staff = resolve_staff(&gateway, staff_id).await?;
    let outcome = gateway.bulk_assign(ticket_ids, &staff).await?;

    let mut text = format!(
        "Assigned {} of {} tickets to {}",
        outcome.assigned,
        ticket_ids.len(),
        staff.name
    );
    for error in &outcome.errors {
        text.push_str(&format!("\n  {} {error}", "✗".red()));
    }

    CommandOutput::new(json!({
        "staff_id": staff.id,
        "staff_name": staff.name,
        "requested": ticket_ids,
        "assigned": outcome.assigned,
        "errors": outcome.errors,
    }))
    .with_text(text)
    .print(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_staff() {
        let staff = vec![Staff::new(3, "Luis Paz"), Staff::new(4, "Ana Torres")];
        assert_eq!(find_staff(&staff, 4).unwrap().name, "Ana Torres");
        assert!(matches!(
            find_staff(&staff, 9),
            Err(MesaError::StaffNotFound(9))
        ));
    }
}
