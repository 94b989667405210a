//! Reference data: staff, doctors, response templates.

use serde_json::json;

use super::{CommandOutput, connect};
use crate::board::suggest::staff_with_counts;
use crate::cli::OutputOptions;
use crate::display::{render_doctor_table, render_staff_table, render_template_table};
use crate::error::Result;
use crate::gateway::TicketGateway;
use crate::types::{StatusGroup, TicketStatus};

/// List assignable staff with how many open tickets each one holds
pub async fn cmd_staff(output: OutputOptions) -> Result<()> {
    let (_, gateway) = connect()?;
    let open = StatusGroup::new([TicketStatus::Nuevo, TicketStatus::EnProceso]);
    let (staff, tickets) = futures::try_join!(
        gateway.list_assignable_staff(),
        gateway.list_all_for_dropdowns(Some(&open)),
    )?;
    let loads = staff_with_counts(&staff, &tickets);

    let json_output: Vec<_> = loads
        .iter()
        .map(|l| {
            json!({
                "id": l.staff.id,
                "name": l.staff.name,
                "open_tickets": l.open_tickets,
            })
        })
        .collect();

    let text = if loads.is_empty() {
        "No assignable staff".to_string()
    } else {
        render_staff_table(&loads)
    };
    CommandOutput::new(json!(json_output)).with_text(text).print(output)
}

/// List doctors that have raised tickets
pub async fn cmd_doctors(output: OutputOptions) -> Result<()> {
    let (_, gateway) = connect()?;
    let doctors = gateway.list_doctors_with_counts().await?;

    let text = if doctors.is_empty() {
        "No doctors with tickets".to_string()
    } else {
        render_doctor_table(&doctors)
    };
    CommandOutput::new(serde_json::to_value(&doctors)?)
        .with_text(text)
        .print(output)
}

/// List predefined response templates
pub async fn cmd_templates(output: OutputOptions) -> Result<()> {
    let (_, gateway) = connect()?;
    let templates = gateway.list_response_templates().await?;

    let text = if templates.is_empty() {
        "No response templates".to_string()
    } else {
        render_template_table(&templates)
    };
    CommandOutput::new(serde_json::to_value(&templates)?)
        .with_text(text)
        .print(output)
}
