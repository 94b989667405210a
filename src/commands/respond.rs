use serde_json::json;

use super::{CommandOutput, connect};
use crate::board::RespondForm;
use crate::cli::OutputOptions;
use crate::display::render_ticket_detail;
use crate::error::Result;
use crate::gateway::TicketGateway;
use crate::types::{TicketId, TicketStatus};

/// Answer a ticket with a predefined template or free text
pub async fn cmd_respond(
    ticket_id: TicketId,
    template: Option<i64>,
    text: Option<String>,
    status: TicketStatus,
    output: OutputOptions,
) -> Result<()> {
    let (config, gateway) = connect()?;
    let templates = gateway.list_response_templates().await?;

    let mut form = RespondForm::blank(ticket_id);
    match (template, text) {
        (Some(template_id), text) => {
            form.choose_template(template_id, &templates)?;
            if let Some(text) = text {
                form.set_free_text(text)?;
            }
        }
        (None, text) => {
            form.choose_other();
            form.set_free_text(text.unwrap_or_default())?;
        }
    }
    form.set_target_status(status)?;
    let response = form.validate(&templates, &config.current_user())?;

    let ticket = gateway.respond(ticket_id, &response).await?;

    CommandOutput::new(json!({
        "id": ticket_id,
        "action": "responded",
        "status": response.status.to_string(),
        "response": response.text,
        "ticket": serde_json::to_value(&ticket)?,
    }))
    .with_text(render_ticket_detail(&ticket))
    .print(output)
}
