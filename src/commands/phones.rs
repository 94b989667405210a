use serde_json::json;

use super::{CommandOutput, connect};
use crate::board::filter::normalize_text;
use crate::cli::OutputOptions;
use crate::display::render_ticket_detail;
use crate::error::Result;
use crate::gateway::{PhoneUpdate, TicketGateway};
use crate::types::TicketId;

/// Update the patient phone numbers on a ticket
pub async fn cmd_phones(
    ticket_id: TicketId,
    primary: Option<String>,
    alternate: Option<String>,
    output: OutputOptions,
) -> Result<()> {
    let (_, gateway) = connect()?;
    let phones = PhoneUpdate {
        primary: primary.as_deref().and_then(normalize_text),
        alternate: alternate.as_deref().and_then(normalize_text),
    };

    let ticket = gateway.update_phones(ticket_id, &phones).await?;

    CommandOutput::new(json!({
        "id": ticket_id,
        "action": "phones_updated",
        "ticket": serde_json::to_value(&ticket)?,
    }))
    .with_text(render_ticket_detail(&ticket))
    .print(output)
}
