use jiff::Timestamp;
use serde_json::json;

use super::{CommandOutput, connect};
use crate::board::filter::refine_by_urgency;
use crate::board::model::page_label;
use crate::board::{UrgencyBucket, urgency_bucket};
use crate::cli::OutputOptions;
use crate::display::render_ticket_table;
use crate::error::Result;
use crate::gateway::{PageRequest, TicketGateway, TicketQuery};

pub struct LsOptions {
    pub query: TicketQuery,
    pub urgency: Option<UrgencyBucket>,
    /// Zero-based page index
    pub page_index: u32,
    /// Overrides `board.page_size`
    pub page_size: Option<u32>,
    pub output: OutputOptions,
}

/// List one page of tickets, optionally refined by waiting time
pub async fn cmd_ls(options: LsOptions) -> Result<()> {
    let (config, gateway) = connect()?;
    let size = options
        .page_size
        .unwrap_or_else(|| config.board_config().page_size);

    let page = gateway
        .search_tickets(&options.query, PageRequest::new(options.page_index, size))
        .await?;

    let now = Timestamp::now();
    let shown = refine_by_urgency(&page.items, options.urgency, now);

    let tickets_json: Vec<_> = shown
        .iter()
        .map(|t| -> Result<serde_json::Value> {
            let mut value = serde_json::to_value(t)?;
            value["urgency"] = json!(urgency_bucket(now, t.created_at).to_string());
            Ok(value)
        })
        .collect::<Result<Vec<_>>>()?;

    let json_output = json!({
        "tickets": tickets_json,
        "page": options.page_index + 1,
        "total_pages": page.total_pages,
        "total_elements": page.total_elements,
    });

    let mut text = if shown.is_empty() {
        if page.items.is_empty() {
            "No tickets found".to_string()
        } else {
            "No tickets on this page match the urgency filter".to_string()
        }
    } else {
        render_ticket_table(&shown, now)
    };
    text.push_str(&format!(
        "\n{} · {} tickets",
        page_label(options.page_index, page.total_pages),
        page.total_elements
    ));

    CommandOutput::new(json_output)
        .with_text(text)
        .print(options.output)
}
