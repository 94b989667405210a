//! Terminal rendering for tickets, lookups and the board view.

use jiff::Timestamp;
use owo_colors::OwoColorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::board::suggest::StaffLoad;
use crate::board::{BoardViewModel, DropdownState, RespondForm, Toast, ToastLevel, UrgencyBucket};
use crate::types::{DoctorCount, ResponseTemplate, Ticket, TicketPriority, TicketStatus};

pub fn format_status_colored(status: TicketStatus) -> String {
    let badge = status.to_string();
    match status {
        TicketStatus::Nuevo => badge.yellow().to_string(),
        TicketStatus::EnProceso => badge.cyan().to_string(),
        TicketStatus::Resuelto => badge.green().to_string(),
        TicketStatus::Cerrado => badge.dimmed().to_string(),
    }
}

pub fn format_priority_colored(priority: Option<TicketPriority>) -> String {
    match priority {
        Some(TicketPriority::Alta) => "ALTA".red().to_string(),
        Some(TicketPriority::Media) => "MEDIA".yellow().to_string(),
        Some(TicketPriority::Baja) => "BAJA".to_string(),
        None => "-".dimmed().to_string(),
    }
}

/// Elapsed time since creation, e.g. `7m` or `2h 05m`.
pub fn format_waiting(now: Timestamp, created: Timestamp) -> String {
    let minutes = now.duration_since(created).as_secs().max(0) / 60;
    if minutes < 60 {
        format!("{minutes}m")
    } else if minutes < 24 * 60 {
        format!("{}h {:02}m", minutes / 60, minutes % 60)
    } else {
        format!("{}d {}h", minutes / (24 * 60), (minutes / 60) % 24)
    }
}

pub fn format_urgency(bucket: UrgencyBucket, text: &str) -> String {
    let dot = format!("● {text}");
    match bucket {
        UrgencyBucket::Green => dot.green().to_string(),
        UrgencyBucket::Yellow => dot.yellow().to_string(),
        UrgencyBucket::Red => dot.red().to_string(),
    }
}

pub fn format_toast(toast: &Toast) -> String {
    match toast.level {
        ToastLevel::Success => format!("{} {}", "✓".green(), toast.message),
        ToastLevel::Warning => format!("{} {}", "!".yellow(), toast.message),
        ToastLevel::Error => format!("{} {}", "✗".red(), toast.message),
    }
}

#[derive(Tabled)]
struct TicketTableRow {
    #[tabled(rename = "")]
    marker: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Ticket")]
    number: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Waiting")]
    waiting: String,
    #[tabled(rename = "Patient")]
    patient: String,
    #[tabled(rename = "Doctor")]
    doctor: String,
    #[tabled(rename = "Assignee")]
    assignee: String,
}

fn ticket_table_row(ticket: &Ticket, now: Timestamp, marker: String) -> TicketTableRow {
    let waiting = format_waiting(now, ticket.created_at);
    TicketTableRow {
        marker,
        id: ticket.id.to_string(),
        number: ticket.display_number(),
        status: format_status_colored(ticket.status),
        priority: format_priority_colored(ticket.priority),
        waiting: format_urgency(crate::board::urgency_bucket(now, ticket.created_at), &waiting),
        patient: patient_label(ticket),
        doctor: ticket.doctor_name.clone().unwrap_or_default(),
        assignee: ticket
            .assignee_name
            .clone()
            .filter(|_| ticket.is_assigned())
            .unwrap_or_else(|| "unassigned".dimmed().to_string()),
    }
}

fn patient_label(ticket: &Ticket) -> String {
    match (&ticket.patient_name, &ticket.patient_document) {
        (Some(name), Some(doc)) => format!("{name} ({doc})"),
        (Some(name), None) => name.clone(),
        (None, Some(doc)) => doc.clone(),
        (None, None) => String::new(),
    }
}

/// Plain ticket table, used by one-shot commands.
pub fn render_ticket_table(tickets: &[&Ticket], now: Timestamp) -> String {
    let rows: Vec<TicketTableRow> = tickets
        .iter()
        .map(|t| ticket_table_row(t, now, String::new()))
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

/// Single ticket detail block.
pub fn render_ticket_detail(ticket: &Ticket) -> String {
    let mut out = format!(
        "{} {}\n",
        ticket.display_number().cyan().bold(),
        format_status_colored(ticket.status)
    );
    if !ticket.title.is_empty() {
        out.push_str(&format!("  {}\n", ticket.title));
    }
    let fields = [
        ("patient", Some(patient_label(ticket)).filter(|p| !p.is_empty())),
        ("doctor", ticket.doctor_name.clone()),
        ("specialty", ticket.specialty.clone()),
        ("assignee", ticket.assignee_name.clone()),
        ("phone", ticket.phone.clone()),
        ("alternate phone", ticket.alternate_phone.clone()),
        ("response", ticket.response.clone()),
        ("answered by", ticket.responder_name.clone()),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            out.push_str(&format!("  {}: {value}\n", label.dimmed()));
        }
    }
    out
}

#[derive(Tabled)]
struct StaffRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Open tickets")]
    open: usize,
}

pub fn render_staff_table(staff: &[StaffLoad]) -> String {
    let rows: Vec<StaffRow> = staff
        .iter()
        .map(|s| StaffRow {
            id: s.staff.id,
            name: s.staff.name.clone(),
            open: s.open_tickets,
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

#[derive(Tabled)]
struct DoctorRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Doctor")]
    name: String,
    #[tabled(rename = "Tickets")]
    count: u64,
}

pub fn render_doctor_table(doctors: &[DoctorCount]) -> String {
    let rows: Vec<DoctorRow> = doctors
        .iter()
        .map(|d| DoctorRow {
            id: d.id,
            name: d.name.clone(),
            count: d.count,
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

#[derive(Tabled)]
struct TemplateRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Response")]
    description: String,
}

pub fn render_template_table(templates: &[ResponseTemplate]) -> String {
    let rows: Vec<TemplateRow> = templates
        .iter()
        .map(|t| TemplateRow {
            id: t.id,
            code: if t.is_other {
                format!("{} (free text)", t.code)
            } else {
                t.code.clone()
            },
            description: t.description.clone(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

/// Full board screen: filters line, table, footer, banners.
pub fn render_board(view: &BoardViewModel, now: Timestamp) -> String {
    let mut out = String::new();

    if let Some(error) = &view.error_banner {
        out.push_str(&format!(
            "{} {error} {}\n",
            "error:".red().bold(),
            "(retry with 'refresh', hide with 'dismiss')".dimmed()
        ));
    }

    if view.rows.is_empty() {
        let message = view.empty_state.map(|e| e.message()).unwrap_or_default();
        out.push_str(&format!("{}\n", message.dimmed()));
    } else {
        let rows: Vec<TicketTableRow> = view
            .rows
            .iter()
            .map(|row| {
                let marker = if row.mutation_in_flight {
                    "…".to_string()
                } else if row.selected {
                    "[x]".to_string()
                } else if row.eligible {
                    "[ ]".to_string()
                } else {
                    String::new()
                };
                ticket_table_row(&row.ticket, now, marker)
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        out.push_str(&table.to_string());
        out.push('\n');
    }

    let mut footer = format!("{} · {} tickets", view.page_label, view.total_elements);
    if view.selected_count > 0 {
        footer.push_str(&format!(" · {} selected", view.selected_count));
    }
    if view.loading {
        footer.push_str(" · loading");
    }
    if view.pending_search {
        footer.push_str(" · searching");
    }
    if view.bulk_in_flight {
        footer.push_str(" · assigning");
    }
    out.push_str(&format!("{}\n", footer.dimmed()));

    match view.dropdown {
        DropdownState::Row(id) => {
            out.push_str(&format!("assigning ticket {id}: pick with 'to <staff id>'\n"))
        }
        DropdownState::Bulk => out.push_str(&format!(
            "assigning {} selected tickets: pick with 'to <staff id>'\n",
            view.selected_count
        )),
        DropdownState::Closed => {}
    }

    if let Some(form) = &view.respond {
        out.push_str(&render_respond_form(form));
    }

    if let Some(toast) = &view.toast {
        out.push_str(&format!("{}\n", format_toast(toast)));
    }

    out
}

fn render_respond_form(form: &RespondForm) -> String {
    use crate::board::{RespondPhase, TemplateChoice};

    let choice = match form.choice {
        None => "none".dimmed().to_string(),
        Some(TemplateChoice::Predefined(id)) => format!("template {id}"),
        Some(TemplateChoice::Other) => format!("other: \"{}\"", form.free_text),
    };
    let status = form
        .target_status
        .map(format_status_colored)
        .unwrap_or_else(|| "none".dimmed().to_string());
    let phase = match form.phase {
        RespondPhase::Editing => String::new(),
        RespondPhase::Submitting => " (sending)".to_string(),
        RespondPhase::Succeeded => " (sent)".green().to_string(),
    };

    let mut out = format!(
        "{} {}{phase}\n  answer: {choice}\n  new status: {status}\n",
        "responding to".cyan(),
        form.ticket_number
    );
    if let Some(error) = &form.error {
        out.push_str(&format!("  {}\n", error.red()));
    }
    out
}
