use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use jiff::civil::Date;
use std::io;
use std::str::FromStr;

use crate::board::UrgencyBucket;
use crate::types::{
    RESPONSE_STATUSES, StatusGroup, TicketId, TicketPriority, TicketStatus, VALID_PRIORITIES,
    VALID_STATUSES, parse_date,
};

#[derive(Parser)]
#[command(name = "mesa-board")]
#[command(about = "Helpdesk ticket board for Mesa de Ayuda")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Shared output flags
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Server-evaluated search criteria shared by `ls` and `board`
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Comma-separated statuses, e.g. NUEVO,EN_PROCESO
    #[arg(short, long, value_parser = parse_status_group)]
    pub status: Option<StatusGroup>,

    /// Priority: ALTA, MEDIA, BAJA
    #[arg(short, long, value_parser = parse_priority)]
    pub priority: Option<TicketPriority>,

    /// Exact ticket number
    #[arg(short = 'n', long)]
    pub number: Option<String>,

    /// Patient document (DNI)
    #[arg(short, long)]
    pub document: Option<String>,

    /// Assigned staff member id
    #[arg(long)]
    pub assignee_id: Option<i64>,

    /// Assigned staff member name (partial)
    #[arg(long)]
    pub assignee: Option<String>,

    /// Requesting doctor id
    #[arg(long)]
    pub doctor: Option<i64>,

    /// Created on or after (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date_arg)]
    pub from: Option<Date>,

    /// Created on or before (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date_arg)]
    pub to: Option<Date>,

    /// Attended on or after (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date_arg)]
    pub attended_from: Option<Date>,

    /// Attended on or before (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date_arg)]
    pub attended_to: Option<Date>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List one page of tickets
    #[command(visible_alias = "l")]
    Ls {
        #[command(flatten)]
        filters: FilterArgs,

        /// Waiting-time bucket: green, yellow, red (applied to the fetched page)
        #[arg(short, long, value_parser = parse_urgency)]
        urgency: Option<UrgencyBucket>,

        /// Page number, starting at 1
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,

        /// Page size (default: board.page_size from config)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        size: Option<u32>,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// Assign a ticket to a staff member
    #[command(visible_alias = "a")]
    Assign {
        /// Ticket id
        id: TicketId,

        /// Staff member id
        #[arg(long, required_unless_present = "me", conflicts_with = "me")]
        to: Option<i64>,

        /// Assign to the configured current user
        #[arg(long)]
        me: bool,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// Remove the assignee from a ticket
    Unassign {
        /// Ticket id
        id: TicketId,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// Assign several unassigned tickets to one staff member
    BulkAssign {
        /// Staff member id
        #[arg(long)]
        to: i64,

        /// Ticket ids
        #[arg(required = true, num_args = 1..)]
        ids: Vec<TicketId>,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// Answer a ticket and move it to a new status
    Respond {
        /// Ticket id
        id: TicketId,

        /// Predefined response template id
        #[arg(long, required_unless_present = "text", conflicts_with = "text")]
        template: Option<i64>,

        /// Free-text answer (the "other" response)
        #[arg(long)]
        text: Option<String>,

        /// New status: EN_PROCESO or RESUELTO
        #[arg(long, value_parser = parse_response_status)]
        status: TicketStatus,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// Update the patient phone numbers on a ticket
    Phones {
        /// Ticket id
        id: TicketId,

        /// Primary phone
        #[arg(long, required_unless_present = "alternate")]
        primary: Option<String>,

        /// Alternate phone
        #[arg(long)]
        alternate: Option<String>,

        #[command(flatten)]
        output: OutputOptions,
    },

    /// List assignable staff with their open ticket counts
    Staff {
        #[command(flatten)]
        output: OutputOptions,
    },

    /// List requesting doctors with ticket counts
    Doctors {
        #[command(flatten)]
        output: OutputOptions,
    },

    /// List predefined response templates
    Templates {
        #[command(flatten)]
        output: OutputOptions,
    },

    /// Interactive board session
    #[command(visible_alias = "b")]
    Board {
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for [possible values: bash, zsh, fish, powershell, elvish]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        #[command(flatten)]
        output: OutputOptions,
    },
    /// Get a configuration value
    Get {
        /// Configuration key (e.g. api.base_url)
        key: String,

        #[command(flatten)]
        output: OutputOptions,
    },
    /// Set a configuration value
    Set {
        /// Configuration key (e.g. board.page_size)
        key: String,

        /// Value to set
        value: String,

        #[command(flatten)]
        output: OutputOptions,
    },
}

impl Commands {
    /// Execute the command, dispatching to the appropriate handler.
    pub async fn run(self) -> crate::error::Result<()> {
        use crate::commands::{
            LsOptions, cmd_assign, cmd_board, cmd_bulk_assign, cmd_config_get, cmd_config_set,
            cmd_config_show, cmd_doctors, cmd_ls, cmd_phones, cmd_respond, cmd_staff,
            cmd_templates, cmd_unassign,
        };

        match self {
            Commands::Ls {
                filters,
                urgency,
                page,
                size,
                output,
            } => {
                cmd_ls(LsOptions {
                    query: filters.into_query(),
                    urgency,
                    page_index: page - 1,
                    page_size: size,
                    output,
                })
                .await
            }
            Commands::Assign { id, to, me, output } => cmd_assign(id, to, me, output).await,
            Commands::Unassign { id, output } => cmd_unassign(id, output).await,
            Commands::BulkAssign { to, ids, output } => cmd_bulk_assign(&ids, to, output).await,
            Commands::Respond {
                id,
                template,
                text,
                status,
                output,
            } => cmd_respond(id, template, text, status, output).await,
            Commands::Phones {
                id,
                primary,
                alternate,
                output,
            } => cmd_phones(id, primary, alternate, output).await,
            Commands::Staff { output } => cmd_staff(output).await,
            Commands::Doctors { output } => cmd_doctors(output).await,
            Commands::Templates { output } => cmd_templates(output).await,
            Commands::Board { filters } => cmd_board(filters.into_query()).await,
            Commands::Config { action } => match action {
                ConfigAction::Show { output } => cmd_config_show(output),
                ConfigAction::Get { key, output } => cmd_config_get(&key, output),
                ConfigAction::Set { key, value, output } => cmd_config_set(&key, &value, output),
            },
            Commands::Completions { shell } => {
                generate_completions(shell);
                Ok(())
            }
        }
    }
}

impl FilterArgs {
    pub fn into_query(self) -> crate::gateway::TicketQuery {
        use crate::types::DateRange;

        crate::gateway::TicketQuery {
            status_group: self.status,
            priority: self.priority,
            patient_document: self.document.filter(|d| !d.trim().is_empty()),
            ticket_number: self.number.filter(|n| !n.trim().is_empty()),
            assignee_id: self.assignee_id,
            assignee_name: self.assignee.filter(|a| !a.trim().is_empty()),
            doctor_id: self.doctor,
            created: DateRange::new(self.from, self.to),
            attended: DateRange::new(self.attended_from, self.attended_to),
        }
    }
}

fn parse_with_validation<T, F>(
    s: &str,
    parser: F,
    field_name: &str,
    valid_values: &[&str],
) -> Result<T, String>
where
    F: FnOnce(&str) -> Result<T, String>,
{
    parser(s).map_err(|_| {
        format!(
            "Invalid {}. Must be one of: {}",
            field_name,
            valid_values.join(", ")
        )
    })
}

fn parse_status_group(s: &str) -> Result<StatusGroup, String> {
    parse_with_validation(
        s,
        |v| StatusGroup::from_str(v).map_err(|_| String::new()),
        "status",
        VALID_STATUSES,
    )
}

fn parse_priority(s: &str) -> Result<TicketPriority, String> {
    parse_with_validation(
        s,
        |v| v.parse().map_err(|_| String::new()),
        "priority",
        VALID_PRIORITIES,
    )
}

fn parse_urgency(s: &str) -> Result<UrgencyBucket, String> {
    parse_with_validation(
        s,
        |v| v.parse().map_err(|_| String::new()),
        "urgency",
        &["green", "yellow", "red"],
    )
}

fn parse_response_status(s: &str) -> Result<TicketStatus, String> {
    let valid: Vec<String> = RESPONSE_STATUSES.iter().map(|s| s.to_string()).collect();
    let valid: Vec<&str> = valid.iter().map(String::as_str).collect();
    parse_with_validation(
        s,
        |v| {
            TicketStatus::from_str(v)
                .ok()
                .filter(|status| RESPONSE_STATUSES.contains(status))
                .ok_or_else(String::new)
        },
        "response status",
        &valid,
    )
}

fn parse_date_arg(s: &str) -> Result<Date, String> {
    parse_date(s).map_err(|e| e.to_string())
}

pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "mesa-board", &mut io::stdout());
}
