mod assign;
mod board;
mod config;
mod lookup;
mod ls;
mod phones;
mod respond;

pub use assign::{cmd_assign, cmd_bulk_assign, cmd_unassign};
pub use board::{BoardCommand, cmd_board, parse_board_command};
pub use config::{cmd_config_get, cmd_config_set, cmd_config_show};
pub use lookup::{cmd_doctors, cmd_staff, cmd_templates};
pub use ls::{LsOptions, cmd_ls};
pub use phones::cmd_phones;
pub use respond::cmd_respond;

use serde::Serialize;

use crate::cli::OutputOptions;
use crate::config::Config;
use crate::error::Result;
use crate::gateway::HttpGateway;

/// Output of a one-shot command: a JSON value plus an optional
/// human-readable rendering.
pub struct CommandOutput {
    json: serde_json::Value,
    text: Option<String>,
}

impl CommandOutput {
    pub fn new(json: serde_json::Value) -> Self {
        Self { json, text: None }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn print(self, output: OutputOptions) -> Result<()> {
        match self.text {
            Some(text) if !output.json => println!("{text}"),
            _ => print_json(&self.json)?,
        }
        Ok(())
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Load configuration and build the HTTP gateway from it.
pub(crate) fn connect() -> Result<(Config, HttpGateway)> {
    let config = Config::load()?;
    let gateway = HttpGateway::from_config(&config)?;
    Ok((config, gateway))
}
