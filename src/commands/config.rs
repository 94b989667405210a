//! Configuration commands.
//!
//! - `config show`: Display current configuration
//! - `config get`: Read one value
//! - `config set`: Set a configuration value

use owo_colors::OwoColorize;
use serde_json::json;

use super::CommandOutput;
use crate::cli::OutputOptions;
use crate::config::Config;
use crate::error::{MesaError, Result};

/// Reject underscore keys that should use dot notation (`api_token` -> `api.token`).
fn validate_config_key(key: &str) -> Result<&str> {
    if !key.contains('.')
        && let Some(pos) = key.find('_')
    {
        let dot_version = format!("{}.{}", &key[..pos], &key[pos + 1..]);
        return Err(MesaError::Config(format!(
            "invalid config key '{key}'. Use dot notation: '{dot_version}'"
        )));
    }
    Ok(key)
}

/// Show current configuration
pub fn cmd_config_show(output: OutputOptions) -> Result<()> {
    let config = Config::load()?;
    let base_url = config.base_url();
    let token_configured = config.api_token().is_some();
    let board = config.board_config();
    let user = config.current_user();

    let json_output = json!({
        "api": {
            "base_url": base_url,
            "token_configured": token_configured,
            "timeout": config.api.timeout,
        },
        "board": {
            "page_size": board.page_size,
            "debounce_ms": board.debounce.as_millis() as u64,
            "respond_close_delay_ms": board.respond_close_delay.as_millis() as u64,
        },
        "user": {
            "id": user.id,
            "name": user.name,
        },
        "config_file": Config::config_path().to_string_lossy(),
    });

    let mut text = String::new();
    text.push_str(&format!("{}\n\n", "Configuration:".cyan().bold()));

    text.push_str(&format!("{}:\n", "api".cyan()));
    match &base_url {
        Some(url) => text.push_str(&format!("  base_url: {url}\n")),
        None => text.push_str(&format!("  base_url: {}\n", "not configured".dimmed())),
    }
    let token_status = if token_configured {
        "configured".green().to_string()
    } else {
        "not configured".dimmed().to_string()
    };
    text.push_str(&format!("  token: {token_status}\n"));
    text.push_str(&format!("  timeout: {}s\n\n", config.api.timeout));

    text.push_str(&format!("{}:\n", "board".cyan()));
    text.push_str(&format!("  page_size: {}\n", board.page_size));
    text.push_str(&format!("  debounce_ms: {}\n", board.debounce.as_millis()));
    text.push_str(&format!(
        "  respond_close_delay_ms: {}\n\n",
        board.respond_close_delay.as_millis()
    ));

    text.push_str(&format!("{}:\n", "user".cyan()));
    text.push_str(&format!("  id: {}\n", user.id));
    text.push_str(&format!("  name: {}\n\n", user.name));

    text.push_str(&format!(
        "{}",
        format!("Config file: {}", Config::config_path().display()).dimmed()
    ));

    CommandOutput::new(json_output).with_text(text).print(output)
}

/// Get a configuration value
pub fn cmd_config_get(key: &str, output: OutputOptions) -> Result<()> {
    validate_config_key(key)?;
    let config = Config::load()?;
    let value = config.get(key)?;

    let text = value
        .clone()
        .unwrap_or_else(|| "not set".dimmed().to_string());
    CommandOutput::new(json!({ "key": key, "value": value }))
        .with_text(text)
        .print(output)
}

/// Set a configuration value
pub fn cmd_config_set(key: &str, value: &str, output: OutputOptions) -> Result<()> {
    validate_config_key(key)?;
    let mut config = Config::load()?;
    config.set(key, value)?;
    config.save()?;

    // never echo the token back
    let shown = config.get(key)?.unwrap_or_default();
    CommandOutput::new(json!({
        "action": "config_set",
        "key": key,
        "value": shown,
        "success": true,
    }))
    .with_text(format!("Set {} = {}", key.cyan(), shown))
    .print(output)
}
