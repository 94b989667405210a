#![allow(dead_code)]

pub mod stub_server;

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

pub fn mesa_binary() -> &'static str {
    env!("CARGO_BIN_EXE_mesa-board")
}

/// Helper struct to run mesa-board commands against an isolated config root
pub struct MesaTest {
    pub temp_dir: TempDir,
    api_url: Option<String>,
}

impl MesaTest {
    pub fn new() -> Self {
        MesaTest {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
            api_url: None,
        }
    }

    /// Point every command at this API root through `MESA_API_URL`.
    pub fn with_api_url(mut self, url: &str) -> Self {
        self.api_url = Some(url.to_string());
        self
    }

    pub fn root(&self) -> PathBuf {
        self.temp_dir.path().join(".mesa")
    }

    pub fn config_path(&self) -> PathBuf {
        self.root().join("config.yaml")
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut command = Command::new(mesa_binary());
        command
            .args(args)
            .current_dir(self.temp_dir.path())
            .env("MESA_ROOT", self.root())
            .env("NO_COLOR", "1")
            .env_remove("MESA_API_URL")
            .env_remove("MESA_API_TOKEN")
            .env_remove("RUST_LOG");
        if let Some(url) = &self.api_url {
            command.env("MESA_API_URL", url);
        }
        command
    }

    pub fn run(&self, args: &[&str]) -> Output {
        self.command(args)
            .output()
            .expect("Failed to execute mesa-board command")
    }

    /// Run with `input` piped to stdin, as the interactive board reads it.
    pub fn run_with_stdin(&self, args: &[&str], input: &str) -> Output {
        let mut child = self
            .command(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("Failed to spawn mesa-board command");
        child
            .stdin
            .take()
            .expect("stdin is piped")
            .write_all(input.as_bytes())
            .expect("Failed to write stdin");
        child
            .wait_with_output()
            .expect("Failed to wait for mesa-board command")
    }

    pub fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        if !output.status.success() {
            panic!(
                "Command {:?} failed with status {:?}\nstdout: {}\nstderr: {}",
                args,
                output.status,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    pub fn run_failure(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            !output.status.success(),
            "Expected command {:?} to fail, but it succeeded",
            args
        );
        String::from_utf8_lossy(&output.stderr).to_string()
    }

    pub fn run_json(&self, args: &[&str]) -> serde_json::Value {
        let stdout = self.run_success(args);
        serde_json::from_str(&stdout)
            .unwrap_or_else(|e| panic!("invalid JSON from {args:?}: {e}\n{stdout}"))
    }
}

impl Default for MesaTest {
    fn default() -> Self {
        Self::new()
    }
}

/// Ticket as the API serializes it, created `minutes_ago` minutes ago.
pub fn ticket_json(
    id: i64,
    status: &str,
    minutes_ago: i64,
    assignee: Option<(i64, &str)>,
) -> serde_json::Value {
    let created = jiff::Timestamp::now() - jiff::SignedDuration::from_mins(minutes_ago);
    let mut ticket = serde_json::json!({
        "id": id,
        "numeroTicket": format!("{id:04}-2026"),
        "titulo": format!("Consulta {id}"),
        "estado": status,
        "prioridad": "MEDIA",
        "fechaCreacion": created.to_string(),
        "dniPaciente": format!("4455{id:04}"),
        "nombrePaciente": "Paciente de prueba",
        "nombreMedico": "Dr. Quispe",
    });
    if let Some((staff_id, name)) = assignee {
        ticket["idPersonalAsignado"] = serde_json::json!(staff_id);
        ticket["nombrePersonalAsignado"] = serde_json::json!(name);
    }
    ticket
}

/// Spring-style page wrapper
pub fn page_json(
    tickets: Vec<serde_json::Value>,
    total_pages: u32,
    total_elements: u64,
    number: u32,
) -> serde_json::Value {
    serde_json::json!({
        "content": tickets,
        "totalPages": total_pages,
        "totalElements": total_elements,
        "number": number,
    })
}

pub fn staff_json() -> serde_json::Value {
    serde_json::json!([
        { "idPersonal": 3, "nombreCompleto": "Luis Paz" },
        { "idPersonal": 5, "nombreCompleto": "Ana Torres" },
    ])
}
