//! Wire-level types shared by the gateway, the board controller and the CLI.
//!
//! Field names follow the helpdesk REST API (`numeroTicket`, `estado`, ...),
//! renamed to English on the Rust side.

use std::fmt;
use std::str::FromStr;

use jiff::Timestamp;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::error::{MesaError, Result};

pub type TicketId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    #[default]
    Nuevo,
    EnProceso,
    Resuelto,
    Cerrado,
}

impl TicketStatus {
    /// Resolved tickets accept no further assignment or response.
    pub fn is_resolved(self) -> bool {
        self == TicketStatus::Resuelto
    }

    /// Statuses a ticket can still be answered from.
    pub fn is_open(self) -> bool {
        matches!(self, TicketStatus::Nuevo | TicketStatus::EnProceso)
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketStatus::Nuevo => write!(f, "NUEVO"),
            TicketStatus::EnProceso => write!(f, "EN_PROCESO"),
            TicketStatus::Resuelto => write!(f, "RESUELTO"),
            TicketStatus::Cerrado => write!(f, "CERRADO"),
        }
    }
}

impl FromStr for TicketStatus {
    type Err = MesaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().replace('-', "_").as_str() {
            "NUEVO" => Ok(TicketStatus::Nuevo),
            "EN_PROCESO" => Ok(TicketStatus::EnProceso),
            "RESUELTO" => Ok(TicketStatus::Resuelto),
            "CERRADO" => Ok(TicketStatus::Cerrado),
            _ => Err(MesaError::InvalidStatus(s.to_string())),
        }
    }
}

pub const VALID_STATUSES: &[&str] = &["NUEVO", "EN_PROCESO", "RESUELTO", "CERRADO"];

/// Statuses a response may move a ticket to.
pub const RESPONSE_STATUSES: &[TicketStatus] = &[TicketStatus::EnProceso, TicketStatus::Resuelto];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketPriority {
    Alta,
    Media,
    Baja,
}

impl fmt::Display for TicketPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketPriority::Alta => write!(f, "ALTA"),
            TicketPriority::Media => write!(f, "MEDIA"),
            TicketPriority::Baja => write!(f, "BAJA"),
        }
    }
}

impl FromStr for TicketPriority {
    type Err = MesaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "ALTA" => Ok(TicketPriority::Alta),
            "MEDIA" => Ok(TicketPriority::Media),
            "BAJA" => Ok(TicketPriority::Baja),
            _ => Err(MesaError::InvalidPriority(s.to_string())),
        }
    }
}

pub const VALID_PRIORITIES: &[&str] = &["ALTA", "MEDIA", "BAJA"];

/// A set of statuses sent to the server as one comma-joined parameter
/// (e.g. `NUEVO,EN_PROCESO`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusGroup(Vec<TicketStatus>);

impl StatusGroup {
    pub fn new(statuses: impl IntoIterator<Item = TicketStatus>) -> Self {
        let mut unique = Vec::new();
        for status in statuses {
            if !unique.contains(&status) {
                unique.push(status);
            }
        }
        Self(unique)
    }

    pub fn statuses(&self) -> &[TicketStatus] {
        &self.0
    }

    pub fn contains(&self, status: TicketStatus) -> bool {
        self.0.contains(&status)
    }

    pub fn to_param(&self) -> String {
        self.0
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for StatusGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_param())
    }
}

impl FromStr for StatusGroup {
    type Err = MesaError;

    fn from_str(s: &str) -> Result<Self> {
        let statuses = s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(TicketStatus::from_str)
            .collect::<Result<Vec<_>>>()?;
        if statuses.is_empty() {
            return Err(MesaError::InvalidStatus(s.to_string()));
        }
        Ok(StatusGroup::new(statuses))
    }
}

/// Inclusive calendar date range; either end may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub from: Option<Date>,
    pub to: Option<Date>,
}

impl DateRange {
    pub fn new(from: Option<Date>, to: Option<Date>) -> Self {
        Self { from, to }
    }

    pub fn is_empty(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }
}

/// Parse a `YYYY-MM-DD` date as typed on the command line.
pub fn parse_date(s: &str) -> Result<Date> {
    s.trim()
        .parse::<Date>()
        .map_err(|e| MesaError::InvalidDate(s.to_string(), e.to_string()))
}

/// A helpdesk ticket as returned by the REST API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: TicketId,
    #[serde(rename = "numeroTicket", default)]
    pub ticket_number: Option<String>,
    #[serde(rename = "titulo", default)]
    pub title: String,
    #[serde(rename = "descripcion", default)]
    pub description: Option<String>,
    #[serde(rename = "estado")]
    pub status: TicketStatus,
    #[serde(rename = "prioridad", default)]
    pub priority: Option<TicketPriority>,
    #[serde(rename = "fechaCreacion", with = "wire_time")]
    pub created_at: Timestamp,
    #[serde(rename = "fechaAtencion", default, with = "wire_time::option")]
    pub attended_at: Option<Timestamp>,
    #[serde(rename = "fechaAsignacion", default, with = "wire_time::option")]
    pub assigned_at: Option<Timestamp>,
    #[serde(rename = "idPersonalAsignado", default)]
    pub assignee_id: Option<i64>,
    #[serde(rename = "nombrePersonalAsignado", default)]
    pub assignee_name: Option<String>,
    #[serde(rename = "nombreMedico", default)]
    pub doctor_name: Option<String>,
    #[serde(rename = "dniPaciente", default)]
    pub patient_document: Option<String>,
    #[serde(rename = "nombrePaciente", default)]
    pub patient_name: Option<String>,
    #[serde(rename = "especialidad", default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub ipress: Option<String>,
    #[serde(rename = "telefonoPaciente", default)]
    pub phone: Option<String>,
    #[serde(rename = "telefonoPacienteAlterno", default)]
    pub alternate_phone: Option<String>,
    #[serde(rename = "respuesta", default)]
    pub response: Option<String>,
    #[serde(rename = "nombrePersonalMesa", default)]
    pub responder_name: Option<String>,
}

impl Ticket {
    /// Whether any staff member holds this ticket. A blank name counts as
    /// unassigned.
    pub fn is_assigned(&self) -> bool {
        self.assignee_id.is_some()
            || self
                .assignee_name
                .as_deref()
                .is_some_and(|name| !name.trim().is_empty())
    }

    /// Number shown to users; falls back to the numeric id.
    pub fn display_number(&self) -> String {
        self.ticket_number
            .clone()
            .unwrap_or_else(|| format!("#{}", self.id))
    }
}

/// Helpdesk staff member that tickets can be assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staff {
    #[serde(rename = "idPersonal")]
    pub id: i64,
    #[serde(rename = "nombreCompleto")]
    pub name: String,
}

impl Staff {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Requesting doctor with the number of tickets they opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorCount {
    #[serde(rename = "idMedico")]
    pub id: i64,
    #[serde(rename = "nombreMedico")]
    pub name: String,
    pub count: u64,
}

/// Predefined answer offered in the respond form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseTemplate {
    pub id: i64,
    #[serde(rename = "codigo")]
    pub code: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "esOtros", default)]
    pub is_other: bool,
    #[serde(rename = "orden", default)]
    pub order: i32,
}

/// One page of results, shaped like a Spring `Page`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(rename = "content", default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(rename = "totalPages", default)]
    pub total_pages: u32,
    #[serde(rename = "totalElements", default)]
    pub total_elements: u64,
    #[serde(rename = "number", default)]
    pub index: u32,
}

pub type TicketPage = Page<Ticket>;

/// The signed-in helpdesk user, injected into the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i64,
    pub name: String,
}

impl CurrentUser {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    pub fn as_staff(&self) -> Staff {
        Staff::new(self.id, self.name.clone())
    }
}

impl Default for CurrentUser {
    fn default() -> Self {
        Self::new(1, "Personal Mesa de Ayuda")
    }
}

/// Timestamps arrive either as RFC 3339 instants or as naive local
/// date-times in Peru time (UTC-05:00, no daylight saving).
pub mod wire_time {
    use jiff::Timestamp;
    use jiff::civil::DateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const SERVER_OFFSET_HOURS: i8 = -5;

    pub fn parse(raw: &str) -> Result<Timestamp, String> {
        let raw = raw.trim();
        if let Ok(ts) = raw.parse::<Timestamp>() {
            return Ok(ts);
        }
        let local: DateTime = raw
            .parse()
            .map_err(|e| format!("invalid timestamp '{raw}': {e}"))?;
        jiff::tz::offset(SERVER_OFFSET_HOURS)
            .to_timestamp(local)
            .map_err(|e| format!("invalid timestamp '{raw}': {e}"))
    }

    pub fn serialize<S: Serializer>(ts: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    pub mod option {
        use jiff::Timestamp;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            ts: &Option<Timestamp>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match ts {
                Some(ts) => serializer.serialize_some(&ts.to_string()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Timestamp>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) if !raw.trim().is_empty() => super::parse(&raw)
                    .map(Some)
                    .map_err(serde::de::Error::custom),
                _ => Ok(None),
            }
        }
    }
}
