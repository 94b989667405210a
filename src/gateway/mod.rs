//! Remote ticket gateway.
//!
//! The board controller only talks to the helpdesk through [`TicketGateway`].
//! [`http::HttpGateway`] implements it against the REST API; tests supply
//! in-memory fakes.

pub mod error;
pub mod http;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{
    DateRange, DoctorCount, ResponseTemplate, Staff, StatusGroup, Ticket, TicketId, TicketPage,
    TicketPriority, TicketStatus,
};

pub use http::HttpGateway;

/// Server-evaluated search criteria.
///
/// `None` / empty fields are left out of the request entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketQuery {
    pub status_group: Option<StatusGroup>,
    pub priority: Option<TicketPriority>,
    pub patient_document: Option<String>,
    pub ticket_number: Option<String>,
    pub assignee_id: Option<i64>,
    pub assignee_name: Option<String>,
    pub doctor_id: Option<i64>,
    pub created: DateRange,
    pub attended: DateRange,
}

impl TicketQuery {
    /// Query with only a status group set.
    pub fn with_status_group(status_group: StatusGroup) -> Self {
        Self {
            status_group: Some(status_group),
            ..Self::default()
        }
    }
}

/// Zero-based page index and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub index: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn new(index: u32, size: u32) -> Self {
        Self { index, size }
    }
}

/// Result of a bulk assignment. The server assigns what it can and
/// reports the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkAssignOutcome {
    #[serde(rename = "asignados", default)]
    pub assigned: u32,
    #[serde(rename = "errores", default)]
    pub errors: Vec<String>,
}

impl BulkAssignOutcome {
    pub fn is_partial(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Answer posted to a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketResponse {
    #[serde(rename = "respuesta")]
    pub text: String,
    #[serde(rename = "estado")]
    pub status: TicketStatus,
    #[serde(rename = "idPersonalMesa")]
    pub responder_id: i64,
    #[serde(rename = "nombrePersonalMesa")]
    pub responder_name: String,
}

/// Patient phone numbers on a ticket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PhoneUpdate {
    #[serde(rename = "telefonoPrincipal")]
    pub primary: Option<String>,
    #[serde(rename = "telefonoAlterno")]
    pub alternate: Option<String>,
}

/// Common interface for helpdesk backends.
pub trait TicketGateway: Send + Sync {
    /// One page of tickets matching `query`.
    fn search_tickets(
        &self,
        query: &TicketQuery,
        page: PageRequest,
    ) -> impl std::future::Future<Output = Result<TicketPage>> + Send;

    /// Unpaginated snapshot used for autocomplete suggestions and assignee counts.
    fn list_all_for_dropdowns(
        &self,
        status_group: Option<&StatusGroup>,
    ) -> impl std::future::Future<Output = Result<Vec<Ticket>>> + Send;

    fn list_assignable_staff(&self) -> impl std::future::Future<Output = Result<Vec<Staff>>> + Send;

    fn list_doctors_with_counts(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<DoctorCount>>> + Send;

    fn list_response_templates(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<ResponseTemplate>>> + Send;

    fn assign(
        &self,
        ticket_id: TicketId,
        staff: &Staff,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    fn unassign(&self, ticket_id: TicketId) -> impl std::future::Future<Output = Result<()>> + Send;

    fn bulk_assign(
        &self,
        ticket_ids: &[TicketId],
        staff: &Staff,
    ) -> impl std::future::Future<Output = Result<BulkAssignOutcome>> + Send;

    fn respond(
        &self,
        ticket_id: TicketId,
        response: &TicketResponse,
    ) -> impl std::future::Future<Output = Result<Ticket>> + Send;

    fn update_phones(
        &self,
        ticket_id: TicketId,
        phones: &PhoneUpdate,
    ) -> impl std::future::Future<Output = Result<Ticket>> + Send;
}
