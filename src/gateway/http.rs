//! REST implementation of [`TicketGateway`] for the helpdesk API.
//!
//! All endpoints live under `{base_url}/api/mesa-ayuda/`. The bearer token is
//! held in a [`SecretBox`] and only exposed while building the request header,
//! where it is marked sensitive so reqwest never logs it.

use std::fmt;
use std::time::Duration;

use reqwest::header;
use reqwest::{Client, Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretBox};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use super::error::ApiError;
use super::{BulkAssignOutcome, PageRequest, PhoneUpdate, TicketGateway, TicketQuery, TicketResponse};
use crate::config::Config;
use crate::error::{MesaError, Result};
use crate::types::{
    DoctorCount, ResponseTemplate, Staff, StatusGroup, Ticket, TicketId, TicketPage,
};

const API_PREFIX: &str = "api/mesa-ayuda/";

/// Wrapper for the Authorization header value that redacts itself when formatted.
struct RedactedHeader {
    value: String,
}

impl RedactedHeader {
    fn bearer(token: &str) -> Self {
        Self {
            value: format!("Bearer {token}"),
        }
    }

    fn as_header_value(&self) -> Result<header::HeaderValue> {
        let mut value = header::HeaderValue::from_str(&self.value).map_err(|_| {
            MesaError::Auth("API token contains characters not allowed in a header".to_string())
        })?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl fmt::Display for RedactedHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl fmt::Debug for RedactedHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedactedHeader")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// Helpdesk REST gateway
pub struct HttpGateway {
    client: Client,
    base: Url,
    token: Option<SecretBox<String>>,
    timeout: Duration,
}

impl HttpGateway {
    /// Create a gateway for `base_url` (the server root, e.g. `http://localhost:8080`).
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let base = normalize_base_url(base_url)?;
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .build()?;

        Ok(Self {
            client,
            base,
            token: token
                .filter(|t| !t.is_empty())
                .map(|t| SecretBox::new(Box::new(t))),
            timeout,
        })
    }

    /// Create a gateway from configuration, honoring `MESA_API_URL` / `MESA_API_TOKEN`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let base_url = config.base_url().ok_or_else(|| {
            MesaError::Config(
                "API base URL not configured. Set MESA_API_URL or run: mesa-board config set api.base_url <url>".to_string(),
            )
        })?;
        Self::new(&base_url, config.api_token(), config.request_timeout())
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(API_PREFIX)?.join(path)?)
    }

    fn request(&self, method: Method, url: Url) -> Result<RequestBuilder> {
        let mut builder = self.client.request(method, url);
        if let Some(token) = &self.token {
            let auth_header = RedactedHeader::bearer(token.expose_secret());
            builder = builder.header(header::AUTHORIZATION, auth_header.as_header_value()?);
        }
        Ok(builder)
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<reqwest::Response> {
        let response = builder.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let error = ApiError::from_body(status, &body);
        tracing::warn!(status = status.as_u16(), message = %error, "helpdesk API request failed");
        Err(error.into())
    }

    async fn fetch_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = self.execute(builder).await?;
        response.json::<T>().await.map_err(|e| self.transport_error(e))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> Result<T> {
        let url = self.endpoint(path)?;
        tracing::debug!(%url, "GET");
        let builder = self.request(Method::GET, url)?.query(params);
        self.fetch_json(builder).await
    }

    async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<T> {
        let url = self.endpoint(path)?;
        tracing::debug!(%url, "PUT");
        let mut builder = self.request(Method::PUT, url)?;
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.fetch_json(builder).await
    }

    async fn put_discarding<B: Serialize + ?Sized>(&self, path: &str, body: Option<&B>) -> Result<()> {
        let url = self.endpoint(path)?;
        tracing::debug!(%url, "PUT");
        let mut builder = self.request(Method::PUT, url)?;
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.execute(builder).await?;
        Ok(())
    }

    fn transport_error(&self, error: reqwest::Error) -> MesaError {
        if error.is_timeout() {
            MesaError::Timeout(self.timeout.as_secs())
        } else {
            MesaError::Http(error)
        }
    }
}

/// Ensure the base URL ends with a slash so relative joins keep its path.
fn normalize_base_url(base_url: &str) -> Result<Url> {
    let trimmed = base_url.trim();
    if trimmed.is_empty() {
        return Err(MesaError::Config("API base URL is empty".to_string()));
    }
    let mut url = Url::parse(trimmed)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Query-string parameters for `GET /tickets/buscar`.
pub fn search_params(query: &TicketQuery, page: PageRequest) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("page", page.index.to_string()),
        ("size", page.size.to_string()),
    ];

    if let Some(group) = &query.status_group
        && !group.statuses().is_empty()
    {
        params.push(("estados", group.to_param()));
    }
    if let Some(priority) = query.priority {
        params.push(("prioridad", priority.to_string()));
    }
    if let Some(document) = non_blank(&query.patient_document) {
        params.push(("dniPaciente", document));
    }
    if let Some(number) = non_blank(&query.ticket_number) {
        params.push(("numeroTicket", number));
    }
    if let Some(id) = query.assignee_id {
        params.push(("idPersonalAsignado", id.to_string()));
    }
    if let Some(name) = non_blank(&query.assignee_name) {
        params.push(("nombreAsignado", name));
    }
    if let Some(id) = query.doctor_id {
        params.push(("idMedico", id.to_string()));
    }
    if let Some(from) = query.created.from {
        params.push(("fechaDesde", from.to_string()));
    }
    if let Some(to) = query.created.to {
        params.push(("fechaHasta", to.to_string()));
    }
    if let Some(from) = query.attended.from {
        params.push(("fechaAtencionDesde", from.to_string()));
    }
    if let Some(to) = query.attended.to {
        params.push(("fechaAtencionHasta", to.to_string()));
    }

    params
}

#[derive(Serialize)]
struct AssignBody<'a> {
    #[serde(rename = "idPersonalAsignado")]
    staff_id: i64,
    #[serde(rename = "nombrePersonalAsignado")]
    staff_name: &'a str,
}

#[derive(Serialize)]
struct BulkAssignBody<'a> {
    #[serde(rename = "ticketIds")]
    ticket_ids: &'a [TicketId],
    #[serde(rename = "idPersonalAsignado")]
    staff_id: i64,
    #[serde(rename = "nombrePersonalAsignado")]
    staff_name: &'a str,
}

impl TicketGateway for HttpGateway {
    async fn search_tickets(&self, query: &TicketQuery, page: PageRequest) -> Result<TicketPage> {
        self.get("tickets/buscar", &search_params(query, page)).await
    }

    async fn list_all_for_dropdowns(&self, status_group: Option<&StatusGroup>) -> Result<Vec<Ticket>> {
        let params: Vec<(&str, String)> = status_group
            .filter(|g| !g.statuses().is_empty())
            .map(|g| vec![("estado", g.to_param())])
            .unwrap_or_default();
        self.get("tickets/all", &params).await
    }

    async fn list_assignable_staff(&self) -> Result<Vec<Staff>> {
        self.get("personal", &[]).await
    }

    async fn list_doctors_with_counts(&self) -> Result<Vec<DoctorCount>> {
        self.get("medicos-con-tickets", &[]).await
    }

    async fn list_response_templates(&self) -> Result<Vec<ResponseTemplate>> {
        let mut templates: Vec<ResponseTemplate> =
            self.get("respuestas-predefinidas", &[]).await?;
        templates.sort_by_key(|t| t.order);
        Ok(templates)
    }

    async fn assign(&self, ticket_id: TicketId, staff: &Staff) -> Result<()> {
        let body = AssignBody {
            staff_id: staff.id,
            staff_name: &staff.name,
        };
        self.put_discarding(&format!("tickets/{ticket_id}/asignar"), Some(&body))
            .await
    }

    async fn unassign(&self, ticket_id: TicketId) -> Result<()> {
        self.put_discarding::<()>(&format!("tickets/{ticket_id}/desasignar"), None)
            .await
    }

    async fn bulk_assign(&self, ticket_ids: &[TicketId], staff: &Staff) -> Result<BulkAssignOutcome> {
        let body = BulkAssignBody {
            ticket_ids,
            staff_id: staff.id,
            staff_name: &staff.name,
        };
        self.put("tickets/asignar-masivo", Some(&body)).await
    }

    async fn respond(&self, ticket_id: TicketId, response: &TicketResponse) -> Result<Ticket> {
        self.put(&format!("tickets/{ticket_id}/responder"), Some(response))
            .await
    }

    async fn update_phones(&self, ticket_id: TicketId, phones: &PhoneUpdate) -> Result<Ticket> {
        self.put(&format!("tickets/{ticket_id}/telefonos"), Some(phones))
            .await
    }
}
