//! Respond form: pick a predefined answer or write one, pick the new
//! status, submit.
//!
//! Free text is only enabled when the choice is [`TemplateChoice::Other`].
//! Validation runs locally; an invalid form never reaches the gateway.

use crate::error::{MesaError, Result};
use crate::gateway::TicketResponse;
use crate::types::{
    CurrentUser, RESPONSE_STATUSES, ResponseTemplate, Ticket, TicketId, TicketStatus,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateChoice {
    Predefined(i64),
    /// The "other" sentinel: the answer is free text.
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RespondPhase {
    #[default]
    Editing,
    Submitting,
    /// Answer recorded; the form closes after a short delay.
    Succeeded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RespondForm {
    pub ticket_id: TicketId,
    pub ticket_number: String,
    pub choice: Option<TemplateChoice>,
    pub free_text: String,
    pub target_status: Option<TicketStatus>,
    pub phase: RespondPhase,
    /// Validation or gateway error shown inside the form
    pub error: Option<String>,
}

impl RespondForm {
    pub fn new(ticket: &Ticket) -> Self {
        Self {
            ticket_number: ticket.display_number(),
            ..Self::blank(ticket.id)
        }
    }

    /// Form for a ticket known only by id.
    pub fn blank(ticket_id: TicketId) -> Self {
        Self {
            ticket_id,
            ticket_number: format!("#{ticket_id}"),
            choice: None,
            free_text: String::new(),
            target_status: None,
            phase: RespondPhase::Editing,
            error: None,
        }
    }

    pub fn free_text_enabled(&self) -> bool {
        self.choice == Some(TemplateChoice::Other)
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == RespondPhase::Submitting
    }

    /// Choose a predefined template. A template flagged as "other" selects
    /// free text instead.
    pub fn choose_template(&mut self, template_id: i64, templates: &[ResponseTemplate]) -> Result<()> {
        let template = templates
            .iter()
            .find(|t| t.id == template_id)
            .ok_or_else(|| {
                MesaError::InvalidResponse(format!("unknown response template {template_id}"))
            })?;
        self.choice = Some(if template.is_other {
            TemplateChoice::Other
        } else {
            TemplateChoice::Predefined(template.id)
        });
        Ok(())
    }

    pub fn choose_other(&mut self) {
        self.choice = Some(TemplateChoice::Other);
    }

    pub fn set_free_text(&mut self, text: String) -> Result<()> {
        if !self.free_text_enabled() {
            return Err(MesaError::InvalidResponse(
                "free text is only available with the 'other' choice".to_string(),
            ));
        }
        self.free_text = text;
        Ok(())
    }

    pub fn set_target_status(&mut self, status: TicketStatus) -> Result<()> {
        if !RESPONSE_STATUSES.contains(&status) {
            return Err(MesaError::InvalidResponse(format!(
                "a response can only move a ticket to {}",
                RESPONSE_STATUSES
                    .iter()
                    .map(|s| s.to_string())
                    .collect::<Vec<_>>()
                    .join(" or ")
            )));
        }
        self.target_status = Some(status);
        Ok(())
    }

    /// Check the form and build the answer to send.
    pub fn validate(
        &self,
        templates: &[ResponseTemplate],
        responder: &CurrentUser,
    ) -> Result<TicketResponse> {
        let text = match self.choice {
            None => {
                return Err(MesaError::InvalidResponse(
                    "select a predefined response".to_string(),
                ));
            }
            Some(TemplateChoice::Other) => {
                let text = self.free_text.trim();
                if text.is_empty() {
                    return Err(MesaError::InvalidResponse(
                        "write a response for the 'other' choice".to_string(),
                    ));
                }
                text.to_string()
            }
            Some(TemplateChoice::Predefined(id)) => templates
                .iter()
                .find(|t| t.id == id)
                .map(|t| t.description.clone())
                .ok_or_else(|| {
                    MesaError::InvalidResponse(format!("unknown response template {id}"))
                })?,
        };

        let status = self
            .target_status
            .filter(|s| RESPONSE_STATUSES.contains(s))
            .ok_or_else(|| MesaError::InvalidResponse("select the new status".to_string()))?;

        Ok(TicketResponse {
            text,
            status,
            responder_id: responder.id,
            responder_name: responder.name.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn templates() -> Vec<ResponseTemplate> {
        vec![
            ResponseTemplate {
                id: 1,
                code: "CITA_REPROGRAMADA".to_string(),
                description: "Se reprogramó la cita del paciente".to_string(),
                is_other: false,
                order: 1,
            },
            ResponseTemplate {
                id: 9,
                code: "OTROS".to_string(),
                description: "Otros".to_string(),
                is_other: true,
                order: 99,
            },
        ]
    }

    fn form() -> RespondForm {
        let ticket: Ticket = serde_json::from_value(serde_json::json!({
            "id": 12,
            "numeroTicket": "0012-2026",
            "estado": "NUEVO",
            "fechaCreacion": "2026-02-18T10:00:00",
        }))
        .unwrap();
        RespondForm::new(&ticket)
    }

    #[test]
    fn test_new_form_is_blank() {
        let form = form();
        assert_eq!(form.ticket_number, "0012-2026");
        assert!(form.choice.is_none());
        assert!(form.target_status.is_none());
        assert!(!form.free_text_enabled());
    }

    #[test]
    fn test_validate_requires_choice() {
        let err = form()
            .validate(&templates(), &CurrentUser::default())
            .unwrap_err();
        assert!(err.to_string().contains("predefined response"));
    }

    #[test]
    fn test_validate_other_requires_text() {
        let mut form = form();
        form.choose_other();
        form.set_target_status(TicketStatus::Resuelto).unwrap();
        form.set_free_text("   ".to_string()).unwrap();
        let err = form.validate(&templates(), &CurrentUser::default()).unwrap_err();
        assert!(err.to_string().contains("write a response"));
    }

    #[test]
    fn test_validate_requires_status() {
        let mut form = form();
        form.choose_template(1, &templates()).unwrap();
        let err = form.validate(&templates(), &CurrentUser::default()).unwrap_err();
        assert!(err.to_string().contains("status"));
    }

    #[test]
    fn test_free_text_disabled_for_predefined() {
        let mut form = form();
        form.choose_template(1, &templates()).unwrap();
        assert!(form.set_free_text("hola".to_string()).is_err());
        assert!(form.free_text.is_empty());
    }

    #[test]
    fn test_other_template_enables_free_text() {
        let mut form = form();
        form.choose_template(9, &templates()).unwrap();
        assert!(form.free_text_enabled());
        form.set_free_text("Paciente contactado por teléfono".to_string())
            .unwrap();
        form.set_target_status(TicketStatus::EnProceso).unwrap();

        let user = CurrentUser::new(5, "Ana Torres");
        let response = form.validate(&templates(), &user).unwrap();
        assert_eq!(response.text, "Paciente contactado por teléfono");
        assert_eq!(response.status, TicketStatus::EnProceso);
        assert_eq!(response.responder_id, 5);
        assert_eq!(response.responder_name, "Ana Torres");
    }

    #[test]
    fn test_predefined_uses_description() {
        let mut form = form();
        form.choose_template(1, &templates()).unwrap();
        form.set_target_status(TicketStatus::Resuelto).unwrap();
        let response = form.validate(&templates(), &CurrentUser::default()).unwrap();
        assert_eq!(response.text, "Se reprogramó la cita del paciente");
    }

    #[test]
    fn test_rejects_unknown_template_and_status() {
        let mut form = form();
        assert!(form.choose_template(77, &templates()).is_err());
        assert!(form.set_target_status(TicketStatus::Cerrado).is_err());
        assert!(form.set_target_status(TicketStatus::Nuevo).is_err());
    }
}
