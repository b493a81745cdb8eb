use std::sync::Arc;
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

use crate::{
    error::RegistryError,
    mailer::{send_mass, MailProvider, MassEmailReport},
    models::{normalize_emails, validate_name, EmailTemplate, RecipientList, TemplateInput},
    services::mailing::MailingRepository,
};

#[derive(Deserialize, Debug, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MassEmailRequest {
    #[serde(default)]
    pub emails: Vec<String>,
    /// Name of a saved recipient list merged into `emails`.
    pub list_name: Option<String>,
    pub subject: String,
    pub body: String,
}

/// Templates, recipient lists and the mass-email trigger.
#[derive(Clone)]
pub struct Mailing {
    repo: Arc<dyn MailingRepository>,
    provider: Arc<dyn MailProvider>,
    concurrency: usize,
}

impl Mailing {
    pub fn new(repo: Arc<dyn MailingRepository>, provider: Arc<dyn MailProvider>, concurrency: usize) -> Self {
        Self { repo, provider, concurrency }
    }

    pub async fn send_mass_email(&self, req: MassEmailRequest) -> Result<MassEmailReport, RegistryError> {
        if req.subject.trim().is_empty() { return Err(RegistryError::validation("subject is required")); }
        let mut raw = req.emails;
        if let Some(list_name) = req.list_name.as_deref().filter(|n| !n.trim().is_empty()) {
            let name = validate_name(list_name)?;
            let list = self.repo.get_list(&name).await?
                .ok_or_else(|| RegistryError::not_found(format!("Recipient list {name} not found")))?;
            raw.extend(list.emails);
        }
        let recipients = normalize_emails(raw)?;
        if recipients.is_empty() { return Err(RegistryError::validation("at least one recipient is required")); }
        let report = send_mass(self.provider.as_ref(), &recipients, &req.subject, &req.body, self.concurrency).await;
        info!(sent=report.sent, failed=report.failed.len(), "mass_email.completed");
        if report.sent == 0 {
            return Err(RegistryError::Provider(format!("all {} messages were rejected", report.failed.len())));
        }
        Ok(report)
    }

    pub async fn save_template(&self, name: &str, input: TemplateInput) -> Result<EmailTemplate, RegistryError> {
        let name = validate_name(name)?;
        if input.html.trim().is_empty() { return Err(RegistryError::validation("html is required")); }
        let tpl = self.repo.upsert_template(&name, &input).await?;
        info!(template=%name, "template.saved");
        Ok(tpl)
    }

    pub async fn templates(&self) -> Result<Vec<EmailTemplate>, RegistryError> { Ok(self.repo.list_templates().await?) }

    pub async fn delete_template(&self, name: &str) -> Result<(), RegistryError> {
        let name = validate_name(name)?;
        if !self.repo.delete_template(&name).await? { return Err(RegistryError::not_found(format!("Template {name} not found"))); }
        info!(template=%name, "template.deleted");
        Ok(())
    }

    pub async fn save_list(&self, name: &str, emails: Vec<String>) -> Result<RecipientList, RegistryError> {
        let name = validate_name(name)?;
        let emails = normalize_emails(emails)?;
        let list = self.repo.upsert_list(&name, &emails).await?;
        info!(list=%name, size=list.emails.len(), "recipient_list.saved");
        Ok(list)
    }

    pub async fn lists(&self) -> Result<Vec<RecipientList>, RegistryError> { Ok(self.repo.list_lists().await?) }

    pub async fn delete_list(&self, name: &str) -> Result<(), RegistryError> {
        let name = validate_name(name)?;
        if !self.repo.delete_list(&name).await? { return Err(RegistryError::not_found(format!("Recipient list {name} not found"))); }
        info!(list=%name, "recipient_list.deleted");
        Ok(())
    }
}
