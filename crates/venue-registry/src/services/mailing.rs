use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::models::{EmailTemplate, RecipientList, TemplateInput};

/// Keyed storage for email templates and recipient lists.
#[async_trait]
pub trait MailingRepository: Send + Sync + 'static {
    async fn upsert_template(&self, name: &str, input: &TemplateInput) -> anyhow::Result<EmailTemplate>;
    async fn list_templates(&self) -> anyhow::Result<Vec<EmailTemplate>>;
    async fn delete_template(&self, name: &str) -> anyhow::Result<bool>;
    async fn upsert_list(&self, name: &str, emails: &[String]) -> anyhow::Result<RecipientList>;
    async fn get_list(&self, name: &str) -> anyhow::Result<Option<RecipientList>>;
    async fn list_lists(&self) -> anyhow::Result<Vec<RecipientList>>;
    async fn delete_list(&self, name: &str) -> anyhow::Result<bool>;
}

#[derive(Debug, Clone)]
pub struct PgMailingRepository { pool: Pool<Postgres> }

impl PgMailingRepository {
    pub fn new(pool: Pool<Postgres>) -> Self { Self { pool } }
}

#[async_trait]
impl MailingRepository for PgMailingRepository {
    async fn upsert_template(&self, name: &str, input: &TemplateInput) -> anyhow::Result<EmailTemplate> {
        Ok(sqlx::query_as::<_, EmailTemplate>(
            "INSERT INTO email_templates (name, subject, html, design) VALUES ($1,$2,$3,$4) \
             ON CONFLICT (name) DO UPDATE SET subject=EXCLUDED.subject, html=EXCLUDED.html, design=EXCLUDED.design, updated_at=now() \
             RETURNING name, subject, html, design, updated_at")
            .bind(name)
            .bind(input.subject.as_deref())
            .bind(&input.html)
            .bind(input.design.as_ref())
            .fetch_one(&self.pool).await?)
    }

    async fn list_templates(&self) -> anyhow::Result<Vec<EmailTemplate>> {
        Ok(sqlx::query_as::<_, EmailTemplate>("SELECT name, subject, html, design, updated_at FROM email_templates ORDER BY name")
            .fetch_all(&self.pool).await?)
    }

    async fn delete_template(&self, name: &str) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM email_templates WHERE name=$1").bind(name).execute(&self.pool).await?;
        Ok(res.rows_affected() > 0)
    }

    async fn upsert_list(&self, name: &str, emails: &[String]) -> anyhow::Result<RecipientList> {
        Ok(sqlx::query_as::<_, RecipientList>(
            "INSERT INTO recipient_lists (name, emails) VALUES ($1,$2) \
             ON CONFLICT (name) DO UPDATE SET emails=EXCLUDED.emails, updated_at=now() \
             RETURNING name, emails, updated_at")
            .bind(name)
            .bind(emails)
            .fetch_one(&self.pool).await?)
    }

    async fn get_list(&self, name: &str) -> anyhow::Result<Option<RecipientList>> {
        Ok(sqlx::query_as::<_, RecipientList>("SELECT name, emails, updated_at FROM recipient_lists WHERE name=$1")
            .bind(name)
            .fetch_optional(&self.pool).await?)
    }

    async fn list_lists(&self) -> anyhow::Result<Vec<RecipientList>> {
        Ok(sqlx::query_as::<_, RecipientList>("SELECT name, emails, updated_at FROM recipient_lists ORDER BY name")
            .fetch_all(&self.pool).await?)
    }

    async fn delete_list(&self, name: &str) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM recipient_lists WHERE name=$1").bind(name).execute(&self.pool).await?;
        Ok(res.rows_affected() > 0)
    }
}
