use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::models::{NewShow, Show, ShowPatch};

const SHOW_COLUMNS: &str = "id, title, date, time, description, image, ticket_link, location, created_at, updated_at";

/// Persistence for show records. Implementations must apply [`ShowPatch`] column by column
/// so that omitted fields keep their stored values.
#[async_trait]
pub trait ShowRepository: Send + Sync + 'static {
    async fn insert(&self, id: Uuid, show: &NewShow, image: Option<&str>) -> anyhow::Result<Show>;
    /// All shows by date, then creation time, then id.
    async fn list(&self) -> anyhow::Result<Vec<Show>>;
    async fn exists(&self, id: Uuid) -> anyhow::Result<bool>;
    /// `Ok(None)` when no show has this id.
    async fn update(&self, id: Uuid, patch: &ShowPatch) -> anyhow::Result<Option<Show>>;
    /// `Ok(false)` when no show has this id.
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
    async fn ping(&self) -> anyhow::Result<()>;
}

#[derive(Debug, Clone)]
pub struct PgShowRepository { pool: Pool<Postgres> }

impl PgShowRepository {
    pub fn new(pool: Pool<Postgres>) -> Self { Self { pool } }
}

#[async_trait]
impl ShowRepository for PgShowRepository {
    async fn insert(&self, id: Uuid, show: &NewShow, image: Option<&str>) -> anyhow::Result<Show> {
        let sql = format!("INSERT INTO shows (id, title, date, time, description, image, ticket_link, location) VALUES ($1,$2,$3,$4,$5,$6,$7,$8) RETURNING {SHOW_COLUMNS}");
        let rec = sqlx::query_as::<_, Show>(&sql)
            .bind(id)
            .bind(&show.title)
            .bind(show.date)
            .bind(&show.time)
            .bind(show.description.as_deref())
            .bind(image)
            .bind(show.ticket_link.as_deref())
            .bind(&show.location)
            .fetch_one(&self.pool).await?;
        Ok(rec)
    }

    async fn list(&self) -> anyhow::Result<Vec<Show>> {
        let sql = format!("SELECT {SHOW_COLUMNS} FROM shows ORDER BY date ASC, created_at ASC, id ASC");
        Ok(sqlx::query_as::<_, Show>(&sql).fetch_all(&self.pool).await?)
    }

    async fn exists(&self, id: Uuid) -> anyhow::Result<bool> {
        let found: Option<i32> = sqlx::query_scalar("SELECT 1 FROM shows WHERE id=$1")
            .bind(id)
            .fetch_optional(&self.pool).await?;
        Ok(found.is_some())
    }

    async fn update(&self, id: Uuid, patch: &ShowPatch) -> anyhow::Result<Option<Show>> {
        // Only supplied columns change; CASE flags distinguish "clear" from "keep" for nullable text.
        let sql = format!("UPDATE shows SET \
            title = COALESCE($2, title), \
            date = COALESCE($3, date), \
            time = COALESCE($4, time), \
            description = CASE WHEN $5 THEN $6 ELSE description END, \
            ticket_link = CASE WHEN $7 THEN $8 ELSE ticket_link END, \
            location = COALESCE($9, location), \
            image = COALESCE($10, image), \
            updated_at = now() \
            WHERE id = $1 RETURNING {SHOW_COLUMNS}");
        let rec = sqlx::query_as::<_, Show>(&sql)
            .bind(id)
            .bind(patch.title.as_deref())
            .bind(patch.date)
            .bind(patch.time.as_deref())
            .bind(patch.description.is_some())
            .bind(patch.description.clone().flatten())
            .bind(patch.ticket_link.is_some())
            .bind(patch.ticket_link.clone().flatten())
            .bind(patch.location.as_deref())
            .bind(patch.image.as_deref())
            .fetch_optional(&self.pool).await?;
        Ok(rec)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM shows WHERE id=$1").bind(id).execute(&self.pool).await?;
        Ok(res.rows_affected() > 0)
    }

    async fn ping(&self) -> anyhow::Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
