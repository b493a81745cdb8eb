use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, Pool, Postgres};
use std::time::Duration;
use tracing::info;

const MAX_CONNECTIONS: u32 = 5;

/// Connect to the show store and apply the embedded migrations.
pub async fn init_db(database_url: &str) -> anyhow::Result<Pool<Postgres>> {
    let pool = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(Duration::from_secs(3))
        .connect(database_url)
        .await
        .context("connect to show store")?;
    sqlx::migrate!().run(&pool).await.context("apply show store migrations")?;
    info!(max_connections = MAX_CONNECTIONS, "show_store.ready");
    Ok(pool)
}
