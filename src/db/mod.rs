pub mod models;

pub use models::*;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::config::DatabaseConfig;

pub type DbPool = PgPool;

/// Execute a SQL migration file, properly handling comments.
async fn execute_sql(pool: &PgPool, sql: &str) -> Result<()> {
    for statement in sql.split(';') {
        // Strip SQL comment lines (lines starting with --)
        let cleaned: String = statement
            .lines()
            .filter(|line| !line.trim().starts_with("--"))
            .collect::<Vec<_>>()
            .join("\n");
        let trimmed = cleaned.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(pool).await?;
        }
    }
    Ok(())
}

pub async fn init(config: &DatabaseConfig) -> Result<DbPool> {
    info!("Connecting to database");

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await?;

    run_migrations(&pool).await?;

    info!("Database initialized successfully");
    Ok(pool)
}

async fn run_migrations(pool: &PgPool) -> Result<()> {
    info!("Running database migrations...");

    // Migration 001: users, sessions, categories, contents.
    // The enum types have no IF NOT EXISTS form, so the type's presence
    // gates the whole file.
    let has_user_role: Option<(String,)> =
        sqlx::query_as("SELECT typname::text FROM pg_type WHERE typname = 'user_role'")
            .fetch_optional(pool)
            .await?;
    if has_user_role.is_none() {
        execute_sql(pool, include_str!("../../migrations/001_initial.sql")).await?;
    }

    // Migration 002: Bible corpus tables
    let has_testament: Option<(String,)> =
        sqlx::query_as("SELECT typname::text FROM pg_type WHERE typname = 'bible_testament'")
            .fetch_optional(pool)
            .await?;
    if has_testament.is_none() {
        execute_sql(pool, include_str!("../../migrations/002_bible.sql")).await?;
    }

    info!("Migrations completed");
    Ok(())
}
