//! Schema migrations.
//!
//! A small versioned runner: each migration carries `up` and `down`
//! statement lists, and applied versions are tracked in `schema_migrations`.
//! [`run_migrations`] applies everything pending (idempotent), and
//! [`revert_last`] rolls back the most recent version.
//!
//! Migration 1 creates the pgvector extension and the `legal_texts` table
//! with `VARCHAR(50)` section identifiers; migration 2 widens `section` and
//! `sub_section` to `VARCHAR(255)`. Reverting migration 2 restores
//! `VARCHAR(50)` exactly.

use sqlx::{PgPool, Row};

use crate::error::{Error, Result};

struct Migration {
    version: i64,
    name: &'static str,
    up: Vec<String>,
    down: Vec<String>,
}

/// The embedding dimension is baked into the column type, so the migration
/// list is built against the configured dimension.
fn migrations(dimension: usize) -> Vec<Migration> {
    vec![
        Migration {
            version: 1,
            name: "create_legal_texts",
            up: vec![
                "CREATE EXTENSION IF NOT EXISTS vector".to_string(),
                format!(
                    "CREATE TABLE legal_texts (
                        id BIGSERIAL PRIMARY KEY,
                        code VARCHAR(50) NOT NULL,
                        section VARCHAR(50) NOT NULL,
                        sub_section VARCHAR(50) NOT NULL DEFAULT '',
                        title TEXT,
                        text TEXT NOT NULL,
                        embedding VECTOR({}) NOT NULL,
                        updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                        UNIQUE (code, section, sub_section)
                    )",
                    dimension
                ),
                "CREATE INDEX idx_legal_texts_code ON legal_texts(code)".to_string(),
            ],
            down: vec!["DROP TABLE legal_texts".to_string()],
        },
        Migration {
            version: 2,
            name: "increase_section_column_sizes",
            up: vec![
                "ALTER TABLE legal_texts ALTER COLUMN section TYPE VARCHAR(255)".to_string(),
                "ALTER TABLE legal_texts ALTER COLUMN sub_section TYPE VARCHAR(255)".to_string(),
            ],
            down: vec![
                "ALTER TABLE legal_texts ALTER COLUMN sub_section TYPE VARCHAR(50)".to_string(),
                "ALTER TABLE legal_texts ALTER COLUMN section TYPE VARCHAR(50)".to_string(),
            ],
        },
    ]
}

async fn ensure_version_table(pool: &PgPool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version BIGINT PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn applied_versions(pool: &PgPool) -> Result<Vec<i64>> {
    let rows = sqlx::query("SELECT version FROM schema_migrations ORDER BY version")
        .fetch_all(pool)
        .await?;
    Ok(rows.iter().map(|r| r.get("version")).collect())
}

/// Apply all pending migrations. Safe to run repeatedly.
pub async fn run_migrations(pool: &PgPool, dimension: usize) -> Result<()> {
    ensure_version_table(pool).await?;
    let applied = applied_versions(pool).await?;

    for migration in migrations(dimension) {
        if applied.contains(&migration.version) {
            continue;
        }
        let mut tx = pool.begin().await?;
        for statement in &migration.up {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        sqlx::query("INSERT INTO schema_migrations (version, name) VALUES ($1, $2)")
            .bind(migration.version)
            .bind(migration.name)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        tracing::info!(
            version = migration.version,
            name = migration.name,
            "applied migration"
        );
    }
    Ok(())
}

/// Roll back the most recently applied migration, returning its version.
pub async fn revert_last(pool: &PgPool, dimension: usize) -> Result<i64> {
    ensure_version_table(pool).await?;
    let applied = applied_versions(pool).await?;
    let Some(&latest) = applied.last() else {
        return Err(Error::InvalidInput("no migrations to revert".into()));
    };

    let all = migrations(dimension);
    let migration = all
        .iter()
        .find(|m| m.version == latest)
        .ok_or_else(|| Error::Configuration(format!("unknown applied version {}", latest)))?;

    let mut tx = pool.begin().await?;
    for statement in &migration.down {
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    sqlx::query("DELETE FROM schema_migrations WHERE version = $1")
        .bind(migration.version)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    tracing::info!(
        version = migration.version,
        name = migration.name,
        "reverted migration"
    );
    Ok(migration.version)
}
