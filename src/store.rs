//! Persistence and similarity search over `legal_texts`.
//!
//! The similarity metric is cosine distance via pgvector's `<=>` operator,
//! fixed for the lifetime of a dataset — the search cutoff range 0–2 is the
//! codomain of that metric. Ties are broken by `id` ascending so results are
//! deterministic for a fixed dataset.

use pgvector::Vector;
use sqlx::{PgPool, Row};

use crate::error::Result;
use crate::models::{LegalText, SearchHit};

pub struct LegalTextStore {
    pool: PgPool,
}

impl LegalTextStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Distinct legal-code identifiers currently stored, sorted, no
    /// duplicates.
    pub async fn list_codes(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT DISTINCT code FROM legal_texts ORDER BY code")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(|r| r.get("code")).collect())
    }

    /// Similarity search: up to `limit` records ordered by cosine distance
    /// ascending, excluding rows whose distance exceeds `cutoff`, optionally
    /// restricted to one code.
    pub async fn search(
        &self,
        query_vector: Vec<f32>,
        code: Option<&str>,
        limit: i64,
        cutoff: f64,
    ) -> Result<Vec<SearchHit>> {
        let vector = Vector::from(query_vector);
        let rows = sqlx::query(
            "SELECT code, section, sub_section, title, text,
                    (embedding <=> $1)::float8 AS distance
             FROM legal_texts
             WHERE ($2::text IS NULL OR code = $2)
               AND (embedding <=> $1) <= $3
             ORDER BY embedding <=> $1 ASC, id ASC
             LIMIT $4",
        )
        .bind(&vector)
        .bind(code)
        .bind(cutoff)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let hits = rows
            .iter()
            .map(|row| SearchHit {
                code: row.get("code"),
                section: row.get("section"),
                sub_section: row.get("sub_section"),
                title: row.get("title"),
                text: row.get("text"),
                distance: row.get("distance"),
            })
            .collect();
        Ok(hits)
    }

    /// Exact-match lookup of one section. A section may have multiple
    /// sub-sections; all of them are returned, ordered by sub-section. An
    /// empty result is not an error here — the API layer decides how to
    /// surface it.
    pub async fn get_section(&self, code: &str, section: &str) -> Result<Vec<LegalText>> {
        let rows = sqlx::query(
            "SELECT code, section, sub_section, title, text
             FROM legal_texts
             WHERE code = $1 AND section = $2
             ORDER BY sub_section, id",
        )
        .bind(code)
        .bind(section)
        .fetch_all(&self.pool)
        .await?;

        let texts = rows
            .iter()
            .map(|row| LegalText {
                code: row.get("code"),
                section: row.get("section"),
                sub_section: row.get("sub_section"),
                title: row.get("title"),
                text: row.get("text"),
            })
            .collect();
        Ok(texts)
    }

    /// Insert or update one record on the `(code, section, sub_section)`
    /// key. Re-imports update in place rather than duplicating rows.
    pub async fn upsert(&self, record: &LegalText, embedding: Vec<f32>) -> Result<()> {
        sqlx::query(
            "INSERT INTO legal_texts (code, section, sub_section, title, text, embedding, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (code, section, sub_section) DO UPDATE SET
                 title = EXCLUDED.title,
                 text = EXCLUDED.text,
                 embedding = EXCLUDED.embedding,
                 updated_at = EXCLUDED.updated_at",
        )
        .bind(&record.code)
        .bind(&record.section)
        .bind(&record.sub_section)
        .bind(&record.title)
        .bind(&record.text)
        .bind(Vector::from(embedding))
        .bind(chrono::Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrate;

    /// DB-backed tests run only when LEGAL_TEST_DATABASE_URL points at a
    /// Postgres instance with the pgvector extension available.
    async fn test_store() -> Option<LegalTextStore> {
        let url = std::env::var("LEGAL_TEST_DATABASE_URL").ok()?;
        let pool = PgPool::connect(&url).await.expect("test database");
        migrate::run_migrations(&pool, 3).await.unwrap();
        Some(LegalTextStore::new(pool))
    }

    fn record(code: &str, section: &str, sub_section: &str, text: &str) -> LegalText {
        LegalText {
            code: code.to_string(),
            section: section.to_string(),
            sub_section: sub_section.to_string(),
            title: None,
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_search_ordering_cutoff_and_code_filter() {
        let _guard = crate::test_support::db_lock();
        let Some(store) = test_store().await else {
            return;
        };
        sqlx::query("DELETE FROM legal_texts")
            .execute(store.pool())
            .await
            .unwrap();

        // Unit vectors at known cosine distances from [1, 0, 0]
        store
            .upsert(&record("bgb", "§ 1", "", "identisch"), vec![1.0, 0.0, 0.0])
            .await
            .unwrap();
        store
            .upsert(&record("bgb", "§ 2", "", "orthogonal"), vec![0.0, 1.0, 0.0])
            .await
            .unwrap();
        store
            .upsert(
                &record("bgb", "§ 3", "", "entgegengesetzt"),
                vec![-1.0, 0.0, 0.0],
            )
            .await
            .unwrap();
        store
            .upsert(&record("stgb", "§ 1", "", "anderes Gesetz"), vec![1.0, 0.0, 0.0])
            .await
            .unwrap();

        let query = vec![1.0, 0.0, 0.0];

        // Cutoff 1.5 excludes the opposite vector (distance 2.0)
        let hits = store
            .search(query.clone(), Some("bgb"), 5, 1.5)
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].section, "§ 1");
        assert!(hits[0].distance < 1e-6);
        assert_eq!(hits[1].section, "§ 2");
        assert!((hits[1].distance - 1.0).abs() < 1e-6);
        assert!(hits.iter().all(|h| h.code == "bgb"));
        assert!(hits.iter().all(|h| h.distance <= 1.5));

        // Limit truncates after ordering
        let hits = store
            .search(query.clone(), Some("bgb"), 1, 2.0)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].section, "§ 1");

        // No code filter searches all codes
        let hits = store.search(query, None, 10, 0.1).await.unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn test_list_codes_no_duplicates() {
        let _guard = crate::test_support::db_lock();
        let Some(store) = test_store().await else {
            return;
        };
        sqlx::query("DELETE FROM legal_texts")
            .execute(store.pool())
            .await
            .unwrap();

        store
            .upsert(&record("bgb", "§ 1", "", "a"), vec![1.0, 0.0, 0.0])
            .await
            .unwrap();
        store
            .upsert(&record("bgb", "§ 2", "", "b"), vec![0.0, 1.0, 0.0])
            .await
            .unwrap();
        store
            .upsert(&record("stgb", "§ 1", "", "c"), vec![0.0, 0.0, 1.0])
            .await
            .unwrap();

        let codes = store.list_codes().await.unwrap();
        assert_eq!(codes, vec!["bgb".to_string(), "stgb".to_string()]);
    }

    #[tokio::test]
    async fn test_get_section_returns_all_sub_sections() {
        let _guard = crate::test_support::db_lock();
        let Some(store) = test_store().await else {
            return;
        };
        sqlx::query("DELETE FROM legal_texts")
            .execute(store.pool())
            .await
            .unwrap();

        store
            .upsert(&record("bgb", "§ 1", "", "Hauptabschnitt"), vec![1.0, 0.0, 0.0])
            .await
            .unwrap();
        store
            .upsert(&record("bgb", "§ 1", "1", "Absatz 1"), vec![0.0, 1.0, 0.0])
            .await
            .unwrap();

        let texts = store.get_section("bgb", "§ 1").await.unwrap();
        assert_eq!(texts.len(), 2);
        assert_eq!(texts[0].sub_section, "");
        assert_eq!(texts[1].sub_section, "1");

        // Absent section is an empty result, not an error
        let texts = store.get_section("bgb", "§ 999").await.unwrap();
        assert!(texts.is_empty());
    }

    #[tokio::test]
    async fn test_upsert_updates_in_place() {
        let _guard = crate::test_support::db_lock();
        let Some(store) = test_store().await else {
            return;
        };
        sqlx::query("DELETE FROM legal_texts")
            .execute(store.pool())
            .await
            .unwrap();

        store
            .upsert(&record("bgb", "§ 90", "", "alt"), vec![1.0, 0.0, 0.0])
            .await
            .unwrap();
        store
            .upsert(&record("bgb", "§ 90", "", "neu"), vec![0.0, 1.0, 0.0])
            .await
            .unwrap();

        let texts = store.get_section("bgb", "§ 90").await.unwrap();
        assert_eq!(texts.len(), 1);
        assert_eq!(texts[0].text, "neu");
    }
}
