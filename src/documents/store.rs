//! Document persistence

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// A stored document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: String,
    pub title: String,
    pub html: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Listing entry without the markup payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: String,
    pub title: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Repository for document persistence
pub struct DocumentRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> DocumentRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or replace a document's markup
    pub async fn upsert(&self, id: &str, title: &str, html: &str) -> Result<StoredDocument> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO documents (id, title, html, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                html = excluded.html,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(html)
        .bind(&now)
        .bind(&now)
        .execute(self.pool)
        .await?;

        self.get(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("failed to fetch stored document {}", id))
    }

    /// Get a document by ID
    pub async fn get(&self, id: &str) -> Result<Option<StoredDocument>> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, title, html, created_at, updated_at
            FROM documents
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| r.into_document()).transpose()
    }

    /// List all documents, newest first
    pub async fn list(&self) -> Result<Vec<DocumentSummary>> {
        let rows = sqlx::query_as::<_, SummaryRow>(
            r#"
            SELECT id, title, updated_at
            FROM documents
            ORDER BY updated_at DESC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(|r| r.into_summary()).collect()
    }

    /// Delete a document
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: String,
    title: String,
    html: String,
    created_at: String,
    updated_at: String,
}

impl DocumentRow {
    fn into_document(self) -> Result<StoredDocument> {
        Ok(StoredDocument {
            id: self.id,
            title: self.title,
            html: self.html,
            created_at: DateTime::parse_from_rfc3339(&self.created_at)?.with_timezone(&Utc),
            updated_at: DateTime::parse_from_rfc3339(&self.updated_at)?.with_timezone(&Utc),
        })
    }
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    id: String,
    title: String,
    updated_at: String,
}

impl SummaryRow {
    fn into_summary(self) -> Result<DocumentSummary> {
        Ok(DocumentSummary {
            id: self.id,
            title: self.title,
            updated_at: DateTime::parse_from_rfc3339(&self.updated_at)?.with_timezone(&Utc),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test_db() -> SqlitePool {
        crate::db::create_pool("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_upsert_and_get() {
        let pool = setup_test_db().await;
        let repo = DocumentRepository::new(&pool);

        repo.upsert("doc-1", "A Paper", "<p>body</p>").await.unwrap();
        let doc = repo.get("doc-1").await.unwrap().unwrap();
        assert_eq!(doc.title, "A Paper");
        assert_eq!(doc.html, "<p>body</p>");

        // replace keeps the id stable
        repo.upsert("doc-1", "A Paper v2", "<p>new body</p>")
            .await
            .unwrap();
        let doc = repo.get("doc-1").await.unwrap().unwrap();
        assert_eq!(doc.title, "A Paper v2");
        assert_eq!(doc.html, "<p>new body</p>");
    }

    #[tokio::test]
    async fn test_list_and_delete() {
        let pool = setup_test_db().await;
        let repo = DocumentRepository::new(&pool);

        repo.upsert("doc-1", "One", "<p>1</p>").await.unwrap();
        repo.upsert("doc-2", "Two", "<p>2</p>").await.unwrap();
        assert_eq!(repo.list().await.unwrap().len(), 2);

        assert!(repo.delete("doc-1").await.unwrap());
        assert_eq!(repo.list().await.unwrap().len(), 1);
        assert!(!repo.delete("doc-1").await.unwrap());
    }
}
