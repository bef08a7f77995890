//! SQLite storage for annotations and highlights
//!
//! The anchor descriptor is persisted as an opaque JSON value; queries
//! only ever touch the record's own columns.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::anchor::AnchorDescriptor;

use super::types::{Annotation, CreateAnnotation, CreateHighlight, Highlight, HighlightColor};

/// Repository for annotation persistence
pub struct AnnotationRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AnnotationRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a new annotation and return the durable record
    pub async fn create(&self, data: &CreateAnnotation) -> Result<Annotation> {
        let annotation = Annotation {
            id: uuid::Uuid::new_v4().to_string(),
            document_id: data.document_id.clone(),
            author_id: data.author_id.clone(),
            anchor: data.anchor.clone(),
            selected_text: data.selected_text.clone(),
            comment: data.comment.clone(),
            created_at: Utc::now(),
        };
        let anchor_json = serde_json::to_string(&annotation.anchor)?;

        sqlx::query(
            r#"
            INSERT INTO annotations (id, document_id, author_id, selected_text, comment, anchor_json, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&annotation.id)
        .bind(&annotation.document_id)
        .bind(&annotation.author_id)
        .bind(&annotation.selected_text)
        .bind(&annotation.comment)
        .bind(&anchor_json)
        .bind(annotation.created_at.to_rfc3339())
        .execute(self.pool)
        .await?;

        Ok(annotation)
    }

    /// Get an annotation by ID
    pub async fn get(&self, id: &str) -> Result<Option<Annotation>> {
        let row = sqlx::query_as::<_, AnnotationRow>(
            r#"
            SELECT id, document_id, author_id, selected_text, comment, anchor_json, created_at
            FROM annotations
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| r.into_annotation()).transpose()
    }

    /// List annotations for a document, optionally scoped to an author
    pub async fn list_for_document(
        &self,
        document_id: &str,
        author_id: Option<&str>,
    ) -> Result<Vec<Annotation>> {
        let rows = match author_id {
            Some(author) => {
                sqlx::query_as::<_, AnnotationRow>(
                    r#"
                    SELECT id, document_id, author_id, selected_text, comment, anchor_json, created_at
                    FROM annotations
                    WHERE document_id = ? AND author_id = ?
                    ORDER BY created_at ASC
                    "#,
                )
                .bind(document_id)
                .bind(author)
                .fetch_all(self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, AnnotationRow>(
                    r#"
                    SELECT id, document_id, author_id, selected_text, comment, anchor_json, created_at
                    FROM annotations
                    WHERE document_id = ?
                    ORDER BY created_at ASC
                    "#,
                )
                .bind(document_id)
                .fetch_all(self.pool)
                .await?
            }
        };

        rows.into_iter().map(|r| r.into_annotation()).collect()
    }

    /// Delete an annotation
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM annotations WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete all annotations for a document
    pub async fn delete_for_document(&self, document_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM annotations WHERE document_id = ?")
            .bind(document_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Count annotations for a document
    pub async fn count_for_document(&self, document_id: &str) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM annotations WHERE document_id = ?")
            .bind(document_id)
            .fetch_one(self.pool)
            .await?;

        Ok(row.0)
    }
}

/// Repository for highlight persistence
pub struct HighlightRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> HighlightRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a new highlight and return the durable record
    pub async fn create(&self, data: &CreateHighlight) -> Result<Highlight> {
        let highlight = Highlight {
            id: uuid::Uuid::new_v4().to_string(),
            document_id: data.document_id.clone(),
            author_id: data.author_id.clone(),
            anchor: data.anchor.clone(),
            selected_text: data.selected_text.clone(),
            color: data.color.unwrap_or_default(),
            created_at: Utc::now(),
        };
        let anchor_json = serde_json::to_string(&highlight.anchor)?;

        sqlx::query(
            r#"
            INSERT INTO highlights (id, document_id, author_id, selected_text, color, anchor_json, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&highlight.id)
        .bind(&highlight.document_id)
        .bind(&highlight.author_id)
        .bind(&highlight.selected_text)
        .bind(highlight.color.as_str())
        .bind(&anchor_json)
        .bind(highlight.created_at.to_rfc3339())
        .execute(self.pool)
        .await?;

        Ok(highlight)
    }

    /// Get a highlight by ID
    pub async fn get(&self, id: &str) -> Result<Option<Highlight>> {
        let row = sqlx::query_as::<_, HighlightRow>(
            r#"
            SELECT id, document_id, author_id, selected_text, color, anchor_json, created_at
            FROM highlights
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| r.into_highlight()).transpose()
    }

    /// List highlights for a document, optionally scoped to an author
    pub async fn list_for_document(
        &self,
        document_id: &str,
        author_id: Option<&str>,
    ) -> Result<Vec<Highlight>> {
        let rows = match author_id {
            Some(author) => {
                sqlx::query_as::<_, HighlightRow>(
                    r#"
                    SELECT id, document_id, author_id, selected_text, color, anchor_json, created_at
                    FROM highlights
                    WHERE document_id = ? AND author_id = ?
                    ORDER BY created_at ASC
                    "#,
                )
                .bind(document_id)
                .bind(author)
                .fetch_all(self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, HighlightRow>(
                    r#"
                    SELECT id, document_id, author_id, selected_text, color, anchor_json, created_at
                    FROM highlights
                    WHERE document_id = ?
                    ORDER BY created_at ASC
                    "#,
                )
                .bind(document_id)
                .fetch_all(self.pool)
                .await?
            }
        };

        rows.into_iter().map(|r| r.into_highlight()).collect()
    }

    /// Delete a highlight
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM highlights WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete all highlights for a document
    pub async fn delete_for_document(&self, document_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM highlights WHERE document_id = ?")
            .bind(document_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Count highlights for a document
    pub async fn count_for_document(&self, document_id: &str) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM highlights WHERE document_id = ?")
            .bind(document_id)
            .fetch_one(self.pool)
            .await?;

        Ok(row.0)
    }
}

/// Internal row type for SQLite queries
#[derive(sqlx::FromRow)]
struct AnnotationRow {
    id: String,
    document_id: String,
    author_id: Option<String>,
    selected_text: String,
    comment: String,
    anchor_json: String,
    created_at: String,
}

impl AnnotationRow {
    fn into_annotation(self) -> Result<Annotation> {
        let anchor: AnchorDescriptor = serde_json::from_str(&self.anchor_json)?;
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)?.with_timezone(&Utc);

        Ok(Annotation {
            id: self.id,
            document_id: self.document_id,
            author_id: self.author_id,
            anchor,
            selected_text: self.selected_text,
            comment: self.comment,
            created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct HighlightRow {
    id: String,
    document_id: String,
    author_id: Option<String>,
    selected_text: String,
    color: String,
    anchor_json: String,
    created_at: String,
}

impl HighlightRow {
    fn into_highlight(self) -> Result<Highlight> {
        let anchor: AnchorDescriptor = serde_json::from_str(&self.anchor_json)?;
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)?.with_timezone(&Utc);

        Ok(Highlight {
            id: self.id,
            document_id: self.document_id,
            author_id: self.author_id,
            anchor,
            selected_text: self.selected_text,
            color: HighlightColor::parse(&self.color).unwrap_or_default(),
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor() -> AnchorDescriptor {
        AnchorDescriptor {
            container_tag_name: "p".to_string(),
            container_snapshot_html: "<p>say hello world!</p>".to_string(),
            text_content: "say hello world!".to_string(),
            start_offset: 4,
            end_offset: 15,
        }
    }

    fn create_annotation(document_id: &str) -> CreateAnnotation {
        CreateAnnotation {
            document_id: document_id.to_string(),
            author_id: Some("user-1".to_string()),
            selected_text: "hello world".to_string(),
            comment: "a note".to_string(),
            anchor: anchor(),
        }
    }

    fn create_highlight(document_id: &str) -> CreateHighlight {
        CreateHighlight {
            document_id: document_id.to_string(),
            author_id: Some("user-1".to_string()),
            selected_text: "hello world".to_string(),
            color: Some(HighlightColor::Blue),
            anchor: anchor(),
        }
    }

    async fn setup_test_db() -> SqlitePool {
        crate::db::create_pool("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get_annotation() {
        let pool = setup_test_db().await;
        let repo = AnnotationRepository::new(&pool);

        let created = repo.create(&create_annotation("doc-1")).await.unwrap();
        let loaded = repo.get(&created.id).await.unwrap().unwrap();

        assert_eq!(loaded.document_id, "doc-1");
        assert_eq!(loaded.comment, "a note");
        assert_eq!(loaded.anchor, anchor());
    }

    #[tokio::test]
    async fn test_list_scoped_by_document_and_author() {
        let pool = setup_test_db().await;
        let repo = AnnotationRepository::new(&pool);

        for _ in 0..3 {
            repo.create(&create_annotation("doc-a")).await.unwrap();
        }
        let mut other = create_annotation("doc-a");
        other.author_id = Some("user-2".to_string());
        repo.create(&other).await.unwrap();
        repo.create(&create_annotation("doc-b")).await.unwrap();

        assert_eq!(repo.list_for_document("doc-a", None).await.unwrap().len(), 4);
        assert_eq!(
            repo.list_for_document("doc-a", Some("user-1"))
                .await
                .unwrap()
                .len(),
            3
        );
        assert_eq!(repo.list_for_document("doc-b", None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_annotation() {
        let pool = setup_test_db().await;
        let repo = AnnotationRepository::new(&pool);

        let created = repo.create(&create_annotation("doc-1")).await.unwrap();
        assert!(repo.delete(&created.id).await.unwrap());
        assert!(repo.get(&created.id).await.unwrap().is_none());
        assert!(!repo.delete(&created.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_highlight_round_trip_preserves_color() {
        let pool = setup_test_db().await;
        let repo = HighlightRepository::new(&pool);

        let created = repo.create(&create_highlight("doc-1")).await.unwrap();
        let loaded = repo.get(&created.id).await.unwrap().unwrap();

        assert_eq!(loaded.color, HighlightColor::Blue);
        assert_eq!(loaded.anchor, anchor());
    }

    #[tokio::test]
    async fn test_bulk_delete_for_document() {
        let pool = setup_test_db().await;
        let annotations = AnnotationRepository::new(&pool);
        let highlights = HighlightRepository::new(&pool);

        for _ in 0..2 {
            annotations.create(&create_annotation("doc-a")).await.unwrap();
            highlights.create(&create_highlight("doc-a")).await.unwrap();
        }
        annotations.create(&create_annotation("doc-b")).await.unwrap();

        assert_eq!(annotations.delete_for_document("doc-a").await.unwrap(), 2);
        assert_eq!(highlights.delete_for_document("doc-a").await.unwrap(), 2);

        assert_eq!(annotations.count_for_document("doc-a").await.unwrap(), 0);
        assert_eq!(highlights.count_for_document("doc-a").await.unwrap(), 0);
        assert_eq!(annotations.count_for_document("doc-b").await.unwrap(), 1);
    }
}
