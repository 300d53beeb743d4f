//! Note operations

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{NewNote, Note};
use crate::repository::Database;

impl Database {
    // ==================== Note Operations ====================

    /// Insert a new note
    pub async fn insert_note(&self, note: NewNote) -> Result<Note, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO notes (album_slug, title, content, date, author, is_public, likes,
                               created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, 0, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&note.album_slug)
        .bind(&note.title)
        .bind(&note.content)
        .bind(&note.date)
        .bind(&note.author)
        .bind(note.is_public)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await?;

        let id: i64 = result.get("id");

        Ok(Note {
            id,
            album_slug: note.album_slug,
            title: note.title,
            content: note.content,
            date: note.date,
            author: note.author,
            is_public: note.is_public,
            likes: 0,
            created_at: now,
            updated_at: now,
        })
    }

    /// List notes for an album, newest first
    pub async fn list_notes_for_album(
        &self,
        album_slug: &str,
        public_only: bool,
    ) -> Result<Vec<Note>, DbError> {
        let sql = if public_only {
            "SELECT * FROM notes WHERE album_slug = ? AND is_public = 1 ORDER BY created_at DESC"
        } else {
            "SELECT * FROM notes WHERE album_slug = ? ORDER BY created_at DESC"
        };
        let rows = sqlx::query(sql)
            .bind(album_slug)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| Note::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Delete all notes for an album, returning the number removed
    pub async fn delete_notes_for_album(&self, album_slug: &str) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM notes WHERE album_slug = ?")
            .bind(album_slug)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_database;

    fn sample_note(slug: &str, title: &str, is_public: bool) -> NewNote {
        NewNote {
            album_slug: slug.to_string(),
            title: title.to_string(),
            content: "line one\nline two".to_string(),
            date: "14/02/2024".to_string(),
            author: "admin".to_string(),
            is_public,
        }
    }

    #[tokio::test]
    async fn public_listing_hides_private_notes() {
        let db = test_database().await;
        db.insert_note(sample_note("a", "first", true)).await.unwrap();
        db.insert_note(sample_note("a", "secret", false)).await.unwrap();
        db.insert_note(sample_note("b", "other album", true))
            .await
            .unwrap();

        let public = db.list_notes_for_album("a", true).await.unwrap();
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].title, "first");
        assert_eq!(public[0].likes, 0);

        let all = db.list_notes_for_album("a", false).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn cascade_delete_removes_album_notes() {
        let db = test_database().await;
        db.insert_note(sample_note("gone", "one", true)).await.unwrap();
        db.insert_note(sample_note("gone", "two", true)).await.unwrap();
        db.insert_note(sample_note("kept", "three", true)).await.unwrap();

        let removed = db.delete_notes_for_album("gone").await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(db.list_notes_for_album("kept", false).await.unwrap().len(), 1);
    }
}
