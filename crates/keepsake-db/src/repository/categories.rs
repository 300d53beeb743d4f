//! Category operations

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{Category, NewCategory};
use crate::repository::Database;

impl Database {
    // ==================== Category Operations ====================

    /// Insert a new category
    pub async fn insert_category(&self, category: NewCategory) -> Result<Category, DbError> {
        let now = Utc::now();

        let existing = self.get_category_by_slug(&category.slug).await?;
        if existing.is_some() {
            return Err(DbError::Duplicate(format!(
                "Category '{}' already exists",
                category.slug
            )));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO categories (name, slug, description, cover_image, album_slugs,
                                    is_active, sort_order, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&category.name)
        .bind(&category.slug)
        .bind(&category.description)
        .bind(&category.cover_image)
        .bind(serde_json::to_string(&category.album_slugs).unwrap_or_else(|_| "[]".into()))
        .bind(category.is_active)
        .bind(category.sort_order)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await?;

        let id: i64 = result.get("id");

        Ok(Category {
            id,
            name: category.name,
            slug: category.slug,
            description: category.description,
            cover_image: category.cover_image,
            album_slugs: category.album_slugs,
            is_active: category.is_active,
            sort_order: category.sort_order,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a category by slug
    pub async fn get_category_by_slug(&self, slug: &str) -> Result<Option<Category>, DbError> {
        let result = sqlx::query("SELECT * FROM categories WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        result
            .map(|row| Category::try_from(&row).map_err(DbError::from))
            .transpose()
    }

    /// List active categories ordered by sort_order
    pub async fn list_active_categories(&self) -> Result<Vec<Category>, DbError> {
        let rows = sqlx::query("SELECT * FROM categories WHERE is_active = 1 ORDER BY sort_order")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| Category::try_from(row).map_err(DbError::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_database;

    fn sample_category(slug: &str, sort_order: i64, is_active: bool) -> NewCategory {
        NewCategory {
            name: slug.to_uppercase(),
            slug: slug.to_string(),
            description: String::new(),
            cover_image: String::new(),
            album_slugs: vec!["one".to_string(), "two".to_string()],
            is_active,
            sort_order,
        }
    }

    #[tokio::test]
    async fn active_listing_is_ordered_and_filtered() {
        let db = test_database().await;
        db.insert_category(sample_category("travel", 2, true)).await.unwrap();
        db.insert_category(sample_category("wedding", 1, true)).await.unwrap();
        db.insert_category(sample_category("drafts", 0, false)).await.unwrap();

        let active = db.list_active_categories().await.unwrap();
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].slug, "wedding");
        assert_eq!(active[1].slug, "travel");
        assert_eq!(active[0].album_slugs.len(), 2);
    }

    #[tokio::test]
    async fn duplicate_category_slug_is_rejected() {
        let db = test_database().await;
        db.insert_category(sample_category("dup", 0, true)).await.unwrap();
        let err = db
            .insert_category(sample_category("dup", 1, true))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Duplicate(_)));
    }
}
