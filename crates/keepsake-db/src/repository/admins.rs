//! Admin account operations

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{Admin, NewAdmin};
use crate::repository::Database;

impl Database {
    // ==================== Admin Operations ====================

    /// Insert a new admin account
    pub async fn insert_admin(&self, admin: NewAdmin) -> Result<Admin, DbError> {
        let now = Utc::now();

        let existing = self.get_admin_by_account(&admin.account).await?;
        if existing.is_some() {
            return Err(DbError::Duplicate(format!(
                "Admin '{}' already exists",
                admin.account
            )));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO admins (account, password_hash, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&admin.account)
        .bind(&admin.password_hash)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await?;

        let id: i64 = result.get("id");

        Ok(Admin {
            id,
            account: admin.account,
            password_hash: admin.password_hash,
            created_at: now,
            updated_at: now,
            last_login: None,
        })
    }

    /// Get an admin by account name
    pub async fn get_admin_by_account(&self, account: &str) -> Result<Option<Admin>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, account, password_hash, created_at, updated_at, last_login
            FROM admins
            WHERE account = ?
            "#,
        )
        .bind(account)
        .fetch_optional(&self.pool)
        .await?;

        result
            .map(|row| Admin::try_from(&row).map_err(DbError::from))
            .transpose()
    }

    /// Record a successful login
    pub async fn touch_admin_login(&self, id: i64) -> Result<(), DbError> {
        let now = Utc::now();
        sqlx::query("UPDATE admins SET last_login = ?, updated_at = ? WHERE id = ?")
            .bind(now.to_rfc3339())
            .bind(now.to_rfc3339())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Check if any admin accounts exist
    pub async fn has_admins(&self) -> Result<bool, DbError> {
        let result = sqlx::query("SELECT COUNT(*) as count FROM admins")
            .fetch_one(&self.pool)
            .await?;
        let count: i64 = result.get("count");
        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_database;

    #[tokio::test]
    async fn insert_lookup_and_touch_login() {
        let db = test_database().await;
        assert!(!db.has_admins().await.unwrap());

        let admin = db
            .insert_admin(NewAdmin {
                account: "admin".to_string(),
                password_hash: "$argon2id$stub".to_string(),
            })
            .await
            .unwrap();
        assert!(db.has_admins().await.unwrap());
        assert!(admin.last_login.is_none());

        db.touch_admin_login(admin.id).await.unwrap();
        let fetched = db.get_admin_by_account("admin").await.unwrap().unwrap();
        assert!(fetched.last_login.is_some());

        let err = db
            .insert_admin(NewAdmin {
                account: "admin".to_string(),
                password_hash: "other".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Duplicate(_)));
    }
}
