// ABOUTME: Manager account database operations
// ABOUTME: Handles registration, lookup, and profile management for managers

use super::Database;
use crate::models::Manager;
use anyhow::{anyhow, Result};
use sqlx::Row;
use uuid::Uuid;

impl Database {
    /// Create the managers table
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The database schema migration fails
    /// - Table creation fails
    /// - Index creation fails
    pub(super) async fn migrate_managers(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS managers (
                id TEXT PRIMARY KEY,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                business_name TEXT NOT NULL,
                owner_name TEXT NOT NULL,
                phone TEXT,
                city TEXT,
                about TEXT,
                is_active BOOLEAN NOT NULL DEFAULT 1,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                last_active DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        // Create indexes
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_managers_email ON managers(email)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_managers_is_active ON managers(is_active)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Create a new manager account
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The email is already in use by another manager
    /// - Database operation fails
    pub async fn create_manager(&self, manager: &Manager) -> Result<Uuid> {
        let existing = self.get_manager_by_email(&manager.email).await?;
        if existing.is_some() {
            return Err(anyhow!("Email already in use by another manager"));
        }

        sqlx::query(
            r"
            INSERT INTO managers (
                id, email, password_hash, business_name, owner_name,
                phone, city, about, is_active, created_at, last_active
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ",
        )
        .bind(manager.id.to_string())
        .bind(&manager.email)
        .bind(&manager.password_hash)
        .bind(&manager.business_name)
        .bind(&manager.owner_name)
        .bind(&manager.phone)
        .bind(&manager.city)
        .bind(&manager.about)
        .bind(manager.is_active)
        .bind(manager.created_at)
        .bind(manager.last_active)
        .execute(&self.pool)
        .await?;

        Ok(manager.id)
    }

    /// Get a manager by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_manager(&self, manager_id: Uuid) -> Result<Option<Manager>> {
        self.get_manager_impl("id", &manager_id.to_string()).await
    }

    /// Get a manager by email
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_manager_by_email(&self, email: &str) -> Result<Option<Manager>> {
        self.get_manager_impl("email", email).await
    }

    /// Internal implementation for getting a manager
    async fn get_manager_impl(&self, field: &str, value: &str) -> Result<Option<Manager>> {
        let query = format!(
            r"
            SELECT id, email, password_hash, business_name, owner_name,
                   phone, city, about, is_active, created_at, last_active
            FROM managers WHERE {field} = $1
            "
        );

        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(row) = row {
            let manager = Self::row_to_manager(&row)?;
            Ok(Some(manager))
        } else {
            Ok(None)
        }
    }

    /// Convert a database row to a Manager struct
    fn row_to_manager(row: &sqlx::sqlite::SqliteRow) -> Result<Manager> {
        let id: String = row.get("id");

        Ok(Manager {
            id: Uuid::parse_str(&id)?,
            email: row.get("email"),
            password_hash: row.get("password_hash"),
            business_name: row.get("business_name"),
            owner_name: row.get("owner_name"),
            phone: row.get("phone"),
            city: row.get("city"),
            about: row.get("about"),
            is_active: row.get("is_active"),
            created_at: row.get("created_at"),
            last_active: row.get("last_active"),
        })
    }

    /// Update a manager's profile fields
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn update_manager(&self, manager: &Manager) -> Result<()> {
        sqlx::query(
            r"
            UPDATE managers SET
                business_name = $2,
                owner_name = $3,
                phone = $4,
                city = $5,
                about = $6,
                is_active = $7,
                last_active = CURRENT_TIMESTAMP
            WHERE id = $1
            ",
        )
        .bind(manager.id.to_string())
        .bind(&manager.business_name)
        .bind(&manager.owner_name)
        .bind(&manager.phone)
        .bind(&manager.city)
        .bind(&manager.about)
        .bind(manager.is_active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Update manager's last active timestamp
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn update_last_active(&self, manager_id: Uuid) -> Result<()> {
        sqlx::query("UPDATE managers SET last_active = CURRENT_TIMESTAMP WHERE id = $1")
            .bind(manager_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
