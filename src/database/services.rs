// ABOUTME: Service catalog database operations
// ABOUTME: Handles CRUD for the services each manager offers and active-set validation

use super::Database;
use crate::models::ServiceOffering;
use anyhow::Result;
use sqlx::Row;
use uuid::Uuid;

impl Database {
    /// Create the services table
    ///
    /// # Errors
    ///
    /// Returns an error if table or index creation fails
    pub(super) async fn migrate_services(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS services (
                id TEXT PRIMARY KEY,
                manager_id TEXT NOT NULL REFERENCES managers(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                category TEXT NOT NULL,
                description TEXT,
                price REAL NOT NULL,
                is_active BOOLEAN NOT NULL DEFAULT 1,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_services_manager ON services(manager_id)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_services_manager_active ON services(manager_id, is_active)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Create a new service offering
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn create_service(&self, service: &ServiceOffering) -> Result<Uuid> {
        sqlx::query(
            r"
            INSERT INTO services (
                id, manager_id, name, category, description, price, is_active, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(service.id.to_string())
        .bind(service.manager_id.to_string())
        .bind(&service.name)
        .bind(&service.category)
        .bind(&service.description)
        .bind(service.price)
        .bind(service.is_active)
        .bind(service.created_at)
        .execute(&self.pool)
        .await?;

        Ok(service.id)
    }

    /// Get a single service scoped to its owning manager
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_service(
        &self,
        service_id: Uuid,
        manager_id: Uuid,
    ) -> Result<Option<ServiceOffering>> {
        let row = sqlx::query(
            r"
            SELECT id, manager_id, name, category, description, price, is_active, created_at
            FROM services WHERE id = $1 AND manager_id = $2
            ",
        )
        .bind(service_id.to_string())
        .bind(manager_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| Self::row_to_service(&row)).transpose()
    }

    /// List a manager's services, optionally restricted to active ones
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_services(
        &self,
        manager_id: Uuid,
        only_active: bool,
    ) -> Result<Vec<ServiceOffering>> {
        let mut sql = String::from(
            r"
            SELECT id, manager_id, name, category, description, price, is_active, created_at
            FROM services WHERE manager_id = $1
            ",
        );
        if only_active {
            sql.push_str(" AND is_active = 1");
        }
        sql.push_str(" ORDER BY created_at DESC");

        let rows = sqlx::query(&sql)
            .bind(manager_id.to_string())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::row_to_service).collect()
    }

    /// Update a service's mutable fields
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn update_service(&self, service: &ServiceOffering) -> Result<u64> {
        let result = sqlx::query(
            r"
            UPDATE services SET
                name = $3,
                category = $4,
                description = $5,
                price = $6,
                is_active = $7
            WHERE id = $1 AND manager_id = $2
            ",
        )
        .bind(service.id.to_string())
        .bind(service.manager_id.to_string())
        .bind(&service.name)
        .bind(&service.category)
        .bind(&service.description)
        .bind(service.price)
        .bind(service.is_active)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Deactivate a service so it can no longer be booked
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn deactivate_service(&self, service_id: Uuid, manager_id: Uuid) -> Result<u64> {
        let result =
            sqlx::query("UPDATE services SET is_active = 0 WHERE id = $1 AND manager_id = $2")
                .bind(service_id.to_string())
                .bind(manager_id.to_string())
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }

    /// Count how many of the given service ids are active and owned by the manager
    ///
    /// Used by booking creation to detect foreign, inactive, or unknown
    /// service references in one query.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn count_active_services(
        &self,
        manager_id: Uuid,
        service_ids: &[Uuid],
    ) -> Result<i64> {
        if service_ids.is_empty() {
            return Ok(0);
        }

        let placeholders = (0..service_ids.len())
            .map(|i| format!("${}", i + 2))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT COUNT(DISTINCT id) FROM services
             WHERE manager_id = $1 AND is_active = 1 AND id IN ({placeholders})"
        );

        let mut query = sqlx::query_scalar(&sql).bind(manager_id.to_string());
        for id in service_ids {
            query = query.bind(id.to_string());
        }

        let count = query.fetch_one(&self.pool).await?;
        Ok(count)
    }

    /// Convert a database row to a `ServiceOffering` struct
    fn row_to_service(row: &sqlx::sqlite::SqliteRow) -> Result<ServiceOffering> {
        let id: String = row.get("id");
        let manager_id: String = row.get("manager_id");

        Ok(ServiceOffering {
            id: Uuid::parse_str(&id)?,
            manager_id: Uuid::parse_str(&manager_id)?,
            name: row.get("name"),
            category: row.get("category"),
            description: row.get("description"),
            price: row.get("price"),
            is_active: row.get("is_active"),
            created_at: row.get("created_at"),
        })
    }
}
