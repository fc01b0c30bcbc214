// ABOUTME: Broadcast request database operations
// ABOUTME: Open-request listings, the first-accept-wins CAS transaction, and expiry reaping

use super::Database;
use crate::models::{Booking, BroadcastRequest};
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

impl Database {
    /// Create the broadcast requests table
    ///
    /// # Errors
    ///
    /// Returns an error if table or index creation fails
    pub(super) async fn migrate_broadcasts(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS broadcast_requests (
                id TEXT PRIMARY KEY,
                customer_name TEXT NOT NULL,
                customer_email TEXT NOT NULL,
                customer_phone TEXT,
                event_type TEXT NOT NULL,
                date TEXT NOT NULL,
                time TEXT NOT NULL,
                location TEXT,
                guest_count INTEGER,
                budget REAL NOT NULL DEFAULT 0,
                requirements TEXT,
                status TEXT NOT NULL DEFAULT 'open'
                    CHECK (status IN ('open', 'accepted', 'expired', 'completed')),
                accepted_by TEXT,
                accepted_at DATETIME,
                expires_at DATETIME NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_broadcasts_status_expiry ON broadcast_requests(status, expires_at)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_broadcasts_accepted_by ON broadcast_requests(accepted_by)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a new broadcast request
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn create_broadcast(&self, request: &BroadcastRequest) -> Result<Uuid> {
        sqlx::query(
            r"
            INSERT INTO broadcast_requests (
                id, customer_name, customer_email, customer_phone, event_type,
                date, time, location, guest_count, budget, requirements,
                status, accepted_by, accepted_at, expires_at, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            ",
        )
        .bind(request.id.to_string())
        .bind(&request.customer_name)
        .bind(&request.customer_email)
        .bind(&request.customer_phone)
        .bind(&request.event_type)
        .bind(request.date)
        .bind(&request.time)
        .bind(&request.location)
        .bind(request.guest_count)
        .bind(request.budget)
        .bind(&request.requirements)
        .bind(request.status.as_str())
        .bind(request.accepted_by.map(|id| id.to_string()))
        .bind(request.accepted_at)
        .bind(request.expires_at)
        .bind(request.created_at)
        .execute(&self.pool)
        .await?;

        Ok(request.id)
    }

    /// Get a broadcast request by id
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_broadcast(&self, broadcast_id: Uuid) -> Result<Option<BroadcastRequest>> {
        let row = sqlx::query(
            r"
            SELECT id, customer_name, customer_email, customer_phone, event_type,
                   date, time, location, guest_count, budget, requirements,
                   status, accepted_by, accepted_at, expires_at, created_at
            FROM broadcast_requests WHERE id = $1
            ",
        )
        .bind(broadcast_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| Self::row_to_broadcast(&row)).transpose()
    }

    /// List Open requests that have not passed their expiry instant
    ///
    /// Past-expiry records are excluded here even when the reaper has not
    /// flipped them yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_open_broadcasts(&self, now: DateTime<Utc>) -> Result<Vec<BroadcastRequest>> {
        let rows = sqlx::query(
            r"
            SELECT id, customer_name, customer_email, customer_phone, event_type,
                   date, time, location, guest_count, budget, requirements,
                   status, accepted_by, accepted_at, expires_at, created_at
            FROM broadcast_requests
            WHERE status = 'open' AND expires_at > $1
            ORDER BY created_at DESC
            ",
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_broadcast).collect()
    }

    /// List the requests a manager has accepted, most recent first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_accepted_broadcasts(
        &self,
        manager_id: Uuid,
    ) -> Result<Vec<BroadcastRequest>> {
        let rows = sqlx::query(
            r"
            SELECT id, customer_name, customer_email, customer_phone, event_type,
                   date, time, location, guest_count, budget, requirements,
                   status, accepted_by, accepted_at, expires_at, created_at
            FROM broadcast_requests
            WHERE accepted_by = $1
            ORDER BY accepted_at DESC
            ",
        )
        .bind(manager_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_broadcast).collect()
    }

    /// First-accept-wins claim: CAS on the broadcast plus the derived booking
    /// insert, committed as one transaction
    ///
    /// The UPDATE only matches while the stored status is still `open` and
    /// the request has not expired; zero rows affected means a concurrent
    /// accept (or expiry) won, and nothing is written. Exactly one concurrent
    /// caller can observe `true`.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON encoding or any statement in the transaction fails
    pub async fn accept_broadcast(
        &self,
        broadcast_id: Uuid,
        manager_id: Uuid,
        now: DateTime<Utc>,
        derived_booking: &Booking,
    ) -> Result<bool> {
        let service_ids_json = serde_json::to_string(&derived_booking.service_ids)?;

        let mut tx = self.pool.begin().await?;

        let claimed = sqlx::query(
            r"
            UPDATE broadcast_requests
            SET status = 'accepted', accepted_by = $2, accepted_at = $3
            WHERE id = $1 AND status = 'open' AND expires_at > $4
            ",
        )
        .bind(broadcast_id.to_string())
        .bind(manager_id.to_string())
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if claimed.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query(
            r"
            INSERT INTO bookings (
                id, manager_id, customer_name, customer_email, customer_phone,
                event_type, date, time, location, service_ids, total_amount,
                status, payment_status, notes, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            ",
        )
        .bind(derived_booking.id.to_string())
        .bind(derived_booking.manager_id.to_string())
        .bind(&derived_booking.customer_name)
        .bind(&derived_booking.customer_email)
        .bind(&derived_booking.customer_phone)
        .bind(&derived_booking.event_type)
        .bind(derived_booking.date)
        .bind(&derived_booking.time)
        .bind(&derived_booking.location)
        .bind(service_ids_json)
        .bind(derived_booking.total_amount)
        .bind(derived_booking.status.as_str())
        .bind(derived_booking.payment_status.as_str())
        .bind(&derived_booking.notes)
        .bind(derived_booking.created_at)
        .bind(derived_booking.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(true)
    }

    /// Flip Open requests past their expiry to Expired
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn mark_expired_broadcasts(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE broadcast_requests SET status = 'expired' WHERE status = 'open' AND expires_at <= $1",
        )
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Remove requests whose expiry lies before the retention cutoff,
    /// regardless of status
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn delete_stale_broadcasts(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM broadcast_requests WHERE expires_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Count currently open, unexpired requests
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn count_open_broadcasts(&self, now: DateTime<Utc>) -> Result<i64> {
        let count = sqlx::query_scalar(
            "SELECT COUNT(*) FROM broadcast_requests WHERE status = 'open' AND expires_at > $1",
        )
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Convert a database row to a `BroadcastRequest` struct
    fn row_to_broadcast(row: &sqlx::sqlite::SqliteRow) -> Result<BroadcastRequest> {
        let id: String = row.get("id");
        let status: String = row.get("status");
        let accepted_by: Option<String> = row.get("accepted_by");

        Ok(BroadcastRequest {
            id: Uuid::parse_str(&id)?,
            customer_name: row.get("customer_name"),
            customer_email: row.get("customer_email"),
            customer_phone: row.get("customer_phone"),
            event_type: row.get("event_type"),
            date: row.get("date"),
            time: row.get("time"),
            location: row.get("location"),
            guest_count: row.get("guest_count"),
            budget: row.get("budget"),
            requirements: row.get("requirements"),
            status: status.parse()?,
            accepted_by: accepted_by.map(|id| Uuid::parse_str(&id)).transpose()?,
            accepted_at: row.get("accepted_at"),
            expires_at: row.get("expires_at"),
            created_at: row.get("created_at"),
        })
    }
}
