// ABOUTME: Booking database operations
// ABOUTME: CRUD, guarded status transitions, and the aggregate queries behind the dashboard

use super::Database;
use crate::models::{Booking, BookingStatus};
use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;
use sqlx::Row;
use uuid::Uuid;

/// Per-status booking count for dashboard aggregation
#[derive(Debug, Clone, Serialize)]
pub struct BookingStatusCount {
    /// Lifecycle status, storage encoding
    pub status: String,
    /// Number of bookings in that status
    pub count: i64,
}

impl Database {
    /// Create the bookings table
    ///
    /// # Errors
    ///
    /// Returns an error if table or index creation fails
    pub(super) async fn migrate_bookings(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS bookings (
                id TEXT PRIMARY KEY,
                manager_id TEXT NOT NULL REFERENCES managers(id) ON DELETE CASCADE,
                customer_name TEXT NOT NULL,
                customer_email TEXT NOT NULL,
                customer_phone TEXT,
                event_type TEXT NOT NULL,
                date TEXT NOT NULL,
                time TEXT NOT NULL,
                location TEXT,
                service_ids TEXT NOT NULL DEFAULT '[]',
                total_amount REAL NOT NULL DEFAULT 0,
                status TEXT NOT NULL DEFAULT 'pending'
                    CHECK (status IN ('pending', 'confirmed', 'cancelled', 'completed')),
                payment_status TEXT NOT NULL DEFAULT 'pending'
                    CHECK (payment_status IN ('pending', 'partial', 'paid', 'refunded')),
                notes TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_bookings_manager_date ON bookings(manager_id, date)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_bookings_manager_status ON bookings(manager_id, status)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a new booking
    ///
    /// # Errors
    ///
    /// Returns an error if JSON encoding or the database operation fails
    pub async fn create_booking(&self, booking: &Booking) -> Result<Uuid> {
        let service_ids_json = serde_json::to_string(&booking.service_ids)?;

        sqlx::query(
            r"
            INSERT INTO bookings (
                id, manager_id, customer_name, customer_email, customer_phone,
                event_type, date, time, location, service_ids, total_amount,
                status, payment_status, notes, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            ",
        )
        .bind(booking.id.to_string())
        .bind(booking.manager_id.to_string())
        .bind(&booking.customer_name)
        .bind(&booking.customer_email)
        .bind(&booking.customer_phone)
        .bind(&booking.event_type)
        .bind(booking.date)
        .bind(&booking.time)
        .bind(&booking.location)
        .bind(service_ids_json)
        .bind(booking.total_amount)
        .bind(booking.status.as_str())
        .bind(booking.payment_status.as_str())
        .bind(&booking.notes)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(booking.id)
    }

    /// Get a booking scoped to its owning manager
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_booking_for_manager(
        &self,
        booking_id: Uuid,
        manager_id: Uuid,
    ) -> Result<Option<Booking>> {
        let row = sqlx::query(
            r"
            SELECT id, manager_id, customer_name, customer_email, customer_phone,
                   event_type, date, time, location, service_ids, total_amount,
                   status, payment_status, notes, created_at, updated_at
            FROM bookings WHERE id = $1 AND manager_id = $2
            ",
        )
        .bind(booking_id.to_string())
        .bind(manager_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| Self::row_to_booking(&row)).transpose()
    }

    /// List a manager's bookings, optionally filtered by status
    ///
    /// Ordered most-recent event first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_bookings(
        &self,
        manager_id: Uuid,
        status: Option<BookingStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Booking>> {
        let mut sql = String::from(
            r"
            SELECT id, manager_id, customer_name, customer_email, customer_phone,
                   event_type, date, time, location, service_ids, total_amount,
                   status, payment_status, notes, created_at, updated_at
            FROM bookings WHERE manager_id = $1
            ",
        );

        if status.is_some() {
            sql.push_str(" AND status = $2 ORDER BY date DESC, created_at DESC LIMIT $3 OFFSET $4");
        } else {
            sql.push_str(" ORDER BY date DESC, created_at DESC LIMIT $2 OFFSET $3");
        }

        let mut query = sqlx::query(&sql).bind(manager_id.to_string());
        if let Some(status) = status {
            query = query.bind(status.as_str());
        }
        let rows = query.bind(limit).bind(offset).fetch_all(&self.pool).await?;

        rows.iter().map(Self::row_to_booking).collect()
    }

    /// Atomically transition a booking's status, guarded by the expected prior status
    ///
    /// Returns the number of rows updated: 0 means the booking was missing,
    /// owned by another manager, or its status no longer matched `from`
    /// (a concurrent transition won).
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn update_booking_status(
        &self,
        booking_id: Uuid,
        manager_id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<u64> {
        let result = sqlx::query(
            r"
            UPDATE bookings SET status = $4, updated_at = CURRENT_TIMESTAMP
            WHERE id = $1 AND manager_id = $2 AND status = $3
            ",
        )
        .bind(booking_id.to_string())
        .bind(manager_id.to_string())
        .bind(from.as_str())
        .bind(to.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// All Confirmed bookings for a manager on a given day
    ///
    /// The occupancy projection and the availability drift defense are both
    /// built on this query.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn confirmed_bookings_on_date(
        &self,
        manager_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Booking>> {
        let rows = sqlx::query(
            r"
            SELECT id, manager_id, customer_name, customer_email, customer_phone,
                   event_type, date, time, location, service_ids, total_amount,
                   status, payment_status, notes, created_at, updated_at
            FROM bookings
            WHERE manager_id = $1 AND date = $2 AND status = 'confirmed'
            ORDER BY updated_at ASC
            ",
        )
        .bind(manager_id.to_string())
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_booking).collect()
    }

    /// Whether any Pending or Confirmed booking exists for (manager, date)
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn live_bookings_exist(&self, manager_id: Uuid, date: NaiveDate) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM bookings
            WHERE manager_id = $1 AND date = $2 AND status IN ('pending', 'confirmed')
            ",
        )
        .bind(manager_id.to_string())
        .bind(date)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    /// Pending and Confirmed bookings within a date range, ordered by date
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn live_bookings_in_range(
        &self,
        manager_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Booking>> {
        let rows = sqlx::query(
            r"
            SELECT id, manager_id, customer_name, customer_email, customer_phone,
                   event_type, date, time, location, service_ids, total_amount,
                   status, payment_status, notes, created_at, updated_at
            FROM bookings
            WHERE manager_id = $1 AND date >= $2 AND date <= $3
              AND status IN ('pending', 'confirmed')
            ORDER BY date ASC, time ASC
            ",
        )
        .bind(manager_id.to_string())
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_booking).collect()
    }

    /// Booking counts grouped by status
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn count_bookings_by_status(
        &self,
        manager_id: Uuid,
    ) -> Result<Vec<BookingStatusCount>> {
        let rows =
            sqlx::query("SELECT status, COUNT(*) AS count FROM bookings WHERE manager_id = $1 GROUP BY status")
                .bind(manager_id.to_string())
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .iter()
            .map(|row| BookingStatusCount {
                status: row.get("status"),
                count: row.get("count"),
            })
            .collect())
    }

    /// Total revenue over Completed bookings
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn sum_completed_revenue(&self, manager_id: Uuid) -> Result<f64> {
        let total: f64 = sqlx::query_scalar(
            r"
            SELECT COALESCE(SUM(total_amount), 0.0)
            FROM bookings WHERE manager_id = $1 AND status = 'completed'
            ",
        )
        .bind(manager_id.to_string())
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    /// Count future-dated Pending or Confirmed bookings
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn count_upcoming_bookings(&self, manager_id: Uuid, after: NaiveDate) -> Result<i64> {
        let count = sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM bookings
            WHERE manager_id = $1 AND date > $2 AND status IN ('pending', 'confirmed')
            ",
        )
        .bind(manager_id.to_string())
        .bind(after)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Convert a database row to a Booking struct
    fn row_to_booking(row: &sqlx::sqlite::SqliteRow) -> Result<Booking> {
        let id: String = row.get("id");
        let manager_id: String = row.get("manager_id");
        let service_ids_json: String = row.get("service_ids");
        let status: String = row.get("status");
        let payment_status: String = row.get("payment_status");

        Ok(Booking {
            id: Uuid::parse_str(&id)?,
            manager_id: Uuid::parse_str(&manager_id)?,
            customer_name: row.get("customer_name"),
            customer_email: row.get("customer_email"),
            customer_phone: row.get("customer_phone"),
            event_type: row.get("event_type"),
            date: row.get("date"),
            time: row.get("time"),
            location: row.get("location"),
            service_ids: serde_json::from_str(&service_ids_json)?,
            total_amount: row.get("total_amount"),
            status: status.parse()?,
            payment_status: payment_status.parse()?,
            notes: row.get("notes"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::create_test_db;
    use crate::models::{Booking, BookingStatus, Manager, PaymentStatus};
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn sample_booking(manager_id: Uuid, date: NaiveDate) -> Booking {
        let now = Utc::now();
        Booking {
            id: Uuid::new_v4(),
            manager_id,
            customer_name: "Dana".into(),
            customer_email: "dana@example.com".into(),
            customer_phone: None,
            event_type: "Wedding".into(),
            date,
            time: "18:00".into(),
            location: Some("Riverside Hall".into()),
            service_ids: vec![Uuid::new_v4()],
            total_amount: 2500.0,
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Pending,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    async fn seeded_manager(db: &super::Database) -> Manager {
        let manager = Manager::new(
            "owner@example.com".into(),
            "hashed".into(),
            "Prime Events".into(),
            "Sam Owner".into(),
        );
        db.create_manager(&manager).await.unwrap();
        manager
    }

    #[tokio::test]
    async fn test_create_and_fetch_booking() {
        let db = create_test_db().await.unwrap();
        let manager = seeded_manager(&db).await;
        let booking = sample_booking(manager.id, NaiveDate::from_ymd_opt(2025, 7, 12).unwrap());

        db.create_booking(&booking).await.unwrap();

        let fetched = db
            .get_booking_for_manager(booking.id, manager.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.customer_name, "Dana");
        assert_eq!(fetched.service_ids, booking.service_ids);
        assert_eq!(fetched.status, BookingStatus::Pending);

        // Scoped lookups hide other managers' bookings
        let foreign = db
            .get_booking_for_manager(booking.id, Uuid::new_v4())
            .await
            .unwrap();
        assert!(foreign.is_none());
    }

    #[tokio::test]
    async fn test_guarded_status_update_detects_stale_prior_state() {
        let db = create_test_db().await.unwrap();
        let manager = seeded_manager(&db).await;
        let booking = sample_booking(manager.id, NaiveDate::from_ymd_opt(2025, 7, 12).unwrap());
        db.create_booking(&booking).await.unwrap();

        let won = db
            .update_booking_status(
                booking.id,
                manager.id,
                BookingStatus::Pending,
                BookingStatus::Confirmed,
            )
            .await
            .unwrap();
        assert_eq!(won, 1);

        // Second attempt with the stale prior status touches no rows
        let lost = db
            .update_booking_status(
                booking.id,
                manager.id,
                BookingStatus::Pending,
                BookingStatus::Cancelled,
            )
            .await
            .unwrap();
        assert_eq!(lost, 0);
    }

    #[tokio::test]
    async fn test_status_filter_and_live_booking_queries() {
        let db = create_test_db().await.unwrap();
        let manager = seeded_manager(&db).await;
        let date = NaiveDate::from_ymd_opt(2025, 7, 12).unwrap();

        let pending = sample_booking(manager.id, date);
        let confirmed = {
            let mut b = sample_booking(manager.id, date);
            b.status = BookingStatus::Confirmed;
            b
        };
        let cancelled = {
            let mut b = sample_booking(manager.id, date);
            b.status = BookingStatus::Cancelled;
            b
        };
        for b in [&pending, &confirmed, &cancelled] {
            db.create_booking(b).await.unwrap();
        }

        let only_confirmed = db
            .list_bookings(manager.id, Some(BookingStatus::Confirmed), 50, 0)
            .await
            .unwrap();
        assert_eq!(only_confirmed.len(), 1);

        assert!(db.live_bookings_exist(manager.id, date).await.unwrap());
        assert!(!db
            .live_bookings_exist(manager.id, NaiveDate::from_ymd_opt(2025, 7, 13).unwrap())
            .await
            .unwrap());

        let confirmed_on_date = db
            .confirmed_bookings_on_date(manager.id, date)
            .await
            .unwrap();
        assert_eq!(confirmed_on_date.len(), 1);
        assert_eq!(confirmed_on_date[0].id, confirmed.id);
    }

    #[tokio::test]
    async fn test_dashboard_aggregates() {
        let db = create_test_db().await.unwrap();
        let manager = seeded_manager(&db).await;
        let date = NaiveDate::from_ymd_opt(2025, 7, 12).unwrap();

        let completed = {
            let mut b = sample_booking(manager.id, date);
            b.status = BookingStatus::Completed;
            b.total_amount = 1000.0;
            b
        };
        let completed_two = {
            let mut b = sample_booking(manager.id, date);
            b.status = BookingStatus::Completed;
            b.total_amount = 500.0;
            b
        };
        db.create_booking(&completed).await.unwrap();
        db.create_booking(&completed_two).await.unwrap();

        let revenue = db.sum_completed_revenue(manager.id).await.unwrap();
        assert!((revenue - 1500.0).abs() < f64::EPSILON);

        let counts = db.count_bookings_by_status(manager.id).await.unwrap();
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[0].status, "completed");
        assert_eq!(counts[0].count, 2);

        let upcoming = db
            .count_upcoming_bookings(manager.id, NaiveDate::from_ymd_opt(2025, 7, 1).unwrap())
            .await
            .unwrap();
        assert_eq!(upcoming, 0);
    }
}
