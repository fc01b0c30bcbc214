// ABOUTME: Availability calendar database operations
// ABOUTME: One record per (manager, day) with upsert semantics and JSON-encoded time slots

use super::Database;
use crate::models::AvailabilityDay;
use anyhow::Result;
use chrono::NaiveDate;
use sqlx::Row;
use uuid::Uuid;

impl Database {
    /// Create the availability table
    ///
    /// The UNIQUE(manager_id, date) constraint is what makes
    /// `upsert_availability_day` collapse repeated writes for the same day
    /// into a single record.
    ///
    /// # Errors
    ///
    /// Returns an error if table or index creation fails
    pub(super) async fn migrate_availability(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS availability_days (
                id TEXT PRIMARY KEY,
                manager_id TEXT NOT NULL REFERENCES managers(id) ON DELETE CASCADE,
                date TEXT NOT NULL,
                is_full_day BOOLEAN NOT NULL DEFAULT 0,
                status TEXT NOT NULL DEFAULT 'available'
                    CHECK (status IN ('available', 'unavailable', 'booked')),
                booking_id TEXT,
                time_slots TEXT NOT NULL DEFAULT '[]',
                weekend TEXT,
                notes TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                UNIQUE(manager_id, date)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_availability_manager_status ON availability_days(manager_id, status)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert or update the availability record for (manager, date)
    ///
    /// On conflict the existing record keeps its id and `created_at`; all
    /// mutable fields are overwritten in place.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON encoding or the database operation fails
    pub async fn upsert_availability_day(&self, day: &AvailabilityDay) -> Result<()> {
        let slots_json = serde_json::to_string(&day.time_slots)?;
        let weekend_json = day
            .weekend
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        sqlx::query(
            r"
            INSERT INTO availability_days (
                id, manager_id, date, is_full_day, status, booking_id,
                time_slots, weekend, notes, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, CURRENT_TIMESTAMP)
            ON CONFLICT(manager_id, date) DO UPDATE SET
                is_full_day = $4,
                status = $5,
                booking_id = $6,
                time_slots = $7,
                weekend = $8,
                notes = $9,
                updated_at = CURRENT_TIMESTAMP
            ",
        )
        .bind(day.id.to_string())
        .bind(day.manager_id.to_string())
        .bind(day.date)
        .bind(day.is_full_day)
        .bind(day.status.as_str())
        .bind(day.booking_id.map(|id| id.to_string()))
        .bind(slots_json)
        .bind(weekend_json)
        .bind(&day.notes)
        .bind(day.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get the availability record for a specific day
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_availability_day(
        &self,
        manager_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<AvailabilityDay>> {
        let row = sqlx::query(
            r"
            SELECT id, manager_id, date, is_full_day, status, booking_id,
                   time_slots, weekend, notes, created_at, updated_at
            FROM availability_days WHERE manager_id = $1 AND date = $2
            ",
        )
        .bind(manager_id.to_string())
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| Self::row_to_availability_day(&row))
            .transpose()
    }

    /// Get an availability record by its id, scoped to the owning manager
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_availability_by_id(
        &self,
        id: Uuid,
        manager_id: Uuid,
    ) -> Result<Option<AvailabilityDay>> {
        let row = sqlx::query(
            r"
            SELECT id, manager_id, date, is_full_day, status, booking_id,
                   time_slots, weekend, notes, created_at, updated_at
            FROM availability_days WHERE id = $1 AND manager_id = $2
            ",
        )
        .bind(id.to_string())
        .bind(manager_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| Self::row_to_availability_day(&row))
            .transpose()
    }

    /// List availability records ordered by date, optionally range-bounded
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_availability_range(
        &self,
        manager_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<AvailabilityDay>> {
        let mut sql = String::from(
            r"
            SELECT id, manager_id, date, is_full_day, status, booking_id,
                   time_slots, weekend, notes, created_at, updated_at
            FROM availability_days WHERE manager_id = $1
            ",
        );

        let mut next_param = 2;
        if from.is_some() {
            sql.push_str(&format!(" AND date >= ${next_param}"));
            next_param += 1;
        }
        if to.is_some() {
            sql.push_str(&format!(" AND date <= ${next_param}"));
        }
        sql.push_str(" ORDER BY date ASC");

        let mut query = sqlx::query(&sql).bind(manager_id.to_string());
        if let Some(from) = from {
            query = query.bind(from);
        }
        if let Some(to) = to {
            query = query.bind(to);
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(Self::row_to_availability_day).collect()
    }

    /// Delete an availability record by id, scoped to the owning manager
    ///
    /// Returns the number of rows removed (0 when the record was missing or
    /// owned by another manager).
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn delete_availability_day(&self, id: Uuid, manager_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM availability_days WHERE id = $1 AND manager_id = $2")
            .bind(id.to_string())
            .bind(manager_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Convert a database row to an `AvailabilityDay` struct
    fn row_to_availability_day(row: &sqlx::sqlite::SqliteRow) -> Result<AvailabilityDay> {
        let id: String = row.get("id");
        let manager_id: String = row.get("manager_id");
        let status: String = row.get("status");
        let booking_id: Option<String> = row.get("booking_id");
        let slots_json: String = row.get("time_slots");
        let weekend_json: Option<String> = row.get("weekend");

        Ok(AvailabilityDay {
            id: Uuid::parse_str(&id)?,
            manager_id: Uuid::parse_str(&manager_id)?,
            date: row.get("date"),
            is_full_day: row.get("is_full_day"),
            status: status.parse()?,
            booking_id: booking_id.map(|id| Uuid::parse_str(&id)).transpose()?,
            time_slots: serde_json::from_str(&slots_json)?,
            weekend: weekend_json
                .map(|json| serde_json::from_str(&json))
                .transpose()?,
            notes: row.get("notes"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::create_test_db;
    use crate::models::{AvailabilityDay, DayStatus, Manager, TimeSlot};
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn sample_day(manager_id: Uuid, date: NaiveDate) -> AvailabilityDay {
        let now = Utc::now();
        AvailabilityDay {
            id: Uuid::new_v4(),
            manager_id,
            date,
            is_full_day: false,
            status: DayStatus::Available,
            booking_id: None,
            time_slots: vec![
                TimeSlot::available("09:00", "12:00"),
                TimeSlot::available("14:00", "18:00"),
            ],
            weekend: None,
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
    async fn test_upsert_keeps_single_record_per_day() {
        let db = create_test_db().await.unwrap();
        let manager = seeded_manager(&db).await;
        let date = NaiveDate::from_ymd_opt(2025, 7, 12).unwrap();

        let first = sample_day(manager.id, date);
        db.upsert_availability_day(&first).await.unwrap();

        let mut second = sample_day(manager.id, date);
        second.status = DayStatus::Unavailable;
        second.notes = Some("maintenance".into());
        db.upsert_availability_day(&second).await.unwrap();

        let all = db
            .get_availability_range(manager.id, None, None)
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].status, DayStatus::Unavailable);
        assert_eq!(all[0].notes.as_deref(), Some("maintenance"));
        // The original id survives the overwrite
        assert_eq!(all[0].id, first.id);
    }

    #[tokio::test]
    async fn test_slots_roundtrip_through_json_column() {
        let db = create_test_db().await.unwrap();
        let manager = seeded_manager(&db).await;
        let date = NaiveDate::from_ymd_opt(2025, 7, 12).unwrap();

        let day = sample_day(manager.id, date);
        db.upsert_availability_day(&day).await.unwrap();

        let fetched = db
            .get_availability_day(manager.id, date)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.time_slots, day.time_slots);
        assert_eq!(fetched.date, date);
    }

    #[tokio::test]
    async fn test_range_query_is_ordered_and_bounded() {
        let db = create_test_db().await.unwrap();
        let manager = seeded_manager(&db).await;

        for day in [20, 5, 12] {
            let date = NaiveDate::from_ymd_opt(2025, 7, day).unwrap();
            db.upsert_availability_day(&sample_day(manager.id, date))
                .await
                .unwrap();
        }

        let bounded = db
            .get_availability_range(
                manager.id,
                Some(NaiveDate::from_ymd_opt(2025, 7, 6).unwrap()),
                Some(NaiveDate::from_ymd_opt(2025, 7, 31).unwrap()),
            )
            .await
            .unwrap();

        let dates: Vec<u32> = bounded
            .iter()
            .map(|d| chrono::Datelike::day(&d.date))
            .collect();
        assert_eq!(dates, vec![12, 20]);
    }

    #[tokio::test]
    async fn test_delete_scoped_to_manager() {
        let db = create_test_db().await.unwrap();
        let manager = seeded_manager(&db).await;
        let date = NaiveDate::from_ymd_opt(2025, 7, 12).unwrap();

        let day = sample_day(manager.id, date);
        db.upsert_availability_day(&day).await.unwrap();

        let foreign = db
            .delete_availability_day(day.id, Uuid::new_v4())
            .await
            .unwrap();
        assert_eq!(foreign, 0);

        let removed = db
            .delete_availability_day(day.id, manager.id)
            .await
            .unwrap();
        assert_eq!(removed, 1);
    }
}
