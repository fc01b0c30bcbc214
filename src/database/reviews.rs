// ABOUTME: Review database operations
// ABOUTME: One review per customer per manager, enforced by a unique index

use super::Database;
use crate::models::Review;
use anyhow::Result;
use sqlx::Row;
use uuid::Uuid;

impl Database {
    /// Create the reviews table
    ///
    /// # Errors
    ///
    /// Returns an error if table or index creation fails
    pub(super) async fn migrate_reviews(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS reviews (
                id TEXT PRIMARY KEY,
                manager_id TEXT NOT NULL REFERENCES managers(id) ON DELETE CASCADE,
                customer_name TEXT NOT NULL,
                customer_email TEXT NOT NULL,
                rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
                comment TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                UNIQUE(manager_id, customer_email)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_reviews_manager ON reviews(manager_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Insert a review, returning `None` when the customer already reviewed
    /// this manager
    ///
    /// Duplicate detection rides the unique index via INSERT OR IGNORE, so
    /// two concurrent submissions cannot both land.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn create_review(&self, review: &Review) -> Result<Option<Uuid>> {
        let result = sqlx::query(
            r"
            INSERT OR IGNORE INTO reviews (
                id, manager_id, customer_name, customer_email, rating, comment, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(review.id.to_string())
        .bind(review.manager_id.to_string())
        .bind(&review.customer_name)
        .bind(&review.customer_email)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.created_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Ok(Some(review.id))
    }

    /// List a manager's reviews, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_reviews(&self, manager_id: Uuid) -> Result<Vec<Review>> {
        let rows = sqlx::query(
            r"
            SELECT id, manager_id, customer_name, customer_email, rating, comment, created_at
            FROM reviews
            WHERE manager_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(manager_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_review).collect()
    }

    /// Review count and average rating in one pass
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn review_stats(&self, manager_id: Uuid) -> Result<(i64, Option<f64>)> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS total, AVG(rating) AS average FROM reviews WHERE manager_id = $1",
        )
        .bind(manager_id.to_string())
        .fetch_one(&self.pool)
        .await?;

        Ok((row.get("total"), row.get("average")))
    }

    /// Convert a database row to a `Review` struct
    fn row_to_review(row: &sqlx::sqlite::SqliteRow) -> Result<Review> {
        let id: String = row.get("id");
        let manager_id: String = row.get("manager_id");

        Ok(Review {
            id: Uuid::parse_str(&id)?,
            manager_id: Uuid::parse_str(&manager_id)?,
            customer_name: row.get("customer_name"),
            customer_email: row.get("customer_email"),
            rating: row.get("rating"),
            comment: row.get("comment"),
            created_at: row.get("created_at"),
        })
    }
}
