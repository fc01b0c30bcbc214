// ABOUTME: Broadcast matching engine: open requests, first-accept-wins claims, expiry reaping
// ABOUTME: Acceptance and the derived booking commit as one transaction; losers observe Conflict
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Eventra

use chrono::{Duration, NaiveDate, Utc};
use serde::Deserialize;
use tokio::task::JoinHandle;
use tracing::{error, info};
use uuid::Uuid;

use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{Booking, BookingStatus, BroadcastRequest, BroadcastStatus, PaymentStatus};

/// Fields a customer submits when posting an open job request
#[derive(Debug, Clone, Deserialize)]
pub struct NewBroadcast {
    /// Customer display name
    pub customer_name: String,
    /// Customer contact address
    pub customer_email: String,
    /// Optional phone contact
    #[serde(default)]
    pub customer_phone: Option<String>,
    /// Kind of event requested
    pub event_type: String,
    /// Event day, strictly in the future
    pub date: NaiveDate,
    /// Wall-clock start, `HH:MM`
    pub time: String,
    /// Venue or address
    #[serde(default)]
    pub location: Option<String>,
    /// Expected number of guests
    #[serde(default)]
    pub guest_count: Option<i64>,
    /// Customer budget, becomes the derived booking's amount
    #[serde(default)]
    pub budget: f64,
    /// Free-text requirements shown to managers
    #[serde(default)]
    pub requirements: Option<String>,
}

/// Counts from one reaper pass
#[derive(Debug, Clone, Copy)]
pub struct ExpirySweep {
    /// Open requests flipped to Expired
    pub flipped: u64,
    /// Records removed past the retention window
    pub removed: u64,
}

/// Post an Open broadcast request visible to every manager
///
/// # Errors
///
/// Returns `ValidationFailed` for a past date or negative budget, or a
/// database error if the insert fails
pub async fn create_broadcast(
    db: &Database,
    input: NewBroadcast,
    ttl_days: i64,
) -> AppResult<BroadcastRequest> {
    if input.customer_name.trim().is_empty() {
        return Err(AppError::validation(
            "Customer name is required",
            &["customer_name"],
        ));
    }
    if input.date <= Utc::now().date_naive() {
        return Err(AppError::validation(
            "Event date must be in the future",
            &["date"],
        ));
    }
    if input.budget < 0.0 {
        return Err(AppError::validation(
            "Budget cannot be negative",
            &["budget"],
        ));
    }

    let now = Utc::now();
    let request = BroadcastRequest {
        id: Uuid::new_v4(),
        customer_name: input.customer_name,
        customer_email: input.customer_email,
        customer_phone: input.customer_phone,
        event_type: input.event_type,
        date: input.date,
        time: input.time,
        location: input.location,
        guest_count: input.guest_count,
        budget: input.budget,
        requirements: input.requirements,
        status: BroadcastStatus::Open,
        accepted_by: None,
        accepted_at: None,
        expires_at: now + Duration::days(ttl_days),
        created_at: now,
    };

    db.create_broadcast(&request)
        .await
        .map_err(|e| AppError::database(format!("Failed to create broadcast: {e}")))?;

    info!(
        broadcast_id = %request.id,
        date = %request.date,
        expires_at = %request.expires_at,
        "Broadcast request posted"
    );

    Ok(request)
}

/// Open, unexpired requests for the manager-facing feed
///
/// # Errors
///
/// Returns a database error if the query fails
pub async fn open_broadcasts(db: &Database) -> AppResult<Vec<BroadcastRequest>> {
    db.list_open_broadcasts(Utc::now())
        .await
        .map_err(|e| AppError::database(format!("Failed to list broadcasts: {e}")))
}

/// Requests this manager has won
///
/// # Errors
///
/// Returns a database error if the query fails
pub async fn accepted_broadcasts(
    db: &Database,
    manager_id: Uuid,
) -> AppResult<Vec<BroadcastRequest>> {
    db.list_accepted_broadcasts(manager_id)
        .await
        .map_err(|e| AppError::database(format!("Failed to list broadcasts: {e}")))
}

/// Claim an open broadcast for a manager
///
/// First accept wins: the claim is a compare-and-set keyed on the stored
/// status, and the derived booking is inserted in the same transaction, so
/// acceptance and booking creation are an atomic unit. Concurrent accepts
/// see exactly one winner; every loser gets `Conflict`.
///
/// The derived booking starts Pending with the customer's budget as its
/// amount and no services attached — the availability precondition of a
/// direct booking does not apply, since the broadcasting customer has no
/// pre-existing calendar slot.
///
/// # Errors
///
/// Returns `NotFound` for an unknown broadcast and `Conflict` when the
/// request is no longer open (already accepted, expired, or completed)
pub async fn accept_broadcast(
    db: &Database,
    manager_id: Uuid,
    broadcast_id: Uuid,
) -> AppResult<Booking> {
    let request = db
        .get_broadcast(broadcast_id)
        .await
        .map_err(|e| AppError::database(format!("Failed to load broadcast: {e}")))?
        .ok_or_else(|| AppError::not_found("Broadcast request"))?;

    let now = Utc::now();
    let booking = derive_booking(&request, manager_id);

    let won = db
        .accept_broadcast(broadcast_id, manager_id, now, &booking)
        .await
        .map_err(|e| AppError::database(format!("Failed to accept broadcast: {e}")))?;
    if !won {
        return Err(AppError::conflict(
            "Broadcast request was already accepted or has expired",
        ));
    }

    info!(
        broadcast_id = %broadcast_id,
        manager_id = %manager_id,
        booking_id = %booking.id,
        "Broadcast accepted, booking created"
    );

    Ok(booking)
}

/// Build the Pending booking a successful accept commits
fn derive_booking(request: &BroadcastRequest, manager_id: Uuid) -> Booking {
    let mut notes = format!("Created from broadcast request {}", request.id);
    if let Some(requirements) = request
        .requirements
        .as_deref()
        .filter(|r| !r.trim().is_empty())
    {
        notes.push_str("\nRequirements: ");
        notes.push_str(requirements);
    }

    let now = Utc::now();
    Booking {
        id: Uuid::new_v4(),
        manager_id,
        customer_name: request.customer_name.clone(),
        customer_email: request.customer_email.clone(),
        customer_phone: request.customer_phone.clone(),
        event_type: request.event_type.clone(),
        date: request.date,
        time: request.time.clone(),
        location: request.location.clone(),
        service_ids: vec![],
        total_amount: request.budget,
        status: BookingStatus::Pending,
        payment_status: PaymentStatus::Pending,
        notes: Some(notes),
        created_at: now,
        updated_at: now,
    }
}

/// One reaper pass: flip overdue Open requests, then drop records past the
/// retention window
///
/// # Errors
///
/// Returns a database error if either sweep query fails
pub async fn sweep_expired(db: &Database, retention_days: i64) -> AppResult<ExpirySweep> {
    let now = Utc::now();
    let flipped = db
        .mark_expired_broadcasts(now)
        .await
        .map_err(|e| AppError::database(format!("Failed to expire broadcasts: {e}")))?;
    let removed = db
        .delete_stale_broadcasts(now - Duration::days(retention_days))
        .await
        .map_err(|e| AppError::database(format!("Failed to remove stale broadcasts: {e}")))?;
    Ok(ExpirySweep { flipped, removed })
}

/// Spawn the background reaper that expires and garbage-collects broadcasts
pub fn spawn_expiry_reaper(
    db: Database,
    interval_secs: u64,
    retention_days: i64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
        loop {
            interval.tick().await;
            match sweep_expired(&db, retention_days).await {
                Ok(sweep) => {
                    if sweep.flipped > 0 || sweep.removed > 0 {
                        info!(
                            flipped = sweep.flipped,
                            removed = sweep.removed,
                            "Broadcast expiry sweep completed"
                        );
                    }
                }
                Err(e) => {
                    error!(error = %e, "Broadcast expiry sweep failed");
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use crate::models::Manager;

    fn broadcast_input(budget: f64) -> NewBroadcast {
        NewBroadcast {
            customer_name: "Dana".into(),
            customer_email: "dana@example.com".into(),
            customer_phone: None,
            event_type: "Wedding".into(),
            date: Utc::now().date_naive() + Duration::days(45),
            time: "18:00".into(),
            location: Some("Riverside Hall".into()),
            guest_count: Some(120),
            budget,
            requirements: Some("Outdoor ceremony".into()),
        }
    }

    async fn seeded_manager(db: &Database, email: &str) -> Manager {
        let manager = Manager::new(
            email.into(),
            "hashed".into(),
            "Prime Events".into(),
            "Sam Owner".into(),
        );
        db.create_manager(&manager).await.unwrap();
        manager
    }

    #[tokio::test]
    async fn test_accept_produces_budget_priced_pending_booking() {
        let db = Database::new("sqlite::memory:").await.unwrap();
        let manager = seeded_manager(&db, "owner@example.com").await;

        let request = create_broadcast(&db, broadcast_input(5000.0), 7).await.unwrap();
        let booking = accept_broadcast(&db, manager.id, request.id).await.unwrap();

        assert_eq!(booking.manager_id, manager.id);
        assert!((booking.total_amount - 5000.0).abs() < f64::EPSILON);
        assert!(booking.service_ids.is_empty());
        assert_eq!(booking.status, BookingStatus::Pending);
        assert!(booking
            .notes
            .as_deref()
            .unwrap()
            .contains(&request.id.to_string()));

        let stored = db.get_broadcast(request.id).await.unwrap().unwrap();
        assert_eq!(stored.status, BroadcastStatus::Accepted);
        assert_eq!(stored.accepted_by, Some(manager.id));
    }

    #[tokio::test]
    async fn test_second_accept_gets_conflict() {
        let db = Database::new("sqlite::memory:").await.unwrap();
        let winner = seeded_manager(&db, "first@example.com").await;
        let loser = seeded_manager(&db, "second@example.com").await;

        let request = create_broadcast(&db, broadcast_input(900.0), 7).await.unwrap();
        accept_broadcast(&db, winner.id, request.id).await.unwrap();

        let err = accept_broadcast(&db, loser.id, request.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn test_accept_unknown_broadcast_is_not_found() {
        let db = Database::new("sqlite::memory:").await.unwrap();
        let manager = seeded_manager(&db, "owner@example.com").await;

        let err = accept_broadcast(&db, manager.id, Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_validation_rejects_bad_input() {
        let db = Database::new("sqlite::memory:").await.unwrap();

        let mut past = broadcast_input(100.0);
        past.date = Utc::now().date_naive() - Duration::days(1);
        let err = create_broadcast(&db, past, 7).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);

        let err = create_broadcast(&db, broadcast_input(-1.0), 7).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn test_sweep_flips_and_removes() {
        let db = Database::new("sqlite::memory:").await.unwrap();

        let request = create_broadcast(&db, broadcast_input(100.0), 7).await.unwrap();
        let sweep = sweep_expired(&db, 30).await.unwrap();
        assert_eq!(sweep.flipped, 0);
        assert_eq!(sweep.removed, 0);

        // Not expired yet, still listed
        let open = open_broadcasts(&db).await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].id, request.id);
    }
}
