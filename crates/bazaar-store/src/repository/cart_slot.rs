//! # Cart Slot Repository
//!
//! A named key-value slot per cart. Each write replaces the whole payload.
//!
//! ## Last Writer Wins
//! ```text
//! Session A                    cart_slots["cart-storage"]          Session B
//! ─────────                    ──────────────────────────          ─────────
//! upsert(payload_a, "A") ───►  payload_a, written_by = A
//!                              payload_b, written_by = B  ◄─────── upsert(payload_b, "B")
//! upsert(payload_c, "A") ───►  payload_c, written_by = A
//!        └── returns Some("B"): A just overwrote B's cart
//! ```
//!
//! Two sessions sharing a slot are not reconciled; the caller only learns
//! that it overwrote someone else.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::StoreResult;

/// A stored cart slot row.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct CartSlotRecord {
    pub slot: String,
    pub payload: String,
    pub written_by: String,
    pub updated_at: DateTime<Utc>,
}

/// Repository for cart slot operations.
#[derive(Debug, Clone)]
pub struct CartSlotRepository {
    pool: SqlitePool,
}

impl CartSlotRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CartSlotRepository { pool }
    }

    /// Gets a slot, if it was ever written.
    pub async fn get(&self, slot: &str) -> StoreResult<Option<CartSlotRecord>> {
        let record = sqlx::query_as::<_, CartSlotRecord>(
            r#"
            SELECT slot, payload, written_by, updated_at
            FROM cart_slots
            WHERE slot = ?1
            "#,
        )
        .bind(slot)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Writes a payload to a slot, creating it if needed.
    ///
    /// ## Returns
    /// The session that wrote the slot before this call, if any.
    pub async fn upsert(
        &self,
        slot: &str,
        payload: &str,
        written_by: &str,
    ) -> StoreResult<Option<String>> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let previous: Option<String> =
            sqlx::query_scalar("SELECT written_by FROM cart_slots WHERE slot = ?1")
                .bind(slot)
                .fetch_optional(&mut *tx)
                .await?;

        sqlx::query(
            r#"
            INSERT INTO cart_slots (slot, payload, written_by, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(slot) DO UPDATE SET
                payload = excluded.payload,
                written_by = excluded.written_by,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(slot)
        .bind(payload)
        .bind(written_by)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(slot = %slot, bytes = payload.len(), "Cart slot written");
        Ok(previous)
    }

    /// Deletes a slot. Returns `true` if it existed.
    pub async fn delete(&self, slot: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM cart_slots WHERE slot = ?1")
            .bind(slot)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists every slot name, most recently written first.
    pub async fn list(&self) -> StoreResult<Vec<String>> {
        let slots: Vec<String> = sqlx::query_scalar("SELECT slot FROM cart_slots ORDER BY updated_at DESC")
            .fetch_all(&self.pool)
            .await?;

        Ok(slots)
    }
}
