//! PostgreSQL implementation of device repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

use crate::domain::entities::{
    Device, DeviceChanges, DeviceFilter, DeviceState, NewDevice, PageRequest,
};
use crate::domain::repositories::DeviceRepository;
use crate::error::AppError;

const DEVICE_COLUMNS: &str = "id, name, brand, state, created_on";

/// Raw `devices` row.
#[derive(Debug, FromRow)]
struct DeviceRow {
    id: i64,
    name: String,
    brand: String,
    state: String,
    created_on: DateTime<Utc>,
}

impl TryFrom<DeviceRow> for Device {
    type Error = AppError;

    fn try_from(row: DeviceRow) -> Result<Self, Self::Error> {
        let state = row.state.parse::<DeviceState>().map_err(|e| {
            AppError::internal(
                "Corrupt device state in database",
                json!({ "id": row.id, "reason": e.to_string() }),
            )
        })?;

        Ok(Device::new(row.id, row.name, row.brand, state, row.created_on))
    }
}

/// PostgreSQL repository for device storage and retrieval.
///
/// Queries are bound at runtime, so the crate builds without a live database.
pub struct PgDeviceRepository {
    pool: Arc<PgPool>,
}

impl PgDeviceRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeviceRepository for PgDeviceRepository {
    async fn create(&self, new_device: NewDevice) -> Result<Device, AppError> {
        let sql = format!(
            "INSERT INTO devices (name, brand, state) VALUES ($1, $2, $3) RETURNING {DEVICE_COLUMNS}"
        );

        let row = sqlx::query_as::<_, DeviceRow>(&sql)
            .bind(&new_device.name)
            .bind(&new_device.brand)
            .bind(new_device.state.as_db_str())
            .fetch_one(self.pool.as_ref())
            .await?;

        row.try_into()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Device>, AppError> {
        let sql = format!("SELECT {DEVICE_COLUMNS} FROM devices WHERE id = $1");

        let row = sqlx::query_as::<_, DeviceRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.map(Device::try_from).transpose()
    }

    async fn find_page(
        &self,
        filter: &DeviceFilter,
        page: PageRequest,
    ) -> Result<Vec<Device>, AppError> {
        let sql = format!(
            r#"
            SELECT {DEVICE_COLUMNS}
            FROM devices
            WHERE ($1::text IS NULL OR lower(brand) = lower($1))
              AND ($2::text IS NULL OR state = $2)
            ORDER BY id
            LIMIT $3 OFFSET $4
            "#
        );

        let rows = sqlx::query_as::<_, DeviceRow>(&sql)
            .bind(filter.brand.as_deref())
            .bind(filter.state.map(|s| s.as_db_str()))
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(self.pool.as_ref())
            .await?;

        rows.into_iter().map(Device::try_from).collect()
    }

    async fn count(&self, filter: &DeviceFilter) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM devices
            WHERE ($1::text IS NULL OR lower(brand) = lower($1))
              AND ($2::text IS NULL OR state = $2)
            "#,
        )
        .bind(filter.brand.as_deref())
        .bind(filter.state.map(|s| s.as_db_str()))
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }

    async fn update(
        &self,
        id: i64,
        expected_state: DeviceState,
        changes: DeviceChanges,
    ) -> Result<Option<Device>, AppError> {
        let sql = format!(
            r#"
            UPDATE devices
            SET name = $3, brand = $4, state = $5
            WHERE id = $1 AND state = $2
            RETURNING {DEVICE_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, DeviceRow>(&sql)
            .bind(id)
            .bind(expected_state.as_db_str())
            .bind(&changes.name)
            .bind(&changes.brand)
            .bind(changes.state.as_db_str())
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.map(Device::try_from).transpose()
    }

    async fn delete_unless_in_use(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM devices WHERE id = $1 AND state <> $2")
            .bind(id)
            .bind(DeviceState::InUse.as_db_str())
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }
}
