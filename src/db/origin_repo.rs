// src/db/origin_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::origins::{ChannelKind, Origin, OriginChannel},
    services::permission_service::VisibleOrigins,
};

const ORIGIN_COLUMNS: &str = r#"
    o.id, o.channel_id, o.name, o.description, o.tracking_code, o.destination_url,
    o.total_cost, o.is_active, o.starts_on, o.ends_on, o.created_at, o.updated_at
"#;

#[derive(Clone)]
pub struct OriginRepository {
    pool: PgPool,
}

impl OriginRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CANAIS
    // =========================================================================

    pub async fn list_channels(&self, company_id: Uuid) -> Result<Vec<OriginChannel>, AppError> {
        let channels = sqlx::query_as::<_, OriginChannel>(
            r#"
            SELECT id, company_id, name, kind, description, color, is_active, created_at, updated_at
            FROM origin_channels
            WHERE company_id = $1
            ORDER BY name ASC
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(channels)
    }

    pub async fn create_channel(
        &self,
        company_id: Uuid,
        name: &str,
        kind: ChannelKind,
        description: Option<&str>,
        color: &str,
    ) -> Result<OriginChannel, AppError> {
        let channel = sqlx::query_as::<_, OriginChannel>(
            r#"
            INSERT INTO origin_channels (company_id, name, kind, description, color)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, company_id, name, kind, description, color, is_active, created_at, updated_at
            "#,
        )
        .bind(company_id)
        .bind(name)
        .bind(kind)
        .bind(description)
        .bind(color)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(format!(
                        "O canal '{}' já existe.",
                        name
                    ));
                }
            }
            e.into()
        })?;

        Ok(channel)
    }

    pub async fn channel_in_company(&self, channel_id: i64, company_id: Uuid) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM origin_channels WHERE id = $1 AND company_id = $2)",
        )
        .bind(channel_id)
        .bind(company_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    // =========================================================================
    //  ORIGENS (sempre filtradas pelo resolvedor)
    // =========================================================================

    pub async fn list_visible(&self, visible: &VisibleOrigins) -> Result<Vec<Origin>, AppError> {
        if visible.is_empty() {
            return Ok(Vec::new());
        }

        let origins = sqlx::query_as::<_, Origin>(&format!(
            r#"
            SELECT {ORIGIN_COLUMNS}
            FROM origins o
            WHERE o.id = ANY($1)
            ORDER BY o.name ASC
            "#
        ))
        .bind(visible.ids())
        .fetch_all(&self.pool)
        .await?;

        Ok(origins)
    }

    pub async fn find_visible(
        &self,
        visible: &VisibleOrigins,
        id: i64,
    ) -> Result<Option<Origin>, AppError> {
        if !visible.contains(id) {
            return Ok(None);
        }

        let origin = sqlx::query_as::<_, Origin>(&format!(
            "SELECT {ORIGIN_COLUMNS} FROM origins o WHERE o.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(origin)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_origin(
        &self,
        channel_id: i64,
        name: &str,
        description: Option<&str>,
        tracking_code: Option<&str>,
        destination_url: Option<&str>,
        total_cost: Decimal,
        starts_on: Option<NaiveDate>,
        ends_on: Option<NaiveDate>,
    ) -> Result<Origin, AppError> {
        let origin = sqlx::query_as::<_, Origin>(
            r#"
            INSERT INTO origins (
                channel_id, name, description, tracking_code,
                destination_url, total_cost, starts_on, ends_on
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, channel_id, name, description, tracking_code, destination_url,
                      total_cost, is_active, starts_on, ends_on, created_at, updated_at
            "#,
        )
        .bind(channel_id)
        .bind(name)
        .bind(description)
        .bind(tracking_code)
        .bind(destination_url)
        .bind(total_cost)
        .bind(starts_on)
        .bind(ends_on)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(format!(
                        "A origem '{}' já existe neste canal.",
                        name
                    ));
                }
            }
            e.into()
        })?;

        Ok(origin)
    }
}
