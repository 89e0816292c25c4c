// src/db/lead_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::leads::{Lead, LeadFilter, UpdateLeadPayload},
    services::permission_service::VisibleOrigins,
};

const LEAD_COLUMNS: &str = r#"
    id, company_id, origin_id, contact_name, contact_phone,
    utm_source, utm_medium, utm_campaign, utm_term, utm_content,
    notes, assigned_to, converted, converted_at, registered_at
"#;

/// Porta dos leads usada pelo `LeadService`.
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Leads das origens visíveis, mais recentes primeiro.
    async fn list_visible(
        &self,
        company_id: Uuid,
        visible: &VisibleOrigins,
        filter: &LeadFilter,
    ) -> Result<Vec<Lead>, AppError>;

    async fn find_in_company(&self, id: i64, company_id: Uuid) -> Result<Option<Lead>, AppError>;

    /// PATCH: campos ausentes mantêm o valor atual.
    async fn update(&self, id: i64, payload: &UpdateLeadPayload) -> Result<Lead, AppError>;

    async fn assign(&self, id: i64, user_id: Uuid) -> Result<Lead, AppError>;

    /// Marca como convertido. Repetir a chamada não altera `converted_at`.
    async fn mark_converted(&self, id: i64) -> Result<Lead, AppError>;
}

#[derive(Clone)]
pub struct LeadRepository {
    pool: PgPool,
}

impl LeadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeadStore for LeadRepository {
    async fn list_visible(
        &self,
        company_id: Uuid,
        visible: &VisibleOrigins,
        filter: &LeadFilter,
    ) -> Result<Vec<Lead>, AppError> {
        if visible.is_empty() {
            return Ok(Vec::new());
        }

        let leads = sqlx::query_as::<_, Lead>(&format!(
            r#"
            SELECT {LEAD_COLUMNS}
            FROM leads
            WHERE company_id = $1
              AND origin_id = ANY($2)
              AND ($3::BIGINT IS NULL OR origin_id = $3)
              AND ($4::BOOLEAN IS NULL OR converted = $4)
              AND ($5::TEXT IS NULL OR utm_source = $5)
              AND ($6::TEXT IS NULL OR utm_campaign = $6)
            ORDER BY registered_at DESC
            "#
        ))
        .bind(company_id)
        .bind(visible.ids())
        .bind(filter.origin_id)
        .bind(filter.converted)
        .bind(filter.utm_source.as_deref())
        .bind(filter.utm_campaign.as_deref())
        .fetch_all(&self.pool)
        .await?;

        Ok(leads)
    }

    async fn find_in_company(&self, id: i64, company_id: Uuid) -> Result<Option<Lead>, AppError> {
        let lead = sqlx::query_as::<_, Lead>(&format!(
            "SELECT {LEAD_COLUMNS} FROM leads WHERE id = $1 AND company_id = $2"
        ))
        .bind(id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(lead)
    }

    async fn update(&self, id: i64, payload: &UpdateLeadPayload) -> Result<Lead, AppError> {
        let lead = sqlx::query_as::<_, Lead>(&format!(
            r#"
            UPDATE leads
            SET contact_name = COALESCE($2, contact_name),
                contact_phone = COALESCE($3, contact_phone),
                notes = COALESCE($4, notes)
            WHERE id = $1
            RETURNING {LEAD_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(payload.contact_name.as_deref())
        .bind(payload.contact_phone.as_deref())
        .bind(payload.notes.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok(lead)
    }

    async fn assign(&self, id: i64, user_id: Uuid) -> Result<Lead, AppError> {
        let lead = sqlx::query_as::<_, Lead>(&format!(
            "UPDATE leads SET assigned_to = $2 WHERE id = $1 RETURNING {LEAD_COLUMNS}"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(lead)
    }

    async fn mark_converted(&self, id: i64) -> Result<Lead, AppError> {
        let lead = sqlx::query_as::<_, Lead>(&format!(
            r#"
            UPDATE leads
            SET converted = TRUE,
                converted_at = COALESCE(converted_at, NOW())
            WHERE id = $1
            RETURNING {LEAD_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(lead)
    }
}
