// src/services/origin_service.rs

use chrono::Utc;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::OriginRepository,
    models::{
        auth::User,
        origins::{CreateChannelPayload, CreateOriginPayload, Origin, OriginChannel},
    },
    services::permission_service::PermissionService,
};

const DEFAULT_COLOR: &str = "#3B82F6";

#[derive(Clone)]
pub struct OriginService {
    repo: OriginRepository,
    permissions: PermissionService,
}

impl OriginService {
    pub fn new(repo: OriginRepository, permissions: PermissionService) -> Self {
        Self { repo, permissions }
    }

    // =========================================================================
    //  CANAIS (somente direção)
    // =========================================================================

    pub async fn list_channels(&self, user: &User) -> Result<Vec<OriginChannel>, AppError> {
        let company_id = self.permissions.require_full_access(user)?;
        self.repo.list_channels(company_id).await
    }

    pub async fn create_channel(
        &self,
        user: &User,
        payload: CreateChannelPayload,
    ) -> Result<OriginChannel, AppError> {
        payload.validate()?;
        let company_id = self.permissions.require_full_access(user)?;

        self.repo
            .create_channel(
                company_id,
                &payload.name,
                payload.kind,
                payload.description.as_deref(),
                payload.color.as_deref().unwrap_or(DEFAULT_COLOR),
            )
            .await
    }

    // =========================================================================
    //  ORIGENS
    // =========================================================================

    /// Origens visíveis; `campaign_active` filtra pela janela da campanha (hoje).
    pub async fn list_origins(
        &self,
        user: &User,
        campaign_active: Option<bool>,
    ) -> Result<Vec<Origin>, AppError> {
        let visible = self.permissions.permitted_origin_ids(user).await?;
        let origins = self.repo.list_visible(&visible).await?;

        let Some(wanted) = campaign_active else {
            return Ok(origins);
        };

        let today = Utc::now().date_naive();
        Ok(origins
            .into_iter()
            .filter(|origin| origin.campaign_active(today) == wanted)
            .collect())
    }

    pub async fn get_origin(&self, user: &User, id: i64) -> Result<Origin, AppError> {
        let visible = self.permissions.permitted_origin_ids(user).await?;
        self.repo
            .find_visible(&visible, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("origem {}", id)))
    }

    pub async fn create_origin(&self, user: &User, payload: CreateOriginPayload) -> Result<Origin, AppError> {
        payload.validate()?;
        let company_id = self.permissions.require_full_access(user)?;

        // Canal de outra empresa conta como inexistente
        if !self.repo.channel_in_company(payload.channel_id, company_id).await? {
            return Err(AppError::ResourceNotFound(format!("canal {}", payload.channel_id)));
        }

        let origin = self
            .repo
            .create_origin(
                payload.channel_id,
                &payload.name,
                payload.description.as_deref(),
                payload.tracking_code.as_deref(),
                payload.destination_url.as_deref(),
                payload.total_cost,
                payload.starts_on,
                payload.ends_on,
            )
            .await?;

        tracing::info!(origin_id = origin.id, channel_id = origin.channel_id, "origem criada");
        Ok(origin)
    }
}
