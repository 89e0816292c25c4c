// src/services/sector_service.rs

use sqlx::PgPool;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::SectorRepository,
    models::{
        auth::User,
        sectors::{CreateSectorPayload, Sector, SectorMember},
    },
    services::permission_service::PermissionService,
};

const DEFAULT_COLOR: &str = "#3B82F6";

#[derive(Clone)]
pub struct SectorService {
    repo: SectorRepository,
    permissions: PermissionService,
    pool: PgPool,
}

impl SectorService {
    pub fn new(repo: SectorRepository, permissions: PermissionService, pool: PgPool) -> Self {
        Self {
            repo,
            permissions,
            pool,
        }
    }

    pub async fn list_sectors(&self, user: &User) -> Result<Vec<Sector>, AppError> {
        let visible = self.permissions.permitted_sector_ids(user).await?;
        self.repo.list_visible(&visible).await
    }

    /// Setor invisível responde como inexistente (404).
    pub async fn get_sector(&self, user: &User, id: i64) -> Result<Sector, AppError> {
        let visible = self.permissions.permitted_sector_ids(user).await?;
        self.repo
            .find_visible(&visible, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("setor {}", id)))
    }

    pub async fn list_members(&self, user: &User, id: i64) -> Result<Vec<SectorMember>, AppError> {
        if !self.permissions.can_view_sector(user, id).await? {
            return Err(AppError::ResourceNotFound(format!("setor {}", id)));
        }
        self.repo.list_members(id).await
    }

    pub async fn create_sector(&self, user: &User, payload: CreateSectorPayload) -> Result<Sector, AppError> {
        payload.validate()?;
        let company_id = self.permissions.require_full_access(user)?;

        // Setor e vínculos entram juntos ou nada entra
        let mut tx = self.pool.begin().await?;

        let sector = self
            .repo
            .create_sector(
                &mut *tx,
                company_id,
                &payload.name,
                payload.description.as_deref(),
                payload.color.as_deref().unwrap_or(DEFAULT_COLOR),
            )
            .await?;

        if !payload.member_ids.is_empty() {
            let linked = self
                .repo
                .add_members(&mut *tx, sector.id, company_id, &payload.member_ids)
                .await?;

            if linked < payload.member_ids.len() as u64 {
                tracing::warn!(
                    sector_id = sector.id,
                    requested = payload.member_ids.len(),
                    linked,
                    "membros de outra empresa ignorados"
                );
            }
        }

        tx.commit().await?;

        tracing::info!(sector_id = sector.id, %company_id, "setor criado");
        Ok(sector)
    }
}
