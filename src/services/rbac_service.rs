// src/services/rbac_service.rs

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::common::error::AppError;
use crate::db::{GrantStore, PermissionStore, UserDirectory};
use crate::models::auth::User;
use crate::models::rbac::{
    EffectivePermissions, OriginGrant, SectorGrant, UpsertOriginGrantPayload,
    UpsertSectorGrantPayload,
};
use crate::services::permission_service::PermissionService;

/// Administração das permissões granulares (somente direção).
#[derive(Clone)]
pub struct RbacService {
    repo: Arc<dyn GrantStore>,
    users: Arc<dyn UserDirectory>,
    permissions: PermissionService,
}

impl RbacService {
    pub fn new(
        repo: Arc<dyn GrantStore>,
        users: Arc<dyn UserDirectory>,
        permissions: PermissionService,
    ) -> Self {
        Self {
            repo,
            users,
            permissions,
        }
    }

    pub async fn my_permissions(&self, user: &User) -> Result<EffectivePermissions, AppError> {
        self.permissions.effective_permissions(user).await
    }

    // =========================================================================
    //  SETORES
    // =========================================================================

    pub async fn list_sector_grants(&self, admin: &User) -> Result<Vec<SectorGrant>, AppError> {
        let company_id = self.permissions.require_full_access(admin)?;
        self.repo.list_sector_grants(company_id).await
    }

    pub async fn upsert_sector_grant(
        &self,
        admin: &User,
        payload: UpsertSectorGrantPayload,
    ) -> Result<SectorGrant, AppError> {
        payload.validate()?;
        let company_id = self.permissions.require_full_access(admin)?;

        self.ensure_grantee_in_company(payload.user_id, company_id).await?;
        if !self.repo.sector_in_company(payload.sector_id, company_id).await? {
            return Err(AppError::ResourceNotFound(format!("setor {}", payload.sector_id)));
        }

        let grant = self
            .repo
            .upsert_sector_grant(
                payload.user_id,
                payload.sector_id,
                payload.may_serve,
                payload.may_view,
            )
            .await?;

        tracing::info!(
            admin_id = %admin.id,
            user_id = %grant.user_id,
            sector_id = grant.sector_id,
            may_serve = grant.may_serve,
            may_view = grant.may_view,
            "permissão de setor gravada"
        );
        Ok(grant)
    }

    pub async fn delete_sector_grant(
        &self,
        admin: &User,
        user_id: Uuid,
        sector_id: i64,
    ) -> Result<(), AppError> {
        let company_id = self.permissions.require_full_access(admin)?;

        // Setor de outra empresa: responde igual a permissão inexistente
        if !self.repo.sector_in_company(sector_id, company_id).await?
            || !self.repo.delete_sector_grant(user_id, sector_id).await?
        {
            return Err(AppError::ResourceNotFound(format!(
                "permissão do usuário {} no setor {}",
                user_id, sector_id
            )));
        }

        tracing::info!(admin_id = %admin.id, %user_id, sector_id, "permissão de setor removida");
        Ok(())
    }

    // =========================================================================
    //  ORIGENS
    // =========================================================================

    pub async fn list_origin_grants(&self, admin: &User) -> Result<Vec<OriginGrant>, AppError> {
        let company_id = self.permissions.require_full_access(admin)?;
        self.repo.list_origin_grants(company_id).await
    }

    pub async fn upsert_origin_grant(
        &self,
        admin: &User,
        payload: UpsertOriginGrantPayload,
    ) -> Result<OriginGrant, AppError> {
        payload.validate()?;
        let company_id = self.permissions.require_full_access(admin)?;

        self.ensure_grantee_in_company(payload.user_id, company_id).await?;
        if !self.repo.origin_in_company(payload.origin_id, company_id).await? {
            return Err(AppError::ResourceNotFound(format!("origem {}", payload.origin_id)));
        }

        let grant = self
            .repo
            .upsert_origin_grant(
                payload.user_id,
                payload.origin_id,
                payload.may_view,
                payload.may_edit,
                payload.may_assign,
            )
            .await?;

        tracing::info!(
            admin_id = %admin.id,
            user_id = %grant.user_id,
            origin_id = grant.origin_id,
            may_view = grant.may_view,
            may_edit = grant.may_edit,
            may_assign = grant.may_assign,
            "permissão de origem gravada"
        );
        Ok(grant)
    }

    pub async fn delete_origin_grant(
        &self,
        admin: &User,
        user_id: Uuid,
        origin_id: i64,
    ) -> Result<(), AppError> {
        let company_id = self.permissions.require_full_access(admin)?;

        if !self.repo.origin_in_company(origin_id, company_id).await?
            || !self.repo.delete_origin_grant(user_id, origin_id).await?
        {
            return Err(AppError::ResourceNotFound(format!(
                "permissão do usuário {} na origem {}",
                user_id, origin_id
            )));
        }

        tracing::info!(admin_id = %admin.id, %user_id, origin_id, "permissão de origem removida");
        Ok(())
    }

    async fn ensure_grantee_in_company(&self, user_id: Uuid, company_id: Uuid) -> Result<(), AppError> {
        match self.users.find_by_id(user_id).await? {
            Some(user) if user.company_id == Some(company_id) => Ok(()),
            _ => Err(AppError::UserNotFound),
        }
    }
}
