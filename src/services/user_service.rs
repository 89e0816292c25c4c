// src/services/user_service.rs

use bcrypt::hash;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{CompanyRepository, UserRepository},
    models::{
        auth::{CreateUserPayload, User},
        tenancy::Company,
    },
    services::permission_service::PermissionService,
};

#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    company_repo: CompanyRepository,
    permissions: PermissionService,
    pool: PgPool,
}

impl UserService {
    pub fn new(
        user_repo: UserRepository,
        company_repo: CompanyRepository,
        permissions: PermissionService,
        pool: PgPool,
    ) -> Self {
        Self {
            user_repo,
            company_repo,
            permissions,
            pool,
        }
    }

    /// Cadastro feito pela direção. O novo usuário herda sempre a empresa de quem cria.
    pub async fn create_user(&self, actor: &User, payload: CreateUserPayload) -> Result<User, AppError> {
        let company_id = self.permissions.require_full_access(actor)?;

        // Hashing fora do runtime async
        let password = payload.password.clone();
        let hashed_password = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let user = self
            .user_repo
            .create_user(
                &self.pool,
                company_id,
                &payload.username,
                &payload.email,
                &hashed_password,
                &payload.full_name,
                payload.role.as_str(),
                payload.phone.as_deref(),
            )
            .await?;

        tracing::info!(
            actor_id = %actor.id,
            user_id = %user.id,
            role = %user.role,
            "usuário criado"
        );
        Ok(user)
    }

    pub async fn list_users(&self, actor: &User) -> Result<Vec<User>, AppError> {
        let company_id = self.permissions.require_full_access(actor)?;
        self.user_repo.list_by_company(company_id).await
    }

    /// Empresa do usuário logado. Usuário sem empresa recebe 404.
    pub async fn my_company(&self, user: &User) -> Result<Company, AppError> {
        let not_found = || AppError::ResourceNotFound("empresa".to_string());

        let company_id = user.company_id.ok_or_else(not_found)?;
        self.company_repo.find_by_id(company_id).await?.ok_or_else(not_found)
    }
}
