// src/db/rbac_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::rbac::{OriginGrant, SectorGrant};

/// Porta de leitura das permissões granulares.
///
/// É tudo o que o resolvedor de visibilidade e o portão de ações consultam.
/// Somente leitura: nada aqui altera permissões.
#[async_trait]
pub trait PermissionStore: Send + Sync {
    /// IDs de todos os setores da empresa.
    async fn company_sector_ids(&self, company_id: Uuid) -> Result<Vec<i64>, AppError>;

    /// IDs de todas as origens da empresa (via canal).
    async fn company_origin_ids(&self, company_id: Uuid) -> Result<Vec<i64>, AppError>;

    /// Setores com permissão `may_serve OR may_view` para o usuário.
    async fn granted_sector_ids(&self, user_id: Uuid) -> Result<Vec<i64>, AppError>;

    /// Origens com permissão `may_view OR may_edit OR may_assign` para o usuário.
    async fn granted_origin_ids(&self, user_id: Uuid) -> Result<Vec<i64>, AppError>;

    async fn find_sector_grant(
        &self,
        user_id: Uuid,
        sector_id: i64,
    ) -> Result<Option<SectorGrant>, AppError>;

    async fn find_origin_grant(
        &self,
        user_id: Uuid,
        origin_id: i64,
    ) -> Result<Option<OriginGrant>, AppError>;

    async fn sector_in_company(&self, sector_id: i64, company_id: Uuid) -> Result<bool, AppError>;

    async fn origin_in_company(&self, origin_id: i64, company_id: Uuid) -> Result<bool, AppError>;
}

/// Porta de escrita das permissões (somente direção, via `RbacService`).
///
/// Estende a porta de leitura: o serviço também confere se o setor ou a
/// origem pertence à empresa antes de gravar.
#[async_trait]
pub trait GrantStore: PermissionStore {
    /// Cria ou sobrescreve a permissão do par (usuário, setor). Nunca duplica.
    async fn upsert_sector_grant(
        &self,
        user_id: Uuid,
        sector_id: i64,
        may_serve: bool,
        may_view: bool,
    ) -> Result<SectorGrant, AppError>;

    async fn delete_sector_grant(&self, user_id: Uuid, sector_id: i64) -> Result<bool, AppError>;

    /// Todas as permissões de setor da empresa (para a tela de administração).
    async fn list_sector_grants(&self, company_id: Uuid) -> Result<Vec<SectorGrant>, AppError>;

    async fn upsert_origin_grant(
        &self,
        user_id: Uuid,
        origin_id: i64,
        may_view: bool,
        may_edit: bool,
        may_assign: bool,
    ) -> Result<OriginGrant, AppError>;

    async fn delete_origin_grant(&self, user_id: Uuid, origin_id: i64) -> Result<bool, AppError>;

    async fn list_origin_grants(&self, company_id: Uuid) -> Result<Vec<OriginGrant>, AppError>;
}

#[derive(Clone)]
pub struct RbacRepository {
    pool: PgPool,
}

impl RbacRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GrantStore for RbacRepository {
    // =========================================================================
    //  PERMISSÕES DE SETOR (escrita: somente direção, via RbacService)
    // =========================================================================

    async fn upsert_sector_grant(
        &self,
        user_id: Uuid,
        sector_id: i64,
        may_serve: bool,
        may_view: bool,
    ) -> Result<SectorGrant, AppError> {
        let grant = sqlx::query_as::<_, SectorGrant>(
            r#"
            INSERT INTO sector_grants (user_id, sector_id, may_serve, may_view)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, sector_id)
            DO UPDATE SET
                may_serve = EXCLUDED.may_serve,
                may_view = EXCLUDED.may_view
            RETURNING user_id, sector_id, may_serve, may_view, created_at
            "#,
        )
        .bind(user_id)
        .bind(sector_id)
        .bind(may_serve)
        .bind(may_view)
        .fetch_one(&self.pool)
        .await?;

        Ok(grant)
    }

    async fn delete_sector_grant(&self, user_id: Uuid, sector_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM sector_grants WHERE user_id = $1 AND sector_id = $2")
            .bind(user_id)
            .bind(sector_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_sector_grants(&self, company_id: Uuid) -> Result<Vec<SectorGrant>, AppError> {
        let grants = sqlx::query_as::<_, SectorGrant>(
            r#"
            SELECT g.user_id, g.sector_id, g.may_serve, g.may_view, g.created_at
            FROM sector_grants g
            JOIN sectors s ON s.id = g.sector_id
            WHERE s.company_id = $1
            ORDER BY g.sector_id, g.user_id
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(grants)
    }

    // =========================================================================
    //  PERMISSÕES DE ORIGEM
    // =========================================================================

    async fn upsert_origin_grant(
        &self,
        user_id: Uuid,
        origin_id: i64,
        may_view: bool,
        may_edit: bool,
        may_assign: bool,
    ) -> Result<OriginGrant, AppError> {
        let grant = sqlx::query_as::<_, OriginGrant>(
            r#"
            INSERT INTO origin_grants (user_id, origin_id, may_view, may_edit, may_assign)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, origin_id)
            DO UPDATE SET
                may_view = EXCLUDED.may_view,
                may_edit = EXCLUDED.may_edit,
                may_assign = EXCLUDED.may_assign
            RETURNING user_id, origin_id, may_view, may_edit, may_assign, created_at
            "#,
        )
        .bind(user_id)
        .bind(origin_id)
        .bind(may_view)
        .bind(may_edit)
        .bind(may_assign)
        .fetch_one(&self.pool)
        .await?;

        Ok(grant)
    }

    async fn delete_origin_grant(&self, user_id: Uuid, origin_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM origin_grants WHERE user_id = $1 AND origin_id = $2")
            .bind(user_id)
            .bind(origin_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_origin_grants(&self, company_id: Uuid) -> Result<Vec<OriginGrant>, AppError> {
        let grants = sqlx::query_as::<_, OriginGrant>(
            r#"
            SELECT g.user_id, g.origin_id, g.may_view, g.may_edit, g.may_assign, g.created_at
            FROM origin_grants g
            JOIN origins o ON o.id = g.origin_id
            JOIN origin_channels c ON c.id = o.channel_id
            WHERE c.company_id = $1
            ORDER BY g.origin_id, g.user_id
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(grants)
    }
}

#[async_trait]
impl PermissionStore for RbacRepository {
    async fn company_sector_ids(&self, company_id: Uuid) -> Result<Vec<i64>, AppError> {
        let ids = sqlx::query_scalar::<_, i64>("SELECT id FROM sectors WHERE company_id = $1")
            .bind(company_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(ids)
    }

    async fn company_origin_ids(&self, company_id: Uuid) -> Result<Vec<i64>, AppError> {
        let ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT o.id
            FROM origins o
            JOIN origin_channels c ON c.id = o.channel_id
            WHERE c.company_id = $1
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn granted_sector_ids(&self, user_id: Uuid) -> Result<Vec<i64>, AppError> {
        let ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT sector_id FROM sector_grants
            WHERE user_id = $1 AND (may_serve OR may_view)
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn granted_origin_ids(&self, user_id: Uuid) -> Result<Vec<i64>, AppError> {
        let ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT origin_id FROM origin_grants
            WHERE user_id = $1 AND (may_view OR may_edit OR may_assign)
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn find_sector_grant(
        &self,
        user_id: Uuid,
        sector_id: i64,
    ) -> Result<Option<SectorGrant>, AppError> {
        let grant = sqlx::query_as::<_, SectorGrant>(
            r#"
            SELECT user_id, sector_id, may_serve, may_view, created_at
            FROM sector_grants
            WHERE user_id = $1 AND sector_id = $2
            "#,
        )
        .bind(user_id)
        .bind(sector_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(grant)
    }

    async fn find_origin_grant(
        &self,
        user_id: Uuid,
        origin_id: i64,
    ) -> Result<Option<OriginGrant>, AppError> {
        let grant = sqlx::query_as::<_, OriginGrant>(
            r#"
            SELECT user_id, origin_id, may_view, may_edit, may_assign, created_at
            FROM origin_grants
            WHERE user_id = $1 AND origin_id = $2
            "#,
        )
        .bind(user_id)
        .bind(origin_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(grant)
    }

    async fn sector_in_company(&self, sector_id: i64, company_id: Uuid) -> Result<bool, AppError> {
        // SELECT EXISTS: só precisamos de true/false
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM sectors WHERE id = $1 AND company_id = $2)",
        )
        .bind(sector_id)
        .bind(company_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn origin_in_company(&self, origin_id: i64, company_id: Uuid) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM origins o
                JOIN origin_channels c ON c.id = o.channel_id
                WHERE o.id = $1 AND c.company_id = $2
            )
            "#,
        )
        .bind(origin_id)
        .bind(company_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}
