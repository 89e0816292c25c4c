// src/db/sector_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::sectors::{Sector, SectorMember},
    services::permission_service::VisibleSectors,
};

#[derive(Clone)]
pub struct SectorRepository {
    pool: PgPool,
}

impl SectorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  LEITURA (sempre filtrada pelo resolvedor)
    // =========================================================================

    /// Lista apenas os setores visíveis.
    pub async fn list_visible(&self, visible: &VisibleSectors) -> Result<Vec<Sector>, AppError> {
        if visible.is_empty() {
            return Ok(Vec::new());
        }

        let sectors = sqlx::query_as::<_, Sector>(
            r#"
            SELECT id, company_id, name, description, color, is_active, created_at, updated_at
            FROM sectors
            WHERE id = ANY($1)
            ORDER BY name ASC
            "#,
        )
        .bind(visible.ids())
        .fetch_all(&self.pool)
        .await?;

        Ok(sectors)
    }

    pub async fn find_visible(
        &self,
        visible: &VisibleSectors,
        id: i64,
    ) -> Result<Option<Sector>, AppError> {
        // Fora do filtro = inexistente para este usuário
        if !visible.contains(id) {
            return Ok(None);
        }

        let sector = sqlx::query_as::<_, Sector>(
            r#"
            SELECT id, company_id, name, description, color, is_active, created_at, updated_at
            FROM sectors
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sector)
    }

    pub async fn list_members(&self, sector_id: i64) -> Result<Vec<SectorMember>, AppError> {
        let members = sqlx::query_as::<_, SectorMember>(
            r#"
            SELECT u.id AS user_id, u.username, u.full_name
            FROM sector_members m
            JOIN users u ON u.id = m.user_id
            WHERE m.sector_id = $1
            ORDER BY u.full_name
            "#,
        )
        .bind(sector_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }

    // =========================================================================
    //  ESCRITA (somente direção)
    // =========================================================================

    pub async fn create_sector<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        name: &str,
        description: Option<&str>,
        color: &str,
    ) -> Result<Sector, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sector = sqlx::query_as::<_, Sector>(
            r#"
            INSERT INTO sectors (company_id, name, description, color)
            VALUES ($1, $2, $3, $4)
            RETURNING id, company_id, name, description, color, is_active, created_at, updated_at
            "#,
        )
        .bind(company_id)
        .bind(name)
        .bind(description)
        .bind(color)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(format!(
                        "O setor '{}' já existe.",
                        name
                    ));
                }
            }
            e.into()
        })?;

        Ok(sector)
    }

    /// Vincula atendentes ao setor. Só entram usuários da mesma empresa.
    pub async fn add_members<'e, E>(
        &self,
        executor: E,
        sector_id: i64,
        company_id: Uuid,
        user_ids: &[Uuid],
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            INSERT INTO sector_members (sector_id, user_id)
            SELECT $1, u.id FROM users u
            WHERE u.id = ANY($2) AND u.company_id = $3
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(sector_id)
        .bind(user_ids)
        .bind(company_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }
}
