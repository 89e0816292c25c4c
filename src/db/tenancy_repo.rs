// src/db/tenancy_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{common::error::AppError, models::tenancy::Company};

#[derive(Clone)]
pub struct CompanyRepository {
    pool: PgPool,
}

impl CompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Company>, AppError> {
        let company = sqlx::query_as::<_, Company>(
            r#"
            SELECT id, name, tax_id, plan, is_active, website,
                   contact_email, contact_phone, created_at, updated_at
            FROM companies
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(company)
    }

    /// Empresa ativa? Empresa inexistente conta como inativa.
    pub async fn is_active(&self, id: Uuid) -> Result<bool, AppError> {
        // SELECT EXISTS devolve sempre uma linha
        let active = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM companies WHERE id = $1 AND is_active)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(active)
    }
}
