// src/models/sectors.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Setor de atendimento (Vendas, Suporte, Financeiro...)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Sector {
    #[schema(example = 5)]
    pub id: i64,

    #[schema(ignore)]
    pub company_id: Uuid,

    #[schema(example = "Suporte")]
    pub name: String,

    pub description: Option<String>,

    #[schema(example = "#3B82F6")]
    pub color: String,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Atendente vinculado diretamente ao setor
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SectorMember {
    pub user_id: Uuid,
    pub username: String,
    pub full_name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSectorPayload {
    #[validate(length(min = 1, max = 100, message = "required"))]
    #[schema(example = "Suporte")]
    pub name: String,

    pub description: Option<String>,

    #[validate(length(equal = 7, message = "invalid_color"))]
    #[schema(example = "#3B82F6")]
    pub color: Option<String>,

    // Atendentes vinculados ao setor desde a criação
    #[serde(default)]
    pub member_ids: Vec<Uuid>,
}
