// src/models/tenancy.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Mapeia o CREATE TYPE company_plan do banco
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "company_plan", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CompanyPlan {
    Basico,
    Profissional,
    Empresarial,
    Trial,
}

// ---
// Company (a "Empresa", o tenant)
// ---
// Todo dado do CRM pertence a exatamente uma empresa.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: Uuid,

    #[schema(example = "PMB Comércio Ltda")]
    pub name: String,

    #[schema(example = "12.345.678/0001-99")]
    pub tax_id: Option<String>,

    pub plan: CompanyPlan,

    // Empresas inativas não podem acessar o sistema
    pub is_active: bool,

    pub website: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
