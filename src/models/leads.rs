// src/models/leads.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

// Cada lead capturado de uma origem (com os dados UTM da visita)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: i64,
    #[schema(ignore)]
    pub company_id: Uuid,
    #[schema(example = 7)]
    pub origin_id: i64,

    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,

    // Dados UTM (Urchin Tracking Module)
    #[schema(example = "facebook")]
    pub utm_source: Option<String>,
    #[schema(example = "cpc")]
    pub utm_medium: Option<String>,
    #[schema(example = "black_friday")]
    pub utm_campaign: Option<String>,
    pub utm_term: Option<String>,
    pub utm_content: Option<String>,

    pub notes: Option<String>,
    pub assigned_to: Option<Uuid>,

    pub converted: bool,
    pub converted_at: Option<DateTime<Utc>>,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct LeadFilter {
    pub origin_id: Option<i64>,
    pub converted: Option<bool>,
    pub utm_source: Option<String>,
    pub utm_campaign: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeadPayload {
    #[validate(length(min = 1, message = "required"))]
    pub contact_name: Option<String>,
    #[validate(length(max = 20, message = "too_long"))]
    pub contact_phone: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignLeadPayload {
    pub user_id: Uuid,
}
