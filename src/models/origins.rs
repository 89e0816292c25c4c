// src/models/origins.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

// Mapeia o CREATE TYPE origin_channel_kind do banco
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "origin_channel_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChannelKind {
    Website,
    RedesSociais,
    Email,
    Telefone,
    Indicacao,
    Evento,
    Publicidade,
    Organico,
    Direto,
    Outro,
}

// ---
// Canal de origem (Website, Redes Sociais...). É ele que liga a origem à empresa.
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OriginChannel {
    pub id: i64,
    #[schema(ignore)]
    pub company_id: Uuid,
    #[schema(example = "Redes Sociais")]
    pub name: String,
    pub kind: ChannelKind,
    pub description: Option<String>,
    pub color: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// Origem (a fonte de leads dentro de um canal: "Facebook Ads", "Google Ads"...)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Origin {
    #[schema(example = 7)]
    pub id: i64,
    pub channel_id: i64,

    #[schema(example = "Facebook Ads - Black Friday")]
    pub name: String,
    pub description: Option<String>,

    #[schema(example = "bf2025")]
    pub tracking_code: Option<String>,
    pub destination_url: Option<String>,

    #[schema(value_type = f64, example = 1500.00)]
    pub total_cost: Decimal,

    pub is_active: bool,

    #[schema(value_type = Option<String>, format = Date, example = "2025-11-01")]
    pub starts_on: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date, example = "2025-11-30")]
    pub ends_on: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Origin {
    /// A campanha está ativa na data informada?
    /// Sem data de início vale só a flag `is_active`.
    pub fn campaign_active(&self, today: NaiveDate) -> bool {
        if !self.is_active {
            return false;
        }

        match (self.starts_on, self.ends_on) {
            (None, _) => true,
            (Some(start), None) => start <= today,
            (Some(start), Some(end)) => start <= today && today <= end,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateChannelPayload {
    #[validate(length(min = 1, max = 100, message = "required"))]
    #[schema(example = "Redes Sociais")]
    pub name: String,
    pub kind: ChannelKind,
    pub description: Option<String>,
    #[validate(length(equal = 7, message = "invalid_color"))]
    pub color: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_campaign_period"))]
pub struct CreateOriginPayload {
    pub channel_id: i64,

    #[validate(length(min = 1, max = 150, message = "required"))]
    #[schema(example = "Facebook Ads - Black Friday")]
    pub name: String,
    pub description: Option<String>,

    #[validate(length(max = 100, message = "too_long"))]
    pub tracking_code: Option<String>,

    #[validate(url(message = "invalid_url"))]
    pub destination_url: Option<String>,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    #[schema(value_type = f64)]
    pub total_cost: Decimal,

    #[schema(value_type = Option<String>, format = Date)]
    pub starts_on: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date)]
    pub ends_on: Option<NaiveDate>,
}

fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.message = Some("negative_value".into());
        return Err(err);
    }
    Ok(())
}

fn validate_campaign_period(payload: &CreateOriginPayload) -> Result<(), ValidationError> {
    if let (Some(start), Some(end)) = (payload.starts_on, payload.ends_on) {
        if end < start {
            let mut err = ValidationError::new("campaign_period");
            err.message = Some("invalid_campaign_period".into());
            return Err(err);
        }
    }
    Ok(())
}
