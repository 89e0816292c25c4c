// src/models/rbac.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::auth::User;

// ---
// 1. Papéis (o valor gravado em users.role)
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum UserRole {
    /// "direcao": acesso total à empresa.
    #[serde(rename = "direcao")]
    Management,
    /// "administrativo": filtrado por permissões de setor.
    #[serde(rename = "administrativo")]
    Administrative,
    /// "comercial": filtrado por permissões de origem.
    #[serde(rename = "comercial")]
    Commercial,
    // Papéis legados, mantidos só para compatibilidade de leitura.
    #[serde(rename = "admin")]
    LegacyAdmin,
    #[serde(rename = "atendimento")]
    LegacySupport,
    #[serde(rename = "financeiro")]
    LegacyFinance,
}

impl UserRole {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "direcao" => Some(Self::Management),
            "administrativo" => Some(Self::Administrative),
            "comercial" => Some(Self::Commercial),
            "admin" => Some(Self::LegacyAdmin),
            "atendimento" => Some(Self::LegacySupport),
            "financeiro" => Some(Self::LegacyFinance),
            _ => None,
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::LegacyAdmin | Self::LegacySupport | Self::LegacyFinance)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Management => "direcao",
            Self::Administrative => "administrativo",
            Self::Commercial => "comercial",
            Self::LegacyAdmin => "admin",
            Self::LegacySupport => "atendimento",
            Self::LegacyFinance => "financeiro",
        }
    }
}

// ---
// 2. Escopo de acesso (resultado do classificador)
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessScope {
    FullAccess,
    SectorScoped,
    OriginScoped,
    NoAccess,
}

impl AccessScope {
    /// Classifica o usuário pelo papel e pela empresa.
    ///
    /// Usuário sem empresa, com papel legado ou desconhecido não acessa nada.
    /// Os dois eixos (setor e origem) são mutuamente exclusivos por papel.
    pub fn classify(user: &User) -> Self {
        if user.company_id.is_none() {
            return Self::NoAccess;
        }

        match user.parsed_role() {
            Some(UserRole::Management) => Self::FullAccess,
            Some(UserRole::Administrative) => Self::SectorScoped,
            Some(UserRole::Commercial) => Self::OriginScoped,
            Some(UserRole::LegacyAdmin | UserRole::LegacySupport | UserRole::LegacyFinance)
            | None => Self::NoAccess,
        }
    }
}

// ---
// 3. Permissões granulares
// ---

// Quais setores de atendimento um usuário pode acessar (papel administrativo)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SectorGrant {
    pub user_id: Uuid,
    #[schema(example = 5)]
    pub sector_id: i64,
    // Pode assumir e responder conversas do setor
    pub may_serve: bool,
    // Pode visualizar conversas do setor
    pub may_view: bool,
    pub created_at: DateTime<Utc>,
}

// Quais origens (fontes de leads) um usuário pode acessar (papel comercial)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OriginGrant {
    pub user_id: Uuid,
    #[schema(example = 7)]
    pub origin_id: i64,
    pub may_view: bool,
    // Pode editar leads desta origem
    pub may_edit: bool,
    // Pode atribuir leads desta origem para outros usuários
    pub may_assign: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertSectorGrantPayload {
    pub user_id: Uuid,
    #[validate(range(min = 1, message = "invalid_id"))]
    pub sector_id: i64,
    #[serde(default = "default_true")]
    pub may_serve: bool,
    #[serde(default = "default_true")]
    pub may_view: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertOriginGrantPayload {
    pub user_id: Uuid,
    #[validate(range(min = 1, message = "invalid_id"))]
    pub origin_id: i64,
    #[serde(default = "default_true")]
    pub may_view: bool,
    #[serde(default)]
    pub may_edit: bool,
    #[serde(default)]
    pub may_assign: bool,
}

fn default_true() -> bool {
    true
}

// Resposta de GET /api/permissions/me
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EffectivePermissions {
    pub scope: AccessScope,
    #[schema(example = json!([1, 2, 3]))]
    pub sector_ids: Vec<i64>,
    #[schema(example = json!([7]))]
    pub origin_ids: Vec<i64>,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn user_with(role: &str, company_id: Option<Uuid>) -> User {
        User {
            id: Uuid::new_v4(),
            company_id,
            username: format!("user-{role}"),
            email: format!("{role}@example.com"),
            password_hash: String::new(),
            full_name: String::new(),
            role: role.to_string(),
            phone: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn classify_maps_current_roles() {
        let company = Some(Uuid::new_v4());
        assert_eq!(AccessScope::classify(&user_with("direcao", company)), AccessScope::FullAccess);
        assert_eq!(
            AccessScope::classify(&user_with("administrativo", company)),
            AccessScope::SectorScoped
        );
        assert_eq!(
            AccessScope::classify(&user_with("comercial", company)),
            AccessScope::OriginScoped
        );
    }

    #[test]
    fn classify_denies_legacy_and_unknown_roles() {
        let company = Some(Uuid::new_v4());
        for role in ["admin", "atendimento", "financeiro", "superuser", "", "Direcao"] {
            assert_eq!(
                AccessScope::classify(&user_with(role, company)),
                AccessScope::NoAccess,
                "role {role:?}"
            );
        }
    }

    #[test]
    fn classify_denies_user_without_company() {
        assert_eq!(AccessScope::classify(&user_with("direcao", None)), AccessScope::NoAccess);
        assert_eq!(
            AccessScope::classify(&user_with("administrativo", None)),
            AccessScope::NoAccess
        );
    }

    #[test]
    fn role_string_mapping_is_stable() {
        for role in [
            UserRole::Management,
            UserRole::Administrative,
            UserRole::Commercial,
            UserRole::LegacyAdmin,
            UserRole::LegacySupport,
            UserRole::LegacyFinance,
        ] {
            assert_eq!(UserRole::parse(role.as_str()), Some(role));
            let json = serde_json::to_value(role).unwrap();
            assert_eq!(json, serde_json::Value::String(role.as_str().to_string()));
        }
    }

    #[test]
    fn grant_payload_defaults_follow_column_defaults() {
        let payload: UpsertOriginGrantPayload = serde_json::from_value(serde_json::json!({
            "userId": Uuid::nil(),
            "originId": 7
        }))
        .unwrap();
        assert!(payload.may_view);
        assert!(!payload.may_edit);
        assert!(!payload.may_assign);

        let payload: UpsertSectorGrantPayload = serde_json::from_value(serde_json::json!({
            "userId": Uuid::nil(),
            "sectorId": 5,
            "mayView": false
        }))
        .unwrap();
        assert!(payload.may_serve);
        assert!(!payload.may_view);
    }
}
