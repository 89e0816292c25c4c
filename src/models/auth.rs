// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::rbac::UserRole;

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,

    // Anulável apenas durante a migração dos usuários antigos.
    // Sem empresa = sem acesso (ver AccessScope::classify).
    pub company_id: Option<Uuid>,

    #[schema(example = "maria.souza")]
    pub username: String,
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub password_hash: String,

    #[schema(example = "Maria Souza")]
    pub full_name: String,

    // Texto livre no banco. Use `User::parsed_role` para obter o papel tipado.
    #[schema(example = "administrativo")]
    pub role: String,

    pub phone: Option<String>,
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Papel tipado. `None` para qualquer valor fora do conjunto conhecido.
    pub fn parsed_role(&self) -> Option<UserRole> {
        UserRole::parse(&self.role)
    }
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "maria.souza")]
    pub username: String,
    #[validate(length(min = 6, message = "password_too_short"))]
    pub password: String,
}

// Criação de usuário por alguém da direção (sempre na mesma empresa)
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserPayload {
    #[validate(length(min = 3, max = 150, message = "invalid_username"))]
    #[schema(example = "joao.lima")]
    pub username: String,

    #[validate(email(message = "invalid_email"))]
    #[schema(example = "joao@empresa.com.br")]
    pub email: String,

    #[validate(length(min = 6, message = "password_too_short"))]
    pub password: String,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "João Lima")]
    pub full_name: String,

    #[validate(custom(function = "validate_assignable_role"))]
    pub role: UserRole,

    pub phone: Option<String>,
}

// Papéis legados continuam legíveis, mas não podem ser atribuídos
fn validate_assignable_role(role: &UserRole) -> Result<(), ValidationError> {
    if role.is_legacy() {
        let mut err = ValidationError::new("role");
        err.message = Some("legacy_role".into());
        return Err(err);
    }
    Ok(())
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}

// Estrutura de dados ("claims") dentro do JWT.
// O papel NÃO vai no token: é relido do banco a cada requisição.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}
