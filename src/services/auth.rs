// src/services/auth.rs

use bcrypt::verify;
use chrono::{TimeDelta, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CompanyRepository, UserDirectory, UserRepository},
    models::auth::{Claims, User},
};

/// Emissão e leitura dos JWT (HS256).
#[derive(Clone)]
pub struct TokenCodec {
    secret: String,
    ttl: TimeDelta,
}

impl TokenCodec {
    pub fn new(secret: String, ttl: TimeDelta) -> Self {
        Self { secret, ttl }
    }

    pub fn issue(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| anyhow::anyhow!("validade do token fora do intervalo de datas"))?;

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )?)
    }

    /// ID do usuário dono do token. Assinatura ou validade ruins viram `InvalidToken`.
    pub fn verify(&self, token: &str) -> Result<Uuid, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        Ok(token_data.claims.sub)
    }
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    company_repo: CompanyRepository,
    tokens: TokenCodec,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, company_repo: CompanyRepository, tokens: TokenCodec) -> Self {
        Self {
            user_repo,
            company_repo,
            tokens,
        }
    }

    pub async fn login_user(&self, username: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        // Usuário desativado não recebe token (mesma resposta de senha errada)
        if !is_password_valid || !user.is_active {
            return Err(AppError::InvalidCredentials);
        }

        self.ensure_company_active(&user).await?;

        tracing::info!(user_id = %user.id, "login efetuado");
        self.tokens.issue(user.id)
    }

    /// Recarrega o usuário a cada requisição: papel e empresa nunca vêm do token.
    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let user_id = self.tokens.verify(token)?;

        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        if !user.is_active {
            return Err(AppError::InvalidToken);
        }

        self.ensure_company_active(&user).await?;
        Ok(user)
    }

    // Sem empresa o login passa; o classificador resolve para "sem acesso".
    async fn ensure_company_active(&self, user: &User) -> Result<(), AppError> {
        if let Some(company_id) = user.company_id {
            if !self.company_repo.is_active(company_id).await? {
                return Err(AppError::CompanyInactive);
            }
        }
        Ok(())
    }
}
