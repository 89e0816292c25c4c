// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use chrono::TimeDelta;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{
        CompanyRepository, ConversationRepository, LeadRepository, OriginRepository, RbacRepository,
        SectorRepository, UserRepository,
    },
    services::{
        auth::{AuthService, TokenCodec},
        conversation_service::ConversationService,
        lead_service::LeadService,
        origin_service::OriginService,
        permission_service::PermissionService,
        rbac_service::RbacService,
        sector_service::SectorService,
        user_service::UserService,
    },
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_JWT_TTL_HOURS: i64 = 168;
const MAX_JWT_TTL_HOURS: i64 = 24 * 365;

/// Configuração lida uma única vez do ambiente (.env aceito).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub jwt_ttl: TimeDelta,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let db_max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("DB_MAX_CONNECTIONS inválido: {}", raw))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let jwt_ttl_hours: i64 = match lookup("JWT_TTL_HOURS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("JWT_TTL_HOURS inválido: {}", raw))?,
            None => DEFAULT_JWT_TTL_HOURS,
        };
        if !(1..=MAX_JWT_TTL_HOURS).contains(&jwt_ttl_hours) {
            anyhow::bail!(
                "JWT_TTL_HOURS deve estar entre 1 e {}: {}",
                MAX_JWT_TTL_HOURS,
                jwt_ttl_hours
            );
        }
        let jwt_ttl = TimeDelta::try_hours(jwt_ttl_hours)
            .with_context(|| format!("JWT_TTL_HOURS fora do intervalo: {}", jwt_ttl_hours))?;

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr,
            db_max_connections,
            jwt_ttl,
        })
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub i18n_store: Arc<I18nStore>,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub sector_service: SectorService,
    pub origin_service: OriginService,
    pub rbac_service: RbacService,
    pub conversation_service: ConversationService,
    pub lead_service: LeadService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::from_pool(db_pool, config))
    }

    // --- Monta o gráfico de dependências ---
    pub fn from_pool(db_pool: PgPool, config: &Config) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let company_repo = CompanyRepository::new(db_pool.clone());
        let rbac_repo = RbacRepository::new(db_pool.clone());

        let permission_service = PermissionService::new(Arc::new(rbac_repo.clone()));

        let tokens = TokenCodec::new(config.jwt_secret.clone(), config.jwt_ttl);
        let auth_service = AuthService::new(user_repo.clone(), company_repo.clone(), tokens);

        let user_service = UserService::new(
            user_repo.clone(),
            company_repo.clone(),
            permission_service.clone(),
            db_pool.clone(),
        );
        let sector_service = SectorService::new(
            SectorRepository::new(db_pool.clone()),
            permission_service.clone(),
            db_pool.clone(),
        );
        let origin_service =
            OriginService::new(OriginRepository::new(db_pool.clone()), permission_service.clone());
        let rbac_service = RbacService::new(
            Arc::new(rbac_repo),
            Arc::new(user_repo.clone()),
            permission_service.clone(),
        );
        let conversation_service = ConversationService::new(
            Arc::new(ConversationRepository::new(db_pool.clone())),
            permission_service.clone(),
        );
        let lead_service = LeadService::new(
            Arc::new(LeadRepository::new(db_pool.clone())),
            Arc::new(user_repo),
            permission_service.clone(),
        );

        Self {
            db_pool,
            i18n_store: Arc::new(I18nStore::default()),
            auth_service,
            user_service,
            sector_service,
            origin_service,
            rbac_service,
            conversation_service,
            lead_service,
        }
    }
}
