//src/main.rs

use anyhow::Context;
use axum::{
    middleware as axum_middleware,
    routing::{delete, get, patch, post},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Config};
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;
    let app_state = AppState::new(&config).await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .context("Falha ao rodar as migrações do banco de dados.")?;

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let app = router(app_state);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Falha ao iniciar o listener TCP em {}", config.bind_addr))?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("Erro no servidor Axum")?;
    Ok(())
}

fn router(app_state: AppState) -> Router {
    // Rotas públicas
    let auth_routes = Router::new().route("/login", post(handlers::auth::login));

    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .route(
            "/",
            get(handlers::users::list_users).post(handlers::users::create_user),
        );

    let company_routes = Router::new().route("/me", get(handlers::tenancy::get_my_company));

    let sector_routes = Router::new()
        .route(
            "/",
            get(handlers::sectors::list_sectors).post(handlers::sectors::create_sector),
        )
        .route("/{id}", get(handlers::sectors::get_sector))
        .route("/{id}/members", get(handlers::sectors::list_sector_members));

    let origin_routes = Router::new()
        .route(
            "/",
            get(handlers::origins::list_origins).post(handlers::origins::create_origin),
        )
        .route(
            "/channels",
            get(handlers::origins::list_channels).post(handlers::origins::create_channel),
        )
        .route("/{id}", get(handlers::origins::get_origin));

    let permission_routes = Router::new()
        .route("/me", get(handlers::rbac::my_permissions))
        .route(
            "/sectors",
            get(handlers::rbac::list_sector_grants).put(handlers::rbac::upsert_sector_grant),
        )
        .route(
            "/sectors/{user_id}/{sector_id}",
            delete(handlers::rbac::delete_sector_grant),
        )
        .route(
            "/origins",
            get(handlers::rbac::list_origin_grants).put(handlers::rbac::upsert_origin_grant),
        )
        .route(
            "/origins/{user_id}/{origin_id}",
            delete(handlers::rbac::delete_origin_grant),
        );

    let conversation_routes = Router::new()
        .route("/", get(handlers::conversations::list_conversations))
        .route("/{id}/transfer", post(handlers::conversations::transfer_conversation))
        .route("/{id}/take", post(handlers::conversations::take_conversation))
        .route("/{id}/resolve", post(handlers::conversations::resolve_conversation))
        .route("/{id}/close", post(handlers::conversations::close_conversation));

    let lead_routes = Router::new()
        .route("/", get(handlers::leads::list_leads))
        .route("/{id}", patch(handlers::leads::update_lead))
        .route("/{id}/assign", post(handlers::leads::assign_lead))
        .route("/{id}/convert", post(handlers::leads::convert_lead));

    // Tudo abaixo exige Bearer token válido
    let protected = Router::new()
        .nest("/users", user_routes)
        .nest("/companies", company_routes)
        .nest("/sectors", sector_routes)
        .nest("/origins", origin_routes)
        .nest("/permissions", permission_routes)
        .nest("/conversations", conversation_routes)
        .nest("/leads", lead_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api", protected)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
}
