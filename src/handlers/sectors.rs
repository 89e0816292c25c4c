// src/handlers/sectors.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::sectors::{CreateSectorPayload, Sector, SectorMember},
};

// GET /api/sectors
#[utoipa::path(
    get,
    path = "/api/sectors",
    tag = "Sectors",
    responses(
        (status = 200, description = "Setores visíveis para o usuário", body = Vec<Sector>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_sectors(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let sectors = app_state
        .sector_service
        .list_sectors(&user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(sectors))
}

// POST /api/sectors
#[utoipa::path(
    post,
    path = "/api/sectors",
    tag = "Sectors",
    request_body = CreateSectorPayload,
    responses(
        (status = 201, description = "Setor criado", body = Sector),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Somente a direção"),
        (status = 409, description = "Nome já usado na empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_sector(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateSectorPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let sector = app_state
        .sector_service
        .create_sector(&user, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(sector)))
}

// GET /api/sectors/{id}
#[utoipa::path(
    get,
    path = "/api/sectors/{id}",
    tag = "Sectors",
    params(("id" = i64, Path, description = "ID do setor")),
    responses(
        (status = 200, description = "Setor", body = Sector),
        (status = 404, description = "Setor inexistente ou invisível")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_sector(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let sector = app_state
        .sector_service
        .get_sector(&user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(sector))
}

// GET /api/sectors/{id}/members
#[utoipa::path(
    get,
    path = "/api/sectors/{id}/members",
    tag = "Sectors",
    params(("id" = i64, Path, description = "ID do setor")),
    responses(
        (status = 200, description = "Atendentes do setor", body = Vec<SectorMember>),
        (status = 404, description = "Setor inexistente ou invisível")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_sector_members(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let members = app_state
        .sector_service
        .list_members(&user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(members))
}
