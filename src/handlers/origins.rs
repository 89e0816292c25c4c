// src/handlers/origins.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::origins::{CreateChannelPayload, CreateOriginPayload, Origin, OriginChannel},
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct OriginListQuery {
    /// true = só campanhas ativas hoje; false = só inativas
    pub campaign_active: Option<bool>,
}

// =============================================================================
//  CANAIS
// =============================================================================

// GET /api/origins/channels
#[utoipa::path(
    get,
    path = "/api/origins/channels",
    tag = "Origins",
    responses(
        (status = 200, description = "Canais da empresa", body = Vec<OriginChannel>),
        (status = 403, description = "Somente a direção")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_channels(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let channels = app_state
        .origin_service
        .list_channels(&user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(channels))
}

// POST /api/origins/channels
#[utoipa::path(
    post,
    path = "/api/origins/channels",
    tag = "Origins",
    request_body = CreateChannelPayload,
    responses(
        (status = 201, description = "Canal criado", body = OriginChannel),
        (status = 403, description = "Somente a direção"),
        (status = 409, description = "Nome já usado na empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_channel(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateChannelPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let channel = app_state
        .origin_service
        .create_channel(&user, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(channel)))
}

// =============================================================================
//  ORIGENS
// =============================================================================

// GET /api/origins
#[utoipa::path(
    get,
    path = "/api/origins",
    tag = "Origins",
    params(OriginListQuery),
    responses(
        (status = 200, description = "Origens visíveis para o usuário", body = Vec<Origin>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_origins(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<OriginListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let origins = app_state
        .origin_service
        .list_origins(&user, query.campaign_active)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(origins))
}

// POST /api/origins
#[utoipa::path(
    post,
    path = "/api/origins",
    tag = "Origins",
    request_body = CreateOriginPayload,
    responses(
        (status = 201, description = "Origem criada", body = Origin),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Somente a direção"),
        (status = 404, description = "Canal inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_origin(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateOriginPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let origin = app_state
        .origin_service
        .create_origin(&user, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(origin)))
}

// GET /api/origins/{id}
#[utoipa::path(
    get,
    path = "/api/origins/{id}",
    tag = "Origins",
    params(("id" = i64, Path, description = "ID da origem")),
    responses(
        (status = 200, description = "Origem", body = Origin),
        (status = 404, description = "Origem inexistente ou invisível")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_origin(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let origin = app_state
        .origin_service
        .get_origin(&user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(origin))
}
