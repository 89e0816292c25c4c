// src/handlers/rbac.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::rbac::{
        EffectivePermissions, OriginGrant, SectorGrant, UpsertOriginGrantPayload,
        UpsertSectorGrantPayload,
    },
};

// GET /api/permissions/me
#[utoipa::path(
    get,
    path = "/api/permissions/me",
    tag = "RBAC",
    responses(
        (status = 200, description = "Escopo e IDs visíveis do usuário", body = EffectivePermissions)
    ),
    security(("api_jwt" = []))
)]
pub async fn my_permissions(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let permissions = app_state
        .rbac_service
        .my_permissions(&user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(permissions))
}

// =============================================================================
//  PERMISSÕES DE SETOR
// =============================================================================

// GET /api/permissions/sectors
#[utoipa::path(
    get,
    path = "/api/permissions/sectors",
    tag = "RBAC",
    responses(
        (status = 200, description = "Permissões de setor da empresa", body = Vec<SectorGrant>),
        (status = 403, description = "Somente a direção")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_sector_grants(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let grants = app_state
        .rbac_service
        .list_sector_grants(&user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(grants))
}

// PUT /api/permissions/sectors
#[utoipa::path(
    put,
    path = "/api/permissions/sectors",
    tag = "RBAC",
    request_body = UpsertSectorGrantPayload,
    responses(
        (status = 200, description = "Permissão criada ou sobrescrita", body = SectorGrant),
        (status = 403, description = "Somente a direção"),
        (status = 404, description = "Usuário ou setor fora da empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn upsert_sector_grant(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<UpsertSectorGrantPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let grant = app_state
        .rbac_service
        .upsert_sector_grant(&user, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(grant))
}

// DELETE /api/permissions/sectors/{user_id}/{sector_id}
#[utoipa::path(
    delete,
    path = "/api/permissions/sectors/{user_id}/{sector_id}",
    tag = "RBAC",
    params(
        ("user_id" = Uuid, Path, description = "ID do usuário"),
        ("sector_id" = i64, Path, description = "ID do setor")
    ),
    responses(
        (status = 204, description = "Permissão removida"),
        (status = 403, description = "Somente a direção"),
        (status = 404, description = "Permissão inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_sector_grant(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path((user_id, sector_id)): Path<(Uuid, i64)>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .rbac_service
        .delete_sector_grant(&user, user_id, sector_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  PERMISSÕES DE ORIGEM
// =============================================================================

// GET /api/permissions/origins
#[utoipa::path(
    get,
    path = "/api/permissions/origins",
    tag = "RBAC",
    responses(
        (status = 200, description = "Permissões de origem da empresa", body = Vec<OriginGrant>),
        (status = 403, description = "Somente a direção")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_origin_grants(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let grants = app_state
        .rbac_service
        .list_origin_grants(&user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(grants))
}

// PUT /api/permissions/origins
#[utoipa::path(
    put,
    path = "/api/permissions/origins",
    tag = "RBAC",
    request_body = UpsertOriginGrantPayload,
    responses(
        (status = 200, description = "Permissão criada ou sobrescrita", body = OriginGrant),
        (status = 403, description = "Somente a direção"),
        (status = 404, description = "Usuário ou origem fora da empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn upsert_origin_grant(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<UpsertOriginGrantPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let grant = app_state
        .rbac_service
        .upsert_origin_grant(&user, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(grant))
}

// DELETE /api/permissions/origins/{user_id}/{origin_id}
#[utoipa::path(
    delete,
    path = "/api/permissions/origins/{user_id}/{origin_id}",
    tag = "RBAC",
    params(
        ("user_id" = Uuid, Path, description = "ID do usuário"),
        ("origin_id" = i64, Path, description = "ID da origem")
    ),
    responses(
        (status = 204, description = "Permissão removida"),
        (status = 403, description = "Somente a direção"),
        (status = 404, description = "Permissão inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_origin_grant(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path((user_id, origin_id)): Path<(Uuid, i64)>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .rbac_service
        .delete_origin_grant(&user, user_id, origin_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
