// src/handlers/conversations.rs

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::conversations::{Conversation, ConversationFilter, TransferConversationPayload},
};

// GET /api/conversations
#[utoipa::path(
    get,
    path = "/api/conversations",
    tag = "Conversations",
    params(ConversationFilter),
    responses(
        (status = 200, description = "Conversas dos setores visíveis", body = Vec<Conversation>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_conversations(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(filter): Query<ConversationFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let conversations = app_state
        .conversation_service
        .list_conversations(&user, &filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(conversations))
}

// POST /api/conversations/{id}/transfer
#[utoipa::path(
    post,
    path = "/api/conversations/{id}/transfer",
    tag = "Conversations",
    params(("id" = i64, Path, description = "ID da conversa")),
    request_body = TransferConversationPayload,
    responses(
        (status = 200, description = "Conversa transferida", body = Conversation),
        (status = 403, description = "Sem permissão para atender o setor atual ou o de destino"),
        (status = 404, description = "Conversa inexistente ou invisível"),
        (status = 409, description = "Conversa fechada")
    ),
    security(("api_jwt" = []))
)]
pub async fn transfer_conversation(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i64>,
    Json(payload): Json<TransferConversationPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let conversation = app_state
        .conversation_service
        .transfer(&user, id, payload.sector_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(conversation))
}

// POST /api/conversations/{id}/take
#[utoipa::path(
    post,
    path = "/api/conversations/{id}/take",
    tag = "Conversations",
    params(("id" = i64, Path, description = "ID da conversa")),
    responses(
        (status = 200, description = "Conversa assumida", body = Conversation),
        (status = 403, description = "Sem permissão para atender o setor"),
        (status = 404, description = "Conversa inexistente ou invisível"),
        (status = 409, description = "Conversa não está aguardando")
    ),
    security(("api_jwt" = []))
)]
pub async fn take_conversation(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let conversation = app_state
        .conversation_service
        .take(&user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(conversation))
}

// POST /api/conversations/{id}/resolve
#[utoipa::path(
    post,
    path = "/api/conversations/{id}/resolve",
    tag = "Conversations",
    params(("id" = i64, Path, description = "ID da conversa")),
    responses(
        (status = 200, description = "Conversa resolvida", body = Conversation),
        (status = 403, description = "Sem permissão para atender o setor"),
        (status = 404, description = "Conversa inexistente ou invisível"),
        (status = 409, description = "Conversa não está em atendimento")
    ),
    security(("api_jwt" = []))
)]
pub async fn resolve_conversation(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let conversation = app_state
        .conversation_service
        .resolve(&user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(conversation))
}

// POST /api/conversations/{id}/close
#[utoipa::path(
    post,
    path = "/api/conversations/{id}/close",
    tag = "Conversations",
    params(("id" = i64, Path, description = "ID da conversa")),
    responses(
        (status = 200, description = "Conversa fechada", body = Conversation),
        (status = 403, description = "Sem permissão para atender o setor"),
        (status = 404, description = "Conversa inexistente ou invisível"),
        (status = 409, description = "Conversa já fechada")
    ),
    security(("api_jwt" = []))
)]
pub async fn close_conversation(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let conversation = app_state
        .conversation_service
        .close(&user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(conversation))
}
