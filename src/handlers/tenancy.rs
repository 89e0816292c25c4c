// src/handlers/tenancy.rs

use axum::{extract::State, response::IntoResponse, Json};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::tenancy::Company,
};

// GET /api/companies/me
#[utoipa::path(
    get,
    path = "/api/companies/me",
    tag = "Tenancy",
    responses(
        (status = 200, description = "Empresa do usuário logado", body = Company),
        (status = 404, description = "Usuário sem empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_my_company(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let company = app_state
        .user_service
        .my_company(&user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(company))
}
