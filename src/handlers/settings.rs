// src/handlers/settings.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{PermSettingsWrite, RequirePermission},
    models::settings::{AdminSetting, UpsertSettingPayload},
};

#[utoipa::path(
    get,
    path = "/api/settings",
    tag = "Settings",
    responses((status = 200, description = "Todas as configurações", body = Vec<AdminSetting>)),
    security(("api_jwt" = []))
)]
pub async fn list_settings(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let settings = app_state.settings_repo.list().await?;
    Ok((StatusCode::OK, Json(settings)))
}

#[utoipa::path(
    get,
    path = "/api/settings/{key}",
    tag = "Settings",
    responses(
        (status = 200, description = "Configuração", body = AdminSetting),
        (status = 404, description = "Chave não encontrada")
    ),
    params(("key" = String, Path, description = "Chave da configuração")),
    security(("api_jwt" = []))
)]
pub async fn get_setting(
    State(app_state): State<AppState>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let setting = app_state
        .settings_repo
        .get(&key)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Configuração '{}' não encontrada.", key)))?;
    Ok((StatusCode::OK, Json(setting)))
}

// PUT cria ou substitui o blob da chave
#[utoipa::path(
    put,
    path = "/api/settings/{key}",
    tag = "Settings",
    request_body = UpsertSettingPayload,
    responses((status = 200, description = "Configuração gravada", body = AdminSetting)),
    params(("key" = String, Path, description = "Chave da configuração")),
    security(("api_jwt" = []))
)]
pub async fn upsert_setting(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermSettingsWrite>,
    Path(key): Path<String>,
    Json(payload): Json<UpsertSettingPayload>,
) -> Result<impl IntoResponse, AppError> {
    let setting = app_state
        .settings_repo
        .upsert(&app_state.db_pool, &key, &payload.value)
        .await?;
    Ok((StatusCode::OK, Json(setting)))
}

#[utoipa::path(
    delete,
    path = "/api/settings/{key}",
    tag = "Settings",
    responses(
        (status = 204, description = "Configuração removida"),
        (status = 404, description = "Chave não encontrada")
    ),
    params(("key" = String, Path, description = "Chave da configuração")),
    security(("api_jwt" = []))
)]
pub async fn delete_setting(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermSettingsWrite>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .settings_repo
        .delete(&app_state.db_pool, &key)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
