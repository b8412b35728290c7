// src/handlers/companies.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{PermCompaniesWrite, RequirePermission},
    models::company::{Company, CreateCompanyPayload, UpdateCompanyPayload},
};

#[utoipa::path(
    post,
    path = "/api/companies",
    tag = "Companies",
    request_body = CreateCompanyPayload,
    responses(
        (status = 201, description = "Empresa criada", body = Company),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_company(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermCompaniesWrite>,
    Json(payload): Json<CreateCompanyPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let company = app_state
        .company_repo
        .create(&app_state.db_pool, &payload)
        .await?;

    Ok((StatusCode::CREATED, Json(company)))
}

#[utoipa::path(
    get,
    path = "/api/companies",
    tag = "Companies",
    responses((status = 200, description = "Lista de empresas", body = Vec<Company>)),
    security(("api_jwt" = []))
)]
pub async fn list_companies(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let companies = app_state.company_repo.list().await?;
    Ok((StatusCode::OK, Json(companies)))
}

// A empresa que assina os PDFs
#[utoipa::path(
    get,
    path = "/api/companies/default",
    tag = "Companies",
    responses(
        (status = 200, description = "Empresa padrão", body = Company),
        (status = 404, description = "Nenhuma empresa padrão definida")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_default_company(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let company = app_state
        .company_repo
        .get_default()
        .await?
        .ok_or_else(|| AppError::NotFound("Nenhuma empresa padrão definida.".to_string()))?;
    Ok((StatusCode::OK, Json(company)))
}

#[utoipa::path(
    get,
    path = "/api/companies/{id}",
    tag = "Companies",
    responses(
        (status = 200, description = "Empresa", body = Company),
        (status = 404, description = "Empresa não encontrada")
    ),
    params(("id" = i64, Path, description = "ID da empresa")),
    security(("api_jwt" = []))
)]
pub async fn get_company(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let company = app_state
        .company_repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Empresa não encontrada.".to_string()))?;
    Ok((StatusCode::OK, Json(company)))
}

#[utoipa::path(
    put,
    path = "/api/companies/{id}",
    tag = "Companies",
    request_body = UpdateCompanyPayload,
    responses(
        (status = 200, description = "Empresa atualizada", body = Company),
        (status = 404, description = "Empresa não encontrada")
    ),
    params(("id" = i64, Path, description = "ID da empresa")),
    security(("api_jwt" = []))
)]
pub async fn update_company(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermCompaniesWrite>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCompanyPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let company = app_state
        .company_repo
        .update(&app_state.db_pool, id, &payload)
        .await?;
    Ok((StatusCode::OK, Json(company)))
}

#[utoipa::path(
    delete,
    path = "/api/companies/{id}",
    tag = "Companies",
    responses(
        (status = 204, description = "Empresa removida"),
        (status = 400, description = "A empresa padrão não pode ser excluída"),
        (status = 404, description = "Empresa não encontrada")
    ),
    params(("id" = i64, Path, description = "ID da empresa")),
    security(("api_jwt" = []))
)]
pub async fn delete_company(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermCompaniesWrite>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .company_repo
        .delete(&app_state.db_pool, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/companies/{id}/default",
    tag = "Companies",
    responses(
        (status = 200, description = "Empresa marcada como padrão", body = Company),
        (status = 404, description = "Empresa não encontrada")
    ),
    params(("id" = i64, Path, description = "ID da empresa")),
    security(("api_jwt" = []))
)]
pub async fn set_default_company(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermCompaniesWrite>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let company = app_state.company_repo.set_default(id).await?;
    Ok((StatusCode::OK, Json(company)))
}
