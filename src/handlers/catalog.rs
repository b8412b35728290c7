// src/handlers/catalog.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{PermCatalogWrite, RequirePermission},
    models::catalog::{CreateProductPayload, Product, ProductCategory, UpdateProductPayload},
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListProductsParams {
    /// Filtra por categoria (module, inverter, storage, accessory, service)
    pub category: Option<ProductCategory>,
}

#[utoipa::path(
    post,
    path = "/api/catalog/products",
    tag = "Catalog",
    request_body = CreateProductPayload,
    responses(
        (status = 201, description = "Produto criado", body = Product),
        (status = 409, description = "Modelo já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermCatalogWrite>,
    Json(payload): Json<CreateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let product = app_state
        .product_repo
        .create(&app_state.db_pool, &payload)
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

#[utoipa::path(
    get,
    path = "/api/catalog/products",
    tag = "Catalog",
    params(ListProductsParams),
    responses((status = 200, description = "Produtos do catálogo", body = Vec<Product>)),
    security(("api_jwt" = []))
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    Query(params): Query<ListProductsParams>,
) -> Result<impl IntoResponse, AppError> {
    let products = app_state.product_repo.list(params.category).await?;
    Ok((StatusCode::OK, Json(products)))
}

#[utoipa::path(
    get,
    path = "/api/catalog/products/{id}",
    tag = "Catalog",
    responses(
        (status = 200, description = "Produto", body = Product),
        (status = 404, description = "Produto não encontrado")
    ),
    params(("id" = i64, Path, description = "ID do produto")),
    security(("api_jwt" = []))
)]
pub async fn get_product(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state
        .product_repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Produto não encontrado.".to_string()))?;
    Ok((StatusCode::OK, Json(product)))
}

// O app da loja referencia produtos pelo nome exato do modelo
#[utoipa::path(
    get,
    path = "/api/catalog/products/by-model/{model_name}",
    tag = "Catalog",
    responses(
        (status = 200, description = "Produto", body = Product),
        (status = 404, description = "Modelo não encontrado")
    ),
    params(("model_name" = String, Path, description = "Nome do modelo")),
    security(("api_jwt" = []))
)]
pub async fn get_product_by_model(
    State(app_state): State<AppState>,
    Path(model_name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state
        .product_repo
        .get_by_model_name(&model_name)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Modelo '{}' não encontrado.", model_name)))?;
    Ok((StatusCode::OK, Json(product)))
}

#[utoipa::path(
    put,
    path = "/api/catalog/products/{id}",
    tag = "Catalog",
    request_body = UpdateProductPayload,
    responses(
        (status = 200, description = "Produto atualizado", body = Product),
        (status = 404, description = "Produto não encontrado")
    ),
    params(("id" = i64, Path, description = "ID do produto")),
    security(("api_jwt" = []))
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermCatalogWrite>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let product = app_state
        .product_repo
        .update(&app_state.db_pool, id, &payload)
        .await?;
    Ok((StatusCode::OK, Json(product)))
}

#[utoipa::path(
    delete,
    path = "/api/catalog/products/{id}",
    tag = "Catalog",
    responses(
        (status = 204, description = "Produto removido"),
        (status = 404, description = "Produto não encontrado")
    ),
    params(("id" = i64, Path, description = "ID do produto")),
    security(("api_jwt" = []))
)]
pub async fn delete_product(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermCatalogWrite>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .product_repo
        .delete(&app_state.db_pool, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
