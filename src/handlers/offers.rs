// src/handlers/offers.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use validator::Validate;

use crate::{
    common::currency::format_brl,
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{PermOffersWrite, RequirePermission},
    },
    models::offer::{
        CreateOfferPayload, Offer, OfferDetail, PreviewOfferPayload, UpdateOfferStatusPayload,
    },
    models::pricing::PricingBreakdown,
    services::offer_service::extras_from_payload,
};

#[utoipa::path(
    post,
    path = "/api/offers",
    tag = "Offers",
    request_body = CreateOfferPayload,
    responses(
        (status = 201, description = "Orçamento criado com o cálculo fechado", body = OfferDetail),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Cliente ou produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_offer(
    State(app_state): State<AppState>,
    AuthenticatedUser(seller): AuthenticatedUser,
    _guard: RequirePermission<PermOffersWrite>,
    Json(payload): Json<CreateOfferPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let detail = app_state.offer_service.create(&seller, &payload).await?;

    Ok((StatusCode::CREATED, Json(detail)))
}

// O "preview ao vivo" da tela de montagem: roda o motor de preços
// sem gravar nada. Devolve o espelho numérico e as strings já
// formatadas em moeda.
#[utoipa::path(
    post,
    path = "/api/offers/preview",
    tag = "Offers",
    request_body = PreviewOfferPayload,
    responses(
        (status = 200, description = "Cálculo do orçamento", body = PricingBreakdown),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn preview_offer(
    State(app_state): State<AppState>,
    Json(payload): Json<PreviewOfferPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let extras = extras_from_payload(&payload.extras);
    let breakdown = app_state
        .offer_service
        .preview(&payload.items, &extras, &payload.conditions)
        .await?;

    let body = json!({
        "breakdown": &breakdown,
        "formatted": {
            "itemsSubtotal": format_brl(breakdown.items_subtotal),
            "discountTotal": format_brl(breakdown.discount_total),
            "surchargeTotal": format_brl(breakdown.surcharge_total),
            "netTotal": format_brl(breakdown.net_total),
            "vatAmount": format_brl(breakdown.vat_amount),
            "grossTotal": format_brl(breakdown.gross_total),
        }
    });

    Ok((StatusCode::OK, Json(body)))
}

#[utoipa::path(
    get,
    path = "/api/offers",
    tag = "Offers",
    responses((status = 200, description = "Orçamentos, mais recentes primeiro", body = Vec<Offer>)),
    security(("api_jwt" = []))
)]
pub async fn list_offers(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let offers = app_state.offer_repo.list().await?;
    Ok((StatusCode::OK, Json(offers)))
}

#[utoipa::path(
    get,
    path = "/api/offers/{id}",
    tag = "Offers",
    responses(
        (status = 200, description = "Orçamento completo", body = OfferDetail),
        (status = 404, description = "Orçamento não encontrado")
    ),
    params(("id" = i64, Path, description = "ID do orçamento")),
    security(("api_jwt" = []))
)]
pub async fn get_offer(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let detail = app_state.offer_service.get_detail(id).await?;
    Ok((StatusCode::OK, Json(detail)))
}

#[utoipa::path(
    put,
    path = "/api/offers/{id}/status",
    tag = "Offers",
    request_body = UpdateOfferStatusPayload,
    responses(
        (status = 204, description = "Status alterado"),
        (status = 404, description = "Orçamento não encontrado")
    ),
    params(("id" = i64, Path, description = "ID do orçamento")),
    security(("api_jwt" = []))
)]
pub async fn update_offer_status(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermOffersWrite>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateOfferStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .offer_repo
        .set_status(&app_state.db_pool, id, payload.status)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
