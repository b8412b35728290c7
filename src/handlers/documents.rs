// src/handlers/documents.rs

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::{common::error::AppError, config::AppState};

#[utoipa::path(
    get,
    path = "/api/offers/{id}/pdf",
    tag = "Offers",
    responses(
        (status = 200, description = "PDF do orçamento", body = Vec<u8>, content_type = "application/pdf"),
        (status = 404, description = "Orçamento não encontrado")
    ),
    params(("id" = i64, Path, description = "ID do orçamento")),
    security(("api_jwt" = []))
)]
pub async fn generate_offer_pdf(
    State(app_state): State<AppState>,
    Path(offer_id): Path<i64>,
) -> Result<Response, AppError> {
    let pdf_bytes = app_state
        .document_service
        .generate_offer_pdf(offer_id)
        .await?;

    // Configura os Headers para o navegador baixar ou mostrar o PDF
    let disposition = format!("attachment; filename=\"orcamento_{}.pdf\"", offer_id);
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (header::CONTENT_DISPOSITION, disposition),
    ];

    Ok((headers, pdf_bytes).into_response())
}
