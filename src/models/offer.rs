// src/models/offer.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use validator::Validate;

use crate::models::pricing::{CalculatePer, PricingConditions};

// --- Situação do orçamento ---
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    #[default]
    Draft,
    Sent,
    Accepted,
    Rejected,
}

impl OfferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferStatus::Draft => "draft",
            OfferStatus::Sent => "sent",
            OfferStatus::Accepted => "accepted",
            OfferStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(OfferStatus::Draft),
            "sent" => Some(OfferStatus::Sent),
            "accepted" => Some(OfferStatus::Accepted),
            "rejected" => Some(OfferStatus::Rejected),
            _ => None,
        }
    }
}

// O cabeçalho do orçamento: cliente, vendedor, condições comerciais
// e o espelho do cálculo gravado no momento da criação.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub id: i64,

    #[schema(example = "ORC-2026-0042")]
    pub display_number: String,

    pub customer_id: i64,
    pub user_id: i64,
    pub status: OfferStatus,

    pub system_kwp: Decimal,

    // Condições informadas
    pub provision_percent: Decimal,
    pub provision_flat: Decimal,
    pub discount_percent: Decimal,
    pub discount_flat: Decimal,
    pub surcharge_percent: Decimal,
    pub surcharge_flat: Decimal,

    // Totais calculados
    pub items_subtotal: Decimal,
    pub provision_amount: Decimal,
    pub discount_total: Decimal,
    pub surcharge_total: Decimal,
    pub extras_total: Decimal,
    pub net_total: Decimal,
    pub vat_amount: Decimal,
    pub gross_total: Decimal,

    /// Comissão do vendedor (informativa, fora do preço)
    pub commission_amount: Decimal,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Uma linha do orçamento. product_id é NULL para itens avulsos
// (frete, taxa de homologação...). O preço unitário é uma fotografia
// do catálogo na hora da criação.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OfferItem {
    pub id: i64,
    pub offer_id: i64,
    pub product_id: Option<i64>,
    pub description: String,
    pub calculate_per: CalculatePer,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// Orçamento completo para detalhe e PDF.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OfferDetail {
    #[serde(flatten)]
    pub offer: Offer,
    pub customer_name: String,
    pub items: Vec<OfferItem>,
}

// --- Payloads ---

// Uma linha pedida pelo cliente da API. O produto pode vir por id ou
// pelo nome do modelo; itens avulsos vêm só com descrição e preço.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OfferItemPayload {
    pub product_id: Option<i64>,
    pub model_name: Option<String>,
    pub description: Option<String>,

    #[serde(default = "default_quantity")]
    pub quantity: Decimal,

    /// Sobrescreve o preço do catálogo quando presente
    pub unit_price: Option<Decimal>,
    /// Sobrescreve o modo de cobrança do catálogo quando presente
    pub calculate_per: Option<CalculatePer>,
}

fn default_quantity() -> Decimal {
    Decimal::ONE
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtraCostPayload {
    pub description: String,
    pub amount: Decimal,
}

/// Corpo do preview: calcula sem gravar nada.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreviewOfferPayload {
    #[validate(length(min = 1, message = "O orçamento precisa de ao menos um item."))]
    pub items: Vec<OfferItemPayload>,

    #[serde(default)]
    pub extras: Vec<ExtraCostPayload>,

    #[serde(default)]
    pub conditions: PricingConditions,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOfferPayload {
    pub customer_id: i64,

    #[validate(length(min = 1, message = "O orçamento precisa de ao menos um item."))]
    pub items: Vec<OfferItemPayload>,

    #[serde(default)]
    pub extras: Vec<ExtraCostPayload>,

    #[serde(default)]
    pub conditions: PricingConditions,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOfferStatusPayload {
    pub status: OfferStatus,
}
