// src/models/pricing.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::ValidationError;

/// Validação compartilhada pelos payloads que carregam dinheiro.
pub fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

// --- Modo de cobrança ---
// Cada item do orçamento é cobrado de um jeito: por peça, por metro
// (cabos, trilhos), por kWp instalado (serviços) ou valor fechado.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CalculatePer {
    #[default]
    PerPiece,
    PerMeter,
    PerKwp,
    LumpSum,
}

impl CalculatePer {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalculatePer::PerPiece => "per_piece",
            CalculatePer::PerMeter => "per_meter",
            CalculatePer::PerKwp => "per_kwp",
            CalculatePer::LumpSum => "lump_sum",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "per_piece" => Some(CalculatePer::PerPiece),
            "per_meter" => Some(CalculatePer::PerMeter),
            "per_kwp" => Some(CalculatePer::PerKwp),
            "lump_sum" => Some(CalculatePer::LumpSum),
            _ => None,
        }
    }
}

// --- Entrada do motor de preços ---

/// Uma linha a ser precificada (hardware, acessório ou serviço).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceLine {
    pub description: String,
    pub calculate_per: CalculatePer,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    /// Potência unitária em Wp (só módulos têm); entra no cálculo do kWp.
    pub capacity_wp: Option<Decimal>,
}

/// Custo avulso somado ao final (frete, taxas de homologação...).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtraCost {
    pub description: String,
    pub amount: Decimal,
}

/// Condições comerciais do orçamento: provisão, descontos e acréscimos.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricingConditions {
    #[serde(default)]
    pub provision_percent: Decimal,
    #[serde(default)]
    pub provision_flat: Decimal,
    #[serde(default)]
    pub discount_percent: Decimal,
    #[serde(default)]
    pub discount_flat: Decimal,
    #[serde(default)]
    pub surcharge_percent: Decimal,
    #[serde(default)]
    pub surcharge_flat: Decimal,
}

// --- Saída do motor de preços ---

/// Linha já precificada (com o total calculado pelo modo de cobrança).
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricedLine {
    pub description: String,
    pub calculate_per: CalculatePer,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// O espelho completo do cálculo, na ordem em que foi aplicado.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricingBreakdown {
    pub lines: Vec<PricedLine>,
    pub system_kwp: Decimal,
    pub items_subtotal: Decimal,
    pub provision_amount: Decimal,
    pub discount_total: Decimal,
    pub surcharge_total: Decimal,
    pub extras_total: Decimal,
    pub net_total: Decimal,
    pub vat_rate: Decimal,
    pub vat_amount: Decimal,
    pub gross_total: Decimal,
}
