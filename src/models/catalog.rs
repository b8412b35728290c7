// src/models/catalog.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use validator::Validate;

use crate::models::pricing::CalculatePer;

// --- Categorias do catálogo ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    /// Módulo fotovoltaico (painel)
    Module,
    /// Inversor
    Inverter,
    /// Bateria / armazenamento
    Storage,
    /// Acessório (estrutura, cabo, conector...)
    Accessory,
    /// Serviço (instalação, homologação...)
    Service,
}

impl ProductCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Module => "module",
            ProductCategory::Inverter => "inverter",
            ProductCategory::Storage => "storage",
            ProductCategory::Accessory => "accessory",
            ProductCategory::Service => "service",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "module" => Some(ProductCategory::Module),
            "inverter" => Some(ProductCategory::Inverter),
            "storage" => Some(ProductCategory::Storage),
            "accessory" => Some(ProductCategory::Accessory),
            "service" => Some(ProductCategory::Service),
            _ => None,
        }
    }
}

// O catálogo de hardware. Os campos técnicos são opcionais porque cada
// categoria usa um subconjunto: capacity_wp só faz sentido para módulos,
// power_kw para inversores, storage_kwh para baterias.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub category: ProductCategory,

    #[schema(example = "Canadian Solar")]
    pub brand: String,

    #[schema(example = "CS7N-665MS")]
    pub model_name: String,

    pub unit_price: Decimal,
    pub calculate_per: CalculatePer,

    /// Potência do módulo em Wp
    pub capacity_wp: Option<Decimal>,
    /// Potência do inversor em kW
    pub power_kw: Option<Decimal>,
    /// Capacidade da bateria em kWh
    pub storage_kwh: Option<Decimal>,
    pub efficiency_percent: Option<Decimal>,
    pub warranty_years: Option<i64>,

    #[schema(ignore)]
    pub image_base64: Option<String>,
    pub datasheet_url: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    pub category: ProductCategory,

    #[validate(length(min = 1, message = "A marca é obrigatória."))]
    pub brand: String,

    #[validate(length(min = 1, message = "O modelo é obrigatório."))]
    pub model_name: String,

    #[validate(custom(function = "crate::models::pricing::validate_not_negative"))]
    #[serde(default)]
    pub unit_price: Decimal,

    #[serde(default)]
    pub calculate_per: CalculatePer,

    pub capacity_wp: Option<Decimal>,
    pub power_kw: Option<Decimal>,
    pub storage_kwh: Option<Decimal>,
    pub efficiency_percent: Option<Decimal>,
    pub warranty_years: Option<i64>,
    pub image_base64: Option<String>,
    pub datasheet_url: Option<String>,
}

// Atualização parcial do produto: campos ausentes ficam como estão.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductPayload {
    pub category: Option<ProductCategory>,
    pub brand: Option<String>,
    pub model_name: Option<String>,

    #[validate(custom(function = "crate::models::pricing::validate_not_negative"))]
    pub unit_price: Option<Decimal>,

    pub calculate_per: Option<CalculatePer>,
    pub capacity_wp: Option<Decimal>,
    pub power_kw: Option<Decimal>,
    pub storage_kwh: Option<Decimal>,
    pub efficiency_percent: Option<Decimal>,
    pub warranty_years: Option<i64>,
    pub image_base64: Option<String>,
    pub datasheet_url: Option<String>,
}
