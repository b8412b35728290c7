// src/models/settings.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

// Configurações administrativas genéricas: cada chave guarda um blob
// JSON livre (tarifas de injeção, tema visual, opções do PDF...).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminSetting {
    #[schema(example = "feed_in_tariffs")]
    pub key: String,

    pub value: Value,

    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertSettingPayload {
    pub value: Value,
}
