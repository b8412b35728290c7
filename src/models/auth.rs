// src/models/auth.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::Validate;

// --- Situação do usuário ---
// "Excluir" um usuário é só uma mudança de status; o registro fica
// para manter o histórico de orçamentos e comissões.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active,
    Terminated,
    Deleted,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Terminated => "terminated",
            UserStatus::Deleted => "deleted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(UserStatus::Active),
            "terminated" => Some(UserStatus::Terminated),
            "deleted" => Some(UserStatus::Deleted),
            _ => None,
        }
    }
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub password_hash: String,

    pub display_name: Option<String>,
    pub role: String,
    pub rank: Option<String>,

    /// Dicionário de permissões: slug -> bool (ex.: {"catalog:write": true})
    pub permissions: Value,

    /// Percentual de comissão do vendedor sobre o valor líquido
    pub commission_rate: Decimal,

    pub is_super_admin: bool,
    pub status: UserStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Verifica uma permissão pelo slug. Super admin e o papel 'admin'
    /// passam por qualquer verificação.
    pub fn has_permission(&self, slug: &str) -> bool {
        if self.is_super_admin || self.role == "admin" {
            return true;
        }
        self.permissions
            .get(slug)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

// Dados para registro de um novo usuário
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserPayload {
    #[validate(length(min = 3, message = "O nome de usuário deve ter no mínimo 3 caracteres."))]
    pub username: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
    pub display_name: Option<String>,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginUserPayload {
    #[validate(length(min = 3, message = "O nome de usuário deve ter no mínimo 3 caracteres."))]
    pub username: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

// Atualização administrativa do perfil (papel, permissões, comissão...)
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    pub display_name: Option<String>,
    pub role: Option<String>,
    pub rank: Option<String>,
    pub permissions: Option<Value>,

    #[validate(custom(function = "crate::models::pricing::validate_not_negative"))]
    pub commission_rate: Option<Decimal>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserStatusPayload {
    pub status: UserStatus,
}

// A transferência exige a senha do detentor atual
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferSuperAdminPayload {
    pub target_user_id: i64,

    #[validate(length(min = 1, message = "A senha de confirmação é obrigatória."))]
    pub password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,   // Subject (ID do usuário)
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn base_user() -> User {
        User {
            id: 1,
            username: "vendedor1".to_string(),
            password_hash: "x".to_string(),
            display_name: None,
            role: "vendedor".to_string(),
            rank: None,
            permissions: json!({ "offers:write": true, "catalog:write": false }),
            commission_rate: Decimal::ZERO,
            is_super_admin: false,
            status: UserStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_permission_from_dict() {
        let user = base_user();
        assert_eq!(user.has_permission("offers:write"), true);
        assert_eq!(user.has_permission("catalog:write"), false);
        assert_eq!(user.has_permission("settings:write"), false);
    }

    #[test]
    fn test_admin_role_bypasses_dict() {
        let mut user = base_user();
        user.role = "admin".to_string();
        assert!(user.has_permission("settings:write"));
    }

    #[test]
    fn test_super_admin_bypasses_dict() {
        let mut user = base_user();
        user.is_super_admin = true;
        assert!(user.has_permission("users:manage"));
    }
}
