// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{common::error::AppError, models::auth::User};

/// 1. O Trait que define o que é uma Permissão
pub trait PermissionDef: Send + Sync + 'static {
    fn slug() -> &'static str;
}

/// 2. O Extractor (Guardião)
// A verificação lê o dicionário de permissões do próprio usuário
// (já pendurado nos extensions pelo auth_guard). Super admin e o
// papel 'admin' passam direto.
pub struct RequirePermission<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts.extensions.get::<User>().ok_or(AppError::InvalidToken)?;

        let required_perm = T::slug();

        if !user.has_permission(required_perm) {
            return Err(AppError::PermissionDenied(format!(
                "Você precisa da permissão '{}' para realizar esta ação.",
                required_perm
            )));
        }

        Ok(RequirePermission(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

pub struct PermCatalogWrite;
impl PermissionDef for PermCatalogWrite {
    fn slug() -> &'static str {
        "catalog:write"
    }
}

pub struct PermCustomersWrite;
impl PermissionDef for PermCustomersWrite {
    fn slug() -> &'static str {
        "customers:write"
    }
}

pub struct PermOffersWrite;
impl PermissionDef for PermOffersWrite {
    fn slug() -> &'static str {
        "offers:write"
    }
}

pub struct PermCompaniesWrite;
impl PermissionDef for PermCompaniesWrite {
    fn slug() -> &'static str {
        "companies:write"
    }
}

pub struct PermSettingsWrite;
impl PermissionDef for PermSettingsWrite {
    fn slug() -> &'static str {
        "settings:write"
    }
}

pub struct PermUsersManage;
impl PermissionDef for PermUsersManage {
    fn slug() -> &'static str {
        "users:manage"
    }
}
