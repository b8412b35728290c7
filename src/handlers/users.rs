// src/handlers/users.rs

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
    middleware::{
        auth::AuthenticatedUser,
        rbac::{PermUsersManage, RequirePermission},
    },
    models::auth::{
        TransferSuperAdminPayload, UpdateUserPayload, UpdateUserStatusPayload, User, UserStatus,
    },
};

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    responses(
        (status = 200, description = "Lista de usuários (sem os excluídos)", body = Vec<User>),
        (status = 403, description = "Sem a permissão 'users:manage'")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermUsersManage>,
) -> Result<impl IntoResponse, AppError> {
    let users = app_state.user_repo.list(false).await?;
    Ok((StatusCode::OK, Json(users)))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "Users",
    request_body = UpdateUserPayload,
    responses(
        (status = 200, description = "Perfil atualizado", body = User),
        (status = 404, description = "Usuário não encontrado")
    ),
    params(("id" = i64, Path, description = "ID do usuário")),
    security(("api_jwt" = []))
)]
pub async fn update_user(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermUsersManage>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    // Carrega, aplica só o que veio, grava
    let mut user = app_state
        .user_repo
        .find_by_id(id)
        .await?
        .ok_or(AppError::UserNotFound)?;

    if let Some(display_name) = payload.display_name {
        user.display_name = Some(display_name);
    }
    if let Some(role) = payload.role {
        user.role = role;
    }
    if let Some(rank) = payload.rank {
        user.rank = Some(rank);
    }
    if let Some(permissions) = payload.permissions {
        user.permissions = permissions;
    }
    if let Some(commission_rate) = payload.commission_rate {
        user.commission_rate = commission_rate;
    }

    app_state
        .user_repo
        .update_profile(&app_state.db_pool, &user)
        .await?;

    let updated = app_state
        .user_repo
        .find_by_id(id)
        .await?
        .ok_or(AppError::UserNotFound)?;
    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}/status",
    tag = "Users",
    request_body = UpdateUserStatusPayload,
    responses(
        (status = 204, description = "Status alterado"),
        (status = 400, description = "Operação inválida"),
        (status = 404, description = "Usuário não encontrado")
    ),
    params(("id" = i64, Path, description = "ID do usuário")),
    security(("api_jwt" = []))
)]
pub async fn update_user_status(
    State(app_state): State<AppState>,
    AuthenticatedUser(current): AuthenticatedUser,
    _guard: RequirePermission<PermUsersManage>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    if id == current.id && payload.status != UserStatus::Active {
        return Err(AppError::InvalidOperation(
            "Você não pode desativar a si mesmo.".to_string(),
        ));
    }

    let target = app_state
        .user_repo
        .find_by_id(id)
        .await?
        .ok_or(AppError::UserNotFound)?;

    // O super admin precisa passar o bastão antes de sair
    if target.is_super_admin && payload.status != UserStatus::Active {
        return Err(AppError::InvalidOperation(
            "Transfira o super admin antes de desativar este usuário.".to_string(),
        ));
    }

    app_state
        .user_repo
        .set_status(&app_state.db_pool, id, payload.status)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/users/transfer-super-admin",
    tag = "Users",
    request_body = TransferSuperAdminPayload,
    responses(
        (status = 204, description = "Transferência concluída"),
        (status = 401, description = "Senha de confirmação incorreta"),
        (status = 403, description = "Só o super admin atual pode transferir")
    ),
    security(("api_jwt" = []))
)]
pub async fn transfer_super_admin(
    State(app_state): State<AppState>,
    AuthenticatedUser(current): AuthenticatedUser,
    Json(payload): Json<TransferSuperAdminPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    app_state
        .auth_service
        .transfer_super_admin(&current, payload.target_user_id, &payload.password)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
