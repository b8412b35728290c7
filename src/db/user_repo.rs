// src/db/user_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, Row, Sqlite, SqlitePool};

use crate::{
    common::decimal::{decimal_to_f64, get_decimal},
    common::error::AppError,
    models::auth::{User, UserStatus},
};

// O repositório de usuários, responsável por todas as interações com a
// tabela 'users'.
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

const USER_COLUMNS: &str = "id, username, password_hash, display_name, role, rank, permissions,
     commission_rate, is_super_admin, status, created_at, updated_at";

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User, AppError> {
    let permissions_raw: String = row.try_get("permissions")?;
    let permissions = serde_json::from_str(&permissions_raw)
        .map_err(|e| anyhow::anyhow!("Permissões corrompidas no banco: {}", e))?;

    let status_raw: String = row.try_get("status")?;
    let status = UserStatus::parse(&status_raw)
        .ok_or_else(|| anyhow::anyhow!("Status de usuário desconhecido: {}", status_raw))?;

    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
        display_name: row.try_get("display_name")?,
        role: row.try_get("role")?,
        rank: row.try_get("rank")?,
        permissions,
        commission_rate: get_decimal(row, "commission_rate")?,
        is_super_admin: row.try_get("is_super_admin")?,
        status,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // Busca um usuário pelo nome de login
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let maybe_row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE username = ?",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        maybe_row.as_ref().map(row_to_user).transpose()
    }

    // Busca um usuário pelo seu ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let maybe_row = sqlx::query(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        maybe_row.as_ref().map(row_to_user).transpose()
    }

    // Lista usuários; por padrão esconde os excluídos
    pub async fn list(&self, include_deleted: bool) -> Result<Vec<User>, AppError> {
        let sql = if include_deleted {
            format!("SELECT {} FROM users ORDER BY username ASC", USER_COLUMNS)
        } else {
            format!(
                "SELECT {} FROM users WHERE status != 'deleted' ORDER BY username ASC",
                USER_COLUMNS
            )
        };

        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(row_to_user).collect()
    }

    // Cria um novo usuário, com tratamento de erro para nomes duplicados.
    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        username: &str,
        password_hash: &str,
        display_name: Option<&str>,
        role: &str,
        is_super_admin: bool,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let now = Utc::now();

        let row = sqlx::query(&format!(
            "INSERT INTO users (username, password_hash, display_name, role, permissions,
                                commission_rate, is_super_admin, status, created_at, updated_at)
             VALUES (?, ?, ?, ?, '{{}}', 0, ?, 'active', ?, ?)
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(username)
        .bind(password_hash)
        .bind(display_name)
        .bind(role)
        .bind(is_super_admin)
        .bind(now)
        .bind(now)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::UsernameAlreadyExists;
                }
            }
            e.into()
        })?;

        row_to_user(&row)
    }

    // Grava o perfil completo (o chamador carrega, altera e salva).
    pub async fn update_profile<'e, E>(&self, executor: E, user: &User) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            "UPDATE users SET
                display_name = ?, role = ?, rank = ?, permissions = ?,
                commission_rate = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&user.display_name)
        .bind(&user.role)
        .bind(&user.rank)
        .bind(user.permissions.to_string())
        .bind(decimal_to_f64(user.commission_rate))
        .bind(Utc::now())
        .bind(user.id)
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::UserNotFound);
        }
        Ok(())
    }

    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        id: i64,
        status: UserStatus,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("UPDATE users SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(Utc::now())
            .bind(id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::UserNotFound);
        }
        Ok(())
    }

    // Usado pela transferência de super admin (sempre dentro de uma transação)
    pub async fn set_super_admin<'e, E>(
        &self,
        executor: E,
        id: i64,
        flag: bool,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result =
            sqlx::query("UPDATE users SET is_super_admin = ?, updated_at = ? WHERE id = ?")
                .bind(flag)
                .bind(Utc::now())
                .bind(id)
                .execute(executor)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::UserNotFound);
        }
        Ok(())
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("total")?)
    }
}
