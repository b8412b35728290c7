// src/db/settings_repo.rs

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{Executor, Row, Sqlite, SqlitePool};

use crate::{common::error::AppError, models::settings::AdminSetting};

// O armazém genérico de configurações administrativas: cada chave
// guarda um JSON livre (tarifas de injeção, tema, opções do PDF...).
#[derive(Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

fn row_to_setting(row: &sqlx::sqlite::SqliteRow) -> Result<AdminSetting, AppError> {
    let value_raw: String = row.try_get("value")?;
    let value = serde_json::from_str(&value_raw)
        .map_err(|e| anyhow::anyhow!("Configuração corrompida no banco: {}", e))?;

    Ok(AdminSetting {
        key: row.try_get("key")?,
        value,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

impl SettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, key: &str) -> Result<Option<AdminSetting>, AppError> {
        let maybe_row = sqlx::query("SELECT * FROM admin_settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        maybe_row.as_ref().map(row_to_setting).transpose()
    }

    pub async fn list(&self) -> Result<Vec<AdminSetting>, AppError> {
        let rows = sqlx::query("SELECT * FROM admin_settings ORDER BY key ASC")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_setting).collect()
    }

    // UPSERT: grava ou substitui o blob da chave
    pub async fn upsert<'e, E>(
        &self,
        executor: E,
        key: &str,
        value: &Value,
    ) -> Result<AdminSetting, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let row = sqlx::query(
            "INSERT INTO admin_settings (key, value, updated_at)
             VALUES (?, ?, ?)
             ON CONFLICT (key)
             DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
             RETURNING *",
        )
        .bind(key)
        .bind(value.to_string())
        .bind(Utc::now())
        .fetch_one(executor)
        .await?;

        row_to_setting(&row)
    }

    pub async fn delete<'e, E>(&self, executor: E, key: &str) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM admin_settings WHERE key = ?")
            .bind(key)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Configuração '{}' não encontrada.",
                key
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    async fn setup_repo() -> SettingsRepository {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");
        SettingsRepository::new(pool)
    }

    #[tokio::test]
    async fn test_upsert_and_get() {
        let repo = setup_repo().await;

        let tariffs = json!({ "residential": 0.65, "commercial": 0.59 });
        repo.upsert(&repo.pool, "feed_in_tariffs", &tariffs)
            .await
            .expect("Should insert setting");

        let fetched = repo
            .get("feed_in_tariffs")
            .await
            .unwrap()
            .expect("Should find setting");
        assert_eq!(fetched.value, tariffs);
    }

    #[tokio::test]
    async fn test_upsert_replaces_value() {
        let repo = setup_repo().await;

        repo.upsert(&repo.pool, "visual_theme", &json!({ "primary": "#0a0" }))
            .await
            .unwrap();
        repo.upsert(&repo.pool, "visual_theme", &json!({ "primary": "#00a" }))
            .await
            .unwrap();

        let fetched = repo.get("visual_theme").await.unwrap().unwrap();
        assert_eq!(fetched.value, json!({ "primary": "#00a" }));

        let all = repo.list().await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_missing_key() {
        let repo = setup_repo().await;
        let result = repo.delete(&repo.pool, "nao_existe").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
