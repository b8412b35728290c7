// src/common/decimal.rs

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sqlx::{Row, TypeInfo, ValueRef};

use crate::common::error::AppError;

// O SQLite não tem tipo DECIMAL nativo: dinheiro fica em REAL (ou INTEGER).
// Estes helpers fazem a ponte com o rust_decimal na camada de repositório.

/// Lê um valor decimal de uma linha, aceitando colunas INTEGER e REAL.
pub fn get_decimal(row: &sqlx::sqlite::SqliteRow, column: &str) -> Result<Decimal, AppError> {
    let value_ref = row.try_get_raw(column)?;
    let type_info = value_ref.type_info();
    let type_name = type_info.name();

    match type_name {
        "INTEGER" => {
            let val: i64 = row.try_get(column)?;
            Ok(Decimal::from(val))
        }
        "REAL" => {
            let val: f64 = row.try_get(column)?;
            Decimal::try_from(val).map_err(|e| {
                AppError::from(anyhow::anyhow!(
                    "Falha ao converter {} para Decimal: {}",
                    val,
                    e
                ))
            })
        }
        "NULL" => Ok(Decimal::ZERO),
        other => Err(AppError::from(anyhow::anyhow!(
            "Tipo inesperado '{}' na coluna '{}'",
            other,
            column
        ))),
    }
}

/// Lê um decimal opcional, devolvendo None para NULL.
pub fn get_optional_decimal(
    row: &sqlx::sqlite::SqliteRow,
    column: &str,
) -> Result<Option<Decimal>, AppError> {
    let value_ref = row.try_get_raw(column)?;

    if value_ref.is_null() {
        return Ok(None);
    }

    get_decimal(row, column).map(Some)
}

/// Converte um Decimal para f64 na hora de gravar no SQLite.
pub fn decimal_to_f64(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use sqlx::sqlite::SqlitePoolOptions;

    use super::*;

    async fn setup_test_db() -> sqlx::sqlite::SqlitePool {
        let pool = SqlitePoolOptions::new()
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        sqlx::query(
            "CREATE TABLE test_decimals (
                id INTEGER PRIMARY KEY,
                int_value INTEGER,
                real_value REAL,
                null_value REAL,
                text_value TEXT
            )",
        )
        .execute(&pool)
        .await
        .expect("Failed to create test table");
        pool
    }

    #[tokio::test]
    async fn test_get_decimal_from_integer() {
        let pool = setup_test_db().await;
        sqlx::query("INSERT INTO test_decimals (id, int_value) VALUES (1, 12345)")
            .execute(&pool)
            .await
            .expect("Failed to insert test data");

        let row = sqlx::query("SELECT int_value FROM test_decimals WHERE id = 1")
            .fetch_one(&pool)
            .await
            .expect("Failed to fetch row");

        assert_eq!(get_decimal(&row, "int_value").unwrap(), dec!(12345));
    }

    #[tokio::test]
    async fn test_get_decimal_from_real() {
        let pool = setup_test_db().await;
        sqlx::query("INSERT INTO test_decimals (id, real_value) VALUES (1, 123.45)")
            .execute(&pool)
            .await
            .expect("Failed to insert test data");

        let row = sqlx::query("SELECT real_value FROM test_decimals WHERE id = 1")
            .fetch_one(&pool)
            .await
            .expect("Failed to fetch row");

        assert_eq!(get_decimal(&row, "real_value").unwrap(), dec!(123.45));
    }

    #[tokio::test]
    async fn test_get_decimal_from_null_returns_zero() {
        let pool = setup_test_db().await;
        sqlx::query("INSERT INTO test_decimals (id, null_value) VALUES (1, NULL)")
            .execute(&pool)
            .await
            .expect("Failed to insert test data");

        let row = sqlx::query("SELECT null_value FROM test_decimals WHERE id = 1")
            .fetch_one(&pool)
            .await
            .expect("Failed to fetch row");

        assert_eq!(get_decimal(&row, "null_value").unwrap(), Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_get_decimal_unexpected_type() {
        let pool = setup_test_db().await;
        sqlx::query("INSERT INTO test_decimals (id, text_value) VALUES (1, 'abc')")
            .execute(&pool)
            .await
            .expect("Failed to insert test data");

        let row = sqlx::query("SELECT text_value FROM test_decimals WHERE id = 1")
            .fetch_one(&pool)
            .await
            .expect("Failed to fetch row");

        assert!(get_decimal(&row, "text_value").is_err());
    }

    #[tokio::test]
    async fn test_get_optional_decimal_from_null_returns_none() {
        let pool = setup_test_db().await;
        sqlx::query("INSERT INTO test_decimals (id, null_value) VALUES (1, NULL)")
            .execute(&pool)
            .await
            .expect("Failed to insert test data");

        let row = sqlx::query("SELECT null_value FROM test_decimals WHERE id = 1")
            .fetch_one(&pool)
            .await
            .expect("Failed to fetch row");

        assert_eq!(get_optional_decimal(&row, "null_value").unwrap(), None);
    }

    #[test]
    fn test_decimal_to_f64_roundtrip() {
        assert_eq!(decimal_to_f64(dec!(123.456)), 123.456);
        assert_eq!(decimal_to_f64(dec!(-789.01)), -789.01);
        assert_eq!(decimal_to_f64(Decimal::ZERO), 0.0);
    }
}
