// src/db/product_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, Row, Sqlite, SqlitePool};

use crate::{
    common::decimal::{decimal_to_f64, get_decimal, get_optional_decimal},
    common::error::AppError,
    models::catalog::{CreateProductPayload, Product, ProductCategory, UpdateProductPayload},
    models::pricing::CalculatePer,
};

// O catálogo de produtos: módulos, inversores, baterias, acessórios e
// serviços. É a fonte dos preços e dos dados técnicos dos orçamentos.
#[derive(Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

fn row_to_product(row: &sqlx::sqlite::SqliteRow) -> Result<Product, AppError> {
    let category_raw: String = row.try_get("category")?;
    let category = ProductCategory::parse(&category_raw)
        .ok_or_else(|| anyhow::anyhow!("Categoria desconhecida: {}", category_raw))?;

    let calculate_per_raw: String = row.try_get("calculate_per")?;
    let calculate_per = CalculatePer::parse(&calculate_per_raw)
        .ok_or_else(|| anyhow::anyhow!("Modo de cobrança desconhecido: {}", calculate_per_raw))?;

    Ok(Product {
        id: row.try_get("id")?,
        category,
        brand: row.try_get("brand")?,
        model_name: row.try_get("model_name")?,
        unit_price: get_decimal(row, "unit_price")?,
        calculate_per,
        capacity_wp: get_optional_decimal(row, "capacity_wp")?,
        power_kw: get_optional_decimal(row, "power_kw")?,
        storage_kwh: get_optional_decimal(row, "storage_kwh")?,
        efficiency_percent: get_optional_decimal(row, "efficiency_percent")?,
        warranty_years: row.try_get("warranty_years")?,
        image_base64: row.try_get("image_base64")?,
        datasheet_url: row.try_get("datasheet_url")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        input: &CreateProductPayload,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let now = Utc::now();

        let row = sqlx::query(
            "INSERT INTO products (category, brand, model_name, unit_price, calculate_per,
                                   capacity_wp, power_kw, storage_kwh, efficiency_percent,
                                   warranty_years, image_base64, datasheet_url,
                                   created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(input.category.as_str())
        .bind(&input.brand)
        .bind(&input.model_name)
        .bind(decimal_to_f64(input.unit_price))
        .bind(input.calculate_per.as_str())
        .bind(input.capacity_wp.map(decimal_to_f64))
        .bind(input.power_kw.map(decimal_to_f64))
        .bind(input.storage_kwh.map(decimal_to_f64))
        .bind(input.efficiency_percent.map(decimal_to_f64))
        .bind(input.warranty_years)
        .bind(&input.image_base64)
        .bind(&input.datasheet_url)
        .bind(now)
        .bind(now)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(format!(
                        "O modelo '{}' já está cadastrado.",
                        input.model_name
                    ));
                }
            }
            e.into()
        })?;

        row_to_product(&row)
    }

    pub async fn get(&self, id: i64) -> Result<Option<Product>, AppError> {
        let maybe_row = sqlx::query("SELECT * FROM products WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        maybe_row.as_ref().map(row_to_product).transpose()
    }

    // Busca pelo nome exato do modelo (a chave que o app da loja usa)
    pub async fn get_by_model_name(&self, model_name: &str) -> Result<Option<Product>, AppError> {
        let maybe_row = sqlx::query("SELECT * FROM products WHERE model_name = ?")
            .bind(model_name)
            .fetch_optional(&self.pool)
            .await?;

        maybe_row.as_ref().map(row_to_product).transpose()
    }

    pub async fn list(
        &self,
        category: Option<ProductCategory>,
    ) -> Result<Vec<Product>, AppError> {
        let rows = match category {
            Some(cat) => {
                sqlx::query(
                    "SELECT * FROM products WHERE category = ? ORDER BY brand ASC, model_name ASC",
                )
                .bind(cat.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query("SELECT * FROM products ORDER BY brand ASC, model_name ASC")
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        rows.iter().map(row_to_product).collect()
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: i64,
        input: &UpdateProductPayload,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let row = sqlx::query(
            "UPDATE products SET
                category = COALESCE(?, category),
                brand = COALESCE(?, brand),
                model_name = COALESCE(?, model_name),
                unit_price = COALESCE(?, unit_price),
                calculate_per = COALESCE(?, calculate_per),
                capacity_wp = COALESCE(?, capacity_wp),
                power_kw = COALESCE(?, power_kw),
                storage_kwh = COALESCE(?, storage_kwh),
                efficiency_percent = COALESCE(?, efficiency_percent),
                warranty_years = COALESCE(?, warranty_years),
                image_base64 = COALESCE(?, image_base64),
                datasheet_url = COALESCE(?, datasheet_url),
                updated_at = ?
             WHERE id = ?
             RETURNING *",
        )
        .bind(input.category.map(|c| c.as_str()))
        .bind(&input.brand)
        .bind(&input.model_name)
        .bind(input.unit_price.map(decimal_to_f64))
        .bind(input.calculate_per.map(|c| c.as_str()))
        .bind(input.capacity_wp.map(decimal_to_f64))
        .bind(input.power_kw.map(decimal_to_f64))
        .bind(input.storage_kwh.map(decimal_to_f64))
        .bind(input.efficiency_percent.map(decimal_to_f64))
        .bind(input.warranty_years)
        .bind(&input.image_base64)
        .bind(&input.datasheet_url)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::NotFound("Produto não encontrado.".to_string()))?;

        row_to_product(&row)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Produto não encontrado.".to_string()));
        }
        Ok(())
    }
}
