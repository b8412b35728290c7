// src/db/offer_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, Row, Sqlite, SqlitePool};

use crate::{
    common::decimal::{decimal_to_f64, get_decimal},
    common::error::AppError,
    models::offer::{Offer, OfferItem, OfferStatus},
    models::pricing::{CalculatePer, PricingBreakdown, PricingConditions},
};

// Persistência dos orçamentos. A criação roda dentro de uma transação
// aberta pelo serviço; cada método recebe o executor.
#[derive(Clone)]
pub struct OfferRepository {
    pool: SqlitePool,
}

fn row_to_offer(row: &sqlx::sqlite::SqliteRow) -> Result<Offer, AppError> {
    let status_raw: String = row.try_get("status")?;
    let status = OfferStatus::parse(&status_raw)
        .ok_or_else(|| anyhow::anyhow!("Status de orçamento desconhecido: {}", status_raw))?;

    Ok(Offer {
        id: row.try_get("id")?,
        display_number: row.try_get("display_number")?,
        customer_id: row.try_get("customer_id")?,
        user_id: row.try_get("user_id")?,
        status,
        system_kwp: get_decimal(row, "system_kwp")?,
        provision_percent: get_decimal(row, "provision_percent")?,
        provision_flat: get_decimal(row, "provision_flat")?,
        discount_percent: get_decimal(row, "discount_percent")?,
        discount_flat: get_decimal(row, "discount_flat")?,
        surcharge_percent: get_decimal(row, "surcharge_percent")?,
        surcharge_flat: get_decimal(row, "surcharge_flat")?,
        items_subtotal: get_decimal(row, "items_subtotal")?,
        provision_amount: get_decimal(row, "provision_amount")?,
        discount_total: get_decimal(row, "discount_total")?,
        surcharge_total: get_decimal(row, "surcharge_total")?,
        extras_total: get_decimal(row, "extras_total")?,
        net_total: get_decimal(row, "net_total")?,
        vat_amount: get_decimal(row, "vat_amount")?,
        gross_total: get_decimal(row, "gross_total")?,
        commission_amount: get_decimal(row, "commission_amount")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

fn row_to_item(row: &sqlx::sqlite::SqliteRow) -> Result<OfferItem, AppError> {
    let calculate_per_raw: String = row.try_get("calculate_per")?;
    let calculate_per = CalculatePer::parse(&calculate_per_raw)
        .ok_or_else(|| anyhow::anyhow!("Modo de cobrança desconhecido: {}", calculate_per_raw))?;

    Ok(OfferItem {
        id: row.try_get("id")?,
        offer_id: row.try_get("offer_id")?,
        product_id: row.try_get("product_id")?,
        description: row.try_get("description")?,
        calculate_per,
        quantity: get_decimal(row, "quantity")?,
        unit_price: get_decimal(row, "unit_price")?,
        line_total: get_decimal(row, "line_total")?,
    })
}

impl OfferRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // Grava o cabeçalho com o espelho do cálculo. O display_number é
    // definido logo depois, quando o id já existe.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_offer<'e, E>(
        &self,
        executor: E,
        customer_id: i64,
        user_id: i64,
        conditions: &PricingConditions,
        breakdown: &PricingBreakdown,
        commission_amount: Decimal,
    ) -> Result<Offer, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let now = Utc::now();

        let row = sqlx::query(
            "INSERT INTO offers (customer_id, user_id, status, system_kwp,
                                 provision_percent, provision_flat,
                                 discount_percent, discount_flat,
                                 surcharge_percent, surcharge_flat,
                                 items_subtotal, provision_amount, discount_total,
                                 surcharge_total, extras_total, net_total,
                                 vat_amount, gross_total, commission_amount,
                                 created_at, updated_at)
             VALUES (?, ?, 'draft', ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(customer_id)
        .bind(user_id)
        .bind(decimal_to_f64(breakdown.system_kwp))
        .bind(decimal_to_f64(conditions.provision_percent))
        .bind(decimal_to_f64(conditions.provision_flat))
        .bind(decimal_to_f64(conditions.discount_percent))
        .bind(decimal_to_f64(conditions.discount_flat))
        .bind(decimal_to_f64(conditions.surcharge_percent))
        .bind(decimal_to_f64(conditions.surcharge_flat))
        .bind(decimal_to_f64(breakdown.items_subtotal))
        .bind(decimal_to_f64(breakdown.provision_amount))
        .bind(decimal_to_f64(breakdown.discount_total))
        .bind(decimal_to_f64(breakdown.surcharge_total))
        .bind(decimal_to_f64(breakdown.extras_total))
        .bind(decimal_to_f64(breakdown.net_total))
        .bind(decimal_to_f64(breakdown.vat_amount))
        .bind(decimal_to_f64(breakdown.gross_total))
        .bind(decimal_to_f64(commission_amount))
        .bind(now)
        .bind(now)
        .fetch_one(executor)
        .await?;

        row_to_offer(&row)
    }

    pub async fn set_display_number<'e, E>(
        &self,
        executor: E,
        id: i64,
        display_number: &str,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query("UPDATE offers SET display_number = ? WHERE id = ?")
            .bind(display_number)
            .bind(id)
            .execute(executor)
            .await?;

        Ok(())
    }

    pub async fn add_item<'e, E>(
        &self,
        executor: E,
        offer_id: i64,
        product_id: Option<i64>,
        description: &str,
        calculate_per: CalculatePer,
        quantity: Decimal,
        unit_price: Decimal,
        line_total: Decimal,
    ) -> Result<OfferItem, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let row = sqlx::query(
            "INSERT INTO offer_items (offer_id, product_id, description, calculate_per,
                                      quantity, unit_price, line_total)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(offer_id)
        .bind(product_id)
        .bind(description)
        .bind(calculate_per.as_str())
        .bind(decimal_to_f64(quantity))
        .bind(decimal_to_f64(unit_price))
        .bind(decimal_to_f64(line_total))
        .fetch_one(executor)
        .await?;

        row_to_item(&row)
    }

    pub async fn get(&self, id: i64) -> Result<Option<Offer>, AppError> {
        let maybe_row = sqlx::query("SELECT * FROM offers WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        maybe_row.as_ref().map(row_to_offer).transpose()
    }

    pub async fn list(&self) -> Result<Vec<Offer>, AppError> {
        let rows = sqlx::query("SELECT * FROM offers ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_offer).collect()
    }

    pub async fn list_items(&self, offer_id: i64) -> Result<Vec<OfferItem>, AppError> {
        let rows = sqlx::query("SELECT * FROM offer_items WHERE offer_id = ? ORDER BY id ASC")
            .bind(offer_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_item).collect()
    }

    /// O nome do cliente entra junto para o detalhe e o PDF.
    pub async fn get_customer_name(&self, offer_id: i64) -> Result<String, AppError> {
        let row = sqlx::query(
            "SELECT c.full_name FROM offers o
             INNER JOIN customers c ON c.id = o.customer_id
             WHERE o.id = ?",
        )
        .bind(offer_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Orçamento não encontrado.".to_string()))?;

        Ok(row.try_get("full_name")?)
    }

    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        id: i64,
        status: OfferStatus,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("UPDATE offers SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(Utc::now())
            .bind(id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Orçamento não encontrado.".to_string()));
        }
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
