// src/db/customer_repo.rs

use chrono::Utc;
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::{
    common::error::AppError,
    models::crm::{CreateCustomerPayload, Customer, UpdateCustomerPayload},
};

#[derive(Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        input: &CreateCustomerPayload,
    ) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let now = Utc::now();

        let customer = sqlx::query_as::<_, Customer>(
            "INSERT INTO customers (full_name, email, phone, street, zip_code, city, notes,
                                    created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(&input.full_name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.street)
        .bind(&input.zip_code)
        .bind(&input.city)
        .bind(&input.notes)
        .bind(now)
        .bind(now)
        .fetch_one(executor)
        .await?;

        Ok(customer)
    }

    pub async fn get(&self, id: i64) -> Result<Option<Customer>, AppError> {
        let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    pub async fn list(&self) -> Result<Vec<Customer>, AppError> {
        let customers =
            sqlx::query_as::<_, Customer>("SELECT * FROM customers ORDER BY full_name ASC")
                .fetch_all(&self.pool)
                .await?;

        Ok(customers)
    }

    /// Busca simples por nome, e-mail ou telefone.
    pub async fn search(&self, query: &str) -> Result<Vec<Customer>, AppError> {
        let search_term = format!("%{}%", query);

        let customers = sqlx::query_as::<_, Customer>(
            "SELECT * FROM customers
             WHERE full_name LIKE ? OR email LIKE ? OR phone LIKE ?
             ORDER BY full_name ASC
             LIMIT 50",
        )
        .bind(&search_term)
        .bind(&search_term)
        .bind(&search_term)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: i64,
        input: &UpdateCustomerPayload,
    ) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let customer = sqlx::query_as::<_, Customer>(
            "UPDATE customers SET
                full_name = COALESCE(?, full_name),
                email = COALESCE(?, email),
                phone = COALESCE(?, phone),
                street = COALESCE(?, street),
                zip_code = COALESCE(?, zip_code),
                city = COALESCE(?, city),
                notes = COALESCE(?, notes),
                updated_at = ?
             WHERE id = ?
             RETURNING *",
        )
        .bind(&input.full_name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.street)
        .bind(&input.zip_code)
        .bind(&input.city)
        .bind(&input.notes)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::NotFound("Cliente não encontrado.".to_string()))?;

        Ok(customer)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    async fn setup_repo() -> CustomerRepository {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");
        CustomerRepository::new(pool)
    }

    fn payload(name: &str, email: Option<&str>) -> CreateCustomerPayload {
        CreateCustomerPayload {
            full_name: name.to_string(),
            email: email.map(|e| e.to_string()),
            phone: Some("(11) 99999-8888".to_string()),
            street: None,
            zip_code: None,
            city: Some("Campinas".to_string()),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_search() {
        let repo = setup_repo().await;
        repo.create(&repo.pool, &payload("Maria da Silva", Some("maria@exemplo.com")))
            .await
            .unwrap();
        repo.create(&repo.pool, &payload("João Pereira", None))
            .await
            .unwrap();

        let by_name = repo.search("Maria").await.unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].full_name, "Maria da Silva");

        let by_email = repo.search("exemplo.com").await.unwrap();
        assert_eq!(by_email.len(), 1);

        let by_phone = repo.search("99999").await.unwrap();
        assert_eq!(by_phone.len(), 2);
    }

    #[tokio::test]
    async fn test_update_missing_customer() {
        let repo = setup_repo().await;
        let update = UpdateCustomerPayload {
            full_name: Some("Novo Nome".to_string()),
            email: None,
            phone: None,
            street: None,
            zip_code: None,
            city: None,
            notes: None,
        };
        let result = repo.update(&repo.pool, 42, &update).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
