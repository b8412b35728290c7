// src/db/company_repo.rs

use chrono::Utc;
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::{
    common::error::AppError,
    models::company::{Company, CreateCompanyPayload, UpdateCompanyPayload},
};

#[derive(Clone)]
pub struct CompanyRepository {
    pool: SqlitePool,
}

impl CompanyRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        input: &CreateCompanyPayload,
    ) -> Result<Company, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let now = Utc::now();

        let company = sqlx::query_as::<_, Company>(
            "INSERT INTO companies (name, street, zip_code, city, phone, email, tax_id,
                                    state_registration, bank_name, bank_agency, bank_account,
                                    pix_key, logo_base64, is_default, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?)
             RETURNING *",
        )
        .bind(&input.name)
        .bind(&input.street)
        .bind(&input.zip_code)
        .bind(&input.city)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.tax_id)
        .bind(&input.state_registration)
        .bind(&input.bank_name)
        .bind(&input.bank_agency)
        .bind(&input.bank_account)
        .bind(&input.pix_key)
        .bind(&input.logo_base64)
        .bind(now)
        .bind(now)
        .fetch_one(executor)
        .await?;

        Ok(company)
    }

    pub async fn get(&self, id: i64) -> Result<Option<Company>, AppError> {
        let company = sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(company)
    }

    pub async fn list(&self) -> Result<Vec<Company>, AppError> {
        let companies =
            sqlx::query_as::<_, Company>("SELECT * FROM companies ORDER BY name ASC")
                .fetch_all(&self.pool)
                .await?;

        Ok(companies)
    }

    // Atualização parcial via COALESCE: campo NULL no bind mantém o valor atual.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: i64,
        input: &UpdateCompanyPayload,
    ) -> Result<Company, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let company = sqlx::query_as::<_, Company>(
            "UPDATE companies SET
                name = COALESCE(?, name),
                street = COALESCE(?, street),
                zip_code = COALESCE(?, zip_code),
                city = COALESCE(?, city),
                phone = COALESCE(?, phone),
                email = COALESCE(?, email),
                tax_id = COALESCE(?, tax_id),
                state_registration = COALESCE(?, state_registration),
                bank_name = COALESCE(?, bank_name),
                bank_agency = COALESCE(?, bank_agency),
                bank_account = COALESCE(?, bank_account),
                pix_key = COALESCE(?, pix_key),
                logo_base64 = COALESCE(?, logo_base64),
                updated_at = ?
             WHERE id = ?
             RETURNING *",
        )
        .bind(&input.name)
        .bind(&input.street)
        .bind(&input.zip_code)
        .bind(&input.city)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.tax_id)
        .bind(&input.state_registration)
        .bind(&input.bank_name)
        .bind(&input.bank_agency)
        .bind(&input.bank_account)
        .bind(&input.pix_key)
        .bind(&input.logo_base64)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::NotFound("Empresa não encontrada.".to_string()))?;

        Ok(company)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM companies WHERE id = ? AND is_default = 0")
            .bind(id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            // Ou não existe, ou é a empresa padrão (que não pode ser removida)
            return match self.get(id).await? {
                Some(_) => Err(AppError::InvalidOperation(
                    "A empresa padrão não pode ser excluída.".to_string(),
                )),
                None => Err(AppError::NotFound("Empresa não encontrada.".to_string())),
            };
        }
        Ok(())
    }

    /// Marca a empresa como padrão. Invariante: no máximo uma com a flag.
    pub async fn set_default(&self, id: i64) -> Result<Company, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE companies SET is_default = 0 WHERE is_default = 1")
            .execute(&mut *tx)
            .await?;

        let company = sqlx::query_as::<_, Company>(
            "UPDATE companies SET is_default = 1, updated_at = ? WHERE id = ? RETURNING *",
        )
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Empresa não encontrada.".to_string()))?;

        tx.commit().await?;
        Ok(company)
    }

    /// A empresa usada no cabeçalho do PDF.
    pub async fn get_default(&self) -> Result<Option<Company>, AppError> {
        let company =
            sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE is_default = 1")
                .fetch_optional(&self.pool)
                .await?;

        Ok(company)
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        use sqlx::Row;
        let row = sqlx::query("SELECT COUNT(*) AS total FROM companies")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("total")?)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    async fn setup_repo() -> CompanyRepository {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");
        CompanyRepository::new(pool)
    }

    fn payload(name: &str) -> CreateCompanyPayload {
        CreateCompanyPayload {
            name: name.to_string(),
            street: Some("Av. Paulista, 1000".to_string()),
            zip_code: None,
            city: Some("São Paulo".to_string()),
            phone: None,
            email: None,
            tax_id: Some("12.345.678/0001-99".to_string()),
            state_registration: None,
            bank_name: None,
            bank_agency: None,
            bank_account: None,
            pix_key: Some("12.345.678/0001-99".to_string()),
            logo_base64: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = setup_repo().await;
        let created = repo
            .create(&repo.pool, &payload("Solaris"))
            .await
            .expect("Should create company");

        assert_eq!(created.name, "Solaris");
        assert!(!created.is_default);

        let fetched = repo.get(created.id).await.expect("Should fetch").unwrap();
        assert_eq!(fetched.city.as_deref(), Some("São Paulo"));
    }

    #[tokio::test]
    async fn test_default_flag_is_exclusive() {
        let repo = setup_repo().await;
        let a = repo.create(&repo.pool, &payload("Empresa A")).await.unwrap();
        let b = repo.create(&repo.pool, &payload("Empresa B")).await.unwrap();

        repo.set_default(a.id).await.expect("Should set default");
        repo.set_default(b.id).await.expect("Should move default");

        let all = repo.list().await.unwrap();
        let defaults: Vec<_> = all.iter().filter(|c| c.is_default).collect();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[0].id, b.id);

        let default = repo.get_default().await.unwrap().unwrap();
        assert_eq!(default.id, b.id);
    }

    #[tokio::test]
    async fn test_default_company_cannot_be_deleted() {
        let repo = setup_repo().await;
        let a = repo.create(&repo.pool, &payload("Empresa A")).await.unwrap();
        repo.set_default(a.id).await.unwrap();

        let result = repo.delete(&repo.pool, a.id).await;
        assert!(matches!(result, Err(AppError::InvalidOperation(_))));
    }

    #[tokio::test]
    async fn test_partial_update_keeps_existing_fields() {
        let repo = setup_repo().await;
        let a = repo.create(&repo.pool, &payload("Empresa A")).await.unwrap();

        let update = UpdateCompanyPayload {
            name: Some("Empresa A Ltda".to_string()),
            street: None,
            zip_code: None,
            city: None,
            phone: None,
            email: None,
            tax_id: None,
            state_registration: None,
            bank_name: None,
            bank_agency: None,
            bank_account: None,
            pix_key: None,
            logo_base64: None,
        };
        let updated = repo.update(&repo.pool, a.id, &update).await.unwrap();

        assert_eq!(updated.name, "Empresa A Ltda");
        assert_eq!(updated.city.as_deref(), Some("São Paulo"));
    }
}
