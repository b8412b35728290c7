// src/config.rs

use serde_json::json;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::{env, time::Duration};

use crate::{
    db::{
        CompanyRepository, CustomerRepository, OfferRepository, ProductRepository,
        SettingsRepository, UserRepository,
    },
    models::company::CreateCompanyPayload,
    services::{
        auth::AuthService, document_service::DocumentService, offer_service::OfferService,
    },
};

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub jwt_secret: String,
    pub user_repo: UserRepository,
    pub company_repo: CompanyRepository,
    pub product_repo: ProductRepository,
    pub customer_repo: CustomerRepository,
    pub offer_repo: OfferRepository,
    pub settings_repo: SettingsRepository,
    pub auth_service: AuthService,
    pub offer_service: OfferService,
    pub document_service: DocumentService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        // O banco é um arquivo SQLite local; mode=rwc cria se não existir.
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://solaris.db?mode=rwc".to_string());
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");

        let db_pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let company_repo = CompanyRepository::new(db_pool.clone());
        let product_repo = ProductRepository::new(db_pool.clone());
        let customer_repo = CustomerRepository::new(db_pool.clone());
        let offer_repo = OfferRepository::new(db_pool.clone());
        let settings_repo = SettingsRepository::new(db_pool.clone());

        let auth_service =
            AuthService::new(user_repo.clone(), jwt_secret.clone(), db_pool.clone());
        let offer_service = OfferService::new(
            offer_repo.clone(),
            product_repo.clone(),
            customer_repo.clone(),
        );
        let document_service = DocumentService::new(offer_repo.clone(), company_repo.clone());

        Ok(Self {
            db_pool,
            jwt_secret,
            user_repo,
            company_repo,
            product_repo,
            customer_repo,
            offer_repo,
            settings_repo,
            auth_service,
            offer_service,
            document_service,
        })
    }

    // Garante o mínimo para o sistema funcionar na primeira subida:
    // um super admin, uma empresa padrão e as chaves de configuração.
    pub async fn ensure_seeds(&self) -> anyhow::Result<()> {
        let admin_username = env::var("ADMIN_USER").unwrap_or_else(|_| "admin".to_string());

        if self.user_repo.count().await? == 0 {
            let hash = bcrypt::hash("admin", bcrypt::DEFAULT_COST)?;
            self.user_repo
                .create_user(
                    &self.db_pool,
                    &admin_username,
                    &hash,
                    Some("Administrador"),
                    "admin",
                    true,
                )
                .await?;
            tracing::info!(
                "👤 Super admin '{}' criado com a senha padrão 'admin'. Troque-a!",
                admin_username
            );
        }

        if self.company_repo.count().await? == 0 {
            let company = self
                .company_repo
                .create(
                    &self.db_pool,
                    &CreateCompanyPayload {
                        name: "Minha Empresa Solar".to_string(),
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
                    },
                )
                .await?;
            self.company_repo.set_default(company.id).await?;
            tracing::info!("🏢 Empresa padrão criada. Complete o cadastro em /api/companies.");
        }

        // Chaves de configuração conhecidas, só se ainda não existirem
        if self.settings_repo.get("feed_in_tariffs").await?.is_none() {
            self.settings_repo
                .upsert(
                    &self.db_pool,
                    "feed_in_tariffs",
                    &json!({ "residential": 0.0, "commercial": 0.0 }),
                )
                .await?;
        }
        if self.settings_repo.get("pdf_options").await?.is_none() {
            self.settings_repo
                .upsert(
                    &self.db_pool,
                    "pdf_options",
                    &json!({ "show_pix_qr": true, "footer_note": "" }),
                )
                .await?;
        }

        tracing::info!("✅ Seeds verificados.");
        Ok(())
    }
}
