// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Settings ---
        handlers::settings::list_settings,
        handlers::settings::get_setting,
        handlers::settings::upsert_setting,
        handlers::settings::delete_setting,

        // --- Users ---
        handlers::users::list_users,
        handlers::users::update_user,
        handlers::users::update_user_status,
        handlers::users::transfer_super_admin,

        // --- Companies ---
        handlers::companies::create_company,
        handlers::companies::list_companies,
        handlers::companies::get_default_company,
        handlers::companies::get_company,
        handlers::companies::update_company,
        handlers::companies::delete_company,
        handlers::companies::set_default_company,

        // --- Catalog ---
        handlers::catalog::create_product,
        handlers::catalog::list_products,
        handlers::catalog::get_product,
        handlers::catalog::get_product_by_model,
        handlers::catalog::update_product,
        handlers::catalog::delete_product,

        // --- CRM ---
        handlers::crm::create_customer,
        handlers::crm::list_customers,
        handlers::crm::search_customers,
        handlers::crm::get_customer,
        handlers::crm::update_customer,

        // --- Offers ---
        handlers::offers::create_offer,
        handlers::offers::preview_offer,
        handlers::offers::list_offers,
        handlers::offers::get_offer,
        handlers::offers::update_offer_status,
        handlers::documents::generate_offer_pdf,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::UserStatus,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::auth::UpdateUserPayload,
            models::auth::UpdateUserStatusPayload,
            models::auth::TransferSuperAdminPayload,

            // --- Companies ---
            models::company::Company,
            models::company::CreateCompanyPayload,
            models::company::UpdateCompanyPayload,

            // --- Catalog ---
            models::catalog::Product,
            models::catalog::ProductCategory,
            models::catalog::CreateProductPayload,
            models::catalog::UpdateProductPayload,

            // --- CRM ---
            models::crm::Customer,
            models::crm::CreateCustomerPayload,
            models::crm::UpdateCustomerPayload,

            // --- Pricing ---
            models::pricing::CalculatePer,
            models::pricing::PriceLine,
            models::pricing::ExtraCost,
            models::pricing::PricingConditions,
            models::pricing::PricedLine,
            models::pricing::PricingBreakdown,

            // --- Offers ---
            models::offer::Offer,
            models::offer::OfferItem,
            models::offer::OfferStatus,
            models::offer::OfferDetail,
            models::offer::OfferItemPayload,
            models::offer::ExtraCostPayload,
            models::offer::PreviewOfferPayload,
            models::offer::CreateOfferPayload,
            models::offer::UpdateOfferStatusPayload,

            // --- Settings ---
            models::settings::AdminSetting,
            models::settings::UpsertSettingPayload,
        )
    ),
    tags(
        (name = "Settings", description = "Configurações administrativas (chave/valor)"),
        (name = "Users", description = "Gestão de usuários e permissões"),
        (name = "Companies", description = "Empresas emissoras dos orçamentos"),
        (name = "Catalog", description = "Catálogo de módulos, inversores, baterias e serviços"),
        (name = "CRM", description = "Gestão de Clientes"),
        (name = "Offers", description = "Montagem, cálculo e PDF dos orçamentos")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
