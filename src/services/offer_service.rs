// src/services/offer_service.rs

use chrono::Datelike;

use crate::{
    common::error::AppError,
    db::{CustomerRepository, OfferRepository, ProductRepository},
    models::auth::User,
    models::catalog::ProductCategory,
    models::offer::{CreateOfferPayload, OfferDetail, OfferItemPayload},
    models::pricing::{ExtraCost, PriceLine, PricingBreakdown},
    services::pricing,
};

// Orquestra a montagem do orçamento: resolve os produtos do catálogo,
// fotografa os preços, roda o motor de cálculo e grava tudo em uma
// única transação.
#[derive(Clone)]
pub struct OfferService {
    offer_repo: OfferRepository,
    product_repo: ProductRepository,
    customer_repo: CustomerRepository,
}

// Uma linha resolvida: o vínculo com o catálogo (se houver) + a linha de preço
struct ResolvedLine {
    product_id: Option<i64>,
    line: PriceLine,
}

impl OfferService {
    pub fn new(
        offer_repo: OfferRepository,
        product_repo: ProductRepository,
        customer_repo: CustomerRepository,
    ) -> Self {
        Self {
            offer_repo,
            product_repo,
            customer_repo,
        }
    }

    // Transforma os itens do payload em linhas de preço. O produto pode
    // vir por id ou por nome de modelo; item avulso precisa trazer
    // descrição e preço próprios.
    async fn resolve_lines(
        &self,
        items: &[OfferItemPayload],
    ) -> Result<Vec<ResolvedLine>, AppError> {
        let mut resolved = Vec::with_capacity(items.len());

        for item in items {
            let product = match (item.product_id, item.model_name.as_deref()) {
                (Some(id), _) => Some(self.product_repo.get(id).await?.ok_or_else(|| {
                    AppError::NotFound(format!("Produto {} não encontrado.", id))
                })?),
                (None, Some(model)) => {
                    Some(self.product_repo.get_by_model_name(model).await?.ok_or_else(
                        || AppError::NotFound(format!("Modelo '{}' não encontrado.", model)),
                    )?)
                }
                (None, None) => None,
            };

            let line = match &product {
                Some(p) => PriceLine {
                    description: item
                        .description
                        .clone()
                        .unwrap_or_else(|| format!("{} {}", p.brand, p.model_name)),
                    calculate_per: item.calculate_per.unwrap_or(p.calculate_per),
                    quantity: item.quantity,
                    unit_price: item.unit_price.unwrap_or(p.unit_price),
                    // Só a potência dos módulos entra no kWp do sistema
                    capacity_wp: match p.category {
                        ProductCategory::Module => p.capacity_wp,
                        _ => None,
                    },
                },
                None => {
                    let description = item.description.clone().ok_or_else(|| {
                        AppError::InvalidOperation(
                            "Item avulso precisa de uma descrição.".to_string(),
                        )
                    })?;
                    let unit_price = item.unit_price.ok_or_else(|| {
                        AppError::InvalidOperation(format!(
                            "Item avulso '{}' precisa de um preço.",
                            description
                        ))
                    })?;
                    PriceLine {
                        description,
                        calculate_per: item.calculate_per.unwrap_or_default(),
                        quantity: item.quantity,
                        unit_price,
                        capacity_wp: None,
                    }
                }
            };

            resolved.push(ResolvedLine {
                product_id: product.map(|p| p.id),
                line,
            });
        }

        Ok(resolved)
    }

    /// O "preview ao vivo": calcula sem tocar no banco.
    pub async fn preview(
        &self,
        items: &[OfferItemPayload],
        extras: &[ExtraCost],
        conditions: &crate::models::pricing::PricingConditions,
    ) -> Result<PricingBreakdown, AppError> {
        let resolved = self.resolve_lines(items).await?;
        let lines: Vec<PriceLine> = resolved.into_iter().map(|r| r.line).collect();
        Ok(pricing::compute(&lines, extras, conditions))
    }

    /// Cria o orçamento completo (cabeçalho + itens) em uma transação.
    pub async fn create(
        &self,
        seller: &User,
        payload: &CreateOfferPayload,
    ) -> Result<OfferDetail, AppError> {
        self.customer_repo
            .get(payload.customer_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Cliente não encontrado.".to_string()))?;

        let resolved = self.resolve_lines(&payload.items).await?;
        let lines: Vec<PriceLine> = resolved.iter().map(|r| r.line.clone()).collect();
        let extras: Vec<ExtraCost> = payload
            .extras
            .iter()
            .map(|e| ExtraCost {
                description: e.description.clone(),
                amount: e.amount,
            })
            .collect();

        let breakdown = pricing::compute(&lines, &extras, &payload.conditions);
        let commission = pricing::commission_amount(breakdown.net_total, seller.commission_rate);

        // --- INÍCIO DA TRANSAÇÃO ---
        let mut tx = self.offer_repo.pool().begin().await?;

        let offer = self
            .offer_repo
            .create_offer(
                &mut *tx,
                payload.customer_id,
                seller.id,
                &payload.conditions,
                &breakdown,
                commission,
            )
            .await?;

        // Número de exibição: ano + id com zeros à esquerda
        let display_number = format!("ORC-{}-{:04}", offer.created_at.year(), offer.id);
        self.offer_repo
            .set_display_number(&mut *tx, offer.id, &display_number)
            .await?;

        let mut items = Vec::with_capacity(resolved.len());
        for (resolved_line, priced) in resolved.iter().zip(breakdown.lines.iter()) {
            let item = self
                .offer_repo
                .add_item(
                    &mut *tx,
                    offer.id,
                    resolved_line.product_id,
                    &priced.description,
                    priced.calculate_per,
                    priced.quantity,
                    priced.unit_price,
                    priced.line_total,
                )
                .await?;
            items.push(item);
        }

        tx.commit().await?;
        // --- FIM DA TRANSAÇÃO ---

        let customer_name = self.offer_repo.get_customer_name(offer.id).await?;

        tracing::info!(
            "📄 Orçamento {} criado ({}).",
            display_number,
            crate::common::currency::format_brl(breakdown.gross_total)
        );

        Ok(OfferDetail {
            offer: crate::models::offer::Offer {
                display_number,
                ..offer
            },
            customer_name,
            items,
        })
    }

    pub async fn get_detail(&self, offer_id: i64) -> Result<OfferDetail, AppError> {
        let offer = self
            .offer_repo
            .get(offer_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Orçamento não encontrado.".to_string()))?;
        let items = self.offer_repo.list_items(offer_id).await?;
        let customer_name = self.offer_repo.get_customer_name(offer_id).await?;

        Ok(OfferDetail {
            offer,
            customer_name,
            items,
        })
    }
}

// Conversão usada pelos handlers (payload -> tipo do motor)
pub fn extras_from_payload(
    extras: &[crate::models::offer::ExtraCostPayload],
) -> Vec<ExtraCost> {
    extras
        .iter()
        .map(|e| ExtraCost {
            description: e.description.clone(),
            amount: e.amount,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use crate::models::auth::UserStatus;
    use crate::models::catalog::CreateProductPayload;
    use crate::models::crm::CreateCustomerPayload;
    use crate::models::offer::OfferStatus;
    use crate::models::pricing::{CalculatePer, PricingConditions};

    use super::*;

    struct TestContext {
        service: OfferService,
        seller: User,
        customer_id: i64,
        module_id: i64,
    }

    async fn setup() -> TestContext {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        let offer_repo = OfferRepository::new(pool.clone());
        let product_repo = ProductRepository::new(pool.clone());
        let customer_repo = CustomerRepository::new(pool.clone());
        let user_repo = crate::db::UserRepository::new(pool.clone());

        let mut seller = user_repo
            .create_user(&pool, "vendedor1", "hash", None, "vendedor", false)
            .await
            .expect("Should create seller");
        seller.commission_rate = dec!(2.5);
        user_repo
            .update_profile(&pool, &seller)
            .await
            .expect("Should set commission");
        assert_eq!(seller.status, UserStatus::Active);

        let customer = customer_repo
            .create(
                &pool,
                &CreateCustomerPayload {
                    full_name: "Maria da Silva".to_string(),
                    email: None,
                    phone: None,
                    street: None,
                    zip_code: None,
                    city: None,
                    notes: None,
                },
            )
            .await
            .expect("Should create customer");

        let module = product_repo
            .create(
                &pool,
                &CreateProductPayload {
                    category: ProductCategory::Module,
                    brand: "Canadian Solar".to_string(),
                    model_name: "CS7N-665MS".to_string(),
                    unit_price: dec!(800),
                    calculate_per: CalculatePer::PerPiece,
                    capacity_wp: Some(dec!(500)),
                    power_kw: None,
                    storage_kwh: None,
                    efficiency_percent: None,
                    warranty_years: Some(25),
                    image_base64: None,
                    datasheet_url: None,
                },
            )
            .await
            .expect("Should create module");

        TestContext {
            service: OfferService::new(offer_repo, product_repo, customer_repo),
            seller,
            customer_id: customer.id,
            module_id: module.id,
        }
    }

    fn module_item(ctx: &TestContext, qty: rust_decimal::Decimal) -> OfferItemPayload {
        OfferItemPayload {
            product_id: Some(ctx.module_id),
            model_name: None,
            description: None,
            quantity: qty,
            unit_price: None,
            calculate_per: None,
        }
    }

    #[tokio::test]
    async fn test_create_offer_end_to_end() {
        let ctx = setup().await;

        let payload = CreateOfferPayload {
            customer_id: ctx.customer_id,
            items: vec![
                module_item(&ctx, dec!(10)),
                OfferItemPayload {
                    product_id: None,
                    model_name: None,
                    description: Some("Taxa de homologação".to_string()),
                    quantity: dec!(1),
                    unit_price: Some(dec!(350)),
                    calculate_per: Some(CalculatePer::LumpSum),
                },
            ],
            extras: vec![],
            conditions: PricingConditions {
                discount_percent: dec!(10),
                ..Default::default()
            },
        };

        let detail = ctx
            .service
            .create(&ctx.seller, &payload)
            .await
            .expect("Should create offer");

        // 10 × 800 + 350 = 8350; -10% = 7515
        assert_eq!(detail.offer.items_subtotal, dec!(8350.00));
        assert_eq!(detail.offer.net_total, dec!(7515.00));
        assert_eq!(detail.offer.system_kwp, dec!(5.000));
        assert_eq!(detail.offer.status, OfferStatus::Draft);
        assert_eq!(detail.offer.commission_amount, dec!(187.88)); // 2,5% de 7515
        assert_eq!(detail.customer_name, "Maria da Silva");
        assert_eq!(detail.items.len(), 2);
        assert!(detail.offer.display_number.starts_with("ORC-"));
        assert!(detail.offer.display_number.ends_with(&format!("{:04}", detail.offer.id)));

        // O preço foi fotografado do catálogo
        assert_eq!(detail.items[0].unit_price, dec!(800));
        assert_eq!(detail.items[0].product_id, Some(ctx.module_id));
        assert_eq!(detail.items[1].product_id, None);

        // E o detalhe recarregado do banco bate com o retornado
        let reloaded = ctx.service.get_detail(detail.offer.id).await.unwrap();
        assert_eq!(reloaded.offer.gross_total, detail.offer.gross_total);
        assert_eq!(reloaded.items.len(), 2);
        assert_eq!(reloaded.offer.display_number, detail.offer.display_number);
    }

    #[tokio::test]
    async fn test_create_offer_by_model_name() {
        let ctx = setup().await;

        let payload = CreateOfferPayload {
            customer_id: ctx.customer_id,
            items: vec![OfferItemPayload {
                product_id: None,
                model_name: Some("CS7N-665MS".to_string()),
                description: None,
                quantity: dec!(4),
                unit_price: None,
                calculate_per: None,
            }],
            extras: vec![],
            conditions: PricingConditions::default(),
        };

        let detail = ctx.service.create(&ctx.seller, &payload).await.unwrap();
        assert_eq!(detail.offer.items_subtotal, dec!(3200.00));
        assert_eq!(detail.items[0].description, "Canadian Solar CS7N-665MS");
    }

    #[tokio::test]
    async fn test_preview_does_not_persist() {
        let ctx = setup().await;

        let breakdown = ctx
            .service
            .preview(
                &[module_item(&ctx, dec!(10))],
                &[],
                &PricingConditions::default(),
            )
            .await
            .expect("Should preview");
        assert_eq!(breakdown.items_subtotal, dec!(8000.00));

        let offers = ctx.service.offer_repo.list().await.unwrap();
        assert!(offers.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_product_fails() {
        let ctx = setup().await;

        let payload = CreateOfferPayload {
            customer_id: ctx.customer_id,
            items: vec![OfferItemPayload {
                product_id: Some(999),
                model_name: None,
                description: None,
                quantity: dec!(1),
                unit_price: None,
                calculate_per: None,
            }],
            extras: vec![],
            conditions: PricingConditions::default(),
        };

        let result = ctx.service.create(&ctx.seller, &payload).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_freeform_item_requires_price() {
        let ctx = setup().await;

        let result = ctx
            .service
            .preview(
                &[OfferItemPayload {
                    product_id: None,
                    model_name: None,
                    description: Some("Frete".to_string()),
                    quantity: dec!(1),
                    unit_price: None,
                    calculate_per: None,
                }],
                &[],
                &PricingConditions::default(),
            )
            .await;
        assert!(matches!(result, Err(AppError::InvalidOperation(_))));
    }
}
