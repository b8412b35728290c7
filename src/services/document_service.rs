// src/services/document_service.rs

use genpdf::{elements, style, Element};
use image::Luma;
use qrcode::QrCode;

use crate::{
    common::currency::{format_brl, format_percent},
    common::error::AppError,
    db::{CompanyRepository, OfferRepository},
    services::pricing::VAT_RATE_PERCENT,
};

#[derive(Clone)]
pub struct DocumentService {
    offer_repo: OfferRepository,
    company_repo: CompanyRepository,
}

impl DocumentService {
    pub fn new(offer_repo: OfferRepository, company_repo: CompanyRepository) -> Self {
        Self {
            offer_repo,
            company_repo,
        }
    }

    pub async fn generate_offer_pdf(&self, offer_id: i64) -> Result<Vec<u8>, AppError> {
        // 1. Busca os dados
        let offer = self
            .offer_repo
            .get(offer_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Orçamento não encontrado.".to_string()))?;
        let items = self.offer_repo.list_items(offer_id).await?;
        let customer_name = self.offer_repo.get_customer_name(offer_id).await?;
        let company = self.company_repo.get_default().await?;

        // 2. Configura o PDF
        // Carrega a fonte da pasta 'fonts/'
        let font_family = genpdf::fonts::from_files("./fonts", "Roboto", None)
            .map_err(|_| AppError::FontNotFound("Fonte não encontrada na pasta ./fonts".to_string()))?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(format!("Orçamento {}", offer.display_number));
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        // --- CABEÇALHO ---
        let company_name = company
            .as_ref()
            .map(|c| c.name.clone())
            .unwrap_or("SOLARIS".to_string());
        doc.push(
            elements::Paragraph::new(company_name)
                .styled(style::Style::new().bold().with_font_size(18)),
        );

        if let Some(tax_id) = company.as_ref().and_then(|c| c.tax_id.clone()) {
            doc.push(
                elements::Paragraph::new(format!("CNPJ: {}", tax_id))
                    .styled(style::Style::new().with_font_size(10)),
            );
        }

        doc.push(elements::Break::new(1.5));

        doc.push(
            elements::Paragraph::new(format!("ORÇAMENTO {}", offer.display_number))
                .styled(style::Style::new().bold().with_font_size(14)),
        );
        doc.push(elements::Paragraph::new(format!(
            "Data: {}",
            offer.created_at.format("%d/%m/%Y")
        )));
        doc.push(elements::Paragraph::new(format!("Cliente: {}", customer_name)));
        doc.push(elements::Paragraph::new(format!(
            "Potência do sistema: {} kWp",
            offer.system_kwp
        )));

        doc.push(elements::Break::new(2));

        // --- TABELA DE ITENS ---
        // Pesos das colunas: Descrição (5), Qtd (1), Unitário (2), Total (2)
        let mut table = elements::TableLayout::new(vec![5, 1, 2, 2]);
        table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

        let style_bold = style::Style::new().bold();
        table
            .row()
            .element(elements::Paragraph::new("Descrição").styled(style_bold))
            .element(elements::Paragraph::new("Qtd").styled(style_bold))
            .element(elements::Paragraph::new("Unitário").styled(style_bold))
            .element(elements::Paragraph::new("Total").styled(style_bold))
            .push()
            .expect("Table error");

        for item in &items {
            table
                .row()
                .element(elements::Paragraph::new(item.description.clone()))
                .element(elements::Paragraph::new(format!("{:.2}", item.quantity)))
                .element(elements::Paragraph::new(format_brl(item.unit_price)))
                .element(elements::Paragraph::new(format_brl(item.line_total)))
                .push()
                .expect("Table row error");
        }

        doc.push(table);
        doc.push(elements::Break::new(2));

        // --- RESUMO DO CÁLCULO ---
        doc.push(elements::Paragraph::new(format!(
            "Subtotal dos itens: {}",
            format_brl(offer.items_subtotal)
        )));
        if !offer.provision_amount.is_zero() {
            doc.push(elements::Paragraph::new(format!(
                "Provisão: {}",
                format_brl(offer.provision_amount)
            )));
        }
        if !offer.discount_total.is_zero() {
            doc.push(elements::Paragraph::new(format!(
                "Descontos: -{}",
                format_brl(offer.discount_total)
            )));
        }
        if !offer.surcharge_total.is_zero() {
            doc.push(elements::Paragraph::new(format!(
                "Acréscimos: {}",
                format_brl(offer.surcharge_total)
            )));
        }
        if !offer.extras_total.is_zero() {
            doc.push(elements::Paragraph::new(format!(
                "Custos avulsos: {}",
                format_brl(offer.extras_total)
            )));
        }
        doc.push(elements::Paragraph::new(format!(
            "Valor líquido: {}",
            format_brl(offer.net_total)
        )));
        doc.push(elements::Paragraph::new(format!(
            "Imposto ({}): {}",
            format_percent(VAT_RATE_PERCENT),
            format_brl(offer.vat_amount)
        )));

        let mut total_paragraph =
            elements::Paragraph::new(format!("TOTAL GERAL: {}", format_brl(offer.gross_total)));
        total_paragraph.set_alignment(genpdf::Alignment::Right);
        doc.push(total_paragraph.styled(style::Style::new().bold().with_font_size(12)));

        doc.push(elements::Break::new(2));

        // --- ÁREA DE PAGAMENTO (QR CODE) ---
        if let Some(key) = company.as_ref().and_then(|c| c.pix_key.clone()) {
            doc.push(
                elements::Paragraph::new("PAGAMENTO VIA PIX")
                    .styled(style::Style::new().bold().with_font_size(12)),
            );
            doc.push(elements::Paragraph::new(format!("Chave: {}", key)));
            doc.push(elements::Break::new(1));

            // QR Code simples com a string da chave
            let code = QrCode::new(key.as_bytes())
                .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?;

            let image_buffer = code.render::<Luma<u8>>().build();
            let dynamic_image = image::DynamicImage::ImageLuma8(image_buffer);

            let pdf_image = genpdf::elements::Image::from_dynamic_image(dynamic_image)
                .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?
                .with_scale(genpdf::Scale::new(0.5, 0.5));

            doc.push(pdf_image);
        }

        // --- RODAPÉ ---
        if let Some(c) = company.as_ref() {
            let address_line: Vec<String> = [c.street.clone(), c.zip_code.clone(), c.city.clone()]
                .into_iter()
                .flatten()
                .collect();
            if !address_line.is_empty() {
                doc.push(elements::Break::new(2));
                doc.push(
                    elements::Paragraph::new(address_line.join(" - "))
                        .styled(style::Style::new().italic().with_font_size(8)),
                );
            }
        }

        // 3. Renderiza para Buffer (Memória)
        let mut buffer = Vec::new();
        doc.render(&mut buffer)
            .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?;

        Ok(buffer)
    }
}
