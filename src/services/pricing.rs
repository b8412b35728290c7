// src/services/pricing.rs

// O motor de preços do orçamento. Esta é a ÚNICA implementação da
// sequência de cálculo: o serviço de orçamentos, o preview e o PDF
// consomem todos o mesmo resultado.
//
// Ordem aplicada:
//   subtotal dos itens
//   + provisão (percentual sobre o subtotal + valor fixo)
//   - desconto percentual
//   - desconto fixo
//   + acréscimo percentual (sobre o valor JÁ descontado)
//   + acréscimo fixo
//   + custos avulsos
//   = líquido  ->  imposto 19%  ->  bruto
//
// Cada passo que subtrai é travado em zero.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::pricing::{
    CalculatePer, ExtraCost, PriceLine, PricedLine, PricingBreakdown, PricingConditions,
};

/// Alíquota fixa do imposto sobre o valor líquido.
pub const VAT_RATE_PERCENT: Decimal = Decimal::from_parts(19, 0, 0, false, 0);

fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn pct(base: Decimal, percent: Decimal) -> Decimal {
    base * percent / Decimal::ONE_HUNDRED
}

fn floor_zero(value: Decimal) -> Decimal {
    if value.is_sign_negative() {
        Decimal::ZERO
    } else {
        value
    }
}

/// Potência do sistema em kWp: soma de Wp × quantidade dos módulos.
pub fn system_kwp(lines: &[PriceLine]) -> Decimal {
    let total_wp: Decimal = lines
        .iter()
        .filter_map(|line| line.capacity_wp.map(|wp| wp * line.quantity))
        .sum();
    (total_wp / Decimal::ONE_THOUSAND).round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero)
}

/// Total de uma linha conforme o modo de cobrança.
pub fn line_total(line: &PriceLine, kwp: Decimal) -> Decimal {
    let raw = match line.calculate_per {
        CalculatePer::PerPiece | CalculatePer::PerMeter => line.unit_price * line.quantity,
        CalculatePer::PerKwp => line.unit_price * kwp,
        CalculatePer::LumpSum => line.unit_price,
    };
    round2(raw)
}

/// Comissão do vendedor sobre o líquido. Informativa: não entra no preço.
pub fn commission_amount(net_total: Decimal, rate_percent: Decimal) -> Decimal {
    round2(pct(net_total, rate_percent))
}

/// Roda a sequência completa e devolve o espelho do cálculo.
pub fn compute(
    lines: &[PriceLine],
    extras: &[ExtraCost],
    conditions: &PricingConditions,
) -> PricingBreakdown {
    let kwp = system_kwp(lines);

    let priced: Vec<PricedLine> = lines
        .iter()
        .map(|line| PricedLine {
            description: line.description.clone(),
            calculate_per: line.calculate_per,
            quantity: line.quantity,
            unit_price: line.unit_price,
            line_total: line_total(line, kwp),
        })
        .collect();

    let items_subtotal: Decimal = priced.iter().map(|l| l.line_total).sum();

    // Provisão: margem manual do vendedor
    let provision_amount = round2(pct(items_subtotal, conditions.provision_percent))
        + round2(conditions.provision_flat);
    let base = floor_zero(items_subtotal + provision_amount);

    // Descontos: primeiro o percentual, depois o fixo
    let after_pct_discount = floor_zero(base - round2(pct(base, conditions.discount_percent)));
    let after_discounts = floor_zero(after_pct_discount - conditions.discount_flat);
    let discount_total = base - after_discounts;

    // Acréscimos: o percentual incide sobre o valor já descontado
    let surcharge_pct_amount = round2(pct(after_discounts, conditions.surcharge_percent));
    let surcharge_total = surcharge_pct_amount + conditions.surcharge_flat;
    let after_surcharges = floor_zero(after_discounts + surcharge_total);

    // Custos avulsos
    let extras_total: Decimal = extras.iter().map(|e| e.amount).sum();
    let net_total = floor_zero(round2(after_surcharges + extras_total));

    let vat_amount = round2(pct(net_total, VAT_RATE_PERCENT));
    let gross_total = net_total + vat_amount;

    PricingBreakdown {
        lines: priced,
        system_kwp: kwp,
        items_subtotal,
        provision_amount,
        discount_total,
        surcharge_total,
        extras_total,
        net_total,
        vat_rate: VAT_RATE_PERCENT,
        vat_amount,
        gross_total,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn piece(desc: &str, price: Decimal, qty: Decimal) -> PriceLine {
        PriceLine {
            description: desc.to_string(),
            calculate_per: CalculatePer::PerPiece,
            quantity: qty,
            unit_price: price,
            capacity_wp: None,
        }
    }

    fn module_line(price: Decimal, qty: Decimal, wp: Decimal) -> PriceLine {
        PriceLine {
            description: "Módulo".to_string(),
            calculate_per: CalculatePer::PerPiece,
            quantity: qty,
            unit_price: price,
            capacity_wp: Some(wp),
        }
    }

    #[test]
    fn test_subtotal_per_piece() {
        let lines = vec![piece("Inversor", dec!(5000), dec!(1)), piece("Módulo", dec!(800), dec!(10))];
        let result = compute(&lines, &[], &PricingConditions::default());
        assert_eq!(result.items_subtotal, dec!(13000.00));
        assert_eq!(result.net_total, dec!(13000.00));
    }

    #[test]
    fn test_per_meter_fractional_quantity() {
        let mut line = piece("Cabo solar 6mm", dec!(9.90), dec!(25.5));
        line.calculate_per = CalculatePer::PerMeter;
        let result = compute(&[line], &[], &PricingConditions::default());
        assert_eq!(result.items_subtotal, dec!(252.45));
    }

    #[test]
    fn test_system_kwp_from_modules() {
        // 10 módulos de 450 Wp = 4,5 kWp
        let lines = vec![module_line(dec!(700), dec!(10), dec!(450))];
        assert_eq!(system_kwp(&lines), dec!(4.500));
    }

    #[test]
    fn test_per_kwp_uses_computed_system_size() {
        let lines = vec![
            module_line(dec!(700), dec!(10), dec!(450)),
            PriceLine {
                description: "Instalação".to_string(),
                calculate_per: CalculatePer::PerKwp,
                quantity: dec!(1),
                unit_price: dec!(400),
                capacity_wp: None,
            },
        ];
        let result = compute(&lines, &[], &PricingConditions::default());
        // 7000 de módulos + 400 × 4,5 kWp
        assert_eq!(result.items_subtotal, dec!(8800.00));
    }

    #[test]
    fn test_lump_sum_ignores_quantity() {
        let mut line = piece("Homologação", dec!(1200), dec!(3));
        line.calculate_per = CalculatePer::LumpSum;
        let result = compute(&[line], &[], &PricingConditions::default());
        assert_eq!(result.items_subtotal, dec!(1200.00));
    }

    #[test]
    fn test_provision_percent_plus_flat() {
        let lines = vec![piece("Kit", dec!(10000), dec!(1))];
        let conditions = PricingConditions {
            provision_percent: dec!(10),
            provision_flat: dec!(500),
            ..Default::default()
        };
        let result = compute(&lines, &[], &conditions);
        assert_eq!(result.provision_amount, dec!(1500.00));
        assert_eq!(result.net_total, dec!(11500.00));
    }

    #[test]
    fn test_discount_percent_before_flat() {
        let lines = vec![piece("Kit", dec!(10000), dec!(1))];
        let conditions = PricingConditions {
            discount_percent: dec!(10),
            discount_flat: dec!(200),
            ..Default::default()
        };
        let result = compute(&lines, &[], &conditions);
        // 10000 - 1000 - 200
        assert_eq!(result.discount_total, dec!(1200.00));
        assert_eq!(result.net_total, dec!(8800.00));
    }

    #[test]
    fn test_surcharge_applies_on_discounted_amount() {
        let lines = vec![piece("Kit", dec!(10000), dec!(1))];
        let conditions = PricingConditions {
            discount_percent: dec!(10),
            surcharge_percent: dec!(5),
            ..Default::default()
        };
        let result = compute(&lines, &[], &conditions);
        // 5% sobre 9000, não sobre 10000
        assert_eq!(result.surcharge_total, dec!(450.00));
        assert_eq!(result.net_total, dec!(9450.00));
    }

    #[test]
    fn test_flat_discount_floors_at_zero() {
        let lines = vec![piece("Conector MC4", dec!(25), dec!(2))];
        let conditions = PricingConditions {
            discount_flat: dec!(1000),
            ..Default::default()
        };
        let result = compute(&lines, &[], &conditions);
        assert_eq!(result.net_total, dec!(0.00));
        assert_eq!(result.gross_total, dec!(0.00));
        // O desconto efetivo para no valor disponível
        assert_eq!(result.discount_total, dec!(50.00));
    }

    #[test]
    fn test_extras_added_after_surcharges() {
        let lines = vec![piece("Kit", dec!(1000), dec!(1))];
        let extras = vec![
            ExtraCost { description: "Frete".to_string(), amount: dec!(350) },
            ExtraCost { description: "ART".to_string(), amount: dec!(88.78) },
        ];
        let result = compute(&lines, &extras, &PricingConditions::default());
        assert_eq!(result.extras_total, dec!(438.78));
        assert_eq!(result.net_total, dec!(1438.78));
    }

    #[test]
    fn test_vat_19_percent_on_net() {
        let lines = vec![piece("Kit", dec!(1000), dec!(1))];
        let result = compute(&lines, &[], &PricingConditions::default());
        assert_eq!(result.vat_rate, dec!(19));
        assert_eq!(result.vat_amount, dec!(190.00));
        assert_eq!(result.gross_total, dec!(1190.00));
    }

    #[test]
    fn test_full_sequence() {
        // O caso de referência usado na revisão manual do cálculo
        let lines = vec![
            module_line(dec!(750), dec!(12), dec!(550)), // 9000, 6,6 kWp
            piece("Inversor 6kW", dec!(6200), dec!(1)),
        ];
        let conditions = PricingConditions {
            provision_percent: dec!(5),
            provision_flat: dec!(0),
            discount_percent: dec!(3),
            discount_flat: dec!(160),
            surcharge_percent: dec!(2),
            surcharge_flat: dec!(75),
            ..Default::default()
        };
        let extras = vec![ExtraCost { description: "Frete".to_string(), amount: dec!(500) }];
        let result = compute(&lines, &extras, &conditions);

        assert_eq!(result.system_kwp, dec!(6.600));
        assert_eq!(result.items_subtotal, dec!(15200.00));
        assert_eq!(result.provision_amount, dec!(760.00));
        // base 15960; -3% = 15481.20; -160 = 15321.20
        assert_eq!(result.discount_total, dec!(638.80));
        // +2% de 15321.20 = 306.42; +75
        assert_eq!(result.surcharge_total, dec!(381.42));
        assert_eq!(result.extras_total, dec!(500.00));
        assert_eq!(result.net_total, dec!(16202.62));
        assert_eq!(result.vat_amount, dec!(3078.50));
        assert_eq!(result.gross_total, dec!(19281.12));
    }

    #[test]
    fn test_commission_is_informative() {
        assert_eq!(commission_amount(dec!(10000), dec!(2.5)), dec!(250.00));
        assert_eq!(commission_amount(dec!(0), dec!(2.5)), dec!(0.00));
    }

    #[test]
    fn test_empty_offer_is_all_zero() {
        let result = compute(&[], &[], &PricingConditions::default());
        assert_eq!(result.items_subtotal, dec!(0));
        assert_eq!(result.net_total, dec!(0.00));
        assert_eq!(result.gross_total, dec!(0.00));
        assert_eq!(result.system_kwp, dec!(0.000));
    }
}
