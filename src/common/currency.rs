// src/common/currency.rs

use rust_decimal::{Decimal, RoundingStrategy};

// Formatação monetária no padrão brasileiro: "R$ 1.234,56".
// O gerador de PDF e as respostas da API consomem estas strings prontas.

/// Formata um valor como moeda (R$), com milhar '.' e decimal ','.
pub fn format_brl(value: Decimal) -> String {
    // Meio centavo arredonda para cima, como na nota fiscal
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative();
    let abs = rounded.abs();

    let plain = format!("{:.2}", abs);
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    // Agrupa os milhares de trás para frente
    let mut grouped = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    let int_grouped: String = grouped.chars().rev().collect();

    if negative {
        format!("-R$ {},{}", int_grouped, frac_part)
    } else {
        format!("R$ {},{}", int_grouped, frac_part)
    }
}

/// Formata um percentual sem zeros à direita: "19%", "2,5%".
pub fn format_percent(value: Decimal) -> String {
    let normalized = value.normalize();
    format!("{}%", normalized.to_string().replace('.', ","))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_format_brl_simple() {
        assert_eq!(format_brl(dec!(0)), "R$ 0,00");
        assert_eq!(format_brl(dec!(7.5)), "R$ 7,50");
        assert_eq!(format_brl(dec!(123.45)), "R$ 123,45");
    }

    #[test]
    fn test_format_brl_thousands() {
        assert_eq!(format_brl(dec!(1234.56)), "R$ 1.234,56");
        assert_eq!(format_brl(dec!(1234567.89)), "R$ 1.234.567,89");
    }

    #[test]
    fn test_format_brl_rounds_to_cents() {
        assert_eq!(format_brl(dec!(10.005)), "R$ 10,01");
        assert_eq!(format_brl(dec!(10.004)), "R$ 10,00");
    }

    #[test]
    fn test_format_brl_negative() {
        assert_eq!(format_brl(dec!(-1500)), "-R$ 1.500,00");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(dec!(19)), "19%");
        assert_eq!(format_percent(dec!(2.50)), "2,5%");
    }
}
