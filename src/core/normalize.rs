use super::types::{Debt, RawDebt, RawNumber, SimulationDebt};

/// Reads a stored amount. Strings may use a decimal comma (`"21,99"`).
pub fn parse_amount(raw: &RawNumber) -> Option<f64> {
    let value = match raw {
        RawNumber::Number(v) => *v,
        RawNumber::Text(text) => parse_decimal_text(text)?,
        RawNumber::Other(_) => return None,
    };
    value.is_finite().then_some(value)
}

fn parse_decimal_text(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(v) = trimmed.parse::<f64>() {
        return Some(v);
    }
    if trimmed.matches(',').count() == 1 && !trimmed.contains('.') {
        return trimmed.replace(',', ".").parse::<f64>().ok();
    }
    None
}

fn amount_or_zero(raw: Option<&RawNumber>) -> f64 {
    raw.and_then(parse_amount).unwrap_or(0.0).max(0.0)
}

fn monthly_rate(annual_rate_percent: f64) -> f64 {
    annual_rate_percent / 100.0 / 12.0
}

pub fn normalize_debt(raw: &RawDebt) -> SimulationDebt {
    SimulationDebt {
        name: raw.name.clone().unwrap_or_default(),
        balance: amount_or_zero(raw.montant_total.as_ref()),
        min_payment: amount_or_zero(raw.montant.as_ref()),
        rate: monthly_rate(amount_or_zero(raw.taux_interet.as_ref())),
    }
}

pub fn normalize_debts(raw: &[RawDebt]) -> Vec<SimulationDebt> {
    raw.iter().map(normalize_debt).collect()
}

impl Debt {
    pub fn to_simulation(&self) -> SimulationDebt {
        let clean = |v: f64| if v.is_finite() { v.max(0.0) } else { 0.0 };
        SimulationDebt {
            name: self.name.clone(),
            balance: clean(self.balance),
            min_payment: clean(self.min_payment),
            rate: monthly_rate(clean(self.annual_rate_percent)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn text(s: &str) -> Option<RawNumber> {
        Some(RawNumber::Text(s.to_string()))
    }

    #[test]
    fn string_fields_are_parsed_and_rate_is_monthly() {
        let raw = RawDebt {
            name: Some("Car loan".to_string()),
            montant_total: text(" 1200 "),
            montant: text("110.5"),
            taux_interet: text("12"),
        };
        let debt = normalize_debt(&raw);
        assert_eq!(debt.name, "Car loan");
        assert_approx(debt.balance, 1200.0);
        assert_approx(debt.min_payment, 110.5);
        assert_approx(debt.rate, 0.01);
    }

    #[test]
    fn decimal_comma_is_accepted() {
        assert_eq!(parse_amount(&RawNumber::Text("21,99".to_string())), Some(21.99));
        assert_eq!(parse_amount(&RawNumber::Text("1,2,3".to_string())), None);
    }

    #[test]
    fn missing_and_malformed_fields_default_to_zero() {
        let raw = RawDebt {
            name: None,
            montant_total: text("abc"),
            montant: None,
            taux_interet: Some(RawNumber::Other(serde_json::Value::Bool(true))),
        };
        let debt = normalize_debt(&raw);
        assert_eq!(debt.name, "");
        assert_eq!(debt.balance, 0.0);
        assert_eq!(debt.min_payment, 0.0);
        assert_eq!(debt.rate, 0.0);
        assert!(debt.is_paid_off());
    }

    #[test]
    fn non_finite_and_negative_amounts_become_zero() {
        assert_eq!(parse_amount(&RawNumber::Text("inf".to_string())), None);
        assert_eq!(parse_amount(&RawNumber::Text("NaN".to_string())), None);

        let raw = RawDebt {
            name: Some("odd".to_string()),
            montant_total: Some(RawNumber::Number(-50.0)),
            montant: text("-1"),
            taux_interet: text("  "),
        };
        let debt = normalize_debt(&raw);
        assert_eq!(debt.balance, 0.0);
        assert_eq!(debt.min_payment, 0.0);
        assert_eq!(debt.rate, 0.0);
    }

    #[test]
    fn normalization_leaves_source_records_untouched() {
        let raw = vec![RawDebt {
            name: Some("Visa".to_string()),
            montant_total: Some(RawNumber::Number(900.0)),
            montant: Some(RawNumber::Number(30.0)),
            taux_interet: Some(RawNumber::Number(21.99)),
        }];
        let before = raw.clone();
        let mut debts = normalize_debts(&raw);
        debts[0].balance = 0.0;
        assert_eq!(raw, before);
        assert_approx(normalize_debts(&raw)[0].rate, 0.2199 / 12.0);
    }

    #[test]
    fn typed_debt_converts_like_raw_records() {
        let debt = Debt {
            name: "Store card".to_string(),
            balance: 750.0,
            min_payment: 25.0,
            annual_rate_percent: 24.0,
        };
        let sim = debt.to_simulation();
        assert_approx(sim.balance, 750.0);
        assert_approx(sim.min_payment, 25.0);
        assert_approx(sim.rate, 0.02);
    }
}
