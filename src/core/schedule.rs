use super::error::PayoffError;

/// Recurring extra payments, cycled by month: month `m` uses `amounts[(m - 1) % len]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtraPaymentSchedule {
    amounts: Vec<f64>,
}

impl ExtraPaymentSchedule {
    /// Zero entries are allowed here; comparisons additionally require one positive amount.
    pub fn new(amounts: Vec<f64>) -> Result<Self, PayoffError> {
        if amounts.is_empty() {
            return Err(PayoffError::EmptySchedule);
        }
        for (index, &value) in amounts.iter().enumerate() {
            if !value.is_finite() || value < 0.0 {
                return Err(PayoffError::InvalidExtraPayment {
                    index: index + 1,
                    value,
                });
            }
        }
        Ok(Self { amounts })
    }

    /// Builds a schedule from free text such as `"100, 50 75"`.
    pub fn parse(text: &str) -> Result<Self, PayoffError> {
        let amounts = parse_extra_payments(text);
        if amounts.is_empty() {
            return Err(PayoffError::NoExtraPayments);
        }
        Self::new(amounts)
    }

    pub fn amounts(&self) -> &[f64] {
        &self.amounts
    }

    pub fn amount_for_month(&self, month: u32) -> f64 {
        let index = month.saturating_sub(1) as usize % self.amounts.len();
        self.amounts[index]
    }

    pub fn has_positive_amount(&self) -> bool {
        self.amounts.iter().any(|&v| v > 0.0)
    }
}

/// Splits on commas and whitespace; tokens that are not positive finite numbers are dropped.
pub fn parse_extra_payments(text: &str) -> Vec<f64> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .filter_map(|token| token.parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v > 0.0)
        .collect()
}
