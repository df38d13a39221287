use serde::Serialize;

use super::types::{PayoffResult, Strategy, StrategyComparison};

const NOT_AVAILABLE: &str = "N/A";

/// Display-ready view of one strategy run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoffSummary {
    pub strategy: Strategy,
    pub converged: bool,
    pub months: i32,
    pub total_interest: f64,
    pub duration: String,
    pub interest_display: String,
}

impl PayoffSummary {
    pub fn new(strategy: Strategy, result: PayoffResult) -> Self {
        let converged = result.is_converged();
        Self {
            strategy,
            converged,
            months: result.months,
            total_interest: result.total_interest,
            duration: format_duration(result.months),
            interest_display: if converged {
                format_currency(result.total_interest)
            } else {
                NOT_AVAILABLE.to_string()
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonReport {
    pub avalanche: PayoffSummary,
    pub snowball: PayoffSummary,
    pub savings: Option<f64>,
    pub statement: Option<String>,
}

impl ComparisonReport {
    pub fn from_comparison(comparison: &StrategyComparison) -> Self {
        Self {
            avalanche: PayoffSummary::new(Strategy::Avalanche, comparison.avalanche),
            snowball: PayoffSummary::new(Strategy::Snowball, comparison.snowball),
            savings: comparison.interest_savings(),
            statement: comparison_statement(comparison),
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for summary in [&self.avalanche, &self.snowball] {
            if summary.converged {
                out.push_str(&format!(
                    "{:<10} debt-free in {}, total interest {}\n",
                    summary.strategy.label(),
                    summary.duration,
                    summary.interest_display
                ));
            } else {
                out.push_str(&format!(
                    "{:<10} calculation error: payments never catch up with interest\n",
                    summary.strategy.label()
                ));
            }
        }
        if let Some(statement) = &self.statement {
            out.push_str(statement);
            out.push('\n');
        }
        out
    }
}

/// `"2 years 3 months"`, or `"N/A"` for the divergence sentinel.
pub fn format_duration(months: i32) -> String {
    if months < 0 {
        return NOT_AVAILABLE.to_string();
    }
    let years = months / 12;
    let rest = months % 12;
    let plural = |n: i32, unit: &str| {
        if n == 1 {
            format!("1 {unit}")
        } else {
            format!("{n} {unit}s")
        }
    };

    match (years, rest) {
        (0, rest) => plural(rest, "month"),
        (years, 0) => plural(years, "year"),
        (years, rest) => format!("{} {}", plural(years, "year"), plural(rest, "month")),
    }
}

/// Euro amount with thousands separators and two decimals, e.g. `€1,234.56`.
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, ch) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}€{grouped}.{:02}", cents % 100)
}

pub fn comparison_statement(comparison: &StrategyComparison) -> Option<String> {
    comparison.interest_savings().map(|savings| {
        format!(
            "Avalanche saves you {} in interest compared to Snowball.",
            format_currency(savings)
        )
    })
}
