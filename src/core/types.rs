use serde::{Deserialize, Serialize};

/// Hard safety bound on simulated months (100 years).
pub const MAX_SIMULATION_MONTHS: u32 = 1200;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Highest monthly rate first.
    Avalanche,
    /// Lowest remaining balance first.
    Snowball,
}

impl Strategy {
    pub fn label(self) -> &'static str {
        match self {
            Strategy::Avalanche => "Avalanche",
            Strategy::Snowball => "Snowball",
        }
    }
}

/// A numeric field as it arrives from storage or a form: a number, a string, or junk.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

/// Debt record as persisted by the application, before any parsing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawDebt {
    #[serde(alias = "nom")]
    pub name: Option<String>,
    pub montant_total: Option<RawNumber>,
    pub montant: Option<RawNumber>,
    pub taux_interet: Option<RawNumber>,
}

/// Typed debt input; `annual_rate_percent` is nominal, e.g. `21.99`.
#[derive(Debug, Clone, PartialEq)]
pub struct Debt {
    pub name: String,
    pub balance: f64,
    pub min_payment: f64,
    pub annual_rate_percent: f64,
}

/// Mutable per-run copy of a debt. `rate` is the monthly periodic rate.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationDebt {
    pub name: String,
    pub balance: f64,
    pub min_payment: f64,
    pub rate: f64,
}

impl SimulationDebt {
    pub fn is_paid_off(&self) -> bool {
        self.balance <= 0.0
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoffResult {
    pub months: i32,
    pub total_interest: f64,
}

impl PayoffResult {
    /// Sentinel for a run that hit the month bound without reaching zero.
    pub const DIVERGED: PayoffResult = PayoffResult {
        months: -1,
        total_interest: -1.0,
    };

    pub fn is_converged(&self) -> bool {
        self.months >= 0
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SimulationConfig {
    pub max_months: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_months: MAX_SIMULATION_MONTHS,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyComparison {
    pub avalanche: PayoffResult,
    pub snowball: PayoffResult,
}

impl StrategyComparison {
    pub fn result(&self, strategy: Strategy) -> PayoffResult {
        match strategy {
            Strategy::Avalanche => self.avalanche,
            Strategy::Snowball => self.snowball,
        }
    }

    /// Interest avoided by choosing Avalanche, when both runs converged and it is positive.
    pub fn interest_savings(&self) -> Option<f64> {
        if !self.avalanche.is_converged() || !self.snowball.is_converged() {
            return None;
        }
        let savings = self.snowball.total_interest - self.avalanche.total_interest;
        (savings > 0.0).then_some(savings)
    }
}

/// State of every debt at the end of one simulated month.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthTracePoint {
    pub month: u32,
    pub balances: Vec<f64>,
    pub interest: f64,
    pub minimum_paid: f64,
    pub freed_minimums: f64,
    pub extra_available: f64,
    pub extra_allocated: f64,
    pub total_interest: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_debt_accepts_numbers_strings_and_junk() {
        let json = r#"{
          "nom": "Visa",
          "montantTotal": "1500.50",
          "montant": 45,
          "tauxInteret": true
        }"#;
        let raw: RawDebt = serde_json::from_str(json).expect("raw debt should parse");
        assert_eq!(raw.name.as_deref(), Some("Visa"));
        assert_eq!(
            raw.montant_total,
            Some(RawNumber::Text("1500.50".to_string()))
        );
        assert_eq!(raw.montant, Some(RawNumber::Number(45.0)));
        assert!(matches!(raw.taux_interet, Some(RawNumber::Other(_))));
    }

    #[test]
    fn raw_debt_fields_may_be_missing() {
        let raw: RawDebt = serde_json::from_str("{}").expect("empty object should parse");
        assert_eq!(raw, RawDebt::default());
    }

    #[test]
    fn savings_requires_both_runs_to_converge() {
        let comparison = StrategyComparison {
            avalanche: PayoffResult::DIVERGED,
            snowball: PayoffResult {
                months: 10,
                total_interest: 50.0,
            },
        };
        assert_eq!(comparison.interest_savings(), None);
    }

    #[test]
    fn savings_only_reported_when_positive() {
        let mut comparison = StrategyComparison {
            avalanche: PayoffResult {
                months: 10,
                total_interest: 40.0,
            },
            snowball: PayoffResult {
                months: 11,
                total_interest: 55.5,
            },
        };
        assert_eq!(comparison.interest_savings(), Some(15.5));

        comparison.snowball.total_interest = 40.0;
        assert_eq!(comparison.interest_savings(), None);
    }

    #[test]
    fn payoff_result_serializes_camel_case() {
        let json = serde_json::to_string(&PayoffResult::DIVERGED).expect("serialize");
        assert_eq!(json, r#"{"months":-1,"totalInterest":-1.0}"#);
    }
}
