mod engine;
mod error;
mod normalize;
mod report;
mod schedule;
mod types;

pub use engine::{
    AccrualStep, accrue_month, allocate_extra, compare_raw_debts, compare_strategies,
    run_monthly_trace, simulate_payoff,
};
pub use error::PayoffError;
pub use normalize::{normalize_debt, normalize_debts, parse_amount};
pub use report::{
    ComparisonReport, PayoffSummary, comparison_statement, format_currency, format_duration,
};
pub use schedule::{ExtraPaymentSchedule, parse_extra_payments};
pub use types::{
    Debt, MAX_SIMULATION_MONTHS, MonthTracePoint, PayoffResult, RawDebt, RawNumber,
    SimulationConfig, SimulationDebt, Strategy, StrategyComparison,
};
