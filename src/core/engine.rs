use tracing::{debug, warn};

use super::error::PayoffError;
use super::normalize::normalize_debts;
use super::schedule::ExtraPaymentSchedule;
use super::types::{
    MonthTracePoint, PayoffResult, RawDebt, SimulationConfig, SimulationDebt, Strategy,
    StrategyComparison,
};

/// Cash movements of one accrual step, before any extra payment.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct AccrualStep {
    pub interest: f64,
    pub freed_minimums: f64,
    pub minimum_paid: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum SimulationState {
    Running,
    Converged,
    Diverged,
}

/// Capitalizes one month of interest on every open debt, then applies minimum payments.
///
/// Debts already at zero when the month starts contribute their minimum payment to
/// `freed_minimums`, which the caller redirects into the extra-payment pool.
pub fn accrue_month(debts: &mut [SimulationDebt]) -> AccrualStep {
    let mut step = AccrualStep::default();

    for debt in debts.iter_mut() {
        if debt.balance > 0.0 {
            let interest = debt.balance * debt.rate;
            step.interest += interest;
            debt.balance += interest;
        } else {
            step.freed_minimums += debt.min_payment;
        }
    }

    for debt in debts.iter_mut() {
        if debt.balance > 0.0 {
            let payment = debt.balance.min(debt.min_payment);
            debt.balance -= payment;
            step.minimum_paid += payment;
        }
    }

    step
}

/// Spends `available` on open debts in strategy order and returns the amount used.
///
/// Ties keep input order.
pub fn allocate_extra(debts: &mut [SimulationDebt], strategy: Strategy, available: f64) -> f64 {
    if available <= 0.0 {
        return 0.0;
    }

    let mut order = (0..debts.len())
        .filter(|&idx| debts[idx].balance > 0.0)
        .collect::<Vec<_>>();
    match strategy {
        Strategy::Avalanche => order.sort_by(|&a, &b| debts[b].rate.total_cmp(&debts[a].rate)),
        Strategy::Snowball => {
            order.sort_by(|&a, &b| debts[a].balance.total_cmp(&debts[b].balance))
        }
    }

    let mut remaining = available;
    for idx in order {
        if remaining <= 0.0 {
            break;
        }
        let payment = debts[idx].balance.min(remaining);
        debts[idx].balance -= payment;
        remaining -= payment;
    }

    available - remaining
}

pub fn simulate_payoff(
    debts: &[SimulationDebt],
    strategy: Strategy,
    schedule: &ExtraPaymentSchedule,
    config: SimulationConfig,
) -> PayoffResult {
    run_simulation(debts, strategy, schedule, config, None)
}

/// Same run as [`simulate_payoff`], also returning the end-of-month state for every tick.
pub fn run_monthly_trace(
    debts: &[SimulationDebt],
    strategy: Strategy,
    schedule: &ExtraPaymentSchedule,
    config: SimulationConfig,
) -> (PayoffResult, Vec<MonthTracePoint>) {
    let mut trace = Vec::new();
    let result = run_simulation(debts, strategy, schedule, config, Some(&mut trace));
    (result, trace)
}

fn run_simulation(
    initial: &[SimulationDebt],
    strategy: Strategy,
    schedule: &ExtraPaymentSchedule,
    config: SimulationConfig,
    mut trace: Option<&mut Vec<MonthTracePoint>>,
) -> PayoffResult {
    let mut debts = initial.to_vec();
    let mut months = 0_u32;
    let mut total_interest = 0.0;
    let mut state = if all_paid_off(&debts) {
        SimulationState::Converged
    } else {
        SimulationState::Running
    };

    while state == SimulationState::Running {
        if months >= config.max_months {
            state = SimulationState::Diverged;
            break;
        }
        months += 1;

        let accrual = accrue_month(&mut debts);
        total_interest += accrual.interest;

        let extra_available = schedule.amount_for_month(months) + accrual.freed_minimums;
        let extra_allocated = allocate_extra(&mut debts, strategy, extra_available);

        if let Some(rows) = trace.as_deref_mut() {
            rows.push(MonthTracePoint {
                month: months,
                balances: debts.iter().map(|d| d.balance).collect(),
                interest: accrual.interest,
                minimum_paid: accrual.minimum_paid,
                freed_minimums: accrual.freed_minimums,
                extra_available,
                extra_allocated,
                total_interest,
            });
        }

        if all_paid_off(&debts) {
            state = SimulationState::Converged;
        }
    }

    match state {
        SimulationState::Converged => {
            debug!(
                strategy = strategy.label(),
                months, total_interest, "payoff simulation converged"
            );
            PayoffResult {
                months: i32::try_from(months).unwrap_or(i32::MAX),
                total_interest,
            }
        }
        SimulationState::Diverged | SimulationState::Running => {
            warn!(
                strategy = strategy.label(),
                max_months = config.max_months,
                debts = initial.len(),
                "payoff simulation did not converge"
            );
            PayoffResult::DIVERGED
        }
    }
}

fn all_paid_off(debts: &[SimulationDebt]) -> bool {
    debts.iter().all(SimulationDebt::is_paid_off)
}

fn validate_comparison(
    debts: &[SimulationDebt],
    schedule: &ExtraPaymentSchedule,
) -> Result<(), PayoffError> {
    if debts.is_empty() {
        return Err(PayoffError::NoDebts);
    }
    if !schedule.has_positive_amount() {
        return Err(PayoffError::NoExtraPayments);
    }
    Ok(())
}

/// Runs both strategies on independent copies of `debts`.
pub fn compare_strategies(
    debts: &[SimulationDebt],
    schedule: &ExtraPaymentSchedule,
    config: SimulationConfig,
) -> Result<StrategyComparison, PayoffError> {
    validate_comparison(debts, schedule)?;

    let avalanche = simulate_payoff(debts, Strategy::Avalanche, schedule, config);
    let snowball = simulate_payoff(debts, Strategy::Snowball, schedule, config);

    Ok(StrategyComparison {
        avalanche,
        snowball,
    })
}

/// Normalizes stored records and parses the free-text extra payments before comparing.
pub fn compare_raw_debts(
    raw: &[RawDebt],
    extra_payments: &str,
    config: SimulationConfig,
) -> Result<StrategyComparison, PayoffError> {
    if raw.is_empty() {
        return Err(PayoffError::NoDebts);
    }
    let schedule = ExtraPaymentSchedule::parse(extra_payments)?;
    compare_strategies(&normalize_debts(raw), &schedule, config)
}
