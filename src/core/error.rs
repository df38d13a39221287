/// Input problems that stop a comparison before any month is simulated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PayoffError {
    #[error("at least one debt is required")]
    NoDebts,

    #[error("enter at least one positive extra payment amount")]
    NoExtraPayments,

    #[error("extra payment schedule must not be empty")]
    EmptySchedule,

    #[error("extra payment #{index} is invalid: {value}")]
    InvalidExtraPayment { index: usize, value: f64 },
}
