use axum::{
    Router,
    extract::Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::{Parser, ValueEnum, error::ErrorKind};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::core::{
    ComparisonReport, ExtraPaymentSchedule, MAX_SIMULATION_MONTHS, MonthTracePoint, RawDebt,
    RawNumber, SimulationConfig, SimulationDebt, Strategy, compare_strategies, normalize_debts,
    run_monthly_trace,
};

/// Upper limit accepted for `--max-months` (500 years).
const MAX_MONTHS_LIMIT: u32 = 6_000;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliOutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ApiExtraPayments {
    Text(String),
    Amounts(Vec<f64>),
}

impl ApiExtraPayments {
    fn into_text(self) -> String {
        match self {
            ApiExtraPayments::Text(text) => text,
            ApiExtraPayments::Amounts(amounts) => amounts
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ComparePayload {
    debts: Option<Vec<RawDebt>>,
    extra_payments: Option<ApiExtraPayments>,
    max_months: Option<u32>,
    include_schedule: Option<bool>,
}

#[derive(Parser, Debug)]
#[command(
    name = "payoff",
    about = "Compare Avalanche and Snowball debt repayment (run `payoff serve [port]` for the HTTP API)"
)]
struct Cli {
    #[arg(
        long = "debt",
        value_name = "NAME:BALANCE:MIN_PAYMENT:ANNUAL_RATE",
        value_parser = parse_debt_arg,
        help = "Debt to include; repeat for each debt. Rate is a yearly percentage, e.g. 21.99"
    )]
    debts: Vec<RawDebt>,
    #[arg(
        long,
        default_value = "",
        help = "Extra monthly payments, comma or space separated; cycled month by month"
    )]
    extra: String,
    #[arg(
        long,
        default_value_t = MAX_SIMULATION_MONTHS,
        help = "Months to simulate before reporting a calculation error"
    )]
    max_months: u32,
    #[arg(long, value_enum, default_value_t = CliOutputFormat::Text)]
    format: CliOutputFormat,
    #[arg(long, help = "Include the month-by-month schedule (JSON output only)")]
    trace: bool,
}

#[derive(Debug)]
struct CompareRequest {
    debts: Vec<SimulationDebt>,
    schedule: ExtraPaymentSchedule,
    config: SimulationConfig,
    include_schedule: bool,
    format: CliOutputFormat,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DebtResponse {
    name: String,
    balance: f64,
    min_payment: f64,
    annual_rate_percent: f64,
}

#[derive(Debug, Serialize)]
struct StrategySchedules {
    avalanche: Vec<MonthTracePoint>,
    snowball: Vec<MonthTracePoint>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompareResponse {
    max_months: u32,
    extra_payments: Vec<f64>,
    debts: Vec<DebtResponse>,
    #[serde(flatten)]
    report: ComparisonReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    schedules: Option<StrategySchedules>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

fn parse_debt_arg(value: &str) -> Result<RawDebt, String> {
    let parts = value.split(':').collect::<Vec<_>>();
    let [name, balance, min_payment, rate] = parts.as_slice() else {
        return Err(format!(
            "expected NAME:BALANCE:MIN_PAYMENT:ANNUAL_RATE, got '{value}'"
        ));
    };
    let text = |s: &str| Some(RawNumber::Text(s.to_string()));
    Ok(RawDebt {
        name: Some(name.trim().to_string()),
        montant_total: text(*balance),
        montant: text(*min_payment),
        taux_interet: text(*rate),
    })
}

fn build_request(cli: Cli) -> Result<CompareRequest, String> {
    if cli.debts.is_empty() {
        return Err("at least one --debt is required".to_string());
    }

    if cli.max_months == 0 || cli.max_months > MAX_MONTHS_LIMIT {
        return Err(format!(
            "--max-months must be between 1 and {MAX_MONTHS_LIMIT}"
        ));
    }

    let schedule = ExtraPaymentSchedule::parse(&cli.extra).map_err(|e| format!("--extra: {e}"))?;

    Ok(CompareRequest {
        debts: normalize_debts(&cli.debts),
        schedule,
        config: SimulationConfig {
            max_months: cli.max_months,
        },
        include_schedule: cli.trace,
        format: cli.format,
    })
}

fn default_cli_for_api() -> Cli {
    Cli {
        debts: Vec::new(),
        extra: String::new(),
        max_months: MAX_SIMULATION_MONTHS,
        format: CliOutputFormat::Json,
        trace: false,
    }
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<CompareRequest, String> {
    let payload = serde_json::from_str::<ComparePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}

fn api_request_from_payload(payload: ComparePayload) -> Result<CompareRequest, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.debts {
        cli.debts = v;
    }
    if let Some(v) = payload.extra_payments {
        cli.extra = v.into_text();
    }
    if let Some(v) = payload.max_months {
        cli.max_months = v;
    }
    if let Some(v) = payload.include_schedule {
        cli.trace = v;
    }

    build_request(cli)
}

fn run_comparison(request: &CompareRequest) -> Result<CompareResponse, String> {
    info!(
        debts = request.debts.len(),
        extra_payments = request.schedule.amounts().len(),
        max_months = request.config.max_months,
        "comparing repayment strategies"
    );

    let comparison = compare_strategies(&request.debts, &request.schedule, request.config)
        .map_err(|e| e.to_string())?;

    let schedules = request.include_schedule.then(|| {
        let trace = |strategy| {
            run_monthly_trace(&request.debts, strategy, &request.schedule, request.config).1
        };
        StrategySchedules {
            avalanche: trace(Strategy::Avalanche),
            snowball: trace(Strategy::Snowball),
        }
    });

    Ok(CompareResponse {
        max_months: request.config.max_months,
        extra_payments: request.schedule.amounts().to_vec(),
        debts: request
            .debts
            .iter()
            .map(|d| DebtResponse {
                name: d.name.clone(),
                balance: d.balance,
                min_payment: d.min_payment,
                annual_rate_percent: d.rate * 12.0 * 100.0,
            })
            .collect(),
        report: ComparisonReport::from_comparison(&comparison),
        schedules,
    })
}

/// Parses command-line arguments, runs the comparison and renders the output.
pub fn run_cli_from_args<I, T>(args: I) -> Result<String, String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            return Ok(e.to_string());
        }
        Err(e) => return Err(e.to_string()),
    };

    let request = build_request(cli)?;
    let response = run_comparison(&request)?;
    match request.format {
        CliOutputFormat::Text => Ok(response.report.render_text()),
        CliOutputFormat::Json => serde_json::to_string_pretty(&response)
            .map(|json| format!("{json}\n"))
            .map_err(|e| format!("failed to encode response: {e}")),
    }
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/api/compare", post(compare_post_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "payoff HTTP API listening");

    axum::serve(listener, app).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn compare_post_handler(Json(payload): Json<ComparePayload>) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => {
            warn!(error = %msg, "rejected comparison request");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };

    match tokio::task::spawn_blocking(move || run_comparison(&request)).await {
        Ok(Ok(response)) => json_response(StatusCode::OK, response),
        Ok(Err(msg)) => {
            warn!(error = %msg, "rejected comparison request");
            error_response(StatusCode::BAD_REQUEST, &msg)
        }
        Err(e) => {
            error!(error = %e, "comparison task failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Simulation failed")
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
