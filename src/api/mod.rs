use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{Datelike, NaiveDate, Utc};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::core::{
    Assumptions, ChartMode, ChartPoint, ComparisonTable, IncomeIndexation, PensionPayout,
    PrivatePensionAssumptions, PublicPensionAssumptions, RetirementHorizon, Scenario,
    SimulationResult, chart_series, comparison_table, run_projection,
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid API JSON payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("birthDate must be formatted as yyyy-mm-dd, got {0:?}")]
    BirthDate(String),
    #[error("birth year {birth_year} cannot be placed before {current_year}")]
    BirthYear { birth_year: i32, current_year: i32 },
    #[error("projection task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Payload(_) | ApiError::BirthDate(_) | ApiError::BirthYear { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliScenario {
    Pessimistic,
    Base,
    Optimistic,
}

impl From<CliScenario> for Scenario {
    fn from(value: CliScenario) -> Self {
        match value {
            CliScenario::Pessimistic => Scenario::Pessimistic,
            CliScenario::Base => Scenario::Base,
            CliScenario::Optimistic => Scenario::Optimistic,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliIndexation {
    InflationAdjusted,
    FixedNominal,
}

impl From<CliIndexation> for IncomeIndexation {
    fn from(value: CliIndexation) -> Self {
        match value {
            CliIndexation::InflationAdjusted => IncomeIndexation::InflationAdjusted,
            CliIndexation::FixedNominal => IncomeIndexation::FixedNominal,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliPensionPayout {
    Lifetime,
    Drawdown,
}

impl From<CliPensionPayout> for PensionPayout {
    fn from(value: CliPensionPayout) -> Self {
        match value {
            CliPensionPayout::Lifetime => PensionPayout::Lifetime,
            CliPensionPayout::Drawdown => PensionPayout::Drawdown,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliChartMode {
    Wealth,
    Income,
    Contribution,
}

impl From<CliChartMode> for ChartMode {
    fn from(value: CliChartMode) -> Self {
        match value {
            CliChartMode::Wealth => ChartMode::Wealth,
            CliChartMode::Income => ChartMode::Income,
            CliChartMode::Contribution => ChartMode::Contribution,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiScenario {
    #[serde(alias = "pessimista")]
    Pessimistic,
    Base,
    #[serde(alias = "otimista")]
    Optimistic,
}

impl From<ApiScenario> for CliScenario {
    fn from(value: ApiScenario) -> Self {
        match value {
            ApiScenario::Pessimistic => CliScenario::Pessimistic,
            ApiScenario::Base => CliScenario::Base,
            ApiScenario::Optimistic => CliScenario::Optimistic,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiIndexation {
    #[serde(alias = "inflationAdjusted", alias = "inflation_adjusted")]
    InflationAdjusted,
    #[serde(alias = "fixedNominal", alias = "fixed_nominal")]
    FixedNominal,
}

impl From<ApiIndexation> for CliIndexation {
    fn from(value: ApiIndexation) -> Self {
        match value {
            ApiIndexation::InflationAdjusted => CliIndexation::InflationAdjusted,
            ApiIndexation::FixedNominal => CliIndexation::FixedNominal,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiPensionPayout {
    #[serde(alias = "vitalicio", alias = "annuity")]
    Lifetime,
    #[serde(alias = "fixed-term", alias = "fixedTerm")]
    Drawdown,
}

impl From<ApiPensionPayout> for CliPensionPayout {
    fn from(value: ApiPensionPayout) -> Self {
        match value {
            ApiPensionPayout::Lifetime => CliPensionPayout::Lifetime,
            ApiPensionPayout::Drawdown => CliPensionPayout::Drawdown,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiChartMode {
    Wealth,
    Income,
    #[serde(alias = "contributions")]
    Contribution,
}

impl From<ApiChartMode> for CliChartMode {
    fn from(value: ApiChartMode) -> Self {
        match value {
            ApiChartMode::Wealth => CliChartMode::Wealth,
            ApiChartMode::Income => CliChartMode::Income,
            ApiChartMode::Contribution => CliChartMode::Contribution,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectPayload {
    birth_date: Option<String>,
    birth_year: Option<i32>,
    current_age: Option<i32>,
    current_year: Option<i32>,
    retirement_age: Option<i32>,
    life_expectancy: Option<i32>,
    perpetual: Option<bool>,

    current_savings: Option<f64>,
    monthly_contribution: Option<f64>,
    desired_monthly_income: Option<f64>,

    scenario: Option<ApiScenario>,
    growth_rate: Option<f64>,
    inflation_rate: Option<f64>,
    withdrawal_rate: Option<f64>,
    indexation: Option<ApiIndexation>,

    pension_contribution: Option<f64>,
    pension_growth_rate: Option<f64>,
    #[serde(alias = "pensionMode")]
    pension_payout: Option<ApiPensionPayout>,

    public_contribution: Option<f64>,
    public_reference_wage: Option<f64>,
    public_minimum_years: Option<u32>,
    public_qualifying_years: Option<u32>,
    public_base_replacement: Option<f64>,
    public_accrual: Option<f64>,
    public_benefit_ceiling: Option<f64>,

    chart_mode: Option<ApiChartMode>,
}

#[derive(Parser, Debug)]
#[command(
    name = "patrimony",
    about = "Long-term wealth projection compared against private and public pensions"
)]
struct Cli {
    #[arg(long, help = "Birth date as yyyy-mm-dd; overrides --birth-year and --current-age")]
    birth_date: Option<String>,
    #[arg(long, help = "Birth year; overrides --current-age")]
    birth_year: Option<i32>,
    #[arg(long, default_value_t = 30, allow_negative_numbers = true)]
    current_age: i32,
    #[arg(long, help = "Calendar year the projection starts, defaults to this year")]
    current_year: Option<i32>,
    #[arg(long, default_value_t = 65, allow_negative_numbers = true)]
    retirement_age: i32,
    #[arg(long, default_value_t = 85, help = "Age the money has to last until")]
    life_expectancy: i32,
    #[arg(
        long,
        default_value_t = false,
        help = "Withdraw only the sustainable yield and never plan to exhaust capital"
    )]
    perpetual: bool,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    current_savings: f64,
    #[arg(long, default_value_t = 1000.0, allow_negative_numbers = true)]
    monthly_contribution: f64,
    #[arg(
        long,
        default_value_t = 5000.0,
        help = "Desired monthly retirement income in today's money"
    )]
    desired_monthly_income: f64,
    #[arg(long, value_enum, default_value_t = CliScenario::Base)]
    scenario: CliScenario,
    #[arg(
        long,
        allow_negative_numbers = true,
        help = "Nominal annual growth in percent; overrides the scenario"
    )]
    growth_rate: Option<f64>,
    #[arg(
        long,
        allow_negative_numbers = true,
        help = "Annual inflation in percent; overrides the scenario"
    )]
    inflation_rate: Option<f64>,
    #[arg(long, default_value_t = 4.0, help = "Annual withdrawal rate in percent")]
    withdrawal_rate: f64,
    #[arg(long, value_enum, default_value_t = CliIndexation::InflationAdjusted)]
    indexation: CliIndexation,
    #[arg(
        long,
        help = "Monthly private pension contribution, defaults to --monthly-contribution"
    )]
    pension_contribution: Option<f64>,
    #[arg(
        long,
        default_value_t = 10.0,
        allow_negative_numbers = true,
        help = "Nominal annual private pension growth in percent"
    )]
    pension_growth_rate: f64,
    #[arg(long, value_enum, default_value_t = CliPensionPayout::Drawdown)]
    pension_payout: CliPensionPayout,
    #[arg(long, default_value_t = 330.0, help = "Monthly public pension contribution")]
    public_contribution: f64,
    #[arg(
        long,
        default_value_t = 3000.0,
        help = "Monthly wage the public benefit is computed from"
    )]
    public_reference_wage: f64,
    #[arg(long, default_value_t = 15, help = "Contribution years needed for any benefit")]
    public_minimum_years: u32,
    #[arg(
        long,
        default_value_t = 20,
        help = "Contribution years after which each extra year accrues"
    )]
    public_qualifying_years: u32,
    #[arg(
        long,
        default_value_t = 60.0,
        help = "Replacement rate in percent once eligible"
    )]
    public_base_replacement: f64,
    #[arg(
        long,
        default_value_t = 2.0,
        help = "Extra replacement in percent per year beyond the qualifying years"
    )]
    public_accrual: f64,
    #[arg(long, default_value_t = 7786.02, help = "Maximum monthly public benefit")]
    public_benefit_ceiling: f64,
    #[arg(long, value_enum, default_value_t = CliChartMode::Wealth)]
    chart_mode: CliChartMode,
}

#[derive(Debug)]
struct ApiRequest {
    assumptions: Assumptions,
    chart_mode: ChartMode,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectionResponse {
    assumptions: Assumptions,
    chart_mode: ChartMode,
    result: SimulationResult,
    chart: Vec<ChartPoint>,
    comparison: ComparisonTable,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

fn build_assumptions(cli: Cli) -> Result<Assumptions, ApiError> {
    let current_year = cli.current_year.unwrap_or_else(|| Utc::now().year());
    let birth_year = match (&cli.birth_date, cli.birth_year) {
        (Some(date), _) => Some(parse_birth_year(date)?),
        (None, year) => year,
    };
    let current_age = match birth_year {
        Some(birth_year) => current_year
            .checked_sub(birth_year)
            .ok_or(ApiError::BirthYear {
                birth_year,
                current_year,
            })?,
        None => cli.current_age,
    };

    let preset = Scenario::from(cli.scenario).rates();
    let nominal_growth_rate = cli
        .growth_rate
        .map(|rate| rate / 100.0)
        .unwrap_or(preset.nominal_growth);
    let inflation_rate = cli
        .inflation_rate
        .map(|rate| rate / 100.0)
        .unwrap_or(preset.inflation);

    let horizon = if cli.perpetual {
        RetirementHorizon::Perpetual
    } else {
        RetirementHorizon::Fixed {
            end_age: cli.life_expectancy,
        }
    };

    Ok(Assumptions {
        current_age,
        current_year,
        retirement_age: cli.retirement_age,
        horizon,
        current_savings: cli.current_savings,
        monthly_contribution: cli.monthly_contribution,
        desired_monthly_income: cli.desired_monthly_income,
        nominal_growth_rate,
        inflation_rate,
        withdrawal_rate: cli.withdrawal_rate / 100.0,
        indexation: cli.indexation.into(),
        private_pension: PrivatePensionAssumptions {
            monthly_contribution: cli
                .pension_contribution
                .unwrap_or(cli.monthly_contribution),
            nominal_growth_rate: cli.pension_growth_rate / 100.0,
            payout: cli.pension_payout.into(),
        },
        public_pension: PublicPensionAssumptions {
            monthly_contribution: cli.public_contribution,
            reference_monthly_wage: cli.public_reference_wage,
            minimum_years: cli.public_minimum_years,
            qualifying_years: cli.public_qualifying_years,
            base_replacement: cli.public_base_replacement / 100.0,
            accrual_per_year: cli.public_accrual / 100.0,
            benefit_ceiling: cli.public_benefit_ceiling,
        },
    })
}

fn parse_birth_year(raw: &str) -> Result<i32, ApiError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map(|date| date.year())
        .map_err(|_| ApiError::BirthDate(raw.to_string()))
}

/// Runs a one-shot projection from command-line flags and returns the JSON response.
pub fn run_cli<I, T>(args: I) -> Result<String, ApiError>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    let chart_mode = cli.chart_mode.into();
    let assumptions = build_assumptions(cli)?;
    let response = build_projection_response(assumptions, chart_mode);
    Ok(serde_json::to_string_pretty(&response)?)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "projection HTTP API listening");

    axum::serve(listener, app).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn project_get_handler(Query(payload): Query<ProjectPayload>) -> Response {
    project_handler_impl(payload).await
}

async fn project_post_handler(Json(payload): Json<ProjectPayload>) -> Response {
    project_handler_impl(payload).await
}

async fn project_handler_impl(payload: ProjectPayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(err) => {
            tracing::debug!(%err, "rejected projection request");
            return error_response(err.status(), &err.to_string());
        }
    };

    let ApiRequest {
        assumptions,
        chart_mode,
    } = request;
    let response = tokio::task::spawn_blocking(move || {
        build_projection_response(assumptions, chart_mode)
    })
    .await;

    match response {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(err) => {
            let err = ApiError::from(err);
            tracing::error!(%err, "projection failed");
            error_response(err.status(), &err.to_string())
        }
    }
}

fn build_projection_response(assumptions: Assumptions, chart_mode: ChartMode) -> ProjectionResponse {
    let result = run_projection(&assumptions);
    let chart = chart_series(&result, chart_mode);
    let comparison = comparison_table(&result);
    ProjectionResponse {
        assumptions,
        chart_mode,
        result,
        chart,
        comparison,
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

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ApiRequest, ApiError> {
    let payload = serde_json::from_str::<ProjectPayload>(json)?;
    api_request_from_payload(payload)
}

fn api_request_from_payload(payload: ProjectPayload) -> Result<ApiRequest, ApiError> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.birth_date {
        cli.birth_date = Some(v);
    }
    if let Some(v) = payload.birth_year {
        cli.birth_year = Some(v);
    }
    if let Some(v) = payload.current_age {
        cli.current_age = v;
    }
    if let Some(v) = payload.current_year {
        cli.current_year = Some(v);
    }
    if let Some(v) = payload.retirement_age {
        cli.retirement_age = v;
    }
    if let Some(v) = payload.life_expectancy {
        cli.life_expectancy = v;
    }
    if let Some(v) = payload.perpetual {
        cli.perpetual = v;
    }

    if let Some(v) = payload.current_savings {
        cli.current_savings = v;
    }
    if let Some(v) = payload.monthly_contribution {
        cli.monthly_contribution = v;
    }
    if let Some(v) = payload.desired_monthly_income {
        cli.desired_monthly_income = v;
    }

    if let Some(v) = payload.scenario {
        cli.scenario = v.into();
    }
    if let Some(v) = payload.growth_rate {
        cli.growth_rate = Some(v);
    }
    if let Some(v) = payload.inflation_rate {
        cli.inflation_rate = Some(v);
    }
    if let Some(v) = payload.withdrawal_rate {
        cli.withdrawal_rate = v;
    }
    if let Some(v) = payload.indexation {
        cli.indexation = v.into();
    }

    if let Some(v) = payload.pension_contribution {
        cli.pension_contribution = Some(v);
    }
    if let Some(v) = payload.pension_growth_rate {
        cli.pension_growth_rate = v;
    }
    if let Some(v) = payload.pension_payout {
        cli.pension_payout = v.into();
    }

    if let Some(v) = payload.public_contribution {
        cli.public_contribution = v;
    }
    if let Some(v) = payload.public_reference_wage {
        cli.public_reference_wage = v;
    }
    if let Some(v) = payload.public_minimum_years {
        cli.public_minimum_years = v;
    }
    if let Some(v) = payload.public_qualifying_years {
        cli.public_qualifying_years = v;
    }
    if let Some(v) = payload.public_base_replacement {
        cli.public_base_replacement = v;
    }
    if let Some(v) = payload.public_accrual {
        cli.public_accrual = v;
    }
    if let Some(v) = payload.public_benefit_ceiling {
        cli.public_benefit_ceiling = v;
    }

    if let Some(v) = payload.chart_mode {
        cli.chart_mode = v.into();
    }

    let chart_mode = cli.chart_mode.into();
    let assumptions = build_assumptions(cli)?;
    Ok(ApiRequest {
        assumptions,
        chart_mode,
    })
}

fn default_cli_for_api() -> Cli {
    Cli {
        birth_date: None,
        birth_year: None,
        current_age: 30,
        current_year: None,
        retirement_age: 65,
        life_expectancy: 85,
        perpetual: false,
        current_savings: 0.0,
        monthly_contribution: 1_000.0,
        desired_monthly_income: 5_000.0,
        scenario: CliScenario::Base,
        growth_rate: None,
        inflation_rate: None,
        withdrawal_rate: 4.0,
        indexation: CliIndexation::InflationAdjusted,
        pension_contribution: None,
        pension_growth_rate: 10.0,
        pension_payout: CliPensionPayout::Drawdown,
        public_contribution: 330.0,
        public_reference_wage: 3_000.0,
        public_minimum_years: 15,
        public_qualifying_years: 20,
        public_base_replacement: 60.0,
        public_accrual: 2.0,
        public_benefit_ceiling: 7_786.02,
        chart_mode: CliChartMode::Wealth,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EndYear, ValidationCode};

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_cli() -> Cli {
        let mut cli = default_cli_for_api();
        cli.current_year = Some(2025);
        cli
    }

    #[test]
    fn build_assumptions_uses_scenario_rates_by_default() {
        let assumptions = build_assumptions(sample_cli()).expect("valid assumptions");
        assert_approx(assumptions.nominal_growth_rate, 0.12);
        assert_approx(assumptions.inflation_rate, 0.04);
        assert_approx(assumptions.withdrawal_rate, 0.04);
        assert_approx(assumptions.private_pension.monthly_contribution, 1_000.0);
        assert_approx(assumptions.public_pension.base_replacement, 0.6);
        assert_eq!(
            assumptions.horizon,
            RetirementHorizon::Fixed { end_age: 85 }
        );
    }

    #[test]
    fn build_assumptions_explicit_rates_override_scenario() {
        let mut cli = sample_cli();
        cli.scenario = CliScenario::Optimistic;
        cli.growth_rate = Some(15.0);
        let assumptions = build_assumptions(cli).expect("valid assumptions");
        assert_approx(assumptions.nominal_growth_rate, 0.15);
        assert_approx(assumptions.inflation_rate, 0.04);
    }

    #[test]
    fn build_assumptions_derives_age_from_birth_date() {
        let mut cli = sample_cli();
        cli.birth_date = Some("1995-07-14".to_string());
        cli.birth_year = Some(1980);
        let assumptions = build_assumptions(cli).expect("valid assumptions");
        assert_eq!(assumptions.current_age, 30);
    }

    #[test]
    fn build_assumptions_derives_age_from_birth_year() {
        let mut cli = sample_cli();
        cli.birth_year = Some(1980);
        let assumptions = build_assumptions(cli).expect("valid assumptions");
        assert_eq!(assumptions.current_age, 45);
    }

    #[test]
    fn build_assumptions_rejects_malformed_birth_date() {
        let mut cli = sample_cli();
        cli.birth_date = Some("14/07/1995".to_string());
        let err = build_assumptions(cli).expect_err("must reject bad date");
        assert!(matches!(err, ApiError::BirthDate(_)));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn build_assumptions_rejects_birth_year_that_overflows_age() {
        let mut cli = sample_cli();
        cli.birth_year = Some(i32::MIN);
        let err = build_assumptions(cli).expect_err("must reject overflowing birth year");
        assert!(matches!(err, ApiError::BirthYear { .. }));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn out_of_range_current_year_is_reported_in_result() {
        let request = api_request_from_json(r#"{"currentYear": 2147483637, "currentAge": 30}"#)
            .expect("request-level parsing succeeds");
        let response = build_projection_response(request.assumptions, request.chart_mode);
        assert_eq!(
            response.result.validation_errors,
            vec![ValidationCode::YearOutOfRange]
        );
        assert_eq!(response.result.retirement_year, 9_999 + 35);
    }

    #[test]
    fn api_request_from_json_parses_web_keys() {
        let json = r#"{
          "birthYear": 1995,
          "currentYear": 2025,
          "retirementAge": 60,
          "lifeExpectancy": 90,
          "currentSavings": 25000,
          "monthlyContribution": 1500,
          "desiredMonthlyIncome": 8000,
          "scenario": "otimista",
          "inflationRate": 5,
          "withdrawalRate": 3.5,
          "indexation": "fixed-nominal",
          "pensionContribution": 800,
          "pensionGrowthRate": 9,
          "pensionMode": "vitalicio",
          "publicReferenceWage": 6000,
          "chartMode": "income"
        }"#;
        let request = api_request_from_json(json).expect("json should parse");
        let assumptions = request.assumptions;

        assert_eq!(assumptions.current_age, 30);
        assert_eq!(assumptions.retirement_age, 60);
        assert_eq!(assumptions.horizon, RetirementHorizon::Fixed { end_age: 90 });
        assert_approx(assumptions.current_savings, 25_000.0);
        assert_approx(assumptions.monthly_contribution, 1_500.0);
        assert_approx(assumptions.desired_monthly_income, 8_000.0);
        assert_approx(assumptions.nominal_growth_rate, 0.20);
        assert_approx(assumptions.inflation_rate, 0.05);
        assert_approx(assumptions.withdrawal_rate, 0.035);
        assert_eq!(assumptions.indexation, IncomeIndexation::FixedNominal);
        assert_approx(assumptions.private_pension.monthly_contribution, 800.0);
        assert_approx(assumptions.private_pension.nominal_growth_rate, 0.09);
        assert_eq!(assumptions.private_pension.payout, PensionPayout::Lifetime);
        assert_approx(assumptions.public_pension.reference_monthly_wage, 6_000.0);
        assert_eq!(request.chart_mode, ChartMode::Income);
    }

    #[test]
    fn api_request_from_json_accepts_perpetual_flag() {
        let request = api_request_from_json(r#"{"perpetual": true, "currentYear": 2025}"#)
            .expect("json should parse");
        assert_eq!(request.assumptions.horizon, RetirementHorizon::Perpetual);
    }

    #[test]
    fn api_request_from_json_rejects_unknown_scenario() {
        let err = api_request_from_json(r#"{"scenario": "moonshot"}"#).expect_err("must reject");
        assert!(matches!(err, ApiError::Payload(_)));
    }

    #[test]
    fn domain_errors_flow_into_the_result_not_the_request() {
        let request = api_request_from_json(
            r#"{"currentAge": 50, "retirementAge": 40, "currentYear": 2025}"#,
        )
        .expect("request-level parsing succeeds");
        let response = build_projection_response(request.assumptions, request.chart_mode);
        assert!(!response.result.is_valid);
        assert_eq!(
            response.result.validation_errors,
            vec![ValidationCode::RetirementBeforeCurrentAge]
        );
        assert_eq!(response.result.contribution_years, 0);
    }

    #[test]
    fn projection_response_serialization_contains_expected_fields() {
        let assumptions = build_assumptions(sample_cli()).expect("valid assumptions");
        let response = build_projection_response(assumptions, ChartMode::Wealth);
        assert_eq!(response.result.end_year, EndYear::Year(2080));
        let longest = response
            .result
            .strategies
            .iter()
            .map(|outcome| outcome.rows.len())
            .max()
            .unwrap_or(0);
        assert_eq!(response.chart.len(), longest);

        let json = serde_json::to_string(&response).expect("response should serialize");
        assert!(json.contains("\"finalWealth\""));
        assert!(json.contains("\"incomeGap\""));
        assert!(json.contains("\"capitalNeededToday\""));
        assert!(json.contains("\"validationErrors\""));
        assert!(json.contains("\"isValid\""));
        assert!(json.contains("\"privatePension\""));
        assert!(json.contains("\"bankruptcyAge\""));
        assert!(json.contains("\"chartMode\":\"wealth\""));
        assert!(json.contains("\"mode\":\"fixed\""));
    }

    #[test]
    fn run_cli_prints_projection_json() {
        let json = run_cli([
            "patrimony",
            "--current-age",
            "40",
            "--current-year",
            "2025",
            "--retirement-age",
            "60",
            "--perpetual",
            "--scenario",
            "pessimistic",
        ])
        .expect("cli projection");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["result"]["contributionYears"], 20);
        assert_eq!(value["result"]["endYear"], "perpetual");
        assert_eq!(value["result"]["enjoyment"], "perpetual");
    }
}
