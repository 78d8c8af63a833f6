mod engine;
mod error;
mod rates;
mod summary;
mod types;
mod validation;

pub use engine::run_projection;
pub use error::{RateError, ValidationCode};
pub use rates::{Scenario, ScenarioRates, real_annual_rate, real_monthly_rate};
pub use summary::{chart_series, comparison_table, round_currency};
pub use types::{
    Assumptions, BalanceStatus, BankruptcySnapshot, ChartMode, ChartPoint, ComparisonEntry,
    ComparisonTable, DEFAULT_WITHDRAWAL_RATE, EndYear, Enjoyment, IncomeIndexation,
    PERPETUAL_HORIZON_YEARS, PensionPayout, PeriodKind, PeriodRow, Phase,
    PrivatePensionAssumptions, PublicPensionAssumptions, RetirementHorizon, SimulationResult,
    StrategyComparison, StrategyKind, StrategyOutcome,
};
