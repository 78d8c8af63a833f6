use serde::Serialize;

use super::error::ValidationCode;

/// Years past retirement simulated when the horizon is perpetual.
pub const PERPETUAL_HORIZON_YEARS: u32 = 60;

pub const DEFAULT_WITHDRAWAL_RATE: f64 = 0.04;

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum RetirementHorizon {
    Perpetual,
    #[serde(rename_all = "camelCase")]
    Fixed { end_age: i32 },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum IncomeIndexation {
    /// Year one is fixed at the retirement-date amount, later years keep its purchasing power.
    InflationAdjusted,
    /// The retirement-date amount stays flat in nominal terms for the whole retirement.
    FixedNominal,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PensionPayout {
    Lifetime,
    Drawdown,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StrategyKind {
    Asset,
    PrivatePension,
    PublicPension,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivatePensionAssumptions {
    pub monthly_contribution: f64,
    pub nominal_growth_rate: f64,
    pub payout: PensionPayout,
}

/// Accrual rules for a pay-as-you-go public scheme.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicPensionAssumptions {
    pub monthly_contribution: f64,
    pub reference_monthly_wage: f64,
    pub minimum_years: u32,
    pub qualifying_years: u32,
    pub base_replacement: f64,
    pub accrual_per_year: f64,
    pub benefit_ceiling: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assumptions {
    pub current_age: i32,
    pub current_year: i32,
    pub retirement_age: i32,
    pub horizon: RetirementHorizon,
    pub current_savings: f64,
    pub monthly_contribution: f64,
    pub desired_monthly_income: f64,
    pub nominal_growth_rate: f64,
    pub inflation_rate: f64,
    pub withdrawal_rate: f64,
    pub indexation: IncomeIndexation,
    pub private_pension: PrivatePensionAssumptions,
    pub public_pension: PublicPensionAssumptions,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Accumulation,
    Retirement,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PeriodKind {
    Accumulation,
    RetirementFirstYear,
    RetirementSecondYear,
    Retirement,
}

impl PeriodKind {
    pub fn phase(self) -> Phase {
        match self {
            PeriodKind::Accumulation => Phase::Accumulation,
            _ => Phase::Retirement,
        }
    }

    pub(crate) fn for_retirement_year(index: u32) -> Self {
        match index {
            0 => PeriodKind::RetirementFirstYear,
            1 => PeriodKind::RetirementSecondYear,
            _ => PeriodKind::Retirement,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BalanceStatus {
    Growing,
    BoilingPoint,
    Bankrupt,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodRow {
    pub year: i32,
    pub age: i32,
    pub phase: Phase,
    pub kind: PeriodKind,
    pub contribution: f64,
    pub yield_earned: f64,
    pub withdrawal: f64,
    /// Income received in the period: withdrawals, or annuity/benefit payments.
    pub income: f64,
    pub end_balance: f64,
    pub status: BalanceStatus,
}

impl PeriodRow {
    /// Principal is being consumed rather than just the yield.
    pub fn is_boiling_point(&self) -> bool {
        self.withdrawal > self.yield_earned
    }

    pub fn is_bankruptcy(&self) -> bool {
        self.status == BalanceStatus::Bankrupt
    }

    pub fn is_fixed_nominal_income(&self) -> bool {
        self.kind == PeriodKind::RetirementFirstYear
    }

    pub fn monthly_income(&self) -> f64 {
        self.income / 12.0
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BankruptcySnapshot {
    pub age: i32,
    pub year: i32,
    pub balance: f64,
    pub required: f64,
}

impl BankruptcySnapshot {
    pub fn shortfall(&self) -> f64 {
        self.required - self.balance
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EndYear {
    Year(i32),
    Perpetual,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Enjoyment {
    Years(u32),
    Perpetual,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyOutcome {
    pub kind: StrategyKind,
    pub monthly_contribution: f64,
    pub final_wealth: f64,
    pub monthly_income: f64,
    pub legacy_wealth: f64,
    pub bankruptcy_age: Option<i32>,
    pub bankruptcy: Option<BankruptcySnapshot>,
    pub rows: Vec<PeriodRow>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyComparison {
    pub asset: StrategyOutcome,
    pub private_pension: StrategyOutcome,
    pub public_pension: StrategyOutcome,
}

impl StrategyComparison {
    pub fn iter(&self) -> impl Iterator<Item = &StrategyOutcome> {
        [&self.asset, &self.private_pension, &self.public_pension].into_iter()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub current_age: i32,
    pub retirement_year: i32,
    pub end_year: EndYear,
    pub real_annual_rate: f64,
    pub final_wealth: f64,
    pub total_invested: f64,
    pub sustainable_monthly_income: f64,
    pub capital_needed_at_retirement: f64,
    pub capital_needed_today: f64,
    pub income_gap: f64,
    pub suggested_monthly_contribution: f64,
    pub contribution_years: u32,
    pub enjoyment: Enjoyment,
    pub rows: Vec<PeriodRow>,
    pub strategies: StrategyComparison,
    pub is_valid: bool,
    pub validation_errors: Vec<ValidationCode>,
    pub bankruptcy: Option<BankruptcySnapshot>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartMode {
    Wealth,
    Income,
    Contribution,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub age: i32,
    pub year: i32,
    pub asset: f64,
    pub private_pension: f64,
    pub public_pension: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonEntry {
    pub contribution: f64,
    pub income: f64,
    pub wealth: f64,
    pub bankruptcy_age: Option<i32>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonTable {
    pub asset: ComparisonEntry,
    pub private_pension: ComparisonEntry,
    pub public_pension: ComparisonEntry,
}
