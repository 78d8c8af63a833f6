use super::rates::{monthly_from_annual, real_annual_rate};
use super::summary::summarize;
use super::types::{
    Assumptions, BalanceStatus, BankruptcySnapshot, IncomeIndexation, PensionPayout, PeriodKind,
    PeriodRow, SimulationResult, StrategyKind,
};
use super::validation::{MAX_AMOUNT, Plan, validate};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Funding {
    /// Contributions buy invested capital that compounds at the strategy's rate.
    Capitalised,
    /// Contributions fund current retirees; no balance builds up.
    PayAsYouGo,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum WithdrawalPolicy {
    /// Desired income, fixed at the retirement-date amount in year one.
    Drawdown,
    /// Desired income, capped at `balance * withdrawal_rate` each year.
    SustainableYield,
    /// The pot is converted into a lifetime income at the withdrawal rate.
    LifetimeAnnuity,
    DefinedBenefit { monthly_benefit: f64 },
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct StrategyDescriptor {
    pub kind: StrategyKind,
    pub starting_balance: f64,
    pub monthly_contribution: f64,
    pub nominal_growth_rate: f64,
    pub funding: Funding,
    pub withdrawal: WithdrawalPolicy,
}

#[derive(Debug, Clone)]
pub(crate) struct StrategyRun {
    pub kind: StrategyKind,
    pub monthly_contribution: f64,
    pub real_annual_rate: f64,
    pub real_monthly_rate: f64,
    pub balance_at_retirement: f64,
    pub monthly_income_at_retirement: f64,
    pub rows: Vec<PeriodRow>,
    pub bankruptcy: Option<BankruptcySnapshot>,
    /// Some balance overflowed and was held at `MAX_AMOUNT`.
    pub saturated: bool,
}

impl StrategyRun {
    pub fn legacy_wealth(&self) -> f64 {
        if self.bankruptcy.is_some() {
            return 0.0;
        }
        self.rows
            .last()
            .map(|row| row.end_balance)
            .unwrap_or(self.balance_at_retirement)
            .max(0.0)
    }

    pub fn bankruptcy_age(&self) -> Option<i32> {
        self.rows.iter().find(|row| row.is_bankruptcy()).map(|row| row.age)
    }
}

#[derive(Debug, Clone, Copy)]
struct YearFlow {
    contribution: f64,
    yield_earned: f64,
    withdrawal: f64,
    income: f64,
}

struct Trajectory<'a> {
    plan: &'a Plan,
    rows: Vec<PeriodRow>,
    age: i32,
    year: i32,
    saturated: bool,
}

impl<'a> Trajectory<'a> {
    fn new(plan: &'a Plan) -> Self {
        Self {
            plan,
            rows: Vec::with_capacity((plan.contribution_years + plan.retirement_years) as usize),
            age: plan.current_age,
            year: plan.current_year,
            saturated: false,
        }
    }

    fn saturate(&mut self, balance: f64) -> f64 {
        if balance.is_finite() && balance <= MAX_AMOUNT {
            return balance;
        }
        self.saturated = true;
        MAX_AMOUNT
    }

    fn push(&mut self, kind: PeriodKind, flow: YearFlow, end_balance: f64, bankrupt: bool) {
        self.age += 1;
        self.year += 1;
        let status = if bankrupt {
            BalanceStatus::Bankrupt
        } else if flow.withdrawal > flow.yield_earned {
            BalanceStatus::BoilingPoint
        } else {
            BalanceStatus::Growing
        };
        self.rows.push(PeriodRow {
            year: self.year,
            age: self.age,
            phase: kind.phase(),
            kind,
            contribution: flow.contribution,
            yield_earned: flow.yield_earned,
            withdrawal: flow.withdrawal,
            income: flow.income,
            end_balance,
            status,
        });
    }
}

pub fn run_projection(assumptions: &Assumptions) -> SimulationResult {
    let (plan, validation_errors) = validate(assumptions);

    let asset = simulate_strategy(&plan, &asset_descriptor(&plan));
    let private_pension = simulate_strategy(&plan, &private_pension_descriptor(&plan));
    let public_pension = simulate_strategy(&plan, &public_pension_descriptor(&plan));

    tracing::debug!(
        contribution_years = plan.contribution_years,
        retirement_years = plan.retirement_years,
        perpetual = plan.perpetual,
        asset_wealth = asset.balance_at_retirement,
        pension_wealth = private_pension.balance_at_retirement,
        "projection complete"
    );

    let result = summarize(
        &plan,
        validation_errors,
        asset,
        private_pension,
        public_pension,
    );
    if !result.is_valid {
        tracing::warn!(errors = ?result.validation_errors, "assumptions failed validation");
    }
    result
}

pub(crate) fn asset_descriptor(plan: &Plan) -> StrategyDescriptor {
    StrategyDescriptor {
        kind: StrategyKind::Asset,
        starting_balance: plan.current_savings,
        monthly_contribution: plan.monthly_contribution,
        nominal_growth_rate: plan.nominal_growth_rate,
        funding: Funding::Capitalised,
        withdrawal: horizon_policy(plan),
    }
}

pub(crate) fn private_pension_descriptor(plan: &Plan) -> StrategyDescriptor {
    StrategyDescriptor {
        kind: StrategyKind::PrivatePension,
        starting_balance: 0.0,
        monthly_contribution: plan.pension_contribution,
        nominal_growth_rate: plan.pension_growth_rate,
        funding: Funding::Capitalised,
        withdrawal: match plan.pension_payout {
            PensionPayout::Lifetime => WithdrawalPolicy::LifetimeAnnuity,
            PensionPayout::Drawdown => horizon_policy(plan),
        },
    }
}

pub(crate) fn public_pension_descriptor(plan: &Plan) -> StrategyDescriptor {
    StrategyDescriptor {
        kind: StrategyKind::PublicPension,
        starting_balance: 0.0,
        monthly_contribution: plan.public_contribution,
        nominal_growth_rate: plan.inflation_rate,
        funding: Funding::PayAsYouGo,
        withdrawal: WithdrawalPolicy::DefinedBenefit {
            monthly_benefit: plan.public_monthly_benefit,
        },
    }
}

fn horizon_policy(plan: &Plan) -> WithdrawalPolicy {
    if plan.perpetual {
        WithdrawalPolicy::SustainableYield
    } else {
        WithdrawalPolicy::Drawdown
    }
}

pub(crate) fn simulate_strategy(plan: &Plan, strategy: &StrategyDescriptor) -> StrategyRun {
    let real_annual = real_annual_rate(strategy.nominal_growth_rate, plan.inflation_rate)
        .unwrap_or_else(|err| {
            tracing::warn!(kind = ?strategy.kind, %err, "unusable growth rate, using zero real growth");
            0.0
        });
    let real_monthly = monthly_from_annual(real_annual);

    let mut trajectory = Trajectory::new(plan);
    let balance_at_retirement = accumulate(&mut trajectory, strategy, real_monthly);

    let monthly_income_at_retirement = match strategy.withdrawal {
        WithdrawalPolicy::DefinedBenefit { monthly_benefit } => monthly_benefit,
        _ => balance_at_retirement * plan.withdrawal_rate / 12.0,
    };

    let bankruptcy = decumulate(
        &mut trajectory,
        strategy,
        real_annual,
        balance_at_retirement,
        monthly_income_at_retirement,
    );

    if let Some(snapshot) = &bankruptcy {
        tracing::debug!(
            kind = ?strategy.kind,
            age = snapshot.age,
            shortfall = snapshot.shortfall(),
            "capital exhausted"
        );
    }

    StrategyRun {
        kind: strategy.kind,
        monthly_contribution: strategy.monthly_contribution,
        real_annual_rate: real_annual,
        real_monthly_rate: real_monthly,
        balance_at_retirement,
        monthly_income_at_retirement,
        saturated: trajectory.saturated,
        rows: trajectory.rows,
        bankruptcy,
    }
}

fn accumulate(
    trajectory: &mut Trajectory<'_>,
    strategy: &StrategyDescriptor,
    real_monthly: f64,
) -> f64 {
    let plan = trajectory.plan;
    let mut balance = match strategy.funding {
        Funding::Capitalised => strategy.starting_balance,
        Funding::PayAsYouGo => 0.0,
    };

    for _ in 0..plan.contribution_years {
        let start_balance = balance;
        let mut contributed = 0.0;
        for _ in 0..12 {
            contributed += strategy.monthly_contribution;
            if strategy.funding == Funding::Capitalised {
                balance = trajectory
                    .saturate(balance * (1.0 + real_monthly) + strategy.monthly_contribution);
            }
        }

        let flow = YearFlow {
            contribution: contributed,
            yield_earned: match strategy.funding {
                Funding::Capitalised => balance - start_balance - contributed,
                Funding::PayAsYouGo => 0.0,
            },
            withdrawal: 0.0,
            income: 0.0,
        };
        trajectory.push(PeriodKind::Accumulation, flow, balance, false);
    }

    balance
}

fn decumulate(
    trajectory: &mut Trajectory<'_>,
    strategy: &StrategyDescriptor,
    real_annual: f64,
    balance_at_retirement: f64,
    monthly_income_at_retirement: f64,
) -> Option<BankruptcySnapshot> {
    let plan = trajectory.plan;
    let mut balance = balance_at_retirement;

    for index in 0..plan.retirement_years {
        let kind = PeriodKind::for_retirement_year(index);

        let flow = match strategy.withdrawal {
            WithdrawalPolicy::LifetimeAnnuity | WithdrawalPolicy::DefinedBenefit { .. } => {
                balance = 0.0;
                YearFlow {
                    contribution: 0.0,
                    yield_earned: 0.0,
                    withdrawal: 0.0,
                    income: monthly_income_at_retirement * 12.0,
                }
            }
            WithdrawalPolicy::Drawdown | WithdrawalPolicy::SustainableYield => {
                let required = match strategy.withdrawal {
                    WithdrawalPolicy::SustainableYield => {
                        drawdown_amount(plan, index).min(balance * plan.withdrawal_rate)
                    }
                    _ => drawdown_amount(plan, index),
                };
                let available = balance.max(0.0);
                let withdrawal = required.min(available);
                let remaining = available - withdrawal;
                balance = trajectory.saturate(remaining + remaining * real_annual);
                let yield_earned = balance - remaining;

                let flow = YearFlow {
                    contribution: 0.0,
                    yield_earned,
                    withdrawal,
                    income: withdrawal,
                };
                if required > 0.0 && balance <= 0.0 {
                    balance = 0.0;
                    trajectory.push(kind, flow, balance, true);
                    let row = trajectory.rows.last()?;
                    return Some(BankruptcySnapshot {
                        age: row.age,
                        year: row.year,
                        balance: available,
                        required,
                    });
                }
                flow
            }
        };

        trajectory.push(kind, flow, balance, false);
    }

    None
}

/// Real value of the year's desired withdrawal, `index` years into retirement.
fn drawdown_amount(plan: &Plan, index: u32) -> f64 {
    let base = plan.desired_annual_income();
    let amount = match plan.indexation {
        IncomeIndexation::InflationAdjusted => base,
        IncomeIndexation::FixedNominal => base / (1.0 + plan.inflation_rate).powi(index as i32),
    };
    if amount.is_finite() {
        amount.min(MAX_AMOUNT)
    } else {
        MAX_AMOUNT
    }
}
