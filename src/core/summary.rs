use super::engine::StrategyRun;
use super::error::ValidationCode;
use super::types::{
    ChartMode, ChartPoint, ComparisonEntry, ComparisonTable, EndYear, Enjoyment, PeriodRow,
    SimulationResult, StrategyComparison, StrategyOutcome,
};
use super::validation::Plan;

pub(crate) fn summarize(
    plan: &Plan,
    mut validation_errors: Vec<ValidationCode>,
    asset: StrategyRun,
    private_pension: StrategyRun,
    public_pension: StrategyRun,
) -> SimulationResult {
    let months = plan.contribution_years * 12;
    let final_wealth = asset.balance_at_retirement;
    let sustainable_monthly_income = final_wealth * plan.withdrawal_rate / 12.0;

    let capital_needed_at_retirement = plan.desired_annual_income() / plan.withdrawal_rate;
    let capital_needed_today = capital_needed_at_retirement
        / (1.0 + asset.real_annual_rate).powi(plan.contribution_years as i32);

    let income_gap = plan.desired_monthly_income - round_currency(sustainable_monthly_income);
    let suggested_monthly_contribution = required_monthly_contribution(
        capital_needed_at_retirement,
        plan.current_savings,
        asset.real_monthly_rate,
        months,
    );

    let saturated = [&asset, &private_pension, &public_pension]
        .iter()
        .any(|run| run.saturated);
    let headline = [
        final_wealth,
        sustainable_monthly_income,
        capital_needed_at_retirement,
        capital_needed_today,
        income_gap,
    ];
    if (saturated || headline.iter().any(|value| !value.is_finite()))
        && !validation_errors.contains(&ValidationCode::NonFiniteInput)
    {
        validation_errors.push(ValidationCode::NonFiniteInput);
    }

    let (end_year, enjoyment) = if plan.perpetual {
        (EndYear::Perpetual, Enjoyment::Perpetual)
    } else {
        (
            EndYear::Year(plan.retirement_year() + plan.retirement_years as i32),
            Enjoyment::Years(plan.retirement_years),
        )
    };

    let real_annual_rate = asset.real_annual_rate;
    let bankruptcy = asset.bankruptcy;
    let rows = asset.rows.clone();
    let strategies = StrategyComparison {
        asset: outcome(asset),
        private_pension: outcome(private_pension),
        public_pension: outcome(public_pension),
    };

    SimulationResult {
        current_age: plan.current_age,
        retirement_year: plan.retirement_year(),
        end_year,
        real_annual_rate,
        final_wealth: round_currency(final_wealth),
        total_invested: round_currency(
            plan.current_savings + plan.monthly_contribution * months as f64,
        ),
        sustainable_monthly_income: round_currency(sustainable_monthly_income),
        capital_needed_at_retirement: round_currency(capital_needed_at_retirement),
        capital_needed_today: round_currency(capital_needed_today),
        income_gap: round_currency(income_gap),
        suggested_monthly_contribution: round_currency(suggested_monthly_contribution),
        contribution_years: plan.contribution_years,
        enjoyment,
        rows,
        strategies,
        is_valid: validation_errors.is_empty(),
        validation_errors,
        bankruptcy,
    }
}

fn outcome(run: StrategyRun) -> StrategyOutcome {
    StrategyOutcome {
        kind: run.kind,
        monthly_contribution: round_currency(run.monthly_contribution),
        final_wealth: round_currency(run.balance_at_retirement),
        monthly_income: round_currency(run.monthly_income_at_retirement),
        legacy_wealth: round_currency(run.legacy_wealth()),
        bankruptcy_age: run.bankruptcy_age(),
        bankruptcy: run.bankruptcy,
        rows: run.rows,
    }
}

/// Monthly contribution that grows `starting_balance` into `target` over `months`.
pub(crate) fn required_monthly_contribution(
    target: f64,
    starting_balance: f64,
    monthly_rate: f64,
    months: u32,
) -> f64 {
    if months == 0 {
        return 0.0;
    }
    let n = months as f64;
    let contribution = if monthly_rate.abs() < 1e-12 {
        (target - starting_balance) / n
    } else {
        let growth = (1.0 + monthly_rate).powf(n);
        (target - starting_balance * growth) * monthly_rate / (growth - 1.0)
    };
    if contribution.is_finite() {
        contribution.max(0.0)
    } else {
        0.0
    }
}

pub fn round_currency(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let rounded = (value * 100.0).round() / 100.0;
    // Magnitudes this large carry no cents.
    if rounded.is_finite() { rounded } else { value }
}

/// Yearly series for the three strategies, keyed by attained age.
pub fn chart_series(result: &SimulationResult, mode: ChartMode) -> Vec<ChartPoint> {
    let strategies = &result.strategies;
    let longest = strategies
        .iter()
        .max_by_key(|outcome| outcome.rows.len())
        .map(|outcome| outcome.rows.as_slice())
        .unwrap_or(&[]);

    longest
        .iter()
        .map(|row| ChartPoint {
            age: row.age,
            year: row.year,
            asset: chart_value(&strategies.asset.rows, row.age, mode),
            private_pension: chart_value(&strategies.private_pension.rows, row.age, mode),
            public_pension: chart_value(&strategies.public_pension.rows, row.age, mode),
        })
        .collect()
}

fn chart_value(rows: &[PeriodRow], age: i32, mode: ChartMode) -> f64 {
    let Some(row) = rows.iter().find(|row| row.age == age) else {
        return 0.0;
    };
    match mode {
        ChartMode::Wealth => row.end_balance,
        ChartMode::Income => row.monthly_income(),
        ChartMode::Contribution => row.contribution,
    }
}

pub fn comparison_table(result: &SimulationResult) -> ComparisonTable {
    let entry = |outcome: &StrategyOutcome| ComparisonEntry {
        contribution: outcome.monthly_contribution,
        income: outcome.monthly_income,
        wealth: outcome.final_wealth,
        bankruptcy_age: outcome.bankruptcy_age,
    };
    ComparisonTable {
        asset: entry(&result.strategies.asset),
        private_pension: entry(&result.strategies.private_pension),
        public_pension: entry(&result.strategies.public_pension),
    }
}
