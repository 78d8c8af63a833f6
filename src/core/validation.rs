use std::ops::RangeInclusive;

use super::error::ValidationCode;
use super::rates::real_annual_rate;
use super::types::{
    Assumptions, DEFAULT_WITHDRAWAL_RATE, IncomeIndexation, PERPETUAL_HORIZON_YEARS,
    PensionPayout, RetirementHorizon,
};

/// Upper bound on either phase so absurd ages cannot stall a request.
pub const MAX_PHASE_YEARS: u32 = 120;

pub const MAX_AGE: i32 = 200;

pub const YEAR_RANGE: RangeInclusive<i32> = 1..=9_999;

/// Largest amount carried through a projection. Inputs and balances past it are held here.
pub const MAX_AMOUNT: f64 = 1e100;

/// Assumptions after domain checks, with every invalid value clamped to a usable one.
#[derive(Debug, Clone)]
pub(crate) struct Plan {
    pub current_age: i32,
    pub current_year: i32,
    pub contribution_years: u32,
    pub retirement_years: u32,
    pub perpetual: bool,
    pub current_savings: f64,
    pub monthly_contribution: f64,
    pub desired_monthly_income: f64,
    pub nominal_growth_rate: f64,
    pub inflation_rate: f64,
    pub withdrawal_rate: f64,
    pub indexation: IncomeIndexation,
    pub pension_contribution: f64,
    pub pension_growth_rate: f64,
    pub pension_payout: PensionPayout,
    pub public_contribution: f64,
    pub public_monthly_benefit: f64,
}

impl Plan {
    #[cfg(test)]
    pub fn retirement_age(&self) -> i32 {
        self.current_age + self.contribution_years as i32
    }

    pub fn retirement_year(&self) -> i32 {
        self.current_year + self.contribution_years as i32
    }

    pub fn desired_annual_income(&self) -> f64 {
        self.desired_monthly_income * 12.0
    }
}

#[derive(Default)]
struct Collector {
    codes: Vec<ValidationCode>,
}

impl Collector {
    fn push(&mut self, code: ValidationCode) {
        if !self.codes.contains(&code) {
            self.codes.push(code);
        }
    }

    fn amount(&mut self, value: f64, negative: ValidationCode) -> f64 {
        if value.is_finite() && value < 0.0 {
            self.push(negative);
            return 0.0;
        }
        self.unsigned(value)
    }

    fn unsigned(&mut self, value: f64) -> f64 {
        if !value.is_finite() {
            self.push(ValidationCode::NonFiniteInput);
            return 0.0;
        }
        if value > MAX_AMOUNT {
            self.push(ValidationCode::NonFiniteInput);
            return MAX_AMOUNT;
        }
        value.max(0.0)
    }

    /// Returns the nominal rate to simulate with; an unusable pair falls back to zero real growth.
    fn growth_rate(&mut self, nominal: f64, inflation: f64) -> f64 {
        match real_annual_rate(nominal, inflation) {
            Ok(_) => nominal,
            Err(err) => {
                self.push(err.into());
                if inflation.is_finite() && inflation > -1.0 {
                    inflation
                } else {
                    0.0
                }
            }
        }
    }
}

pub(crate) fn validate(assumptions: &Assumptions) -> (Plan, Vec<ValidationCode>) {
    let mut errors = Collector::default();

    let mut ages = vec![assumptions.current_age, assumptions.retirement_age];
    if let RetirementHorizon::Fixed { end_age } = assumptions.horizon {
        ages.push(end_age);
    }
    if ages.iter().any(|age| *age < 0) {
        errors.push(ValidationCode::NegativeAge);
    }
    if ages.iter().any(|age| *age > MAX_AGE) {
        errors.push(ValidationCode::AgeOutOfRange);
    }

    let current_year = if YEAR_RANGE.contains(&assumptions.current_year) {
        assumptions.current_year
    } else {
        errors.push(ValidationCode::YearOutOfRange);
        assumptions
            .current_year
            .clamp(*YEAR_RANGE.start(), *YEAR_RANGE.end())
    };

    let current_age = assumptions.current_age.clamp(0, MAX_AGE);
    let retirement_age = assumptions.retirement_age.clamp(0, MAX_AGE);
    if retirement_age < current_age {
        errors.push(ValidationCode::RetirementBeforeCurrentAge);
    }
    let contribution_years = years_between(current_age, retirement_age);
    let effective_retirement_age = current_age + contribution_years as i32;

    let (retirement_years, perpetual) = match assumptions.horizon {
        RetirementHorizon::Perpetual => (PERPETUAL_HORIZON_YEARS, true),
        RetirementHorizon::Fixed { end_age } => {
            if end_age < assumptions.retirement_age {
                errors.push(ValidationCode::LifeExpectancyBeforeRetirement);
            }
            (years_between(effective_retirement_age, end_age.clamp(0, MAX_AGE)), false)
        }
    };

    let current_savings = errors.amount(assumptions.current_savings, ValidationCode::NegativeSavings);
    let monthly_contribution = errors.amount(
        assumptions.monthly_contribution,
        ValidationCode::NegativeContribution,
    );
    let desired_monthly_income = errors.amount(
        assumptions.desired_monthly_income,
        ValidationCode::NegativeDesiredIncome,
    );

    let withdrawal_rate = assumptions.withdrawal_rate;
    let withdrawal_rate = if withdrawal_rate.is_finite() && withdrawal_rate > 0.0 && withdrawal_rate < 1.0
    {
        withdrawal_rate
    } else {
        errors.push(ValidationCode::InvalidWithdrawalRate);
        DEFAULT_WITHDRAWAL_RATE
    };

    let inflation_rate = if assumptions.inflation_rate.is_finite() && assumptions.inflation_rate > -1.0
    {
        assumptions.inflation_rate
    } else {
        0.0
    };
    let nominal_growth_rate =
        errors.growth_rate(assumptions.nominal_growth_rate, assumptions.inflation_rate);

    let pension = &assumptions.private_pension;
    let pension_contribution =
        errors.amount(pension.monthly_contribution, ValidationCode::NegativeContribution);
    let pension_growth_rate = errors.growth_rate(pension.nominal_growth_rate, assumptions.inflation_rate);

    let public = &assumptions.public_pension;
    let public_contribution =
        errors.amount(public.monthly_contribution, ValidationCode::NegativeContribution);
    let public_monthly_benefit = public_pension_benefit(
        contribution_years,
        public.minimum_years,
        public.qualifying_years,
        errors.unsigned(public.base_replacement),
        errors.unsigned(public.accrual_per_year),
        errors.unsigned(public.reference_monthly_wage),
        errors.unsigned(public.benefit_ceiling),
    );

    let plan = Plan {
        current_age,
        current_year,
        contribution_years,
        retirement_years,
        perpetual,
        current_savings,
        monthly_contribution,
        desired_monthly_income,
        nominal_growth_rate,
        inflation_rate,
        withdrawal_rate,
        indexation: assumptions.indexation,
        pension_contribution,
        pension_growth_rate,
        pension_payout: pension.payout,
        public_contribution,
        public_monthly_benefit,
    };
    (plan, errors.codes)
}

fn years_between(from_age: i32, to_age: i32) -> u32 {
    let years = (to_age - from_age).max(0) as u32;
    if years > MAX_PHASE_YEARS {
        tracing::warn!(years, cap = MAX_PHASE_YEARS, "phase length capped");
    }
    years.min(MAX_PHASE_YEARS)
}

/// Monthly benefit earned from `years` of contributions to the public scheme.
pub(crate) fn public_pension_benefit(
    years: u32,
    minimum_years: u32,
    qualifying_years: u32,
    base_replacement: f64,
    accrual_per_year: f64,
    reference_wage: f64,
    ceiling: f64,
) -> f64 {
    if years < minimum_years || years == 0 {
        return 0.0;
    }
    let extra_years = years.saturating_sub(qualifying_years) as f64;
    let replacement = (base_replacement + accrual_per_year * extra_years).min(1.0);
    (reference_wage * replacement).min(ceiling)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{PrivatePensionAssumptions, PublicPensionAssumptions};

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_assumptions() -> Assumptions {
        Assumptions {
            current_age: 30,
            current_year: 2025,
            retirement_age: 65,
            horizon: RetirementHorizon::Fixed { end_age: 90 },
            current_savings: 0.0,
            monthly_contribution: 1_000.0,
            desired_monthly_income: 5_000.0,
            nominal_growth_rate: 0.12,
            inflation_rate: 0.04,
            withdrawal_rate: 0.04,
            indexation: IncomeIndexation::InflationAdjusted,
            private_pension: PrivatePensionAssumptions {
                monthly_contribution: 1_000.0,
                nominal_growth_rate: 0.10,
                payout: PensionPayout::Drawdown,
            },
            public_pension: PublicPensionAssumptions {
                monthly_contribution: 300.0,
                reference_monthly_wage: 4_000.0,
                minimum_years: 15,
                qualifying_years: 20,
                base_replacement: 0.6,
                accrual_per_year: 0.02,
                benefit_ceiling: 7_786.02,
            },
        }
    }

    #[test]
    fn valid_assumptions_have_no_errors() {
        let (plan, errors) = validate(&sample_assumptions());
        assert!(errors.is_empty());
        assert_eq!(plan.contribution_years, 35);
        assert_eq!(plan.retirement_years, 25);
        assert!(!plan.perpetual);
        assert_eq!(plan.retirement_year(), 2060);
    }

    #[test]
    fn retirement_before_current_age_is_clamped_to_zero_years() {
        let mut assumptions = sample_assumptions();
        assumptions.retirement_age = 25;
        let (plan, errors) = validate(&assumptions);
        assert_eq!(errors, vec![ValidationCode::RetirementBeforeCurrentAge]);
        assert_eq!(plan.contribution_years, 0);
        assert_eq!(plan.retirement_age(), 30);
    }

    #[test]
    fn negative_amounts_are_reported_and_zeroed() {
        let mut assumptions = sample_assumptions();
        assumptions.monthly_contribution = -50.0;
        assumptions.current_savings = -1.0;
        let (plan, errors) = validate(&assumptions);
        assert!(errors.contains(&ValidationCode::NegativeContribution));
        assert!(errors.contains(&ValidationCode::NegativeSavings));
        assert_approx(plan.monthly_contribution, 0.0);
        assert_approx(plan.current_savings, 0.0);
    }

    #[test]
    fn duplicate_codes_are_reported_once() {
        let mut assumptions = sample_assumptions();
        assumptions.monthly_contribution = -1.0;
        assumptions.private_pension.monthly_contribution = -1.0;
        let (_, errors) = validate(&assumptions);
        assert_eq!(errors, vec![ValidationCode::NegativeContribution]);
    }

    #[test]
    fn inflation_at_total_loss_falls_back_to_zero_real_growth() {
        let mut assumptions = sample_assumptions();
        assumptions.inflation_rate = -1.0;
        let (plan, errors) = validate(&assumptions);
        assert!(errors.contains(&ValidationCode::InflationAtOrBelowTotalLoss));
        assert_approx(plan.inflation_rate, 0.0);
        assert_approx(plan.nominal_growth_rate, 0.0);
    }

    #[test]
    fn invalid_withdrawal_rate_uses_default() {
        let mut assumptions = sample_assumptions();
        assumptions.withdrawal_rate = 0.0;
        let (plan, errors) = validate(&assumptions);
        assert_eq!(errors, vec![ValidationCode::InvalidWithdrawalRate]);
        assert_approx(plan.withdrawal_rate, DEFAULT_WITHDRAWAL_RATE);
    }

    #[test]
    fn life_expectancy_before_retirement_is_reported() {
        let mut assumptions = sample_assumptions();
        assumptions.horizon = RetirementHorizon::Fixed { end_age: 60 };
        let (plan, errors) = validate(&assumptions);
        assert_eq!(errors, vec![ValidationCode::LifeExpectancyBeforeRetirement]);
        assert_eq!(plan.retirement_years, 0);
    }

    #[test]
    fn negative_age_is_reported() {
        let mut assumptions = sample_assumptions();
        assumptions.current_age = -3;
        let (plan, errors) = validate(&assumptions);
        assert!(errors.contains(&ValidationCode::NegativeAge));
        assert_eq!(plan.current_age, 0);
    }

    #[test]
    fn current_year_outside_calendar_range_is_clamped() {
        let mut assumptions = sample_assumptions();
        assumptions.current_year = i32::MAX - 10;
        let (plan, errors) = validate(&assumptions);
        assert_eq!(errors, vec![ValidationCode::YearOutOfRange]);
        assert_eq!(plan.current_year, 9_999);
        assert_eq!(plan.retirement_year(), 9_999 + 35);

        assumptions.current_year = i32::MIN;
        let (plan, errors) = validate(&assumptions);
        assert_eq!(errors, vec![ValidationCode::YearOutOfRange]);
        assert_eq!(plan.current_year, 1);
    }

    #[test]
    fn extreme_ages_are_reported_and_clamped() {
        let mut assumptions = sample_assumptions();
        assumptions.current_age = i32::MAX;
        assumptions.retirement_age = i32::MAX;
        assumptions.horizon = RetirementHorizon::Fixed { end_age: i32::MAX };
        let (plan, errors) = validate(&assumptions);
        assert_eq!(errors, vec![ValidationCode::AgeOutOfRange]);
        assert_eq!(plan.current_age, MAX_AGE);
        assert_eq!(plan.contribution_years, 0);
        assert_eq!(plan.retirement_years, 0);
    }

    #[test]
    fn amounts_beyond_ceiling_are_held_at_ceiling() {
        let mut assumptions = sample_assumptions();
        assumptions.current_savings = f64::MAX;
        let (plan, errors) = validate(&assumptions);
        assert_eq!(errors, vec![ValidationCode::NonFiniteInput]);
        assert_approx(plan.current_savings, MAX_AMOUNT);
    }

    #[test]
    fn perpetual_horizon_uses_fixed_cap() {
        let mut assumptions = sample_assumptions();
        assumptions.horizon = RetirementHorizon::Perpetual;
        let (plan, errors) = validate(&assumptions);
        assert!(errors.is_empty());
        assert!(plan.perpetual);
        assert_eq!(plan.retirement_years, PERPETUAL_HORIZON_YEARS);
    }

    #[test]
    fn public_pension_benefit_follows_accrual_rules() {
        assert_approx(public_pension_benefit(10, 15, 20, 0.6, 0.02, 4_000.0, 10_000.0), 0.0);
        assert_approx(public_pension_benefit(15, 15, 20, 0.6, 0.02, 4_000.0, 10_000.0), 2_400.0);
        assert_approx(public_pension_benefit(35, 15, 20, 0.6, 0.02, 4_000.0, 10_000.0), 3_600.0);
        assert_approx(public_pension_benefit(60, 15, 20, 0.6, 0.02, 4_000.0, 10_000.0), 4_000.0);
        assert_approx(public_pension_benefit(35, 15, 20, 0.6, 0.02, 4_000.0, 3_000.0), 3_000.0);
    }
}
