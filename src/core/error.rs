use serde::Serialize;
use thiserror::Error;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
pub enum RateError {
    #[error("rate inputs must be finite numbers")]
    NonFinite,
    #[error("inflation must be greater than -100%")]
    InflationAtOrBelowTotalLoss,
    #[error("growth rate must be greater than -100%")]
    GrowthAtOrBelowTotalLoss,
}

/// Domain problems with an assumptions snapshot. Collected, never fatal.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Error, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationCode {
    #[error("ages must be >= 0")]
    NegativeAge,
    #[error("ages must be <= 200")]
    AgeOutOfRange,
    #[error("current year must be between 1 and 9999")]
    YearOutOfRange,
    #[error("retirement age must be >= current age")]
    RetirementBeforeCurrentAge,
    #[error("life expectancy must be >= retirement age")]
    LifeExpectancyBeforeRetirement,
    #[error("monthly contributions must be >= 0")]
    NegativeContribution,
    #[error("current savings must be >= 0")]
    NegativeSavings,
    #[error("desired income must be >= 0")]
    NegativeDesiredIncome,
    #[error("withdrawal rate must be in (0, 1)")]
    InvalidWithdrawalRate,
    #[error("inflation must be greater than -100%")]
    InflationAtOrBelowTotalLoss,
    #[error("growth rate must be greater than -100%")]
    GrowthAtOrBelowTotalLoss,
    #[error("numeric inputs must be finite and keep results finite")]
    NonFiniteInput,
}

impl From<RateError> for ValidationCode {
    fn from(value: RateError) -> Self {
        match value {
            RateError::NonFinite => ValidationCode::NonFiniteInput,
            RateError::InflationAtOrBelowTotalLoss => ValidationCode::InflationAtOrBelowTotalLoss,
            RateError::GrowthAtOrBelowTotalLoss => ValidationCode::GrowthAtOrBelowTotalLoss,
        }
    }
}
