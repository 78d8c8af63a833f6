use super::error::RateError;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Scenario {
    Pessimistic,
    Base,
    Optimistic,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScenarioRates {
    pub nominal_growth: f64,
    pub inflation: f64,
}

impl Scenario {
    pub fn rates(self) -> ScenarioRates {
        let nominal_growth = match self {
            Scenario::Pessimistic => 0.08,
            Scenario::Base => 0.12,
            Scenario::Optimistic => 0.20,
        };
        ScenarioRates {
            nominal_growth,
            inflation: 0.04,
        }
    }
}

pub fn real_annual_rate(nominal: f64, inflation: f64) -> Result<f64, RateError> {
    if !nominal.is_finite() || !inflation.is_finite() {
        return Err(RateError::NonFinite);
    }
    if inflation <= -1.0 {
        return Err(RateError::InflationAtOrBelowTotalLoss);
    }
    if nominal <= -1.0 {
        return Err(RateError::GrowthAtOrBelowTotalLoss);
    }

    let real = (1.0 + nominal) / (1.0 + inflation) - 1.0;
    if real.is_finite() {
        Ok(real)
    } else {
        Err(RateError::NonFinite)
    }
}

pub fn real_monthly_rate(nominal: f64, inflation: f64) -> Result<f64, RateError> {
    let annual = real_annual_rate(nominal, inflation)?;
    let monthly = monthly_from_annual(annual);
    if monthly.is_finite() {
        Ok(monthly)
    } else {
        Err(RateError::NonFinite)
    }
}

pub(crate) fn monthly_from_annual(annual: f64) -> f64 {
    (1.0 + annual).powf(1.0 / 12.0) - 1.0
}
