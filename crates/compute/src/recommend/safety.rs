//! Quantity-specific safety guards. Any raised flag forces severity to
//! critical.

use climate_core::Quantity;
use climate_rules::recommendation_config::DewPointParams;
use climate_rules::room_profiles::QuantityRange;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyFlag {
    OverheatRisk,
    UnderTemperatureRisk,
    CondensationRisk,
    StaticDischargeRisk,
    CriticalLimitExceeded,
}

impl SafetyFlag {
    pub fn describe(&self) -> &'static str {
        match self {
            SafetyFlag::OverheatRisk => "hardware overheating risk",
            SafetyFlag::UnderTemperatureRisk => "under-temperature risk to equipment and materials",
            SafetyFlag::CondensationRisk => "condensation risk on cold surfaces and electronics",
            SafetyFlag::StaticDischargeRisk => "static discharge risk",
            SafetyFlag::CriticalLimitExceeded => "critical limit exceeded",
        }
    }
}

/// Magnus-formula dew point (°C) for a temperature and relative humidity.
/// `None` for non-positive humidity.
pub fn dew_point(temperature: f64, humidity: f64, params: &DewPointParams) -> Option<f64> {
    if humidity <= 0.0 || !humidity.is_finite() || !temperature.is_finite() {
        return None;
    }
    let (b, c) = (params.magnus_b, params.magnus_c);
    let gamma = (humidity / 100.0).ln() + b * temperature / (c + temperature);
    Some(c * gamma / (b - gamma))
}

/// Highest relative humidity that keeps the dew point at least
/// `min_margin` below `temperature`.
pub fn max_humidity_for_margin(temperature: f64, params: &DewPointParams) -> f64 {
    let (b, c) = (params.magnus_b, params.magnus_c);
    let dew = temperature - params.min_margin;
    100.0 * (b * dew / (c + dew) - b * temperature / (c + temperature)).exp()
}

/// Evaluate the guards for one reading. `ambient` is the temperature used
/// for the dew-point check on humidity readings.
pub fn check(
    quantity: Quantity,
    value: f64,
    range: Option<&QuantityRange>,
    ambient: Option<f64>,
    dew: &DewPointParams,
) -> Vec<SafetyFlag> {
    let mut flags = Vec::new();
    let (low, high) = range
        .map(|r| (r.critical_low, r.critical_high))
        .unwrap_or((None, None));
    let above = high.is_some_and(|h| value >= h);
    let below = low.is_some_and(|l| value <= l);

    match quantity {
        Quantity::Temperature => {
            if above {
                flags.push(SafetyFlag::OverheatRisk);
            }
            if below {
                flags.push(SafetyFlag::UnderTemperatureRisk);
            }
        }
        Quantity::Humidity => {
            let thin_margin = ambient
                .and_then(|t| dew_point(t, value, dew).map(|d| t - d))
                .is_some_and(|margin| margin < dew.min_margin);
            if above || thin_margin {
                flags.push(SafetyFlag::CondensationRisk);
            }
            if below {
                flags.push(SafetyFlag::StaticDischargeRisk);
            }
        }
        Quantity::Pressure | Quantity::Co2 | Quantity::Light => {
            if above || below {
                flags.push(SafetyFlag::CriticalLimitExceeded);
            }
        }
    }
    flags
}
