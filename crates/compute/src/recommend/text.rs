//! Deterministic text templates for recommendations.

use climate_core::Quantity;
use climate_rules::room_profiles::QuantityRange;

use super::safety::SafetyFlag;

/// Where a reading sits relative to its safe range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Position {
    Above,
    Below,
    Within,
}

impl Position {
    pub(crate) fn of(value: f64, range: &QuantityRange) -> Self {
        if value > range.max {
            Position::Above
        } else if value < range.min {
            Position::Below
        } else {
            Position::Within
        }
    }
}

pub(crate) fn problem(quantity: Quantity, current: f64, range: Option<&QuantityRange>) -> String {
    let unit = quantity.unit();
    let Some(range) = range else {
        return format!("Anomaly detected in {}: {:.2}{}", quantity, current, unit);
    };
    match Position::of(current, range) {
        Position::Above => format!(
            "{} is too HIGH ({:.1}{unit}, max: {}{unit})",
            quantity.label(),
            current,
            range.max
        ),
        Position::Below => format!(
            "{} is too LOW ({:.1}{unit}, min: {}{unit})",
            quantity.label(),
            current,
            range.min
        ),
        Position::Within => format!(
            "{} within normal range ({:.1}{unit}, range: {}-{}{unit})",
            quantity.label(),
            current,
            range.min,
            range.max
        ),
    }
}

fn corrective_action(quantity: Quantity, raise: bool) -> &'static str {
    match (quantity, raise) {
        (Quantity::Temperature, false) => "Increase cooling/AC power or improve ventilation",
        (Quantity::Temperature, true) => "Increase heating power or close air intakes",
        (Quantity::Humidity, false) => "Increase dehumidification or improve ventilation",
        (Quantity::Humidity, true) => "Add humidifiers or reduce ventilation",
        (Quantity::Pressure, _) => "Check building pressurization and ventilation balance",
        (Quantity::Co2, false) => "Increase fresh-air supply",
        (Quantity::Co2, true) => "Check the CO2 sensor calibration",
        (Quantity::Light, false) => "Dim lighting or add shading",
        (Quantity::Light, true) => "Increase lighting",
    }
}

pub(crate) fn action(
    quantity: Quantity,
    current: f64,
    target: f64,
    range: Option<&QuantityRange>,
    active: bool,
    sensor: &str,
) -> String {
    if range.is_none() {
        return if active {
            format!("Check {} sensor and investigate the anomaly", sensor)
        } else {
            "No action required".to_string()
        };
    }
    if !active {
        return "No action required".to_string();
    }
    if (current - target).abs() < f64::EPSILON {
        return format!("Investigate the {} readings; value is at target", quantity);
    }
    format!(
        "{} to reach {:.1}{}",
        corrective_action(quantity, target > current),
        target,
        quantity.unit()
    )
}

/// Graded explanation of how far a reading is past its limit.
fn graded(quantity: Quantity, diff: f64, high: bool) -> String {
    let side = if high { "above" } else { "below" };
    match (quantity, high) {
        (Quantity::Temperature, true) if diff > 5.0 => format!(
            "Temperature {diff:.1}°C above normal. Risk of hardware overheating. URGENT ACTION REQUIRED."
        ),
        (Quantity::Temperature, true) if diff > 2.0 => {
            format!("Temperature {diff:.1}°C above normal. Cooling system may be insufficient.")
        }
        (Quantity::Temperature, true) => {
            format!("Temperature {diff:.1}°C above normal. Monitor cooling system.")
        }
        (Quantity::Temperature, false) if diff > 5.0 => format!(
            "Temperature {diff:.1}°C below normal. Check heating system or thermal insulation."
        ),
        (Quantity::Temperature, false) if diff > 2.0 => {
            format!("Temperature {diff:.1}°C below normal. Heating may be needed.")
        }
        (Quantity::Temperature, false) => {
            format!("Temperature {diff:.1}°C below normal. Monitor heating system.")
        }
        (Quantity::Humidity, true) if diff > 20.0 => {
            format!("Humidity {diff:.0}% above normal. HIGH RISK OF CONDENSATION on electronics!")
        }
        (Quantity::Humidity, true) if diff > 10.0 => {
            format!("Humidity {diff:.0}% above normal. Risk of corrosion and condensation.")
        }
        (Quantity::Humidity, true) => {
            format!("Humidity {diff:.0}% above normal. Dehumidification recommended.")
        }
        (Quantity::Humidity, false) if diff > 20.0 => format!(
            "Humidity {diff:.0}% below normal. Risk of static electricity and material degradation."
        ),
        (Quantity::Humidity, false) if diff > 10.0 => {
            format!("Humidity {diff:.0}% below normal. Humidification recommended.")
        }
        (Quantity::Humidity, false) => {
            format!("Humidity {diff:.0}% below normal. Monitor humidity levels.")
        }
        _ => format!("{} {:.1}{} {} normal.", quantity.label(), diff, quantity.unit(), side),
    }
}

pub(crate) fn reasoning(
    quantity: Quantity,
    current: f64,
    range: Option<&QuantityRange>,
    flags: &[SafetyFlag],
    confidence: f64,
    is_anomaly: bool,
) -> String {
    let mut parts = Vec::new();
    match range {
        None => parts.push(format!("No safe range configured for {}.", quantity)),
        Some(r) => match Position::of(current, r) {
            Position::Above => parts.push(graded(quantity, current - r.max, true)),
            Position::Below => parts.push(graded(quantity, r.min - current, false)),
            Position::Within => {
                parts.push(format!("{} is within acceptable range.", quantity.label()))
            }
        },
    }
    for flag in flags {
        parts.push(format!("Safety: {}.", flag.describe()));
    }
    parts.push(if is_anomaly {
        format!("Anomaly confirmed with confidence {:.2}.", confidence)
    } else {
        format!("No anomaly detected (confidence {:.2}).", confidence)
    });
    parts.join(" ")
}

/// Render a duration as `~N minutes`, `~N hours` or `~N days`.
pub fn format_duration(minutes: f64) -> String {
    if !minutes.is_finite() || minutes <= 0.0 {
        return "already at target".to_string();
    }
    let hours = minutes / 60.0;
    if hours < 1.0 {
        format!("~{} minutes", minutes.round().max(1.0) as u64)
    } else if hours < 24.0 {
        format!("~{} hours", hours.floor() as u64)
    } else {
        format!("~{} days", (hours / 24.0).floor() as u64)
    }
}
