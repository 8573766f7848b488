use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ClimateError;

/// Physical quantity measured by a sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    Temperature,
    Humidity,
    Pressure,
    Co2,
    Light,
}

impl Quantity {
    pub const ALL: [Quantity; 5] = [
        Quantity::Temperature,
        Quantity::Humidity,
        Quantity::Pressure,
        Quantity::Co2,
        Quantity::Light,
    ];

    /// Config key used in room profiles and rate tables.
    pub fn key(&self) -> &'static str {
        match self {
            Quantity::Temperature => "temperature",
            Quantity::Humidity => "humidity",
            Quantity::Pressure => "pressure",
            Quantity::Co2 => "co2",
            Quantity::Light => "light",
        }
    }

    /// Display unit appended to values in generated text.
    pub fn unit(&self) -> &'static str {
        match self {
            Quantity::Temperature => "°C",
            Quantity::Humidity => "%",
            Quantity::Pressure => " hPa",
            Quantity::Co2 => " ppm",
            Quantity::Light => " lx",
        }
    }

    /// Human label with a leading capital, e.g. "Temperature".
    pub fn label(&self) -> &'static str {
        match self {
            Quantity::Temperature => "Temperature",
            Quantity::Humidity => "Humidity",
            Quantity::Pressure => "Pressure",
            Quantity::Co2 => "CO2 level",
            Quantity::Light => "Illuminance",
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Quantity {
    type Err = ClimateError;

    /// Case-insensitive; sensor type names such as "Temperature" or
    /// "relative_humidity" resolve by substring.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        if lower.contains("temp") {
            Ok(Quantity::Temperature)
        } else if lower.contains("humid") {
            Ok(Quantity::Humidity)
        } else if lower.contains("pressure") {
            Ok(Quantity::Pressure)
        } else if lower.contains("co2") || lower.contains("carbon") {
            Ok(Quantity::Co2)
        } else if lower.contains("light") || lower.contains("lux") || lower == "illuminance" {
            Ok(Quantity::Light)
        } else {
            Err(ClimateError::UnknownQuantity(s.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_sensor_type_names() {
        assert_eq!("Temperature".parse::<Quantity>().unwrap(), Quantity::Temperature);
        assert_eq!("relative_humidity".parse::<Quantity>().unwrap(), Quantity::Humidity);
        assert_eq!("CO2".parse::<Quantity>().unwrap(), Quantity::Co2);
        assert_eq!("light".parse::<Quantity>().unwrap(), Quantity::Light);
        assert!("vibration".parse::<Quantity>().is_err());
    }

    #[test]
    fn key_round_trips_through_parse() {
        for q in Quantity::ALL {
            assert_eq!(q.key().parse::<Quantity>().unwrap(), q);
        }
    }

    #[test]
    fn unknown_quantity_keeps_the_input() {
        let err = " Vibration ".parse::<Quantity>().unwrap_err();
        assert_eq!(err, ClimateError::UnknownQuantity(" Vibration ".to_string()));
        assert_eq!(err.to_string(), "Unknown quantity:  Vibration ");
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&Quantity::Co2).unwrap();
        assert_eq!(json, "\"co2\"");
    }
}
