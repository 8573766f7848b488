use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SeriesError;

/// One timestamped sensor sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl Reading {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Time-ordered readings for a single sensor.
///
/// Construction validates every reading, so detectors can assume finite
/// values and non-decreasing timestamps. The series is immutable after that.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    sensor_id: Option<String>,
    readings: Vec<Reading>,
    #[serde(skip)]
    values: Vec<f64>,
}

impl Series {
    /// Validate and wrap a reading sequence.
    pub fn new(readings: Vec<Reading>) -> Result<Self, SeriesError> {
        for (index, reading) in readings.iter().enumerate() {
            if !reading.value.is_finite() {
                return Err(SeriesError::NonFiniteValue {
                    index,
                    value: reading.value,
                });
            }
            if index > 0 && reading.timestamp < readings[index - 1].timestamp {
                return Err(SeriesError::NonMonotonicTimestamp { index });
            }
        }

        let values = readings.iter().map(|r| r.value).collect();
        Ok(Self {
            sensor_id: None,
            readings,
            values,
        })
    }

    /// Build a regularly sampled series starting at `start`, one value every `step_secs`.
    pub fn from_values(
        start: DateTime<Utc>,
        step_secs: i64,
        values: &[f64],
    ) -> Result<Self, SeriesError> {
        if step_secs <= 0 {
            return Err(SeriesError::InvalidStep(step_secs));
        }
        let readings = values
            .iter()
            .enumerate()
            .map(|(i, &value)| Reading::new(start + Duration::seconds(step_secs * i as i64), value))
            .collect();
        Self::new(readings)
    }

    /// Attach the id of the sensor that produced these readings.
    pub fn with_sensor_id(mut self, sensor_id: impl Into<String>) -> Self {
        self.sensor_id = Some(sensor_id.into());
        self
    }

    pub fn sensor_id(&self) -> Option<&str> {
        self.sensor_id.as_deref()
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    /// Raw values in time order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Most recent reading, if any.
    pub fn latest(&self) -> Option<&Reading> {
        self.readings.last()
    }
}

impl<'de> Deserialize<'de> for Series {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct RawSeries {
            #[serde(default)]
            sensor_id: Option<String>,
            readings: Vec<Reading>,
        }

        let raw = RawSeries::deserialize(deserializer)?;
        let series = Series::new(raw.readings).map_err(serde::de::Error::custom)?;
        Ok(match raw.sensor_id {
            Some(id) => series.with_sensor_id(id),
            None => series,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn from_values_spaces_timestamps() {
        let series = Series::from_values(t0(), 3600, &[20.0, 21.0, 22.0]).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.values(), &[20.0, 21.0, 22.0]);
        let gap = series.readings()[2].timestamp - series.readings()[1].timestamp;
        assert_eq!(gap, Duration::hours(1));
    }

    #[test]
    fn equal_timestamps_are_allowed() {
        let readings = vec![Reading::new(t0(), 1.0), Reading::new(t0(), 2.0)];
        assert!(Series::new(readings).is_ok());
    }

    #[test]
    fn rejects_decreasing_timestamps() {
        let readings = vec![
            Reading::new(t0() + Duration::minutes(5), 1.0),
            Reading::new(t0(), 2.0),
        ];
        assert_eq!(
            Series::new(readings),
            Err(SeriesError::NonMonotonicTimestamp { index: 1 })
        );
    }

    #[test]
    fn rejects_nan_and_infinity() {
        let nan = Series::from_values(t0(), 60, &[1.0, f64::NAN]);
        assert!(matches!(nan, Err(SeriesError::NonFiniteValue { index: 1, .. })));

        let inf = Series::from_values(t0(), 60, &[f64::INFINITY]);
        assert!(matches!(inf, Err(SeriesError::NonFiniteValue { index: 0, .. })));
    }

    #[test]
    fn rejects_non_positive_step() {
        assert_eq!(
            Series::from_values(t0(), 0, &[1.0]),
            Err(SeriesError::InvalidStep(0))
        );
    }

    #[test]
    fn empty_series_is_valid() {
        let series = Series::new(Vec::new()).unwrap();
        assert!(series.is_empty());
        assert!(series.latest().is_none());
    }

    #[test]
    fn deserialize_validates_readings() {
        let ok = r#"{"sensor_id":"t-1","readings":[
            {"timestamp":"2025-01-01T00:00:00Z","value":21.5},
            {"timestamp":"2025-01-01T01:00:00Z","value":21.7}]}"#;
        let series: Series = serde_json::from_str(ok).unwrap();
        assert_eq!(series.sensor_id(), Some("t-1"));
        assert_eq!(series.values(), &[21.5, 21.7]);

        let bad = r#"{"readings":[
            {"timestamp":"2025-01-01T01:00:00Z","value":21.5},
            {"timestamp":"2025-01-01T00:00:00Z","value":21.7}]}"#;
        assert!(serde_json::from_str::<Series>(bad).is_err());
    }
}
