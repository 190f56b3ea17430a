//! Time handling for forecast-style coordinate values.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A forecast valid time: model reference time plus lead.
///
/// Time coordinates carry numeric values; this type converts between wall
/// clock times and the numeric form (hours since the Unix epoch) used for
/// `time` / `forecast_reference_time` / `forecast_period` coordinate values.
/// The three are linked: time = reference time + period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidTime {
    /// Model run/reference time.
    pub reference_time: DateTime<Utc>,
    /// Forecast hour offset from reference time.
    pub forecast_hour: u32,
}

impl ValidTime {
    pub fn new(reference_time: DateTime<Utc>, forecast_hour: u32) -> Self {
        Self {
            reference_time,
            forecast_hour,
        }
    }

    /// Create from analysis time (forecast_hour = 0).
    pub fn analysis(reference_time: DateTime<Utc>) -> Self {
        Self {
            reference_time,
            forecast_hour: 0,
        }
    }

    /// The actual valid time (reference + forecast offset).
    pub fn valid_datetime(&self) -> DateTime<Utc> {
        self.reference_time + Duration::hours(self.forecast_hour as i64)
    }

    /// Hours since the Unix epoch for an instant.
    pub fn hours_since_epoch(dt: DateTime<Utc>) -> f64 {
        dt.timestamp() as f64 / 3600.0
    }

    /// Numeric value for a `forecast_reference_time` coordinate.
    pub fn reference_value(&self) -> f64 {
        Self::hours_since_epoch(self.reference_time)
    }

    /// Numeric value for a `forecast_period` coordinate.
    pub fn period_value(&self) -> f64 {
        self.forecast_hour as f64
    }

    /// Numeric value for a `time` coordinate.
    pub fn time_value(&self) -> f64 {
        Self::hours_since_epoch(self.valid_datetime())
    }
}

/// Epoch-hours back to a wall clock time.
pub fn datetime_from_hours(hours: f64) -> DateTime<Utc> {
    Utc.timestamp_opt((hours * 3600.0).round() as i64, 0)
        .single()
        .unwrap_or_else(|| Utc.timestamp_opt(0, 0).unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triple_relationship() {
        let reference = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let vt = ValidTime::new(reference, 6);
        assert_eq!(vt.time_value(), vt.reference_value() + vt.period_value());
    }

    #[test]
    fn test_hours_roundtrip() {
        let dt = Utc.with_ymd_and_hms(2024, 1, 15, 18, 0, 0).unwrap();
        let hours = ValidTime::hours_since_epoch(dt);
        assert_eq!(datetime_from_hours(hours), dt);
    }

    #[test]
    fn test_analysis_has_zero_period() {
        let reference = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        let vt = ValidTime::analysis(reference);
        assert_eq!(vt.period_value(), 0.0);
        assert_eq!(vt.valid_datetime(), reference);
    }
}
