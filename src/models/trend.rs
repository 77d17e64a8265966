use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::session::SessionId;

/// One matched measurement on a trend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub observed_at: NaiveDate,
    pub value: f64,
    pub unit: String,
    /// The name as it appeared on the source report.
    pub test_name: String,
    pub session_id: Option<SessionId>,
    pub normal_range: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub earliest: Option<NaiveDate>,
    pub latest: Option<NaiveDate>,
}

/// Date-ordered values for one logical measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSeries {
    /// The target name the series was built for.
    pub test_name: String,
    /// Ascending by `observed_at`; same-day points keep corpus order.
    pub points: Vec<TrendPoint>,
}

impl TrendSeries {
    pub fn empty(test_name: &str) -> Self {
        Self {
            test_name: test_name.to_string(),
            points: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn date_range(&self) -> DateRange {
        DateRange {
            earliest: self.points.first().map(|p| p.observed_at),
            latest: self.points.last().map(|p| p.observed_at),
        }
    }

    /// Most recent point (the last one encountered on the latest date).
    pub fn latest(&self) -> Option<&TrendPoint> {
        self.points.last()
    }

    /// Distinct source spellings in first-seen order.
    pub fn source_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for point in &self.points {
            if !names.contains(&point.test_name.as_str()) {
                names.push(&point.test_name);
            }
        }
        names
    }

    /// Distinct units in first-seen order. More than one means the reports
    /// disagree; no conversion is attempted.
    pub fn units(&self) -> Vec<&str> {
        let mut units: Vec<&str> = Vec::new();
        for point in &self.points {
            if !units.contains(&point.unit.as_str()) {
                units.push(&point.unit);
            }
        }
        units
    }
}

impl fmt::Display for TrendSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Trend for {}", self.test_name)?;
        if self.points.is_empty() {
            return write!(f, "No historical data found for this test.");
        }
        for (i, point) in self.points.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}  {}", point.observed_at.format("%Y-%m-%d"), point.value)?;
            if !point.unit.is_empty() {
                write!(f, " {}", point.unit)?;
            }
            if let Some(range) = &point.normal_range {
                write!(f, "  (Normal: {range})")?;
            }
        }
        Ok(())
    }
}
