use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::models::{RawObservation, SessionDetail, TestObservation, TrendPoint, TrendSeries};

use super::matching::TestNameMatcher;

/// Date-time layouts the store has been seen to emit besides plain dates.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Builds the trend of `target_name` over `sessions`.
///
/// Every observation equivalent to the target with a finite numeric value
/// becomes a point dated by its session. Points are ordered by session
/// timestamp (a bare date counts as midnight); points sharing a timestamp
/// keep the order they were found in. Sessions without a usable date or
/// observation list are skipped, as are individual observations without a
/// name or a numeric value. Never fails: no match is an empty series.
pub fn build_trend(target_name: &str, sessions: &[SessionDetail]) -> TrendSeries {
    let matcher = TestNameMatcher::new(target_name);
    let mut points: Vec<(NaiveDateTime, TrendPoint)> = Vec::new();

    for (index, session) in sessions.iter().enumerate() {
        let Some(taken_at) = session.date.as_deref().and_then(parse_session_timestamp) else {
            tracing::warn!(
                index,
                session_id = ?session.session_id,
                date = ?session.date,
                "Skipping session without a usable date"
            );
            continue;
        };
        let Some(observations) = &session.observations else {
            tracing::warn!(
                index,
                session_id = ?session.session_id,
                "Skipping session without an observation list"
            );
            continue;
        };

        for raw in observations {
            if let Some(observation) = resolve_observation(&matcher, taken_at.date(), raw) {
                let point = TrendPoint {
                    observed_at: observation.observed_at,
                    value: observation.value,
                    unit: observation.unit,
                    test_name: observation.test_name,
                    session_id: session.session_id,
                    normal_range: raw.normal_range.clone(),
                };
                points.push((taken_at, point));
            }
        }
    }

    // Stable: points with equal timestamps stay in corpus order.
    points.sort_by_key(|(taken_at, _)| *taken_at);
    let points: Vec<TrendPoint> = points.into_iter().map(|(_, point)| point).collect();

    tracing::debug!(
        target_name,
        sessions = sessions.len(),
        points = points.len(),
        "Built trend series"
    );

    TrendSeries {
        test_name: target_name.to_string(),
        points,
    }
}

/// Turns a raw observation into a dated numeric one if it matches the target.
fn resolve_observation(
    matcher: &TestNameMatcher,
    observed_at: NaiveDate,
    raw: &RawObservation,
) -> Option<TestObservation> {
    let Some(test_name) = raw.test_name.as_deref() else {
        tracing::debug!("Skipping observation without a test name");
        return None;
    };

    matcher.matches(test_name)?;

    let Some(value) = raw.value.as_deref().and_then(parse_observation_value) else {
        tracing::debug!(test_name, value = ?raw.value, "Dropping point with non-numeric value");
        return None;
    };

    Some(TestObservation {
        test_name: test_name.to_string(),
        value,
        unit: raw.unit.clone().unwrap_or_default(),
        observed_at,
    })
}

/// Parses a value string as a finite number. "n/a", "<0.5", "NaN" and
/// "inf" all yield `None`.
pub fn parse_observation_value(raw: &str) -> Option<f64> {
    let value = raw.trim().parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

/// Parses a session date given as `YYYY-MM-DD`, an RFC 3339 timestamp, or a
/// naive date-time. Only the calendar date is kept.
pub fn parse_session_date(raw: &str) -> Option<NaiveDate> {
    parse_session_timestamp(raw).map(|timestamp| timestamp.date())
}

/// Like [`parse_session_date`] but keeps the time of day. A bare date is
/// midnight; an RFC 3339 timestamp keeps its own wall-clock time.
pub fn parse_session_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.naive_local());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}
