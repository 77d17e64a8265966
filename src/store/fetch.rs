use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use tokio::time::Instant;

use crate::config::FetchConfig;
use crate::models::{SessionDetail, SessionSummary, TrendSeries};
use crate::trend::build_trend;

use super::{SessionStore, StoreError};

/// Deadline used when the configured corpus timeout cannot be represented
/// as an instant (about 30 years).
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Fetches the whole session corpus from `store`.
///
/// Session details are fetched concurrently (at most
/// `config.max_concurrency` at a time). A failed detail fetch drops that
/// session only. When `config.corpus_timeout` elapses, the sessions that
/// already arrived are returned. Arrived sessions are returned in listing
/// order regardless of completion order.
///
/// Fails only when the listing itself fails.
pub async fn fetch_corpus<S: SessionStore>(
    store: &S,
    config: &FetchConfig,
) -> Result<Vec<SessionDetail>, StoreError> {
    let deadline = corpus_deadline(Instant::now(), config.corpus_timeout);

    let summaries = match tokio::time::timeout_at(deadline, store.list_sessions()).await {
        Ok(listing) => listing?,
        Err(_) => {
            tracing::warn!(
                timeout = ?config.corpus_timeout,
                "Session listing timed out, no sessions available"
            );
            return Ok(Vec::new());
        }
    };

    let total = summaries.len();
    tracing::debug!(total, "Fetching session details");

    let mut pending = stream::iter(summaries.into_iter().enumerate())
        .map(move |(index, summary)| async move {
            let result = store.get_session_detail(summary.session_id).await;
            (index, summary, result)
        })
        .buffer_unordered(config.max_concurrency.max(1));

    let mut arrived: Vec<(usize, SessionDetail)> = Vec::with_capacity(total);
    let expired = tokio::time::sleep_until(deadline);
    tokio::pin!(expired);

    loop {
        tokio::select! {
            next = pending.next() => match next {
                Some((index, summary, Ok(detail))) => {
                    arrived.push((index, with_listing_fallback(detail, &summary)));
                }
                Some((_, summary, Err(e))) => {
                    tracing::warn!(
                        session_id = summary.session_id,
                        error = %e,
                        "Session fetch failed, skipping session"
                    );
                }
                None => break,
            },
            _ = &mut expired => {
                tracing::warn!(
                    arrived = arrived.len(),
                    total,
                    "Corpus fetch timed out, continuing with partial data"
                );
                break;
            }
        }
    }

    arrived.sort_by_key(|(index, _)| *index);
    tracing::info!(sessions = arrived.len(), total, "Session corpus fetched");

    Ok(arrived.into_iter().map(|(_, detail)| detail).collect())
}

/// Fetches the corpus and builds the trend of `target_name` over it.
pub async fn fetch_trend<S: SessionStore>(
    store: &S,
    target_name: &str,
    config: &FetchConfig,
) -> Result<TrendSeries, StoreError> {
    let corpus = fetch_corpus(store, config).await?;
    Ok(build_trend(target_name, &corpus))
}

/// `now + timeout`, saturating to a far-future deadline on overflow.
fn corpus_deadline(now: Instant, timeout: Duration) -> Instant {
    now.checked_add(timeout).unwrap_or_else(|| now + FAR_FUTURE)
}

/// Fills the id and a missing date from the listing row.
fn with_listing_fallback(mut detail: SessionDetail, summary: &SessionSummary) -> SessionDetail {
    if detail.session_id.is_none() {
        detail.session_id = Some(summary.session_id);
    }
    let has_date = detail
        .date
        .as_deref()
        .is_some_and(|date| !date.trim().is_empty());
    if !has_date {
        detail.date = summary.date.clone();
    }
    detail
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use crate::models::{RawObservation, SessionId};
    use crate::store::InMemorySessionStore;

    /// Store whose sessions can fail or answer late.
    #[derive(Default)]
    struct ScriptedStore {
        listing: Vec<SessionSummary>,
        details: HashMap<SessionId, SessionDetail>,
        delays: HashMap<SessionId, Duration>,
        listing_delay: Option<Duration>,
        listing_fails: bool,
    }

    impl ScriptedStore {
        fn with_session(mut self, id: SessionId, detail: SessionDetail) -> Self {
            self.listing.push(SessionSummary {
                session_id: id,
                date: detail.date.clone(),
            });
            self.details.insert(id, detail.with_id(id));
            self
        }

        fn with_listed_only(mut self, id: SessionId, date: &str) -> Self {
            self.listing.push(SessionSummary {
                session_id: id,
                date: Some(date.to_string()),
            });
            self
        }

        fn with_delay(mut self, id: SessionId, delay: Duration) -> Self {
            self.delays.insert(id, delay);
            self
        }
    }

    impl SessionStore for ScriptedStore {
        async fn list_sessions(&self) -> Result<Vec<SessionSummary>, StoreError> {
            if let Some(delay) = self.listing_delay {
                tokio::time::sleep(delay).await;
            }
            if self.listing_fails {
                return Err(StoreError::Connection("scripted".into()));
            }
            Ok(self.listing.clone())
        }

        async fn get_session_detail(&self, session_id: SessionId) -> Result<SessionDetail, StoreError> {
            if let Some(delay) = self.delays.get(&session_id) {
                tokio::time::sleep(*delay).await;
            }
            self.details
                .get(&session_id)
                .cloned()
                .ok_or(StoreError::Status {
                    status: 500,
                    body: "scripted failure".into(),
                })
        }
    }

    fn glucose(date: &str, value: &str) -> SessionDetail {
        SessionDetail::new(date, vec![RawObservation::new("Glucose", value, "mg/dL")])
    }

    fn config_with_timeout(timeout: Duration) -> FetchConfig {
        FetchConfig {
            corpus_timeout: timeout,
            ..FetchConfig::default()
        }
    }

    #[tokio::test]
    async fn fetches_every_session_in_listing_order() {
        let store = ScriptedStore::default()
            .with_session(3, glucose("2023-03-01", "105"))
            .with_session(1, glucose("2023-01-01", "90"))
            .with_session(2, glucose("2023-02-01", "95"))
            .with_delay(3, Duration::from_millis(50));

        let corpus = fetch_corpus(&store, &FetchConfig::default()).await.unwrap();

        let ids: Vec<_> = corpus.iter().map(|s| s.session_id).collect();
        assert_eq!(ids, vec![Some(3), Some(1), Some(2)]);
    }

    #[tokio::test]
    async fn failed_session_is_skipped() {
        let store = ScriptedStore::default()
            .with_session(1, glucose("2023-01-01", "90"))
            .with_listed_only(2, "2023-02-01")
            .with_session(3, glucose("2023-03-01", "105"));

        let series = fetch_trend(&store, "glucose", &FetchConfig::default()).await.unwrap();

        let values: Vec<_> = series.points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![90.0, 105.0]);
    }

    #[tokio::test]
    async fn timeout_keeps_sessions_that_arrived() {
        let store = ScriptedStore::default()
            .with_session(1, glucose("2023-01-01", "90"))
            .with_session(2, glucose("2023-02-01", "95"))
            .with_delay(2, Duration::from_secs(30));

        let corpus = fetch_corpus(&store, &config_with_timeout(Duration::from_millis(200)))
            .await
            .unwrap();

        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus[0].session_id, Some(1));
    }

    #[tokio::test]
    async fn listing_timeout_yields_empty_corpus() {
        let store = ScriptedStore {
            listing_delay: Some(Duration::from_secs(30)),
            ..ScriptedStore::default()
        }
        .with_session(1, glucose("2023-01-01", "90"));

        let corpus = fetch_corpus(&store, &config_with_timeout(Duration::from_millis(100)))
            .await
            .unwrap();
        assert!(corpus.is_empty());
    }

    #[tokio::test]
    async fn listing_failure_is_an_error() {
        let store = ScriptedStore {
            listing_fails: true,
            ..ScriptedStore::default()
        };

        let err = fetch_corpus(&store, &FetchConfig::default()).await.unwrap_err();
        assert!(matches!(err, StoreError::Connection(_)));
    }

    #[tokio::test]
    async fn serial_fetch_with_concurrency_one() {
        let store = InMemorySessionStore::from_sessions(vec![
            glucose("2023-02-01", "95"),
            glucose("2023-01-01", "90"),
        ]);
        let config = FetchConfig {
            max_concurrency: 1,
            ..FetchConfig::default()
        };

        let series = fetch_trend(&store, "Glucose", &config).await.unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.points[0].value, 90.0);
    }

    #[tokio::test]
    async fn empty_store_gives_empty_series() {
        let store = InMemorySessionStore::new();
        let series = fetch_trend(&store, "Glucose", &FetchConfig::default()).await.unwrap();
        assert!(series.is_empty());
    }

    #[tokio::test]
    async fn huge_timeout_does_not_overflow_deadline() {
        let config = FetchConfig::from_lookup(|key| {
            (key == "LABTREND_FETCH_TIMEOUT_SECS").then(|| u64::MAX.to_string())
        });
        assert_eq!(config.corpus_timeout, Duration::from_secs(u64::MAX));

        let store = InMemorySessionStore::from_sessions(vec![glucose("2023-01-01", "90")]);
        let corpus = fetch_corpus(&store, &config).await.unwrap();
        assert_eq!(corpus.len(), 1);

        let empty = fetch_corpus(&InMemorySessionStore::new(), &config).await.unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn deadline_saturates_instead_of_panicking() {
        let now = Instant::now();
        assert_eq!(corpus_deadline(now, Duration::from_secs(5)), now + Duration::from_secs(5));
        assert_eq!(corpus_deadline(now, Duration::MAX), now + FAR_FUTURE);
    }

    #[test]
    fn listing_date_fills_missing_detail_date() {
        let detail = SessionDetail {
            observations: Some(vec![]),
            ..SessionDetail::default()
        };
        let summary = SessionSummary {
            session_id: 8,
            date: Some("2023-04-04".into()),
        };

        let filled = with_listing_fallback(detail, &summary);
        assert_eq!(filled.session_id, Some(8));
        assert_eq!(filled.date.as_deref(), Some("2023-04-04"));
    }

    #[test]
    fn detail_date_wins_over_listing() {
        let detail = SessionDetail::new("2023-05-05", vec![]).with_id(8);
        let summary = SessionSummary {
            session_id: 8,
            date: Some("2023-04-04".into()),
        };

        let filled = with_listing_fallback(detail, &summary);
        assert_eq!(filled.date.as_deref(), Some("2023-05-05"));
    }
}
