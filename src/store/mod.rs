//! Session store boundary: where the trend corpus comes from.
//!
//! The store is external; this module only reads from it. Detail fetches run
//! concurrently and any one of them may fail or miss the deadline without
//! aborting the trend.

mod error;
mod fetch;
mod http;
mod memory;

use std::future::Future;

use crate::models::{SessionDetail, SessionId, SessionSummary};

pub use error::StoreError;
pub use fetch::{fetch_corpus, fetch_trend};
pub use http::HttpSessionStore;
pub use memory::InMemorySessionStore;

/// Read access to dated sessions of extracted test results.
pub trait SessionStore: Send + Sync {
    /// All sessions, in no particular order.
    fn list_sessions(
        &self,
    ) -> impl Future<Output = Result<Vec<SessionSummary>, StoreError>> + Send;

    /// One session with its observations.
    fn get_session_detail(
        &self,
        session_id: SessionId,
    ) -> impl Future<Output = Result<SessionDetail, StoreError>> + Send;
}
