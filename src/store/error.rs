//! Errors raised at the session-store boundary.
//!
//! The trend core never returns these; they only describe why a listing or a
//! single session could not be read.

use thiserror::Error;

use crate::models::SessionId;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Cannot connect to session store at {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Session store returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Session not found: {0}")]
    NotFound(SessionId),

    #[error("HTTP client error: {0}")]
    HttpClient(String),
}
