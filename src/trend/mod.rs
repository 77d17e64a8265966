//! Test-identity reconciliation and trend aggregation.
//!
//! Reports name the same measurement inconsistently ("Total Cholesterol",
//! "cholesterol, total", "CHOLESTEROL TOTAL"). This module decides which
//! free-text names refer to the same test and collects their values across
//! sessions into a date-ordered series. Everything here is pure and
//! synchronous; fetching the corpus lives in `crate::store`.
//!
//! ```text
//! normalize → matching → aggregate
//!                     └→ catalog
//! ```

mod aggregate;
mod catalog;
mod matching;
mod normalize;

pub use aggregate::*;
pub use catalog::*;
pub use matching::*;
pub use normalize::*;
