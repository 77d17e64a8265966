pub mod session;
pub mod trend;

pub use session::*;
pub use trend::*;
