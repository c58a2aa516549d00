// HTTP routes
pub mod health;
pub mod metrics;
pub mod status;

pub use health::*;
pub use metrics::*;
pub use status::*;
