pub mod controller;
pub mod error;
pub mod flash;
pub mod metrics;
pub mod page;
pub mod routes;

#[cfg(test)]
mod testing;

pub use controller::*;
pub use error::ApiError;
pub use flash::Flash;
pub use metrics::ToolMetrics;
pub use routes::{router, serve};
