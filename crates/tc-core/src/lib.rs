pub mod config;
pub mod error;
pub mod rule;
pub mod snapshot;

pub use config::*;
pub use error::*;
pub use rule::*;
pub use snapshot::*;

// Shared model for the tcgui workspace: rules, snapshots, startup config
