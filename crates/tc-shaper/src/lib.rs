pub mod backend;
pub mod import;
pub mod tcset;

pub use backend::*;
pub use import::*;
pub use tcset::*;

// Bridge to the tcconfig tool suite (tcset / tcshow / tcdel)
