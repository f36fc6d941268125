pub mod links;

pub use links::*;

// Netlink lookups used to pick which interfaces the GUI manages
