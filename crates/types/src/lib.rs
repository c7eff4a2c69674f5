pub mod config;
pub mod status;

pub use config::*;
pub use status::*;

/// Index of a ledger as reported by the node.
pub type LedgerIndex = u64;
