pub mod advancer;
pub mod daemon;
pub mod errors;
pub mod rpc;
pub mod service;
pub mod shutdown;
mod signal;
pub mod supervisor;

pub use advancer::*;
pub use daemon::*;
pub use errors::{Error, Result};
pub use rpc::*;
pub use service::*;
pub use shutdown::*;
pub use supervisor::*;
