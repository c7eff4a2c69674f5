pub mod cli;
pub mod config;
pub mod constants;
pub mod node;

pub use cli::*;
pub use config::*;
pub use constants::*;
pub use node::*;
