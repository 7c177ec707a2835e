pub mod answers;
pub mod config;
pub mod engine;
pub mod error;
pub mod header;
pub mod install;
pub mod io;
pub mod links;
pub mod paths;
pub mod patterns;
pub mod settings;
pub mod status;

pub use error::{Result, SpeculateError};

/// Version of this tool embedded at compile time.
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");
