pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub mod app;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use config::credentials::{ApiKeyCredentials, CredentialSettings};
pub use config::ClientSettings;
pub use core::{
    engine::InvokeEngine, invoker::FunctionInvoker, resolver::ResourceResolver,
};
pub use utils::error::{FnError, Result};
