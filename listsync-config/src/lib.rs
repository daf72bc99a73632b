//! Configuration loading and shared configuration types for listsync services.
//!
//! Configuration is loaded hierarchically: a base file, an environment-specific
//! file, and `APP_`-prefixed environment variable overrides. Shared types cover
//! the source database, the remote collection, authentication, and field
//! mapping; secrets are wrapped in [`secrecy::SecretString`] and never
//! serialized back out.

mod environment;
mod load;
pub mod shared;

pub use environment::Environment;
pub use load::{Config, LoadConfigError, load_config};
