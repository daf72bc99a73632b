//! Shared configuration types for listsync services.

mod auth;
mod base;
mod connection;
mod daemon;
mod destination;
mod mapping;
mod source;

pub use auth::AuthConfig;
pub use base::ValidationError;
pub use connection::MySqlConnectionConfig;
pub use daemon::DaemonConfig;
pub use destination::DestinationConfig;
pub use mapping::MappingConfig;
pub use source::SourceConfig;
