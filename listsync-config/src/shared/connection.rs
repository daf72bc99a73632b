use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sqlx::mysql::MySqlConnectOptions;

use crate::shared::ValidationError;

/// Connection settings for the MySQL source database.
///
/// This intentionally does not implement [`serde::Serialize`] to avoid
/// accidentally leaking the password into serialized forms.
#[derive(Debug, Clone, Deserialize)]
pub struct MySqlConnectionConfig {
    /// Host on which the database is running.
    pub host: String,
    /// Port on which the database is listening.
    pub port: u16,
    /// Name of the database to connect to.
    pub name: String,
    /// Username used to authenticate against the database.
    pub username: String,
    /// Optional password for the database user.
    pub password: Option<SecretString>,
}

impl MySqlConnectionConfig {
    /// Creates sqlx connection options for the configured database.
    pub fn with_db(&self) -> MySqlConnectOptions {
        let mut options = MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .database(&self.name);

        if let Some(password) = &self.password {
            options = options.password(password.expose_secret());
        }

        options
    }

    /// Validates the connection settings.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.host.is_empty() {
            return Err(ValidationError::EmptyField("source.connection.host"));
        }

        if self.name.is_empty() {
            return Err(ValidationError::EmptyField("source.connection.name"));
        }

        if self.username.is_empty() {
            return Err(ValidationError::EmptyField("source.connection.username"));
        }

        Ok(())
    }
}
