//! Configuration management for the chatroom server
//!
//! Values are layered: built-in defaults, then an optional `chatroom.toml`,
//! then `CHATROOM_*` environment variables (e.g. `CHATROOM_MAX_CLIENTS=20`).

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 9002;
pub const DEFAULT_BACKLOG: u32 = 5;
pub const DEFAULT_MAX_CLIENTS: usize = 10;
pub const DEFAULT_NAME_LENGTH: usize = 10;
pub const DEFAULT_BUFFER_SIZE: usize = 250;

/// Fixed per-message overhead of the `/list` reply header.
const LIST_HEADER_ALLOWANCE: usize = 50;

/// Server configuration. All values require a restart to take effect.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// IP address the listener binds to
    pub bind_address: String,

    /// TCP port the listener binds to
    pub port: u16,

    /// Pending-connection queue depth passed to `listen(2)`
    pub backlog: u32,

    /// Maximum number of simultaneously connected clients
    pub max_clients: usize,

    /// Maximum username length in characters
    pub max_name_length: usize,

    /// Maximum accepted line length in bytes
    pub buffer_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            backlog: DEFAULT_BACKLOG,
            max_clients: DEFAULT_MAX_CLIENTS,
            max_name_length: DEFAULT_NAME_LENGTH,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl ServerConfig {
    /// Load configuration from `./chatroom.toml` (if present) with environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("chatroom")
    }

    /// Load configuration from the given file stem (the file is optional)
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("bind_address", DEFAULT_BIND_ADDRESS)?
            .set_default("port", i64::from(DEFAULT_PORT))?
            .set_default("backlog", i64::from(DEFAULT_BACKLOG))?
            .set_default("max_clients", DEFAULT_MAX_CLIENTS as i64)?
            .set_default("max_name_length", DEFAULT_NAME_LENGTH as i64)?
            .set_default("buffer_size", DEFAULT_BUFFER_SIZE as i64)?
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("CHATROOM").try_parsing(true))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Message("port cannot be 0".into()));
        }

        if self.backlog == 0 {
            return Err(ConfigError::Message(
                "backlog must be greater than 0".into(),
            ));
        }

        if self.max_clients == 0 {
            return Err(ConfigError::Message(
                "max_clients must be greater than 0".into(),
            ));
        }

        if self.max_name_length == 0 {
            return Err(ConfigError::Message(
                "max_name_length must be greater than 0".into(),
            ));
        }

        let minimum = self.min_buffer_size();
        if self.buffer_size < minimum {
            return Err(ConfigError::Message(format!(
                "buffer_size must be at least {minimum} for {} clients with names of up to {} characters",
                self.max_clients, self.max_name_length
            )));
        }

        Ok(())
    }

    /// Smallest buffer that can carry a `/list` reply for a full server
    pub fn min_buffer_size(&self) -> usize {
        LIST_HEADER_ALLOWANCE + self.max_clients * (self.max_name_length + 2)
    }

    /// Get bind address and port as a socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.socket_addr(), "0.0.0.0:9002");
    }

    #[test]
    fn test_min_buffer_size() {
        let config = ServerConfig::default();
        assert_eq!(config.min_buffer_size(), 50 + 10 * 12);
    }

    #[test]
    fn test_rejects_buffer_too_small_for_list() {
        let config = ServerConfig {
            max_clients: 100,
            ..ServerConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("buffer_size must be at least 1250"));
    }

    #[test]
    fn test_rejects_zero_values() {
        let zero_port = ServerConfig {
            port: 0,
            ..ServerConfig::default()
        };
        assert!(zero_port.validate().is_err());

        let zero_clients = ServerConfig {
            max_clients: 0,
            ..ServerConfig::default()
        };
        assert!(zero_clients.validate().is_err());

        let zero_name = ServerConfig {
            max_name_length: 0,
            ..ServerConfig::default()
        };
        assert!(zero_name.validate().is_err());
    }

    #[test]
    fn test_load_reads_toml_file() {
        let dir = std::env::temp_dir().join(format!("chatroom-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("custom.toml");
        std::fs::write(&file, "port = 9100\nmax_clients = 4\n").unwrap();

        let stem = dir.join("custom");
        let config = ServerConfig::load_from(stem.to_str().unwrap()).unwrap();
        assert_eq!(config.port, 9100);
        assert_eq!(config.max_clients, 4);
        assert_eq!(config.max_name_length, DEFAULT_NAME_LENGTH);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = std::env::temp_dir().join(format!("chatroom-bad-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("bad.toml"), "buffer_size = 10\n").unwrap();

        let stem = dir.join("bad");
        assert!(ServerConfig::load_from(stem.to_str().unwrap()).is_err());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
