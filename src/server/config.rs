//! Server configuration
//!
//! Layers built-in defaults, an optional `config.toml`, `ACTIVE_FTPD_*`
//! environment variables and command-line flags.

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

use crate::error::FtpServerError;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_CONTROL_PORT: u16 = 20001;
const DEFAULT_CONFIG_FILE: &str = "config";
const ENV_PREFIX: &str = "ACTIVE_FTPD";

/// Command-line arguments
#[derive(Parser, Debug, Default)]
#[command(name = "active-ftpd", about = "A minimal active-mode FTP server.")]
pub struct Cli {
    /// Port for the control connection listener
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Path to the configuration file (without extension works too)
    #[arg(short, long)]
    pub config: Option<String>,
}

/// Server configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// IPv4 address the control listener binds to
    pub bind_address: String,

    /// Port for the control connection
    pub control_port: u16,

    /// Initial working directory of every session; defaults to the
    /// process's current directory
    #[serde(default)]
    pub working_dir: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            control_port: DEFAULT_CONTROL_PORT,
            working_dir: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration, letting `cli` override file and environment.
    pub fn load(cli: &Cli) -> Result<Self, FtpServerError> {
        let file = match &cli.config {
            Some(path) => File::with_name(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings = Config::builder()
            .set_default("bind_address", DEFAULT_BIND_ADDRESS)?
            .set_default("control_port", i64::from(DEFAULT_CONTROL_PORT))?
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let mut config: ServerConfig = settings.try_deserialize()?;
        if let Some(port) = cli.port {
            config.control_port = port;
        }
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.control_port == 0 {
            return Err(config::ConfigError::Message(
                "Control port cannot be 0".into(),
            ));
        }

        if self.bind_address.parse::<std::net::Ipv4Addr>().is_err() {
            return Err(config::ConfigError::Message(format!(
                "bind_address must be an IPv4 address, got {:?}",
                self.bind_address
            )));
        }

        if matches!(&self.working_dir, Some(dir) if dir.is_empty()) {
            return Err(config::ConfigError::Message(
                "working_dir cannot be empty".into(),
            ));
        }

        Ok(())
    }

    /// Get bind address and control port as socket address
    pub fn control_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.control_port)
    }

    /// Resolve the directory new sessions start in.
    ///
    /// Read once at startup; relative paths are made absolute against the
    /// current directory.
    pub fn initial_working_dir(&self) -> std::io::Result<PathBuf> {
        let cwd = std::env::current_dir()?;
        Ok(match &self.working_dir {
            Some(dir) => cwd.join(dir),
            None => cwd,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.control_socket(), "0.0.0.0:20001");
    }

    #[test]
    fn rejects_bad_values() {
        let config = ServerConfig {
            control_port: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ServerConfig {
            bind_address: "localhost".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn working_dir_is_absolute() {
        let config = ServerConfig {
            working_dir: Some("pub".into()),
            ..Default::default()
        };
        let dir = config.initial_working_dir().unwrap();
        assert!(dir.is_absolute());
        assert!(dir.ends_with("pub"));

        let config = ServerConfig {
            working_dir: Some("/srv/ftp".into()),
            ..Default::default()
        };
        assert_eq!(config.initial_working_dir().unwrap(), PathBuf::from("/srv/ftp"));
    }

    #[test]
    fn explicit_config_file_and_port_flag() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ftpd.toml");
        std::fs::write(&path, "bind_address = \"127.0.0.1\"\ncontrol_port = 2121\n").unwrap();

        let cli = Cli {
            port: None,
            config: Some(path.to_string_lossy().into_owned()),
        };
        let config = ServerConfig::load(&cli).unwrap();
        assert_eq!(config.control_socket(), "127.0.0.1:2121");

        let cli = Cli {
            port: Some(3030),
            ..cli
        };
        assert_eq!(ServerConfig::load(&cli).unwrap().control_port, 3030);
    }

    #[test]
    fn missing_explicit_config_file_is_an_error() {
        let cli = Cli {
            port: None,
            config: Some("/nonexistent/active-ftpd.toml".into()),
        };
        assert!(ServerConfig::load(&cli).is_err());
    }
}
