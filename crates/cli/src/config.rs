//! Process configuration.
//!
//! Every setting is a command-line flag with an environment-variable
//! fallback, so the same binary runs unchanged from a shell, a container, or
//! a process manager. Parsing is done by `clap`; [`Cli::into_config`] then
//! validates the combination and produces a [`ServiceConfig`].
//!
//! There are no embedded credentials or default storage locations. Durable
//! storage must be requested explicitly with `--database`; volatile storage
//! with `--in-memory`.

use std::path::PathBuf;

use clap::Parser;
use store::StoreBackend;
use thiserror::Error;

/// Command-line interface of the `hookstream` binary.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "hookstream",
    version,
    about = "Receives GitHub push and pull request webhooks and serves them as a queryable event feed."
)]
pub struct Cli {
    /// Address to bind the HTTP listener to.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind the HTTP listener to.
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// SQLite database file for durable event storage (created if absent).
    #[arg(long, env = "EVENTS_DATABASE_PATH")]
    pub database: Option<PathBuf>,

    /// Keep events in process memory only. They are lost on exit.
    #[arg(long, env = "EVENTS_IN_MEMORY")]
    pub in_memory: bool,

    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(long, env = "HOOKSTREAM_DEBUG")]
    pub debug: bool,

    /// OTLP/gRPC collector endpoint; enables span export when set.
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

/// Invalid flag combinations, reported before anything starts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("No event store selected: pass --database <PATH> (or EVENTS_DATABASE_PATH) or --in-memory")]
    NoStoreSelected,

    #[error("--database and --in-memory are mutually exclusive")]
    ConflictingStores,

    #[error("--database must not be empty")]
    EmptyDatabasePath,
}

/// Validated runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// `host:port` for the listener.
    pub bind_addr: String,
    pub backend: StoreBackend,
    /// Log directive used when `RUST_LOG` is not set.
    pub default_log_level: &'static str,
    pub otlp_endpoint: Option<String>,
}

impl Cli {
    /// Validates the parsed flags.
    pub fn into_config(self) -> Result<ServiceConfig, ConfigError> {
        let backend = match (self.database, self.in_memory) {
            (Some(_), true) => return Err(ConfigError::ConflictingStores),
            (Some(path), false) if path.as_os_str().is_empty() => {
                return Err(ConfigError::EmptyDatabasePath)
            }
            (Some(path), false) => StoreBackend::Sqlite(path),
            (None, true) => StoreBackend::InMemory,
            (None, false) => return Err(ConfigError::NoStoreSelected),
        };

        Ok(ServiceConfig {
            bind_addr: format!("{}:{}", self.host, self.port),
            backend,
            default_log_level: if self.debug { "debug" } else { "info" },
            otlp_endpoint: self.otlp_endpoint.filter(|e| !e.trim().is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli() -> Cli {
        Cli {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database: None,
            in_memory: false,
            debug: false,
            otlp_endpoint: None,
        }
    }

    #[test]
    fn flags_parse_into_cli() {
        let parsed = Cli::try_parse_from([
            "hookstream",
            "--host",
            "127.0.0.1",
            "--port",
            "9000",
            "--database",
            "/var/lib/hookstream/events.db",
            "--debug",
        ])
        .unwrap();

        assert_eq!(parsed.host, "127.0.0.1");
        assert_eq!(parsed.port, 9000);
        assert_eq!(
            parsed.database,
            Some(PathBuf::from("/var/lib/hookstream/events.db"))
        );
        assert!(parsed.debug);
    }

    #[test]
    fn database_selects_sqlite_backend() {
        let config = Cli {
            database: Some(PathBuf::from("events.db")),
            ..cli()
        }
        .into_config()
        .unwrap();

        assert_eq!(config.backend, StoreBackend::Sqlite(PathBuf::from("events.db")));
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.default_log_level, "info");
    }

    #[test]
    fn in_memory_selects_memory_backend() {
        let config = Cli {
            in_memory: true,
            debug: true,
            ..cli()
        }
        .into_config()
        .unwrap();

        assert_eq!(config.backend, StoreBackend::InMemory);
        assert_eq!(config.default_log_level, "debug");
    }

    #[test]
    fn a_store_must_be_chosen() {
        assert_eq!(cli().into_config(), Err(ConfigError::NoStoreSelected));
    }

    #[test]
    fn both_stores_conflict() {
        let result = Cli {
            database: Some(PathBuf::from("events.db")),
            in_memory: true,
            ..cli()
        }
        .into_config();

        assert_eq!(result, Err(ConfigError::ConflictingStores));
    }

    #[test]
    fn empty_database_path_is_rejected() {
        let result = Cli {
            database: Some(PathBuf::new()),
            ..cli()
        }
        .into_config();

        assert_eq!(result, Err(ConfigError::EmptyDatabasePath));
    }

    #[test]
    fn blank_otlp_endpoint_disables_export() {
        let config = Cli {
            in_memory: true,
            otlp_endpoint: Some("  ".to_string()),
            ..cli()
        }
        .into_config()
        .unwrap();

        assert_eq!(config.otlp_endpoint, None);
    }
}
