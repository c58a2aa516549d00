use clap::Parser;
use secrecy::SecretString;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Process configuration: environment variables, overridable by flags.
#[derive(Debug, Clone, Parser)]
#[command(name = "grafana-snitch")]
#[command(about = "Keeps Grafana org roles in line with Google Workspace group membership")]
pub struct Config {
    /// The address to listen on for HTTP requests
    #[arg(long, env = "LISTEN_ADDRESS", default_value = "0.0.0.0:4949", value_parser = parse_listen_address)]
    pub listen_address: SocketAddr,

    /// Path to the YAML rules document
    #[arg(long = "config", env = "CONFIG")]
    pub config_path: PathBuf,

    /// Path to the service account's private key file
    /// (see https://developers.google.com/admin-sdk/directory/v1/guides/delegation)
    #[arg(long, env = "GOOGLE_APPLICATION_CREDENTIALS")]
    pub google_admin_config: PathBuf,

    /// Workspace administrator the service account impersonates
    #[arg(long, env = "GOOGLE_ADMIN_EMAIL")]
    pub google_admin_email: String,

    /// Grafana server host
    #[arg(long, env = "GRAFANA_HOST")]
    pub grafana_host: String,

    /// Grafana username
    #[arg(long, env = "GRAFANA_USERNAME")]
    pub grafana_username: String,

    /// Grafana password
    #[arg(long, env = "GRAFANA_PASSWORD", hide_env_values = true, value_parser = parse_secret)]
    pub grafana_password: SecretString,

    /// Time between sync passes, e.g. `3600`, `30s` or `5m`
    #[arg(long, env = "INTERVAL", default_value = "3600", value_parser = parse_interval)]
    pub update_interval: Duration,

    /// Upper bound on a single sync pass
    #[arg(long, env = "SYNC_TIMEOUT", default_value = "300s", value_parser = parse_interval)]
    pub sync_timeout: Duration,

    /// Upper bound on a single HTTP request
    #[arg(long, env = "REQUEST_TIMEOUT", default_value = "10s", value_parser = parse_interval)]
    pub request_timeout: Duration,

    /// How long shutdown waits for in-flight requests and an in-flight pass
    #[arg(long, env = "SHUTDOWN_GRACE", default_value = "10s", value_parser = parse_interval)]
    pub shutdown_grace: Duration,

    /// Log level: `debug`, `info`, `warn`, `error`, `fatal` or `panic`
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log as JSON instead of the default human-readable format
    #[arg(
        long,
        env = "LOG_JSON",
        action = clap::ArgAction::SetTrue,
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub log_json: bool,
}

impl Config {
    /// Load configuration from the environment (and `.env` if present), then flags.
    ///
    /// Exits with usage on missing required values.
    pub fn load() -> Self {
        let _ = dotenvy::dotenv();
        Self::parse()
    }

    /// Target Grafana instance the resolved membership is meant for.
    pub fn grafana_target(&self) -> GrafanaTarget {
        GrafanaTarget {
            host: self.grafana_host.clone(),
            username: self.grafana_username.clone(),
            password: self.grafana_password.clone(),
        }
    }

    /// `tracing` filter directive for the configured log level.
    pub fn log_filter(&self) -> String {
        let level = match self.log_level.to_ascii_lowercase().as_str() {
            "debug" => "debug",
            "warn" => "warn",
            "error" | "fatal" | "panic" => "error",
            _ => "info",
        };
        format!("{level},tower_http={level}")
    }
}

/// Connection parameters for the Grafana instance.
#[derive(Debug, Clone)]
pub struct GrafanaTarget {
    pub host: String,
    pub username: String,
    pub password: SecretString,
}

fn parse_secret(raw: &str) -> Result<SecretString, String> {
    if raw.is_empty() {
        return Err("must not be empty".to_string());
    }
    Ok(SecretString::from(raw.to_string()))
}

/// Accepts `host:port`, or `:port` to listen on every interface.
pub fn parse_listen_address(raw: &str) -> Result<SocketAddr, String> {
    let raw = raw.trim();
    let normalized = match raw.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{port}"),
        None => raw.to_string(),
    };
    normalized
        .parse()
        .map_err(|e: std::net::AddrParseError| format!("invalid listen address {raw:?}: {e}"))
}

/// Bare integers are seconds; anything else goes through humantime (`30s`, `5m`, `1h 30m`).
pub fn parse_interval(raw: &str) -> Result<Duration, String> {
    let raw = raw.trim();
    let duration = match raw.parse::<u64>() {
        Ok(secs) => Duration::from_secs(secs),
        Err(_) => humantime::parse_duration(raw).map_err(|e| e.to_string())?,
    };

    if duration.is_zero() {
        return Err("must be greater than zero".to_string());
    }
    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: [&str; 11] = [
        "grafana-snitch",
        "--config",
        "rules.yaml",
        "--google-admin-config",
        "sa.json",
        "--google-admin-email",
        "admin@co",
        "--grafana-host",
        "grafana.co",
        "--grafana-username",
        "snitch",
    ];

    fn parse(extra: &[&str]) -> Result<Config, clap::Error> {
        let mut args: Vec<&str> = REQUIRED.to_vec();
        args.extend_from_slice(&["--grafana-password", "hunter2"]);
        args.extend_from_slice(extra);
        Config::try_parse_from(args)
    }

    #[test]
    fn interval_accepts_seconds_and_units() {
        assert_eq!(parse_interval("3600").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_interval("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_interval("5m").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_interval("1h 30m").unwrap(), Duration::from_secs(5400));
    }

    #[test]
    fn listen_address_accepts_bare_port() {
        assert_eq!(
            parse_listen_address(":4949").unwrap(),
            "0.0.0.0:4949".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(
            parse_listen_address("127.0.0.1:8080").unwrap(),
            "127.0.0.1:8080".parse::<SocketAddr>().unwrap()
        );
        assert!(parse_listen_address("4949").is_err());

        let config = parse(&["--listen-address", ":9000"]).unwrap();
        assert_eq!(config.listen_address, "0.0.0.0:9000".parse().unwrap());
    }

    #[test]
    fn interval_rejects_zero_and_garbage() {
        assert!(parse_interval("0").is_err());
        assert!(parse_interval("0s").is_err());
        assert!(parse_interval("soon").is_err());
    }

    #[test]
    fn flags_override_defaults() {
        let config = parse(&[
            "--listen-address",
            "127.0.0.1:9000",
            "--update-interval",
            "5m",
            "--log-level",
            "debug",
            "--log-json",
        ])
        .unwrap();

        assert_eq!(config.listen_address, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.update_interval, Duration::from_secs(300));
        assert_eq!(config.log_level, "debug");
        assert!(config.log_json);
        assert_eq!(config.config_path, PathBuf::from("rules.yaml"));
    }

    #[test]
    fn missing_required_value_is_an_error() {
        let args: Vec<&str> = REQUIRED.to_vec();
        // No --grafana-password, and GRAFANA_PASSWORD is not set in tests.
        if std::env::var("GRAFANA_PASSWORD").is_err() {
            assert!(Config::try_parse_from(args).is_err());
        }
    }

    #[test]
    fn password_is_not_printed() {
        let config = parse(&[]).unwrap();
        assert!(!format!("{:?}", config).contains("hunter2"));
    }

    #[test]
    fn fatal_and_panic_levels_map_to_error() {
        let config = parse(&["--log-level", "fatal"]).unwrap();
        assert_eq!(config.log_filter(), "error,tower_http=error");

        let config = parse(&["--log-level", "panic"]).unwrap();
        assert_eq!(config.log_filter(), "error,tower_http=error");
    }
}
