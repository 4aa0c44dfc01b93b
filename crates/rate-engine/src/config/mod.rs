use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::pricing::LoanBlend;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub pricing: PricingConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            pricing: PricingConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Locations of the static artifacts plus collaborator settings.
#[derive(Debug, Clone)]
pub struct PricingConfig {
    pub customers_csv: PathBuf,
    pub models_json: PathBuf,
    pub relationship_training_csv: PathBuf,
    pub risk_training_csv: PathBuf,
    pub loan_blend: LoanBlend,
    pub fallback: FallbackConfig,
    pub collaborator_timeout: Duration,
}

impl PricingConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let data_dir = PathBuf::from(env::var("RATES_DATA_DIR").unwrap_or_else(|_| "data".into()));
        let path_or = |key: &str, default: &str| {
            env::var(key)
                .map(PathBuf::from)
                .unwrap_or_else(|_| data_dir.join(default))
        };

        let loan_blend = match env::var("RATES_LOAN_BLEND") {
            Ok(raw) => LoanBlend::from_label(&raw).ok_or(ConfigError::InvalidLoanBlend(raw))?,
            Err(_) => LoanBlend::Primary,
        };

        let timeout_ms = env::var("RATES_COLLABORATOR_TIMEOUT_MS")
            .unwrap_or_else(|_| "10000".to_string())
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidTimeout)?;

        let endpoint = env::var("RATES_FALLBACK_URL")
            .ok()
            .filter(|value| !value.trim().is_empty());
        let api_key = env::var("RATES_FALLBACK_API_KEY")
            .ok()
            .filter(|value| !value.trim().is_empty());

        Ok(Self {
            customers_csv: path_or("RATES_CUSTOMERS_CSV", "customers.csv"),
            models_json: path_or("RATES_MODELS_JSON", "models.json"),
            relationship_training_csv: path_or(
                "RATES_RELATIONSHIP_TRAINING_CSV",
                "training/relationship.csv",
            ),
            risk_training_csv: path_or("RATES_RISK_TRAINING_CSV", "training/risk.csv"),
            loan_blend,
            fallback: FallbackConfig { endpoint, api_key },
            collaborator_timeout: Duration::from_millis(timeout_ms),
        })
    }
}

/// Optional language-model endpoint used when customer records are incomplete.
#[derive(Debug, Clone, Default)]
pub struct FallbackConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidLoanBlend(String),
    InvalidTimeout,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidLoanBlend(value) => write!(
                f,
                "RATES_LOAN_BLEND '{}' must be 'primary' or 'risk_weighted'",
                value
            ),
            ConfigError::InvalidTimeout => {
                write!(f, "RATES_COLLABORATOR_TIMEOUT_MS must be a whole number of milliseconds")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidLoanBlend(_)
            | ConfigError::InvalidTimeout => None,
        }
    }
}
