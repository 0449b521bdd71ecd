use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use crate::error::{AppError, Result};

/// Deployment flavour, selects the default log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Testing,
    Production,
}

impl Environment {
    pub fn default_log_filter(&self) -> &'static str {
        match self {
            Environment::Development => "debug,tower_http=debug,axum=info",
            Environment::Testing => "info,tower_http=info,axum=info",
            Environment::Production => "warn,tower_http=warn,axum=warn",
        }
    }
}

impl FromStr for Environment {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "" | "default" | "development" => Ok(Environment::Development),
            "testing" => Ok(Environment::Testing),
            "production" => Ok(Environment::Production),
            other => Err(AppError::Config(format!("Unknown APP_ENV: {}", other))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub environment: Environment,
    pub pdf_output_dir: PathBuf,
    pub fetch_timeout: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        let environment = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .parse::<Environment>()?;

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT").unwrap_or_else(|_| "5000".to_string());
        let port = port.parse::<u16>().map_err(|e| AppError::Config(format!("Invalid port: {}", e)))?;
        let ip = IpAddr::from_str(&host).map_err(|e| AppError::Config(format!("Invalid host address: {}", e)))?;

        let pdf_output_dir = env::var("PDF_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("static").join("pdfs"));

        let fetch_timeout = env::var("FETCH_TIMEOUT_SECS").unwrap_or_else(|_| "10".to_string());
        let fetch_timeout = fetch_timeout
            .parse::<u64>()
            .map_err(|e| AppError::Config(format!("Invalid FETCH_TIMEOUT_SECS: {}", e)))?;

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            environment,
            pdf_output_dir,
            fetch_timeout: Duration::from_secs(fetch_timeout),
        })
    }

    /// Configuration used by tests: loopback address, temp PDF directory.
    pub fn for_tests() -> Self {
        Config {
            server_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            environment: Environment::Testing,
            pdf_output_dir: env::temp_dir().join("recipe-planner-pdfs"),
            fetch_timeout: Duration::from_secs(2),
        }
    }
}
