use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::grading::{EngineConfig, EngineConfigError};

/// Longest lifetime an access token may be configured with (30 days).
pub const MAX_TOKEN_TTL_MINUTES: i64 = 60 * 24 * 30;

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
    pub database: DatabaseConfig,
    pub grading: GradingConfig,
    pub auth: AuthConfig,
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

        let database_path = env::var("DATABASE_URL")
            .ok()
            .map(|value| value.trim().trim_start_matches("sqlite://").to_string())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        let defaults = EngineConfig::default();
        let engine = EngineConfig {
            max_evaluations_per_subject: parse_var(
                "GRADE_MAX_EVALUATIONS",
                defaults.max_evaluations_per_subject,
            )?,
            attendance_penalty: parse_var("GRADE_ATTENDANCE_PENALTY", defaults.attendance_penalty)?,
            default_extra_points: parse_var("GRADE_EXTRA_POINTS", defaults.default_extra_points)?,
        };
        engine.validate().map_err(|err| ConfigError::InvalidNumber {
            variable: match err {
                EngineConfigError::ZeroCapacity => "GRADE_MAX_EVALUATIONS",
                EngineConfigError::InvalidAttendancePenalty => "GRADE_ATTENDANCE_PENALTY",
                EngineConfigError::InvalidExtraPoints => "GRADE_EXTRA_POINTS",
            },
        })?;
        let all_years_teachers = parse_var("GRADE_ALL_YEARS_TEACHERS", false)?;

        let token_ttl_minutes: i64 = parse_var("AUTH_TOKEN_TTL_MINUTES", 15)?;
        if !(1..=MAX_TOKEN_TTL_MINUTES).contains(&token_ttl_minutes) {
            return Err(ConfigError::InvalidNumber {
                variable: "AUTH_TOKEN_TTL_MINUTES",
            });
        }
        let auth = AuthConfig {
            username: env::var("AUTH_USERNAME").unwrap_or_else(|_| "admin".to_string()),
            password: env::var("AUTH_PASSWORD").unwrap_or_else(|_| "admin".to_string()),
            token_ttl_minutes,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                ansi: environment == AppEnvironment::Development,
                show_targets: environment != AppEnvironment::Production,
            },
            database: DatabaseConfig {
                path: database_path,
            },
            grading: GradingConfig {
                engine,
                all_years_teachers,
            },
            auth,
        })
    }
}

fn parse_var<T: std::str::FromStr>(variable: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(variable) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { variable }),
        _ => Ok(default),
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

/// Tracing controls; colors and targets follow `APP_ENV`.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub ansi: bool,
    pub show_targets: bool,
}

/// SQLite database file; `None` keeps everything in memory.
#[derive(Debug, Clone, Default)]
pub struct DatabaseConfig {
    pub path: Option<PathBuf>,
}

/// Grade engine limits plus the institution-wide bonus policy.
#[derive(Debug, Clone)]
pub struct GradingConfig {
    pub engine: EngineConfig,
    pub all_years_teachers: bool,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
    pub token_ttl_minutes: i64,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { variable: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { variable } => {
                write!(f, "{variable} is not a valid value")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidNumber { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for variable in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "DATABASE_URL",
            "GRADE_MAX_EVALUATIONS",
            "GRADE_ATTENDANCE_PENALTY",
            "GRADE_EXTRA_POINTS",
            "GRADE_ALL_YEARS_TEACHERS",
            "AUTH_USERNAME",
            "AUTH_PASSWORD",
            "AUTH_TOKEN_TTL_MINUTES",
        ] {
            env::remove_var(variable);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert!(config.telemetry.ansi);
        assert_eq!(config.grading.engine, EngineConfig::default());
        assert!(!config.grading.all_years_teachers);
        assert_eq!(config.auth.username, "admin");
        assert_eq!(config.auth.token_ttl_minutes, 15);
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn grading_settings_come_from_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("GRADE_MAX_EVALUATIONS", "4");
        env::set_var("GRADE_ATTENDANCE_PENALTY", "2.5");
        env::set_var("GRADE_EXTRA_POINTS", "1");
        env::set_var("GRADE_ALL_YEARS_TEACHERS", "true");
        env::set_var("DATABASE_URL", "sqlite://gradebook.db");

        let config = AppConfig::load().expect("config loads");

        assert_eq!(config.grading.engine.max_evaluations_per_subject, 4);
        assert_eq!(config.grading.engine.attendance_penalty, 2.5);
        assert_eq!(config.grading.engine.default_extra_points, 1.0);
        assert!(config.grading.all_years_teachers);
        assert_eq!(config.database.path, Some(PathBuf::from("gradebook.db")));
        reset_env();
    }

    #[test]
    fn rejects_invalid_grading_values() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("GRADE_MAX_EVALUATIONS", "0");
        let error = AppConfig::load().expect_err("zero capacity rejected");
        assert_eq!(error.to_string(), "GRADE_MAX_EVALUATIONS is not a valid value");

        reset_env();
        env::set_var("GRADE_ATTENDANCE_PENALTY", "-1");
        assert!(AppConfig::load().is_err());

        for extra in ["NaN", "inf", "-inf"] {
            reset_env();
            env::set_var("GRADE_EXTRA_POINTS", extra);
            let error = AppConfig::load().expect_err("non-finite extra points rejected");
            assert_eq!(error.to_string(), "GRADE_EXTRA_POINTS is not a valid value");
        }
        reset_env();
    }

    #[test]
    fn token_ttl_must_fit_the_allowed_range() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        for ttl in ["0", "-5", "43201", "9223372036854775807"] {
            reset_env();
            env::set_var("AUTH_TOKEN_TTL_MINUTES", ttl);
            let error = AppConfig::load().expect_err("out-of-range ttl rejected");
            assert_eq!(error.to_string(), "AUTH_TOKEN_TTL_MINUTES is not a valid value");
        }

        reset_env();
        env::set_var("AUTH_TOKEN_TTL_MINUTES", "43200");
        let config = AppConfig::load().expect("thirty days accepted");
        assert_eq!(config.auth.token_ttl_minutes, MAX_TOKEN_TTL_MINUTES);
        reset_env();
    }
}
