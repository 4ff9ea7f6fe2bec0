use crate::error::{Error, Result};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbDriver {
    Postgres,
    MySql,
}

impl DbDriver {
    fn default_port(self) -> &'static str {
        match self {
            DbDriver::Postgres => "5432",
            DbDriver::MySql => "3306",
        }
    }
}

impl std::str::FromStr for DbDriver {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(DbDriver::Postgres),
            "mysql" => Ok(DbDriver::MySql),
            other => Err(format!("unsupported database driver: {}", other)),
        }
    }
}

impl std::fmt::Display for DbDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DbDriver::Postgres => f.write_str("postgres"),
            DbDriver::MySql => f.write_str("mysql"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub env: String,
    pub port: u16,
    pub database_url: Option<String>,
    pub db_driver: DbDriver,
    pub db_host: String,
    pub db_port: String,
    pub db_user: String,
    pub db_pass: String,
    pub db_name: String,
    pub db_ssl_mode: String,
    pub db_max_open: u32,
    pub db_max_idle: u32,
    pub db_max_lifetime: Duration,
    pub api_key: Option<String>,
    pub log_level: String,
    pub log_format: Option<String>,
    pub metrics_enabled: bool,
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    /// Reads the process environment. A `.env` file in the working directory
    /// is loaded first when present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str, default: &str| -> String {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let db_driver: DbDriver = parse_var("DB_DRIVER", &get("DB_DRIVER", "postgres"))?;
        let db_max_lifetime = humantime::parse_duration(&get("DB_MAX_LIFETIME", "300s"))
            .map_err(|e| Error::Config(format!("Invalid value for DB_MAX_LIFETIME: {}", e)))?;

        Ok(Self {
            env: get("ENV", "local").to_ascii_lowercase(),
            port: parse_var("PORT", &get("PORT", "8080"))?,
            database_url: lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()),
            db_driver,
            db_host: get("DB_HOST", "localhost"),
            db_port: get("DB_PORT", db_driver.default_port()),
            db_user: get("DB_USER", "user"),
            db_pass: get("DB_PASS", "password"),
            db_name: get("DB_NAME", "users_backend"),
            db_ssl_mode: get("DB_SSL_MODE", "disable"),
            db_max_open: parse_var("DB_MAX_OPEN", &get("DB_MAX_OPEN", "25"))?,
            db_max_idle: parse_var("DB_MAX_IDLE", &get("DB_MAX_IDLE", "10"))?,
            db_max_lifetime,
            api_key: lookup("API_KEY").filter(|v| !v.is_empty()),
            log_level: get("LOG_LEVEL", "info"),
            log_format: lookup("LOG_FORMAT").filter(|v| !v.trim().is_empty()),
            metrics_enabled: parse_bool("METRICS_ENABLED", &get("METRICS_ENABLED", "true"))?,
            cors_allowed_origins: get("CORS_ALLOWED_ORIGINS", "")
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        })
    }

    pub fn is_dev(&self) -> bool {
        self.env == "dev" || self.env == "local"
    }

    pub fn is_prod(&self) -> bool {
        self.env == "prod"
    }

    pub fn json_logs(&self) -> bool {
        match self.log_format.as_deref() {
            Some(format) => format.eq_ignore_ascii_case("json"),
            None => self.is_prod(),
        }
    }

    /// Connection string for the configured driver. `DATABASE_URL` wins when set.
    pub fn database_url(&self) -> String {
        if let Some(url) = &self.database_url {
            return url.clone();
        }

        let base = match self.db_driver {
            DbDriver::Postgres => format!(
                "postgres://{}:{}/{}?sslmode={}",
                self.db_host, self.db_port, self.db_name, self.db_ssl_mode
            ),
            DbDriver::MySql => format!(
                "mysql://{}:{}/{}",
                self.db_host, self.db_port, self.db_name
            ),
        };
        with_credentials(base, &self.db_user, &self.db_pass)
    }
}

// Url percent-encodes userinfo, so passwords with `@` or `/` survive.
fn with_credentials(base: String, user: &str, pass: &str) -> String {
    match url::Url::parse(&base) {
        Ok(mut url) => {
            if url.set_username(user).is_err() || url.set_password(Some(pass)).is_err() {
                return base;
            }
            url.to_string()
        }
        Err(_) => base,
    }
}

fn parse_var<T>(name: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e)))
}

fn parse_bool(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(Error::Config(format!(
            "Invalid value for {}: {}",
            name, other
        ))),
    }
}
