use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgSslMode};

/// Port used when `DB_ADDR` carries no port.
const DEFAULT_DB_PORT: u16 = 5432;

/// A single environment variable that could not be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnvError {
    #[error("environment variable {0} is not given")]
    Missing(&'static str),

    #[error("environment variable {name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Every problem found while reading configuration. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigErrors(Vec<EnvError>);

impl ConfigErrors {
    pub fn errors(&self) -> &[EnvError] {
        &self.0
    }
}

impl fmt::Display for ConfigErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigErrors {}

/// Collects variable lookups so every failure is reported at once.
struct Env<L> {
    lookup: L,
    errors: Vec<EnvError>,
}

impl<L: Fn(&str) -> Option<String>> Env<L> {
    fn new(lookup: L) -> Self {
        Self {
            lookup,
            errors: Vec::new(),
        }
    }

    fn optional(&self, name: &'static str) -> Option<String> {
        (self.lookup)(name).filter(|v| !v.is_empty())
    }

    fn required(&mut self, name: &'static str) -> String {
        self.optional(name).unwrap_or_else(|| {
            self.errors.push(EnvError::Missing(name));
            String::new()
        })
    }

    fn parsed<T>(&mut self, name: &'static str) -> Option<T>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let raw = self.optional(name)?;
        match raw.parse() {
            Ok(value) => Some(value),
            Err(err) => {
                self.errors.push(EnvError::Invalid {
                    name,
                    reason: err.to_string(),
                });
                None
            }
        }
    }

    fn finish<T>(self, value: T) -> Result<T, ConfigErrors> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(ConfigErrors(self.errors))
        }
    }
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Deadline for each character query. Unset means no deadline.
    pub query_timeout: Option<Duration>,
    /// Pool size (default: `10`).
    pub db_max_connections: u32,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var              | Default   |
    /// |----------------------|-----------|
    /// | `HOST`               | `0.0.0.0` |
    /// | `PORT`               | `3000`    |
    /// | `QUERY_TIMEOUT_SECS` | unset     |
    /// | `DB_MAX_CONNECTIONS` | `10`      |
    pub fn from_env() -> Result<Self, ConfigErrors> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigErrors> {
        let mut env = Env::new(lookup);

        let host = env.optional("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = env.parsed("PORT").unwrap_or(3000);
        let query_timeout = env.parsed("QUERY_TIMEOUT_SECS").map(Duration::from_secs);
        let db_max_connections = env.parsed("DB_MAX_CONNECTIONS").unwrap_or(10);

        env.finish(Self {
            host,
            port,
            query_timeout,
            db_max_connections,
        })
    }
}

/// Discrete database connection settings.
#[derive(Clone)]
pub struct DbConnectInfo {
    /// `host` or `host:port`.
    pub addr: String,
    pub name: String,
    pub user: String,
    pub password: String,
    pub ssl_mode: Option<PgSslMode>,
}

impl fmt::Debug for DbConnectInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConnectInfo")
            .field("addr", &self.addr)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"***")
            .field("ssl_mode", &self.ssl_mode)
            .finish()
    }
}

impl DbConnectInfo {
    /// | Env Var       | Required |
    /// |---------------|----------|
    /// | `DB_ADDR`     | yes      |
    /// | `DB_NAME`     | yes      |
    /// | `DB_USER`     | yes      |
    /// | `DB_PASSWORD` | yes      |
    /// | `DB_SSL_MODE` | no       |
    pub fn from_env() -> Result<Self, ConfigErrors> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigErrors> {
        let mut env = Env::new(lookup);

        let addr = env.required("DB_ADDR");
        let name = env.required("DB_NAME");
        let user = env.required("DB_USER");
        let password = env.required("DB_PASSWORD");
        let ssl_mode = env.parsed("DB_SSL_MODE");

        if let Some((_, port)) = addr.rsplit_once(':') {
            if let Err(err) = port.parse::<u16>() {
                env.errors.push(EnvError::Invalid {
                    name: "DB_ADDR",
                    reason: err.to_string(),
                });
            }
        }

        env.finish(Self {
            addr,
            name,
            user,
            password,
            ssl_mode,
        })
    }

    pub fn connect_options(&self) -> PgConnectOptions {
        let (host, port) = match self.addr.rsplit_once(':') {
            Some((host, port)) => (host, port.parse().unwrap_or(DEFAULT_DB_PORT)),
            None => (self.addr.as_str(), DEFAULT_DB_PORT),
        };

        let options = PgConnectOptions::new()
            .host(host)
            .port(port)
            .database(&self.name)
            .username(&self.user)
            .password(&self.password);

        match self.ssl_mode {
            Some(mode) => options.ssl_mode(mode),
            None => options,
        }
    }
}

/// Connection options for the character store.
///
/// `DATABASE_URL` takes precedence; otherwise the discrete `DB_*` variables
/// are read through [`DbConnectInfo`].
pub fn database_options_from_env() -> Result<PgConnectOptions, ConfigErrors> {
    database_options_from_lookup(|name| std::env::var(name).ok())
}

fn database_options_from_lookup(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<PgConnectOptions, ConfigErrors> {
    {
        let mut env = Env::new(&lookup);
        if let Some(options) = env.parsed::<PgConnectOptions>("DATABASE_URL") {
            return Ok(options);
        }
        if !env.errors.is_empty() {
            return Err(ConfigErrors(env.errors));
        }
    }

    DbConnectInfo::from_lookup(lookup).map(|info| info.connect_options())
}
