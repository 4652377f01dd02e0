use std::env::var;
use std::str::FromStr;

use secrecy::Secret;

/// Two weeks, in seconds.
const DEFAULT_SESSION_TTL: i64 = 60 * 60 * 24 * 14;

#[derive(thiserror::Error, Debug)]
pub enum ConfigurationError {
    #[error("{0} environment variable is mandatory")]
    Missing(&'static str),
    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

/// # Application configuration
#[derive(Debug, Clone)]
pub struct Settings {
    /// Address the HTTP server binds to
    pub listen_on: String,
    pub database_url: String,
    /// Key used to sign session cookies
    pub session_secret: Secret<String>,
    pub session_ttl_seconds: i64,
    pub secure_cookies: bool,
    /// Maximum number of news displayed on the home page
    pub news_count_on_home_page: i64,
    /// Optional JSON file of news loaded at startup
    pub fixtures: Option<String>,
    /// Interval, in milliseconds, after which one request of the quota is replenished
    pub rate_limiting_period_ms: u64,
    pub rate_limiting_burst_size: u32,
}

impl Settings {
    /// Read the configuration from the environment
    pub fn from_env() -> Result<Self, ConfigurationError> {
        let session_secret = var("SESSION_SECRET")
            .map(Secret::new)
            .map_err(|_| ConfigurationError::Missing("SESSION_SECRET"))?;

        Ok(Settings {
            listen_on: var("YANEWS_LISTEN_ON").unwrap_or_else(|_| String::from("0.0.0.0:8080")),
            database_url: var("DATABASE_URL")
                .unwrap_or_else(|_| String::from("sqlite://yanews.db?mode=rwc")),
            session_secret,
            session_ttl_seconds: parse_or("SESSION_TTL_SECONDS", DEFAULT_SESSION_TTL)?,
            secure_cookies: parse_or("SESSION_COOKIE_SECURE", false)?,
            news_count_on_home_page: parse_or("NEWS_COUNT_ON_HOME_PAGE", 10)?,
            fixtures: var("YANEWS_FIXTURES").ok(),
            rate_limiting_period_ms: parse_or("RATE_LIMITING_PERIOD_MS", 100)?,
            rate_limiting_burst_size: parse_or("RATE_LIMITING_BURST_SIZE", 100)?,
        })
    }

    /// Settings suited for tests and local tinkering, everything but the secret is defaulted
    pub fn with_secret(secret: &str) -> Self {
        Settings {
            listen_on: String::from("127.0.0.1:0"),
            database_url: String::from("sqlite::memory:"),
            session_secret: Secret::new(secret.to_owned()),
            session_ttl_seconds: DEFAULT_SESSION_TTL,
            secure_cookies: false,
            news_count_on_home_page: 10,
            fixtures: None,
            rate_limiting_period_ms: 100,
            rate_limiting_burst_size: 100,
        }
    }
}

/// Output format of the log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format {}", other)),
        }
    }
}

/// Where spans are exported, besides the logs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Telemetry {
    Disabled,
    Jaeger,
    Datadog { agent: String },
}

/// # Logging configuration
///
/// Read apart from [`Settings`] since logging has to be up before the rest of the
/// configuration can be reported.
#[derive(Debug, Clone)]
pub struct LoggingSettings {
    /// `EnvFilter` directives
    pub filter: String,
    pub format: LogFormat,
    pub telemetry: Telemetry,
}

impl LoggingSettings {
    pub fn from_env(default_filter: &str) -> Self {
        let format = var("LOG_FORMAT")
            .ok()
            .and_then(|format| format.parse().ok())
            .unwrap_or(LogFormat::Text);

        LoggingSettings {
            filter: var("RUST_LOG").unwrap_or_else(|_| default_filter.to_owned()),
            format,
            telemetry: telemetry(
                var("JAEGER_ENABLED").is_ok(),
                var("DD_ENABLED").is_ok(),
                var("DD_AGENT").ok(),
            ),
        }
    }
}

/// Datadog wins when both exporters are enabled
fn telemetry(jaeger_enabled: bool, datadog_enabled: bool, agent: Option<String>) -> Telemetry {
    if datadog_enabled {
        Telemetry::Datadog {
            agent: agent.unwrap_or_else(|| String::from("http://127.0.0.1:8126")),
        }
    } else if jaeger_enabled {
        Telemetry::Jaeger
    } else {
        Telemetry::Disabled
    }
}

fn parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigurationError> {
    match var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigurationError::Invalid(name, value)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use speculoos::prelude::*;

    use super::*;

    #[test]
    fn defaults_everything_but_the_secret() {
        let settings = Settings::with_secret("not so secret");

        assert_that(&settings.news_count_on_home_page).is_equal_to(10);
        assert_that(&settings.session_ttl_seconds).is_equal_to(1_209_600);
        assert_that(&settings.secure_cookies).is_false();
        assert_that(&settings.fixtures).is_none();
    }

    #[test]
    fn rejects_garbage_numbers() {
        std::env::set_var("YANEWS_TEST_GARBAGE", "ten");

        let result = parse_or::<i64>("YANEWS_TEST_GARBAGE", 10);

        assert!(matches!(
            result,
            Err(ConfigurationError::Invalid("YANEWS_TEST_GARBAGE", _))
        ));
    }

    #[test]
    fn log_format_is_case_insensitive() {
        assert_that(&"JSON".parse::<LogFormat>()).is_equal_to(Ok(LogFormat::Json));
        assert_that(&" text ".parse::<LogFormat>()).is_equal_to(Ok(LogFormat::Text));
        assert_that(&"xml".parse::<LogFormat>().is_err()).is_true();
    }

    #[test]
    fn datadog_is_preferred_over_jaeger() {
        assert_that(&telemetry(true, true, None)).is_equal_to(Telemetry::Datadog {
            agent: String::from("http://127.0.0.1:8126"),
        });
        assert_that(&telemetry(true, false, Some(String::from("http://agent:8126"))))
            .is_equal_to(Telemetry::Jaeger);
        assert_that(&telemetry(false, false, None)).is_equal_to(Telemetry::Disabled);
    }

    #[test]
    fn falls_back_on_default() {
        let result = parse_or::<u64>("YANEWS_TEST_SURELY_UNSET", 42);

        assert_that(&result.ok()).is_equal_to(Some(42));
    }
}
