//! Logging setup and the configuration self-check report.

use std::io;

use serde_json::{Value, json};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable output for terminals.
    Pretty,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    /// Reads `LOG_FORMAT`: `json` selects JSON, anything else pretty.
    #[must_use]
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("LOG_FORMAT").unwrap_or_default())
    }

    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") { Self::Json } else { Self::Pretty }
    }
}

/// Installs the global subscriber.
///
/// Logs go to stderr so command output on stdout stays machine-readable.
/// Filtering follows `RUST_LOG` and defaults to `info`.
pub fn init_observability(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => {
            subscriber
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_span_events(FmtSpan::CLOSE)
                        .with_writer(io::stderr),
                )
                .init();
        }
        LogFormat::Json => {
            subscriber
                .with(
                    fmt::layer()
                        .json()
                        .with_current_span(true)
                        .with_span_list(true)
                        .with_target(true)
                        .with_span_events(FmtSpan::CLOSE)
                        .with_writer(io::stderr),
                )
                .init();
        }
    }
}

/// Overall outcome of `check`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    /// Every check passed.
    Healthy,
    /// Usable, with warnings.
    Degraded,
    /// At least one check failed.
    Unhealthy,
}

impl HealthStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Unhealthy => "unhealthy",
        }
    }
}

/// Outcome of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthCheckStatus {
    Pass,
    Warn,
    Fail,
}

impl HealthCheckStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Warn => "warn",
            Self::Fail => "fail",
        }
    }
}

/// One named check with an optional detail message.
#[derive(Debug, Clone)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthCheckStatus,
    pub message: Option<String>,
}

impl HealthCheck {
    #[must_use]
    pub fn pass(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self { name: name.into(), status: HealthCheckStatus::Pass, message: Some(message.into()) }
    }

    #[must_use]
    pub fn warn(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self { name: name.into(), status: HealthCheckStatus::Warn, message: Some(message.into()) }
    }

    #[must_use]
    pub fn fail(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self { name: name.into(), status: HealthCheckStatus::Fail, message: Some(message.into()) }
    }
}

/// Report printed by `check`.
#[derive(Debug, Clone)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub version: String,
    pub environment: Option<String>,
    pub checks: Vec<HealthCheck>,
}

impl HealthReport {
    /// Builds a report, deriving the overall status from `checks`.
    #[must_use]
    pub fn new(environment: Option<String>, checks: Vec<HealthCheck>) -> Self {
        Self {
            status: Self::compute_status(&checks),
            version: env!("CARGO_PKG_VERSION").to_owned(),
            environment,
            checks,
        }
    }

    #[must_use]
    pub fn compute_status(checks: &[HealthCheck]) -> HealthStatus {
        if checks.iter().any(|c| c.status == HealthCheckStatus::Fail) {
            HealthStatus::Unhealthy
        } else if checks.iter().any(|c| c.status == HealthCheckStatus::Warn) {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        }
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "status": self.status.as_str(),
            "version": self.version,
            "environment": self.environment,
            "checks": self.checks.iter().map(|c| {
                let mut obj = json!({ "name": c.name, "status": c.status.as_str() });
                if let Some(msg) = &c.message {
                    obj["message"] = Value::String(msg.clone());
                }
                obj
            }).collect::<Vec<_>>(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse(""), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("unknown"), LogFormat::Pretty);
    }

    #[test]
    fn test_health_check_constructors() {
        let check = HealthCheck::fail("private_key", "BRAINTREE_PRIVATE_KEY is not set");
        assert_eq!(check.name, "private_key");
        assert_eq!(check.status, HealthCheckStatus::Fail);
        assert_eq!(check.message.as_deref(), Some("BRAINTREE_PRIVATE_KEY is not set"));
        assert_eq!(HealthCheck::warn("a", "b").status, HealthCheckStatus::Warn);
    }

    #[test]
    fn test_compute_status() {
        assert_eq!(HealthReport::compute_status(&[]), HealthStatus::Healthy);
        assert_eq!(
            HealthReport::compute_status(&[HealthCheck::pass("a", "ok"), HealthCheck::warn("b", "w")]),
            HealthStatus::Degraded
        );
        assert_eq!(
            HealthReport::compute_status(&[HealthCheck::warn("b", "w"), HealthCheck::fail("c", "f")]),
            HealthStatus::Unhealthy
        );
    }

    #[test]
    fn test_report_to_json() {
        let report = HealthReport::new(
            Some("sandbox".to_owned()),
            vec![HealthCheck::pass("configuration", "valid"), HealthCheck::fail("signing", "bad key")],
        );
        let json = report.to_json();

        assert_eq!(json["status"], "unhealthy");
        assert_eq!(json["environment"], "sandbox");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(json["checks"][1]["name"], "signing");
        assert_eq!(json["checks"][1]["status"], "fail");
        assert_eq!(json["checks"][1]["message"], "bad key");
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(HealthStatus::Degraded.as_str(), "degraded");
        assert_eq!(HealthCheckStatus::Pass.as_str(), "pass");
    }
}
