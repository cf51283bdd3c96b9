//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the interception filter (origin, API prefix)
//! - Check reserved protocol names do not collide with standard headers
//! - Validate value ranges (limits > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use axum::http::{header, HeaderName};
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::config::schema::GatewayConfig;

/// One semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Headers the redirect bridge may not reuse.
fn is_standard_header(name: &HeaderName) -> bool {
    [
        header::ACCEPT,
        header::AUTHORIZATION,
        header::CACHE_CONTROL,
        header::CONTENT_DISPOSITION,
        header::CONTENT_ENCODING,
        header::CONTENT_LENGTH,
        header::CONTENT_TYPE,
        header::COOKIE,
        header::HOST,
        header::LOCATION,
        header::ORIGIN,
        header::REFERER,
        header::REFRESH,
        header::SET_COOKIE,
        header::USER_AGENT,
    ]
    .contains(name)
}

/// Check every semantic rule and report all failures at once.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_origin("worker.origin", &config.worker.origin, &mut errors);

    let prefix = &config.worker.api_prefix;
    if prefix.len() < 2 || !prefix.starts_with('/') || !prefix.ends_with('/') {
        errors.push(ValidationError::new(
            "worker.api_prefix",
            format!("`{}` must start and end with `/` and name a path", prefix),
        ));
    }

    let protocol = &config.protocol;
    if protocol.method_override_field.trim().is_empty() {
        errors.push(ValidationError::new(
            "protocol.method_override_field",
            "must not be empty",
        ));
    }
    if is_standard_header(&protocol.redirect_header) {
        errors.push(ValidationError::new(
            "protocol.redirect_header",
            format!("`{}` is a standard header", protocol.redirect_header),
        ));
    }
    if protocol.redirect_header == protocol.method_override_header {
        errors.push(ValidationError::new(
            "protocol.redirect_header",
            "must differ from protocol.method_override_header",
        ));
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::new("limits.max_body_bytes", "must be > 0"));
    }

    let observability = &config.observability;
    if EnvFilter::try_new(&observability.log_level).is_err() {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("`{}` is not a valid filter", observability.log_level),
        ));
    }
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("`{}` is not a socket address", observability.metrics_address),
        ));
    }

    if !matches!(config.client.base_url.scheme(), "http" | "https") {
        errors.push(ValidationError::new(
            "client.base_url",
            "must be an http(s) URL",
        ));
    }
    if config.client.timeout_secs == 0 {
        errors.push(ValidationError::new("client.timeout_secs", "must be > 0"));
    }

    if config.devhost.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "devhost.bind_address",
            format!("`{}` is not a socket address", config.devhost.bind_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_origin(field: &str, origin: &Url, errors: &mut Vec<ValidationError>) {
    if !matches!(origin.scheme(), "http" | "https") || !origin.has_host() {
        errors.push(ValidationError::new(field, "must be an http(s) URL with a host"));
    }
    if origin.path() != "/" || origin.query().is_some() || origin.fragment().is_some() {
        errors.push(ValidationError::new(field, "must not carry a path, query or fragment"));
    }
}
