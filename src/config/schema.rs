//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files, and
//! every field has a default so an empty file is a valid configuration.

use std::path::PathBuf;

use axum::http::HeaderName;
use serde::{Deserialize, Serialize};
use url::Url;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Interception filter and takeover settings.
    pub worker: WorkerConfig,

    /// Reserved field and header names shared by client and server.
    pub protocol: ProtocolConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Typed client settings.
    pub client: ClientConfig,

    /// Local development host.
    pub devhost: DevhostConfig,
}

/// Network interception settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Page origin; only same-origin requests are intercepted.
    pub origin: Url,

    /// Path prefix claimed by the gateway (e.g., "/api/").
    pub api_prefix: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            origin: default_url(),
            api_prefix: "/api/".to_string(),
        }
    }
}

/// Wire protocol names.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Form field carrying the logical method of a POSTed form.
    pub method_override_field: String,

    /// Header carrying the logical method of a POST request.
    #[serde(with = "header_name")]
    pub method_override_header: HeaderName,

    /// Header carrying a bridged redirect target on a 200 response.
    #[serde(with = "header_name")]
    pub redirect_header: HeaderName,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            method_override_field: "_method".to_string(),
            method_override_header: HeaderName::from_static("x-http-method-override"),
            redirect_header: HeaderName::from_static("x-redirect"),
        }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Largest accepted request body in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Install the request logging stage.
    pub request_logging: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            request_logging: cfg!(debug_assertions),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Typed client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL that built paths are resolved against.
    pub base_url: Url,

    /// Network request timeout for `HttpFetch`.
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_url(),
            timeout_secs: 30,
        }
    }
}

/// Development host configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DevhostConfig {
    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind_address: String,

    /// Directory served for requests the gateway does not claim.
    pub assets_dir: PathBuf,
}

impl Default for DevhostConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            assets_dir: PathBuf::from("public"),
        }
    }
}

fn default_url() -> Url {
    Url::parse("http://localhost:8080/").expect("static default URL is valid")
}

/// Serde adapter for `HeaderName` fields.
mod header_name {
    use axum::http::HeaderName;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(name: &HeaderName, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(name.as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<HeaderName, D::Error> {
        let raw = String::deserialize(deserializer)?;
        HeaderName::from_bytes(raw.as_bytes()).map_err(serde::de::Error::custom)
    }
}
