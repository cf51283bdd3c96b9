//! Client error type.

use axum::http::StatusCode;
use thiserror::Error;

use crate::client::transport::TransportError;
use crate::navigation::NavigationSignal;
use crate::routing::RouteError;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Route(#[from] RouteError),

    #[error("route `{0}` takes no path parameters")]
    UnexpectedParams(String),

    #[error("route `{0}` cannot back a form action")]
    NotAFormRoute(String),

    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    /// The server answered with a redirect; the caller should navigate.
    #[error("{0}")]
    Navigate(NavigationSignal),

    #[error("HTTP {}: {reason}", .status.as_u16())]
    Status { status: StatusCode, reason: String },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ClientError {
    /// The navigation target, when this error carries a redirect.
    pub fn navigation(&self) -> Option<&NavigationSignal> {
        match self {
            ClientError::Navigate(signal) => Some(signal),
            _ => None,
        }
    }
}
