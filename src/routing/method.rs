//! Route methods.

use std::fmt;
use std::str::FromStr;

use axum::http::Method;

use crate::routing::RouteError;

/// The verb a route is declared with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RouteMethod {
    /// Matches every logical method at dispatch; clients send it as GET.
    Any,
    Exact(Method),
}

impl RouteMethod {
    pub const GET: RouteMethod = RouteMethod::Exact(Method::GET);
    pub const POST: RouteMethod = RouteMethod::Exact(Method::POST);
    pub const PUT: RouteMethod = RouteMethod::Exact(Method::PUT);
    pub const PATCH: RouteMethod = RouteMethod::Exact(Method::PATCH);
    pub const DELETE: RouteMethod = RouteMethod::Exact(Method::DELETE);

    /// Parse one of `GET|POST|PUT|PATCH|DELETE|ANY` (case-insensitive).
    pub fn parse(value: &str) -> Result<Self, RouteError> {
        match value.to_ascii_uppercase().as_str() {
            "ANY" => Ok(RouteMethod::Any),
            "GET" => Ok(Self::GET),
            "POST" => Ok(Self::POST),
            "PUT" => Ok(Self::PUT),
            "PATCH" => Ok(Self::PATCH),
            "DELETE" => Ok(Self::DELETE),
            _ => Err(RouteError::UnsupportedMethod(value.to_string())),
        }
    }

    /// Whether a request with `method` may be dispatched to this route.
    pub fn matches(&self, method: &Method) -> bool {
        match self {
            RouteMethod::Any => true,
            RouteMethod::Exact(expected) => expected == method,
        }
    }

    /// The verb a client uses when nothing overrides it.
    pub fn transport_method(&self) -> Method {
        match self {
            RouteMethod::Any => Method::GET,
            RouteMethod::Exact(method) => method.clone(),
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, RouteMethod::Any)
    }

    pub fn as_str(&self) -> &str {
        match self {
            RouteMethod::Any => "ANY",
            RouteMethod::Exact(method) => method.as_str(),
        }
    }
}

impl FromStr for RouteMethod {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<Method> for RouteMethod {
    type Error = RouteError;

    fn try_from(method: Method) -> Result<Self, Self::Error> {
        Self::parse(method.as_str())
    }
}

impl fmt::Display for RouteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_supported_verbs() {
        assert_eq!(RouteMethod::parse("delete").unwrap(), RouteMethod::DELETE);
        assert_eq!(RouteMethod::parse("ANY").unwrap(), RouteMethod::Any);
        assert!(matches!(
            RouteMethod::parse("HEAD"),
            Err(RouteError::UnsupportedMethod(_))
        ));
    }

    #[test]
    fn test_any_matches_everything_and_sends_get() {
        assert!(RouteMethod::Any.matches(&Method::DELETE));
        assert_eq!(RouteMethod::Any.transport_method(), Method::GET);
        assert!(!RouteMethod::POST.matches(&Method::GET));
    }
}
