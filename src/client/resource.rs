//! Client data that may not have resolved yet.

use std::fmt;

/// A value that is either still loading or ready.
///
/// Pending values render as empty text, so a view can display a resource
/// before it resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource<T> {
    Pending,
    Ready(T),
}

impl<T> Resource<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Resource::Pending)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Resource::Ready(_))
    }

    pub fn as_ref(&self) -> Resource<&T> {
        match self {
            Resource::Pending => Resource::Pending,
            Resource::Ready(value) => Resource::Ready(value),
        }
    }

    pub fn ready(self) -> Option<T> {
        match self {
            Resource::Pending => None,
            Resource::Ready(value) => Some(value),
        }
    }

    pub fn get(&self) -> Option<&T> {
        self.as_ref().ready()
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Resource<U> {
        match self {
            Resource::Pending => Resource::Pending,
            Resource::Ready(value) => Resource::Ready(f(value)),
        }
    }

    pub fn unwrap_or(self, default: T) -> T {
        self.ready().unwrap_or(default)
    }

    /// Resolve a pending resource. A ready one keeps its value.
    pub fn resolve(&mut self, value: T) {
        if self.is_pending() {
            *self = Resource::Ready(value);
        }
    }
}

impl<T: Default> Resource<T> {
    pub fn unwrap_or_default(self) -> T {
        self.ready().unwrap_or_default()
    }
}

impl Resource<String> {
    /// Text of the resource; empty while pending.
    pub fn as_str(&self) -> &str {
        self.get().map(String::as_str).unwrap_or("")
    }
}

impl<T> Default for Resource<T> {
    fn default() -> Self {
        Resource::Pending
    }
}

impl<T> From<Option<T>> for Resource<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Resource::Ready(value),
            None => Resource::Pending,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Resource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Pending => Ok(()),
            Resource::Ready(value) => fmt::Display::fmt(value, f),
        }
    }
}
