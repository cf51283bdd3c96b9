//! Client-side navigation.
//!
//! # Responsibilities
//! - Carry a bridged redirect target from the transport to the caller
//! - Hand navigations to the embedding router (`Navigator`)
//! - Turn plain (non-POST) form submissions into client navigations
//!
//! # Design Decisions
//! - The router is an injected trait object; nothing here owns UI state
//! - Navigation targets are opaque strings (path plus optional query)

use std::fmt;
use std::sync::Arc;

use axum::http::Method;
use url::Url;

/// A redirect, decoded on the client side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationSignal {
    pub target: String,
}

impl NavigationSignal {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

impl fmt::Display for NavigationSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "navigate to {}", self.target)
    }
}

/// The embedding application's router.
pub trait Navigator: Send + Sync {
    fn navigate(&self, target: &str);
}

/// A form submission as seen by a global submit listener.
#[derive(Debug, Clone)]
pub struct SubmitEvent {
    pub method: Method,
    pub action: Url,
    pub default_prevented: bool,
}

/// What the listener did with a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitDisposition {
    /// The submission became a client navigation; suppress the default.
    PreventDefault,
    /// Left for the browser or another handler.
    Ignore,
}

/// Global submit listener for forms that are not bound to a `FormAction`.
pub struct FormNavigation {
    navigator: Arc<dyn Navigator>,
}

impl FormNavigation {
    pub fn new(navigator: Arc<dyn Navigator>) -> Self {
        Self { navigator }
    }

    pub fn on_submit(&self, event: &SubmitEvent) -> SubmitDisposition {
        if event.method == Method::POST || event.default_prevented {
            return SubmitDisposition::Ignore;
        }
        tracing::debug!(target = %event.action.path(), "Form submission routed to navigator");
        self.navigator.navigate(event.action.path());
        SubmitDisposition::PreventDefault
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl Navigator for Recorder {
        fn navigate(&self, target: &str) {
            self.0.lock().unwrap().push(target.to_string());
        }
    }

    fn event(method: Method, default_prevented: bool) -> SubmitEvent {
        SubmitEvent {
            method,
            action: Url::parse("http://localhost:8080/todos/search?q=milk").unwrap(),
            default_prevented,
        }
    }

    #[test]
    fn test_get_submission_navigates_to_action_path() {
        let recorder = Arc::new(Recorder::default());
        let listener = FormNavigation::new(recorder.clone());

        assert_eq!(
            listener.on_submit(&event(Method::GET, false)),
            SubmitDisposition::PreventDefault
        );
        assert_eq!(*recorder.0.lock().unwrap(), vec!["/todos/search"]);
    }

    #[test]
    fn test_post_and_prevented_submissions_are_ignored() {
        let recorder = Arc::new(Recorder::default());
        let listener = FormNavigation::new(recorder.clone());

        assert_eq!(listener.on_submit(&event(Method::POST, false)), SubmitDisposition::Ignore);
        assert_eq!(listener.on_submit(&event(Method::GET, true)), SubmitDisposition::Ignore);
        assert!(recorder.0.lock().unwrap().is_empty());
    }
}
