//! Form submission adapter.
//!
//! Binds one mutating route to a reusable submit handle. Browser forms can
//! only POST, so routes declared with another verb carry it in the
//! method-override field and are always sent as POST.

use std::sync::Arc;

use axum::http::Method;

use crate::client::{ApiClient, ClientError, Payload, RouteClient, SendOptions};
use crate::http::FormData;
use crate::navigation::Navigator;
use crate::routing::{RouteDefinition, RouteMethod, RouteParams};

/// Result of a submission.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Completed(Option<Payload>),
    /// The server redirected; the navigator has been told.
    Redirected(String),
}

pub struct FormAction {
    client: RouteClient,
    navigator: Arc<dyn Navigator>,
    override_field: String,
}

impl FormAction {
    pub fn new(
        client: &ApiClient,
        route: &Arc<RouteDefinition>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ClientError> {
        if matches!(route.method(), RouteMethod::Any) || *route.method() == RouteMethod::GET {
            return Err(ClientError::NotAFormRoute(route.key().to_string()));
        }
        Ok(Self {
            client: client.route(route),
            navigator,
            override_field: client.override_field().to_string(),
        })
    }

    pub fn key(&self) -> &str {
        self.client.key()
    }

    /// Submit to a route without path parameters.
    pub async fn submit(&self, form: FormData) -> Result<Submission, ClientError> {
        self.send(RouteParams::new(), form).await
    }

    /// Submit to a parameterized route.
    pub async fn submit_with(&self, params: RouteParams, form: FormData) -> Result<Submission, ClientError> {
        if !self.client.route().pattern().has_params() {
            return Err(ClientError::UnexpectedParams(self.key().to_string()));
        }
        self.send(params, form).await
    }

    async fn send(&self, params: RouteParams, mut form: FormData) -> Result<Submission, ClientError> {
        let method = self.client.route().method().transport_method();
        if method != Method::POST {
            form.set(self.override_field.as_str(), method.as_str());
        }

        let options = SendOptions::new()
            .params(params)
            .form(form)
            .method(Method::POST);

        match self.client.send(options).await {
            Ok(payload) => Ok(Submission::Completed(payload)),
            Err(ClientError::Navigate(signal)) => {
                self.navigator.navigate(&signal.target);
                Ok(Submission::Redirected(signal.target))
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use axum::http::{Request, Response};
    use bytes::Bytes;

    use crate::client::{Fetch, TransportError};
    use crate::config::{ClientConfig, ProtocolConfig};
    use crate::routing::{params, RouteError, RouteRegistry};

    #[derive(Default)]
    struct Recorder {
        requests: Mutex<Vec<Request<Bytes>>>,
        navigations: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Fetch for Recorder {
        async fn fetch(&self, request: Request<Bytes>) -> Result<Response<Bytes>, TransportError> {
            self.requests.lock().unwrap().push(request);
            Ok(Response::builder()
                .header("x-redirect", "/todos")
                .body(Bytes::new())
                .unwrap())
        }
    }

    impl Navigator for Recorder {
        fn navigate(&self, target: &str) {
            self.navigations.lock().unwrap().push(target.to_string());
        }
    }

    fn setup() -> (ApiClient, Arc<Recorder>) {
        let registry = RouteRegistry::builder()
            .client_route("GET", "/api/todos")
            .client_route("ANY", "/api/health")
            .client_route("POST", "/api/todos")
            .client_route("DELETE", "/api/todos/:id")
            .build()
            .unwrap();
        let recorder = Arc::new(Recorder::default());
        let client = ApiClient::new(
            Arc::new(registry),
            recorder.clone(),
            &ClientConfig::default(),
            &ProtocolConfig::default(),
        );
        (client, recorder)
    }

    fn action(client: &ApiClient, recorder: &Arc<Recorder>, key: &str) -> Result<FormAction, ClientError> {
        let route = client.registry().get(key).unwrap().clone();
        FormAction::new(client, &route, recorder.clone())
    }

    #[test]
    fn test_get_and_any_routes_are_rejected() {
        let (client, recorder) = setup();
        assert!(matches!(
            action(&client, &recorder, "/api/todos:GET"),
            Err(ClientError::NotAFormRoute(_))
        ));
        assert!(matches!(
            action(&client, &recorder, "/api/health:ANY"),
            Err(ClientError::NotAFormRoute(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_is_posted_with_override_field() {
        let (client, recorder) = setup();
        let action = action(&client, &recorder, "/api/todos/:id:DELETE").unwrap();
        assert_eq!(action.key(), "/api/todos/:id:DELETE");

        let outcome = action
            .submit_with(params([("id", "7")]), FormData::new())
            .await
            .unwrap();
        assert_eq!(outcome, Submission::Redirected("/todos".into()));
        assert_eq!(*recorder.navigations.lock().unwrap(), vec!["/todos"]);

        let requests = recorder.requests.lock().unwrap();
        assert_eq!(requests[0].method(), Method::POST);
        assert_eq!(requests[0].uri().path(), "/api/todos/7");
        let body = String::from_utf8_lossy(requests[0].body());
        assert!(body.contains("name=\"_method\"\r\n\r\nDELETE\r\n"));
    }

    #[tokio::test]
    async fn test_param_misuse_fails_before_transport() {
        let (client, recorder) = setup();

        let create = action(&client, &recorder, "/api/todos:POST").unwrap();
        let err = create
            .submit_with(params([("id", "1")]), FormData::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::UnexpectedParams(_)));

        let destroy = action(&client, &recorder, "/api/todos/:id:DELETE").unwrap();
        let err = destroy.submit(FormData::new()).await.unwrap_err();
        assert!(matches!(err, ClientError::Route(RouteError::MissingParam { .. })));

        assert!(recorder.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_post_route_has_no_override_field() {
        let (client, recorder) = setup();
        let create = action(&client, &recorder, "/api/todos:POST").unwrap();
        let form: FormData = [("title", "milk")].into_iter().collect();
        create.submit(form).await.unwrap();

        let requests = recorder.requests.lock().unwrap();
        let body = String::from_utf8_lossy(requests[0].body());
        assert!(!body.contains("_method"));
        assert!(body.contains("milk"));
    }
}
