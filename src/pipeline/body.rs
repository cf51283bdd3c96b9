//! Body normalization stage.
//!
//! Raw bodies are parsed once, up front, according to `Content-Type`:
//! url-encoded and multipart forms become `RequestBody::Form`, JSON becomes
//! `RequestBody::Json`, anything else stays raw.

use async_trait::async_trait;
use axum::http::{header, StatusCode};

use crate::http::{FormData, GatewayRequest, GatewayResponse, RequestBody};
use crate::pipeline::{Middleware, Next};

const URLENCODED: &str = "application/x-www-form-urlencoded";
const MULTIPART: &str = "multipart/form-data";
const JSON: &str = "application/json";

pub struct BodyNormalization {
    max_body_bytes: usize,
}

impl BodyNormalization {
    pub fn new(max_body_bytes: usize) -> Self {
        Self { max_body_bytes }
    }

    async fn normalize(&self, request: GatewayRequest) -> Result<GatewayRequest, GatewayResponse> {
        let RequestBody::Raw(bytes) = request.body() else {
            return Ok(request);
        };
        let bytes = bytes.clone();

        if bytes.len() > self.max_body_bytes {
            tracing::warn!(
                path = %request.path(),
                size = bytes.len(),
                limit = self.max_body_bytes,
                "Request body too large"
            );
            return Err(GatewayResponse::text(
                StatusCode::PAYLOAD_TOO_LARGE,
                "Payload Too Large",
            ));
        }

        let Some(media_type) = request.content_type() else {
            return Ok(request);
        };

        let body = if media_type == URLENCODED {
            RequestBody::Form(FormData::from_urlencoded(&bytes))
        } else if media_type == MULTIPART {
            let Some(content_type) = request.headers().get(header::CONTENT_TYPE).cloned() else {
                return Ok(request);
            };
            match FormData::from_multipart(&content_type, bytes, self.max_body_bytes).await {
                Ok(form) => RequestBody::Form(form),
                Err(e) => {
                    tracing::warn!(path = %request.path(), error = %e, "Malformed multipart body");
                    return Err(GatewayResponse::bad_request());
                }
            }
        } else if media_type == JSON || media_type.ends_with("+json") {
            match serde_json::from_slice(&bytes) {
                Ok(value) => RequestBody::Json(value),
                Err(e) => {
                    tracing::warn!(path = %request.path(), error = %e, "Malformed JSON body");
                    return Err(GatewayResponse::bad_request());
                }
            }
        } else {
            return Ok(request);
        };

        Ok(request.with_body(body))
    }
}

#[async_trait]
impl Middleware for BodyNormalization {
    fn name(&self) -> &'static str {
        "body"
    }

    async fn handle(&self, request: GatewayRequest, next: Next<'_>) -> GatewayResponse {
        match self.normalize(request).await {
            Ok(request) => next.run(request).await,
            Err(response) => response,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, Method, Uri};
    use bytes::Bytes;

    use crate::http::FormValue;

    fn post(content_type: &'static str, body: &'static [u8]) -> GatewayRequest {
        GatewayRequest::new(Method::POST, Uri::from_static("/api/todos"))
            .with_header(header::CONTENT_TYPE, HeaderValue::from_static(content_type))
            .with_body(RequestBody::Raw(Bytes::from_static(body)))
    }

    async fn normalize(request: GatewayRequest) -> Result<GatewayRequest, GatewayResponse> {
        BodyNormalization::new(1024).normalize(request).await
    }

    #[tokio::test]
    async fn test_urlencoded_becomes_form() {
        let request = normalize(post(URLENCODED, b"title=Buy+milk&_method=PATCH"))
            .await
            .unwrap();
        let form = request.form().unwrap();
        assert_eq!(form.get_text("title"), Some("Buy milk"));
        assert_eq!(form.get_text("_method"), Some("PATCH"));
    }

    #[tokio::test]
    async fn test_multipart_becomes_form() {
        let mut form = FormData::new();
        form.append("title", "Buy milk");
        form.append(
            "attachment",
            FormValue::File {
                file_name: Some("list.txt".into()),
                content_type: Some("text/plain".into()),
                bytes: Bytes::from_static(b"milk\neggs"),
            },
        );
        let body = form.to_multipart("XyZ");

        let request = GatewayRequest::new(Method::POST, Uri::from_static("/api/todos"))
            .with_header(
                header::CONTENT_TYPE,
                HeaderValue::from_static("multipart/form-data; boundary=XyZ"),
            )
            .with_body(RequestBody::Raw(body));

        let request = normalize(request).await.unwrap();
        assert_eq!(request.form(), Some(&form));
    }

    #[tokio::test]
    async fn test_large_multipart_within_limit_becomes_form() {
        let mut form = FormData::new();
        form.append(
            "attachment",
            FormValue::File {
                file_name: Some("scan.pdf".into()),
                content_type: Some("application/pdf".into()),
                bytes: Bytes::from(vec![0u8; 3 * 1024 * 1024]),
            },
        );
        let request = GatewayRequest::new(Method::POST, Uri::from_static("/api/todos"))
            .with_header(
                header::CONTENT_TYPE,
                HeaderValue::from_static("multipart/form-data; boundary=XyZ"),
            )
            .with_body(RequestBody::Raw(form.to_multipart("XyZ")));

        let request = BodyNormalization::new(10 * 1024 * 1024)
            .normalize(request)
            .await
            .unwrap();
        assert_eq!(request.form(), Some(&form));
    }

    #[tokio::test]
    async fn test_json_variants() {
        let request = normalize(post("application/json", br#"{"title":"x"}"#)).await.unwrap();
        assert_eq!(request.json().unwrap()["title"], "x");

        let request = normalize(post("application/merge-patch+json", br#"{"done":true}"#))
            .await
            .unwrap();
        assert_eq!(request.json().unwrap()["done"], true);
    }

    #[tokio::test]
    async fn test_malformed_json_is_400() {
        let response = normalize(post("application/json", b"{not json")).await.unwrap_err();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_oversized_body_is_413() {
        let response = BodyNormalization::new(4)
            .normalize(post("text/plain", b"too long"))
            .await
            .unwrap_err();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_other_content_stays_raw() {
        let request = normalize(post("text/plain", b"hello")).await.unwrap();
        assert_eq!(
            request.body(),
            &RequestBody::Raw(Bytes::from_static(b"hello"))
        );
    }
}
