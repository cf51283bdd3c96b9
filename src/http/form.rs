//! Browser-style form payloads.
//!
//! # Responsibilities
//! - Ordered, multi-valued field storage with `FormData`-like accessors
//! - Decode `application/x-www-form-urlencoded` and `multipart/form-data` bodies
//! - Encode a form as `multipart/form-data` for outgoing client requests
//!
//! # Design Decisions
//! - Field order is preserved; `set` replaces in place like the browser API
//! - Multipart decoding goes through axum's `Multipart` extractor, with the
//!   caller's size limit in place of axum's default one
//! - Parts with a filename are files, everything else is text

use std::convert::Infallible;

use axum::body::Body;
use axum::extract::{DefaultBodyLimit, FromRequest, Multipart};
use axum::http::{header, HeaderValue, Request};
use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;
use tower::{service_fn, Layer, ServiceExt};

/// Error raised while decoding a form body.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("invalid multipart body: {0}")]
    Multipart(String),
}

/// A single form field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    File {
        file_name: Option<String>,
        content_type: Option<String>,
        bytes: Bytes,
    },
}

impl FormValue {
    /// Text content of the value, `None` for files.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FormValue::Text(text) => Some(text),
            FormValue::File { .. } => None,
        }
    }
}

impl From<&str> for FormValue {
    fn from(value: &str) -> Self {
        FormValue::Text(value.to_string())
    }
}

impl From<String> for FormValue {
    fn from(value: String) -> Self {
        FormValue::Text(value)
    }
}

/// Ordered form fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    entries: Vec<(String, FormValue)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value, keeping any existing values for the same name.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<FormValue>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Replace every value for `name` with a single value.
    ///
    /// The new value takes the position of the first existing entry, or is
    /// appended when the field is absent.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FormValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter().position(|(n, _)| *n == name) {
            Some(first) => {
                self.entries[first].1 = value;
                let mut index = 0;
                self.entries.retain(|(n, _)| {
                    let keep = index <= first || *n != name;
                    index += 1;
                    keep
                });
            }
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FormValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// First text value for `name`.
    pub fn get_text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FormValue::as_text)
    }

    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a FormValue> + 'a {
        self.entries
            .iter()
            .filter(move |(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn remove(&mut self, name: &str) {
        self.entries.retain(|(n, _)| n != name);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FormValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Decode an `application/x-www-form-urlencoded` body.
    pub fn from_urlencoded(body: &[u8]) -> Self {
        url::form_urlencoded::parse(body)
            .map(|(name, value)| (name.into_owned(), value.into_owned()))
            .collect()
    }

    /// Decode a `multipart/form-data` body of at most `limit` bytes.
    ///
    /// `content_type` must carry the boundary parameter.
    pub async fn from_multipart(
        content_type: &HeaderValue,
        body: Bytes,
        limit: usize,
    ) -> Result<Self, FormError> {
        let request = Request::builder()
            .header(header::CONTENT_TYPE, content_type.clone())
            .body(Body::from(body))
            .map_err(|e| FormError::Multipart(e.to_string()))?;

        // The extractor reads its limit from the extension this layer inserts.
        let decode = service_fn(|request: Request<Body>| async move {
            Ok::<_, Infallible>(decode_multipart(request).await)
        });
        let decoder = DefaultBodyLimit::max(limit).layer(decode);
        match decoder.oneshot(request).await {
            Ok(result) => result,
            Err(never) => match never {},
        }
    }

    /// Encode text fields as an `application/x-www-form-urlencoded` string.
    ///
    /// File values are skipped; they cannot be represented in this encoding.
    pub fn to_urlencoded(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (name, value) in self.iter() {
            if let Some(text) = value.as_text() {
                serializer.append_pair(name, text);
            }
        }
        serializer.finish()
    }

    /// Encode as a `multipart/form-data` body delimited by `boundary`.
    pub fn to_multipart(&self, boundary: &str) -> Bytes {
        let mut buf = BytesMut::new();
        for (name, value) in self.iter() {
            buf.put_slice(format!("--{boundary}\r\n").as_bytes());
            match value {
                FormValue::Text(text) => {
                    buf.put_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                            escape_quoted(name)
                        )
                        .as_bytes(),
                    );
                    buf.put_slice(text.as_bytes());
                }
                FormValue::File {
                    file_name,
                    content_type,
                    bytes,
                } => {
                    buf.put_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                            escape_quoted(name),
                            escape_quoted(file_name.as_deref().unwrap_or("blob"))
                        )
                        .as_bytes(),
                    );
                    buf.put_slice(
                        format!(
                            "Content-Type: {}\r\n\r\n",
                            content_type.as_deref().unwrap_or("application/octet-stream")
                        )
                        .as_bytes(),
                    );
                    buf.put_slice(bytes);
                }
            }
            buf.put_slice(b"\r\n");
        }
        buf.put_slice(format!("--{boundary}--\r\n").as_bytes());
        buf.freeze()
    }
}

impl From<Vec<(String, FormValue)>> for FormData {
    fn from(entries: Vec<(String, FormValue)>) -> Self {
        Self { entries }
    }
}

impl<K, V> FromIterator<(K, V)> for FormData
where
    K: Into<String>,
    V: Into<FormValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

async fn decode_multipart(request: Request<Body>) -> Result<FormData, FormError> {
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| FormError::Multipart(e.body_text()))?;

    let mut form = FormData::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| FormError::Multipart(e.body_text()))?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        let file_name = field.file_name().map(str::to_owned);
        let content_type = field.content_type().map(str::to_owned);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| FormError::Multipart(e.body_text()))?;

        let value = match file_name {
            Some(file_name) => FormValue::File {
                file_name: Some(file_name),
                content_type,
                bytes,
            },
            None => FormValue::Text(String::from_utf8_lossy(&bytes).into_owned()),
        };
        form.entries.push((name, value));
    }
    Ok(form)
}

// Browsers percent-escape these inside multipart header parameters.
fn escape_quoted(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMIT: usize = 1024 * 1024;

    fn upload(size: usize) -> FormData {
        let mut form = FormData::new();
        form.append(
            "upload",
            FormValue::File {
                file_name: Some("big.bin".into()),
                content_type: None,
                bytes: Bytes::from(vec![b'x'; size]),
            },
        );
        form
    }

    #[test]
    fn test_set_replaces_all_values_in_place() {
        let mut form: FormData = [("a", "1"), ("b", "2"), ("a", "3")].into_iter().collect();
        form.set("a", "x");

        let fields: Vec<_> = form.iter().map(|(n, v)| (n, v.as_text().unwrap())).collect();
        assert_eq!(fields, vec![("a", "x"), ("b", "2")]);

        form.set("c", "new");
        assert_eq!(form.get_text("c"), Some("new"));
        assert_eq!(form.len(), 3);
    }

    #[test]
    fn test_urlencoded_decoding() {
        let form = FormData::from_urlencoded(b"title=Buy+milk&tag=a&tag=b%26c");
        assert_eq!(form.get_text("title"), Some("Buy milk"));
        let tags: Vec<_> = form.get_all("tag").filter_map(FormValue::as_text).collect();
        assert_eq!(tags, vec!["a", "b&c"]);
        assert_eq!(form.to_urlencoded(), "title=Buy+milk&tag=a&tag=b%26c");
    }

    #[tokio::test]
    async fn test_multipart_text_and_file_fields() {
        let mut form = FormData::new();
        form.append("title", "hello \"world\"");
        form.append(
            "upload",
            FormValue::File {
                file_name: Some("notes.txt".into()),
                content_type: Some("text/plain".into()),
                bytes: Bytes::from_static(b"line one\r\nline two"),
            },
        );

        let body = form.to_multipart("XyZ");
        let content_type = HeaderValue::from_static("multipart/form-data; boundary=XyZ");
        let decoded = FormData::from_multipart(&content_type, body, LIMIT).await.unwrap();

        assert_eq!(decoded.get_text("title"), Some("hello \"world\""));
        match decoded.get("upload") {
            Some(FormValue::File { file_name, bytes, .. }) => {
                assert_eq!(file_name.as_deref(), Some("notes.txt"));
                assert_eq!(bytes.as_ref(), b"line one\r\nline two");
            }
            other => panic!("expected file value, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_multipart_without_boundary_is_rejected() {
        let content_type = HeaderValue::from_static("multipart/form-data");
        let result = FormData::from_multipart(&content_type, Bytes::from_static(b"junk"), LIMIT).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_multipart_larger_than_axum_default_within_limit() {
        let body = upload(3 * 1024 * 1024).to_multipart("XyZ");
        let content_type = HeaderValue::from_static("multipart/form-data; boundary=XyZ");
        let decoded = FormData::from_multipart(&content_type, body, 10 * 1024 * 1024)
            .await
            .unwrap();
        match decoded.get("upload") {
            Some(FormValue::File { bytes, .. }) => assert_eq!(bytes.len(), 3 * 1024 * 1024),
            other => panic!("expected file value, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_multipart_over_limit_is_rejected() {
        let body = upload(4096).to_multipart("XyZ");
        let content_type = HeaderValue::from_static("multipart/form-data; boundary=XyZ");
        let result = FormData::from_multipart(&content_type, body, 1024).await;
        assert!(matches!(result, Err(FormError::Multipart(_))));
    }
}
