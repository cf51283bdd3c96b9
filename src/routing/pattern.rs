//! Route pattern compilation, matching and building.
//!
//! # Responsibilities
//! - Parse `/todos/:id` style templates with an optional trailing `*rest`
//! - Match a concrete path and extract parameter values
//! - Build a concrete path (and query string) from parameter values
//!
//! # Design Decisions
//! - Compiled once into segments; matching is a single linear pass
//! - Static segments match case-sensitively, no trailing-slash tolerance
//! - Values are percent-encoded on build and decoded on match, so
//!   `matches(build(params)) == params` for every non-empty value set
//! - `.` and `..` are refused as values; a URL parser would fold them away
//! - No regex in the hot path

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

use crate::routing::RouteError;

/// Parameter values keyed by name.
pub type RouteParams = BTreeMap<String, String>;

/// Build a `RouteParams` from `(name, value)` pairs.
pub fn params<I, K, V>(pairs: I) -> RouteParams
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Characters escaped inside a single path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
    /// Trailing wildcard; unnamed wildcards are matched but not captured.
    Wildcard(Option<String>),
}

/// A compiled path template.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    source: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Compile a pattern.
    pub fn parse(source: &str) -> Result<Self, RouteError> {
        let invalid = |reason: &str| RouteError::InvalidPattern {
            pattern: source.to_string(),
            reason: reason.to_string(),
        };

        let Some(rest) = source.strip_prefix('/') else {
            return Err(invalid("must start with `/`"));
        };
        if source.contains(&['?', '#'][..]) {
            return Err(invalid("query and fragment are not part of a pattern"));
        }

        let raw: Vec<&str> = rest.split('/').collect();
        let mut segments = Vec::with_capacity(raw.len());
        let mut seen = HashSet::new();

        for (index, part) in raw.iter().enumerate() {
            let segment = if let Some(name) = part.strip_prefix(':') {
                if !is_identifier(name) {
                    return Err(invalid("parameter names must be non-empty [A-Za-z0-9_]"));
                }
                Segment::Param(name.to_string())
            } else if let Some(name) = part.strip_prefix('*') {
                if index + 1 != raw.len() {
                    return Err(invalid("a wildcard must be the last segment"));
                }
                if name.is_empty() {
                    Segment::Wildcard(None)
                } else if is_identifier(name) {
                    Segment::Wildcard(Some(name.to_string()))
                } else {
                    return Err(invalid("wildcard names must be [A-Za-z0-9_]"));
                }
            } else {
                Segment::Static(part.to_string())
            };

            if let Segment::Param(name) | Segment::Wildcard(Some(name)) = &segment {
                if !seen.insert(name.clone()) {
                    return Err(invalid("duplicate parameter name"));
                }
            }
            segments.push(segment);
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Names of every captured parameter, in pattern order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Param(name) | Segment::Wildcard(Some(name)) => Some(name.as_str()),
            _ => None,
        })
    }

    pub fn has_params(&self) -> bool {
        self.param_names().next().is_some()
    }

    /// Match a concrete path, returning the captured parameters.
    pub fn matches(&self, path: &str) -> Option<RouteParams> {
        let rest = path.strip_prefix('/')?;
        let parts: Vec<&str> = rest.split('/').collect();
        let mut params = RouteParams::new();

        for (index, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Wildcard(name) => {
                    let tail = parts.get(index..).unwrap_or_default();
                    if let Some(name) = name {
                        let decoded = tail
                            .iter()
                            .map(|part| decode(part))
                            .collect::<Option<Vec<_>>>()?;
                        params.insert(name.clone(), decoded.join("/"));
                    }
                    return Some(params);
                }
                Segment::Static(expected) => {
                    if parts.get(index) != Some(&expected.as_str()) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let part = parts.get(index).filter(|part| !part.is_empty())?;
                    params.insert(name.clone(), decode(part)?);
                }
            }
        }

        (parts.len() == self.segments.len()).then_some(params)
    }

    /// Build a concrete path from parameter values.
    ///
    /// Every `:name` needs a non-empty value and a named wildcard needs a
    /// value (possibly empty). Values for names the pattern does not declare
    /// are ignored. A value (or wildcard piece) of `.` or `..` is rejected:
    /// URL resolution would collapse it and retarget the request.
    pub fn build(&self, params: &RouteParams) -> Result<String, RouteError> {
        let mut path = String::with_capacity(self.source.len());
        for segment in &self.segments {
            path.push('/');
            match segment {
                Segment::Static(text) => path.push_str(text),
                Segment::Param(name) => {
                    let value = params
                        .get(name)
                        .filter(|value| !value.is_empty())
                        .ok_or_else(|| self.missing(name))?;
                    if is_dot_segment(value) {
                        return Err(self.invalid_value(name));
                    }
                    path.extend(utf8_percent_encode(value, SEGMENT));
                }
                Segment::Wildcard(Some(name)) => {
                    let value = params.get(name).ok_or_else(|| self.missing(name))?;
                    if value.split('/').any(is_dot_segment) {
                        return Err(self.invalid_value(name));
                    }
                    let encoded: Vec<String> = value
                        .split('/')
                        .map(|piece| utf8_percent_encode(piece, SEGMENT).to_string())
                        .collect();
                    path.push_str(&encoded.join("/"));
                }
                Segment::Wildcard(None) => {}
            }
        }
        Ok(path)
    }

    /// Build a path and append `query` as a urlencoded query string.
    pub fn href(&self, params: &RouteParams, query: &[(String, String)]) -> Result<String, RouteError> {
        let mut href = self.build(params)?;
        if !query.is_empty() {
            let encoded = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(query)
                .finish();
            href.push('?');
            href.push_str(&encoded);
        }
        Ok(href)
    }

    fn missing(&self, param: &str) -> RouteError {
        RouteError::MissingParam {
            pattern: self.source.clone(),
            param: param.to_string(),
        }
    }

    fn invalid_value(&self, param: &str) -> RouteError {
        RouteError::InvalidParam {
            pattern: self.source.clone(),
            param: param.to_string(),
        }
    }
}

impl PartialEq for RoutePattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for RoutePattern {}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_dot_segment(value: &str) -> bool {
    matches!(value, "." | "..")
}

fn decode(part: &str) -> Option<String> {
    percent_decode_str(part)
        .decode_utf8()
        .ok()
        .map(|value| value.into_owned())
}
