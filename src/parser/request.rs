//! HTTP request representation and request-line parsing.

use std::collections::HashMap;
use std::str::FromStr;
use serde::de::DeserializeOwned;

use crate::parser::error::Error;
use crate::parser::method::Method;
use crate::parser::version::HttpVersion;

/// Represents an HTTP request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// The request target, including any query string
    pub path: String,
    /// The HTTP version
    pub version: HttpVersion,
    /// The HTTP headers
    pub headers: HashMap<String, String>,
    /// The request body
    pub body: Vec<u8>,
    /// Query parameters parsed from the path
    pub query_params: HashMap<String, String>,
}

impl HttpRequest {
    /// Create a new HTTP request with an empty body.
    ///
    /// Query parameters are split out of `path`; the path itself is kept
    /// as given. Routing uses [`HttpRequest::route_path`].
    ///
    /// # Arguments
    ///
    /// * `method` - The HTTP method
    /// * `path` - The request target, query string included
    /// * `version` - The HTTP version
    /// * `headers` - The HTTP headers
    ///
    /// # Returns
    ///
    /// A new HTTP request with an empty body
    pub fn new(method: Method, path: String, version: HttpVersion, headers: HashMap<String, String>) -> Self {
        let query_params = path
            .split_once('?')
            .map(|(_, query)| parse_query(query))
            .unwrap_or_default();

        Self {
            method,
            path,
            version,
            headers,
            body: Vec::new(),
            query_params,
        }
    }

    /// Create a new HTTP request with a body.
    ///
    /// # Arguments
    ///
    /// * `method` - The HTTP method
    /// * `path` - The request target, query string included
    /// * `version` - The HTTP version
    /// * `headers` - The HTTP headers
    /// * `body` - The request body, already cut to `Content-Length`
    ///
    /// # Returns
    ///
    /// A new HTTP request with the specified body
    pub fn with_body(method: Method, path: String, version: HttpVersion, headers: HashMap<String, String>, body: Vec<u8>) -> Self {
        let mut request = Self::new(method, path, version, headers);
        request.body = body;
        request
    }

    /// Add or replace a header, builder style.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// The path without its query string. This is what routes match against.
    pub fn route_path(&self) -> &str {
        match self.path.split_once('?') {
            Some((path, _)) => path,
            None => &self.path,
        }
    }

    /// Get a header value.
    ///
    /// # Arguments
    ///
    /// * `name` - The header name, matched case-insensitively
    ///
    /// # Returns
    ///
    /// The header value, if it exists
    pub fn get_header(&self, name: &str) -> Option<&String> {
        self.headers.iter().find_map(|(k, v)| {
            if k.eq_ignore_ascii_case(name) {
                Some(v)
            } else {
                None
            }
        })
    }

    /// Check if a header exists.
    pub fn has_header(&self, name: &str) -> bool {
        self.get_header(name).is_some()
    }

    /// The media type of the body, without parameters, lowercased.
    pub fn content_type(&self) -> Option<String> {
        self.get_header("Content-Type").map(|value| media_essence(value))
    }

    /// Check whether the body is declared as `media_type`. Parameters such as
    /// `charset` are ignored.
    pub fn has_content_type(&self, media_type: &str) -> bool {
        self.content_type()
            .map(|ct| ct == media_essence(media_type))
            .unwrap_or(false)
    }

    /// Check whether the client accepts `media_type`.
    ///
    /// A missing `Accept` header accepts everything. Wildcards (`*/*`,
    /// `text/*`) are honoured and entries with `q=0` are treated as refusals.
    ///
    /// # Arguments
    ///
    /// * `media_type` - The media type to offer; parameters are ignored
    ///
    /// # Returns
    ///
    /// true if some `Accept` entry admits `media_type`, false otherwise
    pub fn accepts(&self, media_type: &str) -> bool {
        let Some(accept) = self.get_header("Accept") else {
            return true;
        };

        let wanted = media_essence(media_type);
        let (wanted_type, _) = wanted.split_once('/').unwrap_or((wanted.as_str(), ""));

        accept.split(',').any(|entry| {
            let mut parts = entry.split(';');
            let range = media_essence(parts.next().unwrap_or_default());
            let refused = parts.any(|param| {
                let param = param.trim();
                param.strip_prefix("q=").map(is_zero_quality).unwrap_or(false)
            });
            if refused || range.is_empty() {
                return false;
            }
            match range.split_once('/') {
                Some(("*", "*")) => true,
                Some((range_type, "*")) => range_type == wanted_type,
                _ => range == wanted,
            }
        })
    }

    /// Get a cookie value from the `Cookie` header.
    ///
    /// # Arguments
    ///
    /// * `name` - The cookie name, matched exactly
    ///
    /// # Returns
    ///
    /// The cookie value (possibly empty), if the cookie is present
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies()
            .into_iter()
            .find_map(|(k, v)| if k == name { Some(v) } else { None })
    }

    /// Check if a cookie exists.
    pub fn has_cookie(&self, name: &str) -> bool {
        self.cookie(name).is_some()
    }

    /// All cookies from the `Cookie` header, in header order.
    pub fn cookies(&self) -> Vec<(&str, &str)> {
        self.get_header("Cookie")
            .map(|header| {
                header
                    .split(';')
                    .filter_map(|pair| {
                        let pair = pair.trim();
                        if pair.is_empty() {
                            return None;
                        }
                        Some(match pair.split_once('=') {
                            Some((k, v)) => (k.trim(), v.trim()),
                            None => (pair, ""),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Parse the request body as JSON.
    ///
    /// # Returns
    ///
    /// The parsed value, [`Error::MissingHeader`] if the body is not declared
    /// as `application/json`, or [`Error::JsonError`] if it does not decode
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        if !self.is_json() {
            return Err(Error::MissingHeader("Content-Type: application/json".to_string()));
        }

        let json = serde_json::from_slice(&self.body)?;
        Ok(json)
    }

    /// Check if the request has a JSON body.
    ///
    /// # Returns
    ///
    /// true if the Content-Type header is application/json, false otherwise
    pub fn is_json(&self) -> bool {
        self.has_content_type("application/json")
    }

    /// Get a query parameter value.
    pub fn get_query_param(&self, name: &str) -> Option<&String> {
        self.query_params.get(name)
    }

    /// Check if a query parameter exists.
    pub fn has_query_param(&self, name: &str) -> bool {
        self.query_params.contains_key(name)
    }
}

fn parse_query(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|s| !s.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (k.to_string(), v.to_string()),
            None => (pair.to_string(), String::new()),
        })
        .collect()
}

fn media_essence(value: &str) -> String {
    value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn is_zero_quality(q: &str) -> bool {
    q.trim().parse::<f32>().map(|q| q <= 0.0).unwrap_or(false)
}

/// Parse an HTTP request from a byte slice.
///
/// The body is whatever follows the blank line, cut to `Content-Length`
/// when that header is present.
///
/// # Arguments
///
/// * `input` - The raw bytes read from the connection
///
/// # Returns
///
/// The parsed request, or the first problem found in the request line,
/// headers or `Content-Length`
pub fn parse_request(input: &[u8]) -> Result<HttpRequest, Error> {
    let input_str = std::str::from_utf8(input)
        .map_err(|_| Error::MalformedRequestLine("Invalid UTF-8".to_string()))?;

    let mut lines = input_str.lines();
    let request_line = lines.next().ok_or(Error::EmptyRequest)?;

    let parts: Vec<&str> = request_line.split_whitespace().collect();
    let [method, path, version] = parts.as_slice() else {
        return Err(Error::MalformedRequestLine(request_line.to_string()));
    };

    let method = Method::from_str(method)?;
    if path.is_empty() {
        return Err(Error::InvalidPath);
    }
    let version = HttpVersion::from_str(version)?;

    let mut headers = HashMap::new();
    for line in lines.take_while(|line| !line.is_empty()) {
        let (name, value) = line.split_once(':').ok_or(Error::InvalidHeaderFormat)?;
        headers.insert(name.trim().to_string(), value.trim().to_string());
    }

    if version.requires_host() && !headers.keys().any(|k| k.eq_ignore_ascii_case("Host")) {
        return Err(Error::MissingHeader("Host".to_string()));
    }

    let mut body = body_after_headers(input).to_vec();
    if let Some((_, value)) = headers.iter().find(|(k, _)| k.eq_ignore_ascii_case("Content-Length")) {
        let length = value
            .parse::<usize>()
            .map_err(|_| Error::InvalidContentLength(value.clone()))?;
        body.truncate(length);
    }

    Ok(HttpRequest::with_body(method, path.to_string(), version, headers, body))
}

fn body_after_headers(input: &[u8]) -> &[u8] {
    let find = |needle: &[u8]| {
        input
            .windows(needle.len())
            .position(|window| window == needle)
            .map(|at| at + needle.len())
    };
    let start = match (find(b"\r\n\r\n"), find(b"\n\n")) {
        (Some(a), Some(b)) => a.min(b),
        (Some(a), None) | (None, Some(a)) => a,
        (None, None) => input.len(),
    };
    &input[start..]
}
