//! Outbound request representation and the framing-header policy.

use std::fmt;

/// Headers the transport computes itself for message framing. Any
/// caller-supplied header with one of these names is dropped silently at
/// dispatch time; everything else passes through verbatim.
const FRAMING_HEADERS: [&str; 2] = ["content-length", "transfer-encoding"];

/// Whether a header name is transport-framing and therefore never
/// user-settable.
pub fn is_framing_header(name: &str) -> bool {
    FRAMING_HEADERS
        .iter()
        .any(|framing| name.eq_ignore_ascii_case(framing))
}

/// The headers of `request` as they go on the wire: framing headers removed,
/// order and duplicates otherwise preserved.
pub fn wire_headers(request: &FetchRequest) -> Vec<(String, String)> {
    request
        .headers()
        .iter()
        .filter(|(name, _)| !is_framing_header(name))
        .cloned()
        .collect()
}

/// HTTP method of a fetch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Head,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An outbound fetch request, customizable before dispatch.
///
/// Headers are a multi-valued list: adding the same name twice sends two
/// distinct header values, never a merged one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    method: Method,
    uri: String,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
}

impl FetchRequest {
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(uri: impl Into<String>) -> Self {
        Self::new(Method::Get, uri)
    }

    pub fn post(uri: impl Into<String>) -> Self {
        Self::new(Method::Post, uri)
    }

    /// Append a header. Repeated names are preserved as multiple values.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// All values supplied for a header name, case-insensitive.
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn body_bytes(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_accumulates_headers() {
        let req = FetchRequest::get("http://tiles.example.com/0/0/0.png")
            .header("X-Layer-Auth", "token-a")
            .header("X-Layer-Auth", "token-b");

        assert_eq!(req.header_values("x-layer-auth"), vec!["token-a", "token-b"]);
    }

    #[test]
    fn test_wire_headers_drop_framing_only() {
        let req = FetchRequest::post("http://example.com/print")
            .header("Content-Length", "999")
            .header("Transfer-Encoding", "chunked")
            .header("Accept", "image/png")
            .body(b"payload".to_vec());

        let wire = wire_headers(&req);
        assert_eq!(wire, vec![("Accept".to_string(), "image/png".to_string())]);
    }

    #[test]
    fn test_framing_header_match_is_case_insensitive() {
        assert!(is_framing_header("CONTENT-LENGTH"));
        assert!(is_framing_header("Transfer-Encoding"));
        assert!(!is_framing_header("Content-Type"));
    }
}
