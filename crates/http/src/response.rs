//! The response side of a fetch: status, flattened headers and a lazily
//! consumed body.

use crate::transport::TransportError;

/// Body backing for a [`FetchResponse`].
///
/// The remote variant holds the underlying `reqwest::Response`, so dropping
/// the response returns its connection to the shared pool even on error
/// paths.
#[derive(Debug)]
pub(crate) enum Body {
    Remote(Option<reqwest::Response>),
    Memory(Option<Vec<u8>>),
}

/// A response from the remote fetch gateway.
///
/// Statuses are surfaced as-is: a 404 tile is data for the calling
/// processor, not an error. Headers are flattened into simple name/value
/// pairs with repeated names preserved as distinct entries.
#[derive(Debug)]
pub struct FetchResponse {
    status: u16,
    status_text: String,
    headers: Vec<(String, String)>,
    body: Body,
}

impl FetchResponse {
    pub(crate) fn remote(response: reqwest::Response) -> Self {
        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        Self {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("").to_string(),
            headers,
            body: Body::Remote(Some(response)),
        }
    }

    /// Build a response from in-memory parts (canned test responses).
    pub fn from_parts(
        status: u16,
        status_text: impl Into<String>,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
    ) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            headers,
            body: Body::Memory(Some(body)),
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    /// Whether the status is in the 2xx range. Advisory only.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// All response headers, flattened, repeats preserved.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// All values for a header name, case-insensitive.
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Read the next body chunk, or `None` once the body is exhausted.
    pub async fn chunk(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        match &mut self.body {
            Body::Remote(response) => match response {
                Some(resp) => {
                    let chunk = resp
                        .chunk()
                        .await
                        .map_err(|e| TransportError::Io(e.to_string()))?;
                    if chunk.is_none() {
                        *response = None;
                    }
                    Ok(chunk.map(|bytes| bytes.to_vec()))
                }
                None => Ok(None),
            },
            Body::Memory(body) => Ok(body.take()),
        }
    }

    /// Consume the response and read the whole body.
    pub async fn bytes(mut self) -> Result<Vec<u8>, TransportError> {
        let mut out = Vec::new();
        while let Some(chunk) = self.chunk().await? {
            out.extend_from_slice(&chunk);
        }
        Ok(out)
    }
}
