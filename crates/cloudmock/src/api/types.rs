//! Request/response types for the emulated API and hyper conversions.

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Method, Request, Response, StatusCode};

/// An inbound request with its body already collected.
#[derive(Debug, Clone)]
pub struct MockRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub body: Bytes,
}

impl MockRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            body: Bytes::new(),
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }
}

/// Outcome of a handled request.
///
/// `json` marks responses produced by a resource handler; those always carry
/// a JSON content type, even when the body is empty (404, 400, 204).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockResponse {
    pub status: StatusCode,
    pub body: Bytes,
    pub json: bool,
}

impl MockResponse {
    pub fn json(status: StatusCode, body: Bytes) -> Self {
        Self {
            status,
            body,
            json: true,
        }
    }

    /// Status only, still labelled as JSON.
    pub fn status(status: StatusCode) -> Self {
        Self::json(status, Bytes::new())
    }

    pub fn not_found() -> Self {
        Self::status(StatusCode::NOT_FOUND)
    }

    pub fn bad_request() -> Self {
        Self::status(StatusCode::BAD_REQUEST)
    }

    /// Path outside every resource collection.
    pub fn unrouted() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            body: Bytes::new(),
            json: false,
        }
    }

    pub fn into_hyper(self) -> Response<Full<Bytes>> {
        if self.json {
            build_response_with_headers(
                self.status,
                [("Content-Type", "application/json")],
                self.body,
            )
        } else {
            build_response(self.status, self.body)
        }
    }
}

/// Build an HTTP response with the given status and body.
pub fn build_response(status: StatusCode, body: impl Into<Bytes>) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .body(Full::new(body.into()))
        .unwrap_or_else(|_| {
            // Unreachable with a valid StatusCode.
            Response::new(Full::new(Bytes::from("Internal Server Error")))
        })
}

/// Build an HTTP response with headers.
pub fn build_response_with_headers(
    status: StatusCode,
    headers: impl IntoIterator<Item = (impl AsRef<str>, impl AsRef<str>)>,
    body: impl Into<Bytes>,
) -> Response<Full<Bytes>> {
    let mut builder = Response::builder().status(status);
    for (key, value) in headers {
        builder = builder.header(key.as_ref(), value.as_ref());
    }
    builder.body(Full::new(body.into())).unwrap_or_else(|_| {
        // Only reachable with an invalid header name or value.
        Response::new(Full::new(Bytes::from("Internal Server Error")))
    })
}

/// Error body for failures that happen before a request reaches a handler.
pub fn error_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "error": {
            "code": status.as_u16(),
            "message": message,
        }
    });
    build_response_with_headers(
        status,
        [("Content-Type", "application/json")],
        body.to_string(),
    )
}

/// Collect request body into bytes
pub async fn collect_body(req: Request<Incoming>) -> Result<Bytes, String> {
    use http_body_util::BodyExt;
    req.collect()
        .await
        .map(|c| c.to_bytes())
        .map_err(|e| format!("Failed to read request body: {e}"))
}

#[cfg(test)]
impl MockRequest {
    pub fn with_json<T: serde::Serialize>(self, body: &T) -> Self {
        self.with_body(serde_json::to_vec(body).expect("serializable body"))
    }
}

#[cfg(test)]
impl MockResponse {
    pub fn body_json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("JSON response body")
    }
}
