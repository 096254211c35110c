use serde::Deserialize;
use serde_json::Value;

use super::transport::{HttpTransport, Method, RequestBody, TransportRequest};

/// Bearer-style credentials attached to authenticated requests.
///
/// The wire format is snake_case while the UI convention is camelCase; the
/// aliases accept both so a token can round-trip through either layer.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthToken {
    #[serde(alias = "tokenType")]
    pub token_type: String,
    #[serde(alias = "accessToken")]
    pub access_token: String,
}

impl AuthToken {
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self {
            token_type: "Bearer".to_string(),
            access_token: access_token.into(),
        }
    }

    pub fn header_value(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    /// Appended verbatim to `url` (path segment, query string).
    pub suffix: Option<String>,
    pub body: Option<Value>,
    /// Serialize the body as multipart form fields instead of JSON.
    pub form_encoded: bool,
    pub auth: Option<AuthToken>,
    /// Merged last: a caller header replaces any method-derived header with
    /// the same name.
    pub headers: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            suffix: None,
            body: None,
            form_encoded: false,
            auth: None,
            headers: Vec::new(),
        }
    }

    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn form_encoded(mut self, form_encoded: bool) -> Self {
        self.form_encoded = form_encoded;
        self
    }

    pub fn auth(mut self, auth: Option<AuthToken>) -> Self {
        self.auth = auth;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Every request resolves to exactly one of these; the fetcher never fails
/// with an `Err` and callers never need a catch path.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Success {
        data: Value,
        headers: Vec<(String, String)>,
    },
    /// Non-2xx response with a best-effort parsed body.
    HttpFailure {
        status: u16,
        status_text: String,
        message: String,
        body: Option<Value>,
        headers: Vec<(String, String)>,
    },
    /// Network failure or response-body parse failure: no status available.
    TransportFailure { message: String },
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success { .. })
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        match self {
            FetchOutcome::Success { headers, .. } | FetchOutcome::HttpFailure { headers, .. } => {
                super::header_value(headers, name)
            }
            FetchOutcome::TransportFailure { .. } => None,
        }
    }
}

/// Builds authenticated requests and normalizes everything the transport can
/// do into a [`FetchOutcome`].
#[derive(Debug, Clone)]
pub struct Fetcher<T> {
    transport: T,
}

impl<T: HttpTransport> Fetcher<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub async fn request(&self, req: ApiRequest) -> FetchOutcome {
        let url = match &req.suffix {
            Some(suffix) => format!("{}{}", req.url, suffix),
            None => req.url.clone(),
        };

        let mut headers: Vec<(String, String)> = Vec::new();
        let body = match (&req.body, req.form_encoded) {
            (Some(value), true) => RequestBody::Form(form_fields(value)),
            (Some(value), false) => {
                headers.push(("Content-Type".to_string(), "application/json".to_string()));
                RequestBody::Json(value.clone())
            }
            (None, _) => RequestBody::Empty,
        };

        if let Some(auth) = &req.auth {
            headers.push(("Authorization".to_string(), auth.header_value()));
        }

        // Caller wins on duplicate names.
        for (name, value) in req.headers {
            headers.retain(|(k, _)| !k.eq_ignore_ascii_case(&name));
            headers.push((name, value));
        }

        log::debug!("[HTTP] {} {}", req.method.as_str(), url);

        let response = match self
            .transport
            .send(TransportRequest {
                method: req.method,
                url,
                headers,
                body,
            })
            .await
        {
            Ok(response) => response,
            Err(e) => {
                log::warn!("[HTTP] transport failure: {e}");
                return FetchOutcome::TransportFailure {
                    message: e.to_string(),
                };
            }
        };

        if response.is_success() {
            let data = if response.body.trim().is_empty() {
                Value::Null
            } else {
                match serde_json::from_str(&response.body) {
                    Ok(data) => data,
                    Err(e) => {
                        log::warn!("[HTTP] unparsable success body: {e}");
                        return FetchOutcome::TransportFailure {
                            message: format!("invalid response body: {e}"),
                        };
                    }
                }
            };
            FetchOutcome::Success {
                data,
                headers: response.headers,
            }
        } else {
            log::debug!(
                "[HTTP] request failed: {} {}",
                response.status,
                response.status_text
            );
            FetchOutcome::HttpFailure {
                message: format!("HTTP {} {}", response.status, response.status_text),
                status: response.status,
                status_text: response.status_text,
                body: serde_json::from_str(&response.body).ok(),
                headers: response.headers,
            }
        }
    }
}

fn form_fields(value: &Value) -> Vec<(String, String)> {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| {
                let text = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.clone(), text)
            })
            .collect(),
        other => {
            log::warn!("[HTTP] form-encoded body is not an object: {other}");
            Vec::new()
        }
    }
}
