use serde_json::Value;
use thiserror::Error;

use super::fetcher::{ApiRequest, AuthToken, FetchOutcome, Fetcher};
use super::transport::{HttpTransport, Method};

/// Response header carrying a machine-readable follow-up hint on errors.
pub const ACTION_HEADER: &str = "X-ACTION";

/// Normalized failure of a remote mutation: one user-displayable message plus
/// an optional client-side follow-up action hinted by the server.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct MutationError {
    pub message: String,
    pub action: Option<String>,
}

impl MutationError {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            action: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MutationConfig {
    pub method: Method,
    pub url: String,
    pub suffix: Option<String>,
    /// Static body; takes precedence over call-time params so parameterless
    /// mutations (toggles) and parameterized ones share one construction path.
    pub body: Option<Value>,
    pub auth: Option<AuthToken>,
    pub form_encoded: bool,
}

impl MutationConfig {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            suffix: None,
            body: None,
            auth: None,
            form_encoded: false,
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

    pub fn auth(mut self, auth: Option<AuthToken>) -> Self {
        self.auth = auth;
        self
    }

    pub fn form_encoded(mut self, form_encoded: bool) -> Self {
        self.form_encoded = form_encoded;
        self
    }
}

/// Single translation point from a tagged [`FetchOutcome`] to a
/// [`MutationError`]. Callers either get data or one normalized error.
pub struct RemoteMutation<'a, T> {
    fetcher: &'a Fetcher<T>,
    config: MutationConfig,
}

impl<'a, T: HttpTransport> RemoteMutation<'a, T> {
    pub fn new(fetcher: &'a Fetcher<T>, config: MutationConfig) -> Self {
        Self { fetcher, config }
    }

    pub async fn run(&self, params: Option<Value>) -> Result<Value, MutationError> {
        let body = self.config.body.clone().or(params);
        let outcome = self
            .fetcher
            .request(ApiRequest {
                method: self.config.method,
                url: self.config.url.clone(),
                suffix: self.config.suffix.clone(),
                body,
                form_encoded: self.config.form_encoded,
                auth: self.config.auth.clone(),
                headers: Vec::new(),
            })
            .await;

        match outcome {
            FetchOutcome::Success { data, .. } => Ok(data),
            failure => Err(normalize_failure(failure)),
        }
    }
}

/// Total extractor from a failed outcome to the normalized error shape.
///
/// Message fallback chain: structured body field (`detail`, `message`,
/// `error`) -> request-level message -> status text -> generic. Object-valued
/// detail is JSON-stringified rather than rendered directly.
pub fn normalize_failure(outcome: FetchOutcome) -> MutationError {
    match outcome {
        FetchOutcome::Success { .. } => {
            // Not reachable through RemoteMutation; kept total for reads.
            MutationError::message("unexpected success treated as failure")
        }
        FetchOutcome::TransportFailure { message } => MutationError::message(message),
        FetchOutcome::HttpFailure {
            message,
            status_text,
            body,
            headers,
            ..
        } => {
            let detail = body
                .as_ref()
                .and_then(|b| ["detail", "message", "error"].iter().find_map(|k| b.get(*k)))
                .map(render_detail);

            let message = detail
                .or_else(|| non_empty(message))
                .or_else(|| non_empty(status_text))
                .unwrap_or_else(|| "An unknown error occurred".to_string());

            MutationError {
                message,
                action: super::header_value(&headers, ACTION_HEADER).map(str::to_string),
            }
        }
    }
}

fn render_detail(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        // Nested shapes like {"detail": {"message": "..."}} still resolve to
        // a plain string.
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| value.to_string()),
        other => other.to_string(),
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
