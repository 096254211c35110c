use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use super::transport::{
    HttpTransport, TransportError, TransportRequest, TransportResponse,
};

/// Scripted reply for one request, consumed in FIFO order.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Response {
        status: u16,
        status_text: String,
        headers: Vec<(String, String)>,
        body: String,
    },
    NetworkError(String),
    /// Never resolves; keeps the request in flight for the rest of the test.
    Hang,
}

#[derive(Debug, Default)]
struct MockState {
    requests: Vec<TransportRequest>,
    replies: VecDeque<ScriptedReply>,
}

/// Pure in-memory transport for tests.
///
/// Records every request it sees and answers from a scripted reply queue;
/// with the queue empty it answers `200 {}`.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_json(&self, status: u16, body: Value) {
        self.push_reply(ScriptedReply::Response {
            status,
            status_text: status_text_for(status).to_string(),
            headers: Vec::new(),
            body: body.to_string(),
        });
    }

    pub fn push_raw(&self, status: u16, body: impl Into<String>) {
        self.push_reply(ScriptedReply::Response {
            status,
            status_text: status_text_for(status).to_string(),
            headers: Vec::new(),
            body: body.into(),
        });
    }

    pub fn push_json_with_headers(&self, status: u16, body: Value, headers: Vec<(String, String)>) {
        self.push_reply(ScriptedReply::Response {
            status,
            status_text: status_text_for(status).to_string(),
            headers,
            body: body.to_string(),
        });
    }

    pub fn push_network_error(&self, message: impl Into<String>) {
        self.push_reply(ScriptedReply::NetworkError(message.into()));
    }

    pub fn push_hang(&self) {
        self.push_reply(ScriptedReply::Hang);
    }

    fn push_reply(&self, reply: ScriptedReply) {
        self.state.lock().unwrap().replies.push_back(reply);
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }
}

impl HttpTransport for MockTransport {
    async fn send(&self, req: TransportRequest) -> Result<TransportResponse, TransportError> {
        let reply = {
            let mut state = self.state.lock().unwrap();
            state.requests.push(req);
            state.replies.pop_front()
        };

        match reply {
            Some(ScriptedReply::Response {
                status,
                status_text,
                headers,
                body,
            }) => Ok(TransportResponse {
                status,
                status_text,
                headers,
                body,
            }),
            Some(ScriptedReply::NetworkError(message)) => Err(TransportError(message)),
            Some(ScriptedReply::Hang) => std::future::pending().await,
            None => Ok(TransportResponse {
                status: 200,
                status_text: "OK".to_string(),
                headers: Vec::new(),
                body: "{}".to_string(),
            }),
        }
    }
}

fn status_text_for(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "",
    }
}
