//! Shared fixtures: a scripted transport standing in for the backend.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use coachdash::http::{ApiClient, ApiError, ApiRequest, Method, RawResponse, Transport};
use coachdash::session::{MemoryTokenStore, SessionStore};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::sync::Notify;

/// One request as the transport saw it.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub credential: Option<String>,
}

type Reply = Result<RawResponse, ApiError>;

#[derive(Default)]
struct Script {
    queued: VecDeque<Reply>,
    last: Option<Reply>,
}

/// Answers requests from per-endpoint queues. Once an endpoint's queue runs
/// dry its last reply repeats; endpoints never scripted answer 404.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<HashMap<(Method, String), Script>>,
    gates: Mutex<HashMap<(Method, String), Arc<Notify>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) -> &Self {
        self.push(method, path, Ok(RawResponse::new(status, body.to_string())))
    }

    pub fn unreachable(&self, method: Method, path: &str) -> &Self {
        self.push(method, path, Err(ApiError::Network("connection refused".into())))
    }

    fn push(&self, method: Method, path: &str, reply: Reply) -> &Self {
        self.replies
            .lock()
            .entry((method, path.to_string()))
            .or_default()
            .queued
            .push_back(reply);
        self
    }

    /// Hold requests to this endpoint until the returned handle is notified.
    pub fn gate(&self, method: Method, path: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates
            .lock()
            .insert((method, path.to_string()), Arc::clone(&notify));
        notify
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn calls_to(&self, path: &str) -> Vec<RecordedCall> {
        self.calls().into_iter().filter(|c| c.path == path).collect()
    }

    fn next_reply(&self, key: &(Method, String)) -> Reply {
        let mut replies = self.replies.lock();
        let Some(script) = replies.get_mut(key) else {
            return Ok(RawResponse::new(404, r#"{"detail":"Not Found"}"#));
        };
        if let Some(reply) = script.queued.pop_front() {
            script.last = Some(reply.clone());
            return reply;
        }
        script
            .last
            .clone()
            .unwrap_or_else(|| Ok(RawResponse::new(404, r#"{"detail":"Not Found"}"#)))
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, ApiError> {
        let key = (request.method.clone(), request.path.clone());
        self.calls.lock().push(RecordedCall {
            method: request.method.clone(),
            path: request.path.clone(),
            body: request.body.clone(),
            credential: request.credential.as_ref().map(|c| c.expose().to_string()),
        });

        let gate = self.gates.lock().get(&key).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.next_reply(&key)
    }
}

pub fn profile_json(id: &str, role: &str) -> Value {
    json!({
        "id": id,
        "name": format!("User {id}"),
        "email": format!("{id}@example.com"),
        "role": role,
    })
}

pub fn session_with(transport: &Arc<ScriptedTransport>, tokens: &Arc<MemoryTokenStore>) -> SessionStore {
    let transport: Arc<dyn Transport> = Arc::clone(transport) as Arc<dyn Transport>;
    SessionStore::new(ApiClient::new(transport), Arc::clone(tokens) as _)
}

/// A store restored from a persisted token that `/auth/me` accepts as `role`.
pub async fn signed_in(role: &str) -> (Arc<ScriptedTransport>, Arc<MemoryTokenStore>, SessionStore) {
    let transport = ScriptedTransport::new();
    transport.respond(Method::GET, "/auth/me", 200, profile_json("u1", role));
    let tokens = Arc::new(MemoryTokenStore::with_token("token-a"));
    let session = session_with(&transport, &tokens);
    session.restore().await;
    (transport, tokens, session)
}
