#![allow(dead_code)]
//! Shared helpers for condo-cli integration tests.
//!
//! - [`create_cli_command`] runs the `condo` binary isolated from the
//!   developer's environment (no real config, session file or env vars).
//! - [`ScriptedBackend`] answers identity and table calls from canned rows
//!   and records every table request, so page tests can check the queries
//!   a page builds.

use assert_cmd::Command;
use condo_link::{
    AuthError, CondoClient, Identity, IdentityApi, MemorySessionStore, Operation, QueryResponse,
    RestRequest, RestTransport, Session, SessionContext,
};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

pub const EMAIL: &str = "sindico@vila.com";
pub const PASSWORD: &str = "segredo";

/// `condo` with a throwaway config path and session file under `dir`.
pub fn create_cli_command(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_condo"));
    cmd.env_remove("SUPABASE_URL")
        .env_remove("SUPABASE_KEY")
        .env_remove("CONDO_SCHEMA")
        .env_remove("RUST_LOG")
        .env("HOME", dir)
        .env("CONDO_SESSION_FILE", dir.join("session.toml"))
        .arg("--config")
        .arg(dir.join("config.toml"))
        .arg("--no-color");
    cmd
}

#[derive(Default)]
struct Script {
    /// Rows returned for reads, per table
    rows: HashMap<String, Vec<JsonValue>>,
    /// Counts returned for counted reads, keyed by table and rendered filters
    counts: HashMap<String, u64>,
    requests: Vec<RestRequest>,
}

#[derive(Clone, Default)]
pub struct ScriptedBackend {
    script: Arc<Mutex<Script>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(self, table: &str, rows: Vec<JsonValue>) -> Self {
        self.script.lock().unwrap().rows.insert(table.to_string(), rows);
        self
    }

    /// Count for a read on `table` whose query string equals `query`.
    pub fn with_count(self, table: &str, query: &str, count: u64) -> Self {
        self.script
            .lock()
            .unwrap()
            .counts
            .insert(format!("{}?{}", table, query), count);
        self
    }

    pub fn requests(&self) -> Vec<RestRequest> {
        self.script.lock().unwrap().requests.clone()
    }

    pub fn last_request(&self) -> RestRequest {
        self.requests().pop().expect("at least one request")
    }

    pub async fn signed_in_context(&self) -> SessionContext {
        let client = CondoClient::builder()
            .schema("vila_da_serra")
            .identity_api(Arc::new(self.clone()))
            .transport(Arc::new(self.clone()))
            .build()
            .unwrap();
        let mut ctx = SessionContext::new(client, Box::new(MemorySessionStore::new()), "test");
        ctx.sign_in(EMAIL, PASSWORD).await.unwrap();
        ctx
    }
}

/// `a=1&b=2` rendering of a request's query pairs.
pub fn query_string(request: &RestRequest) -> String {
    request
        .query_pairs()
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

fn identity() -> Identity {
    Identity::new("u-1", EMAIL)
}

#[async_trait::async_trait]
impl IdentityApi for ScriptedBackend {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        if email != EMAIL || password != PASSWORD {
            return Err(AuthError::InvalidCredentials("Invalid login credentials".into()));
        }
        Ok(Session {
            access_token: "scripted-token".into(),
            token_type: "bearer".into(),
            expires_in: Some(3600),
            expires_at: Some(chrono::Utc::now().timestamp() + 3600),
            refresh_token: Some("scripted-refresh".into()),
            user: identity(),
        })
    }

    async fn refresh_session(&self, _refresh_token: &str) -> Result<Session, AuthError> {
        Err(AuthError::SessionExpired)
    }

    async fn get_user(&self, access_token: &str) -> Result<Identity, AuthError> {
        if access_token == "scripted-token" {
            Ok(identity())
        } else {
            Err(AuthError::SessionExpired)
        }
    }

    async fn sign_out(&self, _access_token: &str) -> Result<(), AuthError> {
        Ok(())
    }
}

#[async_trait::async_trait]
impl RestTransport for ScriptedBackend {
    async fn execute(&self, request: RestRequest) -> condo_link::Result<QueryResponse> {
        let mut script = self.script.lock().unwrap();
        script.requests.push(request.clone());

        match request.operation {
            Operation::Select => {
                let rows = script.rows.get(&request.table).cloned().unwrap_or_default();
                let count = request.count.map(|_| {
                    let key = format!("{}?{}", request.table, query_string(&request));
                    script.counts.get(&key).copied().unwrap_or(rows.len() as u64)
                });
                Ok(QueryResponse::new(rows, count))
            },
            Operation::Insert => {
                let mut row = request.payload.clone().unwrap_or(JsonValue::Null);
                if let Some(obj) = row.as_object_mut() {
                    obj.insert("id".into(), JsonValue::String("9f8e7d6c-new".into()));
                }
                Ok(QueryResponse::new(vec![row], None))
            },
            Operation::Update | Operation::Delete => {
                let id = request
                    .filters
                    .iter()
                    .find(|f| f.column == "id")
                    .map(|f| f.value.clone());
                let existing = script.rows.get(&request.table).cloned().unwrap_or_default();
                let mut hit: Vec<JsonValue> = existing
                    .into_iter()
                    .filter(|row| row.get("id").and_then(|v| v.as_str()) == id.as_deref())
                    .collect();
                if let (Operation::Update, Some(patch)) = (request.operation, request.payload.as_ref()) {
                    for row in hit.iter_mut() {
                        if let (Some(obj), Some(patch)) = (row.as_object_mut(), patch.as_object()) {
                            for (k, v) in patch {
                                obj.insert(k.clone(), v.clone());
                            }
                        }
                    }
                }
                Ok(QueryResponse::new(hit, None))
            },
        }
    }
}
