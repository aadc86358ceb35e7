/*!
Mock du machines API pour tests sans backend

Serveur axum sur un port éphémère (127.0.0.1:0) qui sert:
- `GET /machines` avec filtres `type` et `machineFailure`
- `GET /machines/{id}` (match sur productId ou udi, 404 sinon)

Une réponse forcée (status + body brut) et un délai peuvent être injectés
pour simuler erreurs HTTP, payloads cassés et réseau lent. Chaque requête
reçue est enregistrée.
*/

use anyhow::Result;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde_json::Value;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Requête reçue par le mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub path: String,
    pub query: HashMap<String, String>,
}

#[derive(Debug, Clone)]
struct CannedResponse {
    status: u16,
    body: String,
}

#[derive(Clone, Default)]
struct MockState {
    machines: Arc<Mutex<Vec<Value>>>,
    canned: Arc<Mutex<Option<CannedResponse>>>,
    delay: Arc<Mutex<Duration>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockState {
    async fn before_response(
        &self,
        path: String,
        query: HashMap<String, String>,
    ) -> Option<Response> {
        self.requests.lock().unwrap().push(RecordedRequest { path, query });

        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let canned = self.canned.lock().unwrap().clone();
        canned.map(|c| raw_json(c.status, c.body))
    }
}

/// Mock HTTP du machines API, arrêté au drop
pub struct MockMachinesApi {
    addr: SocketAddr,
    state: MockState,
    shutdown: Option<oneshot::Sender<()>>,
}

impl MockMachinesApi {
    /// Démarre le serveur sur un port libre
    pub async fn start() -> Result<Self> {
        let state = MockState::default();
        let router = Router::new()
            .route("/machines", get(list_machines))
            .route("/machines/{id}", get(get_machine))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let (tx, rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let server = axum::serve(listener, router).with_graceful_shutdown(async {
                rx.await.ok();
            });
            if let Err(e) = server.await {
                log::error!("[MOCK] machines API stopped: {}", e);
            }
        });

        log::info!("[MOCK] machines API listening on {}", addr);
        Ok(Self {
            addr,
            state,
            shutdown: Some(tx),
        })
    }

    /// Démarre avec un jeu de machines déjà chargé
    pub async fn with_machines(machines: Vec<Value>) -> Result<Self> {
        let api = Self::start().await?;
        api.set_machines(machines);
        Ok(api)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn set_machines(&self, machines: Vec<Value>) {
        *self.state.machines.lock().unwrap() = machines;
    }

    /// Toutes les routes répondent désormais `status` avec `body` brut
    pub fn respond_with(&self, status: u16, body: impl Into<String>) {
        *self.state.canned.lock().unwrap() = Some(CannedResponse {
            status,
            body: body.into(),
        });
    }

    /// Revient au comportement normal (machines chargées)
    pub fn clear_response(&self) {
        *self.state.canned.lock().unwrap() = None;
    }

    /// Délai appliqué avant chaque réponse
    pub fn set_delay(&self, delay: Duration) {
        *self.state.delay.lock().unwrap() = delay;
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.requests.lock().unwrap().len()
    }
}

impl Drop for MockMachinesApi {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            tx.send(()).ok();
        }
    }
}

fn raw_json(status: u16, body: String) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

fn field_is(machine: &Value, field: &str, expected: &str) -> bool {
    match machine.get(field) {
        Some(Value::String(s)) => s == expected,
        Some(Value::Number(n)) => n.to_string() == expected,
        _ => false,
    }
}

async fn list_machines(
    State(state): State<MockState>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if let Some(canned) = state.before_response("/machines".into(), query.clone()).await {
        return canned;
    }

    let machines: Vec<Value> = state
        .machines
        .lock()
        .unwrap()
        .iter()
        .filter(|m| query.get("type").map_or(true, |t| field_is(m, "type", t)))
        .filter(|m| {
            query
                .get("machineFailure")
                .map_or(true, |f| field_is(m, "machineFailure", f))
        })
        .cloned()
        .collect();

    raw_json(200, Value::Array(machines).to_string())
}

async fn get_machine(State(state): State<MockState>, Path(id): Path<String>) -> Response {
    if let Some(canned) = state
        .before_response(format!("/machines/{id}"), HashMap::new())
        .await
    {
        return canned;
    }

    let found = state
        .machines
        .lock()
        .unwrap()
        .iter()
        .find(|m| field_is(m, "productId", &id) || field_is(m, "udi", &id))
        .cloned();

    match found {
        Some(machine) => raw_json(200, machine.to_string()),
        None => raw_json(404, serde_json::json!({ "error": "machine not found" }).to_string()),
    }
}
