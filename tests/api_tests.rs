//! HTTP-level tests driving the router in-process.
//!
//! Each test gets its own snapshot file in a temporary directory and a stub
//! completion client, so nothing leaves the process.
//!
//! Run with: cargo test --test api_tests

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use incident_registry::completion::{ChatCompleter, CompletionError};
use incident_registry::config::AppConfig;
use incident_registry::records::{RecordStore, SharedRecords};
use incident_registry::routes::create_router;
use incident_registry::state::AppState;

const API_KEY: &str = "test-secret";

const CONFIG: &str = r#"
    [http]
    host = "127.0.0.1"
    port = 0

    [auth]
    api_key = "test-secret"

    [completion]
    endpoint = "http://127.0.0.1:9"
    deployment = "unused"
    api_version = "unused"
    api_key = "unused"
"#;

/// Records what it was asked and answers with a fixed result.
struct StubCompleter {
    reply: Result<String, u16>,
    calls: Mutex<Vec<(String, String)>>,
}

impl StubCompleter {
    fn answering(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn failing(status: u16) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(status),
            calls: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ChatCompleter for StubCompleter {
    async fn complete(&self, system: &str, question: &str) -> Result<String, CompletionError> {
        self.calls
            .lock()
            .unwrap()
            .push((system.to_string(), question.to_string()));
        self.reply.clone().map_err(CompletionError::Status)
    }
}

struct TestApp {
    router: Router,
    _dir: TempDir,
    data_file: std::path::PathBuf,
}

impl TestApp {
    /// App backed by an empty snapshot.
    fn new(completer: Arc<StubCompleter>) -> Self {
        Self::with_snapshot("{}", completer)
    }

    fn with_snapshot(snapshot: &str, completer: Arc<StubCompleter>) -> Self {
        let dir = TempDir::new().unwrap();
        let data_file = dir.path().join("data.json");
        std::fs::write(&data_file, snapshot).unwrap();

        let config = AppConfig::from_toml(CONFIG).unwrap();
        config.validate().unwrap();
        let store = RecordStore::open(&data_file, false).unwrap();
        let state = AppState::new(config, SharedRecords::new(store), completer);

        Self {
            router: create_router(state),
            _dir: dir,
            data_file,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }

    /// Body text as served, without going through `Value` (which sorts keys).
    async fn get_raw(&self, path: &str) -> String {
        let request = Request::get(path)
            .header("X-API-Key", API_KEY)
            .body(Body::empty())
            .unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        self.send(
            Request::get(path)
                .header("X-API-Key", API_KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.send(
            Request::post(path)
                .header("X-API-Key", API_KEY)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }
}

#[tokio::test]
async fn test_missing_api_key_is_unauthorized() {
    let app = TestApp::new(StubCompleter::answering("x"));
    let (status, body) = app
        .send(Request::get("/datos").body(Body::empty()).unwrap())
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body,
        json!({ "success": false, "message": "API Key inválida o faltante" })
    );
}

#[tokio::test]
async fn test_wrong_api_key_is_unauthorized() {
    let app = TestApp::new(StubCompleter::answering("x"));
    let (status, body) = app
        .send(
            Request::post("/fallecidos/registrar")
                .header("X-API-Key", "1901")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"nombre":"Ana"}"#))
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (_, data) = app.get("/datos").await;
    assert_eq!(data["fallecidos"], json!([]));
}

#[tokio::test]
async fn test_health_needs_no_key() {
    let app = TestApp::new(StubCompleter::answering("x"));
    let (status, body) = app
        .send(Request::get("/health").body(Body::empty()).unwrap())
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("ok".to_string()));
}

#[tokio::test]
async fn test_root_reports_active() {
    let app = TestApp::new(StubCompleter::answering("x"));
    let (status, body) = app.get("/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "API de Información sobre Víctimas activa");
}

#[tokio::test]
async fn test_register_deceased_then_duplicate() {
    let app = TestApp::new(StubCompleter::answering("x"));

    let (status, body) = app
        .post("/fallecidos/registrar", json!({ "nombre": "Ana" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "success": true, "message": "Ana ha sido registrado como fallecido" })
    );

    let (_, body) = app
        .post("/fallecidos/registrar", json!({ "nombre": "Ana" }))
        .await;
    assert_eq!(
        body,
        json!({ "success": false, "message": "Ana ya está registrado como fallecido" })
    );

    let (_, data) = app.get("/datos").await;
    assert_eq!(data["fallecidos"], json!(["Ana"]));
}

#[tokio::test]
async fn test_blank_names_rejected_before_store() {
    let app = TestApp::new(StubCompleter::answering("x"));

    let (status, body) = app
        .post("/fallecidos/registrar", json!({ "nombre": "   " }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "El nombre no puede estar vacío");

    let (_, body) = app
        .post("/pacientes/registrar", json!({ "nombre": "", "hospital": "H1" }))
        .await;
    assert_eq!(body["message"], "El nombre no puede estar vacío");

    let (_, body) = app
        .post("/pacientes/registrar", json!({ "nombre": "Eva", "hospital": " " }))
        .await;
    assert_eq!(body["message"], "El hospital no puede estar vacío");

    let (_, data) = app.get("/datos").await;
    assert_eq!(data, json!({ "fallecidos": [], "pacientes_hospitales": {} }));
}

#[tokio::test]
async fn test_register_patient_and_conflicts() {
    let app = TestApp::new(StubCompleter::answering("x"));

    let (_, body) = app
        .post("/pacientes/registrar", json!({ "nombre": "Eva", "hospital": "H1" }))
        .await;
    assert_eq!(
        body,
        json!({ "success": true, "message": "Eva ha sido registrado como paciente en H1" })
    );

    let (status, body) = app
        .post(
            "/pacientes/registrar",
            json!({ "nombre": "Eva", "hospital": "H2", "edad": 30 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "El paciente ya existe en H1");

    app.post("/fallecidos/registrar", json!({ "nombre": "Ana" }))
        .await;
    let (_, body) = app
        .post("/pacientes/registrar", json!({ "nombre": "Ana", "hospital": "H3" }))
        .await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "La persona está en la lista de fallecidos");

    let (_, data) = app.get("/datos").await;
    assert_eq!(
        data,
        json!({ "fallecidos": ["Ana"], "pacientes_hospitales": { "H1": [{ "nombre": "Eva" }] } })
    );
}

#[tokio::test]
async fn test_deceased_registration_moves_patient() {
    let app = TestApp::new(StubCompleter::answering("x"));
    app.post(
        "/pacientes/registrar",
        json!({ "nombre": "Luis", "hospital": "H1", "edad": 30 }),
    )
    .await;

    let (_, body) = app
        .post("/fallecidos/registrar", json!({ "nombre": "Luis" }))
        .await;
    assert_eq!(body["success"], true);

    let (_, data) = app.get("/datos").await;
    assert_eq!(
        data,
        json!({ "fallecidos": ["Luis"], "pacientes_hospitales": { "H1": [] } })
    );
}

#[tokio::test]
async fn test_age_handling() {
    let app = TestApp::new(StubCompleter::answering("x"));
    app.post(
        "/pacientes/registrar",
        json!({ "nombre": "A", "hospital": "H1", "edad": 41 }),
    )
    .await;
    app.post(
        "/pacientes/registrar",
        json!({ "nombre": "B", "hospital": "H1", "edad": 0 }),
    )
    .await;
    app.post(
        "/pacientes/registrar",
        json!({ "nombre": "C", "hospital": "H1", "edad": null }),
    )
    .await;

    let (_, data) = app.get("/datos").await;
    assert_eq!(
        data["pacientes_hospitales"]["H1"],
        json!([{ "nombre": "A", "edad": 41 }, { "nombre": "B" }, { "nombre": "C" }])
    );
}

#[tokio::test]
async fn test_malformed_body_gets_envelope() {
    let app = TestApp::new(StubCompleter::answering("x"));

    let (status, body) = app
        .send(
            Request::post("/pacientes/registrar")
                .header("X-API-Key", API_KEY)
                .header("content-type", "application/json")
                .body(Body::from(r#"{"nombre": "Eva"}"#))
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("hospital"));

    let (status, body) = app
        .send(
            Request::post("/chat")
                .header("X-API-Key", API_KEY)
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_registrations_persist_in_order() {
    let app = TestApp::new(StubCompleter::answering("x"));
    app.post("/pacientes/registrar", json!({ "nombre": "P1", "hospital": "Zeta" }))
        .await;
    app.post("/pacientes/registrar", json!({ "nombre": "P2", "hospital": "Alfa" }))
        .await;
    app.post("/fallecidos/registrar", json!({ "nombre": "Ana" }))
        .await;

    let served = app.get_raw("/datos").await;
    assert!(served.find("Zeta").unwrap() < served.find("Alfa").unwrap());

    let reloaded = RecordStore::open(&app.data_file, false).unwrap();
    assert_eq!(serde_json::to_string(&reloaded.snapshot()).unwrap(), served);
}

#[tokio::test]
async fn test_chat_embeds_records_and_returns_reply() {
    let completer = StubCompleter::answering("Eva está en H1.");
    let app = TestApp::with_snapshot(
        r#"{"fallecidos":["Ana"],"pacientes_hospitales":{"H1":[{"nombre":"Luis","edad":30},{"nombre":"Eva"}]}}"#,
        completer.clone(),
    );

    let (status, body) = app
        .post("/chat", json!({ "message": "¿Dónde está Eva?" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "response": "Eva está en H1." }));

    let calls = completer.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let (system, question) = &calls[0];
    assert_eq!(question, "¿Dónde está Eva?");
    assert!(system.contains(
        "Lista de fallecidos confirmados:\n- Ana\n\nPacientes en hospitales:\n\nH1:\n- Luis, 30 años\n- Eva\n"
    ));
}

#[tokio::test]
async fn test_chat_failure_is_literal_reply() {
    let completer = StubCompleter::failing(500);
    let app = TestApp::new(completer.clone());

    let (status, body) = app.post("/chat", json!({ "message": "hola" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "response": "Error al obtener respuesta: 500" }));
    assert_eq!(completer.calls.lock().unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_patient_registration_single_winner() {
    let app = Arc::new(TestApp::new(StubCompleter::answering("x")));

    let handles: Vec<_> = ["H1", "H2", "H3", "H4"]
        .into_iter()
        .map(|hospital| {
            let app = app.clone();
            tokio::spawn(async move {
                app.post(
                    "/pacientes/registrar",
                    json!({ "nombre": "Eva", "hospital": hospital }),
                )
                .await
                .1
            })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        let body = handle.await.unwrap();
        if body["success"] == true {
            successes += 1;
        } else {
            assert!(body["message"]
                .as_str()
                .unwrap()
                .starts_with("El paciente ya existe en"));
        }
    }
    assert_eq!(successes, 1);
}
