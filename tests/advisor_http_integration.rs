//! Integration tests for the HTTP recommendation client and the advisor
//! REST API.
//!
//! Each test spins up a scripted fake recommendation API on a random port,
//! and where needed the advisor server itself, then talks real HTTP.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

use project_advisor::advisor::{
    AdvisorRouteState, ConversationController, NextStep, ServiceType, advisor_routes,
};
use project_advisor::client::{HttpRecommendationClient, RecommendationClient};
use project_advisor::config::{ClientConfig, ConversationSettings};
use project_advisor::error::ClientError;
use project_advisor::store::{LibSqlStore, RecommendationStore};

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Scripted replies plus every request body the fake API received.
#[derive(Clone, Default)]
struct FakeApi {
    replies: Arc<Mutex<VecDeque<(StatusCode, Value)>>>,
    requests: Arc<Mutex<Vec<Value>>>,
}

impl FakeApi {
    fn new(replies: Vec<(StatusCode, Value)>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into())),
            requests: Arc::default(),
        }
    }

    fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }
}

async fn fake_recommend(State(api): State<FakeApi>, Json(body): Json<Value>) -> impl IntoResponse {
    api.requests.lock().unwrap().push(body);
    let (status, reply) = api.replies.lock().unwrap().pop_front().unwrap_or((
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({"error": "script exhausted"}),
    ));
    (status, Json(reply))
}

async fn serve(app: Router) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;
    port
}

/// Start the fake recommendation API, return a client pointed at it.
async fn start_fake_api(api: FakeApi) -> HttpRecommendationClient {
    let app = Router::new()
        .route("/api/recommend-project", post(fake_recommend))
        .with_state(api);
    let port = serve(app).await;
    let config = ClientConfig {
        endpoint: format!("http://127.0.0.1:{port}/api/recommend-project"),
        ..Default::default()
    };
    HttpRecommendationClient::new(&config).unwrap()
}

/// Start the advisor server in front of the fake API.
async fn start_advisor(api: FakeApi, store: Arc<dyn RecommendationStore>) -> String {
    let client: Arc<dyn RecommendationClient> = Arc::new(start_fake_api(api).await);
    let controller = Arc::new(ConversationController::new(
        client,
        store,
        ConversationSettings::default(),
    ));
    controller.open().await;
    let port = serve(advisor_routes(AdvisorRouteState { controller })).await;
    format!("http://127.0.0.1:{port}")
}

async fn post_json(base: &str, path: &str, body: Value) -> (StatusCode, Value) {
    let response = reqwest::Client::new()
        .post(format!("{base}{path}"))
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = StatusCode::from_u16(response.status().as_u16()).unwrap();
    (status, response.json().await.unwrap())
}

fn question(text: &str, options: &[&str]) -> (StatusCode, Value) {
    (
        StatusCode::OK,
        json!({
            "type": "question",
            "question": text,
            "options": options,
            "timestamp": "2026-01-01T00:00:00.000Z"
        }),
    )
}

fn recommendation(text: &str) -> (StatusCode, Value) {
    (
        StatusCode::OK,
        json!({
            "type": "recommendation",
            "recommendation": text,
            "timestamp": "2026-01-01T00:00:00.000Z"
        }),
    )
}

// ── Client ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn client_decodes_question_and_sends_wire_body() {
    timeout(TEST_TIMEOUT, async {
        let api = FakeApi::new(vec![question("¿Qué necesitas?", &["Web", "App"])]);
        let client = start_fake_api(api.clone()).await;

        let step = client
            .fetch_next(&["Sí".to_string()], ServiceType::Corporate)
            .await
            .unwrap();
        match step {
            NextStep::Question(q) => {
                assert_eq!(q.text, "¿Qué necesitas?");
                assert_eq!(q.options, vec!["Web", "App"]);
            }
            other => panic!("expected question, got {other:?}"),
        }

        let requests = api.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0]["answers"], json!(["Sí"]));
        assert_eq!(requests[0]["serviceType"], "empresa");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn client_decodes_recommendation() {
    timeout(TEST_TIMEOUT, async {
        let api = FakeApi::new(vec![recommendation("Landing page, 2 weeks")]);
        let client = start_fake_api(api).await;
        let step = client.fetch_next(&[], ServiceType::Individual).await.unwrap();
        assert_eq!(
            step,
            NextStep::Recommendation("Landing page, 2 weeks".to_string())
        );
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn client_surfaces_api_error_text() {
    timeout(TEST_TIMEOUT, async {
        let api = FakeApi::new(vec![(
            StatusCode::BAD_REQUEST,
            json!({"error": "Respuestas inválidas."}),
        )]);
        let client = start_fake_api(api).await;
        let err = client
            .fetch_next(&[], ServiceType::Individual)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Status { status: 400, .. }));
        assert_eq!(err.api_message(), Some("Respuestas inválidas."));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn client_rejects_unknown_reply_type() {
    timeout(TEST_TIMEOUT, async {
        let api = FakeApi::new(vec![(StatusCode::OK, json!({"type": "banner"}))]);
        let client = start_fake_api(api).await;
        let err = client
            .fetch_next(&[], ServiceType::Individual)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Protocol { .. }));
    })
    .await
    .expect("test timed out");
}

// ── Advisor REST API ────────────────────────────────────────────────────

#[tokio::test]
async fn full_wizard_flow_persists_recommendation() {
    timeout(TEST_TIMEOUT, async {
        let api = FakeApi::new(vec![
            question("q1", &["A", "B"]),
            question("q2", &[]),
            question("q3", &["Web", "iOS", "Android"]),
            recommendation("Landing page, 2 weeks"),
        ]);
        let store = Arc::new(LibSqlStore::new_memory().await.unwrap());
        let base = start_advisor(api.clone(), store.clone()).await;

        let (status, snapshot) = post_json(
            &base,
            "/api/advisor/service-type",
            json!({"serviceType": "persona"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(snapshot["current_question"]["text"], "q1");

        let (status, snapshot) =
            post_json(&base, "/api/advisor/answer", json!({"answer": "A"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(snapshot["free_text"], true);
        let (status, snapshot) =
            post_json(&base, "/api/advisor/answer", json!({"answer": "  free text  "})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(snapshot["step_index"], 2);

        for value in ["Web", "Android"] {
            let (status, _) = post_json(
                &base,
                "/api/advisor/pending",
                json!({"value": value, "multiple": true}),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }
        let (status, snapshot) = post_json(&base, "/api/advisor/answer", json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(snapshot["status"]["kind"], "terminal");

        let requests = api.requests();
        assert_eq!(requests.len(), 4);
        assert_eq!(requests[0]["answers"], json!([]));
        assert_eq!(
            requests[3]["answers"],
            json!(["A", "free text", "Web, Android"])
        );

        assert_eq!(
            store
                .get("project_advisor_recommendation_persona")
                .await
                .as_deref(),
            Some("Landing page, 2 weeks")
        );
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn returning_user_sees_prior_choice() {
    timeout(TEST_TIMEOUT, async {
        let store = Arc::new(LibSqlStore::new_memory().await.unwrap());
        store
            .set("project_advisor_recommendation_empresa", "Portal Next.js + CMS")
            .await;
        let api = FakeApi::new(vec![]);
        let base = start_advisor(api.clone(), store).await;

        let (status, snapshot) = post_json(
            &base,
            "/api/advisor/service-type",
            json!({"serviceType": "empresa"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(snapshot["status"]["kind"], "prior_choice_pending");
        assert_eq!(snapshot["status"]["previous"], "Portal Next.js + CMS");

        let (status, snapshot) = post_json(&base, "/api/advisor/previous", json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(snapshot["status"]["recommendation"], "Portal Next.js + CMS");
        assert!(api.requests().is_empty());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn api_failure_then_retry() {
    timeout(TEST_TIMEOUT, async {
        let api = FakeApi::new(vec![
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": "Servicio no disponible."}),
            ),
            question("q1", &["Sí", "No"]),
        ]);
        let store = Arc::new(LibSqlStore::new_memory().await.unwrap());
        let base = start_advisor(api, store).await;

        let (status, body) = post_json(
            &base,
            "/api/advisor/service-type",
            json!({"serviceType": "empresa"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["state"]["status"]["kind"], "failed");
        assert_eq!(body["state"]["status"]["message"], "Servicio no disponible.");

        let (status, snapshot) = post_json(&base, "/api/advisor/retry", json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(snapshot["status"]["kind"], "ready");
        assert_eq!(snapshot["current_question"]["text"], "q1");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn back_and_reset_over_http() {
    timeout(TEST_TIMEOUT, async {
        let api = FakeApi::new(vec![question("q1", &["A"]), question("q2", &["B"])]);
        let store = Arc::new(LibSqlStore::new_memory().await.unwrap());
        let base = start_advisor(api, store).await;

        post_json(
            &base,
            "/api/advisor/service-type",
            json!({"serviceType": "persona"}),
        )
        .await;
        post_json(&base, "/api/advisor/answer", json!({"answer": "A"})).await;

        let (status, snapshot) = post_json(&base, "/api/advisor/back", json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(snapshot["current_question"]["text"], "q1");
        assert_eq!(snapshot["answers"], json!([]));

        let (status, snapshot) = post_json(&base, "/api/advisor/reset", json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(snapshot["status"]["kind"], "idle");
        assert_eq!(snapshot["service_type"], Value::Null);
    })
    .await
    .expect("test timed out");
}
