use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, Response, StatusCode};
use axum::Router;
use loyalty_dispatch::{DispatchConfig, Dispatcher};
use loyalty_provisioning::Provisioner;
use loyalty_store::{MemoryStore, Store};
use loyalty_wallet_pass::types::{CreateIssuer, PassPayload, RegisterCard};
use loyalty_wallet_pass::{Object, WalletPass, WalletPassError};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::config::ServerConfig;
use crate::notifications::NotificationHub;
use crate::router;
use crate::state::ServiceState;


const ADDRESS: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

#[derive(Default)]
struct FakeWalletPass {
    calls: Mutex<Vec<&'static str>>,
    project_status: Option<u16>,
    pass_status: Option<u16>,
}

impl FakeWalletPass {
    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }
}

fn rejected(status: u16, message: &str) -> WalletPassError {
    WalletPassError::Upstream {
        status,
        message: Some(message.to_owned()),
        body: json!({ "message": message }),
    }
}

fn object(value: Value) -> Object {
    let Value::Object(object) = value else {
        unreachable!()
    };
    object
}

#[async_trait]
impl WalletPass for FakeWalletPass {
    async fn create_project(&self, _project_name: &str) -> Result<Object, WalletPassError> {
        self.record("create-project");
        match self.project_status {
            Some(status) => Err(rejected(status, "Invalid project")),
            None => Ok(object(json!({ "id": "prj_1", "apiKey": "key_1" }))),
        }
    }

    async fn create_issuer(&self, _request: &CreateIssuer) -> Result<Object, WalletPassError> {
        self.record("create-issuer");
        Ok(object(json!({ "cardSlug": "slug_1", "issuerId": "iss_1" })))
    }

    async fn register_card(&self, _request: &RegisterCard) -> Result<Object, WalletPassError> {
        self.record("register-card");
        Ok(object(json!({ "cardId": "card_1" })))
    }

    async fn create_pass(&self, payload: &PassPayload) -> Result<Value, WalletPassError> {
        self.record("create-pass");
        match self.pass_status {
            Some(status) => Err(rejected(status, "Template not found")),
            None => Ok(json!({ "id": payload.id, "platform": payload.params.platform })),
        }
    }

    async fn card_data(&self, card_slug: &str) -> Result<Value, WalletPassError> {
        self.record("card-data");
        if card_slug == "unknown" {
            return Err(rejected(404, "Card not found"));
        }
        Ok(json!({ "cardSlug": card_slug, "cardName": "Summer" }))
    }
}

fn state_with(wallet_pass: Arc<FakeWalletPass>, passes: Option<loyalty_pkpass::PassBuilder>) -> Arc<ServiceState> {
    Arc::new(ServiceState::new(
        Provisioner::new(
            wallet_pass.clone(),
            Store::new(MemoryStore::default()),
            "https://assets.test/icon.png".to_owned(),
        ),
        Dispatcher::new(
            wallet_pass.clone(),
            DispatchConfig::new(
                "https://loyalty.test".to_owned(),
                "template".to_owned(),
                "https://assets.test/logo.png".to_owned(),
            ),
        ),
        wallet_pass,
        passes,
        NotificationHub::new(Duration::from_secs(60)),
    ))
}

fn app(wallet_pass: &Arc<FakeWalletPass>) -> Router {
    app_with(state_with(wallet_pass.clone(), None))
}

fn app_with(state: Arc<ServiceState>) -> Router {
    let config = ServerConfig::new(
        "127.0.0.1:0".parse().unwrap(),
        "https://loyalty.test".to_owned(),
        true,
    );
    router(&config, state)
}

fn post(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn text_body(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn health_reports_alive() {
    let wallet_pass = Arc::new(FakeWalletPass::default());

    let response = app(&wallet_pass).oneshot(get("/api/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "data": { "status": "alive" } }));
}

#[tokio::test]
async fn merchant_project_is_provisioned() {
    let wallet_pass = Arc::new(FakeWalletPass::default());

    let response = app(&wallet_pass)
        .oneshot(post(
            "/api/merchant-project-create",
            &json!({ "projectName": "cafe1", "username": "alice", "cardColor": "#000000" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({ "success": true, "cardSlug": "slug_1", "issuerId": "iss_1", "cardId": "card_1" })
    );
    assert_eq!(
        wallet_pass.calls(),
        ["create-project", "create-issuer", "register-card"]
    );
}

#[tokio::test]
async fn merchant_project_rejection_is_passed_through() {
    let wallet_pass = Arc::new(FakeWalletPass {
        project_status: Some(400),
        ..FakeWalletPass::default()
    });

    let response = app(&wallet_pass)
        .oneshot(post(
            "/api/merchant-project-create",
            &json!({ "projectName": "cafe1", "username": "alice" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({ "success": false, "message": "Invalid project" })
    );
    assert_eq!(wallet_pass.calls(), ["create-project"]);
}

#[tokio::test]
async fn merchant_project_requires_username() {
    let wallet_pass = Arc::new(FakeWalletPass::default());

    let response = app(&wallet_pass)
        .oneshot(post("/api/merchant-project-create", &json!({ "projectName": "cafe1" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "Missing projectName or username" })
    );
    assert!(wallet_pass.calls().is_empty());
}

#[tokio::test]
async fn legacy_route_fixes_platform() {
    let wallet_pass = Arc::new(FakeWalletPass::default());

    let response = app(&wallet_pass)
        .oneshot(post(
            "/api/jwtToken",
            &json!({ "campaign": "Summer", "ethAddress": ADDRESS, "cardId": "card7", "platform": "apple" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({ "id": format!("card7-{ADDRESS}"), "platform": "google" })
    );
}

#[tokio::test]
async fn dispatch_rejection_keeps_status() {
    let wallet_pass = Arc::new(FakeWalletPass {
        pass_status: Some(404),
        ..FakeWalletPass::default()
    });

    let response = app(&wallet_pass)
        .oneshot(post(
            "/api/wallet-passes",
            &json!({ "campaign": "Summer", "ethAddress": ADDRESS, "cardId": "card7", "platform": "google" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        json_body(response).await,
        json!({ "error": { "message": "Template not found" } })
    );
}

#[tokio::test]
async fn dispatch_validates_before_calling_out() {
    let wallet_pass = Arc::new(FakeWalletPass::default());

    let response = app(&wallet_pass)
        .oneshot(post(
            "/api/generatePkpass",
            &json!({ "campaign": "Summer", "ethAddress": "0x123", "cardId": "card7" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(wallet_pass.calls().is_empty());
}

#[tokio::test]
async fn callback_reaches_subscriber() {
    let wallet_pass = Arc::new(FakeWalletPass::default());
    let app = app(&wallet_pass);
    let job = format!("card7-{ADDRESS}");

    let response = app
        .clone()
        .oneshot(post(
            "/api/wallet-pass-callback",
            &json!({ "id": job, "fileURL": "https://files.test/card7.pkpass" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({ "received": true, "subscribers": 0 })
    );

    let response = app
        .oneshot(get(&format!("/api/wallet-pass-callback?id={job}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/event-stream"
    );

    let body = text_body(response).await;
    assert!(body.contains("event: message\n"), "{body}");
    assert!(
        body.contains(r#"data: {"fileURL":"https://files.test/card7.pkpass"}"#),
        "{body}"
    );
}

#[tokio::test]
async fn callback_without_file_url_is_rejected() {
    let wallet_pass = Arc::new(FakeWalletPass::default());

    let response = app(&wallet_pass)
        .oneshot(post("/api/wallet-pass-callback", &json!({ "id": "card7-0x1" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn card_data_is_proxied() {
    let wallet_pass = Arc::new(FakeWalletPass::default());
    let app = app(&wallet_pass);

    let response = app
        .clone()
        .oneshot(get("/api/cardData?cardSlug=slug_1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["cardName"], "Summer");

    let response = app
        .clone()
        .oneshot(get("/api/cardData?cardSlug=unknown"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(get("/api/cardData")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn preflight_allows_any_origin() {
    let wallet_pass = Arc::new(FakeWalletPass::default());

    let response = app(&wallet_pass)
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/api/wallet-passes")
                .header(header::ORIGIN, "https://front.test")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "x-stl-key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}
