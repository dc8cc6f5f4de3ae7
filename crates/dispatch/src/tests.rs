use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use loyalty_primitives::claim::{ClaimRequest, INITIAL_POINTS, INITIAL_TIER};
use loyalty_primitives::platform::Platform;
use loyalty_wallet_pass::types::{CreateIssuer, PassPayload, RegisterCard};
use loyalty_wallet_pass::{Object, WalletPass, WalletPassError};
use serde_json::{json, Value};

use crate::{DispatchConfig, DispatchError, Dispatcher};

const ADDRESS: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
const LOGO: &str = "https://assets.test/logo.png";

enum Reply {
    Accept,
    Reject(u16),
    Garbage,
}

struct FakeWalletPass {
    reply: Reply,
    sent: Mutex<Vec<Value>>,
}

impl FakeWalletPass {
    fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            sent: Mutex::new(Vec::new()),
        })
    }

    fn sent(&self) -> Vec<Value> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl WalletPass for FakeWalletPass {
    async fn create_project(&self, _project_name: &str) -> Result<Object, WalletPassError> {
        unreachable!()
    }

    async fn create_issuer(&self, _request: &CreateIssuer) -> Result<Object, WalletPassError> {
        unreachable!()
    }

    async fn register_card(&self, _request: &RegisterCard) -> Result<Object, WalletPassError> {
        unreachable!()
    }

    async fn create_pass(&self, payload: &PassPayload) -> Result<Value, WalletPassError> {
        self.sent
            .lock()
            .unwrap()
            .push(serde_json::to_value(payload).unwrap());

        match self.reply {
            Reply::Accept => Ok(json!({ "id": payload.id, "status": "PENDING" })),
            Reply::Reject(status) => Err(WalletPassError::Upstream {
                status,
                message: Some("Template not found".to_owned()),
                body: json!({ "message": "Template not found" }),
            }),
            Reply::Garbage => Err(WalletPassError::Malformed {
                status: 200,
                body: "<html>".to_owned(),
            }),
        }
    }

    async fn card_data(&self, _card_slug: &str) -> Result<Value, WalletPassError> {
        unreachable!()
    }
}

fn dispatcher(wallet_pass: &Arc<FakeWalletPass>) -> Dispatcher {
    Dispatcher::new(
        wallet_pass.clone(),
        DispatchConfig::new(
            "https://loyalty.test/".to_owned(),
            "default-template".to_owned(),
            LOGO.to_owned(),
        ),
    )
}

#[tokio::test]
async fn google_claim_sends_logo() {
    let wallet_pass = FakeWalletPass::new(Reply::Accept);

    let mut request = ClaimRequest::new("Summer", ADDRESS, "card7", Platform::Google);
    request.base_url = Some("https://front.test".to_owned());

    let dispatched = dispatcher(&wallet_pass).dispatch(request, None).await.unwrap();

    let external_id = format!("card7-{ADDRESS}");
    assert_eq!(dispatched.job.to_string(), external_id);
    assert_eq!(dispatched.response["status"], json!("PENDING"));

    let sent = wallet_pass.sent();
    assert_eq!(sent.len(), 1);
    let payload = &sent[0];
    assert_eq!(payload["id"], json!(external_id));
    assert_eq!(
        payload["callbackUrl"],
        json!("https://front.test/api/wallet-pass-callback")
    );
    assert_eq!(payload["params"]["platform"], json!("google"));
    assert_eq!(payload["params"]["externalId"], json!(external_id));
    assert_eq!(payload["params"]["templateId"], json!("default-template"));
    assert_eq!(payload["params"]["pass"]["logo"]["sourceUri"]["uri"], json!(LOGO));
}

#[tokio::test]
async fn apple_claim_describes_campaign() {
    let wallet_pass = FakeWalletPass::new(Reply::Accept);

    let mut request = ClaimRequest::new("Summer", ADDRESS, "card7", Platform::Apple);
    request.template_id = Some("custom-template".to_owned());

    let _dispatched = dispatcher(&wallet_pass).dispatch(request, None).await.unwrap();

    let sent = wallet_pass.sent();
    let params = &sent[0]["params"];
    let pass = &params["pass"];

    assert_eq!(params["platform"], json!("apple"));
    assert_eq!(params["templateId"], json!("custom-template"));
    assert_eq!(
        sent[0]["callbackUrl"],
        json!("https://loyalty.test/api/wallet-pass-callback")
    );
    assert_eq!(pass["description"], json!("Summer"));
    assert_eq!(
        pass["auxiliaryFields"],
        json!([
            { "key": "tier", "label": "Tier", "value": INITIAL_TIER },
            { "key": "userAddr", "label": "Member Address", "value": ADDRESS },
        ])
    );
    assert_eq!(pass["secondaryFields"][0]["key"], json!("points"));
    assert_eq!(pass["secondaryFields"][0]["value"], json!(INITIAL_POINTS));
    assert_eq!(
        pass["backFields"][0]["value"],
        json!("https://loyalty.test/home?card_id=card7")
    );
    assert!(pass.get("logo").is_none());
}

#[tokio::test]
async fn route_platform_fills_in_missing_one() {
    let wallet_pass = FakeWalletPass::new(Reply::Accept);

    let mut request = ClaimRequest::new("Summer", ADDRESS, "card7", Platform::Apple);
    request.platform = None;

    let _dispatched = dispatcher(&wallet_pass)
        .dispatch(request, Some(Platform::Google))
        .await
        .unwrap();

    assert_eq!(wallet_pass.sent()[0]["params"]["platform"], json!("google"));
}

#[tokio::test]
async fn invalid_claim_is_never_sent() {
    let wallet_pass = FakeWalletPass::new(Reply::Accept);

    let request = ClaimRequest::new("Summer", ADDRESS, "card-7", Platform::Google);
    let err = dispatcher(&wallet_pass).dispatch(request, None).await.unwrap_err();

    assert!(matches!(err, DispatchError::Validation(_)));
    assert_eq!(err.status(), 400);
    assert!(wallet_pass.sent().is_empty());
}

#[tokio::test]
async fn rejection_keeps_remote_status_and_body() {
    let wallet_pass = FakeWalletPass::new(Reply::Reject(404));

    let request = ClaimRequest::new("Summer", ADDRESS, "card7", Platform::Apple);
    let err = dispatcher(&wallet_pass).dispatch(request, None).await.unwrap_err();

    assert_eq!(err.status(), 404);
    let DispatchError::Upstream { body, .. } = err else {
        panic!("expected upstream error, got {err:?}");
    };
    assert_eq!(body["message"], json!("Template not found"));
}

#[tokio::test]
async fn garbage_response_is_reported() {
    let wallet_pass = FakeWalletPass::new(Reply::Garbage);

    let request = ClaimRequest::new("Summer", ADDRESS, "card7", Platform::Google);
    let err = dispatcher(&wallet_pass).dispatch(request, None).await.unwrap_err();

    assert!(matches!(err, DispatchError::Malformed { status: 200, .. }));
    assert_eq!(err.status(), 502);
}
