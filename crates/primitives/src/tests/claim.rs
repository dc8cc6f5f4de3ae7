use serde_json::json;

use crate::claim::ClaimRequest;
use crate::merchant::{ProjectRequest, DEFAULT_CARD_COLOR};
use crate::notification::NotificationEvent;
use crate::platform::Platform;
use crate::validation::ValidationError;

const ADDRESS: &str = "0x44a5e49b97b1180aC90a07998AB9FA070A1b6504";

#[test]
fn test_claim_request_from_ui_body() {
    let body = json!({
        "campaign": "Summer",
        "ethAddress": ADDRESS,
        "cardId": "cafe1",
        "baseUrl": "https://claim.example",
    });

    let request: ClaimRequest = serde_json::from_value(body).unwrap();
    let claim = request.validate(Some(Platform::Google)).unwrap();

    assert_eq!(claim.platform, Platform::Google);
    assert_eq!(claim.campaign, "Summer");
    assert_eq!(claim.job.to_string(), format!("cafe1-{ADDRESS}"));
    assert_eq!(claim.base_url.as_deref(), Some("https://claim.example"));
    assert_eq!(claim.template_id, None);
}

#[test]
fn test_claim_request_platform_in_body_wins() {
    let request = ClaimRequest::new("Summer", ADDRESS, "cafe1", Platform::Apple);
    let claim = request.validate(Some(Platform::Google)).unwrap();
    assert_eq!(claim.platform, Platform::Apple);
}

#[test]
fn test_claim_request_requires_platform() {
    let mut request = ClaimRequest::new("Summer", ADDRESS, "cafe1", Platform::Apple);
    request.platform = None;
    assert_eq!(
        request.validate(None).unwrap_err(),
        ValidationError::Missing("platform")
    );
}

#[test]
fn test_claim_request_missing_fields() {
    let request: ClaimRequest = serde_json::from_value(json!({ "cardId": "cafe1" })).unwrap();
    assert_eq!(
        request.validate(Some(Platform::Apple)).unwrap_err(),
        ValidationError::Missing("ethAddress")
    );
}

#[test]
fn test_platform_parsing() {
    assert_eq!("google".parse::<Platform>().unwrap(), Platform::Google);
    assert_eq!("iOS".parse::<Platform>().unwrap(), Platform::Apple);
    assert!("windows".parse::<Platform>().is_err());
    assert_eq!(serde_json::to_value(Platform::Apple).unwrap(), json!("apple"));
}

#[test]
fn test_project_request_validation() {
    let missing: ProjectRequest =
        serde_json::from_value(json!({ "projectName": "cafe1" })).unwrap();
    let err = missing.validate().unwrap_err();
    assert_eq!(err.to_string(), "Missing projectName or username");

    let blank = ProjectRequest::new("cafe1", "   ", "#000000");
    assert!(blank.validate().is_err());

    let project: ProjectRequest =
        serde_json::from_value(json!({ "projectName": "cafe1", "username": "alice" })).unwrap();
    let project = project.validate().unwrap();
    assert_eq!(project.card_color, DEFAULT_CARD_COLOR);
}

#[test]
fn test_notification_event_wire_name() {
    let event: NotificationEvent =
        serde_json::from_value(json!({ "fileURL": "https://files.example/p.pkpass" })).unwrap();
    assert_eq!(event.file_url, "https://files.example/p.pkpass");
    assert_eq!(
        serde_json::to_value(&event).unwrap(),
        json!({ "fileURL": "https://files.example/p.pkpass" })
    );
}
