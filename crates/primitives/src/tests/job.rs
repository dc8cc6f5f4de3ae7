use serde_json::json;

use crate::job::{parse_serial_number, CardId, EthAddress, ExternalId};
use crate::validation::ValidationError;

const ADDRESS: &str = "0xCbb550c056Dd9092B20aE890EE27b987a1e46dfB";

#[test]
fn test_external_id_format() {
    let id = ExternalId::from_parts("awesome_sauce", ADDRESS).unwrap();
    assert_eq!(id.to_string(), format!("awesome_sauce-{ADDRESS}"));
}

#[test]
fn test_external_id_is_deterministic() {
    let first = ExternalId::from_parts("cafe1", ADDRESS).unwrap();
    let second = ExternalId::from_parts("cafe1", ADDRESS).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.to_string(), second.to_string());
}

#[test]
fn test_parse_serial_number_recovers_parts() {
    let serial = format!("awesome_sauce-{ADDRESS}");
    let details = parse_serial_number(&serial, "Awesome Sauce").unwrap();

    assert_eq!(details.card_id.as_str(), "awesome_sauce");
    assert_eq!(details.eth_address.as_str(), ADDRESS);
    assert_eq!(details.campaign, "Awesome Sauce");
}

#[test]
fn test_parse_serial_number_round_trips_dispatch_id() {
    for card in ["a", "card_01", "Summer2025", "x.y"] {
        let id = ExternalId::from_parts(card, ADDRESS).unwrap();
        let details = parse_serial_number(&id.to_string(), "Summer").unwrap();
        assert_eq!(details.card_id.as_str(), card);
        assert_eq!(details.eth_address.as_str(), ADDRESS);
    }
}

#[test]
fn test_card_id_rejects_separator() {
    let err = "summer-2025".parse::<CardId>().unwrap_err();
    assert_eq!(err, ValidationError::CardIdSeparator("summer-2025".to_owned()));
}

#[test]
fn test_card_id_rejects_empty() {
    let err = "  ".parse::<CardId>().unwrap_err();
    assert_eq!(err, ValidationError::Missing("cardId"));
}

#[test]
fn test_eth_address_validation() {
    assert!(ADDRESS.parse::<EthAddress>().is_ok());
    assert!("0x1234".parse::<EthAddress>().is_err());
    assert!("Cbb550c056Dd9092B20aE890EE27b987a1e46dfB00"
        .parse::<EthAddress>()
        .is_err());
    assert!("0xZbb550c056Dd9092B20aE890EE27b987a1e46dfB"
        .parse::<EthAddress>()
        .is_err());
}

#[test]
fn test_serial_number_without_separator_is_rejected() {
    let err = parse_serial_number("nothinghere", "Summer").unwrap_err();
    assert_eq!(
        err,
        ValidationError::InvalidSerialNumber("nothinghere".to_owned())
    );
}

#[test]
fn test_serial_number_with_extra_separator_is_rejected() {
    // the address part after the first `-` is no longer a valid address
    let serial = format!("summer-2025-{ADDRESS}");
    assert!(parse_serial_number(&serial, "Summer").is_err());
}

#[test]
fn test_external_id_serde() {
    let id = ExternalId::from_parts("cafe1", ADDRESS).unwrap();
    let value = serde_json::to_value(&id).unwrap();
    assert_eq!(value, json!(format!("cafe1-{ADDRESS}")));

    let back: ExternalId = serde_json::from_value(value).unwrap();
    assert_eq!(back, id);
}
