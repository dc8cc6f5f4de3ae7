//! The `pass.json` written into every bundle.

use loyalty_primitives::claim::INITIAL_TIER;
use serde::{Deserialize, Serialize};

use crate::config::PkpassConfig;
use crate::signing::SigningContext;
use crate::PassRequest;

pub const DEFINITION_FILE: &str = "pass.json";

pub const BARCODE_FORMAT_QR: &str = "PKBarcodeFormatQR";
pub const BARCODE_ENCODING: &str = "iso-8859-1";

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassDefinition {
    pub format_version: u8,
    pub description: String,
    pub organization_name: String,
    pub pass_type_identifier: String,
    pub serial_number: String,
    pub team_identifier: String,
    #[serde(rename = "webServiceURL")]
    pub web_service_url: String,
    pub authentication_token: String,
    pub logo_text: String,
    pub background_color: String,
    pub store_card: StoreCard,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub barcodes: Vec<Barcode>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreCard {
    pub primary_fields: Vec<PassField>,
    pub auxiliary_fields: Vec<PassField>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PassField {
    pub key: String,
    pub label: String,
    pub value: String,
}

impl PassField {
    #[must_use]
    pub fn new(key: &str, label: &str, value: &str) -> Self {
        Self {
            key: key.to_owned(),
            label: label.to_owned(),
            value: value.to_owned(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Barcode {
    pub message: String,
    pub format: String,
    pub message_encoding: String,
}

impl Barcode {
    #[must_use]
    pub fn qr(message: &str) -> Self {
        Self {
            message: message.to_owned(),
            format: BARCODE_FORMAT_QR.to_owned(),
            message_encoding: BARCODE_ENCODING.to_owned(),
        }
    }
}

impl PassDefinition {
    /// Serial number and barcode are set again at packaging time.
    #[must_use]
    pub fn for_request(config: &PkpassConfig, signing: &SigningContext, request: &PassRequest) -> Self {
        let campaign = &request.campaign;

        Self {
            format_version: 1,
            description: format!("Loyalty card for {campaign}"),
            organization_name: campaign.clone(),
            pass_type_identifier: config.pass_type_identifier.clone(),
            serial_number: request.job.to_string(),
            team_identifier: config.team_identifier.clone(),
            web_service_url: config.web_service_url.clone(),
            authentication_token: signing.auth_token().to_owned(),
            logo_text: campaign.clone(),
            background_color: config.background_color.clone(),
            store_card: StoreCard {
                primary_fields: vec![PassField::new("points", "Points", &request.balance)],
                auxiliary_fields: vec![
                    PassField::new("tier", "Tier", INITIAL_TIER),
                    PassField::new(
                        "userAddr",
                        "Member Address",
                        request.job.eth_address().as_str(),
                    ),
                ],
            },
            barcodes: Vec::new(),
        }
    }
}
