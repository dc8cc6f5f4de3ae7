use serde::{Deserialize, Serialize};

use crate::job::ExternalId;
use crate::platform::Platform;
use crate::validation::{required, ValidationError};

/// Tier every new member starts in.
pub const INITIAL_TIER: &str = "Appreciator";

/// Points balance of a freshly claimed card.
pub const INITIAL_POINTS: &str = "0";

/// Body of a pass-creation request, as posted by the claim UI.
///
/// `platform` may be omitted when the route already fixes it.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRequest {
    #[serde(default)]
    pub campaign: Option<String>,
    #[serde(default)]
    pub eth_address: Option<String>,
    #[serde(default)]
    pub card_id: Option<String>,
    #[serde(default)]
    pub platform: Option<Platform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
}

/// A [`ClaimRequest`] whose fields have been checked.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Claim {
    pub job: ExternalId,
    pub campaign: String,
    pub platform: Platform,
    pub base_url: Option<String>,
    pub template_id: Option<String>,
}

impl ClaimRequest {
    #[must_use]
    pub fn new(campaign: &str, eth_address: &str, card_id: &str, platform: Platform) -> Self {
        Self {
            campaign: Some(campaign.to_owned()),
            eth_address: Some(eth_address.to_owned()),
            card_id: Some(card_id.to_owned()),
            platform: Some(platform),
            base_url: None,
            template_id: None,
        }
    }

    /// Validates the request. `fallback` is used when the body carries no
    /// platform of its own.
    pub fn validate(self, fallback: Option<Platform>) -> Result<Claim, ValidationError> {
        let card_id = required(self.card_id.as_deref(), "cardId")?;
        let eth_address = required(self.eth_address.as_deref(), "ethAddress")?;
        let job = ExternalId::from_parts(card_id, eth_address)?;
        let platform = self
            .platform
            .or(fallback)
            .ok_or(ValidationError::Missing("platform"))?;

        Ok(Claim {
            job,
            campaign: self.campaign.unwrap_or_default(),
            platform,
            base_url: self.base_url.filter(|url| !url.trim().is_empty()),
            template_id: self.template_id.filter(|id| !id.trim().is_empty()),
        })
    }
}
