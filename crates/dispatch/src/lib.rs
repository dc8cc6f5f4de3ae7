//! Builds the platform-specific pass-creation request for a claim and hands
//! it to the wallet-pass service.
//!
//! Acceptance is all this crate reports: the pass itself arrives later via
//! the callback, see [`loyalty_primitives::notification`].

use std::sync::Arc;

use loyalty_primitives::claim::{Claim, ClaimRequest, INITIAL_POINTS, INITIAL_TIER};
use loyalty_primitives::job::ExternalId;
use loyalty_primitives::notification::CALLBACK_PATH;
use loyalty_primitives::platform::Platform;
use loyalty_wallet_pass::types::{
    ApplePass, Field, GooglePass, Image, PassContent, PassParams, PassPayload,
};
use loyalty_wallet_pass::WalletPass;
use serde_json::Value;
use tracing::{debug, info};

mod error;

pub use error::DispatchError;

#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct DispatchConfig {
    /// Public URL of this service. Used for the callback when the caller
    /// does not supply a base URL, and for the back-of-pass link.
    pub root_url: String,
    pub template_id: String,
    /// Google pass logo.
    pub logo_url: String,
}

impl DispatchConfig {
    #[must_use]
    pub const fn new(root_url: String, template_id: String, logo_url: String) -> Self {
        Self {
            root_url,
            template_id,
            logo_url,
        }
    }
}

/// A job the wallet-pass service accepted.
#[derive(Clone, Debug)]
pub struct Dispatched {
    pub job: ExternalId,
    /// The service's response, passed through to the caller.
    pub response: Value,
}

#[derive(Clone)]
pub struct Dispatcher {
    wallet_pass: Arc<dyn WalletPass>,
    config: DispatchConfig,
}

impl Dispatcher {
    pub fn new(wallet_pass: Arc<dyn WalletPass>, config: DispatchConfig) -> Self {
        Self {
            wallet_pass,
            config,
        }
    }

    /// Validates `request` and submits it. `platform` is used when the
    /// request does not carry one.
    pub async fn dispatch(
        &self,
        request: ClaimRequest,
        platform: Option<Platform>,
    ) -> Result<Dispatched, DispatchError> {
        let claim = request.validate(platform)?;
        let payload = self.payload(&claim);

        debug!(external_id = %claim.job, platform = %claim.platform, ?payload, "Submitting pass request");

        let response = self
            .wallet_pass
            .create_pass(&payload)
            .await
            .map_err(|err| DispatchError::from_wallet_pass(&claim.job, err))?;

        info!(external_id = %claim.job, platform = %claim.platform, "Pass request accepted");

        Ok(Dispatched {
            job: claim.job,
            response,
        })
    }

    /// The request body for `claim`, without submitting it.
    #[must_use]
    pub fn payload(&self, claim: &Claim) -> PassPayload {
        let external_id = claim.job.to_string();

        let pass = match claim.platform {
            Platform::Google => PassContent::Google(GooglePass {
                logo: Image::from_uri(&self.config.logo_url),
            }),
            Platform::Apple => PassContent::Apple(self.apple_pass(claim)),
        };

        PassPayload {
            id: external_id.clone(),
            callback_url: self.callback_url(claim.base_url.as_deref()),
            params: PassParams {
                template_id: claim
                    .template_id
                    .clone()
                    .unwrap_or_else(|| self.config.template_id.clone()),
                platform: claim.platform.to_string(),
                external_id,
                pass,
            },
        }
    }

    fn apple_pass(&self, claim: &Claim) -> ApplePass {
        let website = format!(
            "{}/home?card_id={}",
            self.config.root_url.trim_end_matches('/'),
            claim.job.card_id()
        );

        ApplePass {
            description: claim.campaign.clone(),
            back_fields: vec![Field::new("website", "Link", &website).with_attributed_value("Website")],
            secondary_fields: vec![Field::new("points", "Points", INITIAL_POINTS)
                .with_text_alignment("PKTextAlignmentLeft")],
            auxiliary_fields: vec![
                Field::new("tier", "Tier", INITIAL_TIER),
                Field::new("userAddr", "Member Address", claim.job.eth_address().as_str()),
            ],
        }
    }

    fn callback_url(&self, base_url: Option<&str>) -> String {
        let base = base_url.unwrap_or(&self.config.root_url);
        format!("{}{CALLBACK_PATH}", base.trim_end_matches('/'))
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
