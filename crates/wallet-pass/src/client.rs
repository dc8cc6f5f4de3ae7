use core::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::config::WalletPassConfig;
use crate::error::WalletPassError;
use crate::types::{CreateIssuer, CreateProject, PassPayload, RegisterCard};
use crate::{Object, WalletPass};

const STL_KEY_HEADER: &str = "x-stl-key";

#[derive(Clone, Debug)]
pub struct HttpWalletPass {
    base_url: Url,
    client: Client,
    bearer_token: Option<String>,
}

impl HttpWalletPass {
    pub fn new(config: &WalletPassConfig) -> Result<Self, WalletPassError> {
        let mut headers = HeaderMap::new();
        drop(headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json")));
        if let Some(api_key) = &config.api_key {
            if let Ok(value) = HeaderValue::from_str(api_key) {
                drop(headers.insert(STL_KEY_HEADER, value));
            } else {
                warn!("Ignoring wallet-pass api key with invalid header characters");
            }
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            base_url: config.url.clone(),
            client,
            bearer_token: config.bearer_token.clone(),
        })
    }

    /// Appends `segments` to the base URL, the way the service documents its
    /// paths relative to whatever prefix it is deployed under.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, WalletPassError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| WalletPassError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    fn authorize(&self, mut request: RequestBuilder) -> RequestBuilder {
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }
        request
    }

    async fn post<B: Serialize + Sync>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<Value, WalletPassError> {
        let url = self.endpoint(segments)?;
        debug!(%url, "POST to wallet-pass service");

        let response = self
            .authorize(self.client.post(url))
            .json(body)
            .send()
            .await?;

        read_json(response).await
    }

    async fn get(&self, segments: &[&str]) -> Result<Value, WalletPassError> {
        let url = self.endpoint(segments)?;
        debug!(%url, "GET from wallet-pass service");

        let response = self.authorize(self.client.get(url)).send().await?;

        read_json(response).await
    }
}

/// Parses the body as JSON whatever the declared content type, then maps
/// non-2xx statuses onto [`WalletPassError::Upstream`].
async fn read_json(response: Response) -> Result<Value, WalletPassError> {
    let status = response.status();
    let text = response.text().await?;

    let body: Value = match serde_json::from_str(&text) {
        Ok(body) => body,
        Err(err) => {
            warn!(status = status.as_u16(), %err, body = %text, "Unparsable wallet-pass response");
            return Err(WalletPassError::Malformed {
                status: status.as_u16(),
                body: text,
            });
        }
    };

    if !status.is_success() {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_owned);
        warn!(status = status.as_u16(), %body, "Wallet-pass service rejected request");
        return Err(WalletPassError::Upstream {
            status: status.as_u16(),
            message,
            body,
        });
    }

    Ok(body)
}

fn into_object(value: Value, status: u16) -> Result<Object, WalletPassError> {
    match value {
        Value::Object(object) => Ok(object),
        other => Err(WalletPassError::Malformed {
            status,
            body: other.to_string(),
        }),
    }
}

#[async_trait]
impl WalletPass for HttpWalletPass {
    async fn create_project(&self, project_name: &str) -> Result<Object, WalletPassError> {
        let body = CreateProject {
            project: project_name.to_owned(),
        };
        let value = self.post(&["projects"], &body).await?;
        into_object(value, 200)
    }

    async fn create_issuer(&self, request: &CreateIssuer) -> Result<Object, WalletPassError> {
        let value = self
            .post(&["merchant-logins", "create-issuer"], request)
            .await?;
        into_object(value, 200)
    }

    async fn register_card(&self, request: &RegisterCard) -> Result<Object, WalletPassError> {
        let value = self
            .post(&["merchant-logins", "register-card"], request)
            .await?;
        into_object(value, 200)
    }

    async fn create_pass(&self, payload: &PassPayload) -> Result<Value, WalletPassError> {
        self.post(&["wallet-passes"], payload).await
    }

    async fn card_data(&self, card_slug: &str) -> Result<Value, WalletPassError> {
        self.get(&["merchant-logins", "get-data", card_slug]).await
    }
}
