use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CreateProject {
    pub project: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIssuer {
    pub username: String,
    pub card_name: String,
    /// Forwarded as the service returned it.
    pub project_id: Value,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterCard {
    pub card_slug: Value,
    pub card_icon: String,
    pub card_color: String,
}

/// Body of `POST /wallet-passes`.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassPayload {
    pub id: String,
    pub callback_url: String,
    pub params: PassParams,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassParams {
    pub template_id: String,
    pub platform: String,
    pub external_id: String,
    pub pass: PassContent,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PassContent {
    Apple(ApplePass),
    Google(GooglePass),
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct GooglePass {
    pub logo: Image,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub source_uri: SourceUri,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SourceUri {
    pub uri: String,
}

impl Image {
    #[must_use]
    pub fn from_uri(uri: &str) -> Self {
        Self {
            source_uri: SourceUri {
                uri: uri.to_owned(),
            },
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplePass {
    pub description: String,
    pub back_fields: Vec<Field>,
    pub secondary_fields: Vec<Field>,
    pub auxiliary_fields: Vec<Field>,
}

/// A labelled value on the front or back of a pass.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub key: String,
    pub label: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributed_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_alignment: Option<String>,
}

impl Field {
    #[must_use]
    pub fn new(key: &str, label: &str, value: &str) -> Self {
        Self {
            key: key.to_owned(),
            label: label.to_owned(),
            value: value.to_owned(),
            attributed_value: None,
            text_alignment: None,
        }
    }

    #[must_use]
    pub fn with_attributed_value(mut self, attributed_value: &str) -> Self {
        self.attributed_value = Some(attributed_value.to_owned());
        self
    }

    #[must_use]
    pub fn with_text_alignment(mut self, text_alignment: &str) -> Self {
        self.text_alignment = Some(text_alignment.to_owned());
        self
    }
}
