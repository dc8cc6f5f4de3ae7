use serde::{Deserialize, Serialize};

use crate::validation::ValidationError;

/// Card colour used when the merchant did not pick one.
pub const DEFAULT_CARD_COLOR: &str = "#E1AD01";

/// Body of `merchant-project-create`.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRequest {
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub card_color: Option<String>,
}

/// One merchant's project, ready to be provisioned.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MerchantProject {
    pub project_name: String,
    pub username: String,
    pub card_color: String,
}

impl ProjectRequest {
    #[must_use]
    pub fn new(project_name: &str, username: &str, card_color: &str) -> Self {
        Self {
            project_name: Some(project_name.to_owned()),
            username: Some(username.to_owned()),
            card_color: Some(card_color.to_owned()),
        }
    }

    pub fn validate(self) -> Result<MerchantProject, ValidationError> {
        let present = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        let (Some(project_name), Some(username)) =
            (present(self.project_name), present(self.username))
        else {
            return Err(ValidationError::Missing("projectName or username"));
        };

        Ok(MerchantProject {
            project_name,
            username,
            card_color: present(self.card_color)
                .unwrap_or_else(|| DEFAULT_CARD_COLOR.to_owned()),
        })
    }
}
