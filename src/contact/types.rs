use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const ROLES: [&str; 5] = ["radiologist", "it-director", "administrator", "researcher", "other"];
pub const INTERESTS: [&str; 6] = ["xray", "ct", "mri", "pathology", "integration", "enterprise"];

/// Raw form body as posted by the site
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactForm {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub organization: Option<String>,
    pub role: Option<String>,
    pub interest: Option<String>,
    pub message: Option<String>,
    pub consent: Option<bool>
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub organization: Option<String>,
    pub role: Option<String>,
    pub interest: Option<String>,
    pub message: Option<String>,
    pub consent: bool,
    pub created: DateTime<Utc>
}
