use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub const DEFAULT_STRENGTH: u8 = 85;
pub const MAX_STUDY_ID_LENGTH: usize = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Xray,
    Ct,
    Mri,
    Pathology
}

impl Modality {
    pub const ALL: [Modality; 4] = [Modality::Xray, Modality::Ct, Modality::Mri, Modality::Pathology];

    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Xray => "xray",
            Modality::Ct => "ct",
            Modality::Mri => "mri",
            Modality::Pathology => "pathology"
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Modality {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Modality::ALL.into_iter().find(|m| m.as_str() == s).ok_or(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Enhancement {
    SuperResolution,
    Denoising,
    Harmonization
}

impl Enhancement {
    pub const ALL: [Enhancement; 3] =
        [Enhancement::SuperResolution, Enhancement::Denoising, Enhancement::Harmonization];

    pub fn as_str(&self) -> &'static str {
        match self {
            Enhancement::SuperResolution => "super-resolution",
            Enhancement::Denoising => "denoising",
            Enhancement::Harmonization => "harmonization"
        }
    }
}

impl fmt::Display for Enhancement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Enhancement {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Enhancement::ALL.into_iter().find(|e| e.as_str() == s).ok_or(())
    }
}

/// Observable job state. `Failed` exists in the stored schema but nothing
/// ever produces it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Processing,
    Completed,
    Failed
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed"
        }
    }
}

/// A stored demo job. Written once, never updated.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DemoJob {
    pub id: Uuid,
    pub modality: Modality,
    pub study_id: String,
    pub enhancement: Enhancement,
    pub strength: u8,
    pub created: DateTime<Utc>
}

/// Raw submission, validated by the registry before anything is stored
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRequest {
    pub modality: Option<String>,
    pub study_id: Option<String>,
    pub enhancement: Option<String>,
    pub strength: Option<f64>
}

/// Point-in-time view of a job, as served to pollers
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusReport {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub progress: u8,
    pub modality: Modality,
    pub enhancement: Enhancement,
    pub strength: u8,
    pub created_at: String,
    pub estimated_completion: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>
}
