use crate::demo::simulation::{self, expected_seconds};
use crate::demo::types::{
    DemoJob, Enhancement, JobRequest, JobStatus, JobStatusReport, Modality,
    DEFAULT_STRENGTH, MAX_STUDY_ID_LENGTH
};
use crate::demo::util::handler::DemoJobHandler;
use crate::shared::types::app::{ApiError, FieldError};
use crate::shared::util::clock::{to_iso, Clock, IdProvider};
use crate::shared::util::handler::StoreError;

use chrono::Duration;
use std::sync::Arc;
use uuid::Uuid;

// Fresh v4 ids colliding this often means the id source is broken
const MAX_ID_ATTEMPTS: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("invalid job parameters")]
    Validation(Vec<FieldError>),

    #[error("no job with id `{0}`")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("could not allocate an unused job id")]
    IdExhausted
}

impl From<JobError> for ApiError {
    fn from(err: JobError) -> ApiError {
        let detail = err.to_string();
        match err {
            JobError::Validation(errors) => ApiError::Validation { message: "Invalid job parameters", errors },
            JobError::NotFound(_) => ApiError::NotFound("Job not found"),
            JobError::Store(_) | JobError::IdExhausted => ApiError::Internal {
                message: "Failed to process demo job",
                detail
            }
        }
    }
}

/// Validated fields of a [`JobRequest`]
struct NewJob {
    modality: Modality,
    study_id: String,
    enhancement: Enhancement,
    strength: u8
}

fn validate(request: JobRequest) -> Result<NewJob, Vec<FieldError>> {
    let mut errors = Vec::new();

    let modality = match request.modality.as_deref() {
        None => { errors.push(FieldError::new("modality", "Modality is required")); None },
        Some(raw) => match raw.parse::<Modality>() {
            Ok(m) => Some(m),
            Err(_) => {
                errors.push(FieldError::new("modality",
                    format!("Modality must be one of xray, ct, mri, pathology (got `{}`)", raw)));
                None
            }
        }
    };

    let study_id = request.study_id.unwrap_or_default();
    if study_id.trim().is_empty() {
        errors.push(FieldError::new("studyId", "Study ID is required"));
    } else if study_id.chars().count() > MAX_STUDY_ID_LENGTH {
        errors.push(FieldError::new("studyId", "Study ID too long"));
    }

    let enhancement = match request.enhancement.as_deref() {
        None => { errors.push(FieldError::new("enhancement", "Enhancement is required")); None },
        Some(raw) => match raw.parse::<Enhancement>() {
            Ok(e) => Some(e),
            Err(_) => {
                errors.push(FieldError::new("enhancement",
                    format!("Enhancement must be one of super-resolution, denoising, harmonization (got `{}`)", raw)));
                None
            }
        }
    };

    let strength = match request.strength {
        None => DEFAULT_STRENGTH,
        Some(s) if s.is_finite() => s.round().clamp(0.0, 100.0) as u8,
        Some(_) => {
            errors.push(FieldError::new("strength", "Strength must be a number"));
            DEFAULT_STRENGTH
        }
    };

    match (modality, enhancement) {
        (Some(modality), Some(enhancement)) if errors.is_empty() =>
            Ok(NewJob { modality, study_id, enhancement, strength }),
        _ => Err(errors)
    }
}

/// Creates demo jobs and answers status polls for them. Cheap to clone.
#[derive(Clone)]
pub struct Registry {
    handler: Arc<dyn DemoJobHandler>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdProvider>
}

impl Registry {
    pub fn new(handler: Arc<dyn DemoJobHandler>, clock: Arc<dyn Clock>, ids: Arc<dyn IdProvider>) -> Registry {
        Registry { handler, clock, ids }
    }

    pub fn backend_name(&self) -> &'static str {
        self.handler.backend_name()
    }

    pub async fn create(&self, request: JobRequest) -> Result<DemoJob, JobError> {
        let new_job = validate(request).map_err(JobError::Validation)?;
        let created = self.clock.now();

        for _ in 0..MAX_ID_ATTEMPTS {
            let job = DemoJob {
                id: self.ids.generate_id(),
                modality: new_job.modality,
                study_id: new_job.study_id.clone(),
                enhancement: new_job.enhancement,
                strength: new_job.strength,
                created
            };
            if self.handler.insert(&job).await? {
                log::info!("demo job {} created: modality={} enhancement={} strength={}",
                    job.id, job.modality, job.enhancement, job.strength);
                return Ok(job);
            }
            log::warn!("demo job id {} already taken, regenerating", job.id);
        }
        Err(JobError::IdExhausted)
    }

    pub async fn get_status(&self, id: &str) -> Result<JobStatusReport, JobError> {
        // Anything that isn't a uuid was never issued
        let uuid = Uuid::parse_str(id).map_err(|_| JobError::NotFound(id.to_string()))?;
        let job = self.handler.get(&uuid).await?
            .ok_or_else(|| JobError::NotFound(id.to_string()))?;

        let snapshot = simulation::snapshot(job.created, job.modality, self.clock.now());
        let completed = snapshot.status == JobStatus::Completed;

        Ok(JobStatusReport {
            job_id: job.id,
            status: snapshot.status,
            progress: snapshot.progress,
            modality: job.modality,
            enhancement: job.enhancement,
            strength: job.strength,
            created_at: to_iso(&job.created),
            estimated_completion: to_iso(&snapshot.estimated_completion),
            result_url: completed.then(|| format!("/api/demo-results/{}", job.id)),
            download_url: completed.then(|| format!("/api/demo-downloads/{}", job.id))
        })
    }

    /// Drops every job older than `retention`
    pub async fn purge_expired(&self, retention: Duration) -> Result<u64, JobError> {
        let cutoff = match self.clock.now().checked_sub_signed(retention) {
            Some(cutoff) => cutoff,
            None => return Ok(0)
        };
        let removed = self.handler.purge_created_before(cutoff).await?;
        if removed > 0 {
            log::info!("purged {} demo job(s) created before {}", removed, to_iso(&cutoff));
        }
        Ok(removed)
    }
}

/// Seconds the job is simulated to take, as reported on creation
pub fn estimated_time(job: &DemoJob) -> u32 {
    expected_seconds(job.modality)
}
