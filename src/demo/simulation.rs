//! Derives a job's status from the clock alone.
//!
//! Nothing here is stored: the same `(created, modality, now)` always gives
//! the same answer, so a poller can ask as often as it likes.

use chrono::{DateTime, Duration, Utc};

use crate::demo::types::{JobStatus, Modality};

/// Used for a modality without an entry in the table
pub const DEFAULT_DURATION_SECONDS: u32 = 60;

/// Highest progress reported while still processing
pub const MAX_PROCESSING_PROGRESS: f64 = 95.0;

pub fn expected_seconds(modality: Modality) -> u32 {
    match modality {
        Modality::Xray => 45,
        Modality::Ct => 180,
        Modality::Mri => 300,
        Modality::Pathology => 120
    }
}

/// Same table keyed by the raw name, for values read back from storage
pub fn expected_seconds_for(name: &str) -> u32 {
    name.parse::<Modality>()
        .map(expected_seconds)
        .unwrap_or(DEFAULT_DURATION_SECONDS)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Snapshot {
    pub status: JobStatus,
    pub progress: u8,
    pub estimated_completion: DateTime<Utc>
}

pub fn snapshot(created: DateTime<Utc>, modality: Modality, now: DateTime<Utc>) -> Snapshot {
    let expected_ms = i64::from(expected_seconds(modality)) * 1000;
    let estimated_completion = created + Duration::milliseconds(expected_ms);

    // A clock that stepped backwards reads as "just started"
    let elapsed_ms = (now - created).num_milliseconds().max(0);

    if elapsed_ms < expected_ms {
        let ratio = elapsed_ms as f64 / expected_ms as f64 * 100.0;
        Snapshot {
            status: JobStatus::Processing,
            progress: ratio.min(MAX_PROCESSING_PROGRESS).round() as u8,
            estimated_completion
        }
    } else {
        Snapshot { status: JobStatus::Completed, progress: 100, estimated_completion }
    }
}
