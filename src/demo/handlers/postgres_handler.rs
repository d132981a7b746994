use crate::demo::types::{DemoJob, JobStatus};
use crate::demo::util::handler::DemoJobHandler;
use crate::shared::util::handler::StoreError;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use sqlx::Row;
use sqlx::postgres::{PgPool, PgRow};

#[derive(Clone)]
pub struct PostgresHandler {
    pool: PgPool
}

impl PostgresHandler {
    pub fn new(pool: PgPool) -> PostgresHandler {
        PostgresHandler { pool }
    }
}

fn job_from_row(row: &PgRow) -> Result<DemoJob, StoreError> {
    let id = row.try_get::<Uuid, &str>("id")?;
    let malformed = |reason: String| StoreError::Malformed { id: id.to_string(), reason };

    let modality = row.try_get::<String, &str>("modality")?;
    let enhancement = row.try_get::<String, &str>("enhancement")?;
    let strength = row.try_get::<i32, &str>("strength")?;

    Ok(DemoJob {
        id,
        modality: modality.parse()
            .map_err(|_| malformed(format!("unknown modality `{}`", modality)))?,
        study_id: row.try_get::<String, &str>("study_id")?,
        enhancement: enhancement.parse()
            .map_err(|_| malformed(format!("unknown enhancement `{}`", enhancement)))?,
        strength: u8::try_from(strength)
            .map_err(|_| malformed(format!("strength {} out of range", strength)))?,
        created: row.try_get::<DateTime<Utc>, &str>("created_at")?
    })
}

#[async_trait]
impl DemoJobHandler for PostgresHandler {
    // Called on first launch for setup
    async fn init(&self) -> Result<(), StoreError> {
        // status is kept for schema compatibility, reads never consult it
        sqlx::query(r#"
        CREATE TABLE IF NOT EXISTS demo_jobs (
            id uuid primary key unique,
            modality text NOT NULL,
            study_id text NOT NULL CHECK(length(study_id) <= 100),
            enhancement text NOT NULL,
            strength integer NOT NULL DEFAULT 85 CHECK(strength BETWEEN 0 AND 100),
            status text NOT NULL DEFAULT 'processing',
            created_at timestamptz NOT NULL,
            completed_at timestamptz,
            metadata json
        );"#).execute(&self.pool).await?;
        Ok(())
    }

    async fn insert(&self, job: &DemoJob) -> Result<bool, StoreError> {
        let r = sqlx::query("INSERT INTO demo_jobs(id, modality, study_id, enhancement, strength, status, created_at)
            VALUES($1, $2, $3, $4, $5, $6, $7) ON CONFLICT DO NOTHING RETURNING id;")
            .bind(job.id)
            .bind(job.modality.as_str())
            .bind(job.study_id.as_str())
            .bind(job.enhancement.as_str())
            .bind(i32::from(job.strength))
            .bind(JobStatus::Processing.as_str())
            .bind(job.created)
            .fetch_optional(&self.pool).await?;
        Ok(r.is_some())
    }

    async fn get(&self, id: &Uuid) -> Result<Option<DemoJob>, StoreError> {
        let row = sqlx::query("SELECT * FROM demo_jobs WHERE id = $1;")
            .bind(id)
            .fetch_optional(&self.pool).await?;
        row.as_ref().map(job_from_row).transpose()
    }

    async fn purge_created_before(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM demo_jobs WHERE created_at < $1;")
            .bind(cutoff)
            .execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
