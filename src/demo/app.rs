use crate::demo::registry::{estimated_time, Registry};
use crate::demo::types::{JobRequest, JobStatus};
use crate::shared::types::app::ApiError;

use actix_web::{get, post, HttpResponse, web::{self, Data}};
use serde::Serialize;
use uuid::Uuid;


// Start a demo job
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateJobReturn {
    job_id: Uuid,
    status: JobStatus,
    estimated_time: u32,
    message: String
}

#[post("/api/demo-jobs")]
async fn create_job(registry: Data<Registry>, params: web::Json<JobRequest>) -> Result<HttpResponse, ApiError> {
    let job = registry.create(params.into_inner()).await?;
    Ok(HttpResponse::Ok().json(CreateJobReturn {
        job_id: job.id,
        status: JobStatus::Processing,
        estimated_time: estimated_time(&job),
        message: "Enhancement job started successfully".to_string()
    }))
}

// Poll a demo job
#[get("/api/demo-jobs/{id}")]
async fn get_job(registry: Data<Registry>, path: web::Path<String>) -> Result<HttpResponse, ApiError> {
    let report = registry.get_status(path.as_str()).await?;
    Ok(HttpResponse::Ok().json(report))
}
