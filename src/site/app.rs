use crate::shared::util::clock::{to_iso, Clock};

use actix_web::{get, HttpResponse, web::Data, Result};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Facts about the running process reported by the health and status endpoints
pub struct SiteInfo {
    pub started: Instant,
    pub storage_backend: &'static str,
    pub request_quota_replenish_ms: u64,
    pub request_quota: u32,
    pub clock: Arc<dyn Clock>
}

impl SiteInfo {
    fn requests_per_minute(&self) -> u64 {
        60_000 / self.request_quota_replenish_ms.max(1)
    }
}

#[derive(Serialize)]
struct HealthServices {
    storage: &'static str,
    ai_processing: &'static str
}

#[derive(Serialize)]
struct HealthReturn {
    status: &'static str,
    timestamp: String,
    version: &'static str,
    services: HealthServices
}

#[get("/api/health")]
async fn health(info: Data<SiteInfo>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(HealthReturn {
        status: "healthy",
        timestamp: to_iso(&info.clock.now()),
        version: env!("CARGO_PKG_VERSION"),
        services: HealthServices {
            storage: info.storage_backend,
            ai_processing: "simulated"
        }
    }))
}

#[derive(Serialize)]
struct Endpoints {
    contact: &'static str,
    demo_jobs: &'static str,
    health: &'static str
}

#[derive(Serialize)]
struct RateLimit {
    requests_per_minute: u64,
    burst_limit: u32
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusReturn {
    service: &'static str,
    version: String,
    status: &'static str,
    uptime: f64,
    endpoints: Endpoints,
    rate_limit: RateLimit
}

#[get("/api/status")]
async fn status(info: Data<SiteInfo>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(StatusReturn {
        service: "DiagnoSee API",
        version: format!("v{}", env!("CARGO_PKG_VERSION")),
        status: "operational",
        uptime: info.started.elapsed().as_secs_f64(),
        endpoints: Endpoints {
            contact: "/api/contact",
            demo_jobs: "/api/demo-jobs",
            health: "/api/health"
        },
        rate_limit: RateLimit {
            requests_per_minute: info.requests_per_minute(),
            burst_limit: info.request_quota
        }
    }))
}
