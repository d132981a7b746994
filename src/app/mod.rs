use actix_web::{
    HttpResponse, web::{self, Data},
    middleware, App, HttpServer, Result
};
use actix_cors::Cors;
use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::rt::task::JoinHandle;
use std::io;
use std::sync::Arc;
use std::time;

use crate::shared::util::config::{self, Config, StorageBackend, StorageConfig};
use crate::shared::util::clock::{Clock, IdProvider, SystemClock, UuidProvider};

use crate::demo::util::handler::DemoJobHandler;
use crate::demo::handlers::memory_handler::MemoryHandler as DemoMemoryHandler;
use crate::demo::handlers::postgres_handler::PostgresHandler as DemoPostgresHandler;
use crate::contact::util::handler::ContactHandler;
use crate::contact::handlers::memory_handler::MemoryHandler as ContactMemoryHandler;
use crate::contact::handlers::postgres_handler::PostgresHandler as ContactPostgresHandler;

use crate::demo::app as demo_app;
use crate::contact::app as contact_app;
use crate::site::app as site_app;

use crate::demo::registry::Registry;
use crate::contact::inbox::ContactInbox;
use crate::site::app::SiteInfo;

use crate::shared::types::app::{ApiError, ErrorResponse, FieldError};


async fn not_found() -> Result<HttpResponse> {
    let response = ErrorResponse {
        success: false,
        message: "Resource not found".to_string(),
        errors: Vec::new()
    };
    Ok(HttpResponse::NotFound().json(response))
}

/// Malformed or mistyped JSON gets the same 400 body as a failed field check
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        ApiError::Validation {
            message: "Invalid request body",
            errors: vec![FieldError::new("body", err.to_string())]
        }.into()
    })
}

pub fn routes(app: &mut web::ServiceConfig) {
    app
        .app_data(json_config())

        // Demo jobs
        .service(demo_app::create_job)
        .service(demo_app::get_job)

        // Contact
        .service(contact_app::submit_contact)

        // Health and status
        .service(site_app::health)
        .service(site_app::status)

        .default_service(web::route().to(not_found));
}

fn to_io<E: std::fmt::Display>(err: E) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err.to_string())
}

async fn open_handlers(config: &Config) -> io::Result<(Arc<dyn DemoJobHandler>, Arc<dyn ContactHandler>)> {
    let (jobs, contacts): (Arc<dyn DemoJobHandler>, Arc<dyn ContactHandler>) = match config.storage.backend {
        StorageBackend::Memory => (Arc::new(DemoMemoryHandler::new()), Arc::new(ContactMemoryHandler::new())),
        StorageBackend::Postgres => {
            let database = config.database.as_ref().ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput,
                "storage backend is postgres but config has no [database] section"))?;
            let pool = config::connect_pool(database).await.map_err(to_io)?;
            (Arc::new(DemoPostgresHandler::new(pool.clone())), Arc::new(ContactPostgresHandler::new(pool)))
        }
    };

    jobs.init().await.map_err(to_io)?;
    contacts.init().await.map_err(to_io)?;
    Ok((jobs, contacts))
}

/// Starts the periodic purge when a retention window is configured
pub fn spawn_purge(registry: Registry, storage: &StorageConfig) -> Option<JoinHandle<()>> {
    let retention = storage.retention()?;
    let every = time::Duration::from_secs(storage.purge_interval_seconds.max(1));
    log::info!("purging demo jobs older than {}s every {}s", retention.num_seconds(), every.as_secs());

    Some(actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(every);
        loop {
            interval.tick().await;
            if let Err(err) = registry.purge_expired(retention).await {
                log::error!("demo job purge failed: {}", err);
            }
        }
    }))
}

pub async fn start() -> io::Result<()> {
    let config = config::get_config();
    if config.server.log {
        if std::env::var("RUST_LOG").is_err() {
            std::env::set_var("RUST_LOG", "debug");
        }
        env_logger::init();
    }

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let ids: Arc<dyn IdProvider> = Arc::new(UuidProvider);
    let (jobs, contacts) = open_handlers(&config).await?;

    let registry = Registry::new(jobs, clock.clone(), ids.clone());
    let inbox = ContactInbox::new(contacts, clock.clone(), ids);
    let site = SiteInfo {
        started: time::Instant::now(),
        storage_backend: registry.backend_name(),
        request_quota_replenish_ms: config.server.request_quota_replenish_ms,
        request_quota: config.server.request_quota,
        clock
    };

    spawn_purge(registry.clone(), &config.storage);

    let governor_conf = GovernorConfigBuilder::default()
        .per_millisecond(config.server.request_quota_replenish_ms.max(1))
        .burst_size(config.server.request_quota.max(1))
        .finish()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid rate limit settings"))?;

    let registry = Data::new(registry);
    let inbox = Data::new(inbox);
    let site = Data::new(site);

    log::info!("starting HTTP server at http://{}:{} ({} storage)",
        config.server.host, config.server.port, site.storage_backend);

    HttpServer::new(move || {
        App::new()
            .app_data(registry.clone())
            .app_data(inbox.clone())
            .app_data(site.clone())
            .configure(routes)
            .wrap(Governor::new(&governor_conf))
            .wrap(Cors::permissive())
            .wrap(middleware::NormalizePath::trim())
            .wrap(middleware::Logger::default())
    })
        .keep_alive(time::Duration::from_secs(30))
        .bind((config.server.host.as_str(), config.server.port))?
        .run().await
}
