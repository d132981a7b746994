#[cfg(test)]
mod tests {
    use diagnosee_api::app::routes;
    use diagnosee_api::contact::handlers::memory_handler::MemoryHandler as ContactMemoryHandler;
    use diagnosee_api::contact::inbox::ContactInbox;
    use diagnosee_api::demo::handlers::memory_handler::MemoryHandler as DemoMemoryHandler;
    use diagnosee_api::demo::registry::Registry;
    use diagnosee_api::demo::types::DemoJob;
    use diagnosee_api::demo::util::handler::DemoJobHandler;
    use diagnosee_api::shared::util::clock::{IdProvider, ManualClock, SequentialIds};
    use diagnosee_api::shared::util::handler::StoreError;
    use diagnosee_api::site::app::SiteInfo;

    use actix_web::{http::StatusCode, test, web::Data, App};
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Instant;
    use uuid::Uuid;

    macro_rules! service {
        ($clock: expr) => {
            service!($clock, Arc::new(DemoMemoryHandler::new()), Arc::new(SequentialIds::default()))
        };
        ($clock: expr, $jobs: expr, $ids: expr) => {{
            let ids: Arc<dyn IdProvider> = $ids;
            let registry = Registry::new($jobs, $clock.clone(), ids.clone());
            let inbox = ContactInbox::new(Arc::new(ContactMemoryHandler::new()), $clock.clone(), ids);
            let site = SiteInfo {
                started: Instant::now(),
                storage_backend: registry.backend_name(),
                request_quota_replenish_ms: 600,
                request_quota: 20,
                clock: $clock.clone()
            };
            test::init_service(App::new()
                .app_data(Data::new(registry))
                .app_data(Data::new(inbox))
                .app_data(Data::new(site))
                .configure(routes)).await
        }};
    }

    /// A store whose lock is always poisoned
    struct BrokenStore;

    #[async_trait]
    impl DemoJobHandler for BrokenStore {
        async fn init(&self) -> Result<(), StoreError> { Ok(()) }

        async fn insert(&self, _job: &DemoJob) -> Result<bool, StoreError> {
            Err(StoreError::Poisoned)
        }

        async fn get(&self, _id: &Uuid) -> Result<Option<DemoJob>, StoreError> {
            Err(StoreError::Poisoned)
        }

        async fn purge_created_before(&self, _cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
            Err(StoreError::Poisoned)
        }

        fn backend_name(&self) -> &'static str { "broken" }
    }

    /// Always hands out the same id
    struct FixedId(Uuid);

    impl IdProvider for FixedId {
        fn generate_id(&self) -> Uuid {
            self.0
        }
    }

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()))
    }

    #[actix_web::test]
    async fn create_then_poll_until_complete() {
        let clock = clock();
        let app = service!(clock);

        let req = test::TestRequest::post().uri("/api/demo-jobs")
            .set_json(json!({"modality": "xray", "studyId": "S1", "enhancement": "super-resolution", "strength": 70}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "processing");
        assert_eq!(body["estimatedTime"], 45);
        assert_eq!(body["message"], "Enhancement job started successfully");
        let job_id = body["jobId"].as_str().unwrap().to_string();

        clock.advance(Duration::milliseconds(22_500));
        let req = test::TestRequest::get().uri(&format!("/api/demo-jobs/{}", job_id)).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "processing");
        assert_eq!(body["progress"], 50);
        assert_eq!(body["modality"], "xray");
        assert_eq!(body["enhancement"], "super-resolution");
        assert_eq!(body["strength"], 70);
        assert_eq!(body["createdAt"], "2024-05-01T09:30:00.000Z");
        assert_eq!(body["estimatedCompletion"], "2024-05-01T09:30:45.000Z");
        assert!(body.get("resultUrl").is_none(), "no result while processing");
        assert!(body.get("downloadUrl").is_none(), "no download while processing");

        clock.advance(Duration::milliseconds(23_500));
        let req = test::TestRequest::get().uri(&format!("/api/demo-jobs/{}", job_id)).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "completed");
        assert_eq!(body["progress"], 100);
        assert_eq!(body["resultUrl"], format!("/api/demo-results/{}", job_id));
        assert_eq!(body["downloadUrl"], format!("/api/demo-downloads/{}", job_id));
    }

    #[actix_web::test]
    async fn default_strength_over_http() {
        let clock = clock();
        let app = service!(clock);

        let req = test::TestRequest::post().uri("/api/demo-jobs")
            .set_json(json!({"modality": "pathology", "studyId": "P1", "enhancement": "denoising"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["estimatedTime"], 120);

        let req = test::TestRequest::get()
            .uri(&format!("/api/demo-jobs/{}", body["jobId"].as_str().unwrap())).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["strength"], 85);
    }

    #[actix_web::test]
    async fn validation_errors_are_400() {
        let clock = clock();
        let app = service!(clock);

        let req = test::TestRequest::post().uri("/api/demo-jobs")
            .set_json(json!({"modality": "pet", "studyId": "S", "enhancement": "upscale"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Invalid job parameters");
        let fields: Vec<&str> = body["errors"].as_array().unwrap().iter()
            .map(|e| e["field"].as_str().unwrap()).collect();
        assert_eq!(fields, vec!["modality", "enhancement"]);
    }

    #[actix_web::test]
    async fn malformed_body_is_400() {
        let clock = clock();
        let app = service!(clock);

        let req = test::TestRequest::post().uri("/api/demo-jobs")
            .set_json(json!({"modality": "ct", "studyId": "S", "enhancement": "denoising", "strength": "high"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["errors"][0]["field"], "body");
    }

    #[actix_web::test]
    async fn unknown_job_is_404() {
        let clock = clock();
        let app = service!(clock);

        let req = test::TestRequest::get().uri("/api/demo-jobs/nonexistent-id").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"success": false, "message": "Job not found"}));
    }

    #[actix_web::test]
    async fn contact_form() {
        let clock = clock();
        let app = service!(clock);

        let req = test::TestRequest::post().uri("/api/contact")
            .set_json(json!({
                "firstName": "Ada",
                "lastName": "Byron",
                "email": "ada@example.org",
                "role": "researcher",
                "interest": "mri",
                "consent": true
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert!(body["submissionId"].is_string());

        let req = test::TestRequest::post().uri("/api/contact")
            .set_json(json!({"firstName": "Ada", "lastName": "Byron", "email": "ada@example.org", "consent": false}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Invalid form data");
        assert_eq!(body["errors"][0]["field"], "consent");
    }

    #[actix_web::test]
    async fn health_and_status() {
        let clock = clock();
        let app = service!(clock);

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["timestamp"], "2024-05-01T09:30:00.000Z");
        assert_eq!(body["services"]["storage"], "memory");

        let req = test::TestRequest::get().uri("/api/status").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "operational");
        assert_eq!(body["endpoints"]["demo_jobs"], "/api/demo-jobs");
        assert_eq!(body["rateLimit"]["requests_per_minute"], 100);
        assert_eq!(body["rateLimit"]["burst_limit"], 20);
    }

    #[actix_web::test]
    async fn store_failure_is_500_without_details() {
        let clock = clock();
        let app = service!(clock, Arc::new(BrokenStore), Arc::new(SequentialIds::default()));

        let req = test::TestRequest::post().uri("/api/demo-jobs")
            .set_json(json!({"modality": "ct", "studyId": "S", "enhancement": "denoising"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"success": false, "message": "Failed to process demo job"}));
        assert!(!body.to_string().contains("poisoned"), "store details stay in the log");

        let req = test::TestRequest::get().uri(&format!("/api/demo-jobs/{}", Uuid::from_u128(1))).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"success": false, "message": "Failed to process demo job"}));
    }

    #[actix_web::test]
    async fn colliding_ids_are_500() {
        let clock = clock();
        let jobs = Arc::new(DemoMemoryHandler::new());
        let app = service!(clock, jobs.clone(), Arc::new(FixedId(Uuid::from_u128(42))));
        let job = json!({"modality": "mri", "studyId": "S", "enhancement": "harmonization"});

        let req = test::TestRequest::post().uri("/api/demo-jobs").set_json(job.clone()).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["jobId"], Uuid::from_u128(42).to_string());

        let req = test::TestRequest::post().uri("/api/demo-jobs").set_json(job).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Failed to process demo job");
        assert!(!body.to_string().contains("allocate"), "id error stays in the log");
        assert_eq!(jobs.len(), 1, "first job still the only one");
    }

    #[actix_web::test]
    async fn unknown_path_is_404() {
        let clock = clock();
        let app = service!(clock);

        let req = test::TestRequest::get().uri("/api/demo-results/anything").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"success": false, "message": "Resource not found"}));

        let req = test::TestRequest::delete().uri("/api/demo-jobs").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
