//! An abstraction layer interface for demo job storage

use crate::demo::types::DemoJob;
use crate::shared::util::handler::StoreError;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[async_trait]
pub trait DemoJobHandler: Send + Sync {
    // Called on first launch for setup
    async fn init(&self) -> Result<(), StoreError>;

    /// Stores a new job. Returns false, storing nothing, if the id is taken.
    async fn insert(&self, job: &DemoJob) -> Result<bool, StoreError>;

    async fn get(&self, id: &Uuid) -> Result<Option<DemoJob>, StoreError>;

    /// Removes jobs created strictly before `cutoff`, returning how many went
    async fn purge_created_before(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError>;

    fn backend_name(&self) -> &'static str;
}
