// A handler that just stores data in memory (non-persistent)
use crate::demo::types::DemoJob;
use crate::demo::util::handler::DemoJobHandler;
use crate::shared::util::handler::StoreError;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryHandler {
    jobs: RwLock<HashMap<Uuid, DemoJob>>
}

impl MemoryHandler {
    pub fn new() -> MemoryHandler {
        MemoryHandler::default()
    }

    pub fn len(&self) -> usize {
        self.jobs.read().map(|jobs| jobs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DemoJobHandler for MemoryHandler {
    async fn init(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn insert(&self, job: &DemoJob) -> Result<bool, StoreError> {
        let mut jobs = self.jobs.write().map_err(|_| StoreError::Poisoned)?;
        match jobs.entry(job.id) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(job.clone());
                Ok(true)
            }
        }
    }

    async fn get(&self, id: &Uuid) -> Result<Option<DemoJob>, StoreError> {
        let jobs = self.jobs.read().map_err(|_| StoreError::Poisoned)?;
        Ok(jobs.get(id).cloned())
    }

    async fn purge_created_before(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut jobs = self.jobs.write().map_err(|_| StoreError::Poisoned)?;
        let before = jobs.len();
        jobs.retain(|_, job| job.created >= cutoff);
        Ok((before - jobs.len()) as u64)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
