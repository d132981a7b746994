// A handler that just stores data in memory (non-persistent)
use crate::contact::types::ContactSubmission;
use crate::contact::util::handler::ContactHandler;
use crate::shared::util::handler::StoreError;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryHandler {
    submissions: RwLock<HashMap<Uuid, ContactSubmission>>
}

impl MemoryHandler {
    pub fn new() -> MemoryHandler {
        MemoryHandler::default()
    }
}

#[async_trait]
impl ContactHandler for MemoryHandler {
    async fn init(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn insert(&self, submission: &ContactSubmission) -> Result<(), StoreError> {
        self.submissions.write().map_err(|_| StoreError::Poisoned)?
            .insert(submission.id, submission.clone());
        Ok(())
    }

    async fn get(&self, id: &Uuid) -> Result<Option<ContactSubmission>, StoreError> {
        let submissions = self.submissions.read().map_err(|_| StoreError::Poisoned)?;
        Ok(submissions.get(id).cloned())
    }
}
