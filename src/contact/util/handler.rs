//! An abstraction layer interface for contact submission storage

use crate::contact::types::ContactSubmission;
use crate::shared::util::handler::StoreError;

use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait ContactHandler: Send + Sync {
    // Called on first launch for setup
    async fn init(&self) -> Result<(), StoreError>;

    async fn insert(&self, submission: &ContactSubmission) -> Result<(), StoreError>;

    async fn get(&self, id: &Uuid) -> Result<Option<ContactSubmission>, StoreError>;
}
