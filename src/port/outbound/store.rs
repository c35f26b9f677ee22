//! Race configuration persistence port.

use async_trait::async_trait;

use crate::domain::{EventDescriptor, SessionKey};
use crate::error::Error;

/// Remote store for the operator's current race selection.
///
/// Writes are fire-and-forget from the coordinator's point of view; failures
/// are logged and never retried.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn put_race(&self, event: &EventDescriptor) -> Result<(), Error>;

    async fn put_session(&self, session: &SessionKey) -> Result<(), Error>;
}

/// Store that accepts and discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullConfigStore;

#[async_trait]
impl ConfigStore for NullConfigStore {
    async fn put_race(&self, _event: &EventDescriptor) -> Result<(), Error> {
        Ok(())
    }

    async fn put_session(&self, _session: &SessionKey) -> Result<(), Error> {
        Ok(())
    }
}
