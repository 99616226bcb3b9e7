//! LoadSignal port - input to the adaptive scheduler's interval choice.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;

/// Port for reading current system load.
///
/// What "load" means is up to the adapter (dashboard subscribers, queue
/// depth, CPU); the scheduler compares it against its threshold only.
#[async_trait]
pub trait LoadSignal: Send + Sync {
    /// Current load reading.
    async fn current_load(&self) -> Result<u64, DomainError>;
}
