use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::foundation::DomainError;
use crate::ports::LoadSignal;

/// Load signal that reports whatever was last set.
#[derive(Debug, Default)]
pub struct FixedLoad(AtomicU64);

impl FixedLoad {
    pub fn new(load: u64) -> Self {
        Self(AtomicU64::new(load))
    }

    pub fn set(&self, load: u64) {
        self.0.store(load, Ordering::SeqCst);
    }
}

#[async_trait]
impl LoadSignal for FixedLoad {
    async fn current_load(&self) -> Result<u64, DomainError> {
        Ok(self.0.load(Ordering::SeqCst))
    }
}
