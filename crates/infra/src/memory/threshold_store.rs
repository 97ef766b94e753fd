//! In-process threshold store

use std::sync::Arc;

use async_trait::async_trait;
use leadflow_core::ThresholdStore;
use leadflow_domain::{Result as DomainResult, SlaThresholds};
use parking_lot::RwLock;

/// Last write wins; clones share the same value.
#[derive(Debug, Default, Clone)]
pub struct InMemoryThresholdStore {
    current: Arc<RwLock<SlaThresholds>>,
}

impl InMemoryThresholdStore {
    pub fn new(initial: SlaThresholds) -> Self {
        Self { current: Arc::new(RwLock::new(initial)) }
    }
}

#[async_trait]
impl ThresholdStore for InMemoryThresholdStore {
    async fn get_thresholds(&self) -> DomainResult<SlaThresholds> {
        Ok(*self.current.read())
    }

    async fn set_thresholds(&self, thresholds: SlaThresholds) -> DomainResult<()> {
        *self.current.write() = thresholds;
        Ok(())
    }
}
