//! Physical clock effect

use crate::time::PhysicalTime;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Error type for time operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum TimeError {
    /// The clock reported a time before the UNIX epoch.
    #[error("Clock is before the UNIX epoch")]
    BeforeEpoch,
    /// The time service is unavailable.
    #[error("Time service unavailable")]
    ServiceUnavailable,
}

/// Wall-clock source used to stamp grants.
#[async_trait]
pub trait PhysicalTimeEffects: Send + Sync {
    /// Current wall-clock time.
    async fn physical_time(&self) -> Result<PhysicalTime, TimeError>;
}

#[async_trait]
impl<T: PhysicalTimeEffects + ?Sized> PhysicalTimeEffects for std::sync::Arc<T> {
    async fn physical_time(&self) -> Result<PhysicalTime, TimeError> {
        (**self).physical_time().await
    }
}
