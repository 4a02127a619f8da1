//! System clock handler

use async_trait::async_trait;
use std::time::SystemTime;
use warga_core::effects::{PhysicalTimeEffects, TimeError};
use warga_core::PhysicalTime;

/// Wall-clock handler backed by `SystemTime`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhysicalTimeHandler;

impl PhysicalTimeHandler {
    /// Create a new system clock handler.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PhysicalTimeEffects for PhysicalTimeHandler {
    async fn physical_time(&self) -> Result<PhysicalTime, TimeError> {
        let elapsed = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map_err(|_| TimeError::BeforeEpoch)?;
        Ok(PhysicalTime::from_ms(elapsed.as_millis() as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_physical_time_is_monotone_enough() {
        let handler = PhysicalTimeHandler::new();
        let t1 = handler.physical_time().await.unwrap();
        let t2 = handler.physical_time().await.unwrap();
        assert!(t2 >= t1);
        // Sanity: after 2020-01-01
        assert!(t1.ts_ms > 1_577_836_800_000);
    }
}
