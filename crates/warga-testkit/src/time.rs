//! Hand-driven clock

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use warga_core::effects::{PhysicalTimeEffects, TimeError};
use warga_core::PhysicalTime;

/// Clock that only moves when the test says so.
///
/// Clones share the same instant, so a test can keep one handle while the
/// engine owns another.
#[derive(Debug, Clone)]
pub struct ControllableClock {
    current_ms: Arc<Mutex<u64>>,
}

impl ControllableClock {
    /// Clock stopped at `initial_ms`.
    pub fn new(initial_ms: u64) -> Self {
        Self {
            current_ms: Arc::new(Mutex::new(initial_ms)),
        }
    }

    /// Move forward by `ms`.
    pub fn advance_ms(&self, ms: u64) {
        let mut current = self.current_ms.lock().unwrap();
        *current += ms;
    }

    /// Jump to an absolute instant.
    pub fn set_ms(&self, ts_ms: u64) {
        let mut current = self.current_ms.lock().unwrap();
        *current = ts_ms;
    }

    /// Current instant.
    pub fn now(&self) -> PhysicalTime {
        PhysicalTime::from_ms(*self.current_ms.lock().unwrap())
    }
}

#[async_trait]
impl PhysicalTimeEffects for ControllableClock {
    async fn physical_time(&self) -> Result<PhysicalTime, TimeError> {
        Ok(self.now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_clones_share_time() {
        let clock = ControllableClock::new(1_000);
        let handle = clock.clone();

        handle.advance_ms(500);
        assert_eq!(clock.physical_time().await.unwrap(), PhysicalTime::from_ms(1_500));

        clock.set_ms(10);
        assert_eq!(handle.now().ts_ms, 10);
    }
}
