//! Per-pool bulkhead properties

use super::resolve;
use serde::{Deserialize, Serialize};
use strix_core::constants::{thread_pool_property, CORE_SIZE, MAX_QUEUE_SIZE, QUEUE_SIZE_REJECTION_THRESHOLD};
use strix_core::{Result, ThreadPoolKey, Validate};

const DEFAULT_CORE_SIZE: u32 = 10;
const DEFAULT_MAX_QUEUE_SIZE: i32 = -1;
const DEFAULT_QUEUE_SIZE_REJECTION_THRESHOLD: u32 = 5;

/// Overrides for a thread pool's properties
///
/// A negative `max_queue_size` means no queue: work is rejected as soon as
/// every worker is busy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThreadPoolProperties {
    pub core_size: Option<u32>,
    pub max_queue_size: Option<i32>,
    pub queue_size_rejection_threshold: Option<u32>,
}

impl ThreadPoolProperties {
    pub fn with_core_size(mut self, size: u32) -> Self {
        self.core_size = Some(size);
        self
    }

    pub fn with_max_queue_size(mut self, size: i32) -> Self {
        self.max_queue_size = Some(size);
        self
    }

    pub fn with_queue_size_rejection_threshold(mut self, threshold: u32) -> Self {
        self.queue_size_rejection_threshold = Some(threshold);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(size) = self.core_size {
            Validate::in_range(size, 1, u32::MAX, "coreSize")?;
        }
        Ok(())
    }

    pub fn resolve(&self, key: &ThreadPoolKey) -> ResolvedThreadPoolProperties {
        let key = key.as_str();
        let core_size: u32 = resolve(thread_pool_property, key, CORE_SIZE, self.core_size, DEFAULT_CORE_SIZE);
        let max_queue_size: i32 = resolve(
            thread_pool_property,
            key,
            MAX_QUEUE_SIZE,
            self.max_queue_size,
            DEFAULT_MAX_QUEUE_SIZE,
        );
        let rejection_threshold: u32 = resolve(
            thread_pool_property,
            key,
            QUEUE_SIZE_REJECTION_THRESHOLD,
            self.queue_size_rejection_threshold,
            DEFAULT_QUEUE_SIZE_REJECTION_THRESHOLD,
        );

        let queue_capacity = usize::try_from(max_queue_size)
            .ok()
            .filter(|max| *max > 0)
            .map(|max| max.min(rejection_threshold as usize));

        ResolvedThreadPoolProperties {
            core_size: core_size.max(1) as usize,
            queue_capacity,
        }
    }
}

/// Effective sizing of a thread pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedThreadPoolProperties {
    /// Work allowed to run at once
    pub core_size: usize,
    /// Work allowed to wait for a worker, `None` when queueing is disabled
    pub queue_capacity: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::dynamic;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_defaults_have_no_queue() {
        dynamic::clear();
        let resolved = ThreadPoolProperties::default().resolve(&ThreadPoolKey::from("Pool"));
        assert_eq!(resolved.core_size, 10);
        assert_eq!(resolved.queue_capacity, None);
    }

    #[test]
    #[serial]
    fn test_queue_capped_by_rejection_threshold() {
        dynamic::clear();
        let key = ThreadPoolKey::from("Pool");

        let resolved = ThreadPoolProperties::default()
            .with_max_queue_size(100)
            .resolve(&key);
        assert_eq!(resolved.queue_capacity, Some(5));

        let resolved = ThreadPoolProperties::default()
            .with_max_queue_size(3)
            .with_queue_size_rejection_threshold(8)
            .resolve(&key);
        assert_eq!(resolved.queue_capacity, Some(3));
    }

    #[test]
    #[serial]
    fn test_dynamic_pool_property_wins() {
        dynamic::clear();
        dynamic::set_property(thread_pool_property("Pool", CORE_SIZE), 2);
        let resolved = ThreadPoolProperties::default()
            .with_core_size(7)
            .resolve(&ThreadPoolKey::from("Pool"));
        assert_eq!(resolved.core_size, 2);
        dynamic::clear();
    }

    #[test]
    fn test_validate_core_size() {
        assert!(ThreadPoolProperties::default().with_core_size(0).validate().is_err());
        assert!(ThreadPoolProperties::default().with_core_size(1).validate().is_ok());
    }
}
