//! # EcoEvents Testing
//!
//! Testing utilities for reducers built on `ecoevents-core`.
//!
//! This crate provides:
//! - [`ReducerTest`]: Given/When/Then harness for a single reducer step
//! - [`FixedClock`]: deterministic time
//! - [`assertions`]: helpers for inspecting returned effects

use chrono::{DateTime, Utc};
use ecoevents_core::environment::Clock;


pub use reducer_test::{assertions, ReducerTest};

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use std::sync::{Arc, RwLock};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time until explicitly advanced.
    ///
    /// # Example
    ///
    /// ```
    /// use ecoevents_testing::mocks::FixedClock;
    /// use ecoevents_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: Arc<RwLock<DateTime<Utc>>>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub fn new(time: DateTime<Utc>) -> Self {
            Self {
                time: Arc::new(RwLock::new(time)),
            }
        }

        /// Move the clock to `time`; clones observe the change
        pub fn set(&self, time: DateTime<Utc>) {
            if let Ok(mut guard) = self.time.write() {
                *guard = time;
            }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time.read().map_or_else(|poisoned| **poisoned.get_ref(), |guard| *guard)
        }
    }

    /// Create a default fixed clock for tests (2025-06-01 09:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::from_timestamp(1_748_768_400, 0).unwrap_or_default(),
        )
    }
}

// Re-export commonly used items
pub use mocks::{test_clock, FixedClock};
