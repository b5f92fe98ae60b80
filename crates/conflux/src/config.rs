//! Construction parameters for dispatchers and mergers.

use crate::{Error, Result};

/// Default bounded-queue capacity used when a config does not override it.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Parameters for a [`WorkDispatcher`](crate::WorkDispatcher).
///
/// Queue capacities are non-negative; a capacity of `0` requests a
/// synchronous handoff and is normalized to `1`, the closest bounded
/// approximation tokio's mpsc channels offer (there is no rendezvous mode).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Number of worker tasks spawned at construction. Must be at least 1.
    pub workers: usize,
    /// Bounded capacity of the shared job queue.
    pub job_capacity: usize,
    /// Bounded capacity of the shared result stream.
    pub result_capacity: usize,
}

impl DispatcherConfig {
    /// Creates a config for `workers` workers with default queue capacities.
    pub fn new(workers: usize) -> Self {
        Self {
            workers,
            job_capacity: DEFAULT_QUEUE_CAPACITY,
            result_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }

    /// Overrides the job queue capacity.
    #[must_use]
    pub fn job_capacity(mut self, capacity: usize) -> Self {
        self.job_capacity = capacity;
        self
    }

    /// Overrides the result stream capacity.
    #[must_use]
    pub fn result_capacity(mut self, capacity: usize) -> Self {
        self.result_capacity = capacity;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::InvalidConfig {
                reason: "worker pool size must be at least 1".into(),
            });
        }
        Ok(())
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self::new(4)
    }
}

/// Parameters for a [`StreamMerger`](crate::StreamMerger).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergerConfig {
    /// Bounded capacity of the merged output stream. `0` is normalized to `1`
    /// as for [`DispatcherConfig`].
    pub output_capacity: usize,
}

impl Default for MergerConfig {
    fn default() -> Self {
        Self {
            output_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// Maps the spec'd non-negative capacity domain onto tokio's `>= 1` channel
/// capacities.
pub(crate) fn bounded_capacity(capacity: usize) -> usize {
    capacity.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_workers_is_rejected() {
        let err = DispatcherConfig::new(0).validate().unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn builder_overrides_capacities() {
        let config = DispatcherConfig::new(2).job_capacity(0).result_capacity(8);
        assert!(config.validate().is_ok());
        assert_eq!(config.job_capacity, 0);
        assert_eq!(config.result_capacity, 8);
        assert_eq!(bounded_capacity(config.job_capacity), 1);
    }
}
