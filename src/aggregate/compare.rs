//! Side-by-side latency of the sequential and parallel strategies.

use crate::aggregate::{AggregateRun, Aggregator, ParallelAggregator, SequentialAggregator};
use crate::error::AggregateError;
use crate::models::UserId;
use crate::observer::AggregationObserver;
use crate::source::DataSource;
use std::sync::Arc;
use std::time::Duration;

/// Both runs for the same user.
#[derive(Debug, Clone, PartialEq)]
pub struct LatencyComparison {
    pub user_id: UserId,
    pub sequential: AggregateRun,
    pub parallel: AggregateRun,
}

impl LatencyComparison {
    /// Whether both strategies produced the same composite result.
    pub fn results_match(&self) -> bool {
        self.sequential.result == self.parallel.result
    }

    /// How many times faster the parallel run was; below 1.0 when it was
    /// slower. `None` when the parallel run took no measurable time.
    pub fn speedup(&self) -> Option<f64> {
        let parallel = self.parallel.elapsed.as_secs_f64();
        if parallel == 0.0 {
            return None;
        }
        Some(self.sequential.elapsed.as_secs_f64() / parallel)
    }

    /// Whether the parallel run took longer than the sequential one.
    pub fn parallel_was_slower(&self) -> bool {
        self.parallel.elapsed > self.sequential.elapsed
    }

    /// Wall-clock time the parallel run saved.
    pub fn saved(&self) -> Duration {
        self.sequential.elapsed.saturating_sub(self.parallel.elapsed)
    }

    /// Wall-clock time the parallel run lost.
    pub fn lost(&self) -> Duration {
        self.parallel.elapsed.saturating_sub(self.sequential.elapsed)
    }
}

/// Run the sequential strategy, then the parallel one, for `user_id`.
///
/// Fails with the first strategy's error if either run fails.
pub async fn compare_latency(
    source: Arc<dyn DataSource>,
    observer: Arc<dyn AggregationObserver>,
    user_id: UserId,
) -> Result<LatencyComparison, AggregateError> {
    let sequential = SequentialAggregator::new(Arc::clone(&source), Arc::clone(&observer))
        .run_timed(user_id)
        .await?;
    let parallel = ParallelAggregator::new(source, observer)
        .run_timed(user_id)
        .await?;

    Ok(LatencyComparison {
        user_id,
        sequential,
        parallel,
    })
}
