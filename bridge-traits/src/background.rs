//! Background Execution
//!
//! Fire-and-forget submission of warm-up work (cover side-fetches, release
//! caching, whole-album prefetch). The submitter never observes the outcome;
//! implementations log failures.

use futures::future::BoxFuture;

/// A detached unit of work.
pub type BoxTask = BoxFuture<'static, ()>;

/// Spawns detached tasks.
///
/// Implementations:
/// - Desktop: `tokio::spawn` on the ambient runtime
/// - Tests: a spawner that records handles so the test can await them
///
/// # Example
///
/// ```ignore
/// use bridge_traits::background::TaskSpawner;
///
/// fn warm(spawner: &dyn TaskSpawner, work: BoxTask) {
///     spawner.spawn("album-warmup", work);
/// }
/// ```
pub trait TaskSpawner: Send + Sync {
    /// Submit `task` for background execution. `name` identifies it in logs.
    fn spawn(&self, name: &'static str, task: BoxTask);
}
