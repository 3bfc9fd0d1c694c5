//! Background Task Execution Implementation

use bridge_traits::background::{BoxTask, TaskSpawner};
use tokio::runtime::Handle;
use tracing::{debug, error, warn};

/// Tokio-based task spawner for desktop.
///
/// Tasks run detached on the runtime captured at construction (or the
/// ambient runtime at spawn time). A panicking task is logged, never
/// propagated.
#[derive(Debug, Clone, Default)]
pub struct TokioTaskSpawner {
    handle: Option<Handle>,
}

impl TokioTaskSpawner {
    /// Capture the current runtime if there is one.
    pub fn new() -> Self {
        Self {
            handle: Handle::try_current().ok(),
        }
    }

    /// Spawn onto a specific runtime.
    pub fn with_handle(handle: Handle) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    fn runtime(&self) -> Option<Handle> {
        self.handle.clone().or_else(|| Handle::try_current().ok())
    }
}

impl TaskSpawner for TokioTaskSpawner {
    fn spawn(&self, name: &'static str, task: BoxTask) {
        let Some(runtime) = self.runtime() else {
            warn!(task = name, "No Tokio runtime available; dropping background task");
            return;
        };

        let join = runtime.spawn(task);
        runtime.spawn(async move {
            match join.await {
                Ok(()) => debug!(task = name, "Background task finished"),
                Err(e) if e.is_panic() => error!(task = name, "Background task panicked"),
                Err(e) => warn!(task = name, error = %e, "Background task aborted"),
            }
        });
    }
}
