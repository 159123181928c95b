// ── Refresh orchestration ──
//
// Two controllers share one lifecycle: `Controller` watches every file
// system in a region, `DetailController` watches one file system and its
// volumes or metadata servers. Each runs a listing loop and a metrics loop
// on independent cadences and signals consumers after every write.

mod detail;
mod summary;

use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use futures_util::future::join_all;
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub use detail::DetailController;
pub use summary::Controller;

/// Upper bound on concurrent secondary fetches within one cycle.
pub const MAX_CONCURRENT_FETCHES: usize = 20;

/// How long `stop()` waits for the loops before abandoning them.
pub const STOP_JOIN_TIMEOUT: Duration = Duration::from_secs(2);

// ── LifecycleState ───────────────────────────────────────────────────

/// Controller lifecycle. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LifecycleState {
    Idle,
    Running,
    Stopped,
}

// ── Lifecycle ────────────────────────────────────────────────────────

/// State, cancellation and task bookkeeping shared by both controllers.
///
/// `loops` stops the polling loops; `workers` is tripped after the loops
/// have been joined (or abandoned) and gates every store write made by
/// in-flight work.
struct Lifecycle {
    state: Mutex<LifecycleState>,
    loops: CancellationToken,
    workers: CancellationToken,
    task_handles: tokio::sync::Mutex<Vec<JoinHandle<()>>>,
}

impl Lifecycle {
    fn new() -> Self {
        Self {
            state: Mutex::new(LifecycleState::Idle),
            loops: CancellationToken::new(),
            workers: CancellationToken::new(),
            task_handles: tokio::sync::Mutex::new(Vec::new()),
        }
    }

    fn state(&self) -> LifecycleState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claim the `Idle → Running` transition. Returns `false` when the
    /// controller is already running or has been stopped.
    fn begin(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match *state {
            LifecycleState::Idle => {
                *state = LifecycleState::Running;
                true
            }
            LifecycleState::Running => false,
            LifecycleState::Stopped => {
                warn!("controller already stopped; start ignored");
                false
            }
        }
    }

    fn mark_stopped(&self) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = LifecycleState::Stopped;
    }

    /// Whether results may still be written to the store.
    fn accepting_writes(&self) -> bool {
        !self.workers.is_cancelled()
    }

    /// Run `fut` as a tracked polling loop.
    async fn spawn_loop(&self, fut: impl Future<Output = ()> + Send + 'static) {
        self.task_handles.lock().await.push(tokio::spawn(fut));
    }

    /// Run `fut` as untracked worker. It is dropped at its next await
    /// point once the workers token is cancelled.
    fn spawn_worker(&self, fut: impl Future<Output = ()> + Send + 'static) {
        let workers = self.workers.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = workers.cancelled() => {}
                () = fut => {}
            }
        });
    }

    /// Signal the loops, join them within [`STOP_JOIN_TIMEOUT`], then
    /// release in-flight workers without waiting for them.
    async fn shutdown(&self) {
        self.mark_stopped();
        self.loops.cancel();

        let handles: Vec<_> = self.task_handles.lock().await.drain(..).collect();
        let count = handles.len();
        if tokio::time::timeout(STOP_JOIN_TIMEOUT, join_all(handles))
            .await
            .is_err()
        {
            warn!(tasks = count, "refresh loops did not finish in time; abandoning");
        }

        self.workers.cancel();
        debug!("controller stopped");
    }
}

/// Sleep `period`, run `refresh`, repeat until `cancel` fires.
///
/// The wait restarts after each refresh completes, so a slow refresh
/// never triggers catch-up runs.
async fn poll_loop<F, Fut>(period: Duration, cancel: CancellationToken, mut refresh: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(period) => refresh().await,
        }
    }
}
