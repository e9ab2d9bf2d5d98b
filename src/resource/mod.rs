pub mod debounce;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::FetchError;

/// One remote data dependency, expressed as a fetch over an argument.
///
/// Implementations are the seam between a resource and the actual transport;
/// the feed adapters in `crate::client` bind one upstream endpoint each.
#[async_trait]
pub trait ResourceFetcher<A>: Send + Sync + 'static {
    type Output: Send + Sync + 'static;

    async fn fetch(&self, arg: A) -> Result<Self::Output, FetchError>;
}

/// Lifecycle of a remotely fetched value.
///
/// A tagged union instead of independent loading/error/data fields, so invalid
/// combinations (loading and failed at once) cannot be represented. Previously
/// loaded data rides along through `Loading` and `Failed` so consumers can keep
/// showing it while a refetch is in flight.
#[derive(Debug)]
pub enum ResourceState<T> {
    Idle,
    Loading { stale: Option<Arc<T>> },
    Loaded(Arc<T>),
    Failed { error: FetchError, stale: Option<Arc<T>> },
}

// Manual impl: the payloads are shared via Arc, so cloning a snapshot must not
// require T: Clone.
impl<T> Clone for ResourceState<T> {
    fn clone(&self) -> Self {
        match self {
            ResourceState::Idle => ResourceState::Idle,
            ResourceState::Loading { stale } => ResourceState::Loading { stale: stale.clone() },
            ResourceState::Loaded(data) => ResourceState::Loaded(Arc::clone(data)),
            ResourceState::Failed { error, stale } => ResourceState::Failed {
                error: error.clone(),
                stale: stale.clone(),
            },
        }
    }
}

impl<T> ResourceState<T> {
    /// Most recent successfully fetched value, if any.
    pub fn data(&self) -> Option<&Arc<T>> {
        match self {
            ResourceState::Idle => None,
            ResourceState::Loading { stale } => stale.as_ref(),
            ResourceState::Loaded(data) => Some(data),
            ResourceState::Failed { stale, .. } => stale.as_ref(),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ResourceState::Loading { .. })
    }

    /// Error from the last failed attempt. Cleared when a new attempt starts.
    pub fn error(&self) -> Option<&FetchError> {
        match self {
            ResourceState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    fn to_loading(&self) -> Self {
        ResourceState::Loading {
            stale: self.data().cloned(),
        }
    }
}

struct Ctl<A> {
    /// Sequence number of the most recently issued fetch. A response is
    /// applied only while its sequence still equals this value; anything
    /// older is discarded, so the latest-issued request always wins.
    issued: u64,
    arg: A,
}

struct Shared<A, T> {
    state: watch::Sender<ResourceState<T>>,
    ctl: Mutex<Ctl<A>>,
    detached: AtomicBool,
}

/// Handle to one mounted resource.
///
/// Mounting issues exactly one fetch with the default argument. `refresh`
/// re-runs with the last-used argument, `refetch_with` swaps the argument.
/// Overlapping fetches are fenced on a monotonic sequence number. Dropping
/// the handle (or calling `detach`) suppresses any still-in-flight updates;
/// the underlying request is not cancelled, its result is simply discarded.
pub struct Resource<A, T> {
    fetcher: Arc<dyn ResourceFetcher<A, Output = T>>,
    shared: Arc<Shared<A, T>>,
}

impl<A, T> Resource<A, T>
where
    A: Clone + Send + 'static,
    T: Send + Sync + 'static,
{
    pub fn mount(fetcher: Arc<dyn ResourceFetcher<A, Output = T>>, default_arg: A) -> Self {
        let (state, _) = watch::channel(ResourceState::Idle);
        let resource = Self {
            fetcher,
            shared: Arc::new(Shared {
                state,
                ctl: Mutex::new(Ctl {
                    issued: 0,
                    arg: default_arg.clone(),
                }),
                detached: AtomicBool::new(false),
            }),
        };
        resource.spawn_fetch(default_arg);
        resource
    }

    /// Re-fetch with the last-used argument.
    pub fn refresh(&self) {
        let arg = self.shared.ctl.lock().unwrap().arg.clone();
        self.spawn_fetch(arg);
    }

    /// Re-fetch with a new argument; subsequent `refresh` calls reuse it.
    pub fn refetch_with(&self, arg: A) {
        self.spawn_fetch(arg);
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> ResourceState<T> {
        self.shared.state.borrow().clone()
    }

    /// Watch the state as it changes.
    pub fn subscribe(&self) -> watch::Receiver<ResourceState<T>> {
        self.shared.state.subscribe()
    }

    /// Stop applying results from any in-flight fetch.
    pub fn detach(&self) {
        self.shared.detached.store(true, Ordering::Release);
    }

    fn spawn_fetch(&self, arg: A) {
        // All transitions happen under the control lock so a completion can
        // never interleave with a newer issue.
        let seq = {
            let mut ctl = self.shared.ctl.lock().unwrap();
            ctl.issued += 1;
            ctl.arg = arg.clone();
            self.shared.state.send_modify(|state| *state = state.to_loading());
            ctl.issued
        };

        let fetcher = Arc::clone(&self.fetcher);
        let shared = Arc::clone(&self.shared);

        tokio::spawn(async move {
            let result = fetcher.fetch(arg).await;

            if shared.detached.load(Ordering::Acquire) {
                return;
            }

            let ctl = shared.ctl.lock().unwrap();
            if seq != ctl.issued {
                tracing::debug!(seq, latest = ctl.issued, "discarding superseded fetch result");
                return;
            }

            shared.state.send_modify(|state| match result {
                Ok(value) => *state = ResourceState::Loaded(Arc::new(value)),
                Err(error) => {
                    let stale = state.data().cloned();
                    *state = ResourceState::Failed { error, stale };
                }
            });
            drop(ctl);
        });
    }
}

impl<A, T> Drop for Resource<A, T> {
    fn drop(&mut self) {
        self.shared.detached.store(true, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use tokio::sync::Notify;

    struct GatedFetcher {
        calls: Arc<AtomicUsize>,
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl ResourceFetcher<u32> for GatedFetcher {
        type Output = String;

        async fn fetch(&self, arg: u32) -> Result<String, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
            Ok(format!("value-{}", arg))
        }
    }

    /// Fetch delay and result are both encoded in the argument.
    struct TimedFetcher;

    #[async_trait]
    impl ResourceFetcher<(u64, &'static str)> for TimedFetcher {
        type Output = String;

        async fn fetch(&self, (delay_ms, value): (u64, &'static str)) -> Result<String, FetchError> {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            Ok(value.to_string())
        }
    }

    struct FlakyFetcher {
        fail: Arc<AtomicBool>,
    }

    #[async_trait]
    impl ResourceFetcher<()> for FlakyFetcher {
        type Output = String;

        async fn fetch(&self, _arg: ()) -> Result<String, FetchError> {
            if self.fail.load(Ordering::SeqCst) {
                Err(FetchError::Status { code: 500 })
            } else {
                Ok("fresh".to_string())
            }
        }
    }

    struct EchoFetcher {
        seen: Arc<Mutex<Vec<u32>>>,
    }

    #[async_trait]
    impl ResourceFetcher<u32> for EchoFetcher {
        type Output = u32;

        async fn fetch(&self, arg: u32) -> Result<u32, FetchError> {
            self.seen.lock().unwrap().push(arg);
            Ok(arg)
        }
    }

    #[tokio::test]
    async fn mount_issues_exactly_one_fetch_and_loads() {
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Notify::new());
        let fetcher = Arc::new(GatedFetcher {
            calls: calls.clone(),
            gate: gate.clone(),
        });

        let resource = Resource::mount(fetcher, 7);
        let mut rx = resource.subscribe();

        // Loading until the first resolution, with nothing stale to show
        assert!(matches!(resource.state(), ResourceState::Loading { stale: None }));

        gate.notify_one();
        let loaded = rx
            .wait_for(|s| matches!(s, ResourceState::Loaded(_)))
            .await
            .unwrap();
        assert_eq!(loaded.data().unwrap().as_str(), "value-7");
        drop(loaded);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn later_issued_fetch_wins_over_slower_earlier_one() {
        let resource = Resource::mount(Arc::new(TimedFetcher), (500, "first"));
        let mut rx = resource.subscribe();

        // Second fetch is issued while the first is in flight and resolves
        // much sooner.
        resource.refetch_with((50, "second"));

        let loaded = rx
            .wait_for(|s| matches!(s, ResourceState::Loaded(_)))
            .await
            .unwrap();
        assert_eq!(loaded.data().unwrap().as_str(), "second");
        drop(loaded);

        // Let the first response come back; it must be discarded.
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(resource.state().data().unwrap().as_str(), "second");
        assert!(!resource.state().is_loading());
    }

    #[tokio::test]
    async fn failure_sets_error_and_retains_previous_data() {
        let fail = Arc::new(AtomicBool::new(false));
        let resource = Resource::mount(Arc::new(FlakyFetcher { fail: fail.clone() }), ());
        let mut rx = resource.subscribe();

        rx.wait_for(|s| matches!(s, ResourceState::Loaded(_))).await.unwrap();

        fail.store(true, Ordering::SeqCst);
        resource.refresh();

        let failed = rx
            .wait_for(|s| matches!(s, ResourceState::Failed { .. }))
            .await
            .unwrap();
        assert!(matches!(failed.error(), Some(FetchError::Status { code: 500 })));
        // Stale-while-revalidate: the previous value is still visible
        assert_eq!(failed.data().unwrap().as_str(), "fresh");
        drop(failed);

        // A new attempt clears the error
        fail.store(false, Ordering::SeqCst);
        resource.refresh();
        assert!(resource.state().error().is_none());
        rx.wait_for(|s| matches!(s, ResourceState::Loaded(_))).await.unwrap();
    }

    #[tokio::test]
    async fn dropping_the_handle_suppresses_late_updates() {
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Notify::new());
        let fetcher = Arc::new(GatedFetcher {
            calls,
            gate: gate.clone(),
        });

        let resource = Resource::mount(fetcher, 1);
        let rx = resource.subscribe();

        drop(resource);
        gate.notify_one();
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;

        // Still showing the pre-teardown state; the resolution was discarded
        assert!(rx.borrow().is_loading());
    }

    #[tokio::test]
    async fn refresh_reuses_the_last_argument() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let resource = Resource::mount(Arc::new(EchoFetcher { seen: seen.clone() }), 1);
        let mut rx = resource.subscribe();
        rx.wait_for(|s| matches!(s, ResourceState::Loaded(_))).await.unwrap();

        resource.refetch_with(2);
        rx.wait_for(|s| matches!(s, ResourceState::Loaded(d) if **d == 2))
            .await
            .unwrap();

        resource.refresh();
        rx.wait_for(|s| matches!(s, ResourceState::Loaded(d) if **d == 2))
            .await
            .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 2]);
    }
}
