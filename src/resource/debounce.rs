use std::time::Duration;

use tokio::select;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

/// Which edge of a burst of changes triggers the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceEdge {
    /// Apply the first change immediately, swallow the rest of the burst.
    Leading,
    /// Apply the last change once the quiescence window elapses.
    Trailing,
}

#[derive(Debug, Clone, Copy)]
pub struct DebounceConfig {
    /// Minimum idle duration after the last change before the sink fires.
    pub quiet: Duration,
    /// Cap on how long a burst can keep the window open. For a trailing edge
    /// this force-flushes the pending value; for a leading edge it clears the
    /// window so the next change fires immediately again.
    pub max_wait: Option<Duration>,
    pub edge: DebounceEdge,
}

impl DebounceConfig {
    pub fn trailing(quiet: Duration) -> Self {
        Self {
            quiet,
            max_wait: None,
            edge: DebounceEdge::Trailing,
        }
    }

    pub fn leading(quiet: Duration) -> Self {
        Self {
            quiet,
            max_wait: None,
            edge: DebounceEdge::Leading,
        }
    }

    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }
}

/// Collapses a rapidly-changing input into occasional sink invocations.
///
/// All timer state is owned by a single task; a new value can only replace the
/// pending one and re-arm the timers, so there is no stale timer handle to
/// lose a max-wait flush to. Dropping the handle discards whatever is pending.
pub struct Debouncer<V> {
    tx: mpsc::UnboundedSender<V>,
}

impl<V: Send + 'static> Debouncer<V> {
    pub fn new(config: DebounceConfig, on_settle: impl FnMut(V) + Send + 'static) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(config, rx, on_settle));
        Self { tx }
    }

    /// Feed a new input value. Cheap; never blocks.
    pub fn update(&self, value: V) {
        let _ = self.tx.send(value);
    }
}

async fn run<V>(config: DebounceConfig, mut rx: mpsc::UnboundedReceiver<V>, mut on_settle: impl FnMut(V)) {
    let mut pending: Option<V> = None;
    let mut quiet_deadline: Option<Instant> = None;
    let mut max_deadline: Option<Instant> = None;

    loop {
        // Arm whichever deadline comes first
        let deadline = match (quiet_deadline, max_deadline) {
            (Some(quiet), Some(max)) => Some(quiet.min(max)),
            (Some(quiet), None) => Some(quiet),
            (None, Some(max)) => Some(max),
            (None, None) => None,
        };

        select! {
            received = rx.recv() => match received {
                Some(value) => {
                    let now = Instant::now();
                    match config.edge {
                        DebounceEdge::Leading => {
                            if quiet_deadline.is_none() {
                                on_settle(value);
                            }
                        }
                        DebounceEdge::Trailing => {
                            pending = Some(value);
                        }
                    }
                    quiet_deadline = Some(now + config.quiet);
                    // Pinned at the first change of the burst, for either edge
                    if max_deadline.is_none() {
                        max_deadline = config.max_wait.map(|wait| now + wait);
                    }
                }
                // Handle dropped; discard anything still pending
                None => break,
            },
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                if let Some(value) = pending.take() {
                    on_settle(value);
                }
                quiet_deadline = None;
                max_deadline = None;
            }
        }
    }
}
