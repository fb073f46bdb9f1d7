//! Background execution with single-shot result delivery.
//!
//! [`fire`] runs an operation on the runtime and hands back a
//! [`ResultChannel`] that yields exactly one terminal result. Dropping or
//! cancelling the channel aborts the work.
//!
//! [`LatestOnly`] layers "last query wins" on top: each new input cancels the
//! previous derivation, and observers only ever see the result of the most
//! recent input.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::{oneshot, watch};
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::error::WeatherError;

/// Single-shot delivery of an operation's outcome.
pub struct ResultChannel<T> {
    rx: oneshot::Receiver<Result<T, WeatherError>>,
    token: CancellationToken,
    _guard: DropGuard,
    delivered: bool,
}

/// Run `op` on `runtime` and return a channel for its result.
///
/// Errors returned by `op` pass through untouched. A panic inside `op`
/// becomes [`WeatherError::Task`]. Cancelling (or dropping) the channel
/// aborts `op` and resolves the channel with [`WeatherError::Cancelled`].
pub fn fire<T, Fut>(runtime: &Handle, op: Fut) -> ResultChannel<T>
where
    T: Send + 'static,
    Fut: Future<Output = Result<T, WeatherError>> + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    let token = CancellationToken::new();
    let pump_token = token.clone();

    let mut work = runtime.spawn(op);
    runtime.spawn(async move {
        let result = tokio::select! {
            _ = pump_token.cancelled() => {
                work.abort();
                Err(WeatherError::Cancelled)
            }
            joined = &mut work => match joined {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!("Background operation failed: {}", e);
                    Err(WeatherError::from(e))
                }
            },
        };
        // Receiver may already be gone.
        let _ = tx.send(result);
    });

    ResultChannel {
        rx,
        _guard: token.clone().drop_guard(),
        token,
        delivered: false,
    }
}

impl<T> ResultChannel<T> {
    /// Wait for the terminal result.
    pub async fn recv(mut self) -> Result<T, WeatherError> {
        match (&mut self.rx).await {
            Ok(result) => result,
            Err(_) => Err(WeatherError::Cancelled),
        }
    }

    /// Non-blocking poll. `None` while pending and after the result has
    /// been taken; the result itself is handed out once.
    pub fn try_recv(&mut self) -> Option<Result<T, WeatherError>> {
        if self.delivered {
            return None;
        }
        match self.rx.try_recv() {
            Ok(result) => {
                self.delivered = true;
                Some(result)
            }
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => {
                self.delivered = true;
                Some(Err(WeatherError::Cancelled))
            }
        }
    }

    /// Abort the underlying work. The channel then resolves to
    /// [`WeatherError::Cancelled`] unless a result was already produced.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// One published result of a [`LatestOnly`] derivation.
#[derive(Debug)]
pub struct Observation<I, T> {
    /// Trigger sequence number that produced this result.
    pub seq: u64,
    pub input: I,
    pub result: Result<T, WeatherError>,
}

type Derive<I, T> = Box<dyn Fn(I) -> ResultChannel<T> + Send + Sync>;
type Slot<I, T> = Option<Arc<Observation<I, T>>>;

/// Switch-map over a stream of inputs: only the latest input's result is
/// ever published.
pub struct LatestOnly<I, T> {
    derive: Derive<I, T>,
    runtime: Handle,
    published: Arc<watch::Sender<Slot<I, T>>>,
    seq: Arc<AtomicU64>,
    in_flight: Option<CancellationToken>,
    last_input: Option<I>,
}

impl<I, T> LatestOnly<I, T>
where
    I: Clone + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    pub fn new<F>(runtime: Handle, derive: F) -> Self
    where
        F: Fn(I) -> ResultChannel<T> + Send + Sync + 'static,
    {
        let (published, _) = watch::channel(None);
        Self {
            derive: Box::new(derive),
            runtime,
            published: Arc::new(published),
            seq: Arc::new(AtomicU64::new(0)),
            in_flight: None,
            last_input: None,
        }
    }

    /// Start a derivation for `input`, cancelling any one still in flight.
    /// Returns the trigger's sequence number.
    pub fn trigger(&mut self, input: I) -> u64 {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(previous) = self.in_flight.take() {
            previous.cancel();
        }

        let channel = (self.derive)(input.clone());
        let token = CancellationToken::new();
        let pump_token = token.clone();
        let published = Arc::clone(&self.published);
        let current = Arc::clone(&self.seq);
        let observed = input.clone();

        self.runtime.spawn(async move {
            let result = tokio::select! {
                _ = pump_token.cancelled() => {
                    tracing::debug!("Derivation #{} superseded", seq);
                    return;
                }
                result = channel.recv() => result,
            };
            published.send_if_modified(|slot| {
                if current.load(Ordering::SeqCst) != seq {
                    return false;
                }
                *slot = Some(Arc::new(Observation {
                    seq,
                    input: observed,
                    result,
                }));
                true
            });
        });

        self.in_flight = Some(token);
        self.last_input = Some(input);
        seq
    }

    /// Re-run the last input. `None` if nothing was triggered yet.
    pub fn retrigger(&mut self) -> Option<u64> {
        let input = self.last_input.clone()?;
        Some(self.trigger(input))
    }

    pub fn subscribe(&self) -> Observer<I, T> {
        Observer {
            rx: self.published.subscribe(),
        }
    }

    pub fn last_input(&self) -> Option<&I> {
        self.last_input.as_ref()
    }

    /// Sequence number of the most recent trigger (0 before the first).
    pub fn current_seq(&self) -> u64 {
        self.seq.load(Ordering::SeqCst)
    }
}

impl<I, T> Drop for LatestOnly<I, T> {
    fn drop(&mut self) {
        if let Some(token) = self.in_flight.take() {
            token.cancel();
        }
    }
}

/// Receiving side of a [`LatestOnly`].
pub struct Observer<I, T> {
    rx: watch::Receiver<Slot<I, T>>,
}

impl<I, T> Observer<I, T> {
    /// Wait for the next published result. `None` once the source is gone.
    pub async fn changed(&mut self) -> Option<Arc<Observation<I, T>>> {
        self.rx.changed().await.ok()?;
        self.rx.borrow_and_update().clone()
    }

    /// Most recently published result, if any.
    pub fn latest(&self) -> Option<Arc<Observation<I, T>>> {
        self.rx.borrow().clone()
    }
}
