//! Blocking command dispatch onto one dedicated worker thread.
//!
//! The worker thread exclusively owns a state value `S` (the windowing
//! system plus all live markers). Any number of caller threads submit
//! closures over `S` and block until the worker has executed them, giving
//! callers a linearizable view of the marker set: commands run in strict
//! FIFO order and `submit` only returns after its closure completed.
//!
//! Each tick the worker drains every queued command, lets the toolkit
//! process one iteration of pending events, then sleeps for a short fixed
//! interval, so UI responsiveness stays bounded by the tick without
//! commands ever being starved by an event stream.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, SyncSender, TryRecvError};
use std::thread::JoinHandle;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;

/// Failure delivered to a submitting caller. A command's failure is only
/// ever seen by its own caller; the worker loop always survives it.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The dispatcher was stopped before or while the command was queued.
    #[error("dispatcher stopped")]
    Stopped,
    /// The worker thread terminated outside [`stop`](Dispatcher::stop),
    /// e.g. from a panicking pump. The dispatcher is dead for good; its
    /// state was lost with the thread.
    #[error("dispatcher worker terminated unexpectedly")]
    Died,
    /// The command panicked on the worker thread.
    #[error("dispatched command panicked")]
    Panicked,
    /// The worker's init closure failed; the thread never accepted commands.
    #[error("dispatcher initialization failed: {0}")]
    Init(#[source] anyhow::Error),
    /// The command itself returned an error.
    #[error(transparent)]
    Command(anyhow::Error),
}

/// A queued unit of work. Called with `Some(state)` to execute, or `None`
/// to cancel with [`DispatchError::Stopped`] at shutdown.
type Job<S> = Box<dyn FnOnce(Option<&mut S>) + Send>;

struct Worker<S: 'static> {
    tx: Sender<Job<S>>,
    handle: JoinHandle<()>,
}

/// Single-consumer command queue bound to one worker thread owning `S`.
pub struct Dispatcher<S: 'static> {
    init: Arc<dyn Fn() -> anyhow::Result<S> + Send + Sync>,
    pump: Arc<dyn Fn(&mut S) + Send + Sync>,
    tick: Duration,
    worker: Mutex<Option<Worker<S>>>,
    stopped: Arc<AtomicBool>,
}

impl<S: 'static> Dispatcher<S> {
    /// Build a dispatcher. `init` runs on the worker thread when [`start`]
    /// spawns it; `pump` is the toolkit's process-pending-events call,
    /// invoked once per tick.
    ///
    /// [`start`]: Dispatcher::start
    pub fn new(
        init: impl Fn() -> anyhow::Result<S> + Send + Sync + 'static,
        pump: impl Fn(&mut S) + Send + Sync + 'static,
        tick: Duration,
    ) -> Self {
        Self {
            init: Arc::new(init),
            pump: Arc::new(pump),
            tick,
            worker: Mutex::new(None),
            stopped: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Spawn the worker thread and block until its init completed, so the
    /// thread-owned environment exists before any command is accepted.
    ///
    /// A no-op while the worker is alive. Fails with
    /// [`DispatchError::Stopped`] once [`stop`] has been called, and with
    /// [`DispatchError::Died`] if the worker exited on its own: only an
    /// `init` failure leaves the dispatcher restartable, never a thread
    /// that died holding live state.
    ///
    /// [`stop`]: Dispatcher::stop
    pub fn start(&self) -> Result<(), DispatchError> {
        if self.stopped.load(Ordering::SeqCst) {
            return Err(DispatchError::Stopped);
        }
        let mut worker = self.worker.lock();
        if let Some(w) = worker.as_ref() {
            if !w.handle.is_finished() {
                return Ok(());
            }
            // Rebuilding state here would silently discard every marker
            // the dead worker owned.
            self.stopped.store(true, Ordering::SeqCst);
            tracing::error!("dispatcher worker terminated unexpectedly");
            return Err(DispatchError::Died);
        }

        let (tx, rx) = mpsc::channel::<Job<S>>();
        let (ready_tx, ready_rx) = mpsc::sync_channel::<anyhow::Result<()>>(1);
        let init = Arc::clone(&self.init);
        let pump = Arc::clone(&self.pump);
        let stopped = Arc::clone(&self.stopped);
        let tick = self.tick;
        let handle = std::thread::Builder::new()
            .name("screenmarks-ui".into())
            .spawn(move || run_loop(init, pump, tick, rx, stopped, ready_tx))
            .map_err(|e| DispatchError::Init(e.into()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => {
                *worker = Some(Worker { tx, handle });
                Ok(())
            }
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(DispatchError::Init(e))
            }
            // Worker died before signalling readiness
            Err(_) => {
                let _ = handle.join();
                Err(DispatchError::Died)
            }
        }
    }

    /// Run `job` on the worker thread and block until it finished,
    /// returning its result or re-delivering its failure to this caller.
    ///
    /// Safe to call concurrently from many threads; every call pairs with
    /// its own private reply channel.
    pub fn submit<R, F>(&self, job: F) -> Result<R, DispatchError>
    where
        R: Send + 'static,
        F: FnOnce(&mut S) -> anyhow::Result<R> + Send + 'static,
    {
        if self.stopped.load(Ordering::SeqCst) {
            return Err(DispatchError::Stopped);
        }
        let tx = self
            .worker
            .lock()
            .as_ref()
            .map(|w| w.tx.clone())
            .ok_or(DispatchError::Stopped)?;

        let (reply_tx, reply_rx) = mpsc::sync_channel::<Result<R, DispatchError>>(1);
        let wrapped: Job<S> = Box::new(move |state| {
            let outcome = match state {
                Some(state) => match panic::catch_unwind(AssertUnwindSafe(|| job(state))) {
                    Ok(Ok(value)) => Ok(value),
                    Ok(Err(e)) => Err(DispatchError::Command(e)),
                    Err(_) => Err(DispatchError::Panicked),
                },
                None => Err(DispatchError::Stopped),
            };
            // Reply receiver may have vanished; the worker must not care.
            let _ = reply_tx.send(outcome);
        });

        tx.send(wrapped).map_err(|_| self.disconnect_error())?;
        reply_rx
            .recv()
            .unwrap_or_else(|_| Err(self.disconnect_error()))
    }

    /// A closed queue means either an orderly stop or a dead worker.
    fn disconnect_error(&self) -> DispatchError {
        if self.stopped.load(Ordering::SeqCst) {
            DispatchError::Stopped
        } else {
            DispatchError::Died
        }
    }

    /// Signal termination, fail any still-queued commands fast and join the
    /// worker with a bounded timeout. Permanent: later `start`/`submit`
    /// calls return [`DispatchError::Stopped`].
    pub fn stop(&self, join_timeout: Duration) {
        self.stopped.store(true, Ordering::SeqCst);
        let worker = self.worker.lock().take();
        if let Some(Worker { tx, handle }) = worker {
            drop(tx);
            join_with_timeout(handle, join_timeout);
        }
    }

    /// Whether [`stop`](Dispatcher::stop) has been called.
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

fn run_loop<S: 'static>(
    init: Arc<dyn Fn() -> anyhow::Result<S> + Send + Sync>,
    pump: Arc<dyn Fn(&mut S) + Send + Sync>,
    tick: Duration,
    rx: Receiver<Job<S>>,
    stopped: Arc<AtomicBool>,
    ready: SyncSender<anyhow::Result<()>>,
) {
    let mut state = match panic::catch_unwind(AssertUnwindSafe(&*init)) {
        Ok(Ok(state)) => {
            let _ = ready.send(Ok(()));
            state
        }
        Ok(Err(e)) => {
            let _ = ready.send(Err(e));
            return;
        }
        Err(_) => {
            let _ = ready.send(Err(anyhow::anyhow!("initialization panicked")));
            return;
        }
    };

    'ticks: loop {
        // Drain everything queued this tick; once stopping, cancel instead.
        loop {
            match rx.try_recv() {
                Ok(job) => {
                    if stopped.load(Ordering::SeqCst) {
                        job(None);
                    } else {
                        job(Some(&mut state));
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break 'ticks,
            }
        }
        if stopped.load(Ordering::SeqCst) {
            break;
        }
        pump(&mut state);
        std::thread::sleep(tick);
    }

    // Anything that slipped in before the channel closed fails fast.
    while let Ok(job) = rx.try_recv() {
        job(None);
    }
    // UI-owned resources are torn down on the thread that owns them.
    drop(state);
    tracing::debug!("dispatcher worker exited");
}

/// Join the worker without risking an unbounded block if it wedged.
fn join_with_timeout(handle: JoinHandle<()>, timeout: Duration) {
    let (done_tx, done_rx) = mpsc::channel();
    std::thread::spawn(move || {
        let clean = handle.join().is_ok();
        let _ = done_tx.send(clean);
    });
    match done_rx.recv_timeout(timeout) {
        Ok(true) => {}
        Ok(false) => tracing::error!("dispatcher worker panicked during shutdown"),
        Err(_) => tracing::error!("dispatcher worker did not exit within {timeout:?}"),
    }
}
