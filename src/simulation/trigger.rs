use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::debug;

use crate::utils::LayoutError;

/// Callback handed to a [`PeriodicTrigger`]. Returning `false` asks the
/// trigger to stop firing.
pub type TickCallback = Box<dyn FnMut() -> bool + Send + 'static>;

/// Something that can call a callback once per period.
///
/// Implementations must never run the callback concurrently with itself and
/// must not call it synchronously from inside `register`.
pub trait PeriodicTrigger {
    fn register(&self, period: Duration, callback: TickCallback) -> Result<Box<dyn TriggerHandle>, LayoutError>;
}

/// Registration returned by [`PeriodicTrigger::register`]. Consumed on cancel,
/// so it can only be released once.
pub trait TriggerHandle: Send {
    fn cancel(self: Box<Self>) -> Result<(), LayoutError>;
}

/// Fires the callback from a dedicated thread, sleeping `period` between calls.
///
/// # Examples
///
/// ```
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
/// use rs_force_layout::simulation::{IntervalTrigger, PeriodicTrigger};
///
/// let calls = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&calls);
/// let handle = IntervalTrigger
///     .register(Duration::from_millis(1), Box::new(move || counter.fetch_add(1, Ordering::SeqCst) < 2))
///     .unwrap();
///
/// while calls.load(Ordering::SeqCst) < 3 {
///     std::thread::sleep(Duration::from_millis(1));
/// }
/// handle.cancel().unwrap();
/// assert_eq!(calls.load(Ordering::SeqCst), 3);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct IntervalTrigger;

impl PeriodicTrigger for IntervalTrigger {
    fn register(&self, period: Duration, mut callback: TickCallback) -> Result<Box<dyn TriggerHandle>, LayoutError> {
        if period.is_zero() {
            return Err(LayoutError::Trigger("period must be longer than zero".to_string()));
        }
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let worker = thread::Builder::new()
            .name("layout-ticker".to_string())
            .spawn(move || {
                while !flag.load(Ordering::Acquire) {
                    thread::sleep(period);
                    if flag.load(Ordering::Acquire) || !callback() {
                        break;
                    }
                }
                debug!("layout ticker finished");
            })
            .map_err(|e| LayoutError::Trigger(e.to_string()))?;
        Ok(Box::new(IntervalHandle { cancelled, worker }))
    }
}

struct IntervalHandle {
    cancelled: Arc<AtomicBool>,
    worker: JoinHandle<()>,
}

impl TriggerHandle for IntervalHandle {
    fn cancel(self: Box<Self>) -> Result<(), LayoutError> {
        self.cancelled.store(true, Ordering::Release);
        // Cancelled from inside the callback: the loop exits on its own.
        if self.worker.thread().id() == thread::current().id() {
            return Ok(());
        }
        self.worker
            .join()
            .map_err(|_| LayoutError::Trigger("ticker thread panicked".to_string()))
    }
}
