use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use log::{debug, trace, warn};

use crate::models::{NodeId, Point};
use crate::simulation::{Energy, ForceLayout, Nearest, PeriodicTrigger, TickCallback, TriggerHandle};
use crate::utils::LayoutError;

/// A [`ForceLayout`] shared between a periodic ticker and readers on other
/// threads.
///
/// Ticks and mutations hold the write lock for their whole duration; queries
/// hold the read lock. A tick that starts while another is still running is
/// refused rather than queued. The trigger registration made by
/// [`SharedLayout::start`] is released exactly once, by whichever of
/// [`SharedLayout::stop`], auto-stop or dropping the last handle comes first.
///
/// # Examples
///
/// ```
/// use rs_force_layout::models::{Graph, NodeOptions, Point};
/// use rs_force_layout::simulation::{ForceLayout, SharedLayout};
/// use rs_force_layout::utils::LayoutConfig;
///
/// let mut graph: Graph = Graph::new();
/// let a = graph.add_node_with("a", (), NodeOptions::at(Point::new(0.0, 0.0))).unwrap();
/// let shared = SharedLayout::new(ForceLayout::with_graph(graph, LayoutConfig::default()).unwrap());
///
/// shared.write(|layout| layout.start());
/// assert!(shared.tick());
/// // A lone node at rest has no energy, so the engine stops itself.
/// assert!(!shared.is_running());
/// assert!(!shared.tick());
/// assert_eq!(shared.positions(), vec![(a, Point::new(0.0, 0.0))]);
/// ```
pub struct SharedLayout<N = (), E = ()> {
    inner: Arc<Inner<N, E>>,
}

struct Inner<N, E> {
    layout: RwLock<ForceLayout<N, E>>,
    ticking: AtomicBool,
    registration: Mutex<Option<Box<dyn TriggerHandle>>>,
}

impl<N, E> Clone for SharedLayout<N, E> {
    fn clone(&self) -> Self {
        SharedLayout {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<N, E> SharedLayout<N, E> {
    pub fn new(layout: ForceLayout<N, E>) -> Self {
        SharedLayout {
            inner: Arc::new(Inner {
                layout: RwLock::new(layout),
                ticking: AtomicBool::new(false),
                registration: Mutex::new(None),
            }),
        }
    }

    /// Advances one tick if the engine is running. Returns whether a tick ran.
    ///
    /// Refused without blocking when another tick is in progress.
    pub fn tick(&self) -> bool {
        self.inner.tick()
    }

    /// Releases the trigger registration, if any, and moves to Stopped.
    pub fn stop(&self) {
        self.inner.write().stop();
        self.inner.release();
    }

    pub fn is_running(&self) -> bool {
        self.inner.read().is_running()
    }

    pub fn energy(&self) -> Energy {
        self.inner.read().energy()
    }

    pub fn nearest(&self, view: Point) -> Option<Nearest> {
        self.inner.read().nearest(view)
    }

    pub fn to_viewport(&self, model: Point) -> Point {
        self.inner.read().to_viewport(model)
    }

    pub fn to_model(&self, view: Point) -> Point {
        self.inner.read().to_model(view)
    }

    pub fn positions(&self) -> Vec<(NodeId, Point)> {
        self.inner.read().positions().collect()
    }

    pub fn pin(&self, id: NodeId) -> Result<(), LayoutError> {
        self.inner.write().pin(id)
    }

    pub fn unpin(&self, id: NodeId) -> Result<(), LayoutError> {
        self.inner.write().unpin(id)
    }

    pub fn drag_to(&self, id: NodeId, model: Point) -> Result<(), LayoutError> {
        self.inner.write().drag_to(id, model)
    }

    pub fn set_viewport_size(&self, width: f64, height: f64) -> Result<(), LayoutError> {
        self.inner.write().set_viewport_size(width, height)
    }

    /// Runs `f` under the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&ForceLayout<N, E>) -> R) -> R {
        f(&*self.inner.read())
    }

    /// Runs `f` under the write lock, so its changes land between ticks.
    ///
    /// Leaving the engine Stopped releases the trigger registration, the same
    /// as [`SharedLayout::stop`].
    pub fn write<R>(&self, f: impl FnOnce(&mut ForceLayout<N, E>) -> R) -> R {
        let (result, running) = {
            let mut layout = self.inner.write();
            let result = f(&mut *layout);
            (result, layout.is_running())
        };
        if !running {
            self.inner.release();
        }
        result
    }

    #[cfg(test)]
    pub(crate) fn hold_tick_guard(&self, held: bool) {
        self.inner.ticking.store(held, Ordering::SeqCst);
    }
}

impl<N, E> SharedLayout<N, E>
where
    N: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    /// Moves to Running and asks `trigger` to call [`SharedLayout::tick`]
    /// every `period`. No-op while a registration is live and the engine is
    /// running. An engine already moved to Running through
    /// [`SharedLayout::write`] still gets registered.
    ///
    /// # Errors
    ///
    /// A failed registration is returned as is and leaves the engine Stopped.
    pub fn start(&self, trigger: &dyn PeriodicTrigger, period: Duration) -> Result<(), LayoutError> {
        let stale = {
            let mut registration = self.inner.registration();
            if registration.is_some() && self.inner.read().is_running() {
                return Ok(());
            }
            registration.take()
        };
        if let Some(handle) = stale {
            debug!("dropping stale layout ticker before registering again");
            Inner::<N, E>::cancel(handle);
        }

        let mut registration = self.inner.registration();
        if registration.is_some() {
            return Ok(());
        }
        self.inner.write().start();

        let weak = Arc::downgrade(&self.inner);
        let callback: TickCallback = Box::new(move || match weak.upgrade() {
            Some(inner) => {
                inner.tick();
                inner.read().is_running()
            }
            None => false,
        });

        match trigger.register(period, callback) {
            Ok(handle) => {
                debug!("registered layout ticker every {:?}", period);
                *registration = Some(handle);
                Ok(())
            }
            Err(err) => {
                warn!("could not register layout ticker: {}", err);
                self.inner.write().stop();
                Err(err)
            }
        }
    }
}

impl<N, E> Inner<N, E> {
    fn read(&self) -> RwLockReadGuard<'_, ForceLayout<N, E>> {
        self.layout.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ForceLayout<N, E>> {
        self.layout.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn registration(&self) -> MutexGuard<'_, Option<Box<dyn TriggerHandle>>> {
        self.registration.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn tick(&self) -> bool {
        if self
            .ticking
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            trace!("tick already in progress, skipping");
            return false;
        }

        let report = {
            let mut layout = self.write();
            layout.is_running().then(|| layout.advance())
        };
        self.ticking.store(false, Ordering::Release);

        match report {
            Some(report) => {
                if report.stopped {
                    self.release();
                }
                true
            }
            None => false,
        }
    }

    /// Cancels the registration outside the mutex, so a trigger that waits
    /// for its own callback cannot deadlock against us.
    fn release(&self) {
        let handle = self.registration().take();
        if let Some(handle) = handle {
            Self::cancel(handle);
        }
    }

    fn cancel(handle: Box<dyn TriggerHandle>) {
        match handle.cancel() {
            Ok(()) => debug!("layout ticker released"),
            Err(err) => warn!("failed to release layout ticker: {}", err),
        }
    }
}

impl<N, E> Drop for Inner<N, E> {
    fn drop(&mut self) {
        let handle = self
            .registration
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if let Err(err) = handle.cancel() {
                warn!("failed to release layout ticker on drop: {}", err);
            }
        }
    }
}
