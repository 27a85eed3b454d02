//! Host page services the controller relies on.
//!
//! On `wasm32`, `BrowserPlatform` maps these onto `window.FormData`,
//! `window.location`, `setTimeout` and `spawn_local`. [`HeadlessPlatform`]
//! provides the same services on a manual clock for tests and server-side
//! rendering checks.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::time::Duration;

use futures::executor::{LocalPool, LocalSpawner};
use futures::future::LocalBoxFuture;
use futures::task::LocalSpawnExt;
use turbo_observability::StructuredLogger;

/// A deferred task scheduled with [`Platform::set_timeout`].
pub type TimerTask = Box<dyn FnOnce()>;

/// Services provided by the page hosting a controller.
pub trait Platform {
    /// Whether multipart form submission is available.
    fn supports_form_data(&self) -> bool;

    /// Scheme and host of the current page, without a trailing slash.
    fn origin(&self) -> String;

    /// Send the browser to `url`.
    fn navigate(&self, url: &str);

    /// Raise a page-wide notification for other widgets (mini cart, header).
    fn notify(&self, event: &str);

    /// Run `task` once after `delay`. Fire-and-forget.
    fn set_timeout(&self, delay: Duration, task: TimerTask);

    /// Drive `future` to completion on the UI loop.
    fn spawn(&self, future: LocalBoxFuture<'static, ()>);
}

/// In-process platform with a virtual clock.
///
/// Spawned futures run when [`run_until_stalled`](Self::run_until_stalled)
/// or [`advance`](Self::advance) is called. Timers fire in due order, ties
/// broken by scheduling order.
pub struct HeadlessPlatform {
    pool: RefCell<LocalPool>,
    spawner: LocalSpawner,
    now: Cell<Duration>,
    next_timer: Cell<u64>,
    timers: RefCell<BTreeMap<(Duration, u64), TimerTask>>,
    navigations: RefCell<Vec<String>>,
    notifications: RefCell<Vec<String>>,
    form_data: bool,
    origin: String,
    logger: StructuredLogger,
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HeadlessPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadlessPlatform")
            .field("now", &self.now.get())
            .field("pending_timers", &self.pending_timers())
            .field("form_data", &self.form_data)
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

impl HeadlessPlatform {
    /// Create a platform at time zero with multipart support.
    pub fn new() -> Self {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        Self {
            pool: RefCell::new(pool),
            spawner,
            now: Cell::new(Duration::ZERO),
            next_timer: Cell::new(0),
            timers: RefCell::new(BTreeMap::new()),
            navigations: RefCell::new(Vec::new()),
            notifications: RefCell::new(Vec::new()),
            form_data: true,
            origin: "https://store.example".to_string(),
            logger: StructuredLogger::new("headless-platform"),
        }
    }

    /// Simulate a browser without `FormData`.
    pub fn without_form_data(mut self) -> Self {
        self.form_data = false;
        self
    }

    /// Set the page origin.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Virtual time elapsed since creation.
    pub fn now(&self) -> Duration {
        self.now.get()
    }

    /// Run spawned futures until none can make progress.
    pub fn run_until_stalled(&self) {
        self.pool.borrow_mut().run_until_stalled();
    }

    /// Move the clock forward, firing due timers in order.
    pub fn advance(&self, by: Duration) {
        let target = self.now.get() + by;
        self.run_until_stalled();

        loop {
            let due = {
                let mut timers = self.timers.borrow_mut();
                match timers.first_key_value() {
                    Some((&(at, _), _)) if at <= target => timers.pop_first(),
                    _ => None,
                }
            };
            let Some(((at, _), task)) = due else {
                break;
            };
            self.now.set(at);
            task();
            self.run_until_stalled();
        }

        self.now.set(target);
    }

    /// Number of timers not yet fired.
    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    /// URLs passed to [`Platform::navigate`], oldest first.
    pub fn navigations(&self) -> Vec<String> {
        self.navigations.borrow().clone()
    }

    /// Notifications raised through [`Platform::notify`], oldest first.
    pub fn notifications(&self) -> Vec<String> {
        self.notifications.borrow().clone()
    }
}

impl Platform for HeadlessPlatform {
    fn supports_form_data(&self) -> bool {
        self.form_data
    }

    fn origin(&self) -> String {
        self.origin.clone()
    }

    fn navigate(&self, url: &str) {
        self.navigations.borrow_mut().push(url.to_string());
    }

    fn notify(&self, event: &str) {
        self.notifications.borrow_mut().push(event.to_string());
    }

    fn set_timeout(&self, delay: Duration, task: TimerTask) {
        let seq = self.next_timer.get();
        self.next_timer.set(seq + 1);
        self.timers
            .borrow_mut()
            .insert((self.now.get() + delay, seq), task);
    }

    fn spawn(&self, future: LocalBoxFuture<'static, ()>) {
        if let Err(e) = self.spawner.spawn_local(future) {
            self.logger
                .error_builder("Failed to spawn task")
                .field("error", e.to_string())
                .emit();
        }
    }
}
