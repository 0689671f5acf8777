//! Process-wide authorization state.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use reflow_core::Scheduler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    Anonymous,
    Authenticated,
}

struct AuthInner {
    status: Cell<AuthStatus>,
    scheduler: RefCell<Option<Scheduler>>,
}

/// Cloneable handle; starts anonymous. Transitions resolve through the
/// deferred-task queue, never inline, so they cannot race a render in
/// progress or a navigation queued in the same turn.
#[derive(Clone)]
pub struct AuthStore {
    inner: Rc<AuthInner>,
}

impl Default for AuthStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthStore {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(AuthInner {
                status: Cell::new(AuthStatus::Anonymous),
                scheduler: RefCell::new(None),
            }),
        }
    }

    pub fn attach(&self, scheduler: Scheduler) {
        *self.inner.scheduler.borrow_mut() = Some(scheduler);
    }

    pub fn status(&self) -> AuthStatus {
        self.inner.status.get()
    }

    pub fn is_authenticated(&self) -> bool {
        self.status() == AuthStatus::Authenticated
    }

    /// Signs in; `done` runs after the transition lands, typically to
    /// navigate back to the originally requested path.
    pub fn authenticate(&self, done: impl FnOnce() + 'static) {
        self.transition(AuthStatus::Authenticated, done);
    }

    pub fn sign_out(&self, done: impl FnOnce() + 'static) {
        self.transition(AuthStatus::Anonymous, done);
    }

    fn transition(&self, to: AuthStatus, done: impl FnOnce() + 'static) {
        let inner = self.inner.clone();
        let apply = move || {
            inner.status.set(to);
            if let Some(scheduler) = inner.scheduler.borrow().as_ref() {
                scheduler.mark_root();
            }
            done();
        };
        let scheduler = self.inner.scheduler.borrow().clone();
        match scheduler {
            Some(s) => s.defer(apply),
            None => {
                log::warn!("auth transition with no scheduler attached; applying inline");
                apply();
            }
        }
    }
}
