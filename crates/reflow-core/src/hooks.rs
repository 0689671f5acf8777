//! State, ref, memo and callback hooks.
//!
//! All hooks are order-based: call them unconditionally at the top of the
//! component body. A slot whose shape changes between renders is
//! reinitialized with a warning rather than panicking.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::instance::{Hook, with_current};
use crate::scheduler::{InstanceKey, Scheduler};
use crate::view::{Handler, NodeRef};

/// Setter half of [`use_state`]. Writing schedules a re-render of the
/// owning instance; writes within one synchronous turn coalesce. A setter
/// held past unmount (late timer or network completion) drops the write.
pub struct SetState<T> {
    cell: Rc<RefCell<T>>,
    key: InstanceKey,
    alive: Rc<Cell<bool>>,
    scheduler: Scheduler,
}

impl<T> Clone for SetState<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
            key: self.key,
            alive: self.alive.clone(),
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<T: 'static> SetState<T> {
    pub fn set(&self, value: T) {
        self.update(|slot| *slot = value);
    }

    pub fn update(&self, f: impl FnOnce(&mut T)) {
        if !self.alive.get() {
            log::trace!("set_state on an unmounted instance; dropping the write");
            return;
        }
        f(&mut self.cell.borrow_mut());
        self.scheduler.mark(self.key);
    }
}

pub fn use_state<T: Clone + 'static>(init: impl FnOnce() -> T) -> (T, SetState<T>) {
    with_current("use_state", |frame| {
        let idx = frame.next_slot();
        let cell = {
            let mut hooks = frame.hooks.borrow_mut();
            let existing = hooks.get(idx).and_then(|h| match h {
                Hook::State(any) => any.clone().downcast::<RefCell<T>>().ok(),
                _ => None,
            });
            match existing {
                Some(rc) => rc,
                None => {
                    if idx < hooks.len() {
                        log::warn!("use_state: hook slot {idx} changed shape; reinitializing");
                    }
                    let rc = Rc::new(RefCell::new(init()));
                    let slot = Hook::State(rc.clone() as Rc<dyn Any>);
                    if idx < hooks.len() {
                        hooks[idx] = slot;
                    } else {
                        hooks.push(slot);
                    }
                    rc
                }
            }
        };
        let value = cell.borrow().clone();
        let setter = SetState {
            cell,
            key: frame.key,
            alive: frame.alive.clone(),
            scheduler: frame.scheduler.clone(),
        };
        (value, setter)
    })
}

/// Reducer convention over the same state slot: `(state, dispatch)`.
/// `dispatch` keeps referential identity across renders.
pub fn use_reducer<S, A>(
    reduce: impl Fn(&S, A) -> S + 'static,
    init: impl FnOnce() -> S,
) -> (S, Dispatch<A>)
where
    S: Clone + 'static,
    A: 'static,
{
    let (state, set) = use_state(init);
    let dispatch = use_memo((), move || {
        let set = set.clone();
        Rc::new(move |action: A| {
            set.update(|s| *s = reduce(s, action));
        }) as Rc<dyn Fn(A)>
    });
    (state, Dispatch((*dispatch).clone()))
}

pub struct Dispatch<A>(Rc<dyn Fn(A)>);

impl<A> Clone for Dispatch<A> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<A> Dispatch<A> {
    pub fn send(&self, action: A) {
        (self.0)(action);
    }
}

/// Mutable storage that survives renders without scheduling them.
pub fn use_ref<T: 'static>(init: impl FnOnce() -> T) -> Rc<RefCell<T>> {
    with_current("use_ref", |frame| {
        let idx = frame.next_slot();
        let mut hooks = frame.hooks.borrow_mut();
        let existing = hooks.get(idx).and_then(|h| match h {
            Hook::Ref(any) => any.clone().downcast::<RefCell<T>>().ok(),
            _ => None,
        });
        match existing {
            Some(rc) => rc,
            None => {
                if idx < hooks.len() {
                    log::warn!("use_ref: hook slot {idx} changed shape; reinitializing");
                }
                let rc = Rc::new(RefCell::new(init()));
                let slot = Hook::Ref(rc.clone() as Rc<dyn Any>);
                if idx < hooks.len() {
                    hooks[idx] = slot;
                } else {
                    hooks.push(slot);
                }
                rc
            }
        }
    })
}

/// Ref flavor that the commit phase fills with the host node of the element
/// it is attached to.
pub fn use_node_ref() -> NodeRef {
    let slot = use_ref(NodeRef::new);
    let r = slot.borrow().clone();
    r
}

/// Recomputes only when `deps` changed since the previous render; the
/// returned `Rc` is pointer-stable otherwise.
pub fn use_memo<D, T>(deps: D, compute: impl FnOnce() -> T) -> Rc<T>
where
    D: PartialEq + 'static,
    T: 'static,
{
    with_current("use_memo", |frame| {
        let idx = frame.next_slot();
        let cached = {
            let hooks = frame.hooks.borrow();
            match hooks.get(idx) {
                Some(Hook::Memo { deps: old, value }) => old
                    .downcast_ref::<D>()
                    .is_some_and(|o| *o == deps)
                    .then(|| value.clone().downcast::<T>().ok())
                    .flatten(),
                Some(_) => {
                    log::warn!("use_memo: hook slot {idx} changed shape; recomputing");
                    None
                }
                None => None,
            }
        };
        match cached {
            Some(value) => value,
            None => {
                let value = Rc::new(compute());
                let mut hooks = frame.hooks.borrow_mut();
                let slot = Hook::Memo {
                    deps: Box::new(deps),
                    value: value.clone() as Rc<dyn Any>,
                };
                if idx < hooks.len() {
                    hooks[idx] = slot;
                } else {
                    hooks.push(slot);
                }
                value
            }
        }
    })
}

/// Memoized zero-argument callback: same `Rc` across renders while `deps`
/// are unchanged, so `memo` children comparing handler props can skip.
pub fn use_callback<D: PartialEq + 'static>(deps: D, f: impl Fn() + 'static) -> Handler {
    let cell = use_memo(deps, move || Rc::new(f) as Handler);
    (*cell).clone()
}

/// Handle to the scheduler driving this tree, for deferring work (timers,
/// completions) from effects.
pub fn use_scheduler() -> Scheduler {
    with_current("use_scheduler", |frame| frame.scheduler.clone())
}
