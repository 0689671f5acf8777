//! Single-threaded cooperative scheduler.
//!
//! Setters mark their instance dirty; external collaborators (history,
//! stores) invalidate the whole root. Nothing re-renders until the driver
//! flushes, so any number of state writes within one synchronous turn
//! coalesce into a single render pass. Deferred tasks model everything
//! asynchronous: timers, network completions, auth callbacks.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use slotmap::new_key_type;

new_key_type! {
    pub struct InstanceKey;
}

pub type Task = Box<dyn FnOnce()>;

#[derive(Default)]
struct SchedulerState {
    dirty: RefCell<Vec<InstanceKey>>,
    root_dirty: Cell<bool>,
    tasks: RefCell<VecDeque<Task>>,
}

#[derive(Clone, Default)]
pub struct Scheduler(Rc<SchedulerState>);

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&self, key: InstanceKey) {
        let mut dirty = self.0.dirty.borrow_mut();
        if !dirty.contains(&key) {
            dirty.push(key);
        }
    }

    /// Invalidates the whole tree (navigation, store transitions).
    pub fn mark_root(&self) {
        self.0.root_dirty.set(true);
    }

    pub fn needs_render(&self) -> bool {
        self.0.root_dirty.get() || !self.0.dirty.borrow().is_empty()
    }

    /// Takes the dirty set for one render pass and clears it.
    pub(crate) fn take_dirty(&self) -> Vec<InstanceKey> {
        self.0.root_dirty.set(false);
        std::mem::take(&mut *self.0.dirty.borrow_mut())
    }

    /// Queues a deferred task: runs when the driver pumps the queue, never
    /// inline.
    pub fn defer(&self, task: impl FnOnce() + 'static) {
        self.0.tasks.borrow_mut().push_back(Box::new(task));
    }

    /// Runs the tasks queued so far (not ones they enqueue) and returns how
    /// many ran.
    pub fn run_tasks(&self) -> usize {
        let batch: Vec<Task> = self.0.tasks.borrow_mut().drain(..).collect();
        let n = batch.len();
        for task in batch {
            task();
        }
        n
    }

    pub fn has_tasks(&self) -> bool {
        !self.0.tasks.borrow().is_empty()
    }
}
