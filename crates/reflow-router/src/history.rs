//! The navigable location stack.

use std::cell::RefCell;
use std::rc::Rc;

use reflow_core::Scheduler;
use serde::{Deserialize, Serialize};

/// One entry in the history stack. `state` is opaque navigation state, e.g.
/// the path to return to after login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl Location {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            state: None,
        }
    }
}

struct HistoryState {
    stack: Vec<Location>,
    scheduler: Option<Scheduler>,
}

/// Cloneable handle to the navigation stack; all clones share it. Every
/// navigation invalidates the whole tree on the attached scheduler, so the
/// router re-matches on the next flush.
#[derive(Clone)]
pub struct History {
    inner: Rc<RefCell<HistoryState>>,
}

impl History {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(HistoryState {
                stack: vec![Location::new(initial)],
                scheduler: None,
            })),
        }
    }

    pub fn attach(&self, scheduler: Scheduler) {
        self.inner.borrow_mut().scheduler = Some(scheduler);
    }

    fn bump(&self) {
        if let Some(scheduler) = &self.inner.borrow().scheduler {
            scheduler.mark_root();
        }
    }

    pub fn location(&self) -> Location {
        self.inner
            .borrow()
            .stack
            .last()
            .cloned()
            .unwrap_or_else(|| Location::new("/"))
    }

    pub fn path(&self) -> String {
        self.location().path
    }

    pub fn push(&self, path: impl Into<String>) {
        self.push_with_state(path, None);
    }

    pub fn push_with_state(&self, path: impl Into<String>, state: Option<String>) {
        self.inner.borrow_mut().stack.push(Location {
            path: path.into(),
            state,
        });
        self.bump();
    }

    /// Swaps the top entry without growing the stack, so `back` skips the
    /// replaced location.
    pub fn replace(&self, path: impl Into<String>) {
        self.replace_with_state(path, None);
    }

    pub fn replace_with_state(&self, path: impl Into<String>, state: Option<String>) {
        {
            let mut s = self.inner.borrow_mut();
            let location = Location {
                path: path.into(),
                state,
            };
            match s.stack.last_mut() {
                Some(top) => *top = location,
                None => s.stack.push(location),
            }
        }
        self.bump();
    }

    /// Pops to the previous location. The first entry stays; returns whether
    /// anything was popped.
    pub fn back(&self) -> bool {
        let popped = {
            let mut s = self.inner.borrow_mut();
            if s.stack.len() <= 1 {
                false
            } else {
                s.stack.pop();
                true
            }
        };
        if popped {
            self.bump();
        }
        popped
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().stack.is_empty()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.inner.borrow().stack).unwrap_or_else(|_| "[]".into())
    }

    /// Restores a persisted stack. An empty or malformed snapshot keeps the
    /// current one.
    pub fn from_json(&self, json: &str) {
        match serde_json::from_str::<Vec<Location>>(json) {
            Ok(stack) if !stack.is_empty() => {
                self.inner.borrow_mut().stack = stack;
                self.bump();
            }
            Ok(_) => log::warn!("from_json: empty stack; keeping current history"),
            Err(e) => log::warn!("from_json: {e}; keeping current history"),
        }
    }
}
