//! Live component instances and their hook slots.

use std::any::{Any, TypeId};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::effects::Cleanup;
use crate::scheduler::{InstanceKey, Scheduler};
use crate::view::RNode;

/// One hook slot. Slots are order-based within an instance: the Nth hook
/// call in a render always refers to the Nth slot.
pub(crate) enum Hook {
    /// `Rc<RefCell<T>>` behind `dyn Any`.
    State(Rc<dyn Any>),
    Ref(Rc<dyn Any>),
    Memo {
        deps: Box<dyn Any>,
        value: Rc<dyn Any>,
    },
    Effect(EffectSlot),
}

pub(crate) struct EffectSlot {
    pub deps: Option<Box<dyn Any>>,
    pub cleanup: Option<Cleanup>,
    /// Action queued this render; drained after commit.
    pub pending: Option<Box<dyn FnOnce() -> Cleanup>>,
}

impl EffectSlot {
    pub fn new(deps: Box<dyn Any>) -> Self {
        Self {
            deps: Some(deps),
            cleanup: None,
            pending: None,
        }
    }
}

/// A live occurrence of a component in the current tree.
pub(crate) struct Instance {
    pub type_id: TypeId,
    pub name: &'static str,
    pub path: String,
    pub hooks: Rc<RefCell<Vec<Hook>>>,
    /// Cleared on unmount; setters observing `false` drop their write.
    pub alive: Rc<Cell<bool>>,
    pub prev_props: Option<Rc<dyn Any>>,
    /// Realized subtree plus portal contributions, kept only for
    /// `memo`-wrapped components so an unchanged subtree can be reused.
    pub cached: Option<(RNode, Vec<(String, RNode)>)>,
}

impl Instance {
    pub fn new(type_id: TypeId, name: &'static str, path: String) -> Self {
        Self {
            type_id,
            name,
            path,
            hooks: Rc::new(RefCell::new(Vec::new())),
            alive: Rc::new(Cell::new(true)),
            prev_props: None,
            cached: None,
        }
    }

    /// Runs effect cleanups in reverse slot order and marks the instance
    /// dead so outstanding setters become no-ops.
    pub fn unmount(&self) {
        self.alive.set(false);
        let hooks = std::mem::take(&mut *self.hooks.borrow_mut());
        for hook in hooks.into_iter().rev() {
            if let Hook::Effect(mut slot) = hook
                && let Some(cleanup) = slot.cleanup.take()
            {
                cleanup.run();
            }
        }
    }
}

/// Render-time frame for the component currently executing its body.
/// Hooks resolve against the top frame.
pub(crate) struct Frame {
    pub key: InstanceKey,
    pub hooks: Rc<RefCell<Vec<Hook>>>,
    pub alive: Rc<Cell<bool>>,
    pub scheduler: Scheduler,
    pub pending_effects: Rc<RefCell<Vec<(InstanceKey, usize)>>>,
    cursor: Cell<usize>,
}

impl Frame {
    pub fn new(
        key: InstanceKey,
        hooks: Rc<RefCell<Vec<Hook>>>,
        alive: Rc<Cell<bool>>,
        scheduler: Scheduler,
        pending_effects: Rc<RefCell<Vec<(InstanceKey, usize)>>>,
    ) -> Self {
        Self {
            key,
            hooks,
            alive,
            scheduler,
            pending_effects,
            cursor: Cell::new(0),
        }
    }

    pub fn next_slot(&self) -> usize {
        let i = self.cursor.get();
        self.cursor.set(i + 1);
        i
    }

    pub fn queue_effect(&self, slot: usize) {
        self.pending_effects.borrow_mut().push((self.key, slot));
    }
}

thread_local! {
    static FRAMES: RefCell<Vec<Rc<Frame>>> = const { RefCell::new(Vec::new()) };
}

/// Pops its frame on drop, so a panicking render body cannot leave the
/// stack misaligned.
pub(crate) struct FrameGuard;

impl Drop for FrameGuard {
    fn drop(&mut self) {
        FRAMES.with(|st| {
            st.borrow_mut().pop();
        });
    }
}

pub(crate) fn push_frame(frame: Frame) -> FrameGuard {
    FRAMES.with(|st| st.borrow_mut().push(Rc::new(frame)));
    FrameGuard
}

pub(crate) fn with_current<R>(hook: &str, f: impl FnOnce(&Frame) -> R) -> R {
    FRAMES.with(|st| {
        let top = st.borrow().last().cloned();
        match top {
            Some(frame) => f(&frame),
            None => panic!("{hook} called outside of a component render"),
        }
    })
}
