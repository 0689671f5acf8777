//! Deferred side-effects with cleanup.
//!
//! `use_effect` queues its action during render; the driver runs queued
//! actions after commit. Each action's cleanup runs before the next action
//! for the same slot and on unmount.

use std::any::Any;

use crate::instance::{EffectSlot, Hook, with_current};

/// A cleanup action. Runs at most once.
#[derive(Default)]
pub struct Cleanup(Option<Box<dyn FnOnce()>>);

impl Cleanup {
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Self(Some(Box::new(f)))
    }

    /// An effect with nothing to tear down.
    pub fn none() -> Self {
        Self::default()
    }

    pub(crate) fn run(mut self) {
        if let Some(f) = self.0.take() {
            f();
        }
    }
}

/// Registers a post-commit effect. `action` runs after the commit in which
/// `deps` changed (always on mount); the returned [`Cleanup`] runs before
/// the next invocation and on unmount.
pub fn use_effect<D: PartialEq + 'static>(deps: D, action: impl FnOnce() -> Cleanup + 'static) {
    with_current("use_effect", |frame| {
        let idx = frame.next_slot();
        let changed = {
            let mut hooks = frame.hooks.borrow_mut();
            match hooks.get_mut(idx) {
                Some(Hook::Effect(slot)) => {
                    let same = slot
                        .deps
                        .as_ref()
                        .and_then(|d| d.downcast_ref::<D>())
                        .is_some_and(|old| *old == deps);
                    if !same {
                        slot.deps = Some(Box::new(deps) as Box<dyn Any>);
                    }
                    !same
                }
                Some(_) => {
                    log::warn!("use_effect: hook slot {idx} changed shape; reinitializing");
                    hooks[idx] = Hook::Effect(EffectSlot::new(Box::new(deps)));
                    true
                }
                None => {
                    hooks.push(Hook::Effect(EffectSlot::new(Box::new(deps))));
                    true
                }
            }
        };
        if changed {
            let mut hooks = frame.hooks.borrow_mut();
            if let Some(Hook::Effect(slot)) = hooks.get_mut(idx) {
                slot.pending = Some(Box::new(action));
            }
            drop(hooks);
            frame.queue_effect(idx);
        }
    })
}

/// Effect that runs once on mount; its cleanup runs on unmount.
pub fn use_mount(action: impl FnOnce() -> Cleanup + 'static) {
    use_effect((), action);
}
