//! Dynamically scoped context locals.
//!
//! A `Provider` node makes a value visible to every component that renders
//! while its subtree expands; `use_context` reads the nearest one. Values
//! are keyed by type, so one provider per type per scope.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::view::VNode;

thread_local! {
    static CONTEXT_STACK: RefCell<Vec<HashMap<TypeId, Rc<dyn Any>>>> =
        RefCell::new(Vec::new());
}

#[derive(Clone)]
pub struct ContextValue {
    pub(crate) type_id: TypeId,
    pub(crate) value: Rc<dyn Any>,
}

/// Wraps `child` so the subtree sees `value` via [`use_context`].
pub fn provide<T: 'static>(value: T, child: impl Into<VNode>) -> VNode {
    VNode::Provider {
        value: ContextValue {
            type_id: TypeId::of::<T>(),
            value: Rc::new(value),
        },
        child: Box::new(child.into()),
    }
}

/// Reads the nearest provided value of type `T`, if any. Only meaningful
/// during a render pass.
pub fn use_context<T: 'static>() -> Option<Rc<T>> {
    CONTEXT_STACK.with(|st| {
        for frame in st.borrow().iter().rev() {
            if let Some(v) = frame.get(&TypeId::of::<T>())
                && let Ok(t) = v.clone().downcast::<T>()
            {
                return Some(t);
            }
        }
        None
    })
}

/// Runs `f` with `value` pushed on the context stack. The frame is popped
/// even if `f` unwinds, so a panicking subtree cannot leak scope.
pub(crate) fn with_frame<R>(value: &ContextValue, f: impl FnOnce() -> R) -> R {
    struct Guard;
    impl Drop for Guard {
        fn drop(&mut self) {
            CONTEXT_STACK.with(|st| {
                st.borrow_mut().pop();
            });
        }
    }

    CONTEXT_STACK.with(|st| {
        let mut frame = HashMap::new();
        frame.insert(value.type_id, value.value.clone());
        st.borrow_mut().push(frame);
    });
    let _guard = Guard;
    f()
}
