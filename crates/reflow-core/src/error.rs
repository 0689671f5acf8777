//! Render-time error containment.

use std::any::Any;
use std::rc::Rc;

use thiserror::Error;

use crate::view::VNode;

/// What an error boundary caught: the panic message and the component the
/// boundary wraps.
#[derive(Debug, Clone, Error)]
#[error("render failed under `{component}`: {message}")]
pub struct CaughtError {
    pub component: String,
    pub message: String,
}

/// Wraps `child` in an error boundary. A panic while the subtree renders is
/// contained here: the failed subtree is discarded (its instances unmount)
/// and `fallback` renders in its place. Sibling state is untouched.
pub fn boundary(fallback: impl Fn(&CaughtError) -> VNode + 'static, child: impl Into<VNode>) -> VNode {
    VNode::Boundary {
        fallback: Rc::new(fallback),
        child: Box::new(child.into()),
    }
}

pub(crate) fn panic_message(err: &Box<dyn Any + Send>) -> String {
    if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic".to_string()
    }
}
