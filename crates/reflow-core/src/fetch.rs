//! Asynchronous network collaborator.
//!
//! A [`Transport`] resolves `request(url)` through the scheduler's deferred
//! task queue and hands back JSON or a [`FetchError`]. `use_request` wires
//! that into component state: failures become a state variant, never a
//! panic, and completions arriving after unmount are dropped by the setter.

use std::rc::Rc;

use serde_json::Value;
use thiserror::Error;

use crate::context::use_context;
use crate::effects::{Cleanup, use_effect};
use crate::hooks::use_state;

#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("network unreachable: {0}")]
    Unreachable(String),
    #[error("http status {0}")]
    Status(u16),
    #[error("invalid body: {0}")]
    Body(String),
}

pub type FetchResult = Result<Value, FetchError>;

pub trait Transport {
    /// Starts an asynchronous request; `done` fires on a later turn.
    fn request(&self, url: &str, done: Box<dyn FnOnce(FetchResult)>);
}

/// Context handle carrying the transport, provided near the root.
#[derive(Clone)]
pub struct TransportHandle(pub Rc<dyn Transport>);

#[derive(Clone, Debug, PartialEq)]
pub enum RequestState {
    Pending,
    Ready(Value),
    Failed(String),
}

/// Requests `url` on mount and whenever `url` changes, surfacing the
/// outcome as state.
pub fn use_request(url: &str) -> RequestState {
    let (state, set) = use_state(|| RequestState::Pending);
    let transport = use_context::<TransportHandle>();
    let url = url.to_string();
    use_effect(url.clone(), move || {
        let Some(transport) = transport else {
            log::warn!("use_request: no transport in context");
            set.set(RequestState::Failed("no transport".into()));
            return Cleanup::none();
        };
        set.set(RequestState::Pending);
        let done = set.clone();
        transport.0.request(
            &url,
            Box::new(move |result| match result {
                Ok(value) => done.set(RequestState::Ready(value)),
                Err(err) => done.set(RequestState::Failed(err.to_string())),
            }),
        );
        Cleanup::none()
    });
    state
}
