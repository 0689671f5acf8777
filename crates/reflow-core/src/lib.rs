//! # Components, Hooks, and Effects
//!
//! Reflow renders a tree of declarative view nodes produced from local
//! state, and re-renders on state change. Three pieces matter:
//!
//! - [`VNode`] — the immutable view tree a component body returns.
//! - hooks (`use_state`, `use_effect`, `use_memo`, ...) — order-based slots
//!   bound to the component instance.
//! - the [`Runtime`] + [`Scheduler`] pair — expands components into a
//!   realized tree and coalesces state writes into single render passes.
//!
//! ## Components
//!
//! A component is a plain function over its props, wrapped by
//! [`component`] so the runtime can keep its instance alive across
//! renders:
//!
//! ```rust
//! use reflow_core::*;
//!
//! fn counter() -> VNode {
//!     component("Counter", (), |_props: &()| {
//!         let (count, set_count) = use_state(|| 0);
//!         el("button")
//!             .on("click", move || set_count.update(|c| *c += 1))
//!             .child(text(format!("Count = {count}")))
//!             .into()
//!     })
//! }
//! ```
//!
//! Setters batch: any number of writes within one synchronous turn produce
//! exactly one re-render, reflecting the final state.
//!
//! ## Effects
//!
//! [`use_effect`] runs after commit when its deps changed, and tears down
//! through the returned [`Cleanup`] before each re-run and on unmount:
//!
//! ```rust
//! use reflow_core::*;
//!
//! fn ticker() -> VNode {
//!     component("Ticker", (), |_props: &()| {
//!         let (count, _set) = use_state(|| 0u32);
//!         use_effect(count, move || {
//!             // start a timer keyed on `count`...
//!             Cleanup::new(|| { /* ...and cancel it here */ })
//!         });
//!         text(format!("{count}"))
//!     })
//! }
//! ```
//!
//! ## Containment
//!
//! A component that panics while rendering is caught by the nearest
//! [`boundary`] ancestor, which discards the failed subtree and renders a
//! fallback; siblings keep their state. Network results arrive as state
//! (see [`use_request`]), never as panics.

pub mod context;
pub mod effects;
pub mod error;
pub mod fetch;
pub mod hooks;
mod instance;
pub mod runtime;
pub mod scheduler;
pub mod stateful;
pub mod view;

pub use context::*;
pub use effects::*;
pub use error::*;
pub use fetch::*;
pub use hooks::*;
pub use runtime::*;
pub use scheduler::*;
pub use stateful::*;
pub use view::*;
