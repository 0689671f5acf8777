//! # Rendering to an output medium
//!
//! `reflow-dom` turns the realized trees produced by `reflow-core` into
//! mutations of a [`Host`]: diff the previous tree against the new one,
//! apply the patch list, then run queued effects. [`MemoryDom`] is the
//! built-in host, good for tests, demos, and headless rendering.
//!
//! ```rust
//! use reflow_core::*;
//! use reflow_dom::{App, MAIN_TARGET, MemoryDom};
//!
//! fn app() -> VNode {
//!     component("Hello", (), |_props: &()| {
//!         el("h1").child(text("Hello, Reflow!")).into()
//!     })
//! }
//!
//! let mut app = App::mount(MemoryDom::new(), app).expect("mount");
//! assert_eq!(app.host().html(MAIN_TARGET), "<h1>Hello, Reflow!</h1>");
//! ```

pub mod app;
pub mod diff;
pub mod host;
pub mod memory;
pub mod tests;

pub use app::{App, MAIN_TARGET};
pub use diff::{Patch, apply, diff, materialize};
pub use host::{Host, HostError};
pub use memory::MemoryDom;
