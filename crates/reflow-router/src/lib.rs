//! # Path routing
//!
//! Declarative routing over `reflow-core` trees: a [`Router`] provides a
//! shared [`History`] and [`AuthStore`] to its subtree, and [`Routes`]
//! tables match the current path against patterns with `:named` segments.
//! Prefix routes re-scope nested tables to the unmatched suffix.
//!
//! ```rust
//! use reflow_core::*;
//! use reflow_dom::{App, MAIN_TARGET, MemoryDom};
//! use reflow_router::{AuthStore, History, Router, Routes};
//!
//! let history = History::new("/topics/42");
//! let app_history = history.clone();
//! let mut app = App::mount(MemoryDom::new(), move || {
//!     Router(app_history.clone(), AuthStore::new(), || {
//!         Routes::new()
//!             .exact("/", |_| text("home"))
//!             .exact("/topics/:topicId", |m| {
//!                 text(format!("topic {}", m.param("topicId").unwrap_or("?")))
//!             })
//!             .into()
//!     })
//! })
//! .expect("mount");
//! assert_eq!(app.host().html(MAIN_TARGET), "topic 42");
//! ```

#![allow(non_snake_case)]

use std::rc::Rc;

use reflow_core::{Cleanup, VNode, component, el, provide, text, use_context, use_effect, use_scheduler};

pub mod auth;
pub mod history;
pub mod pattern;
pub mod tests;

pub use auth::{AuthStatus, AuthStore};
pub use history::{History, Location};
pub use pattern::{Pattern, PatternError, RouteMatch};

/// The slice of the current path a [`Routes`] table sees: `base` was
/// consumed by enclosing prefix routes, `rest` is what remains to match.
#[derive(Debug, Clone)]
pub struct MatchScope {
    pub base: String,
    pub rest: String,
}

/// Root of a routed tree. Attaches the history and auth store to the
/// scheduler, provides both as context, and scopes matching to the current
/// path. `body` builds the routed subtree; it re-runs on every navigation.
pub fn Router(history: History, auth: AuthStore, body: impl Fn() -> VNode + 'static) -> VNode {
    component("Router", (), move |_props: &()| {
        let scheduler = use_scheduler();
        history.attach(scheduler.clone());
        auth.attach(scheduler);
        let scope = MatchScope {
            base: String::new(),
            rest: history.path(),
        };
        provide(
            history.clone(),
            provide(auth.clone(), provide(scope, body())),
        )
    })
}

enum RouteKind {
    Exact,
    Prefix,
}

struct RouteEntry {
    pattern: String,
    kind: RouteKind,
    render: Rc<dyn Fn(&RouteMatch) -> VNode>,
}

/// An ordered route table. Entries are tried in declaration order and the
/// first match renders; on a miss the `not_found` fallback (or nothing)
/// renders. Matching never panics.
#[derive(Default)]
pub struct Routes {
    entries: Vec<RouteEntry>,
    not_found: Option<Rc<dyn Fn() -> VNode>>,
}

impl Routes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route that must consume the whole remaining path.
    pub fn exact(
        mut self,
        pattern: impl Into<String>,
        render: impl Fn(&RouteMatch) -> VNode + 'static,
    ) -> Self {
        self.entries.push(RouteEntry {
            pattern: pattern.into(),
            kind: RouteKind::Exact,
            render: Rc::new(render),
        });
        self
    }

    /// Route that may leave a suffix; a nested [`Routes`] inside it matches
    /// against that suffix.
    pub fn prefix(
        mut self,
        pattern: impl Into<String>,
        render: impl Fn(&RouteMatch) -> VNode + 'static,
    ) -> Self {
        self.entries.push(RouteEntry {
            pattern: pattern.into(),
            kind: RouteKind::Prefix,
            render: Rc::new(render),
        });
        self
    }

    pub fn not_found(mut self, render: impl Fn() -> VNode + 'static) -> Self {
        self.not_found = Some(Rc::new(render));
        self
    }

    /// Builds the matching component. Unparsable patterns are logged and
    /// skipped, never fatal.
    pub fn into_vnode(self) -> VNode {
        let mut table = Vec::new();
        for entry in self.entries {
            match Pattern::parse(&entry.pattern) {
                Ok(pattern) => table.push((pattern, entry.kind, entry.render)),
                Err(e) => log::warn!("skipping route: {e}"),
            }
        }
        let table = Rc::new(table);
        let not_found = self.not_found;
        component("Routes", (), move |_props: &()| {
            let scope = match use_context::<MatchScope>() {
                Some(s) => (*s).clone(),
                None => {
                    log::warn!("Routes rendered outside a Router; matching against `/`");
                    MatchScope {
                        base: String::new(),
                        rest: "/".into(),
                    }
                }
            };
            for (pattern, kind, render) in table.iter() {
                let exact = matches!(kind, RouteKind::Exact);
                if let Some(m) = pattern.match_path(&scope.rest, exact) {
                    let body = render(&m);
                    return match kind {
                        RouteKind::Exact => body,
                        RouteKind::Prefix => {
                            let narrowed = MatchScope {
                                base: join_paths(&scope.base, &m.matched),
                                rest: m.rest.clone(),
                            };
                            provide(narrowed, body)
                        }
                    };
                }
            }
            match &not_found {
                Some(render) => render(),
                None => VNode::Nothing,
            }
        })
    }
}

impl From<Routes> for VNode {
    fn from(routes: Routes) -> Self {
        routes.into_vnode()
    }
}

fn join_paths(base: &str, matched: &str) -> String {
    if matched == "/" {
        base.to_string()
    } else {
        format!("{base}{matched}")
    }
}

/// Anchor element that pushes onto the history instead of leaving the app.
pub fn Link(to: impl Into<String>, label: impl Into<String>) -> VNode {
    component(
        "Link",
        (to.into(), label.into()),
        |props: &(String, String)| {
            let history = use_context::<History>();
            let target = props.0.clone();
            el("a")
                .attr("href", props.0.clone())
                .on("click", move || match &history {
                    Some(h) => h.push(target.clone()),
                    None => log::warn!("Link clicked outside a Router; ignoring"),
                })
                .child(text(props.1.clone()))
                .into()
        },
    )
}

/// Replaces the current location after commit; renders nothing in place.
/// Using `replace` keeps the abandoned location off the back stack.
pub fn Redirect(to: impl Into<String>) -> VNode {
    RedirectWithState(to, None)
}

pub fn RedirectWithState(to: impl Into<String>, state: Option<String>) -> VNode {
    component(
        "Redirect",
        (to.into(), state),
        |props: &(String, Option<String>)| {
            let history = use_context::<History>();
            let (to, state) = props.clone();
            use_effect(props.clone(), move || {
                match &history {
                    Some(h) => h.replace_with_state(to, state),
                    None => log::warn!("Redirect outside a Router; ignoring"),
                }
                Cleanup::none()
            });
            VNode::Nothing
        },
    )
}

/// Gates a subtree on authorization. Anonymous visitors are redirected to
/// the login path with the requested path preserved in location state, so
/// a successful sign-in can return them to it.
pub fn Protected(login_path: impl Into<String>, render: impl Fn() -> VNode + 'static) -> VNode {
    component("Protected", login_path.into(), move |login: &String| {
        let authed = use_context::<AuthStore>()
            .as_ref()
            .is_some_and(|a| a.is_authenticated());
        if authed {
            render()
        } else {
            let from = use_context::<History>().map(|h| h.path());
            RedirectWithState(login.clone(), from)
        }
    })
}
