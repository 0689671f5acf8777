//! A headless tour of the framework: counter hooks, a canned remote API,
//! routing with a protected area, and a portal off to the side.
//!
//! Run with `RUST_LOG=debug cargo run -p reflow-tour` to watch the
//! runtime's own logging alongside the rendered output.

#![allow(non_snake_case)]

use std::cell::RefCell;
use std::rc::Rc;

use reflow_core::{
    FetchError, FetchResult, RequestState, Scheduler, Transport, TransportHandle, VNode,
    component, el, portal, provide, text, use_context, use_request, use_state,
};
use reflow_dom::{App, HostError, MAIN_TARGET, MemoryDom};
use reflow_router::{AuthStore, History, Link, Protected, Router, Routes};
use serde_json::json;

/// Serves canned JSON on a later turn, the way a remote API would.
#[derive(Default)]
struct CannedApi {
    scheduler: RefCell<Option<Scheduler>>,
}

impl CannedApi {
    fn attach(&self, scheduler: Scheduler) {
        *self.scheduler.borrow_mut() = Some(scheduler);
    }
}

impl Transport for CannedApi {
    fn request(&self, url: &str, done: Box<dyn FnOnce(FetchResult)>) {
        let Some(scheduler) = self.scheduler.borrow().clone() else {
            done(Err(FetchError::Unreachable("api not attached".into())));
            return;
        };
        let url = url.to_string();
        scheduler.defer(move || {
            done(match url.as_str() {
                "/api/topics" => Ok(json!(["components", "state and props", "rendering lists"])),
                _ => Err(FetchError::Status(404)),
            })
        });
    }
}

fn Counter() -> VNode {
    component("Counter", (), |_props: &()| {
        let (count, set) = use_state(|| 0);
        el("p")
            .child(
                el("button")
                    .attr("id", "inc")
                    .on("click", move || set.update(|c| *c += 1))
                    .child(text("+1")),
            )
            .child(text(format!(" clicked {count} times")))
            .into()
    })
}

fn Home() -> VNode {
    component("Home", (), |_props: &()| {
        el("div")
            .child(el("h1").child(text("Welcome")))
            .child(Counter())
            .child(
                el("nav")
                    .child(Link("/topics", "topics"))
                    .child(Link("/account", "account")),
            )
            .child(portal("toast", el("em").child(text("rendered off to the side"))))
            .into()
    })
}

fn TopicList() -> VNode {
    component("TopicList", (), |_props: &()| match use_request("/api/topics") {
        RequestState::Pending => text("loading topics..."),
        RequestState::Ready(value) => {
            let items: Vec<VNode> = value
                .as_array()
                .map(|topics| {
                    topics
                        .iter()
                        .map(|t| el("li").child(text(t.as_str().unwrap_or("?"))).into())
                        .collect()
                })
                .unwrap_or_default();
            el("ul").children(items).into()
        }
        RequestState::Failed(err) => text(format!("failed: {err}")),
    })
}

fn LoginPage() -> VNode {
    component("LoginPage", (), |_props: &()| {
        let history = use_context::<History>();
        let auth = use_context::<AuthStore>();
        let from = history
            .as_ref()
            .and_then(|h| h.location().state.clone())
            .unwrap_or_else(|| "/".to_string());
        el("div")
            .child(text(format!("sign in to continue to {from} ")))
            .child(
                el("button")
                    .attr("id", "signin")
                    .on("click", move || {
                        if let (Some(auth), Some(history)) = (&auth, &history) {
                            let history = history.clone();
                            let from = from.clone();
                            auth.authenticate(move || history.push(from));
                        }
                    })
                    .child(text("sign in")),
            )
            .into()
    })
}

fn AccountPage() -> VNode {
    component("AccountPage", (), |_props: &()| {
        let auth = use_context::<AuthStore>();
        el("div")
            .child(text("your account "))
            .child(
                el("button")
                    .attr("id", "signout")
                    .on("click", move || {
                        if let Some(auth) = &auth {
                            auth.sign_out(|| {});
                        }
                    })
                    .child(text("sign out")),
            )
            .into()
    })
}

fn pages() -> VNode {
    Routes::new()
        .exact("/", |_| Home())
        .exact("/topics", |_| TopicList())
        .exact("/login", |_| LoginPage())
        .exact("/account", |_| Protected("/login", AccountPage))
        .not_found(|| text("404"))
        .into()
}

fn main() -> Result<(), HostError> {
    env_logger::init();

    let history = History::new("/");
    let auth = AuthStore::new();
    let api = Rc::new(CannedApi::default());

    let (h, a) = (history.clone(), auth.clone());
    let transport = TransportHandle(api.clone());
    let mut app = App::mount(MemoryDom::new(), move || {
        provide(transport.clone(), Router(h.clone(), a.clone(), pages))
    })?;
    api.attach(app.scheduler());

    println!("home:       {}", app.host().html(MAIN_TARGET));
    println!("toast:      {}", app.host().html("toast"));

    if let Some(inc) = app.host().find_attr(MAIN_TARGET, "id", "inc") {
        app.click(inc)?;
        app.click(inc)?;
    }
    println!("counted:    {}", app.host().html(MAIN_TARGET));

    history.push("/topics");
    app.flush()?;
    println!("loading:    {}", app.host().html(MAIN_TARGET));
    app.settle()?;
    println!("topics:     {}", app.host().html(MAIN_TARGET));

    history.push("/account");
    app.flush()?;
    println!("gated:      {}", app.host().html(MAIN_TARGET));
    if let Some(signin) = app.host().find_attr(MAIN_TARGET, "id", "signin") {
        app.click(signin)?;
        app.settle()?;
    }
    println!("account:    {}", app.host().html(MAIN_TARGET));

    if let Some(signout) = app.host().find_attr(MAIN_TARGET, "id", "signout") {
        app.click(signout)?;
        app.settle()?;
    }
    println!("signed out: {}", app.host().html(MAIN_TARGET));
    println!("history:    {}", history.to_json());
    Ok(())
}
