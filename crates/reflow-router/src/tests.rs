#[cfg(test)]
mod tests {
    use reflow_core::{VNode, component, el, text, use_context};
    use reflow_dom::{App, MAIN_TARGET, MemoryDom};

    use crate::auth::AuthStore;
    use crate::history::History;
    use crate::pattern::{Pattern, PatternError};
    use crate::{Link, Protected, Router, Routes};

    #[test]
    fn patterns_capture_named_segments() {
        let p = Pattern::parse("/topics/:topicId").expect("parse");
        let m = p.match_path("/topics/42", true).expect("match");
        assert_eq!(m.param("topicId"), Some("42"));
        assert_eq!(m.matched, "/topics/42");
        assert_eq!(m.rest, "/");

        // A param segment never matches an absent one.
        assert!(p.match_path("/topics", true).is_none());
        assert!(p.match_path("/topics", false).is_none());

        assert!(p.match_path("/topics/42/detail", true).is_none());
        let m = p.match_path("/topics/42/detail", false).expect("prefix");
        assert_eq!(m.matched, "/topics/42");
        assert_eq!(m.rest, "/detail");

        let root = Pattern::parse("/").expect("parse");
        assert!(root.match_path("/", true).is_some());
        assert!(root.match_path("/x", true).is_none());
        assert_eq!(root.match_path("/x", false).expect("prefix").rest, "/x");

        assert!(matches!(
            Pattern::parse("/a/:"),
            Err(PatternError::EmptyParam { .. })
        ));
    }

    #[test]
    fn history_round_trips_through_json_and_keeps_its_first_entry() {
        let h = History::new("/");
        h.push("/a");
        h.push_with_state("/b", Some("/a".into()));
        assert_eq!(h.path(), "/b");
        assert_eq!(h.location().state.as_deref(), Some("/a"));

        let restored = History::new("/elsewhere");
        restored.from_json(&h.to_json());
        assert_eq!(restored.len(), 3);
        assert_eq!(restored.path(), "/b");
        assert_eq!(restored.location().state.as_deref(), Some("/a"));

        assert!(restored.back());
        assert_eq!(restored.path(), "/a");
        assert!(restored.back());
        assert!(!restored.back(), "the first entry stays");
        assert_eq!(restored.path(), "/");

        restored.from_json("not json");
        assert_eq!(restored.path(), "/", "malformed snapshots are ignored");

        h.replace("/c");
        assert_eq!(h.len(), 3, "replace swaps the top without growing");
        assert_eq!(h.path(), "/c");
    }

    fn table() -> VNode {
        Routes::new()
            .exact("/bad/:", |_| text("never parses"))
            .exact("/", |_| text("home"))
            .exact("/topics/:topicId", |m| {
                text(format!("topic {}", m.param("topicId").unwrap_or("?")))
            })
            .exact("/topics/:shadowed", |_| text("unreachable"))
            .not_found(|| text("lost"))
            .into()
    }

    #[test]
    fn first_match_wins_and_a_miss_renders_the_fallback() {
        let history = History::new("/topics/42");
        let auth = AuthStore::new();
        let (h, a) = (history.clone(), auth.clone());
        let mut app = App::mount(MemoryDom::new(), move || {
            Router(h.clone(), a.clone(), table)
        })
        .expect("mount");

        assert_eq!(app.host().html(MAIN_TARGET), "topic 42");

        history.push("/");
        app.flush().expect("flush");
        assert_eq!(app.host().html(MAIN_TARGET), "home");

        history.push("/no/such/route");
        app.flush().expect("flush");
        assert_eq!(app.host().html(MAIN_TARGET), "lost");
    }

    fn nested_table() -> VNode {
        Routes::new()
            .exact("/", |_| text("home"))
            .prefix("/topics", |_| {
                el("section")
                    .child(Link("/topics/9", "nine"))
                    .child(
                        Routes::new()
                            .exact("/", |_| text("all topics"))
                            .exact("/:topicId", |m| {
                                text(format!("topic {}", m.param("topicId").unwrap_or("?")))
                            })
                            .into_vnode(),
                    )
                    .into()
            })
            .into()
    }

    #[test]
    fn nested_tables_match_the_unmatched_suffix() {
        let history = History::new("/topics");
        let auth = AuthStore::new();
        let (h, a) = (history.clone(), auth.clone());
        let mut app = App::mount(MemoryDom::new(), move || {
            Router(h.clone(), a.clone(), nested_table)
        })
        .expect("mount");

        assert!(app.host().html(MAIN_TARGET).contains("all topics"));

        history.push("/topics/7");
        app.flush().expect("flush");
        assert!(app.host().html(MAIN_TARGET).contains("topic 7"));

        // Link is a plain anchor wired into the shared history.
        let anchor = app.host().find_tag(MAIN_TARGET, "a").expect("anchor");
        assert_eq!(app.host().attr_of(anchor, "href").as_deref(), Some("/topics/9"));
        app.click(anchor).expect("click");
        assert_eq!(history.path(), "/topics/9");
        assert!(app.host().html(MAIN_TARGET).contains("topic 9"));
    }

    fn Login() -> VNode {
        component("Login", (), |_props: &()| {
            let history = use_context::<History>();
            let auth = use_context::<AuthStore>();
            let from = history
                .as_ref()
                .and_then(|h| h.location().state.clone())
                .unwrap_or_else(|| "/".to_string());
            el("button")
                .attr("id", "signin")
                .on("click", move || {
                    if let (Some(auth), Some(history)) = (&auth, &history) {
                        let history = history.clone();
                        let from = from.clone();
                        auth.authenticate(move || history.push(from));
                    }
                })
                .child(text("sign in"))
                .into()
        })
    }

    fn gated_table() -> VNode {
        Routes::new()
            .exact("/", |_| text("public"))
            .exact("/login", |_| Login())
            .exact("/account", |_| {
                Protected("/login", || text("secret account"))
            })
            .into()
    }

    #[test]
    fn protected_route_redirects_and_returns_after_async_login() {
        let history = History::new("/account");
        let auth = AuthStore::new();
        let (h, a) = (history.clone(), auth.clone());
        let mut app = App::mount(MemoryDom::new(), move || {
            Router(h.clone(), a.clone(), gated_table)
        })
        .expect("mount");

        // Redirected to login with the requested path preserved; the
        // abandoned location was replaced, not pushed.
        assert_eq!(history.path(), "/login");
        assert_eq!(history.location().state.as_deref(), Some("/account"));
        assert_eq!(history.len(), 1);
        assert!(app.host().html(MAIN_TARGET).contains("sign in"));

        // Sign-in is asynchronous: nothing changes until tasks are pumped.
        let button = app
            .host()
            .find_attr(MAIN_TARGET, "id", "signin")
            .expect("button");
        app.click(button).expect("click");
        assert!(!auth.is_authenticated());
        assert!(app.host().html(MAIN_TARGET).contains("sign in"));

        app.settle().expect("settle");
        assert!(auth.is_authenticated());
        assert_eq!(history.path(), "/account");
        assert!(app.host().html(MAIN_TARGET).contains("secret account"));

        // Signing out gates the route again on the next pass.
        auth.sign_out(|| {});
        app.settle().expect("settle");
        assert_eq!(history.path(), "/login");
        assert_eq!(history.location().state.as_deref(), Some("/account"));
    }
}
