#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use reflow_core::{
        Cleanup, NodeRef, Scheduler, SetState, VNode, boundary, component, el, memo, portal,
        text, use_effect, use_node_ref, use_scheduler, use_state,
    };

    use crate::app::{App, MAIN_TARGET};
    use crate::host::Host;
    use crate::diff::{Patch, diff};
    use crate::memory::MemoryDom;

    #[test]
    fn mount_and_click_increments() {
        let root = || {
            component("Counter", (), |_props: &()| {
                let (count, set) = use_state(|| 0);
                el("div")
                    .child(
                        el("button")
                            .attr("id", "inc")
                            .on("click", move || set.update(|c| *c += 1))
                            .child(text("+")),
                    )
                    .child(el("span").child(text(format!("{count}"))))
                    .into()
            })
        };

        let mut app = App::mount(MemoryDom::new(), root).expect("mount");
        assert!(app.host().html(MAIN_TARGET).contains("<span>0</span>"));

        let button = app
            .host()
            .find_attr(MAIN_TARGET, "id", "inc")
            .expect("button exists");
        app.click(button).expect("click");
        assert!(app.host().html(MAIN_TARGET).contains("<span>1</span>"));
        app.click(button).expect("click");
        assert!(app.host().html(MAIN_TARGET).contains("<span>2</span>"));
    }

    #[test]
    fn writes_in_one_handler_render_once() {
        let root = || {
            component("Burst", (), |_props: &()| {
                let (count, set) = use_state(|| 0);
                el("button")
                    .on("click", move || {
                        set.set(1);
                        set.set(2);
                        set.update(|c| *c += 1);
                    })
                    .child(text(format!("{count}")))
                    .into()
            })
        };

        let mut app = App::mount(MemoryDom::new(), root).expect("mount");
        let before = app.render_passes();
        let button = app.host().find_tag(MAIN_TARGET, "button").expect("button");
        app.click(button).expect("click");
        assert_eq!(app.render_passes() - before, 1, "three writes, one pass");
        assert_eq!(app.host().html(MAIN_TARGET), "<button>3</button>");
    }

    #[test]
    fn element_is_patched_in_place_when_tag_is_stable() {
        let root = || {
            component("Parity", (), |_props: &()| {
                let (count, set) = use_state(|| 0);
                let class = if count % 2 == 0 { "even" } else { "odd" };
                el("div")
                    .child(
                        el("span")
                            .attr("class", class)
                            .child(text(format!("{count}"))),
                    )
                    .child(el("button").on("click", move || set.update(|c| *c += 1)))
                    .into()
            })
        };

        let mut app = App::mount(MemoryDom::new(), root).expect("mount");
        let span_before = app.host().find_tag(MAIN_TARGET, "span").expect("span");
        let button = app.host().find_tag(MAIN_TARGET, "button").expect("button");
        app.click(button).expect("click");

        let span_after = app.host().find_tag(MAIN_TARGET, "span").expect("span");
        assert_eq!(span_before, span_after, "same host node, patched attrs");
        assert_eq!(app.host().attr_of(span_after, "class").as_deref(), Some("odd"));
    }

    #[test]
    fn list_growth_and_shrink_patch_children() {
        let root = || {
            component("List", (), |_props: &()| {
                let (n, set) = use_state(|| 1usize);
                let grow = set.clone();
                let mut list = el("ul");
                for i in 0..n {
                    list = list.child(el("li").child(text(format!("item {i}"))));
                }
                el("div")
                    .child(list)
                    .child(
                        el("button")
                            .attr("id", "grow")
                            .on("click", move || grow.update(|n| *n += 2)),
                    )
                    .child(
                        el("button")
                            .attr("id", "shrink")
                            .on("click", move || set.update(|n| *n = n.saturating_sub(1))),
                    )
                    .into()
            })
        };

        let mut app = App::mount(MemoryDom::new(), root).expect("mount");
        assert!(app.host().html(MAIN_TARGET).contains("<ul><li>item 0</li></ul>"));

        let grow = app.host().find_attr(MAIN_TARGET, "id", "grow").expect("grow");
        app.click(grow).expect("click");
        assert!(
            app.host()
                .html(MAIN_TARGET)
                .contains("<li>item 0</li><li>item 1</li><li>item 2</li>")
        );

        let shrink = app
            .host()
            .find_attr(MAIN_TARGET, "id", "shrink")
            .expect("shrink");
        app.click(shrink).expect("click");
        assert!(
            app.host()
                .html(MAIN_TARGET)
                .contains("<li>item 0</li><li>item 1</li>")
        );
    }

    #[test]
    fn portal_commits_into_its_target_and_clears_on_unmount() {
        let root = || {
            component("Modal", (), |_props: &()| {
                let (open, set) = use_state(|| true);
                let mut tree = el("div").child(el("h1").child(text("App")));
                if open {
                    tree = tree.child(portal(
                        "modal-root",
                        el("div").attr("class", "modal").child(text("Modal")),
                    ));
                }
                tree.child(
                    el("button").on("click", move || set.update(|o| *o = !*o)),
                )
                .into()
            })
        };

        let mut app = App::mount(MemoryDom::new(), root).expect("mount");
        assert_eq!(
            app.host().html("modal-root"),
            "<div class=\"modal\">Modal</div>"
        );
        assert!(!app.host().html(MAIN_TARGET).contains("Modal"));

        let button = app.host().find_tag(MAIN_TARGET, "button").expect("button");
        app.click(button).expect("click");
        assert_eq!(app.host().html("modal-root"), "");

        app.click(button).expect("click");
        assert_eq!(
            app.host().html("modal-root"),
            "<div class=\"modal\">Modal</div>"
        );
    }

    #[test]
    fn node_ref_is_filled_at_commit_and_supports_focus() {
        let captured: Rc<Cell<Option<u64>>> = Rc::new(Cell::new(None));
        let root = {
            let captured = captured.clone();
            move || {
                component("TextInput", captured.clone(), |slot: &Rc<Cell<Option<u64>>>| {
                    let input_ref: NodeRef = use_node_ref();
                    let slot = slot.clone();
                    let for_click = input_ref.clone();
                    el("div")
                        .child(
                            el("input")
                                .attr("type", "text")
                                .node_ref(input_ref.clone()),
                        )
                        .child(
                            el("button").on("click", move || slot.set(for_click.get())),
                        )
                        .into()
                })
            }
        };

        let mut app = App::mount(MemoryDom::new(), root).expect("mount");
        let button = app.host().find_tag(MAIN_TARGET, "button").expect("button");
        app.click(button).expect("click");

        let input = app.host().find_tag(MAIN_TARGET, "input").expect("input");
        assert_eq!(captured.get(), Some(input), "ref points at the host node");

        app.host_mut().focus(input).expect("focus");
        assert_eq!(app.host().focused(), Some(input));
    }

    #[test]
    fn boundary_fallback_renders_and_siblings_survive() {
        let prev_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(|_| {}));

        let armed = Rc::new(Cell::new(false));
        let root = {
            let armed = armed.clone();
            move || {
                el("div")
                    .child(boundary(
                        |err| el("p").child(text(format!("failed: {}", err.message))).into(),
                        component("Bomb", armed.clone(), |armed: &Rc<Cell<bool>>| {
                            if armed.get() {
                                panic!("exploded");
                            }
                            text("calm")
                        }),
                    ))
                    .child(component("Sibling", (), |_props: &()| {
                        let (n, set) = use_state(|| 0);
                        el("button")
                            .on("click", move || set.update(|n| *n += 1))
                            .child(text(format!("{n}")))
                            .into()
                    }))
                    .into()
            }
        };

        let mut app = App::mount(MemoryDom::new(), root).expect("mount");
        let button = app.host().find_tag(MAIN_TARGET, "button").expect("button");
        app.click(button).expect("click");
        assert!(app.host().html(MAIN_TARGET).contains("<button>1</button>"));

        armed.set(true);
        app.scheduler().mark_root();
        app.flush().expect("flush");
        let html = app.host().html(MAIN_TARGET);
        assert!(html.contains("<p>failed: exploded</p>"));
        assert!(html.contains("<button>1</button>"), "sibling state survives");

        std::panic::set_hook(prev_hook);
    }

    fn arm_interval(scheduler: &Scheduler, cancelled: Rc<Cell<bool>>, set: SetState<i32>) {
        let again = scheduler.clone();
        scheduler.defer(move || {
            if cancelled.get() {
                return;
            }
            set.update(|c| *c += 1);
            arm_interval(&again, cancelled, set);
        });
    }

    #[test]
    fn interval_effect_cancels_its_timer_on_unmount() {
        let mounted = Rc::new(Cell::new(true));
        let root = {
            let mounted = mounted.clone();
            move || {
                if !mounted.get() {
                    return VNode::Nothing;
                }
                component("Timer", (), |_props: &()| {
                    let (count, set) = use_state(|| 0);
                    let scheduler = use_scheduler();
                    use_effect((), move || {
                        let cancelled = Rc::new(Cell::new(false));
                        arm_interval(&scheduler, cancelled.clone(), set.clone());
                        Cleanup::new(move || cancelled.set(true))
                    });
                    el("h1").child(text(format!("{count}"))).into()
                })
            }
        };

        let mut app = App::mount(MemoryDom::new(), root).expect("mount");
        let scheduler = app.scheduler();

        scheduler.run_tasks();
        app.flush().expect("flush");
        assert_eq!(app.host().html(MAIN_TARGET), "<h1>1</h1>");

        scheduler.run_tasks();
        app.flush().expect("flush");
        assert_eq!(app.host().html(MAIN_TARGET), "<h1>2</h1>");

        // Unmount; the cleanup must stop the rescheduling chain.
        mounted.set(false);
        scheduler.mark_root();
        app.flush().expect("flush");
        assert_eq!(app.instance_count(), 0);

        scheduler.run_tasks();
        assert!(!scheduler.needs_render(), "cancelled timer writes nothing");
        assert!(!scheduler.has_tasks(), "chain stopped rescheduling");
    }

    struct LabelProps {
        label: String,
        renders: Rc<Cell<usize>>,
    }

    impl PartialEq for LabelProps {
        fn eq(&self, other: &Self) -> bool {
            self.label == other.label
        }
    }

    #[test]
    fn memo_child_skips_when_props_are_equal() {
        let child_renders = Rc::new(Cell::new(0usize));
        let root = {
            let child_renders = child_renders.clone();
            move || {
                component(
                    "Parent",
                    child_renders.clone(),
                    |renders: &Rc<Cell<usize>>| {
                        let (n, set) = use_state(|| 0);
                        el("div")
                            .child(el("button").on("click", move || set.update(|n| *n += 1)))
                            .child(memo(
                                "Label",
                                LabelProps {
                                    label: "fixed".into(),
                                    renders: renders.clone(),
                                },
                                |props: &LabelProps| {
                                    props.renders.set(props.renders.get() + 1);
                                    el("em").child(text(props.label.clone())).into()
                                },
                            ))
                            .child(text(format!("{n}")))
                            .into()
                    },
                )
            }
        };

        let mut app = App::mount(MemoryDom::new(), root).expect("mount");
        assert_eq!(child_renders.get(), 1);

        let button = app.host().find_tag(MAIN_TARGET, "button").expect("button");
        app.click(button).expect("click");
        app.click(button).expect("click");
        assert_eq!(child_renders.get(), 1, "equal props skip the child");
        assert!(app.host().html(MAIN_TARGET).contains("<em>fixed</em>"));
    }

    #[test]
    fn diff_emits_minimal_patches() {
        let old: reflow_core::RNode = {
            let tree = el("div")
                .attr("class", "a")
                .child(text("one"))
                .child(el("span").child(text("x")));
            materialize_rnode(tree.into())
        };
        let new: reflow_core::RNode = {
            let tree = el("div")
                .attr("class", "b")
                .child(text("two"))
                .child(el("span").child(text("x")))
                .child(text("extra"));
            materialize_rnode(tree.into())
        };

        let patches = diff(&old, &new);
        assert!(patches.iter().any(|p| matches!(
            p,
            Patch::SetAttr { name, value, .. } if name == "class" && value == "b"
        )));
        assert!(patches.iter().any(|p| matches!(
            p,
            Patch::SetText { text, .. } if text == "two"
        )));
        assert!(patches.iter().any(|p| matches!(p, Patch::Append { .. })));
        assert!(
            !patches.iter().any(|p| matches!(p, Patch::Replace { .. })),
            "stable tags never replace"
        );
    }

    // Expands a component-free VNode into an RNode for diff unit tests.
    fn materialize_rnode(node: VNode) -> reflow_core::RNode {
        let mut rt = reflow_core::Runtime::new(Scheduler::new());
        rt.render(&node).root
    }
}
