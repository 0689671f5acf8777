//! The render → diff → commit → effects driver.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use reflow_core::{AttrList, HostId, RNode, Runtime, Scheduler, VNode};

use crate::diff::{apply, diff};
use crate::host::{Host, HostError};

/// The mount root the main tree commits into; portals name their own.
pub const MAIN_TARGET: &str = "root";

fn empty_mount() -> RNode {
    RNode::Element {
        tag: "#mount".into(),
        attrs: AttrList::new(),
        handlers: Vec::new(),
        node_ref: None,
        children: Vec::new(),
    }
}

/// Owns the runtime, the host, and the root component; all state updates
/// funnel through [`App::flush`] so writes within one turn coalesce into a
/// single render pass.
pub struct App<H: Host> {
    runtime: Runtime,
    scheduler: Scheduler,
    root_fn: Rc<dyn Fn() -> VNode>,
    host: H,
    committed: HashMap<String, RNode>,
    render_passes: usize,
}

impl<H: Host> App<H> {
    /// Renders the root once and commits it. The root closure must only
    /// build a tree (usually one `component(..)` call); hooks belong inside
    /// component bodies.
    pub fn mount(host: H, root: impl Fn() -> VNode + 'static) -> Result<Self, HostError> {
        let scheduler = Scheduler::new();
        let mut app = Self {
            runtime: Runtime::new(scheduler.clone()),
            scheduler,
            root_fn: Rc::new(root),
            host,
            committed: HashMap::new(),
            render_passes: 0,
        };
        app.render_and_commit()?;
        app.flush()?;
        Ok(app)
    }

    fn render_and_commit(&mut self) -> Result<(), HostError> {
        let tree = (self.root_fn)();
        let output = self.runtime.render(&tree);
        self.render_passes += 1;

        let mut targets: HashMap<String, Vec<RNode>> = HashMap::new();
        targets
            .entry(MAIN_TARGET.to_string())
            .or_default()
            .push(output.root);
        for (target, subtree) in output.portals {
            targets.entry(target).or_default().push(subtree);
        }

        // Targets that lost all content this pass still need a commit to
        // clear them.
        let names: HashSet<String> = targets
            .keys()
            .chain(self.committed.keys())
            .cloned()
            .collect();
        let mut committed = HashMap::new();
        for name in names {
            let children = targets.remove(&name).unwrap_or_default();
            let next = RNode::Element {
                tag: "#mount".into(),
                attrs: AttrList::new(),
                handlers: Vec::new(),
                node_ref: None,
                children,
            };
            let prev = self.committed.remove(&name).unwrap_or_else(empty_mount);
            let patches = diff(&prev, &next);
            let root_id = self.host.root(&name);
            apply(&mut self.host, root_id, patches)?;
            committed.insert(name, next);
        }
        self.committed = committed;

        // Commit done: run queued effects. They may set state, which the
        // caller's flush picks up.
        self.runtime.run_effects();
        Ok(())
    }

    /// Re-renders while state is dirty. One synchronous turn's worth of
    /// writes produces exactly one pass; effect-triggered writes add their
    /// own passes.
    pub fn flush(&mut self) -> Result<(), HostError> {
        let mut rounds = 0;
        while self.scheduler.needs_render() {
            self.render_and_commit()?;
            rounds += 1;
            if rounds > 64 {
                log::warn!("flush: render loop did not settle after {rounds} passes");
                break;
            }
        }
        Ok(())
    }

    /// Runs the node's handler for `event`, then flushes once.
    pub fn dispatch(&mut self, node: HostId, event: &str) -> Result<(), HostError> {
        match self.host.handler(node, event) {
            Some(handler) => handler(),
            None => log::warn!("dispatch: no `{event}` handler bound"),
        }
        self.flush()
    }

    pub fn click(&mut self, node: HostId) -> Result<(), HostError> {
        self.dispatch(node, "click")
    }

    /// Pumps deferred tasks (timers, network completions, auth callbacks)
    /// and flushes until nothing is pending. Bounded; a self-rescheduling
    /// task is reported rather than spun on forever.
    pub fn settle(&mut self) -> Result<(), HostError> {
        let mut rounds = 0;
        loop {
            let ran = self.scheduler.run_tasks();
            self.flush()?;
            if ran == 0 && !self.scheduler.has_tasks() && !self.scheduler.needs_render() {
                break;
            }
            rounds += 1;
            if rounds > 64 {
                log::warn!("settle: task queue did not drain after {rounds} rounds");
                break;
            }
        }
        Ok(())
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn scheduler(&self) -> Scheduler {
        self.scheduler.clone()
    }

    /// Number of render passes so far; batching tests assert on deltas.
    pub fn render_passes(&self) -> usize {
        self.render_passes
    }

    pub fn instance_count(&self) -> usize {
        self.runtime.instance_count()
    }
}
