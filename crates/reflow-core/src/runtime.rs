//! Component expansion and instance lifecycle.
//!
//! The runtime turns a declarative [`VNode`] tree into a realized
//! [`RNode`] tree, re-invoking component bodies with their current state.
//! Instances are kept in an arena and looked up by a path key (tree
//! position + component type + optional explicit key), so an unchanged
//! subtree keeps its state and effects across renders.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;

use slotmap::SlotMap;

use crate::context;
use crate::error::{CaughtError, panic_message};
use crate::instance::{Frame, Hook, Instance, push_frame};
use crate::scheduler::{InstanceKey, Scheduler};
use crate::view::{RNode, VNode};

pub struct Runtime {
    instances: SlotMap<InstanceKey, Instance>,
    by_path: HashMap<String, InstanceKey>,
    scheduler: Scheduler,
    pending_effects: Rc<RefCell<Vec<(InstanceKey, usize)>>>,
}

/// Output of one render pass: the main realized tree plus the subtrees
/// destined for named portal targets, in encounter order.
pub struct RenderOutput {
    pub root: RNode,
    pub portals: Vec<(String, RNode)>,
}

struct ExpandCx {
    /// Instance paths reached this pass; anything absent is swept.
    seen: Vec<String>,
    portals: Vec<(String, RNode)>,
    dirty_paths: Vec<String>,
}

fn in_subtree(path: &str, root: &str) -> bool {
    path == root || (path.starts_with(root) && path.as_bytes().get(root.len()) == Some(&b'/'))
}

impl Runtime {
    pub fn new(scheduler: Scheduler) -> Self {
        Self {
            instances: SlotMap::with_key(),
            by_path: HashMap::new(),
            scheduler,
            pending_effects: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// One render pass. Consumes the dirty set, expands the tree, then
    /// unmounts instances that fell out of it (children before parents).
    pub fn render(&mut self, root: &VNode) -> RenderOutput {
        let dirty_paths = self
            .scheduler
            .take_dirty()
            .into_iter()
            .filter_map(|k| self.instances.get(k).map(|i| i.path.clone()))
            .collect();
        let mut cx = ExpandCx {
            seen: Vec::new(),
            portals: Vec::new(),
            dirty_paths,
        };
        let root_r = self.expand(root, "0", &mut cx);

        let seen: HashSet<String> = cx.seen.into_iter().collect();
        let mut dead: Vec<String> = self
            .by_path
            .keys()
            .filter(|p| !seen.contains(p.as_str()))
            .cloned()
            .collect();
        dead.sort_by_key(|p| std::cmp::Reverse(p.matches('/').count()));
        for path in dead {
            if let Some(key) = self.by_path.remove(&path)
                && let Some(inst) = self.instances.remove(key)
            {
                inst.unmount();
            }
        }

        RenderOutput {
            root: root_r,
            portals: cx.portals,
        }
    }

    /// Drains the effect queue filled during the last render: for each slot
    /// whose deps changed, the previous cleanup runs first, then the new
    /// action; its cleanup is stored for next time.
    pub fn run_effects(&mut self) {
        loop {
            let batch: Vec<(InstanceKey, usize)> = {
                let mut queue = self.pending_effects.borrow_mut();
                if queue.is_empty() {
                    break;
                }
                queue.drain(..).collect()
            };
            for (key, idx) in batch {
                let Some(inst) = self.instances.get(key) else {
                    continue;
                };
                if !inst.alive.get() {
                    continue;
                }
                let (pending, cleanup) = {
                    let mut hooks = inst.hooks.borrow_mut();
                    match hooks.get_mut(idx) {
                        Some(Hook::Effect(slot)) => (slot.pending.take(), slot.cleanup.take()),
                        _ => (None, None),
                    }
                };
                if let Some(cleanup) = cleanup {
                    cleanup.run();
                }
                if let Some(action) = pending {
                    let fresh = action();
                    let mut hooks = inst.hooks.borrow_mut();
                    if let Some(Hook::Effect(slot)) = hooks.get_mut(idx) {
                        slot.cleanup = Some(fresh);
                    }
                }
            }
        }
    }

    fn expand(&mut self, node: &VNode, path: &str, cx: &mut ExpandCx) -> RNode {
        match node {
            VNode::Nothing => RNode::Nothing,
            VNode::Text(s) => RNode::Text(s.clone()),
            VNode::Element(e) => {
                let children = e
                    .children
                    .iter()
                    .enumerate()
                    .map(|(i, c)| self.expand(c, &format!("{path}/{i}"), cx))
                    .collect();
                RNode::Element {
                    tag: e.tag.clone(),
                    attrs: e.attrs.clone(),
                    handlers: e.handlers.clone(),
                    node_ref: e.node_ref.clone(),
                    children,
                }
            }
            VNode::Portal { target, child } => {
                let rendered = self.expand(child, &format!("{path}/@{target}"), cx);
                cx.portals.push((target.clone(), rendered));
                RNode::Nothing
            }
            VNode::Provider { value, child } => {
                let child_path = format!("{path}/p");
                context::with_frame(value, || self.expand(child, &child_path, cx))
            }
            VNode::Boundary { fallback, child } => {
                let seen_len = cx.seen.len();
                let portals_len = cx.portals.len();
                let effects_len = self.pending_effects.borrow().len();
                let child_path = format!("{path}/b");
                let attempt =
                    catch_unwind(AssertUnwindSafe(|| self.expand(child, &child_path, cx)));
                match attempt {
                    Ok(rendered) => rendered,
                    Err(err) => {
                        // Discard everything the failed subtree produced;
                        // its half-created instances get swept as unseen.
                        cx.seen.truncate(seen_len);
                        cx.portals.truncate(portals_len);
                        self.pending_effects.borrow_mut().truncate(effects_len);
                        let component = match child.as_ref() {
                            VNode::Component(cn) => cn.name.to_string(),
                            _ => "subtree".to_string(),
                        };
                        let caught = CaughtError {
                            component,
                            message: panic_message(&err),
                        };
                        log::warn!("error boundary: {caught}");
                        let fb = fallback(&caught);
                        self.expand(&fb, &format!("{path}/!"), cx)
                    }
                }
            }
            VNode::Component(cn) => self.expand_component(cn, path, cx),
        }
    }

    fn expand_component(
        &mut self,
        cn: &crate::view::ComponentNode,
        path: &str,
        cx: &mut ExpandCx,
    ) -> RNode {
        let path_key = match &cn.key {
            Some(k) => format!("{path}:{}#{k}", cn.name),
            None => format!("{path}:{}", cn.name),
        };
        let key = match self.by_path.get(&path_key).copied() {
            Some(k) if self.instances.get(k).map(|i| i.type_id) == Some(cn.type_id) => k,
            Some(stale) => {
                // Same position, different component: replace the instance.
                if let Some(inst) = self.instances.remove(stale) {
                    inst.unmount();
                }
                let k = self
                    .instances
                    .insert(Instance::new(cn.type_id, cn.name, path_key.clone()));
                self.by_path.insert(path_key.clone(), k);
                k
            }
            None => {
                let k = self
                    .instances
                    .insert(Instance::new(cn.type_id, cn.name, path_key.clone()));
                self.by_path.insert(path_key.clone(), k);
                k
            }
        };
        cx.seen.push(path_key.clone());

        if let (Some(eq), Some(new_props)) = (&cn.props_eq, &cn.props) {
            let subtree_dirty = cx.dirty_paths.iter().any(|p| in_subtree(p, &path_key));
            let unchanged = !subtree_dirty
                && match &self.instances[key].prev_props {
                    Some(prev) => eq(prev.as_ref(), new_props.as_ref()),
                    None => false,
                };
            if unchanged && self.instances[key].cached.is_some() {
                let descendants: Vec<String> = self
                    .by_path
                    .keys()
                    .filter(|p| *p != &path_key && in_subtree(p, &path_key))
                    .cloned()
                    .collect();
                cx.seen.extend(descendants);
                if let Some((cached_root, cached_portals)) = &self.instances[key].cached {
                    cx.portals.extend(cached_portals.iter().cloned());
                    return cached_root.clone();
                }
            }
        }

        let (hooks, alive) = {
            let inst = &self.instances[key];
            (inst.hooks.clone(), inst.alive.clone())
        };
        let portals_before = cx.portals.len();
        let body = {
            let frame = Frame::new(
                key,
                hooks,
                alive,
                self.scheduler.clone(),
                self.pending_effects.clone(),
            );
            let _guard = push_frame(frame);
            (cn.render)()
        };
        let rendered = self.expand(&body, &format!("{path_key}/0"), cx);

        if let Some(inst) = self.instances.get_mut(key) {
            inst.prev_props = cn.props.clone();
            if cn.props_eq.is_some() {
                let delta = cx.portals[portals_before..].to_vec();
                inst.cached = Some((rendered.clone(), delta));
            }
        }
        rendered
    }
}
