//! Structural diff between realized trees, and patch application.
//!
//! Identity is positional: same path, same kind, same tag means the host
//! node is kept and only its differences are written. Anything else is a
//! subtree replacement. Handlers are closures and cannot be compared, so
//! elements carrying handlers (or a node ref) are rebound on every commit.

use reflow_core::{Handler, NodeRef, RNode};
use smallvec::SmallVec;

use crate::host::{Host, HostError};

pub type Path = SmallVec<[usize; 8]>;

pub enum Patch {
    Replace { path: Path, node: RNode },
    SetText { path: Path, text: String },
    SetAttr { path: Path, name: String, value: String },
    RemoveAttr { path: Path, name: String },
    Rebind { path: Path, handlers: Vec<(String, Handler)>, node_ref: Option<NodeRef> },
    Append { parent: Path, node: RNode },
    Truncate { parent: Path, len: usize },
}

pub fn diff(old: &RNode, new: &RNode) -> Vec<Patch> {
    let mut patches = Vec::new();
    walk(old, new, &mut Path::new(), &mut patches);
    patches
}

fn walk(old: &RNode, new: &RNode, path: &mut Path, out: &mut Vec<Patch>) {
    match (old, new) {
        (RNode::Nothing, RNode::Nothing) => {}
        (RNode::Text(a), RNode::Text(b)) => {
            if a != b {
                out.push(Patch::SetText {
                    path: path.clone(),
                    text: b.clone(),
                });
            }
        }
        (
            RNode::Element {
                tag: old_tag,
                attrs: old_attrs,
                handlers: old_handlers,
                children: old_children,
                ..
            },
            RNode::Element {
                tag: new_tag,
                attrs: new_attrs,
                handlers: new_handlers,
                node_ref: new_ref,
                children: new_children,
            },
        ) if old_tag == new_tag => {
            for (name, value) in new_attrs {
                let unchanged = old_attrs
                    .iter()
                    .any(|(n, v)| n == name && v == value);
                if !unchanged {
                    out.push(Patch::SetAttr {
                        path: path.clone(),
                        name: name.clone(),
                        value: value.clone(),
                    });
                }
            }
            for (name, _) in old_attrs {
                if !new_attrs.iter().any(|(n, _)| n == name) {
                    out.push(Patch::RemoveAttr {
                        path: path.clone(),
                        name: name.clone(),
                    });
                }
            }
            if !old_handlers.is_empty() || !new_handlers.is_empty() || new_ref.is_some() {
                out.push(Patch::Rebind {
                    path: path.clone(),
                    handlers: new_handlers.clone(),
                    node_ref: new_ref.clone(),
                });
            }
            let common = old_children.len().min(new_children.len());
            for i in 0..common {
                path.push(i);
                walk(&old_children[i], &new_children[i], path, out);
                path.pop();
            }
            for extra in &new_children[common..] {
                out.push(Patch::Append {
                    parent: path.clone(),
                    node: extra.clone(),
                });
            }
            if old_children.len() > new_children.len() {
                out.push(Patch::Truncate {
                    parent: path.clone(),
                    len: new_children.len(),
                });
            }
        }
        _ => out.push(Patch::Replace {
            path: path.clone(),
            node: new.clone(),
        }),
    }
}

/// Applies patches under `root`, resolving paths through the host's child
/// lists.
pub fn apply<H: Host>(host: &mut H, root: u64, patches: Vec<Patch>) -> Result<(), HostError> {
    for patch in patches {
        match patch {
            Patch::Replace { path, node } => {
                let (parent, index) = resolve_parent(host, root, &path)?;
                host.remove_child(parent, index)?;
                let fresh = materialize(host, &node)?;
                host.insert_child(parent, index, fresh)?;
            }
            Patch::SetText { path, text } => {
                let id = resolve(host, root, &path)?;
                host.set_text(id, &text)?;
            }
            Patch::SetAttr { path, name, value } => {
                let id = resolve(host, root, &path)?;
                host.set_attr(id, &name, &value)?;
            }
            Patch::RemoveAttr { path, name } => {
                let id = resolve(host, root, &path)?;
                host.remove_attr(id, &name)?;
            }
            Patch::Rebind {
                path,
                handlers,
                node_ref,
            } => {
                let id = resolve(host, root, &path)?;
                host.set_handlers(id, handlers)?;
                if let Some(r) = node_ref {
                    r.set(Some(id));
                }
            }
            Patch::Append { parent, node } => {
                let p = resolve(host, root, &parent)?;
                let fresh = materialize(host, &node)?;
                let index = host.child_count(p);
                host.insert_child(p, index, fresh)?;
            }
            Patch::Truncate { parent, len } => {
                let p = resolve(host, root, &parent)?;
                while host.child_count(p) > len {
                    let last = host.child_count(p) - 1;
                    host.remove_child(p, last)?;
                }
            }
        }
    }
    Ok(())
}

/// Creates host nodes for a realized subtree, binding handlers and refs.
pub fn materialize<H: Host>(host: &mut H, node: &RNode) -> Result<u64, HostError> {
    match node {
        RNode::Nothing => Ok(host.create_placeholder()),
        RNode::Text(s) => Ok(host.create_text(s)),
        RNode::Element {
            tag,
            attrs,
            handlers,
            node_ref,
            children,
        } => {
            let id = host.create_element(tag);
            for (name, value) in attrs {
                host.set_attr(id, name, value)?;
            }
            if !handlers.is_empty() {
                host.set_handlers(id, handlers.clone())?;
            }
            for (i, child) in children.iter().enumerate() {
                let c = materialize(host, child)?;
                host.insert_child(id, i, c)?;
            }
            if let Some(r) = node_ref {
                r.set(Some(id));
            }
            Ok(id)
        }
    }
}

fn resolve<H: Host>(host: &H, root: u64, path: &Path) -> Result<u64, HostError> {
    let mut cur = root;
    for &i in path {
        cur = host
            .child(cur, i)
            .ok_or_else(|| HostError::BadPath(format!("{path:?}")))?;
    }
    Ok(cur)
}

fn resolve_parent<H: Host>(host: &H, root: u64, path: &Path) -> Result<(u64, usize), HostError> {
    let Some((&index, rest)) = path.split_last() else {
        return Err(HostError::BadPath("empty path".into()));
    };
    let mut cur = root;
    for &i in rest {
        cur = host
            .child(cur, i)
            .ok_or_else(|| HostError::BadPath(format!("{path:?}")))?;
    }
    Ok((cur, index))
}
