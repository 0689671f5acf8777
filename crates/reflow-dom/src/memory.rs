//! In-memory host DOM for tests, demos, and headless rendering.

use std::collections::HashMap;

use slotmap::{Key, KeyData, SlotMap, new_key_type};

use reflow_core::{Handler, HostId};

use crate::host::{Host, HostError};

new_key_type! {
    struct DomKey;
}

fn key_of(id: HostId) -> DomKey {
    DomKey::from(KeyData::from_ffi(id))
}

fn id_of(key: DomKey) -> HostId {
    key.data().as_ffi()
}

enum NodeKind {
    Root(String),
    Element { tag: String, attrs: Vec<(String, String)> },
    Text(String),
    Placeholder,
}

struct DomNode {
    kind: NodeKind,
    children: Vec<DomKey>,
    handlers: Vec<(String, Handler)>,
}

impl DomNode {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
            handlers: Vec::new(),
        }
    }
}

#[derive(Default)]
pub struct MemoryDom {
    nodes: SlotMap<DomKey, DomNode>,
    roots: HashMap<String, DomKey>,
    focused: Option<DomKey>,
}

impl MemoryDom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes a mount root to an HTML-ish string for assertions.
    pub fn html(&self, target: &str) -> String {
        match self.roots.get(target) {
            Some(&root) => self
                .nodes
                .get(root)
                .map(|n| {
                    n.children
                        .iter()
                        .map(|&c| self.render_node(c))
                        .collect::<String>()
                })
                .unwrap_or_default(),
            None => String::new(),
        }
    }

    fn render_node(&self, key: DomKey) -> String {
        let Some(node) = self.nodes.get(key) else {
            return String::new();
        };
        match &node.kind {
            NodeKind::Text(s) => s.clone(),
            NodeKind::Placeholder => String::new(),
            NodeKind::Root(_) => node
                .children
                .iter()
                .map(|&c| self.render_node(c))
                .collect(),
            NodeKind::Element { tag, attrs } => {
                let mut out = format!("<{tag}");
                for (name, value) in attrs {
                    out.push_str(&format!(" {name}=\"{value}\""));
                }
                out.push('>');
                for &c in &node.children {
                    out.push_str(&self.render_node(c));
                }
                out.push_str(&format!("</{tag}>"));
                out
            }
        }
    }

    /// Depth-first search for the first element with the given tag.
    pub fn find_tag(&self, target: &str, tag: &str) -> Option<HostId> {
        let &root = self.roots.get(target)?;
        self.search(root, &|node| {
            matches!(&node.kind, NodeKind::Element { tag: t, .. } if t == tag)
        })
    }

    /// Depth-first search for the first element carrying `name="value"`.
    pub fn find_attr(&self, target: &str, name: &str, value: &str) -> Option<HostId> {
        let &root = self.roots.get(target)?;
        self.search(root, &|node| match &node.kind {
            NodeKind::Element { attrs, .. } => {
                attrs.iter().any(|(n, v)| n == name && v == value)
            }
            _ => false,
        })
    }

    fn search(&self, from: DomKey, pred: &dyn Fn(&DomNode) -> bool) -> Option<HostId> {
        let node = self.nodes.get(from)?;
        if pred(node) {
            return Some(id_of(from));
        }
        for &child in &node.children {
            if let Some(found) = self.search(child, pred) {
                return Some(found);
            }
        }
        None
    }

    /// Concatenated text content under a node.
    pub fn text_of(&self, id: HostId) -> String {
        let key = key_of(id);
        let Some(node) = self.nodes.get(key) else {
            return String::new();
        };
        match &node.kind {
            NodeKind::Text(s) => s.clone(),
            _ => node
                .children
                .iter()
                .map(|&c| self.text_of(id_of(c)))
                .collect(),
        }
    }

    pub fn attr_of(&self, id: HostId, name: &str) -> Option<String> {
        match &self.nodes.get(key_of(id))?.kind {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.clone()),
            _ => None,
        }
    }

    pub fn focused(&self) -> Option<HostId> {
        self.focused.map(id_of)
    }

    fn drop_subtree(&mut self, key: DomKey) {
        if let Some(node) = self.nodes.remove(key) {
            if self.focused == Some(key) {
                self.focused = None;
            }
            for child in node.children {
                self.drop_subtree(child);
            }
        }
    }

    fn get_mut(&mut self, id: HostId) -> Result<&mut DomNode, HostError> {
        self.nodes
            .get_mut(key_of(id))
            .ok_or(HostError::UnknownNode(id))
    }
}

impl Host for MemoryDom {
    fn root(&mut self, target: &str) -> HostId {
        if let Some(&key) = self.roots.get(target) {
            return id_of(key);
        }
        let key = self
            .nodes
            .insert(DomNode::new(NodeKind::Root(target.to_string())));
        self.roots.insert(target.to_string(), key);
        id_of(key)
    }

    fn create_text(&mut self, text: &str) -> HostId {
        id_of(self.nodes.insert(DomNode::new(NodeKind::Text(text.into()))))
    }

    fn create_element(&mut self, tag: &str) -> HostId {
        id_of(self.nodes.insert(DomNode::new(NodeKind::Element {
            tag: tag.into(),
            attrs: Vec::new(),
        })))
    }

    fn create_placeholder(&mut self) -> HostId {
        id_of(self.nodes.insert(DomNode::new(NodeKind::Placeholder)))
    }

    fn set_text(&mut self, node: HostId, text: &str) -> Result<(), HostError> {
        match &mut self.get_mut(node)?.kind {
            NodeKind::Text(s) => {
                *s = text.to_string();
                Ok(())
            }
            _ => Err(HostError::NotAnElement(node)),
        }
    }

    fn set_attr(&mut self, node: HostId, name: &str, value: &str) -> Result<(), HostError> {
        match &mut self.get_mut(node)?.kind {
            NodeKind::Element { attrs, .. } => {
                match attrs.iter_mut().find(|(n, _)| n == name) {
                    Some(slot) => slot.1 = value.to_string(),
                    None => attrs.push((name.to_string(), value.to_string())),
                }
                Ok(())
            }
            _ => Err(HostError::NotAnElement(node)),
        }
    }

    fn remove_attr(&mut self, node: HostId, name: &str) -> Result<(), HostError> {
        match &mut self.get_mut(node)?.kind {
            NodeKind::Element { attrs, .. } => {
                attrs.retain(|(n, _)| n != name);
                Ok(())
            }
            _ => Err(HostError::NotAnElement(node)),
        }
    }

    fn set_handlers(
        &mut self,
        node: HostId,
        handlers: Vec<(String, Handler)>,
    ) -> Result<(), HostError> {
        self.get_mut(node)?.handlers = handlers;
        Ok(())
    }

    fn insert_child(
        &mut self,
        parent: HostId,
        index: usize,
        child: HostId,
    ) -> Result<(), HostError> {
        let child_key = key_of(child);
        if !self.nodes.contains_key(child_key) {
            return Err(HostError::UnknownNode(child));
        }
        let node = self.get_mut(parent)?;
        if index > node.children.len() {
            return Err(HostError::BadIndex { parent, index });
        }
        node.children.insert(index, child_key);
        Ok(())
    }

    fn remove_child(&mut self, parent: HostId, index: usize) -> Result<(), HostError> {
        let node = self.get_mut(parent)?;
        if index >= node.children.len() {
            return Err(HostError::BadIndex { parent, index });
        }
        let removed = node.children.remove(index);
        self.drop_subtree(removed);
        Ok(())
    }

    fn child(&self, parent: HostId, index: usize) -> Option<HostId> {
        self.nodes
            .get(key_of(parent))?
            .children
            .get(index)
            .copied()
            .map(id_of)
    }

    fn child_count(&self, parent: HostId) -> usize {
        self.nodes
            .get(key_of(parent))
            .map(|n| n.children.len())
            .unwrap_or(0)
    }

    fn handler(&self, node: HostId, event: &str) -> Option<Handler> {
        self.nodes
            .get(key_of(node))?
            .handlers
            .iter()
            .find(|(name, _)| name == event)
            .map(|(_, h)| h.clone())
    }

    fn focus(&mut self, node: HostId) -> Result<(), HostError> {
        let key = key_of(node);
        if !self.nodes.contains_key(key) {
            return Err(HostError::UnknownNode(node));
        }
        self.focused = Some(key);
        Ok(())
    }
}
