use std::any::{Any, TypeId};
use std::cell::Cell;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::context::ContextValue;
use crate::error::CaughtError;

/// Opaque handle into the output medium (host node id).
pub type HostId = u64;

pub type Handler = Rc<dyn Fn()>;

pub type AttrList = SmallVec<[(String, String); 4]>;

/// Stable handle filled in at commit with the host node an element rendered
/// to. Cloneable; all clones observe the same slot.
#[derive(Clone, Default)]
pub struct NodeRef(Rc<Cell<Option<HostId>>>);

impl NodeRef {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn get(&self) -> Option<HostId> {
        self.0.get()
    }
    pub fn set(&self, id: Option<HostId>) {
        self.0.set(id);
    }
}

/// A declarative view node. Immutable per render pass; components produce a
/// fresh tree on every state change.
#[derive(Clone)]
pub enum VNode {
    /// Renders nothing but keeps child indices stable.
    Nothing,
    Text(String),
    Element(Element),
    Component(ComponentNode),
    /// Mounts `child` under a differently named host root.
    Portal { target: String, child: Box<VNode> },
    /// Makes a context value visible to the subtree while it expands.
    Provider {
        value: ContextValue,
        child: Box<VNode>,
    },
    /// Error boundary: contains render-time panics of the subtree and
    /// expands `fallback` instead.
    Boundary {
        fallback: Rc<dyn Fn(&CaughtError) -> VNode>,
        child: Box<VNode>,
    },
}

#[derive(Clone)]
pub struct Element {
    pub tag: String,
    pub attrs: AttrList,
    pub handlers: Vec<(String, Handler)>,
    pub node_ref: Option<NodeRef>,
    pub children: Vec<VNode>,
}

impl Element {
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    pub fn on(mut self, event: impl Into<String>, f: impl Fn() + 'static) -> Self {
        self.handlers.push((event.into(), Rc::new(f)));
        self
    }

    pub fn node_ref(mut self, r: NodeRef) -> Self {
        self.node_ref = Some(r);
        self
    }

    pub fn child(mut self, c: impl Into<VNode>) -> Self {
        self.children.push(c.into());
        self
    }

    pub fn children(mut self, cs: impl IntoIterator<Item = VNode>) -> Self {
        self.children.extend(cs);
        self
    }
}

impl From<Element> for VNode {
    fn from(e: Element) -> Self {
        VNode::Element(e)
    }
}

pub fn el(tag: impl Into<String>) -> Element {
    Element {
        tag: tag.into(),
        attrs: SmallVec::new(),
        handlers: Vec::new(),
        node_ref: None,
        children: Vec::new(),
    }
}

pub fn text(s: impl Into<String>) -> VNode {
    VNode::Text(s.into())
}

/// Reference to a component: a render closure over captured props plus the
/// identity (type id, optional key) used to preserve the instance across
/// renders.
#[derive(Clone)]
pub struct ComponentNode {
    pub name: &'static str,
    pub(crate) type_id: TypeId,
    pub key: Option<String>,
    pub(crate) render: Rc<dyn Fn() -> VNode>,
    pub(crate) props: Option<Rc<dyn Any>>,
    pub(crate) props_eq: Option<Rc<dyn Fn(&dyn Any, &dyn Any) -> bool>>,
}

/// Builds a component node. Identity is the closure's type plus tree
/// position, so the same call site keeps its instance across renders.
pub fn component<P, F>(name: &'static str, props: P, f: F) -> VNode
where
    P: 'static,
    F: Fn(&P) -> VNode + 'static,
{
    let props: Rc<P> = Rc::new(props);
    let captured = props.clone();
    VNode::Component(ComponentNode {
        name,
        type_id: TypeId::of::<F>(),
        key: None,
        render: Rc::new(move || f(&captured)),
        props: Some(props as Rc<dyn Any>),
        props_eq: None,
    })
}

/// Like [`component`], but skips re-rendering when the props compare equal
/// and no state inside the subtree changed. Pairs with `use_callback` so
/// handler props keep referential identity.
pub fn memo<P, F>(name: &'static str, props: P, f: F) -> VNode
where
    P: PartialEq + 'static,
    F: Fn(&P) -> VNode + 'static,
{
    let node = component(name, props, f);
    match node {
        VNode::Component(mut cn) => {
            cn.props_eq = Some(Rc::new(|a: &dyn Any, b: &dyn Any| {
                match (a.downcast_ref::<P>(), b.downcast_ref::<P>()) {
                    (Some(a), Some(b)) => a == b,
                    _ => false,
                }
            }));
            VNode::Component(cn)
        }
        other => other,
    }
}

impl VNode {
    /// Attaches an explicit key, distinguishing list siblings of the same
    /// component type.
    pub fn keyed(self, key: impl Into<String>) -> VNode {
        match self {
            VNode::Component(mut cn) => {
                cn.key = Some(key.into());
                VNode::Component(cn)
            }
            other => {
                log::warn!("keyed() on a non-component node has no effect");
                other
            }
        }
    }
}

pub fn portal(target: impl Into<String>, child: impl Into<VNode>) -> VNode {
    VNode::Portal {
        target: target.into(),
        child: Box::new(child.into()),
    }
}

/// The realized tree: components, providers and boundaries expanded away.
/// This is what the renderer diffs and the host materializes.
#[derive(Clone)]
pub enum RNode {
    Nothing,
    Text(String),
    Element {
        tag: String,
        attrs: AttrList,
        handlers: Vec<(String, Handler)>,
        node_ref: Option<NodeRef>,
        children: Vec<RNode>,
    },
}

impl RNode {
    pub fn is_element(&self) -> bool {
        matches!(self, RNode::Element { .. })
    }
}
