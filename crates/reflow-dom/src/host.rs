//! The abstract output medium the renderer mutates.

use reflow_core::{Handler, HostId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("unknown node {0}")]
    UnknownNode(HostId),
    #[error("node {0} is not an element")]
    NotAnElement(HostId),
    #[error("child index {index} out of bounds for node {parent}")]
    BadIndex { parent: HostId, index: usize },
    #[error("patch path does not resolve: {0}")]
    BadPath(String),
}

/// Mutable tree of output nodes. Each named root is an independent mount
/// point; portals commit into roots other than the main one.
pub trait Host {
    /// Returns the mount root named `target`, creating it if needed.
    fn root(&mut self, target: &str) -> HostId;

    fn create_text(&mut self, text: &str) -> HostId;
    fn create_element(&mut self, tag: &str) -> HostId;
    /// Zero-size stand-in keeping sibling indices stable.
    fn create_placeholder(&mut self) -> HostId;

    fn set_text(&mut self, node: HostId, text: &str) -> Result<(), HostError>;
    fn set_attr(&mut self, node: HostId, name: &str, value: &str) -> Result<(), HostError>;
    fn remove_attr(&mut self, node: HostId, name: &str) -> Result<(), HostError>;
    /// Replaces the node's event handler set.
    fn set_handlers(&mut self, node: HostId, handlers: Vec<(String, Handler)>)
    -> Result<(), HostError>;

    fn insert_child(&mut self, parent: HostId, index: usize, child: HostId)
    -> Result<(), HostError>;
    /// Removes the child and drops its whole subtree.
    fn remove_child(&mut self, parent: HostId, index: usize) -> Result<(), HostError>;

    fn child(&self, parent: HostId, index: usize) -> Option<HostId>;
    fn child_count(&self, parent: HostId) -> usize;
    fn handler(&self, node: HostId, event: &str) -> Option<Handler>;

    fn focus(&mut self, node: HostId) -> Result<(), HostError>;
}
