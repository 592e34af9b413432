//! Arena-backed stylesheet tree.
//!
//! Nodes are allocated in a dense arena and addressed by [`NodeId`]. Removal
//! detaches a node from its parent; the slot stays allocated so ids held by
//! callers never alias a different node.

use crate::error::CssError;
use crate::node::{CssNode, NodeKind};
use breeze_common::SourceLocation;
use serde::{Deserialize, Serialize};

/// Opaque, copyable id of a node inside a [`CssTree`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    /// Creates an id from a raw `u32` index.
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw `u32` index.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    source: Option<SourceLocation>,
    detached: bool,
}

/// How copied nodes obtain their source location.
#[derive(Clone, Copy)]
enum SourcePolicy {
    /// Keep each fragment node's own location.
    Keep,
    /// Stamp every copied node with one location.
    Stamp(Option<SourceLocation>),
}

/// A mutable stylesheet or multi-root document.
#[derive(Debug, Clone)]
pub struct CssTree {
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl CssTree {
    /// Creates a tree whose top node is an empty [`NodeKind::Root`].
    pub fn new() -> Self {
        Self::with_top(NodeKind::Root)
    }

    /// Creates a tree whose top node is an empty [`NodeKind::Document`].
    pub fn new_document() -> Self {
        Self::with_top(NodeKind::Document)
    }

    fn with_top(kind: NodeKind) -> Self {
        Self {
            nodes: vec![NodeData {
                kind,
                parent: None,
                children: Vec::new(),
                source: None,
                detached: false,
            }],
            root: NodeId(0),
        }
    }

    /// Returns the top node of the tree.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns `true` if the top node is a multi-root document.
    pub fn is_document(&self) -> bool {
        matches!(self.nodes[self.root.0 as usize].kind, NodeKind::Document)
    }

    /// Returns the kind of a node.
    pub fn kind(&self, id: NodeId) -> Result<&NodeKind, CssError> {
        Ok(&self.data(id)?.kind)
    }

    /// Returns the source location of a node.
    pub fn source(&self, id: NodeId) -> Result<Option<SourceLocation>, CssError> {
        Ok(self.data(id)?.source)
    }

    /// Sets the source location of a node.
    pub fn set_source(
        &mut self,
        id: NodeId,
        source: Option<SourceLocation>,
    ) -> Result<(), CssError> {
        self.data_mut(id)?.source = source;
        Ok(())
    }

    /// Returns the parent of a node (`None` for the top node).
    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>, CssError> {
        Ok(self.data(id)?.parent)
    }

    /// Returns the children of a node in order.
    pub fn children(&self, id: NodeId) -> Result<&[NodeId], CssError> {
        Ok(&self.data(id)?.children)
    }

    /// Returns `true` if the node is still reachable from the top node.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            match self.nodes.get(current.0 as usize) {
                Some(data) if !data.detached => match data.parent {
                    Some(parent) => current = parent,
                    None => return current == self.root,
                },
                _ => return false,
            }
        }
    }

    /// Returns `true` if `node` is `ancestor` or lies somewhere below it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(id.0 as usize).and_then(|d| d.parent);
        }
        false
    }

    /// Returns every attached node below `id` (excluding `id`) in document order.
    pub fn descendants(&self, id: NodeId) -> Result<Vec<NodeId>, CssError> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.data(id)?.children.iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.nodes[next.0 as usize].children.iter().rev().copied());
        }
        Ok(out)
    }

    /// Returns all at-rules named `name` in document order.
    ///
    /// The result is a snapshot, so the tree may be edited while iterating it.
    pub fn walk_at_rules(&self, name: &str) -> Vec<NodeId> {
        self.descendants(self.root)
            .unwrap_or_default()
            .into_iter()
            .filter(|id| {
                matches!(&self.nodes[id.0 as usize].kind,
                    NodeKind::AtRule { name: n, .. } if n == name)
            })
            .collect()
    }

    /// Appends a copy of `fragment` as the last child of `parent`.
    ///
    /// Copied nodes keep the locations recorded in the fragment.
    pub fn append(&mut self, parent: NodeId, fragment: &CssNode) -> Result<NodeId, CssError> {
        self.ensure_container(parent)?;
        let id = self.copy_in(fragment, parent, SourcePolicy::Keep);
        self.nodes[parent.0 as usize].children.push(id);
        Ok(id)
    }

    /// Appends copies of `fragments` to `parent`, stamping every copied node
    /// (descendants included) with `source`.
    pub fn append_copies<'a>(
        &mut self,
        parent: NodeId,
        fragments: impl IntoIterator<Item = &'a CssNode>,
        source: Option<SourceLocation>,
    ) -> Result<Vec<NodeId>, CssError> {
        self.ensure_container(parent)?;
        let mut ids = Vec::new();
        for fragment in fragments {
            let id = self.copy_in(fragment, parent, SourcePolicy::Stamp(source));
            self.nodes[parent.0 as usize].children.push(id);
            ids.push(id);
        }
        Ok(ids)
    }

    /// Inserts copies of `fragments` immediately before `target`, in order,
    /// stamping every copied node (descendants included) with `source`.
    pub fn insert_copies_before<'a>(
        &mut self,
        target: NodeId,
        fragments: impl IntoIterator<Item = &'a CssNode>,
        source: Option<SourceLocation>,
    ) -> Result<Vec<NodeId>, CssError> {
        let parent = self.data(target)?.parent.ok_or(CssError::NoParent(target))?;
        let mut ids = Vec::new();
        for fragment in fragments {
            ids.push(self.copy_in(fragment, parent, SourcePolicy::Stamp(source)));
        }
        let siblings = &mut self.nodes[parent.0 as usize].children;
        let index = siblings
            .iter()
            .position(|&c| c == target)
            .ok_or(CssError::Detached(target))?;
        siblings.splice(index..index, ids.iter().copied());
        Ok(ids)
    }

    /// Detaches a node (and its subtree) from the tree.
    pub fn remove(&mut self, id: NodeId) -> Result<(), CssError> {
        let parent = self.data(id)?.parent.ok_or(CssError::NoParent(id))?;
        self.nodes[parent.0 as usize].children.retain(|&c| c != id);
        let data = &mut self.nodes[id.0 as usize];
        data.detached = true;
        data.parent = None;
        Ok(())
    }

    /// Copies a node and its subtree back out into a detached [`CssNode`].
    pub fn to_fragment(&self, id: NodeId) -> Result<CssNode, CssError> {
        let data = self.data(id)?;
        let children = data
            .children
            .iter()
            .map(|&c| self.to_fragment(c))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CssNode {
            kind: data.kind.clone(),
            children,
            source: data.source,
        })
    }

    fn copy_in(&mut self, fragment: &CssNode, parent: NodeId, policy: SourcePolicy) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let source = match policy {
            SourcePolicy::Keep => fragment.source,
            SourcePolicy::Stamp(source) => source,
        };
        self.nodes.push(NodeData {
            kind: fragment.kind.clone(),
            parent: Some(parent),
            children: Vec::with_capacity(fragment.children.len()),
            source,
            detached: false,
        });
        for child in &fragment.children {
            let child_id = self.copy_in(child, id, policy);
            self.nodes[id.0 as usize].children.push(child_id);
        }
        id
    }

    fn ensure_container(&mut self, id: NodeId) -> Result<(), CssError> {
        let data = self.data_mut(id)?;
        match &mut data.kind {
            NodeKind::AtRule { block, .. } => {
                *block = true;
                Ok(())
            }
            kind if kind.is_container() => Ok(()),
            _ => Err(CssError::NotAContainer(id)),
        }
    }

    fn data(&self, id: NodeId) -> Result<&NodeData, CssError> {
        let data = self
            .nodes
            .get(id.0 as usize)
            .ok_or(CssError::UnknownNode(id))?;
        if data.detached {
            return Err(CssError::Detached(id));
        }
        Ok(data)
    }

    fn data_mut(&mut self, id: NodeId) -> Result<&mut NodeData, CssError> {
        let data = self
            .nodes
            .get_mut(id.0 as usize)
            .ok_or(CssError::UnknownNode(id))?;
        if data.detached {
            return Err(CssError::Detached(id));
        }
        Ok(data)
    }
}

impl Default for CssTree {
    fn default() -> Self {
        Self::new()
    }
}
