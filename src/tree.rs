//! The dispatch tree: shared in-memory state, exclusively owned by the work
//! loop coroutine.
//!
//! The tree is moved into the loop coroutine at
//! [`WorkLoop::spawn`](crate::work::WorkLoop::spawn); after that the only
//! way to read or mutate it is the `&mut DispatchTree` handle passed to
//! serialized handler closures running inside the loop. Request coroutines
//! never hold a reference to it.

use crate::error::ControllerError;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;

/// Id of the fixed root node.
pub const ROOT_NODE_ID: u64 = 0;

/// One node of the dispatch tree.
#[derive(Debug, Clone, Serialize)]
pub struct TreeNode {
    pub id: u64,
    pub name: String,
    /// `None` only for the root node
    pub parent: Option<u64>,
    pub children: Vec<u64>,
    /// Arbitrary JSON payload attached to the node
    pub data: Value,
}

/// A parent/child tree of named nodes with JSON payloads.
///
/// Node ids are allocated sequentially and never reused within a tree's
/// lifetime, so a stale id from a removed subtree can never alias a newer
/// node.
#[derive(Debug)]
pub struct DispatchTree {
    nodes: HashMap<u64, TreeNode>,
    next_id: u64,
}

impl Default for DispatchTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchTree {
    /// Create a tree containing only the root node.
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(
            ROOT_NODE_ID,
            TreeNode {
                id: ROOT_NODE_ID,
                name: "root".to_string(),
                parent: None,
                children: Vec::new(),
                data: Value::Null,
            },
        );
        Self { nodes, next_id: 1 }
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        false // the root always exists
    }

    pub fn get(&self, id: u64) -> Option<&TreeNode> {
        self.nodes.get(&id)
    }

    /// Create a child of `parent` and return its id.
    pub fn create_child(
        &mut self,
        parent: u64,
        name: &str,
        data: Value,
    ) -> Result<u64, ControllerError> {
        if !self.nodes.contains_key(&parent) {
            return Err(ControllerError::not_found(format!("node {parent}")));
        }
        let id = self.next_id;
        self.next_id += 1;
        self.nodes.insert(
            id,
            TreeNode {
                id,
                name: name.to_string(),
                parent: Some(parent),
                children: Vec::new(),
                data,
            },
        );
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.push(id);
        }
        Ok(id)
    }

    /// Replace a node's payload.
    pub fn update_data(&mut self, id: u64, data: Value) -> Result<(), ControllerError> {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.data = data;
                Ok(())
            }
            None => Err(ControllerError::not_found(format!("node {id}"))),
        }
    }

    /// Remove a node and its whole subtree. The root cannot be removed.
    ///
    /// Returns the number of nodes removed.
    pub fn remove(&mut self, id: u64) -> Result<usize, ControllerError> {
        if id == ROOT_NODE_ID {
            return Err(ControllerError::Failed {
                message: "the root node cannot be removed".to_string(),
            });
        }
        let node = self
            .nodes
            .remove(&id)
            .ok_or_else(|| ControllerError::not_found(format!("node {id}")))?;
        if let Some(parent) = node.parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|c| *c != id);
        }
        let mut removed = 1;
        let mut pending = node.children;
        while let Some(child_id) = pending.pop() {
            if let Some(child) = self.nodes.remove(&child_id) {
                removed += 1;
                pending.extend(child.children);
            }
        }
        Ok(removed)
    }

    /// Render a node (with child ids) as JSON.
    pub fn node_json(&self, id: u64) -> Option<Value> {
        self.get(id).map(|node| json!(node))
    }

    /// Summary of the whole tree: node count and the root node.
    pub fn summary_json(&self) -> Value {
        json!({
            "nodes": self.len(),
            "root": self.get(ROOT_NODE_ID),
        })
    }
}
