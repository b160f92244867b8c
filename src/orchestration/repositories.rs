// Copyright (c) 2024 Mike Tsao

use super::PatchBayError;
use crate::prelude::*;
use anyhow::{anyhow, Result};
use delegate::delegate;
use rustc_hash::FxHashMap;

/// The registry of live [Node]s. Iteration follows insertion order, which is
/// also the tie-break order for every topology decision.
#[derive(Debug, Default)]
pub struct NodeRepository {
    uid_factory: UidFactory<Uid>,
    nodes: FxHashMap<Uid, Node>,
    uids: Vec<Uid>,
}
impl NodeRepository {
    delegate! {
        to self.uid_factory {
            #[call(mint_next)]
            /// Creates a new [Uid].
            pub fn mint_node_uid(&self) -> Uid;
        }
    }

    /// Adds the node and appends its uid to the ordered list.
    pub fn add_node(&mut self, node: Node) -> Result<Uid> {
        let uid = node.uid();
        if self.nodes.contains_key(&uid) {
            return Err(anyhow!("Node {uid} already exists"));
        }
        self.uid_factory.notify_externally_minted_uid(uid);
        self.nodes.insert(uid, node);
        self.uids.push(uid);
        Ok(uid)
    }

    /// Removes an existing [Node] and returns ownership to the caller.
    pub fn remove_node(&mut self, uid: Uid) -> Result<Node> {
        self.uids.retain(|u| *u != uid);
        self.nodes
            .remove(&uid)
            .ok_or_else(|| PatchBayError::UnknownNode(uid).into())
    }

    #[allow(missing_docs)]
    pub fn node(&self, uid: Uid) -> Option<&Node> {
        self.nodes.get(&uid)
    }

    #[allow(missing_docs)]
    pub fn node_mut(&mut self, uid: Uid) -> Option<&mut Node> {
        self.nodes.get_mut(&uid)
    }

    #[allow(missing_docs)]
    pub fn contains(&self, uid: Uid) -> bool {
        self.nodes.contains_key(&uid)
    }

    /// Every live uid in insertion order.
    pub fn uids(&self) -> &[Uid] {
        &self.uids
    }

    /// Every live node in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.uids.iter().filter_map(|uid| self.nodes.get(uid))
    }

    /// The uids of nodes that satisfy `f`, in insertion order.
    pub fn uids_where(&self, f: impl Fn(&Node) -> bool) -> Vec<Uid> {
        self.iter().filter(|n| f(n)).map(|n| n.uid()).collect()
    }

    /// The root of the routing graph, if one has been added.
    pub fn master(&self) -> Option<Uid> {
        self.iter()
            .find(|n| n.kind() == NodeKind::Master)
            .map(|n| n.uid())
    }

    #[allow(missing_docs)]
    pub fn len(&self) -> usize {
        self.uids.len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.uids.is_empty()
    }
}
