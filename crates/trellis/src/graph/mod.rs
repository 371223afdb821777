//! Authoritative edge store for timeline item links.
//!
//! Every link is stored exactly once, as an edge of a petgraph
//! `StableDiGraph`, and addressed by its stable `EdgeIndex`. The two
//! `LinkRecord`s an application sees per link (outgoing on the source,
//! incoming on the target) are projections of that single edge, so the
//! bidirectional records can never disagree.
//!
//! # Edge Direction Convention
//!
//! Edges point from **dependent to dependency**: for a dependency link
//! `A -> B`, item A depends on item B. Complements links use the same
//! direction for bookkeeping but carry no ordering meaning.
//!
//! # Stored Order
//!
//! petgraph iterates adjacency lists in reverse insertion order, so each
//! edge carries its creation timestamp and a sequence number; queries sort
//! by `(created_at, seq)` to report links in the order they were made.

pub mod traversal;

use crate::domain::{ItemId, LinkRecord, LinkStats, RelationshipType};
use chrono::{DateTime, Utc};
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;

/// Edge payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    /// Kind of relationship
    pub relationship_type: RelationshipType,

    /// When the link was created
    pub created_at: DateTime<Utc>,

    /// Insertion counter, breaks ties between equal timestamps
    seq: u64,
}

/// Borrowed view of one edge with both endpoints resolved.
#[derive(Debug, Clone, Copy)]
pub struct Edge<'a> {
    /// Dependent side
    pub source: &'a ItemId,

    /// Dependency side
    pub target: &'a ItemId,

    /// Edge payload
    pub link: &'a Link,
}

impl Edge<'_> {
    /// The record stored on the source item.
    #[must_use]
    pub fn outgoing_record(&self) -> LinkRecord {
        LinkRecord::Outgoing {
            target_id: self.target.clone(),
            relationship_type: self.link.relationship_type,
            created_at: self.link.created_at,
        }
    }

    /// The record stored on the target item.
    #[must_use]
    pub fn incoming_record(&self) -> LinkRecord {
        LinkRecord::Incoming {
            source_id: self.source.clone(),
            relationship_type: self.link.relationship_type,
            created_at: self.link.created_at,
        }
    }

    fn order_key(&self) -> (DateTime<Utc>, u64) {
        (self.link.created_at, self.link.seq)
    }
}

/// Directed, typed link graph over the items of one feature.
///
/// Nodes hold `ItemId`s; `node_map` gives O(1) id lookup. At most one edge
/// exists per ordered `(source, target)` pair regardless of relationship
/// type, and self-loops are never stored.
#[derive(Debug, Clone, Default)]
pub struct LinkGraph {
    graph: StableDiGraph<ItemId, Link>,
    node_map: HashMap<ItemId, NodeIndex>,
    next_seq: u64,
}

impl LinkGraph {
    /// Create an empty graph
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of items tracked
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of links stored (each link counted once)
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Whether the item is a node of this graph
    #[must_use]
    pub fn contains(&self, id: &ItemId) -> bool {
        self.node_map.contains_key(id)
    }

    /// Add an item node. Returns `false` if it was already present.
    pub fn add_node(&mut self, id: ItemId) -> bool {
        if self.node_map.contains_key(&id) {
            return false;
        }
        let node = self.graph.add_node(id.clone());
        self.node_map.insert(id, node);
        true
    }

    /// Remove an item node together with every incident link.
    ///
    /// Returns the number of links dropped, or `None` if the item was unknown.
    pub fn remove_node(&mut self, id: &ItemId) -> Option<usize> {
        let node = self.node_map.remove(id)?;
        let incident = self.graph.edges_directed(node, Direction::Outgoing).count()
            + self.graph.edges_directed(node, Direction::Incoming).count();
        self.graph.remove_node(node);
        Some(incident)
    }

    /// Look up the link from `source` to `target`, if any.
    #[must_use]
    pub fn find(&self, source: &ItemId, target: &ItemId) -> Option<&Link> {
        let edge = self.find_edge(source, target)?;
        self.graph.edge_weight(edge)
    }

    /// Store a new link.
    ///
    /// Returns `None` without modifying the graph if either endpoint is
    /// unknown, the endpoints are equal, or a link between them already
    /// exists in this direction.
    pub fn insert(
        &mut self,
        source: &ItemId,
        target: &ItemId,
        relationship_type: RelationshipType,
        created_at: DateTime<Utc>,
    ) -> Option<EdgeIndex> {
        if source == target {
            return None;
        }
        let from = *self.node_map.get(source)?;
        let to = *self.node_map.get(target)?;
        if self.graph.find_edge(from, to).is_some() {
            return None;
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        Some(self.graph.add_edge(
            from,
            to,
            Link {
                relationship_type,
                created_at,
                seq,
            },
        ))
    }

    /// Remove the link from `source` to `target`, returning its payload.
    pub fn remove(&mut self, source: &ItemId, target: &ItemId) -> Option<Link> {
        let edge = self.find_edge(source, target)?;
        self.graph.remove_edge(edge)
    }

    /// Change the relationship type of an existing link, returning the old one.
    pub fn retype(
        &mut self,
        source: &ItemId,
        target: &ItemId,
        relationship_type: RelationshipType,
    ) -> Option<RelationshipType> {
        let edge = self.find_edge(source, target)?;
        let link = self.graph.edge_weight_mut(edge)?;
        Some(std::mem::replace(
            &mut link.relationship_type,
            relationship_type,
        ))
    }

    /// Links leaving `id`, in stored order. Empty for unknown items.
    #[must_use]
    pub fn outgoing(&self, id: &ItemId) -> Vec<Edge<'_>> {
        self.directed(id, Direction::Outgoing)
    }

    /// Links arriving at `id`, in stored order. Empty for unknown items.
    #[must_use]
    pub fn incoming(&self, id: &ItemId) -> Vec<Edge<'_>> {
        self.directed(id, Direction::Incoming)
    }

    /// The derived `linkedItems` sequence of an item.
    ///
    /// Outgoing and incoming records interleaved in stored order.
    #[must_use]
    pub fn linked_items(&self, id: &ItemId) -> Vec<LinkRecord> {
        let mut records: Vec<(Edge<'_>, bool)> = self
            .outgoing(id)
            .into_iter()
            .map(|edge| (edge, true))
            .chain(self.incoming(id).into_iter().map(|edge| (edge, false)))
            .collect();
        records.sort_by_key(|(edge, _)| edge.order_key());
        records
            .into_iter()
            .map(|(edge, outgoing)| {
                if outgoing {
                    edge.outgoing_record()
                } else {
                    edge.incoming_record()
                }
            })
            .collect()
    }

    /// Count links, each once, split by relationship type.
    #[must_use]
    pub fn stats(&self) -> LinkStats {
        let mut stats = LinkStats::default();
        for edge in self.graph.edge_indices() {
            let link = &self.graph[edge];
            stats.total += 1;
            stats.by_type.record(link.relationship_type);
        }
        stats
    }

    pub(crate) fn node_index(&self, id: &ItemId) -> Option<NodeIndex> {
        self.node_map.get(id).copied()
    }

    pub(crate) fn graph(&self) -> &StableDiGraph<ItemId, Link> {
        &self.graph
    }

    fn find_edge(&self, source: &ItemId, target: &ItemId) -> Option<EdgeIndex> {
        let from = self.node_map.get(source)?;
        let to = self.node_map.get(target)?;
        self.graph.find_edge(*from, *to)
    }

    fn directed(&self, id: &ItemId, direction: Direction) -> Vec<Edge<'_>> {
        let Some(&node) = self.node_map.get(id) else {
            return Vec::new();
        };
        let mut edges: Vec<Edge<'_>> = self
            .graph
            .edges_directed(node, direction)
            .map(|edge| self.view(edge.source(), edge.target(), edge.weight()))
            .collect();
        edges.sort_by_key(Edge::order_key);
        edges
    }

    fn view<'a>(&'a self, source: NodeIndex, target: NodeIndex, link: &'a Link) -> Edge<'a> {
        Edge {
            source: &self.graph[source],
            target: &self.graph[target],
            link,
        }
    }
}
