//! Traversals over the dependency subgraph.
//!
//! Only `Dependency` edges take part; `Complements` edges are informational
//! and may form cycles freely.
//!
//! - Cycle pre-check for a prospective edge (BFS reachability)
//! - Transitive dependency / dependent trees (BFS with depth)
//! - Schedule order (topological sort)
//! - Cycle report (strongly connected components)

use super::{Link, LinkGraph};
use crate::domain::{ItemId, TreeEntry};
use petgraph::algo;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{HashSet, VecDeque};

/// Would adding the dependency edge `source -> target` close a cycle?
///
/// A cycle results iff `source` is already reachable from `target` through
/// dependency edges. BFS from `target`; the visited set guarantees
/// termination even if the existing graph already contains a cycle.
///
/// `source == target` is always reported as a cycle. Unknown items have no
/// edges, so they can only be part of a cycle through that self-loop case.
#[must_use]
pub fn would_create_cycle(links: &LinkGraph, source: &ItemId, target: &ItemId) -> bool {
    if source == target {
        return true;
    }
    let (Some(goal), Some(start)) = (links.node_index(source), links.node_index(target)) else {
        return false;
    };

    let graph = links.graph();
    let mut visited = HashSet::new();
    let mut queue = VecDeque::from([start]);

    while let Some(current) = queue.pop_front() {
        if current == goal {
            return true;
        }
        if !visited.insert(current) {
            continue;
        }
        queue.extend(dependency_neighbors(graph, current, Direction::Outgoing));
    }

    false
}

/// Every item `root` transitively depends on, with BFS depth.
///
/// Each item appears once, at the depth it was first reached. An unknown
/// root yields an empty result.
#[must_use]
pub fn dependency_tree(links: &LinkGraph, root: &ItemId, max_depth: Option<usize>) -> Vec<TreeEntry> {
    bfs_tree(links, root, max_depth, Direction::Outgoing)
}

/// Every item that transitively depends on `root`, with BFS depth.
#[must_use]
pub fn dependents_tree(links: &LinkGraph, root: &ItemId, max_depth: Option<usize>) -> Vec<TreeEntry> {
    bfs_tree(links, root, max_depth, Direction::Incoming)
}

/// Order items so that each appears after everything it depends on.
///
/// # Errors
///
/// Returns the dependency cycles if the subgraph is not acyclic.
pub fn schedule_order(links: &LinkGraph) -> Result<Vec<ItemId>, Vec<Vec<ItemId>>> {
    let dependencies = dependency_subgraph(links);
    match algo::toposort(&dependencies, None) {
        // Edges run dependent -> dependency, so reverse to put dependencies first.
        Ok(sorted) => Ok(sorted
            .into_iter()
            .rev()
            .map(|node| dependencies[node].clone())
            .collect()),
        Err(_) => Err(dependency_cycles(links)),
    }
}

/// Groups of items that form dependency cycles.
///
/// Each group is sorted by id and the groups are sorted by their first
/// member, so output is deterministic.
#[must_use]
pub fn dependency_cycles(links: &LinkGraph) -> Vec<Vec<ItemId>> {
    let dependencies = dependency_subgraph(links);
    let mut cycles: Vec<Vec<ItemId>> = algo::tarjan_scc(&dependencies)
        .into_iter()
        .filter(|component| component.len() > 1)
        .map(|component| {
            let mut ids: Vec<ItemId> = component
                .into_iter()
                .map(|node| dependencies[node].clone())
                .collect();
            ids.sort();
            ids
        })
        .collect();
    cycles.sort();
    cycles
}

fn bfs_tree(
    links: &LinkGraph,
    root: &ItemId,
    max_depth: Option<usize>,
    direction: Direction,
) -> Vec<TreeEntry> {
    let Some(start) = links.node_index(root) else {
        return Vec::new();
    };

    let graph = links.graph();
    let mut result = Vec::new();
    let mut visited = HashSet::from([start]);
    let mut queue: VecDeque<(NodeIndex, usize)> = VecDeque::from([(start, 0)]);

    while let Some((current, depth)) = queue.pop_front() {
        if max_depth.is_some_and(|max| depth >= max) {
            continue;
        }

        for next in dependency_neighbors(graph, current, direction) {
            if visited.insert(next) {
                result.push(TreeEntry {
                    item_id: graph[next].clone(),
                    parent: graph[current].clone(),
                    depth: depth + 1,
                });
                queue.push_back((next, depth + 1));
            }
        }
    }

    result
}

/// Neighbours across dependency edges, in stored order.
fn dependency_neighbors(
    graph: &StableDiGraph<ItemId, Link>,
    node: NodeIndex,
    direction: Direction,
) -> Vec<NodeIndex> {
    let mut edges: Vec<_> = graph
        .edges_directed(node, direction)
        .filter(|edge| edge.weight().relationship_type.is_blocking())
        .map(|edge| {
            let other = match direction {
                Direction::Outgoing => edge.target(),
                Direction::Incoming => edge.source(),
            };
            (edge.weight().created_at, edge.weight().seq, other)
        })
        .collect();
    edges.sort_unstable();
    edges.into_iter().map(|(_, _, other)| other).collect()
}

/// Copy of the graph holding only dependency edges.
fn dependency_subgraph(links: &LinkGraph) -> StableDiGraph<ItemId, ()> {
    links.graph().filter_map(
        |_, id| Some(id.clone()),
        |_, link| link.relationship_type.is_blocking().then_some(()),
    )
}
