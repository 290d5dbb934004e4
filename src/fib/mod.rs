// MdvrSim: Mobile Distance-Vector Routing Simulator written in Rust
// Copyright 2024 The MdvrSim Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Multi-metric forwarding-table computation.
//!
//! Every recomputation produces two independent tables from the router's RIB: a *low-loss*
//! table (shortest path by accumulated loss) and a *high-bandwidth* table (widest path by
//! bottleneck bandwidth). Computation proceeds in three steps:
//!
//! 1. **Interface compression**: for every neighbor recorded in the RIB, pick the single best
//!    interface towards it (minimum loss, respectively maximum bandwidth). Ties go to the
//!    interface that appears first in the router's interface sequence.
//! 2. **Graph assembly**: merge the neighbors' advertised tables into a fresh undirected
//!    metric graph, skipping any destination equal to the local router and any advertised
//!    path that runs through it.
//! 3. **Path selection**: Dijkstra over the loss graph, and a max-min variant of the same
//!    algorithm over the bandwidth graph. Remote routes are only installed when the selected
//!    path is strictly longer than a direct hop; unreachable destinations are simply absent.
//!
//! Given identical RIB state, both tables are bit-identical across runs.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};

use ipnet::Ipv4Net;
use ordered_float::NotNan;
use petgraph::prelude::UnGraphMap;
use serde::{Deserialize, Serialize};

use crate::router::Router;
use crate::types::{PathType, RouterId, Tos};

#[cfg(test)]
mod test;

/// One weighted hop along an advertised path. The weight is the compressed metric of the
/// link, in the unit of the table the entry belongs to (loss percent or bandwidth).
#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize)]
pub struct RouteLink {
    /// One endpoint of the link.
    pub a: RouterId,
    /// The other endpoint.
    pub b: RouterId,
    /// Metric value of the link.
    pub weight: NotNan<f64>,
}

/// A single forwarding entry towards one destination.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FibEntry {
    /// The direct neighbor that the packet is handed to.
    pub next_hop: RouterId,
    /// The interface over which the next hop was learned.
    pub interface: PathType,
    /// The selected path, destination first, owning router last.
    pub full_path: Vec<RouterId>,
    /// Networks advertised by the destination.
    pub networks: Vec<Ipv4Net>,
    /// Per-hop weights along `full_path`. Receivers of an advertised entry use these to
    /// rebuild the metric graph.
    pub links: Vec<RouteLink>,
}

/// Forwarding table of one metric, keyed by destination router.
pub type FibTable = BTreeMap<RouterId, FibEntry>;

/// The two independent forwarding tables of a router.
#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fib {
    /// Routes selected by accumulated loss.
    pub low_loss: FibTable,
    /// Routes selected by bottleneck bandwidth.
    pub high_bandwidth: FibTable,
}

impl Fib {
    /// Get the table that serves the given type-of-service.
    pub fn table(&self, tos: Tos) -> &FibTable {
        match tos {
            Tos::LowLoss => &self.low_loss,
            Tos::HighBandwidth => &self.high_bandwidth,
        }
    }

    /// Returns `true` if neither table contains any route.
    pub fn is_empty(&self) -> bool {
        self.low_loss.is_empty() && self.high_bandwidth.is_empty()
    }
}

/// Fresh adjacency structure built on every recomputation.
type MetricGraph = UnGraphMap<RouterId, NotNan<f64>>;

/// Shortest-path tree: per reached node, the distance label and the predecessor.
type PathTree = BTreeMap<RouterId, (NotNan<f64>, RouterId)>;

fn metric_weight(w: u32) -> NotNan<f64> {
    NotNan::new(f64::from(w)).expect("u32 metrics are finite")
}

/// Recompute both forwarding tables from the router's current RIB.
pub(crate) fn compute(router: &Router) -> Fib {
    Fib {
        low_loss: compute_table(router, Tos::LowLoss),
        high_bandwidth: compute_table(router, Tos::HighBandwidth),
    }
}

/// The result of interface compression towards one neighbor.
struct Compressed {
    path_type: PathType,
    metric: u32,
    networks: Vec<Ipv4Net>,
}

fn compute_table(router: &Router, tos: Tos) -> FibTable {
    let own_id = router.router_id();
    let mut table = FibTable::new();

    // Step A: direct entries from interface compression.
    let compressed = compress_interfaces(router, tos);
    for (neighbor, choice) in &compressed {
        let weight = metric_weight(choice.metric);
        table.insert(
            *neighbor,
            FibEntry {
                next_hop: *neighbor,
                interface: choice.path_type.clone(),
                full_path: vec![*neighbor, own_id],
                networks: choice.networks.clone(),
                links: vec![RouteLink {
                    a: own_id,
                    b: *neighbor,
                    weight,
                }],
            },
        );
    }

    // Step B: assemble the metric graph from the compressed direct links and every link
    // reported by a neighbor, excluding paths that run through the local router.
    let mut graph = MetricGraph::new();
    for (neighbor, choice) in &compressed {
        graph.add_edge(own_id, *neighbor, metric_weight(choice.metric));
    }
    let mut remote: BTreeMap<RouterId, Vec<Ipv4Net>> = BTreeMap::new();
    for (_, _, entry) in router.rib_entries() {
        for (dest, adv) in entry.packet.routing_paths.table(tos) {
            if *dest == own_id {
                continue;
            }
            if adv.full_path.contains(&own_id) {
                log::trace!(
                    "{}: advertised path to {:?} runs through us, skipping",
                    own_id.index(),
                    dest
                );
                continue;
            }
            for link in &adv.links {
                graph.add_edge(link.a, link.b, link.weight);
            }
            remote.entry(*dest).or_insert_with(|| adv.networks.clone());
        }
    }

    // Step C: per-metric path selection for every remote destination.
    let tree = match tos {
        Tos::LowLoss => shortest_paths(&graph, own_id),
        Tos::HighBandwidth => widest_paths(&graph, own_id),
    };
    for (dest, networks) in remote {
        let Some(full_path) = extract_path(&tree, own_id, dest) else {
            continue;
        };
        if full_path.len() <= 2 {
            // a direct hop is already installed by Step A
            continue;
        }
        let next_hop = full_path[full_path.len() - 2];
        let Some(choice) = compressed.get(&next_hop) else {
            continue;
        };
        let links = full_path
            .windows(2)
            .filter_map(|pair| {
                graph.edge_weight(pair[0], pair[1]).map(|weight| RouteLink {
                    a: pair[0],
                    b: pair[1],
                    weight: *weight,
                })
            })
            .collect();
        table.insert(
            dest,
            FibEntry {
                next_hop,
                interface: choice.path_type.clone(),
                full_path,
                networks,
                links,
            },
        );
    }

    table
}

/// Step A: pick the best interface towards every neighbor present in the RIB. The outer loop
/// follows the router's interface sequence, so ties keep the first-encountered interface.
fn compress_interfaces(router: &Router, tos: Tos) -> BTreeMap<RouterId, Compressed> {
    let mut best: BTreeMap<RouterId, Compressed> = BTreeMap::new();
    for ifs in router.interfaces() {
        let Some(entries) = router.rib().get(&ifs.profile.path_type) else {
            continue;
        };
        for (neighbor, entry) in entries {
            let metric = match tos {
                Tos::LowLoss => ifs.profile.loss,
                Tos::HighBandwidth => ifs.profile.bandwidth,
            };
            match best.get_mut(neighbor) {
                None => {
                    best.insert(
                        *neighbor,
                        Compressed {
                            path_type: ifs.profile.path_type.clone(),
                            metric,
                            networks: entry.packet.networks.clone(),
                        },
                    );
                }
                Some(current) => {
                    let better = match tos {
                        Tos::LowLoss => metric < current.metric,
                        Tos::HighBandwidth => metric > current.metric,
                    };
                    if better {
                        current.path_type = ifs.profile.path_type.clone();
                        current.metric = metric;
                        current.networks = entry.packet.networks.clone();
                    }
                }
            }
        }
    }
    best
}

// heap entries explore the cheapest (respectively widest) candidate first; ties are broken
// by node and parent index so that the traversal order is a pure function of the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HeapEntry {
    weight: NotNan<f64>,
    node: RouterId,
    parent: RouterId,
}

impl HeapEntry {
    fn tie_break(&self, other: &Self) -> Ordering {
        other
            .node
            .index()
            .cmp(&self.node.index())
            .then_with(|| other.parent.index().cmp(&self.parent.index()))
    }
}

/// Orders a max-heap as a min-heap over the weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MinWeight(HeapEntry);

impl PartialOrd for MinWeight {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MinWeight {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .0
            .weight
            .cmp(&self.0.weight)
            .then_with(|| self.0.tie_break(&other.0))
    }
}

/// Orders a max-heap by the largest weight first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MaxWeight(HeapEntry);

impl PartialOrd for MaxWeight {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MaxWeight {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .weight
            .cmp(&other.0.weight)
            .then_with(|| self.0.tie_break(&other.0))
    }
}

/// Dijkstra from `source`, minimizing the sum of edge weights. The first settled label wins;
/// together with the deterministic heap order this makes the tree a pure function of the
/// graph.
fn shortest_paths(graph: &MetricGraph, source: RouterId) -> PathTree {
    let zero = NotNan::new(0.0).expect("zero is not NaN");
    let mut tree = PathTree::new();
    let mut heap = BinaryHeap::new();
    heap.push(MinWeight(HeapEntry {
        weight: zero,
        node: source,
        parent: source,
    }));
    while let Some(MinWeight(HeapEntry {
        weight,
        node,
        parent,
    })) = heap.pop()
    {
        if tree.contains_key(&node) {
            continue;
        }
        tree.insert(node, (weight, parent));
        for (a, b, w) in graph.edges(node) {
            let next = if a == node { b } else { a };
            if !tree.contains_key(&next) {
                heap.push(MinWeight(HeapEntry {
                    weight: weight + *w,
                    node: next,
                    parent: node,
                }));
            }
        }
    }
    tree
}

/// Widest-path variant: maximize the minimum edge weight along the path. Same settling
/// scheme as [`shortest_paths`], with the label of the source being unbounded.
fn widest_paths(graph: &MetricGraph, source: RouterId) -> PathTree {
    let unbounded = NotNan::new(f64::INFINITY).expect("infinity is not NaN");
    let mut tree = PathTree::new();
    let mut heap = BinaryHeap::new();
    heap.push(MaxWeight(HeapEntry {
        weight: unbounded,
        node: source,
        parent: source,
    }));
    while let Some(MaxWeight(HeapEntry {
        weight,
        node,
        parent,
    })) = heap.pop()
    {
        if tree.contains_key(&node) {
            continue;
        }
        tree.insert(node, (weight, parent));
        for (a, b, w) in graph.edges(node) {
            let next = if a == node { b } else { a };
            if !tree.contains_key(&next) {
                heap.push(MaxWeight(HeapEntry {
                    weight: weight.min(*w),
                    node: next,
                    parent: node,
                }));
            }
        }
    }
    tree
}

/// Walk the predecessor chain from `dest` back to `source`. The returned path starts at the
/// destination and ends at the source, matching the `full_path` convention. `None` if the
/// destination was not reached.
fn extract_path(tree: &PathTree, source: RouterId, dest: RouterId) -> Option<Vec<RouterId>> {
    let mut path = vec![dest];
    let mut current = dest;
    while current != source {
        let (_, parent) = tree.get(&current)?;
        path.push(*parent);
        current = *parent;
    }
    Some(path)
}
