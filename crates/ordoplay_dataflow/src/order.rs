// SPDX-License-Identifier: MIT OR Apache-2.0
//! Tick order computation.
//!
//! The default strategy is a topological sort (Kahn's algorithm, ties
//! broken by graph order). [`OrderStrategy::LegacyRankWalk`] reproduces the
//! rank walk older authored graphs were tuned against. It only guarantees
//! dependency order for chains: ranks are overwritten by the last visit
//! rather than merged, so nodes reachable along paths of different lengths
//! can be ordered before their dependencies.

use crate::error::GraphError;
use crate::links::Links;
use crate::node::NodeId;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// How the tick order is derived from the links
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrderStrategy {
    /// Dependencies always tick before their dependents
    #[default]
    Topological,
    /// Rank walk kept for compatibility with existing graphs
    LegacyRankWalk,
}

/// Compute the tick order with the given strategy.
///
/// Both strategies reject cyclic links with [`GraphError::CyclicGraph`].
pub fn tick_order(links: &Links, strategy: OrderStrategy) -> Result<Vec<NodeId>, GraphError> {
    let topological = topological_order(links)?;
    Ok(match strategy {
        OrderStrategy::Topological => topological,
        OrderStrategy::LegacyRankWalk => rank_walk_order(links),
    })
}

/// Kahn's algorithm over the links.
///
/// Nodes become ready in graph order, so independent nodes keep their
/// relative insertion order.
pub fn topological_order(links: &Links) -> Result<Vec<NodeId>, GraphError> {
    let mut in_degree: IndexMap<NodeId, usize> = links
        .node_ids()
        .map(|id| (id, links.upstream(id).len()))
        .collect();

    let mut ready: VecDeque<NodeId> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(id, _)| *id)
        .collect();

    let mut order = Vec::with_capacity(links.len());
    while let Some(id) = ready.pop_front() {
        order.push(id);
        for &dependent in links.downstream(id) {
            if let Some(degree) = in_degree.get_mut(&dependent) {
                *degree -= 1;
                if *degree == 0 {
                    ready.push_back(dependent);
                }
            }
        }
    }

    if order.len() < links.len() {
        let nodes = in_degree
            .into_iter()
            .filter(|(_, degree)| *degree > 0)
            .map(|(id, _)| id)
            .collect();
        return Err(GraphError::CyclicGraph { nodes });
    }

    Ok(order)
}

/// Legacy rank walk. Links must be acyclic.
///
/// Repeatedly seeds the first unscheduled node with rank 0, spreads ranks
/// outward (upstream `rank - 1`, downstream `rank + 1`, each node expanded
/// only on first discovery but re-ranked on every visit), then appends the
/// reached nodes stably sorted by rank.
pub fn rank_walk_order(links: &Links) -> Vec<NodeId> {
    let mut scheduled: IndexSet<NodeId> = IndexSet::with_capacity(links.len());

    for seed in links.node_ids() {
        if scheduled.contains(&seed) {
            continue;
        }
        let mut ranks = IndexMap::new();
        ranks.insert(seed, 0i64);
        spread_ranks(links, seed, &mut ranks);

        let mut ranked: Vec<(NodeId, i64)> = ranks.into_iter().collect();
        ranked.sort_by_key(|&(_, rank)| rank);
        scheduled.extend(ranked.into_iter().map(|(id, _)| id));
    }

    scheduled.into_iter().collect()
}

/// Depth-first rank spreading from `seed`, upstream neighbors before
/// downstream ones. Runs on an explicit stack so long chains cannot
/// exhaust the thread's stack.
fn spread_ranks(links: &Links, seed: NodeId, ranks: &mut IndexMap<NodeId, i64>) {
    // (node, rank at discovery, next neighbor index)
    let mut stack = vec![(seed, 0i64, 0usize)];
    while let Some(frame) = stack.last_mut() {
        let (node, rank, next) = *frame;
        let upstream = links.upstream(node);
        let downstream = links.downstream(node);
        if next >= upstream.len() + downstream.len() {
            stack.pop();
            continue;
        }
        frame.2 += 1;

        let (neighbor, neighbor_rank) = match upstream.get(next) {
            Some(&source) => (source, rank - 1),
            None => (downstream[next - upstream.len()], rank + 1),
        };
        if ranks.insert(neighbor, neighbor_rank).is_none() {
            stack.push((neighbor, neighbor_rank, 0));
        }
    }
}
