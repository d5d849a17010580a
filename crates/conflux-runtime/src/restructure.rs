//! Topology restructuring — hub-relief rewiring for unstable meshes.
//!
//! Best-effort heuristic, not optimal partitioning: shed the weakest edges
//! on the most overloaded hubs, then wire previously-unconnected pairs with
//! no shared capability to raise connectivity diversity. Safe to call
//! repeatedly — drops are a bounded fraction of hub degree and adds respect
//! the global edge cap.

use crate::config::MeshConfig;
use crate::registry::AgentRegistry;
use crate::rng;
use conflux_core::topology::InteractionGraph;
use conflux_core::types::{AgentId, ConnectionKind, EdgeData, Tick};
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// Outcome of one restructuring pass.
#[derive(Debug, Clone, Serialize)]
pub struct RestructureReport {
    pub edges_dropped: usize,
    pub edges_added: usize,
    /// Hubs whose edges were considered for shedding.
    pub hubs: Vec<AgentId>,
    /// Whether the graph was already at the edge cap when adds were attempted.
    pub at_cap: bool,
}

/// Run one restructuring pass over the graph.
pub fn restructure(
    graph: &mut dyn InteractionGraph,
    registry: &AgentRegistry,
    cfg: &MeshConfig,
    tick: Tick,
    rng_state: &mut u64,
) -> RestructureReport {
    let cap = cfg.edge_cap(graph.node_count());

    // Candidate pairs are found up front: previously-unconnected agents
    // with no shared capability. Without at least one such pair the pass
    // would only shed edges, eroding the graph instead of diversifying
    // it, so it becomes a no-op.
    let mut candidates: Vec<(AgentId, AgentId)> = Vec::new();
    let ids = registry.sorted_ids();
    for i in 0..ids.len() {
        for j in (i + 1)..ids.len() {
            let (a, b) = (ids[i], ids[j]);
            if graph.get_edge(&a, &b).is_some() {
                continue;
            }
            let (Some(agent_a), Some(agent_b)) = (registry.get(&a), registry.get(&b)) else {
                continue;
            };
            let shares_capability = agent_a
                .capabilities
                .iter()
                .any(|c| agent_b.capabilities.contains(c));
            if !shares_capability {
                candidates.push((a, b));
            }
        }
    }
    if candidates.is_empty() {
        debug!(target: "conflux::restructure", "no complementary pairs, skipping pass");
        return RestructureReport {
            edges_dropped: 0,
            edges_added: 0,
            hubs: Vec::new(),
            at_cap: graph.edge_count() >= cap,
        };
    }

    // Overloaded hubs: highest degree first, id order for determinism.
    let mut by_degree: Vec<(AgentId, usize)> = graph
        .all_nodes()
        .into_iter()
        .map(|id| (id, graph.degree(&id)))
        .filter(|(_, d)| *d > 0)
        .collect();
    by_degree.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    let hubs: Vec<AgentId> = by_degree
        .iter()
        .take(cfg.restructure_hub_count)
        .map(|(id, _)| *id)
        .collect();

    // Shed the lowest-weight edges incident to each hub.
    let mut to_drop: HashSet<(AgentId, AgentId)> = HashSet::new();
    for hub in &hubs {
        let mut incident: Vec<(AgentId, f64)> = graph
            .neighbors(hub)
            .iter()
            .map(|(n, e)| (*n, e.weight))
            .collect();
        incident.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal).then(a.0.cmp(&b.0)));
        let drop_count = (incident.len() as f64 * cfg.restructure_drop_fraction).floor() as usize;
        for (neighbor, _) in incident.into_iter().take(drop_count) {
            to_drop.insert(pair_key(*hub, neighbor));
        }
    }

    let mut dropped = 0;
    for (a, b) in &to_drop {
        if graph.remove_edge(a, b).is_some() {
            dropped += 1;
        }
    }

    // Wire capability-complementary pairs that are not yet connected.
    let at_cap = graph.edge_count() >= cap;
    let mut added = 0;
    if !at_cap {
        rng::shuffle(&mut candidates, rng_state);

        let add_target = dropped.max(2);
        for (a, b) in candidates.into_iter().take(add_target) {
            if graph.edge_count() >= cap {
                break;
            }
            let span = cfg.new_edge_weight_max - cfg.new_edge_weight_min;
            let weight = cfg.new_edge_weight_min + rng::next_unit(rng_state) * span;
            graph.upsert_edge(
                a,
                b,
                EdgeData {
                    weight,
                    kind: ConnectionKind::Derived,
                    created_tick: tick,
                },
            );
            added += 1;
        }
    }

    debug!(
        target: "conflux::restructure",
        dropped, added, at_cap, "restructuring pass complete"
    );

    RestructureReport {
        edges_dropped: dropped,
        edges_added: added,
        hubs,
        at_cap,
    }
}

fn pair_key(a: AgentId, b: AgentId) -> (AgentId, AgentId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
