//! Read-model metrics computed from mesh state.
//!
//! Everything here is derived on demand from the registry, graph, and
//! engine — metrics hold no independent authority and are never patched
//! incrementally.

use conflux_core::topology::InteractionGraph;
use serde::Serialize;

/// Structural stability of the interaction graph.
#[derive(Debug, Clone, Serialize)]
pub struct StabilityReport {
    pub node_count: usize,
    pub edge_count: usize,
    /// edge_count / max possible edges.
    pub density: f64,
    /// Average sum of incident edge weights per node.
    pub avg_weighted_degree: f64,
    /// Fraction of neighbor pairs that are themselves connected.
    pub clustering_coefficient: f64,
    /// Normalized combination of the above, in [0, 1].
    pub score: f64,
}

/// Aggregate collaboration performance, maintained by the engine.
#[derive(Debug, Clone, Serialize)]
pub struct EngineReport {
    pub active_tasks: usize,
    pub archived_tasks: usize,
    pub tasks_processed: u64,
    pub successful_collaborations: u64,
    pub failed_collaborations: u64,
    /// Running average ticks from submission to a terminal phase.
    pub avg_response_ticks: f64,
    /// Running average quality of completed tasks, in [0, 1].
    pub quality_score: f64,
    /// Mean consensus across active tasks (1.0 when none are active).
    pub convergence: f64,
}

/// All mesh metrics combined.
#[derive(Debug, Clone, Serialize)]
pub struct MeshMetrics {
    pub stability: StabilityReport,
    pub engine: EngineReport,
}

/// Compute the stability report for an interaction graph.
pub fn compute_stability(graph: &dyn InteractionGraph) -> StabilityReport {
    let n = graph.node_count();
    let e = graph.edge_count();

    if n < 2 {
        return StabilityReport {
            node_count: n,
            edge_count: e,
            density: 0.0,
            avg_weighted_degree: 0.0,
            clustering_coefficient: 0.0,
            score: 0.0,
        };
    }

    let max_edges = n * (n - 1) / 2;
    let density = e as f64 / max_edges as f64;

    let total_weight: f64 = graph.all_edges().iter().map(|(_, _, d)| d.weight).sum();
    let avg_weighted_degree = 2.0 * total_weight / n as f64;

    // Clustering: for each node with >= 2 neighbors, the fraction of
    // neighbor pairs that are themselves connected.
    let all_nodes = graph.all_nodes();
    let mut clustering_sum = 0.0f64;
    let mut clusterable = 0usize;

    for id in &all_nodes {
        let neighbor_ids: Vec<_> = graph.neighbors(id).iter().map(|(n, _)| *n).collect();
        let k = neighbor_ids.len();
        if k < 2 {
            continue;
        }
        clusterable += 1;

        let mut closed = 0u64;
        for i in 0..k {
            for j in (i + 1)..k {
                if graph.get_edge(&neighbor_ids[i], &neighbor_ids[j]).is_some() {
                    closed += 1;
                }
            }
        }
        let possible = (k * (k - 1) / 2) as f64;
        clustering_sum += closed as f64 / possible;
    }

    let clustering_coefficient = if clusterable > 0 {
        clustering_sum / clusterable as f64
    } else {
        0.0
    };

    let norm_degree = (avg_weighted_degree / (n - 1) as f64).min(1.0);
    let score = (0.4 * density + 0.3 * norm_degree + 0.3 * clustering_coefficient).clamp(0.0, 1.0);

    StabilityReport {
        node_count: n,
        edge_count: e,
        density,
        avg_weighted_degree,
        clustering_coefficient,
        score,
    }
}
