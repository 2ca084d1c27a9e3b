//! Graph statistics and parameter reports.
//!
//! Collects the structural counts of a graph together with the metrics
//! pass results into one serializable [`GraphStats`] value, and renders it
//! for humans.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::types::EntityGraph;

// ============================================================================
// Types
// ============================================================================

/// Structural parameters of one graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphStats {
    /// Graph ID as displayed.
    pub graph_id: String,
    /// Total number of vertices.
    pub node_count: usize,
    /// Total number of edges.
    pub edge_count: usize,
    /// Vertices without hypernyms.
    pub root_count: usize,
    /// Vertices without hyponyms.
    pub leaf_count: usize,
    /// Vertices without any edge.
    pub isolated_count: usize,
    /// Weakly connected components.
    pub component_count: usize,
    /// Vertices in the largest component.
    pub largest_component_size: usize,
    /// Mean undirected degree.
    pub average_degree: f64,
    /// Maximum undirected degree.
    pub max_degree: usize,
    /// Maximum number of hypernyms of one vertex.
    pub max_in_degree: usize,
    /// Maximum number of hyponyms of one vertex.
    pub max_out_degree: usize,
    /// Vertex with the most direct hyponyms.
    pub widest_entity: Option<String>,
    /// Longest shortest path, in edges.
    pub diameter: usize,
    /// Smallest eccentricity.
    pub radius: Option<usize>,
    /// Mean distance over all vertex pairs.
    pub average_shortest_path_length: f64,
    /// Mean local clustering coefficient.
    pub clustering_coefficient: f64,
    /// Hierarchy depth in edges, when a root could be resolved.
    pub depth: Option<usize>,
}

/// Direction for degree calculation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DegreeDirection {
    /// Hypernyms only.
    In,
    /// Hyponyms only.
    Out,
    /// Both directions.
    Both,
}

// ============================================================================
// Functions
// ============================================================================

/// Compute the statistics of a graph.
///
/// Runs the metrics pass if it has not run yet. `depth` is left unset; it
/// needs a root and is filled in by callers that have one.
pub fn compute_stats(graph: &EntityGraph) -> GraphStats {
    let components = graph.component_indices();

    let mut isolated_count = 0;
    let mut max_in_degree = 0;
    let mut max_out_degree = 0;
    let mut widest_entity: Option<&str> = None;
    for entity in graph.entities() {
        let in_degree = graph.in_degree(entity);
        let out_degree = graph.out_degree(entity);
        if in_degree == 0 && out_degree == 0 {
            isolated_count += 1;
        }
        max_in_degree = max_in_degree.max(in_degree);
        if out_degree > max_out_degree {
            max_out_degree = out_degree;
            widest_entity = Some(entity.id());
        }
    }

    GraphStats {
        graph_id: graph.id().to_string(),
        node_count: graph.node_count(),
        edge_count: graph.edge_count(),
        root_count: graph.roots().len(),
        leaf_count: graph.leaves().len(),
        isolated_count,
        component_count: components.len(),
        largest_component_size: components.first().map(|c| c.len()).unwrap_or(0),
        average_degree: graph.average_degree(),
        max_degree: graph.max_degree(),
        max_in_degree,
        max_out_degree,
        widest_entity: widest_entity.map(str::to_string),
        diameter: graph.diameter(),
        radius: graph.radius(),
        average_shortest_path_length: graph.average_shortest_path_length(),
        clustering_coefficient: graph.clustering_coefficient(),
        depth: None,
    }
}

/// Get a quick summary of graph size.
pub fn quick_summary(graph: &EntityGraph) -> String {
    format!("{} vertices, {} edges", graph.node_count(), graph.edge_count())
}

/// Get the top N entities by degree, ties broken by ID.
pub fn top_entities_by_degree(
    graph: &EntityGraph,
    limit: usize,
    direction: DegreeDirection,
) -> Vec<(String, usize)> {
    let mut scores: Vec<(String, usize)> = graph
        .entities()
        .map(|entity| {
            let degree = match direction {
                DegreeDirection::In => graph.in_degree(entity),
                DegreeDirection::Out => graph.out_degree(entity),
                DegreeDirection::Both => graph.in_degree(entity) + graph.out_degree(entity),
            };
            (entity.id().to_string(), degree)
        })
        .collect();

    scores.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    scores.truncate(limit);
    scores
}

impl GraphStats {
    /// Render the statistics as an aligned plain-text report.
    pub fn report(&self) -> String {
        let optional = |value: Option<usize>| match value {
            Some(v) => v.to_string(),
            None => "n/a".to_string(),
        };

        let mut out = String::new();
        let _ = writeln!(out, "Graph {}", self.graph_id);
        let _ = writeln!(out, "  vertices:                {}", self.node_count);
        let _ = writeln!(out, "  edges:                   {}", self.edge_count);
        let _ = writeln!(out, "  roots:                   {}", self.root_count);
        let _ = writeln!(out, "  leaves:                  {}", self.leaf_count);
        let _ = writeln!(out, "  isolated vertices:       {}", self.isolated_count);
        let _ = writeln!(out, "  connected components:    {}", self.component_count);
        let _ = writeln!(out, "  largest component:       {}", self.largest_component_size);
        let _ = writeln!(out, "  average degree:          {:.4}", self.average_degree);
        let _ = writeln!(out, "  max degree:              {}", self.max_degree);
        let _ = writeln!(
            out,
            "  max in/out degree:       {}/{}",
            self.max_in_degree, self.max_out_degree
        );
        if let Some(widest) = &self.widest_entity {
            let _ = writeln!(out, "  widest entity:           {widest}");
        }
        let _ = writeln!(out, "  diameter:                {}", self.diameter);
        let _ = writeln!(out, "  radius:                  {}", optional(self.radius));
        let _ = writeln!(
            out,
            "  avg shortest path:       {:.4}",
            self.average_shortest_path_length
        );
        let _ = writeln!(
            out,
            "  clustering coefficient:  {:.4}",
            self.clustering_coefficient
        );
        let _ = writeln!(out, "  depth:                   {}", optional(self.depth));
        out
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GraphId;
    use lexgraph_core::Entity;

    fn e(id: &str) -> Entity {
        Entity::new(id)
    }

    fn create_test_graph() -> EntityGraph {
        let mut graph = EntityGraph::new(GraphId::new("stats", "1"));
        graph.add_edge(&e("a"), &e("b"));
        graph.add_edge(&e("a"), &e("c"));
        graph.add_edge(&e("b"), &e("d"));
        graph.add_edge(&e("c"), &e("d"));
        graph.add_entity(e("orphan"));
        graph
    }

    #[test]
    fn test_compute_stats_basic_counts() {
        let stats = compute_stats(&create_test_graph());

        assert_eq!(stats.graph_id, "stats_1");
        assert_eq!(stats.node_count, 5);
        assert_eq!(stats.edge_count, 4);
        assert_eq!(stats.root_count, 2);
        assert_eq!(stats.leaf_count, 2);
        assert_eq!(stats.isolated_count, 1);
    }

    #[test]
    fn test_compute_stats_components() {
        let stats = compute_stats(&create_test_graph());
        assert_eq!(stats.component_count, 2);
        assert_eq!(stats.largest_component_size, 4);
    }

    #[test]
    fn test_compute_stats_degrees() {
        let stats = compute_stats(&create_test_graph());

        // 4 undirected edges over 5 vertices.
        assert!((stats.average_degree - 1.6).abs() < 1e-9);
        assert_eq!(stats.max_degree, 2);
        assert_eq!(stats.max_in_degree, 2);
        assert_eq!(stats.max_out_degree, 2);
        assert_eq!(stats.widest_entity.as_deref(), Some("a"));
    }

    #[test]
    fn test_compute_stats_metrics() {
        let stats = compute_stats(&create_test_graph());
        assert_eq!(stats.diameter, 2);
        assert_eq!(stats.radius, Some(0));
        assert!(stats.depth.is_none());
    }

    #[test]
    fn test_compute_stats_empty_graph() {
        let stats = compute_stats(&EntityGraph::new(GraphId::new("empty", "1")));

        assert_eq!(stats.node_count, 0);
        assert_eq!(stats.component_count, 0);
        assert_eq!(stats.largest_component_size, 0);
        assert_eq!(stats.average_degree, 0.0);
        assert!(stats.widest_entity.is_none());
        assert!(stats.radius.is_none());
    }

    #[test]
    fn test_quick_summary() {
        assert_eq!(quick_summary(&create_test_graph()), "5 vertices, 4 edges");
    }

    #[test]
    fn test_top_entities_by_degree() {
        let graph = create_test_graph();

        let top = top_entities_by_degree(&graph, 2, DegreeDirection::In);
        assert_eq!(top, [("d".to_string(), 2), ("b".to_string(), 1)]);

        let top = top_entities_by_degree(&graph, 1, DegreeDirection::Out);
        assert_eq!(top, [("a".to_string(), 2)]);

        let top = top_entities_by_degree(&graph, 10, DegreeDirection::Both);
        assert_eq!(top.len(), 5);
        assert_eq!(top.last().map(|(id, d)| (id.as_str(), *d)), Some(("orphan", 0)));
    }

    #[test]
    fn test_report_contains_parameters() {
        let mut stats = compute_stats(&create_test_graph());
        stats.depth = Some(2);
        let report = stats.report();

        assert!(report.starts_with("Graph stats_1"));
        assert!(report.contains("diameter:                2"));
        assert!(report.contains("depth:                   2"));
        assert!(report.contains("widest entity:           a"));
    }

    #[test]
    fn test_graph_stats_serialization() {
        let stats = compute_stats(&create_test_graph());
        let json = serde_json::to_string(&stats).unwrap();
        let parsed: GraphStats = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.node_count, stats.node_count);
        assert_eq!(parsed.edge_count, stats.edge_count);
        assert_eq!(parsed.radius, stats.radius);
        assert_eq!(parsed.widest_entity, stats.widest_entity);
    }
}
