#[path = "common/mod.rs"]
mod common;

use common::*;
use petgraph::graph::{NodeIndex, UnGraph};
use subminer::centrality::{degree_centrality, eigenvector_centrality, largest_component, ranking, EigenvectorConfig};
use subminer::community::{louvain, modularity, LouvainConfig};
use subminer::graph::{clustering_coefficients, degree_sequence, interactions, post_graph, InteractionGraph};
use subminer::{Corpus, Parent};

fn graph_from(n: usize, edges: &[(usize, usize)]) -> UnGraph<(), ()> {
    let mut g = UnGraph::default();
    let nodes: Vec<NodeIndex> = (0..n).map(|_| g.add_node(())).collect();
    for &(a, b) in edges {
        g.add_edge(nodes[a], nodes[b], ());
    }
    g
}

#[test]
fn interaction_graph_collapses_repeats_and_ignores_self_loops() {
    let g = InteractionGraph::from_edges([("ana", "bruno"), ("bruno", "ana"), ("ana", "ana"), ("carla", "bruno")]);
    assert_eq!(g.node_count(), 3);
    assert_eq!(g.edge_count(), 2);
    let (a, b) = (g.index_of("ana").unwrap(), g.index_of("bruno").unwrap());
    let e = g.graph.find_edge(a, b).unwrap();
    assert_eq!(g.graph[e], 2);
}

#[test]
fn isolates_are_removed_and_names_still_resolve() {
    let mut g = InteractionGraph::from_edges([("ana", "bruno"), ("carla", "bruno")]);
    g.graph.add_node("zeca".to_string());
    assert_eq!(g.remove_isolates(), 1);
    assert_eq!(g.node_count(), 3);
    assert_eq!(g.edge_count(), 2);
    let c = g.index_of("carla").unwrap();
    assert_eq!(g.name(c), "carla");
    assert!(g.index_of("zeca").is_none());
}

#[test]
fn interactions_resolve_post_and_comment_parents() {
    let corpus = Corpus::new(
        vec![post("p1", Some("ana"), 2, "texto"), post("p2", None, 1, "texto")],
        vec![
            comment("c1", "p1", Some("bruno"), Parent::Post("p1".into()), "oi"),
            comment("c2", "p1", Some("ana"), Parent::Comment("c1".into()), "oi"),
            comment("c3", "p1", Some("ana"), Parent::Post("p1".into()), "self"),
            comment("c4", "p2", Some("carla"), Parent::Post("p2".into()), "anonymous parent"),
            comment("c5", "p1", None, Parent::Post("p1".into()), "deleted author"),
            comment("c6", "p1", Some("dora"), Parent::Comment("missing".into()), "unknown parent"),
        ],
    );
    assert_eq!(interactions(&corpus), vec![("bruno", "ana"), ("ana", "bruno")]);
}

#[test]
fn post_graph_links_equal_comment_counts() {
    let posts: Vec<_> = [3, 3, 1, 3, 0].iter().enumerate().map(|(i, &n)| post(&format!("p{i}"), Some("x"), n, "")).collect();
    let g = post_graph(&posts);
    assert_eq!(g.node_count(), 5);
    assert_eq!(g.edge_count(), 3);
    assert_eq!(degree_sequence(&g), vec![2, 2, 0, 2, 0]);
    assert_eq!(clustering_coefficients(&g), vec![1.0, 1.0, 0.0, 1.0, 0.0]);
}

#[test]
fn clustering_coefficient_counts_closed_triangles() {
    // Triangle 0-1-2 with a tail 2-3.
    let g = graph_from(4, &[(0, 1), (1, 2), (0, 2), (2, 3)]);
    let cc = clustering_coefficients(&g);
    assert_eq!(cc[0], 1.0);
    assert_eq!(cc[1], 1.0);
    assert!((cc[2] - 1.0 / 3.0).abs() < 1e-12);
    assert_eq!(cc[3], 0.0);
}

#[test]
fn degree_centrality_of_a_star() {
    let g = graph_from(4, &[(0, 1), (0, 2), (0, 3)]);
    let d = degree_centrality(&g);
    assert_eq!(d[0], 1.0);
    assert!(d[1..].iter().all(|v| (v - 1.0 / 3.0).abs() < 1e-12));

    assert_eq!(degree_centrality(&graph_from(1, &[])), vec![1.0]);
}

#[test]
fn eigenvector_ranks_star_hub_first() {
    let g = graph_from(5, &[(0, 1), (0, 2), (0, 3), (0, 4)]);
    let scores = eigenvector_centrality(&g, &EigenvectorConfig::default()).unwrap();
    assert_eq!(ranking(&scores)[0], 0);
    let norm: f64 = scores.iter().map(|v| v * v).sum::<f64>().sqrt();
    assert!((norm - 1.0).abs() < 1e-9);
}

#[test]
fn eigenvector_scores_only_the_largest_component() {
    let g = graph_from(6, &[(0, 1), (1, 2), (0, 2), (3, 4)]);
    let scores = eigenvector_centrality(&g, &EigenvectorConfig::default()).unwrap();
    for v in &scores[..3] {
        assert!((v - 1.0 / 3f64.sqrt()).abs() < 1e-6);
    }
    assert_eq!(&scores[3..], &[0.0, 0.0, 0.0]);
}

#[test]
fn component_ties_go_to_the_lowest_node_index() {
    let g = graph_from(4, &[(2, 3), (0, 1)]);
    let lcc = largest_component(&g);
    assert!(lcc.contains(&NodeIndex::new(0)) && lcc.contains(&NodeIndex::new(1)));

    let scores = eigenvector_centrality(&g, &EigenvectorConfig::default()).unwrap();
    assert!(scores[0] > 0.0 && scores[1] > 0.0);
    assert_eq!((scores[2], scores[3]), (0.0, 0.0));
}

#[test]
fn eigenvector_of_empty_graph_is_empty() {
    let g: UnGraph<(), ()> = UnGraph::default();
    assert!(eigenvector_centrality(&g, &EigenvectorConfig::default()).unwrap().is_empty());
}

#[test]
fn eigenvector_reports_non_convergence() {
    let g = graph_from(5, &[(0, 1), (0, 2), (0, 3), (0, 4)]);
    let err = eigenvector_centrality(&g, &EigenvectorConfig { max_iter: 1, tol: 1e-12 }).unwrap_err();
    assert!(matches!(err, subminer::AnalysisError::NoConvergence { iterations: 1, .. }));
}

#[test]
fn louvain_splits_two_cliques_joined_by_a_bridge() {
    let mut edges = Vec::new();
    for base in [0, 4] {
        for i in 0..4 {
            for j in i + 1..4 {
                edges.push((base + i, base + j));
            }
        }
    }
    edges.push((3, 4));
    let g = graph_from(8, &edges);

    let p = louvain(&g, &LouvainConfig::default());
    assert_eq!(p.community_count(), 2);
    assert_eq!(p.membership, vec![0, 0, 0, 0, 1, 1, 1, 1]);
    assert!((p.modularity - modularity(&g, &p.membership)).abs() < 1e-9);
    assert!(p.modularity > 0.4);
    assert_eq!(p.members(), vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7]]);
}

#[test]
fn louvain_on_edgeless_graph_gives_singletons() {
    let g = graph_from(3, &[]);
    let p = louvain(&g, &LouvainConfig::default());
    assert_eq!(p.membership, vec![0, 1, 2]);
    assert_eq!(p.community_count(), 3);
}
