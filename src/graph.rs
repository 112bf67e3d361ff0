//! Author interaction graphs and post similarity graphs.

use crate::record::{Corpus, Post};
use ahash::AHashMap;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::Serialize;
use std::collections::BTreeMap;

/// Undirected, simple graph over authors. Edge weight = observed interactions
/// between the pair; algorithms treat the graph as unweighted.
#[derive(Clone, Debug, Default)]
pub struct InteractionGraph {
    pub graph: UnGraph<String, u32>,
    index: AHashMap<String, NodeIndex>,
}

impl InteractionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn node(&mut self, name: &str) -> NodeIndex {
        if let Some(&ix) = self.index.get(name) {
            return ix;
        }
        let ix = self.graph.add_node(name.to_string());
        self.index.insert(name.to_string(), ix);
        ix
    }

    /// Self-interactions are ignored; repeats bump the pair's weight.
    pub fn add_interaction(&mut self, a: &str, b: &str) {
        if a == b {
            return;
        }
        let (ia, ib) = (self.node(a), self.node(b));
        match self.graph.find_edge(ia, ib) {
            Some(e) => self.graph[e] += 1,
            None => {
                self.graph.add_edge(ia, ib, 1);
            }
        }
    }

    pub fn from_edges<'a>(edges: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut g = Self::new();
        for (a, b) in edges {
            g.add_interaction(a, b);
        }
        g
    }

    /// Drop degree-0 nodes. Node order of the survivors is preserved.
    pub fn remove_isolates(&mut self) -> usize {
        let keep: Vec<NodeIndex> = self.graph.node_indices().filter(|&n| self.graph.neighbors(n).next().is_some()).collect();
        let removed = self.graph.node_count() - keep.len();
        if removed == 0 {
            return 0;
        }
        let mut g: UnGraph<String, u32> = UnGraph::with_capacity(keep.len(), self.graph.edge_count());
        let mut remap = AHashMap::new();
        for &old in &keep {
            remap.insert(old, g.add_node(self.graph[old].clone()));
        }
        for e in self.graph.edge_references() {
            if let (Some(&a), Some(&b)) = (remap.get(&e.source()), remap.get(&e.target())) {
                g.add_edge(a, b, *e.weight());
            }
        }
        self.index = g.node_indices().map(|ix| (g[ix].clone(), ix)).collect();
        self.graph = g;
        removed
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
    pub fn name(&self, ix: NodeIndex) -> &str {
        &self.graph[ix]
    }
    pub fn index_of(&self, name: &str) -> Option<NodeIndex> {
        self.index.get(name).copied()
    }
}

/// Interactions of a corpus: (comment author, parent author) for every comment
/// whose author and parent author are both known and differ.
pub fn interactions(corpus: &Corpus) -> Vec<(&str, &str)> {
    let idx = corpus.author_index();
    corpus
        .comments
        .iter()
        .filter_map(|c| {
            let a = c.author.as_deref()?;
            let p = idx.parent_author(&c.parent)?;
            (a != p).then_some((a, p))
        })
        .collect()
}

/// Node = post, in input order. Undirected edge between every pair of posts
/// with the same comment count.
pub fn post_graph(posts: &[Post]) -> UnGraph<usize, ()> {
    let mut g: UnGraph<usize, ()> = UnGraph::with_capacity(posts.len(), 0);
    let nodes: Vec<NodeIndex> = (0..posts.len()).map(|i| g.add_node(i)).collect();
    let mut by_count: BTreeMap<u64, Vec<usize>> = BTreeMap::new();
    for (i, p) in posts.iter().enumerate() {
        by_count.entry(p.num_comments).or_default().push(i);
    }
    for members in by_count.values() {
        for (a, &i) in members.iter().enumerate() {
            for &j in &members[a + 1..] {
                g.add_edge(nodes[i], nodes[j], ());
            }
        }
    }
    g
}

/// Degree per node, in node index order.
pub fn degree_sequence<N, E>(g: &UnGraph<N, E>) -> Vec<usize> {
    g.node_indices().map(|n| g.neighbors(n).count()).collect()
}

/// Local clustering coefficient `2T / (d (d - 1))`; 0 for degree < 2.
/// Assumes a simple graph (no parallel edges, no self loops).
pub fn clustering_coefficients<N, E>(g: &UnGraph<N, E>) -> Vec<f64> {
    let neigh: Vec<ahash::AHashSet<NodeIndex>> = g.node_indices().map(|n| g.neighbors(n).collect()).collect();
    g.node_indices()
        .map(|n| {
            let ns: Vec<NodeIndex> = neigh[n.index()].iter().copied().collect();
            let d = ns.len();
            if d < 2 {
                return 0.0;
            }
            let mut triangles = 0usize;
            for (a, &u) in ns.iter().enumerate() {
                for &v in &ns[a + 1..] {
                    if neigh[u.index()].contains(&v) {
                        triangles += 1;
                    }
                }
            }
            2.0 * triangles as f64 / (d * (d - 1)) as f64
        })
        .collect()
}

#[derive(Clone, Debug, Serialize)]
pub struct GraphSummary {
    pub nodes: usize,
    pub edges: usize,
    pub components: usize,
}

pub fn summarize<N, E>(g: &UnGraph<N, E>) -> GraphSummary {
    GraphSummary {
        nodes: g.node_count(),
        edges: g.edge_count(),
        components: petgraph::algo::connected_components(g),
    }
}
