//! Degree and eigenvector centrality over undirected graphs.

use crate::error::{AnalysisError, AnalysisResult};
use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::VecDeque;

#[derive(Clone, Debug)]
pub struct EigenvectorConfig {
    pub max_iter: usize,
    pub tol: f64,
}

impl Default for EigenvectorConfig {
    fn default() -> Self {
        Self { max_iter: 1000, tol: 1e-6 }
    }
}

/// `d / (n - 1)` per node, in node index order. A lone node scores 1.
pub fn degree_centrality<N, E>(g: &UnGraph<N, E>) -> Vec<f64> {
    let n = g.node_count();
    if n <= 1 {
        return vec![1.0; n];
    }
    let s = 1.0 / (n - 1) as f64;
    g.node_indices().map(|v| g.neighbors(v).count() as f64 * s).collect()
}

/// Connected components as lists of node indices, discovered in index order.
pub fn components<N, E>(g: &UnGraph<N, E>) -> Vec<Vec<NodeIndex>> {
    let mut seen = vec![false; g.node_count()];
    let mut out = Vec::new();
    for start in g.node_indices() {
        if seen[start.index()] {
            continue;
        }
        seen[start.index()] = true;
        let mut comp = vec![start];
        let mut queue = VecDeque::from([start]);
        while let Some(v) = queue.pop_front() {
            for w in g.neighbors(v) {
                if !seen[w.index()] {
                    seen[w.index()] = true;
                    comp.push(w);
                    queue.push_back(w);
                }
            }
        }
        out.push(comp);
    }
    out
}

/// Largest component; on equal sizes the one holding the lowest node index.
pub fn largest_component<N, E>(g: &UnGraph<N, E>) -> Vec<NodeIndex> {
    let mut best: Vec<NodeIndex> = Vec::new();
    // Components come out ordered by their lowest index, so strict `>` keeps the first.
    for comp in components(g) {
        if comp.len() > best.len() {
            best = comp;
        }
    }
    best
}

/// Power iteration on `A + I` with L2 normalization, restricted to the
/// largest connected component. Nodes outside it score exactly 0.
/// Converges when the L1 change drops below `n * tol` (`n` = component size).
pub fn eigenvector_centrality<N, E>(g: &UnGraph<N, E>, cfg: &EigenvectorConfig) -> AnalysisResult<Vec<f64>> {
    let total = g.node_count();
    let mut scores = vec![0.0; total];
    if total == 0 {
        return Ok(scores);
    }

    let comp = largest_component(g);
    let n = comp.len();
    let mut local = vec![usize::MAX; total];
    for (i, v) in comp.iter().enumerate() {
        local[v.index()] = i;
    }
    let adj: Vec<Vec<usize>> = comp
        .iter()
        .map(|&v| g.neighbors(v).filter(|w| *w != v).map(|w| local[w.index()]).collect())
        .collect();

    let mut x = vec![1.0 / n as f64; n];
    for _ in 0..cfg.max_iter {
        let last = x.clone();
        for (i, ns) in adj.iter().enumerate() {
            for &j in ns {
                x[j] += last[i];
            }
        }
        let norm = x.iter().map(|v| v * v).sum::<f64>().sqrt();
        let norm = if norm > 0.0 { norm } else { 1.0 };
        for v in x.iter_mut() {
            *v /= norm;
        }
        let change: f64 = x.iter().zip(&last).map(|(a, b)| (a - b).abs()).sum();
        if change < n as f64 * cfg.tol {
            for (i, v) in comp.iter().enumerate() {
                scores[v.index()] = x[i];
            }
            return Ok(scores);
        }
    }
    Err(AnalysisError::NoConvergence { algorithm: "eigenvector centrality", iterations: cfg.max_iter })
}

/// Node indices sorted by descending score, ties by index.
pub fn ranking(scores: &[f64]) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..scores.len()).collect();
    idx.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then(a.cmp(&b)));
    idx
}

