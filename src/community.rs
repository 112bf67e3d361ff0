//! Louvain community detection (multilevel modularity optimization).

use petgraph::graph::UnGraph;
use petgraph::visit::EdgeRef;
use serde::Serialize;
use std::collections::BTreeMap;

const MIN_GAIN: f64 = 1e-7;

#[derive(Clone, Debug)]
pub struct LouvainConfig {
    pub resolution: f64,
}

impl Default for LouvainConfig {
    fn default() -> Self {
        Self { resolution: 1.0 }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Partition {
    /// Community per node, in node index order. Ids are dense and numbered
    /// by first appearance.
    pub membership: Vec<usize>,
    pub modularity: f64,
    pub levels: usize,
}

impl Partition {
    pub fn community_count(&self) -> usize {
        self.membership.iter().max().map_or(0, |m| m + 1)
    }

    /// Member node indices per community id.
    pub fn members(&self) -> Vec<Vec<usize>> {
        let mut out = vec![Vec::new(); self.community_count()];
        for (node, &c) in self.membership.iter().enumerate() {
            out[c].push(node);
        }
        out
    }
}

/// Weighted working graph of one level. `adj` excludes self loops.
#[derive(Clone, Debug)]
struct Level {
    adj: Vec<Vec<(usize, f64)>>,
    loops: Vec<f64>,
}

impl Level {
    fn from_graph<N, E>(g: &UnGraph<N, E>) -> Self {
        let n = g.node_count();
        let mut acc: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); n];
        let mut loops = vec![0.0; n];
        for e in g.edge_references() {
            let (a, b) = (e.source().index(), e.target().index());
            if a == b {
                loops[a] += 1.0;
            } else {
                *acc[a].entry(b).or_insert(0.0) += 1.0;
                *acc[b].entry(a).or_insert(0.0) += 1.0;
            }
        }
        Self { adj: acc.into_iter().map(|m| m.into_iter().collect()).collect(), loops }
    }

    fn len(&self) -> usize {
        self.loops.len()
    }

    /// Weighted degree; a self loop counts twice.
    fn degree(&self, v: usize) -> f64 {
        self.adj[v].iter().map(|(_, w)| w).sum::<f64>() + 2.0 * self.loops[v]
    }

    fn total_weight(&self) -> f64 {
        let half: f64 = self.adj.iter().flatten().map(|(_, w)| w).sum::<f64>() / 2.0;
        half + self.loops.iter().sum::<f64>()
    }

    /// Collapse each community into one node; internal weight becomes a loop.
    fn induced(&self, membership: &[usize], count: usize) -> Self {
        let mut acc: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); count];
        let mut loops = vec![0.0; count];
        for u in 0..self.len() {
            let cu = membership[u];
            loops[cu] += self.loops[u];
            for &(v, w) in &self.adj[u] {
                if u > v {
                    continue;
                }
                let cv = membership[v];
                if cu == cv {
                    loops[cu] += w;
                } else {
                    *acc[cu].entry(cv).or_insert(0.0) += w;
                    *acc[cv].entry(cu).or_insert(0.0) += w;
                }
            }
        }
        Self { adj: acc.into_iter().map(|m| m.into_iter().collect()).collect(), loops }
    }
}

struct Status {
    node2com: Vec<usize>,
    /// Total degree per community.
    degrees: Vec<f64>,
    /// Degree per node.
    gdegrees: Vec<f64>,
    /// Internal edge weight per community.
    internals: Vec<f64>,
    total_weight: f64,
}

impl Status {
    fn new(g: &Level) -> Self {
        let gdegrees: Vec<f64> = (0..g.len()).map(|v| g.degree(v)).collect();
        Self {
            node2com: (0..g.len()).collect(),
            degrees: gdegrees.clone(),
            gdegrees,
            internals: g.loops.clone(),
            total_weight: g.total_weight(),
        }
    }

    fn modularity(&self, resolution: f64) -> f64 {
        let m = self.total_weight;
        self.internals
            .iter()
            .zip(&self.degrees)
            .filter(|(_, &d)| d > 0.0)
            .map(|(&inner, &d)| resolution * inner / m - (d / (2.0 * m)).powi(2))
            .sum()
    }

    fn neighbor_communities(&self, g: &Level, v: usize) -> BTreeMap<usize, f64> {
        let mut out = BTreeMap::new();
        for &(u, w) in &g.adj[v] {
            *out.entry(self.node2com[u]).or_insert(0.0) += w;
        }
        out
    }

    fn remove(&mut self, g: &Level, v: usize, com: usize, weight: f64) {
        self.degrees[com] -= self.gdegrees[v];
        self.internals[com] -= weight + g.loops[v];
        self.node2com[v] = usize::MAX;
    }

    fn insert(&mut self, g: &Level, v: usize, com: usize, weight: f64) {
        self.node2com[v] = com;
        self.degrees[com] += self.gdegrees[v];
        self.internals[com] += weight + g.loops[v];
    }
}

/// Local moving phase. Nodes are visited in index order; a node moves only
/// on a strictly positive gain.
fn one_level(g: &Level, st: &mut Status, resolution: f64) {
    let mut current = st.modularity(resolution);
    loop {
        let mut modified = false;
        for v in 0..g.len() {
            let com = st.node2com[v];
            let degc_totw = st.gdegrees[v] / (st.total_weight * 2.0);
            let neigh = st.neighbor_communities(g, v);
            let own = neigh.get(&com).copied().unwrap_or(0.0);
            let remove_cost = -own + resolution * (st.degrees[com] - st.gdegrees[v]) * degc_totw;
            st.remove(g, v, com, own);

            let mut best = com;
            let mut best_gain = 0.0;
            for (&c, &dnc) in &neigh {
                let gain = remove_cost + dnc - resolution * st.degrees[c] * degc_totw;
                if gain > best_gain {
                    best_gain = gain;
                    best = c;
                }
            }
            st.insert(g, v, best, neigh.get(&best).copied().unwrap_or(0.0));
            if best != com {
                modified = true;
            }
        }
        let next = st.modularity(resolution);
        if !modified || next - current < MIN_GAIN {
            break;
        }
        current = next;
    }
}

/// Dense ids in order of first appearance.
fn renumber(labels: &[usize]) -> (Vec<usize>, usize) {
    let mut map: BTreeMap<usize, usize> = BTreeMap::new();
    let out = labels
        .iter()
        .map(|l| {
            let next = map.len();
            *map.entry(*l).or_insert(next)
        })
        .collect();
    (out, map.len())
}

/// Best partition found by Louvain. Edgeless graphs yield singletons.
pub fn louvain<N, E>(g: &UnGraph<N, E>, cfg: &LouvainConfig) -> Partition {
    let n = g.node_count();
    let singletons = || Partition { membership: (0..n).collect(), modularity: 0.0, levels: 0 };
    let mut level = Level::from_graph(g);
    if level.total_weight() == 0.0 {
        return singletons();
    }

    let mut membership: Vec<usize> = (0..n).collect();
    let mut st = Status::new(&level);
    one_level(&level, &mut st, cfg.resolution);
    let mut modularity = st.modularity(cfg.resolution);
    let mut levels = 1;
    loop {
        let (labels, count) = renumber(&st.node2com);
        for m in membership.iter_mut() {
            *m = labels[*m];
        }
        level = level.induced(&labels, count);
        st = Status::new(&level);
        one_level(&level, &mut st, cfg.resolution);
        let next = st.modularity(cfg.resolution);
        if next - modularity < MIN_GAIN {
            break;
        }
        modularity = next;
        levels += 1;
    }

    let (membership, _) = renumber(&membership);
    tracing::debug!(nodes = n, levels, modularity, "louvain done");
    Partition { membership, modularity, levels }
}

/// Newman modularity of `membership` on `g`, edges unweighted.
pub fn modularity<N, E>(g: &UnGraph<N, E>, membership: &[usize]) -> f64 {
    let level = Level::from_graph(g);
    let m = level.total_weight();
    if m == 0.0 {
        return 0.0;
    }
    let count = membership.iter().max().map_or(0, |x| x + 1);
    let mut internal = vec![0.0; count];
    let mut degree = vec![0.0; count];
    for v in 0..level.len() {
        let c = membership[v];
        degree[c] += level.degree(v);
        internal[c] += level.loops[v];
        for &(u, w) in &level.adj[v] {
            if v < u && membership[u] == c {
                internal[c] += w;
            }
        }
    }
    internal.iter().zip(&degree).map(|(i, d)| i / m - (d / (2.0 * m)).powi(2)).sum()
}
