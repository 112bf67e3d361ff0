//! K-Means with k-means++ seeding, elbow sweeps and silhouette scoring.

use crate::error::{AnalysisError, AnalysisResult};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug)]
pub struct KMeansConfig {
    pub k: usize,
    pub max_iter: usize,
    /// Relative to the mean per-feature variance of the data.
    pub tol: f64,
    pub n_init: usize,
    pub seed: u64,
}

impl KMeansConfig {
    pub fn new(k: usize) -> Self {
        Self { k, max_iter: 300, tol: 1e-4, n_init: 1, seed: 42 }
    }
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
    pub fn with_n_init(mut self, n: usize) -> Self {
        self.n_init = n.max(1);
        self
    }
    pub fn with_max_iter(mut self, n: usize) -> Self {
        self.max_iter = n.max(1);
        self
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct KMeansFit {
    pub labels: Vec<usize>,
    pub centroids: Vec<Vec<f64>>,
    pub inertia: f64,
    pub iterations: usize,
}

impl KMeansFit {
    /// Members per cluster, indexed by label.
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0usize; self.centroids.len()];
        for &l in &self.labels {
            sizes[l] += 1;
        }
        sizes
    }
}

#[inline]
fn sq_dist(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn nearest(point: &[f64], centroids: &[Vec<f64>]) -> (usize, f64) {
    let mut best = (0usize, f64::INFINITY);
    for (i, c) in centroids.iter().enumerate() {
        let d = sq_dist(point, c);
        if d < best.1 {
            best = (i, d);
        }
    }
    best
}

fn mean_variance(data: &[Vec<f64>]) -> f64 {
    let n = data.len() as f64;
    let dims = data[0].len();
    if dims == 0 {
        return 0.0;
    }
    let mut total = 0.0;
    for j in 0..dims {
        let mean = data.iter().map(|r| r[j]).sum::<f64>() / n;
        total += data.iter().map(|r| (r[j] - mean).powi(2)).sum::<f64>() / n;
    }
    total / dims as f64
}

/// Greedy k-means++: each new center is the best of `2 + ln k` D²-weighted candidates.
fn kmeans_plus_plus(data: &[Vec<f64>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let n = data.len();
    let trials = 2 + (k as f64).ln().floor() as usize;
    let mut centers = vec![data[rng.gen_range(0..n)].clone()];
    let mut closest: Vec<f64> = data.iter().map(|p| sq_dist(p, &centers[0])).collect();

    while centers.len() < k {
        let candidates: Vec<usize> = match WeightedIndex::new(&closest) {
            Ok(dist) => (0..trials).map(|_| dist.sample(&mut *rng)).collect(),
            // Every point already sits on a center.
            Err(_) => (0..trials).map(|_| rng.gen_range(0..n)).collect(),
        };
        let mut best: Option<(usize, f64, Vec<f64>)> = None;
        for c in candidates {
            let updated: Vec<f64> = data.iter().zip(&closest).map(|(p, &d)| d.min(sq_dist(p, &data[c]))).collect();
            let potential: f64 = updated.iter().sum();
            if best.as_ref().map_or(true, |b| potential < b.1) {
                best = Some((c, potential, updated));
            }
        }
        if let Some((c, _, updated)) = best {
            centers.push(data[c].clone());
            closest = updated;
        }
    }
    centers
}

fn lloyd(data: &[Vec<f64>], mut centroids: Vec<Vec<f64>>, cfg: &KMeansConfig, tol: f64) -> KMeansFit {
    let k = centroids.len();
    let dims = data[0].len();
    let mut labels = vec![0usize; data.len()];
    let mut iterations = 0;

    for it in 0..cfg.max_iter {
        iterations = it + 1;
        for (i, p) in data.iter().enumerate() {
            labels[i] = nearest(p, &centroids).0;
        }

        let mut sums = vec![vec![0.0; dims]; k];
        let mut counts = vec![0usize; k];
        for (p, &l) in data.iter().zip(&labels) {
            counts[l] += 1;
            for (s, v) in sums[l].iter_mut().zip(p) {
                *s += v;
            }
        }

        let mut next: Vec<Vec<f64>> = sums
            .into_iter()
            .zip(&counts)
            .map(|(s, &c)| if c > 0 { s.into_iter().map(|v| v / c as f64).collect() } else { Vec::new() })
            .collect();

        // Empty clusters take the point farthest from its own centroid.
        for c in 0..k {
            if counts[c] > 0 {
                continue;
            }
            let far = data
                .iter()
                .enumerate()
                .max_by(|(i, a), (j, b)| {
                    let da = sq_dist(a, &centroids[labels[*i]]);
                    let db = sq_dist(b, &centroids[labels[*j]]);
                    da.total_cmp(&db)
                })
                .map(|(i, _)| i)
                .unwrap_or(0);
            next[c] = data[far].clone();
            labels[far] = c;
        }

        let shift: f64 = centroids.iter().zip(&next).map(|(a, b)| sq_dist(a, b)).sum();
        centroids = next;
        if shift <= tol {
            break;
        }
    }

    let mut inertia = 0.0;
    for (i, p) in data.iter().enumerate() {
        let (l, d) = nearest(p, &centroids);
        labels[i] = l;
        inertia += d;
    }
    KMeansFit { labels, centroids, inertia, iterations }
}

pub fn fit(data: &[Vec<f64>], cfg: &KMeansConfig) -> AnalysisResult<KMeansFit> {
    let n = data.len();
    if cfg.k == 0 || cfg.k > n {
        return Err(AnalysisError::InvalidClusterCount { k: cfg.k, samples: n });
    }
    let tol = cfg.tol * mean_variance(data);
    let mut rng = StdRng::seed_from_u64(cfg.seed);
    let mut best: Option<KMeansFit> = None;
    for _ in 0..cfg.n_init {
        let init = kmeans_plus_plus(data, cfg.k, &mut rng);
        let run = lloyd(data, init, cfg, tol);
        if best.as_ref().map_or(true, |b| run.inertia < b.inertia) {
            best = Some(run);
        }
    }
    best.ok_or(AnalysisError::InvalidClusterCount { k: cfg.k, samples: n })
}

#[derive(Clone, Debug, Serialize)]
pub struct ElbowPoint {
    pub k: usize,
    pub inertia: f64,
}

/// Inertia for each k; values of k that cannot be fitted are left out.
pub fn elbow(data: &[Vec<f64>], ks: impl IntoIterator<Item = usize>, seed: u64) -> Vec<ElbowPoint> {
    let ks: Vec<usize> = ks.into_iter().collect();
    ks.par_iter()
        .filter_map(|&k| {
            fit(data, &KMeansConfig::new(k).with_seed(seed))
                .ok()
                .map(|f| ElbowPoint { k, inertia: f.inertia })
        })
        .collect()
}

/// Mean silhouette coefficient. Needs 2 <= distinct labels <= n - 1.
pub fn silhouette_score(data: &[Vec<f64>], labels: &[usize]) -> AnalysisResult<f64> {
    let n = data.len();
    let k = labels.iter().max().map_or(0, |m| m + 1);
    let mut sizes = vec![0usize; k];
    for &l in labels {
        sizes[l] += 1;
    }
    let distinct = sizes.iter().filter(|&&s| s > 0).count();
    if distinct < 2 || distinct > n.saturating_sub(1) {
        return Err(AnalysisError::InvalidClusterCount { k: distinct, samples: n });
    }

    let scores: Vec<f64> = (0..n)
        .into_par_iter()
        .map(|i| {
            if sizes[labels[i]] <= 1 {
                return 0.0;
            }
            let mut sums = vec![0.0; k];
            for j in 0..n {
                if i != j {
                    sums[labels[j]] += sq_dist(&data[i], &data[j]).sqrt();
                }
            }
            let a = sums[labels[i]] / (sizes[labels[i]] - 1) as f64;
            let b = (0..k)
                .filter(|&c| c != labels[i] && sizes[c] > 0)
                .map(|c| sums[c] / sizes[c] as f64)
                .fold(f64::INFINITY, f64::min);
            let m = a.max(b);
            if m > 0.0 { (b - a) / m } else { 0.0 }
        })
        .collect();
    Ok(scores.iter().sum::<f64>() / n as f64)
}

/// The `n` highest-weighted terms of each centroid; ties keep column order.
pub fn top_terms_per_cluster(centroids: &[Vec<f64>], terms: &[String], n: usize) -> Vec<Vec<String>> {
    centroids
        .iter()
        .map(|c| {
            let mut idx: Vec<usize> = (0..c.len()).collect();
            idx.sort_by(|&a, &b| c[b].total_cmp(&c[a]));
            idx.into_iter().take(n).filter_map(|i| terms.get(i).cloned()).collect()
        })
        .collect()
}
