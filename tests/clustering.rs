use subminer::kmeans::{elbow, fit, silhouette_score, top_terms_per_cluster, KMeansConfig};
use subminer::scale::StandardScaler;
use subminer::stats::{correlation_matrix, describe, pearson, value_counts};
use subminer::AnalysisError;

fn two_blobs() -> Vec<Vec<f64>> {
    let mut pts = Vec::new();
    for (dx, dy) in [(0.0, 0.0), (0.2, 0.1), (0.1, 0.3), (0.3, 0.2), (0.15, 0.05)] {
        pts.push(vec![dx, dy]);
    }
    for (dx, dy) in [(0.0, 0.0), (0.2, 0.1), (0.1, 0.3), (0.3, 0.2), (0.15, 0.05)] {
        pts.push(vec![10.0 + dx, 10.0 + dy]);
    }
    pts
}

#[test]
fn kmeans_recovers_separated_blobs() {
    let data = two_blobs();
    let km = fit(&data, &KMeansConfig::new(2)).unwrap();
    let first = km.labels[0];
    assert!(km.labels[..5].iter().all(|&l| l == first));
    assert!(km.labels[5..].iter().all(|&l| l != first));
    assert_eq!(km.cluster_sizes(), vec![5, 5]);
    assert!(km.inertia < 1.0);
}

#[test]
fn kmeans_is_deterministic_for_a_seed() {
    let data = two_blobs();
    let a = fit(&data, &KMeansConfig::new(3).with_seed(7)).unwrap();
    let b = fit(&data, &KMeansConfig::new(3).with_seed(7)).unwrap();
    assert_eq!(a.labels, b.labels);
    assert_eq!(a.inertia, b.inertia);
}

#[test]
fn kmeans_rejects_impossible_cluster_counts() {
    let data = two_blobs();
    assert!(matches!(fit(&data, &KMeansConfig::new(0)), Err(AnalysisError::InvalidClusterCount { k: 0, samples: 10 })));
    let err = fit(&data, &KMeansConfig::new(11)).unwrap_err();
    assert!(matches!(err, AnalysisError::InvalidClusterCount { k: 11, samples: 10 }));
    assert!(err.is_skip());
}

#[test]
fn elbow_keeps_k_order_and_drops_unfittable_k() {
    let data = two_blobs();
    let points = elbow(&data, 1..=12, 42);
    let ks: Vec<usize> = points.iter().map(|p| p.k).collect();
    assert_eq!(ks, (1..=10).collect::<Vec<_>>());
    assert!(points[0].inertia > points[1].inertia * 100.0);
}

#[test]
fn silhouette_high_for_separated_blobs() {
    let data = two_blobs();
    let km = fit(&data, &KMeansConfig::new(2)).unwrap();
    let s = silhouette_score(&data, &km.labels).unwrap();
    assert!(s > 0.9 && s <= 1.0);

    assert!(silhouette_score(&data, &vec![0; 10]).is_err());
}

#[test]
fn top_terms_follow_centroid_weights() {
    let terms: Vec<String> = ["banca", "prazo", "tcc"].iter().map(|s| s.to_string()).collect();
    let centroids = vec![vec![0.1, 0.7, 0.2], vec![0.5, 0.0, 0.5]];
    let top = top_terms_per_cluster(&centroids, &terms, 2);
    assert_eq!(top[0], ["prazo", "tcc"]);
    // Ties keep column order.
    assert_eq!(top[1], ["banca", "tcc"]);
}

#[test]
fn scaler_standardizes_and_inverts() {
    let data = vec![vec![1.0, 10.0], vec![3.0, 10.0]];
    let (scaler, scaled) = StandardScaler::fit_transform(&data);
    assert_eq!(scaler.mean, vec![2.0, 10.0]);
    // Constant column keeps scale 1.
    assert_eq!(scaler.scale, vec![1.0, 1.0]);
    assert_eq!(scaled, vec![vec![-1.0, 0.0], vec![1.0, 0.0]]);
    assert_eq!(scaler.inverse_transform(&scaled), data);
}

#[test]
fn describe_matches_interpolated_quartiles() {
    let s = describe(&[4.0, 1.0, f64::NAN, 3.0, 2.0]).unwrap();
    assert_eq!(s.count, 4);
    assert_eq!(s.mean, 2.5);
    assert!((s.std - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);
    assert_eq!((s.min, s.q25, s.median, s.q75, s.max), (1.0, 1.75, 2.5, 3.25, 4.0));

    assert!(describe(&[]).is_none());
    assert!(describe(&[7.0]).unwrap().std.is_nan());
}

#[test]
fn correlation_handles_constant_and_missing_values() {
    assert!((pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]) - 1.0).abs() < 1e-12);
    assert!((pearson(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]) + 1.0).abs() < 1e-12);
    assert!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_nan());
    // Pairs with a missing side are left out.
    assert!((pearson(&[1.0, 2.0, f64::NAN, 4.0], &[2.0, 4.0, 100.0, 8.0]) - 1.0).abs() < 1e-12);

    let m = correlation_matrix(&[vec![1.0, 2.0, 3.0], vec![3.0, 1.0, 2.0]]);
    assert_eq!(m.len(), 2);
    assert!((m[0][0] - 1.0).abs() < 1e-12 && (m[1][1] - 1.0).abs() < 1e-12);
    assert_eq!(m[0][1], m[1][0]);
}

#[test]
fn value_counts_descending_ties_by_key() {
    let counts = value_counts(["b", "a", "b", "c", "a", "b", "d"]);
    assert_eq!(counts, vec![("b", 3), ("a", 2), ("c", 1), ("d", 1)]);
}
