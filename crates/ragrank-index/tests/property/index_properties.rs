use proptest::prelude::*;
use ragrank_core::config::IndexConfig;
use ragrank_core::models::Metric;
use ragrank_index::{IvfIndex, KMeans, PcaParams, ProjectionModel};

fn vectors(n: std::ops::Range<usize>, dim: usize) -> impl Strategy<Value = Vec<Vec<f32>>> {
    prop::collection::vec(prop::collection::vec(-100.0f32..100.0, dim), n)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn search_returns_min_k_n_sorted_unique(data in vectors(1..60, 4), k in 0usize..80, clusters in 1usize..6) {
        prop_assume!(clusters <= data.len());
        let index = IvfIndex::build(&data, clusters, &IndexConfig::default()).unwrap();
        let hits = index.search(&data[0], k).unwrap();

        prop_assert_eq!(hits.len(), k.min(data.len()));
        let mut ids = hits.row_ids();
        for (rank, pair) in hits.as_slice().windows(2).enumerate() {
            prop_assert!(pair[0].distance <= pair[1].distance);
            prop_assert_eq!(pair[0].rank, rank);
        }
        ids.sort_unstable();
        ids.dedup();
        prop_assert_eq!(ids.len(), hits.len());
        prop_assert!(hits.iter().all(|c| c.row_id < data.len()));
    }

    #[test]
    fn full_probe_equals_exhaustive_scan(data in vectors(2..50, 3), query in prop::collection::vec(-100.0f32..100.0, 3), k in 1usize..10) {
        let clusters = (data.len() / 5).max(1);
        let index = IvfIndex::build(&data, clusters, &IndexConfig::default()).unwrap();
        let hits = index.search_with_nprobe(&query, k, clusters).unwrap();

        let mut expected: Vec<(usize, f32)> = data
            .iter()
            .enumerate()
            .map(|(i, v)| (i, Metric::L2.distance(&query, v)))
            .collect();
        expected.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        expected.truncate(k.min(data.len()));
        let expected: Vec<usize> = expected.into_iter().map(|(i, _)| i).collect();
        prop_assert_eq!(hits.row_ids(), expected);
    }

    #[test]
    fn kmeans_assigns_every_vector_once(data in vectors(1..40, 2), k in 1usize..5, seed in any::<u64>()) {
        prop_assume!(k <= data.len());
        let km = KMeans { n_clusters: k, max_iterations: 20, tolerance: 1e-4, seed };
        let a = km.fit(&data).unwrap();
        let b = km.fit(&data).unwrap();
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(a.assignments.len(), data.len());
        prop_assert_eq!(a.cluster_sizes().iter().sum::<usize>(), data.len());
    }

    #[test]
    fn projection_has_target_dimension_and_orthonormal_rows(data in vectors(6..30, 6), target in 1usize..6) {
        let model = ProjectionModel::fit(&data, target, &PcaParams::default()).unwrap();
        prop_assert_eq!(model.components.len(), target);
        for (i, a) in model.components.iter().enumerate() {
            for (j, b) in model.components.iter().enumerate() {
                let d: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
                let expected = if i == j { 1.0 } else { 0.0 };
                prop_assert!((d - expected).abs() < 1e-3, "rows {} {} dot {}", i, j, d);
            }
        }
        for projected in model.apply(&data).unwrap() {
            prop_assert_eq!(projected.len(), target);
        }
    }
}
