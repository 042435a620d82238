//! Property-based tests for the reduced matrix and the drivers

#[cfg(test)]
mod tests {
    use crate::{amuset_hosvd, reduced_matrix, snapshot_slice, HosvdOptions, IndexSets};
    use amuset_basis::{Basis, Constant, Identity};
    use proptest::prelude::*;
    use scirs2_core::ndarray_ext::{Array2, Array4};
    use scirs2_core::random::{Rng, SeedableRng, StdRng};

    fn proptest_config() -> ProptestConfig {
        ProptestConfig {
            cases: 16,
            ..ProptestConfig::default()
        }
    }

    fn random_core(rank: usize, snapshots: usize, seed: u64) -> Array4<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        Array4::from_shape_fn((rank, snapshots, 1, 1), |_| rng.random::<f64>() - 0.5)
    }

    // Property: the rank-k factors reproduce the x-slice up to the discarded
    // singular values, each at most threshold · s_0
    proptest! {
        #![proptest_config(proptest_config())]
        #[test]
        fn reduced_svd_reconstruction_bound(
            rank in 1usize..5,
            half in 2usize..6,
            seed in any::<u64>(),
            threshold in 0.0f64..0.5,
        ) {
            let core = random_core(rank, 2 * half, seed);
            let x: Vec<usize> = (0..half).collect();
            let y: Vec<usize> = (half..2 * half).collect();

            let reduced = reduced_matrix(&core, &x, &y, threshold).unwrap();
            let slice = snapshot_slice(&core, &x).unwrap();
            let err = (&reduced.reconstruct_x() - &slice)
                .iter()
                .fold(0.0f64, |m, v| m.max(v.abs()));

            prop_assert!(err <= threshold * reduced.s[0] + 1e-10);
            prop_assert_eq!(reduced.matrix.dim(), (reduced.rank(), reduced.rank()));
            prop_assert_eq!(reduced.u.ncols(), reduced.rank());
            prop_assert_eq!(reduced.v.nrows(), reduced.rank());
        }
    }

    // Property: a larger svd threshold never retains more singular values
    proptest! {
        #![proptest_config(proptest_config())]
        #[test]
        fn reduced_rank_monotone_in_threshold(
            rank in 1usize..5,
            half in 2usize..6,
            seed in any::<u64>(),
            t1 in 0.0f64..0.5,
            t2 in 0.0f64..0.5,
        ) {
            let core = random_core(rank, 2 * half, seed);
            let x: Vec<usize> = (0..half).collect();
            let y: Vec<usize> = (half..2 * half).collect();
            let (lo, hi) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };

            let loose = reduced_matrix(&core, &x, &y, lo).unwrap();
            let tight = reduced_matrix(&core, &x, &y, hi).unwrap();
            prop_assert!(tight.rank() <= loose.rank());
        }
    }

    // Property: eigenvalues come out sorted by distance to 1 and match the
    // retained rank
    proptest! {
        #![proptest_config(proptest_config())]
        #[test]
        fn driver_orders_eigenvalues(
            l1 in 0.2f64..0.95,
            l2 in -0.9f64..-0.2,
            x0 in 0.5f64..2.0,
        ) {
            let data = Array2::from_shape_fn((2, 7), |(i, t)| {
                let lambda = if i == 0 { l1 } else { l2 };
                x0 * lambda.powi(t as i32)
            });
            let basis: Vec<Basis> = vec![
                vec![Box::new(Constant), Box::new(Identity::new(0))],
                vec![Box::new(Constant), Box::new(Identity::new(1))],
            ];
            let pairs = IndexSets::single((0..6).collect(), (1..7).collect());

            let d = amuset_hosvd(&data.view(), &pairs, &basis, &HosvdOptions::default())
                .unwrap()
                .into_single()
                .unwrap();
            // sorting uses the complex distance; the real parts keep that
            // order only when nothing imaginary was dropped
            let distances: Vec<f64> = d.eigenvalues.iter().map(|l| (l - 1.0).abs()).collect();
            if d.max_discarded_imag < 1e-10 {
                prop_assert!(distances.windows(2).all(|w| w[0] <= w[1] + 1e-12));
            }
            prop_assert!(d.eigenvalues.iter().all(|l| l.is_finite()));
            prop_assert_eq!(d.eigentensor.last_core().shape()[1], d.len());
            prop_assert!(!d.is_empty());
        }
    }
}
