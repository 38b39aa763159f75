use std::sync::Arc;

use approx::assert_abs_diff_eq;
use dyson_indexmap::{IndexMap, SpinFlavor};
use dyson_weight::{ComponentKind, Layout, SingularBlock, TauSymmetry, Weight, WeightError};
use num_complex::Complex64;

fn c(re: f64) -> Complex64 {
    Complex64::new(re, 0.0)
}

fn one_spin(map: &Arc<IndexMap>) -> Weight {
    Weight::builder("G", map.clone())
        .flavor(SpinFlavor::OneSpin)
        .symmetry(TauSymmetry::AntiSymmetric)
        .with_smooth_t()
        .with_delta_t()
        .build()
        .unwrap()
}

/// Scale of the conserving block at (spin, site, tau).
fn scale(spin: usize, site: usize, tau: usize) -> f64 {
    1.0 + spin as f64 + 0.5 * site as f64 + 0.25 * tau as f64
}

#[test]
fn test_one_spin_scaled_identity_blocks() {
    let map = Arc::new(IndexMap::new(1.0, &[3], 2, 4).unwrap());
    let mut g = one_spin(&map);
    let conserved = map.conserved_spin_indices(SpinFlavor::OneSpin);

    for &s in &conserved {
        for site in 0..3 {
            for a in 0..2 {
                let pair = map.sublattice_pair_index(a, a);
                g.set(ComponentKind::DeltaT, &[s, pair, site], c(scale(s, site, 0)))
                    .unwrap();
                for tau in 0..4 {
                    g.set(
                        ComponentKind::SmoothT,
                        &[s, pair, site, tau],
                        c(scale(s, site, tau)),
                    )
                    .unwrap();
                }
            }
        }
    }

    g.inverse().unwrap();

    for s in 0..4 {
        for site in 0..3 {
            for tau in 0..4 {
                for a in 0..2 {
                    for b in 0..2 {
                        let pair = map.sublattice_pair_index(a, b);
                        let got = g.get(ComponentKind::SmoothT, &[s, pair, site, tau]).unwrap();
                        if conserved.contains(&s) && a == b {
                            assert_abs_diff_eq!(got.re, 1.0 / scale(s, site, tau), epsilon = 1e-14);
                            assert_abs_diff_eq!(got.im, 0.0, epsilon = 1e-14);
                        } else {
                            assert_eq!(got, c(0.0), "spin {s} sub ({a},{b}) must stay zero");
                        }
                    }
                }
            }
            let got = g
                .get(ComponentKind::DeltaT, &[s, map.sublattice_pair_index(1, 1), site])
                .unwrap();
            if conserved.contains(&s) {
                assert_abs_diff_eq!(got.re, 1.0 / scale(s, site, 0), epsilon = 1e-14);
            } else {
                assert_eq!(got, c(0.0));
            }
        }
    }
}

#[test]
fn test_one_spin_triangular_block() {
    // [[2, 1], [0, 4]]^-1 = [[0.5, -0.125], [0, 0.25]]
    let map = Arc::new(IndexMap::new(1.0, &[1], 2, 1).unwrap());
    let mut g = Weight::builder("G", map.clone())
        .flavor(SpinFlavor::OneSpin)
        .with_delta_t()
        .build()
        .unwrap();
    for s in [0, 3] {
        g.set(ComponentKind::DeltaT, &[s, 0, 0], c(2.0)).unwrap();
        g.set(ComponentKind::DeltaT, &[s, 1, 0], c(1.0)).unwrap();
        g.set(ComponentKind::DeltaT, &[s, 3, 0], c(4.0)).unwrap();
    }
    g.inverse().unwrap();
    for s in [0, 3] {
        let expected = [0.5, -0.125, 0.0, 0.25];
        for (pair, e) in expected.iter().enumerate() {
            let got = g.get(ComponentKind::DeltaT, &[s, pair, 0]).unwrap();
            assert_abs_diff_eq!(got.re, *e, epsilon = 1e-14);
        }
    }
}

#[test]
fn test_two_spin_kronecker_blocks() {
    // Spin-pair matrix M (only conserving entries non-zero) times sublattice matrix S.
    let m = [
        [2.0, 0.0, 0.0, 1.0],
        [0.0, 0.0, 2.0, 0.0],
        [0.0, 5.0, 0.0, 0.0],
        [1.0, 0.0, 0.0, 3.0],
    ];
    let m_inv = [
        [0.6, 0.0, 0.0, -0.2],
        [0.0, 0.0, 0.2, 0.0],
        [0.0, 0.5, 0.0, 0.0],
        [-0.2, 0.0, 0.0, 0.4],
    ];
    let s = [[1.0, 0.5], [0.0, 2.0]];
    let s_inv = [[1.0, -0.25], [0.0, 0.5]];

    let map = Arc::new(IndexMap::new(1.0, &[2], 2, 3).unwrap());
    let mut w = Weight::builder("W", map.clone())
        .flavor(SpinFlavor::TwoSpin)
        .symmetry(TauSymmetry::Symmetric)
        .with_smooth_t()
        .build()
        .unwrap();

    let conserved = map.conserved_spin_indices(SpinFlavor::TwoSpin);
    for p in 0..4 {
        for q in 0..4 {
            let quad = p * 4 + q;
            if m[p][q] != 0.0 {
                assert!(conserved.contains(&quad), "quad {quad} must conserve spin");
            }
            for a in 0..2 {
                for b in 0..2 {
                    let sub = map.sublattice_pair_index(a, b);
                    for site in 0..2 {
                        for tau in 0..3 {
                            let value = m[p][q] * s[a][b] * (1.0 + tau as f64);
                            w.set(ComponentKind::SmoothT, &[quad, sub, site, tau], c(value))
                                .unwrap();
                        }
                    }
                }
            }
        }
    }

    w.inverse().unwrap();
    assert_eq!(w.layout(ComponentKind::SmoothT), Some(Layout::Merged));

    for p in 0..4 {
        for q in 0..4 {
            let quad = p * 4 + q;
            for a in 0..2 {
                for b in 0..2 {
                    let sub = map.sublattice_pair_index(a, b);
                    for site in 0..2 {
                        for tau in 0..3 {
                            let got = w.get(ComponentKind::SmoothT, &[quad, sub, site, tau]).unwrap();
                            let expected = m_inv[p][q] * s_inv[a][b] / (1.0 + tau as f64);
                            if !conserved.contains(&quad) {
                                assert_eq!(got.norm(), 0.0, "quad {quad} must stay zero");
                            }
                            assert_abs_diff_eq!(got.re, expected, epsilon = 1e-13);
                            assert_abs_diff_eq!(got.im, 0.0, epsilon = 1e-13);
                        }
                    }
                }
            }
        }
    }
}

#[test]
fn test_one_spin_singular_blocks_are_all_reported() {
    let map = Arc::new(IndexMap::new(1.0, &[2], 2, 3).unwrap());
    let mut g = one_spin(&map);
    for s in [0, 3] {
        for site in 0..2 {
            for a in 0..2 {
                let pair = map.sublattice_pair_index(a, a);
                g.set(ComponentKind::DeltaT, &[s, pair, site], c(2.0)).unwrap();
                for tau in 0..3 {
                    g.set(ComponentKind::SmoothT, &[s, pair, site, tau], c(2.0))
                        .unwrap();
                }
            }
        }
    }
    // Two singular SmoothT blocks: spin 3 at (site 1, tau 2) and spin 0 at (site 0, tau 1).
    for (s, site, tau) in [(3, 1, 2), (0, 0, 1)] {
        g.set(ComponentKind::SmoothT, &[s, 0, site, tau], c(0.0)).unwrap();
    }

    let err = g.inverse().unwrap_err();
    match err {
        WeightError::SingularMatrix { name, blocks } => {
            assert_eq!(name, "G");
            assert_eq!(
                blocks,
                vec![
                    SingularBlock {
                        component: ComponentKind::SmoothT,
                        spin: Some(0),
                        coordinate: 1,
                    },
                    SingularBlock {
                        component: ComponentKind::SmoothT,
                        spin: Some(3),
                        coordinate: 3 + 2,
                    },
                ]
            );
        }
        other => panic!("unexpected error {other:?}"),
    }

    // Failing blocks untouched, the rest inverted.
    assert_eq!(g.get(ComponentKind::SmoothT, &[3, 3, 1, 2]).unwrap(), c(2.0));
    assert_eq!(g.get(ComponentKind::SmoothT, &[3, 0, 1, 1]).unwrap(), c(0.5));
    assert_eq!(g.get(ComponentKind::DeltaT, &[0, 3, 0]).unwrap(), c(0.5));
}

#[test]
fn test_two_spin_singular_restores_merged_layout() {
    let map = Arc::new(IndexMap::new(1.0, &[2], 1, 2).unwrap());
    let mut w = Weight::builder("W", map)
        .flavor(SpinFlavor::TwoSpin)
        .with_delta_t()
        .build()
        .unwrap();

    // Identity at site 0, zeros at site 1.
    for p in 0..4 {
        w.set(ComponentKind::DeltaT, &[p * 4 + p, 0, 0], c(1.0)).unwrap();
    }

    let err = w.inverse().unwrap_err();
    match err {
        WeightError::SingularMatrix { blocks, .. } => {
            assert_eq!(
                blocks,
                vec![SingularBlock {
                    component: ComponentKind::DeltaT,
                    spin: None,
                    coordinate: 1,
                }]
            );
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(w.layout(ComponentKind::DeltaT), Some(Layout::Merged));
    assert_eq!(w.dims(ComponentKind::DeltaT), Some(vec![16, 1, 2]));
    assert_eq!(w.get(ComponentKind::DeltaT, &[15, 0, 0]).unwrap(), c(1.0));
}

#[test]
fn test_inverse_rejects_split_layout() {
    let map = Arc::new(IndexMap::new(1.0, &[2], 2, 2).unwrap());
    let mut w = Weight::builder("W", map)
        .flavor(SpinFlavor::TwoSpin)
        .with_delta_t()
        .build()
        .unwrap();
    w.to_split_swapped().unwrap();
    assert!(w.inverse().is_err());
    assert_eq!(w.layout(ComponentKind::DeltaT), Some(Layout::SplitSwapped));
}
