//! Automorphism groups of well-known small graphs (spec.md §8).

use nauty_engine::options::{NoCallbacks, Options};
use nauty_engine::{group_from_generators, run_dense, DenseGraph, GraphOps};

fn autgrp_order(g: &DenseGraph, options: &Options) -> num_bigint::BigUint {
    let mut cb = NoCallbacks;
    let stats = run_dense(g, options, &mut cb).unwrap();
    group_from_generators(&stats.generators, g.n(), 1).exact().clone()
}

#[test]
fn k4_has_automorphism_group_order_24() {
    let g = DenseGraph::from_edges(4, &[(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)], false).unwrap();
    assert_eq!(autgrp_order(&g, &Options::default()), num_bigint::BigUint::from(24u32));
}

#[test]
fn c5_has_dihedral_automorphism_group_order_10() {
    let g = DenseGraph::from_edges(5, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)], false).unwrap();
    assert_eq!(autgrp_order(&g, &Options::default()), num_bigint::BigUint::from(10u32));
}

#[test]
fn p4_has_reflection_symmetry_only_order_2() {
    let g = DenseGraph::from_edges(4, &[(0, 1), (1, 2), (2, 3)], false).unwrap();
    assert_eq!(autgrp_order(&g, &Options::default()), num_bigint::BigUint::from(2u32));
}

#[test]
fn petersen_graph_has_automorphism_group_order_120() {
    // Outer 5-cycle 0..4, inner 5-pentagram 5..9 (i -> i+2 mod 5), spokes i - (i+5).
    let mut edges = Vec::new();
    for i in 0..5 {
        edges.push((i, (i + 1) % 5));
        edges.push((5 + i, 5 + (i + 2) % 5));
        edges.push((i, 5 + i));
    }
    let g = DenseGraph::from_edges(10, &edges, false).unwrap();
    assert_eq!(autgrp_order(&g, &Options::default()), num_bigint::BigUint::from(120u32));
}

#[test]
fn k33_has_automorphism_group_order_72() {
    let mut edges = Vec::new();
    for i in 0..3 {
        for j in 0..3 {
            edges.push((i, 3 + j));
        }
    }
    let g = DenseGraph::from_edges(6, &edges, false).unwrap();
    assert_eq!(autgrp_order(&g, &Options::default()), num_bigint::BigUint::from(72u32));
}

#[test]
fn directed_4_cycle_has_cyclic_automorphism_group_order_4() {
    let g = DenseGraph::from_edges(4, &[(0, 1), (1, 2), (2, 3), (3, 0)], true).unwrap();
    let mut options = Options::default();
    options.directed = true;
    assert_eq!(autgrp_order(&g, &options), num_bigint::BigUint::from(4u32));
}
