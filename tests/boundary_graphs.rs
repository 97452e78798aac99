//! Degenerate and structurally simple graphs (spec.md §8 edge cases).

use nauty_engine::options::{NoCallbacks, Options};
use nauty_engine::{group_from_generators, run_dense, DenseGraph, GraphOps};

fn autgrp_order(g: &DenseGraph) -> num_bigint::BigUint {
    let mut cb = NoCallbacks;
    let stats = run_dense(g, &Options::default(), &mut cb).unwrap();
    group_from_generators(&stats.generators, g.n(), 1).exact().clone()
}

#[test]
fn empty_graph_has_trivial_group() {
    let g = DenseGraph::empty(0, false);
    assert_eq!(autgrp_order(&g), num_bigint::BigUint::from(1u32));
}

#[test]
fn single_vertex_graph_has_trivial_group() {
    let g = DenseGraph::empty(1, false);
    assert_eq!(autgrp_order(&g), num_bigint::BigUint::from(1u32));
}

#[test]
fn edgeless_graph_is_fully_symmetric() {
    let g = DenseGraph::empty(5, false);
    // every permutation of 5 elements is an automorphism: 5! = 120
    assert_eq!(autgrp_order(&g), num_bigint::BigUint::from(120u32));
}

#[test]
fn complete_graph_k6_is_fully_symmetric() {
    let mut edges = Vec::new();
    for i in 0..6 {
        for j in (i + 1)..6 {
            edges.push((i, j));
        }
    }
    let g = DenseGraph::from_edges(6, &edges, false).unwrap();
    assert_eq!(autgrp_order(&g), num_bigint::BigUint::from(720u32));
}

#[test]
fn cycle_c6_has_dihedral_group_order_12() {
    let edges: Vec<(usize, usize)> = (0..6).map(|i| (i, (i + 1) % 6)).collect();
    let g = DenseGraph::from_edges(6, &edges, false).unwrap();
    assert_eq!(autgrp_order(&g), num_bigint::BigUint::from(12u32));
}

#[test]
fn path_p6_has_reflection_only_order_2() {
    let edges: Vec<(usize, usize)> = (0..5).map(|i| (i, i + 1)).collect();
    let g = DenseGraph::from_edges(6, &edges, false).unwrap();
    assert_eq!(autgrp_order(&g), num_bigint::BigUint::from(2u32));
}

#[test]
fn star_graph_permutes_its_leaves_freely() {
    let n = 6;
    let edges: Vec<(usize, usize)> = (1..n).map(|v| (0, v)).collect();
    let g = DenseGraph::from_edges(n, &edges, false).unwrap();
    // center is fixed, the 5 leaves are freely permuted: 5! = 120
    assert_eq!(autgrp_order(&g), num_bigint::BigUint::from(120u32));
}
