//! Crate root: module orchestration and the top-level entry points
//! (spec.md §6, SPEC_FULL §4.9-4.10).
//!
//! Modules:
//! - `bitset`: bit-packed vertex sets.
//! - `perm`, `orbits`: permutation algebra and orbit union-find.
//! - `graph`: dense (bit-row) and sparse (CSR) graph storage.
//! - `partition`: ordered partitions and the splitter active set.
//! - `refine`: equitable refinement, one implementation per graph variant.
//! - `search`: the search-tree driver.
//! - `schreier`: exact group order via Schreier-Sims.
//! - `stats`, `options`: search results and caller-facing configuration.
//! - `reduce`: vertex-colored / edge-labeled graph reduction.
//! - `codec`: graph6 / sparse6 / digraph6 text formats.

pub mod bitset;
pub mod codec;
pub mod error;
pub mod graph;
pub mod options;
pub mod orbits;
pub mod partition;
pub mod perm;
pub mod reduce;
pub mod refine;
pub mod schreier;
pub mod search;
pub mod stats;

pub use error::{Error, Result};
pub use graph::{DenseGraph, GraphOps, SparseGraph};
pub use options::{Callbacks, Canonicalize, NoCallbacks, Options};
pub use perm::Permutation;
pub use stats::{GroupOrder, Stats};

/// Runs the full search (refinement, automorphism discovery, and optional
/// canonicalization) on a dense graph.
pub fn run_dense<C: Callbacks>(g: &DenseGraph, options: &Options, callbacks: &mut C) -> Result<Stats> {
    search::search(g, options, callbacks, refine::dense::refine)
}

/// Runs the full search on a sparse graph.
pub fn run_sparse<C: Callbacks>(g: &SparseGraph, options: &Options, callbacks: &mut C) -> Result<Stats> {
    search::search(g, options, callbacks, refine::sparse::refine)
}

/// Distinguishes dense vs. sparse storage at the value level, so the CLI
/// and [`is_isomorphic_as`] can pick an engine without generic type
/// gymnastics at the call site (SPEC_FULL.md §3). Dense and sparse
/// refinement agree on every result; `Sparse` exists for graphs large and
/// dilute enough that a bit-row-per-vertex representation wastes memory.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GraphKind {
    Dense,
    Sparse,
}

/// Tests whether two dense graphs are isomorphic by comparing their
/// canonical forms (spec.md §6), always using the dense engine.
pub fn is_isomorphic(g1: &DenseGraph, g2: &DenseGraph, options: &Options) -> Result<bool> {
    is_isomorphic_as(g1, g2, GraphKind::Dense, options)
}

/// Tests whether two dense graphs are isomorphic, running the search on
/// whichever representation `kind` selects. The canonical-labeling
/// permutation search returns acts on vertex indices regardless of
/// representation, so either engine can be driven off the same pair of
/// [`DenseGraph`] inputs.
pub fn is_isomorphic_as(g1: &DenseGraph, g2: &DenseGraph, kind: GraphKind, options: &Options) -> Result<bool> {
    if g1.n() != g2.n() {
        return Ok(false);
    }
    let mut opts = options.clone();
    opts.canonicalize = Canonicalize::Full;

    let mut cb1 = options::NoCallbacks;
    let mut cb2 = options::NoCallbacks;
    let (labeling1, labeling2) = match kind {
        GraphKind::Dense => {
            let stats1 = run_dense(g1, &opts, &mut cb1)?;
            let stats2 = run_dense(g2, &opts, &mut cb2)?;
            (stats1.canonical_labeling, stats2.canonical_labeling)
        }
        GraphKind::Sparse => {
            let s1 = SparseGraph::from_dense(g1);
            let s2 = SparseGraph::from_dense(g2);
            let stats1 = run_sparse(&s1, &opts, &mut cb1)?;
            let stats2 = run_sparse(&s2, &opts, &mut cb2)?;
            (stats1.canonical_labeling, stats2.canonical_labeling)
        }
    };

    let (Some(p1), Some(p2)) = (&labeling1, &labeling2) else {
        return Ok(g1.structurally_equal(g2));
    };
    let c1 = g1.permute(p1);
    let c2 = g2.permute(p2);
    Ok(c1.cmp_canonical(&c2) == std::cmp::Ordering::Equal)
}

/// Computes the exact order of the group generated by `generators`, without
/// running a search (spec.md §6: group-from-generators entry point).
pub fn group_from_generators(generators: &[Permutation], n: usize, seed: u64) -> GroupOrder {
    let mut chain = schreier::StabilizerChain::new(n, seed);
    for g in generators {
        chain.add_generator(g.clone());
    }
    chain.order()
}
