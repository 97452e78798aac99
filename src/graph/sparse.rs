//! Sparse graph storage: CSR-style neighbor arrays (spec.md §4.2).
//!
//! `has_edge` is linear in degree — acceptable, it is never on the
//! refinement hot path (refinement walks adjacency lists directly).
//! Adjacency lists are sorted on construction so structural equality and
//! the canonical ordering are well defined without an extra pass.

use std::cmp::Ordering;

use crate::error::{Error, Result};
use crate::perm::Permutation;

use super::GraphOps;

/// Three parallel arrays: `offsets[0..=n]`, `degree[0..n]`, and packed
/// `edges[]`; neighbors of `v` live in `edges[offsets[v]..offsets[v]+degree[v])`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SparseGraph {
    n: usize,
    directed: bool,
    offsets: Vec<u64>,
    degree: Vec<u32>,
    edges: Vec<u32>,
}

impl SparseGraph {
    /// Builds a sparse graph from an edge list, sorting each vertex's
    /// adjacency list ascending.
    pub fn from_edges(n: usize, edges_in: &[(usize, usize)], directed: bool) -> Result<Self> {
        if n >= super::MAX_VERTEX_COUNT {
            return Err(Error::CapacityExceeded { n });
        }
        let mut adj: Vec<Vec<u32>> = vec![Vec::new(); n];
        for &(v, w) in edges_in {
            if v >= n {
                return Err(Error::VertexOutOfRange { vertex: v, n });
            }
            if w >= n {
                return Err(Error::VertexOutOfRange { vertex: w, n });
            }
            adj[v].push(w as u32);
            if !directed {
                adj[w].push(v as u32);
            }
        }
        for list in &mut adj {
            list.sort_unstable();
        }

        let mut offsets = Vec::with_capacity(n + 1);
        let mut degree = Vec::with_capacity(n);
        let mut edges = Vec::new();
        let mut off = 0u64;
        for list in &adj {
            offsets.push(off);
            degree.push(list.len() as u32);
            edges.extend_from_slice(list);
            off += list.len() as u64;
        }
        offsets.push(off);

        Ok(SparseGraph { n, directed, offsets, degree, edges })
    }

    /// Converts from a [`super::DenseGraph`].
    pub fn from_dense(g: &super::DenseGraph) -> Self {
        let mut edges = Vec::new();
        for v in 0..g.n() {
            for w in g.neighbors(v) {
                edges.push((v, w));
            }
        }
        SparseGraph::from_edges(g.n(), &edges, g.directed()).expect("dense graph edges are in range")
    }

    fn adj_range(&self, v: usize) -> std::ops::Range<usize> {
        let start = self.offsets[v] as usize;
        start..start + self.degree[v] as usize
    }

    /// Neighbors of `v` in ascending order.
    pub fn neighbors(&self, v: usize) -> impl Iterator<Item = usize> + '_ {
        self.edges[self.adj_range(v)].iter().map(|&w| w as usize)
    }

    /// Lexicographic order on `(offsets, degree, edges)`, used to compare
    /// candidate canonical leaves.
    pub fn cmp_canonical(&self, other: &SparseGraph) -> Ordering {
        self.degree.cmp(&other.degree).then_with(|| self.edges.cmp(&other.edges))
    }
}

impl GraphOps for SparseGraph {
    fn n(&self) -> usize {
        self.n
    }

    fn directed(&self) -> bool {
        self.directed
    }

    fn has_edge(&self, v: usize, w: usize) -> bool {
        let w = w as u32;
        self.edges[self.adj_range(v)].binary_search(&w).is_ok()
    }

    fn degree(&self, v: usize) -> usize {
        self.degree[v] as usize
    }

    fn permute(&self, p: &Permutation) -> SparseGraph {
        debug_assert_eq!(p.len(), self.n);
        let inv = p.inverse();
        let mut edges_out: Vec<(usize, usize)> = Vec::new();
        for i in 0..self.n {
            for w in self.neighbors(p.image(i)) {
                edges_out.push((i, inv.image(w)));
            }
        }
        SparseGraph::from_edges(self.n, &edges_out, self.directed).expect("permuted edges stay in range")
    }

    fn structurally_equal(&self, other: &SparseGraph) -> bool {
        self.n == other.n && self.degree == other.degree && self.edges == other.edges
    }

    fn cmp_canonical(&self, other: &SparseGraph) -> Ordering {
        SparseGraph::cmp_canonical(self, other)
    }
}
