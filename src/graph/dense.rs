//! Dense graph storage: one bit row per vertex (spec.md §4.2).

use std::cmp::Ordering;

use crate::bitset::Bitset;
use crate::error::{Error, Result};
use crate::perm::Permutation;

use super::GraphOps;

/// `n` rows of `m = words_for(n)` words; row `v` holds the out-neighbors of
/// `v`. For undirected graphs both `(v,w)` and `(w,v)` are set. Self-loops
/// are permitted but make the graph directed for algorithmic purposes
/// (spec.md §4.3: a self-loop breaks the usual undirected symmetry
/// shortcut nowhere in this engine, since refinement only ever reads rows).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DenseGraph {
    n: usize,
    directed: bool,
    rows: Vec<Bitset>,
}

impl DenseGraph {
    /// Builds an empty (edgeless) graph on `n` vertices.
    pub fn empty(n: usize, directed: bool) -> Self {
        DenseGraph { n, directed, rows: (0..n).map(|_| Bitset::new(n)).collect() }
    }

    /// Builds a graph from an edge list. For undirected graphs both
    /// `(v,w)` and `(w,v)` bits are set.
    pub fn from_edges(n: usize, edges: &[(usize, usize)], directed: bool) -> Result<Self> {
        if n >= super::MAX_VERTEX_COUNT {
            return Err(Error::CapacityExceeded { n });
        }
        let mut g = Self::empty(n, directed);
        for &(v, w) in edges {
            if v >= n {
                return Err(Error::VertexOutOfRange { vertex: v, n });
            }
            if w >= n {
                return Err(Error::VertexOutOfRange { vertex: w, n });
            }
            g.rows[v].add(w);
            if !directed {
                g.rows[w].add(v);
            }
        }
        Ok(g)
    }

    /// The `m`-word-wide bit row for `v`, exposed read-only for refinement's
    /// hot path (intersection against a splitter set).
    #[inline]
    pub fn row(&self, v: usize) -> &Bitset {
        &self.rows[v]
    }

    /// Total word count per row.
    #[inline]
    pub fn m(&self) -> usize {
        crate::bitset::words_for(self.n)
    }

    /// Neighbors of `v` in ascending order.
    pub fn neighbors(&self, v: usize) -> impl Iterator<Item = usize> + '_ {
        self.rows[v].iter()
    }

    /// Lexicographic order on row word sequences, used to compare candidate
    /// canonical leaves (spec.md §4.4 canonical competition).
    pub fn cmp_canonical(&self, other: &DenseGraph) -> Ordering {
        for (a, b) in self.rows.iter().zip(&other.rows) {
            match a.words().cmp(b.words()) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    }
}

impl GraphOps for DenseGraph {
    fn n(&self) -> usize {
        self.n
    }

    fn directed(&self) -> bool {
        self.directed
    }

    fn has_edge(&self, v: usize, w: usize) -> bool {
        self.rows[v].test(w)
    }

    fn degree(&self, v: usize) -> usize {
        self.rows[v].size()
    }

    fn permute(&self, p: &Permutation) -> DenseGraph {
        debug_assert_eq!(p.len(), self.n);
        let inv = p.inverse();
        let mut out = DenseGraph::empty(self.n, self.directed);
        for i in 0..self.n {
            for w in self.neighbors(p.image(i)) {
                out.rows[i].add(inv.image(w));
            }
        }
        out
    }

    fn structurally_equal(&self, other: &DenseGraph) -> bool {
        self.n == other.n && self.rows == other.rows
    }

    fn cmp_canonical(&self, other: &DenseGraph) -> Ordering {
        DenseGraph::cmp_canonical(self, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undirected_sets_both_endpoints() {
        let g = DenseGraph::from_edges(3, &[(0, 1)], false).unwrap();
        assert!(g.has_edge(0, 1));
        assert!(g.has_edge(1, 0));
        assert!(!g.has_edge(0, 2));
    }

    #[test]
    fn directed_sets_one_endpoint() {
        let g = DenseGraph::from_edges(3, &[(0, 1)], true).unwrap();
        assert!(g.has_edge(0, 1));
        assert!(!g.has_edge(1, 0));
    }

    #[test]
    fn out_of_range_edge_is_an_error() {
        assert!(DenseGraph::from_edges(2, &[(0, 5)], false).is_err());
    }

    #[test]
    fn permute_matches_definition() {
        // Directed 3-cycle 0->1->2->0.
        let g = DenseGraph::from_edges(3, &[(0, 1), (1, 2), (2, 0)], true).unwrap();
        // Swap vertices 0 and 1.
        let p = Permutation::from_array(vec![1, 0, 2]).unwrap();
        let permuted = g.permute(&p);
        // permuted has edge (i,j) iff g has edge (p[i],p[j])
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(permuted.has_edge(i, j), g.has_edge(p.image(i), p.image(j)));
            }
        }
    }

    #[test]
    fn identity_permutation_is_automorphism_of_anything() {
        let g = DenseGraph::from_edges(4, &[(0, 1), (1, 2), (2, 3), (3, 0)], false).unwrap();
        let id = Permutation::identity(4);
        assert!(g.is_automorphism(&id));
    }
}
