//! Vertex-colored and edge-labeled graph reduction to a plain graph plus an
//! initial partition (spec.md SPEC_FULL §4.11).
//!
//! A vertex coloring becomes an initial ordered partition directly
//! ([`OrderedPartition::from_coloring`]). An edge labeling is reduced by
//! subdividing each labeled edge with an intermediate vertex colored by the
//! label, turning edge colors into vertex colors the refinement engine
//! already understands; [`EdgeReduction`] remembers the mapping back to the
//! original vertex/edge naming so results can be translated back.

use crate::error::Result;
use crate::graph::DenseGraph;
use crate::partition::OrderedPartition;
use crate::perm::Permutation;

/// Reduces a vertex coloring to an initial partition over the original
/// vertex set. `coloring[v]` is the color of vertex `v`; colors need not be
/// contiguous.
pub fn partition_from_vertex_coloring(coloring: &[u32]) -> Result<OrderedPartition> {
    OrderedPartition::from_coloring(coloring)
}

/// The result of reducing an edge-labeled graph: the expanded plain graph,
/// its initial partition, and the bookkeeping needed to translate results
/// back to the original vertex naming.
pub struct EdgeReduction {
    pub graph: DenseGraph,
    pub partition: OrderedPartition,
    /// Number of vertices in the original graph; vertices `0..original_n`
    /// of the expanded graph correspond directly to original vertices.
    pub original_n: usize,
}

impl EdgeReduction {
    /// Restricts a permutation of the expanded graph's vertex set back down
    /// to the original vertices (dropping images/preimages involving
    /// subdivision vertices is not meaningful for those positions, so
    /// callers must only query this for `v < original_n`).
    pub fn restrict(&self, p: &Permutation, v: usize) -> usize {
        debug_assert!(v < self.original_n);
        p.image(v)
    }
}

/// Builds an `EdgeReduction` from an edge list with per-edge labels: each
/// labeled edge `(u, v, label)` is replaced by two unlabeled edges `u - m`
/// and `m - v` through a fresh intermediate vertex `m`, colored by `label`
/// (offset past every original vertex color so it can never collide with
/// one). Original vertices are all given color `0` unless `vertex_colors`
/// supplies one.
pub fn reduce_edge_labeled_graph(
    n: usize,
    labeled_edges: &[(usize, usize, u32)],
    vertex_colors: Option<&[u32]>,
    directed: bool,
) -> Result<EdgeReduction> {
    let base_color_count = vertex_colors.map(|c| c.iter().copied().max().unwrap_or(0) + 1).unwrap_or(1);

    let total_n = n + labeled_edges.len();
    let mut coloring = vec![0u32; total_n];
    if let Some(colors) = vertex_colors {
        coloring[..n].copy_from_slice(colors);
    }

    let mut edges: Vec<(usize, usize)> = Vec::with_capacity(labeled_edges.len() * 2);
    for (i, &(u, v, label)) in labeled_edges.iter().enumerate() {
        let mid = n + i;
        coloring[mid] = base_color_count + label;
        edges.push((u, mid));
        edges.push((mid, v));
    }

    let graph = DenseGraph::from_edges(total_n, &edges, directed)?;
    let partition = partition_from_vertex_coloring(&coloring)?;
    Ok(EdgeReduction { graph, partition, original_n: n })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphOps;

    #[test]
    fn vertex_coloring_groups_by_color() {
        let p = partition_from_vertex_coloring(&[1, 0, 1, 0]).unwrap();
        let cells: Vec<(usize, usize)> = p.cells(0).collect();
        assert_eq!(cells.len(), 2);
    }

    #[test]
    fn edge_labeled_graph_adds_one_subdivision_vertex_per_edge() {
        let reduction = reduce_edge_labeled_graph(3, &[(0, 1, 5), (1, 2, 7)], None, false).unwrap();
        assert_eq!(reduction.graph.n(), 5);
        assert_eq!(reduction.original_n, 3);
        // Subdivision vertices get distinct colors from label 5 vs 7.
        let cells: Vec<(usize, usize)> = reduction.partition.cells(0).collect();
        assert_eq!(cells.len(), 3); // original-vertex cell + 2 distinct label cells
    }

    #[test]
    fn distinct_labels_never_collide_with_vertex_colors() {
        let reduction = reduce_edge_labeled_graph(2, &[(0, 1, 0)], Some(&[0, 0]), false).unwrap();
        // label 0 maps to color base_color_count(1) + 0 = 1, distinct from
        // the original vertices' color 0.
        let cells: Vec<(usize, usize)> = reduction.partition.cells(0).collect();
        assert_eq!(cells.len(), 2);
    }
}
