//! Ordered partitions and the splitter active set (spec.md §3, §4.3).
//!
//! `lab` is always a permutation of `0..n`; vertices are grouped into
//! maximal contiguous runs called cells. `ptn[i] = 0` marks the permanent
//! end of a cell; otherwise `ptn[i]` holds the search level at which the
//! boundary at `i` was last active, so a single array supports O(1)
//! rollback to any ancestor level without rebuilding cell structure.

use std::collections::VecDeque;

use crate::bitset::Bitset;
use crate::error::{Error, Result};
use crate::perm::Permutation;

/// Sentinel `ptn` value for a boundary that has never been split: greater
/// than every level the search can reach, so it always reads as "interior
/// of the same cell" until an individualization actually cuts it.
const UNSPLIT: usize = usize::MAX;

/// The `(lab, ptn)` pair of spec.md §3, plus the splitter active set.
#[derive(Clone, Debug)]
pub struct OrderedPartition {
    lab: Vec<usize>,
    ptn: Vec<usize>,
}

/// An immutable snapshot of a partition, used by the search driver's
/// explicit per-level stack (spec.md §9) to roll back after exploring a
/// subtree.
#[derive(Clone, Debug)]
pub struct PartitionSnapshot {
    lab: Vec<usize>,
    ptn: Vec<usize>,
}

impl OrderedPartition {
    /// The discrete partition `lab = [0, 1, .., n-1]`, one cell per vertex.
    pub fn discrete(n: usize) -> Self {
        OrderedPartition { lab: (0..n).collect(), ptn: vec![0; n] }
    }

    /// The unit partition: a single cell containing every vertex.
    pub fn unit(n: usize) -> Self {
        let mut ptn = vec![UNSPLIT; n];
        if n > 0 {
            ptn[n - 1] = 0;
        }
        OrderedPartition { lab: (0..n).collect(), ptn }
    }

    /// Builds the initial ordered partition from a vertex coloring: each
    /// color becomes one cell, cells ordered by color id ascending
    /// (spec.md §6, vertex-colored graph reduction).
    pub fn from_coloring(coloring: &[u32]) -> Result<Self> {
        let n = coloring.len();
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by_key(|&v| coloring[v]);

        let mut ptn = vec![UNSPLIT; n];
        for i in 0..n {
            let is_last = i + 1 == n || coloring[order[i]] != coloring[order[i + 1]];
            if is_last {
                ptn[i] = 0;
            }
        }
        Ok(OrderedPartition { lab: order, ptn })
    }

    /// Builds an ordered partition directly from caller-supplied `(lab,
    /// ptn)`, validating that `lab` is a permutation of `0..n` and every
    /// position has a well-formed `ptn` entry (spec.md §7: malformed
    /// initial partitions are an input-validation error).
    pub fn from_parts(lab: Vec<usize>, ptn: Vec<usize>) -> Result<Self> {
        if lab.len() != ptn.len() {
            return Err(Error::InvalidPartition {
                reason: "lab and ptn must have the same length".into(),
            });
        }
        let n = lab.len();
        let mut seen = vec![false; n];
        for &v in &lab {
            if v >= n || seen[v] {
                return Err(Error::InvalidPartition {
                    reason: format!("lab is not a permutation of 0..{n}"),
                });
            }
            seen[v] = true;
        }
        if n > 0 && ptn[n - 1] != 0 {
            return Err(Error::InvalidPartition {
                reason: "final ptn entry must be 0 (end of last cell)".into(),
            });
        }
        Ok(OrderedPartition { lab, ptn })
    }

    #[inline]
    pub fn n(&self) -> usize {
        self.lab.len()
    }

    #[inline]
    pub fn lab(&self) -> &[usize] {
        &self.lab
    }

    #[inline]
    pub fn ptn(&self) -> &[usize] {
        &self.ptn
    }

    #[inline]
    pub fn lab_mut(&mut self) -> &mut [usize] {
        &mut self.lab
    }

    /// Index (inclusive) of the last position of the cell starting at
    /// `start`, at search level `level`.
    pub fn cell_end(&self, start: usize, level: usize) -> usize {
        let mut k = start;
        while self.ptn[k] > level {
            k += 1;
        }
        k
    }

    /// `true` iff the cell starting at `start` is a singleton at `level`.
    pub fn is_singleton(&self, start: usize, level: usize) -> bool {
        self.ptn[start] <= level
    }

    /// `true` iff every cell is a singleton at `level` — the partition is
    /// discrete, i.e. equivalent to a permutation.
    pub fn is_discrete(&self, level: usize) -> bool {
        let n = self.n();
        n == 0 || (0..n - 1).all(|i| self.ptn[i] <= level)
    }

    /// Iterates the cells of the partition at `level` as `(start, end)`
    /// inclusive bounds, left to right.
    pub fn cells(&self, level: usize) -> CellIter<'_> {
        CellIter { part: self, level, pos: 0 }
    }

    /// The first non-singleton cell at `level` — the target cell the
    /// search driver individualizes next (spec.md §4.4).
    pub fn first_nonsingleton_cell(&self, level: usize) -> Option<(usize, usize)> {
        self.cells(level).find(|&(start, end)| end > start)
    }

    /// Position of `vertex` within `lab`.
    pub fn position_of(&self, vertex: usize) -> usize {
        self.lab.iter().position(|&v| v == vertex).expect("vertex present in partition")
    }

    /// Individualizes `vertex`: moves it to the front of the cell starting
    /// at `cell_start` and cuts a singleton boundary after it at `level`.
    /// The remainder of the cell (if any) becomes a new cell starting at
    /// `cell_start + 1`.
    pub fn individualize(&mut self, level: usize, cell_start: usize, vertex: usize) {
        let pos = self
            .lab
            .iter()
            .position(|&v| v == vertex)
            .expect("vertex must belong to the target cell");
        self.lab.swap(cell_start, pos);
        if self.ptn[cell_start] > level {
            self.ptn[cell_start] = level;
        }
    }

    /// Sets the fragment boundary at `pos` active at `level` (spec.md
    /// §4.3 step 3: refinement split bookkeeping).
    pub fn set_boundary(&mut self, pos: usize, level: usize) {
        if self.ptn[pos] > level {
            self.ptn[pos] = level;
        }
    }

    /// Interprets a discrete partition as a permutation: position `i` maps
    /// to vertex `lab[i]`, i.e. canonical vertex `i` is original vertex
    /// `lab[i]` (spec.md §4.4).
    pub fn as_permutation(&self) -> Permutation {
        debug_assert!(self.is_discrete(usize::MAX));
        Permutation::from_array_unchecked(self.lab.clone())
    }

    pub fn snapshot(&self) -> PartitionSnapshot {
        PartitionSnapshot { lab: self.lab.clone(), ptn: self.ptn.clone() }
    }

    pub fn restore(&mut self, snap: &PartitionSnapshot) {
        self.lab.copy_from_slice(&snap.lab);
        self.ptn.copy_from_slice(&snap.ptn);
    }
}

/// Iterator over `(start, end)` inclusive cell bounds at a fixed level.
pub struct CellIter<'a> {
    part: &'a OrderedPartition,
    level: usize,
    pos: usize,
}

impl<'a> Iterator for CellIter<'a> {
    type Item = (usize, usize);
    fn next(&mut self) -> Option<(usize, usize)> {
        if self.pos >= self.part.n() {
            return None;
        }
        let start = self.pos;
        let end = self.part.cell_end(start, self.level);
        self.pos = end + 1;
        Some((start, end))
    }
}

/// The set of cell-start positions not yet used as splitters (spec.md §3).
/// Backed by a [`Bitset`] for O(1) membership and a deque for deterministic
/// iteration order.
#[derive(Clone, Debug)]
pub struct ActiveSet {
    present: Bitset,
    order: VecDeque<usize>,
}

impl ActiveSet {
    pub fn new(n: usize) -> Self {
        ActiveSet { present: Bitset::new(n.max(1)), order: VecDeque::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn contains(&self, pos: usize) -> bool {
        self.present.test(pos)
    }

    /// Adds `pos` if not already present.
    pub fn push(&mut self, pos: usize) {
        if !self.present.test(pos) {
            self.present.add(pos);
            self.order.push_back(pos);
        }
    }

    /// Removes and returns the next splitter, if any.
    pub fn pop(&mut self) -> Option<usize> {
        let pos = self.order.pop_front()?;
        self.present.remove(pos);
        Some(pos)
    }

    /// Removes `pos` if present (used when a cell is consumed as a hint
    /// before its natural turn in `order`).
    pub fn remove(&mut self, pos: usize) {
        if self.present.test(pos) {
            self.present.remove(pos);
            self.order.retain(|&p| p != pos);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_partition_is_one_cell() {
        let p = OrderedPartition::unit(5);
        assert_eq!(p.first_nonsingleton_cell(0), Some((0, 4)));
        assert!(!p.is_discrete(0));
    }

    #[test]
    fn discrete_partition_has_no_nonsingleton_cell() {
        let p = OrderedPartition::discrete(5);
        assert_eq!(p.first_nonsingleton_cell(0), None);
        assert!(p.is_discrete(0));
    }

    #[test]
    fn from_coloring_groups_by_color_ascending() {
        let p = OrderedPartition::from_coloring(&[1, 0, 1, 0]).unwrap();
        // color 0 vertices (1,3) come first, then color 1 (0,2)
        let cells: Vec<(usize, usize)> = p.cells(0).collect();
        assert_eq!(cells, vec![(0, 1), (2, 3)]);
        assert_eq!(&p.lab()[0..2].iter().collect::<std::collections::BTreeSet<_>>(), &[&1, &3].into_iter().collect());
    }

    #[test]
    fn individualize_splits_cell_into_singleton_and_remainder() {
        let mut p = OrderedPartition::unit(4);
        let (start, _end) = p.first_nonsingleton_cell(0).unwrap();
        p.individualize(1, start, 2);
        assert_eq!(p.lab()[0], 2);
        assert!(p.is_singleton(0, 1));
        // remainder cell (positions 1..=3) still together at level 1
        assert_eq!(p.cell_end(1, 1), 3);
        // but at level 0 the whole thing was one cell, still true for ancestor
        assert_eq!(p.cell_end(0, 0), 3);
    }

    #[test]
    fn snapshot_restore_roundtrip() {
        let mut p = OrderedPartition::unit(4);
        let snap = p.snapshot();
        p.individualize(1, 0, 3);
        assert_ne!(p.lab(), snap.lab.as_slice());
        p.restore(&snap);
        assert_eq!(p.lab(), snap.lab.as_slice());
        assert_eq!(p.ptn(), snap.ptn.as_slice());
    }

    #[test]
    fn active_set_push_pop_and_remove() {
        let mut a = ActiveSet::new(8);
        a.push(3);
        a.push(5);
        a.push(3); // duplicate, ignored
        assert!(a.contains(3));
        a.remove(3);
        assert!(!a.contains(3));
        assert_eq!(a.pop(), Some(5));
        assert_eq!(a.pop(), None);
    }
}
