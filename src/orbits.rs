//! Orbits as a union-find over vertices.
//!
//! Roots are always the smallest vertex of their orbit (spec.md §3, §4.5):
//! `join` always attaches the larger root to the smaller, so no extra
//! bookkeeping is needed to find the representative.

use crate::perm::Permutation;

/// Union-find over `{0..n}`. Initialized as singletons; merged monotonically,
/// never split.
#[derive(Clone, Debug)]
pub struct Orbits {
    parent: Vec<usize>,
}

impl Orbits {
    /// Singleton orbits over `{0..n}`.
    pub fn new(n: usize) -> Self {
        Orbits { parent: (0..n).collect() }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Root of `i`'s orbit, with path compression.
    pub fn find(&mut self, i: usize) -> usize {
        let mut root = i;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut cur = i;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    /// Root of `i` without mutating (for read-only callback contexts).
    pub fn find_const(&self, i: usize) -> usize {
        let mut root = i;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        root
    }

    /// Merges the orbits of `i` and `j`; the smaller root absorbs the larger.
    pub fn join(&mut self, i: usize, j: usize) {
        let ri = self.find(i);
        let rj = self.find(j);
        if ri == rj {
            return;
        }
        if ri < rj {
            self.parent[rj] = ri;
        } else {
            self.parent[ri] = rj;
        }
    }

    /// `true` iff `v` is the representative of its own orbit.
    pub fn is_representative(&self, v: usize) -> bool {
        self.find_const(v) == v
    }

    /// Number of distinct orbits.
    pub fn orbit_count(&mut self) -> usize {
        (0..self.len()).filter(|&i| self.find(i) == i).count()
    }

    /// All vertices sharing `v`'s orbit.
    pub fn members_of(&mut self, v: usize) -> Vec<usize> {
        let root = self.find(v);
        (0..self.len()).filter(|&i| self.find(i) == root).collect()
    }

    /// Materializes the orbit partition as `root -> members`, keyed by the
    /// smallest vertex of each orbit.
    pub fn partition(&mut self) -> Vec<Vec<usize>> {
        let n = self.len();
        let mut by_root: Vec<Vec<usize>> = vec![Vec::new(); n];
        for i in 0..n {
            let r = self.find(i);
            by_root[r].push(i);
        }
        by_root.into_iter().filter(|g| !g.is_empty()).collect()
    }

    /// Merges the orbits according to permutation `p`: linear in `n`, per
    /// spec.md §4.5. For every `i` with `p[i] != i`, joins `i` and `p[i]`.
    pub fn orb_join(&mut self, p: &Permutation) {
        debug_assert_eq!(p.len(), self.len());
        for i in 0..p.len() {
            let pi = p.image(i);
            if pi != i {
                self.join(i, pi);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singletons_are_their_own_root() {
        let mut o = Orbits::new(5);
        for i in 0..5 {
            assert_eq!(o.find(i), i);
        }
        assert_eq!(o.orbit_count(), 5);
    }

    #[test]
    fn join_roots_at_minimum() {
        let mut o = Orbits::new(5);
        o.join(3, 1);
        assert_eq!(o.find(3), 1);
        assert_eq!(o.find(1), 1);
        o.join(1, 0);
        assert_eq!(o.find(3), 0);
    }

    #[test]
    fn orb_join_merges_all_pairs_in_permutation() {
        let mut o = Orbits::new(4);
        // p = (0 1 2): 0->1, 1->2, 2->0, 3 fixed
        let p = Permutation::from_array(vec![1, 2, 0, 3]).unwrap();
        o.orb_join(&p);
        assert_eq!(o.find(0), o.find(1));
        assert_eq!(o.find(1), o.find(2));
        assert_eq!(o.find(3), 3);
        assert_eq!(o.orbit_count(), 2);
    }

    #[test]
    fn is_representative_after_merge() {
        let mut o = Orbits::new(3);
        o.join(2, 0);
        assert!(o.is_representative(0));
        assert!(!o.is_representative(2));
    }
}
