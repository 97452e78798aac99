//! Permutations of the vertex set.
//!
//! A [`Permutation`] is immutable once built: composition, inverse, cycle
//! decomposition, order and powers never mutate `self`. Construction from a
//! raw `Vec<usize>` validates the bijection property (spec.md §4.5).

use crate::error::{Error, Result};

/// An immutable length-`n` permutation, `p[i]` = image of `i`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Permutation {
    images: Vec<usize>,
}

impl Permutation {
    /// The identity permutation on `{0..n}`.
    pub fn identity(n: usize) -> Self {
        Permutation { images: (0..n).collect() }
    }

    /// Builds a permutation from `images`, rejecting anything that is not a
    /// bijection on `0..images.len()`.
    pub fn from_array(images: Vec<usize>) -> Result<Self> {
        let n = images.len();
        let mut seen = vec![false; n];
        for &v in &images {
            if v >= n || seen[v] {
                return Err(Error::NotAPermutation { len: n });
            }
            seen[v] = true;
        }
        Ok(Permutation { images })
    }

    /// Builds a permutation without validating the bijection property.
    /// Callers must guarantee `images` is a bijection on `0..images.len()`.
    pub fn from_array_unchecked(images: Vec<usize>) -> Self {
        Permutation { images }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    #[inline]
    pub fn image(&self, i: usize) -> usize {
        self.images[i]
    }

    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.images
    }

    pub fn is_identity(&self) -> bool {
        self.images.iter().enumerate().all(|(i, &p)| i == p)
    }

    /// `(self ∘ other)[i] = self[other[i]]`.
    pub fn compose(&self, other: &Permutation) -> Permutation {
        debug_assert_eq!(self.len(), other.len());
        Permutation { images: other.images.iter().map(|&i| self.images[i]).collect() }
    }

    /// The inverse permutation.
    pub fn inverse(&self) -> Permutation {
        let mut inv = vec![0usize; self.len()];
        for (i, &p) in self.images.iter().enumerate() {
            inv[p] = i;
        }
        Permutation { images: inv }
    }

    /// Cycle decomposition, each cycle listed starting from its smallest
    /// element; fixed points are omitted.
    pub fn cycles(&self) -> Vec<Vec<usize>> {
        let n = self.len();
        let mut seen = vec![false; n];
        let mut cycles = Vec::new();
        for start in 0..n {
            if seen[start] || self.images[start] == start {
                seen[start] = true;
                continue;
            }
            let mut cycle = vec![start];
            seen[start] = true;
            let mut cur = self.images[start];
            while cur != start {
                seen[cur] = true;
                cycle.push(cur);
                cur = self.images[cur];
            }
            cycles.push(cycle);
        }
        cycles
    }

    /// The order of the permutation: the LCM of its cycle lengths (1 if
    /// the permutation is the identity).
    pub fn order(&self) -> u64 {
        self.cycles().iter().map(|c| c.len() as u64).fold(1, lcm)
    }

    /// `self` raised to the `k`-th power, computed by repeated squaring.
    pub fn pow(&self, k: u64) -> Permutation {
        let n = self.len();
        let mut result = Permutation::identity(n);
        let mut base = self.clone();
        let mut exp = k;
        while exp > 0 {
            if exp & 1 == 1 {
                result = base.compose(&result);
            }
            base = base.compose(&base);
            exp >>= 1;
        }
        result
    }

    /// Number of fixed points.
    pub fn fixed_point_count(&self) -> usize {
        self.images.iter().enumerate().filter(|&(i, &p)| i == p).count()
    }

    /// The set of points this permutation moves.
    pub fn moved_points(&self) -> Vec<usize> {
        self.images.iter().enumerate().filter(|&(i, &p)| i != p).map(|(i, _)| i).collect()
    }
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 { a } else { gcd(b, a % b) }
}

fn lcm(a: u64, b: u64) -> u64 {
    if a == 0 || b == 0 { 0 } else { a / gcd(a, b) * b }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_identity() {
        let id = Permutation::identity(5);
        assert!(id.is_identity());
        assert_eq!(id.order(), 1);
    }

    #[test]
    fn from_array_rejects_non_permutation() {
        assert!(Permutation::from_array(vec![0, 0, 2]).is_err());
        assert!(Permutation::from_array(vec![0, 3, 2]).is_err());
        assert!(Permutation::from_array(vec![1, 0, 2]).is_ok());
    }

    #[test]
    fn compose_and_inverse() {
        // p = (0 1 2): 0->1, 1->2, 2->0
        let p = Permutation::from_array(vec![1, 2, 0]).unwrap();
        let inv = p.inverse();
        let id = p.compose(&inv);
        assert!(id.is_identity());

        // q = (0 1): 0->1, 1->0, 2->2
        let q = Permutation::from_array(vec![1, 0, 2]).unwrap();
        let pq = p.compose(&q);
        // pq[i] = p[q[i]]: pq[0] = p[1] = 2, pq[1] = p[0] = 1, pq[2] = p[2] = 0
        assert_eq!(pq.as_slice(), &[2, 1, 0]);
    }

    #[test]
    fn cycle_decomposition_and_order() {
        // (0 1 2)(3 4): order lcm(3,2) = 6
        let p = Permutation::from_array(vec![1, 2, 0, 4, 3]).unwrap();
        let mut cycles = p.cycles();
        cycles.sort_by_key(|c| c[0]);
        assert_eq!(cycles, vec![vec![0, 1, 2], vec![3, 4]]);
        assert_eq!(p.order(), 6);
    }

    #[test]
    fn pow_matches_repeated_composition() {
        let p = Permutation::from_array(vec![1, 2, 0]).unwrap();
        let cubed = p.pow(3);
        assert!(cubed.is_identity());
        let squared = p.pow(2);
        assert_eq!(squared, p.compose(&p));
    }

    #[test]
    fn fixed_points_and_moved_points() {
        let p = Permutation::from_array(vec![0, 2, 1, 3]).unwrap();
        assert_eq!(p.fixed_point_count(), 2);
        assert_eq!(p.moved_points(), vec![1, 2]);
    }
}
