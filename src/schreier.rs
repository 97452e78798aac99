//! Schreier-Sims base and strong generating set construction (spec.md §4.6).
//!
//! Computes the exact group order of the automorphism group from a set of
//! generators by building a base and strong generating set (BSGS): a chain
//! of point stabilizers, each represented by its orbit and a transversal (one
//! coset representative per orbit point). The order is the product of
//! transversal sizes, by the orbit-stabilizer theorem applied at every
//! level.
//!
//! Completeness of the strong generating set at each level is checked with
//! randomized Schreier generator sampling (Sims' method): a candidate
//! Schreier generator is sifted through the chain, and the chain is taken to
//! be complete once a fixed run of consecutive successful sifts has been
//! observed, rather than exhaustively enumerating every Schreier generator.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::perm::Permutation;
use crate::stats::GroupOrder;

/// Consecutive successful sifts required before a level is accepted as
/// complete.
const CONSECUTIVE_SUCCESS_BOUND: u32 = 10;

/// One level of the stabilizer chain.
struct Level {
    base_point: usize,
    orbit: Vec<usize>,
    transversal: HashMap<usize, Permutation>,
    generators: Vec<Permutation>,
}

impl Level {
    fn orbit_size(&self) -> usize {
        self.orbit.len()
    }

    fn rep(&self, point: usize) -> Option<&Permutation> {
        self.transversal.get(&point)
    }
}

/// A base and strong generating set, built incrementally as generators are
/// discovered by the search driver.
pub struct StabilizerChain {
    n: usize,
    levels: Vec<Level>,
    rng: StdRng,
}

impl StabilizerChain {
    pub fn new(n: usize, seed: u64) -> Self {
        StabilizerChain { n, levels: Vec::new(), rng: StdRng::seed_from_u64(seed) }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    /// The base: one fixed point per level, in order.
    pub fn base(&self) -> Vec<usize> {
        self.levels.iter().map(|l| l.base_point).collect()
    }

    /// Exact group order: the product of every level's orbit size.
    pub fn order(&self) -> GroupOrder {
        let mut order = GroupOrder::one();
        for level in &self.levels {
            order.multiply(level.orbit_size() as u64);
        }
        order
    }

    /// Feeds a newly discovered automorphism into the chain, extending the
    /// base and strong generating set as needed, then runs the randomized
    /// completeness check.
    pub fn add_generator(&mut self, g: Permutation) {
        if g.is_identity() {
            return;
        }
        self.insert_at(0, g);
        self.complete_randomized();
    }

    /// Inserts `g` as a generator of level `i`, extending the chain with a
    /// new base point first if `i` is past the current chain length, then
    /// recomputes that level's orbit and transversal.
    fn insert_at(&mut self, i: usize, g: Permutation) {
        if i >= self.levels.len() {
            let base_point = match g.moved_points().first() {
                Some(&p) => p,
                None => return,
            };
            self.levels.push(Level {
                base_point,
                orbit: Vec::new(),
                transversal: HashMap::new(),
                generators: Vec::new(),
            });
        }
        self.levels[i].generators.push(g);
        self.recompute_orbit(i);
    }

    fn recompute_orbit(&mut self, i: usize) {
        let base_point = self.levels[i].base_point;
        let gens = self.levels[i].generators.clone();
        let (orbit, transversal) = orbit_transversal(self.n, base_point, &gens);
        self.levels[i].orbit = orbit;
        self.levels[i].transversal = transversal;
    }

    /// Sifts `g` through the chain from level `start` onward. Returns the
    /// residual permutation and the level at which it first failed to
    /// reduce, or `None` if it sifted all the way down to the identity
    /// (meaning `g` is already represented by the chain).
    fn strip(&self, g: &Permutation, start: usize) -> (Permutation, Option<usize>) {
        let mut residue = g.clone();
        for (i, level) in self.levels.iter().enumerate().skip(start) {
            let image = residue.image(level.base_point);
            match level.rep(image) {
                Some(rep) => residue = rep.inverse().compose(&residue),
                None => return (residue, Some(i)),
            }
        }
        if residue.is_identity() { (residue, None) } else { (residue, Some(self.levels.len())) }
    }

    /// `true` iff `p` belongs to the group represented by this chain.
    pub fn contains(&self, p: &Permutation) -> bool {
        matches!(self.strip(p, 0), (_, None))
    }

    /// Randomized completion: repeatedly samples a Schreier generator at a
    /// random level and sifts it. A run of [`CONSECUTIVE_SUCCESS_BOUND`]
    /// sifts to the identity is taken as evidence the chain is complete.
    fn complete_randomized(&mut self) {
        if self.levels.is_empty() {
            return;
        }
        let mut consecutive = 0;
        while consecutive < CONSECUTIVE_SUCCESS_BOUND {
            let level_idx = self.rng.gen_range(0..self.levels.len());
            let schreier_gen = match self.random_schreier_generator(level_idx) {
                Some(g) => g,
                None => {
                    consecutive += 1;
                    continue;
                }
            };
            let (residue, failed_at) = self.strip(&schreier_gen, 0);
            match failed_at {
                None => consecutive += 1,
                Some(level) => {
                    self.insert_at(level, residue);
                    consecutive = 0;
                }
            }
        }
    }

    /// Builds a random Schreier generator at `level_idx`: for a random orbit
    /// point `p` with representative `rep_p` and a random generator `gen` of
    /// that level, `rep(gen(p))^-1 . gen . rep_p` fixes the base point and
    /// tests whether it is already represented deeper in the chain.
    fn random_schreier_generator(&mut self, level_idx: usize) -> Option<Permutation> {
        let level = &self.levels[level_idx];
        if level.orbit.is_empty() || level.generators.is_empty() {
            return None;
        }
        let p = level.orbit[self.rng.gen_range(0..level.orbit.len())];
        let gen = &level.generators[self.rng.gen_range(0..level.generators.len())];
        let rep_p = level.rep(p)?.clone();
        let image = gen.image(p);
        let rep_image = level.rep(image)?.clone();
        Some(rep_image.inverse().compose(gen).compose(&rep_p))
    }
}

/// Computes the orbit of `base_point` under `gens`, plus a transversal: for
/// each orbit point, a permutation taking `base_point` to it. Built by
/// breadth-first expansion of the Schreier graph.
fn orbit_transversal(
    n: usize,
    base_point: usize,
    gens: &[Permutation],
) -> (Vec<usize>, HashMap<usize, Permutation>) {
    let mut orbit = vec![base_point];
    let mut transversal = HashMap::new();
    transversal.insert(base_point, Permutation::identity(n));
    let mut frontier = 0;
    while frontier < orbit.len() {
        let p = orbit[frontier];
        frontier += 1;
        let rep_p = transversal[&p].clone();
        for g in gens {
            let image = g.image(p);
            if let std::collections::hash_map::Entry::Vacant(e) = transversal.entry(image) {
                e.insert(g.compose(&rep_p));
                orbit.push(image);
            }
        }
    }
    (orbit, transversal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_transposition_gives_order_two() {
        let mut chain = StabilizerChain::new(4, 1);
        let g = Permutation::from_array(vec![1, 0, 2, 3]).unwrap();
        chain.add_generator(g);
        assert_eq!(chain.order().exact(), &num_bigint::BigUint::from(2u32));
    }

    #[test]
    fn full_symmetric_group_order_is_factorial() {
        let mut chain = StabilizerChain::new(4, 42);
        chain.add_generator(Permutation::from_array(vec![1, 0, 2, 3]).unwrap());
        chain.add_generator(Permutation::from_array(vec![1, 2, 3, 0]).unwrap());
        assert_eq!(chain.order().exact(), &num_bigint::BigUint::from(24u32));
    }

    #[test]
    fn identity_generator_is_a_no_op() {
        let mut chain = StabilizerChain::new(3, 7);
        chain.add_generator(Permutation::identity(3));
        assert!(chain.order().is_one());
    }

    #[test]
    fn contains_recognizes_generated_elements() {
        let mut chain = StabilizerChain::new(3, 9);
        let g = Permutation::from_array(vec![1, 2, 0]).unwrap();
        chain.add_generator(g.clone());
        assert!(chain.contains(&g));
        assert!(chain.contains(&g.pow(2)));
        let not_in_group = Permutation::from_array(vec![1, 0, 2]).unwrap();
        assert!(!chain.contains(&not_in_group));
    }
}
