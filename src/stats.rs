//! Search-tree result aggregation (spec.md §4.7, §5).

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::orbits::Orbits;
use crate::perm::Permutation;

/// Exact group order, reported both as a mantissa/exponent pair for quick
/// comparisons and as an exact [`BigUint`].
///
/// The mantissa is kept in `[1, 1e10)` by construction: whenever a
/// multiplication would push it to `1e10` or beyond, it is divided by
/// `1e10` and the exponent is advanced by 10 (spec.md §4.7's rescale rule,
/// matching nauty's `grouporder` mantissa/exponent pair).
#[derive(Clone, Debug)]
pub struct GroupOrder {
    mantissa: f64,
    exponent: u32,
    exact: BigUint,
}

const RESCALE_THRESHOLD: f64 = 1e10;

impl GroupOrder {
    pub fn one() -> Self {
        GroupOrder { mantissa: 1.0, exponent: 0, exact: BigUint::one() }
    }

    /// Multiplies the order by `factor`, applying the rescale rule and
    /// updating the exact value exactly.
    pub fn multiply(&mut self, factor: u64) {
        self.exact *= factor;
        self.mantissa *= factor as f64;
        while self.mantissa >= RESCALE_THRESHOLD {
            self.mantissa /= RESCALE_THRESHOLD;
            self.exponent += 10;
        }
    }

    pub fn mantissa(&self) -> f64 {
        self.mantissa
    }

    pub fn exponent(&self) -> u32 {
        self.exponent
    }

    /// The exact order as an arbitrary-precision integer.
    pub fn exact(&self) -> &BigUint {
        &self.exact
    }

    /// Approximate value as `mantissa * 10^exponent`, for display only.
    pub fn approx(&self) -> f64 {
        self.mantissa * 10f64.powi(self.exponent as i32)
    }

    pub fn is_one(&self) -> bool {
        self.exact.is_one()
    }
}

impl Default for GroupOrder {
    fn default() -> Self {
        Self::one()
    }
}

/// Counters accumulated during a search (spec.md §4.7).
#[derive(Clone, Debug, Default)]
pub struct Counters {
    pub tree_nodes: u64,
    pub bad_leaves: u64,
    pub max_level: usize,
    pub total_target_cell_size: u64,
    pub canonical_updates: u64,
    pub automorphisms_found: u64,
    /// Internal nodes abandoned because their refinement code diverged from
    /// `first_code` at the same level while not canonicalizing (spec.md
    /// §4.4's base code-comparison pruning invariant).
    pub pruned_by_code: u64,
}

/// Whether a search ran to completion or was cut short by a cooperative
/// abort request (spec.md §5, §7 kind 3).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Default)]
pub enum Status {
    #[default]
    Complete,
    /// [`crate::options::Callbacks::should_abort`] returned `true` before
    /// the tree was fully explored. Generators, orbits, and any canonical
    /// labeling found so far remain valid; the group order may undercount
    /// nodes never reached.
    Aborted,
}

/// The accumulated output of a search run (spec.md §4.7, §5).
#[derive(Clone, Debug)]
pub struct Stats {
    /// Accepted automorphism generators, in discovery order.
    pub generators: Vec<Permutation>,
    pub group_order: GroupOrder,
    pub orbits: Orbits,
    /// The canonical relabeling permutation, if canonicalization ran.
    pub canonical_labeling: Option<Permutation>,
    pub counters: Counters,
    pub status: Status,
}

impl Stats {
    pub fn new(n: usize) -> Self {
        Stats {
            generators: Vec::new(),
            group_order: GroupOrder::one(),
            orbits: Orbits::new(n),
            canonical_labeling: None,
            counters: Counters::default(),
            status: Status::Complete,
        }
    }

    /// Number of distinct vertex orbits under the discovered automorphism
    /// group.
    pub fn orbit_count(&mut self) -> usize {
        self.orbits.orbit_count()
    }

    pub fn orbit_partition(&mut self) -> Vec<Vec<usize>> {
        self.orbits.partition()
    }
}
