//! Engine options and callback hooks (spec.md §4.8).

use crate::orbits::Orbits;
use crate::perm::Permutation;

/// What canonical-labeling work the search driver should do.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Default)]
pub enum Canonicalize {
    /// Only discover automorphism generators and orbits; do not compete
    /// for a canonical leaf.
    #[default]
    None,
    /// Additionally compute the canonical labeling and canonical graph.
    Full,
}

/// Hooks invoked synchronously on the calling thread. Hooks never mutate
/// engine state (spec.md §4.8); they receive read-only views.
pub trait Callbacks {
    /// Called whenever a candidate automorphism is accepted as a generator.
    fn on_automorphism(&mut self, _generator: &Permutation, _orbits: &Orbits, _fixed_count: usize) {}

    /// Called on entering a new search level.
    fn on_level_entry(&mut self, _level: usize) {}

    /// Called on visiting a search-tree node.
    fn on_node_visit(&mut self, _level: usize, _code: u16) {}

    /// Called whenever the canonical leaf is replaced by a better one.
    fn on_canonical_update(&mut self, _level: usize) {}

    /// Polled at the boundary between refinement and recursion, once per
    /// search-tree node (spec.md §5). Once this returns `true` the driver
    /// unwinds without visiting further nodes, reporting
    /// [`crate::stats::Status::Aborted`]. The default never aborts; a
    /// caller wanting a deadline or node budget sets its own flag from
    /// inside a hook like `on_node_visit` and reads it here.
    fn should_abort(&self) -> bool {
        false
    }
}

/// The no-op callback set, used when the caller supplies none.
#[derive(Default)]
pub struct NoCallbacks;
impl Callbacks for NoCallbacks {}

/// Logging callbacks: emits `log::trace!`/`log::debug!` records at each
/// hook point without requiring the caller to implement anything
/// (spec.md SPEC_FULL §4.13). Composable with a caller's own callbacks by
/// calling both from a wrapper, since hooks never mutate engine state.
#[derive(Default)]
pub struct LoggingCallbacks;

impl Callbacks for LoggingCallbacks {
    fn on_automorphism(&mut self, generator: &Permutation, _orbits: &Orbits, fixed_count: usize) {
        log::debug!(
            "automorphism accepted: moved={} fixed={}",
            generator.moved_points().len(),
            fixed_count
        );
    }

    fn on_level_entry(&mut self, level: usize) {
        log::trace!("entering search level {level}");
    }

    fn on_node_visit(&mut self, level: usize, code: u16) {
        log::trace!("node visit at level {level}, code={code:#06x}");
    }

    fn on_canonical_update(&mut self, level: usize) {
        log::debug!("canonical leaf updated at level {level}");
    }
}

/// Default seed for Schreier–Sims' randomized Schreier-generator sampling
/// (spec.md §4.6, §5). Fixed so runs are reproducible unless a caller sets
/// their own seed explicitly.
pub const DEFAULT_SCHREIER_SEED: u64 = 0x5EED_C0DE_u64;

/// Immutable per-call configuration (spec.md §4.8).
#[derive(Clone, Debug)]
pub struct Options {
    pub canonicalize: Canonicalize,
    pub directed: bool,
    /// Caller-supplied initial partition, as `(lab, ptn)`. `None` means the
    /// unit partition (or the coloring-derived one, if a coloring is used
    /// upstream of the engine — see [`crate::reduce`]).
    pub initial_partition: Option<(Vec<usize>, Vec<usize>)>,
    pub use_schreier_sims: bool,
    pub schreier_seed: u64,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            canonicalize: Canonicalize::None,
            directed: false,
            initial_partition: None,
            use_schreier_sims: false,
            schreier_seed: DEFAULT_SCHREIER_SEED,
        }
    }
}

impl Options {
    pub fn canonical() -> Self {
        Options { canonicalize: Canonicalize::Full, ..Default::default() }
    }
}
