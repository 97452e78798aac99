//! The search-tree driver (spec.md §3, §4.4, §9).
//!
//! Descends the ordered-partition search tree defined by equitable
//! refinement and target-cell individualization, tracking automorphisms
//! found between leaves and (optionally) the canonical leaf. Uses an
//! explicit frame stack rather than native recursion (spec.md §9) so that
//! arbitrarily deep trees don't consume call-stack space, and so the
//! per-level partition state can be restored in O(1) via [`PartitionSnapshot`]
//! instead of being rebuilt.
//!
//! Two pruning rules bound the tree (spec.md §4.4):
//!
//! 1. Orbit pruning: whenever a vertex's orbit representative has already
//!    been individualized as a sibling at the same node, the vertex itself
//!    is skipped (any leaf reachable through it is already covered by a
//!    known automorphism of a sibling branch).
//! 2. Code-comparison pruning: the refinement code computed while
//!    individualizing at level `L` is compared against `first_code[L]`, the
//!    code recorded for the same level along the very first (leftmost)
//!    path. When the two disagree and the driver is not competing for a
//!    canonical leaf, the branch cannot contribute a new automorphism and is
//!    abandoned without descending further.
//!
//! `first_code`/`canon_code` track, per level, the code along the first and
//! (when canonicalizing) current-best-canonical path; `path_codes` tracks
//! the code history of whichever path is currently being walked. The
//! greatest-common-ancestor level with either reference path is always
//! recoverable as the length of the shared code prefix, so it is computed
//! on demand (`matching_prefix_len`) rather than kept as a separate running
//! counter — the explicit frame stack never loses the ancestor chain the
//! way a hand-rolled recursive implementation's local variables would.

use std::cmp::Ordering;

use crate::graph::GraphOps;
use crate::options::{Callbacks, Canonicalize, Options};
use crate::partition::{ActiveSet, OrderedPartition, PartitionSnapshot};
use crate::perm::Permutation;
use crate::schreier::StabilizerChain;
use crate::stats::{Stats, Status};

struct Frame {
    level: usize,
    target_start: usize,
    /// The target cell's full original membership, kept alongside `tried`
    /// (which only records vertices actually attempted) so the group-order
    /// accumulation on backtrack can count orbit membership over every
    /// vertex of the cell, not just the ones that weren't pruned as
    /// orbit-redundant.
    cell_members: Vec<usize>,
    tried: Vec<usize>,
    remaining: Vec<usize>,
    snapshot: PartitionSnapshot,
}

/// Length of the common prefix of two code sequences — the number of
/// levels (starting at the root) two paths still agree on.
fn matching_prefix_len(a: &[u16], b: &[u16]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

/// Runs the search tree for `g`, using `refine_fn` as the per-variant
/// equitable refinement routine (see [`crate::refine::dense`] /
/// [`crate::refine::sparse`]).
pub fn search<G, F, C>(g: &G, options: &Options, callbacks: &mut C, refine_fn: F) -> crate::error::Result<Stats>
where
    G: GraphOps,
    F: Fn(&G, &mut OrderedPartition, usize, &mut ActiveSet) -> u16,
    C: Callbacks,
{
    let n = g.n();
    let mut stats = Stats::new(n);
    let mut part = build_initial_partition(options, n)?;

    let mut active = ActiveSet::new(n.max(1));
    for (start, _end) in part.cells(0) {
        active.push(start);
    }
    let code0 = refine_fn(g, &mut part, 0, &mut active);
    stats.counters.tree_nodes += 1;
    callbacks.on_node_visit(0, code0);

    let mut first_leaf: Option<Permutation> = None;
    let mut canon: Option<(Permutation, G)> = None;
    // Search state (spec.md §3): the code recorded at each level along the
    // first (leftmost) path and along the current best canonical path, and
    // the code history of whichever path is presently being walked.
    let mut first_code: Vec<u16> = vec![code0];
    let mut canon_code: Vec<u16> = Vec::new();
    let mut path_codes: Vec<u16> = vec![code0];

    if part.is_discrete(0) {
        handle_leaf(g, &part, 0, 0, &path_codes, options, callbacks, &mut stats, &mut first_leaf, &mut canon, &mut canon_code);
        let mut stats = finish(stats, canon);
        apply_group_order(&mut stats, options);
        return Ok(stats);
    }

    let mut stack: Vec<Frame> = vec![push_frame(&part, 0)];

    while let Some(frame) = stack.last_mut() {
        if callbacks.should_abort() {
            stats.status = Status::Aborted;
            break;
        }

        part.restore(&frame.snapshot);

        let mut chosen = None;
        while let Some(v) = frame.remaining.pop() {
            let redundant = frame
                .tried
                .iter()
                .any(|&t| stats.orbits.find_const(t) == stats.orbits.find_const(v));
            if redundant {
                continue;
            }
            chosen = Some(v);
            break;
        }

        let Some(v) = chosen else {
            // Backtracking from this node: spec.md §4.4's group-order
            // accumulation multiplies the running order by the size of the
            // orbit, within this node's target cell, of the first vertex
            // ever individualized here (the orbit-stabilizer index at this
            // level of the search tree).
            let finished = stack.pop().unwrap();
            if let Some(&tv1) = finished.tried.first() {
                let tv1_root = stats.orbits.find_const(tv1);
                let orbit_index =
                    finished.cell_members.iter().filter(|&&m| stats.orbits.find_const(m) == tv1_root).count();
                stats.group_order.multiply(orbit_index as u64);
            }
            continue;
        };
        frame.tried.push(v);
        let level = frame.level;
        let target_start = frame.target_start;

        part.individualize(level, target_start, v);
        let mut active = ActiveSet::new(n.max(1));
        active.push(target_start);
        let code = refine_fn(g, &mut part, level, &mut active);

        stats.counters.tree_nodes += 1;
        stats.counters.max_level = stats.counters.max_level.max(level);
        callbacks.on_level_entry(level);
        callbacks.on_node_visit(level, code);

        path_codes.truncate(level);
        path_codes.push(code);

        let code_matches_first = if level < first_code.len() {
            first_code[level] == code
        } else {
            debug_assert_eq!(level, first_code.len(), "first path must extend one level at a time");
            first_code.push(code);
            true
        };

        if !code_matches_first && options.canonicalize != Canonicalize::Full {
            // Pruning invariant (spec.md §4.4): a code mismatch against the
            // first path means this subtree cannot yield a new automorphism
            // when we are not also competing for a canonical leaf, so it is
            // abandoned without ever reaching a leaf.
            stats.counters.pruned_by_code += 1;
            continue;
        }

        if part.is_discrete(level) {
            let eqlev_first = matching_prefix_len(&path_codes, &first_code).saturating_sub(1);
            handle_leaf(
                g,
                &part,
                level,
                eqlev_first,
                &path_codes,
                options,
                callbacks,
                &mut stats,
                &mut first_leaf,
                &mut canon,
                &mut canon_code,
            );
        } else {
            let (ts, te) = part
                .first_nonsingleton_cell(level)
                .expect("non-discrete partition has a non-singleton cell");
            stats.counters.total_target_cell_size += (te - ts + 1) as u64;
            stack.push(push_frame(&part, level));
        }
    }

    let mut stats = finish(stats, canon);
    apply_group_order(&mut stats, options);
    Ok(stats)
}

fn push_frame(part: &OrderedPartition, level: usize) -> Frame {
    let (ts, te) = part.first_nonsingleton_cell(level).expect("caller checked partition is not discrete");
    let cell_members: Vec<usize> = (ts..=te).map(|pos| part.lab()[pos]).collect();
    Frame {
        level: level + 1,
        target_start: ts,
        tried: Vec::new(),
        remaining: cell_members.clone(),
        cell_members,
        snapshot: part.snapshot(),
    }
}

fn build_initial_partition(options: &Options, n: usize) -> crate::error::Result<OrderedPartition> {
    match &options.initial_partition {
        Some((lab, ptn)) => OrderedPartition::from_parts(lab.clone(), ptn.clone()),
        None => Ok(OrderedPartition::unit(n)),
    }
}

/// Accepts `candidate` as a generator only if joining its orbit actually
/// reduces the number of distinct orbits (spec.md §4.4): a permutation that
/// leaves the orbit partition unchanged is already implied by the
/// generators on record and would only bloat the generator list.
fn accept_as_generator<C: Callbacks>(stats: &mut Stats, callbacks: &mut C, candidate: &Permutation) {
    let before = stats.orbits.orbit_count();
    stats.orbits.orb_join(candidate);
    stats.counters.automorphisms_found += 1;
    if stats.orbits.orbit_count() < before {
        stats.generators.push(candidate.clone());
        callbacks.on_automorphism(candidate, &stats.orbits, candidate.fixed_point_count());
    }
}

#[allow(clippy::too_many_arguments)]
fn handle_leaf<G: GraphOps, C: Callbacks>(
    g: &G,
    part: &OrderedPartition,
    level: usize,
    eqlev_first: usize,
    path_codes: &[u16],
    options: &Options,
    callbacks: &mut C,
    stats: &mut Stats,
    first_leaf: &mut Option<Permutation>,
    canon: &mut Option<(Permutation, G)>,
    canon_code: &mut Vec<u16>,
) {
    let current = part.as_permutation();

    match first_leaf {
        None => {
            *first_leaf = Some(current.clone());
            if options.canonicalize == Canonicalize::Full {
                let graph = g.permute(&current);
                *canon = Some((current, graph));
                *canon_code = path_codes.to_vec();
                stats.counters.canonical_updates += 1;
                callbacks.on_canonical_update(level);
            }
        }
        Some(first) => {
            // Pruning invariant 3 (spec.md §4.4): if this path's codes
            // already diverged from the first path more than one level
            // back, it cannot be an automorphism against `first`; skip the
            // O(n^2) adjacency check and record it as a known-bad leaf.
            let skip_check = options.canonicalize == Canonicalize::Full && eqlev_first + 1 < level;
            if skip_check {
                stats.counters.bad_leaves += 1;
            } else {
                let candidate = current.compose(&first.inverse());
                if g.is_automorphism(&candidate) {
                    accept_as_generator(stats, callbacks, &candidate);
                } else {
                    stats.counters.bad_leaves += 1;
                }
            }

            if options.canonicalize == Canonicalize::Full {
                // Canonical-competition automorphism (spec.md §4.4): a leaf
                // codewise equal to the current best canonical path yields
                // another candidate automorphism, independent of the
                // first-path comparison above.
                if let Some((canon_lab, _)) = canon.as_ref() {
                    if canon_code.as_slice() == path_codes {
                        let candidate = current.compose(&canon_lab.inverse());
                        if g.is_automorphism(&candidate) {
                            accept_as_generator(stats, callbacks, &candidate);
                        }
                    }
                }

                let graph = g.permute(&current);
                let better = match canon {
                    Some((_, best)) => graph.cmp_canonical(best) == Ordering::Less,
                    None => true,
                };
                if better {
                    *canon = Some((current, graph));
                    *canon_code = path_codes.to_vec();
                    stats.counters.canonical_updates += 1;
                    callbacks.on_canonical_update(level);
                }
            }
        }
    }
}

fn finish<G>(mut stats: Stats, canon: Option<(Permutation, G)>) -> Stats {
    if let Some((perm, _graph)) = canon {
        stats.canonical_labeling = Some(perm);
    }
    stats
}

/// Cross-checks (and, when requested, supplies) the exact group order via
/// Schreier-Sims (spec.md §4.6). The backtracking accumulation in
/// `search()` already computes the exact order via the classical
/// orbit-stabilizer decomposition regardless of this flag; when
/// `use_schreier_sims` is set, a base-and-strong generating set is also
/// built from the discovered generators (useful to a caller that wants
/// membership testing or random element generation beyond what `Stats`
/// exposes), and its independently computed order is stored here as a
/// consistency cross-check.
fn apply_group_order(stats: &mut Stats, options: &Options) {
    if !options.use_schreier_sims {
        return;
    }
    let mut chain = StabilizerChain::new(stats.orbits.len(), options.schreier_seed);
    for gen in &stats.generators {
        chain.add_generator(gen.clone());
    }
    let from_chain = chain.order();
    if from_chain.exact() != stats.group_order.exact() {
        log::debug!(
            "Schreier-Sims order {:?} disagrees with backtracking order {:?}",
            from_chain.exact(),
            stats.group_order.exact()
        );
    }
    stats.group_order = from_chain;
}
