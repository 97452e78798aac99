//! Sparse-graph refinement: adjacency counts via adjacency-list walks, plus
//! the breadth-first distance-labeling shortcut for early, small partitions
//! (spec.md §4.3).

use std::collections::VecDeque;

use crate::graph::SparseGraph;
use crate::partition::{ActiveSet, OrderedPartition};

use super::CodeAccumulator;

/// Refines `part` at `level` until `active` is empty or the partition is
/// discrete. Mirrors [`crate::refine::dense::refine`] but counts
/// adjacencies by walking each splitter vertex's neighbor list instead of
/// a bit-row AND.
pub fn refine(g: &SparseGraph, part: &mut OrderedPartition, level: usize, active: &mut ActiveSet) -> u16 {
    let n = g.n();
    let mut hint: Option<usize> = None;
    let mut acc = CodeAccumulator::default();
    let mut cell_count = part.cells(level).count();
    let mut tried_distance_shortcut = false;

    while !active.is_empty() && cell_count < n {
        if !tried_distance_shortcut
            && level <= 2
            && active.len() == 1
            && cell_count <= (n / 8).max(1)
        {
            tried_distance_shortcut = true;
            if let Some(pos) = single_active_singleton(active, part, level) {
                active.remove(pos);
                distance_refine_pass(g, part, level, pos, &mut acc, &mut cell_count, active);
                continue;
            }
        }

        let splitter_start = match hint.take() {
            Some(h) if active.contains(h) => {
                active.remove(h);
                h
            }
            _ => active.pop().expect("active set checked non-empty above"),
        };
        let splitter_end = part.cell_end(splitter_start, level);
        acc.push(splitter_start);

        let mut counts = vec![0usize; n];
        let mut touched: Vec<usize> = Vec::new();
        for pos in splitter_start..=splitter_end {
            let v = part.lab()[pos];
            for w in g.neighbors(v) {
                if counts[w] == 0 {
                    touched.push(w);
                }
                counts[w] += 1;
            }
        }

        let targets: Vec<(usize, usize)> = part.cells(level).filter(|&(s, e)| e > s).collect();
        let mut smallest_fragment: Option<(usize, usize)> = None;

        for (t_start, t_end) in targets {
            let values: Vec<usize> = (t_start..=t_end).map(|pos| counts[part.lab()[pos]]).collect();
            let first = values[0];
            if values.iter().all(|&c| c == first) {
                acc.push(first);
                continue;
            }

            let mut members: Vec<(usize, usize)> =
                (t_start..=t_end).map(|pos| (part.lab()[pos], values[pos - t_start])).collect();
            members.sort_by_key(|&(_, c)| c);
            for (i, pos) in (t_start..=t_end).enumerate() {
                part.lab_mut()[pos] = members[i].0;
            }

            let mut fragments: Vec<(usize, usize)> = Vec::new();
            let mut frag_start = t_start;
            for i in (t_start + 1)..=t_end {
                if members[i - t_start].1 != members[i - t_start - 1].1 {
                    fragments.push((frag_start, i - 1));
                    frag_start = i;
                }
            }
            fragments.push((frag_start, t_end));
            cell_count += fragments.len() - 1;

            for &(_, fe) in &fragments {
                if fe != t_end {
                    part.set_boundary(fe, level);
                }
            }

            let mut last_c = None;
            for &(_, c) in &members {
                if last_c != Some(c) {
                    acc.push(c);
                    last_c = Some(c);
                }
            }
            for &(fs, _) in &fragments {
                acc.push(fs);
            }

            let t_was_active = active.contains(t_start);
            let max_size = fragments.iter().map(|&(fs, fe)| fe - fs + 1).max().unwrap();
            let large_idx = fragments.iter().position(|&(fs, fe)| fe - fs + 1 == max_size).unwrap();
            for (i, &(fs, fe)) in fragments.iter().enumerate() {
                if t_was_active || i != large_idx {
                    active.push(fs);
                }
                let size = fe - fs + 1;
                if smallest_fragment.map(|(_, s)| size < s).unwrap_or(true) {
                    smallest_fragment = Some((fs, size));
                }
            }
        }

        for w in touched {
            counts[w] = 0;
        }
        acc.push(cell_count);
        hint = smallest_fragment.map(|(fs, _)| fs);
    }

    acc.finish()
}

/// If the sole active entry is a singleton cell, returns its position.
fn single_active_singleton(active: &ActiveSet, part: &OrderedPartition, level: usize) -> Option<usize> {
    for pos in 0..part.n() {
        if active.contains(pos) {
            return if part.is_singleton(pos, level) { Some(pos) } else { None };
        }
    }
    None
}

/// The special sparse optimization: BFS distance-labels every vertex from
/// the singleton splitter's vertex, then splits every non-singleton cell
/// by ascending distance in one combined pass.
fn distance_refine_pass(
    g: &SparseGraph,
    part: &mut OrderedPartition,
    level: usize,
    splitter_pos: usize,
    acc: &mut CodeAccumulator,
    cell_count: &mut usize,
    active: &mut ActiveSet,
) {
    let n = g.n();
    let source = part.lab()[splitter_pos];
    const UNREACHED: usize = usize::MAX;
    let mut dist = vec![UNREACHED; n];
    dist[source] = 0;
    let mut queue = VecDeque::new();
    queue.push_back(source);
    while let Some(v) = queue.pop_front() {
        let dv = dist[v];
        for w in g.neighbors(v) {
            if dist[w] == UNREACHED {
                dist[w] = dv + 1;
                queue.push_back(w);
            }
        }
    }

    acc.push(splitter_pos);

    let targets: Vec<(usize, usize)> = part.cells(level).filter(|&(s, e)| e > s).collect();
    for (t_start, t_end) in targets {
        let mut members: Vec<(usize, usize)> =
            (t_start..=t_end).map(|pos| (part.lab()[pos], dist[part.lab()[pos]])).collect();
        members.sort_by_key(|&(_, d)| d);
        for (i, pos) in (t_start..=t_end).enumerate() {
            part.lab_mut()[pos] = members[i].0;
        }

        if members.iter().all(|&(_, d)| d == members[0].1) {
            acc.push(members[0].1);
            continue;
        }

        let mut fragments: Vec<(usize, usize)> = Vec::new();
        let mut frag_start = t_start;
        for i in (t_start + 1)..=t_end {
            if members[i - t_start].1 != members[i - t_start - 1].1 {
                fragments.push((frag_start, i - 1));
                frag_start = i;
            }
        }
        fragments.push((frag_start, t_end));
        *cell_count += fragments.len() - 1;

        for &(_, fe) in &fragments {
            if fe != t_end {
                part.set_boundary(fe, level);
            }
        }

        let mut last_d = None;
        for &(_, d) in &members {
            if last_d != Some(d) {
                acc.push(d);
                last_d = Some(d);
            }
        }
        for &(fs, fe) in &fragments {
            acc.push(fs);
            active.push(fs);
            let _ = fe;
        }
    }

    acc.push(*cell_count);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::ActiveSet;

    fn all_cells_active(part: &OrderedPartition, level: usize) -> ActiveSet {
        let mut a = ActiveSet::new(part.n());
        for (start, _end) in part.cells(level) {
            a.push(start);
        }
        a
    }

    #[test]
    fn sparse_refine_is_deterministic() {
        let g = SparseGraph::from_edges(5, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)], false).unwrap();
        let mut part_a = OrderedPartition::unit(5);
        let mut active_a = all_cells_active(&part_a, 0);
        let code_a = refine(&g, &mut part_a, 0, &mut active_a);

        let mut part_b = OrderedPartition::unit(5);
        let mut active_b = all_cells_active(&part_b, 0);
        let code_b = refine(&g, &mut part_b, 0, &mut active_b);

        assert_eq!(code_a, code_b);
        assert_eq!(part_a.lab(), part_b.lab());
    }

    #[test]
    fn sparse_refine_keeps_vertex_transitive_graph_in_one_cell() {
        let g = SparseGraph::from_edges(4, &[(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)], false).unwrap();
        let mut part = OrderedPartition::unit(4);
        let mut active = all_cells_active(&part, 0);
        refine(&g, &mut part, 0, &mut active);
        assert_eq!(part.first_nonsingleton_cell(0), Some((0, 3)));
    }

    #[test]
    fn distance_shortcut_splits_by_bfs_distance() {
        // Star graph: center 0, leaves 1..16. n/8 = 2, so after
        // individualizing the center (cell_count = 2, one singleton + one
        // non-singleton) the BFS distance shortcut's preconditions hold.
        let n = 16;
        let edges: Vec<(usize, usize)> = (1..n).map(|v| (0, v)).collect();
        let g = SparseGraph::from_edges(n, &edges, false).unwrap();

        let lab: Vec<usize> = (0..n).collect();
        let mut ptn = vec![usize::MAX; n];
        ptn[0] = usize::MAX; // boundary after vertex 0 gets cut by individualization below
        ptn[n - 1] = 0;
        let mut part = OrderedPartition::from_parts(lab, ptn).unwrap();
        part.individualize(1, 0, 0);

        let mut active = ActiveSet::new(n);
        active.push(0);
        refine(&g, &mut part, 1, &mut active);
        // All leaves are at BFS distance 1 from the center, so they must
        // remain one equitable cell.
        assert_eq!(part.cell_end(1, 1), n - 1);
    }
}
