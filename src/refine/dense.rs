//! Dense-graph refinement: adjacency counts via bit-row intersection.

use crate::bitset::Bitset;
use crate::graph::DenseGraph;
use crate::partition::{ActiveSet, OrderedPartition};

use super::CodeAccumulator;

/// Refines `part` at `level` until `active` is empty or the partition is
/// discrete, mutating both in place. Returns the refinement code (spec.md
/// §4.3).
pub fn refine(g: &DenseGraph, part: &mut OrderedPartition, level: usize, active: &mut ActiveSet) -> u16 {
    let n = g.n();
    let mut hint: Option<usize> = None;
    let mut acc = CodeAccumulator::default();
    let mut cell_count = part.cells(level).count();

    while !active.is_empty() && cell_count < n {
        let splitter_start = match hint.take() {
            Some(h) if active.contains(h) => {
                active.remove(h);
                h
            }
            _ => active.pop().expect("active set checked non-empty above"),
        };
        let splitter_end = part.cell_end(splitter_start, level);

        let mut splitter_set = Bitset::new(n);
        for pos in splitter_start..=splitter_end {
            splitter_set.add(part.lab()[pos]);
        }
        acc.push(splitter_start);

        let targets: Vec<(usize, usize)> = part.cells(level).filter(|&(s, e)| e > s).collect();
        let mut smallest_fragment: Option<(usize, usize)> = None;

        for (t_start, t_end) in targets {
            let counts: Vec<usize> = (t_start..=t_end)
                .map(|pos| splitter_set.intersection_count(g.row(part.lab()[pos]).words()))
                .collect();

            let first = counts[0];
            if counts.iter().all(|&c| c == first) {
                acc.push(first);
                continue;
            }

            let mut members: Vec<(usize, usize)> =
                (t_start..=t_end).map(|pos| (part.lab()[pos], counts[pos - t_start])).collect();
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

        acc.push(cell_count);
        hint = smallest_fragment.map(|(fs, _)| fs);
    }

    acc.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphOps;
    use crate::partition::ActiveSet;

    fn all_cells_active(part: &OrderedPartition, level: usize) -> ActiveSet {
        let mut a = ActiveSet::new(part.n());
        for (start, _end) in part.cells(level) {
            a.push(start);
        }
        a
    }

    #[test]
    fn refine_k4_collapses_to_one_equitable_cell() {
        let g = DenseGraph::from_edges(4, &[(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)], false).unwrap();
        let mut part = OrderedPartition::unit(4);
        let mut active = all_cells_active(&part, 0);
        refine(&g, &mut part, 0, &mut active);
        // K4 is vertex-transitive: refinement cannot distinguish any vertex.
        assert_eq!(part.first_nonsingleton_cell(0), Some((0, 3)));
    }

    #[test]
    fn refine_path_separates_endpoints_from_middle() {
        // P4: 0-1-2-3. Degrees: 0,3 have degree 1; 1,2 have degree 2.
        let g = DenseGraph::from_edges(4, &[(0, 1), (1, 2), (2, 3)], false).unwrap();
        let mut part = OrderedPartition::unit(4);
        let mut active = all_cells_active(&part, 0);
        refine(&g, &mut part, 0, &mut active);
        // Degree alone separates {0,3} from {1,2}: two nonsingleton cells
        // of size 2 each, never a single undivided cell of size 4.
        let cells: Vec<(usize, usize)> = part.cells(0).collect();
        assert_eq!(cells, vec![(0, 1), (2, 3)]);
        let first_cell: std::collections::BTreeSet<usize> = part.lab()[0..2].iter().copied().collect();
        let second_cell: std::collections::BTreeSet<usize> = part.lab()[2..4].iter().copied().collect();
        assert_eq!(first_cell, [0usize, 3].into_iter().collect());
        assert_eq!(second_cell, [1usize, 2].into_iter().collect());
    }

    #[test]
    fn refine_is_deterministic_for_fixed_input() {
        let g = DenseGraph::from_edges(5, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)], false).unwrap();
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
    fn refined_partition_is_automorphism_invariant_up_to_relabeling() {
        // C5 refinement must keep every vertex in one cell (vertex-transitive).
        let g = DenseGraph::from_edges(5, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)], false).unwrap();
        let mut part = OrderedPartition::unit(5);
        let mut active = all_cells_active(&part, 0);
        refine(&g, &mut part, 0, &mut active);
        assert_eq!(part.first_nonsingleton_cell(0), Some((0, 4)));
        assert!(g.degree(0) == 2);
    }
}
