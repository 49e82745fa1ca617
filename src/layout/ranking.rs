// Ranking engine.
//
// Sums each axis's relation weights against every other axis in the list,
// then assigns dense ranks by descending sum. Ties share a rank and the next
// distinct sum is exactly one rank further, regardless of tie group size.
//
// Properties:
// - Deterministic: stable sort on (-sum, order, name)
// - Never fails: fewer than 2 axes yields all-zero sums and rank 1
// - Relations pointing at axes outside the list are never looked up

use std::collections::BTreeMap;

use serde::Serialize;

use crate::matrix::{Axis, AxisId, RelationStore, ZonePalette};

/// A ranked space ready for partitioning and placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Space {
    pub id: AxisId,
    pub name: String,
    /// Zone normalized against the palette.
    pub zone: String,
    pub sum: i64,
    pub rank: u32,
}

/// Parallel `sum`/`rank` arrays indexed like the input axes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Ranking {
    pub sums: Vec<i64>,
    pub ranks: Vec<u32>,
}

pub fn rank_axes(axes: &[Axis], relations: &RelationStore) -> Ranking {
    let n = axes.len();
    if n < 2 {
        return Ranking { sums: vec![0; n], ranks: vec![1; n] };
    }

    let mut sums = vec![0i64; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let w = relations.get(axes[i].id, axes[j].id).weight();
            sums[i] += w;
            sums[j] += w;
        }
    }

    let mut sorted: Vec<usize> = (0..n).collect();
    sorted.sort_by(|&a, &b| {
        sums[b]
            .cmp(&sums[a])
            .then_with(|| axes[a].order.cmp(&axes[b].order))
            .then_with(|| axes[a].name.cmp(&axes[b].name))
    });

    let mut ranks = vec![0u32; n];
    let mut current = 0u32;
    let mut last_sum: Option<i64> = None;
    for idx in sorted {
        if last_sum != Some(sums[idx]) {
            current += 1;
            last_sum = Some(sums[idx]);
        }
        ranks[idx] = current;
    }

    Ranking { sums, ranks }
}

/// Rank `axes` and attach the results. Output order matches `axes`.
pub fn compute_spaces(axes: &[Axis], relations: &RelationStore, palette: &ZonePalette) -> Vec<Space> {
    let ranking = rank_axes(axes, relations);
    let spaces: Vec<Space> = axes
        .iter()
        .zip(ranking.sums.iter().zip(ranking.ranks.iter()))
        .map(|(axis, (&sum, &rank))| Space {
            id: axis.id,
            name: axis.name.clone(),
            zone: palette.normalize(&axis.zone),
            sum,
            rank,
        })
        .collect();

    tracing::debug!(
        spaces = spaces.len(),
        ranks = max_rank(&spaces),
        "computed spaces"
    );
    spaces
}

/// Highest rank present, or 0 for no spaces.
pub fn max_rank(spaces: &[Space]) -> u32 {
    spaces.iter().map(|s| s.rank).max().unwrap_or(0)
}

/// Space names grouped by rank, ascending. Names keep input order.
pub fn rank_summary(spaces: &[Space]) -> Vec<(u32, Vec<String>)> {
    let mut groups: BTreeMap<u32, Vec<String>> = BTreeMap::new();
    for s in spaces {
        groups.entry(s.rank).or_default().push(s.name.clone());
    }
    groups.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::{RelationEntry, RelationValue};
    use proptest::prelude::*;

    fn axis(id: u64, name: &str, order: i64) -> Axis {
        Axis { id: AxisId(id), name: name.to_string(), zone: "Social".to_string(), order }
    }

    fn store(pairs: &[(u64, u64, RelationValue)]) -> RelationStore {
        let entries: Vec<RelationEntry> = pairs
            .iter()
            .map(|&(a, b, value)| RelationEntry { axis_a: AxisId(a), axis_b: AxisId(b), value })
            .collect();
        RelationStore::from_entries(&entries)
    }

    #[test]
    fn test_distinct_sums_rank_in_order() {
        let axes = vec![axis(1, "A", 0), axis(2, "B", 1), axis(3, "C", 2)];
        let relations = store(&[
            (1, 2, RelationValue::Necessary),
            (1, 3, RelationValue::Desired),
            (2, 3, RelationValue::None),
        ]);
        let ranking = rank_axes(&axes, &relations);
        assert_eq!(ranking.sums, vec![6, 4, 2]);
        assert_eq!(ranking.ranks, vec![1, 2, 3]);
    }

    #[test]
    fn test_tie_group_then_plus_one() {
        // Sums: A 4, B 4, C 2, D 2. Next distinct sum is rank 2, not 3.
        let axes = vec![axis(1, "A", 0), axis(2, "B", 1), axis(3, "C", 2), axis(4, "D", 3)];
        let relations = store(&[(1, 2, RelationValue::Necessary), (3, 4, RelationValue::Desired)]);
        let ranking = rank_axes(&axes, &relations);
        assert_eq!(ranking.sums, vec![4, 4, 2, 2]);
        assert_eq!(ranking.ranks, vec![1, 1, 2, 2]);
    }

    #[test]
    fn test_large_tie_group_does_not_skip_ranks() {
        // Three axes tied at 4, then two tied at 2.
        let axes = vec![
            axis(1, "A", 0),
            axis(2, "B", 1),
            axis(3, "C", 2),
            axis(4, "D", 3),
            axis(5, "E", 4),
        ];
        let relations = store(&[
            (1, 2, RelationValue::Desired),
            (2, 3, RelationValue::Desired),
            (3, 1, RelationValue::Desired),
            (4, 5, RelationValue::Desired),
        ]);
        let ranking = rank_axes(&axes, &relations);
        assert_eq!(ranking.sums, vec![4, 4, 4, 2, 2]);
        assert_eq!(ranking.ranks, vec![1, 1, 1, 2, 2]);
    }

    #[test]
    fn test_all_tied() {
        let axes = vec![axis(1, "A", 0), axis(2, "B", 1), axis(3, "C", 2)];
        let relations = store(&[(1, 2, RelationValue::Desired), (1, 3, RelationValue::Desired), (2, 3, RelationValue::Desired)]);
        let ranking = rank_axes(&axes, &relations);
        assert_eq!(ranking.ranks, vec![1, 1, 1]);
    }

    #[test]
    fn test_fewer_than_two_axes() {
        let relations = RelationStore::new();
        assert_eq!(rank_axes(&[], &relations), Ranking::default());
        let one = rank_axes(&[axis(1, "A", 0)], &relations);
        assert_eq!(one.sums, vec![0]);
        assert_eq!(one.ranks, vec![1]);
    }

    #[test]
    fn test_relations_to_unknown_axes_are_ignored() {
        let axes = vec![axis(1, "A", 0), axis(2, "B", 1)];
        let relations = store(&[(1, 2, RelationValue::Desired), (1, 99, RelationValue::Necessary)]);
        let ranking = rank_axes(&axes, &relations);
        assert_eq!(ranking.sums, vec![2, 2]);
    }

    #[test]
    fn test_compute_spaces_normalizes_zone() {
        let axes = vec![
            Axis { id: AxisId(7), name: "Sala".into(), zone: "Área Social".into(), order: 0 },
            Axis { id: AxisId(8), name: "Baño".into(), zone: "privada".into(), order: 1 },
        ];
        let relations = store(&[(7, 8, RelationValue::Necessary)]);
        let spaces = compute_spaces(&axes, &relations, &ZonePalette::default());
        assert_eq!(spaces[0].zone, "Social");
        assert_eq!(spaces[1].zone, "Privada");
        assert_eq!(spaces[1].sum, 4);
        assert_eq!(spaces[1].rank, 1);
    }

    #[test]
    fn test_rank_summary_groups_names() {
        let axes = vec![axis(1, "A", 0), axis(2, "B", 1), axis(3, "C", 2)];
        let relations = store(&[(1, 2, RelationValue::Necessary)]);
        let spaces = compute_spaces(&axes, &relations, &ZonePalette::default());
        assert_eq!(
            rank_summary(&spaces),
            vec![(1, vec!["A".to_string(), "B".to_string()]), (2, vec!["C".to_string()])]
        );
    }

    proptest! {
        #[test]
        fn sums_count_each_relation_twice(
            n in 0usize..9,
            raw in proptest::collection::vec(prop_oneof![Just(0i64), Just(2), Just(4)], 36),
        ) {
            let axes: Vec<Axis> = (0..n).map(|i| axis(i as u64, &format!("S{i}"), i as i64)).collect();
            let mut relations = RelationStore::new();
            let mut k = 0;
            let mut total = 0i64;
            for i in 0..n {
                for j in (i + 1)..n {
                    let value = RelationValue::try_from(raw[k]).unwrap();
                    relations.set(AxisId(i as u64), AxisId(j as u64), value).unwrap();
                    total += value.weight();
                    k += 1;
                }
            }
            let ranking = rank_axes(&axes, &relations);
            prop_assert_eq!(ranking.sums.iter().sum::<i64>(), 2 * total);
        }

        #[test]
        fn ranks_step_by_one_at_each_sum_boundary(
            n in 2usize..9,
            raw in proptest::collection::vec(prop_oneof![Just(0i64), Just(2), Just(4)], 36),
        ) {
            let axes: Vec<Axis> = (0..n).map(|i| axis(i as u64, &format!("S{i}"), i as i64)).collect();
            let mut relations = RelationStore::new();
            let mut k = 0;
            for i in 0..n {
                for j in (i + 1)..n {
                    relations.set(AxisId(i as u64), AxisId(j as u64), RelationValue::try_from(raw[k]).unwrap()).unwrap();
                    k += 1;
                }
            }
            let ranking = rank_axes(&axes, &relations);
            let mut idx: Vec<usize> = (0..n).collect();
            idx.sort_by(|&a, &b| ranking.sums[b].cmp(&ranking.sums[a]).then(a.cmp(&b)));

            prop_assert_eq!(ranking.ranks[idx[0]], 1);
            for w in idx.windows(2) {
                let (prev, next) = (w[0], w[1]);
                if ranking.sums[prev] == ranking.sums[next] {
                    prop_assert_eq!(ranking.ranks[next], ranking.ranks[prev]);
                } else {
                    prop_assert_eq!(ranking.ranks[next], ranking.ranks[prev] + 1);
                }
            }
        }
    }
}
