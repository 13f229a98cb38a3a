use std::cmp::Ordering;

/// Merge two slices sorted ascending by `cmp` into one sorted vector.
///
/// Elements comparing equal are folded with `combine`. The output is
/// independent of argument order whenever `combine` is commutative.
pub fn merge_sorted<T, C, M>(a: Vec<T>, b: Vec<T>, cmp: C, combine: M) -> Vec<T>
where
    C: Fn(&T, &T) -> Ordering,
    M: Fn(T, T) -> T,
{
    let mut merged = Vec::with_capacity(a.len() + b.len());
    let mut left = a.into_iter().peekable();
    let mut right = b.into_iter().peekable();

    loop {
        let order = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => cmp(l, r),
            (Some(_), None) => {
                merged.extend(left);
                break;
            }
            (None, _) => {
                merged.extend(right);
                break;
            }
        };
        match order {
            Ordering::Less => merged.extend(left.next()),
            Ordering::Greater => merged.extend(right.next()),
            Ordering::Equal => {
                if let (Some(l), Some(r)) = (left.next(), right.next()) {
                    merged.push(combine(l, r));
                }
            }
        }
    }

    merged
}

/// Sort every branch by `cmp` and fold them together with [`merge_sorted`].
pub fn merge_many<T, C, M>(branches: Vec<Vec<T>>, cmp: C, combine: M) -> Vec<T>
where
    C: Fn(&T, &T) -> Ordering,
    M: Fn(T, T) -> T,
{
    branches.into_iter().fold(Vec::new(), |acc, mut branch| {
        branch.sort_by(&cmp);
        merge_sorted(acc, branch, &cmp, &combine)
    })
}

/// Keep the last `n` elements.
pub fn keep_last<T>(mut items: Vec<T>, n: usize) -> Vec<T> {
    let excess = items.len().saturating_sub(n);
    items.drain(..excess);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn by_key(a: &(u32, u64), b: &(u32, u64)) -> Ordering {
        a.0.cmp(&b.0)
    }

    fn sum(a: (u32, u64), b: (u32, u64)) -> (u32, u64) {
        (a.0, a.1 + b.1)
    }

    fn branch() -> impl Strategy<Value = Vec<(u32, u64)>> {
        prop::collection::btree_map(0u32..64, 0u64..1_000, 0..24)
            .prop_map(|m| m.into_iter().collect())
    }

    #[test]
    fn merges_daily_buckets() {
        let a = vec![(1, 3), (2, 5)];
        let b = vec![(1, 2), (3, 1)];
        assert_eq!(merge_sorted(a, b, by_key, sum), vec![(1, 5), (2, 5), (3, 1)]);
    }

    #[test]
    fn empty_branches() {
        assert_eq!(merge_sorted(vec![], vec![(1, 1)], by_key, sum), vec![(1, 1)]);
        assert_eq!(merge_sorted(vec![(1, 1)], vec![], by_key, sum), vec![(1, 1)]);
        assert!(merge_sorted(Vec::new(), Vec::new(), by_key, sum).is_empty());
    }

    #[test]
    fn merge_many_sorts_unsorted_branches() {
        let merged = merge_many(vec![vec![(3, 1), (1, 1)], vec![(2, 2), (1, 4)]], by_key, sum);
        assert_eq!(merged, vec![(1, 5), (2, 2), (3, 1)]);
    }

    #[test]
    fn keep_last_saturates() {
        assert_eq!(keep_last(vec![1, 2, 3, 4], 2), vec![3, 4]);
        assert_eq!(keep_last(vec![1, 2], 5), vec![1, 2]);
        assert!(keep_last(vec![1, 2], 0).is_empty());
    }

    proptest! {
        #[test]
        fn merge_is_commutative(a in branch(), b in branch()) {
            prop_assert_eq!(
                merge_sorted(a.clone(), b.clone(), by_key, sum),
                merge_sorted(b, a, by_key, sum)
            );
        }

        #[test]
        fn merge_is_sorted_and_bounded(a in branch(), b in branch()) {
            let (la, lb) = (a.len(), b.len());
            let merged = merge_sorted(a, b, by_key, sum);
            prop_assert!(merged.windows(2).all(|w| w[0].0 < w[1].0));
            prop_assert!(merged.len() <= la + lb);
        }

        #[test]
        fn keys_unique_to_one_branch_pass_through(a in branch(), b in branch()) {
            let merged = merge_sorted(a.clone(), b.clone(), by_key, sum);
            for entry in &a {
                if b.iter().all(|other| other.0 != entry.0) {
                    prop_assert!(merged.contains(entry));
                }
            }
        }

        #[test]
        fn merge_preserves_totals(a in branch(), b in branch()) {
            let total: u64 = a.iter().chain(&b).map(|e| e.1).sum();
            let merged = merge_sorted(a, b, by_key, sum);
            prop_assert_eq!(merged.iter().map(|e| e.1).sum::<u64>(), total);
        }
    }
}
