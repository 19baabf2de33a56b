//! Bounded integer partitions describing per-row core counts.
//!
//! A row configuration lists how many cores of one type occupy each
//! successive row of a block anchored in a die corner. [`partitions`] yields
//! every such configuration for a given core count, largest rows first.

/// Per-row core counts of one core type, row 0 against the anchoring edge.
pub type RowConfiguration = Vec<usize>;

/// Returns a lazy iterator over all partitions of `total` into at most
/// `max_len` parts, each part in `1..=max_value`.
///
/// Partitions are non-increasing and emitted in strictly decreasing
/// lexicographic order. `total == 0` yields nothing; callers that need an
/// empty block must handle it themselves. The iterator is `Clone`, so a
/// saved copy restarts the sequence.
///
/// ```
/// use corefill_core::partition::partitions;
///
/// let all: Vec<_> = partitions(4, 3, 2).collect();
/// assert_eq!(all, vec![vec![3, 1], vec![2, 2]]);
/// ```
pub fn partitions(total: usize, max_value: usize, max_len: usize) -> Partitions {
    let mut stack = Vec::new();
    if total > 0 {
        stack.push(Frame::new(total, max_value, max_len));
    }
    Partitions {
        prefix: Vec::new(),
        stack,
    }
}

/// Iterator returned by [`partitions`].
#[derive(Debug, Clone)]
pub struct Partitions {
    /// Leading parts fixed by the enclosing frames.
    prefix: Vec<usize>,
    /// One frame per open recursion level; `prefix.len() + 1 == stack.len()`.
    stack: Vec<Frame>,
}

/// One level of the recursive enumeration: partitions of `total` with parts
/// at most `max_value` and at most `max_len` parts.
#[derive(Debug, Clone)]
struct Frame {
    total: usize,
    max_len: usize,
    singleton_pending: bool,
    /// Next candidate for the first part; candidates run down to `lowest`.
    next: usize,
    lowest: usize,
}

impl Frame {
    fn new(total: usize, max_value: usize, max_len: usize) -> Self {
        if max_len == 0 {
            return Self {
                total,
                max_len,
                singleton_pending: false,
                next: 0,
                lowest: 1,
            };
        }
        // The first part must be at least ceil(total / max_len), otherwise the
        // remaining parts cannot reach the total.
        let lowest = total.div_ceil(max_len).max(1);
        Self {
            total,
            max_len,
            singleton_pending: total <= max_value,
            next: (total - 1).min(max_value),
            lowest,
        }
    }
}

impl Iterator for Partitions {
    type Item = RowConfiguration;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let frame = self.stack.last_mut()?;

            if frame.singleton_pending {
                frame.singleton_pending = false;
                let mut partition = self.prefix.clone();
                partition.push(frame.total);
                return Some(partition);
            }

            if frame.next >= frame.lowest {
                let first = frame.next;
                frame.next -= 1;
                // Remaining parts may not exceed the first part.
                let child = Frame::new(frame.total - first, first, frame.max_len - 1);
                self.prefix.push(first);
                self.stack.push(child);
                continue;
            }

            self.stack.pop();
            self.prefix.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_strictly_decreasing(seq: &[RowConfiguration]) -> bool {
        seq.windows(2).all(|w| w[0] > w[1])
    }

    #[test]
    fn test_two_cores_two_by_two() {
        let all: Vec<_> = partitions(2, 2, 2).collect();
        assert_eq!(all, vec![vec![2], vec![1, 1]]);
    }

    #[test]
    fn test_zero_total_is_empty() {
        assert_eq!(partitions(0, 5, 5).count(), 0);
    }

    #[test]
    fn test_unreachable_total() {
        // 7 cores cannot fit into 2 rows of at most 3.
        assert_eq!(partitions(7, 3, 2).count(), 0);
        assert_eq!(partitions(1, 0, 3).count(), 0);
        assert_eq!(partitions(3, 3, 0).count(), 0);
    }

    #[test]
    fn test_full_capacity_is_single_partition() {
        let all: Vec<_> = partitions(12, 4, 3).collect();
        assert_eq!(all, vec![vec![4, 4, 4]]);
    }

    #[test]
    fn test_unbounded_partitions_of_five() {
        let all: Vec<_> = partitions(5, 5, 5).collect();
        assert_eq!(
            all,
            vec![
                vec![5],
                vec![4, 1],
                vec![3, 2],
                vec![3, 1, 1],
                vec![2, 2, 1],
                vec![2, 1, 1, 1],
                vec![1, 1, 1, 1, 1],
            ]
        );
    }

    #[test]
    fn test_bounds_hold() {
        for total in 1..=20 {
            for max_value in 1..=6 {
                for max_len in 1..=6 {
                    let all: Vec<_> = partitions(total, max_value, max_len).collect();
                    for p in &all {
                        assert_eq!(p.iter().sum::<usize>(), total);
                        assert!(p.len() <= max_len);
                        assert!(p.iter().all(|&x| x >= 1 && x <= max_value));
                        assert!(p.windows(2).all(|w| w[0] >= w[1]), "{:?}", p);
                    }
                    assert!(is_strictly_decreasing(&all));
                }
            }
        }
    }

    #[test]
    fn test_count_matches_closed_form() {
        // Partitions of n into parts of size at most 2: floor(n / 2) + 1.
        for n in 1..=12 {
            assert_eq!(partitions(n, 2, n).count(), n / 2 + 1);
        }
    }

    #[test]
    fn test_clone_restarts() {
        let iter = partitions(6, 3, 3);
        let first: Vec<_> = iter.clone().collect();
        let second: Vec<_> = iter.collect();
        assert_eq!(first, second);
        assert_eq!(first[0], vec![3, 3]);
    }
}
