//! Combinatorics.

/// Binomial coefficient: the number of ways of choosing `k` items from a set of `n` without
/// replacement, disregarding order.
pub fn count_combinations(n: usize, k: usize) -> u64 {
    if k > n {
        return 0;
    }
    let k = usize::min(k, n - k);
    let mut count = 1u64;
    for i in 0..k {
        count = count * (n - i) as u64 / (i + 1) as u64;
    }
    count
}

/// Advances `ordinals` to the next `k`-subset of `0..n` in lexicographic order, returning `false`
/// if `ordinals` already holds the last subset.
pub fn advance(n: usize, ordinals: &mut [usize]) -> bool {
    let k = ordinals.len();
    let mut index = k;
    while index > 0 {
        index -= 1;
        if ordinals[index] != index + n - k {
            ordinals[index] += 1;
            for next in index + 1..k {
                ordinals[next] = ordinals[next - 1] + 1;
            }
            return true;
        }
    }
    false
}

/// Iterates over all `K`-subsets of `0..n` in lexicographic order.
pub struct Combinator<const K: usize> {
    n: usize,
}
impl<const K: usize> Combinator<K> {
    pub fn new(n: usize) -> Self {
        Self { n }
    }

    pub fn count(&self) -> u64 {
        count_combinations(self.n, K)
    }
}

impl<const K: usize> IntoIterator for Combinator<K> {
    type Item = [usize; K];
    type IntoIter = Iter<K>;

    fn into_iter(self) -> Self::IntoIter {
        let next = if K <= self.n {
            let mut first = [0; K];
            for (index, ordinal) in first.iter_mut().enumerate() {
                *ordinal = index;
            }
            Some(first)
        } else {
            None
        };
        Iter { n: self.n, next }
    }
}

pub struct Iter<const K: usize> {
    n: usize,
    next: Option<[usize; K]>,
}
impl<const K: usize> Iterator for Iter<K> {
    type Item = [usize; K];

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        let mut successor = current;
        self.next = advance(self.n, &mut successor).then_some(successor);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_combinations() {
        assert_eq!(1, count_combinations(5, 0));
        assert_eq!(5, count_combinations(5, 1));
        assert_eq!(1, count_combinations(5, 5));
        assert_eq!(10, count_combinations(5, 3));
        assert_eq!(120, count_combinations(10, 3));
        assert_eq!(15_504, count_combinations(20, 5));
        assert_eq!(0, count_combinations(4, 5));
    }

    #[test]
    fn iterator() {
        let outputs = Combinator::<3>::new(5).into_iter().collect::<Vec<_>>();
        let expected_outputs = vec![
            [0, 1, 2],
            [0, 1, 3],
            [0, 1, 4],
            [0, 2, 3],
            [0, 2, 4],
            [0, 3, 4],
            [1, 2, 3],
            [1, 2, 4],
            [1, 3, 4],
            [2, 3, 4],
        ];
        assert_eq!(expected_outputs, outputs);
    }

    #[test]
    fn iterator_matches_count() {
        for n in 0..9 {
            let combinator = Combinator::<5>::new(n);
            let expected = combinator.count();
            assert_eq!(expected, combinator.into_iter().count() as u64, "n: {n}");
        }
    }

    #[test]
    fn iterator_degenerate() {
        assert_eq!(0, Combinator::<3>::new(2).into_iter().count());
        assert_eq!(vec![[0, 1, 2]], Combinator::<3>::new(3).into_iter().collect::<Vec<_>>());
        assert_eq!(vec![[0usize; 0]], Combinator::<0>::new(3).into_iter().collect::<Vec<_>>());
    }
}
