//! Sibling ordering for a rebuilt branch.
//!
//! The output has one slot per sibling. Siblings with an explicit index claim
//! the requested slot in `(index, sequence)` order. Each takes the slot after
//! the previous indexed sibling when its own is already taken, and is pulled
//! back only as far as needed to leave room for the indexed siblings after
//! it. Indexed siblings therefore keep `(index, sequence)` order, so the first
//! declared wins the earlier slot. Remaining siblings fill the free slots in
//! discovery order.

use itertools::Itertools;

/// A sibling waiting to be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placed<T> {
    pub item: T,
    /// Discovery position in the input
    pub sequence: usize,
    /// Requested slot, `None` to follow discovery order
    pub index: Option<usize>,
}

impl<T> Placed<T> {
    pub fn floating(item: T, sequence: usize) -> Self {
        Self {
            item,
            sequence,
            index: None,
        }
    }

    pub fn at(item: T, sequence: usize, index: Option<usize>) -> Self {
        Self {
            item,
            sequence,
            index,
        }
    }
}

pub fn merge<T: Copy>(placed: &[Placed<T>]) -> Vec<T> {
    let len = placed.len();
    let mut slots: Vec<Option<T>> = vec![None; len];

    let (indexed, floating): (Vec<&Placed<T>>, Vec<&Placed<T>>) =
        placed.iter().partition(|p| p.index.is_some());

    let indexed: Vec<&Placed<T>> = indexed
        .into_iter()
        .sorted_by_key(|p| (p.index, p.sequence))
        .collect();
    let count = indexed.len();
    let mut next_free = 0;
    for (i, p) in indexed.into_iter().enumerate() {
        let latest = len - (count - i);
        let slot = p.index.unwrap_or_default().min(latest).max(next_free);
        slots[slot] = Some(p.item);
        next_free = slot + 1;
    }

    let mut rest = floating
        .into_iter()
        .sorted_by_key(|p| p.sequence)
        .map(|p| p.item);
    let mut merged = Vec::with_capacity(len);
    for slot in slots {
        match slot {
            Some(item) => merged.push(item),
            None => merged.extend(rest.next()),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn given_no_indices_when_merging_then_discovery_order() {
        let placed = [
            Placed::floating('c', 7),
            Placed::floating('a', 1),
            Placed::floating('b', 4),
        ];
        assert_eq!(merge(&placed), vec!['a', 'b', 'c']);
    }

    #[test]
    fn given_indices_two_and_zero_with_one_floating_when_merging_then_fills_gap() {
        let placed = [
            Placed::at('x', 0, Some(2)),
            Placed::at('y', 1, Some(0)),
            Placed::floating('z', 2),
        ];
        assert_eq!(merge(&placed), vec!['y', 'z', 'x']);
    }

    #[test]
    fn given_colliding_indices_when_merging_then_first_declared_wins() {
        let placed = [
            Placed::at("late", 5, Some(0)),
            Placed::at("early", 2, Some(0)),
            Placed::floating("floating", 0),
        ];
        assert_eq!(merge(&placed), vec!["early", "late", "floating"]);
    }

    #[rstest]
    #[case(Some(10), vec!['a', 'b', 'x'])]
    #[case(Some(1), vec!['a', 'x', 'b'])]
    #[case(Some(0), vec!['x', 'a', 'b'])]
    fn given_single_index_when_merging_then_clamped_into_range(
        #[case] index: Option<usize>,
        #[case] expected: Vec<char>,
    ) {
        let placed = [
            Placed::floating('a', 0),
            Placed::floating('b', 1),
            Placed::at('x', 2, index),
        ];
        assert_eq!(merge(&placed), expected);
    }

    #[test]
    fn given_collisions_past_end_when_merging_then_discovery_order_kept() {
        let placed = [
            Placed::at('r', 2, Some(9)),
            Placed::at('p', 0, Some(9)),
            Placed::at('q', 1, Some(9)),
        ];
        assert_eq!(merge(&placed), vec!['p', 'q', 'r']);
    }

    #[test]
    fn given_collision_with_floating_siblings_when_merging_then_consecutive_slots() {
        let placed = [
            Placed::floating('a', 0),
            Placed::floating('b', 3),
            Placed::at('x', 1, Some(1)),
            Placed::at('y', 2, Some(1)),
        ];
        assert_eq!(merge(&placed), vec!['a', 'x', 'y', 'b']);
    }

    #[test]
    fn given_collision_near_end_when_merging_then_pulled_back_in_order() {
        let placed = [
            Placed::floating('a', 0),
            Placed::floating('b', 1),
            Placed::at('x', 2, Some(2)),
            Placed::at('y', 3, Some(2)),
        ];
        assert_eq!(merge(&placed), vec!['a', 'b', 'x', 'y']);
    }

    #[test]
    fn given_nothing_when_merging_then_empty() {
        let placed: [Placed<u8>; 0] = [];
        assert!(merge(&placed).is_empty());
    }
}
