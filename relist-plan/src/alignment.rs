//! Duplicate-aware multiset alignment of two ordered sequences.
//!
//! Each element of one side claims the first not-yet-claimed equal element
//! of the other side. Running that greedy pass in both directions yields the
//! matched multiset in each side's own order, plus the two one-sided
//! remainders. Duplicates get a stable correspondence: the k-th occurrence
//! of a value is matched while the other side still has an unclaimed copy.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;

/// Result of aligning `target` against `current`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alignment<T> {
    /// Elements of `target` matched in `current`, in target order.
    pub matched_in_target: Vec<T>,
    /// Elements of `target` with no counterpart, in target order.
    pub only_in_target: Vec<T>,
    /// Elements of `current` matched in `target`, in current order.
    pub matched_in_current: Vec<T>,
    /// Elements of `current` with no counterpart, in current order.
    pub only_in_current: Vec<T>,
}

impl<T> Alignment<T> {
    /// Returns true if both directions matched the same number of elements.
    pub fn is_balanced(&self) -> bool {
        self.matched_in_target.len() == self.matched_in_current.len()
    }

    /// Returns true if the two sequences hold the same multiset.
    pub fn is_permutation(&self) -> bool {
        self.only_in_target.is_empty() && self.only_in_current.is_empty()
    }
}

/// Aligns `target` against `current`.
///
/// Runs in linear time: claiming "the first unclaimed equal element" only
/// decides *whether* an element matches, so a per-value count of unclaimed
/// copies is enough.
pub fn align<T>(target: &[T], current: &[T]) -> Alignment<T>
where
    T: Eq + Hash + Clone,
{
    let (matched_in_target, only_in_target) = claim(target, current);
    let (matched_in_current, only_in_current) = claim(current, target);
    Alignment {
        matched_in_target,
        only_in_target,
        matched_in_current,
        only_in_current,
    }
}

/// Splits `to` into the elements that claim a copy in `from` and the rest.
fn claim<T>(to: &[T], from: &[T]) -> (Vec<T>, Vec<T>)
where
    T: Eq + Hash + Clone,
{
    let mut unclaimed: HashMap<&T, usize> = HashMap::new();
    for value in from {
        *unclaimed.entry(value).or_insert(0) += 1;
    }

    let mut matched = Vec::new();
    let mut extra = Vec::new();
    for value in to {
        match unclaimed.get_mut(value) {
            Some(left) if *left > 0 => {
                *left -= 1;
                matched.push(value.clone());
            }
            _ => extra.push(value.clone()),
        }
    }
    (matched, extra)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn claim_takes_each_copy_once() {
        let (matched, extra) = claim(&chars("aab"), &chars("ab"));
        assert_eq!(matched, chars("ab"));
        assert_eq!(extra, chars("a"));
    }

    #[test]
    fn claim_keeps_order_of_the_scanned_side() {
        let (matched, extra) = claim(&chars("cxba"), &chars("abc"));
        assert_eq!(matched, chars("cba"));
        assert_eq!(extra, chars("x"));
    }

    #[test]
    fn claim_against_empty() {
        let (matched, extra) = claim(&chars("ab"), &[]);
        assert!(matched.is_empty());
        assert_eq!(extra, chars("ab"));
    }
}
