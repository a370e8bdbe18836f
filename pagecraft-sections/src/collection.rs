//! Pure list editing for page sections, block slots and item arrays.
//!
//! Every operation takes a slice and returns a fresh `Vec`; nothing is
//! mutated in place, so callers can compare the result against the last-saved
//! list to decide whether a save is needed. Identity-based operations resolve
//! ids through [`Keyed`]; a stale id turns the operation into a no-op.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Store-assigned identifier; numeric or textual depending on the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{}", n),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        RecordId::Text(value.to_string())
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        RecordId::Number(value)
    }
}

/// An element addressable by a key within its list.
///
/// `index` is the element's current position, used by items that have no
/// stored id and fall back to a positional key.
pub trait Keyed {
    fn key(&self, index: usize) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Generate a fresh identifier such as `sec_1f0c…`. Never reuses a value.
pub fn generate_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}

/// Current keys, in order
pub fn keys<T: Keyed>(items: &[T]) -> Vec<String> {
    items.iter().enumerate().map(|(i, item)| item.key(i)).collect()
}

/// Index of the first element whose key is `id`
pub fn position<T: Keyed>(items: &[T], id: &str) -> Option<usize> {
    items
        .iter()
        .enumerate()
        .position(|(i, item)| item.key(i) == id)
}

// ─── Identity-based operations ────────────────────────────────────────────────

pub fn add<T: Clone>(items: &[T], item: T) -> Vec<T> {
    let mut out = items.to_vec();
    out.push(item);
    out
}

/// Insert at `index`; an index past the end appends.
pub fn insert_at<T: Clone>(items: &[T], index: usize, item: T) -> Vec<T> {
    let mut out = items.to_vec();
    out.insert(index.min(out.len()), item);
    out
}

pub fn remove<T: Keyed + Clone>(items: &[T], id: &str) -> Vec<T> {
    match position(items, id) {
        Some(index) => remove_at(items, index),
        None => items.to_vec(),
    }
}

pub fn move_up<T: Keyed + Clone>(items: &[T], id: &str) -> Vec<T> {
    move_by_id(items, id, Direction::Up)
}

pub fn move_down<T: Keyed + Clone>(items: &[T], id: &str) -> Vec<T> {
    move_by_id(items, id, Direction::Down)
}

pub fn move_by_id<T: Keyed + Clone>(items: &[T], id: &str, direction: Direction) -> Vec<T> {
    match position(items, id) {
        Some(index) => move_at(items, index, direction),
        None => items.to_vec(),
    }
}

/// Drag-and-drop reorder: move `from_id` to the position currently held by
/// `to_id`. If either id is not in the current list the list is returned
/// unchanged.
pub fn reorder<T: Keyed + Clone>(items: &[T], from_id: &str, to_id: &str) -> Vec<T> {
    let current = keys(items);
    let from = current.iter().position(|k| k == from_id);
    let to = current.iter().position(|k| k == to_id);
    match (from, to) {
        (Some(from), Some(to)) => reorder_at(items, from, to),
        _ => {
            log::debug!("reorder aborted: stale id ({} -> {})", from_id, to_id);
            items.to_vec()
        }
    }
}

// ─── Positional operations ────────────────────────────────────────────────────

/// Append a blank item
pub fn push_default<T: Clone + Default>(items: &[T]) -> Vec<T> {
    add(items, T::default())
}

pub fn replace_at<T: Clone>(items: &[T], index: usize, item: T) -> Vec<T> {
    let mut out = items.to_vec();
    if let Some(slot) = out.get_mut(index) {
        *slot = item;
    }
    out
}

pub fn remove_at<T: Clone>(items: &[T], index: usize) -> Vec<T> {
    let mut out = items.to_vec();
    if index < out.len() {
        out.remove(index);
    }
    out
}

/// Swap with the neighbour. First-up and last-down are no-ops.
pub fn move_at<T: Clone>(items: &[T], index: usize, direction: Direction) -> Vec<T> {
    let mut out = items.to_vec();
    let target = match direction {
        Direction::Up => index.checked_sub(1),
        Direction::Down => Some(index + 1),
    };
    if let Some(target) = target {
        if index < out.len() && target < out.len() {
            out.swap(index, target);
        }
    }
    out
}

/// Remove the element at `from` and insert it at `to`.
pub fn reorder_at<T: Clone>(items: &[T], from: usize, to: usize) -> Vec<T> {
    let mut out = items.to_vec();
    if from == to || from >= out.len() || to >= out.len() {
        return out;
    }
    let item = out.remove(from);
    out.insert(to, item);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, PartialEq)]
    struct Item(&'static str);

    impl Keyed for Item {
        fn key(&self, _index: usize) -> String {
            self.0.to_string()
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Legacy(Option<&'static str>);

    impl Keyed for Legacy {
        fn key(&self, index: usize) -> String {
            match self.0 {
                Some(id) => id.to_string(),
                None => format!("item-{}", index),
            }
        }
    }

    fn abcde() -> Vec<Item> {
        vec![Item("a"), Item("b"), Item("c"), Item("d"), Item("e")]
    }

    fn names(items: &[Item]) -> Vec<&'static str> {
        items.iter().map(|i| i.0).collect()
    }

    #[test]
    fn move_up_first_is_noop() {
        let items = abcde();
        assert_eq!(move_up(&items, "a"), items);
        assert_eq!(move_at(&items, 0, Direction::Up), items);
    }

    #[test]
    fn move_down_last_is_noop() {
        let items = abcde();
        assert_eq!(move_down(&items, "e"), items);
    }

    #[test]
    fn move_swaps_neighbours() {
        assert_eq!(names(&move_up(&abcde(), "c")), vec!["a", "c", "b", "d", "e"]);
        assert_eq!(names(&move_down(&abcde(), "c")), vec!["a", "b", "d", "c", "e"]);
    }

    #[test]
    fn drop_on_self_is_noop() {
        let items = abcde();
        for item in &items {
            assert_eq!(reorder(&items, item.0, item.0), items);
        }
    }

    #[test]
    fn reorder_places_item_next_to_target() {
        let forward = reorder(&abcde(), "b", "d");
        assert_eq!(names(&forward), vec!["a", "c", "d", "b", "e"]);

        let backward = reorder(&abcde(), "d", "a");
        assert_eq!(names(&backward), vec!["d", "a", "b", "c", "e"]);
    }

    #[test]
    fn reorder_keeps_relative_order_of_others() {
        let items = abcde();
        for from in &items {
            for to in &items {
                let out = reorder(&items, from.0, to.0);
                let others: Vec<_> = names(&out).into_iter().filter(|n| *n != from.0).collect();
                let expected: Vec<_> = names(&items).into_iter().filter(|n| *n != from.0).collect();
                assert_eq!(others, expected);

                let moved = position(&out, from.0).unwrap();
                let target = position(&out, to.0).unwrap();
                assert!(moved.abs_diff(target) <= 1);
            }
        }
    }

    #[test]
    fn stale_ids_abort_reorder() {
        let items = abcde();
        assert_eq!(reorder(&items, "zz", "a"), items);
        assert_eq!(reorder(&items, "a", "zz"), items);
        assert_eq!(remove(&items, "zz"), items);
        assert_eq!(move_up(&items, "zz"), items);
    }

    #[test]
    fn input_is_never_mutated() {
        let items = abcde();
        let snapshot = items.clone();
        let _ = remove(&items, "a");
        let _ = reorder(&items, "a", "e");
        let _ = add(&items, Item("f"));
        assert_eq!(items, snapshot);
    }

    #[test]
    fn positional_keys_shift_after_removal() {
        let items = vec![Legacy(None), Legacy(Some("x")), Legacy(None)];
        assert_eq!(keys(&items), vec!["item-0", "x", "item-2"]);

        let out = remove(&items, "item-0");
        assert_eq!(keys(&out), vec!["x", "item-1"]);
    }

    #[test]
    fn insert_past_end_appends() {
        let out = insert_at(&abcde(), 99, Item("z"));
        assert_eq!(names(&out).last(), Some(&"z"));
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = generate_id("blk");
        let b = generate_id("blk");
        assert!(a.starts_with("blk_"));
        assert_ne!(a, b);
    }
}
